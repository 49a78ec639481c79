//! Cart service: per-buyer cart state over the document store.
//!
//! One cart document per buyer (`carts/{buyer}`). The service pools one
//! live watch per buyer and treats whatever that watch last delivered as
//! the only trustworthy cart state - mutations never advance the mirror
//! directly. A mutation reads the mirror, applies the change, and writes
//! the whole document back (last writer wins, no version check); the
//! mirror catches up when the store delivers the resulting snapshot.
//!
//! Persistence failures are logged, not surfaced as blocking errors: the
//! caller gets the last-known-good cart and the mirror re-syncs on the
//! next delivered snapshot. Concurrent sessions of one buyer can
//! interleave writes non-deterministically; that is a documented
//! limitation of the whole-document model, not something this service
//! tries to fix.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{error, instrument, warn};

use sokoni_backend::{
    Backend, DocumentRef, DocumentWatch, StoreError, WriteMode, collections,
};
use sokoni_core::cart::{Cart, CartItem};
use sokoni_core::{BuyerId, ProductId};

/// Idle time after which a buyer's pooled watch is dropped (and the
/// underlying subscription torn down).
const WATCH_IDLE_TTL: Duration = Duration::from_secs(15 * 60);

/// Maximum number of concurrently watched carts.
const WATCH_CAPACITY: u64 = 10_000;

/// Per-buyer cart state over the document store.
#[derive(Clone)]
pub struct CartService {
    backend: Arc<dyn Backend>,
    watches: Cache<BuyerId, DocumentWatch>,
}

impl CartService {
    /// Create the service around a backend handle.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let watches = Cache::builder()
            .max_capacity(WATCH_CAPACITY)
            .time_to_idle(WATCH_IDLE_TTL)
            .build();
        Self { backend, watches }
    }

    fn doc(buyer: &BuyerId) -> DocumentRef {
        DocumentRef::new(collections::CARTS, buyer.as_str())
    }

    /// Get (or open) the pooled watch for a buyer's cart document.
    ///
    /// A cart document that has never been written is created empty on
    /// first access, so later merge-free writes and watches all see a
    /// consistent starting point.
    async fn subscription(&self, buyer: &BuyerId) -> Result<DocumentWatch, StoreError> {
        if let Some(watch) = self.watches.get(buyer).await {
            return Ok(watch);
        }

        let doc = Self::doc(buyer);
        let watch = self.backend.watch(&doc).await?;
        if !watch.borrow().exists() {
            let empty = Cart::empty().to_body()?;
            if let Err(error) = self.backend.write(&doc, empty, WriteMode::Replace).await {
                // Not fatal: the cart simply stays lazily absent.
                warn!(buyer = %buyer, %error, "could not create empty cart document");
            }
        }

        // Two concurrent first accesses may race here; the loser's watch
        // is dropped with its receiver and the subscription winds down.
        self.watches.insert(buyer.clone(), watch.clone()).await;
        Ok(watch)
    }

    /// The buyer's cart as last delivered by the store.
    ///
    /// A missing document is the empty cart; a malformed one is logged
    /// and treated as empty until the next snapshot replaces it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` only when the watch itself cannot be opened.
    #[instrument(skip(self))]
    pub async fn current(&self, buyer: &BuyerId) -> Result<Cart, StoreError> {
        let watch = self.subscription(buyer).await?;
        let snapshot = watch.borrow().clone();
        Ok(match Cart::from_snapshot(snapshot.body.as_ref()) {
            Ok(cart) => cart,
            Err(error) => {
                warn!(buyer = %buyer, rev = snapshot.rev, %error, "cart document is malformed, treating as empty");
                Cart::empty()
            }
        })
    }

    /// Add an item: same product increments its quantity by 1, a new
    /// product appends a line with quantity 1.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` only when the current cart cannot be read.
    #[instrument(skip(self, item), fields(product = %item.id))]
    pub async fn add_item(&self, buyer: &BuyerId, item: CartItem) -> Result<Cart, StoreError> {
        let mut cart = self.current(buyer).await?;
        cart.add(item);
        Ok(self.persist(buyer, cart).await)
    }

    /// Set a line's quantity; 0 removes the line.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` only when the current cart cannot be read.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        buyer: &BuyerId,
        product: &ProductId,
        quantity: u32,
    ) -> Result<Cart, StoreError> {
        let mut cart = self.current(buyer).await?;
        cart.set_quantity(product, quantity);
        Ok(self.persist(buyer, cart).await)
    }

    /// Remove a line. Silently succeeds when the product is not in the
    /// cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` only when the current cart cannot be read.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        buyer: &BuyerId,
        product: &ProductId,
    ) -> Result<Cart, StoreError> {
        let mut cart = self.current(buyer).await?;
        cart.remove(product);
        Ok(self.persist(buyer, cart).await)
    }

    /// Clear the cart (persist an empty item list; the document stays).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` only when the current cart cannot be read.
    #[instrument(skip(self))]
    pub async fn clear(&self, buyer: &BuyerId) -> Result<Cart, StoreError> {
        let mut cart = self.current(buyer).await?;
        cart.clear();
        Ok(self.persist(buyer, cart).await)
    }

    /// Write the whole cart document back.
    ///
    /// On success the mutated cart is returned (the mirror catches up via
    /// the watch). On failure the error is logged and the last-known-good
    /// mirror is returned instead, so callers never observe state the
    /// store might not have.
    async fn persist(&self, buyer: &BuyerId, cart: Cart) -> Cart {
        let body = match cart.to_body() {
            Ok(body) => body,
            Err(error) => {
                error!(buyer = %buyer, %error, "could not encode cart document");
                return self.last_known_good(buyer).await;
            }
        };

        match self
            .backend
            .write(&Self::doc(buyer), body, WriteMode::Replace)
            .await
        {
            Ok(()) => cart,
            Err(error) => {
                error!(buyer = %buyer, %error, "cart write failed, keeping last-known-good state");
                self.last_known_good(buyer).await
            }
        }
    }

    async fn last_known_good(&self, buyer: &BuyerId) -> Cart {
        match self.current(buyer).await {
            Ok(cart) => cart,
            Err(error) => {
                warn!(buyer = %buyer, %error, "cart mirror unavailable, answering empty");
                Cart::empty()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sokoni_backend::MemoryBackend;
    use sokoni_core::{Money, SellerName};

    fn service() -> (CartService, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        (CartService::new(backend.clone()), backend)
    }

    fn buyer() -> BuyerId {
        BuyerId::new("buyer-1")
    }

    fn pen() -> CartItem {
        CartItem {
            id: ProductId::new("1"),
            shop: SellerName::new("A"),
            name: "Pen".to_owned(),
            price: Money::new(2000),
            img: None,
            quantity: 1,
        }
    }

    #[tokio::test]
    async fn test_first_access_creates_empty_document() {
        let (service, backend) = service();
        let cart = service.current(&buyer()).await.unwrap();
        assert!(cart.is_empty());

        let snap = backend
            .read(&DocumentRef::new(collections::CARTS, "buyer-1"))
            .await
            .unwrap();
        assert!(snap.exists());
    }

    #[tokio::test]
    async fn test_add_persists_whole_document() {
        let (service, backend) = service();
        service.add_item(&buyer(), pen()).await.unwrap();
        service.add_item(&buyer(), pen()).await.unwrap();

        let snap = backend
            .read(&DocumentRef::new(collections::CARTS, "buyer-1"))
            .await
            .unwrap();
        let persisted = Cart::from_snapshot(snap.body.as_ref()).unwrap();
        assert_eq!(persisted.items.len(), 1);
        assert_eq!(persisted.items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_mirror_follows_foreign_writes() {
        let (service, backend) = service();
        // Prime the subscription.
        assert!(service.current(&buyer()).await.unwrap().is_empty());

        // Another session writes the cart behind our back.
        let mut cart = Cart::empty();
        cart.add(pen());
        backend
            .write(
                &DocumentRef::new(collections::CARTS, "buyer-1"),
                cart.to_body().unwrap(),
                WriteMode::Replace,
            )
            .await
            .unwrap();

        let mirrored = service.current(&buyer()).await.unwrap();
        assert_eq!(mirrored, cart);
    }

    #[tokio::test]
    async fn test_set_quantity_zero_removes_line() {
        let (service, _) = service();
        service.add_item(&buyer(), pen()).await.unwrap();
        let cart = service
            .set_quantity(&buyer(), &ProductId::new("1"), 0)
            .await
            .unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_document_reads_as_empty() {
        let (service, backend) = service();
        backend
            .write(
                &DocumentRef::new(collections::CARTS, "buyer-1"),
                serde_json::json!({"items": "garbage"}),
                WriteMode::Replace,
            )
            .await
            .unwrap();

        let cart = service.current(&buyer()).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_clear_keeps_document() {
        let (service, backend) = service();
        service.add_item(&buyer(), pen()).await.unwrap();
        let cart = service.clear(&buyer()).await.unwrap();
        assert!(cart.is_empty());

        let snap = backend
            .read(&DocumentRef::new(collections::CARTS, "buyer-1"))
            .await
            .unwrap();
        assert!(snap.exists());
        assert_eq!(
            Cart::from_snapshot(snap.body.as_ref()).unwrap(),
            Cart::empty()
        );
    }
}
