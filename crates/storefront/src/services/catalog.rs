//! Catalog service: seller profiles and product lists.
//!
//! A seller's whole catalog is one document; every product mutation
//! re-persists the full list (last writer wins). Profile saves are
//! merge-mode writes, so unspecified fields keep their prior values.
//!
//! Checkout needs to find a seller's profile given only the shop name a
//! cart item carries. There is no enforced relation between the two, so
//! resolution scans the seller directory; hits are cached briefly.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;
use tracing::{instrument, warn};

use sokoni_backend::{Backend, DocumentRef, StoreError, WriteMode, collections};
use sokoni_core::catalog::{Catalog, Product, SellerProfile, SellerProfileUpdate};
use sokoni_core::{Money, ProductId, SellerId, SellerName};

/// How long directory lookups (shop name -> profile) stay cached.
const LOOKUP_TTL: Duration = Duration::from_secs(60);

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No product with this id in the seller's catalog.
    #[error("no product {0} in catalog")]
    ProductNotFound(ProductId),

    /// A profile cannot be created without a shop name.
    #[error("shop name is required")]
    MissingShopName,
}

/// Fields for a product being added to a catalog.
#[derive(Debug, Clone)]
pub struct NewProduct {
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Free-form description.
    pub description: String,
    /// Image URL, when already hosted somewhere.
    pub image: Option<String>,
}

/// Seller profiles and product catalogs over the document store.
#[derive(Clone)]
pub struct CatalogService {
    backend: Arc<dyn Backend>,
    shop_lookup: Cache<String, Option<Arc<(SellerId, SellerProfile)>>>,
}

impl CatalogService {
    /// Create the service around a backend handle.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let shop_lookup = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(LOOKUP_TTL)
            .build();
        Self {
            backend,
            shop_lookup,
        }
    }

    fn profile_doc(seller: &SellerId) -> DocumentRef {
        DocumentRef::new(collections::SELLERS, seller.as_str())
    }

    fn catalog_doc(seller: &SellerId) -> DocumentRef {
        DocumentRef::new(collections::CATALOGS, seller.as_str())
    }

    // =========================================================================
    // Profiles
    // =========================================================================

    /// Read a seller's profile.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` when the store is unreachable.
    #[instrument(skip(self))]
    pub async fn profile(&self, seller: &SellerId) -> Result<Option<SellerProfile>, CatalogError> {
        let snapshot = self.backend.read(&Self::profile_doc(seller)).await?;
        let Some(body) = snapshot.body else {
            return Ok(None);
        };
        match serde_json::from_value::<SellerProfile>(body) {
            Ok(profile) => Ok(Some(profile)),
            Err(error) => {
                warn!(seller = %seller, %error, "seller profile is malformed, treating as absent");
                Ok(None)
            }
        }
    }

    /// Merge a partial update into a seller's profile.
    ///
    /// Unset fields keep their prior values. The first save must carry a
    /// shop name, since that is what buyers (and checkout) see.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::MissingShopName` when creating a profile
    /// without a shop name, or `CatalogError::Store` on store failure.
    #[instrument(skip(self, update))]
    pub async fn save_profile(
        &self,
        seller: &SellerId,
        update: SellerProfileUpdate,
    ) -> Result<SellerProfile, CatalogError> {
        let merged = match self.profile(seller).await? {
            Some(mut existing) => {
                existing.apply(update.clone());
                existing
            }
            None => SellerProfile {
                shop_name: update
                    .shop_name
                    .clone()
                    .ok_or(CatalogError::MissingShopName)?,
                whatsapp: update.whatsapp.clone(),
                description: update.description.clone().unwrap_or_default(),
                location: update.location.clone().unwrap_or_default(),
                profile_image: update.profile_image.clone(),
                banner_image: update.banner_image.clone(),
            },
        };

        // Merge-mode write: only the provided fields travel.
        let patch = serde_json::to_value(&update).map_err(StoreError::from)?;
        self.backend
            .write(&Self::profile_doc(seller), patch, WriteMode::Merge)
            .await?;

        self.shop_lookup
            .invalidate(merged.shop_name.as_str())
            .await;
        Ok(merged)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Read a seller's catalog.
    ///
    /// A malformed catalog document is logged and treated as empty.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` when the store is unreachable.
    #[instrument(skip(self))]
    pub async fn catalog(&self, seller: &SellerId) -> Result<Catalog, CatalogError> {
        let snapshot = self.backend.read(&Self::catalog_doc(seller)).await?;
        match Catalog::from_snapshot(snapshot.body.as_ref()) {
            Ok(catalog) => Ok(catalog),
            Err(error) => {
                warn!(seller = %seller, %error, "catalog document is malformed, treating as empty");
                Ok(Catalog::default())
            }
        }
    }

    /// Add a product and re-persist the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` when the store is unreachable.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn add_product(
        &self,
        seller: &SellerId,
        new: NewProduct,
    ) -> Result<Product, CatalogError> {
        let mut catalog = self.catalog(seller).await?;
        let product = Product {
            id: ProductId::generate(),
            name: new.name,
            price: new.price,
            description: new.description,
            image: new.image,
        };
        catalog.add(product.clone());
        self.persist_catalog(seller, &catalog).await?;
        Ok(product)
    }

    /// Replace a product in place and re-persist the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` when the id is not in the
    /// catalog, or `CatalogError::Store` on store failure.
    #[instrument(skip(self, product), fields(product = %product.id))]
    pub async fn update_product(
        &self,
        seller: &SellerId,
        product: Product,
    ) -> Result<Product, CatalogError> {
        let mut catalog = self.catalog(seller).await?;
        if !catalog.update(product.clone()) {
            return Err(CatalogError::ProductNotFound(product.id));
        }
        self.persist_catalog(seller, &catalog).await?;
        Ok(product)
    }

    /// Delete a product and re-persist the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` when the id is not in the
    /// catalog, or `CatalogError::Store` on store failure.
    #[instrument(skip(self))]
    pub async fn delete_product(
        &self,
        seller: &SellerId,
        product: &ProductId,
    ) -> Result<(), CatalogError> {
        let mut catalog = self.catalog(seller).await?;
        if !catalog.delete(product) {
            return Err(CatalogError::ProductNotFound(product.clone()));
        }
        self.persist_catalog(seller, &catalog).await
    }

    /// Attach an uploaded image URL to a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` when the id is not in the
    /// catalog, or `CatalogError::Store` on store failure.
    #[instrument(skip(self, url))]
    pub async fn set_product_image(
        &self,
        seller: &SellerId,
        product: &ProductId,
        url: String,
    ) -> Result<Product, CatalogError> {
        let mut catalog = self.catalog(seller).await?;
        let Some(existing) = catalog.find(product) else {
            return Err(CatalogError::ProductNotFound(product.clone()));
        };
        let updated = Product {
            image: Some(url),
            ..existing.clone()
        };
        catalog.update(updated.clone());
        self.persist_catalog(seller, &catalog).await?;
        Ok(updated)
    }

    async fn persist_catalog(
        &self,
        seller: &SellerId,
        catalog: &Catalog,
    ) -> Result<(), CatalogError> {
        let body = catalog.to_body().map_err(StoreError::from)?;
        self.backend
            .write(&Self::catalog_doc(seller), body, WriteMode::Replace)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Directory
    // =========================================================================

    /// All seller profiles, for the storefront directory.
    ///
    /// Malformed profiles are skipped with a warning rather than failing
    /// the whole listing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` when the store is unreachable.
    #[instrument(skip(self))]
    pub async fn shops(&self) -> Result<Vec<(SellerId, SellerProfile)>, CatalogError> {
        let entries = self.backend.list(collections::SELLERS).await?;
        let mut shops = Vec::with_capacity(entries.len());
        for (key, snapshot) in entries {
            let Some(body) = snapshot.body else { continue };
            match serde_json::from_value::<SellerProfile>(body) {
                Ok(profile) => shops.push((SellerId::new(key), profile)),
                Err(error) => {
                    warn!(seller = %key, %error, "skipping malformed seller profile");
                }
            }
        }
        Ok(shops)
    }

    /// Resolve a shop name to its seller and profile.
    ///
    /// Cart items carry shop names, not seller ids, so checkout resolves
    /// through the directory. Results (including misses) are cached for
    /// [`LOOKUP_TTL`].
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` when the store is unreachable.
    #[instrument(skip(self))]
    pub async fn find_by_shop_name(
        &self,
        shop: &SellerName,
    ) -> Result<Option<(SellerId, SellerProfile)>, CatalogError> {
        if let Some(cached) = self.shop_lookup.get(shop.as_str()).await {
            return Ok(cached.map(|hit| (*hit).clone()));
        }

        let hit = self
            .shops()
            .await?
            .into_iter()
            .find(|(_, profile)| &profile.shop_name == shop)
            .map(Arc::new);

        self.shop_lookup
            .insert(shop.as_str().to_owned(), hit.clone())
            .await;
        Ok(hit.map(|hit| (*hit).clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sokoni_backend::MemoryBackend;
    use sokoni_core::PhoneNumber;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(MemoryBackend::new()))
    }

    fn seller() -> SellerId {
        SellerId::new("s-1")
    }

    fn profile_update(shop: &str) -> SellerProfileUpdate {
        SellerProfileUpdate {
            shop_name: Some(SellerName::new(shop)),
            whatsapp: Some(PhoneNumber::parse("+256772123456").unwrap()),
            description: Some("Crafts".to_owned()),
            location: Some("Kampala".to_owned()),
            ..SellerProfileUpdate::default()
        }
    }

    #[tokio::test]
    async fn test_profile_create_requires_shop_name() {
        let service = service();
        let result = service
            .save_profile(&seller(), SellerProfileUpdate::default())
            .await;
        assert!(matches!(result, Err(CatalogError::MissingShopName)));
    }

    #[tokio::test]
    async fn test_profile_merge_keeps_prior_fields() {
        let service = service();
        service
            .save_profile(&seller(), profile_update("Kampala Crafts"))
            .await
            .unwrap();

        // Partial update: only the description travels.
        let merged = service
            .save_profile(
                &seller(),
                SellerProfileUpdate {
                    description: Some("Crafts and decor".to_owned()),
                    ..SellerProfileUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(merged.shop_name, SellerName::new("Kampala Crafts"));
        assert_eq!(merged.description, "Crafts and decor");
        assert!(merged.whatsapp.is_some());

        let stored = service.profile(&seller()).await.unwrap().unwrap();
        assert_eq!(stored, merged);
    }

    #[tokio::test]
    async fn test_product_crud_re_persists_whole_catalog() {
        let service = service();
        let created = service
            .add_product(
                &seller(),
                NewProduct {
                    name: "Shea Soap".to_owned(),
                    price: Money::new(8000),
                    description: String::new(),
                    image: None,
                },
            )
            .await
            .unwrap();

        let mut renamed = created.clone();
        renamed.name = "Shea Butter Soap".to_owned();
        service.update_product(&seller(), renamed.clone()).await.unwrap();

        let catalog = service.catalog(&seller()).await.unwrap();
        assert_eq!(catalog.products, vec![renamed.clone()]);

        service.delete_product(&seller(), &renamed.id).await.unwrap();
        assert!(service.catalog(&seller()).await.unwrap().products.is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_product_is_not_found() {
        let service = service();
        let ghost = Product {
            id: ProductId::new("ghost"),
            name: "Ghost".to_owned(),
            price: Money::new(1),
            description: String::new(),
            image: None,
        };
        assert!(matches!(
            service.update_product(&seller(), ghost).await,
            Err(CatalogError::ProductNotFound(_))
        ));
        assert!(matches!(
            service.delete_product(&seller(), &ProductId::new("ghost")).await,
            Err(CatalogError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_find_by_shop_name() {
        let service = service();
        service
            .save_profile(&seller(), profile_update("Kampala Crafts"))
            .await
            .unwrap();

        let hit = service
            .find_by_shop_name(&SellerName::new("Kampala Crafts"))
            .await
            .unwrap();
        assert_eq!(hit.unwrap().0, seller());

        let miss = service
            .find_by_shop_name(&SellerName::new("No Such Shop"))
            .await
            .unwrap();
        assert!(miss.is_none());
    }
}
