//! The buyer cart and its per-seller aggregation.
//!
//! A cart is one document in the hosted store, keyed by buyer identity.
//! Mutations here are pure; persistence and the realtime mirror live in the
//! storefront's cart service. Because checkout hands each seller's order to
//! that seller over chat, the cart is aggregated per shop: every view of a
//! non-empty cart is a list of per-seller order groups with subtotals.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Money, ProductId, SellerName};

/// One line in a buyer's cart.
///
/// Item data is denormalized from the seller's catalog at add time, so the
/// cart renders without further lookups. At most one entry per product id
/// exists in a cart, and `quantity` is at least 1 while the entry exists -
/// setting it to 0 removes the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product this line refers to.
    pub id: ProductId,
    /// Shop name of the seller offering the product.
    pub shop: SellerName,
    /// Product display name.
    pub name: String,
    /// Unit price at the time the item was added.
    pub price: Money,
    /// Product image URL, if the seller uploaded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    /// Number of units. Always >= 1 while the entry exists.
    pub quantity: u32,
}

impl CartItem {
    /// The line total (`price × quantity`).
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// A buyer's cart: an ordered sequence of [`CartItem`].
///
/// Serializes as the cart document body (`{"items": [...]}`). A missing or
/// malformed document decodes to the empty cart via [`Cart::from_snapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart lines in insertion order.
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    /// The empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines (the badge count).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Add an item to the cart.
    ///
    /// If a line with the same product id already exists its quantity is
    /// incremented by 1 and the incoming item's other fields are ignored.
    /// Otherwise the item is appended as a new line with quantity 1.
    pub fn add(&mut self, item: CartItem) {
        if let Some(existing) = self.items.iter_mut().find(|line| line.id == item.id) {
            existing.quantity += 1;
        } else {
            self.items.push(CartItem {
                quantity: 1,
                ..item
            });
        }
    }

    /// Remove the line with the given product id.
    ///
    /// Silently succeeds when no such line exists.
    pub fn remove(&mut self, id: &ProductId) {
        self.items.retain(|line| &line.id != id);
    }

    /// Set the quantity of the line with the given product id.
    ///
    /// A quantity of 0 removes the line. Quantities are not clamped to any
    /// maximum. Lines with other ids are left untouched; an unknown id is
    /// a no-op.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(id);
            return;
        }
        if let Some(line) = self.items.iter_mut().find(|line| &line.id == id) {
            line.quantity = quantity;
        }
    }

    /// Remove all lines.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The total over the entire cart (`Σ price × quantity`).
    #[must_use]
    pub fn grand_total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Partition the cart into per-seller order groups.
    ///
    /// Groups appear in first-occurrence order of each shop name while
    /// iterating the cart, and items keep their cart order within each
    /// group, so every item lands in exactly one group.
    #[must_use]
    pub fn by_seller(&self) -> Vec<SellerOrder> {
        let mut groups: Vec<SellerOrder> = Vec::new();
        for item in &self.items {
            match groups.iter_mut().find(|group| group.shop == item.shop) {
                Some(group) => group.items.push(item.clone()),
                None => groups.push(SellerOrder {
                    shop: item.shop.clone(),
                    items: vec![item.clone()],
                }),
            }
        }
        groups
    }

    /// Decode a cart from a document snapshot body.
    ///
    /// A missing document is the empty cart. A malformed body is an error
    /// so the caller can log it before substituting the empty cart.
    ///
    /// # Errors
    ///
    /// Returns the decode error when the body exists but is not a cart
    /// document.
    pub fn from_snapshot(body: Option<&Value>) -> Result<Self, serde_json::Error> {
        body.map_or_else(|| Ok(Self::empty()), |value| {
            serde_json::from_value(value.clone())
        })
    }

    /// Encode the cart as a document body for persistence.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (it cannot for this type,
    /// but the signature keeps the call sites honest).
    pub fn to_body(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// All of one seller's items in a buyer's cart, ready for checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellerOrder {
    /// The shop these items belong to.
    pub shop: SellerName,
    /// The seller's items, in cart order.
    pub items: Vec<CartItem>,
}

impl SellerOrder {
    /// The subtotal for this seller's group (`Σ price × quantity`).
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

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

    fn cup() -> CartItem {
        CartItem {
            id: ProductId::new("2"),
            shop: SellerName::new("B"),
            name: "Cup".to_owned(),
            price: Money::new(5000),
            img: Some("https://img.example/cup.png".to_owned()),
            quantity: 1,
        }
    }

    #[test]
    fn test_add_same_item_twice_merges_lines() {
        let mut cart = Cart::empty();
        cart.add(pen());
        cart.add(pen());

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
    }

    #[test]
    fn test_add_increments_relative_to_prior_quantity() {
        let mut cart = Cart::empty();
        cart.add(pen());
        cart.set_quantity(&ProductId::new("1"), 5);
        cart.add(pen());
        cart.add(pen());

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 7);
    }

    #[test]
    fn test_add_new_item_starts_at_quantity_one() {
        let mut cart = Cart::empty();
        // Whatever quantity the incoming value carries, a fresh line is 1.
        cart.add(CartItem {
            quantity: 9,
            ..pen()
        });
        assert_eq!(cart.items[0].quantity, 1);
    }

    #[test]
    fn test_set_quantity_zero_equals_remove() {
        let mut with_set = Cart::empty();
        with_set.add(pen());
        with_set.add(cup());

        let mut with_remove = with_set.clone();

        with_set.set_quantity(&ProductId::new("1"), 0);
        with_remove.remove(&ProductId::new("1"));

        assert_eq!(with_set, with_remove);
    }

    #[test]
    fn test_set_quantity_is_not_clamped() {
        let mut cart = Cart::empty();
        cart.add(pen());
        cart.set_quantity(&ProductId::new("1"), 100_000);
        assert_eq!(cart.items[0].quantity, 100_000);
    }

    #[test]
    fn test_set_quantity_unknown_id_is_noop() {
        let mut cart = Cart::empty();
        cart.add(pen());
        let before = cart.clone();
        cart.set_quantity(&ProductId::new("99"), 3);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_unknown_id_leaves_cart_unchanged() {
        let mut cart = Cart::empty();
        cart.add(pen());
        cart.add(cup());
        let before = cart.clone();

        cart.remove(&ProductId::new("99"));

        // Sequence equality, not just length.
        assert_eq!(cart, before);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::empty();
        cart.add(pen());
        cart.add(cup());
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.grand_total(), Money::ZERO);
    }

    #[test]
    fn test_grouping_example_scenario() {
        // cart = [Pen x2 from A, Cup x1 from B]
        let mut cart = Cart::empty();
        cart.add(pen());
        cart.add(pen());
        cart.add(cup());

        let groups = cart.by_seller();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].shop, SellerName::new("A"));
        assert_eq!(groups[0].items.len(), 1);
        assert_eq!(groups[0].items[0].name, "Pen");
        assert_eq!(groups[0].subtotal(), Money::new(4000));
        assert_eq!(groups[1].shop, SellerName::new("B"));
        assert_eq!(groups[1].subtotal(), Money::new(5000));
        assert_eq!(cart.grand_total(), Money::new(9000));
    }

    #[test]
    fn test_grouping_is_a_partition() {
        let mut cart = Cart::empty();
        cart.add(pen());
        cart.add(cup());
        cart.add(CartItem {
            id: ProductId::new("3"),
            shop: SellerName::new("A"),
            name: "Notebook".to_owned(),
            price: Money::new(3000),
            img: None,
            quantity: 1,
        });
        cart.set_quantity(&ProductId::new("3"), 4);

        let groups = cart.by_seller();
        let grouped_count: usize = groups.iter().map(|g| g.items.len()).sum();
        assert_eq!(grouped_count, cart.items.len());

        let subtotal_sum: Money = groups.iter().map(SellerOrder::subtotal).sum();
        assert_eq!(subtotal_sum, cart.grand_total());

        // First-seen order of shops, cart order within each group.
        assert_eq!(groups[0].shop, SellerName::new("A"));
        assert_eq!(groups[0].items[0].name, "Pen");
        assert_eq!(groups[0].items[1].name, "Notebook");
        assert_eq!(groups[1].shop, SellerName::new("B"));
    }

    #[test]
    fn test_empty_cart_grouping() {
        let cart = Cart::empty();
        assert!(cart.by_seller().is_empty());
        assert_eq!(cart.grand_total(), Money::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let mut cart = Cart::empty();
        cart.add(pen());
        cart.add(pen());
        cart.add(cup());
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_from_snapshot_missing_is_empty() {
        let cart = Cart::from_snapshot(None).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_from_snapshot_decodes_document() {
        let body = serde_json::json!({
            "items": [
                {"id": "1", "shop": "A", "name": "Pen", "price": 2000, "quantity": 2}
            ]
        });
        let cart = Cart::from_snapshot(Some(&body)).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].price, Money::new(2000));
        assert_eq!(cart.items[0].img, None);
    }

    #[test]
    fn test_from_snapshot_malformed_is_error() {
        let body = serde_json::json!({"items": "not-a-list"});
        assert!(Cart::from_snapshot(Some(&body)).is_err());
    }

    #[test]
    fn test_body_roundtrip() {
        let mut cart = Cart::empty();
        cart.add(pen());
        cart.add(cup());
        let body = cart.to_body().unwrap();
        let back = Cart::from_snapshot(Some(&body)).unwrap();
        assert_eq!(back, cart);
    }
}
