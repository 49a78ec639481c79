//! Seller profiles and product catalogs.
//!
//! A seller's whole catalog is a single document (`catalogs/{seller}`)
//! holding the ordered product list; every mutation re-persists the full
//! list. The profile is a second document (`sellers/{seller}`) updated
//! with field-wise merge semantics.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Money, PhoneNumber, ProductId, SellerName};

/// A product in a seller's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Generated document-unique id.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Image URL, if one was uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// The ordered product list of one seller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Products in insertion order.
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Catalog {
    /// Append a product to the catalog.
    pub fn add(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Replace the product with the same id, returning whether a product
    /// was found.
    pub fn update(&mut self, product: Product) -> bool {
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => {
                *existing = product;
                true
            }
            None => false,
        }
    }

    /// Remove the product with the given id, returning whether a product
    /// was found.
    pub fn delete(&mut self, id: &ProductId) -> bool {
        let before = self.products.len();
        self.products.retain(|p| &p.id != id);
        self.products.len() != before
    }

    /// Find a product by id.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Decode a catalog from a document snapshot body.
    ///
    /// A missing document is the empty catalog.
    ///
    /// # Errors
    ///
    /// Returns the decode error when the body exists but is not a catalog
    /// document.
    pub fn from_snapshot(body: Option<&Value>) -> Result<Self, serde_json::Error> {
        body.map_or_else(|| Ok(Self::default()), |value| {
            serde_json::from_value(value.clone())
        })
    }

    /// Encode the catalog as a document body for persistence.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_body(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// A seller's public profile.
///
/// `whatsapp` is the number checkout deep links are built from; a profile
/// without it can sell, but buyers get no checkout handoff for that shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerProfile {
    /// Shop display name shown on the storefront and carried on cart items.
    pub shop_name: SellerName,
    /// Registered WhatsApp contact number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<PhoneNumber>,
    /// Shop description.
    #[serde(default)]
    pub description: String,
    /// Physical location, free-form.
    #[serde(default)]
    pub location: String,
    /// Profile image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    /// Banner image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_image: Option<String>,
}

/// A partial profile update.
///
/// Fields left as `None` retain their prior value; the merge is field-wise
/// and shallow, mirroring a merge-mode document write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerProfileUpdate {
    /// New shop name, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<SellerName>,
    /// New WhatsApp number, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<PhoneNumber>,
    /// New description, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New location, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// New profile image URL, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    /// New banner image URL, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_image: Option<String>,
}

impl SellerProfile {
    /// Apply a partial update, keeping prior values for unset fields.
    pub fn apply(&mut self, update: SellerProfileUpdate) {
        if let Some(shop_name) = update.shop_name {
            self.shop_name = shop_name;
        }
        if let Some(whatsapp) = update.whatsapp {
            self.whatsapp = Some(whatsapp);
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(profile_image) = update.profile_image {
            self.profile_image = Some(profile_image);
        }
        if let Some(banner_image) = update.banner_image {
            self.banner_image = Some(banner_image);
        }
    }
}
