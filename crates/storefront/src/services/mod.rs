//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - Per-buyer cart state, mirrored through document watches
//! - `catalog` - Seller profiles and product catalogs

pub mod cart;
pub mod catalog;
