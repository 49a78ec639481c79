//! Admin panel routes: tabular views and moderation.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness check
//! GET    /sellers                         - Sellers table
//! GET    /sellers/{id}                    - One seller: profile + catalog
//! GET    /products                        - All products across catalogs
//! GET    /carts                           - Carts table (buyer, items, total)
//! DELETE /products/{seller_id}/{product_id} - Remove a product (moderation)
//! ```
//!
//! Everything reads the store directly; the admin panel has no caching
//! layer, stale tables are worse than slow ones here.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Serialize;
use tracing::{instrument, warn};

use sokoni_backend::{Backend, DocumentRef, WriteMode, collections};
use sokoni_core::cart::Cart;
use sokoni_core::catalog::{Catalog, Product, SellerProfile};
use sokoni_core::{ProductId, SellerId};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// One row of the sellers table.
#[derive(Debug, Serialize)]
pub struct SellerRow {
    pub seller_id: String,
    pub shop_name: String,
    pub whatsapp: Option<String>,
    pub location: String,
    pub product_count: usize,
}

/// One row of the products table.
#[derive(Debug, Serialize)]
pub struct ProductRow {
    pub seller_id: String,
    pub product_id: ProductId,
    pub name: String,
    pub price: String,
    pub has_image: bool,
}

/// One row of the carts table.
#[derive(Debug, Serialize)]
pub struct CartRow {
    pub buyer_id: String,
    pub lines: usize,
    pub item_count: u32,
    pub grand_total: String,
}

/// One seller with profile and catalog.
#[derive(Debug, Serialize)]
pub struct SellerDetail {
    pub seller_id: String,
    pub profile: SellerProfile,
    pub products: Vec<Product>,
}

async fn load_catalogs(state: &AppState) -> Result<Vec<(String, Catalog)>> {
    let entries = state.backend().list(collections::CATALOGS).await?;
    let mut catalogs = Vec::with_capacity(entries.len());
    for (key, snapshot) in entries {
        match Catalog::from_snapshot(snapshot.body.as_ref()) {
            Ok(catalog) => catalogs.push((key, catalog)),
            Err(error) => warn!(seller = %key, %error, "skipping malformed catalog"),
        }
    }
    Ok(catalogs)
}

/// Sellers table.
#[instrument(skip(state))]
pub async fn sellers(State(state): State<AppState>) -> Result<Json<Vec<SellerRow>>> {
    let catalogs = load_catalogs(&state).await?;
    let entries = state.backend().list(collections::SELLERS).await?;

    let mut rows = Vec::with_capacity(entries.len());
    for (key, snapshot) in entries {
        let Some(body) = snapshot.body else { continue };
        let profile: SellerProfile = match serde_json::from_value(body) {
            Ok(profile) => profile,
            Err(error) => {
                warn!(seller = %key, %error, "skipping malformed seller profile");
                continue;
            }
        };
        let product_count = catalogs
            .iter()
            .find(|(seller, _)| seller == &key)
            .map_or(0, |(_, catalog)| catalog.products.len());
        rows.push(SellerRow {
            seller_id: key,
            shop_name: profile.shop_name.to_string(),
            whatsapp: profile.whatsapp.map(|p| p.to_string()),
            location: profile.location,
            product_count,
        });
    }
    Ok(Json(rows))
}

/// One seller: profile plus catalog.
#[instrument(skip(state))]
pub async fn seller(
    State(state): State<AppState>,
    Path(seller_id): Path<SellerId>,
) -> Result<Json<SellerDetail>> {
    let doc = DocumentRef::new(collections::SELLERS, seller_id.as_str());
    let snapshot = state.backend().read(&doc).await?;
    let profile: SellerProfile = snapshot
        .body
        .and_then(|body| serde_json::from_value(body).ok())
        .ok_or_else(|| AppError::NotFound(format!("No such seller: {seller_id}")))?;

    let catalog_doc = DocumentRef::new(collections::CATALOGS, seller_id.as_str());
    let catalog_snapshot = state.backend().read(&catalog_doc).await?;
    let catalog = Catalog::from_snapshot(catalog_snapshot.body.as_ref()).unwrap_or_else(|error| {
        warn!(seller = %seller_id, %error, "catalog is malformed, showing empty");
        Catalog::default()
    });

    Ok(Json(SellerDetail {
        seller_id: seller_id.into_inner(),
        profile,
        products: catalog.products,
    }))
}

/// All products, flattened across catalogs.
#[instrument(skip(state))]
pub async fn products(State(state): State<AppState>) -> Result<Json<Vec<ProductRow>>> {
    let currency = &state.config().currency;
    let mut rows = Vec::new();
    for (seller_id, catalog) in load_catalogs(&state).await? {
        for product in catalog.products {
            rows.push(ProductRow {
                seller_id: seller_id.clone(),
                product_id: product.id,
                name: product.name,
                price: format!("{} {}", currency, product.price.grouped()),
                has_image: product.image.is_some(),
            });
        }
    }
    Ok(Json(rows))
}

/// Carts table.
#[instrument(skip(state))]
pub async fn carts(State(state): State<AppState>) -> Result<Json<Vec<CartRow>>> {
    let currency = &state.config().currency;
    let entries = state.backend().list(collections::CARTS).await?;
    let mut rows = Vec::with_capacity(entries.len());
    for (buyer_id, snapshot) in entries {
        let cart = match Cart::from_snapshot(snapshot.body.as_ref()) {
            Ok(cart) => cart,
            Err(error) => {
                warn!(buyer = %buyer_id, %error, "skipping malformed cart");
                continue;
            }
        };
        rows.push(CartRow {
            buyer_id,
            lines: cart.items.len(),
            item_count: cart.item_count(),
            grand_total: format!("{} {}", currency, cart.grand_total().grouped()),
        });
    }
    Ok(Json(rows))
}

/// Remove a product from a seller's catalog (moderation).
#[instrument(skip(state))]
pub async fn remove_product(
    State(state): State<AppState>,
    Path((seller_id, product_id)): Path<(SellerId, ProductId)>,
) -> Result<StatusCode> {
    let doc = DocumentRef::new(collections::CATALOGS, seller_id.as_str());
    let snapshot = state.backend().read(&doc).await?;
    let mut catalog = Catalog::from_snapshot(snapshot.body.as_ref())
        .map_err(|_| AppError::NotFound(format!("No catalog for seller {seller_id}")))?;

    if !catalog.delete(&product_id) {
        return Err(AppError::NotFound(format!("No such product: {product_id}")));
    }

    let body = catalog.to_body().map_err(sokoni_backend::StoreError::from)?;
    state
        .backend()
        .write(&doc, body, WriteMode::Replace)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Liveness health check endpoint.
pub async fn health() -> &'static str {
    "ok"
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/sellers", get(sellers))
        .route("/sellers/{id}", get(seller))
        .route("/products", get(products))
        .route("/carts", get(carts))
        .route(
            "/products/{seller_id}/{product_id}",
            axum::routing::delete(remove_product),
        )
}
