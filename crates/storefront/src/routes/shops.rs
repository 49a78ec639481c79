//! Shop directory handlers (public storefront browse).

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use sokoni_core::catalog::{Product, SellerProfile};
use sokoni_core::{SellerId, SellerName};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Directory entry for one shop.
#[derive(Debug, Serialize)]
pub struct ShopView {
    pub seller_id: SellerId,
    pub shop_name: SellerName,
    pub description: String,
    pub location: String,
    pub profile_image: Option<String>,
    pub banner_image: Option<String>,
}

impl ShopView {
    fn new(seller_id: SellerId, profile: SellerProfile) -> Self {
        Self {
            seller_id,
            shop_name: profile.shop_name,
            description: profile.description,
            location: profile.location,
            profile_image: profile.profile_image,
            banner_image: profile.banner_image,
        }
    }
}

/// Product display data for shop pages.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: sokoni_core::ProductId,
    pub name: String,
    pub price: String,
    pub description: String,
    pub image: Option<String>,
}

/// One shop with its catalog.
#[derive(Debug, Serialize)]
pub struct ShopDetailView {
    #[serde(flatten)]
    pub shop: ShopView,
    pub products: Vec<ProductView>,
}

/// Seller directory.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ShopView>>> {
    let shops = state
        .catalog()
        .shops()
        .await?
        .into_iter()
        .map(|(seller_id, profile)| ShopView::new(seller_id, profile))
        .collect();
    Ok(Json(shops))
}

/// One shop: profile and catalog.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(seller_id): Path<SellerId>,
) -> Result<Json<ShopDetailView>> {
    let profile = state
        .catalog()
        .profile(&seller_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No such shop: {seller_id}")))?;
    let catalog = state.catalog().catalog(&seller_id).await?;

    let currency = &state.config().currency;
    let products = catalog
        .products
        .into_iter()
        .map(|product: Product| ProductView {
            id: product.id,
            name: product.name,
            price: format!("{} {}", currency, product.price.grouped()),
            description: product.description,
            image: product.image,
        })
        .collect();

    Ok(Json(ShopDetailView {
        shop: ShopView::new(seller_id, profile),
        products,
    }))
}
