//! Cart route handlers.
//!
//! All cart state lives in the buyer's cart document; these handlers go
//! through the cart service so every answer reflects either the mutation
//! just applied or the last-known-good mirror. The cart view is grouped
//! per seller, each group carrying its chat checkout link when the shop
//! has a registered number.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use sokoni_core::cart::{Cart, CartItem, SellerOrder};
use sokoni_core::checkout::checkout_link;
use sokoni_core::{Money, ProductId, SellerId, SellerName};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
    pub img: Option<String>,
}

/// One seller's group in the cart view.
#[derive(Debug, Clone, Serialize)]
pub struct SellerGroupView {
    pub shop: SellerName,
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    /// Chat deep link for this group; `null` when the shop has no
    /// registered number.
    pub checkout_url: Option<String>,
}

/// The whole cart, grouped per seller.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub groups: Vec<SellerGroupView>,
    pub grand_total: String,
    pub item_count: u32,
}

fn format_price(amount: Money, currency: &str) -> String {
    format!("{} {}", currency, amount.grouped())
}

fn item_view(item: &CartItem, currency: &str) -> CartItemView {
    CartItemView {
        id: item.id.clone(),
        name: item.name.clone(),
        quantity: item.quantity,
        price: format_price(item.price, currency),
        line_total: format_price(item.line_total(), currency),
        img: item.img.clone(),
    }
}

async fn cart_view(state: &AppState, cart: &Cart) -> CartView {
    let currency = &state.config().currency;
    let mut groups = Vec::new();
    for group in cart.by_seller() {
        let checkout_url = group_checkout_url(state, &group).await;
        groups.push(SellerGroupView {
            items: group.items.iter().map(|i| item_view(i, currency)).collect(),
            subtotal: format_price(group.subtotal(), currency),
            shop: group.shop,
            checkout_url,
        });
    }
    CartView {
        groups,
        grand_total: format_price(cart.grand_total(), currency),
        item_count: cart.item_count(),
    }
}

/// Resolve a group's checkout link from the seller's registered number.
///
/// Unresolvable shops (no profile, no number) are not an error in the
/// cart view; the group just renders without a handoff link.
async fn group_checkout_url(state: &AppState, group: &SellerOrder) -> Option<String> {
    let (_, profile) = match state.catalog().find_by_shop_name(&group.shop).await {
        Ok(hit) => hit?,
        Err(error) => {
            debug!(shop = %group.shop, %error, "shop lookup failed, omitting checkout link");
            return None;
        }
    };
    let phone = profile.whatsapp?;
    match checkout_link(
        &state.config().chat_domain,
        &phone,
        group,
        &state.config().currency,
    ) {
        Ok(url) => Some(url.into()),
        Err(error) => {
            debug!(shop = %group.shop, %error, "could not build checkout link");
            None
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub seller_id: SellerId,
    pub product_id: ProductId,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Grouped cart view.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartView>> {
    let cart = state.carts().current(&user.buyer_id()).await?;
    Ok(Json(cart_view(&state, &cart).await))
}

/// Add a product to the cart.
///
/// The item is denormalized from the seller's catalog server-side; the
/// client only names the product.
#[instrument(skip(state, user, form), fields(product = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(form): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let catalog = state.catalog().catalog(&form.seller_id).await?;
    let product = catalog
        .find(&form.product_id)
        .ok_or_else(|| AppError::NotFound(format!("No such product: {}", form.product_id)))?;

    let profile = state
        .catalog()
        .profile(&form.seller_id)
        .await?
        .ok_or_else(|| AppError::Conflict("This seller has no shop profile yet".to_owned()))?;

    let item = CartItem {
        id: product.id.clone(),
        shop: profile.shop_name,
        name: product.name.clone(),
        price: product.price,
        img: product.image.clone(),
        quantity: 1,
    };

    let cart = state.carts().add_item(&user.buyer_id(), item).await?;
    Ok(Json(cart_view(&state, &cart).await))
}

/// Set a line's quantity (0 removes the line).
#[instrument(skip(state, user))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
    Json(form): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let cart = state
        .carts()
        .set_quantity(&user.buyer_id(), &id, form.quantity)
        .await?;
    Ok(Json(cart_view(&state, &cart).await))
}

/// Remove a line. A product that is not in the cart is a no-op.
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<Json<CartView>> {
    let cart = state.carts().remove_item(&user.buyer_id(), &id).await?;
    Ok(Json(cart_view(&state, &cart).await))
}

/// Clear the cart.
#[instrument(skip(state, user))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartView>> {
    let cart = state.carts().clear(&user.buyer_id()).await?;
    Ok(Json(cart_view(&state, &cart).await))
}

/// Badge count.
#[derive(Debug, Serialize)]
pub struct CartCountView {
    pub count: u32,
}

/// Total unit count for the badge.
#[instrument(skip(state, user))]
pub async fn count(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartCountView>> {
    let cart = state.carts().current(&user.buyer_id()).await?;
    Ok(Json(CartCountView {
        count: cart.item_count(),
    }))
}

/// Redirect to one seller's chat deep link.
///
/// Opened by the client in a new browsing context; nothing is read back.
#[instrument(skip(state, user))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(shop): Path<SellerName>,
) -> Result<Response> {
    let cart = state.carts().current(&user.buyer_id()).await?;
    let group = cart
        .by_seller()
        .into_iter()
        .find(|group| group.shop == shop)
        .ok_or_else(|| AppError::NotFound(format!("Nothing in the cart from {shop}")))?;

    let (_, profile) = state
        .catalog()
        .find_by_shop_name(&shop)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("{shop} has no shop profile")))?;
    let phone = profile.whatsapp.ok_or_else(|| {
        AppError::Conflict(format!("{shop} has no registered contact number"))
    })?;

    let url = checkout_link(
        &state.config().chat_domain,
        &phone,
        &group,
        &state.config().currency,
    )
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Redirect::to(url.as_str()).into_response())
}
