//! HTTP route handlers for storefront.
//!
//! The storefront is a JSON API: the web client renders everything, this
//! side owns state and persistence.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Backend reachability check
//!
//! # Auth
//! POST /auth/register          - Create an account, start a session
//! POST /auth/login             - Verify credentials, start a session
//! POST /auth/logout            - End the session
//! GET  /auth/me                - Current identity, if any
//!
//! # Shops (public)
//! GET  /shops                  - Seller directory
//! GET  /shops/{seller_id}      - One shop: profile + catalog
//!
//! # Cart (requires auth)
//! GET    /cart                 - Grouped cart view with checkout links
//! POST   /cart/items           - Add a product to the cart
//! PATCH  /cart/items/{id}      - Set a line's quantity (0 removes)
//! DELETE /cart/items/{id}      - Remove a line
//! DELETE /cart                 - Clear the cart
//! GET    /cart/count           - Badge count
//!
//! # Checkout (requires auth)
//! GET  /checkout/{shop}        - Redirect to the seller's chat deep link
//!
//! # Seller dashboard (requires auth)
//! GET  /seller/profile         - Own profile
//! PUT  /seller/profile         - Merge profile fields
//! GET  /seller/products        - Own catalog
//! POST /seller/products        - Add a product
//! PUT    /seller/products/{id} - Update a product
//! DELETE /seller/products/{id} - Delete a product
//! POST /seller/products/{id}/image - Upload a product image (multipart)
//! ```

pub mod auth;
pub mod cart;
pub mod health;
pub mod seller;
pub mod shops;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the shop directory routes router.
pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shops::index))
        .route("/{seller_id}", get(shops::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{id}", axum::routing::patch(cart::update).delete(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the seller dashboard routes router.
pub fn seller_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(seller::profile).put(seller::save_profile))
        .route("/products", get(seller::products).post(seller::add_product))
        .route(
            "/products/{id}",
            put(seller::update_product).delete(seller::delete_product),
        )
        .route("/products/{id}/image", post(seller::upload_product_image))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Shop directory
        .nest("/shops", shop_routes())
        // Cart
        .nest("/cart", cart_routes())
        // Checkout handoff
        .route("/checkout/{shop}", get(cart::checkout))
        // Seller dashboard
        .nest("/seller", seller_routes())
        // Auth
        .nest("/auth", auth_routes())
}
