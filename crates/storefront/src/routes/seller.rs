//! Seller dashboard handlers.
//!
//! All routes operate on the signed-in account's own profile and catalog;
//! there is no cross-seller access through this surface.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use sokoni_backend::Backend;
use sokoni_core::catalog::{Product, SellerProfile, SellerProfileUpdate};
use sokoni_core::{Money, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::catalog::NewProduct;
use crate::state::AppState;

/// Own profile.
#[instrument(skip(state, user))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<SellerProfile>> {
    let profile = state
        .catalog()
        .profile(&user.seller_id())
        .await?
        .ok_or_else(|| AppError::NotFound("No shop profile yet".to_owned()))?;
    Ok(Json(profile))
}

/// Merge profile fields; unset fields keep their prior values.
#[instrument(skip(state, user, update))]
pub async fn save_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(update): Json<SellerProfileUpdate>,
) -> Result<Json<SellerProfile>> {
    let merged = state
        .catalog()
        .save_profile(&user.seller_id(), update)
        .await?;
    Ok(Json(merged))
}

/// Own catalog, raw (prices as integers, for form prefill).
#[instrument(skip(state, user))]
pub async fn products(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Product>>> {
    let catalog = state.catalog().catalog(&user.seller_id()).await?;
    Ok(Json(catalog.products))
}

/// New product fields.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

fn validate(form: &ProductRequest) -> Result<()> {
    if form.name.trim().is_empty() {
        return Err(AppError::BadRequest("Product name is required".to_owned()));
    }
    if form.price <= 0 {
        return Err(AppError::BadRequest(
            "Price must be greater than zero".to_owned(),
        ));
    }
    Ok(())
}

/// Add a product.
#[instrument(skip(state, user, form), fields(name = %form.name))]
pub async fn add_product(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(form): Json<ProductRequest>,
) -> Result<impl IntoResponse> {
    validate(&form)?;
    let product = state
        .catalog()
        .add_product(
            &user.seller_id(),
            NewProduct {
                name: form.name,
                price: Money::new(form.price),
                description: form.description,
                image: form.image,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product in place.
#[instrument(skip(state, user, form))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
    Json(form): Json<ProductRequest>,
) -> Result<Json<Product>> {
    validate(&form)?;
    let product = state
        .catalog()
        .update_product(
            &user.seller_id(),
            Product {
                id,
                name: form.name,
                price: Money::new(form.price),
                description: form.description,
                image: form.image,
            },
        )
        .await?;
    Ok(Json(product))
}

/// Delete a product.
#[instrument(skip(state, user))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    state
        .catalog()
        .delete_product(&user.seller_id(), &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Upload a product image (multipart, first file field wins).
///
/// The blob goes to the backend's media storage; the product keeps only
/// the returned URL.
#[instrument(skip(state, user, multipart))]
pub async fn upload_product_image(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
    mut multipart: Multipart,
) -> Result<Json<Product>> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
        .ok_or_else(|| AppError::BadRequest("No file in upload".to_owned()))?;

    let file_name = field
        .file_name()
        .map_or_else(|| "image".to_owned(), sanitize_file_name);
    let content_type = field
        .content_type()
        .map_or_else(|| "application/octet-stream".to_owned(), str::to_owned);
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_owned()));
    }

    let path = format!("products/{}/{}/{}", user.seller_id(), id, file_name);
    let url = state
        .backend()
        .store_media(&path, bytes.to_vec(), &content_type)
        .await?;

    let product = state
        .catalog()
        .set_product_image(&user.seller_id(), &id, url)
        .await?;
    Ok(Json(product))
}

/// Keep uploaded file names path-safe.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "image".to_owned()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("soap.png"), "soap.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name("my photo (1).jpg"), "my_photo__1_.jpg");
        assert_eq!(sanitize_file_name("..."), "image");
    }

    #[test]
    fn test_validate_rejects_bad_products() {
        let empty_name = ProductRequest {
            name: "  ".to_owned(),
            price: 100,
            description: String::new(),
            image: None,
        };
        assert!(validate(&empty_name).is_err());

        let free = ProductRequest {
            name: "Soap".to_owned(),
            price: 0,
            description: String::new(),
            image: None,
        };
        assert!(validate(&free).is_err());
    }
}
