//! Manage the local demo data file.
//!
//! The demo/"become a seller" flow runs the storefront against a JSON
//! data file instead of the hosted store (`SOKONI_BACKEND=local`). These
//! commands create, inspect, and reset that file.

use std::path::PathBuf;

use tracing::{info, warn};

use sokoni_backend::{Backend, BackendConfig, DocumentRef, WriteMode, collections};
use sokoni_core::catalog::{Catalog, Product, SellerProfile};
use sokoni_core::{Money, PhoneNumber, ProductId, SellerName};

fn data_file() -> PathBuf {
    dotenvy::dotenv().ok();
    std::env::var("SOKONI_DATA_FILE")
        .map_or_else(|_| PathBuf::from("data/sokoni.json"), PathBuf::from)
}

async fn open_local() -> Result<std::sync::Arc<dyn Backend>, Box<dyn std::error::Error>> {
    let config = BackendConfig::Local {
        data_file: data_file(),
    };
    Ok(config.connect().await?)
}

/// Create the demo data file with a small starter marketplace.
///
/// # Errors
///
/// Returns an error if the data file cannot be created.
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let path = data_file();
    if path.exists() {
        warn!(path = %path.display(), "demo data file already exists, leaving it alone");
        return Ok(());
    }

    let backend = open_local().await?;

    let profile = SellerProfile {
        shop_name: SellerName::new("Demo Shop"),
        whatsapp: PhoneNumber::parse("+256700000001").ok(),
        description: "A starter shop to play with".to_owned(),
        location: "Kampala".to_owned(),
        profile_image: None,
        banner_image: None,
    };
    backend
        .write(
            &DocumentRef::new(collections::SELLERS, "demo-seller"),
            serde_json::to_value(&profile)?,
            WriteMode::Replace,
        )
        .await?;

    let mut catalog = Catalog::default();
    catalog.add(Product {
        id: ProductId::generate(),
        name: "Handwoven Basket".to_owned(),
        price: Money::new(25_000),
        description: "Palm leaf, medium size".to_owned(),
        image: None,
    });
    catalog.add(Product {
        id: ProductId::generate(),
        name: "Shea Soap".to_owned(),
        price: Money::new(8000),
        description: "Handmade, unscented".to_owned(),
        image: None,
    });
    backend
        .write(
            &DocumentRef::new(collections::CATALOGS, "demo-seller"),
            catalog.to_body()?,
            WriteMode::Replace,
        )
        .await?;

    info!(path = %path.display(), "Demo data file created with one starter shop");
    Ok(())
}

/// Summarize what the demo data file contains.
///
/// # Errors
///
/// Returns an error if the data file cannot be opened.
pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let path = data_file();
    if !path.exists() {
        info!(path = %path.display(), "No demo data file yet (run `soko-cli demo init`)");
        return Ok(());
    }

    let backend = open_local().await?;

    let sellers = backend.list(collections::SELLERS).await?;
    let catalogs = backend.list(collections::CATALOGS).await?;
    let carts = backend.list(collections::CARTS).await?;

    let product_count: usize = catalogs
        .iter()
        .filter_map(|(_, snapshot)| Catalog::from_snapshot(snapshot.body.as_ref()).ok())
        .map(|catalog| catalog.products.len())
        .sum();

    info!(
        path = %path.display(),
        sellers = sellers.len(),
        products = product_count,
        carts = carts.len(),
        "Demo data file summary"
    );
    for (key, snapshot) in sellers {
        let shop = snapshot
            .body
            .as_ref()
            .and_then(|body| serde_json::from_value::<SellerProfile>(body.clone()).ok());
        match shop {
            Some(profile) => info!(seller = %key, shop = %profile.shop_name, "seller"),
            None => warn!(seller = %key, "seller profile is malformed"),
        }
    }
    Ok(())
}

/// Delete the demo data file.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be removed.
pub async fn reset() -> Result<(), Box<dyn std::error::Error>> {
    let path = data_file();
    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            info!(path = %path.display(), "Demo data file removed");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "Nothing to reset");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
