//! Seed the configured backend from a YAML fixture.
//!
//! The fixture names sellers by document key and carries their profile and
//! product list; product ids are generated at seed time. The whole file is
//! validated before anything is written.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info, warn};

use sokoni_backend::{Backend, BackendConfig, DocumentRef, WriteMode, collections};
use sokoni_core::catalog::{Catalog, Product, SellerProfile};
use sokoni_core::{Money, PhoneNumber, ProductId, SellerName};

/// One product in the fixture.
#[derive(Debug, Deserialize)]
struct SeedProduct {
    name: String,
    price: i64,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: Option<String>,
}

/// One seller in the fixture.
#[derive(Debug, Deserialize)]
struct SeedSeller {
    /// Document key for the seller.
    id: String,
    shop_name: String,
    #[serde(default)]
    whatsapp: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    products: Vec<SeedProduct>,
}

/// The fixture file.
#[derive(Debug, Deserialize)]
struct SeedFile {
    sellers: Vec<SeedSeller>,
}

/// Validate the fixture before touching the store.
fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut shop_names: Vec<&str> = Vec::new();

    for seller in &seed.sellers {
        if seller.id.trim().is_empty() {
            errors.push("seller with empty id".to_owned());
        }
        if seller.shop_name.trim().is_empty() {
            errors.push(format!("seller '{}' has an empty shop_name", seller.id));
        }
        if shop_names.contains(&seller.shop_name.as_str()) {
            // Checkout resolves sellers by shop name; duplicates would
            // make that resolution ambiguous.
            errors.push(format!("duplicate shop_name '{}'", seller.shop_name));
        }
        shop_names.push(seller.shop_name.as_str());

        if let Some(raw) = &seller.whatsapp
            && let Err(e) = PhoneNumber::parse(raw)
        {
            errors.push(format!(
                "seller '{}' has an invalid whatsapp number: {e}",
                seller.id
            ));
        }

        for product in &seller.products {
            if product.name.trim().is_empty() {
                errors.push(format!("seller '{}' has a product without a name", seller.id));
            }
            if product.price <= 0 {
                errors.push(format!(
                    "product '{}' of seller '{}' has a non-positive price",
                    product.name, seller.id
                ));
            }
        }
    }
    errors
}

async fn clear_collections(backend: &dyn Backend) -> Result<(), Box<dyn std::error::Error>> {
    for collection in [collections::SELLERS, collections::CATALOGS] {
        let entries = backend.list(collection).await?;
        info!(collection, count = entries.len(), "Clearing collection");
        for (key, _) in entries {
            backend.delete(&DocumentRef::new(collection, key)).await?;
        }
    }
    Ok(())
}

/// Seed sellers and catalogs from a YAML fixture.
///
/// # Errors
///
/// Returns an error if the file cannot be read, fails validation, or the
/// backend rejects a write.
pub async fn run(file_path: &str, clear_existing: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed fixture");

    // Read and validate the YAML before connecting to the backend
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    info!(sellers = seed.sellers.len(), "Parsed fixture");

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Fixture validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    info!("Fixture validated successfully");

    let config = BackendConfig::from_env()?;
    let backend = config.connect().await?;
    info!(mode = config.mode(), "Backend connected");

    if clear_existing {
        clear_collections(backend.as_ref()).await?;
    }

    let mut product_total = 0usize;
    for seller in seed.sellers {
        let whatsapp = match &seller.whatsapp {
            // Validation above guarantees this parses.
            Some(raw) => match PhoneNumber::parse(raw) {
                Ok(phone) => Some(phone),
                Err(e) => {
                    warn!(seller = %seller.id, "skipping unparseable whatsapp number: {e}");
                    None
                }
            },
            None => None,
        };

        let profile = SellerProfile {
            shop_name: SellerName::new(seller.shop_name),
            whatsapp,
            description: seller.description,
            location: seller.location,
            profile_image: None,
            banner_image: None,
        };
        backend
            .write(
                &DocumentRef::new(collections::SELLERS, seller.id.as_str()),
                serde_json::to_value(&profile)?,
                WriteMode::Replace,
            )
            .await?;

        let mut catalog = Catalog::default();
        for product in seller.products {
            catalog.add(Product {
                id: ProductId::generate(),
                name: product.name,
                price: Money::new(product.price),
                description: product.description,
                image: product.image,
            });
        }
        product_total += catalog.products.len();
        backend
            .write(
                &DocumentRef::new(collections::CATALOGS, seller.id.as_str()),
                catalog.to_body()?,
                WriteMode::Replace,
            )
            .await?;

        info!(seller = %seller.id, products = catalog.products.len(), "Seeded seller");
    }

    info!(products = product_total, "Seeding complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> SeedFile {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_valid_fixture_parses() {
        let seed = parse(
            r"
sellers:
  - id: seller-amara
    shop_name: Kampala Crafts
    whatsapp: '+256772123456'
    location: Kampala
    products:
      - name: Shea Soap
        price: 8000
",
        );
        assert!(validate(&seed).is_empty());
        assert_eq!(seed.sellers.len(), 1);
        assert_eq!(seed.sellers[0].products.len(), 1);
    }

    #[test]
    fn test_duplicate_shop_names_rejected() {
        let seed = parse(
            r"
sellers:
  - id: a
    shop_name: Same Shop
  - id: b
    shop_name: Same Shop
",
        );
        let errors = validate(&seed);
        assert!(errors.iter().any(|e| e.contains("duplicate shop_name")));
    }

    #[test]
    fn test_bad_phone_and_price_rejected() {
        let seed = parse(
            r"
sellers:
  - id: a
    shop_name: Shop A
    whatsapp: 'not a number'
    products:
      - name: Freebie
        price: 0
",
        );
        let errors = validate(&seed);
        assert_eq!(errors.len(), 2);
    }
}
