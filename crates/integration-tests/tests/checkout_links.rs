//! Per-seller checkout handoff through the storefront API.

use axum::http::StatusCode;
use serde_json::json;

use sokoni_integration_tests::TestContext;

#[tokio::test]
async fn test_cart_groups_carry_checkout_links() {
    let mut ctx = TestContext::new();
    let ids = ctx
        .seed_seller("s-1", "Kampala Crafts", Some("+256 772 123456"), &[("Pen", 2000)])
        .await;
    ctx.sign_up("buyer@example.com").await;

    ctx.post("/cart/items", json!({"seller_id": "s-1", "product_id": ids[0]}))
        .await;
    ctx.post("/cart/items", json!({"seller_id": "s-1", "product_id": ids[0]}))
        .await;

    let response = ctx.get("/cart").await;
    let url = response.json["groups"][0]["checkout_url"].as_str().unwrap();

    assert!(url.starts_with("https://wa.me/256772123456?text="));
    // The message is percent-encoded: no raw spaces or newlines.
    assert!(!url.contains(' '));
    assert!(!url.contains('\n'));
    assert!(url.contains("Pen%20%28x2%29"));
    assert!(url.contains("4%2C000"));
}

#[tokio::test]
async fn test_checkout_redirects_to_deep_link() {
    let mut ctx = TestContext::new();
    let ids = ctx
        .seed_seller("s-1", "Kampala Crafts", Some("+256772123456"), &[("Pen", 2000)])
        .await;
    ctx.sign_up("buyer@example.com").await;

    ctx.post("/cart/items", json!({"seller_id": "s-1", "product_id": ids[0]}))
        .await;

    let response = ctx.get("/checkout/Kampala%20Crafts").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let location = response.location().unwrap();
    assert!(location.starts_with("https://wa.me/256772123456?text="));
    assert!(location.contains("Total%20for%20this%20order%3A%20UGX%202%2C000"));
}

#[tokio::test]
async fn test_checkout_without_registered_number_conflicts() {
    let mut ctx = TestContext::new();
    let ids = ctx
        .seed_seller("s-1", "Quiet Shop", None, &[("Pen", 2000)])
        .await;
    ctx.sign_up("buyer@example.com").await;

    ctx.post("/cart/items", json!({"seller_id": "s-1", "product_id": ids[0]}))
        .await;

    // The cart still renders, just without a handoff link for the group.
    let cart = ctx.get("/cart").await;
    assert!(cart.json["groups"][0]["checkout_url"].is_null());

    let response = ctx.get("/checkout/Quiet%20Shop").await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_checkout_for_shop_not_in_cart_is_not_found() {
    let mut ctx = TestContext::new();
    ctx.seed_seller("s-1", "Kampala Crafts", Some("+256772123456"), &[("Pen", 2000)])
        .await;
    ctx.sign_up("buyer@example.com").await;

    let response = ctx.get("/checkout/Kampala%20Crafts").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_two_sellers_get_separate_messages() {
    let mut ctx = TestContext::new();
    let a = ctx
        .seed_seller("s-a", "A", Some("+256772123456"), &[("Pen", 2000)])
        .await;
    let b = ctx
        .seed_seller("s-b", "B", Some("+256701987654"), &[("Cup", 5000)])
        .await;
    ctx.sign_up("buyer@example.com").await;

    ctx.post("/cart/items", json!({"seller_id": "s-a", "product_id": a[0]}))
        .await;
    ctx.post("/cart/items", json!({"seller_id": "s-b", "product_id": b[0]}))
        .await;

    let response = ctx.get("/cart").await;
    let groups = response.json["groups"].as_array().unwrap();

    let url_a = groups[0]["checkout_url"].as_str().unwrap();
    let url_b = groups[1]["checkout_url"].as_str().unwrap();

    // Each link goes to its own seller and only mentions that seller's items.
    assert!(url_a.contains("256772123456"));
    assert!(url_a.contains("Pen"));
    assert!(!url_a.contains("Cup"));
    assert!(url_b.contains("256701987654"));
    assert!(url_b.contains("Cup"));
    assert!(!url_b.contains("Pen"));
}
