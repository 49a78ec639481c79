//! Cart aggregation and mutation through the storefront API.

use axum::http::{Method, StatusCode};
use serde_json::json;

use sokoni_integration_tests::TestContext;

#[tokio::test]
async fn test_cart_requires_auth() {
    let mut ctx = TestContext::new();
    let response = ctx.get("/cart").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_empty_cart_view() {
    let mut ctx = TestContext::new();
    ctx.sign_up("buyer@example.com").await;

    let response = ctx.get("/cart").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["groups"], json!([]));
    assert_eq!(response.json["grand_total"], "UGX 0");
    assert_eq!(response.json["item_count"], 0);
}

#[tokio::test]
async fn test_adding_same_product_twice_merges_lines() {
    let mut ctx = TestContext::new();
    let ids = ctx
        .seed_seller("s-1", "A", Some("+256772123456"), &[("Pen", 2000)])
        .await;
    ctx.sign_up("buyer@example.com").await;

    let add = json!({"seller_id": "s-1", "product_id": ids[0]});
    ctx.post("/cart/items", add.clone()).await;
    let response = ctx.post("/cart/items", add).await;

    assert_eq!(response.status, StatusCode::OK);
    let groups = response.json["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    let items = groups[0]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(items[0]["line_total"], "UGX 4,000");
    assert_eq!(response.json["item_count"], 2);
}

#[tokio::test]
async fn test_grouping_partitions_by_shop_with_subtotals() {
    let mut ctx = TestContext::new();
    let a = ctx
        .seed_seller("s-a", "A", Some("+256772123456"), &[("Pen", 2000)])
        .await;
    let b = ctx
        .seed_seller("s-b", "B", Some("+256701987654"), &[("Cup", 5000)])
        .await;
    ctx.sign_up("buyer@example.com").await;

    // Pen twice (quantity 2), Cup once.
    let pen = json!({"seller_id": "s-a", "product_id": a[0]});
    ctx.post("/cart/items", pen.clone()).await;
    ctx.post("/cart/items", pen).await;
    let response = ctx
        .post("/cart/items", json!({"seller_id": "s-b", "product_id": b[0]}))
        .await;

    let groups = response.json["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["shop"], "A");
    assert_eq!(groups[0]["subtotal"], "UGX 4,000");
    assert_eq!(groups[1]["shop"], "B");
    assert_eq!(groups[1]["subtotal"], "UGX 5,000");
    assert_eq!(response.json["grand_total"], "UGX 9,000");
}

#[tokio::test]
async fn test_quantity_zero_removes_line() {
    let mut ctx = TestContext::new();
    let ids = ctx
        .seed_seller("s-1", "A", Some("+256772123456"), &[("Pen", 2000)])
        .await;
    ctx.sign_up("buyer@example.com").await;

    ctx.post("/cart/items", json!({"seller_id": "s-1", "product_id": ids[0]}))
        .await;
    let response = ctx
        .patch(
            &format!("/cart/items/{}", ids[0]),
            json!({"quantity": 0}),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["groups"], json!([]));
    assert_eq!(response.json["item_count"], 0);
}

#[tokio::test]
async fn test_quantity_update_is_not_clamped() {
    let mut ctx = TestContext::new();
    let ids = ctx
        .seed_seller("s-1", "A", Some("+256772123456"), &[("Pen", 2000)])
        .await;
    ctx.sign_up("buyer@example.com").await;

    ctx.post("/cart/items", json!({"seller_id": "s-1", "product_id": ids[0]}))
        .await;
    let response = ctx
        .patch(
            &format!("/cart/items/{}", ids[0]),
            json!({"quantity": 500}),
        )
        .await;

    let items = response.json["groups"][0]["items"].as_array().unwrap();
    assert_eq!(items[0]["quantity"], 500);
    assert_eq!(items[0]["line_total"], "UGX 1,000,000");
}

#[tokio::test]
async fn test_removing_unknown_product_leaves_cart_unchanged() {
    let mut ctx = TestContext::new();
    let ids = ctx
        .seed_seller("s-1", "A", Some("+256772123456"), &[("Pen", 2000)])
        .await;
    ctx.sign_up("buyer@example.com").await;

    ctx.post("/cart/items", json!({"seller_id": "s-1", "product_id": ids[0]}))
        .await;
    let before = ctx.get("/cart").await;
    let response = ctx.delete("/cart/items/no-such-product").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json, before.json);
}

#[tokio::test]
async fn test_clear_cart() {
    let mut ctx = TestContext::new();
    let ids = ctx
        .seed_seller("s-1", "A", Some("+256772123456"), &[("Pen", 2000)])
        .await;
    ctx.sign_up("buyer@example.com").await;

    ctx.post("/cart/items", json!({"seller_id": "s-1", "product_id": ids[0]}))
        .await;
    let response = ctx.request(Method::DELETE, "/cart", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["groups"], json!([]));

    let count = ctx.get("/cart/count").await;
    assert_eq!(count.json["count"], 0);
}

#[tokio::test]
async fn test_adding_unknown_product_is_not_found() {
    let mut ctx = TestContext::new();
    ctx.seed_seller("s-1", "A", Some("+256772123456"), &[("Pen", 2000)])
        .await;
    ctx.sign_up("buyer@example.com").await;

    let response = ctx
        .post("/cart/items", json!({"seller_id": "s-1", "product_id": "ghost"}))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_carts_are_per_buyer() {
    let mut ctx = TestContext::new();
    let ids = ctx
        .seed_seller("s-1", "A", Some("+256772123456"), &[("Pen", 2000)])
        .await;

    ctx.sign_up("first@example.com").await;
    ctx.post("/cart/items", json!({"seller_id": "s-1", "product_id": ids[0]}))
        .await;

    // A different browser: fresh context over the same backend would be
    // ideal, but a new signed-in account in this one proves the same
    // point - the cart follows the identity, not the connection.
    ctx.post("/auth/logout", json!({})).await;
    ctx.sign_up("second@example.com").await;

    let response = ctx.get("/cart").await;
    assert_eq!(response.json["item_count"], 0);
}
