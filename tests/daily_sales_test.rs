mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{read_json, TestApp};

#[tokio::test]
async fn totals_are_computed_server_side() {
    let app = TestApp::new().await;
    let diary = app.seed_diary_shop("Totals Diary").await;

    // The client-sent total is ignored; the server recomputes it.
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/daily-sales",
            Some(json!({
                "diary_shop_id": diary.id,
                "product": "raw_milk",
                "quantity": "25",
                "unit_price": "400",
                "payment_method": "cash",
                "total_amount": "999999"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let sale = read_json(response).await;
    assert_eq!(sale["data"]["total_amount"], "10000");
    assert_eq!(sale["data"]["status"], "pending");

    let sale_id = sale["data"]["id"].as_str().unwrap().to_string();

    // Read-after-write returns the same record
    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/daily-sales/{}", sale_id), None)
        .await;
    let fetched = read_json(response).await;
    assert_eq!(fetched["data"]["quantity"], "25");
    assert_eq!(fetched["data"]["unit_price"], "400");

    // Editing quantity/price recomputes the total
    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/daily-sales/{}", sale_id),
            Some(json!({"quantity": "10", "unit_price": "450"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json(response).await;
    assert_eq!(updated["data"]["total_amount"], "4500");
}

#[tokio::test]
async fn invalid_sales_are_rejected() {
    let app = TestApp::new().await;
    let diary = app.seed_diary_shop("Picky Diary").await;

    let base = |quantity: &str, price: &str, product: &str| {
        json!({
            "diary_shop_id": diary.id,
            "product": product,
            "quantity": quantity,
            "unit_price": price,
            "payment_method": "cash"
        })
    };

    for payload in [
        base("0", "400", "raw_milk"),
        base("-3", "400", "raw_milk"),
        base("10", "-1", "raw_milk"),
        base("10", "400", "sunflower_oil"),
    ] {
        let response = app
            .request_authenticated(Method::POST, "/api/v1/daily-sales", Some(payload))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // Unknown diary shop
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/daily-sales",
            Some(json!({
                "diary_shop_id": uuid::Uuid::new_v4(),
                "product": "raw_milk",
                "quantity": "10",
                "unit_price": "400",
                "payment_method": "cash"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn approval_is_management_only_and_single_shot() {
    let app = TestApp::new().await;
    let diary = app.seed_diary_shop("Approval Diary").await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/daily-sales",
            Some(json!({
                "diary_shop_id": diary.id,
                "product": "yoghurt",
                "quantity": "5",
                "unit_price": "1200",
                "payment_method": "mobile_money"
            })),
        )
        .await;
    let sale = read_json(response).await;
    let sale_id = sale["data"]["id"].as_str().unwrap().to_string();

    // A diary operator cannot approve
    let token = app.diary_token.clone();
    let response = app
        .request_as(
            &token,
            Method::POST,
            &format!("/api/v1/daily-sales/{}/status", sale_id),
            Some(json!({"status": "approved"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/daily-sales/{}/status", sale_id),
            Some(json!({"status": "approved"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Approved sales can be neither re-approved nor edited
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/daily-sales/{}/status", sale_id),
            Some(json!({"status": "approved"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/daily-sales/{}", sale_id),
            Some(json!({"quantity": "6"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_is_not_idempotent_at_the_api_boundary() {
    let app = TestApp::new().await;
    let diary = app.seed_diary_shop("Delete Diary").await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/daily-sales",
            Some(json!({
                "diary_shop_id": diary.id,
                "product": "cream",
                "quantity": "2",
                "unit_price": "3000",
                "payment_method": "credit"
            })),
        )
        .await;
    let sale = read_json(response).await;
    let sale_id = sale["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request_authenticated(Method::DELETE, &format!("/api/v1/daily-sales/{}", sale_id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Second delete is a 404, not a repeated 200
    let response = app
        .request_authenticated(Method::DELETE, &format!("/api/v1/daily-sales/{}", sale_id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn summary_aggregates_per_product() {
    let app = TestApp::new().await;
    let diary = app.seed_diary_shop("Report Diary").await;
    let other = app.seed_diary_shop("Other Diary").await;

    let sales = [
        (diary.id, "raw_milk", "10", "400"),   // 4000
        (diary.id, "raw_milk", "20", "400"),   // 8000
        (diary.id, "cheese", "2", "5000"),     // 10000
        (other.id, "raw_milk", "99", "400"),   // different diary, filtered out
    ];
    for (shop, product, quantity, price) in sales {
        let response = app
            .request_authenticated(
                Method::POST,
                "/api/v1/daily-sales",
                Some(json!({
                    "diary_shop_id": shop,
                    "product": product,
                    "quantity": quantity,
                    "unit_price": price,
                    "payment_method": "cash"
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/daily-sales/summary?diary_shop_id={}", diary.id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary = read_json(response).await;
    assert_eq!(summary["data"]["count"], 3);
    assert_eq!(summary["data"]["total_quantity"], "32");
    assert_eq!(summary["data"]["total_amount"], "22000");

    let per_product = summary["data"]["per_product"].as_array().unwrap();
    assert_eq!(per_product.len(), 2);
    let raw_milk = per_product
        .iter()
        .find(|p| p["product"] == "raw_milk")
        .unwrap();
    assert_eq!(raw_milk["count"], 2);
    assert_eq!(raw_milk["total_amount"], "12000");
}
