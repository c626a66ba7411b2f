mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{read_json, TestApp};

async fn seed_delivery(app: &TestApp, destination_type: &str, destination_id: uuid::Uuid) -> String {
    let carrier = app.seed_transporter("Receipt Haulage", "+250788222221").await;
    let poc = app.seed_collection_point("Receipt Hub").await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/transport-legs",
            Some(json!({
                "transporter_id": carrier.id,
                "collection_point_id": poc.id,
                "amount": "40"
            })),
        )
        .await;
    let leg = read_json(response).await;
    let leg_id = leg["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/transport-legs/{}/derived", leg_id),
            Some(json!({
                "destination_type": destination_type,
                "destination_id": destination_id,
                "amount": "40"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let delivery = read_json(response).await;
    delivery["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn verification_stores_the_variance() {
    let app = TestApp::new().await;
    let diary = app.seed_diary_shop("Variance Diary").await;
    let delivery_id = seed_delivery(&app, "diary", diary.id).await;

    // The operator reports less than declared; the value is accepted and the
    // shortfall recorded.
    let token = app.diary_token.clone();
    let response = app
        .request_as(
            &token,
            Method::POST,
            &format!("/api/v1/derived-deliveries/{}/verify", delivery_id),
            Some(json!({
                "received_amount": "38.5",
                "accepted": true,
                "notes": "spillage on the road"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let receipt = read_json(response).await;
    assert_eq!(receipt["data"]["declared_amount"], "40");
    assert_eq!(receipt["data"]["received_amount"], "38.5");
    assert_eq!(receipt["data"]["variance"], "-1.5");
    assert_eq!(receipt["data"]["accepted"], true);
    assert_eq!(
        receipt["data"]["verified_by"],
        app.diary_user.id.to_string()
    );

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/derived-deliveries/{}", delivery_id),
            None,
        )
        .await;
    let delivery = read_json(response).await;
    assert_eq!(delivery["data"]["status"], "verified");

    // A delivery is verified exactly once
    let response = app
        .request_as(
            &token,
            Method::POST,
            &format!("/api/v1/derived-deliveries/{}/verify", delivery_id),
            Some(json!({"received_amount": "40", "accepted": true})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn rejection_marks_the_delivery_rejected() {
    let app = TestApp::new().await;
    let diary = app.seed_diary_shop("Strict Diary").await;
    let delivery_id = seed_delivery(&app, "diary", diary.id).await;

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/derived-deliveries/{}/verify", delivery_id),
            Some(json!({
                "received_amount": "12",
                "accepted": false,
                "notes": "smell test failed"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let receipt = read_json(response).await;
    assert_eq!(receipt["data"]["variance"], "-28");

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/derived-deliveries/{}", delivery_id),
            None,
        )
        .await;
    let delivery = read_json(response).await;
    assert_eq!(delivery["data"]["status"], "rejected");
}

#[tokio::test]
async fn production_deliveries_have_no_diary_receipt() {
    let app = TestApp::new().await;
    let production = app.seed_production_site("No Receipt Plant").await;
    let delivery_id = seed_delivery(&app, "production", production.id).await;

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/derived-deliveries/{}/verify", delivery_id),
            Some(json!({"received_amount": "40", "accepted": true})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn receipt_history_is_scoped_to_the_diary() {
    let app = TestApp::new().await;
    let diary = app.seed_diary_shop("History Diary").await;
    let other = app.seed_diary_shop("Quiet Diary").await;
    let delivery_id = seed_delivery(&app, "diary", diary.id).await;

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/derived-deliveries/{}/verify", delivery_id),
            Some(json!({"received_amount": "40", "accepted": true})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let receipt = read_json(response).await;
    assert_eq!(receipt["data"]["variance"], "0");

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/diary-shops/{}/receipts", diary.id),
            None,
        )
        .await;
    let listed = read_json(response).await;
    assert_eq!(listed["data"]["total"], 1);

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/diary-shops/{}/receipts", other.id),
            None,
        )
        .await;
    let listed = read_json(response).await;
    assert_eq!(listed["data"]["total"], 0);

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/diary-shops/{}/receipts", uuid::Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
