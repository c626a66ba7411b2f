mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{read_json, TestApp};

/// The canonical scenario: a 100-liter leg with a 40-liter derived delivery
/// leaves 60 liters available on the transporter.
#[tokio::test]
async fn transporter_volume_reflects_allocations() {
    let app = TestApp::new().await;
    let carrier = app.seed_transporter("Habimana Transport", "+250788111111").await;
    let poc = app.seed_collection_point("Nyagatare Hub").await;
    let diary = app.seed_diary_shop("Kigali Creamery").await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/transport-legs",
            Some(json!({
                "transporter_id": carrier.id,
                "collection_point_id": poc.id,
                "amount": "100"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let leg = read_json(response).await;
    let leg_id = leg["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(leg["data"]["status"], "scheduled");

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/transport-legs/{}/derived", leg_id),
            Some(json!({
                "destination_type": "diary",
                "destination_id": diary.id,
                "amount": "40"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/transporters/{}/volume", carrier.id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let volume = read_json(response).await;
    assert_eq!(volume["data"]["total_volume"], "100");
    assert_eq!(volume["data"]["available_volume"], "60");

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/transport-legs/{}/reconciliation", leg_id),
            None,
        )
        .await;
    let figures = read_json(response).await;
    assert_eq!(figures["data"]["declared"], "100");
    assert_eq!(figures["data"]["allocated"], "40");
    assert_eq!(figures["data"]["remaining"], "60");
}

#[tokio::test]
async fn over_allocation_is_rejected_not_clamped() {
    let app = TestApp::new().await;
    let carrier = app.seed_transporter("Overbook Ltd", "+250788111112").await;
    let poc = app.seed_collection_point("Rukomo Hub").await;
    let diary = app.seed_diary_shop("Remera Diary").await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/transport-legs",
            Some(json!({
                "transporter_id": carrier.id,
                "collection_point_id": poc.id,
                "amount": "100"
            })),
        )
        .await;
    let leg = read_json(response).await;
    let leg_id = leg["data"]["id"].as_str().unwrap().to_string();

    let derive = |amount: &str| {
        json!({
            "destination_type": "diary",
            "destination_id": diary.id,
            "amount": amount
        })
    };

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/transport-legs/{}/derived", leg_id),
            Some(derive("40")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // 70 > 60 remaining
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/transport-legs/{}/derived", leg_id),
            Some(derive("70")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Exactly the remainder is fine, and drains the leg
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/transport-legs/{}/derived", leg_id),
            Some(derive("60")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/transport-legs/{}/derived", leg_id),
            Some(derive("1")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/transport-legs/{}/reconciliation", leg_id),
            None,
        )
        .await;
    let figures = read_json(response).await;
    assert_eq!(figures["data"]["remaining"], "0");
}

#[tokio::test]
async fn cancelling_a_delivery_returns_its_volume() {
    let app = TestApp::new().await;
    let carrier = app.seed_transporter("Return Trip", "+250788111113").await;
    let poc = app.seed_collection_point("Kayonza Hub").await;
    let production = app.seed_production_site("Musanze Plant").await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/transport-legs",
            Some(json!({
                "transporter_id": carrier.id,
                "collection_point_id": poc.id,
                "amount": "80"
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
                "destination_type": "production",
                "destination_id": production.id,
                "amount": "50"
            })),
        )
        .await;
    let delivery = read_json(response).await;
    let delivery_id = delivery["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/derived-deliveries/{}/cancel", delivery_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cancelled = read_json(response).await;
    assert_eq!(cancelled["data"]["status"], "cancelled");

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/transporters/{}/volume", carrier.id),
            None,
        )
        .await;
    let volume = read_json(response).await;
    assert_eq!(volume["data"]["available_volume"], "80");

    // A cancelled delivery cannot be cancelled again
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/derived-deliveries/{}/cancel", delivery_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn leg_lifecycle_and_deletion_rules() {
    let app = TestApp::new().await;
    let carrier = app.seed_transporter("Lifecycle Haulage", "+250788111114").await;
    let poc = app.seed_collection_point("Gatsibo Hub").await;
    let diary = app.seed_diary_shop("Gatsibo Diary").await;

    let create_leg = || {
        json!({
            "transporter_id": carrier.id,
            "collection_point_id": poc.id,
            "amount": "30"
        })
    };

    // scheduled -> in_transit -> completed
    let response = app
        .request_authenticated(Method::POST, "/api/v1/transport-legs", Some(create_leg()))
        .await;
    let leg = read_json(response).await;
    let leg_id = leg["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/transport-legs/{}/status", leg_id),
            Some(json!({"status": "in_transit"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json(response).await;
    assert!(updated["data"]["picked_up_at"].is_string());

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/transport-legs/{}/status", leg_id),
            Some(json!({"status": "completed"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // completed legs cannot be cancelled
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/transport-legs/{}/status", leg_id),
            Some(json!({"status": "cancelled"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // a leg with allocations cannot be deleted
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/transport-legs/{}/derived", leg_id),
            Some(json!({
                "destination_type": "diary",
                "destination_id": diary.id,
                "amount": "10"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/transport-legs/{}", leg_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // a fresh leg deletes cleanly exactly once
    let response = app
        .request_authenticated(Method::POST, "/api/v1/transport-legs", Some(create_leg()))
        .await;
    let fresh = read_json(response).await;
    let fresh_id = fresh["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/transport-legs/{}", fresh_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/transport-legs/{}", fresh_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn zero_and_negative_allocations_are_invalid() {
    let app = TestApp::new().await;
    let carrier = app.seed_transporter("Edge Cases", "+250788111115").await;
    let poc = app.seed_collection_point("Ngoma Hub").await;
    let diary = app.seed_diary_shop("Ngoma Diary").await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/transport-legs",
            Some(json!({
                "transporter_id": carrier.id,
                "collection_point_id": poc.id,
                "amount": "10"
            })),
        )
        .await;
    let leg = read_json(response).await;
    let leg_id = leg["data"]["id"].as_str().unwrap().to_string();

    for amount in ["0", "-5"] {
        let response = app
            .request_authenticated(
                Method::POST,
                &format!("/api/v1/transport-legs/{}/derived", leg_id),
                Some(json!({
                    "destination_type": "diary",
                    "destination_id": diary.id,
                    "amount": amount
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
