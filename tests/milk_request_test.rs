mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{read_json, TestApp};

#[tokio::test]
async fn create_then_read_back_returns_the_same_request() {
    let app = TestApp::new().await;
    let requester = app.seed_diary_shop("Short Diary").await;
    let supplier = app.seed_diary_shop("Stocked Diary").await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/milk-requests",
            Some(json!({
                "requesting_diary_id": requester.id,
                "supplying_diary_id": supplier.id,
                "amount": "50",
                "description": "Weekend shortage"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = read_json(response).await;
    let request_id = created["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/milk-requests/{}", request_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = read_json(response).await;
    assert_eq!(fetched["data"]["amount"], "50");
    assert_eq!(
        fetched["data"]["requesting_diary_id"],
        requester.id.to_string()
    );
    assert_eq!(
        fetched["data"]["supplying_diary_id"],
        supplier.id.to_string()
    );
    assert_eq!(fetched["data"]["status"], "pending");
    assert_eq!(fetched["data"]["description"], "Weekend shortage");
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
    let app = TestApp::new().await;
    let diary = app.seed_diary_shop("Lonely Diary").await;

    // A diary cannot request from itself
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/milk-requests",
            Some(json!({
                "requesting_diary_id": diary.id,
                "supplying_diary_id": diary.id,
                "amount": "50"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown counterpart
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/milk-requests",
            Some(json!({
                "requesting_diary_id": diary.id,
                "supplying_diary_id": uuid::Uuid::new_v4(),
                "amount": "50"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Non-positive amount
    let supplier = app.seed_diary_shop("Supplier Diary").await;
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/milk-requests",
            Some(json!({
                "requesting_diary_id": diary.id,
                "supplying_diary_id": supplier.id,
                "amount": "0"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lifecycle_transitions_are_enforced() {
    let app = TestApp::new().await;
    let requester = app.seed_diary_shop("Flow Diary A").await;
    let supplier = app.seed_diary_shop("Flow Diary B").await;

    let create = || {
        json!({
            "requesting_diary_id": requester.id,
            "supplying_diary_id": supplier.id,
            "amount": "25"
        })
    };

    let response = app
        .request_authenticated(Method::POST, "/api/v1/milk-requests", Some(create()))
        .await;
    let request = read_json(response).await;
    let request_id = request["data"]["id"].as_str().unwrap().to_string();

    // pending cannot jump straight to completed
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/milk-requests/{}/status", request_id),
            Some(json!({"status": "completed"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for status in ["accepted", "completed"] {
        let response = app
            .request_authenticated(
                Method::POST,
                &format!("/api/v1/milk-requests/{}/status", request_id),
                Some(json!({"status": status})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Completed requests are part of the ledger: no further transitions, no
    // deletion.
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/milk-requests/{}/status", request_id),
            Some(json!({"status": "cancelled"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/milk-requests/{}", request_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // A pending request deletes cleanly exactly once
    let response = app
        .request_authenticated(Method::POST, "/api/v1/milk-requests", Some(create()))
        .await;
    let pending = read_json(response).await;
    let pending_id = pending["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/milk-requests/{}", pending_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/milk-requests/{}", pending_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_filters_by_diary_on_either_side() {
    let app = TestApp::new().await;
    let a = app.seed_diary_shop("Diary A").await;
    let b = app.seed_diary_shop("Diary B").await;
    let c = app.seed_diary_shop("Diary C").await;

    for (from, to) in [(a.id, b.id), (b.id, c.id)] {
        let response = app
            .request_authenticated(
                Method::POST,
                "/api/v1/milk-requests",
                Some(json!({
                    "requesting_diary_id": from,
                    "supplying_diary_id": to,
                    "amount": "10"
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // b appears on both sides
    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/milk-requests?diary_id={}", b.id),
            None,
        )
        .await;
    let listed = read_json(response).await;
    assert_eq!(listed["data"]["total"], 2);

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/milk-requests?diary_id={}", a.id),
            None,
        )
        .await;
    let listed = read_json(response).await;
    assert_eq!(listed["data"]["total"], 1);
}
