use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    entities::{derived_delivery, diary_receipt},
    services::receipts::VerifyDelivery,
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": "aa0e8400-e29b-41d4-a716-446655440000",
    "transport_leg_id": "990e8400-e29b-41d4-a716-446655440000",
    "destination_type": "diary",
    "destination_id": "880e8400-e29b-41d4-a716-446655440000",
    "amount": "40",
    "status": "pending",
    "created_at": "2025-11-03T08:00:00Z",
    "updated_at": null
}))]
pub struct DeliverySummary {
    pub id: Uuid,
    pub transport_leg_id: Uuid,
    pub destination_type: String,
    pub destination_id: Uuid,
    pub amount: Decimal,
    /// Delivery status (pending, verified, rejected, cancelled)
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<derived_delivery::Model> for DeliverySummary {
    fn from(model: derived_delivery::Model) -> Self {
        Self {
            id: model.id,
            transport_leg_id: model.transport_leg_id,
            destination_type: model.destination_type,
            destination_id: model.destination_id,
            amount: model.amount,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReceiptSummary {
    pub id: Uuid,
    pub derived_delivery_id: Uuid,
    pub diary_shop_id: Uuid,
    pub declared_amount: Decimal,
    pub received_amount: Decimal,
    /// received_amount - declared_amount
    pub variance: Decimal,
    pub accepted: bool,
    pub verified_by: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<diary_receipt::Model> for ReceiptSummary {
    fn from(model: diary_receipt::Model) -> Self {
        Self {
            id: model.id,
            derived_delivery_id: model.derived_delivery_id,
            diary_shop_id: model.diary_shop_id,
            declared_amount: model.declared_amount,
            received_amount: model.received_amount,
            variance: model.variance,
            accepted: model.accepted,
            verified_by: model.verified_by,
            notes: model.notes,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({"received_amount": "38.5", "accepted": true, "notes": "two liters lost in transit"}))]
pub struct VerifyDeliveryRequest {
    /// Actual quantity received, accepted even when it differs from the
    /// declared amount
    pub received_amount: Decimal,
    pub accepted: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReceiptListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/derived-deliveries/:id",
    params(("id" = Uuid, Path, description = "Derived delivery ID")),
    responses(
        (status = 200, description = "Delivery fetched", body = ApiResponse<DeliverySummary>),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse)
    ),
    tag = "reconciliation"
)]
pub async fn get_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeliverySummary> {
    let delivery = state.services.reconciliation.get_derived_delivery(id).await?;
    Ok(Json(ApiResponse::success(delivery.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/derived-deliveries/:id/cancel",
    params(("id" = Uuid, Path, description = "Derived delivery ID")),
    responses(
        (status = 200, description = "Delivery cancelled, volume returned to the leg", body = ApiResponse<DeliverySummary>),
        (status = 400, description = "Delivery is not pending", body = crate::errors::ErrorResponse),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse)
    ),
    tag = "reconciliation"
)]
pub async fn cancel_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeliverySummary> {
    let cancelled = state
        .services
        .reconciliation
        .cancel_derived_delivery(id)
        .await?;
    Ok(Json(ApiResponse::success(cancelled.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/derived-deliveries/:id/verify",
    params(("id" = Uuid, Path, description = "Derived delivery ID")),
    request_body = VerifyDeliveryRequest,
    responses(
        (status = 200, description = "Receipt recorded with its variance", body = ApiResponse<ReceiptSummary>),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Delivery already verified", body = crate::errors::ErrorResponse)
    ),
    tag = "reconciliation"
)]
pub async fn verify_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(payload): Json<VerifyDeliveryRequest>,
) -> ApiResult<ReceiptSummary> {
    let receipt = state
        .services
        .receipts
        .verify_delivery(
            id,
            VerifyDelivery {
                received_amount: payload.received_amount,
                accepted: payload.accepted,
                notes: payload.notes,
            },
            auth_user.user_id,
        )
        .await?;

    Ok(Json(ApiResponse::success(receipt.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/diary-shops/:id/receipts",
    params(
        ("id" = Uuid, Path, description = "Diary shop ID"),
        ReceiptListQuery
    ),
    responses(
        (status = 200, description = "Receipt history", body = ApiResponse<PaginatedResponse<ReceiptSummary>>)
    ),
    tag = "reconciliation"
)]
pub async fn list_diary_receipts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ReceiptListQuery>,
) -> ApiResult<PaginatedResponse<ReceiptSummary>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    // 404 on unknown diaries rather than an empty history
    state.services.registry.get_diary_shop(id).await?;

    let (receipts, total) = state.services.receipts.list_for_diary(id, page, limit).await?;
    let items: Vec<ReceiptSummary> = receipts.into_iter().map(ReceiptSummary::from).collect();
    let total_pages = (total + limit - 1) / limit;

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        total,
        page,
        limit,
        total_pages,
    })))
}
