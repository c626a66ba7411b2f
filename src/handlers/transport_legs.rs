use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::transport_leg,
    errors::ServiceError,
    models::{DestinationType, LegStatus},
    services::reconciliation::{LegReconciliation, NewDerivedDelivery, VolumeSummary},
    services::transport_legs::NewTransportLeg,
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};

use super::derived_deliveries::DeliverySummary;

#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LegListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub transporter_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": "990e8400-e29b-41d4-a716-446655440000",
    "transporter_id": "550e8400-e29b-41d4-a716-446655440000",
    "collection_point_id": "770e8400-e29b-41d4-a716-446655440000",
    "amount": "100",
    "status": "scheduled",
    "picked_up_at": null,
    "notes": null,
    "created_at": "2025-11-03T07:12:00Z",
    "updated_at": null
}))]
pub struct LegSummary {
    pub id: Uuid,
    pub transporter_id: Uuid,
    pub collection_point_id: Uuid,
    /// Declared pickup volume in liters
    pub amount: Decimal,
    /// Leg status (scheduled, in_transit, completed, cancelled)
    pub status: String,
    pub picked_up_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<transport_leg::Model> for LegSummary {
    fn from(model: transport_leg::Model) -> Self {
        Self {
            id: model.id,
            transporter_id: model.transporter_id,
            collection_point_id: model.collection_point_id,
            amount: model.amount,
            status: model.status,
            picked_up_at: model.picked_up_at,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Leg together with its reconciliation figures.
#[derive(Debug, Serialize, ToSchema)]
pub struct LegDetail {
    #[serde(flatten)]
    pub leg: LegSummary,
    pub allocated: Decimal,
    pub remaining: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "transporter_id": "550e8400-e29b-41d4-a716-446655440000",
    "collection_point_id": "770e8400-e29b-41d4-a716-446655440000",
    "amount": "100",
    "notes": "Morning pickup"
}))]
pub struct CreateTransportLegRequest {
    pub transporter_id: Uuid,
    pub collection_point_id: Uuid,
    /// Declared pickup volume in liters, must be positive
    pub amount: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({"status": "in_transit"}))]
pub struct LegStatusRequest {
    /// Target status (scheduled, in_transit, completed, cancelled)
    pub status: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "destination_type": "diary",
    "destination_id": "880e8400-e29b-41d4-a716-446655440000",
    "amount": "40"
}))]
pub struct CreateDerivedDeliveryRequest {
    /// "production" or "diary"
    pub destination_type: String,
    pub destination_id: Uuid,
    pub amount: Decimal,
}

fn parse_leg_status(value: &str) -> Result<LegStatus, ServiceError> {
    LegStatus::from_str(value)
        .map_err(|_| ServiceError::ValidationError(format!("Unsupported leg status '{}'", value)))
}

fn parse_destination_type(value: &str) -> Result<DestinationType, ServiceError> {
    DestinationType::from_str(value).map_err(|_| {
        ServiceError::ValidationError(format!("Unsupported destination type '{}'", value))
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/transport-legs",
    params(LegListQuery),
    responses(
        (status = 200, description = "Legs listed", body = ApiResponse<PaginatedResponse<LegSummary>>)
    ),
    tag = "transport"
)]
pub async fn list_legs(
    State(state): State<AppState>,
    Query(query): Query<LegListQuery>,
) -> ApiResult<PaginatedResponse<LegSummary>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let status = query.status.as_deref().map(parse_leg_status).transpose()?;

    let (legs, total) = state
        .services
        .transport_legs
        .list_legs(page, limit, status, query.transporter_id)
        .await?;

    let items: Vec<LegSummary> = legs.into_iter().map(LegSummary::from).collect();
    let total_pages = (total + limit - 1) / limit;

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        total,
        page,
        limit,
        total_pages,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/transport-legs/:id",
    params(("id" = Uuid, Path, description = "Transport leg ID")),
    responses(
        (status = 200, description = "Leg fetched with reconciliation figures", body = ApiResponse<LegDetail>),
        (status = 404, description = "Leg not found", body = crate::errors::ErrorResponse)
    ),
    tag = "transport"
)]
pub async fn get_leg(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<LegDetail> {
    let leg = state.services.transport_legs.get_leg(id).await?;
    let reconciliation = state.services.reconciliation.leg_reconciliation(id).await?;

    Ok(Json(ApiResponse::success(LegDetail {
        leg: leg.into(),
        allocated: reconciliation.allocated,
        remaining: reconciliation.remaining,
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/transport-legs",
    request_body = CreateTransportLegRequest,
    responses(
        (status = 200, description = "Leg created", body = ApiResponse<LegSummary>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "transport"
)]
pub async fn create_leg(
    State(state): State<AppState>,
    Json(payload): Json<CreateTransportLegRequest>,
) -> ApiResult<LegSummary> {
    let created = state
        .services
        .transport_legs
        .create_leg(NewTransportLeg {
            transporter_id: payload.transporter_id,
            collection_point_id: payload.collection_point_id,
            amount: payload.amount,
            notes: payload.notes,
        })
        .await?;

    Ok(Json(ApiResponse::success(created.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/transport-legs/:id/status",
    params(("id" = Uuid, Path, description = "Transport leg ID")),
    request_body = LegStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<LegSummary>),
        (status = 400, description = "Invalid transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Leg not found", body = crate::errors::ErrorResponse)
    ),
    tag = "transport"
)]
pub async fn update_leg_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LegStatusRequest>,
) -> ApiResult<LegSummary> {
    let status = parse_leg_status(&payload.status)?;
    let updated = state
        .services
        .transport_legs
        .update_status(id, status)
        .await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/transport-legs/:id",
    params(("id" = Uuid, Path, description = "Transport leg ID")),
    responses(
        (status = 200, description = "Leg deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Leg not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Leg has derived deliveries", body = crate::errors::ErrorResponse)
    ),
    tag = "transport"
)]
pub async fn delete_leg(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state.services.transport_legs.delete_leg(id).await?;
    Ok(Json(ApiResponse::success(json!({"deleted": id}))))
}

#[utoipa::path(
    get,
    path = "/api/v1/transport-legs/:id/reconciliation",
    params(("id" = Uuid, Path, description = "Transport leg ID")),
    responses(
        (status = 200, description = "Reconciliation figures", body = ApiResponse<LegReconciliation>),
        (status = 404, description = "Leg not found", body = crate::errors::ErrorResponse)
    ),
    tag = "reconciliation"
)]
pub async fn leg_reconciliation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<LegReconciliation> {
    let figures = state.services.reconciliation.leg_reconciliation(id).await?;
    Ok(Json(ApiResponse::success(figures)))
}

#[utoipa::path(
    post,
    path = "/api/v1/transport-legs/:id/derived",
    params(("id" = Uuid, Path, description = "Transport leg ID")),
    request_body = CreateDerivedDeliveryRequest,
    responses(
        (status = 200, description = "Delivery allocated", body = ApiResponse<DeliverySummary>),
        (status = 404, description = "Leg or destination not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Not enough volume remaining on the leg", body = crate::errors::ErrorResponse)
    ),
    tag = "reconciliation"
)]
pub async fn create_derived_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateDerivedDeliveryRequest>,
) -> ApiResult<DeliverySummary> {
    let destination_type = parse_destination_type(&payload.destination_type)?;

    let created = state
        .services
        .reconciliation
        .create_derived_delivery(NewDerivedDelivery {
            transport_leg_id: id,
            destination_type,
            destination_id: payload.destination_id,
            amount: payload.amount,
        })
        .await?;

    Ok(Json(ApiResponse::success(created.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/transport-legs/:id/derived",
    params(("id" = Uuid, Path, description = "Transport leg ID")),
    responses(
        (status = 200, description = "Deliveries for the leg", body = ApiResponse<Vec<DeliverySummary>>)
    ),
    tag = "reconciliation"
)]
pub async fn list_derived_deliveries(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<DeliverySummary>> {
    // 404 on unknown legs rather than an empty list
    state.services.transport_legs.get_leg(id).await?;

    let deliveries = state.services.reconciliation.list_for_leg(id).await?;
    let items: Vec<DeliverySummary> = deliveries.into_iter().map(DeliverySummary::from).collect();
    Ok(Json(ApiResponse::success(items)))
}

#[utoipa::path(
    get,
    path = "/api/v1/transporters/:id/volume",
    params(("id" = Uuid, Path, description = "Transporter ID")),
    responses(
        (status = 200, description = "Total and available volume", body = ApiResponse<VolumeSummary>),
        (status = 404, description = "Transporter not found", body = crate::errors::ErrorResponse)
    ),
    tag = "reconciliation"
)]
pub async fn transporter_volume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<VolumeSummary> {
    let summary = state.services.reconciliation.transporter_volume(id).await?;
    Ok(Json(ApiResponse::success(summary)))
}
