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

use crate::{
    entities::milk_request,
    errors::ServiceError,
    models::RequestStatus,
    services::requests::NewMilkRequest,
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": "cc0e8400-e29b-41d4-a716-446655440000",
    "requesting_diary_id": "880e8400-e29b-41d4-a716-446655440000",
    "supplying_diary_id": "881e8400-e29b-41d4-a716-446655440000",
    "amount": "50",
    "status": "pending",
    "description": "Weekend shortage",
    "created_at": "2025-11-03T10:00:00Z",
    "updated_at": null
}))]
pub struct RequestSummary {
    pub id: Uuid,
    pub requesting_diary_id: Uuid,
    pub supplying_diary_id: Uuid,
    pub amount: Decimal,
    /// Request status (pending, accepted, completed, rejected, cancelled)
    pub status: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<milk_request::Model> for RequestSummary {
    fn from(model: milk_request::Model) -> Self {
        Self {
            id: model.id,
            requesting_diary_id: model.requesting_diary_id,
            supplying_diary_id: model.supplying_diary_id,
            amount: model.amount,
            status: model.status,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "requesting_diary_id": "880e8400-e29b-41d4-a716-446655440000",
    "supplying_diary_id": "881e8400-e29b-41d4-a716-446655440000",
    "amount": "50",
    "description": "Weekend shortage"
}))]
pub struct CreateMilkRequestRequest {
    pub requesting_diary_id: Uuid,
    pub supplying_diary_id: Uuid,
    pub amount: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({"status": "accepted"}))]
pub struct RequestStatusRequest {
    /// Target status (accepted, completed, rejected, cancelled)
    pub status: String,
}

#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequestListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    /// Matches the diary on either side of the transfer
    pub diary_id: Option<Uuid>,
}

fn parse_request_status(value: &str) -> Result<RequestStatus, ServiceError> {
    RequestStatus::from_str(value).map_err(|_| {
        ServiceError::ValidationError(format!("Unsupported request status '{}'", value))
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/milk-requests",
    params(RequestListQuery),
    responses(
        (status = 200, description = "Requests listed", body = ApiResponse<PaginatedResponse<RequestSummary>>)
    ),
    tag = "requests"
)]
pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
) -> ApiResult<PaginatedResponse<RequestSummary>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let status = query
        .status
        .as_deref()
        .map(parse_request_status)
        .transpose()?;

    let (requests, total) = state
        .services
        .requests
        .list_requests(page, limit, status, query.diary_id)
        .await?;

    let items: Vec<RequestSummary> = requests.into_iter().map(RequestSummary::from).collect();
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
    path = "/api/v1/milk-requests/:id",
    params(("id" = Uuid, Path, description = "Milk request ID")),
    responses(
        (status = 200, description = "Request fetched", body = ApiResponse<RequestSummary>),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse)
    ),
    tag = "requests"
)]
pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<RequestSummary> {
    let request = state.services.requests.get_request(id).await?;
    Ok(Json(ApiResponse::success(request.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/milk-requests",
    request_body = CreateMilkRequestRequest,
    responses(
        (status = 200, description = "Request created as pending", body = ApiResponse<RequestSummary>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Diary shop not found", body = crate::errors::ErrorResponse)
    ),
    tag = "requests"
)]
pub async fn create_request(
    State(state): State<AppState>,
    Json(payload): Json<CreateMilkRequestRequest>,
) -> ApiResult<RequestSummary> {
    let created = state
        .services
        .requests
        .create_request(NewMilkRequest {
            requesting_diary_id: payload.requesting_diary_id,
            supplying_diary_id: payload.supplying_diary_id,
            amount: payload.amount,
            description: payload.description,
        })
        .await?;

    Ok(Json(ApiResponse::success(created.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/milk-requests/:id/status",
    params(("id" = Uuid, Path, description = "Milk request ID")),
    request_body = RequestStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<RequestSummary>),
        (status = 400, description = "Invalid transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse)
    ),
    tag = "requests"
)]
pub async fn update_request_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RequestStatusRequest>,
) -> ApiResult<RequestSummary> {
    let status = parse_request_status(&payload.status)?;
    let updated = state.services.requests.update_status(id, status).await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/milk-requests/:id",
    params(("id" = Uuid, Path, description = "Milk request ID")),
    responses(
        (status = 200, description = "Request deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Request not found (including repeat deletes)", body = crate::errors::ErrorResponse),
        (status = 409, description = "Decided requests cannot be deleted", body = crate::errors::ErrorResponse)
    ),
    tag = "requests"
)]
pub async fn delete_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state.services.requests.delete_request(id).await?;
    Ok(Json(ApiResponse::success(json!({"deleted": id}))))
}
