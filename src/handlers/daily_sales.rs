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
    entities::daily_sale,
    errors::ServiceError,
    models::{PaymentMethod, SaleProduct, SaleStatus},
    services::sales::{NewDailySale, SaleFilter, SalesSummary, UpdateDailySale},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": "bb0e8400-e29b-41d4-a716-446655440000",
    "diary_shop_id": "880e8400-e29b-41d4-a716-446655440000",
    "product": "raw_milk",
    "quantity": "25",
    "unit_price": "400",
    "total_amount": "10000",
    "sale_date": "2025-11-03T09:30:00Z",
    "status": "pending",
    "payment_method": "cash",
    "notes": null,
    "created_at": "2025-11-03T09:31:00Z",
    "updated_at": null
}))]
pub struct SaleSummary {
    pub id: Uuid,
    pub diary_shop_id: Uuid,
    pub product: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Always quantity x unit_price, recomputed server-side
    pub total_amount: Decimal,
    pub sale_date: DateTime<Utc>,
    pub status: String,
    pub payment_method: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<daily_sale::Model> for SaleSummary {
    fn from(model: daily_sale::Model) -> Self {
        Self {
            id: model.id,
            diary_shop_id: model.diary_shop_id,
            product: model.product,
            quantity: model.quantity,
            unit_price: model.unit_price,
            total_amount: model.total_amount,
            sale_date: model.sale_date,
            status: model.status,
            payment_method: model.payment_method,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "diary_shop_id": "880e8400-e29b-41d4-a716-446655440000",
    "product": "raw_milk",
    "quantity": "25",
    "unit_price": "400",
    "payment_method": "cash"
}))]
pub struct CreateDailySaleRequest {
    pub diary_shop_id: Uuid,
    /// One of: raw_milk, fermented_milk, cream, cheese, yoghurt
    pub product: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub sale_date: Option<DateTime<Utc>>,
    /// One of: cash, credit, mobile_money
    pub payment_method: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct UpdateDailySaleRequest {
    pub product: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({"status": "approved"}))]
pub struct SaleStatusRequest {
    /// Target status (approved or rejected)
    pub status: String,
}

#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SaleListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub diary_shop_id: Option<Uuid>,
    pub status: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SaleSummaryQuery {
    pub diary_shop_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

fn parse_product(value: &str) -> Result<SaleProduct, ServiceError> {
    SaleProduct::from_str(value)
        .map_err(|_| ServiceError::ValidationError(format!("Unsupported product '{}'", value)))
}

fn parse_payment_method(value: &str) -> Result<PaymentMethod, ServiceError> {
    PaymentMethod::from_str(value).map_err(|_| {
        ServiceError::ValidationError(format!("Unsupported payment method '{}'", value))
    })
}

fn parse_sale_status(value: &str) -> Result<SaleStatus, ServiceError> {
    SaleStatus::from_str(value)
        .map_err(|_| ServiceError::ValidationError(format!("Unsupported sale status '{}'", value)))
}

#[utoipa::path(
    get,
    path = "/api/v1/daily-sales",
    params(SaleListQuery),
    responses(
        (status = 200, description = "Sales listed", body = ApiResponse<PaginatedResponse<SaleSummary>>)
    ),
    tag = "sales"
)]
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<SaleListQuery>,
) -> ApiResult<PaginatedResponse<SaleSummary>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let status = query.status.as_deref().map(parse_sale_status).transpose()?;

    let filter = SaleFilter {
        diary_shop_id: query.diary_shop_id,
        status,
        from: query.from,
        to: query.to,
    };

    let (sales, total) = state.services.sales.list_sales(page, limit, filter).await?;
    let items: Vec<SaleSummary> = sales.into_iter().map(SaleSummary::from).collect();
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
    path = "/api/v1/daily-sales/:id",
    params(("id" = Uuid, Path, description = "Sale ID")),
    responses(
        (status = 200, description = "Sale fetched", body = ApiResponse<SaleSummary>),
        (status = 404, description = "Sale not found", body = crate::errors::ErrorResponse)
    ),
    tag = "sales"
)]
pub async fn get_sale(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<SaleSummary> {
    let sale = state.services.sales.get_sale(id).await?;
    Ok(Json(ApiResponse::success(sale.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/daily-sales",
    request_body = CreateDailySaleRequest,
    responses(
        (status = 200, description = "Sale recorded with a server-computed total", body = ApiResponse<SaleSummary>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "sales"
)]
pub async fn create_sale(
    State(state): State<AppState>,
    Json(payload): Json<CreateDailySaleRequest>,
) -> ApiResult<SaleSummary> {
    let product = parse_product(&payload.product)?;
    let payment_method = parse_payment_method(&payload.payment_method)?;

    let created = state
        .services
        .sales
        .create_sale(NewDailySale {
            diary_shop_id: payload.diary_shop_id,
            product,
            quantity: payload.quantity,
            unit_price: payload.unit_price,
            sale_date: payload.sale_date,
            payment_method,
            notes: payload.notes,
        })
        .await?;

    Ok(Json(ApiResponse::success(created.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/daily-sales/:id",
    params(("id" = Uuid, Path, description = "Sale ID")),
    request_body = UpdateDailySaleRequest,
    responses(
        (status = 200, description = "Sale updated, total recomputed", body = ApiResponse<SaleSummary>),
        (status = 400, description = "Sale is not pending", body = crate::errors::ErrorResponse),
        (status = 404, description = "Sale not found", body = crate::errors::ErrorResponse)
    ),
    tag = "sales"
)]
pub async fn update_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDailySaleRequest>,
) -> ApiResult<SaleSummary> {
    let product = payload.product.as_deref().map(parse_product).transpose()?;

    let updated = state
        .services
        .sales
        .update_sale(
            id,
            UpdateDailySale {
                product,
                quantity: payload.quantity,
                unit_price: payload.unit_price,
                notes: payload.notes,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(updated.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/daily-sales/:id",
    params(("id" = Uuid, Path, description = "Sale ID")),
    responses(
        (status = 200, description = "Sale deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Sale not found (including repeat deletes)", body = crate::errors::ErrorResponse)
    ),
    tag = "sales"
)]
pub async fn delete_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state.services.sales.delete_sale(id).await?;
    Ok(Json(ApiResponse::success(json!({"deleted": id}))))
}

#[utoipa::path(
    post,
    path = "/api/v1/daily-sales/:id/status",
    params(("id" = Uuid, Path, description = "Sale ID")),
    request_body = SaleStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<SaleSummary>),
        (status = 400, description = "Invalid transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Sale not found", body = crate::errors::ErrorResponse)
    ),
    tag = "sales"
)]
pub async fn update_sale_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaleStatusRequest>,
) -> ApiResult<SaleSummary> {
    let status = parse_sale_status(&payload.status)?;
    let updated = state.services.sales.update_status(id, status).await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/daily-sales/summary",
    params(SaleSummaryQuery),
    responses(
        (status = 200, description = "Aggregated sales report", body = ApiResponse<SalesSummary>)
    ),
    tag = "sales"
)]
pub async fn sales_summary(
    State(state): State<AppState>,
    Query(query): Query<SaleSummaryQuery>,
) -> ApiResult<SalesSummary> {
    let filter = SaleFilter {
        diary_shop_id: query.diary_shop_id,
        status: None,
        from: query.from,
        to: query.to,
    };

    let summary = state.services.sales.summary(filter).await?;
    Ok(Json(ApiResponse::success(summary)))
}
