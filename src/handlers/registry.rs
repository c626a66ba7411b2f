//! Site & actor registry endpoints. Reads are open to any authenticated
//! role; mutation routes are mounted behind the management role guard.

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
use validator::Validate;

use crate::{
    entities::{collection_point, diary_shop, production_site, transporter},
    errors::ServiceError,
    services::registry::{NewCollectionPoint, NewSite, NewTransporter, SiteUpdate},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};

#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RegistryListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct UpdateSiteRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub contact_phone: Option<String>,
    pub active: Option<bool>,
}

impl From<UpdateSiteRequest> for SiteUpdate {
    fn from(req: UpdateSiteRequest) -> Self {
        Self {
            name: req.name,
            location: req.location,
            contact_phone: req.contact_phone,
            active: req.active,
        }
    }
}

fn paginate<T>(items: Vec<T>, total: u64, page: u64, limit: u64) -> PaginatedResponse<T> {
    PaginatedResponse {
        items,
        total,
        page,
        limit,
        total_pages: (total + limit - 1) / limit,
    }
}

fn page_params(query: &RegistryListQuery) -> (u64, u64) {
    (
        query.page.unwrap_or(1).max(1),
        query.limit.unwrap_or(20).clamp(1, 100),
    )
}

// --- collection points ---

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionPointSummary {
    pub id: Uuid,
    pub name: String,
    pub district: String,
    pub sector: Option<String>,
    pub contact_phone: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<collection_point::Model> for CollectionPointSummary {
    fn from(model: collection_point::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            district: model.district,
            sector: model.sector,
            contact_phone: model.contact_phone,
            active: model.active,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Nyagatare Hub",
    "district": "Nyagatare",
    "sector": "Rukomo",
    "contact_phone": "+250788000001"
}))]
pub struct CreateCollectionPointRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1))]
    pub district: String,
    pub sector: Option<String>,
    #[validate(length(min = 1))]
    pub contact_phone: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/registry/collection-points",
    params(RegistryListQuery),
    responses((status = 200, body = ApiResponse<PaginatedResponse<CollectionPointSummary>>)),
    tag = "registry"
)]
pub async fn list_collection_points(
    State(state): State<AppState>,
    Query(query): Query<RegistryListQuery>,
) -> ApiResult<PaginatedResponse<CollectionPointSummary>> {
    let (page, limit) = page_params(&query);
    let (items, total) = state
        .services
        .registry
        .list_collection_points(page, limit, query.active)
        .await?;
    let items = items.into_iter().map(CollectionPointSummary::from).collect();
    Ok(Json(ApiResponse::success(paginate(items, total, page, limit))))
}

#[utoipa::path(
    get,
    path = "/api/v1/registry/collection-points/:id",
    params(("id" = Uuid, Path, description = "Collection point ID")),
    responses(
        (status = 200, body = ApiResponse<CollectionPointSummary>),
        (status = 404, body = crate::errors::ErrorResponse)
    ),
    tag = "registry"
)]
pub async fn get_collection_point(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<CollectionPointSummary> {
    let item = state.services.registry.get_collection_point(id).await?;
    Ok(Json(ApiResponse::success(item.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/registry/collection-points",
    request_body = CreateCollectionPointRequest,
    responses((status = 200, body = ApiResponse<CollectionPointSummary>)),
    tag = "registry"
)]
pub async fn create_collection_point(
    State(state): State<AppState>,
    Json(payload): Json<CreateCollectionPointRequest>,
) -> ApiResult<CollectionPointSummary> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let created = state
        .services
        .registry
        .create_collection_point(NewCollectionPoint {
            name: payload.name,
            district: payload.district,
            sector: payload.sector,
            contact_phone: payload.contact_phone,
        })
        .await?;
    Ok(Json(ApiResponse::success(created.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/registry/collection-points/:id",
    params(("id" = Uuid, Path, description = "Collection point ID")),
    request_body = UpdateSiteRequest,
    responses(
        (status = 200, body = ApiResponse<CollectionPointSummary>),
        (status = 404, body = crate::errors::ErrorResponse)
    ),
    tag = "registry"
)]
pub async fn update_collection_point(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSiteRequest>,
) -> ApiResult<CollectionPointSummary> {
    let updated = state
        .services
        .registry
        .update_collection_point(id, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/registry/collection-points/:id",
    params(("id" = Uuid, Path, description = "Collection point ID")),
    responses(
        (status = 200, body = ApiResponse<serde_json::Value>),
        (status = 404, body = crate::errors::ErrorResponse),
        (status = 409, description = "Referenced by transport legs", body = crate::errors::ErrorResponse)
    ),
    tag = "registry"
)]
pub async fn delete_collection_point(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state.services.registry.delete_collection_point(id).await?;
    Ok(Json(ApiResponse::success(json!({"deleted": id}))))
}

// --- transporters ---

#[derive(Debug, Serialize, ToSchema)]
pub struct TransporterSummary {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub plate_number: Option<String>,
    pub capacity_liters: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<transporter::Model> for TransporterSummary {
    fn from(model: transporter::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone: model.phone,
            plate_number: model.plate_number,
            capacity_liters: model.capacity_liters,
            active: model.active,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Habimana Transport",
    "phone": "+250788000002",
    "plate_number": "RAD 123 A",
    "capacity_liters": "800"
}))]
pub struct CreateTransporterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1))]
    pub phone: String,
    pub plate_number: Option<String>,
    pub capacity_liters: Decimal,
}

#[utoipa::path(
    get,
    path = "/api/v1/registry/transporters",
    params(RegistryListQuery),
    responses((status = 200, body = ApiResponse<PaginatedResponse<TransporterSummary>>)),
    tag = "registry"
)]
pub async fn list_transporters(
    State(state): State<AppState>,
    Query(query): Query<RegistryListQuery>,
) -> ApiResult<PaginatedResponse<TransporterSummary>> {
    let (page, limit) = page_params(&query);
    let (items, total) = state
        .services
        .registry
        .list_transporters(page, limit, query.active)
        .await?;
    let items = items.into_iter().map(TransporterSummary::from).collect();
    Ok(Json(ApiResponse::success(paginate(items, total, page, limit))))
}

#[utoipa::path(
    get,
    path = "/api/v1/registry/transporters/:id",
    params(("id" = Uuid, Path, description = "Transporter ID")),
    responses(
        (status = 200, body = ApiResponse<TransporterSummary>),
        (status = 404, body = crate::errors::ErrorResponse)
    ),
    tag = "registry"
)]
pub async fn get_transporter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<TransporterSummary> {
    let item = state.services.registry.get_transporter(id).await?;
    Ok(Json(ApiResponse::success(item.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/registry/transporters",
    request_body = CreateTransporterRequest,
    responses((status = 200, body = ApiResponse<TransporterSummary>)),
    tag = "registry"
)]
pub async fn create_transporter(
    State(state): State<AppState>,
    Json(payload): Json<CreateTransporterRequest>,
) -> ApiResult<TransporterSummary> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let created = state
        .services
        .registry
        .create_transporter(NewTransporter {
            name: payload.name,
            phone: payload.phone,
            plate_number: payload.plate_number,
            capacity_liters: payload.capacity_liters,
        })
        .await?;
    Ok(Json(ApiResponse::success(created.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/registry/transporters/:id",
    params(("id" = Uuid, Path, description = "Transporter ID")),
    request_body = UpdateSiteRequest,
    responses(
        (status = 200, body = ApiResponse<TransporterSummary>),
        (status = 404, body = crate::errors::ErrorResponse)
    ),
    tag = "registry"
)]
pub async fn update_transporter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSiteRequest>,
) -> ApiResult<TransporterSummary> {
    let updated = state
        .services
        .registry
        .update_transporter(id, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/registry/transporters/:id",
    params(("id" = Uuid, Path, description = "Transporter ID")),
    responses(
        (status = 200, body = ApiResponse<serde_json::Value>),
        (status = 404, body = crate::errors::ErrorResponse),
        (status = 409, description = "Referenced by transport legs", body = crate::errors::ErrorResponse)
    ),
    tag = "registry"
)]
pub async fn delete_transporter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state.services.registry.delete_transporter(id).await?;
    Ok(Json(ApiResponse::success(json!({"deleted": id}))))
}

// --- production sites & diary shops ---

#[derive(Debug, Serialize, ToSchema)]
pub struct SiteSummary {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub contact_phone: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<production_site::Model> for SiteSummary {
    fn from(model: production_site::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            location: model.location,
            contact_phone: model.contact_phone,
            active: model.active,
            created_at: model.created_at,
        }
    }
}

impl From<diary_shop::Model> for SiteSummary {
    fn from(model: diary_shop::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            location: model.location,
            contact_phone: model.contact_phone,
            active: model.active,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Kigali Creamery",
    "location": "Kigali, Gasabo",
    "contact_phone": "+250788000003"
}))]
pub struct CreateSiteRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1))]
    pub location: String,
    #[validate(length(min = 1))]
    pub contact_phone: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/registry/production-sites",
    params(RegistryListQuery),
    responses((status = 200, body = ApiResponse<PaginatedResponse<SiteSummary>>)),
    tag = "registry"
)]
pub async fn list_production_sites(
    State(state): State<AppState>,
    Query(query): Query<RegistryListQuery>,
) -> ApiResult<PaginatedResponse<SiteSummary>> {
    let (page, limit) = page_params(&query);
    let (items, total) = state
        .services
        .registry
        .list_production_sites(page, limit, query.active)
        .await?;
    let items = items.into_iter().map(SiteSummary::from).collect();
    Ok(Json(ApiResponse::success(paginate(items, total, page, limit))))
}

#[utoipa::path(
    get,
    path = "/api/v1/registry/production-sites/:id",
    params(("id" = Uuid, Path, description = "Production site ID")),
    responses(
        (status = 200, body = ApiResponse<SiteSummary>),
        (status = 404, body = crate::errors::ErrorResponse)
    ),
    tag = "registry"
)]
pub async fn get_production_site(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<SiteSummary> {
    let item = state.services.registry.get_production_site(id).await?;
    Ok(Json(ApiResponse::success(item.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/registry/production-sites",
    request_body = CreateSiteRequest,
    responses((status = 200, body = ApiResponse<SiteSummary>)),
    tag = "registry"
)]
pub async fn create_production_site(
    State(state): State<AppState>,
    Json(payload): Json<CreateSiteRequest>,
) -> ApiResult<SiteSummary> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let created = state
        .services
        .registry
        .create_production_site(NewSite {
            name: payload.name,
            location: payload.location,
            contact_phone: payload.contact_phone,
        })
        .await?;
    Ok(Json(ApiResponse::success(created.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/registry/production-sites/:id",
    params(("id" = Uuid, Path, description = "Production site ID")),
    request_body = UpdateSiteRequest,
    responses(
        (status = 200, body = ApiResponse<SiteSummary>),
        (status = 404, body = crate::errors::ErrorResponse)
    ),
    tag = "registry"
)]
pub async fn update_production_site(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSiteRequest>,
) -> ApiResult<SiteSummary> {
    let updated = state
        .services
        .registry
        .update_production_site(id, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/registry/production-sites/:id",
    params(("id" = Uuid, Path, description = "Production site ID")),
    responses(
        (status = 200, body = ApiResponse<serde_json::Value>),
        (status = 404, body = crate::errors::ErrorResponse),
        (status = 409, description = "Referenced by deliveries", body = crate::errors::ErrorResponse)
    ),
    tag = "registry"
)]
pub async fn delete_production_site(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state.services.registry.delete_production_site(id).await?;
    Ok(Json(ApiResponse::success(json!({"deleted": id}))))
}

#[utoipa::path(
    get,
    path = "/api/v1/registry/diary-shops",
    params(RegistryListQuery),
    responses((status = 200, body = ApiResponse<PaginatedResponse<SiteSummary>>)),
    tag = "registry"
)]
pub async fn list_diary_shops(
    State(state): State<AppState>,
    Query(query): Query<RegistryListQuery>,
) -> ApiResult<PaginatedResponse<SiteSummary>> {
    let (page, limit) = page_params(&query);
    let (items, total) = state
        .services
        .registry
        .list_diary_shops(page, limit, query.active)
        .await?;
    let items = items.into_iter().map(SiteSummary::from).collect();
    Ok(Json(ApiResponse::success(paginate(items, total, page, limit))))
}

#[utoipa::path(
    get,
    path = "/api/v1/registry/diary-shops/:id",
    params(("id" = Uuid, Path, description = "Diary shop ID")),
    responses(
        (status = 200, body = ApiResponse<SiteSummary>),
        (status = 404, body = crate::errors::ErrorResponse)
    ),
    tag = "registry"
)]
pub async fn get_diary_shop(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<SiteSummary> {
    let item = state.services.registry.get_diary_shop(id).await?;
    Ok(Json(ApiResponse::success(item.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/registry/diary-shops",
    request_body = CreateSiteRequest,
    responses((status = 200, body = ApiResponse<SiteSummary>)),
    tag = "registry"
)]
pub async fn create_diary_shop(
    State(state): State<AppState>,
    Json(payload): Json<CreateSiteRequest>,
) -> ApiResult<SiteSummary> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let created = state
        .services
        .registry
        .create_diary_shop(NewSite {
            name: payload.name,
            location: payload.location,
            contact_phone: payload.contact_phone,
        })
        .await?;
    Ok(Json(ApiResponse::success(created.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/registry/diary-shops/:id",
    params(("id" = Uuid, Path, description = "Diary shop ID")),
    request_body = UpdateSiteRequest,
    responses(
        (status = 200, body = ApiResponse<SiteSummary>),
        (status = 404, body = crate::errors::ErrorResponse)
    ),
    tag = "registry"
)]
pub async fn update_diary_shop(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSiteRequest>,
) -> ApiResult<SiteSummary> {
    let updated = state
        .services
        .registry
        .update_diary_shop(id, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/registry/diary-shops/:id",
    params(("id" = Uuid, Path, description = "Diary shop ID")),
    responses(
        (status = 200, body = ApiResponse<serde_json::Value>),
        (status = 404, body = crate::errors::ErrorResponse),
        (status = 409, description = "Still referenced by sales, requests or deliveries", body = crate::errors::ErrorResponse)
    ),
    tag = "registry"
)]
pub async fn delete_diary_shop(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state.services.registry.delete_diary_shop(id).await?;
    Ok(Json(ApiResponse::success(json!({"deleted": id}))))
}
