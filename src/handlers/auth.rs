use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{AuthUser, TokenResponse},
    entities::user,
    errors::ServiceError,
    models::Role,
    services::users::NewUser,
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};

/// Public profile of an account; the password hash never leaves the service
/// layer.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub role: String,
    pub site_id: Option<Uuid>,
    pub active: bool,
}

impl From<user::Model> for UserProfile {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone: model.phone,
            email: model.email,
            role: model.role,
            site_id: model.site_id,
            active: model.active,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: TokenResponse,
    pub user: UserProfile,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({"phone": "+250788123456", "password": "amata-meza"}))]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub phone: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({"email": "admin@dairychain.rw", "password": "amata-meza"}))]
pub struct ManagementLoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OtpRequest {
    #[validate(length(min = 1))]
    pub phone: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OtpVerifyRequest {
    #[validate(length(min = 1))]
    pub phone: String,
    #[validate(length(min = 6, max = 6))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PasswordResetRequest {
    #[validate(length(min = 1))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PasswordResetConfirmRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Mukamana Josiane",
    "phone": "+250788123456",
    "email": null,
    "password": "amata-meza-2024",
    "role": "diary",
    "site_id": null
}))]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1))]
    pub phone: String,
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: String,
    /// One of: farmer, collector, transporter, production, diary, management
    pub role: String,
    pub site_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub role: Option<String>,
}

pub(crate) fn parse_role(value: &str) -> Result<Role, ServiceError> {
    Role::from_str(value)
        .map_err(|_| ServiceError::ValidationError(format!("Unsupported role '{}'", value)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let (token, account) = state
        .services
        .users
        .login(&payload.phone, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(LoginResponse {
        token,
        user: account.into(),
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login/management",
    request_body = ManagementLoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse),
        (status = 403, description = "Not a management account", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_management(
    State(state): State<AppState>,
    Json(payload): Json<ManagementLoginRequest>,
) -> ApiResult<LoginResponse> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let (token, account) = state
        .services
        .users
        .login_management(&payload.email, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(LoginResponse {
        token,
        user: account.into(),
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Authenticated profile", body = ApiResponse<UserProfile>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn me(State(state): State<AppState>, auth_user: AuthUser) -> ApiResult<UserProfile> {
    let account = state.services.users.get_user(auth_user.user_id).await?;
    Ok(Json(ApiResponse::success(account.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/otp/request",
    request_body = OtpRequest,
    responses(
        (status = 200, description = "Code issued if the phone is registered", body = ApiResponse<serde_json::Value>)
    ),
    tag = "auth"
)]
pub async fn otp_request(
    State(state): State<AppState>,
    Json(payload): Json<OtpRequest>,
) -> ApiResult<serde_json::Value> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    state.services.users.request_otp(&payload.phone).await?;
    Ok(Json(ApiResponse::success(
        json!({"message": "verification code sent if the phone is registered"}),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/otp/verify",
    request_body = OtpVerifyRequest,
    responses(
        (status = 200, description = "Code accepted", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Invalid or expired code", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn otp_verify(
    State(state): State<AppState>,
    Json(payload): Json<OtpVerifyRequest>,
) -> ApiResult<serde_json::Value> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    state
        .services
        .users
        .verify_otp(&payload.phone, &payload.code)
        .await?;
    Ok(Json(ApiResponse::success(json!({"verified": true}))))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset/request",
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Reset mail sent if the address is registered", body = ApiResponse<serde_json::Value>)
    ),
    tag = "auth"
)]
pub async fn password_reset_request(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetRequest>,
) -> ApiResult<serde_json::Value> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    state
        .services
        .users
        .request_password_reset(&payload.email)
        .await?;
    Ok(Json(ApiResponse::success(
        json!({"message": "reset token sent if the email is registered"}),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset/confirm",
    request_body = PasswordResetConfirmRequest,
    responses(
        (status = 200, description = "Password updated", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Invalid token", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn password_reset_confirm(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetConfirmRequest>,
) -> ApiResult<serde_json::Value> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    state
        .services
        .users
        .confirm_password_reset(&payload.token, &payload.new_password)
        .await?;
    Ok(Json(ApiResponse::success(json!({"message": "password updated"}))))
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = ApiResponse<UserProfile>),
        (status = 409, description = "Phone or email already registered", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<UserProfile> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let role = parse_role(&payload.role)?;
    let created = state
        .services
        .users
        .create_user(NewUser {
            name: payload.name,
            phone: payload.phone,
            email: payload.email,
            password: payload.password,
            role,
            site_id: payload.site_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(created.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users listed", body = ApiResponse<PaginatedResponse<UserProfile>>)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<PaginatedResponse<UserProfile>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let role = query.role.as_deref().map(parse_role).transpose()?;

    let (users, total) = state.services.users.list_users(page, limit, role).await?;
    let items: Vec<UserProfile> = users.into_iter().map(UserProfile::from).collect();
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
    post,
    path = "/api/v1/users/:id/deactivate",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deactivated", body = ApiResponse<UserProfile>),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn deactivate_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<UserProfile> {
    let updated = state.services.users.deactivate_user(id).await?;
    Ok(Json(ApiResponse::success(updated.into())))
}
