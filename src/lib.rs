//! DairyChain API Library
//!
//! Backend for a dairy supply chain: registry of sites and actors, transport
//! legs with volume reconciliation, diary receipts, daily sales and milk
//! transfer requests.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod models;
pub mod notifications;
pub mod openapi;
pub mod services;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::AuthRouterExt;
use crate::models::Role;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub auth: Arc<auth::AuthService>,
    pub services: handlers::AppServices,
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<axum::Json<ApiResponse<T>>, errors::ServiceError>;

/// Full v1 API surface. Public auth endpoints carry no middleware; everything
/// else requires a verified token, and mutation of the registry, user
/// administration and sale approval additionally require the management role.
pub fn api_v1_routes() -> Router<AppState> {
    let auth_public = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/auth/login/management",
            post(handlers::auth::login_management),
        )
        .route("/auth/otp/request", post(handlers::auth::otp_request))
        .route("/auth/otp/verify", post(handlers::auth::otp_verify))
        .route(
            "/auth/password-reset/request",
            post(handlers::auth::password_reset_request),
        )
        .route(
            "/auth/password-reset/confirm",
            post(handlers::auth::password_reset_confirm),
        );

    let auth_me = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .with_auth();

    let users_admin = Router::new()
        .route(
            "/users",
            post(handlers::auth::create_user).get(handlers::auth::list_users),
        )
        .route(
            "/users/:id/deactivate",
            post(handlers::auth::deactivate_user),
        )
        .with_role(Role::Management);

    let registry_read = Router::new()
        .route(
            "/registry/collection-points",
            get(handlers::registry::list_collection_points),
        )
        .route(
            "/registry/collection-points/:id",
            get(handlers::registry::get_collection_point),
        )
        .route(
            "/registry/transporters",
            get(handlers::registry::list_transporters),
        )
        .route(
            "/registry/transporters/:id",
            get(handlers::registry::get_transporter),
        )
        .route(
            "/registry/production-sites",
            get(handlers::registry::list_production_sites),
        )
        .route(
            "/registry/production-sites/:id",
            get(handlers::registry::get_production_site),
        )
        .route(
            "/registry/diary-shops",
            get(handlers::registry::list_diary_shops),
        )
        .route(
            "/registry/diary-shops/:id",
            get(handlers::registry::get_diary_shop),
        )
        .with_auth();

    let registry_admin = Router::new()
        .route(
            "/registry/collection-points",
            post(handlers::registry::create_collection_point),
        )
        .route(
            "/registry/collection-points/:id",
            put(handlers::registry::update_collection_point)
                .delete(handlers::registry::delete_collection_point),
        )
        .route(
            "/registry/transporters",
            post(handlers::registry::create_transporter),
        )
        .route(
            "/registry/transporters/:id",
            put(handlers::registry::update_transporter)
                .delete(handlers::registry::delete_transporter),
        )
        .route(
            "/registry/production-sites",
            post(handlers::registry::create_production_site),
        )
        .route(
            "/registry/production-sites/:id",
            put(handlers::registry::update_production_site)
                .delete(handlers::registry::delete_production_site),
        )
        .route(
            "/registry/diary-shops",
            post(handlers::registry::create_diary_shop),
        )
        .route(
            "/registry/diary-shops/:id",
            put(handlers::registry::update_diary_shop)
                .delete(handlers::registry::delete_diary_shop),
        )
        .with_role(Role::Management);

    let transport_read = Router::new()
        .route("/transport-legs", get(handlers::transport_legs::list_legs))
        .route("/transport-legs/:id", get(handlers::transport_legs::get_leg))
        .route(
            "/transport-legs/:id/reconciliation",
            get(handlers::transport_legs::leg_reconciliation),
        )
        .route(
            "/transport-legs/:id/derived",
            get(handlers::transport_legs::list_derived_deliveries),
        )
        .route(
            "/transporters/:id/volume",
            get(handlers::transport_legs::transporter_volume),
        )
        .route(
            "/derived-deliveries/:id",
            get(handlers::derived_deliveries::get_delivery),
        )
        .route(
            "/diary-shops/:id/receipts",
            get(handlers::derived_deliveries::list_diary_receipts),
        )
        .with_auth();

    let transport_write = Router::new()
        .route(
            "/transport-legs",
            post(handlers::transport_legs::create_leg),
        )
        .route(
            "/transport-legs/:id",
            delete(handlers::transport_legs::delete_leg),
        )
        .route(
            "/transport-legs/:id/status",
            post(handlers::transport_legs::update_leg_status),
        )
        .route(
            "/transport-legs/:id/derived",
            post(handlers::transport_legs::create_derived_delivery),
        )
        .route(
            "/derived-deliveries/:id/cancel",
            post(handlers::derived_deliveries::cancel_delivery),
        )
        .route(
            "/derived-deliveries/:id/verify",
            post(handlers::derived_deliveries::verify_delivery),
        )
        .with_auth();

    let sales = Router::new()
        .route(
            "/daily-sales",
            get(handlers::daily_sales::list_sales).post(handlers::daily_sales::create_sale),
        )
        .route(
            "/daily-sales/summary",
            get(handlers::daily_sales::sales_summary),
        )
        .route(
            "/daily-sales/:id",
            get(handlers::daily_sales::get_sale)
                .put(handlers::daily_sales::update_sale)
                .delete(handlers::daily_sales::delete_sale),
        )
        .with_auth();

    let sales_admin = Router::new()
        .route(
            "/daily-sales/:id/status",
            post(handlers::daily_sales::update_sale_status),
        )
        .with_role(Role::Management);

    let requests = Router::new()
        .route(
            "/milk-requests",
            get(handlers::milk_requests::list_requests)
                .post(handlers::milk_requests::create_request),
        )
        .route(
            "/milk-requests/:id",
            get(handlers::milk_requests::get_request)
                .delete(handlers::milk_requests::delete_request),
        )
        .route(
            "/milk-requests/:id/status",
            post(handlers::milk_requests::update_request_status),
        )
        .with_auth();

    Router::new()
        .merge(auth_public)
        .merge(auth_me)
        .merge(users_admin)
        .merge(registry_read)
        .merge(registry_admin)
        .merge(transport_read)
        .merge(transport_write)
        .merge(sales)
        .merge(sales_admin)
        .merge(requests)
}
