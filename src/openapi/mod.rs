use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DairyChain API",
        version = "1.0.0",
        description = r#"
# DairyChain Supply Chain API

Backend for a dairy/milk supply chain: collection points, transporters,
transport legs, derived deliveries, diary receipts, daily sales and milk
transfer requests.

## Authentication

All endpoints except login, OTP, password reset and health probes require a
JWT bearer token:

```
Authorization: Bearer <your-jwt-token>
```

Management-only endpoints (registry mutation, user administration, sale
approval) additionally require the `management` role.

## Reconciliation

A transport leg declares a pickup volume. Derived deliveries allocate parts
of that volume to production sites and diary shops; an allocation that would
exceed the remaining volume is rejected with `422`. Diary receipts record
the actually received quantity and its variance against the declared one.

## Pagination

List endpoints accept `page` (default 1) and `limit` (default 20, max 100).
"#,
        contact(name = "DairyChain Team", email = "dev@dairychain.rw")
    ),
    tags(
        (name = "auth", description = "Login, OTP and password reset"),
        (name = "users", description = "User administration (management)"),
        (name = "registry", description = "Sites and actors registry"),
        (name = "transport", description = "Transport legs"),
        (name = "reconciliation", description = "Derived deliveries, receipts and volume reconciliation"),
        (name = "sales", description = "Daily sales and reports"),
        (name = "requests", description = "Milk transfer requests")
    ),
    paths(
        // Auth
        crate::handlers::auth::login,
        crate::handlers::auth::login_management,
        crate::handlers::auth::me,
        crate::handlers::auth::otp_request,
        crate::handlers::auth::otp_verify,
        crate::handlers::auth::password_reset_request,
        crate::handlers::auth::password_reset_confirm,
        crate::handlers::auth::create_user,
        crate::handlers::auth::list_users,
        crate::handlers::auth::deactivate_user,

        // Registry
        crate::handlers::registry::list_collection_points,
        crate::handlers::registry::get_collection_point,
        crate::handlers::registry::create_collection_point,
        crate::handlers::registry::update_collection_point,
        crate::handlers::registry::delete_collection_point,
        crate::handlers::registry::list_transporters,
        crate::handlers::registry::get_transporter,
        crate::handlers::registry::create_transporter,
        crate::handlers::registry::update_transporter,
        crate::handlers::registry::delete_transporter,
        crate::handlers::registry::list_production_sites,
        crate::handlers::registry::get_production_site,
        crate::handlers::registry::create_production_site,
        crate::handlers::registry::update_production_site,
        crate::handlers::registry::delete_production_site,
        crate::handlers::registry::list_diary_shops,
        crate::handlers::registry::get_diary_shop,
        crate::handlers::registry::create_diary_shop,
        crate::handlers::registry::update_diary_shop,
        crate::handlers::registry::delete_diary_shop,

        // Transport & reconciliation
        crate::handlers::transport_legs::list_legs,
        crate::handlers::transport_legs::get_leg,
        crate::handlers::transport_legs::create_leg,
        crate::handlers::transport_legs::update_leg_status,
        crate::handlers::transport_legs::delete_leg,
        crate::handlers::transport_legs::leg_reconciliation,
        crate::handlers::transport_legs::create_derived_delivery,
        crate::handlers::transport_legs::list_derived_deliveries,
        crate::handlers::transport_legs::transporter_volume,
        crate::handlers::derived_deliveries::get_delivery,
        crate::handlers::derived_deliveries::cancel_delivery,
        crate::handlers::derived_deliveries::verify_delivery,
        crate::handlers::derived_deliveries::list_diary_receipts,

        // Sales
        crate::handlers::daily_sales::list_sales,
        crate::handlers::daily_sales::get_sale,
        crate::handlers::daily_sales::create_sale,
        crate::handlers::daily_sales::update_sale,
        crate::handlers::daily_sales::delete_sale,
        crate::handlers::daily_sales::update_sale_status,
        crate::handlers::daily_sales::sales_summary,

        // Requests
        crate::handlers::milk_requests::list_requests,
        crate::handlers::milk_requests::get_request,
        crate::handlers::milk_requests::create_request,
        crate::handlers::milk_requests::update_request_status,
        crate::handlers::milk_requests::delete_request,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ListQuery,
            crate::errors::ErrorResponse,

            // Domain enums
            crate::models::Role,
            crate::models::LegStatus,
            crate::models::DeliveryStatus,
            crate::models::SaleStatus,
            crate::models::SaleProduct,
            crate::models::PaymentMethod,
            crate::models::RequestStatus,
            crate::models::DestinationType,

            // Auth types
            crate::auth::TokenResponse,
            crate::handlers::auth::UserProfile,
            crate::handlers::auth::LoginResponse,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::ManagementLoginRequest,
            crate::handlers::auth::OtpRequest,
            crate::handlers::auth::OtpVerifyRequest,
            crate::handlers::auth::PasswordResetRequest,
            crate::handlers::auth::PasswordResetConfirmRequest,
            crate::handlers::auth::CreateUserRequest,

            // Registry types
            crate::handlers::registry::CollectionPointSummary,
            crate::handlers::registry::CreateCollectionPointRequest,
            crate::handlers::registry::TransporterSummary,
            crate::handlers::registry::CreateTransporterRequest,
            crate::handlers::registry::SiteSummary,
            crate::handlers::registry::CreateSiteRequest,
            crate::handlers::registry::UpdateSiteRequest,

            // Transport & reconciliation types
            crate::handlers::transport_legs::LegSummary,
            crate::handlers::transport_legs::LegDetail,
            crate::handlers::transport_legs::CreateTransportLegRequest,
            crate::handlers::transport_legs::LegStatusRequest,
            crate::handlers::transport_legs::CreateDerivedDeliveryRequest,
            crate::handlers::derived_deliveries::DeliverySummary,
            crate::handlers::derived_deliveries::ReceiptSummary,
            crate::handlers::derived_deliveries::VerifyDeliveryRequest,
            crate::services::reconciliation::VolumeSummary,
            crate::services::reconciliation::LegReconciliation,

            // Sales types
            crate::handlers::daily_sales::SaleSummary,
            crate::handlers::daily_sales::CreateDailySaleRequest,
            crate::handlers::daily_sales::UpdateDailySaleRequest,
            crate::handlers::daily_sales::SaleStatusRequest,
            crate::services::sales::SalesSummary,
            crate::services::sales::ProductSummary,

            // Request types
            crate::handlers::milk_requests::RequestSummary,
            crate::handlers::milk_requests::CreateMilkRequestRequest,
            crate::handlers::milk_requests::RequestStatusRequest,
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
