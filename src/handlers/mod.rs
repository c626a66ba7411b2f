pub mod auth;
pub mod daily_sales;
pub mod derived_deliveries;
pub mod health;
pub mod milk_requests;
pub mod registry;
pub mod transport_legs;

use std::sync::Arc;

use crate::auth::AuthService;
use crate::db::DbPool;
use crate::events::EventSender;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<crate::services::users::UserService>,
    pub registry: Arc<crate::services::registry::RegistryService>,
    pub transport_legs: Arc<crate::services::transport_legs::TransportLegService>,
    pub reconciliation: Arc<crate::services::reconciliation::ReconciliationService>,
    pub receipts: Arc<crate::services::receipts::ReceiptService>,
    pub sales: Arc<crate::services::sales::SaleService>,
    pub requests: Arc<crate::services::requests::MilkRequestService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, events: EventSender, auth: Arc<AuthService>) -> Self {
        Self {
            users: Arc::new(crate::services::users::UserService::new(
                db.clone(),
                auth,
                events.clone(),
            )),
            registry: Arc::new(crate::services::registry::RegistryService::new(db.clone())),
            transport_legs: Arc::new(crate::services::transport_legs::TransportLegService::new(
                db.clone(),
                events.clone(),
            )),
            reconciliation: Arc::new(crate::services::reconciliation::ReconciliationService::new(
                db.clone(),
                events.clone(),
            )),
            receipts: Arc::new(crate::services::receipts::ReceiptService::new(
                db.clone(),
                events.clone(),
            )),
            sales: Arc::new(crate::services::sales::SaleService::new(
                db.clone(),
                events.clone(),
            )),
            requests: Arc::new(crate::services::requests::MilkRequestService::new(
                db, events,
            )),
        }
    }
}
