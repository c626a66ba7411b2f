pub mod receipts;
pub mod reconciliation;
pub mod registry;
pub mod requests;
pub mod sales;
pub mod transport_legs;
pub mod users;
