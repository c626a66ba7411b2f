//! Domain enumerations shared by services and handlers.
//!
//! Entity columns store these as snake_case strings; parsing happens at the
//! service boundary so invalid values surface as validation errors, not
//! database errors.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Account roles across the supply chain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Farmer,
    Collector,
    Transporter,
    Production,
    Diary,
    Management,
}

/// Transport leg lifecycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LegStatus {
    Scheduled,
    InTransit,
    Completed,
    Cancelled,
}

impl LegStatus {
    /// Allowed lifecycle transitions.
    pub fn can_transition_to(self, next: LegStatus) -> bool {
        use LegStatus::*;
        matches!(
            (self, next),
            (Scheduled, InTransit)
                | (InTransit, Completed)
                | (Scheduled, Cancelled)
                | (InTransit, Cancelled)
        )
    }
}

/// Derived delivery lifecycle. Verification (accept/reject) is recorded by a
/// diary receipt; cancellation returns the volume to the leg.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Verified,
    Rejected,
    Cancelled,
}

/// Daily sale approval lifecycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SaleStatus {
    Pending,
    Approved,
    Rejected,
}

impl SaleStatus {
    pub fn can_transition_to(self, next: SaleStatus) -> bool {
        use SaleStatus::*;
        matches!((self, next), (Pending, Approved) | (Pending, Rejected))
    }
}

/// Product types sold by diary shops.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SaleProduct {
    RawMilk,
    FermentedMilk,
    Cream,
    Cheese,
    Yoghurt,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Credit,
    MobileMoney,
}

/// Milk transfer request lifecycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Completed,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Accepted, Completed)
        )
    }
}

/// Destination kind for a derived delivery.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DestinationType {
    Production,
    Diary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[test]
    fn statuses_round_trip_through_strings() {
        assert_eq!(LegStatus::InTransit.to_string(), "in_transit");
        assert_eq!(
            LegStatus::from_str("in_transit").unwrap(),
            LegStatus::InTransit
        );
        assert_eq!(
            PaymentMethod::from_str("mobile_money").unwrap(),
            PaymentMethod::MobileMoney
        );
        assert!(LegStatus::from_str("teleported").is_err());
    }

    #[rstest]
    #[case(LegStatus::Scheduled, LegStatus::InTransit, true)]
    #[case(LegStatus::InTransit, LegStatus::Completed, true)]
    #[case(LegStatus::Scheduled, LegStatus::Completed, false)]
    #[case(LegStatus::Completed, LegStatus::Cancelled, false)]
    #[case(LegStatus::Cancelled, LegStatus::InTransit, false)]
    fn leg_transitions(#[case] from: LegStatus, #[case] to: LegStatus, #[case] allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[rstest]
    #[case(RequestStatus::Pending, RequestStatus::Accepted, true)]
    #[case(RequestStatus::Accepted, RequestStatus::Completed, true)]
    #[case(RequestStatus::Pending, RequestStatus::Completed, false)]
    #[case(RequestStatus::Rejected, RequestStatus::Accepted, false)]
    #[case(RequestStatus::Completed, RequestStatus::Cancelled, false)]
    fn request_transitions(
        #[case] from: RequestStatus,
        #[case] to: RequestStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }
}
