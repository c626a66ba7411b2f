use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{derived_delivery, diary_shop, production_site, transport_leg, transporter},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{DeliveryStatus, DestinationType, LegStatus},
};

/// Volume summary for a transporter: everything picked up on non-cancelled
/// legs versus what has already been allocated onward.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VolumeSummary {
    pub transporter_id: Uuid,
    pub total_volume: Decimal,
    pub available_volume: Decimal,
}

/// Per-leg reconciliation figures. The transactional allocation path keeps
/// `remaining` non-negative.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LegReconciliation {
    pub transport_leg_id: Uuid,
    pub declared: Decimal,
    pub allocated: Decimal,
    pub remaining: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewDerivedDelivery {
    pub transport_leg_id: Uuid,
    pub destination_type: DestinationType,
    pub destination_id: Uuid,
    pub amount: Decimal,
}

/// Tracks how milk volume moves from a transporter's pickup through partial
/// deliveries to production and diary sites.
#[derive(Clone)]
pub struct ReconciliationService {
    db: Arc<DbPool>,
    events: EventSender,
}

impl ReconciliationService {
    pub fn new(db: Arc<DbPool>, events: EventSender) -> Self {
        Self { db, events }
    }

    /// Allocates part of a leg's volume to a destination.
    ///
    /// Runs in a single transaction: the leg is re-read and the already
    /// allocated sum recomputed before the insert, so concurrent allocations
    /// cannot push a leg past its declared amount. Over-allocation is
    /// rejected, not clamped.
    #[instrument(skip(self))]
    pub async fn create_derived_delivery(
        &self,
        input: NewDerivedDelivery,
    ) -> Result<derived_delivery::Model, ServiceError> {
        if input.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "amount must be greater than zero".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let leg = transport_leg::Entity::find_by_id(input.transport_leg_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Transport leg {} not found",
                    input.transport_leg_id
                ))
            })?;

        let leg_status = LegStatus::from_str(&leg.status)
            .map_err(|_| ServiceError::InternalError(format!("bad leg status '{}'", leg.status)))?;
        if leg_status == LegStatus::Cancelled {
            return Err(ServiceError::InvalidStatus(
                "cannot allocate from a cancelled leg".to_string(),
            ));
        }

        match input.destination_type {
            DestinationType::Production => {
                production_site::Entity::find_by_id(input.destination_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "Production site {} not found",
                            input.destination_id
                        ))
                    })?;
            }
            DestinationType::Diary => {
                diary_shop::Entity::find_by_id(input.destination_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "Diary shop {} not found",
                            input.destination_id
                        ))
                    })?;
            }
        }

        let allocated = allocated_for_leg(&txn, leg.id).await?;
        let remaining = leg.amount - allocated;
        if input.amount > remaining {
            return Err(ServiceError::InsufficientVolume(format!(
                "requested {} liters but only {} of {} remain on leg {}",
                input.amount, remaining, leg.amount, leg.id
            )));
        }

        let model = derived_delivery::ActiveModel {
            id: Set(Uuid::new_v4()),
            transport_leg_id: Set(leg.id),
            destination_type: Set(input.destination_type.to_string()),
            destination_id: Set(input.destination_id),
            amount: Set(input.amount),
            status: Set(DeliveryStatus::Pending.to_string()),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let created = model.insert(&txn).await?;
        txn.commit().await?;

        self.events
            .send_or_log(Event::DeliveryAllocated {
                delivery_id: created.id,
                leg_id: leg.id,
                amount: created.amount,
                remaining: remaining - created.amount,
            })
            .await;

        Ok(created)
    }

    /// Cancels a pending delivery, returning its volume to the leg.
    #[instrument(skip(self))]
    pub async fn cancel_derived_delivery(
        &self,
        delivery_id: Uuid,
    ) -> Result<derived_delivery::Model, ServiceError> {
        let delivery = self.get_derived_delivery(delivery_id).await?;

        let status = DeliveryStatus::from_str(&delivery.status).map_err(|_| {
            ServiceError::InternalError(format!("bad delivery status '{}'", delivery.status))
        })?;
        if status != DeliveryStatus::Pending {
            return Err(ServiceError::InvalidStatus(format!(
                "only pending deliveries can be cancelled, this one is {}",
                delivery.status
            )));
        }

        let leg_id = delivery.transport_leg_id;
        let amount = delivery.amount;

        let mut active: derived_delivery::ActiveModel = delivery.into();
        active.status = Set(DeliveryStatus::Cancelled.to_string());
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&*self.db).await?;

        self.events
            .send_or_log(Event::DeliveryCancelled {
                delivery_id: updated.id,
                leg_id,
                amount,
            })
            .await;

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get_derived_delivery(
        &self,
        delivery_id: Uuid,
    ) -> Result<derived_delivery::Model, ServiceError> {
        derived_delivery::Entity::find_by_id(delivery_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Derived delivery {} not found", delivery_id))
            })
    }

    /// All deliveries allocated from a leg, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_leg(
        &self,
        leg_id: Uuid,
    ) -> Result<Vec<derived_delivery::Model>, ServiceError> {
        let deliveries = derived_delivery::Entity::find()
            .filter(derived_delivery::Column::TransportLegId.eq(leg_id))
            .order_by_desc(derived_delivery::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(deliveries)
    }

    /// declared / allocated / remaining for one leg.
    #[instrument(skip(self))]
    pub async fn leg_reconciliation(
        &self,
        leg_id: Uuid,
    ) -> Result<LegReconciliation, ServiceError> {
        let leg = transport_leg::Entity::find_by_id(leg_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Transport leg {} not found", leg_id)))?;

        let allocated = allocated_for_leg(&*self.db, leg_id).await?;

        Ok(LegReconciliation {
            transport_leg_id: leg_id,
            declared: leg.amount,
            allocated,
            remaining: leg.amount - allocated,
        })
    }

    /// total/available volume across a transporter's non-cancelled legs:
    /// `available_volume = total_volume - sum(derived amounts)`.
    #[instrument(skip(self))]
    pub async fn transporter_volume(
        &self,
        transporter_id: Uuid,
    ) -> Result<VolumeSummary, ServiceError> {
        transporter::Entity::find_by_id(transporter_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Transporter {} not found", transporter_id))
            })?;

        let legs = transport_leg::Entity::find()
            .filter(transport_leg::Column::TransporterId.eq(transporter_id))
            .filter(transport_leg::Column::Status.ne(LegStatus::Cancelled.to_string()))
            .all(&*self.db)
            .await?;

        let total_volume = legs
            .iter()
            .fold(Decimal::ZERO, |acc, leg| acc + leg.amount);

        let leg_ids: Vec<Uuid> = legs.iter().map(|leg| leg.id).collect();
        let allocated = if leg_ids.is_empty() {
            Decimal::ZERO
        } else {
            derived_delivery::Entity::find()
                .filter(derived_delivery::Column::TransportLegId.is_in(leg_ids))
                .filter(
                    derived_delivery::Column::Status.ne(DeliveryStatus::Cancelled.to_string()),
                )
                .all(&*self.db)
                .await?
                .iter()
                .fold(Decimal::ZERO, |acc, d| acc + d.amount)
        };

        Ok(VolumeSummary {
            transporter_id,
            total_volume,
            available_volume: total_volume - allocated,
        })
    }
}

/// Sum of non-cancelled derived amounts for a leg, on any connection so the
/// allocation path can run it inside its transaction.
pub(crate) async fn allocated_for_leg<C: ConnectionTrait>(
    conn: &C,
    leg_id: Uuid,
) -> Result<Decimal, ServiceError> {
    let rows = derived_delivery::Entity::find()
        .filter(derived_delivery::Column::TransportLegId.eq(leg_id))
        .filter(derived_delivery::Column::Status.ne(DeliveryStatus::Cancelled.to_string()))
        .all(conn)
        .await?;

    Ok(rows.iter().fold(Decimal::ZERO, |acc, d| acc + d.amount))
}
