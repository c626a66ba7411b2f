use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{collection_point, derived_delivery, transport_leg, transporter},
    errors::ServiceError,
    events::{Event, EventSender},
    models::LegStatus,
};

#[derive(Debug, Clone)]
pub struct NewTransportLeg {
    pub transporter_id: Uuid,
    pub collection_point_id: Uuid,
    pub amount: Decimal,
    pub notes: Option<String>,
}

/// Service for managing transport legs (pickup trips).
#[derive(Clone)]
pub struct TransportLegService {
    db: Arc<DbPool>,
    events: EventSender,
}

impl TransportLegService {
    pub fn new(db: Arc<DbPool>, events: EventSender) -> Self {
        Self { db, events }
    }

    /// Records a new pickup leg with its declared volume.
    #[instrument(skip(self))]
    pub async fn create_leg(
        &self,
        input: NewTransportLeg,
    ) -> Result<transport_leg::Model, ServiceError> {
        if input.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "declared amount must be greater than zero".to_string(),
            ));
        }

        let carrier = transporter::Entity::find_by_id(input.transporter_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Transporter {} not found", input.transporter_id))
            })?;
        if !carrier.active {
            return Err(ServiceError::InvalidInput(format!(
                "transporter {} is inactive",
                carrier.id
            )));
        }

        let poc = collection_point::Entity::find_by_id(input.collection_point_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Collection point {} not found",
                    input.collection_point_id
                ))
            })?;
        if !poc.active {
            return Err(ServiceError::InvalidInput(format!(
                "collection point {} is inactive",
                poc.id
            )));
        }

        let model = transport_leg::ActiveModel {
            id: Set(Uuid::new_v4()),
            transporter_id: Set(input.transporter_id),
            collection_point_id: Set(input.collection_point_id),
            amount: Set(input.amount),
            status: Set(LegStatus::Scheduled.to_string()),
            picked_up_at: Set(None),
            notes: Set(input.notes),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let created = model.insert(&*self.db).await?;

        self.events
            .send_or_log(Event::LegCreated {
                leg_id: created.id,
                transporter_id: created.transporter_id,
                amount: created.amount,
            })
            .await;

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_leg(&self, leg_id: Uuid) -> Result<transport_leg::Model, ServiceError> {
        transport_leg::Entity::find_by_id(leg_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Transport leg {} not found", leg_id)))
    }

    /// Lists legs with pagination and optional status/transporter filters,
    /// newest first.
    #[instrument(skip(self))]
    pub async fn list_legs(
        &self,
        page: u64,
        limit: u64,
        status: Option<LegStatus>,
        transporter_id: Option<Uuid>,
    ) -> Result<(Vec<transport_leg::Model>, u64), ServiceError> {
        let mut query = transport_leg::Entity::find();

        if let Some(status) = status {
            query = query.filter(transport_leg::Column::Status.eq(status.to_string()));
        }
        if let Some(transporter_id) = transporter_id {
            query = query.filter(transport_leg::Column::TransporterId.eq(transporter_id));
        }

        let paginator = query
            .order_by_desc(transport_leg::Column::CreatedAt)
            .paginate(&*self.db, limit);

        let total = paginator.num_items().await?;
        let legs = paginator.fetch_page(page - 1).await?;

        Ok((legs, total))
    }

    /// Applies a lifecycle transition. Entering `in_transit` stamps the
    /// pickup time.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        leg_id: Uuid,
        new_status: LegStatus,
    ) -> Result<transport_leg::Model, ServiceError> {
        let leg = self.get_leg(leg_id).await?;

        let current = LegStatus::from_str(&leg.status)
            .map_err(|_| ServiceError::InternalError(format!("bad leg status '{}'", leg.status)))?;

        if !current.can_transition_to(new_status) {
            return Err(ServiceError::InvalidStatus(format!(
                "cannot move leg from {} to {}",
                current, new_status
            )));
        }

        let old_status = leg.status.clone();
        let mut active: transport_leg::ActiveModel = leg.into();
        active.status = Set(new_status.to_string());
        if new_status == LegStatus::InTransit {
            active.picked_up_at = Set(Some(Utc::now()));
        }
        let updated = active.update(&*self.db).await?;

        self.events
            .send_or_log(Event::LegStatusChanged {
                leg_id,
                old_status,
                new_status: updated.status.clone(),
            })
            .await;

        Ok(updated)
    }

    /// Deletes a leg that has no derived deliveries. Legs with allocations
    /// must be cancelled instead so the ledger stays intact.
    #[instrument(skip(self))]
    pub async fn delete_leg(&self, leg_id: Uuid) -> Result<(), ServiceError> {
        let leg = self.get_leg(leg_id).await?;

        let derived_count = derived_delivery::Entity::find()
            .filter(derived_delivery::Column::TransportLegId.eq(leg_id))
            .count(&*self.db)
            .await?;
        if derived_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "leg {} has {} derived deliveries; cancel it instead of deleting",
                leg_id, derived_count
            )));
        }

        let active: transport_leg::ActiveModel = leg.into();
        active.delete(&*self.db).await?;
        Ok(())
    }
}
