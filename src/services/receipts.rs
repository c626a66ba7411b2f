use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{derived_delivery, diary_receipt, transport_leg, transporter},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{DeliveryStatus, DestinationType},
};

#[derive(Debug, Clone)]
pub struct VerifyDelivery {
    pub received_amount: Decimal,
    pub accepted: bool,
    pub notes: Option<String>,
}

/// Diary-side receipt verification. The operator's submitted quantity is
/// accepted even when it differs from the declared one; the difference is
/// recorded as a variance instead of blocking the receipt.
#[derive(Clone)]
pub struct ReceiptService {
    db: Arc<DbPool>,
    events: EventSender,
}

impl ReceiptService {
    pub fn new(db: Arc<DbPool>, events: EventSender) -> Self {
        Self { db, events }
    }

    /// Verifies a pending delivery: stores the receipt with its variance and
    /// marks the delivery verified or rejected. A delivery can be verified
    /// exactly once.
    #[instrument(skip(self, input))]
    pub async fn verify_delivery(
        &self,
        delivery_id: Uuid,
        input: VerifyDelivery,
        verified_by: Uuid,
    ) -> Result<diary_receipt::Model, ServiceError> {
        if input.received_amount < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "received amount cannot be negative".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let delivery = derived_delivery::Entity::find_by_id(delivery_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Derived delivery {} not found", delivery_id))
            })?;

        let status = DeliveryStatus::from_str(&delivery.status).map_err(|_| {
            ServiceError::InternalError(format!("bad delivery status '{}'", delivery.status))
        })?;
        if status != DeliveryStatus::Pending {
            return Err(ServiceError::Conflict(format!(
                "delivery {} was already {}",
                delivery_id, delivery.status
            )));
        }

        let destination_type = DestinationType::from_str(&delivery.destination_type)
            .map_err(|_| {
                ServiceError::InternalError(format!(
                    "bad destination type '{}'",
                    delivery.destination_type
                ))
            })?;
        if destination_type != DestinationType::Diary {
            return Err(ServiceError::InvalidInput(
                "only deliveries to diary shops are verified through receipts".to_string(),
            ));
        }

        let variance = input.received_amount - delivery.amount;

        let receipt = diary_receipt::ActiveModel {
            id: Set(Uuid::new_v4()),
            derived_delivery_id: Set(delivery.id),
            diary_shop_id: Set(delivery.destination_id),
            declared_amount: Set(delivery.amount),
            received_amount: Set(input.received_amount),
            variance: Set(variance),
            accepted: Set(input.accepted),
            verified_by: Set(verified_by),
            notes: Set(input.notes),
            created_at: Set(Utc::now()),
        };
        let receipt = receipt.insert(&txn).await?;

        let new_status = if input.accepted {
            DeliveryStatus::Verified
        } else {
            DeliveryStatus::Rejected
        };
        let leg_id = delivery.transport_leg_id;
        let mut active: derived_delivery::ActiveModel = delivery.into();
        active.status = Set(new_status.to_string());
        active.updated_at = Set(Some(Utc::now()));
        active.update(&txn).await?;

        txn.commit().await?;

        // The transporter gets an SMS either way; look their phone up best-effort.
        if let Some(phone) = self.transporter_phone_for_leg(leg_id).await {
            self.events
                .send_or_log(Event::DeliveryVerified {
                    delivery_id,
                    accepted: input.accepted,
                    variance,
                    transporter_phone: phone,
                })
                .await;
        }

        Ok(receipt)
    }

    async fn transporter_phone_for_leg(&self, leg_id: Uuid) -> Option<String> {
        let leg = transport_leg::Entity::find_by_id(leg_id)
            .one(&*self.db)
            .await
            .ok()??;
        let carrier = transporter::Entity::find_by_id(leg.transporter_id)
            .one(&*self.db)
            .await
            .ok()??;
        Some(carrier.phone)
    }

    /// Paginated receipt history for a diary shop, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_diary(
        &self,
        diary_shop_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<diary_receipt::Model>, u64), ServiceError> {
        let paginator = diary_receipt::Entity::find()
            .filter(diary_receipt::Column::DiaryShopId.eq(diary_shop_id))
            .order_by_desc(diary_receipt::Column::CreatedAt)
            .paginate(&*self.db, limit);

        let total = paginator.num_items().await?;
        let receipts = paginator.fetch_page(page - 1).await?;

        Ok((receipts, total))
    }
}
