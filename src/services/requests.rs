use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use chrono::Utc;
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{diary_shop, milk_request},
    errors::ServiceError,
    events::{Event, EventSender},
    models::RequestStatus,
};

#[derive(Debug, Clone)]
pub struct NewMilkRequest {
    pub requesting_diary_id: Uuid,
    pub supplying_diary_id: Uuid,
    pub amount: Decimal,
    pub description: Option<String>,
}

/// Service for milk transfer requests between diary shops.
#[derive(Clone)]
pub struct MilkRequestService {
    db: Arc<DbPool>,
    events: EventSender,
}

impl MilkRequestService {
    pub fn new(db: Arc<DbPool>, events: EventSender) -> Self {
        Self { db, events }
    }

    #[instrument(skip(self))]
    pub async fn create_request(
        &self,
        input: NewMilkRequest,
    ) -> Result<milk_request::Model, ServiceError> {
        if input.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "amount must be greater than zero".to_string(),
            ));
        }
        if input.requesting_diary_id == input.supplying_diary_id {
            return Err(ServiceError::ValidationError(
                "a diary shop cannot request milk from itself".to_string(),
            ));
        }

        for diary_id in [input.requesting_diary_id, input.supplying_diary_id] {
            diary_shop::Entity::find_by_id(diary_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Diary shop {} not found", diary_id))
                })?;
        }

        let model = milk_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            requesting_diary_id: Set(input.requesting_diary_id),
            supplying_diary_id: Set(input.supplying_diary_id),
            amount: Set(input.amount),
            status: Set(RequestStatus::Pending.to_string()),
            description: Set(input.description),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let created = model.insert(&*self.db).await?;

        self.events
            .send_or_log(Event::MilkRequestCreated {
                request_id: created.id,
                amount: created.amount,
            })
            .await;

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_request(&self, request_id: Uuid) -> Result<milk_request::Model, ServiceError> {
        milk_request::Entity::find_by_id(request_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Milk request {} not found", request_id))
            })
    }

    /// Lists requests, optionally filtered by status or by a diary on either
    /// side of the transfer.
    #[instrument(skip(self))]
    pub async fn list_requests(
        &self,
        page: u64,
        limit: u64,
        status: Option<RequestStatus>,
        diary_id: Option<Uuid>,
    ) -> Result<(Vec<milk_request::Model>, u64), ServiceError> {
        let mut query = milk_request::Entity::find();

        if let Some(status) = status {
            query = query.filter(milk_request::Column::Status.eq(status.to_string()));
        }
        if let Some(diary_id) = diary_id {
            query = query.filter(
                Condition::any()
                    .add(milk_request::Column::RequestingDiaryId.eq(diary_id))
                    .add(milk_request::Column::SupplyingDiaryId.eq(diary_id)),
            );
        }

        let paginator = query
            .order_by_desc(milk_request::Column::CreatedAt)
            .paginate(&*self.db, limit);

        let total = paginator.num_items().await?;
        let requests = paginator.fetch_page(page - 1).await?;

        Ok((requests, total))
    }

    /// Applies a lifecycle transition and notifies the requesting diary when
    /// a decision lands.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        request_id: Uuid,
        new_status: RequestStatus,
    ) -> Result<milk_request::Model, ServiceError> {
        let request = self.get_request(request_id).await?;

        let current = RequestStatus::from_str(&request.status).map_err(|_| {
            ServiceError::InternalError(format!("bad request status '{}'", request.status))
        })?;
        if !current.can_transition_to(new_status) {
            return Err(ServiceError::InvalidStatus(format!(
                "cannot move request from {} to {}",
                current, new_status
            )));
        }

        let requesting_diary_id = request.requesting_diary_id;
        let mut active: milk_request::ActiveModel = request.into();
        active.status = Set(new_status.to_string());
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&*self.db).await?;

        if matches!(
            new_status,
            RequestStatus::Accepted | RequestStatus::Rejected | RequestStatus::Completed
        ) {
            if let Ok(Some(diary)) = diary_shop::Entity::find_by_id(requesting_diary_id)
                .one(&*self.db)
                .await
            {
                self.events
                    .send_or_log(Event::MilkRequestDecided {
                        request_id,
                        new_status: updated.status.clone(),
                        requesting_contact: diary.contact_phone,
                    })
                    .await;
            }
        }

        Ok(updated)
    }

    /// Deletes a pending or cancelled request. Decided requests are part of
    /// the ledger and stay.
    #[instrument(skip(self))]
    pub async fn delete_request(&self, request_id: Uuid) -> Result<(), ServiceError> {
        let request = self.get_request(request_id).await?;

        let status = RequestStatus::from_str(&request.status).map_err(|_| {
            ServiceError::InternalError(format!("bad request status '{}'", request.status))
        })?;
        if !matches!(status, RequestStatus::Pending | RequestStatus::Cancelled) {
            return Err(ServiceError::Conflict(format!(
                "request {} is {} and cannot be deleted",
                request_id, request.status
            )));
        }

        request.delete(&*self.db).await?;
        Ok(())
    }
}
