//! CRUD for the site/actor registry: collection points, transporters,
//! production sites and diary shops. Mutation is management-only (enforced
//! at the router); deletes are refused while live records still reference
//! the row.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        collection_point, daily_sale, derived_delivery, diary_shop, milk_request,
        production_site, transport_leg, transporter,
    },
    errors::ServiceError,
    models::DestinationType,
};

#[derive(Debug, Clone)]
pub struct NewCollectionPoint {
    pub name: String,
    pub district: String,
    pub sector: Option<String>,
    pub contact_phone: String,
}

#[derive(Debug, Clone)]
pub struct NewTransporter {
    pub name: String,
    pub phone: String,
    pub plate_number: Option<String>,
    pub capacity_liters: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewSite {
    pub name: String,
    pub location: String,
    pub contact_phone: String,
}

#[derive(Debug, Clone, Default)]
pub struct SiteUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub contact_phone: Option<String>,
    pub active: Option<bool>,
}

#[derive(Clone)]
pub struct RegistryService {
    db: Arc<DbPool>,
}

impl RegistryService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    // --- collection points ---

    #[instrument(skip(self))]
    pub async fn create_collection_point(
        &self,
        input: NewCollectionPoint,
    ) -> Result<collection_point::Model, ServiceError> {
        let model = collection_point::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            district: Set(input.district),
            sector: Set(input.sector),
            contact_phone: Set(input.contact_phone),
            active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        Ok(model.insert(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_collection_point(
        &self,
        id: Uuid,
    ) -> Result<collection_point::Model, ServiceError> {
        collection_point::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Collection point {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_collection_points(
        &self,
        page: u64,
        limit: u64,
        active: Option<bool>,
    ) -> Result<(Vec<collection_point::Model>, u64), ServiceError> {
        let mut query = collection_point::Entity::find();
        if let Some(active) = active {
            query = query.filter(collection_point::Column::Active.eq(active));
        }
        let paginator = query
            .order_by_asc(collection_point::Column::Name)
            .paginate(&*self.db, limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;
        Ok((items, total))
    }

    #[instrument(skip(self))]
    pub async fn update_collection_point(
        &self,
        id: Uuid,
        update: SiteUpdate,
    ) -> Result<collection_point::Model, ServiceError> {
        let existing = self.get_collection_point(id).await?;
        let mut active_model: collection_point::ActiveModel = existing.into();
        if let Some(name) = update.name {
            active_model.name = Set(name);
        }
        if let Some(location) = update.location {
            active_model.district = Set(location);
        }
        if let Some(phone) = update.contact_phone {
            active_model.contact_phone = Set(phone);
        }
        if let Some(active) = update.active {
            active_model.active = Set(active);
        }
        active_model.updated_at = Set(Some(Utc::now()));
        Ok(active_model.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_collection_point(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_collection_point(id).await?;

        let referenced = transport_leg::Entity::find()
            .filter(transport_leg::Column::CollectionPointId.eq(id))
            .count(&*self.db)
            .await?;
        if referenced > 0 {
            return Err(ServiceError::Conflict(format!(
                "collection point {} is referenced by {} transport legs",
                id, referenced
            )));
        }

        existing.delete(&*self.db).await?;
        Ok(())
    }

    // --- transporters ---

    #[instrument(skip(self))]
    pub async fn create_transporter(
        &self,
        input: NewTransporter,
    ) -> Result<transporter::Model, ServiceError> {
        if input.capacity_liters < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "capacity cannot be negative".to_string(),
            ));
        }
        let model = transporter::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            phone: Set(input.phone),
            plate_number: Set(input.plate_number),
            capacity_liters: Set(input.capacity_liters),
            active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        Ok(model.insert(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_transporter(&self, id: Uuid) -> Result<transporter::Model, ServiceError> {
        transporter::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Transporter {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_transporters(
        &self,
        page: u64,
        limit: u64,
        active: Option<bool>,
    ) -> Result<(Vec<transporter::Model>, u64), ServiceError> {
        let mut query = transporter::Entity::find();
        if let Some(active) = active {
            query = query.filter(transporter::Column::Active.eq(active));
        }
        let paginator = query
            .order_by_asc(transporter::Column::Name)
            .paginate(&*self.db, limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;
        Ok((items, total))
    }

    #[instrument(skip(self))]
    pub async fn update_transporter(
        &self,
        id: Uuid,
        update: SiteUpdate,
    ) -> Result<transporter::Model, ServiceError> {
        let existing = self.get_transporter(id).await?;
        let mut active_model: transporter::ActiveModel = existing.into();
        if let Some(name) = update.name {
            active_model.name = Set(name);
        }
        if let Some(phone) = update.contact_phone {
            active_model.phone = Set(phone);
        }
        if let Some(active) = update.active {
            active_model.active = Set(active);
        }
        active_model.updated_at = Set(Some(Utc::now()));
        Ok(active_model.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_transporter(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_transporter(id).await?;

        let referenced = transport_leg::Entity::find()
            .filter(transport_leg::Column::TransporterId.eq(id))
            .count(&*self.db)
            .await?;
        if referenced > 0 {
            return Err(ServiceError::Conflict(format!(
                "transporter {} is referenced by {} transport legs",
                id, referenced
            )));
        }

        existing.delete(&*self.db).await?;
        Ok(())
    }

    // --- production sites ---

    #[instrument(skip(self))]
    pub async fn create_production_site(
        &self,
        input: NewSite,
    ) -> Result<production_site::Model, ServiceError> {
        let model = production_site::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            location: Set(input.location),
            contact_phone: Set(input.contact_phone),
            active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        Ok(model.insert(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_production_site(
        &self,
        id: Uuid,
    ) -> Result<production_site::Model, ServiceError> {
        production_site::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Production site {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_production_sites(
        &self,
        page: u64,
        limit: u64,
        active: Option<bool>,
    ) -> Result<(Vec<production_site::Model>, u64), ServiceError> {
        let mut query = production_site::Entity::find();
        if let Some(active) = active {
            query = query.filter(production_site::Column::Active.eq(active));
        }
        let paginator = query
            .order_by_asc(production_site::Column::Name)
            .paginate(&*self.db, limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;
        Ok((items, total))
    }

    #[instrument(skip(self))]
    pub async fn update_production_site(
        &self,
        id: Uuid,
        update: SiteUpdate,
    ) -> Result<production_site::Model, ServiceError> {
        let existing = self.get_production_site(id).await?;
        let mut active_model: production_site::ActiveModel = existing.into();
        if let Some(name) = update.name {
            active_model.name = Set(name);
        }
        if let Some(location) = update.location {
            active_model.location = Set(location);
        }
        if let Some(phone) = update.contact_phone {
            active_model.contact_phone = Set(phone);
        }
        if let Some(active) = update.active {
            active_model.active = Set(active);
        }
        active_model.updated_at = Set(Some(Utc::now()));
        Ok(active_model.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_production_site(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_production_site(id).await?;

        let referenced = derived_delivery::Entity::find()
            .filter(
                derived_delivery::Column::DestinationType
                    .eq(DestinationType::Production.to_string()),
            )
            .filter(derived_delivery::Column::DestinationId.eq(id))
            .count(&*self.db)
            .await?;
        if referenced > 0 {
            return Err(ServiceError::Conflict(format!(
                "production site {} is referenced by {} deliveries",
                id, referenced
            )));
        }

        existing.delete(&*self.db).await?;
        Ok(())
    }

    // --- diary shops ---

    #[instrument(skip(self))]
    pub async fn create_diary_shop(
        &self,
        input: NewSite,
    ) -> Result<diary_shop::Model, ServiceError> {
        let model = diary_shop::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            location: Set(input.location),
            contact_phone: Set(input.contact_phone),
            active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        Ok(model.insert(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_diary_shop(&self, id: Uuid) -> Result<diary_shop::Model, ServiceError> {
        diary_shop::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Diary shop {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_diary_shops(
        &self,
        page: u64,
        limit: u64,
        active: Option<bool>,
    ) -> Result<(Vec<diary_shop::Model>, u64), ServiceError> {
        let mut query = diary_shop::Entity::find();
        if let Some(active) = active {
            query = query.filter(diary_shop::Column::Active.eq(active));
        }
        let paginator = query
            .order_by_asc(diary_shop::Column::Name)
            .paginate(&*self.db, limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;
        Ok((items, total))
    }

    #[instrument(skip(self))]
    pub async fn update_diary_shop(
        &self,
        id: Uuid,
        update: SiteUpdate,
    ) -> Result<diary_shop::Model, ServiceError> {
        let existing = self.get_diary_shop(id).await?;
        let mut active_model: diary_shop::ActiveModel = existing.into();
        if let Some(name) = update.name {
            active_model.name = Set(name);
        }
        if let Some(location) = update.location {
            active_model.location = Set(location);
        }
        if let Some(phone) = update.contact_phone {
            active_model.contact_phone = Set(phone);
        }
        if let Some(active) = update.active {
            active_model.active = Set(active);
        }
        active_model.updated_at = Set(Some(Utc::now()));
        Ok(active_model.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_diary_shop(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_diary_shop(id).await?;

        let sales = daily_sale::Entity::find()
            .filter(daily_sale::Column::DiaryShopId.eq(id))
            .count(&*self.db)
            .await?;
        let requests = milk_request::Entity::find()
            .filter(
                Condition::any()
                    .add(milk_request::Column::RequestingDiaryId.eq(id))
                    .add(milk_request::Column::SupplyingDiaryId.eq(id)),
            )
            .count(&*self.db)
            .await?;
        let deliveries = derived_delivery::Entity::find()
            .filter(derived_delivery::Column::DestinationType.eq(DestinationType::Diary.to_string()))
            .filter(derived_delivery::Column::DestinationId.eq(id))
            .count(&*self.db)
            .await?;

        if sales + requests + deliveries > 0 {
            return Err(ServiceError::Conflict(format!(
                "diary shop {} still has sales, requests or deliveries",
                id
            )));
        }

        existing.delete(&*self.db).await?;
        Ok(())
    }
}
