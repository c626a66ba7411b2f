use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One pickup trip moving a declared milk volume from a collection point
/// toward production/diary destinations.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transport_legs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transporter_id: Uuid,
    pub collection_point_id: Uuid,
    /// Declared pickup volume in liters
    pub amount: Decimal,
    pub status: String,
    pub picked_up_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transporter::Entity",
        from = "Column::TransporterId",
        to = "super::transporter::Column::Id"
    )]
    Transporter,
    #[sea_orm(
        belongs_to = "super::collection_point::Entity",
        from = "Column::CollectionPointId",
        to = "super::collection_point::Column::Id"
    )]
    CollectionPoint,
    #[sea_orm(has_many = "super::derived_delivery::Entity")]
    DerivedDeliveries,
}

impl Related<super::transporter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transporter.def()
    }
}

impl Related<super::collection_point::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CollectionPoint.def()
    }
}

impl Related<super::derived_delivery::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DerivedDeliveries.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(now);
            }
        } else {
            active_model.updated_at = Set(Some(now));
        }

        Ok(active_model)
    }
}
