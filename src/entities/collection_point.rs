use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A site where farmers' milk is gathered before transport.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "collection_points")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub district: String,
    pub sector: Option<String>,
    pub contact_phone: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transport_leg::Entity")]
    TransportLegs,
}

impl Related<super::transport_leg::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransportLegs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
