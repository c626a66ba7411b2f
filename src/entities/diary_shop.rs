use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A retail/processing site that receives milk and records sales.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "diary_shops")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub contact_phone: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::daily_sale::Entity")]
    DailySales,
    #[sea_orm(has_many = "super::diary_receipt::Entity")]
    DiaryReceipts,
}

impl Related<super::daily_sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailySales.def()
    }
}

impl Related<super::diary_receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiaryReceipts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
