use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A partial allocation of a transport leg's volume to a specific
/// destination (production site or diary shop).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "derived_deliveries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transport_leg_id: Uuid,
    /// "production" or "diary"
    pub destination_type: String,
    pub destination_id: Uuid,
    pub amount: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transport_leg::Entity",
        from = "Column::TransportLegId",
        to = "super::transport_leg::Column::Id"
    )]
    TransportLeg,
    #[sea_orm(has_one = "super::diary_receipt::Entity")]
    DiaryReceipt,
}

impl Related<super::transport_leg::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransportLeg.def()
    }
}

impl Related<super::diary_receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiaryReceipt.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
