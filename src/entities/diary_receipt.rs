use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Diary-side verification of a derived delivery. The variance between the
/// declared and received volume is stored, not just displayed.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "diary_receipts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub derived_delivery_id: Uuid,
    pub diary_shop_id: Uuid,
    pub declared_amount: Decimal,
    pub received_amount: Decimal,
    /// received_amount - declared_amount
    pub variance: Decimal,
    pub accepted: bool,
    pub verified_by: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::derived_delivery::Entity",
        from = "Column::DerivedDeliveryId",
        to = "super::derived_delivery::Column::Id"
    )]
    DerivedDelivery,
    #[sea_orm(
        belongs_to = "super::diary_shop::Entity",
        from = "Column::DiaryShopId",
        to = "super::diary_shop::Column::Id"
    )]
    DiaryShop,
}

impl Related<super::derived_delivery::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DerivedDelivery.def()
    }
}

impl Related<super::diary_shop::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiaryShop.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
