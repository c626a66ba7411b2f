use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A milk transfer request between two diary shops.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "milk_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub requesting_diary_id: Uuid,
    pub supplying_diary_id: Uuid,
    pub amount: Decimal,
    pub status: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::diary_shop::Entity",
        from = "Column::RequestingDiaryId",
        to = "super::diary_shop::Column::Id"
    )]
    RequestingDiary,
    #[sea_orm(
        belongs_to = "super::diary_shop::Entity",
        from = "Column::SupplyingDiaryId",
        to = "super::diary_shop::Column::Id"
    )]
    SupplyingDiary,
}

impl ActiveModelBehavior for ActiveModel {}
