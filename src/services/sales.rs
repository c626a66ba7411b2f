use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{daily_sale, diary_shop},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{PaymentMethod, SaleProduct, SaleStatus},
};

#[derive(Debug, Clone)]
pub struct NewDailySale {
    pub diary_shop_id: Uuid,
    pub product: SaleProduct,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub sale_date: Option<DateTime<Utc>>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateDailySale {
    pub product: Option<SaleProduct>,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    pub diary_shop_id: Option<Uuid>,
    pub status: Option<SaleStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Per-product slice of the sales summary.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductSummary {
    pub product: String,
    pub count: u64,
    pub total_quantity: Decimal,
    pub total_amount: Decimal,
}

/// Aggregated sales report, computed server-side.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SalesSummary {
    pub count: u64,
    pub total_quantity: Decimal,
    pub total_amount: Decimal,
    pub average_sale: Decimal,
    pub per_product: Vec<ProductSummary>,
}

/// Service for diary shop daily sales. Totals are always recomputed from
/// quantity and unit price; a client-supplied total is never trusted.
#[derive(Clone)]
pub struct SaleService {
    db: Arc<DbPool>,
    events: EventSender,
}

impl SaleService {
    pub fn new(db: Arc<DbPool>, events: EventSender) -> Self {
        Self { db, events }
    }

    fn check_amounts(quantity: Decimal, unit_price: Decimal) -> Result<(), ServiceError> {
        if quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "quantity must be greater than zero".to_string(),
            ));
        }
        if unit_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "unit price cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn create_sale(
        &self,
        input: NewDailySale,
    ) -> Result<daily_sale::Model, ServiceError> {
        Self::check_amounts(input.quantity, input.unit_price)?;

        diary_shop::Entity::find_by_id(input.diary_shop_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Diary shop {} not found", input.diary_shop_id))
            })?;

        let total_amount = input.quantity * input.unit_price;

        let model = daily_sale::ActiveModel {
            id: Set(Uuid::new_v4()),
            diary_shop_id: Set(input.diary_shop_id),
            product: Set(input.product.to_string()),
            quantity: Set(input.quantity),
            unit_price: Set(input.unit_price),
            total_amount: Set(total_amount),
            sale_date: Set(input.sale_date.unwrap_or_else(Utc::now)),
            status: Set(SaleStatus::Pending.to_string()),
            payment_method: Set(input.payment_method.to_string()),
            notes: Set(input.notes),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let created = model.insert(&*self.db).await?;

        self.events
            .send_or_log(Event::SaleRecorded {
                sale_id: created.id,
                diary_shop_id: created.diary_shop_id,
                total_amount: created.total_amount,
            })
            .await;

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_sale(&self, sale_id: Uuid) -> Result<daily_sale::Model, ServiceError> {
        daily_sale::Entity::find_by_id(sale_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Daily sale {} not found", sale_id)))
    }

    #[instrument(skip(self))]
    pub async fn list_sales(
        &self,
        page: u64,
        limit: u64,
        filter: SaleFilter,
    ) -> Result<(Vec<daily_sale::Model>, u64), ServiceError> {
        let paginator = self
            .filtered_query(&filter)
            .order_by_desc(daily_sale::Column::SaleDate)
            .paginate(&*self.db, limit);

        let total = paginator.num_items().await?;
        let sales = paginator.fetch_page(page - 1).await?;

        Ok((sales, total))
    }

    fn filtered_query(&self, filter: &SaleFilter) -> sea_orm::Select<daily_sale::Entity> {
        let mut query = daily_sale::Entity::find();

        if let Some(diary_shop_id) = filter.diary_shop_id {
            query = query.filter(daily_sale::Column::DiaryShopId.eq(diary_shop_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(daily_sale::Column::Status.eq(status.to_string()));
        }
        if let Some(from) = filter.from {
            query = query.filter(daily_sale::Column::SaleDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(daily_sale::Column::SaleDate.lte(to));
        }

        query
    }

    /// Edits a pending sale. Quantity/price changes recompute the stored
    /// total.
    #[instrument(skip(self))]
    pub async fn update_sale(
        &self,
        sale_id: Uuid,
        input: UpdateDailySale,
    ) -> Result<daily_sale::Model, ServiceError> {
        let sale = self.get_sale(sale_id).await?;

        let status = SaleStatus::from_str(&sale.status).map_err(|_| {
            ServiceError::InternalError(format!("bad sale status '{}'", sale.status))
        })?;
        if status != SaleStatus::Pending {
            return Err(ServiceError::InvalidStatus(format!(
                "only pending sales can be edited, this one is {}",
                sale.status
            )));
        }

        let quantity = input.quantity.unwrap_or(sale.quantity);
        let unit_price = input.unit_price.unwrap_or(sale.unit_price);
        Self::check_amounts(quantity, unit_price)?;

        let mut active: daily_sale::ActiveModel = sale.into();
        if let Some(product) = input.product {
            active.product = Set(product.to_string());
        }
        active.quantity = Set(quantity);
        active.unit_price = Set(unit_price);
        active.total_amount = Set(quantity * unit_price);
        if let Some(notes) = input.notes {
            active.notes = Set(Some(notes));
        }

        let updated = active.update(&*self.db).await?;
        Ok(updated)
    }

    /// Deletes a sale. A second delete of the same id returns 404.
    #[instrument(skip(self))]
    pub async fn delete_sale(&self, sale_id: Uuid) -> Result<(), ServiceError> {
        let sale = self.get_sale(sale_id).await?;
        sale.delete(&*self.db).await?;
        Ok(())
    }

    /// Management approval/rejection of a pending sale.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        sale_id: Uuid,
        new_status: SaleStatus,
    ) -> Result<daily_sale::Model, ServiceError> {
        let sale = self.get_sale(sale_id).await?;

        let current = SaleStatus::from_str(&sale.status).map_err(|_| {
            ServiceError::InternalError(format!("bad sale status '{}'", sale.status))
        })?;
        if !current.can_transition_to(new_status) {
            return Err(ServiceError::InvalidStatus(format!(
                "cannot move sale from {} to {}",
                current, new_status
            )));
        }

        let mut active: daily_sale::ActiveModel = sale.into();
        active.status = Set(new_status.to_string());
        let updated = active.update(&*self.db).await?;

        self.events
            .send_or_log(Event::SaleStatusChanged {
                sale_id,
                new_status: updated.status.clone(),
            })
            .await;

        Ok(updated)
    }

    /// Count / totals / average over the filtered sales, grouped per product.
    #[instrument(skip(self))]
    pub async fn summary(&self, filter: SaleFilter) -> Result<SalesSummary, ServiceError> {
        let sales = self.filtered_query(&filter).all(&*self.db).await?;

        let count = sales.len() as u64;
        let total_quantity = sales
            .iter()
            .fold(Decimal::ZERO, |acc, s| acc + s.quantity);
        let total_amount = sales
            .iter()
            .fold(Decimal::ZERO, |acc, s| acc + s.total_amount);
        let average_sale = if count > 0 {
            total_amount / Decimal::from(count)
        } else {
            Decimal::ZERO
        };

        let mut per_product: BTreeMap<String, ProductSummary> = BTreeMap::new();
        for sale in &sales {
            let entry = per_product
                .entry(sale.product.clone())
                .or_insert_with(|| ProductSummary {
                    product: sale.product.clone(),
                    count: 0,
                    total_quantity: Decimal::ZERO,
                    total_amount: Decimal::ZERO,
                });
            entry.count += 1;
            entry.total_quantity += sale.quantity;
            entry.total_amount += sale.total_amount;
        }

        Ok(SalesSummary {
            count,
            total_quantity,
            total_amount,
            average_sale,
            per_product: per_product.into_values().collect(),
        })
    }
}
