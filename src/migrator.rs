use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_registry_tables::Migration),
            Box::new(m20240101_000003_create_transport_legs_table::Migration),
            Box::new(m20240101_000004_create_derived_deliveries_table::Migration),
            Box::new(m20240101_000005_create_diary_receipts_table::Migration),
            Box::new(m20240101_000006_create_daily_sales_table::Migration),
            Box::new(m20240101_000007_create_milk_requests_table::Migration),
            Box::new(m20240101_000008_create_auth_token_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(
                            ColumnDef::new(Users::Phone)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::Email).string().null().unique_key())
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(ColumnDef::new(Users::SiteId).uuid().null())
                        .col(
                            ColumnDef::new(Users::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Users::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_role")
                        .table(Users::Table)
                        .col(Users::Role)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Users {
        Table,
        Id,
        Name,
        Phone,
        Email,
        PasswordHash,
        Role,
        SiteId,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_registry_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_registry_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CollectionPoints::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CollectionPoints::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CollectionPoints::Name).string().not_null())
                        .col(
                            ColumnDef::new(CollectionPoints::District)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CollectionPoints::Sector).string().null())
                        .col(
                            ColumnDef::new(CollectionPoints::ContactPhone)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CollectionPoints::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(CollectionPoints::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CollectionPoints::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Transporters::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Transporters::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Transporters::Name).string().not_null())
                        .col(
                            ColumnDef::new(Transporters::Phone)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Transporters::PlateNumber).string().null())
                        .col(
                            ColumnDef::new(Transporters::CapacityLiters)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Transporters::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Transporters::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Transporters::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductionSites::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductionSites::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionSites::Name).string().not_null())
                        .col(
                            ColumnDef::new(ProductionSites::Location)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionSites::ContactPhone)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionSites::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(ProductionSites::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionSites::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DiaryShops::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DiaryShops::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DiaryShops::Name).string().not_null())
                        .col(ColumnDef::new(DiaryShops::Location).string().not_null())
                        .col(ColumnDef::new(DiaryShops::ContactPhone).string().not_null())
                        .col(
                            ColumnDef::new(DiaryShops::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(DiaryShops::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(DiaryShops::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DiaryShops::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ProductionSites::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Transporters::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CollectionPoints::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum CollectionPoints {
        Table,
        Id,
        Name,
        District,
        Sector,
        ContactPhone,
        Active,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Transporters {
        Table,
        Id,
        Name,
        Phone,
        PlateNumber,
        CapacityLiters,
        Active,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum ProductionSites {
        Table,
        Id,
        Name,
        Location,
        ContactPhone,
        Active,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum DiaryShops {
        Table,
        Id,
        Name,
        Location,
        ContactPhone,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_transport_legs_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_transport_legs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TransportLegs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TransportLegs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransportLegs::TransporterId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransportLegs::CollectionPointId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TransportLegs::Amount).decimal().not_null())
                        .col(ColumnDef::new(TransportLegs::Status).string().not_null())
                        .col(ColumnDef::new(TransportLegs::PickedUpAt).timestamp().null())
                        .col(ColumnDef::new(TransportLegs::Notes).string().null())
                        .col(
                            ColumnDef::new(TransportLegs::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TransportLegs::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transport_legs_transporter_id")
                                .from(TransportLegs::Table, TransportLegs::TransporterId)
                                .to(Transporters::Table, Transporters::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transport_legs_collection_point_id")
                                .from(TransportLegs::Table, TransportLegs::CollectionPointId)
                                .to(CollectionPoints::Table, CollectionPoints::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transport_legs_transporter_id")
                        .table(TransportLegs::Table)
                        .col(TransportLegs::TransporterId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transport_legs_status")
                        .table(TransportLegs::Table)
                        .col(TransportLegs::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transport_legs_created_at")
                        .table(TransportLegs::Table)
                        .col(TransportLegs::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TransportLegs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum TransportLegs {
        Table,
        Id,
        TransporterId,
        CollectionPointId,
        Amount,
        Status,
        PickedUpAt,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Transporters {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum CollectionPoints {
        Table,
        Id,
    }
}

mod m20240101_000004_create_derived_deliveries_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_derived_deliveries_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DerivedDeliveries::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DerivedDeliveries::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DerivedDeliveries::TransportLegId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DerivedDeliveries::DestinationType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DerivedDeliveries::DestinationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DerivedDeliveries::Amount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DerivedDeliveries::Status)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DerivedDeliveries::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DerivedDeliveries::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_derived_deliveries_transport_leg_id")
                                .from(DerivedDeliveries::Table, DerivedDeliveries::TransportLegId)
                                .to(TransportLegs::Table, TransportLegs::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_derived_deliveries_transport_leg_id")
                        .table(DerivedDeliveries::Table)
                        .col(DerivedDeliveries::TransportLegId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_derived_deliveries_status")
                        .table(DerivedDeliveries::Table)
                        .col(DerivedDeliveries::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DerivedDeliveries::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum DerivedDeliveries {
        Table,
        Id,
        TransportLegId,
        DestinationType,
        DestinationId,
        Amount,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum TransportLegs {
        Table,
        Id,
    }
}

mod m20240101_000005_create_diary_receipts_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_diary_receipts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DiaryReceipts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DiaryReceipts::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DiaryReceipts::DerivedDeliveryId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(DiaryReceipts::DiaryShopId).uuid().not_null())
                        .col(
                            ColumnDef::new(DiaryReceipts::DeclaredAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DiaryReceipts::ReceivedAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DiaryReceipts::Variance).decimal().not_null())
                        .col(ColumnDef::new(DiaryReceipts::Accepted).boolean().not_null())
                        .col(ColumnDef::new(DiaryReceipts::VerifiedBy).uuid().not_null())
                        .col(ColumnDef::new(DiaryReceipts::Notes).string().null())
                        .col(
                            ColumnDef::new(DiaryReceipts::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_diary_receipts_derived_delivery_id")
                                .from(DiaryReceipts::Table, DiaryReceipts::DerivedDeliveryId)
                                .to(DerivedDeliveries::Table, DerivedDeliveries::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_diary_receipts_diary_shop_id")
                        .table(DiaryReceipts::Table)
                        .col(DiaryReceipts::DiaryShopId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DiaryReceipts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum DiaryReceipts {
        Table,
        Id,
        DerivedDeliveryId,
        DiaryShopId,
        DeclaredAmount,
        ReceivedAmount,
        Variance,
        Accepted,
        VerifiedBy,
        Notes,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum DerivedDeliveries {
        Table,
        Id,
    }
}

mod m20240101_000006_create_daily_sales_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_daily_sales_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DailySales::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DailySales::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DailySales::DiaryShopId).uuid().not_null())
                        .col(ColumnDef::new(DailySales::Product).string().not_null())
                        .col(ColumnDef::new(DailySales::Quantity).decimal().not_null())
                        .col(ColumnDef::new(DailySales::UnitPrice).decimal().not_null())
                        .col(ColumnDef::new(DailySales::TotalAmount).decimal().not_null())
                        .col(ColumnDef::new(DailySales::SaleDate).timestamp().not_null())
                        .col(ColumnDef::new(DailySales::Status).string().not_null())
                        .col(ColumnDef::new(DailySales::PaymentMethod).string().not_null())
                        .col(ColumnDef::new(DailySales::Notes).string().null())
                        .col(ColumnDef::new(DailySales::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(DailySales::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_daily_sales_diary_shop_id")
                                .from(DailySales::Table, DailySales::DiaryShopId)
                                .to(DiaryShops::Table, DiaryShops::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_daily_sales_diary_shop_id")
                        .table(DailySales::Table)
                        .col(DailySales::DiaryShopId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_daily_sales_sale_date")
                        .table(DailySales::Table)
                        .col(DailySales::SaleDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DailySales::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum DailySales {
        Table,
        Id,
        DiaryShopId,
        Product,
        Quantity,
        UnitPrice,
        TotalAmount,
        SaleDate,
        Status,
        PaymentMethod,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum DiaryShops {
        Table,
        Id,
    }
}

mod m20240101_000007_create_milk_requests_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_milk_requests_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MilkRequests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MilkRequests::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MilkRequests::RequestingDiaryId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MilkRequests::SupplyingDiaryId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MilkRequests::Amount).decimal().not_null())
                        .col(ColumnDef::new(MilkRequests::Status).string().not_null())
                        .col(ColumnDef::new(MilkRequests::Description).string().null())
                        .col(
                            ColumnDef::new(MilkRequests::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MilkRequests::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_milk_requests_requesting_diary_id")
                                .from(MilkRequests::Table, MilkRequests::RequestingDiaryId)
                                .to(DiaryShops::Table, DiaryShops::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_milk_requests_supplying_diary_id")
                                .from(MilkRequests::Table, MilkRequests::SupplyingDiaryId)
                                .to(DiaryShops::Table, DiaryShops::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_milk_requests_status")
                        .table(MilkRequests::Table)
                        .col(MilkRequests::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MilkRequests::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum MilkRequests {
        Table,
        Id,
        RequestingDiaryId,
        SupplyingDiaryId,
        Amount,
        Status,
        Description,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum DiaryShops {
        Table,
        Id,
    }
}

mod m20240101_000008_create_auth_token_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_auth_token_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PasswordResetTokens::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PasswordResetTokens::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PasswordResetTokens::UserId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PasswordResetTokens::TokenHash)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PasswordResetTokens::ExpiresAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PasswordResetTokens::Used)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(PasswordResetTokens::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_password_reset_tokens_user_id")
                                .from(PasswordResetTokens::Table, PasswordResetTokens::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OtpCodes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OtpCodes::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OtpCodes::Phone).string().not_null())
                        .col(ColumnDef::new(OtpCodes::CodeHash).string().not_null())
                        .col(ColumnDef::new(OtpCodes::Purpose).string().not_null())
                        .col(ColumnDef::new(OtpCodes::ExpiresAt).timestamp().not_null())
                        .col(
                            ColumnDef::new(OtpCodes::Consumed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(OtpCodes::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_otp_codes_phone")
                        .table(OtpCodes::Table)
                        .col(OtpCodes::Phone)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OtpCodes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PasswordResetTokens::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum PasswordResetTokens {
        Table,
        Id,
        UserId,
        TokenHash,
        ExpiresAt,
        Used,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum OtpCodes {
        Table,
        Id,
        Phone,
        CodeHash,
        Purpose,
        ExpiresAt,
        Consumed,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }
}
