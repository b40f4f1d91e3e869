use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_toner_tables::Migration),
            Box::new(m20240301_000002_create_quality_tables::Migration),
            Box::new(m20240301_000003_create_tco_tables::Migration),
            Box::new(m20240301_000004_create_audit_tables::Migration),
            Box::new(m20240301_000005_create_movement_and_instruction_tables::Migration),
            Box::new(m20240301_000006_create_user_tables::Migration),
        ]
    }
}

mod m20240301_000001_create_toner_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_toner_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Toners::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Toners::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Toners::Model).string().not_null())
                        .col(ColumnDef::new(Toners::GrossWeight).decimal().not_null())
                        .col(ColumnDef::new(Toners::EmptyWeight).decimal().not_null())
                        .col(
                            ColumnDef::new(Toners::CompatiblePrinters)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Toners::Color).string_len(16).not_null())
                        .col(ColumnDef::new(Toners::PrintCoverage).decimal().not_null())
                        .col(ColumnDef::new(Toners::PageYield).integer().not_null())
                        .col(ColumnDef::new(Toners::Kind).string_len(16).not_null())
                        .col(ColumnDef::new(Toners::UnitPrice).decimal().not_null())
                        .col(ColumnDef::new(Toners::PricePerPage).decimal().not_null())
                        .col(ColumnDef::new(Toners::NetWeight).decimal().not_null())
                        .col(
                            ColumnDef::new(Toners::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Toners::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Units::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Units::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Units::Name).string().not_null())
                        .col(
                            ColumnDef::new(Units::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ReturnedUnits::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReturnedUnits::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ReturnedUnits::ClientCode).integer().not_null())
                        .col(ColumnDef::new(ReturnedUnits::TonerId).uuid().not_null())
                        .col(ColumnDef::new(ReturnedUnits::UnitId).uuid().not_null())
                        .col(
                            ColumnDef::new(ReturnedUnits::ReturnedWeight)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReturnedUnits::Destination)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReturnedUnits::RemainingWeight)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReturnedUnits::RemainingPages)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReturnedUnits::UsablePercentage)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReturnedUnits::RecoveredValue)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReturnedUnits::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_returned_units_toner")
                                .from(ReturnedUnits::Table, ReturnedUnits::TonerId)
                                .to(Toners::Table, Toners::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_returned_units_unit")
                                .from(ReturnedUnits::Table, ReturnedUnits::UnitId)
                                .to(Units::Table, Units::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_returned_units_created_at")
                        .table(ReturnedUnits::Table)
                        .col(ReturnedUnits::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ReturnedUnits::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Units::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Toners::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Toners {
        Table,
        Id,
        Model,
        GrossWeight,
        EmptyWeight,
        CompatiblePrinters,
        Color,
        PrintCoverage,
        PageYield,
        Kind,
        UnitPrice,
        PricePerPage,
        NetWeight,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Units {
        Table,
        Id,
        Name,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum ReturnedUnits {
        Table,
        Id,
        ClientCode,
        TonerId,
        UnitId,
        ReturnedWeight,
        Destination,
        RemainingWeight,
        RemainingPages,
        UsablePercentage,
        RecoveredValue,
        CreatedAt,
    }
}

mod m20240301_000002_create_quality_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_quality_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(WarrantyClaims::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WarrantyClaims::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WarrantyClaims::Requester).string().not_null())
                        .col(ColumnDef::new(WarrantyClaims::RequestedOn).date().not_null())
                        .col(ColumnDef::new(WarrantyClaims::ProductCode).string().not_null())
                        .col(ColumnDef::new(WarrantyClaims::SerialNumber).string().not_null())
                        .col(
                            ColumnDef::new(WarrantyClaims::ItemType)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarrantyClaims::PurchaseInvoice)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarrantyClaims::ShipmentInvoice)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarrantyClaims::ReturnInvoice)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarrantyClaims::PurchaseInvoiceKey)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarrantyClaims::ShipmentInvoiceKey)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarrantyClaims::ReturnInvoiceKey)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WarrantyClaims::WarrantyDate).date().null())
                        .col(ColumnDef::new(WarrantyClaims::TicketNumber).string().not_null())
                        .col(
                            ColumnDef::new(WarrantyClaims::Status)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(WarrantyClaims::Supplier).string().not_null())
                        .col(
                            ColumnDef::new(WarrantyClaims::Quantity)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(WarrantyClaims::DefectNotes).text().not_null())
                        .col(
                            ColumnDef::new(WarrantyClaims::TotalValue)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(WarrantyClaims::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarrantyClaims::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(NonConformities::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(NonConformities::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(NonConformities::Number)
                                .string_len(16)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(NonConformities::OpenedBy).string().not_null())
                        .col(ColumnDef::new(NonConformities::Description).text().not_null())
                        .col(
                            ColumnDef::new(NonConformities::Kind)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(NonConformities::Severity)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(NonConformities::Department).string().not_null())
                        .col(ColumnDef::new(NonConformities::RootCause).text().not_null())
                        .col(
                            ColumnDef::new(NonConformities::ImmediateAction)
                                .text()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(NonConformities::ActionOwner)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(NonConformities::DueDate).date().not_null())
                        .col(
                            ColumnDef::new(NonConformities::SolutionEvidence)
                                .text()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(NonConformities::Status)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(NonConformities::ClosedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(NonConformities::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(NonConformities::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(NcSequences::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(NcSequences::Year)
                                .integer()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(NcSequences::LastValue)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(NcSequences::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(NonConformities::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(WarrantyClaims::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum WarrantyClaims {
        Table,
        Id,
        Requester,
        RequestedOn,
        ProductCode,
        SerialNumber,
        ItemType,
        PurchaseInvoice,
        ShipmentInvoice,
        ReturnInvoice,
        PurchaseInvoiceKey,
        ShipmentInvoiceKey,
        ReturnInvoiceKey,
        WarrantyDate,
        TicketNumber,
        Status,
        Supplier,
        Quantity,
        DefectNotes,
        TotalValue,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum NonConformities {
        Table,
        Id,
        Number,
        OpenedBy,
        Description,
        Kind,
        Severity,
        Department,
        RootCause,
        ImmediateAction,
        ActionOwner,
        DueDate,
        SolutionEvidence,
        Status,
        ClosedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum NcSequences {
        Table,
        Year,
        LastValue,
    }
}

mod m20240301_000003_create_tco_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_tco_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Tcos::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Tcos::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Tcos::Model).string().not_null())
                        .col(ColumnDef::new(Tcos::Manufacturer).string().not_null())
                        .col(ColumnDef::new(Tcos::Kind).string().not_null())
                        .col(ColumnDef::new(Tcos::DevicePrice).decimal().not_null())
                        .col(ColumnDef::new(Tcos::Pis).decimal().not_null().default(0))
                        .col(ColumnDef::new(Tcos::Ipi).decimal().not_null().default(0))
                        .col(ColumnDef::new(Tcos::Icms).decimal().not_null().default(0))
                        .col(ColumnDef::new(Tcos::Cofins).decimal().not_null().default(0))
                        .col(
                            ColumnDef::new(Tcos::Accessories)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Tcos::Notes).text().null())
                        .col(ColumnDef::new(Tcos::AcquisitionTotal).decimal().not_null())
                        .col(
                            ColumnDef::new(Tcos::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Tcos::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            for table in [CostTable::OperationalCosts, CostTable::IndirectCosts] {
                manager
                    .create_table(
                        Table::create()
                            .table(table)
                            .if_not_exists()
                            .col(ColumnDef::new(Costs::Id).uuid().primary_key().not_null())
                            .col(ColumnDef::new(Costs::TcoId).uuid().not_null())
                            .col(ColumnDef::new(Costs::Label).string().not_null())
                            .col(ColumnDef::new(Costs::Value).decimal().not_null())
                            .foreign_key(
                                ForeignKey::create()
                                    .from(table, Costs::TcoId)
                                    .to(Tcos::Table, Tcos::Id)
                                    .on_delete(ForeignKeyAction::Cascade),
                            )
                            .to_owned(),
                    )
                    .await?;
            }

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [CostTable::OperationalCosts, CostTable::IndirectCosts] {
                manager
                    .drop_table(Table::drop().table(table).if_exists().to_owned())
                    .await?;
            }
            manager
                .drop_table(Table::drop().table(Tcos::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Tcos {
        Table,
        Id,
        Model,
        Manufacturer,
        Kind,
        DevicePrice,
        Pis,
        Ipi,
        Icms,
        Cofins,
        Accessories,
        Notes,
        AcquisitionTotal,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum CostTable {
        #[sea_orm(iden = "tco_operational_costs")]
        OperationalCosts,
        #[sea_orm(iden = "tco_indirect_costs")]
        IndirectCosts,
    }

    #[derive(DeriveIden)]
    enum Costs {
        Id,
        TcoId,
        Label,
        Value,
    }
}

mod m20240301_000004_create_audit_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_audit_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AuditForms::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(AuditForms::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(AuditForms::Title).string().not_null())
                        .col(ColumnDef::new(AuditForms::Auditor).string().null())
                        .col(ColumnDef::new(AuditForms::AuditDate).date().null())
                        .col(ColumnDef::new(AuditForms::UnitId).uuid().null())
                        .col(ColumnDef::new(AuditForms::EvidenceLink).string().null())
                        .col(ColumnDef::new(AuditForms::GapNotes).text().null())
                        .col(ColumnDef::new(AuditForms::ImprovementNotes).text().null())
                        .col(
                            ColumnDef::new(AuditForms::ResponsibleSignature)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(AuditForms::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AuditSections::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AuditSections::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AuditSections::FormId).uuid().not_null())
                        .col(ColumnDef::new(AuditSections::Title).string().not_null())
                        .col(ColumnDef::new(AuditSections::Position).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .from(AuditSections::Table, AuditSections::FormId)
                                .to(AuditForms::Table, AuditForms::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AuditItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(AuditItems::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(AuditItems::SectionId).uuid().not_null())
                        .col(ColumnDef::new(AuditItems::Description).text().not_null())
                        .col(ColumnDef::new(AuditItems::Mode).string_len(16).not_null())
                        .col(ColumnDef::new(AuditItems::Percentage).decimal().null())
                        .col(ColumnDef::new(AuditItems::Notes).text().null())
                        .col(ColumnDef::new(AuditItems::Position).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .from(AuditItems::Table, AuditItems::SectionId)
                                .to(AuditSections::Table, AuditSections::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AuditRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AuditRecords::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AuditRecords::FormId).uuid().not_null())
                        .col(ColumnDef::new(AuditRecords::Auditor).string().not_null())
                        .col(ColumnDef::new(AuditRecords::UnitId).uuid().not_null())
                        .col(ColumnDef::new(AuditRecords::AuditedOn).date().not_null())
                        .col(ColumnDef::new(AuditRecords::EvidenceLink).string().null())
                        .col(
                            ColumnDef::new(AuditRecords::ImprovementSuggestion)
                                .text()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(AuditRecords::ResponsibleSignature)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(AuditRecords::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(AuditRecords::Table, AuditRecords::FormId)
                                .to(AuditForms::Table, AuditForms::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AuditResponses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AuditResponses::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AuditResponses::RecordId).uuid().not_null())
                        .col(ColumnDef::new(AuditResponses::ItemId).uuid().not_null())
                        .col(
                            ColumnDef::new(AuditResponses::Conforming)
                                .boolean()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AuditResponses::Percentage).decimal().null())
                        .col(ColumnDef::new(AuditResponses::Notes).text().null())
                        .foreign_key(
                            ForeignKey::create()
                                .from(AuditResponses::Table, AuditResponses::RecordId)
                                .to(AuditRecords::Table, AuditRecords::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AuditResponses::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(AuditRecords::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(AuditItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(AuditSections::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(AuditForms::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum AuditForms {
        Table,
        Id,
        Title,
        Auditor,
        AuditDate,
        UnitId,
        EvidenceLink,
        GapNotes,
        ImprovementNotes,
        ResponsibleSignature,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum AuditSections {
        Table,
        Id,
        FormId,
        Title,
        Position,
    }

    #[derive(DeriveIden)]
    enum AuditItems {
        Table,
        Id,
        SectionId,
        Description,
        Mode,
        Percentage,
        Notes,
        Position,
    }

    #[derive(DeriveIden)]
    enum AuditRecords {
        Table,
        Id,
        FormId,
        Auditor,
        UnitId,
        AuditedOn,
        EvidenceLink,
        ImprovementSuggestion,
        ResponsibleSignature,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum AuditResponses {
        Table,
        Id,
        RecordId,
        ItemId,
        Conforming,
        Percentage,
        Notes,
    }
}

mod m20240301_000005_create_movement_and_instruction_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_movement_and_instruction_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockMovements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockMovements::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::SerialNumber).string().not_null())
                        .col(
                            ColumnDef::new(StockMovements::MovementType)
                                .string_len(48)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::MovementNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WorkInstructions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WorkInstructions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WorkInstructions::Name).string().not_null())
                        .col(
                            ColumnDef::new(WorkInstructions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WorkInstructionVersions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WorkInstructionVersions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkInstructionVersions::InstructionId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkInstructionVersions::Version)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkInstructionVersions::FileUrl)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkInstructionVersions::StoragePath)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkInstructionVersions::ViewLog)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkInstructionVersions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(
                                    WorkInstructionVersions::Table,
                                    WorkInstructionVersions::InstructionId,
                                )
                                .to(WorkInstructions::Table, WorkInstructions::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(
                    Table::drop()
                        .table(WorkInstructionVersions::Table)
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(Table::drop().table(WorkInstructions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StockMovements::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum StockMovements {
        Table,
        Id,
        SerialNumber,
        MovementType,
        MovementNumber,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum WorkInstructions {
        Table,
        Id,
        Name,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum WorkInstructionVersions {
        Table,
        Id,
        InstructionId,
        Version,
        FileUrl,
        StoragePath,
        ViewLog,
        CreatedAt,
    }
}

mod m20240301_000006_create_user_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000006_create_user_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AppUsers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(AppUsers::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(AppUsers::Username)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(AppUsers::DisplayName).string().not_null())
                        .col(ColumnDef::new(AppUsers::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(AppUsers::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(AppUsers::IsAdmin)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(AppUsers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AppUsers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(UserPermissions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UserPermissions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(UserPermissions::UserId).uuid().not_null())
                        .col(
                            ColumnDef::new(UserPermissions::PermissionId)
                                .string()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(UserPermissions::Table, UserPermissions::UserId)
                                .to(AppUsers::Table, AppUsers::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_user_permissions_user_id")
                        .table(UserPermissions::Table)
                        .col(UserPermissions::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UserPermissions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(AppUsers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum AppUsers {
        Table,
        Id,
        Username,
        DisplayName,
        PasswordHash,
        Active,
        IsAdmin,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum UserPermissions {
        Table,
        Id,
        UserId,
        PermissionId,
    }
}
