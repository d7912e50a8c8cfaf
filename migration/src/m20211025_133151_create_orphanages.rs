use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    // No `if_not_exists`: applying over an existing table must abort.
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orphanages::Table)
                    .col(
                        ColumnDef::new(Orphanages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orphanages::Name).string().not_null())
                    .col(ColumnDef::new(Orphanages::Latitude).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(Orphanages::Longitude).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(Orphanages::About).text().not_null())
                    .col(ColumnDef::new(Orphanages::Instructions).text().not_null())
                    .col(ColumnDef::new(Orphanages::OpeningHours).string().not_null())
                    .col(
                        ColumnDef::new(Orphanages::OpenOnWeekends)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orphanages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Orphanages {
    Table,
    Id,
    Name,
    Latitude,
    Longitude,
    About,
    Instructions,
    OpeningHours,
    OpenOnWeekends,
}
