use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Location::Table)
                    .if_not_exists()
                    .col(pk_auto(Location::Id))
                    .col(string_len_null(Location::StreetNumber, 10))
                    .col(string_len(Location::StreetName, 255).not_null())
                    .col(string_len(Location::PostalCode, 5).not_null())
                    .col(string_len(Location::CityName, 100).not_null())
                    .col(double(Location::Latitude).not_null())
                    .col(double(Location::Longitude).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Location::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Location {
    Table,
    Id,
    StreetNumber,
    StreetName,
    PostalCode,
    CityName,
    Latitude,
    Longitude,
}
