use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20250612_000003_create_locations::Location;
use super::m20250612_000004_create_trips::Trip;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create location role enum
        manager
            .create_type(
                Type::create()
                    .as_enum(LocationRole::Enum)
                    .values([LocationRole::Departure, LocationRole::Arrival])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TripLocation::Table)
                    .if_not_exists()
                    .col(uuid(TripLocation::TripId).not_null())
                    .col(integer(TripLocation::LocationId).not_null())
                    .col(
                        ColumnDef::new(TripLocation::Role)
                            .custom(LocationRole::Enum)
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_trip_location")
                            .col(TripLocation::TripId)
                            .col(TripLocation::LocationId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_location_trip")
                            .from(TripLocation::Table, TripLocation::TripId)
                            .to(Trip::Table, Trip::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_location_location")
                            .from(TripLocation::Table, TripLocation::LocationId)
                            .to(Location::Table, Location::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TripLocation::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(LocationRole::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TripLocation {
    Table,
    TripId,
    LocationId,
    Role,
}

#[derive(DeriveIden)]
pub enum LocationRole {
    #[sea_orm(iden = "location_role")]
    Enum,
    #[sea_orm(iden = "departure")]
    Departure,
    #[sea_orm(iden = "arrival")]
    Arrival,
}
