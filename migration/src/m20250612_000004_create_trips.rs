use sea_orm_migration::{prelude::*, schema::*};

use super::m20250612_000001_create_profiles::Profile;
use super::m20250612_000002_create_icons::Icon;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Trip::Table)
                    .if_not_exists()
                    .col(uuid(Trip::Id).primary_key())
                    .col(integer(Trip::TotalSeats).not_null())
                    .col(date(Trip::TripDate).not_null())
                    .col(time(Trip::TripTime).not_null())
                    .col(integer(Trip::DistanceKm).not_null())
                    .col(integer(Trip::IconId).not_null())
                    .col(uuid(Trip::DriverId).not_null())
                    .col(
                        timestamp_with_time_zone(Trip::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_icon")
                            .from(Trip::Table, Trip::IconId)
                            .to(Icon::Table, Icon::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_driver")
                            .from(Trip::Table, Trip::DriverId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Trip::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Trip {
    Table,
    Id,
    TotalSeats,
    TripDate,
    TripTime,
    DistanceKm,
    IconId,
    DriverId,
    CreatedAt,
}
