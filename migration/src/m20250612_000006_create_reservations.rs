use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20250612_000001_create_profiles::Profile;
use super::m20250612_000004_create_trips::Trip;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create reservation status enum
        manager
            .create_type(
                Type::create()
                    .as_enum(ReservationStatus::Enum)
                    .values([
                        ReservationStatus::Pending,
                        ReservationStatus::Confirmed,
                        ReservationStatus::Cancelled,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reservation::Table)
                    .if_not_exists()
                    .col(uuid(Reservation::ProfileId).not_null())
                    .col(uuid(Reservation::TripId).not_null())
                    .col(string_len(Reservation::Role, 20).not_null())
                    .col(
                        ColumnDef::new(Reservation::Status)
                            .custom(ReservationStatus::Enum)
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(Reservation::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_reservation")
                            .col(Reservation::ProfileId)
                            .col(Reservation::TripId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservation_profile")
                            .from(Reservation::Table, Reservation::ProfileId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservation_trip")
                            .from(Reservation::Table, Reservation::TripId)
                            .to(Trip::Table, Trip::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reservation::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(ReservationStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Reservation {
    Table,
    ProfileId,
    TripId,
    Role,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum ReservationStatus {
    #[sea_orm(iden = "reservation_status")]
    Enum,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "confirmed")]
    Confirmed,
    #[sea_orm(iden = "cancelled")]
    Cancelled,
}
