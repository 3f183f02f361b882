use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, PaginatorTrait, QueryFilter};
use serde::{Deserialize, Serialize};

/// Reservations are never deleted on cancellation; the row is flipped to
/// `Cancelled` and can be re-activated by a later booking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "reservation_status")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

pub const PASSENGER_ROLE: &str = "passenger";

/// One passenger's claim on one trip. The composite key is the dedup
/// mechanism: a passenger can never hold two rows for the same trip.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub profile_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub trip_id: Uuid,
    pub role: String,
    pub status: ReservationStatus,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::ProfileId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    Profile,
    #[sea_orm(
        belongs_to = "super::trip::Entity",
        from = "Column::TripId",
        to = "super::trip::Column::Id",
        on_delete = "Cascade"
    )]
    Trip,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::trip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trip.def()
    }
}

impl Entity {
    /// Occupied seat count for a trip: reservations in any non-cancelled
    /// status.
    pub async fn count_active<C: ConnectionTrait>(db: &C, trip_id: Uuid) -> Result<u64, DbErr> {
        Self::find()
            .filter(Column::TripId.eq(trip_id))
            .filter(Column::Status.ne(ReservationStatus::Cancelled))
            .count(db)
            .await
    }
}

impl ActiveModelBehavior for ActiveModel {}
