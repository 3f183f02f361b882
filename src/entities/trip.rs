use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trip")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub total_seats: i32,
    pub trip_date: Date,
    pub trip_time: Time,
    pub distance_km: i32,
    pub icon_id: i32,
    pub driver_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::icon::Entity",
        from = "Column::IconId",
        to = "super::icon::Column::Id",
        on_delete = "Restrict"
    )]
    Icon,
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::DriverId",
        to = "super::profile::Column::Id",
        on_delete = "Restrict"
    )]
    Driver,
    #[sea_orm(has_many = "super::trip_location::Entity")]
    TripLocations,
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservations,
}

impl Related<super::icon::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Icon.def()
    }
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Driver.def()
    }
}

impl Related<super::trip_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TripLocations.def()
    }
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
