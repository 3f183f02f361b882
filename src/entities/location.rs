use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "location")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub street_number: Option<String>,
    pub street_name: String,
    pub postal_code: String,
    pub city_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::trip_location::Entity")]
    TripLocations,
}

impl Related<super::trip_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TripLocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
