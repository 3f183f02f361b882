pub use sea_orm_migration::prelude::*;

mod m20250612_000001_create_profiles;
mod m20250612_000002_create_icons;
mod m20250612_000003_create_locations;
mod m20250612_000004_create_trips;
mod m20250612_000005_create_trip_locations;
mod m20250612_000006_create_reservations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250612_000001_create_profiles::Migration),
            Box::new(m20250612_000002_create_icons::Migration),
            Box::new(m20250612_000003_create_locations::Migration),
            Box::new(m20250612_000004_create_trips::Migration),
            Box::new(m20250612_000005_create_trip_locations::Migration),
            Box::new(m20250612_000006_create_reservations::Migration),
        ]
    }
}
