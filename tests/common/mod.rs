#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema, Set,
};
use uuid::Uuid;

use carpool_backend::entities::{icon, location, profile, reservation, trip, trip_location};
use carpool_backend::services::trip::{NewAddress, NewTrip, TripDetails, TripService};

/// Fresh in-memory database with the full schema created from the entities.
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");

    let backend = db.get_database_backend();
    let schema = Schema::new(DbBackend::Sqlite);

    db.execute(backend.build(&schema.create_table_from_entity(profile::Entity)))
        .await
        .expect("create profile table");
    db.execute(backend.build(&schema.create_table_from_entity(icon::Entity)))
        .await
        .expect("create icon table");
    db.execute(backend.build(&schema.create_table_from_entity(location::Entity)))
        .await
        .expect("create location table");
    db.execute(backend.build(&schema.create_table_from_entity(trip::Entity)))
        .await
        .expect("create trip table");
    db.execute(backend.build(&schema.create_table_from_entity(trip_location::Entity)))
        .await
        .expect("create trip_location table");
    db.execute(backend.build(&schema.create_table_from_entity(reservation::Entity)))
        .await
        .expect("create reservation table");

    db
}

pub async fn seed_profile(
    db: &DatabaseConnection,
    email: &str,
    first_name: &str,
    last_name: &str,
) -> profile::Model {
    profile::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        phone: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("insert profile")
}

pub async fn seed_icon(db: &DatabaseConnection, label: &str) -> icon::Model {
    icon::ActiveModel {
        label: Set(label.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert icon")
}

pub fn address(city: &str) -> NewAddress {
    NewAddress {
        street_number: Some("10".to_string()),
        street_name: "Rue de la Gare".to_string(),
        postal_code: "75001".to_string(),
        city_name: city.to_string(),
        latitude: 48.8566,
        longitude: 2.3522,
    }
}

pub fn new_trip(
    icon_id: i32,
    total_seats: i32,
    from_city: &str,
    to_city: &str,
    trip_date: NaiveDate,
) -> NewTrip {
    NewTrip {
        total_seats,
        trip_date,
        trip_time: NaiveTime::from_hms_opt(8, 30, 0).expect("valid time"),
        distance_km: 465,
        icon_id,
        departure: address(from_city),
        arrival: address(to_city),
    }
}

/// Create a trip through the service, as production code does.
pub async fn seed_trip(
    db: &DatabaseConnection,
    driver_email: &str,
    icon_id: i32,
    total_seats: i32,
    from_city: &str,
    to_city: &str,
    trip_date: NaiveDate,
) -> TripDetails {
    TripService::new(db)
        .create_trip(
            driver_email,
            new_trip(icon_id, total_seats, from_city, to_city, trip_date),
        )
        .await
        .expect("create trip")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}
