mod common;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, Statement};

use carpool_backend::Notifier;
use carpool_backend::entities::trip_location::LocationRole;
use carpool_backend::entities::{icon, location, reservation, trip, trip_location};
use carpool_backend::error::AppError;
use carpool_backend::services::reservation::ReservationService;
use carpool_backend::services::trip::{TripFilter, TripService};

use common::{date, new_trip, seed_icon, seed_profile, seed_trip, setup_db};

#[tokio::test]
async fn creating_a_trip_links_both_endpoints() {
    let db = setup_db().await;
    let driver = seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    let icon = seed_icon(&db, "comfort").await;
    let service = TripService::new(&db);

    let details = service
        .create_trip(
            "driver@test.dev",
            new_trip(icon.id, 3, "Paris", "Lyon", date(2026, 9, 15)),
        )
        .await
        .expect("create trip");

    assert_eq!(details.trip.total_seats, 3);
    assert_eq!(details.trip.driver_id, driver.id);
    assert_eq!(details.driver.email, "driver@test.dev");
    assert_eq!(details.icon.label, "comfort");
    assert_eq!(details.departure.city_name, "Paris");
    assert_eq!(details.arrival.city_name, "Lyon");

    let locations = service
        .get_trip_locations(details.trip.id)
        .await
        .expect("load locations");
    assert_eq!(locations.len(), 2);
    assert_eq!(locations[&LocationRole::Departure].city_name, "Paris");
    assert_eq!(locations[&LocationRole::Arrival].city_name, "Lyon");
}

#[tokio::test]
async fn create_trip_rejects_unknown_driver() {
    let db = setup_db().await;
    let icon = seed_icon(&db, "comfort").await;

    let err = TripService::new(&db)
        .create_trip(
            "ghost@test.dev",
            new_trip(icon.id, 3, "Paris", "Lyon", date(2026, 9, 15)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn create_trip_rejects_unknown_icon() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;

    let err = TripService::new(&db)
        .create_trip(
            "driver@test.dev",
            new_trip(999, 3, "Paris", "Lyon", date(2026, 9, 15)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn create_trip_rejects_non_positive_seat_counts() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    let icon = seed_icon(&db, "comfort").await;

    let service = TripService::new(&db);
    for seats in [0, -1] {
        let err = service
            .create_trip(
                "driver@test.dev",
                new_trip(icon.id, seats, "Paris", "Lyon", date(2026, 9, 15)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)), "accepted {seats}");
    }

    let trips = trip::Entity::find().count(&db).await.expect("count trips");
    assert_eq!(trips, 0);
}

#[tokio::test]
async fn failed_creation_leaves_no_partial_rows() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    let icon = seed_icon(&db, "comfort").await;

    // Without the link table the last write of the batch must fail, taking
    // the already-inserted locations and trip with it.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "DROP TABLE trip_location".to_owned(),
    ))
    .await
    .expect("drop link table");

    let result = TripService::new(&db)
        .create_trip(
            "driver@test.dev",
            new_trip(icon.id, 3, "Paris", "Lyon", date(2026, 9, 15)),
        )
        .await;
    assert!(result.is_err());

    let trips = trip::Entity::find().count(&db).await.expect("count trips");
    let locations = location::Entity::find()
        .count(&db)
        .await
        .expect("count locations");
    assert_eq!(trips, 0);
    assert_eq!(locations, 0);
}

#[tokio::test]
async fn search_matches_cities_case_insensitively() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    let icon = seed_icon(&db, "comfort").await;
    let lyon = seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;
    seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Nice",
        date(2026, 9, 15),
    )
    .await;

    let results = TripService::new(&db)
        .search_trips(&TripFilter {
            departure_city: Some("paris".to_string()),
            arrival_city: Some("LYON".to_string()),
            trip_date: Some(date(2026, 9, 15)),
        })
        .await
        .expect("search");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].trip.id, lyon.trip.id);
}

#[tokio::test]
async fn search_without_date_spans_all_dates() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    let icon = seed_icon(&db, "comfort").await;
    seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;
    seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 10, 2),
    )
    .await;
    seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Nice",
        date(2026, 9, 15),
    )
    .await;

    let results = TripService::new(&db)
        .search_trips(&TripFilter {
            departure_city: Some("Paris".to_string()),
            arrival_city: Some("Lyon".to_string()),
            trip_date: None,
        })
        .await
        .expect("search");

    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn search_filters_by_date() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    let icon = seed_icon(&db, "comfort").await;
    seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;
    let later = seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 16),
    )
    .await;

    let results = TripService::new(&db)
        .search_trips(&TripFilter {
            departure_city: None,
            arrival_city: None,
            trip_date: Some(date(2026, 9, 16)),
        })
        .await
        .expect("search");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].trip.id, later.trip.id);
}

#[tokio::test]
async fn search_without_filters_returns_everything() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    let icon = seed_icon(&db, "comfort").await;
    seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;
    seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Nice",
        date(2026, 9, 16),
    )
    .await;

    let results = TripService::new(&db)
        .search_trips(&TripFilter::default())
        .await
        .expect("search");

    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn search_with_no_match_returns_empty() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    let icon = seed_icon(&db, "comfort").await;
    seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;

    let results = TripService::new(&db)
        .search_trips(&TripFilter {
            departure_city: Some("Marseille".to_string()),
            arrival_city: None,
            trip_date: None,
        })
        .await
        .expect("search");

    assert!(results.is_empty());
}

#[tokio::test]
async fn get_trip_rejects_unknown_id() {
    let db = setup_db().await;

    let err = TripService::new(&db)
        .get_trip(uuid::Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn seat_update_is_owner_only() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    seed_profile(&db, "other@test.dev", "Bob", "Durand").await;
    let icon = seed_icon(&db, "comfort").await;
    let details = seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;

    let err = TripService::new(&db)
        .update_trip_seats(details.trip.id, "other@test.dev", 5)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn seat_update_rejects_unknown_trip() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;

    let err = TripService::new(&db)
        .update_trip_seats(uuid::Uuid::new_v4(), "driver@test.dev", 5)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn seat_update_cannot_go_below_occupancy() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    seed_profile(&db, "p1@test.dev", "Paul", "Petit").await;
    seed_profile(&db, "p2@test.dev", "Zoe", "Roux").await;
    let icon = seed_icon(&db, "comfort").await;
    let details = seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;

    let notifier = Notifier::disabled();
    let reservations = ReservationService::new(&db, &notifier);
    reservations
        .reserve(details.trip.id, "p1@test.dev")
        .await
        .expect("first booking");
    reservations
        .reserve(details.trip.id, "p2@test.dev")
        .await
        .expect("second booking");

    let trips = TripService::new(&db);
    let err = trips
        .update_trip_seats(details.trip.id, "driver@test.dev", 1)
        .await
        .unwrap_err();
    match err {
        AppError::Conflict(msg) => assert!(msg.contains("2 already reserved")),
        other => panic!("expected conflict, got {other:?}"),
    }

    // Shrinking to exactly the occupied count is allowed.
    let updated = trips
        .update_trip_seats(details.trip.id, "driver@test.dev", 2)
        .await
        .expect("shrink to occupancy");
    assert_eq!(updated.total_seats, 2);
}

#[tokio::test]
async fn seat_update_rejects_non_positive_seat_counts() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    seed_profile(&db, "p1@test.dev", "Paul", "Petit").await;
    seed_profile(&db, "p2@test.dev", "Zoe", "Roux").await;
    let icon = seed_icon(&db, "comfort").await;
    let details = seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;

    let notifier = Notifier::disabled();
    let reservations = ReservationService::new(&db, &notifier);
    reservations
        .reserve(details.trip.id, "p1@test.dev")
        .await
        .expect("first booking");
    reservations
        .reserve(details.trip.id, "p2@test.dev")
        .await
        .expect("second booking");

    // Non-positive counts are rejected outright, never fed into the
    // unsigned occupancy comparison.
    let service = TripService::new(&db);
    for seats in [0, -1] {
        let err = service
            .update_trip_seats(details.trip.id, "driver@test.dev", seats)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)), "accepted {seats}");
    }

    let reloaded = service.get_trip(details.trip.id).await.expect("reload");
    assert_eq!(reloaded.trip.total_seats, 3);
}

#[tokio::test]
async fn seat_update_persists() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    let icon = seed_icon(&db, "comfort").await;
    let details = seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;

    let service = TripService::new(&db);
    service
        .update_trip_seats(details.trip.id, "driver@test.dev", 5)
        .await
        .expect("grow seats");

    let reloaded = service.get_trip(details.trip.id).await.expect("reload");
    assert_eq!(reloaded.trip.total_seats, 5);
}

#[tokio::test]
async fn full_update_rewrites_endpoints_in_place() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    let icon = seed_icon(&db, "comfort").await;
    let eco = seed_icon(&db, "eco").await;
    let details = seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;

    let updated = TripService::new(&db)
        .update_trip(
            details.trip.id,
            "driver@test.dev",
            new_trip(eco.id, 4, "Paris", "Grenoble", date(2026, 9, 20)),
        )
        .await
        .expect("full update");

    assert_eq!(updated.trip.total_seats, 4);
    assert_eq!(updated.trip.trip_date, date(2026, 9, 20));
    assert_eq!(updated.icon.label, "eco");
    assert_eq!(updated.arrival.city_name, "Grenoble");
    // Endpoints are updated, not replaced: the location rows keep their ids.
    assert_eq!(updated.departure.id, details.departure.id);
    assert_eq!(updated.arrival.id, details.arrival.id);

    let locations = location::Entity::find()
        .count(&db)
        .await
        .expect("count locations");
    assert_eq!(locations, 2);
}

#[tokio::test]
async fn full_update_rejects_unknown_icon() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    let icon = seed_icon(&db, "comfort").await;
    let details = seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;

    let err = TripService::new(&db)
        .update_trip(
            details.trip.id,
            "driver@test.dev",
            new_trip(999, 4, "Paris", "Lyon", date(2026, 9, 15)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn full_update_is_owner_only() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    seed_profile(&db, "other@test.dev", "Bob", "Durand").await;
    let icon = seed_icon(&db, "comfort").await;
    let details = seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;

    let err = TripService::new(&db)
        .update_trip(
            details.trip.id,
            "other@test.dev",
            new_trip(icon.id, 4, "Paris", "Lyon", date(2026, 9, 15)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn full_update_cannot_go_below_occupancy() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    seed_profile(&db, "p1@test.dev", "Paul", "Petit").await;
    seed_profile(&db, "p2@test.dev", "Zoe", "Roux").await;
    let icon = seed_icon(&db, "comfort").await;
    let details = seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;

    let notifier = Notifier::disabled();
    let reservations = ReservationService::new(&db, &notifier);
    reservations
        .reserve(details.trip.id, "p1@test.dev")
        .await
        .expect("first booking");
    reservations
        .reserve(details.trip.id, "p2@test.dev")
        .await
        .expect("second booking");

    let err = TripService::new(&db)
        .update_trip(
            details.trip.id,
            "driver@test.dev",
            new_trip(icon.id, 1, "Paris", "Lyon", date(2026, 9, 15)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn full_update_rejects_non_positive_seat_counts() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    seed_profile(&db, "p1@test.dev", "Paul", "Petit").await;
    let icon = seed_icon(&db, "comfort").await;
    let details = seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;

    let notifier = Notifier::disabled();
    ReservationService::new(&db, &notifier)
        .reserve(details.trip.id, "p1@test.dev")
        .await
        .expect("booking");

    let service = TripService::new(&db);
    let err = service
        .update_trip(
            details.trip.id,
            "driver@test.dev",
            new_trip(icon.id, -5, "Paris", "Lyon", date(2026, 9, 15)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let reloaded = service.get_trip(details.trip.id).await.expect("reload");
    assert_eq!(reloaded.trip.total_seats, 3);
}

#[tokio::test]
async fn deleting_a_trip_cascades_to_links_and_reservations() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    seed_profile(&db, "p1@test.dev", "Paul", "Petit").await;
    let icon = seed_icon(&db, "comfort").await;
    let details = seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;

    let notifier = Notifier::disabled();
    ReservationService::new(&db, &notifier)
        .reserve(details.trip.id, "p1@test.dev")
        .await
        .expect("booking");

    TripService::new(&db)
        .delete_trip(details.trip.id, "driver@test.dev")
        .await
        .expect("delete");

    let trips = trip::Entity::find().count(&db).await.expect("count trips");
    let links = trip_location::Entity::find()
        .count(&db)
        .await
        .expect("count links");
    let reservations = reservation::Entity::find()
        .count(&db)
        .await
        .expect("count reservations");
    let locations = location::Entity::find()
        .count(&db)
        .await
        .expect("count locations");

    assert_eq!(trips, 0);
    assert_eq!(links, 0);
    assert_eq!(reservations, 0);
    // Endpoint locations survive the trip that referenced them.
    assert_eq!(locations, 2);
}

#[tokio::test]
async fn delete_is_owner_only() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    seed_profile(&db, "other@test.dev", "Bob", "Durand").await;
    let icon = seed_icon(&db, "comfort").await;
    let details = seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;

    let service = TripService::new(&db);
    let err = service
        .delete_trip(details.trip.id, "other@test.dev")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    service.get_trip(details.trip.id).await.expect("still there");
}

#[tokio::test]
async fn driver_trips_list_only_that_drivers_trips() {
    let db = setup_db().await;
    let alice = seed_profile(&db, "alice@test.dev", "Alice", "Martin").await;
    seed_profile(&db, "bob@test.dev", "Bob", "Durand").await;
    let icon = seed_icon(&db, "comfort").await;
    let hers = seed_trip(
        &db,
        "alice@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;
    seed_trip(
        &db,
        "bob@test.dev",
        icon.id,
        3,
        "Paris",
        "Nice",
        date(2026, 9, 15),
    )
    .await;

    let results = TripService::new(&db)
        .list_driver_trips(alice.id)
        .await
        .expect("list");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].trip.id, hers.trip.id);
}

#[tokio::test]
async fn passenger_trips_include_cancelled_reservations() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    let paul = seed_profile(&db, "p1@test.dev", "Paul", "Petit").await;
    let icon = seed_icon(&db, "comfort").await;
    let kept = seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;
    let dropped = seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Nice",
        date(2026, 9, 16),
    )
    .await;

    let notifier = Notifier::disabled();
    let reservations = ReservationService::new(&db, &notifier);
    reservations
        .reserve(kept.trip.id, "p1@test.dev")
        .await
        .expect("booking one");
    reservations
        .reserve(dropped.trip.id, "p1@test.dev")
        .await
        .expect("booking two");
    reservations
        .cancel(dropped.trip.id, "p1@test.dev")
        .await
        .expect("cancel two");

    // The travel history keeps cancelled trips; the active view is the
    // reservation listing.
    let results = TripService::new(&db)
        .list_passenger_trips(paul.id)
        .await
        .expect("list");

    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn deleting_a_referenced_icon_maps_to_conflict() {
    let db = setup_db().await;
    seed_profile(&db, "driver@test.dev", "Alice", "Martin").await;
    let icon = seed_icon(&db, "comfort").await;
    seed_trip(
        &db,
        "driver@test.dev",
        icon.id,
        3,
        "Paris",
        "Lyon",
        date(2026, 9, 15),
    )
    .await;

    let err = icon::Entity::delete_by_id(icon.id)
        .exec(&db)
        .await
        .unwrap_err();

    let response = AppError::from(err).into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn listings_reject_unknown_profiles() {
    let db = setup_db().await;
    let service = TripService::new(&db);

    let err = service
        .list_driver_trips(uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = service
        .list_passenger_trips(uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
