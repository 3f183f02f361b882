use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use crate::AppState;
use crate::handlers::{profiles, reservations, trips};
use crate::middleware::auth::auth_middleware;

pub fn create_router(state: AppState) -> Router {
    // Open endpoints: browsing and listings
    let public_routes = Router::new()
        .route("/trips", get(trips::search_trips))
        .route("/trips/{id}", get(trips::get_trip))
        .route("/trips/{id}/passengers", get(reservations::trip_passengers))
        .route("/profiles/{id}/trips/driver", get(profiles::driver_trips))
        .route(
            "/profiles/{id}/trips/passenger",
            get(profiles::passenger_trips),
        );

    // Endpoints acting as the logged-in profile
    let protected_routes = Router::new()
        .route("/trips", post(trips::create_trip))
        .route("/trips/{id}", patch(trips::update_trip))
        .route("/trips/{id}", delete(trips::delete_trip))
        .route("/trips/{id}/seats", patch(trips::update_trip_seats))
        .route("/trips/{id}/passengers", post(reservations::reserve))
        .route(
            "/trips/{id}/passengers",
            delete(reservations::cancel_reservation),
        )
        .route("/reservations", get(reservations::my_reservations))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .with_state(state)
}
