use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::AppState;
use crate::error::AppResult;
use crate::handlers::trips::TripResponse;
use crate::services::trip::TripService;

/// Trips published by a profile
pub async fn driver_trips(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> AppResult<Json<Vec<TripResponse>>> {
    let trips = TripService::new(&state.db)
        .list_driver_trips(profile_id)
        .await?;

    Ok(Json(trips.into_iter().map(TripResponse::from).collect()))
}

/// Trips a profile has reserved, whatever the reservation status
pub async fn passenger_trips(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> AppResult<Json<Vec<TripResponse>>> {
    let trips = TripService::new(&state.db)
        .list_passenger_trips(profile_id)
        .await?;

    Ok(Json(trips.into_iter().map(TripResponse::from).collect()))
}
