use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;
use crate::entities::profile;
use crate::entities::reservation::ReservationStatus;
use crate::error::{AppError, AppResult};
use crate::services::reservation::{ReservationDetails, ReservationService};
use crate::utils::jwt::Claims;

#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub trip_id: Uuid,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub trip_date: NaiveDate,
    pub trip_time: NaiveTime,
    pub departure_city: String,
    pub arrival_city: String,
    pub driver_name: String,
}

#[derive(Debug, Serialize)]
pub struct PassengerResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<ReservationDetails> for ReservationResponse {
    fn from(details: ReservationDetails) -> Self {
        Self {
            trip_id: details.trip.id,
            status: details.reservation.status,
            created_at: details.reservation.created_at.with_timezone(&Utc),
            trip_date: details.trip.trip_date,
            trip_time: details.trip.trip_time,
            departure_city: details
                .departure
                .map(|l| l.city_name)
                .unwrap_or_default(),
            arrival_city: details.arrival.map(|l| l.city_name).unwrap_or_default(),
            driver_name: format!(
                "{} {}",
                details.driver.first_name, details.driver.last_name
            ),
        }
    }
}

impl From<profile::Model> for PassengerResponse {
    fn from(model: profile::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone: model.phone,
        }
    }
}

/// Book a seat on a trip for the logged-in passenger
pub async fn reserve(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(trip_id): Path<Uuid>,
) -> AppResult<Json<ReservationResponse>> {
    let details = ReservationService::new(&state.db, &state.notifier)
        .reserve(trip_id, &claims.sub)
        .await?;

    Ok(Json(details.into()))
}

/// Cancel the logged-in passenger's reservation on a trip
pub async fn cancel_reservation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(trip_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    ReservationService::new(&state.db, &state.notifier)
        .cancel(trip_id, &claims.sub)
        .await?;

    Ok(Json(serde_json::json!({ "message": "Reservation cancelled" })))
}

/// List the logged-in passenger's active reservations
pub async fn my_reservations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<ReservationResponse>>> {
    let profile = profile::Entity::find_by_email(&state.db, &claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    let reservations = ReservationService::new(&state.db, &state.notifier)
        .passenger_reservations(profile.id)
        .await?;

    Ok(Json(
        reservations
            .into_iter()
            .map(ReservationResponse::from)
            .collect(),
    ))
}

/// List passengers holding an active reservation on a trip
pub async fn trip_passengers(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> AppResult<Json<Vec<PassengerResponse>>> {
    let passengers = ReservationService::new(&state.db, &state.notifier)
        .trip_passengers(trip_id)
        .await?;

    Ok(Json(
        passengers.into_iter().map(PassengerResponse::from).collect(),
    ))
}
