use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::entities::location;
use crate::error::{AppError, AppResult};
use crate::services::trip::{NewAddress, NewTrip, TripDetails, TripFilter, TripService};
use crate::utils::jwt::Claims;

pub const MAX_SEATS: i32 = 8;

#[derive(Debug, Deserialize)]
pub struct AddressPayload {
    pub street_number: Option<String>,
    pub street_name: String,
    pub postal_code: String,
    pub city_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct TripRequest {
    pub total_seats: i32,
    pub trip_date: NaiveDate,
    pub trip_time: NaiveTime,
    pub distance_km: i32,
    pub icon_id: i32,
    pub departure: AddressPayload,
    pub arrival: AddressPayload,
}

#[derive(Debug, Deserialize)]
pub struct SeatsRequest {
    pub total_seats: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub departure_city: Option<String>,
    pub arrival_city: Option<String>,
    pub trip_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub id: i32,
    pub street_number: Option<String>,
    pub street_name: String,
    pub postal_code: String,
    pub city_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct TripResponse {
    pub id: Uuid,
    pub total_seats: i32,
    pub trip_date: NaiveDate,
    pub trip_time: NaiveTime,
    pub distance_km: i32,
    pub icon_label: String,
    pub driver_id: Uuid,
    pub driver_name: String,
    pub departure: LocationResponse,
    pub arrival: LocationResponse,
    pub created_at: DateTime<Utc>,
}

impl From<location::Model> for LocationResponse {
    fn from(model: location::Model) -> Self {
        Self {
            id: model.id,
            street_number: model.street_number,
            street_name: model.street_name,
            postal_code: model.postal_code,
            city_name: model.city_name,
            latitude: model.latitude,
            longitude: model.longitude,
        }
    }
}

impl From<TripDetails> for TripResponse {
    fn from(details: TripDetails) -> Self {
        Self {
            id: details.trip.id,
            total_seats: details.trip.total_seats,
            trip_date: details.trip.trip_date,
            trip_time: details.trip.trip_time,
            distance_km: details.trip.distance_km,
            icon_label: details.icon.label,
            driver_id: details.driver.id,
            driver_name: format!(
                "{} {}",
                details.driver.first_name, details.driver.last_name
            ),
            departure: details.departure.into(),
            arrival: details.arrival.into(),
            created_at: details.trip.created_at.with_timezone(&Utc),
        }
    }
}

impl From<AddressPayload> for NewAddress {
    fn from(payload: AddressPayload) -> Self {
        Self {
            street_number: payload.street_number,
            street_name: payload.street_name,
            postal_code: payload.postal_code,
            city_name: payload.city_name,
            latitude: payload.latitude,
            longitude: payload.longitude,
        }
    }
}

impl From<TripRequest> for NewTrip {
    fn from(payload: TripRequest) -> Self {
        Self {
            total_seats: payload.total_seats,
            trip_date: payload.trip_date,
            trip_time: payload.trip_time,
            distance_km: payload.distance_km,
            icon_id: payload.icon_id,
            departure: payload.departure.into(),
            arrival: payload.arrival.into(),
        }
    }
}

fn validate_seats(seats: i32) -> AppResult<()> {
    if !(1..=MAX_SEATS).contains(&seats) {
        return Err(AppError::BadRequest(format!(
            "Seat count must be between 1 and {}",
            MAX_SEATS
        )));
    }
    Ok(())
}

fn validate_address(address: &AddressPayload) -> AppResult<()> {
    if address.street_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Street name must not be blank".to_string(),
        ));
    }
    if address.city_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "City name must not be blank".to_string(),
        ));
    }
    if address.postal_code.len() != 5 || !address.postal_code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::BadRequest(
            "Postal code must be five digits".to_string(),
        ));
    }
    Ok(())
}

fn validate_trip_request(payload: &TripRequest) -> AppResult<()> {
    validate_seats(payload.total_seats)?;
    if payload.distance_km < 1 {
        return Err(AppError::BadRequest(
            "Distance must be at least 1 km".to_string(),
        ));
    }
    if payload.trip_date < Utc::now().date_naive() {
        return Err(AppError::BadRequest(
            "Trip date cannot be in the past".to_string(),
        ));
    }
    validate_address(&payload.departure)?;
    validate_address(&payload.arrival)?;
    Ok(())
}

/// Search trips by optional departure city, arrival city and date
pub async fn search_trips(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<TripResponse>>> {
    let filter = TripFilter {
        departure_city: params.departure_city,
        arrival_city: params.arrival_city,
        trip_date: params.trip_date,
    };

    let trips = TripService::new(&state.db).search_trips(&filter).await?;

    Ok(Json(trips.into_iter().map(TripResponse::from).collect()))
}

/// Get trip details with both endpoints resolved
pub async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> AppResult<Json<TripResponse>> {
    let details = TripService::new(&state.db).get_trip(trip_id).await?;
    Ok(Json(details.into()))
}

/// Publish a trip owned by the logged-in driver
pub async fn create_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<TripRequest>,
) -> AppResult<Json<TripResponse>> {
    validate_trip_request(&payload)?;

    let details = TripService::new(&state.db)
        .create_trip(&claims.sub, payload.into())
        .await?;

    Ok(Json(details.into()))
}

/// Full trip update, endpoints included
pub async fn update_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<TripRequest>,
) -> AppResult<Json<TripResponse>> {
    validate_trip_request(&payload)?;

    let details = TripService::new(&state.db)
        .update_trip(trip_id, &claims.sub, payload.into())
        .await?;

    Ok(Json(details.into()))
}

/// Update only the seat count of a trip
pub async fn update_trip_seats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<SeatsRequest>,
) -> AppResult<Json<TripResponse>> {
    let seats = payload
        .total_seats
        .filter(|s| *s >= 1)
        .ok_or_else(|| AppError::BadRequest("Seat count must be at least 1".to_string()))?;

    let service = TripService::new(&state.db);
    service.update_trip_seats(trip_id, &claims.sub, seats).await?;

    let details = service.get_trip(trip_id).await?;
    Ok(Json(details.into()))
}

/// Delete a trip owned by the logged-in driver
pub async fn delete_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(trip_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    TripService::new(&state.db)
        .delete_trip(trip_id, &claims.sub)
        .await?;

    Ok(Json(serde_json::json!({ "message": "Trip deleted" })))
}
