use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::trip_location::LocationRole;
use crate::entities::{icon, location, profile, reservation, trip, trip_location};
use crate::error::{AppError, AppResult};

/// Address payload for one endpoint of a trip. Endpoints are always created
/// fresh and never shared between trips.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub street_number: Option<String>,
    pub street_name: String,
    pub postal_code: String,
    pub city_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone)]
pub struct NewTrip {
    pub total_seats: i32,
    pub trip_date: NaiveDate,
    pub trip_time: NaiveTime,
    pub distance_km: i32,
    pub icon_id: i32,
    pub departure: NewAddress,
    pub arrival: NewAddress,
}

/// A full update rewrites every mutable field, endpoints included.
pub type TripUpdate = NewTrip;

/// A trip with everything a response needs already resolved.
#[derive(Debug, Clone)]
pub struct TripDetails {
    pub trip: trip::Model,
    pub driver: profile::Model,
    pub icon: icon::Model,
    pub departure: location::Model,
    pub arrival: location::Model,
}

/// Search filters; `None` matches anything.
#[derive(Debug, Clone, Default)]
pub struct TripFilter {
    pub departure_city: Option<String>,
    pub arrival_city: Option<String>,
    pub trip_date: Option<NaiveDate>,
}

/// Single ownership gate for every trip mutation.
pub fn ensure_owner(trip: &trip::Model, caller: &profile::Model) -> AppResult<()> {
    if trip.driver_id != caller.id {
        return Err(AppError::Forbidden(
            "Only the trip driver can modify this trip".to_string(),
        ));
    }
    Ok(())
}

/// Capacity floor for every path that writes a seat count; the occupancy
/// checks cast seat counts to u64 and assume it holds.
fn ensure_positive_seats(seats: i32) -> AppResult<()> {
    if seats < 1 {
        return Err(AppError::BadRequest(
            "Seat count must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn city_matches(location: &location::Model, filter: Option<&str>) -> bool {
    match filter {
        Some(city) => location.city_name.to_lowercase() == city.to_lowercase(),
        None => true,
    }
}

pub struct TripService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TripService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a trip with its two endpoints. The locations, the trip and the
    /// two role links are one atomic write.
    pub async fn create_trip(&self, driver_email: &str, input: NewTrip) -> AppResult<TripDetails> {
        ensure_positive_seats(input.total_seats)?;

        let driver = profile::Entity::find_by_email(self.db, driver_email)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        let icon = icon::Entity::find_by_id(input.icon_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Icon not found".to_string()))?;

        let txn = self.db.begin().await?;

        let departure = insert_location(&txn, &input.departure).await?;
        let arrival = insert_location(&txn, &input.arrival).await?;

        let new_trip = trip::ActiveModel {
            id: Set(Uuid::new_v4()),
            total_seats: Set(input.total_seats),
            trip_date: Set(input.trip_date),
            trip_time: Set(input.trip_time),
            distance_km: Set(input.distance_km),
            icon_id: Set(icon.id),
            driver_id: Set(driver.id),
            created_at: Set(Utc::now().into()),
        };
        let new_trip = new_trip.insert(&txn).await?;

        link_location(&txn, new_trip.id, departure.id, LocationRole::Departure).await?;
        link_location(&txn, new_trip.id, arrival.id, LocationRole::Arrival).await?;

        txn.commit().await?;

        Ok(TripDetails {
            trip: new_trip,
            driver,
            icon,
            departure,
            arrival,
        })
    }

    /// Exact-match search. The date filter runs in SQL; city filters compare
    /// case-insensitively against each trip's resolved endpoints.
    pub async fn search_trips(&self, filter: &TripFilter) -> AppResult<Vec<TripDetails>> {
        let mut query = trip::Entity::find();
        if let Some(date) = filter.trip_date {
            query = query.filter(trip::Column::TripDate.eq(date));
        }
        let trips = query.all(self.db).await?;

        let details = self.resolve_details(trips).await?;

        Ok(details
            .into_iter()
            .filter(|d| {
                city_matches(&d.departure, filter.departure_city.as_deref())
                    && city_matches(&d.arrival, filter.arrival_city.as_deref())
            })
            .collect())
    }

    pub async fn get_trip(&self, trip_id: Uuid) -> AppResult<TripDetails> {
        let trip = trip::Entity::find_by_id(trip_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

        self.details_for(trip).await
    }

    /// Role-keyed endpoints of a trip. A trip with no persisted links yields
    /// an empty map, not an error; callers must not assume both keys exist.
    pub async fn get_trip_locations(
        &self,
        trip_id: Uuid,
    ) -> AppResult<HashMap<LocationRole, location::Model>> {
        let links = trip_location::Entity::find()
            .filter(trip_location::Column::TripId.eq(trip_id))
            .find_also_related(location::Entity)
            .all(self.db)
            .await?;

        let mut map = HashMap::new();
        for (link, loc) in links {
            if let Some(loc) = loc {
                map.insert(link.role, loc);
            }
        }
        Ok(map)
    }

    /// Narrow capacity update: seat count only.
    pub async fn update_trip_seats(
        &self,
        trip_id: Uuid,
        caller_email: &str,
        new_seats: i32,
    ) -> AppResult<trip::Model> {
        ensure_positive_seats(new_seats)?;

        let caller = profile::Entity::find_by_email(self.db, caller_email)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        let trip = trip::Entity::find_by_id(trip_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

        ensure_owner(&trip, &caller)?;

        let txn = self.db.begin().await?;

        // Re-read under lock so the occupancy check cannot race a booking.
        let trip = trip::Entity::find_by_id(trip_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

        let occupied = reservation::Entity::count_active(&txn, trip.id).await?;
        if (new_seats as u64) < occupied {
            return Err(AppError::Conflict(format!(
                "Cannot set seats to {}: {} already reserved",
                new_seats, occupied
            )));
        }

        let mut active: trip::ActiveModel = trip.into();
        active.total_seats = Set(new_seats);
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        Ok(updated)
    }

    /// Full update: trip fields plus both endpoint addresses, rewritten in
    /// place under the same occupancy guard as the narrow path.
    pub async fn update_trip(
        &self,
        trip_id: Uuid,
        caller_email: &str,
        update: TripUpdate,
    ) -> AppResult<TripDetails> {
        ensure_positive_seats(update.total_seats)?;

        let caller = profile::Entity::find_by_email(self.db, caller_email)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        let trip = trip::Entity::find_by_id(trip_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

        ensure_owner(&trip, &caller)?;

        let txn = self.db.begin().await?;

        let trip = trip::Entity::find_by_id(trip_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

        let occupied = reservation::Entity::count_active(&txn, trip.id).await?;
        if (update.total_seats as u64) < occupied {
            return Err(AppError::Conflict(format!(
                "Cannot set seats to {}: {} already reserved",
                update.total_seats, occupied
            )));
        }

        let icon = icon::Entity::find_by_id(update.icon_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Icon not found".to_string()))?;

        let links = trip_location::Entity::find()
            .filter(trip_location::Column::TripId.eq(trip.id))
            .find_also_related(location::Entity)
            .all(&txn)
            .await?;

        for (link, loc) in links {
            if let Some(loc) = loc {
                let address = match link.role {
                    LocationRole::Departure => &update.departure,
                    LocationRole::Arrival => &update.arrival,
                };
                update_location(&txn, loc, address).await?;
            }
        }

        let mut active: trip::ActiveModel = trip.into();
        active.total_seats = Set(update.total_seats);
        active.trip_date = Set(update.trip_date);
        active.trip_time = Set(update.trip_time);
        active.distance_km = Set(update.distance_km);
        active.icon_id = Set(icon.id);
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        self.details_for(updated).await
    }

    /// Delete a trip; reservations and role links go with it, the endpoint
    /// locations stay.
    pub async fn delete_trip(&self, trip_id: Uuid, caller_email: &str) -> AppResult<()> {
        let caller = profile::Entity::find_by_email(self.db, caller_email)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        let trip = trip::Entity::find_by_id(trip_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

        ensure_owner(&trip, &caller)?;

        trip::Entity::delete_by_id(trip_id).exec(self.db).await?;

        Ok(())
    }

    pub async fn list_driver_trips(&self, profile_id: Uuid) -> AppResult<Vec<TripDetails>> {
        let profile = profile::Entity::find_by_id(profile_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        let trips = trip::Entity::find()
            .filter(trip::Column::DriverId.eq(profile.id))
            .all(self.db)
            .await?;

        self.resolve_details(trips).await
    }

    /// Trips the profile has ever reserved, whatever the reservation status.
    /// The non-cancelled view is the reservation listing.
    pub async fn list_passenger_trips(&self, profile_id: Uuid) -> AppResult<Vec<TripDetails>> {
        let profile = profile::Entity::find_by_id(profile_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        let reservations = reservation::Entity::find()
            .filter(reservation::Column::ProfileId.eq(profile.id))
            .all(self.db)
            .await?;

        let trip_ids: Vec<Uuid> = reservations.iter().map(|r| r.trip_id).collect();
        if trip_ids.is_empty() {
            return Ok(Vec::new());
        }

        let trips = trip::Entity::find()
            .filter(trip::Column::Id.is_in(trip_ids))
            .all(self.db)
            .await?;

        self.resolve_details(trips).await
    }

    /// Resolve one trip, failing on dangling pieces instead of skipping.
    async fn details_for(&self, trip: trip::Model) -> AppResult<TripDetails> {
        let mut locations = self.get_trip_locations(trip.id).await?;
        let departure = locations
            .remove(&LocationRole::Departure)
            .ok_or_else(|| AppError::Internal("Trip has no departure location".to_string()))?;
        let arrival = locations
            .remove(&LocationRole::Arrival)
            .ok_or_else(|| AppError::Internal("Trip has no arrival location".to_string()))?;

        let driver = profile::Entity::find_by_id(trip.driver_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::Internal("Trip driver profile missing".to_string()))?;

        let icon = icon::Entity::find_by_id(trip.icon_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::Internal("Trip icon missing".to_string()))?;

        Ok(TripDetails {
            trip,
            driver,
            icon,
            departure,
            arrival,
        })
    }

    /// Resolve a batch of trips. Trips with missing pieces are skipped so one
    /// broken row cannot take down a listing.
    async fn resolve_details(&self, trips: Vec<trip::Model>) -> AppResult<Vec<TripDetails>> {
        if trips.is_empty() {
            return Ok(Vec::new());
        }

        let trip_ids: Vec<Uuid> = trips.iter().map(|t| t.id).collect();
        let links = trip_location::Entity::find()
            .filter(trip_location::Column::TripId.is_in(trip_ids))
            .find_also_related(location::Entity)
            .all(self.db)
            .await?;

        let driver_ids: Vec<Uuid> = trips.iter().map(|t| t.driver_id).collect();
        let drivers = profile::Entity::find()
            .filter(profile::Column::Id.is_in(driver_ids))
            .all(self.db)
            .await?;

        let icons = icon::Entity::find().all(self.db).await?;

        let mut details = Vec::new();
        for trip in trips {
            let driver = drivers.iter().find(|p| p.id == trip.driver_id);
            let icon = icons.iter().find(|i| i.id == trip.icon_id);
            let departure = links
                .iter()
                .find(|(l, _)| l.trip_id == trip.id && l.role == LocationRole::Departure)
                .and_then(|(_, loc)| loc.clone());
            let arrival = links
                .iter()
                .find(|(l, _)| l.trip_id == trip.id && l.role == LocationRole::Arrival)
                .and_then(|(_, loc)| loc.clone());

            let (Some(driver), Some(icon), Some(departure), Some(arrival)) =
                (driver, icon, departure, arrival)
            else {
                continue;
            };

            details.push(TripDetails {
                trip,
                driver: driver.clone(),
                icon: icon.clone(),
                departure,
                arrival,
            });
        }

        Ok(details)
    }
}

async fn insert_location<C: ConnectionTrait>(
    db: &C,
    address: &NewAddress,
) -> Result<location::Model, DbErr> {
    location::ActiveModel {
        street_number: Set(address.street_number.clone()),
        street_name: Set(address.street_name.clone()),
        postal_code: Set(address.postal_code.clone()),
        city_name: Set(address.city_name.clone()),
        latitude: Set(address.latitude),
        longitude: Set(address.longitude),
        ..Default::default()
    }
    .insert(db)
    .await
}

async fn update_location<C: ConnectionTrait>(
    db: &C,
    model: location::Model,
    address: &NewAddress,
) -> Result<location::Model, DbErr> {
    let mut active: location::ActiveModel = model.into();
    active.street_number = Set(address.street_number.clone());
    active.street_name = Set(address.street_name.clone());
    active.postal_code = Set(address.postal_code.clone());
    active.city_name = Set(address.city_name.clone());
    active.latitude = Set(address.latitude);
    active.longitude = Set(address.longitude);
    active.update(db).await
}

async fn link_location<C: ConnectionTrait>(
    db: &C,
    trip_id: Uuid,
    location_id: i32,
    role: LocationRole,
) -> Result<trip_location::Model, DbErr> {
    trip_location::ActiveModel {
        trip_id: Set(trip_id),
        location_id: Set(location_id),
        role: Set(role),
    }
    .insert(db)
    .await
}
