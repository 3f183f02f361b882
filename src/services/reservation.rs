use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::entities::reservation::{self, PASSENGER_ROLE, ReservationStatus};
use crate::entities::trip_location::LocationRole;
use crate::entities::{location, profile, trip, trip_location};
use crate::error::{AppError, AppResult};
use crate::services::notify::Notifier;

/// A reservation joined with the context responses need. Endpoints are
/// optional; a trip mid-rewrite may transiently miss a role.
#[derive(Debug, Clone)]
pub struct ReservationDetails {
    pub reservation: reservation::Model,
    pub trip: trip::Model,
    pub driver: profile::Model,
    pub departure: Option<location::Model>,
    pub arrival: Option<location::Model>,
}

pub struct ReservationService<'a> {
    db: &'a DatabaseConnection,
    notifier: &'a Notifier,
}

impl<'a> ReservationService<'a> {
    pub fn new(db: &'a DatabaseConnection, notifier: &'a Notifier) -> Self {
        Self { db, notifier }
    }

    /// Book a seat. Rules apply in order, stopping at the first failure:
    /// trip exists, passenger resolves, passenger is not the driver, no
    /// active duplicate, a seat is free.
    pub async fn reserve(
        &self,
        trip_id: Uuid,
        passenger_email: &str,
    ) -> AppResult<ReservationDetails> {
        let txn = self.db.begin().await?;

        // Lock the trip row: the seat count and the write below must not
        // interleave with another booking or a capacity change on this trip.
        let trip = trip::Entity::find_by_id(trip_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

        let passenger = profile::Entity::find_by_email(&txn, passenger_email)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        if trip.driver_id == passenger.id {
            return Err(AppError::BadRequest(
                "A driver cannot book their own trip".to_string(),
            ));
        }

        let existing = reservation::Entity::find_by_id((passenger.id, trip.id))
            .one(&txn)
            .await?;

        if let Some(existing) = &existing {
            if existing.status != ReservationStatus::Cancelled {
                return Err(AppError::Conflict("Trip already booked".to_string()));
            }
        }

        let occupied = reservation::Entity::count_active(&txn, trip.id).await?;
        if occupied >= trip.total_seats as u64 {
            return Err(AppError::Conflict(
                "No seats available on this trip".to_string(),
            ));
        }

        let saved = match existing {
            // Re-activate the cancelled row; the composite key guarantees a
            // passenger never holds two rows for one trip.
            Some(cancelled) => {
                let mut active: reservation::ActiveModel = cancelled.into();
                active.status = Set(ReservationStatus::Confirmed);
                active.created_at = Set(Utc::now().into());
                active.update(&txn).await?
            }
            None => {
                reservation::ActiveModel {
                    profile_id: Set(passenger.id),
                    trip_id: Set(trip.id),
                    role: Set(PASSENGER_ROLE.to_string()),
                    status: Set(ReservationStatus::Confirmed),
                    created_at: Set(Utc::now().into()),
                }
                .insert(&txn)
                .await?
            }
        };

        txn.commit().await?;

        let details = self.details_for(saved, trip).await?;

        self.notifier.notify(
            &details.driver.email,
            "New reservation",
            &format!("{} booked a seat on your trip.", passenger.first_name),
        );

        Ok(details)
    }

    /// Cancel the caller's reservation on a trip. Not idempotent: cancelling
    /// an already-cancelled reservation is an error.
    pub async fn cancel(&self, trip_id: Uuid, passenger_email: &str) -> AppResult<()> {
        let passenger = profile::Entity::find_by_email(self.db, passenger_email)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        let existing = reservation::Entity::find_by_id((passenger.id, trip_id))
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?;

        if existing.status == ReservationStatus::Cancelled {
            return Err(AppError::BadRequest(
                "Reservation is already cancelled".to_string(),
            ));
        }

        let mut active: reservation::ActiveModel = existing.into();
        active.status = Set(ReservationStatus::Cancelled);
        active.update(self.db).await?;

        if let Some(trip) = trip::Entity::find_by_id(trip_id).one(self.db).await? {
            if let Some(driver) = profile::Entity::find_by_id(trip.driver_id)
                .one(self.db)
                .await?
            {
                self.notifier.notify(
                    &driver.email,
                    "Reservation cancelled",
                    &format!(
                        "{} cancelled their reservation on your trip.",
                        passenger.first_name
                    ),
                );
            }
        }

        Ok(())
    }

    /// Non-cancelled reservations of a profile, each with trip context.
    pub async fn passenger_reservations(
        &self,
        profile_id: Uuid,
    ) -> AppResult<Vec<ReservationDetails>> {
        let profile = profile::Entity::find_by_id(profile_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        let reservations = reservation::Entity::find()
            .filter(reservation::Column::ProfileId.eq(profile.id))
            .filter(reservation::Column::Status.ne(ReservationStatus::Cancelled))
            .all(self.db)
            .await?;

        let mut details = Vec::new();
        for res in reservations {
            let Some(trip) = trip::Entity::find_by_id(res.trip_id).one(self.db).await? else {
                continue;
            };
            details.push(self.details_for(res, trip).await?);
        }

        Ok(details)
    }

    /// Profiles holding a non-cancelled reservation on a trip.
    pub async fn trip_passengers(&self, trip_id: Uuid) -> AppResult<Vec<profile::Model>> {
        trip::Entity::find_by_id(trip_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

        let reservations = reservation::Entity::find()
            .filter(reservation::Column::TripId.eq(trip_id))
            .filter(reservation::Column::Status.ne(ReservationStatus::Cancelled))
            .all(self.db)
            .await?;

        let profile_ids: Vec<Uuid> = reservations.iter().map(|r| r.profile_id).collect();
        if profile_ids.is_empty() {
            return Ok(Vec::new());
        }

        let profiles = profile::Entity::find()
            .filter(profile::Column::Id.is_in(profile_ids))
            .all(self.db)
            .await?;

        Ok(profiles)
    }

    async fn details_for(
        &self,
        res: reservation::Model,
        trip: trip::Model,
    ) -> AppResult<ReservationDetails> {
        let driver = profile::Entity::find_by_id(trip.driver_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::Internal("Trip driver profile missing".to_string()))?;

        let links = trip_location::Entity::find()
            .filter(trip_location::Column::TripId.eq(trip.id))
            .find_also_related(location::Entity)
            .all(self.db)
            .await?;

        let mut departure = None;
        let mut arrival = None;
        for (link, loc) in links {
            match link.role {
                LocationRole::Departure => departure = loc,
                LocationRole::Arrival => arrival = loc,
            }
        }

        Ok(ReservationDetails {
            reservation: res,
            trip,
            driver,
            departure,
            arrival,
        })
    }
}
