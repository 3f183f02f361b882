pub mod profiles;
pub mod reservations;
pub mod trips;
