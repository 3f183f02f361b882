pub mod icon;
pub mod location;
pub mod profile;
pub mod reservation;
pub mod trip;
pub mod trip_location;
