pub mod notify;
pub mod reservation;
pub mod trip;
