pub mod admins;
pub mod auth;
pub mod bookings;
pub mod customers;
pub mod drivers;
pub mod messages;
pub mod payments;
