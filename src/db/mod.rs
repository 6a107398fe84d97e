pub mod admindb;
pub mod bookingdb;
pub mod customerdb;
pub mod db;
pub mod driverdb;
pub mod messagedb;
pub mod paymentdb;
