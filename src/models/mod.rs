pub mod adminmodel;
pub mod bookingmodel;
pub mod customermodel;
pub mod drivermodel;
pub mod messagemodel;
