//! Route handlers

pub mod health;
pub mod sensor_readings;
