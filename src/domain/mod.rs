//! Domain layer: the driver contract and the values that flow through it.

pub mod driver;
pub mod params;
pub mod ports;
pub mod redirect;
pub mod response;
pub mod settings;
