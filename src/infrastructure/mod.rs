//! Adapters behind the domain ports: driver catalogs, the drivers themselves,
//! and the HTTP helper drivers use to reach their gateways.

pub mod drivers;
pub mod http;
pub mod static_catalog;
