//! Application layer orchestrating driver resolution and dispatch.
//!
//! `Gateway` is the facade a host talks to. It asks the `DriverRegistry` for
//! a driver by name and hands requests to the `dispatcher`, which enforces the
//! same validation contract for every driver.

pub mod dispatcher;
pub mod gateway;
pub mod registry;
