use super::dispatcher::{self, Channel};
use super::registry::DriverRegistry;
use crate::domain::driver::{LoadedDriver, Outcome};
use crate::domain::params::RequestParams;
use crate::domain::settings::{SettingValue, Settings, SettingsSchema};
use crate::error::{GatewayError, Result};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;

/// The single entry point a host uses to take payments.
///
/// A `Gateway` holds at most one loaded driver and belongs to one request;
/// create a new one per request rather than sharing it.
pub struct Gateway {
    registry: Arc<DriverRegistry>,
    driver: Option<LoadedDriver>,
    channel: Channel,
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

impl Gateway {
    /// Creates a gateway over the process-wide registry.
    pub fn new() -> Self {
        Self::with_registry(DriverRegistry::global())
    }

    pub fn with_registry(registry: Arc<DriverRegistry>) -> Self {
        Self {
            registry,
            driver: None,
            channel: Channel::default(),
        }
    }

    /// Declares how the current request reached the host.
    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    /// Loads the named driver, replacing any previous one.
    ///
    /// Returns `false` when the name cannot be resolved to a usable driver; the
    /// gateway is then left without a driver.
    pub async fn load(&mut self, name: &str) -> bool {
        match self.try_load(name).await {
            Ok(()) => true,
            Err(e) => {
                warn!(driver = name, error = %e, "Failed to load payment driver");
                false
            }
        }
    }

    /// Like [`Gateway::load`], but reports why loading failed.
    pub async fn try_load(&mut self, name: &str) -> Result<()> {
        self.driver = None;
        self.driver = Some(self.registry.load(name).await?);
        Ok(())
    }

    /// Short name of the loaded driver, e.g. `paypal`.
    pub fn active_driver_name(&self) -> Option<&str> {
        self.driver.as_ref().map(LoadedDriver::name)
    }

    pub async fn list_valid_drivers(&self) -> Result<BTreeSet<String>> {
        self.registry.list_valid_drivers().await
    }

    /// Applies host settings to the loaded driver. Unknown keys are ignored.
    pub fn initialize<'a, I>(&mut self, overrides: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a String, &'a SettingValue)>,
    {
        self.loaded_mut()?.apply_overrides(overrides);
        Ok(())
    }

    pub async fn process(&self, params: RequestParams) -> Result<Outcome> {
        dispatcher::process(self.loaded()?, self.channel, params).await
    }

    pub async fn process_return(&self, params: RequestParams) -> Result<Outcome> {
        Ok(dispatcher::process_return(self.loaded()?, params).await)
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.driver.as_ref().map(LoadedDriver::settings)
    }

    pub fn default_settings(&self) -> Option<&SettingsSchema> {
        self.driver.as_ref().map(LoadedDriver::default_settings)
    }

    pub fn required_fields(&self) -> Option<&[&'static str]> {
        self.driver.as_ref().map(LoadedDriver::required_fields)
    }

    fn loaded(&self) -> Result<&LoadedDriver> {
        self.driver.as_ref().ok_or(GatewayError::NoDriverLoaded)
    }

    fn loaded_mut(&mut self) -> Result<&mut LoadedDriver> {
        self.driver.as_mut().ok_or(GatewayError::NoDriverLoaded)
    }
}
