use crate::domain::ports::{DriverCatalog, Registrar};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;

type UnitLoader = Box<dyn Fn(&mut Registrar) + Send + Sync>;

/// A catalog of driver units compiled into the binary.
///
/// Each unit is a function that registers the types it defines. Units are
/// listed in name order.
#[derive(Default)]
pub struct StaticCatalog {
    units: BTreeMap<String, UnitLoader>,
}

impl StaticCatalog {
    /// Creates a new, empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit<F>(mut self, unit: &str, loader: F) -> Self
    where
        F: Fn(&mut Registrar) + Send + Sync + 'static,
    {
        self.units.insert(unit.to_lowercase(), Box::new(loader));
        self
    }
}

#[async_trait]
impl DriverCatalog for StaticCatalog {
    async fn units(&self) -> Result<Vec<String>> {
        Ok(self.units.keys().cloned().collect())
    }

    async fn load_unit(&self, unit: &str, registrar: &mut Registrar) -> Result<()> {
        let loader = self
            .units
            .get(&unit.to_lowercase())
            .ok_or_else(|| GatewayError::DriverNotFound(unit.to_owned()))?;
        loader(registrar);
        Ok(())
    }
}
