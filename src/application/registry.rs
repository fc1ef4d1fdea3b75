use crate::domain::driver::{DRIVER_PREFIX, DriverId, LoadedDriver};
use crate::domain::ports::{DriverCatalogBox, DriverType, Registrar};
use crate::error::{GatewayError, Result};
use crate::infrastructure::drivers::builtin_catalog;
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::{debug, info, warn};

static GLOBAL: Lazy<Arc<DriverRegistry>> =
    Lazy::new(|| Arc::new(DriverRegistry::new(Box::new(builtin_catalog()))));

/// Resolves driver names to instances.
///
/// Holds two append-only caches: the driver types registered by the units
/// loaded so far, and the set of valid driver names once it has been
/// enumerated. Both live as long as the registry.
pub struct DriverRegistry {
    catalog: DriverCatalogBox,
    types: RwLock<HashMap<String, DriverType>>,
    loaded_units: Mutex<HashSet<String>>,
    valid_drivers: OnceCell<BTreeSet<String>>,
}

impl DriverRegistry {
    pub fn new(catalog: DriverCatalogBox) -> Self {
        Self {
            catalog,
            types: RwLock::new(HashMap::new()),
            loaded_units: Mutex::new(HashSet::new()),
            valid_drivers: OnceCell::new(),
        }
    }

    /// The process-wide registry over the built-in drivers.
    pub fn global() -> Arc<DriverRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Instantiates the driver `name` refers to, with its settings materialized.
    ///
    /// An already registered type is used directly; otherwise the unit named
    /// after the canonical identifier is loaded first.
    pub async fn load(&self, name: &str) -> Result<LoadedDriver> {
        let id = DriverId::try_from(name)?;

        let driver_type = match self.lookup(&id).await {
            Some(driver_type) => driver_type,
            None => {
                self.load_unit(id.as_str()).await?;
                self.lookup(&id)
                    .await
                    .ok_or_else(|| GatewayError::DriverNotFound(id.to_string()))?
            }
        };

        let DriverType::Concrete(factory) = driver_type else {
            return Err(GatewayError::AbstractDriver(id.to_string()));
        };

        let loaded = LoadedDriver::new(id, factory())?;
        info!(driver = loaded.name(), "Loaded payment driver");
        Ok(loaded)
    }

    /// Short names of every driver that can be instantiated.
    ///
    /// Computed on first call and then reused; units added to the catalog
    /// afterwards are not picked up. A unit that fails to load, or does not
    /// define a concrete type under its own name, is left out.
    pub async fn list_valid_drivers(&self) -> Result<BTreeSet<String>> {
        let drivers = self
            .valid_drivers
            .get_or_try_init(|| self.enumerate())
            .await?;
        Ok(drivers.clone())
    }

    async fn enumerate(&self) -> Result<BTreeSet<String>> {
        let mut valid = BTreeSet::new();

        for unit in self.catalog.units().await? {
            let unit = unit.to_lowercase();
            if !unit.starts_with(DRIVER_PREFIX) {
                continue;
            }

            if let Err(e) = self.load_unit(&unit).await {
                warn!(unit = %unit, error = %e, "Skipping driver unit that failed to load");
                continue;
            }

            let Some(id) = DriverId::parse(&unit) else {
                continue;
            };
            match self.lookup(&id).await {
                Some(DriverType::Concrete(_)) => {
                    valid.insert(id.short_name().to_owned());
                }
                Some(DriverType::Abstract) => {
                    debug!(unit = %unit, "Skipping abstract driver");
                }
                None => {
                    warn!(unit = %unit, "Driver unit does not define a type named after it");
                }
            }
        }

        info!(count = valid.len(), "Enumerated payment drivers");
        Ok(valid)
    }

    async fn lookup(&self, id: &DriverId) -> Option<DriverType> {
        self.types.read().await.get(id.as_str()).cloned()
    }

    /// Loads a unit at most once. Concurrent callers wait on the same load.
    async fn load_unit(&self, unit: &str) -> Result<()> {
        let mut loaded_units = self.loaded_units.lock().await;
        if loaded_units.contains(unit) {
            return Ok(());
        }

        let mut registrar = Registrar::new();
        self.catalog.load_unit(unit, &mut registrar).await?;

        let mut types = self.types.write().await;
        for (type_id, driver_type) in registrar.into_types() {
            if types.contains_key(&type_id) {
                debug!(type_id = %type_id, unit = %unit, "Ignoring duplicate driver type");
                continue;
            }
            types.insert(type_id, driver_type);
        }

        debug!(unit = %unit, "Loaded driver unit");
        loaded_units.insert(unit.to_owned());
        Ok(())
    }
}
