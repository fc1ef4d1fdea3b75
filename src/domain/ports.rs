use super::driver::{DriverBox, DriverFactory, LegacyAdapter, LegacyDriver};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A driver type as registered by a unit.
#[derive(Clone)]
pub enum DriverType {
    Concrete(DriverFactory),
    /// A shared base that exists only to be built upon; never instantiated.
    Abstract,
}

impl DriverType {
    pub fn is_abstract(&self) -> bool {
        matches!(self, DriverType::Abstract)
    }
}

/// Collects the driver types a unit defines while it is being loaded.
#[derive(Default)]
pub struct Registrar {
    types: Vec<(String, DriverType)>,
}

impl Registrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn concrete<F>(&mut self, type_id: &str, factory: F)
    where
        F: Fn() -> DriverBox + Send + Sync + 'static,
    {
        self.push(type_id, DriverType::Concrete(Arc::new(factory)));
    }

    /// Registers an old-shape driver behind [`LegacyAdapter`].
    pub fn legacy<D, F>(&mut self, type_id: &str, factory: F)
    where
        D: LegacyDriver + 'static,
        F: Fn() -> D + Send + Sync + 'static,
    {
        self.concrete(type_id, move || Box::new(LegacyAdapter::new(factory())) as DriverBox);
    }

    pub fn abstract_type(&mut self, type_id: &str) {
        self.push(type_id, DriverType::Abstract);
    }

    pub fn into_types(self) -> Vec<(String, DriverType)> {
        self.types
    }

    fn push(&mut self, type_id: &str, driver_type: DriverType) {
        self.types.push((type_id.to_lowercase(), driver_type));
    }
}

/// Where driver units come from.
///
/// A unit is named by convention after the canonical identifier of the driver
/// it is expected to define (`merchant_paypal`). Loading a unit may register
/// any number of types, including none.
#[async_trait]
pub trait DriverCatalog: Send + Sync {
    async fn units(&self) -> Result<Vec<String>>;

    /// Fails with `DriverNotFound` when the catalog has no such unit.
    async fn load_unit(&self, unit: &str, registrar: &mut Registrar) -> Result<()>;
}

pub type DriverCatalogBox = Box<dyn DriverCatalog>;
