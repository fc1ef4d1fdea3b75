#![allow(dead_code)]

use async_trait::async_trait;
use merchant_gateway::application::registry::DriverRegistry;
use merchant_gateway::domain::driver::{Driver, LegacyDriver, Outcome};
use merchant_gateway::domain::params::RequestParams;
use merchant_gateway::domain::ports::{DriverCatalog, Registrar};
use merchant_gateway::domain::response::Response;
use merchant_gateway::domain::settings::{
    SettingDescriptor, SettingKind, Settings, SettingsSchema,
};
use merchant_gateway::error::Result;
use merchant_gateway::infrastructure::static_catalog::StaticCatalog;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Card driver that remembers the last params it was handed.
#[derive(Clone, Default)]
pub struct RecordingDriver {
    pub seen: Arc<Mutex<Option<RequestParams>>>,
}

#[async_trait]
impl Driver for RecordingDriver {
    fn required_fields(&self) -> &[&'static str] {
        &["amount", "card_no", "exp_month", "exp_year"]
    }

    fn default_settings(&self) -> SettingsSchema {
        SettingsSchema::new()
            .literal("username", "")
            .literal("test_mode", true)
            .descriptor(
                "sandbox",
                SettingDescriptor::new(SettingKind::Bool)
                    .with_default(false)
                    .with_label("Sandbox"),
            )
    }

    async fn process(&self, settings: &Settings, params: RequestParams) -> Outcome {
        *self.seen.lock().unwrap() = Some(params);
        let mode = if settings.flag("test_mode") { "test" } else { "live" };
        Response::success(mode).with_transaction_id("REC-1").into()
    }

    fn supports_return_callback(&self) -> bool {
        true
    }

    async fn process_return(&self, _settings: &Settings, params: RequestParams) -> Outcome {
        Response::success(format!("returned:{}", params.get("ref").unwrap_or("-"))).into()
    }
}

/// A gateway that never sends the payer away, so it has no return leg.
pub struct OneWayDriver;

#[async_trait]
impl Driver for OneWayDriver {
    fn required_fields(&self) -> &[&'static str] {
        &["amount"]
    }

    fn default_settings(&self) -> SettingsSchema {
        SettingsSchema::new()
    }

    async fn process(&self, _settings: &Settings, _params: RequestParams) -> Outcome {
        Response::success("charged").into()
    }
}

/// Old-shape driver with a parameterless return handler.
pub struct OldDriver {
    pub with_return: bool,
}

#[async_trait]
impl LegacyDriver for OldDriver {
    fn required_fields(&self) -> &[&'static str] {
        &["amount"]
    }

    fn default_settings(&self) -> SettingsSchema {
        SettingsSchema::new().literal("vendor", "old")
    }

    async fn legacy_process(&self, settings: &Settings, params: RequestParams) -> Outcome {
        Response::success(format!(
            "legacy:{}:{}",
            settings.text("vendor").unwrap_or(""),
            params.get("amount").unwrap_or("")
        ))
        .into()
    }

    fn supports_legacy_return(&self) -> bool {
        self.with_return
    }

    async fn legacy_process_return(&self, _settings: &Settings) -> Outcome {
        Response::pending("legacy_return").into()
    }
}

/// Old-shape process entry point paired with the current return handler.
pub struct MixedDriver;

#[async_trait]
impl LegacyDriver for MixedDriver {
    fn required_fields(&self) -> &[&'static str] {
        &["amount"]
    }

    fn default_settings(&self) -> SettingsSchema {
        SettingsSchema::new()
    }

    async fn legacy_process(&self, _settings: &Settings, params: RequestParams) -> Outcome {
        Response::success(format!("mixed:{}", params.get("amount").unwrap_or(""))).into()
    }

    fn supports_return(&self) -> bool {
        true
    }

    async fn process_return(&self, _settings: &Settings, params: RequestParams) -> Outcome {
        Response::success(format!("mixed_return:{}", params.get("ref").unwrap_or("-"))).into()
    }

    fn supports_legacy_return(&self) -> bool {
        true
    }

    async fn legacy_process_return(&self, _settings: &Settings) -> Outcome {
        Response::failed("params_dropped").into()
    }
}

/// Registry holding only the `mixed` driver.
pub fn mixed_registry() -> Arc<DriverRegistry> {
    let catalog = StaticCatalog::new().with_unit("merchant_mixed", |r| {
        r.legacy("merchant_mixed", || MixedDriver);
    });
    Arc::new(DriverRegistry::new(Box::new(catalog)))
}

/// Driver whose schema is inconsistent, so it can never be loaded.
pub struct BadSchemaDriver;

#[async_trait]
impl Driver for BadSchemaDriver {
    fn required_fields(&self) -> &[&'static str] {
        &[]
    }

    fn default_settings(&self) -> SettingsSchema {
        SettingsSchema::new().descriptor(
            "test_mode",
            SettingDescriptor::new(SettingKind::Bool).with_default("sometimes"),
        )
    }

    async fn process(&self, _settings: &Settings, _params: RequestParams) -> Outcome {
        Response::success("unreachable").into()
    }
}

/// Catalog with working, legacy, abstract and broken units.
pub fn test_catalog() -> StaticCatalog {
    StaticCatalog::new()
        .with_unit("merchant_recording", |r| {
            r.concrete("merchant_recording", || Box::new(RecordingDriver::default()));
        })
        .with_unit("merchant_oneway", |r| {
            r.concrete("merchant_oneway", || Box::new(OneWayDriver));
        })
        .with_unit("merchant_old", |r| {
            r.legacy("merchant_old", || OldDriver { with_return: true });
        })
        .with_unit("merchant_old_oneway", |r| {
            r.legacy("merchant_old_oneway", || OldDriver { with_return: false });
        })
        .with_unit("merchant_base", |r| r.abstract_type("merchant_base"))
        .with_unit("merchant_misnamed", |r| {
            r.concrete("merchant_something_else", || Box::new(OneWayDriver));
        })
        .with_unit("merchant_bad_schema", |r| {
            r.concrete("merchant_bad_schema", || Box::new(BadSchemaDriver));
        })
        .with_unit("readme", |_| {})
}

pub fn test_registry() -> Arc<DriverRegistry> {
    Arc::new(DriverRegistry::new(Box::new(test_catalog())))
}

/// Registry whose `recording` driver shares its record with the caller.
pub fn recording_registry() -> (Arc<DriverRegistry>, RecordingDriver) {
    let recorder = RecordingDriver::default();
    let shared = recorder.clone();
    let catalog = StaticCatalog::new().with_unit("merchant_recording", move |r| {
        let driver = shared.clone();
        r.concrete("merchant_recording", move || Box::new(driver.clone()));
    });
    (Arc::new(DriverRegistry::new(Box::new(catalog))), recorder)
}

/// Wraps a catalog and counts how often it is consulted.
#[derive(Default, Clone)]
pub struct CatalogCalls {
    pub units: Arc<AtomicUsize>,
    pub loads: Arc<AtomicUsize>,
}

impl CatalogCalls {
    pub fn units(&self) -> usize {
        self.units.load(Ordering::SeqCst)
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

pub struct CountingCatalog {
    inner: StaticCatalog,
    calls: CatalogCalls,
}

impl CountingCatalog {
    pub fn new(inner: StaticCatalog) -> (Self, CatalogCalls) {
        let calls = CatalogCalls::default();
        (
            Self {
                inner,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl DriverCatalog for CountingCatalog {
    async fn units(&self) -> Result<Vec<String>> {
        self.calls.units.fetch_add(1, Ordering::SeqCst);
        self.inner.units().await
    }

    async fn load_unit(&self, unit: &str, registrar: &mut Registrar) -> Result<()> {
        self.calls.loads.fetch_add(1, Ordering::SeqCst);
        // Widen the window in which concurrent first loads could race.
        tokio::task::yield_now().await;
        self.inner.load_unit(unit, registrar).await
    }
}

pub fn card_params() -> RequestParams {
    RequestParams::new()
        .with("amount", "10.00")
        .with("card_no", "4111111111111111")
        .with("exp_month", "5")
        .with("exp_year", "30")
}
