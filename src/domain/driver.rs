use super::params::RequestParams;
use super::redirect::RedirectPost;
use super::response::Response;
use super::settings::{SettingValue, Settings, SettingsSchema};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Prefix every canonical driver identifier carries.
pub const DRIVER_PREFIX: &str = "merchant_";

/// What a driver hands back for a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Complete(Response),
    /// The payer must be sent on to an external page; nothing else may be written.
    Redirect(RedirectPost),
}

impl Outcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            Outcome::Complete(response) => Some(response),
            Outcome::Redirect(_) => None,
        }
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            Outcome::Complete(response) => Some(response),
            Outcome::Redirect(_) => None,
        }
    }
}

impl From<Response> for Outcome {
    fn from(response: Response) -> Self {
        Outcome::Complete(response)
    }
}

impl From<RedirectPost> for Outcome {
    fn from(redirect: RedirectPost) -> Self {
        Outcome::Redirect(redirect)
    }
}

/// A payment gateway integration.
///
/// Drivers are stateless apart from what they are constructed with; the
/// settings they run under are passed to every call.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Fields that must be filled before `process` is called, in check order.
    fn required_fields(&self) -> &[&'static str];

    fn default_settings(&self) -> SettingsSchema;

    async fn process(&self, settings: &Settings, params: RequestParams) -> Outcome;

    /// Whether the gateway ever sends the payer back to the host.
    fn supports_return_callback(&self) -> bool {
        false
    }

    async fn process_return(&self, _settings: &Settings, _params: RequestParams) -> Outcome {
        Response::return_not_supported().into()
    }
}

/// The older driver shape: a differently named process entry point and,
/// usually, a return handler that takes no parameters.
///
/// Each operation is resolved on its own. A legacy driver may still declare
/// the current parameter-taking return handler, which then wins over the
/// parameterless one.
#[async_trait]
pub trait LegacyDriver: Send + Sync {
    fn required_fields(&self) -> &[&'static str];

    fn default_settings(&self) -> SettingsSchema;

    async fn legacy_process(&self, settings: &Settings, params: RequestParams) -> Outcome;

    fn supports_return(&self) -> bool {
        false
    }

    async fn process_return(&self, _settings: &Settings, _params: RequestParams) -> Outcome {
        Response::return_not_supported().into()
    }

    fn supports_legacy_return(&self) -> bool {
        false
    }

    async fn legacy_process_return(&self, _settings: &Settings) -> Outcome {
        Response::return_not_supported().into()
    }
}

/// Presents a [`LegacyDriver`] through the current [`Driver`] contract.
pub struct LegacyAdapter<D> {
    inner: D,
}

impl<D: LegacyDriver> LegacyAdapter<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<D: LegacyDriver> Driver for LegacyAdapter<D> {
    fn required_fields(&self) -> &[&'static str] {
        self.inner.required_fields()
    }

    fn default_settings(&self) -> SettingsSchema {
        self.inner.default_settings()
    }

    async fn process(&self, settings: &Settings, params: RequestParams) -> Outcome {
        self.inner.legacy_process(settings, params).await
    }

    fn supports_return_callback(&self) -> bool {
        self.inner.supports_return() || self.inner.supports_legacy_return()
    }

    async fn process_return(&self, settings: &Settings, params: RequestParams) -> Outcome {
        if self.inner.supports_return() {
            self.inner.process_return(settings, params).await
        } else if self.inner.supports_legacy_return() {
            self.inner.legacy_process_return(settings).await
        } else {
            Response::return_not_supported().into()
        }
    }
}

pub type DriverBox = Box<dyn Driver>;
pub type DriverFactory = Arc<dyn Fn() -> DriverBox + Send + Sync>;

/// Canonical, prefix-qualified driver identifier, e.g. `merchant_paypal`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DriverId(String);

impl DriverId {
    /// Accepts a short name (`paypal`) or a qualified one (`Merchant_PayPal`).
    ///
    /// Returns `None` when no short name remains after the prefix.
    pub fn parse(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        let canonical = if lower.starts_with(DRIVER_PREFIX) {
            lower
        } else {
            format!("{DRIVER_PREFIX}{lower}")
        };

        (canonical.len() > DRIVER_PREFIX.len()).then_some(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier with the prefix stripped.
    pub fn short_name(&self) -> &str {
        &self.0[DRIVER_PREFIX.len()..]
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A driver instance together with its materialized settings.
pub struct LoadedDriver {
    id: DriverId,
    driver: DriverBox,
    schema: SettingsSchema,
    settings: Settings,
}

impl LoadedDriver {
    pub fn new(id: DriverId, driver: DriverBox) -> Result<Self> {
        let schema = driver.default_settings();
        let settings = Settings::materialize(&schema)?;
        Ok(Self {
            id,
            driver,
            schema,
            settings,
        })
    }

    pub fn id(&self) -> &DriverId {
        &self.id
    }

    pub fn name(&self) -> &str {
        self.id.short_name()
    }

    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    pub fn required_fields(&self) -> &[&'static str] {
        self.driver.required_fields()
    }

    pub fn default_settings(&self) -> &SettingsSchema {
        &self.schema
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn apply_overrides<'a, I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (&'a String, &'a SettingValue)>,
    {
        self.settings.apply_overrides(&self.schema, overrides);
    }
}

impl fmt::Debug for LoadedDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedDriver")
            .field("id", &self.id)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl TryFrom<&str> for DriverId {
    type Error = GatewayError;

    fn try_from(name: &str) -> Result<Self> {
        Self::parse(name).ok_or_else(|| GatewayError::DriverNotFound(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OldGateway;

    #[async_trait]
    impl LegacyDriver for OldGateway {
        fn required_fields(&self) -> &[&'static str] {
            &["amount"]
        }

        fn default_settings(&self) -> SettingsSchema {
            SettingsSchema::new().literal("merchant_id", "")
        }

        async fn legacy_process(&self, _settings: &Settings, params: RequestParams) -> Outcome {
            Response::success(format!("legacy:{}", params.get("amount").unwrap_or(""))).into()
        }

        fn supports_legacy_return(&self) -> bool {
            true
        }

        async fn legacy_process_return(&self, _settings: &Settings) -> Outcome {
            Response::pending("legacy_return").into()
        }
    }

    struct MixedGateway;

    #[async_trait]
    impl LegacyDriver for MixedGateway {
        fn required_fields(&self) -> &[&'static str] {
            &[]
        }

        fn default_settings(&self) -> SettingsSchema {
            SettingsSchema::new()
        }

        async fn legacy_process(&self, _settings: &Settings, _params: RequestParams) -> Outcome {
            Response::success("mixed").into()
        }

        fn supports_return(&self) -> bool {
            true
        }

        async fn process_return(&self, _settings: &Settings, params: RequestParams) -> Outcome {
            Response::success(format!("ref:{}", params.get("ref").unwrap_or("-"))).into()
        }

        fn supports_legacy_return(&self) -> bool {
            true
        }

        async fn legacy_process_return(&self, _settings: &Settings) -> Outcome {
            Response::failed("parameterless_return").into()
        }
    }

    #[tokio::test]
    async fn test_legacy_adapter_prefers_return_with_params() {
        let adapter = LegacyAdapter::new(MixedGateway);
        let settings = Settings::default();

        let outcome = adapter.process(&settings, RequestParams::new()).await;
        assert_eq!(outcome.response().unwrap().message(), "mixed");

        assert!(adapter.supports_return_callback());
        let outcome = adapter
            .process_return(&settings, RequestParams::new().with("ref", "R-7"))
            .await;
        assert_eq!(outcome.response().unwrap().message(), "ref:R-7");
    }

    #[test]
    fn test_driver_id_forms_are_equivalent() {
        let forms = ["paypal", "Paypal", "merchant_paypal", "MERCHANT_PAYPAL", " paypal "];
        for form in forms {
            let id = DriverId::parse(form).unwrap();
            assert_eq!(id.as_str(), "merchant_paypal");
            assert_eq!(id.short_name(), "paypal");
        }
    }

    #[test]
    fn test_driver_id_rejects_empty_names() {
        assert!(DriverId::parse("").is_none());
        assert!(DriverId::parse("merchant_").is_none());
        assert!(DriverId::try_from("  ").is_err());
    }

    #[tokio::test]
    async fn test_legacy_adapter_routes_entry_points() {
        let adapter = LegacyAdapter::new(OldGateway);
        let settings = Settings::materialize(&adapter.default_settings()).unwrap();

        let outcome = adapter
            .process(&settings, RequestParams::new().with("amount", "3"))
            .await;
        assert_eq!(outcome.response().unwrap().message(), "legacy:3");

        assert!(adapter.supports_return_callback());
        let outcome = adapter
            .process_return(&settings, RequestParams::new().with("ignored", "1"))
            .await;
        assert_eq!(outcome.response().unwrap().message(), "legacy_return");
    }

    #[test]
    fn test_loaded_driver_materializes_settings() {
        let loaded = LoadedDriver::new(
            DriverId::parse("old").unwrap(),
            Box::new(LegacyAdapter::new(OldGateway)),
        )
        .unwrap();

        assert_eq!(loaded.name(), "old");
        assert_eq!(loaded.required_fields(), &["amount"]);
        assert_eq!(loaded.settings().text("merchant_id"), Some(""));
    }
}
