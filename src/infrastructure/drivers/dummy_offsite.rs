use crate::domain::driver::{Driver, Outcome};
use crate::domain::params::RequestParams;
use crate::domain::redirect::RedirectPost;
use crate::domain::response::Response;
use crate::domain::settings::{SettingDescriptor, SettingKind, Settings, SettingsSchema};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;

pub const DEFAULT_PAYMENT_URL: &str = "https://gateway.example.com/pay";

/// Off-site gateway for development: sends the payer to a hosted payment page
/// and reads the outcome from the return callback.
#[derive(Debug, Default)]
pub struct DummyOffsiteDriver;

#[async_trait]
impl Driver for DummyOffsiteDriver {
    fn required_fields(&self) -> &[&'static str] {
        &["amount", "return_url"]
    }

    fn default_settings(&self) -> SettingsSchema {
        SettingsSchema::new()
            .literal("payment_url", DEFAULT_PAYMENT_URL)
            .descriptor(
                "test_mode",
                SettingDescriptor::new(SettingKind::Bool)
                    .with_default(true)
                    .with_label("Test Mode"),
            )
    }

    async fn process(&self, settings: &Settings, params: RequestParams) -> Outcome {
        let target = settings.text("payment_url").unwrap_or(DEFAULT_PAYMENT_URL);

        let mut fields = Vec::new();
        for key in ["amount", "return_url", "reference"] {
            if let Some(value) = params.get(key) {
                fields.push((key.to_owned(), value.to_owned()));
            }
        }
        let test_mode = if settings.flag("test_mode") { "1" } else { "0" };
        fields.push(("test_mode".to_owned(), test_mode.to_owned()));

        RedirectPost::new(target, fields).into()
    }

    fn supports_return_callback(&self) -> bool {
        true
    }

    async fn process_return(&self, _settings: &Settings, params: RequestParams) -> Outcome {
        let response = match params.get("status") {
            Some("paid") => Response::success("paid"),
            Some("pending") => Response::pending("pending"),
            _ => return Response::failed("payment_cancelled").into(),
        };

        let response = match params.get("txn_id") {
            Some(txn_id) => response.with_transaction_id(txn_id),
            None => response,
        };
        match params
            .get("amount")
            .and_then(|amount| Decimal::from_str(amount.trim()).ok())
        {
            Some(amount) => response.with_amount(amount).into(),
            None => response.into(),
        }
    }
}
