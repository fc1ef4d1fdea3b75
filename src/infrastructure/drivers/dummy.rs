use crate::domain::driver::{Driver, Outcome};
use crate::domain::params::{CARD_NO, EXP_MONTH, EXP_YEAR, RequestParams};
use crate::domain::response::Response;
use crate::domain::settings::{Settings, SettingsSchema};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// The only card number the dummy gateway approves.
pub const TEST_CARD: &str = "4111111111111111";

static NEXT_TRANSACTION: AtomicU64 = AtomicU64::new(1);

/// On-site card gateway for development: approves [`TEST_CARD`], declines the rest.
#[derive(Debug, Default)]
pub struct DummyDriver;

#[async_trait]
impl Driver for DummyDriver {
    fn required_fields(&self) -> &[&'static str] {
        &["amount", CARD_NO, "name", EXP_MONTH, EXP_YEAR, "csc"]
    }

    fn default_settings(&self) -> SettingsSchema {
        SettingsSchema::new()
    }

    async fn process(&self, _settings: &Settings, params: RequestParams) -> Outcome {
        let Some(amount) = params
            .get("amount")
            .and_then(|amount| Decimal::from_str(amount.trim()).ok())
        else {
            return Response::failed("invalid_amount").into();
        };

        if params.get(CARD_NO) != Some(TEST_CARD) {
            return Response::failed("card_declined").into();
        }

        let id = NEXT_TRANSACTION.fetch_add(1, Ordering::Relaxed);
        Response::success("approved")
            .with_transaction_id(format!("DUMMY-{id:06}"))
            .with_amount(amount)
            .into()
    }
}
