//! Routes requests to the loaded driver.
//!
//! `process` runs the same pipeline for every driver: secure-channel check,
//! required-field validation, normalization, then the driver itself.
//! `process_return` goes straight to the driver's return handler when it
//! declares one.
//!
//! Old-shape drivers are registered behind `LegacyAdapter`, which makes the
//! fallback explicit per operation:
//!
//! * process: the legacy `legacy_process(params)` when the driver is legacy,
//!   the current `process(params)` otherwise;
//! * process_return: the legacy driver's `process_return(params)` when it
//!   declares one, then its no-params `legacy_process_return()`, then
//!   `return_not_supported`.

use crate::domain::driver::{Driver, LoadedDriver, Outcome};
use crate::domain::params::{CARD_NO, RequestParams};
use crate::domain::response::Response;
use crate::error::{GatewayError, Result};
use tracing::{debug, warn};

/// Whether the inbound request is known to have arrived over an encrypted transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Channel {
    Secure,
    #[default]
    Unverified,
}

/// Refuses raw card numbers that did not arrive over a secure channel.
pub fn ensure_secure_channel(channel: Channel, params: &RequestParams) -> Result<()> {
    if params.contains(CARD_NO) && channel != Channel::Secure {
        return Err(GatewayError::InsecureCardSubmission);
    }
    Ok(())
}

/// Checks required fields in declaration order and reports only the first gap.
pub fn validate(
    required_fields: &[&str],
    params: RequestParams,
) -> std::result::Result<RequestParams, Response> {
    match required_fields
        .iter()
        .find(|field| !params.is_filled(field))
    {
        Some(field) => Err(Response::field_missing(*field)),
        None => Ok(params),
    }
}

pub async fn process(
    loaded: &LoadedDriver,
    channel: Channel,
    params: RequestParams,
) -> Result<Outcome> {
    if let Err(e) = ensure_secure_channel(channel, &params) {
        warn!(driver = loaded.name(), "Refusing card details received over an insecure channel");
        return Err(e);
    }

    let params = match validate(loaded.required_fields(), params) {
        Ok(params) => params.normalize(),
        Err(response) => {
            debug!(
                driver = loaded.name(),
                field = response.error_field(),
                "Request is missing a required field"
            );
            return Ok(response.into());
        }
    };

    debug!(driver = loaded.name(), fields = params.len(), "Dispatching process");
    Ok(loaded.driver().process(loaded.settings(), params).await)
}

pub async fn process_return(loaded: &LoadedDriver, params: RequestParams) -> Outcome {
    if !loaded.driver().supports_return_callback() {
        debug!(driver = loaded.name(), "Driver has no return callback");
        return Response::return_not_supported().into();
    }

    debug!(driver = loaded.name(), fields = params.len(), "Dispatching process_return");
    loaded
        .driver()
        .process_return(loaded.settings(), params)
        .await
}
