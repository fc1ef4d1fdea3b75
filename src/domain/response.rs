use rust_decimal::Decimal;
use serde::Serialize;

/// Reason code for a request that lacks one of the driver's required fields.
pub const FIELD_MISSING: &str = "field_missing";
/// Reason code for a driver that has no return leg.
pub const RETURN_NOT_SUPPORTED: &str = "return_not_supported";

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failed,
    Pending,
}

/// The uniform result of a `process` or `process_return` call.
///
/// Fields are private so a response cannot change once it has been handed
/// back to the host. Use the consuming `with_*` builders while constructing it.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct Response {
    status: Status,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_field: Option<String>,
}

impl Response {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            transaction_id: None,
            amount: None,
            error_field: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Status::Success, message)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(Status::Failed, message)
    }

    pub fn pending(message: impl Into<String>) -> Self {
        Self::new(Status::Pending, message)
    }

    /// A failed response naming the first required field that was missing.
    pub fn field_missing(field: impl Into<String>) -> Self {
        Self {
            error_field: Some(field.into()),
            ..Self::failed(FIELD_MISSING)
        }
    }

    pub fn return_not_supported() -> Self {
        Self::failed(RETURN_NOT_SUPPORTED)
    }

    pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn amount(&self) -> Option<Decimal> {
        self.amount
    }

    pub fn error_field(&self) -> Option<&str> {
        self.error_field.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
