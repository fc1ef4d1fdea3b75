use crate::domain::params::RequestParams;
use crate::domain::settings::SettingValue;
use crate::error::Result;
use std::collections::BTreeMap;
use std::io::Read;

/// Reads request parameters and settings overrides from JSON objects.
///
/// Parameters are a flat object of strings; numbers and booleans are accepted
/// and turned into their text form. Settings keep their JSON type so boolean
/// and numeric settings can be set directly.
pub struct RequestReader<R: Read> {
    source: R,
}

impl<R: Read> RequestReader<R> {
    /// Creates a new `RequestReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        Self { source }
    }

    pub fn params(self) -> Result<RequestParams> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_reader(self.source)?;
        Ok(raw
            .into_iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    serde_json::Value::Null => return None,
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                Some((key, text))
            })
            .collect())
    }

    pub fn settings(self) -> Result<BTreeMap<String, SettingValue>> {
        Ok(serde_json::from_reader(self.source)?)
    }
}

/// Splits a `key=value` pair. The value may itself contain `=`.
pub fn parse_key_value(pair: &str) -> std::result::Result<(String, String), String> {
    pair.split_once('=')
        .map(|(key, value)| (key.trim().to_owned(), value.to_owned()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{pair}'"))
}
