use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw card number. Its presence triggers the secure-channel check.
pub const CARD_NO: &str = "card_no";
pub const CARD_TYPE: &str = "card_type";
pub const EXP_MONTH: &str = "exp_month";
pub const EXP_YEAR: &str = "exp_year";
pub const START_MONTH: &str = "start_month";
pub const START_YEAR: &str = "start_year";

/// Field values supplied by the host for a single payment request.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(transparent)]
pub struct RequestParams(BTreeMap<String, String>);

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// A field is filled when it is present and neither `""` nor `"0"`.
    pub fn is_filled(&self, key: &str) -> bool {
        matches!(self.get(key), Some(value) if !value.is_empty() && value != "0")
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pads card dates and lowercases the card type.
    ///
    /// Months become two digits, years four digits. Only keys that are
    /// present are touched, and this never fails: unparsable values pad as 0.
    pub fn normalize(mut self) -> Self {
        for key in [EXP_MONTH, START_MONTH] {
            self.pad(key, 2);
        }
        for key in [EXP_YEAR, START_YEAR] {
            self.pad(key, 4);
        }
        if let Some(card_type) = self.0.get_mut(CARD_TYPE) {
            *card_type = card_type.to_lowercase();
        }
        self
    }

    fn pad(&mut self, key: &str, width: usize) {
        if let Some(value) = self.0.get_mut(key) {
            *value = format!("{:0width$}", leading_integer(value), width = width);
        }
    }
}

/// Reads an optional sign followed by leading digits, ignoring the rest.
fn leading_integer(value: &str) -> i64 {
    let trimmed = value.trim();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });

    if negative { -magnitude } else { magnitude }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Extend<(String, String)> for RequestParams {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}
