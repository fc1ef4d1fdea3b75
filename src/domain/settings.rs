use crate::error::{GatewayError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single driver setting value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    #[default]
    Null,
    Bool(bool),
    Text(String),
    /// Written as a JSON number so settings files read back with the same type.
    Number(#[serde(with = "rust_decimal::serde::float")] Decimal),
}

impl SettingValue {
    /// Loose boolean reading used when an override targets a boolean setting.
    ///
    /// Empty text and `"0"` are false, as is a zero number or null.
    pub fn coerce_bool(&self) -> bool {
        match self {
            SettingValue::Null => false,
            SettingValue::Bool(b) => *b,
            SettingValue::Number(n) => !n.is_zero(),
            SettingValue::Text(s) => !(s.is_empty() || s == "0"),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SettingValue::Null)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_owned())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<Decimal> for SettingValue {
    fn from(value: Decimal) -> Self {
        SettingValue::Number(value)
    }
}

/// Type hint carried by a setting descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingKind {
    Text,
    Bool,
    Select,
}

/// A structured setting declaration: default plus presentation hints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SettingDescriptor {
    #[serde(default)]
    pub default: Option<SettingValue>,
    #[serde(default, rename = "type")]
    pub kind: Option<SettingKind>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

impl SettingDescriptor {
    pub fn new(kind: SettingKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn with_default(mut self, default: impl Into<SettingValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    fn validate(&self, key: &str) -> Result<()> {
        let invalid = |reason: &str| GatewayError::InvalidSettingsSchema {
            key: key.to_owned(),
            reason: reason.to_owned(),
        };

        match (self.kind, &self.default) {
            (Some(SettingKind::Bool), Some(value)) if !value.is_null() && value.as_bool().is_none() => {
                Err(invalid("boolean setting has a non-boolean default"))
            }
            (Some(SettingKind::Select), _) if self.options.is_empty() => {
                Err(invalid("select setting declares no options"))
            }
            (Some(SettingKind::Select), Some(SettingValue::Text(default)))
                if !self.options.contains(default) =>
            {
                Err(invalid("select default is not one of its options"))
            }
            _ => Ok(()),
        }
    }
}

/// One entry in a driver's default-settings schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingSpec {
    Descriptor(SettingDescriptor),
    Literal(SettingValue),
}

/// The settings a driver declares, with their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsSchema(BTreeMap<String, SettingSpec>);

impl SettingsSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn literal(mut self, key: impl Into<String>, default: impl Into<SettingValue>) -> Self {
        self.0
            .insert(key.into(), SettingSpec::Literal(default.into()));
        self
    }

    pub fn descriptor(mut self, key: impl Into<String>, descriptor: SettingDescriptor) -> Self {
        self.0
            .insert(key.into(), SettingSpec::Descriptor(descriptor));
        self
    }

    pub fn get(&self, key: &str) -> Option<&SettingSpec> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingSpec)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn is_declared_bool(&self, key: &str) -> bool {
        matches!(
            self.0.get(key),
            Some(SettingSpec::Descriptor(SettingDescriptor {
                kind: Some(SettingKind::Bool),
                ..
            }))
        )
    }
}

/// The current settings of a loaded driver.
///
/// Keys are exactly the keys of the schema it was materialized from.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Settings(BTreeMap<String, SettingValue>);

impl Settings {
    /// Expands a schema into concrete values.
    ///
    /// Literal entries are their own default; descriptors use their `default`
    /// or null when none is given.
    pub fn materialize(schema: &SettingsSchema) -> Result<Self> {
        let mut values = BTreeMap::new();
        for (key, spec) in schema.iter() {
            let value = match spec {
                SettingSpec::Literal(value) => value.clone(),
                SettingSpec::Descriptor(descriptor) => {
                    descriptor.validate(key)?;
                    descriptor.default.clone().unwrap_or_default()
                }
            };
            values.insert(key.to_owned(), value);
        }
        Ok(Self(values))
    }

    /// Merges host overrides into the current values.
    ///
    /// Keys unknown to the schema are ignored. Boolean settings are coerced.
    pub fn apply_overrides<'a, I>(&mut self, schema: &SettingsSchema, overrides: I)
    where
        I: IntoIterator<Item = (&'a String, &'a SettingValue)>,
    {
        for (key, value) in overrides {
            let Some(current) = self.0.get_mut(key) else {
                continue;
            };
            *current = if current.as_bool().is_some() || schema.is_declared_bool(key) {
                SettingValue::Bool(value.coerce_bool())
            } else {
                value.clone()
            };
        }
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.0.get(key)
    }

    /// Boolean value of `key`, false when missing or not a boolean.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(SettingValue::as_bool).unwrap_or(false)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(SettingValue::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
