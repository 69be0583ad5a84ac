//! Settings handed to providers and profile managers.
//!
//! [`Settings`] is an ordered string-keyed mapping. Keys are dotted paths such
//! as `wallet.type`; values are [`ConfigValue`]s that can be loaded from JSON or
//! from prefixed environment variables.

use std::collections::BTreeMap;
use std::env;

use serde::{Deserialize, Serialize};

/// A configuration value that can be various types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Array(Vec<ConfigValue>),
    Object(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Parse a raw string the way environment values are interpreted.
    pub fn parse(raw: &str) -> Self {
        if let Ok(int_val) = raw.parse::<i64>() {
            ConfigValue::Integer(int_val)
        } else if let Ok(float_val) = raw.parse::<f64>() {
            ConfigValue::Float(float_val)
        } else if let Ok(bool_val) = raw.parse::<bool>() {
            ConfigValue::Boolean(bool_val)
        } else {
            ConfigValue::String(raw.to_string())
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            ConfigValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Boolean(b) => Some(*b),
            ConfigValue::String(s) => s.trim().to_lowercase().parse().ok(),
            _ => None,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Boolean(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        ConfigValue::Integer(value.into())
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

/// Ordered settings mapping.
///
/// # Examples
///
/// ```rust
/// use ferrous_profile::Settings;
///
/// let mut settings = Settings::new();
/// settings.set("wallet.type", "in_memory");
/// settings.set("debug.enabled", true);
///
/// let overlay: Settings = [("wallet.name", "alice")].into_iter().collect();
/// let merged = settings.extend(&overlay);
///
/// assert_eq!(merged.get_str("wallet.type"), Some("in_memory"));
/// assert_eq!(merged.get_str("wallet.name"), Some("alice"));
/// assert_eq!(merged.get_bool("debug.enabled"), Some(true));
/// assert!(settings.get("wallet.name").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    values: BTreeMap<String, ConfigValue>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a flat JSON object.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Collect settings from environment variables starting with `PREFIX_`.
    ///
    /// The remainder of the variable name is lowercased and `__` becomes `.`,
    /// so `ACAPY_WALLET__TYPE=basic` yields `wallet.type = "basic"`.
    pub fn from_env(prefix: &str) -> Self {
        Self::from_vars(prefix, env::vars())
    }

    /// Same mapping as [`Settings::from_env`] over an explicit variable list.
    pub fn from_vars<I>(prefix: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix = format!("{}_", prefix.to_uppercase());
        vars.into_iter()
            .filter_map(|(name, value)| {
                let rest = name.strip_prefix(&prefix)?;
                if rest.is_empty() {
                    return None;
                }
                let key = rest.to_lowercase().replace("__", ".");
                Some((key, ConfigValue::parse(&value)))
            })
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    /// Returns the first value present among `keys`.
    pub fn get_value(&self, keys: &[&str]) -> Option<&ConfigValue> {
        keys.iter().find_map(|key| self.values.get(*key))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ConfigValue::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ConfigValue::as_i64)
    }

    /// Insert or replace a value, returning the previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Option<ConfigValue> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overwrite values in place with those from `other`.
    pub fn merge(&mut self, other: &Settings) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Copy of these settings with `other` layered on top.
    pub fn extend(&self, other: &Settings) -> Settings {
        let mut merged = self.clone();
        merged.merge(other);
        merged
    }
}

impl<K, V> FromIterator<(K, V)> for Settings
where
    K: Into<String>,
    V: Into<ConfigValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
