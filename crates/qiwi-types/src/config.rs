//! Environment variable resolution for configuration values.
//!
//! Configuration files may reference the environment instead of embedding secrets:
//!
//! ```json
//! {
//!   "token": "$QIWI_TOKEN",
//!   "apiUrl": "https://edge.qiwi.com"
//! }
//! ```
//!
//! Both `$VAR` and `${VAR}` forms are recognised by [`LiteralOrEnv`].

use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::str::FromStr;

/// A value given either literally or as a reference to an environment variable.
///
/// The reference is resolved once, during deserialization; afterwards the wrapper derefs to
/// the parsed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralOrEnv<T>(T);

impl<T> LiteralOrEnv<T> {
    pub fn from_literal(value: T) -> Self {
        Self(value)
    }

    pub fn inner(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Returns the referenced variable name if `s` is `$VAR` or `${VAR}`.
fn env_var_name(s: &str) -> Option<&str> {
    if let Some(braced) = s.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
        return Some(braced);
    }
    let bare = s.strip_prefix('$')?;
    let is_name = !bare.is_empty() && bare.chars().all(|c| c.is_alphanumeric() || c == '_');
    is_name.then_some(bare)
}

impl<T> Deref for LiteralOrEnv<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de, T> Deserialize<'de> for LiteralOrEnv<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let value = match env_var_name(&raw) {
            Some(name) => std::env::var(name).map_err(|_| {
                serde::de::Error::custom(format!(
                    "Environment variable '{name}' not found (referenced as '{raw}')"
                ))
            })?,
            None => raw,
        };
        value
            .parse::<T>()
            .map(LiteralOrEnv)
            .map_err(|e| serde::de::Error::custom(format!("Failed to parse value: {e}")))
    }
}

impl<T: Serialize> Serialize for LiteralOrEnv<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}
