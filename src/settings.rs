//! Generation settings.
//!
//! Settings come in layers: command line flags first, then the optional
//! `js2cSettings` mapping at the root of the schema. Every field of a
//! layer is optional; [`Settings::resolve`] merges the layers and checks
//! that the required ones were supplied somewhere.
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Key of the in-schema settings block.
pub const SCHEMA_SETTINGS_KEY: &str = "js2cSettings";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct SettingsLayer {
    pub additional_tokens: Option<u64>,
    pub allow_additional_properties: Option<bool>,
    pub h_prefix: Option<String>,
    pub h_postfix: Option<String>,
    pub c_prefix: Option<String>,
    pub c_postfix: Option<String>,
    pub external_runtime: Option<String>,
}

impl SettingsLayer {
    /// Read the `js2cSettings` block of a schema, if there is one.
    pub fn from_schema(schema: &Value) -> Result<Self> {
        match schema.get(SCHEMA_SETTINGS_KEY) {
            None => Ok(Self::default()),
            Some(block) => crate::path_de::from_value_with_path(block.clone())
                .map_err(|e| Error::Settings(format!("{SCHEMA_SETTINGS_KEY} {e}"))),
        }
    }

    /// Fill the gaps of `self` from `lower`.
    pub fn or(self, lower: Self) -> Self {
        Self {
            additional_tokens: self.additional_tokens.or(lower.additional_tokens),
            allow_additional_properties: self
                .allow_additional_properties
                .or(lower.allow_additional_properties),
            h_prefix: self.h_prefix.or(lower.h_prefix),
            h_postfix: self.h_postfix.or(lower.h_postfix),
            c_prefix: self.c_prefix.or(lower.c_prefix),
            c_postfix: self.c_postfix.or(lower.c_postfix),
            external_runtime: self.external_runtime.or(lower.external_runtime),
        }
    }
}

/// Resolved, immutable settings for one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Slack added to the static token budget, e.g. for the tokens of
    /// unknown keys that are skipped when additional properties are allowed.
    pub additional_tokens: u64,
    /// Default policy for unknown object keys. A schema object's own
    /// `additionalProperties` wins over this.
    pub allow_additional_properties: bool,
    pub h_prefix: Option<String>,
    pub h_postfix: Option<String>,
    pub c_prefix: Option<String>,
    pub c_postfix: Option<String>,
    /// Include this file instead of embedding the runtime text.
    pub external_runtime: Option<String>,
}

impl Settings {
    pub fn new(additional_tokens: u64) -> Self {
        Self {
            additional_tokens,
            allow_additional_properties: false,
            h_prefix: None,
            h_postfix: None,
            c_prefix: None,
            c_postfix: None,
            external_runtime: None,
        }
    }

    /// Merge layers, highest precedence first.
    pub fn resolve(layers: impl IntoIterator<Item = SettingsLayer>) -> Result<Self> {
        let merged = layers
            .into_iter()
            .fold(SettingsLayer::default(), SettingsLayer::or);
        let Some(additional_tokens) = merged.additional_tokens else {
            return Err(Error::Settings(format!(
                "the additional token number is not configured; pass --additional-tokens \
                 or set {SCHEMA_SETTINGS_KEY}.additionalTokens"
            )));
        };
        let settings = Self {
            additional_tokens,
            allow_additional_properties: merged.allow_additional_properties.unwrap_or(false),
            h_prefix: merged.h_prefix,
            h_postfix: merged.h_postfix,
            c_prefix: merged.c_prefix,
            c_postfix: merged.c_postfix,
            external_runtime: merged.external_runtime,
        };
        if settings.allow_additional_properties && settings.additional_tokens == 0 {
            log::warn!(
                "additional properties are allowed but the additional token number is 0; \
                 documents with unknown keys may exceed the token buffer"
            );
        }
        Ok(settings)
    }

    pub fn for_schema(cli: SettingsLayer, schema: &Value) -> Result<Self> {
        Self::resolve([cli, SettingsLayer::from_schema(schema)?])
    }
}
