use serde::Deserialize;

use crate::error::{Error, Result};

/// Root configuration: parsed from TOML.
///
/// ```toml
/// [convert]
/// enum_ignore_case = false
///
/// [pairs]
/// separator = ","
/// key_value_separator = ":"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldmapConfig {
    /// Coercion policy of the map → record direction.
    #[serde(default)]
    pub convert: ConvertOptions,

    /// Separators for `key=value` text.
    #[serde(default)]
    pub pairs: PairOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConvertOptions {
    /// Match enum variant names ignoring ASCII case.
    #[serde(default = "default_enum_ignore_case")]
    pub enum_ignore_case: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            enum_ignore_case: default_enum_ignore_case(),
        }
    }
}

fn default_enum_ignore_case() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PairOptions {
    #[serde(default = "default_separator")]
    pub separator: char,
    #[serde(default = "default_key_value_separator")]
    pub key_value_separator: char,
}

impl Default for PairOptions {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            key_value_separator: default_key_value_separator(),
        }
    }
}

fn default_separator() -> char {
    ';'
}

fn default_key_value_separator() -> char {
    '='
}

impl FieldmapConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::invalid_argument(format!("{path}: {e}")))?;
        Self::parse(&content).map_err(|e| e.with_context(path))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::invalid_argument(e.to_string()))
    }
}
