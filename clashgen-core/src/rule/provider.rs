//! Rule provider declarations
//!
//! Providers are only declared here; fetching and caching them is the
//! engine's job.

use serde::{Deserialize, Serialize};

/// Where the engine obtains the provider content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Http,
    File,
}

/// Shape of the provider content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    /// Domain suffix list
    Domain,
    /// IP CIDR list
    Ipcidr,
    /// Full rule lines
    #[default]
    Classical,
}

/// Serialization of the provider content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Yaml,
    Text,
    Mrs,
}

/// An externally hosted, independently refreshed rule bundle
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuleProvider {
    #[serde(rename = "type", default)]
    pub kind: ProviderKind,
    #[serde(default)]
    pub behavior: Behavior,
    #[serde(default)]
    pub format: Format,
    pub url: String,
    /// Local cache path
    pub path: String,
    /// Refresh interval in seconds; 0 fetches once and never refreshes
    #[serde(default)]
    pub interval: u64,
}
