//! Error types for profile loading and document transformation

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to load profile from {path}: {source}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse profile: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to parse document: {0}")]
    DocumentParse(#[source] serde_yaml::Error),

    #[error("Failed to serialize document: {0}")]
    DocumentSerialize(#[source] serde_yaml::Error),

    #[error("Document root is not a mapping")]
    DocumentNotMapping,

    #[error("`proxies` is present but is not a sequence")]
    ProxiesNotSequence,

    #[error("Proxy entry #{index} has no string `name`")]
    ProxyMissingName { index: usize },

    #[error("Duplicate proxy name: {name}")]
    DuplicateProxy { name: String },

    #[error("Invalid custom rule `{rule}`: {reason}")]
    CustomRule { rule: String, reason: String },

    #[error("Failed to build `{key}` fragment: {source}")]
    Fragment {
        key: &'static str,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Cycle detected in group references: {path}")]
    CycleDetected { path: String },

    #[error("Unknown member reference: {member}")]
    UnknownMember { member: String },

    #[error("Duplicate group name: {group}")]
    DuplicateGroup { group: String },

    #[error("Group name shadows a proxy: {group}")]
    GroupShadowsProxy { group: String },

    #[error("Duplicate region: {region}")]
    DuplicateRegion { region: String },

    #[error("Invalid region pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Catch-all region: {reason}")]
    CatchAll { reason: String },

    #[error("Invalid rule `{rule}`: {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("Unknown rule provider: {provider}")]
    UnknownProvider { provider: String },

    #[error("Unknown rule target: {target}")]
    UnknownTarget { target: String },

    #[error("DNS hijack `{hijack}` does not target listen port {port}")]
    HijackPortMismatch { hijack: String, port: u16 },

    #[error("Invalid DNS listen address: {listen}")]
    InvalidListen { listen: String },
}
