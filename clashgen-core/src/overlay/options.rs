//! Top-level runtime options

use super::Overlay;
use crate::document::Document;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Rule evaluation mode of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Rule,
    Global,
    Direct,
}

/// Persisted selection state
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct StoreOptions {
    pub store_selected: bool,
    pub store_fake_ip: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            store_selected: true,
            store_fake_ip: true,
        }
    }
}

/// Scalar options merged key-by-key into the document root
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct BasicOptions {
    /// Combined HTTP/SOCKS5 listening port
    pub mixed_port: u16,
    pub allow_lan: bool,
    pub unified_delay: bool,
    pub tcp_concurrent: bool,
    pub geodata_mode: bool,
    pub mode: RunMode,
    /// Off so fake-ip answers stay IPv4-only
    pub ipv6: bool,
    pub profile: StoreOptions,
    pub global_client_fingerprint: String,
    pub fakeip_process_mode: String,
    pub lan_allowed_ips: Vec<String>,
    pub skip_auth_prefixes: Vec<String>,
}

impl Default for BasicOptions {
    fn default() -> Self {
        Self {
            mixed_port: 7890,
            allow_lan: true,
            unified_delay: true,
            tcp_concurrent: true,
            geodata_mode: true,
            mode: RunMode::Rule,
            ipv6: false,
            profile: StoreOptions::default(),
            global_client_fingerprint: "chrome".to_string(),
            fakeip_process_mode: "strict".to_string(),
            lan_allowed_ips: vec!["0.0.0.0/0".to_string(), "::/0".to_string()],
            skip_auth_prefixes: vec!["127.0.0.1/32".to_string()],
        }
    }
}

impl Overlay for BasicOptions {
    fn name(&self) -> &'static str {
        "options"
    }

    fn apply(&self, doc: &mut Document) -> Result<()> {
        doc.merge_root(self.name(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    #[test]
    fn test_options_overwrite_existing_keys() {
        let mut doc = Document::from_yaml_str(
            "mixed-port: 1080\nmode: global\nlog-level: info\n",
        )
        .unwrap();

        BasicOptions::default().apply(&mut doc).unwrap();

        assert_eq!(doc.get("mixed-port").and_then(Value::as_u64), Some(7890));
        assert_eq!(doc.get("mode").and_then(Value::as_str), Some("rule"));
        assert_eq!(doc.get("log-level").and_then(Value::as_str), Some("info"));
        assert_eq!(
            doc.get("global-client-fingerprint").and_then(Value::as_str),
            Some("chrome")
        );
        let profile = doc.get("profile").and_then(Value::as_mapping).unwrap();
        assert_eq!(profile.get("store-fake-ip").and_then(Value::as_bool), Some(true));
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let options: BasicOptions =
            toml::from_str("mixed-port = 7891\nallow-lan = false\n").unwrap();
        assert_eq!(options.mixed_port, 7891);
        assert!(!options.allow_lan);
        assert_eq!(options.skip_auth_prefixes, vec!["127.0.0.1/32"]);
    }
}
