//! Traffic sniffing settings

use super::Overlay;
use crate::document::Document;
use crate::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ports sniffed for one protocol
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SniffProtocol {
    pub ports: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_destination: Option<bool>,
}

/// The `sniffer` section, replaced wholesale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SnifferConfig {
    pub enable: bool,
    pub force_dns_mapping: bool,
    pub parse_pure_ip: bool,
    /// Off to keep UDP sessions bound to their original destination
    pub override_destination: bool,
    pub sniff: IndexMap<String, SniffProtocol>,
    pub skip_domain: Vec<String>,
    pub skip_dst_address: Vec<String>,
}

impl Default for SnifferConfig {
    fn default() -> Self {
        let ports = |ports: &[&str]| ports.iter().map(|p| p.to_string()).collect::<Vec<_>>();

        let mut sniff = IndexMap::new();
        sniff.insert(
            "HTTP".to_string(),
            SniffProtocol {
                ports: ports(&["80", "443"]),
                override_destination: Some(false),
            },
        );
        sniff.insert(
            "TLS".to_string(),
            SniffProtocol {
                ports: ports(&["443"]),
                override_destination: None,
            },
        );

        Self {
            enable: true,
            force_dns_mapping: true,
            parse_pure_ip: true,
            override_destination: false,
            sniff,
            skip_domain: vec!["+.push.apple.com".to_string()],
            // Telegram data centers
            skip_dst_address: [
                "91.105.192.0/23",
                "91.108.4.0/22",
                "91.108.8.0/21",
                "91.108.16.0/21",
                "91.108.56.0/22",
                "95.161.64.0/20",
                "149.154.160.0/20",
                "185.76.151.0/24",
                "2001:67c:4e8::/48",
                "2001:b28:f23c::/47",
                "2001:b28:f23f::/48",
                "2a0a:f280:203::/48",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Overlay for SnifferConfig {
    fn name(&self) -> &'static str {
        "sniffer"
    }

    fn apply(&self, doc: &mut Document) -> Result<()> {
        doc.replace("sniffer", self)
    }
}
