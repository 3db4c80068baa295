//! Virtual interface interception settings

use super::Overlay;
use crate::document::Document;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Network stack backing the TUN device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TunStack {
    System,
    Gvisor,
    Mixed,
}

/// The `tun` section, replaced wholesale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct TunConfig {
    pub enable: bool,
    pub stack: TunStack,
    pub device: String,
    /// Redirect targets; each must point at the DNS listen port
    pub dns_hijack: Vec<String>,
    pub auto_route: bool,
    pub auto_detect_interface: bool,
    pub strict_route: bool,
}

impl Default for TunConfig {
    fn default() -> Self {
        Self {
            enable: true,
            stack: TunStack::Mixed,
            device: "Mihomo".to_string(),
            dns_hijack: vec!["0.0.0.0:1053".to_string(), "::/0:1053".to_string()],
            auto_route: true,
            auto_detect_interface: true,
            strict_route: false,
        }
    }
}

/// Port suffix of a hijack target such as `::/0:1053`
pub(crate) fn hijack_port(target: &str) -> Option<u16> {
    let (_, port) = target.rsplit_once(':')?;
    port.parse().ok()
}

impl Overlay for TunConfig {
    fn name(&self) -> &'static str {
        "tun"
    }

    fn apply(&self, doc: &mut Document) -> Result<()> {
        doc.replace("tun", self)
    }
}
