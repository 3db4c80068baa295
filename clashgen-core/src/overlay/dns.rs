//! Name resolution settings

use super::Overlay;
use crate::document::Document;
use crate::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How the engine answers DNS queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnhancedMode {
    FakeIp,
    RedirHost,
    Normal,
}

/// The `dns` section, replaced wholesale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct DnsConfig {
    pub enable: bool,
    /// Must share its port with the TUN `dns-hijack` targets
    pub listen: String,
    pub ipv6: bool,
    pub prefer_h3: bool,
    pub respect_rules: bool,
    pub use_system_hosts: bool,
    pub cache_algorithm: String,
    pub enhanced_mode: EnhancedMode,
    pub fake_ip_range: String,
    /// Domains answered with real addresses instead of fake ones
    pub fake_ip_filter: Vec<String>,
    pub default_nameserver: Vec<String>,
    pub nameserver: Vec<String>,
    /// Resolvers for the server addresses of the proxies themselves
    pub proxy_server_nameserver: Vec<String>,
    pub nameserver_policy: IndexMap<String, Vec<String>>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for DnsConfig {
    fn default() -> Self {
        let domestic = strings(&["https://223.5.5.5/dns-query", "https://doh.pub/dns-query"]);
        let foreign = strings(&["https://dns.google/dns-query"]);

        let mut nameserver_policy = IndexMap::new();
        nameserver_policy.insert("geosite:private,cn".to_string(), domestic.clone());

        Self {
            enable: true,
            listen: "0.0.0.0:1053".to_string(),
            ipv6: false,
            prefer_h3: false,
            respect_rules: true,
            use_system_hosts: false,
            cache_algorithm: "arc".to_string(),
            enhanced_mode: EnhancedMode::FakeIp,
            fake_ip_range: "198.18.0.1/16".to_string(),
            fake_ip_filter: strings(&[
                "+.lan",
                "+.local",
                "+.msftconnecttest.com",
                "+.msftncsi.com",
                "localhost.ptlogin2.qq.com",
                "localhost.sec.qq.com",
                "+.in-addr.arpa",
                "+.ip6.arpa",
                "time.*.com",
                "time.*.gov",
                "pool.ntp.org",
                "localhost.work.weixin.qq.com",
            ]),
            default_nameserver: strings(&["1.1.1.1", "8.8.8.8"]),
            nameserver: foreign.clone(),
            proxy_server_nameserver: domestic.into_iter().chain(foreign).collect(),
            nameserver_policy,
        }
    }
}

impl DnsConfig {
    /// Port of the `listen` address, taken from its last `:` field
    pub fn listen_port(&self) -> Option<u16> {
        let (_, port) = self.listen.rsplit_once(':')?;
        port.parse().ok()
    }
}

impl Overlay for DnsConfig {
    fn name(&self) -> &'static str {
        "dns"
    }

    fn apply(&self, doc: &mut Document) -> Result<()> {
        doc.replace("dns", self)
    }
}
