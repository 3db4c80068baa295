//! Profile schema types

use crate::overlay::{BasicOptions, DnsConfig, SnifferConfig, TunConfig};
use crate::rule::RuleProvider;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Complete profile: static tables and overlay fragments
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Rules inserted between the block tier and the proxy tier
    #[serde(default)]
    pub custom_rules: Option<Vec<String>>,
    #[serde(default)]
    pub common: CommonConfig,
    /// Region descriptors in evaluation order
    #[serde(default)]
    pub regions: Vec<RegionDescriptor>,
    #[serde(default)]
    pub service_groups: Vec<ServiceGroup>,
    #[serde(default)]
    pub rule_providers: IndexMap<String, RuleProvider>,
    #[serde(default)]
    pub rules: RuleTiers,
    pub options: Option<BasicOptions>,
    pub sniffer: Option<SnifferConfig>,
    pub dns: Option<DnsConfig>,
    pub tun: Option<TunConfig>,
}

/// Settings shared by the synthesized groups
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CommonConfig {
    /// Connectivity probe URL for health-checked groups
    #[serde(default = "default_speed_test_url")]
    pub speed_test_url: String,
    #[serde(default = "default_health_check_interval")]
    pub health_check_interval: u32,
    #[serde(default = "default_health_check_tolerance")]
    pub health_check_tolerance: u32,
}

fn default_speed_test_url() -> String {
    "http://www.gstatic.com/generate_204".to_string()
}

fn default_health_check_interval() -> u32 {
    300
}

fn default_health_check_tolerance() -> u32 {
    50
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            speed_test_url: default_speed_test_url(),
            health_check_interval: default_health_check_interval(),
            health_check_tolerance: default_health_check_tolerance(),
        }
    }
}

/// A named classification of proxies by display name
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegionDescriptor {
    /// Stable identifier, unique across the table
    pub code: String,
    /// Display label; also the prefix of the region's group names
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
    /// Case-insensitive regular expression; absent for the catch-all
    #[serde(default)]
    pub pattern: Option<String>,
}

/// A service-category selector
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceGroup {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// The four fixed rule tiers around the custom tier
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuleTiers {
    /// Ad, tracking and privacy block lists
    #[serde(default)]
    pub block: Vec<String>,
    #[serde(default)]
    pub proxy_domain: Vec<String>,
    #[serde(default)]
    pub direct_domain: Vec<String>,
    /// IP-block and geo rules, after every domain rule
    #[serde(default)]
    pub ip: Vec<String>,
    /// Target of the terminal `MATCH` entry
    #[serde(default)]
    pub final_target: Option<String>,
}
