//! Policy group synthesis
//!
//! Endpoints are partitioned into region buckets, and a layered set of
//! selection groups is built on top of them. Groups reference endpoints,
//! other groups, or one of the engine's built-in [`SENTINELS`].

pub mod graph;
pub mod region;
pub mod synth;

pub use graph::GroupGraph;
pub use region::{Bucket, Region, RegionTable};
pub use synth::{GroupSynthesizer, HealthCheck};

use serde::Serialize;

/// Primary user-facing selector
pub const PRIMARY: &str = "代理模式";
pub const LATENCY: &str = "延迟优选";
pub const FAILOVER: &str = "故障转移";
pub const HASH_BALANCE: &str = "负载均衡 (散列)";
pub const ROUND_ROBIN: &str = "负载均衡 (轮询)";
/// Target of the block tier
pub const AD_BLOCK: &str = "广告拦截";
/// Target of the terminal rule
pub const FINAL: &str = "漏网之鱼";

/// Suffix tag of a region's automatic group
pub const AUTO_TAG: &str = "自动选择";
/// Suffix tag of a region's manual group
pub const MANUAL_TAG: &str = "手动选择";

pub const DIRECT: &str = "DIRECT";
pub const REJECT: &str = "REJECT";

/// Policies built into the engine that need no declaration
pub const SENTINELS: &[&str] = &[DIRECT, REJECT, "REJECT-DROP", "PASS"];

/// Names of the groups emitted regardless of the endpoint set
pub const FIXED_GROUPS: &[&str] = &[
    PRIMARY,
    LATENCY,
    FAILOVER,
    HASH_BALANCE,
    ROUND_ROBIN,
    AD_BLOCK,
    FINAL,
];

pub fn is_sentinel(name: &str) -> bool {
    SENTINELS.contains(&name)
}

/// Selection strategy of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupKind {
    /// Manual choice
    Select,
    /// Lowest measured latency
    UrlTest,
    /// First healthy member in order
    Fallback,
    LoadBalance,
}

/// Distribution used by a load-balance group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BalanceStrategy {
    ConsistentHashing,
    RoundRobin,
}

/// A named selection over endpoints and other groups
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolicyGroup {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: GroupKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<BalanceStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_filter: Option<String>,
    pub proxies: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl PolicyGroup {
    pub fn new(name: impl Into<String>, kind: GroupKind, proxies: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            strategy: None,
            url: None,
            interval: None,
            tolerance: None,
            exclude_filter: None,
            proxies,
            hidden: false,
            icon: None,
        }
    }

    pub fn load_balance(
        name: impl Into<String>,
        strategy: BalanceStrategy,
        proxies: Vec<String>,
    ) -> Self {
        Self {
            strategy: Some(strategy),
            ..Self::new(name, GroupKind::LoadBalance, proxies)
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_health_check(mut self, check: &HealthCheck) -> Self {
        self.url = Some(check.url.clone());
        self.interval = Some(check.interval);
        self.tolerance = Some(check.tolerance);
        self
    }

    pub fn with_exclude_filter(mut self, filter: impl Into<String>) -> Self {
        self.exclude_filter = Some(filter.into());
        self
    }

    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.icon = icon;
        self
    }

    /// Hide from direct user selection
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}
