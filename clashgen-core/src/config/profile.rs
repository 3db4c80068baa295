//! Validated static tables handed to the pipeline

use super::schema::Config;
use super::validator::ConfigValidator;
use crate::error::{Result, ValidationError};
use crate::group::{GroupSynthesizer, HealthCheck, RegionTable};
use crate::overlay::{BasicOptions, DnsConfig, SnifferConfig, TunConfig};
use crate::rule::{RuleCompiler, RuleEntry};

/// Compiled profile, built once at startup and shared read-only
#[derive(Debug, Clone)]
pub struct Profile {
    pub regions: RegionTable,
    pub synthesizer: GroupSynthesizer,
    pub compiler: RuleCompiler,
    pub custom_rules: Vec<RuleEntry>,
    pub options: BasicOptions,
    pub sniffer: SnifferConfig,
    pub dns: DnsConfig,
    pub tun: TunConfig,
}

impl Profile {
    /// Validate and compile a merged profile
    ///
    /// Any defect in the static tables is fatal here rather than at
    /// transformation time.
    pub fn from_config(config: Config) -> Result<Self> {
        let regions = RegionTable::compile(&config.regions)?;

        ConfigValidator::validate_service_groups(&config.service_groups)?;
        let synthesizer = GroupSynthesizer::new(
            HealthCheck {
                url: config.common.speed_test_url,
                interval: config.common.health_check_interval,
                tolerance: config.common.health_check_tolerance,
            },
            config.service_groups,
        )?;

        let compiler = RuleCompiler::new(&config.rules, config.rule_providers)?;

        let custom_rules = config
            .custom_rules
            .unwrap_or_default()
            .iter()
            .map(|line| {
                line.parse::<RuleEntry>()
                    .map_err(|e| ValidationError::InvalidRule {
                        rule: e.rule,
                        reason: e.reason.to_string(),
                    })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for unused in compiler.unused_providers(&custom_rules) {
            tracing::warn!("Rule provider {} is declared but never referenced", unused);
        }

        let dns = config.dns.unwrap_or_default();
        let tun = config.tun.unwrap_or_default();
        ConfigValidator::validate_listen_port(&dns, &tun)?;

        Ok(Self {
            regions,
            synthesizer,
            compiler,
            custom_rules,
            options: config.options.unwrap_or_default(),
            sniffer: config.sniffer.unwrap_or_default(),
            dns,
            tun,
        })
    }

    /// Compile the built-in profile
    pub fn builtin() -> Result<Self> {
        Self::from_config(super::ConfigLoader::load_builtin())
    }
}
