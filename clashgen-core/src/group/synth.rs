//! Builds the policy group list from region buckets

use super::region::{Bucket, RegionTable};
use super::{
    BalanceStrategy, GroupKind, PolicyGroup, AD_BLOCK, AUTO_TAG, DIRECT, FAILOVER, FINAL,
    HASH_BALANCE, LATENCY, MANUAL_TAG, PRIMARY, REJECT, ROUND_ROBIN,
};
use crate::config::schema::ServiceGroup;
use crate::document::Endpoint;
use crate::error::ValidationError;
use regex::Regex;

const ICON_BASE: &str =
    "https://fastly.jsdelivr.net/gh/clash-verge-rev/clash-verge-rev.github.io@main/docs/assets/icons/";

fn icon(file: &str) -> Option<String> {
    Some(format!("{}{}", ICON_BASE, file))
}

/// Probe settings for groups the engine health-checks
#[derive(Debug, Clone, PartialEq)]
pub struct HealthCheck {
    pub url: String,
    /// Seconds between probes
    pub interval: u32,
    /// Latency difference in ms below which the current member is kept
    pub tolerance: u32,
}

/// Pure function from (regions, endpoints) to the group list
#[derive(Debug, Clone)]
pub struct GroupSynthesizer {
    check: HealthCheck,
    services: Vec<ServiceGroup>,
    exclude_filter: String,
    exclude: Regex,
}

impl GroupSynthesizer {
    pub fn new(check: HealthCheck, services: Vec<ServiceGroup>) -> Result<Self, ValidationError> {
        // Keeps the synthesized region selectors out of the functional groups
        let exclude_filter = format!("{}|{}", regex::escape(AUTO_TAG), regex::escape(MANUAL_TAG));
        let exclude = Regex::new(&exclude_filter).map_err(|e| ValidationError::InvalidPattern {
            pattern: exclude_filter.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            check,
            services,
            exclude_filter,
            exclude,
        })
    }

    /// Synthesize every policy group
    ///
    /// Order: primary selector, the four functional groups, the service
    /// catalog, the ad-block and final groups, then each non-empty region's
    /// automatic group followed by each region's manual group.
    pub fn synthesize(&self, regions: &RegionTable, endpoints: &[Endpoint]) -> Vec<PolicyGroup> {
        let buckets = regions.partition(endpoints);
        self.synthesize_buckets(&buckets, endpoints)
    }

    pub fn synthesize_buckets(
        &self,
        buckets: &[Bucket<'_>],
        endpoints: &[Endpoint],
    ) -> Vec<PolicyGroup> {
        let region_selectors: Vec<String> = buckets
            .iter()
            .flat_map(|b| [b.region.auto_group(), b.region.manual_group()])
            .collect();

        let pool: Vec<String> = endpoints
            .iter()
            .map(|e| e.name.clone())
            .filter(|name| !self.exclude.is_match(name))
            .collect();

        let mut groups = Vec::with_capacity(7 + self.services.len() + buckets.len() * 2);

        let mut primary = vec![
            LATENCY.to_string(),
            FAILOVER.to_string(),
            HASH_BALANCE.to_string(),
            ROUND_ROBIN.to_string(),
        ];
        primary.extend(region_selectors.iter().cloned());
        groups.push(
            PolicyGroup::new(PRIMARY, GroupKind::Select, primary)
                .with_url(self.check.url.clone())
                .with_icon(icon("adjust.svg")),
        );

        groups.push(self.functional(
            PolicyGroup::new(LATENCY, GroupKind::UrlTest, pool.clone()),
            "speed.svg",
        ));
        groups.push(self.functional(
            PolicyGroup::new(FAILOVER, GroupKind::Fallback, pool.clone()),
            "ambulance.svg",
        ));
        groups.push(self.functional(
            PolicyGroup::load_balance(
                HASH_BALANCE,
                BalanceStrategy::ConsistentHashing,
                pool.clone(),
            ),
            "balance.svg",
        ));
        groups.push(self.functional(
            PolicyGroup::load_balance(ROUND_ROBIN, BalanceStrategy::RoundRobin, pool),
            "merry_go.svg",
        ));

        for service in &self.services {
            let mut members = vec![PRIMARY.to_string(), DIRECT.to_string()];
            members.extend(region_selectors.iter().cloned());
            groups.push(
                PolicyGroup::new(service.name.clone(), GroupKind::Select, members)
                    .with_icon(service.icon.clone()),
            );
        }

        groups.push(
            PolicyGroup::new(
                AD_BLOCK,
                GroupKind::Select,
                vec![REJECT.to_string(), DIRECT.to_string(), PRIMARY.to_string()],
            )
            .with_icon(icon("bug.svg")),
        );
        groups.push(
            PolicyGroup::new(
                FINAL,
                GroupKind::Select,
                vec![PRIMARY.to_string(), DIRECT.to_string()],
            )
            .with_icon(icon("fish.svg")),
        );

        for bucket in buckets {
            groups.push(
                PolicyGroup::new(
                    bucket.region.auto_group(),
                    GroupKind::Fallback,
                    bucket.members.clone(),
                )
                    .with_health_check(&self.check)
                    .hidden(),
            );
        }
        for bucket in buckets {
            groups.push(
                PolicyGroup::new(
                    bucket.region.manual_group(),
                    GroupKind::Select,
                    bucket.members.clone(),
                )
                    .with_icon(bucket.region.icon.clone()),
            );
        }

        groups
    }

    fn functional(&self, group: PolicyGroup, icon_file: &str) -> PolicyGroup {
        group
            .with_exclude_filter(self.exclude_filter.clone())
            .with_icon(icon(icon_file))
            .hidden()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RegionDescriptor;

    fn regions() -> RegionTable {
        let descriptor = |code: &str, label: &str, pattern: Option<&str>| RegionDescriptor {
            code: code.to_string(),
            label: label.to_string(),
            icon: Some(format!("{}.svg", code.to_lowercase())),
            pattern: pattern.map(str::to_string),
        };
        RegionTable::compile(&[
            descriptor("HK", "🇭🇰 香港", Some("(香港|HK|Hong Kong|🇭🇰)")),
            descriptor("TW", "🇹🇼 台湾", Some("(台湾|TW|Taiwan|🇹🇼)")),
            descriptor("US", "🇺🇸 美国", Some("(美国|US|USA|United States|America|🇺🇸)")),
            descriptor("OTHER", "其他", None),
        ])
        .unwrap()
    }

    fn synthesizer() -> GroupSynthesizer {
        GroupSynthesizer::new(
            HealthCheck {
                url: "http://www.gstatic.com/generate_204".to_string(),
                interval: 300,
                tolerance: 50,
            },
            vec![
                ServiceGroup {
                    name: "AI".to_string(),
                    icon: None,
                },
                ServiceGroup {
                    name: "流媒体".to_string(),
                    icon: None,
                },
            ],
        )
        .unwrap()
    }

    fn endpoints(names: &[&str]) -> Vec<Endpoint> {
        names
            .iter()
            .map(|name| Endpoint {
                name: name.to_string(),
                kind: Some("ss".to_string()),
                server: None,
            })
            .collect()
    }

    fn find<'a>(groups: &'a [PolicyGroup], name: &str) -> &'a PolicyGroup {
        groups.iter().find(|g| g.name == name).unwrap()
    }

    #[test]
    fn test_region_pairs_for_present_regions() {
        let endpoints = endpoints(&["HK-01", "US-01", "Random-X"]);
        let groups = synthesizer().synthesize(&regions(), &endpoints);

        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(
            &names[names.len() - 6..],
            &[
                "🇭🇰 香港 - 自动选择",
                "🇺🇸 美国 - 自动选择",
                "其他 - 自动选择",
                "🇭🇰 香港 - 手动选择",
                "🇺🇸 美国 - 手动选择",
                "其他 - 手动选择",
            ]
        );
        // No TW endpoints, no TW groups
        assert!(!names.iter().any(|n| n.contains("台湾")));
        assert_eq!(groups.len(), 7 + 2 + 6);
    }

    #[test]
    fn test_region_group_shape() {
        let groups = synthesizer().synthesize(&regions(), &endpoints(&["HK-01", "HK-02"]));

        let auto = find(&groups, "🇭🇰 香港 - 自动选择");
        assert_eq!(auto.kind, GroupKind::Fallback);
        assert!(auto.hidden);
        assert_eq!(auto.interval, Some(300));
        assert_eq!(auto.tolerance, Some(50));
        assert_eq!(auto.proxies, vec!["HK-01", "HK-02"]);

        let manual = find(&groups, "🇭🇰 香港 - 手动选择");
        assert_eq!(manual.kind, GroupKind::Select);
        assert!(!manual.hidden);
        assert_eq!(manual.icon.as_deref(), Some("hk.svg"));
        assert_eq!(manual.proxies, auto.proxies);
    }

    #[test]
    fn test_primary_and_service_members() {
        let groups = synthesizer().synthesize(&regions(), &endpoints(&["TW 1", "x"]));

        let primary = find(&groups, PRIMARY);
        assert_eq!(groups[0].name, PRIMARY);
        assert_eq!(
            primary.proxies,
            vec![
                LATENCY,
                FAILOVER,
                HASH_BALANCE,
                ROUND_ROBIN,
                "🇹🇼 台湾 - 自动选择",
                "🇹🇼 台湾 - 手动选择",
                "其他 - 自动选择",
                "其他 - 手动选择",
            ]
        );

        let ai = find(&groups, "AI");
        assert_eq!(&ai.proxies[..2], &[PRIMARY, DIRECT]);
        assert_eq!(&ai.proxies[2..], &primary.proxies[4..]);
    }

    #[test]
    fn test_functional_groups_exclude_selectors() {
        let groups = synthesizer().synthesize(
            &regions(),
            &endpoints(&["HK-01", "odd 自动选择 node", "US-01"]),
        );

        for name in [LATENCY, FAILOVER, HASH_BALANCE, ROUND_ROBIN] {
            let group = find(&groups, name);
            assert!(group.hidden);
            assert_eq!(group.exclude_filter.as_deref(), Some("自动选择|手动选择"));
            assert_eq!(group.proxies, vec!["HK-01", "US-01"]);
        }
        assert_eq!(
            find(&groups, ROUND_ROBIN).strategy,
            Some(BalanceStrategy::RoundRobin)
        );
    }

    #[test]
    fn test_empty_endpoints_keeps_fixed_groups() {
        let groups = synthesizer().synthesize(&regions(), &[]);

        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                PRIMARY,
                LATENCY,
                FAILOVER,
                HASH_BALANCE,
                ROUND_ROBIN,
                "AI",
                "流媒体",
                AD_BLOCK,
                FINAL
            ]
        );
        assert_eq!(find(&groups, PRIMARY).proxies.len(), 4);
        assert!(find(&groups, LATENCY).proxies.is_empty());
        assert_eq!(find(&groups, FINAL).proxies, vec![PRIMARY, DIRECT]);
    }

    #[test]
    fn test_synthesis_is_repeatable() {
        let synth = synthesizer();
        let regions = regions();
        let input = endpoints(&["US 2", "HK 1", "Other", "US 1"]);
        assert_eq!(synth.synthesize(&regions, &input), synth.synthesize(&regions, &input));
    }
}
