//! Ordered rule list compilation
//!
//! The decision list is the concatenation of five tiers, in this order:
//! block, custom, proxy-bound domains, direct-bound domains, IP/geo. The
//! terminal `MATCH` entry closes the list. The engine stops at the first
//! matching entry, so the order encodes precedence.

use super::entry::RuleEntry;
use super::provider::RuleProvider;
use crate::config::schema::RuleTiers;
use crate::error::{Error, Result, ValidationError};
use crate::group::{GroupGraph, FINAL};
use indexmap::{IndexMap, IndexSet};

/// Position of an entry in the compiled list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Block,
    Custom,
    ProxyDomain,
    DirectDomain,
    Ip,
    Final,
}

/// Output of a compilation
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRules {
    pub rules: Vec<RuleEntry>,
    pub providers: IndexMap<String, RuleProvider>,
    tiers: Vec<Tier>,
}

impl CompiledRules {
    /// Tier of each entry, parallel to `rules`
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Rule lines in engine format
    pub fn lines(&self) -> Vec<String> {
        self.rules.iter().map(ToString::to_string).collect()
    }
}

/// Static tiers and provider catalog, validated once
#[derive(Debug, Clone)]
pub struct RuleCompiler {
    block: Vec<RuleEntry>,
    proxy_domain: Vec<RuleEntry>,
    direct_domain: Vec<RuleEntry>,
    ip: Vec<RuleEntry>,
    final_target: String,
    providers: IndexMap<String, RuleProvider>,
}

/// Parse one static tier; `MATCH` is reserved for the terminal entry
fn parse_tier(lines: &[String]) -> std::result::Result<Vec<RuleEntry>, ValidationError> {
    lines
        .iter()
        .map(|line| {
            let entry: RuleEntry = line.parse().map_err(|e: super::entry::ParseRuleError| {
                ValidationError::InvalidRule {
                    rule: e.rule,
                    reason: e.reason.to_string(),
                }
            })?;
            if entry.is_final() {
                return Err(ValidationError::InvalidRule {
                    rule: line.clone(),
                    reason: "MATCH is appended automatically".to_string(),
                });
            }
            Ok(entry)
        })
        .collect()
}

impl RuleCompiler {
    /// Parse the static tiers and check every `RULE-SET` reference is declared
    pub fn new(
        tiers: &RuleTiers,
        providers: IndexMap<String, RuleProvider>,
    ) -> std::result::Result<Self, ValidationError> {
        let compiler = Self {
            block: parse_tier(&tiers.block)?,
            proxy_domain: parse_tier(&tiers.proxy_domain)?,
            direct_domain: parse_tier(&tiers.direct_domain)?,
            ip: parse_tier(&tiers.ip)?,
            final_target: tiers
                .final_target
                .clone()
                .unwrap_or_else(|| FINAL.to_string()),
            providers,
        };

        for entry in compiler.static_entries() {
            if let Some(provider) = entry.provider() {
                if !compiler.providers.contains_key(provider) {
                    return Err(ValidationError::UnknownProvider {
                        provider: provider.to_string(),
                    });
                }
            }
        }

        Ok(compiler)
    }

    fn static_entries(&self) -> impl Iterator<Item = &RuleEntry> {
        self.block
            .iter()
            .chain(&self.proxy_domain)
            .chain(&self.direct_domain)
            .chain(&self.ip)
    }

    pub fn providers(&self) -> &IndexMap<String, RuleProvider> {
        &self.providers
    }

    /// Declared providers that no static or custom entry references
    pub fn unused_providers<'a>(&'a self, custom: &'a [RuleEntry]) -> Vec<&'a str> {
        let used: IndexSet<&str> = self
            .static_entries()
            .chain(custom)
            .filter_map(RuleEntry::provider)
            .collect();

        self.providers
            .keys()
            .map(String::as_str)
            .filter(|name| !used.contains(name))
            .collect()
    }

    /// Build the ordered rule list around the custom tier
    ///
    /// Every target must name a synthesized group or a sentinel, and every
    /// `RULE-SET` must name a declared provider. Custom rules are inserted
    /// verbatim in caller order.
    pub fn compile(&self, custom: &[RuleEntry], graph: &GroupGraph<'_>) -> Result<CompiledRules> {
        for entry in custom {
            let reason = if entry.is_final() {
                Some("MATCH is reserved for the terminal entry".to_string())
            } else if !graph.is_target(entry.target()) {
                Some(format!("unknown target group `{}`", entry.target()))
            } else {
                entry
                    .provider()
                    .filter(|p| !self.providers.contains_key(*p))
                    .map(|p| format!("unknown rule provider `{}`", p))
            };

            if let Some(reason) = reason {
                return Err(Error::CustomRule {
                    rule: entry.to_string(),
                    reason,
                });
            }
        }

        for target in self
            .static_entries()
            .map(RuleEntry::target)
            .chain(std::iter::once(self.final_target.as_str()))
        {
            if !graph.is_target(target) {
                return Err(ValidationError::UnknownTarget {
                    target: target.to_string(),
                }
                .into());
            }
        }

        let ordered = [
            (Tier::Block, self.block.as_slice()),
            (Tier::Custom, custom),
            (Tier::ProxyDomain, self.proxy_domain.as_slice()),
            (Tier::DirectDomain, self.direct_domain.as_slice()),
            (Tier::Ip, self.ip.as_slice()),
        ];

        let capacity = ordered.iter().map(|(_, entries)| entries.len()).sum::<usize>() + 1;
        let mut rules = Vec::with_capacity(capacity);
        let mut tiers = Vec::with_capacity(capacity);

        for (tier, entries) in ordered {
            rules.extend(entries.iter().cloned());
            tiers.extend(std::iter::repeat(tier).take(entries.len()));
        }
        rules.push(RuleEntry::final_to(self.final_target.clone()));
        tiers.push(Tier::Final);

        Ok(CompiledRules {
            rules,
            providers: self.providers.clone(),
            tiers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Endpoint;
    use crate::group::{GroupKind, PolicyGroup};

    fn strings(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    fn provider(name: &str) -> RuleProvider {
        RuleProvider {
            kind: Default::default(),
            behavior: Default::default(),
            format: Default::default(),
            url: format!("https://example.com/{}.yaml", name),
            path: format!("./ruleset/{}.yaml", name),
            interval: 0,
        }
    }

    fn compiler() -> RuleCompiler {
        let tiers = RuleTiers {
            block: strings(&["RULE-SET,Advertising,广告拦截"]),
            proxy_domain: strings(&["RULE-SET,AI_no_ip,AI", "RULE-SET,Global_no_ip,代理模式"]),
            direct_domain: strings(&["RULE-SET,Lan_no_ip,DIRECT"]),
            ip: strings(&["RULE-SET,Lan_ip,DIRECT", "GEOIP,CN,DIRECT"]),
            final_target: Some("漏网之鱼".to_string()),
        };
        let providers = ["Advertising", "AI_no_ip", "Global_no_ip", "Lan_no_ip", "Lan_ip", "Spare"]
            .iter()
            .map(|name| (name.to_string(), provider(name)))
            .collect();
        RuleCompiler::new(&tiers, providers).unwrap()
    }

    fn groups() -> Vec<PolicyGroup> {
        ["代理模式", "AI", "广告拦截", "漏网之鱼"]
            .iter()
            .map(|name| PolicyGroup::new(*name, GroupKind::Select, vec!["DIRECT".to_string()]))
            .collect()
    }

    fn custom(lines: &[&str]) -> Vec<RuleEntry> {
        lines.iter().map(|l| l.parse().unwrap()).collect()
    }

    #[test]
    fn test_tier_order() {
        let groups = groups();
        let endpoints: Vec<Endpoint> = vec![];
        let graph = GroupGraph::new(&groups, &endpoints).unwrap();

        let compiled = compiler()
            .compile(&custom(&["DOMAIN-SUFFIX,example.com,代理模式"]), &graph)
            .unwrap();

        assert_eq!(
            compiled.lines(),
            vec![
                "RULE-SET,Advertising,广告拦截",
                "DOMAIN-SUFFIX,example.com,代理模式",
                "RULE-SET,AI_no_ip,AI",
                "RULE-SET,Global_no_ip,代理模式",
                "RULE-SET,Lan_no_ip,DIRECT",
                "RULE-SET,Lan_ip,DIRECT",
                "GEOIP,CN,DIRECT",
                "MATCH,漏网之鱼",
            ]
        );

        let tiers = compiled.tiers();
        assert!(tiers.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(tiers[1], Tier::Custom);
        assert_eq!(tiers.last(), Some(&Tier::Final));
        assert_eq!(compiled.rules.iter().filter(|r| r.is_final()).count(), 1);
    }

    #[test]
    fn test_custom_order_preserved() {
        let groups = groups();
        let graph = GroupGraph::new(&groups, &[]).unwrap();
        let lines = [
            "DOMAIN-KEYWORD,upai,代理模式",
            "DOMAIN-SUFFIX,jianguoyun.com,DIRECT",
            "RULE-SET,Spare,AI",
        ];
        let compiled = compiler().compile(&custom(&lines), &graph).unwrap();
        assert_eq!(&compiled.lines()[1..4], &lines);
    }

    #[test]
    fn test_custom_padded_fields_accepted() {
        let groups = groups();
        let graph = GroupGraph::new(&groups, &[]).unwrap();
        let lines = ["DOMAIN-SUFFIX,example.com, DIRECT", "RULE-SET, Spare ,AI "];
        let compiled = compiler().compile(&custom(&lines), &graph).unwrap();

        // Emitted verbatim
        assert_eq!(&compiled.lines()[1..3], &lines);
        assert!(compiler().unused_providers(&custom(&lines)).is_empty());
    }

    #[test]
    fn test_custom_unknown_target_rejected() {
        let groups = groups();
        let graph = GroupGraph::new(&groups, &[]).unwrap();
        let result = compiler().compile(&custom(&["DOMAIN,a.com,NoSuchGroup"]), &graph);
        assert!(matches!(result, Err(Error::CustomRule { .. })));
    }

    #[test]
    fn test_custom_unknown_provider_rejected() {
        let groups = groups();
        let graph = GroupGraph::new(&groups, &[]).unwrap();
        let result = compiler().compile(&custom(&["RULE-SET,Nope,DIRECT"]), &graph);
        assert!(matches!(result, Err(Error::CustomRule { .. })));
    }

    #[test]
    fn test_custom_match_rejected() {
        let groups = groups();
        let graph = GroupGraph::new(&groups, &[]).unwrap();
        let result = compiler().compile(&custom(&["MATCH,DIRECT"]), &graph);
        assert!(matches!(result, Err(Error::CustomRule { .. })));
    }

    #[test]
    fn test_static_target_missing_from_groups() {
        let groups: Vec<PolicyGroup> = groups().into_iter().filter(|g| g.name != "AI").collect();
        let graph = GroupGraph::new(&groups, &[]).unwrap();
        let result = compiler().compile(&[], &graph);
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::UnknownTarget { .. }))
        ));
    }

    #[test]
    fn test_undeclared_static_provider() {
        let tiers = RuleTiers {
            block: strings(&["RULE-SET,Missing,REJECT"]),
            final_target: Some("DIRECT".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            RuleCompiler::new(&tiers, IndexMap::new()),
            Err(ValidationError::UnknownProvider { .. })
        ));
    }

    #[test]
    fn test_static_match_rejected() {
        let tiers = RuleTiers {
            ip: strings(&["MATCH,DIRECT"]),
            final_target: Some("DIRECT".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            RuleCompiler::new(&tiers, IndexMap::new()),
            Err(ValidationError::InvalidRule { .. })
        ));
    }

    #[test]
    fn test_unused_providers() {
        let compiler = compiler();
        assert_eq!(compiler.unused_providers(&[]), vec!["Spare"]);
        assert!(compiler
            .unused_providers(&custom(&["RULE-SET,Spare,DIRECT"]))
            .is_empty());
    }
}
