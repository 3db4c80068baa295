//! The five-stage document transformation

use crate::config::Profile;
use crate::document::Document;
use crate::error::Result;
use crate::group::GroupGraph;
use crate::overlay::Overlay;

pub const PROXY_GROUPS_KEY: &str = "proxy-groups";
pub const RULES_KEY: &str = "rules";
pub const RULE_PROVIDERS_KEY: &str = "rule-providers";

/// Summary of one transformation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub endpoints: usize,
    /// (region code, member count) for every non-empty bucket
    pub buckets: Vec<(String, usize)>,
    pub groups: usize,
    pub rules: usize,
    pub providers: usize,
}

/// Applies a profile to documents
///
/// Holds no state of its own; runs are independent and repeatable.
pub struct Pipeline<'p> {
    profile: &'p Profile,
}

impl<'p> Pipeline<'p> {
    pub fn new(profile: &'p Profile) -> Self {
        Self { profile }
    }

    /// Transform a document in place
    ///
    /// Stages run against a staged copy; the caller's document is replaced
    /// only when every stage succeeded.
    pub fn run(&self, doc: &mut Document) -> Result<Report> {
        let mut staged = doc.clone();
        let report = self.run_stages(&mut staged)?;
        *doc = staged;
        Ok(report)
    }

    fn run_stages(&self, doc: &mut Document) -> Result<Report> {
        let profile = self.profile;

        self.overlay(&profile.options, doc)?;
        self.overlay(&profile.sniffer, doc)?;

        // Group synthesis
        let endpoints = doc.endpoints()?;
        let buckets = profile.regions.partition(&endpoints);
        let groups = profile.synthesizer.synthesize_buckets(&buckets, &endpoints);

        let graph = GroupGraph::new(&groups, &endpoints)?;
        graph.validate()?;
        doc.replace(PROXY_GROUPS_KEY, &groups)?;
        tracing::debug!("Synthesized {} proxy groups", groups.len());

        // Rule compilation
        let compiled = profile.compiler.compile(&profile.custom_rules, &graph)?;
        doc.replace(RULES_KEY, &compiled.lines())?;
        doc.replace(RULE_PROVIDERS_KEY, &compiled.providers)?;
        tracing::debug!("Compiled {} rules", compiled.rules.len());

        self.overlay(&profile.dns, doc)?;
        self.overlay(&profile.tun, doc)?;

        let report = Report {
            endpoints: endpoints.len(),
            buckets: buckets
                .iter()
                .map(|b| (b.region.code.clone(), b.members.len()))
                .collect(),
            groups: groups.len(),
            rules: compiled.rules.len(),
            providers: compiled.providers.len(),
        };

        tracing::info!(
            "Generated {} proxy groups, {} rules, {} rule providers from {} proxies",
            report.groups,
            report.rules,
            report.providers,
            report.endpoints
        );

        Ok(report)
    }

    fn overlay(&self, overlay: &dyn Overlay, doc: &mut Document) -> Result<()> {
        overlay.apply(doc)?;
        tracing::debug!("Applied {} overlay", overlay.name());
        Ok(())
    }
}
