//! Region classification of endpoint names
//!
//! Regions are tried in declared order and the first pattern that matches a
//! name claims it. Names no pattern matches fall into the catch-all region,
//! which is always evaluated last.

use crate::config::schema::RegionDescriptor;
use crate::document::Endpoint;
use crate::error::ValidationError;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// A compiled region descriptor
#[derive(Debug, Clone)]
pub struct Region {
    pub code: String,
    pub label: String,
    pub icon: Option<String>,
    matcher: Option<Regex>,
}

impl Region {
    /// Check whether a display name belongs to this region
    ///
    /// The catch-all region matches nothing by pattern.
    pub fn matches(&self, name: &str) -> bool {
        self.matcher.as_ref().is_some_and(|re| re.is_match(name))
    }

    pub fn is_catch_all(&self) -> bool {
        self.matcher.is_none()
    }

    /// Name of the hidden failover group for this region
    pub fn auto_group(&self) -> String {
        format!("{} - {}", self.label, super::AUTO_TAG)
    }

    /// Name of the user-visible selector for this region
    pub fn manual_group(&self) -> String {
        format!("{} - {}", self.label, super::MANUAL_TAG)
    }
}

/// Endpoints claimed by one region, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket<'a> {
    pub region: &'a Region,
    pub members: Vec<String>,
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

/// Ordered region table with exactly one trailing catch-all
#[derive(Debug, Clone)]
pub struct RegionTable {
    patterned: Vec<Region>,
    catch_all: Region,
}

impl RegionTable {
    /// Compile and validate region descriptors
    ///
    /// Codes and labels must be unique, every pattern must compile, and the
    /// single descriptor without a pattern must come last.
    pub fn compile(descriptors: &[RegionDescriptor]) -> Result<Self, ValidationError> {
        let mut codes = HashSet::new();
        let mut labels = HashSet::new();
        let mut patterned = Vec::new();
        let mut catch_all = None;

        for descriptor in descriptors {
            if !codes.insert(descriptor.code.as_str()) {
                return Err(ValidationError::DuplicateRegion {
                    region: descriptor.code.clone(),
                });
            }
            if !labels.insert(descriptor.label.as_str()) {
                return Err(ValidationError::DuplicateRegion {
                    region: descriptor.label.clone(),
                });
            }

            if catch_all.is_some() {
                return Err(ValidationError::CatchAll {
                    reason: format!(
                        "region {} is declared after the catch-all region",
                        descriptor.code
                    ),
                });
            }

            let matcher = match &descriptor.pattern {
                Some(pattern) => Some(
                    RegexBuilder::new(pattern)
                        .case_insensitive(true)
                        .build()
                        .map_err(|e| ValidationError::InvalidPattern {
                            pattern: pattern.clone(),
                            reason: e.to_string(),
                        })?,
                ),
                None => None,
            };

            let region = Region {
                code: descriptor.code.clone(),
                label: descriptor.label.clone(),
                icon: descriptor.icon.clone(),
                matcher,
            };

            if region.is_catch_all() {
                catch_all = Some(region);
            } else {
                patterned.push(region);
            }
        }

        let catch_all = catch_all.ok_or_else(|| ValidationError::CatchAll {
            reason: "no region without a pattern".to_string(),
        })?;

        Ok(Self {
            patterned,
            catch_all,
        })
    }

    /// Region that claims a display name
    pub fn classify(&self, name: &str) -> &Region {
        self.patterned
            .iter()
            .find(|region| region.matches(name))
            .unwrap_or(&self.catch_all)
    }

    /// All regions in evaluation order, catch-all last
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.patterned.iter().chain(std::iter::once(&self.catch_all))
    }

    /// Partition endpoints into non-empty buckets, in region order
    pub fn partition(&self, endpoints: &[Endpoint]) -> Vec<Bucket<'_>> {
        let mut members: Vec<Vec<String>> = vec![Vec::new(); self.patterned.len() + 1];

        for endpoint in endpoints {
            let region = self.classify(&endpoint.name);
            let slot = self
                .regions()
                .position(|r| r == region)
                .unwrap_or(self.patterned.len());
            tracing::debug!(
                "{} ({} {}) -> {}",
                endpoint.name,
                endpoint.kind.as_deref().unwrap_or("?"),
                endpoint.server.as_deref().unwrap_or("?"),
                region.code
            );
            members[slot].push(endpoint.name.clone());
        }

        self.regions()
            .zip(members)
            .filter(|(_, members)| !members.is_empty())
            .map(|(region, members)| Bucket { region, members })
            .collect()
    }
}
