//! Reference graph validation including cycle detection

use super::{is_sentinel, PolicyGroup};
use crate::document::Endpoint;
use crate::error::ValidationError;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Groups indexed by name, with the endpoint names they may reference
pub struct GroupGraph<'a> {
    groups: IndexMap<&'a str, &'a PolicyGroup>,
    endpoints: HashSet<&'a str>,
}

impl<'a> GroupGraph<'a> {
    /// Index the groups; duplicate names and names shadowing an endpoint are rejected
    pub fn new(
        groups: &'a [PolicyGroup],
        endpoints: &'a [Endpoint],
    ) -> Result<Self, ValidationError> {
        let endpoints: HashSet<&str> = endpoints.iter().map(|e| e.name.as_str()).collect();
        let mut index = IndexMap::with_capacity(groups.len());

        for group in groups {
            if endpoints.contains(group.name.as_str()) || is_sentinel(&group.name) {
                return Err(ValidationError::GroupShadowsProxy {
                    group: group.name.clone(),
                });
            }
            if index.insert(group.name.as_str(), group).is_some() {
                return Err(ValidationError::DuplicateGroup {
                    group: group.name.clone(),
                });
            }
        }

        Ok(Self {
            groups: index,
            endpoints,
        })
    }

    /// Validate the entire graph
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_references()?;
        self.check_cycles()?;
        Ok(())
    }

    pub fn contains_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// A policy name a rule may target
    pub fn is_target(&self, name: &str) -> bool {
        self.contains_group(name) || is_sentinel(name)
    }

    /// Validate that every member is a group, an endpoint or a sentinel
    fn validate_references(&self) -> Result<(), ValidationError> {
        for (group_name, group) in &self.groups {
            for member in &group.proxies {
                let known = self.groups.contains_key(member.as_str())
                    || self.endpoints.contains(member.as_str())
                    || is_sentinel(member);
                if !known {
                    return Err(ValidationError::UnknownMember {
                        member: format!("{} -> {}", group_name, member),
                    });
                }
            }
        }

        Ok(())
    }

    /// Check for cycles in group references using DFS
    fn check_cycles(&self) -> Result<(), ValidationError> {
        let mut visited = HashSet::new();
        for group_name in self.groups.keys().copied() {
            let mut path = Vec::new();
            self.dfs_cycle_check(group_name, &mut visited, &mut path)?;
        }
        Ok(())
    }

    fn dfs_cycle_check(
        &self,
        group_name: &'a str,
        visited: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
    ) -> Result<(), ValidationError> {
        // If this group is in the current path, we found a cycle
        if path.contains(&group_name) {
            path.push(group_name);
            return Err(ValidationError::CycleDetected {
                path: path.join(" -> "),
            });
        }

        if visited.contains(group_name) {
            return Ok(());
        }

        path.push(group_name);

        if let Some(group) = self.groups.get(group_name) {
            for member in &group.proxies {
                // Only group members can close a cycle
                if let Some((child, _)) = self.groups.get_key_value(member.as_str()) {
                    self.dfs_cycle_check(*child, visited, path)?;
                }
            }
        }

        path.pop();
        visited.insert(group_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupKind;

    fn group(name: &str, members: &[&str]) -> PolicyGroup {
        PolicyGroup::new(
            name,
            GroupKind::Select,
            members.iter().map(|m| m.to_string()).collect(),
        )
    }

    fn endpoint(name: &str) -> Endpoint {
        Endpoint {
            name: name.to_string(),
            kind: None,
            server: None,
        }
    }

    #[test]
    fn test_no_cycle() {
        let groups = vec![group("a", &["b", "DIRECT"]), group("b", &["node"])];
        let endpoints = vec![endpoint("node")];
        let graph = GroupGraph::new(&groups, &endpoints).unwrap();

        assert!(graph.validate().is_ok());
        assert!(graph.is_target("a"));
        assert!(graph.is_target("REJECT"));
        assert!(!graph.is_target("node"));
    }

    #[test]
    fn test_detect_cycle() {
        let groups = vec![
            group("a", &["b"]),
            group("b", &["c"]),
            group("c", &["a"]), // Cycle!
        ];
        let graph = GroupGraph::new(&groups, &[]).unwrap();

        match graph.check_cycles() {
            Err(ValidationError::CycleDetected { path }) => assert_eq!(path, "a -> b -> c -> a"),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let groups = vec![group("a", &["a"])];
        let graph = GroupGraph::new(&groups, &[]).unwrap();
        assert!(matches!(graph.validate(), Err(ValidationError::CycleDetected { .. })));
    }

    #[test]
    fn test_shared_child_is_not_cycle() {
        let groups = vec![
            group("top", &["left", "right"]),
            group("left", &["leaf"]),
            group("right", &["leaf"]),
            group("leaf", &["DIRECT"]),
        ];
        let graph = GroupGraph::new(&groups, &[]).unwrap();
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_dangling_member() {
        let groups = vec![group("a", &["missing"])];
        let graph = GroupGraph::new(&groups, &[]).unwrap();
        assert!(matches!(
            graph.validate(),
            Err(ValidationError::UnknownMember { .. })
        ));
    }

    #[test]
    fn test_duplicate_and_shadowing_names() {
        let groups = vec![group("a", &[]), group("a", &[])];
        assert!(matches!(
            GroupGraph::new(&groups, &[]),
            Err(ValidationError::DuplicateGroup { .. })
        ));

        let groups = vec![group("node", &[])];
        let endpoints = vec![endpoint("node")];
        assert!(matches!(
            GroupGraph::new(&groups, &endpoints),
            Err(ValidationError::GroupShadowsProxy { .. })
        ));
    }
}
