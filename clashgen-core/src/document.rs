//! Engine configuration document and the endpoints it carries

use crate::error::{Error, Result};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;

/// Root key holding the upstream endpoint list
pub const PROXIES_KEY: &str = "proxies";

/// A mutable engine configuration document
///
/// Root key order is preserved; replaced keys keep their original position
/// and new keys are appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    root: Mapping,
}

/// An upstream endpoint read from `proxies`
///
/// Only the name takes part in grouping; the rest is carried for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub name: String,
    pub kind: Option<String>,
    pub server: Option<String>,
}

impl Document {
    /// Parse a YAML document; an empty input is an empty mapping
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(input).map_err(Error::DocumentParse)?;
        match value {
            Value::Mapping(root) => Ok(Self { root }),
            Value::Null => Ok(Self::default()),
            _ => Err(Error::DocumentNotMapping),
        }
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(&self.root).map_err(Error::DocumentSerialize)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.root.contains_key(key)
    }

    /// Replace a single root key with a serialized fragment
    pub fn replace<T: Serialize>(&mut self, key: &'static str, fragment: &T) -> Result<()> {
        let value =
            serde_yaml::to_value(fragment).map_err(|source| Error::Fragment { key, source })?;
        self.root.insert(Value::from(key), value);
        Ok(())
    }

    /// Merge every field of a serialized struct into the root, last write wins
    pub fn merge_root<T: Serialize>(&mut self, key: &'static str, fragment: &T) -> Result<()> {
        let value =
            serde_yaml::to_value(fragment).map_err(|source| Error::Fragment { key, source })?;
        if let Value::Mapping(fields) = value {
            for (k, v) in fields {
                self.root.insert(k, v);
            }
        }
        Ok(())
    }

    /// Read the endpoint list
    ///
    /// A missing, null or empty `proxies` yields an empty list with a warning.
    pub fn endpoints(&self) -> Result<Vec<Endpoint>> {
        let entries = match self.root.get(PROXIES_KEY) {
            None | Some(Value::Null) => {
                tracing::warn!("No `proxies` in document; proxy groups will be empty");
                return Ok(Vec::new());
            }
            Some(Value::Sequence(entries)) => entries,
            Some(_) => return Err(Error::ProxiesNotSequence),
        };

        if entries.is_empty() {
            tracing::warn!("`proxies` is empty; proxy groups will be empty");
        }

        let mut seen = HashSet::new();
        let mut endpoints = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            let endpoint = Endpoint::from_value(entry)
                .ok_or(Error::ProxyMissingName { index })?;
            if !seen.insert(endpoint.name.clone()) {
                return Err(Error::DuplicateProxy {
                    name: endpoint.name,
                });
            }
            endpoints.push(endpoint);
        }

        Ok(endpoints)
    }
}

impl Endpoint {
    fn from_value(value: &Value) -> Option<Self> {
        let record = value.as_mapping()?;
        let name = record.get("name")?.as_str()?.to_string();
        let field = |key: &str| record.get(key).and_then(Value::as_str).map(str::to_string);

        Some(Self {
            name,
            kind: field("type"),
            server: field("server"),
        })
    }
}
