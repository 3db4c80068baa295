//! Rule entry parsing
//!
//! Entries use the engine's line format `TYPE,payload,target[,option...]`,
//! with `MATCH,target` as the terminal entry. Parsing is lossless: the
//! `Display` of a parsed entry is the exact input line.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Matcher type of the terminal entry
pub const MATCH: &str = "MATCH";
/// Matcher type referencing a rule provider
pub const RULE_SET: &str = "RULE-SET";

/// Trailing flags that follow the target
const OPTIONS: &[&str] = &["no-resolve", "src"];

/// One line of the ordered decision list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleEntry {
    /// `RULE-SET,provider,target`
    RuleSet {
        provider: String,
        target: String,
        options: Vec<String>,
    },
    /// A direct matcher such as `DOMAIN-SUFFIX,example.com,target`
    Matcher {
        kind: String,
        payload: String,
        target: String,
        options: Vec<String>,
    },
    /// `MATCH,target`
    Final { target: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{rule}: {reason}")]
pub struct ParseRuleError {
    pub rule: String,
    pub reason: &'static str,
}

impl RuleEntry {
    pub fn final_to(target: impl Into<String>) -> Self {
        RuleEntry::Final {
            target: target.into(),
        }
    }

    /// Target policy, without surrounding whitespace
    pub fn target(&self) -> &str {
        match self {
            RuleEntry::RuleSet { target, .. }
            | RuleEntry::Matcher { target, .. }
            | RuleEntry::Final { target } => target.trim(),
        }
    }

    /// Provider name for `RULE-SET` entries, without surrounding whitespace
    pub fn provider(&self) -> Option<&str> {
        match self {
            RuleEntry::RuleSet { provider, .. } => Some(provider.trim()),
            _ => None,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, RuleEntry::Final { .. })
    }
}

impl FromStr for RuleEntry {
    type Err = ParseRuleError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let error = |reason| ParseRuleError {
            rule: line.to_string(),
            reason,
        };

        // Fields are compared trimmed but stored verbatim
        let (kind, rest) = line.split_once(',').ok_or_else(|| error("missing target"))?;
        if kind.trim().is_empty() {
            return Err(error("empty matcher type"));
        }

        if kind.trim() == MATCH {
            if rest.trim().is_empty() || rest.contains(',') {
                return Err(error("MATCH takes exactly one target"));
            }
            return Ok(RuleEntry::final_to(rest));
        }

        // Peel trailing options, then the target; what remains is the payload,
        // which may itself contain commas (logical rules).
        let mut fields: Vec<&str> = rest.split(',').collect();
        let mut options = Vec::new();
        while fields.len() > 2 && fields.last().is_some_and(|f| OPTIONS.contains(&f.trim())) {
            options.push(fields.pop().unwrap_or_default().to_string());
        }
        options.reverse();

        if fields.len() < 2 {
            return Err(error("missing target"));
        }
        let target = fields.pop().unwrap_or_default();
        let payload = fields.join(",");

        if payload.trim().is_empty() {
            return Err(error("empty payload"));
        }
        if target.trim().is_empty() {
            return Err(error("empty target"));
        }

        if kind.trim() == RULE_SET {
            Ok(RuleEntry::RuleSet {
                provider: payload,
                target: target.to_string(),
                options,
            })
        } else {
            Ok(RuleEntry::Matcher {
                kind: kind.to_string(),
                payload,
                target: target.to_string(),
                options,
            })
        }
    }
}

impl fmt::Display for RuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = match self {
            RuleEntry::RuleSet {
                provider,
                target,
                options,
            } => {
                write!(f, "{},{},{}", RULE_SET, provider, target)?;
                options
            }
            RuleEntry::Matcher {
                kind,
                payload,
                target,
                options,
            } => {
                write!(f, "{},{},{}", kind, payload, target)?;
                options
            }
            RuleEntry::Final { target } => return write!(f, "{},{}", MATCH, target),
        };

        for option in options {
            write!(f, ",{}", option)?;
        }
        Ok(())
    }
}
