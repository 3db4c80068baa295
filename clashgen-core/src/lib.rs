//! Turns a base proxy-engine configuration into a complete one

pub mod config;
pub mod document;
pub mod error;
pub mod group;
pub mod overlay;
pub mod pipeline;
pub mod rule;

// Re-export commonly used types
pub use config::{Config, ConfigLoader, Profile};
pub use document::{Document, Endpoint};
pub use error::{Error, Result, ValidationError};
pub use group::{GroupGraph, GroupSynthesizer, PolicyGroup, RegionTable};
pub use overlay::Overlay;
pub use pipeline::{Pipeline, Report};
pub use rule::{CompiledRules, RuleCompiler, RuleEntry};
