//! Rule list and rule provider handling

pub mod compiler;
pub mod entry;
pub mod provider;

pub use compiler::{CompiledRules, RuleCompiler, Tier};
pub use entry::{ParseRuleError, RuleEntry};
pub use provider::{Behavior, Format, ProviderKind, RuleProvider};
