//! Profile configuration
//!
//! This module handles all static tables the pipeline consumes:
//! - Config: the TOML profile schema (built-in and user)
//! - Profile: the validated, compiled form passed into the pipeline

pub mod builtin;
pub mod loader;
pub mod profile;
pub mod schema;
pub mod validator;

pub use loader::ConfigLoader;
pub use profile::Profile;
pub use schema::{CommonConfig, Config, RegionDescriptor, RuleTiers, ServiceGroup};
pub use validator::ConfigValidator;
