//! Default profile compiled into the library
//!
//! Carries the region table, service catalog, rule providers and rule tiers
//! that a user profile is layered over.

use super::schema::Config;
use std::sync::LazyLock;

const PROFILE_TOML: &str = include_str!("../builtin-profile.toml");

static PROFILE: LazyLock<Config> =
    LazyLock::new(|| toml::from_str(PROFILE_TOML).expect("embedded profile is valid TOML"));

/// Parsed default profile, shared for the life of the process
pub fn get_builtin() -> &'static Config {
    &PROFILE
}
