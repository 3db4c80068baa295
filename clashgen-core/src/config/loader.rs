//! Profile file loading and merging

use super::builtin;
use super::schema::Config;
use crate::error::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Find user profile by checking environment and standard locations
    pub fn find_user_config() -> Option<PathBuf> {
        // 1. $CLASHGEN_CONFIG
        if let Ok(path) = env::var("CLASHGEN_CONFIG") {
            let p = PathBuf::from(path);
            if p.exists() {
                return Some(p);
            }
        }

        // 2. $XDG_CONFIG_HOME/clashgen/profile.toml
        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            let p = PathBuf::from(xdg).join("clashgen/profile.toml");
            if p.exists() {
                return Some(p);
            }
        }

        // 3. ~/.config/clashgen/profile.toml
        if let Ok(home) = env::var("HOME") {
            let p = PathBuf::from(home).join(".config/clashgen/profile.toml");
            if p.exists() {
                return Some(p);
            }
        }

        None
    }

    /// Load profile from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::ConfigLoad {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load built-in profile embedded in the binary
    pub fn load_builtin() -> Config {
        builtin::get_builtin().clone()
    }

    /// Merge user profile on top of built-in profile
    ///
    /// Regions, service groups and custom rules are replaced when the user
    /// supplies them; providers are extended by name; each rule tier is
    /// replaced when non-empty; overlay sections replace wholesale.
    pub fn merge_configs(mut base: Config, override_cfg: Config) -> Config {
        if !override_cfg.regions.is_empty() {
            base.regions = override_cfg.regions;
        }

        if !override_cfg.service_groups.is_empty() {
            base.service_groups = override_cfg.service_groups;
        }

        // Merge rule providers: extend with overrides
        for (name, provider) in override_cfg.rule_providers {
            base.rule_providers.insert(name, provider);
        }

        let rules = override_cfg.rules;
        if !rules.block.is_empty() {
            base.rules.block = rules.block;
        }
        if !rules.proxy_domain.is_empty() {
            base.rules.proxy_domain = rules.proxy_domain;
        }
        if !rules.direct_domain.is_empty() {
            base.rules.direct_domain = rules.direct_domain;
        }
        if !rules.ip.is_empty() {
            base.rules.ip = rules.ip;
        }
        if rules.final_target.is_some() {
            base.rules.final_target = rules.final_target;
        }

        if override_cfg.custom_rules.is_some() {
            base.custom_rules = override_cfg.custom_rules;
        }

        // Override common settings with user settings
        base.common = override_cfg.common;

        base.options = override_cfg.options.or(base.options);
        base.sniffer = override_cfg.sniffer.or(base.sniffer);
        base.dns = override_cfg.dns.or(base.dns);
        base.tun = override_cfg.tun.or(base.tun);

        base
    }

    /// Load profile with built-in as lowest-priority fallback
    /// Priority: User profile > Built-in profile
    pub fn load_with_builtins() -> Result<Config> {
        let builtin = Self::load_builtin();

        match Self::find_user_config() {
            Some(path) => {
                tracing::debug!("Loading user profile from {:?}", path);
                let user = Self::load_from_file(&path)?;
                Ok(Self::merge_configs(builtin, user))
            }
            None => {
                tracing::debug!("No user profile found, using built-in defaults");
                Ok(builtin)
            }
        }
    }

    /// Load profile from optional path or default with built-in merge
    /// Priority: Explicit path > User profile > Built-in profile
    pub fn load_or_builtin(path: Option<PathBuf>) -> Result<Config> {
        if let Some(p) = path {
            let user = Self::load_from_file(&p)?;
            Ok(Self::merge_configs(Self::load_builtin(), user))
        } else {
            Self::load_with_builtins()
        }
    }
}
