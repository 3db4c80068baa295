//! Profile checks that do not need compiled tables

use super::schema::ServiceGroup;
use crate::error::ValidationError;
use crate::group::{is_sentinel, FIXED_GROUPS};
use crate::overlay::tun::hijack_port;
use crate::overlay::{DnsConfig, TunConfig};
use std::collections::HashSet;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Service group names must be unique and must not collide with the
    /// fixed groups or the engine's built-in policies
    pub fn validate_service_groups(services: &[ServiceGroup]) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for service in services {
            let name = service.name.as_str();
            if FIXED_GROUPS.contains(&name) || is_sentinel(name) || !seen.insert(name) {
                return Err(ValidationError::DuplicateGroup {
                    group: service.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Every TUN hijack target must point at the DNS listen port
    ///
    /// Nothing is checked while the TUN device is disabled.
    pub fn validate_listen_port(dns: &DnsConfig, tun: &TunConfig) -> Result<(), ValidationError> {
        if !tun.enable {
            return Ok(());
        }

        let port = dns.listen_port().ok_or_else(|| ValidationError::InvalidListen {
            listen: dns.listen.clone(),
        })?;

        for hijack in &tun.dns_hijack {
            if hijack_port(hijack) != Some(port) {
                return Err(ValidationError::HijackPortMismatch {
                    hijack: hijack.clone(),
                    port,
                });
            }
        }
        Ok(())
    }
}
