// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-service enablement resolution.
//!
//! For each catalog service this module decides whether the service is
//! enabled and, if so, which cache IP(s) it should resolve to:
//!
//! - In generic-cache mode every service is enabled unless its
//!   `DISABLE_<SERVICE>` flag is exactly `"true"`.
//! - Otherwise a service is enabled iff its `<SERVICE>CACHE_IP` override was
//!   declared: presence counts, even with an empty value.
//! - Target IPs come from the override value when non-empty, falling back to
//!   the global cache IP. An enabled service with no resolvable IP is a
//!   fatal configuration error naming the service.
//!
//! Service names are compared case-insensitively and canonicalized to
//! upper-case, matching the environment variable convention.

use tracing::debug;

use crate::errors::ConfigError;
use crate::ip::parse_ip_list;
use crate::settings::Settings;

/// The enablement decision for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnablementDecision {
    /// Lower-case service name as used in generated records.
    pub name: String,

    /// Whether any records are generated for the service.
    pub enabled: bool,

    /// Resolved cache target IPs, in input order. Empty when disabled.
    pub target_ips: Vec<String>,
}

impl EnablementDecision {
    fn disabled(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            enabled: false,
            target_ips: Vec::new(),
        }
    }
}

/// Resolve the enablement decision for a single service.
///
/// # Errors
///
/// Returns [`ConfigError::NoServiceIp`] if the service is enabled but
/// neither its override nor the global cache IP yields an address.
pub fn resolve(service: &str, settings: &Settings) -> Result<EnablementDecision, ConfigError> {
    let canonical = service.to_uppercase();

    let enabled = if settings.generic_cache {
        !settings.is_disabled(&canonical)
    } else {
        debug!("Testing for presence of {canonical}CACHE_IP");
        settings.override_declared(&canonical)
    };

    if !enabled {
        return Ok(EnablementDecision::disabled(service));
    }

    let raw_ips = settings
        .override_ip(&canonical)
        .or(settings.cache_ip.as_deref())
        .ok_or(ConfigError::NoServiceIp {
            service: canonical.clone(),
        })?;

    let target_ips = parse_ip_list(raw_ips);
    if target_ips.is_empty() {
        return Err(ConfigError::NoServiceIp { service: canonical });
    }

    Ok(EnablementDecision {
        name: service.to_lowercase(),
        enabled: true,
        target_ips,
    })
}
