// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Run configuration assembled once from the process environment.
//!
//! The bootstrap generator is driven entirely by environment variables. To
//! keep the pipeline pure and testable, the environment is snapshotted into
//! a [`Settings`] struct exactly once at startup and passed by reference into
//! every component; no component reads the environment afterwards.
//!
//! Per-service variables (`<SERVICE>CACHE_IP`, `DISABLE_<SERVICE>`) are
//! captured into maps during the snapshot. The override map preserves
//! *presence* semantics: a variable declared with an empty value still marks
//! its service as enabled in non-generic mode, exactly like the container
//! environment it replaces.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::constants::{
    BIND_DIR_REL, CACHE_CONF_FILE, CACHE_ZONE_DIR, CATALOG_FILE, CUSTOM_ZONE_FILE,
    DEFAULT_CACHE_DOMAINS_BRANCH,
    DEFAULT_CACHE_DOMAINS_REPO, DEFAULT_DNS_DOMAIN, DEFAULT_UPSTREAM_DNS, DOMAINS_DIR_REL,
    ENV_CACHE_DOMAINS_BRANCH, ENV_CACHE_DOMAINS_REPO, ENV_DISABLE_PREFIX,
    ENV_ENABLE_DNSSEC_VALIDATION, ENV_LANCACHE_DNSDOMAIN, ENV_LANCACHE_IP, ENV_NOFETCH,
    ENV_PASSTHRU_IPS, ENV_SERVICE_IP_SUFFIX, ENV_UPSTREAM_DNS, ENV_USE_GENERIC_CACHE,
    NAMED_CONF_FILE, RESOLV_CONF_REL, RPZ_ZONE_FILE,
};
use crate::errors::ConfigError;

/// Filesystem layout of every file the run reads or writes.
///
/// All paths hang off a single root, `/` in the container and a temp
/// directory in tests.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// Layout rooted at the given directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The bootstrap root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolver loop-prevention config (`/etc/resolv.conf`).
    #[must_use]
    pub fn resolv_conf(&self) -> PathBuf {
        self.root.join(RESOLV_CONF_REL)
    }

    /// BIND9 configuration directory (`/etc/bind`).
    #[must_use]
    pub fn bind_dir(&self) -> PathBuf {
        self.root.join(BIND_DIR_REL)
    }

    /// Generated zone directory (`/etc/bind/cache`).
    #[must_use]
    pub fn zone_dir(&self) -> PathBuf {
        self.bind_dir().join(CACHE_ZONE_DIR)
    }

    /// Zone declarations file (`/etc/bind/cache.conf`).
    #[must_use]
    pub fn cache_conf(&self) -> PathBuf {
        self.bind_dir().join(CACHE_CONF_FILE)
    }

    /// Resolver options template (`/etc/bind/named.conf.options`).
    #[must_use]
    pub fn named_conf(&self) -> PathBuf {
        self.bind_dir().join(NAMED_CONF_FILE)
    }

    /// Authoritative cache zone file for the given DNS domain.
    #[must_use]
    pub fn cache_zone(&self, dns_domain: &str) -> PathBuf {
        self.zone_dir().join(format!("{dns_domain}.db"))
    }

    /// RPZ rewrite zone file (`/etc/bind/cache/rpz.db`).
    #[must_use]
    pub fn rpz_zone(&self) -> PathBuf {
        self.zone_dir().join(RPZ_ZONE_FILE)
    }

    /// Operator-editable custom zone fragment (`/etc/bind/cache/custom.db`).
    #[must_use]
    pub fn custom_zone(&self) -> PathBuf {
        self.zone_dir().join(CUSTOM_ZONE_FILE)
    }

    /// Cache-domains repository checkout (`/opt/cache-domains`).
    #[must_use]
    pub fn domains_dir(&self) -> PathBuf {
        self.root.join(DOMAINS_DIR_REL)
    }

    /// Service catalog document inside the checkout.
    #[must_use]
    pub fn catalog_file(&self) -> PathBuf {
        self.domains_dir().join(CATALOG_FILE)
    }
}

/// The full configuration for one bootstrap run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Generic-cache mode: one IP serves every non-disabled service.
    pub generic_cache: bool,

    /// DNS domain the cache zone answers for.
    pub dns_domain: String,

    /// Global cache target IP(s), raw list form. `None` when unset or empty.
    pub cache_ip: Option<String>,

    /// Upstream DNS list, raw form; validated by the pipeline.
    pub upstream_dns: String,

    /// Operator passthrough IP list, raw form. `None` when unset or empty.
    pub passthru_ips: Option<String>,

    /// Whether to switch DNSSEC validation from `no` to `auto`.
    pub dnssec_validation: bool,

    /// Cache-domains repository URL.
    pub repo_url: String,

    /// Cache-domains branch to track.
    pub repo_branch: String,

    /// Skip updating the cache-domains checkout.
    pub skip_fetch: bool,

    /// Per-service IP overrides keyed by canonical (upper-case) service name.
    /// Presence marks the service as declared even when the value is empty.
    pub service_ip_overrides: HashMap<String, String>,

    /// Services whose `DISABLE_<SERVICE>` flag is exactly `"true"`.
    pub disabled_services: HashSet<String>,

    /// Filesystem layout for the run.
    pub layout: Layout,
}

impl Settings {
    /// Snapshot the process environment into a settings struct.
    ///
    /// This is the only place the environment is read. Unset or empty
    /// variables fall back to their documented defaults.
    #[must_use]
    pub fn from_env(layout: Layout) -> Self {
        Self::from_vars(std::env::vars(), layout)
    }

    /// Build settings from an explicit variable snapshot.
    ///
    /// Split out from [`Settings::from_env`] so tests can drive the full
    /// capture logic without mutating the process environment.
    pub fn from_vars(vars: impl Iterator<Item = (String, String)>, layout: Layout) -> Self {
        let mut captured: HashMap<String, String> = HashMap::new();
        let mut service_ip_overrides = HashMap::new();
        let mut disabled_services = HashSet::new();

        for (key, value) in vars {
            if let Some(service) = key.strip_suffix(ENV_SERVICE_IP_SUFFIX) {
                // LANCACHE_IP is the global target, not a per-service override
                if !service.is_empty() && key != ENV_LANCACHE_IP {
                    service_ip_overrides.insert(service.to_uppercase(), value.clone());
                }
            }
            if let Some(service) = key.strip_prefix(ENV_DISABLE_PREFIX) {
                if value == "true" {
                    disabled_services.insert(service.to_uppercase());
                }
            }
            captured.insert(key, value);
        }

        let get = |name: &str| captured.get(name).map(String::as_str).unwrap_or("");
        let get_or = |name: &str, default: &str| {
            let value = get(name);
            if value.is_empty() {
                default.to_string()
            } else {
                value.to_string()
            }
        };
        let non_empty = |name: &str| {
            let value = get(name);
            if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        };

        Self {
            generic_cache: get(ENV_USE_GENERIC_CACHE) == "true",
            dns_domain: get_or(ENV_LANCACHE_DNSDOMAIN, DEFAULT_DNS_DOMAIN),
            cache_ip: non_empty(ENV_LANCACHE_IP),
            upstream_dns: get_or(ENV_UPSTREAM_DNS, DEFAULT_UPSTREAM_DNS),
            passthru_ips: non_empty(ENV_PASSTHRU_IPS),
            dnssec_validation: get(ENV_ENABLE_DNSSEC_VALIDATION) == "true",
            repo_url: get_or(ENV_CACHE_DOMAINS_REPO, DEFAULT_CACHE_DOMAINS_REPO),
            repo_branch: get_or(ENV_CACHE_DOMAINS_BRANCH, DEFAULT_CACHE_DOMAINS_BRANCH),
            skip_fetch: get(ENV_NOFETCH) == "true",
            service_ip_overrides,
            disabled_services,
            layout,
        }
    }

    /// Whether an IP override was declared for the service, even if empty.
    #[must_use]
    pub fn override_declared(&self, service: &str) -> bool {
        self.service_ip_overrides.contains_key(service)
    }

    /// The non-empty override value for the service, if any.
    #[must_use]
    pub fn override_ip(&self, service: &str) -> Option<&str> {
        self.service_ip_overrides
            .get(service)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Whether the service's disable flag is set to `"true"`.
    #[must_use]
    pub fn is_disabled(&self, service: &str) -> bool {
        self.disabled_services.contains(service)
    }

    /// Enforce the global generic-cache invariant.
    ///
    /// Generic-cache mode requires a global cache IP; outside generic-cache
    /// mode a global cache IP must not be set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCacheIp`] or
    /// [`ConfigError::UnexpectedCacheIp`] on violation.
    pub fn check_generic_cache(&self) -> Result<(), ConfigError> {
        if self.generic_cache {
            if self.cache_ip.is_none() {
                return Err(ConfigError::MissingCacheIp);
            }
        } else if self.cache_ip.is_some() {
            return Err(ConfigError::UnexpectedCacheIp);
        }
        Ok(())
    }
}
