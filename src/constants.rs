// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the lancache bootstrap generator.
//!
//! This module contains all string constants used throughout the codebase:
//! environment variable names, filesystem layout, template marker tokens and
//! fixed template bodies. Constants are organized by category for easy
//! maintenance.

// ============================================================================
// Environment Variables
// ============================================================================

/// Enables generic-cache mode (one IP serves every enabled service)
pub const ENV_USE_GENERIC_CACHE: &str = "USE_GENERIC_CACHE";

/// Global cache target IP(s), required in generic-cache mode
pub const ENV_LANCACHE_IP: &str = "LANCACHE_IP";

/// DNS domain the authoritative cache zone is generated for
pub const ENV_LANCACHE_DNSDOMAIN: &str = "LANCACHE_DNSDOMAIN";

/// Upstream DNS server list (whitespace or comma separated)
pub const ENV_UPSTREAM_DNS: &str = "UPSTREAM_DNS";

/// Operator-declared RPZ passthrough IP list
pub const ENV_PASSTHRU_IPS: &str = "PASSTHRU_IPS";

/// Switches `dnssec-validation` from `no` to `auto` in the resolver config
pub const ENV_ENABLE_DNSSEC_VALIDATION: &str = "ENABLE_DNSSEC_VALIDATION";

/// Git repository holding the cache-domains catalog
pub const ENV_CACHE_DOMAINS_REPO: &str = "CACHE_DOMAINS_REPO";

/// Branch of the cache-domains repository to track
pub const ENV_CACHE_DOMAINS_BRANCH: &str = "CACHE_DOMAINS_BRANCH";

/// Skips updating the cache-domains checkout when set to "true"
pub const ENV_NOFETCH: &str = "NOFETCH";

/// Suffix of per-service IP override variables (`STEAMCACHE_IP`, ...)
pub const ENV_SERVICE_IP_SUFFIX: &str = "CACHE_IP";

/// Prefix of per-service disable flags (`DISABLE_STEAM`, ...)
pub const ENV_DISABLE_PREFIX: &str = "DISABLE_";

// ============================================================================
// Defaults
// ============================================================================

/// Default DNS domain for the cache zone
pub const DEFAULT_DNS_DOMAIN: &str = "cache.lancache.net";

/// Default upstream DNS server
pub const DEFAULT_UPSTREAM_DNS: &str = "8.8.8.8";

/// Default cache-domains catalog repository
pub const DEFAULT_CACHE_DOMAINS_REPO: &str = "https://github.com/uklans/cache-domains.git";

/// Default cache-domains branch
pub const DEFAULT_CACHE_DOMAINS_BRANCH: &str = "master";

// ============================================================================
// Filesystem Layout (relative to the bootstrap root)
// ============================================================================

/// Resolver loop-prevention config
pub const RESOLV_CONF_REL: &str = "etc/resolv.conf";

/// BIND9 configuration directory
pub const BIND_DIR_REL: &str = "etc/bind";

/// Generated zone directory, under the BIND9 directory
pub const CACHE_ZONE_DIR: &str = "cache";

/// Zone declarations consumed by `named.conf`
pub const CACHE_CONF_FILE: &str = "cache.conf";

/// Resolver options template rewritten at finalization
pub const NAMED_CONF_FILE: &str = "named.conf.options";

/// RPZ rewrite zone file name
pub const RPZ_ZONE_FILE: &str = "rpz.db";

/// Operator-editable zone fragment included into the RPZ zone
pub const CUSTOM_ZONE_FILE: &str = "custom.db";

/// Checkout directory of the cache-domains repository
pub const DOMAINS_DIR_REL: &str = "opt/cache-domains";

/// Service catalog document inside the cache-domains checkout
pub const CATALOG_FILE: &str = "cache_domains.json";

// ============================================================================
// Template Tokens
// ============================================================================

/// Marker removed from `named.conf.options` to enable upstream forwarding
pub const TOKEN_ENABLE_UPSTREAM: &str = "#ENABLE_UPSTREAM_DNS#";

/// Literal token replaced with the semicolon-joined upstream DNS list
pub const TOKEN_DNS_IP: &str = "dns_ip";

/// DNSSEC-off directive as shipped in the template
pub const DNSSEC_OFF: &str = "dnssec-validation no";

/// DNSSEC directive substituted in when validation is requested
pub const DNSSEC_AUTO: &str = "dnssec-validation auto";

// ============================================================================
// Template Bodies
// ============================================================================

/// Header line written at the top of the generated resolv.conf
pub const RESOLV_CONF_HEADER: &str = "# Lancache dns config";

/// Resolver options template.
///
/// Ships with upstream forwarding disabled; the finalizer removes the
/// [`TOKEN_ENABLE_UPSTREAM`] marker and fills in [`TOKEN_DNS_IP`].
pub const NAMED_CONF_TEMPLATE: &str = r#"options {
	directory "/var/cache/bind";

	#ENABLE_UPSTREAM_DNS#	forwarders { dns_ip; };
	#ENABLE_UPSTREAM_DNS#	forward only;

	dnssec-validation no;

	response-policy { zone "rpz"; };

	listen-on { any; };
	listen-on-v6 { any; };
};
"#;
