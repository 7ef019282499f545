// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the bootstrap generator.
//!
//! This module provides specialized error types for:
//! - Configuration errors (invalid environment variable combinations)
//! - Validation errors (malformed or out-of-range IP addresses)
//! - Catalog errors (malformed catalog JSON, missing domain files)
//!
//! Every error aborts the run: a half-written zone file served to a resolver
//! could silently fail to redirect or could misdirect traffic, so there is no
//! partial-failure recovery. Regeneration rebuilds everything from scratch.

use thiserror::Error;

/// Errors caused by an invalid combination of configuration inputs.
///
/// These surface before or during per-service enablement resolution and
/// always name the offending variable or service.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    /// Generic-cache mode was requested without a global cache IP
    #[error("If you are using USE_GENERIC_CACHE then you must set LANCACHE_IP")]
    MissingCacheIp,

    /// A global cache IP was set outside generic-cache mode
    #[error("If you are using LANCACHE_IP then you must set USE_GENERIC_CACHE=true")]
    UnexpectedCacheIp,

    /// A service is enabled but neither its override nor the global IP resolves
    #[error("Could not find IP for requested service: {service}")]
    NoServiceIp {
        /// Canonical (upper-case) service name
        service: String,
    },
}

/// Errors raised while validating IP addresses.
#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    /// The value does not parse as an IPv4 or IPv6 address
    #[error("'{value}' is not a valid IP address")]
    InvalidIp {
        /// The offending input
        value: String,
    },

    /// The address is syntactically valid but outside the private ranges
    ///
    /// Cache targets must be RFC1918, loopback or link-local so a
    /// misconfigured generic-cache IP cannot redirect clients to a public
    /// address.
    #[error("'{value}' is not a private (RFC1918, loopback or link-local) address")]
    NotPrivateIp {
        /// The offending input
        value: String,
    },

    /// An RPZ passthrough key was requested for a non-IPv4 address
    ///
    /// Reverse-octet keys are only defined for IPv4; fabricating one for an
    /// IPv6 address would produce a silently wrong RPZ rule.
    #[error("'{value}' is not an IPv4 address, cannot derive an RPZ passthrough key")]
    NotIpv4 {
        /// The offending input
        value: String,
    },
}

/// Errors raised while loading the service catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog document is not valid JSON for the expected schema
    #[error("Malformed catalog {path}: {source}")]
    Malformed {
        /// Path of the catalog document
        path: String,
        /// Underlying deserialization failure
        #[source]
        source: serde_json::Error,
    },

    /// A catalog entry has an empty service name
    #[error("Catalog entry {index} has an empty service name")]
    EmptyServiceName {
        /// Zero-based position of the entry in the catalog
        index: usize,
    },

    /// A catalog entry lists no domain files
    #[error("Service '{service}' lists no domain files")]
    NoDomainFiles {
        /// The service with the empty list
        service: String,
    },
}

/// Composite error type for the whole bootstrap run.
///
/// This is the error returned by [`crate::pipeline::run`]. It provides a
/// unified surface for the process entry point, which prints a single
/// diagnostic line and exits non-zero.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// Invalid configuration combination
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Malformed or out-of-range IP address
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Malformed catalog or invalid catalog entry
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Filesystem failure while reading inputs or writing artifacts
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// Failure in an external collaborator (catalog fetch, templating)
    #[error("{0}")]
    Generic(String),
}

impl BootstrapError {
    /// Returns the failing-step reason code for this error.
    ///
    /// This is printed alongside the diagnostic so operators can tell which
    /// stage of the run aborted.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Config(ConfigError::MissingCacheIp | ConfigError::UnexpectedCacheIp) => {
                "InvalidCacheConfiguration"
            }
            Self::Config(ConfigError::NoServiceIp { .. }) => "ServiceIpUnresolved",
            Self::Validation(ValidationError::InvalidIp { .. }) => "InvalidIpAddress",
            Self::Validation(ValidationError::NotPrivateIp { .. }) => "IpNotPrivate",
            Self::Validation(ValidationError::NotIpv4 { .. }) => "IpNotIpv4",
            Self::Catalog(CatalogError::Malformed { .. }) => "MalformedCatalog",
            Self::Catalog(
                CatalogError::EmptyServiceName { .. } | CatalogError::NoDomainFiles { .. },
            ) => "InvalidCatalogEntry",
            Self::Io(_) => "IoFailure",
            Self::Generic(_) => "BootstrapFailed",
        }
    }
}

// Conversion from anyhow::Error for steps composed of plain I/O sequences
impl From<anyhow::Error> for BootstrapError {
    fn from(err: anyhow::Error) -> Self {
        Self::Generic(format!("{err:#}"))
    }
}
