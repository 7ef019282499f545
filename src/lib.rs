// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # lancache-bootstrap - configuration generator for lancache-dns
//!
//! This crate bootstraps a BIND9 resolver to act as a lancache redirector:
//! DNS queries for known game and content-distribution domains are answered
//! with a local cache server's address while everything else passes through
//! upstream.
//!
//! The core is the configuration-generation pipeline: it reads the
//! cache-domains service catalog, decides which services are enabled (and
//! with which target IPs) and emits two derived artifacts, an authoritative
//! cache zone and a Response Policy Zone (RPZ) rewrite zone, plus the
//! templated resolver configuration that ties them together. The generator
//! only produces static zone-file text; serving it is the resolver's job.
//!
//! ## Modules
//!
//! - [`settings`] - Run configuration snapshotted once from the environment
//! - [`catalog`] - Service catalog schema and loading
//! - [`enablement`] - Per-service enable/disable and target IP resolution
//! - [`zone`] - In-memory zone builders and record emission
//! - [`template`] - Boilerplate writers and resolver-template substitution
//! - [`fetch`] - Git-based catalog checkout refresh
//! - [`pipeline`] - The orchestrated generation flow
//!
//! ## Example
//!
//! ```rust,no_run
//! use lancache_bootstrap::pipeline;
//! use lancache_bootstrap::settings::{Layout, Settings};
//!
//! let settings = Settings::from_env(Layout::new("/"));
//! if let Err(e) = pipeline::run(&settings) {
//!     eprintln!("bootstrap failed: {e}");
//! }
//! ```

pub mod catalog;
pub mod constants;
pub mod enablement;
pub mod errors;
pub mod fetch;
pub mod ip;
pub mod pipeline;
pub mod settings;
pub mod template;
pub mod zone;

#[cfg(test)]
mod settings_tests;
