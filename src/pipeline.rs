// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The bootstrap pipeline: catalog load, per-service emission, finalization.
//!
//! `run` sequences the whole generation flow. Every step is fatal on error;
//! there is no partial-failure recovery by design, because a half-built zone
//! file is unsafe to serve. Regeneration is idempotent, re-running rebuilds
//! every generated artifact from scratch, and that is the documented recovery
//! path. The operator custom zone is the one exception: it is operator
//! state and is never truncated.

use std::fs;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use crate::catalog::ServiceCatalog;
use crate::enablement;
use crate::errors::BootstrapError;
use crate::fetch;
use crate::ip::{parse_ip_list, validate_ips, validate_private_ips};
use crate::settings::Settings;
use crate::template;
use crate::zone::{emit_service, CacheZone, RpzZone};

/// Run the full bootstrap generation flow.
///
/// Sequence: validate upstream DNS, write the resolver loop-prevention
/// config, refresh the catalog checkout, enforce the generic-cache
/// invariant, emit boilerplate, generate per-service records, finalize and
/// flush. The first failing step aborts the run.
///
/// # Errors
///
/// Returns the first error encountered; the caller prints it and exits
/// non-zero.
pub fn run(settings: &Settings) -> Result<(), BootstrapError> {
    let upstream = parse_ip_list(&settings.upstream_dns);
    validate_ips(&upstream)?;
    if upstream.is_empty() {
        return Err(BootstrapError::Generic(
            "UPSTREAM_DNS resolved to an empty server list".to_string(),
        ));
    }

    write_resolver_conf(settings, &upstream)?;

    fetch::ensure_catalog(settings)?;

    settings.check_generic_cache()?;
    if let Some(cache_ip) = &settings.cache_ip {
        let ips = validate_private_ips(&parse_ip_list(cache_ip))?;
        info!("Using generic cache target(s): {ips:?}");
    }

    let zone_dir = settings.layout.zone_dir();
    fs::create_dir_all(&zone_dir)
        .with_context(|| format!("Failed to create {}", zone_dir.display()))?;

    template::write_cache_conf(&settings.layout, &settings.dns_domain)?;
    template::write_named_conf_template(&settings.layout)?;

    let serial = Utc::now().timestamp();
    let mut cache = CacheZone::new(&settings.dns_domain, serial);
    let mut rpz = RpzZone::new(serial);

    generate_services(settings, &mut cache, &mut rpz)?;

    finalize(settings, &mut rpz)?;

    cache
        .write_to(&settings.layout.cache_zone(&settings.dns_domain))?;
    rpz.write_to(&settings.layout.rpz_zone())?;

    template::finalize_named_conf(&settings.layout, &upstream, settings.dnssec_validation)?;

    info!("Finished bootstrapping");
    Ok(())
}

/// Point the host's own resolution at the chosen upstream.
///
/// Written before anything else so the generated authoritative zone can
/// never recursively query itself during bootstrap.
fn write_resolver_conf(settings: &Settings, upstream: &[String]) -> Result<()> {
    info!("Configuring resolv.conf to stop from looping to ourself");

    let path = settings.layout.resolv_conf();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut f =
        fs::File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    writeln!(f, "{}", crate::constants::RESOLV_CONF_HEADER)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    for dns in upstream {
        writeln!(f, "nameserver {dns}")
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}

/// Load the catalog and emit records for every enabled service.
///
/// Services are processed in catalog declaration order so the generated
/// zone content is deterministic.
fn generate_services(
    settings: &Settings,
    cache: &mut CacheZone,
    rpz: &mut RpzZone,
) -> Result<(), BootstrapError> {
    let catalog = ServiceCatalog::load(&settings.layout.catalog_file())?;

    for entry in &catalog.cache_domains {
        info!("Processing service: {}", entry.name);

        let decision = enablement::resolve(&entry.name, settings)?;
        if !decision.enabled {
            info!("Skipping service: {}", decision.name);
            continue;
        }

        info!(
            "Enabling service with IP(s): {}",
            decision.target_ips.join(", ")
        );

        let domain_file = settings
            .layout
            .domains_dir()
            .join(entry.primary_domain_file());
        emit_service(cache, rpz, &decision, &domain_file, &settings.dns_domain)?;
    }

    Ok(())
}

/// Append operator passthrough records and the custom-zone include.
fn finalize(settings: &Settings, rpz: &mut RpzZone) -> Result<(), BootstrapError> {
    if let Some(raw) = &settings.passthru_ips {
        let ips = parse_ip_list(raw);
        validate_ips(&ips)?;

        rpz.begin_operator_passthru();
        for ip in &ips {
            rpz.push_passthru(ip)?;
        }
    }

    let custom = settings.layout.custom_zone();
    template::ensure_custom_zone(&custom)?;
    rpz.push_include(&custom);

    Ok(())
}
