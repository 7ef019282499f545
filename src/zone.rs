// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory zone artifact builders and per-service record emission.
//!
//! Both generated artifacts, the authoritative cache zone and the RPZ
//! rewrite zone, are accumulated in memory and flushed once at the end of
//! the run. Appends are strictly ordered, so given the catalog declaration
//! order and the input IP order the final file content is deterministic.
//! Flushing goes through a temp file in the destination directory followed
//! by a rename, so a failed run never leaves a half-written zone behind.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::enablement::EnablementDecision;
use crate::errors::BootstrapError;
use crate::ip::{reverse_octets, validate_private_ips};

/// Builder for the authoritative cache zone (`<domain>.db`).
///
/// Holds the zone header plus one `A` record per enabled service per
/// resolved IP.
#[derive(Debug, Clone)]
pub struct CacheZone {
    body: String,
}

impl CacheZone {
    /// Start a fresh cache zone for `dns_domain` with the given SOA serial.
    ///
    /// The serial is Unix epoch seconds at generation time, so every rebuild
    /// is seen as newer by the consuming resolver.
    #[must_use]
    pub fn new(dns_domain: &str, serial: i64) -> Self {
        let body = format!(
            ";; {dns_domain} cache zone, generated by lancache-bootstrap\n\
             $TTL 600\n\
             @ IN SOA ns1.{dns_domain}. dns.{dns_domain}. (\n\
             \t{serial}\t; serial\n\
             \t604800\t; refresh\n\
             \t600\t; retry\n\
             \t600\t; expire\n\
             \t600 )\t; minimum\n\
             @ IN NS ns1.{dns_domain}.\n\
             ns1 IN A 127.0.0.1\n"
        );
        Self { body }
    }

    /// Append one `A` record pointing the service name at a cache IP.
    pub fn push_service(&mut self, service: &str, ip: &str) {
        self.body.push_str(&format!("{service} IN A {ip};\n"));
    }

    /// The accumulated zone file text.
    #[must_use]
    pub fn contents(&self) -> &str {
        &self.body
    }

    /// Flush the zone atomically to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the temp file cannot be created, written or
    /// renamed over the destination.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.body)
    }
}

/// Builder for the RPZ rewrite zone (`rpz.db`).
#[derive(Debug, Clone)]
pub struct RpzZone {
    body: String,
}

impl RpzZone {
    /// Start a fresh RPZ zone with the given SOA serial.
    #[must_use]
    pub fn new(serial: i64) -> Self {
        let body = format!(
            ";; rpz zone, generated by lancache-bootstrap\n\
             $TTL 60\n\
             @ IN SOA localhost. root.localhost. (\n\
             \t{serial} 604800 600 600 600 )\n\
             @ IN NS localhost.\n"
        );
        Self { body }
    }

    /// Append the `;##` comment delimiter opening a service block.
    pub fn begin_service(&mut self, service: &str) {
        self.body.push_str(&format!(";## {service}\n"));
    }

    /// Append the delimiter opening the operator passthrough block.
    pub fn begin_operator_passthru(&mut self) {
        self.body.push_str(";## Additional RPZ passthroughs\n");
    }

    /// Append a reverse-IP passthrough record for an IPv4 cache target.
    ///
    /// The record exempts reverse lookups of the cache IP itself from policy
    /// rewriting: `32.<reversed>.rpz-client-ip CNAME rpz-passthru.;`.
    ///
    /// # Errors
    ///
    /// Returns an error if `ip` is not an IPv4 address; no record is
    /// fabricated for IPv6 input.
    pub fn push_passthru(&mut self, ip: &str) -> Result<(), BootstrapError> {
        let reversed = reverse_octets(ip)?;
        self.body
            .push_str(&format!("32.{reversed}.rpz-client-ip      CNAME rpz-passthru.;\n"));
        Ok(())
    }

    /// Append a CNAME rewrite pointing a hostname at the service's cache name.
    pub fn push_rewrite(&mut self, host: &str, service: &str, dns_domain: &str) {
        self.body
            .push_str(&format!("{host} IN CNAME {service}.{dns_domain}.;\n"));
    }

    /// Append the trailing `$INCLUDE` of the operator custom zone.
    pub fn push_include(&mut self, path: &Path) {
        self.body.push_str(&format!("$INCLUDE {}\n", path.display()));
    }

    /// The accumulated zone file text.
    #[must_use]
    pub fn contents(&self) -> &str {
        &self.body
    }

    /// Flush the zone atomically to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the temp file cannot be created, written or
    /// renamed over the destination.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.body)
    }
}

/// Emit all records for one enabled service into both zone builders.
///
/// Validates the resolved IPs as private-range addresses, appends the
/// service delimiter, one `A` record and one passthrough record per IP, then
/// merges the service's domain file: every non-comment, non-blank line
/// becomes a CNAME rewrite onto `<service>.<dns_domain>.`. Domain-file lines
/// are literal hostnames; no further validation is applied. Services with no
/// resolved IPs get no rewrites.
///
/// # Errors
///
/// Returns a validation error for a public or malformed cache IP, or an I/O
/// error if the domain file cannot be read.
pub fn emit_service(
    cache: &mut CacheZone,
    rpz: &mut RpzZone,
    decision: &EnablementDecision,
    domain_file: &Path,
    dns_domain: &str,
) -> Result<(), BootstrapError> {
    validate_private_ips(&decision.target_ips)?;

    rpz.begin_service(&decision.name);

    for ip in &decision.target_ips {
        cache.push_service(&decision.name, ip);
        rpz.push_passthru(ip)?;
    }

    if decision.target_ips.is_empty() {
        return Ok(());
    }

    let domains = fs::read_to_string(domain_file)?;
    let mut merged = 0usize;
    for line in domains.lines() {
        let host = line.trim();
        if host.is_empty() || host.starts_with('#') {
            continue;
        }
        rpz.push_rewrite(host, &decision.name, dns_domain);
        merged += 1;
    }

    info!(
        service = %decision.name,
        domains = merged,
        "Emitted service records"
    );

    Ok(())
}

/// Write `contents` to `path` via a temp file in the same directory.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = path
        .parent()
        .with_context(|| format!("No parent directory for {}", path.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    // Temp files are created 0600; the zone must stay readable by the
    // unprivileged named user consuming it
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
    }

    tmp.persist(path)
        .with_context(|| format!("Failed to persist {}", path.display()))?;

    Ok(())
}
