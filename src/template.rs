// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Fixed-content boilerplate writers and resolver-template substitution.
//!
//! The resolver consumes two templated files besides the zone artifacts:
//! `cache.conf`, which declares the generated zones to BIND9, and
//! `named.conf.options`, which ships with upstream forwarding disabled
//! behind literal marker tokens. Substitution is whole-line, literal-token
//! replacement applied independently to every line, with no regular expressions,
//! so template content can never be misinterpreted as a pattern.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::constants::{DNSSEC_AUTO, DNSSEC_OFF, NAMED_CONF_TEMPLATE, TOKEN_DNS_IP, TOKEN_ENABLE_UPSTREAM};
use crate::settings::Layout;

/// Write the zone declarations consumed by `named.conf`.
///
/// Declares the authoritative cache zone and the RPZ zone with their
/// generated file paths.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_cache_conf(layout: &Layout, dns_domain: &str) -> Result<()> {
    let contents = format!(
        "zone \"{dns_domain}\" in {{ type master; file \"{cache}\"; }};\n\
         zone \"rpz\" in {{ type master; file \"{rpz}\"; }};\n",
        cache = layout.cache_zone(dns_domain).display(),
        rpz = layout.rpz_zone().display(),
    );

    let path = layout.cache_conf();
    fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write a fresh resolver options template.
///
/// The template is rewritten from scratch on every run so regeneration stays
/// idempotent; the finalizer substitutes the marker tokens afterwards.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_named_conf_template(layout: &Layout) -> Result<()> {
    let path = layout.named_conf();
    fs::write(&path, NAMED_CONF_TEMPLATE)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Apply the upstream-DNS and DNSSEC substitutions to the template text.
///
/// Per line:
/// - the literal [`TOKEN_ENABLE_UPSTREAM`] marker is removed,
/// - the literal [`TOKEN_DNS_IP`] token is replaced with the `"; "`-joined
///   upstream list,
/// - when `dnssec` is set, `dnssec-validation no` becomes
///   `dnssec-validation auto`.
#[must_use]
pub fn render_named_conf(template: &str, upstream_dns: &[String], dnssec: bool) -> String {
    let joined = upstream_dns.join("; ");

    template
        .split('\n')
        .map(|line| {
            let mut line = line
                .replace(TOKEN_ENABLE_UPSTREAM, "")
                .replace(TOKEN_DNS_IP, &joined);
            if dnssec {
                line = line.replace(DNSSEC_OFF, DNSSEC_AUTO);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rewrite the resolver options file in place with the substitutions applied.
///
/// # Errors
///
/// Returns an error if the template cannot be read or written back.
pub fn finalize_named_conf(layout: &Layout, upstream_dns: &[String], dnssec: bool) -> Result<()> {
    let path = layout.named_conf();
    let template =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;

    let rendered = render_named_conf(&template, upstream_dns, dnssec);
    fs::write(&path, rendered).with_context(|| format!("Failed to write {}", path.display()))
}

/// Ensure the operator custom zone exists without touching its content.
///
/// The file is operator state, not generated state: it is created empty when
/// absent and never truncated when present.
///
/// # Errors
///
/// Returns an error if the file cannot be created.
pub fn ensure_custom_zone(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::write(path, "").with_context(|| format!("Failed to create {}", path.display()))?;
    }
    Ok(())
}
