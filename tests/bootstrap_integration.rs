// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Integration tests for the full bootstrap pipeline.
//!
//! These tests run the complete generation flow against a temp root with a
//! pre-seeded cache-domains checkout (fetching skipped), then assert on the
//! generated artifacts:
//! - resolver loop-prevention config
//! - authoritative cache zone records
//! - RPZ passthrough and rewrite records
//! - custom-zone include and operator passthroughs
//! - resolver template substitution
//!
//! Run with: cargo test --test bootstrap_integration

use std::fs;
use std::path::Path;

use lancache_bootstrap::pipeline;
use lancache_bootstrap::settings::{Layout, Settings};

/// Seed a cache-domains checkout with a two-service catalog.
fn seed_catalog(root: &Path) {
    let domains = root.join("opt/cache-domains");
    fs::create_dir_all(&domains).unwrap();

    fs::write(
        domains.join("cache_domains.json"),
        r#"{
            "cache_domains": [
                {"name": "steam", "domain_files": ["steam.txt"]},
                {"name": "origin", "domain_files": ["origin.txt"]}
            ]
        }"#,
    )
    .unwrap();

    fs::write(
        domains.join("steam.txt"),
        "# steam cdn\n\nstore.steampowered.com\nsteamcontent.com\n",
    )
    .unwrap();
    fs::write(domains.join("origin.txt"), "origin-a.akamaihd.net\n").unwrap();
}

fn settings(root: &Path, pairs: &[(&str, &str)]) -> Settings {
    let mut s = Settings::from_vars(
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
        Layout::new(root),
    );
    s.skip_fetch = true;
    s
}

#[test]
fn test_generic_cache_run_generates_all_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    seed_catalog(dir.path());

    let s = settings(
        dir.path(),
        &[
            ("USE_GENERIC_CACHE", "true"),
            ("LANCACHE_IP", "10.0.0.5"),
            ("UPSTREAM_DNS", "8.8.8.8 1.1.1.1"),
            ("PASSTHRU_IPS", "203.0.113.5"),
        ],
    );

    pipeline::run(&s).unwrap();

    let resolv = fs::read_to_string(s.layout.resolv_conf()).unwrap();
    assert!(resolv.starts_with("# Lancache dns config\n"));
    assert!(resolv.contains("nameserver 8.8.8.8\n"));
    assert!(resolv.contains("nameserver 1.1.1.1\n"));

    let cache = fs::read_to_string(s.layout.cache_zone("cache.lancache.net")).unwrap();
    assert!(cache.contains("steam IN A 10.0.0.5;\n"));
    assert!(cache.contains("origin IN A 10.0.0.5;\n"));

    let rpz = fs::read_to_string(s.layout.rpz_zone()).unwrap();
    assert!(rpz.contains(";## steam\n"));
    assert!(rpz.contains("32.5.0.0.10.rpz-client-ip      CNAME rpz-passthru.;\n"));
    assert!(rpz.contains("store.steampowered.com IN CNAME steam.cache.lancache.net.;\n"));
    assert!(rpz.contains("steamcontent.com IN CNAME steam.cache.lancache.net.;\n"));
    assert!(rpz.contains("origin-a.akamaihd.net IN CNAME origin.cache.lancache.net.;\n"));
    assert!(rpz.contains(";## Additional RPZ passthroughs\n"));
    assert!(rpz.contains("32.5.113.0.203.rpz-client-ip      CNAME rpz-passthru.;\n"));
    assert!(rpz.contains(&format!("$INCLUDE {}\n", s.layout.custom_zone().display())));

    // Domain-file comments and blanks produce no rewrites
    assert!(!rpz.contains("steam cdn"));

    let named = fs::read_to_string(s.layout.named_conf()).unwrap();
    assert!(named.contains("forwarders { 8.8.8.8; 1.1.1.1; };"));
    assert!(named.contains("dnssec-validation no;"));
    assert!(!named.contains("#ENABLE_UPSTREAM_DNS#"));

    let cache_conf = fs::read_to_string(s.layout.cache_conf()).unwrap();
    assert!(cache_conf.contains("zone \"cache.lancache.net\""));
    assert!(cache_conf.contains("zone \"rpz\""));

    // The custom zone exists and is empty
    assert_eq!(fs::read_to_string(s.layout.custom_zone()).unwrap(), "");
}

#[test]
fn test_disable_flag_skips_service_in_generic_mode() {
    let dir = tempfile::tempdir().unwrap();
    seed_catalog(dir.path());

    let s = settings(
        dir.path(),
        &[
            ("USE_GENERIC_CACHE", "true"),
            ("LANCACHE_IP", "10.0.0.5"),
            ("DISABLE_STEAM", "true"),
        ],
    );

    pipeline::run(&s).unwrap();

    let cache = fs::read_to_string(s.layout.cache_zone("cache.lancache.net")).unwrap();
    assert!(!cache.contains("steam IN A"));
    assert!(cache.contains("origin IN A 10.0.0.5;\n"));

    let rpz = fs::read_to_string(s.layout.rpz_zone()).unwrap();
    assert!(!rpz.contains("steampowered"));
    assert!(rpz.contains("origin-a.akamaihd.net IN CNAME origin.cache.lancache.net.;\n"));
}

#[test]
fn test_per_service_override_mode() {
    let dir = tempfile::tempdir().unwrap();
    seed_catalog(dir.path());

    let s = settings(dir.path(), &[("STEAMCACHE_IP", "10.0.0.9")]);

    pipeline::run(&s).unwrap();

    let cache = fs::read_to_string(s.layout.cache_zone("cache.lancache.net")).unwrap();
    assert!(cache.contains("steam IN A 10.0.0.9;\n"));
    assert!(!cache.contains("origin IN A"), "undeclared service stays disabled");
}

#[test]
fn test_invalid_configuration_aborts_before_zone_generation() {
    let dir = tempfile::tempdir().unwrap();
    seed_catalog(dir.path());

    // Generic mode without a global IP
    let s = settings(dir.path(), &[("USE_GENERIC_CACHE", "true")]);
    assert!(pipeline::run(&s).is_err());
    assert!(!s.layout.rpz_zone().exists());

    // Global IP without generic mode
    let s = settings(dir.path(), &[("LANCACHE_IP", "10.0.0.5")]);
    assert!(pipeline::run(&s).is_err());
    assert!(!s.layout.rpz_zone().exists());
}

#[test]
fn test_public_cache_ip_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    seed_catalog(dir.path());

    let s = settings(
        dir.path(),
        &[("USE_GENERIC_CACHE", "true"), ("LANCACHE_IP", "8.8.8.8")],
    );

    assert!(pipeline::run(&s).is_err());
    assert!(!s.layout.rpz_zone().exists());
}

#[test]
fn test_invalid_upstream_dns_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    seed_catalog(dir.path());

    let s = settings(
        dir.path(),
        &[
            ("USE_GENERIC_CACHE", "true"),
            ("LANCACHE_IP", "10.0.0.5"),
            ("UPSTREAM_DNS", "not-a-server"),
        ],
    );

    assert!(pipeline::run(&s).is_err());
    assert!(!s.layout.resolv_conf().exists());
}

#[test]
fn test_regeneration_is_idempotent_modulo_serial() {
    let dir = tempfile::tempdir().unwrap();
    seed_catalog(dir.path());

    let s = settings(
        dir.path(),
        &[("USE_GENERIC_CACHE", "true"), ("LANCACHE_IP", "10.0.0.5")],
    );

    pipeline::run(&s).unwrap();
    let first = fs::read_to_string(s.layout.rpz_zone()).unwrap();
    let first_cache = fs::read_to_string(s.layout.cache_zone("cache.lancache.net")).unwrap();

    pipeline::run(&s).unwrap();
    let second = fs::read_to_string(s.layout.rpz_zone()).unwrap();
    let second_cache = fs::read_to_string(s.layout.cache_zone("cache.lancache.net")).unwrap();

    let strip_serial = |text: &str| {
        text.lines()
            .filter(|l| !l.contains("; serial") && !l.contains("604800 600 600 600"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    assert_eq!(strip_serial(&first), strip_serial(&second));
    assert_eq!(strip_serial(&first_cache), strip_serial(&second_cache));
}

#[test]
fn test_custom_zone_survives_regeneration() {
    let dir = tempfile::tempdir().unwrap();
    seed_catalog(dir.path());

    let s = settings(
        dir.path(),
        &[("USE_GENERIC_CACHE", "true"), ("LANCACHE_IP", "10.0.0.5")],
    );

    pipeline::run(&s).unwrap();
    fs::write(s.layout.custom_zone(), "hand-written IN CNAME steam.;\n").unwrap();

    pipeline::run(&s).unwrap();
    assert_eq!(
        fs::read_to_string(s.layout.custom_zone()).unwrap(),
        "hand-written IN CNAME steam.;\n"
    );
}

#[test]
fn test_dnssec_validation_toggle() {
    let dir = tempfile::tempdir().unwrap();
    seed_catalog(dir.path());

    let s = settings(
        dir.path(),
        &[
            ("USE_GENERIC_CACHE", "true"),
            ("LANCACHE_IP", "10.0.0.5"),
            ("ENABLE_DNSSEC_VALIDATION", "true"),
        ],
    );

    pipeline::run(&s).unwrap();

    let named = fs::read_to_string(s.layout.named_conf()).unwrap();
    assert!(named.contains("dnssec-validation auto;"));
    assert!(!named.contains("dnssec-validation no;"));
}

#[test]
fn test_enabled_service_without_ip_names_the_service() {
    let dir = tempfile::tempdir().unwrap();
    seed_catalog(dir.path());

    // Override declared but empty, no global IP: enabled with nothing to
    // resolve
    let s = settings(dir.path(), &[("STEAMCACHE_IP", "")]);

    let err = pipeline::run(&s).unwrap_err();
    assert!(err.to_string().contains("STEAM"));
}
