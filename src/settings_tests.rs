// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the environment snapshot and configuration invariants.

#[cfg(test)]
mod tests {
    use crate::errors::ConfigError;
    use crate::settings::{Layout, Settings};

    fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Iterator<Item = (String, String)> + 'a {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
    }

    fn layout() -> Layout {
        Layout::new("/")
    }

    // ========================================================================
    // Snapshot Tests
    // ========================================================================

    #[test]
    fn test_defaults_when_unset() {
        let s = Settings::from_vars(vars(&[]), layout());

        assert!(!s.generic_cache);
        assert_eq!(s.dns_domain, "cache.lancache.net");
        assert_eq!(s.upstream_dns, "8.8.8.8");
        assert!(s.cache_ip.is_none());
        assert!(s.passthru_ips.is_none());
        assert!(!s.dnssec_validation);
        assert!(!s.skip_fetch);
        assert_eq!(s.repo_branch, "master");
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let s = Settings::from_vars(
            vars(&[("LANCACHE_DNSDOMAIN", ""), ("UPSTREAM_DNS", "")]),
            layout(),
        );
        assert_eq!(s.dns_domain, "cache.lancache.net");
        assert_eq!(s.upstream_dns, "8.8.8.8");
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let s = Settings::from_vars(
            vars(&[
                ("USE_GENERIC_CACHE", "true"),
                ("LANCACHE_IP", "10.0.0.5"),
                ("LANCACHE_DNSDOMAIN", "cache.example.lan"),
                ("UPSTREAM_DNS", "1.1.1.1 9.9.9.9"),
                ("ENABLE_DNSSEC_VALIDATION", "true"),
                ("NOFETCH", "true"),
                ("CACHE_DOMAINS_BRANCH", "develop"),
            ]),
            layout(),
        );

        assert!(s.generic_cache);
        assert_eq!(s.cache_ip.as_deref(), Some("10.0.0.5"));
        assert_eq!(s.dns_domain, "cache.example.lan");
        assert_eq!(s.upstream_dns, "1.1.1.1 9.9.9.9");
        assert!(s.dnssec_validation);
        assert!(s.skip_fetch);
        assert_eq!(s.repo_branch, "develop");
    }

    // ========================================================================
    // Per-Service Variable Capture Tests
    // ========================================================================

    #[test]
    fn test_service_override_capture_preserves_presence() {
        let s = Settings::from_vars(
            vars(&[("STEAMCACHE_IP", "10.0.0.9"), ("ORIGINCACHE_IP", "")]),
            layout(),
        );

        assert!(s.override_declared("STEAM"));
        assert_eq!(s.override_ip("STEAM"), Some("10.0.0.9"));

        // Declared but empty: presence counts, value does not
        assert!(s.override_declared("ORIGIN"));
        assert_eq!(s.override_ip("ORIGIN"), None);

        assert!(!s.override_declared("EPIC"));
    }

    #[test]
    fn test_lancache_ip_is_not_a_service_override() {
        let s = Settings::from_vars(vars(&[("LANCACHE_IP", "10.0.0.5")]), layout());
        assert!(!s.override_declared("LAN"));
        assert_eq!(s.cache_ip.as_deref(), Some("10.0.0.5"));
    }

    #[test]
    fn test_disable_flag_requires_literal_true() {
        let s = Settings::from_vars(
            vars(&[
                ("DISABLE_STEAM", "true"),
                ("DISABLE_ORIGIN", "1"),
                ("DISABLE_EPIC", "TRUE"),
            ]),
            layout(),
        );

        assert!(s.is_disabled("STEAM"));
        assert!(!s.is_disabled("ORIGIN"));
        assert!(!s.is_disabled("EPIC"));
    }

    // ========================================================================
    // Generic-Cache Invariant Tests
    // ========================================================================

    #[test]
    fn test_generic_cache_without_ip_is_an_error() {
        let s = Settings::from_vars(vars(&[("USE_GENERIC_CACHE", "true")]), layout());
        assert!(matches!(
            s.check_generic_cache(),
            Err(ConfigError::MissingCacheIp)
        ));
    }

    #[test]
    fn test_cache_ip_without_generic_cache_is_an_error() {
        let s = Settings::from_vars(vars(&[("LANCACHE_IP", "10.0.0.5")]), layout());
        assert!(matches!(
            s.check_generic_cache(),
            Err(ConfigError::UnexpectedCacheIp)
        ));
    }

    #[test]
    fn test_valid_combinations_pass() {
        let generic = Settings::from_vars(
            vars(&[("USE_GENERIC_CACHE", "true"), ("LANCACHE_IP", "10.0.0.5")]),
            layout(),
        );
        assert!(generic.check_generic_cache().is_ok());

        let per_service = Settings::from_vars(vars(&[("STEAMCACHE_IP", "10.0.0.9")]), layout());
        assert!(per_service.check_generic_cache().is_ok());
    }

    // ========================================================================
    // Layout Tests
    // ========================================================================

    #[test]
    fn test_layout_paths() {
        let layout = Layout::new("/tmp/bootstrap");

        assert_eq!(
            layout.resolv_conf().to_str().unwrap(),
            "/tmp/bootstrap/etc/resolv.conf"
        );
        assert_eq!(
            layout.cache_zone("cache.lancache.net").to_str().unwrap(),
            "/tmp/bootstrap/etc/bind/cache/cache.lancache.net.db"
        );
        assert_eq!(
            layout.rpz_zone().to_str().unwrap(),
            "/tmp/bootstrap/etc/bind/cache/rpz.db"
        );
        assert_eq!(
            layout.catalog_file().to_str().unwrap(),
            "/tmp/bootstrap/opt/cache-domains/cache_domains.json"
        );
    }
}
