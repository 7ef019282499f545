// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! IP address utilities: list parsing, validation and RPZ key derivation.
//!
//! Configuration variables carry IP addresses as free-form lists separated by
//! whitespace or commas. This module normalizes those lists, validates them
//! syntactically, enforces the private-range safety rail for cache targets
//! and derives the reversed-octet keys used by RPZ `rpz-client-ip` triggers.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::errors::ValidationError;

/// Split a raw configuration value into individual IP address strings.
///
/// Splits on whitespace and commas, trims each element and drops empties, so
/// `"10.0.0.1, 10.0.0.2"` and `"10.0.0.1 10.0.0.2"` parse identically.
///
/// # Examples
///
/// ```
/// use lancache_bootstrap::ip::parse_ip_list;
///
/// assert_eq!(parse_ip_list("10.0.0.1, 10.0.0.2"), vec!["10.0.0.1", "10.0.0.2"]);
/// assert!(parse_ip_list("  ").is_empty());
/// ```
#[must_use]
pub fn parse_ip_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Validate that every element is a syntactically valid IPv4 or IPv6 address.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidIp`] naming the first malformed element.
pub fn validate_ips(ips: &[String]) -> Result<Vec<IpAddr>, ValidationError> {
    ips.iter()
        .map(|raw| {
            raw.parse::<IpAddr>()
                .map_err(|_| ValidationError::InvalidIp { value: raw.clone() })
        })
        .collect()
}

/// Validate that every element is a valid address within the private ranges.
///
/// Accepted ranges are RFC1918, loopback and link-local (both families).
/// Cache targets outside these ranges would redirect clients to a public
/// address, so they are rejected outright.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidIp`] for malformed input or
/// [`ValidationError::NotPrivateIp`] for a public address.
pub fn validate_private_ips(ips: &[String]) -> Result<Vec<IpAddr>, ValidationError> {
    let parsed = validate_ips(ips)?;

    for (addr, raw) in parsed.iter().zip(ips) {
        if !is_private(addr) {
            return Err(ValidationError::NotPrivateIp { value: raw.clone() });
        }
    }

    Ok(parsed)
}

/// Whether the address falls in the RFC1918, loopback or link-local ranges.
#[must_use]
pub fn is_private(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback() || v4.is_link_local(),
        IpAddr::V6(v6) => v6.is_loopback() || is_unique_local_v6(v6) || is_link_local_v6(v6),
    }
}

// fc00::/7
fn is_unique_local_v6(v6: &Ipv6Addr) -> bool {
    (v6.segments()[0] & 0xfe00) == 0xfc00
}

// fe80::/10
fn is_link_local_v6(v6: &Ipv6Addr) -> bool {
    (v6.segments()[0] & 0xffc0) == 0xfe80
}

/// Derive the dot-reversed form of an IPv4 address for RPZ passthrough keys.
///
/// RPZ `rpz-client-ip` triggers encode the client address reversed, prefixed
/// with the prefix length: `1.2.3.4` becomes the key `32.4.3.2.1` for a /32
/// match. This function returns the reversed portion only.
///
/// # Examples
///
/// ```
/// use lancache_bootstrap::ip::reverse_octets;
///
/// assert_eq!(reverse_octets("1.2.3.4").unwrap(), "4.3.2.1");
/// assert!(reverse_octets("2001:db8::1").is_err());
/// ```
///
/// # Errors
///
/// Returns [`ValidationError::NotIpv4`] for anything that is not an IPv4
/// address, including IPv6 input. Fabricating a key for IPv6 would produce a
/// rule that silently never matches.
pub fn reverse_octets(ip: &str) -> Result<String, ValidationError> {
    let v4: Ipv4Addr = ip
        .parse()
        .map_err(|_| ValidationError::NotIpv4 { value: ip.to_string() })?;

    let [a, b, c, d] = v4.octets();
    Ok(format!("{d}.{c}.{b}.{a}"))
}
