// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Service catalog schema and loading.
//!
//! The cache-domains repository ships a `cache_domains.json` document
//! enumerating the known cacheable services and the domain-list files each
//! one owns. The catalog is loaded once per run and is immutable afterwards;
//! services are processed in declaration order so the generated zone content
//! is deterministic.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::errors::CatalogError;

/// One cacheable service: a name plus its domain-list files.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceEntry {
    /// Service name, e.g. "steam". Compared case-insensitively downstream.
    pub name: String,

    /// Domain-list files, relative to the cache-domains checkout.
    pub domain_files: Vec<String>,
}

impl ServiceEntry {
    /// The domain file consumed during record emission.
    ///
    /// The catalog schema allows several files per service, but only the
    /// first is consumed, a known limitation preserved from the original
    /// bootstrap flow. Making the choice a named accessor keeps it from
    /// looking like an indexing accident.
    #[must_use]
    pub fn primary_domain_file(&self) -> &str {
        &self.domain_files[0]
    }
}

/// The service catalog document.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceCatalog {
    /// Services in declaration order.
    pub cache_domains: Vec<ServiceEntry>,
}

impl ServiceCatalog {
    /// Load and validate the catalog from a JSON document.
    ///
    /// Validation enforces the catalog invariants: every entry has a
    /// non-empty name and at least one domain file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Malformed`] if the document does not parse,
    /// [`CatalogError::EmptyServiceName`] or [`CatalogError::NoDomainFiles`]
    /// if an entry violates the invariants, or an I/O error message wrapped
    /// in [`CatalogError::Malformed`]'s path context if the file is missing.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|e| CatalogError::Malformed {
            path: path.display().to_string(),
            source: serde_json::Error::io(e),
        })?;

        let catalog: Self =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Malformed {
                path: path.display().to_string(),
                source,
            })?;

        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for (index, entry) in self.cache_domains.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(CatalogError::EmptyServiceName { index });
            }
            if entry.domain_files.is_empty() {
                return Err(CatalogError::NoDomainFiles {
                    service: entry.name.clone(),
                });
            }
        }
        Ok(())
    }
}
