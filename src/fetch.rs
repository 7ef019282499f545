// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Git-based fetcher for the cache-domains catalog checkout.
//!
//! The catalog lives in a versioned git repository. The fetcher clones it on
//! first run and hard-resets it onto the tracked branch on subsequent runs.
//! A failed update after a successful clone is not fatal: the run degrades
//! to the local copy with a warning, since a stale catalog is still a usable
//! catalog. A failed initial clone leaves nothing to generate from and
//! aborts the run.

use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::settings::Settings;

/// Ensure the cache-domains checkout is present and up to date.
///
/// When fetching is skipped and a catalog document is already present, the
/// checkout is used as-is without touching git at all.
///
/// # Errors
///
/// Returns an error if the checkout directory cannot be created or the
/// initial clone fails.
pub fn ensure_catalog(settings: &Settings) -> Result<()> {
    let dir = settings.layout.domains_dir();

    if settings.skip_fetch && settings.layout.catalog_file().exists() {
        info!("NOFETCH set, using local copy of cache_domains");
        return Ok(());
    }

    info!("Bootstrapping lancache-dns from {}", settings.repo_url);

    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    if !dir.join(".git").exists() {
        clone(&dir, &settings.repo_url)?;
    }

    if settings.skip_fetch {
        return Ok(());
    }

    // Keep origin pointed at the configured repo in case it changed
    let _ = git(&dir, &["remote", "set-url", "origin", &settings.repo_url]);

    if git(&dir, &["fetch", "origin"]).is_err() {
        warn!("Failed to update from remote, using local copy of cache_domains");
        return Ok(());
    }

    let branch = format!("origin/{}", settings.repo_branch);
    if git(&dir, &["reset", "--hard", &branch]).is_err() {
        warn!("Failed to reset onto {branch}, using local copy of cache_domains");
    }

    Ok(())
}

fn clone(dir: &Path, repo: &str) -> Result<()> {
    let status = Command::new("git")
        .args(["clone", repo, "."])
        .current_dir(dir)
        .env(
            "GIT_SSH_COMMAND",
            "ssh -o UserKnownHostsFile=/dev/null -o StrictHostKeyChecking=no",
        )
        .status()
        .with_context(|| format!("Failed to run git clone for {repo}"))?;

    if !status.success() {
        bail!("git clone of {repo} failed with {status}");
    }

    Ok(())
}

fn git(dir: &Path, args: &[&str]) -> Result<()> {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .with_context(|| format!("Failed to run git {}", args.join(" ")))?;

    if !status.success() {
        bail!("git {} failed with {status}", args.join(" "));
    }

    Ok(())
}
