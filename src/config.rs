//! Configuration management module
//!
//! Resolves where the engine policy lives and loads it through the policy
//! center: defaults, then the YAML file, then `LOCUS_POLICY__*` overlays.

use anyhow::{Context, Result};
use locus_policy_center::{load_snapshot, PolicyView};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the policy file when no path is given
pub const POLICY_PATH_ENV: &str = "LOCUS_POLICY_PATH";

/// Policy file location: explicit path first, then `LOCUS_POLICY_PATH`.
pub fn policy_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(POLICY_PATH_ENV).map(PathBuf::from))
}

/// Load and validate the engine policy.
pub fn load_engine_config(explicit: Option<&Path>) -> Result<PolicyView> {
    let path = policy_path(explicit);
    if let Some(path) = &path {
        if !path.exists() {
            warn!(
                "Policy file not found, using defaults: {}",
                path.display()
            );
        }
    }

    let snapshot = load_snapshot(path.as_deref()).with_context(|| match &path {
        Some(path) => format!("Failed to load engine policy from {}", path.display()),
        None => "Failed to load engine policy".to_string(),
    })?;

    info!(
        rev = snapshot.rev,
        budget_ms = snapshot.execution.command_budget_ms,
        "Loaded engine policy"
    );
    Ok(PolicyView::from(snapshot))
}
