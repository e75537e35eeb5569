//! Target registry parsing
//!
//! The registry is a plain-text list of `key=url` lines. Blank lines and
//! `#` comments are ignored. Keys are sanitized to `[A-Za-z0-9_]`; entries
//! whose sanitized key or URL comes out empty are dropped.

use crate::errors::{CheckerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// One monitored service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Target {
    pub key: String,
    pub url: String,
}

/// Strip every character outside `[A-Za-z0-9_]`
pub fn sanitize_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Parse a registry document into an ordered target list
pub fn parse_targets(input: &str) -> Vec<Target> {
    let mut targets = Vec::new();
    let mut seen = HashSet::new();

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((raw_key, raw_url)) = line.split_once('=') else {
            debug!("Skipping malformed registry line: {}", line);
            continue;
        };

        let key = sanitize_key(raw_key);
        let url = raw_url.trim().to_string();

        if key.is_empty() || url.is_empty() {
            debug!("Dropping registry entry with empty key or url: {}", line);
            continue;
        }

        // Duplicate keys alias to the same history file downstream
        if !seen.insert(key.clone()) {
            warn!(
                "Duplicate target key '{}', outcomes will share one history file",
                key
            );
        }

        targets.push(Target { key, url });
    }

    targets
}

/// Load and parse the registry file at `path`
pub async fn load_targets(path: &Path) -> Result<Vec<Target>> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        CheckerError::Registry(format!("failed to read {}: {}", path.display(), e))
    })?;

    Ok(parse_targets(&content))
}
