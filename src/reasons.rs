//! Refund reasons shared across all sheets.
//!
//! Stored as a UTF-8 JSON array. The list only grows; every append rewrites
//! the whole file.

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use crate::Result;

/// Reasons offered before anything has been saved
pub const DEFAULT_REASONS: &[&str] = &["Reason 1", "Reason 2"];

#[derive(Debug, Clone)]
pub struct ReasonList {
    path: PathBuf,
    reasons: Vec<String>,
}

impl ReasonList {
    /// Load the list, falling back to the defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        let reasons = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            serde_json::from_str(&contents)?
        } else {
            debug!("No reason list at {}, using defaults", path.display());
            DEFAULT_REASONS.iter().map(|r| r.to_string()).collect()
        };

        Ok(Self {
            path: path.to_path_buf(),
            reasons,
        })
    }

    /// Append a reason and persist the list.
    ///
    /// Returns `false` without writing when the reason is blank or already
    /// present.
    pub fn add(&mut self, reason: &str) -> Result<bool> {
        let reason = reason.trim();
        if reason.is_empty() || self.contains(reason) {
            return Ok(false);
        }

        self.reasons.push(reason.to_string());
        self.save()?;
        info!("Reason added: {}", reason);
        Ok(true)
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(&self.reasons)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    pub fn contains(&self, reason: &str) -> bool {
        self.reasons.iter().any(|r| r == reason)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.reasons.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }
}
