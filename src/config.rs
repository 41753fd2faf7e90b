use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::sheet::{self, SchemaRegistry};
use crate::views::ValidationPolicy;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SupportConfig {
    pub database: Option<String>,
    pub reasons: Option<String>,
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Save rules of the two list views
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationConfig {
    #[serde(default = "default_pending_policy")]
    pub pending: ValidationPolicy,
    #[serde(default)]
    pub search: ValidationPolicy,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            pending: default_pending_policy(),
            search: ValidationPolicy::default(),
        }
    }
}

/// Closing a refund from the pending list needs the return recorded
fn default_pending_policy() -> ValidationPolicy {
    ValidationPolicy::require([sheet::RETURN_HASH, sheet::RETURN_DONE])
}

impl SupportConfig {
    /// Database path: explicit override, then config, then the default
    pub fn database_path(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.database.as_ref().map(PathBuf::from))
            .unwrap_or_else(default_database_path)
    }

    pub fn reasons_path(&self) -> PathBuf {
        self.reasons
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_reasons_path)
    }

    /// Every column a policy names must exist in at least one sheet
    pub fn check(&self, registry: &SchemaRegistry) -> crate::Result<()> {
        let policies = [("pending", &self.validation.pending), ("search", &self.validation.search)];
        for (view, policy) in policies {
            for column in &policy.required {
                let known = registry.sheets().any(|s| s.schema.has_column(column));
                if !known {
                    return Err(crate::Error::Config(format!(
                        "validation.{} requires unknown column '{}'",
                        view, column
                    )));
                }
            }
        }
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("supportbook.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from(".supportbook").join("records.db")
}

pub fn default_reasons_path() -> PathBuf {
    PathBuf::from("reasons.json")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<SupportConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: SupportConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &SupportConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
