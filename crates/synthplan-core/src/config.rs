//! # Plan Files
//!
//! A plan can be declared in a TOML file (or JSON, chosen by the `.json`
//! extension) instead of through the builder API. Loading a plan file
//! replays its declarations through [`PlanBuilder`], so every check the
//! builder performs applies to files in exactly the same way.
//!
//! Example `orders.toml`:
//!
//! ```toml
//! [plan]
//! name = "orders"
//! rows = 100000
//! partitions = 8
//! seed = 42
//! id_output = true
//!
//! [[columns]]
//! name = "code"
//! type = "int"
//! min = 1
//! max = 100
//! random = true
//!
//! [[columns]]
//! name = "status"
//! type = "string"
//! values = ["open", "shipped", "returned"]
//! weights = [6, 3, 1]
//! random = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};
use crate::plan::builder::{PlanBuilder, DEFAULT_SEED, DEFAULT_SEED_COLUMN};
use crate::plan::GenerationPlan;
use crate::spec::ColumnDeclaration;

fn default_partitions() -> usize {
    1
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_seed_column() -> String {
    DEFAULT_SEED_COLUMN.to_string()
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Top-level plan file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanFile {
    pub plan: PlanSection,
    #[serde(default)]
    pub columns: Vec<ColumnDeclaration>,
}

/// The `[plan]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanSection {
    pub name: String,
    pub rows: u64,
    #[serde(default = "default_partitions")]
    pub partitions: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Name of the row id column.
    #[serde(default = "default_seed_column")]
    pub seed_column: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub id_output: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_empty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => FileFormat::Json,
            _ => FileFormat::Toml,
        }
    }
}

/// Read, parse and validate a plan file.
pub fn read_plan_file(path: &Path) -> Result<PlanFile> {
    let content = std::fs::read_to_string(path).map_err(|e| PlanError::Config {
        message: format!("Failed to read {}: {}", path.display(), e),
    })?;

    let file = match FileFormat::for_path(path) {
        FileFormat::Json => PlanFile::from_json_str(&content),
        FileFormat::Toml => PlanFile::from_toml_str(&content),
    }
    .map_err(|e| match e {
        PlanError::Config { message } => PlanError::Config {
            message: format!("Failed to parse {}: {}", path.display(), message),
        },
        other => other,
    })?;

    file.validate()?;
    Ok(file)
}

/// Write a plan file atomically: a temp file next to the target is synced
/// and then renamed into place.
pub fn write_plan_file(file: &PlanFile, path: &Path) -> Result<()> {
    use std::io::Write;

    let text = match FileFormat::for_path(path) {
        FileFormat::Json => file.to_json_string()?,
        FileFormat::Toml => file.to_toml_string()?,
    };

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "plan".to_string());
    let tmp_path = dir.join(format!(".{}.tmp", file_name));

    let mut tmp = std::fs::File::create(&tmp_path).map_err(|e| PlanError::Output {
        message: format!("Failed to create temp plan file at {}", tmp_path.display()),
        source: e,
    })?;
    tmp.write_all(text.as_bytes()).map_err(|e| PlanError::Output {
        message: format!("Failed to write temp plan file at {}", tmp_path.display()),
        source: e,
    })?;
    tmp.sync_all().map_err(|e| PlanError::Output {
        message: "Failed to sync plan file to disk".to_string(),
        source: e,
    })?;

    std::fs::rename(&tmp_path, path).map_err(|e| PlanError::Output {
        message: format!("Failed to rename {} → {}", tmp_path.display(), path.display()),
        source: e,
    })?;

    Ok(())
}

impl PlanFile {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PlanError::Config {
            message: e.to_string(),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| PlanError::Config {
            message: e.to_string(),
        })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PlanError::Config {
            message: format!("Failed to serialize plan file: {}", e),
        })
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PlanError::Config {
            message: format!("Failed to serialize plan file: {}", e),
        })
    }

    /// Check the constraints serde cannot express. Column-level checks are
    /// left to the builder.
    pub fn validate(&self) -> Result<()> {
        if self.plan.name.trim().is_empty() {
            return Err(PlanError::Config {
                message: "[plan] name must not be empty".to_string(),
            });
        }
        if self.plan.partitions == 0 {
            return Err(PlanError::Config {
                message: format!("Plan '{}': partitions must be at least 1", self.plan.name),
            });
        }
        if self.plan.seed_column.trim().is_empty() {
            return Err(PlanError::Config {
                message: format!("Plan '{}': seed_column must not be empty", self.plan.name),
            });
        }
        Ok(())
    }

    /// Replay the declarations through a builder.
    pub fn into_builder(self) -> Result<PlanBuilder> {
        let section = self.plan;
        let mut builder = PlanBuilder::new(section.rows, section.partitions, &section.name)
            .with_seed(section.seed)
            .with_seed_column(&section.seed_column);
        if section.id_output {
            builder = builder.with_id_output();
        }
        if section.allow_empty {
            builder = builder.allow_empty();
        }
        for declaration in self.columns {
            builder = builder.with_declaration(declaration)?;
        }
        Ok(builder)
    }

    pub fn build(self) -> Result<GenerationPlan> {
        self.into_builder()?.build()
    }
}
