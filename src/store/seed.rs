//! Catalog fixtures loaded from TOML
//!
//! ```toml
//! [[professors]]
//! name = "Dr. A"
//!
//! [[modules]]
//! code = "CS3021"
//! name = "Compilers"
//! year = 2024
//! semester = 1
//! professors = ["Dr. A"]
//! ```

use super::Database;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub professors: Vec<SeedProfessor>,
    #[serde(default)]
    pub modules: Vec<SeedModule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedProfessor {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedModule {
    pub code: String,
    pub name: String,
    pub year: i32,
    pub semester: i32,
    /// Names of the professors teaching this instance
    #[serde(default)]
    pub professors: Vec<String>,
}

/// Counts of what a seed run touched (created or already present)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub professors: usize,
    pub modules: usize,
    pub assignments: usize,
}

impl SeedFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse seed file {}", path.display()))
    }
}

impl Database {
    /// Apply a seed file. Re-running the same file changes nothing.
    pub fn apply_seed(&self, seed: &SeedFile) -> Result<SeedReport> {
        let mut report = SeedReport::default();

        for professor in &seed.professors {
            self.ensure_professor(professor.name.trim())?;
            report.professors += 1;
        }

        for entry in &seed.modules {
            let module = self
                .ensure_module(entry.code.trim(), entry.name.trim(), entry.year, entry.semester)
                .with_context(|| format!("Invalid module {} in seed", entry.code))?;
            report.modules += 1;

            for name in &entry.professors {
                let professor = self.ensure_professor(name.trim())?;
                self.assign_professor(module.id, professor.id)?;
                report.assignments += 1;
            }
        }

        info!(
            "Seed applied: {} professors, {} modules, {} assignments",
            report.professors, report.modules, report.assignments
        );
        Ok(report)
    }
}
