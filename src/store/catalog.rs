//! Professors, module instances and the "teaches" relation

use super::Database;
use crate::models::{Module, Professor};
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

/// One row of the teaches relation with both sides resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub module: Module,
    pub professor: Professor,
}

fn module_from_row(row: &Row<'_>) -> rusqlite::Result<Module> {
    Ok(Module {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        year: row.get(3)?,
        semester: row.get(4)?,
    })
}

impl Database {
    /// Return the professor with this name, inserting it if missing
    pub fn ensure_professor(&self, name: &str) -> Result<Professor> {
        self.with_conn(|conn| {
            let inserted = conn
                .execute(
                    "INSERT OR IGNORE INTO professors (name) VALUES (?1)",
                    params![name],
                )
                .context("Failed to insert professor")?;
            if inserted > 0 {
                info!("Created professor: {}", name);
            }

            let professor = conn.query_row(
                "SELECT id, name FROM professors WHERE name = ?1",
                params![name],
                |row| {
                    Ok(Professor {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )?;
            Ok(professor)
        })
    }

    /// Return the module instance (code, year, semester), inserting it if missing.
    ///
    /// An existing instance keeps its stored name.
    pub fn ensure_module(&self, code: &str, name: &str, year: i32, semester: i32) -> Result<Module> {
        if !(1..=2).contains(&semester) {
            anyhow::bail!("Semester must be 1 or 2, got {}", semester);
        }

        self.with_conn(|conn| {
            let inserted = conn
                .execute(
                    "INSERT OR IGNORE INTO modules (code, name, year, semester) VALUES (?1, ?2, ?3, ?4)",
                    params![code, name, year, semester],
                )
                .context("Failed to insert module")?;
            if inserted > 0 {
                info!("Created module: {} {} ({} S{})", code, name, year, semester);
            }

            let module = conn.query_row(
                "SELECT id, code, name, year, semester FROM modules
                 WHERE code = ?1 AND year = ?2 AND semester = ?3",
                params![code, year, semester],
                module_from_row,
            )?;
            Ok(module)
        })
    }

    /// Record that a professor teaches a module instance (no-op if already recorded)
    pub fn assign_professor(&self, module_id: i64, professor_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO module_professors (module_id, professor_id) VALUES (?1, ?2)",
                params![module_id, professor_id],
            )
            .context("Failed to assign professor to module")?;
            Ok(())
        })
    }

    pub fn get_professor(&self, id: i64) -> Result<Option<Professor>> {
        self.with_conn(|conn| {
            let professor = conn
                .query_row(
                    "SELECT id, name FROM professors WHERE id = ?1",
                    params![id],
                    |row| {
                        Ok(Professor {
                            id: row.get(0)?,
                            name: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(professor)
        })
    }

    /// Exact lookup of a module instance
    pub fn find_module(&self, code: &str, year: i32, semester: i32) -> Result<Option<Module>> {
        self.with_conn(|conn| {
            let module = conn
                .query_row(
                    "SELECT id, code, name, year, semester FROM modules
                     WHERE code = ?1 AND year = ?2 AND semester = ?3",
                    params![code, year, semester],
                    module_from_row,
                )
                .optional()?;
            Ok(module)
        })
    }

    /// Every instance sharing a module code, oldest first
    pub fn modules_by_code(&self, code: &str) -> Result<Vec<Module>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT id, code, name, year, semester FROM modules WHERE code = ?1 ORDER BY id",
            )?;
            let modules = stmt
                .query_map(params![code], module_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(modules)
        })
    }

    pub fn is_teaching(&self, module_id: i64, professor_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM module_professors WHERE module_id = ?1 AND professor_id = ?2",
                    params![module_id, professor_id],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn list_professors(&self) -> Result<Vec<Professor>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached("SELECT id, name FROM professors ORDER BY id")?;
            let professors = stmt
                .query_map([], |row| {
                    Ok(Professor {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(professors)
        })
    }

    pub fn list_modules(&self) -> Result<Vec<Module>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare_cached("SELECT id, code, name, year, semester FROM modules ORDER BY id")?;
            let modules = stmt
                .query_map([], module_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(modules)
        })
    }

    /// The whole teaches relation, ordered by module then professor
    pub fn assignments(&self) -> Result<Vec<Assignment>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT m.id, m.code, m.name, m.year, m.semester, p.id, p.name
                 FROM module_professors mp
                 JOIN modules m ON m.id = mp.module_id
                 JOIN professors p ON p.id = mp.professor_id
                 ORDER BY m.id, p.id",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(Assignment {
                        module: module_from_row(row)?,
                        professor: Professor {
                            id: row.get(5)?,
                            name: row.get(6)?,
                        },
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_professor_is_idempotent() {
        let db = Database::in_memory().unwrap();
        let a = db.ensure_professor("Dr. A").unwrap();
        let again = db.ensure_professor("Dr. A").unwrap();
        assert_eq!(a, again);
        assert_eq!(db.list_professors().unwrap().len(), 1);
    }

    #[test]
    fn test_module_instances_share_code() {
        let db = Database::in_memory().unwrap();
        let first = db.ensure_module("CS3021", "Compilers", 2023, 2).unwrap();
        let second = db.ensure_module("CS3021", "Compilers", 2024, 1).unwrap();
        assert_ne!(first.id, second.id);

        let instances = db.modules_by_code("CS3021").unwrap();
        assert_eq!(instances, vec![first.clone(), second]);

        assert_eq!(db.find_module("CS3021", 2023, 2).unwrap(), Some(first));
        assert_eq!(db.find_module("CS3021", 2022, 1).unwrap(), None);
    }

    #[test]
    fn test_invalid_semester_rejected() {
        let db = Database::in_memory().unwrap();
        assert!(db.ensure_module("CS1", "Intro", 2024, 0).is_err());
    }

    #[test]
    fn test_assignment_is_idempotent() {
        let db = Database::in_memory().unwrap();
        let prof = db.ensure_professor("Dr. A").unwrap();
        let module = db.ensure_module("CS3021", "Compilers", 2024, 1).unwrap();

        assert!(!db.is_teaching(module.id, prof.id).unwrap());
        db.assign_professor(module.id, prof.id).unwrap();
        db.assign_professor(module.id, prof.id).unwrap();
        assert!(db.is_teaching(module.id, prof.id).unwrap());

        let assignments = db.assignments().unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].professor, prof);
        assert_eq!(assignments[0].module, module);
    }

    #[test]
    fn test_unknown_professor() {
        let db = Database::in_memory().unwrap();
        assert!(db.get_professor(42).unwrap().is_none());
    }
}
