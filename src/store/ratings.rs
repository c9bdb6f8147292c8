//! Rating rows

use super::{is_unique_violation, Database};
#[cfg(test)]
use crate::models::Rating;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::params;
use std::collections::HashMap;

/// Result of attempting to store a rating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(i64),
    /// The (professor, module, user) triple already has a rating
    Duplicate,
}

/// Sum and count of one professor's ratings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingTotals {
    pub sum: i64,
    pub count: i64,
}

impl Database {
    /// Insert a rating. Duplicates are rejected by the table's unique
    /// constraint, not by a prior lookup.
    pub fn insert_rating(
        &self,
        professor_id: i64,
        module_id: i64,
        user_id: &str,
        value: i32,
    ) -> Result<InsertOutcome> {
        self.with_conn(|conn| {
            let result = conn.execute(
                "INSERT INTO ratings (professor_id, module_id, user_id, value, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    professor_id,
                    module_id,
                    user_id,
                    value,
                    Utc::now().to_rfc3339()
                ],
            );

            match result {
                Ok(_) => Ok(InsertOutcome::Inserted(conn.last_insert_rowid())),
                Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Duplicate),
                Err(e) => Err(e).context("Failed to insert rating"),
            }
        })
    }

    /// Values of a professor's ratings in modules with `code`, optionally
    /// narrowed to one year and/or semester
    pub fn rating_values(
        &self,
        professor_id: i64,
        code: &str,
        year: Option<i32>,
        semester: Option<i32>,
    ) -> Result<Vec<i32>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT r.value
                 FROM ratings r
                 JOIN modules m ON m.id = r.module_id
                 WHERE r.professor_id = ?1
                   AND m.code = ?2
                   AND (?3 IS NULL OR m.year = ?3)
                   AND (?4 IS NULL OR m.semester = ?4)",
            )?;
            let values = stmt
                .query_map(params![professor_id, code, year, semester], |row| row.get(0))?
                .collect::<Result<Vec<i32>, _>>()?;
            Ok(values)
        })
    }

    /// Sum and count of ratings per professor, across all modules.
    /// Professors with no ratings are absent from the map.
    pub fn rating_totals_by_professor(&self) -> Result<HashMap<i64, RatingTotals>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT professor_id, SUM(value), COUNT(*) FROM ratings GROUP BY professor_id",
            )?;
            let totals = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        RatingTotals {
                            sum: row.get(1)?,
                            count: row.get(2)?,
                        },
                    ))
                })?
                .collect::<Result<HashMap<_, _>, _>>()?;
            Ok(totals)
        })
    }

    /// Every rating a professor has received, oldest first
    #[cfg(test)]
    pub(crate) fn ratings_for_professor(&self, professor_id: i64) -> Result<Vec<Rating>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT id, professor_id, module_id, user_id, value, created_at
                 FROM ratings WHERE professor_id = ?1 ORDER BY id",
            )?;
            let ratings = stmt
                .query_map(params![professor_id], |row| {
                    Ok(Rating {
                        id: row.get(0)?,
                        professor_id: row.get(1)?,
                        module_id: row.get(2)?,
                        user_id: row.get(3)?,
                        value: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ratings)
        })
    }
}
