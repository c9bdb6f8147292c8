//! Catalog listings with aggregate ratings

use crate::error::ServiceResult;
use crate::models::{
    AverageRating, ModuleListing, ModuleRef, ProfessorRef, ProfessorSummary, RatingLabel,
};
use crate::ratings::aggregate;
use crate::store::{Assignment, Database};
use std::collections::HashMap;

/// Reverse views of the teaches relation, rebuilt for each request
#[derive(Debug, Default)]
struct TeachingIndex {
    roster_by_module: HashMap<i64, Vec<ProfessorRef>>,
    modules_by_professor: HashMap<i64, Vec<ModuleRef>>,
}

impl TeachingIndex {
    fn build(assignments: Vec<Assignment>) -> Self {
        let mut index = Self::default();
        for Assignment { module, professor } in assignments {
            index
                .modules_by_professor
                .entry(professor.id)
                .or_default()
                .push(ModuleRef {
                    code: module.code,
                    name: module.name,
                    year: module.year,
                    semester: module.semester,
                });
            index
                .roster_by_module
                .entry(module.id)
                .or_default()
                .push(ProfessorRef {
                    id: professor.id,
                    name: professor.name,
                });
        }
        index
    }
}

/// Read-only listings over the catalog
#[derive(Clone)]
pub struct QueryService {
    db: Database,
}

impl QueryService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Every module instance with its professors
    pub fn list_modules(&self) -> ServiceResult<Vec<ModuleListing>> {
        let modules = self.db.list_modules()?;
        let mut index = TeachingIndex::build(self.db.assignments()?);

        let listings = modules
            .into_iter()
            .map(|m| ModuleListing {
                professors: index.roster_by_module.remove(&m.id).unwrap_or_default(),
                code: m.code,
                name: m.name,
                year: m.year,
                semester: m.semester,
            })
            .collect();
        Ok(listings)
    }

    /// Every professor with the rounded mean of all their ratings and the
    /// modules they teach
    pub fn list_professors_with_ratings(&self) -> ServiceResult<Vec<ProfessorSummary>> {
        let professors = self.db.list_professors()?;
        let totals = self.db.rating_totals_by_professor()?;
        let mut index = TeachingIndex::build(self.db.assignments()?);

        let summaries = professors
            .into_iter()
            .map(|p| {
                let average = totals
                    .get(&p.id)
                    .map(|t| aggregate::from_totals(t.sum, t.count))
                    .unwrap_or(AverageRating::NoRatings);
                let score = average.score();

                ProfessorSummary {
                    average_rating: aggregate::describe(average),
                    average_score: score,
                    label: score.and_then(RatingLabel::from_score),
                    modules: index.modules_by_professor.remove(&p.id).unwrap_or_default(),
                    id: p.id,
                    name: p.name,
                }
            })
            .collect();
        Ok(summaries)
    }
}
