//! Rating submission and per-module lookup

use crate::error::{ServiceError, ServiceResult};
use crate::models::{ModuleRatingSummary, Professor};
use crate::ratings::aggregate;
use crate::store::{Database, InsertOutcome};
use serde::Deserialize;
use tracing::{debug, info};

/// A JSON field that may arrive as a number or as a string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

impl FieldValue {
    fn is_blank(&self) -> bool {
        match self {
            FieldValue::Int(_) => false,
            FieldValue::Text(s) => s.trim().is_empty(),
        }
    }

    fn as_text(&self) -> String {
        match self {
            FieldValue::Int(n) => n.to_string(),
            FieldValue::Text(s) => s.trim().to_string(),
        }
    }

    fn as_int(&self, field: &str) -> ServiceResult<i64> {
        match self {
            FieldValue::Int(n) => Ok(*n),
            FieldValue::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| ServiceError::validation(format!("{} must be an integer.", field))),
        }
    }
}

/// Body of `POST /api/rate/` as sent by clients
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RateRequest {
    pub professor: Option<FieldValue>,
    pub module: Option<FieldValue>,
    pub year: Option<FieldValue>,
    pub semester: Option<FieldValue>,
    pub rating: Option<FieldValue>,
}

/// A rating request whose fields are present and numeric
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingSubmission {
    pub professor_id: i64,
    pub module_code: String,
    pub year: i32,
    pub semester: i32,
    pub value: i32,
}

fn to_i32(n: i64, field: &str) -> ServiceResult<i32> {
    i32::try_from(n).map_err(|_| ServiceError::validation(format!("{} is out of range.", field)))
}

impl RateRequest {
    pub fn into_submission(self) -> ServiceResult<RatingSubmission> {
        let (Some(professor), Some(module), Some(year), Some(semester), Some(rating)) =
            (self.professor, self.module, self.year, self.semester, self.rating)
        else {
            return Err(ServiceError::validation("All fields are required."));
        };
        if [&professor, &module, &year, &semester, &rating]
            .iter()
            .any(|f| f.is_blank())
        {
            return Err(ServiceError::validation("All fields are required."));
        }

        let value = rating.as_int("rating")?;
        if !(1..=5).contains(&value) {
            return Err(ServiceError::validation("Rating must be between 1 and 5."));
        }

        Ok(RatingSubmission {
            professor_id: professor.as_int("professor")?,
            module_code: module.as_text(),
            year: to_i32(year.as_int("year")?, "year")?,
            semester: to_i32(semester.as_int("semester")?, "semester")?,
            value: value as i32,
        })
    }
}

/// Validates and records ratings; answers per-module averages
#[derive(Clone)]
pub struct RatingService {
    db: Database,
}

impl RatingService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn professor(&self, professor_id: i64) -> ServiceResult<Professor> {
        self.db
            .get_professor(professor_id)?
            .ok_or_else(|| ServiceError::not_found("Professor not found."))
    }

    /// Record `user_id`'s rating. Returns the new rating id.
    pub fn submit_rating(&self, user_id: &str, submission: &RatingSubmission) -> ServiceResult<i64> {
        if !(1..=5).contains(&submission.value) {
            return Err(ServiceError::validation("Rating must be between 1 and 5."));
        }
        if submission.module_code.trim().is_empty() {
            return Err(ServiceError::validation("All fields are required."));
        }

        let professor = self.professor(submission.professor_id)?;

        let module = self
            .db
            .find_module(&submission.module_code, submission.year, submission.semester)?
            .ok_or_else(|| {
                ServiceError::not_found("Module not found for the specified year and semester.")
            })?;

        if !self.db.is_teaching(module.id, professor.id)? {
            return Err(ServiceError::InvalidState(format!(
                "Professor {} does not teach {} in {} (Semester {}).",
                professor.name, module.name, module.year, module.semester
            )));
        }

        match self
            .db
            .insert_rating(professor.id, module.id, user_id, submission.value)?
        {
            InsertOutcome::Inserted(id) => {
                info!(
                    rating_id = id,
                    professor_id = professor.id,
                    module = %module.code,
                    year = module.year,
                    semester = module.semester,
                    "Rating recorded"
                );
                Ok(id)
            }
            InsertOutcome::Duplicate => {
                debug!(professor_id = professor.id, module_id = module.id, "Duplicate rating rejected");
                Err(ServiceError::Conflict(
                    "You have already rated this professor for this module.".to_string(),
                ))
            }
        }
    }

    /// Average rating of a professor in the module(s) with `module_code`.
    ///
    /// The module is resolved by code alone; `year` and `semester` narrow
    /// which ratings are averaged and, when both name an existing instance,
    /// which instance's name is reported.
    pub fn average_rating(
        &self,
        professor_id: i64,
        module_code: &str,
        year: Option<i32>,
        semester: Option<i32>,
    ) -> ServiceResult<ModuleRatingSummary> {
        let professor = self.professor(professor_id)?;

        let instances = self.db.modules_by_code(module_code)?;
        let Some(first) = instances.first() else {
            return Err(ServiceError::not_found("Module not found."));
        };
        let module = match (year, semester) {
            (Some(year), Some(semester)) => instances
                .iter()
                .find(|m| m.year == year && m.semester == semester)
                .unwrap_or(first),
            _ => first,
        }
        .clone();

        let values = self
            .db
            .rating_values(professor.id, &module.code, year, semester)?;

        Ok(ModuleRatingSummary {
            professor_name: professor.name,
            professor_id: professor.id,
            module_name: module.name,
            module_code: module.code,
            year,
            semester,
            average_rating: aggregate::average_of(&values),
        })
    }
}
