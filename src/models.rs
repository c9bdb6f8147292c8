use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Text reported wherever an aggregate has no ratings to average.
pub const NO_RATINGS_YET: &str = "No ratings yet";

/// A professor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professor {
    pub id: i64,
    pub name: String,
}

/// A module instance: one (code, year, semester) offering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub year: i32,
    pub semester: i32,
}

/// A stored rating row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: i64,
    pub professor_id: i64,
    pub module_id: i64,
    pub user_id: String,
    pub value: i32,
    pub created_at: String,
}

/// Professor as listed inside a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessorRef {
    pub id: i64,
    pub name: String,
}

/// Module as listed under a professor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRef {
    pub code: String,
    pub name: String,
    pub year: i32,
    pub semester: i32,
}

/// A module instance with its full professor roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleListing {
    pub code: String,
    pub name: String,
    pub year: i32,
    pub semester: i32,
    pub professors: Vec<ProfessorRef>,
}

/// A professor with the overall rating across every module they were rated in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessorSummary {
    pub id: i64,
    pub name: String,
    /// Display string: stars and label, or "No ratings yet"
    pub average_rating: String,
    pub average_score: Option<u8>,
    pub label: Option<RatingLabel>,
    pub modules: Vec<ModuleRef>,
}

/// Answer of the per-module rating lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRatingSummary {
    pub professor_name: String,
    pub professor_id: i64,
    pub module_name: String,
    pub module_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<i32>,
    pub average_rating: AverageRating,
}

/// Rounded mean of a set of ratings, or the "no ratings" sentinel.
///
/// Serializes as a bare integer or as the string "No ratings yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AverageRating {
    Score(u8),
    NoRatings,
}

impl AverageRating {
    pub fn score(&self) -> Option<u8> {
        match self {
            AverageRating::Score(s) => Some(*s),
            AverageRating::NoRatings => None,
        }
    }
}

impl Serialize for AverageRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AverageRating::Score(s) => serializer.serialize_u8(*s),
            AverageRating::NoRatings => serializer.serialize_str(NO_RATINGS_YET),
        }
    }
}

impl<'de> Deserialize<'de> for AverageRating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Score(u8),
            Text(String),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Score(s) => Ok(AverageRating::Score(s)),
            Wire::Text(t) if t == NO_RATINGS_YET => Ok(AverageRating::NoRatings),
            Wire::Text(t) => Err(serde::de::Error::custom(format!(
                "unexpected average rating: {}",
                t
            ))),
        }
    }
}

/// Qualitative label for a rounded score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatingLabel {
    Unbearable,
    Bad,
    Decent,
    Smart,
    Excellent,
}

impl RatingLabel {
    pub fn from_score(score: u8) -> Option<Self> {
        match score {
            1 => Some(RatingLabel::Unbearable),
            2 => Some(RatingLabel::Bad),
            3 => Some(RatingLabel::Decent),
            4 => Some(RatingLabel::Smart),
            5 => Some(RatingLabel::Excellent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RatingLabel::Unbearable => "Unbearable",
            RatingLabel::Bad => "Bad",
            RatingLabel::Decent => "Decent",
            RatingLabel::Smart => "Smart",
            RatingLabel::Excellent => "Excellent",
        }
    }
}
