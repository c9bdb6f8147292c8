//! Averaging and labelling.
//!
//! Every aggregate goes through [`rounded_mean`]: arithmetic mean rounded
//! half-up, so 1.5 becomes 2 and 4.5 becomes 5.

use crate::models::{AverageRating, RatingLabel, NO_RATINGS_YET};

/// Mean of `count` ratings summing to `sum`, rounded half-up.
/// `None` when there is nothing to average.
pub fn rounded_mean(sum: i64, count: i64) -> Option<u8> {
    if count <= 0 {
        return None;
    }
    // floor((sum / count) + 1/2) in integer arithmetic; ratings are positive
    let rounded = (2 * sum + count) / (2 * count);
    u8::try_from(rounded).ok()
}

pub fn average_of(values: &[i32]) -> AverageRating {
    let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
    match rounded_mean(sum, values.len() as i64) {
        Some(score) => AverageRating::Score(score),
        None => AverageRating::NoRatings,
    }
}

pub fn from_totals(sum: i64, count: i64) -> AverageRating {
    rounded_mean(sum, count)
        .map(AverageRating::Score)
        .unwrap_or(AverageRating::NoRatings)
}

/// "⭐⭐⭐⭐ (Smart)", or "No ratings yet"
pub fn describe(average: AverageRating) -> String {
    match average {
        AverageRating::Score(score) => match RatingLabel::from_score(score) {
            Some(label) => format!("{} ({})", "⭐".repeat(score as usize), label.as_str()),
            None => score.to_string(),
        },
        AverageRating::NoRatings => NO_RATINGS_YET.to_string(),
    }
}
