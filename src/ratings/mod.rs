//! Rating domain: submission rules, per-module averages and listings

pub mod aggregate;
pub mod query;
pub mod service;

pub use query::QueryService;
pub use service::{RateRequest, RatingService, RatingSubmission};
