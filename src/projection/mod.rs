//! Projection engine for single-policy annuity reserve calculations
//!
//! The model is demand driven: asking for any (series, t) value resolves the
//! cells it depends on and memoises each of them once per run.

mod cache;
mod discount;
mod engine;
mod model;
mod result;
mod series;

pub use cache::SeriesCache;
pub use discount::{discount, monthly_factor};
pub use engine::{ProjectionConfig, ProjectionEngine};
pub use model::AnnuityModel;
pub use result::{ProjectionResult, ProjectionRow};
pub use series::SeriesId;
