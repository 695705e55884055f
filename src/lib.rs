//! Annuity Reserving - expected present value projection for in-payment annuities
//!
//! This library provides:
//! - Monthly recurrence model for age, mortality, survivorship and guarantee status
//! - Escalating annuity payments and renewal/investment expenses
//! - Discounting against a forward yield curve and the resulting reserve
//! - CSV loaders for inforce policies and assumption tables
//!
//! Each projection owns its memo table, so independent policies can be
//! projected in parallel against one shared `Assumptions`.

pub mod assumptions;
pub mod error;
pub mod policy;
pub mod projection;

// Re-export commonly used types
pub use assumptions::{Assumptions, ExpenseTable, ForwardCurve, MortalityTable};
pub use error::{ProjectionError, Result};
pub use policy::{Escalation, Gender, PaymentFrequency, Policy};
pub use projection::{ProjectionConfig, ProjectionEngine, ProjectionResult, SeriesId};
