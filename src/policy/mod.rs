//! Policy data structures and inforce loading

mod data;
pub mod loader;

pub use data::{Escalation, Gender, PaymentFrequency, Policy};
pub use loader::{load_policies, load_policies_from_reader};
