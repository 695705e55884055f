//! Actuarial assumptions: mortality, expenses and forward curves

mod curve;
mod expense;
mod mortality;
pub mod loader;

pub use curve::ForwardCurve;
pub use expense::{ExpenseBasis, ExpenseTable};
pub use loader::LoadedAssumptions;
pub use mortality::MortalityTable;

use std::path::Path;

use crate::error::{ProjectionError, Result};

/// Container for all projection assumptions
///
/// Immutable once built and shared read-only by every projection run.
#[derive(Debug, Clone)]
pub struct Assumptions {
    pub mortality: MortalityTable,
    pub expenses: ExpenseTable,
    pub inflation_forward: ForwardCurve,
    pub yield_curve_forward: ForwardCurve,

    /// Flat rate charged on the gross liability, used as an asset proxy
    pub investment_expense_rate: f64,
}

impl Assumptions {
    pub fn new(
        mortality: MortalityTable,
        expenses: ExpenseTable,
        inflation_forward: ForwardCurve,
        yield_curve_forward: ForwardCurve,
        investment_expense_rate: f64,
    ) -> Result<Self> {
        if !investment_expense_rate.is_finite() || investment_expense_rate < 0.0 {
            return Err(ProjectionError::invalid(
                "investment_expense",
                format!("{} must be a non-negative rate", investment_expense_rate),
            ));
        }
        Ok(Self {
            mortality,
            expenses,
            inflation_forward,
            yield_curve_forward,
            investment_expense_rate,
        })
    }

    /// Load assumptions from CSV files in the default location (data/assumptions/)
    pub fn from_csv() -> Result<Self> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load assumptions from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let loaded = LoadedAssumptions::load_from(path)?;
        Self::from_loaded(loaded)
    }

    /// Validate raw tables and build the assumption set
    pub fn from_loaded(loaded: LoadedAssumptions) -> Result<Self> {
        let max_age = loaded.parameter("max_mortality_age")?;
        if !max_age.is_finite() || max_age < 0.0 || max_age.fract() != 0.0 {
            return Err(ProjectionError::invalid(
                "max_mortality_age",
                format!("{} is not a whole age", max_age),
            ));
        }
        let investment_expense = loaded.parameter("investment_expense")?;

        let mortality = MortalityTable::new(
            loaded.mortality_base_table,
            loaded.mortality_overlay,
            max_age as u32,
        )?;

        let mut expenses = ExpenseTable::new();
        for (product, basis) in loaded.expenses {
            expenses.insert(product, basis)?;
        }

        Self::new(
            mortality,
            expenses,
            ForwardCurve::new("inflation_forward", loaded.inflation_forward)?,
            ForwardCurve::new("yield_curve_forward", loaded.yield_curve_forward)?,
            investment_expense,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};

    fn loaded(max_age: f64) -> LoadedAssumptions {
        let mut parameters = HashMap::new();
        parameters.insert("max_mortality_age".to_string(), max_age);
        parameters.insert("investment_expense".to_string(), 0.001);

        LoadedAssumptions {
            mortality_base_table: BTreeMap::from([(65, (0.01, 0.008))]),
            mortality_overlay: HashMap::from([("annuity".to_string(), (1.0, 1.0))]),
            expenses: vec![(
                "annuity".to_string(),
                ExpenseBasis {
                    renewal_expense: 40.0,
                    inflation_margin: 0.01,
                },
            )],
            inflation_forward: vec![0.02; 13],
            yield_curve_forward: vec![0.04; 13],
            parameters,
        }
    }

    #[test]
    fn test_from_loaded() {
        let assumptions = Assumptions::from_loaded(loaded(110.0)).unwrap();
        assert_eq!(assumptions.mortality.max_mortality_age(), 110);
        assert_eq!(assumptions.expenses.get("annuity").unwrap().renewal_expense, 40.0);
        assert_eq!(assumptions.yield_curve_forward.len(), 13);
        assert_eq!(assumptions.investment_expense_rate, 0.001);
    }

    #[test]
    fn test_from_csv_reads_sample_directory() {
        let assumptions = Assumptions::from_csv().unwrap();
        assert_eq!(assumptions.mortality.max_mortality_age(), 120);
        assert_eq!(assumptions.investment_expense_rate, 0.0005);
        assert!(assumptions.expenses.get("annuity").is_ok());
    }

    #[test]
    fn test_fractional_max_age_rejected() {
        assert!(Assumptions::from_loaded(loaded(110.5)).is_err());
    }

    #[test]
    fn test_missing_parameter() {
        let mut raw = loaded(110.0);
        raw.parameters.remove("investment_expense");
        let err = Assumptions::from_loaded(raw).unwrap_err();
        assert!(err.to_string().contains("investment_expense"));
    }
}
