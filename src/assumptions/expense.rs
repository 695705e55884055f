//! Renewal expense assumptions keyed by product

use std::collections::HashMap;

use log::warn;

use crate::error::{ProjectionError, Result};

/// Renewal expense basis for one product
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpenseBasis {
    /// Annual renewal expense per policy in the first projection year
    pub renewal_expense: f64,

    /// Margin added to forward inflation when the expense escalates
    pub inflation_margin: f64,
}

/// Expense table keyed by product name
#[derive(Debug, Clone, Default)]
pub struct ExpenseTable {
    entries: HashMap<String, ExpenseBasis>,
}

impl ExpenseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the basis for a product
    pub fn insert(&mut self, product: impl Into<String>, basis: ExpenseBasis) -> Result<()> {
        let product = product.into();
        if !basis.renewal_expense.is_finite() || basis.renewal_expense < 0.0 {
            return Err(ProjectionError::invalid(
                "expense.renewal_expense",
                format!("{} for '{}' must be non-negative", basis.renewal_expense, product),
            ));
        }
        if !basis.inflation_margin.is_finite() {
            return Err(ProjectionError::invalid(
                "expense.inflation_margin",
                format!("margin for '{}' must be finite", product),
            ));
        }
        if let Some(previous) = self.entries.insert(product.clone(), basis) {
            warn!(
                "Duplicate expense basis for '{}', replacing {:?}",
                product, previous
            );
        }
        Ok(())
    }

    pub fn get(&self, product: &str) -> Result<ExpenseBasis> {
        self.entries
            .get(product)
            .copied()
            .ok_or_else(|| ProjectionError::missing("expense", product))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_product() {
        let mut table = ExpenseTable::new();
        table
            .insert(
                "annuity",
                ExpenseBasis {
                    renewal_expense: 50.0,
                    inflation_margin: 0.005,
                },
            )
            .unwrap();

        assert_eq!(table.get("annuity").unwrap().renewal_expense, 50.0);
        assert!(table.get("term").is_err());
    }

    #[test]
    fn test_duplicate_product_keeps_last() {
        let mut table = ExpenseTable::new();
        for renewal_expense in [50.0, 65.0] {
            let basis = ExpenseBasis {
                renewal_expense,
                inflation_margin: 0.005,
            };
            table.insert("annuity", basis).unwrap();
        }
        assert_eq!(table.get("annuity").unwrap().renewal_expense, 65.0);
    }

    #[test]
    fn test_negative_expense_rejected() {
        let mut table = ExpenseTable::new();
        let basis = ExpenseBasis {
            renewal_expense: -1.0,
            inflation_margin: 0.0,
        };
        assert!(table.insert("annuity", basis).is_err());
    }
}
