//! Projection output structures

use std::io::Write;

use serde::{Deserialize, Serialize};

use super::series::SeriesId;
use crate::error::{ProjectionError, Result};

/// Every series value for one projection month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    pub t: usize,
    pub current_age: u32,
    pub death_rate: f64,
    #[serde(rename = "expected_number_of_policies_IF")]
    pub expected_number_of_policies_if: f64,
    pub within_guarantee_period: u8,
    pub within_guarantee_period_array: u8,
    pub annuity_payment_per_policy: f64,
    pub expected_annuity_payment: f64,
    pub renewal_expense_per_policy: f64,
    pub expected_renewal_expense_payment: f64,
    pub investment_expense_payment: f64,
    pub discount_rate: f64,
    #[serde(rename = "EPV_annuity_benefit")]
    pub epv_annuity_benefit: f64,
    #[serde(rename = "EPV_renewal_expenses")]
    pub epv_renewal_expenses: f64,
    #[serde(rename = "EPV_investment_expenses")]
    pub epv_investment_expenses: f64,
    #[serde(rename = "EPV_total_expenses")]
    pub epv_total_expenses: f64,
    #[serde(rename = "EPV_liability_gross")]
    pub epv_liability_gross: f64,
    #[serde(rename = "EPV_liability")]
    pub epv_liability: f64,
}

impl ProjectionRow {
    /// Value of a series in this row
    pub fn get(&self, series: SeriesId) -> f64 {
        match series {
            SeriesId::CurrentAge => f64::from(self.current_age),
            SeriesId::DeathRate => self.death_rate,
            SeriesId::ExpectedNumberOfPoliciesIf => self.expected_number_of_policies_if,
            SeriesId::WithinGuaranteePeriod => f64::from(self.within_guarantee_period),
            SeriesId::WithinGuaranteePeriodArray => {
                f64::from(self.within_guarantee_period_array)
            }
            SeriesId::AnnuityPaymentPerPolicy => self.annuity_payment_per_policy,
            SeriesId::ExpectedAnnuityPayment => self.expected_annuity_payment,
            SeriesId::RenewalExpensePerPolicy => self.renewal_expense_per_policy,
            SeriesId::ExpectedRenewalExpensePayment => self.expected_renewal_expense_payment,
            SeriesId::InvestmentExpensePayment => self.investment_expense_payment,
            SeriesId::DiscountRate => self.discount_rate,
            SeriesId::EpvAnnuityBenefit => self.epv_annuity_benefit,
            SeriesId::EpvRenewalExpenses => self.epv_renewal_expenses,
            SeriesId::EpvInvestmentExpenses => self.epv_investment_expenses,
            SeriesId::EpvTotalExpenses => self.epv_total_expenses,
            SeriesId::EpvLiabilityGross => self.epv_liability_gross,
            SeriesId::EpvLiability => self.epv_liability,
        }
    }
}

/// Complete projection result for one policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Policy identifier
    pub policy_id: u32,

    /// Final projection month T
    pub horizon_months: usize,

    /// Reserve at the valuation date, EPV_liability(0)
    pub liability: f64,

    /// One row per month t = 0..=T
    pub rows: Vec<ProjectionRow>,
}

impl ProjectionResult {
    /// Value of a series at month t
    pub fn value(&self, series: SeriesId, t: usize) -> Result<f64> {
        self.rows
            .get(t)
            .map(|row| row.get(series))
            .ok_or(ProjectionError::TimeOutOfRange {
                series,
                t,
                horizon: self.horizon_months,
            })
    }

    /// Value of a series, addressed by its reporting name, at month t
    pub fn value_by_name(&self, name: &str, t: usize) -> Result<f64> {
        self.value(name.parse::<SeriesId>()?, t)
    }

    /// All values of a series over the horizon
    pub fn series(&self, series: SeriesId) -> Vec<f64> {
        self.rows.iter().map(|row| row.get(series)).collect()
    }

    /// Write one CSV line per month with a header row
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(t: usize, epv: f64) -> ProjectionRow {
        ProjectionRow {
            t,
            current_age: 70,
            death_rate: 0.001,
            expected_number_of_policies_if: 0.99,
            within_guarantee_period: 1,
            within_guarantee_period_array: 1,
            annuity_payment_per_policy: 100.0,
            expected_annuity_payment: 100.0,
            renewal_expense_per_policy: 0.0,
            expected_renewal_expense_payment: 0.0,
            investment_expense_payment: 0.5,
            discount_rate: 1.003,
            epv_annuity_benefit: epv,
            epv_renewal_expenses: 10.0,
            epv_investment_expenses: 1.0,
            epv_total_expenses: 11.0,
            epv_liability_gross: epv + 10.0,
            epv_liability: epv + 11.0,
        }
    }

    fn result() -> ProjectionResult {
        ProjectionResult {
            policy_id: 3,
            horizon_months: 1,
            liability: 1011.0,
            rows: vec![row(0, 1000.0), row(1, 950.0)],
        }
    }

    #[test]
    fn test_value_lookup() {
        let result = result();
        assert_eq!(result.value(SeriesId::EpvLiability, 1).unwrap(), 961.0);
        assert_eq!(result.value_by_name("current_age", 0).unwrap(), 70.0);
        assert_eq!(result.value_by_name("within_guarantee_period_array", 0).unwrap(), 1.0);
        assert!(result.value(SeriesId::DeathRate, 2).is_err());
        assert!(result.value_by_name("premium", 0).is_err());
    }

    #[test]
    fn test_series_extraction() {
        assert_eq!(result().series(SeriesId::EpvAnnuityBenefit), vec![1000.0, 950.0]);
    }

    #[test]
    fn test_csv_header_uses_series_names() {
        let mut buffer = Vec::new();
        result().write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let header = text.lines().next().unwrap();
        assert!(header.starts_with("t,current_age,death_rate,expected_number_of_policies_IF"));
        assert!(header.contains("within_guarantee_period,within_guarantee_period_array,"));
        assert!(header.ends_with("EPV_liability_gross,EPV_liability"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_json_round_trip_keeps_liability() {
        let json = serde_json::to_string(&result()).unwrap();
        assert!(json.contains("\"EPV_liability\""));
        let parsed: ProjectionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.liability, 1011.0);
    }
}
