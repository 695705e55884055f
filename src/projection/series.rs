//! Identifiers for every time series produced by a projection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// A named, time-indexed series
///
/// Scalar series are evaluated one (series, t) cell at a time by recurrence.
/// Array series are materialised for the whole horizon at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SeriesId {
    CurrentAge,
    DeathRate,
    ExpectedNumberOfPoliciesIf,
    WithinGuaranteePeriod,
    AnnuityPaymentPerPolicy,
    ExpectedAnnuityPayment,
    RenewalExpensePerPolicy,
    ExpectedRenewalExpensePayment,
    InvestmentExpensePayment,
    WithinGuaranteePeriodArray,
    DiscountRate,
    EpvAnnuityBenefit,
    EpvRenewalExpenses,
    EpvInvestmentExpenses,
    EpvTotalExpenses,
    EpvLiabilityGross,
    EpvLiability,
}

impl SeriesId {
    pub const ALL: [SeriesId; 17] = [
        SeriesId::CurrentAge,
        SeriesId::DeathRate,
        SeriesId::ExpectedNumberOfPoliciesIf,
        SeriesId::WithinGuaranteePeriod,
        SeriesId::AnnuityPaymentPerPolicy,
        SeriesId::ExpectedAnnuityPayment,
        SeriesId::RenewalExpensePerPolicy,
        SeriesId::ExpectedRenewalExpensePayment,
        SeriesId::InvestmentExpensePayment,
        SeriesId::WithinGuaranteePeriodArray,
        SeriesId::DiscountRate,
        SeriesId::EpvAnnuityBenefit,
        SeriesId::EpvRenewalExpenses,
        SeriesId::EpvInvestmentExpenses,
        SeriesId::EpvTotalExpenses,
        SeriesId::EpvLiabilityGross,
        SeriesId::EpvLiability,
    ];

    /// Series defined cell by cell through a recurrence in t
    pub const SCALAR: [SeriesId; 9] = [
        SeriesId::CurrentAge,
        SeriesId::DeathRate,
        SeriesId::ExpectedNumberOfPoliciesIf,
        SeriesId::WithinGuaranteePeriod,
        SeriesId::AnnuityPaymentPerPolicy,
        SeriesId::ExpectedAnnuityPayment,
        SeriesId::RenewalExpensePerPolicy,
        SeriesId::ExpectedRenewalExpensePayment,
        SeriesId::InvestmentExpensePayment,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Position in `ALL`, used as the cache row
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_array(self) -> bool {
        !Self::SCALAR.contains(&self)
    }

    /// Stable reporting name
    pub fn name(self) -> &'static str {
        match self {
            SeriesId::CurrentAge => "current_age",
            SeriesId::DeathRate => "death_rate",
            SeriesId::ExpectedNumberOfPoliciesIf => "expected_number_of_policies_IF",
            SeriesId::WithinGuaranteePeriod => "within_guarantee_period",
            SeriesId::AnnuityPaymentPerPolicy => "annuity_payment_per_policy",
            SeriesId::ExpectedAnnuityPayment => "expected_annuity_payment",
            SeriesId::RenewalExpensePerPolicy => "renewal_expense_per_policy",
            SeriesId::ExpectedRenewalExpensePayment => "expected_renewal_expense_payment",
            SeriesId::InvestmentExpensePayment => "investment_expense_payment",
            SeriesId::WithinGuaranteePeriodArray => "within_guarantee_period_array",
            SeriesId::DiscountRate => "discount_rate",
            SeriesId::EpvAnnuityBenefit => "EPV_annuity_benefit",
            SeriesId::EpvRenewalExpenses => "EPV_renewal_expenses",
            SeriesId::EpvInvestmentExpenses => "EPV_investment_expenses",
            SeriesId::EpvTotalExpenses => "EPV_total_expenses",
            SeriesId::EpvLiabilityGross => "EPV_liability_gross",
            SeriesId::EpvLiability => "EPV_liability",
        }
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SeriesId {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|series| series.name() == s)
            .ok_or_else(|| ProjectionError::UnknownSeries(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for series in SeriesId::ALL {
            assert_eq!(series.name().parse::<SeriesId>().unwrap(), series);
        }
        assert!("liability_net".parse::<SeriesId>().is_err());
    }

    #[test]
    fn test_index_matches_position() {
        for (idx, series) in SeriesId::ALL.iter().enumerate() {
            assert_eq!(series.index(), idx);
        }
    }

    #[test]
    fn test_array_classification() {
        assert!(!SeriesId::DeathRate.is_array());
        assert!(SeriesId::DiscountRate.is_array());
        assert!(SeriesId::EpvLiability.is_array());
        assert_eq!(SeriesId::ALL.iter().filter(|s| s.is_array()).count(), 8);
    }
}
