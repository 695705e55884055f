//! Recurrence definitions for the annuity reserve projection
//!
//! Every series is a function of the month index t = 0..=T. Scalar series are
//! defined by recurrences on their own earlier values (t-1 or t-12) or on other
//! series at t or earlier; each (series, t) cell is computed at most once and
//! served from the run's `SeriesCache` afterwards. Array series (discount
//! factors and present values) are materialised for the whole horizon at once.
//!
//! Dependency order, leaf first:
//! - current_age, death_rate
//! - expected_number_of_policies_IF, within_guarantee_period
//! - annuity and renewal expense payments
//! - discount_rate and the EPV_* aggregates
//! - investment_expense_payment (depends on EPV_liability_gross)

use log::trace;

use super::cache::SeriesCache;
use super::discount::{discount, monthly_factor};
use super::engine::ProjectionConfig;
use super::series::SeriesId;
use crate::assumptions::{Assumptions, ExpenseBasis};
use crate::error::Result;
use crate::policy::{Escalation, Policy};

/// Lazily evaluated projection for one policy
///
/// Holds borrowed, immutable inputs and an owned memo table. Create one model
/// per policy; it is discarded once the results have been collected.
pub struct AnnuityModel<'a> {
    policy: &'a Policy,
    assumptions: &'a Assumptions,

    /// Mortality overlay resolved for the policy's product and gender
    overlay: f64,

    /// Renewal expense basis resolved for the policy's product
    expense: ExpenseBasis,

    cache: SeriesCache,
}

impl<'a> AnnuityModel<'a> {
    /// Build a model, resolving product-keyed assumptions up front
    pub fn new(
        policy: &'a Policy,
        assumptions: &'a Assumptions,
        config: &ProjectionConfig,
    ) -> Result<Self> {
        policy.validate()?;
        let overlay = assumptions
            .mortality
            .overlay_factor(&config.product, policy.gender)?;
        let expense = assumptions.expenses.get(&config.product)?;

        Ok(Self {
            policy,
            assumptions,
            overlay,
            expense,
            cache: SeriesCache::new(config.horizon_months),
        })
    }

    /// Final month index T
    pub fn horizon(&self) -> usize {
        self.cache.horizon()
    }

    /// Number of cells computed so far
    pub fn evaluations(&self) -> usize {
        self.cache.evaluations()
    }

    /// Serve a scalar cell from the cache or compute and store it
    fn memo<F>(&mut self, series: SeriesId, t: usize, compute: F) -> Result<f64>
    where
        F: FnOnce(&mut Self) -> Result<f64>,
    {
        if let Some(value) = self.cache.begin(series, t)? {
            return Ok(value);
        }
        match compute(self) {
            Ok(value) => self.cache.complete(series, t, value),
            Err(err) => {
                self.cache.abandon(series, t);
                Err(err)
            }
        }
    }

    /// Serve an array series from the cache or build and store it
    fn materialise<F>(&mut self, series: SeriesId, build: F) -> Result<Vec<f64>>
    where
        F: FnOnce(&mut Self) -> Result<Vec<f64>>,
    {
        if let Some(values) = self.cache.series(series) {
            return Ok(values);
        }
        self.cache.begin_array(series)?;
        let values = match build(self) {
            Ok(values) => values,
            Err(err) => {
                self.cache.abandon(series, 0);
                return Err(err);
            }
        };
        self.cache.fill(series, &values)?;
        trace!("Materialised {} over {} months", series, values.len());
        Ok(values)
    }

    /// Collect a scalar series over the whole horizon, in increasing t
    fn collect<F>(&mut self, mut cell: F) -> Result<Vec<f64>>
    where
        F: FnMut(&mut Self, usize) -> Result<f64>,
    {
        let mut values = Vec::with_capacity(self.horizon() + 1);
        for t in 0..=self.horizon() {
            values.push(cell(self, t)?);
        }
        Ok(values)
    }

    /// Months since commencement at projection month t
    fn duration_at(&self, t: usize) -> usize {
        self.policy.duration_if as usize + t
    }

    // --- Demographics ---

    /// Integer attained age at month t
    pub fn current_age(&mut self, t: usize) -> Result<u32> {
        let age = self.memo(SeriesId::CurrentAge, t, |m| {
            if t < 12 {
                let whole_years = m.duration_at(t) / 12;
                return Ok((m.policy.age_at_entry as usize + whole_years) as f64);
            }
            Ok(f64::from(m.current_age(t - 12)?) + 1.0)
        })?;
        Ok(age as u32)
    }

    /// Monthly death rate at month t
    pub fn death_rate(&mut self, t: usize) -> Result<f64> {
        self.memo(SeriesId::DeathRate, t, |m| {
            let age = m.current_age(t)?;

            // Same age as last month: same annual rate
            if t != 0 && age == m.current_age(t - 1)? {
                return m.death_rate(t - 1);
            }

            m.assumptions
                .mortality
                .monthly_rate(age, m.policy.gender, m.overlay)
        })
    }

    // --- Survivorship ---

    /// Expected policies in force at month t, per unit policy at t=0
    pub fn expected_number_of_policies_if(&mut self, t: usize) -> Result<f64> {
        self.memo(SeriesId::ExpectedNumberOfPoliciesIf, t, |m| {
            if t == 0 {
                return Ok(1.0);
            }
            let previous = m.expected_number_of_policies_if(t - 1)?;
            Ok(previous * (1.0 - m.death_rate(t - 1)?))
        })
    }

    // --- Guarantee ---

    /// Whether month t falls inside the guarantee period
    ///
    /// Once the guarantee has ended it stays ended.
    pub fn within_guarantee_period(&mut self, t: usize) -> Result<bool> {
        let flag = self.memo(SeriesId::WithinGuaranteePeriod, t, |m| {
            if t != 0 && !m.within_guarantee_period(t - 1)? {
                return Ok(0.0);
            }
            let inside = m.duration_at(t) < m.policy.initial_guarantee_term as usize;
            Ok(if inside { 1.0 } else { 0.0 })
        })?;
        Ok(flag != 0.0)
    }

    /// Guarantee flags (1/0) for every month, computed in one pass
    pub fn within_guarantee_period_array(&mut self) -> Result<Vec<f64>> {
        self.materialise(SeriesId::WithinGuaranteePeriodArray, |m| {
            let term = m.policy.initial_guarantee_term as usize;
            let mut open = true;
            Ok((0..=m.horizon())
                .map(|t| {
                    open = open && m.duration_at(t) < term;
                    if open {
                        1.0
                    } else {
                        0.0
                    }
                })
                .collect())
        })
    }

    // --- Benefits ---

    /// Annuity paid per surviving policy at month t
    pub fn annuity_payment_per_policy(&mut self, t: usize) -> Result<f64> {
        self.memo(SeriesId::AnnuityPaymentPerPolicy, t, |m| {
            let interval = m.policy.payment_frequency.interval_months() as usize;
            if m.duration_at(t) % interval != 0 {
                return Ok(0.0);
            }

            let initial = m.policy.initial_annuity_per_payment_period();
            match m.policy.escalation {
                Escalation::None => Ok(initial),
                Escalation::Fixed { rate } => {
                    if t < 12 {
                        return Ok(initial);
                    }
                    Ok(m.annuity_payment_per_policy(t - 12)? * (1.0 + rate))
                }
                Escalation::InflationLinked => {
                    if t < 12 {
                        return Ok(initial);
                    }
                    let previous = m.annuity_payment_per_policy(t - 12)?;
                    let inflation = m.assumptions.inflation_forward.rate(t - 12)?;
                    Ok(previous * (1.0 + inflation))
                }
            }
        })
    }

    /// Expected annuity outgo at month t
    ///
    /// Inside the guarantee the payment is made whether or not the annuitant survives.
    pub fn expected_annuity_payment(&mut self, t: usize) -> Result<f64> {
        self.memo(SeriesId::ExpectedAnnuityPayment, t, |m| {
            let payment = m.annuity_payment_per_policy(t)?;
            if m.within_guarantee_period(t)? {
                return Ok(payment);
            }
            Ok(payment * m.expected_number_of_policies_if(t)?)
        })
    }

    // --- Expenses ---

    /// Renewal expense per policy, paid on policy anniversaries only
    pub fn renewal_expense_per_policy(&mut self, t: usize) -> Result<f64> {
        self.memo(SeriesId::RenewalExpensePerPolicy, t, |m| {
            if m.duration_at(t) % 12 != 0 {
                return Ok(0.0);
            }
            if t < 12 {
                return Ok(m.expense.renewal_expense);
            }

            let previous = m.renewal_expense_per_policy(t - 12)?;
            let inflation = m.assumptions.inflation_forward.rate(t - 12)?;
            Ok(previous * (1.0 + inflation + m.expense.inflation_margin))
        })
    }

    pub fn expected_renewal_expense_payment(&mut self, t: usize) -> Result<f64> {
        self.memo(SeriesId::ExpectedRenewalExpensePayment, t, |m| {
            Ok(m.renewal_expense_per_policy(t)? * m.expected_number_of_policies_if(t)?)
        })
    }

    /// Investment expense at month t
    ///
    /// Charged on EPV_liability_gross(t), the gross liability used as a proxy
    /// for assets under management at t.
    pub fn investment_expense_payment(&mut self, t: usize) -> Result<f64> {
        self.memo(SeriesId::InvestmentExpensePayment, t, |m| {
            let gross = match m.cache.get(SeriesId::EpvLiabilityGross, t) {
                Some(value) => value,
                None => m.epv_liability_gross()?[t],
            };
            Ok(gross * m.assumptions.investment_expense_rate)
        })
    }

    // --- Discounting & aggregation ---

    /// Monthly accumulation factors from the forward yield curve
    pub fn discount_rate(&mut self) -> Result<Vec<f64>> {
        self.materialise(SeriesId::DiscountRate, |m| {
            m.collect(|m, t| Ok(monthly_factor(m.assumptions.yield_curve_forward.rate(t)?)))
        })
    }

    pub fn epv_annuity_benefit(&mut self) -> Result<Vec<f64>> {
        self.materialise(SeriesId::EpvAnnuityBenefit, |m| {
            let cash_flows = m.collect(|m, t| m.expected_annuity_payment(t))?;
            discount(&cash_flows, &m.discount_rate()?)
        })
    }

    pub fn epv_renewal_expenses(&mut self) -> Result<Vec<f64>> {
        self.materialise(SeriesId::EpvRenewalExpenses, |m| {
            let cash_flows = m.collect(|m, t| m.expected_renewal_expense_payment(t))?;
            discount(&cash_flows, &m.discount_rate()?)
        })
    }

    pub fn epv_investment_expenses(&mut self) -> Result<Vec<f64>> {
        self.materialise(SeriesId::EpvInvestmentExpenses, |m| {
            let cash_flows = m.collect(|m, t| m.investment_expense_payment(t))?;
            discount(&cash_flows, &m.discount_rate()?)
        })
    }

    pub fn epv_total_expenses(&mut self) -> Result<Vec<f64>> {
        self.materialise(SeriesId::EpvTotalExpenses, |m| {
            Ok(add(&m.epv_renewal_expenses()?, &m.epv_investment_expenses()?))
        })
    }

    /// Benefits plus renewal expenses, before investment expenses
    pub fn epv_liability_gross(&mut self) -> Result<Vec<f64>> {
        self.materialise(SeriesId::EpvLiabilityGross, |m| {
            Ok(add(&m.epv_annuity_benefit()?, &m.epv_renewal_expenses()?))
        })
    }

    pub fn epv_liability(&mut self) -> Result<Vec<f64>> {
        self.materialise(SeriesId::EpvLiability, |m| {
            Ok(add(&m.epv_annuity_benefit()?, &m.epv_total_expenses()?))
        })
    }

    /// Reserve at the valuation date: EPV_liability(0)
    pub fn liability(&mut self) -> Result<f64> {
        Ok(self.epv_liability()?[0])
    }

    // --- Addressing by series ---

    /// Value of any series at month t
    pub fn value(&mut self, series: SeriesId, t: usize) -> Result<f64> {
        self.cache.check_time(series, t)?;
        match series {
            SeriesId::CurrentAge => self.current_age(t).map(f64::from),
            SeriesId::DeathRate => self.death_rate(t),
            SeriesId::ExpectedNumberOfPoliciesIf => self.expected_number_of_policies_if(t),
            SeriesId::WithinGuaranteePeriod => self
                .within_guarantee_period(t)
                .map(|inside| if inside { 1.0 } else { 0.0 }),
            SeriesId::AnnuityPaymentPerPolicy => self.annuity_payment_per_policy(t),
            SeriesId::ExpectedAnnuityPayment => self.expected_annuity_payment(t),
            SeriesId::RenewalExpensePerPolicy => self.renewal_expense_per_policy(t),
            SeriesId::ExpectedRenewalExpensePayment => self.expected_renewal_expense_payment(t),
            SeriesId::InvestmentExpensePayment => self.investment_expense_payment(t),
            array => Ok(self.series(array)?[t]),
        }
    }

    /// Every value of a series over the horizon
    pub fn series(&mut self, series: SeriesId) -> Result<Vec<f64>> {
        match series {
            SeriesId::WithinGuaranteePeriodArray => self.within_guarantee_period_array(),
            SeriesId::DiscountRate => self.discount_rate(),
            SeriesId::EpvAnnuityBenefit => self.epv_annuity_benefit(),
            SeriesId::EpvRenewalExpenses => self.epv_renewal_expenses(),
            SeriesId::EpvInvestmentExpenses => self.epv_investment_expenses(),
            SeriesId::EpvTotalExpenses => self.epv_total_expenses(),
            SeriesId::EpvLiabilityGross => self.epv_liability_gross(),
            SeriesId::EpvLiability => self.epv_liability(),
            scalar => self.collect(|m, t| m.value(scalar, t)),
        }
    }
}

fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}
