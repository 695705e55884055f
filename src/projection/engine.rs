//! Projection engine: runs the recurrence model for one policy and collects results

use log::debug;

use super::model::AnnuityModel;
use super::result::{ProjectionResult, ProjectionRow};
use super::series::SeriesId;
use crate::assumptions::Assumptions;
use crate::error::Result;
use crate::policy::Policy;

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Final projection month T (inclusive); t = 0 is the valuation date
    pub horizon_months: usize,

    /// Product key for the product-keyed tables (mortality overlay, expenses)
    pub product: String,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            horizon_months: 720, // 60 years
            product: "annuity".to_string(),
        }
    }
}

/// Main projection engine
///
/// Holds the shared, read-only inputs. Each call to `project_policy` builds its
/// own model and memo table, so the engine can be shared across threads.
pub struct ProjectionEngine {
    assumptions: Assumptions,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with given assumptions and config
    pub fn new(assumptions: Assumptions, config: ProjectionConfig) -> Self {
        Self {
            assumptions,
            config,
        }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run the projection for a single policy
    ///
    /// Any failing series aborts the whole projection; no partial result is returned.
    pub fn project_policy(&self, policy: &Policy) -> Result<ProjectionResult> {
        debug!(
            "Projecting policy {} over {} months",
            policy.policy_id, self.config.horizon_months
        );

        let mut model = AnnuityModel::new(policy, &self.assumptions, &self.config)?;

        // Sweep forward in t so every recurrence finds its predecessor cached
        for t in 0..=model.horizon() {
            for series in SeriesId::SCALAR {
                model.value(series, t)?;
            }
        }
        let liability = model.liability()?;

        let rows = Self::collect_rows(&mut model)?;
        debug!(
            "Policy {}: liability {:.2} after {} cell evaluations",
            policy.policy_id,
            liability,
            model.evaluations()
        );

        Ok(ProjectionResult {
            policy_id: policy.policy_id,
            horizon_months: model.horizon(),
            liability,
            rows,
        })
    }

    fn collect_rows(model: &mut AnnuityModel<'_>) -> Result<Vec<ProjectionRow>> {
        let guarantee_array = model.within_guarantee_period_array()?;
        let discount_rate = model.discount_rate()?;
        let epv_annuity_benefit = model.epv_annuity_benefit()?;
        let epv_renewal_expenses = model.epv_renewal_expenses()?;
        let epv_investment_expenses = model.epv_investment_expenses()?;
        let epv_total_expenses = model.epv_total_expenses()?;
        let epv_liability_gross = model.epv_liability_gross()?;
        let epv_liability = model.epv_liability()?;

        let mut rows = Vec::with_capacity(model.horizon() + 1);
        for t in 0..=model.horizon() {
            rows.push(ProjectionRow {
                t,
                current_age: model.current_age(t)?,
                death_rate: model.death_rate(t)?,
                expected_number_of_policies_if: model.expected_number_of_policies_if(t)?,
                within_guarantee_period: u8::from(model.within_guarantee_period(t)?),
                within_guarantee_period_array: guarantee_array[t] as u8,
                annuity_payment_per_policy: model.annuity_payment_per_policy(t)?,
                expected_annuity_payment: model.expected_annuity_payment(t)?,
                renewal_expense_per_policy: model.renewal_expense_per_policy(t)?,
                expected_renewal_expense_payment: model.expected_renewal_expense_payment(t)?,
                investment_expense_payment: model.investment_expense_payment(t)?,
                discount_rate: discount_rate[t],
                epv_annuity_benefit: epv_annuity_benefit[t],
                epv_renewal_expenses: epv_renewal_expenses[t],
                epv_investment_expenses: epv_investment_expenses[t],
                epv_total_expenses: epv_total_expenses[t],
                epv_liability_gross: epv_liability_gross[t],
                epv_liability: epv_liability[t],
            });
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Escalation, PaymentFrequency};
    use crate::projection::fixtures;

    fn engine(horizon_months: usize) -> ProjectionEngine {
        let config = ProjectionConfig {
            horizon_months,
            ..Default::default()
        };
        ProjectionEngine::new(fixtures::assumptions(horizon_months), config)
    }

    #[test]
    fn test_projection_runs() {
        let engine = engine(360);
        let policy = fixtures::policy(Escalation::Fixed { rate: 0.03 }, PaymentFrequency::Monthly, 60, 12);

        let result = engine.project_policy(&policy).unwrap();

        assert_eq!(result.rows.len(), 361);
        assert_eq!(result.horizon_months, 360);
        assert!(result.liability > 0.0);
        assert_eq!(result.liability, result.rows[0].epv_liability);
    }

    #[test]
    fn test_survivorship_invariants() {
        let engine = engine(720);
        let policy = fixtures::policy(Escalation::InflationLinked, PaymentFrequency::Quarterly, 0, 3);
        let result = engine.project_policy(&policy).unwrap();

        assert_eq!(result.rows[0].expected_number_of_policies_if, 1.0);
        for pair in result.rows.windows(2) {
            let (now, next) = (&pair[0], &pair[1]);
            assert!(next.expected_number_of_policies_if <= now.expected_number_of_policies_if);
            assert!((0.0..=1.0).contains(&now.death_rate));
            assert!(next.current_age >= now.current_age);
            assert_eq!(now.within_guarantee_period, now.within_guarantee_period_array);
            if now.within_guarantee_period == 0 {
                assert_eq!(next.within_guarantee_period, 0);
            }
        }

        // Age 65 plus 60 years passes the maximum table age
        let last = result.rows.last().unwrap();
        assert_eq!(last.death_rate, 1.0);
        assert_eq!(last.expected_number_of_policies_if, 0.0);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let engine = engine(240);
        let policy = fixtures::policy(Escalation::InflationLinked, PaymentFrequency::Monthly, 24, 0);

        let first = engine.project_policy(&policy).unwrap();
        let second = engine.project_policy(&policy).unwrap();

        assert_eq!(first.rows, second.rows);
        assert_eq!(first.liability.to_bits(), second.liability.to_bits());
    }

    #[test]
    fn test_parallel_runs_are_independent() {
        let engine = engine(240);
        let policies: Vec<_> = [0, 12, 24, 36]
            .iter()
            .map(|&term| fixtures::policy(Escalation::None, PaymentFrequency::Monthly, term, 0))
            .collect();

        let sequential: Vec<f64> = policies
            .iter()
            .map(|p| engine.project_policy(p).unwrap().liability)
            .collect();

        let parallel: Vec<f64> = std::thread::scope(|scope| {
            let handles: Vec<_> = policies
                .iter()
                .map(|p| {
                    let engine = &engine;
                    scope.spawn(move || engine.project_policy(p).unwrap().liability)
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(sequential, parallel);

        // Longer guarantee, larger reserve
        for pair in sequential.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_failure_produces_no_result() {
        // Curves shorter than the horizon
        let config = ProjectionConfig {
            horizon_months: 48,
            ..Default::default()
        };
        let engine = ProjectionEngine::new(fixtures::assumptions(24), config);
        let policy = fixtures::policy(Escalation::InflationLinked, PaymentFrequency::Monthly, 0, 0);

        assert!(engine.project_policy(&policy).is_err());
    }
}
