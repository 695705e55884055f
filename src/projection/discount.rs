//! Present value reduction of a cash-flow series
//!
//! pv[t] = sum over s >= t of cf[s] / prod_{k=t..=s} df[k]
//!
//! Every cash flow, including the one at t itself, is discounted through the
//! factor of its own month. Evaluated backwards as
//! pv[T] = cf[T] / df[T] and pv[t] = (cf[t] + pv[t+1]) / df[t].

use crate::error::{ProjectionError, Result};

/// Discount a cash-flow series with monthly accumulation factors
///
/// Both series are indexed by t = 0..=T and must have the same length.
pub fn discount(cash_flows: &[f64], factors: &[f64]) -> Result<Vec<f64>> {
    if cash_flows.len() != factors.len() {
        return Err(ProjectionError::invalid(
            "discount",
            format!(
                "{} cash flows but {} discount factors",
                cash_flows.len(),
                factors.len()
            ),
        ));
    }

    let mut present_values = vec![0.0; cash_flows.len()];
    let mut next = 0.0;
    for t in (0..cash_flows.len()).rev() {
        next = (cash_flows[t] + next) / factors[t];
        present_values[t] = next;
    }

    Ok(present_values)
}

/// Monthly accumulation factor implied by an annual rate
pub fn monthly_factor(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Direct evaluation of the closed form
    fn closed_form(cf: &[f64], df: &[f64], t: usize) -> f64 {
        (t..cf.len())
            .map(|s| cf[s] / df[t..=s].iter().product::<f64>())
            .sum()
    }

    #[test]
    fn test_matches_closed_form() {
        let cf = [100.0, 0.0, 50.0, 25.0, 0.0, 80.0];
        let df = [1.003, 1.0031, 1.0029, 1.004, 1.0035, 1.0033];

        let pv = discount(&cf, &df).unwrap();
        for t in 0..cf.len() {
            assert_relative_eq!(pv[t], closed_form(&cf, &df, t), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_last_cash_flow_discounted_one_month() {
        let pv = discount(&[0.0, 0.0, 120.0], &[1.01, 1.01, 1.01]).unwrap();
        assert_relative_eq!(pv[2], 120.0 / 1.01);
        assert_relative_eq!(pv[0], 120.0 / 1.01_f64.powi(3));
    }

    #[test]
    fn test_unit_factors_sum_remaining_flows() {
        let pv = discount(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(pv, vec![6.0, 5.0, 3.0]);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(discount(&[1.0, 2.0], &[1.0]).is_err());
    }

    #[test]
    fn test_monthly_factor_compounds_to_annual() {
        assert_relative_eq!(monthly_factor(0.05).powi(12), 1.05, max_relative = 1e-12);
    }
}
