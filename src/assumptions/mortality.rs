//! Mortality assumptions: base qx table with a product/gender overlay
//!
//! The mortality model separates:
//! - Base annual mortality rates by integer age and gender
//! - Multiplicative overlay factors keyed by product and gender
//! - A maximum table age beyond which death is certain
//!
//! Rates are validated when the table is built so the projection never has to
//! re-check them mid-recurrence.

use std::collections::{BTreeMap, HashMap};

use crate::error::{ProjectionError, Result};
use crate::policy::Gender;

/// Mortality table with separate base rates and overlay factors
#[derive(Debug, Clone)]
pub struct MortalityTable {
    /// Base annual mortality rates by age, stored as (male_rate, female_rate)
    base_rates: BTreeMap<u32, (f64, f64)>,

    /// Overlay factors by product, stored as (male_factor, female_factor)
    overlays: HashMap<String, (f64, f64)>,

    /// Ages above this are assumed to die with certainty
    max_mortality_age: u32,
}

impl MortalityTable {
    /// Create a table, rejecting rates outside [0, 1] and negative overlays
    pub fn new(
        base_rates: BTreeMap<u32, (f64, f64)>,
        overlays: HashMap<String, (f64, f64)>,
        max_mortality_age: u32,
    ) -> Result<Self> {
        for (age, &(male, female)) in &base_rates {
            for (label, rate) in [("male", male), ("female", female)] {
                if !(0.0..=1.0).contains(&rate) {
                    return Err(ProjectionError::invalid(
                        "mortality_base_table",
                        format!("{} qx at age {} is {}, outside [0, 1]", label, age, rate),
                    ));
                }
            }
        }

        for (product, &(male, female)) in &overlays {
            if !(male.is_finite() && female.is_finite() && male >= 0.0 && female >= 0.0) {
                return Err(ProjectionError::invalid(
                    "mortality_overlay",
                    format!("factors for '{}' must be non-negative", product),
                ));
            }
        }

        Ok(Self {
            base_rates,
            overlays,
            max_mortality_age,
        })
    }

    pub fn max_mortality_age(&self) -> u32 {
        self.max_mortality_age
    }

    /// Annual qx for an integer age and gender
    pub fn annual_rate(&self, age: u32, gender: Gender) -> Result<f64> {
        let (male, female) = self
            .base_rates
            .get(&age)
            .copied()
            .ok_or_else(|| ProjectionError::missing("mortality_base_table", age))?;
        Ok(match gender {
            Gender::Male => male,
            Gender::Female => female,
        })
    }

    /// Overlay multiplier for a product and gender
    pub fn overlay_factor(&self, product: &str, gender: Gender) -> Result<f64> {
        let (male, female) = self
            .overlays
            .get(product)
            .copied()
            .ok_or_else(|| ProjectionError::missing("mortality_overlay", product))?;
        Ok(match gender {
            Gender::Male => male,
            Gender::Female => female,
        })
    }

    /// Monthly death rate for an attained age
    ///
    /// q_monthly = 1 - (1 - qx)^(1/12), scaled by the overlay and capped at 1.
    /// Above the maximum table age the rate is 1 regardless of the overlay.
    pub fn monthly_rate(&self, age: u32, gender: Gender, overlay: f64) -> Result<f64> {
        if age > self.max_mortality_age {
            return Ok(1.0);
        }

        let q_x = self.annual_rate(age, gender)?;
        let q_x_monthly = 1.0 - (1.0 - q_x).powf(1.0 / 12.0);

        Ok((q_x_monthly * overlay).min(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MortalityTable {
        let base: BTreeMap<u32, (f64, f64)> =
            (60..=110).map(|age| (age, (0.01 + 0.001 * (age - 60) as f64, 0.008))).collect();
        let mut overlays = HashMap::new();
        overlays.insert("annuity".to_string(), (0.9, 1.1));
        MortalityTable::new(base, overlays, 110).unwrap()
    }

    #[test]
    fn test_monthly_conversion() {
        let table = table();
        let rate = table.monthly_rate(60, Gender::Male, 1.0).unwrap();
        let expected = 1.0 - (1.0_f64 - 0.01).powf(1.0 / 12.0);
        assert!((rate - expected).abs() < 1e-15);

        // Compounding the monthly rate over a year recovers qx
        let annual = 1.0 - (1.0 - rate).powi(12);
        assert!((annual - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_overlay_applied() {
        let table = table();
        let overlay = table.overlay_factor("annuity", Gender::Female).unwrap();
        assert_eq!(overlay, 1.1);

        let plain = table.monthly_rate(70, Gender::Female, 1.0).unwrap();
        let loaded = table.monthly_rate(70, Gender::Female, overlay).unwrap();
        assert!((loaded - plain * 1.1).abs() < 1e-15);
    }

    #[test]
    fn test_beyond_max_age_is_certain_death() {
        let table = table();
        assert_eq!(table.monthly_rate(111, Gender::Male, 0.5).unwrap(), 1.0);
        assert_eq!(table.monthly_rate(111, Gender::Female, 0.0).unwrap(), 1.0);
    }

    #[test]
    fn test_capped_at_one() {
        let table = table();
        assert_eq!(table.monthly_rate(110, Gender::Male, 1_000.0).unwrap(), 1.0);
    }

    #[test]
    fn test_missing_age_and_product() {
        let table = table();
        assert!(matches!(
            table.annual_rate(40, Gender::Male),
            Err(ProjectionError::MissingAssumption { .. })
        ));
        assert!(table.overlay_factor("pension", Gender::Male).is_err());
    }

    #[test]
    fn test_out_of_range_rate_rejected() {
        let mut base = BTreeMap::new();
        base.insert(65, (1.2, 0.01));
        assert!(MortalityTable::new(base, HashMap::new(), 110).is_err());
    }
}
