//! Forward rate curves indexed by projection month

use crate::error::{ProjectionError, Result};

/// Annual forward rates, one per future month index
#[derive(Debug, Clone)]
pub struct ForwardCurve {
    /// Table name used in lookup diagnostics
    name: &'static str,

    /// Index = month, value = annual rate
    rates: Vec<f64>,
}

impl ForwardCurve {
    /// Build a curve, rejecting non-finite rates and rates at or below -100%
    pub fn new(name: &'static str, rates: Vec<f64>) -> Result<Self> {
        if let Some((month, rate)) = rates
            .iter()
            .enumerate()
            .find(|(_, r)| !r.is_finite() || **r <= -1.0)
        {
            return Err(ProjectionError::invalid(
                name,
                format!("rate {} at month {} is not usable", rate, month),
            ));
        }
        Ok(Self { name, rates })
    }

    /// Same rate for the first `months + 1` month indices
    pub fn flat(name: &'static str, rate: f64, months: usize) -> Result<Self> {
        Self::new(name, vec![rate; months + 1])
    }

    /// Annual rate at a month index
    pub fn rate(&self, month: usize) -> Result<f64> {
        self.rates
            .get(month)
            .copied()
            .ok_or_else(|| ProjectionError::missing(self.name, month))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
