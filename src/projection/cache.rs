//! Write-once memo table for time-series evaluation
//!
//! Each (series, t) cell moves Vacant -> InProgress -> Ready exactly once.
//! A request that lands on an InProgress cell means a series depends on
//! itself at the same time step, which is reported instead of recursing forever.
//!
//! The cache belongs to a single projection run. Independent runs each own
//! their own cache, so runs for different policies can proceed in parallel.

use super::series::SeriesId;
use crate::error::{ProjectionError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Vacant,
    InProgress,
    Ready(f64),
}

/// Memo table keyed by (series, t) for t in 0..=horizon
#[derive(Debug, Clone)]
pub struct SeriesCache {
    horizon: usize,
    slots: Vec<Slot>,
    evaluations: usize,
}

impl SeriesCache {
    pub fn new(horizon: usize) -> Self {
        Self {
            horizon,
            slots: vec![Slot::Vacant; SeriesId::COUNT * (horizon + 1)],
            evaluations: 0,
        }
    }

    /// Final month index T
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Number of cells computed so far (array fills count once)
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn check_time(&self, series: SeriesId, t: usize) -> Result<()> {
        if t > self.horizon {
            return Err(ProjectionError::TimeOutOfRange {
                series,
                t,
                horizon: self.horizon,
            });
        }
        Ok(())
    }

    fn offset(&self, series: SeriesId, t: usize) -> Result<usize> {
        self.check_time(series, t)?;
        Ok(series.index() * (self.horizon + 1) + t)
    }

    /// Value of a cell if it has been computed
    pub fn get(&self, series: SeriesId, t: usize) -> Option<f64> {
        let offset = self.offset(series, t).ok()?;
        match self.slots[offset] {
            Slot::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Claim a cell for evaluation
    ///
    /// Returns the cached value if the cell is ready, otherwise marks it in
    /// progress and returns `None` so the caller computes it.
    pub fn begin(&mut self, series: SeriesId, t: usize) -> Result<Option<f64>> {
        let offset = self.offset(series, t)?;
        match self.slots[offset] {
            Slot::Ready(value) => Ok(Some(value)),
            Slot::InProgress => Err(ProjectionError::CyclicDependency { series, t }),
            Slot::Vacant => {
                self.slots[offset] = Slot::InProgress;
                Ok(None)
            }
        }
    }

    /// Store the value of a cell claimed with `begin`
    pub fn complete(&mut self, series: SeriesId, t: usize, value: f64) -> Result<f64> {
        let offset = self.offset(series, t)?;
        debug_assert_eq!(self.slots[offset], Slot::InProgress);
        self.slots[offset] = Slot::Ready(value);
        self.evaluations += 1;
        Ok(value)
    }

    /// Release a claimed cell whose evaluation failed
    ///
    /// The cell returns to vacant so a later request re-runs the evaluation
    /// and reports the underlying error rather than a cycle.
    pub fn abandon(&mut self, series: SeriesId, t: usize) {
        if let Ok(offset) = self.offset(series, t) {
            if self.slots[offset] == Slot::InProgress {
                self.slots[offset] = Slot::Vacant;
            }
        }
    }

    /// Claim a whole array series for materialisation
    pub fn begin_array(&mut self, series: SeriesId) -> Result<()> {
        match self.begin(series, 0)? {
            Some(_) => Err(ProjectionError::invalid(
                series.name(),
                "array series materialised twice",
            )),
            None => Ok(()),
        }
    }

    /// Store every cell of an array series claimed with `begin_array`
    pub fn fill(&mut self, series: SeriesId, values: &[f64]) -> Result<()> {
        if values.len() != self.horizon + 1 {
            return Err(ProjectionError::invalid(
                series.name(),
                format!(
                    "expected {} values, got {}",
                    self.horizon + 1,
                    values.len()
                ),
            ));
        }
        let start = self.offset(series, 0)?;
        for (slot, &value) in self.slots[start..=start + self.horizon].iter_mut().zip(values) {
            *slot = Slot::Ready(value);
        }
        self.evaluations += 1;
        Ok(())
    }

    /// All values of a series, if every cell is ready
    pub fn series(&self, series: SeriesId) -> Option<Vec<f64>> {
        (0..=self.horizon).map(|t| self.get(series, t)).collect()
    }
}
