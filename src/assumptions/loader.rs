//! CSV-based assumption loader
//!
//! Loads the assumption set from CSV files in data/assumptions/

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use csv::StringRecord;
use log::warn;

use super::ExpenseBasis;
use crate::error::{ProjectionError, Result};

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

fn parse_field<T: FromStr>(record: &StringRecord, idx: usize, field: &str) -> Result<T> {
    let raw = record.get(idx).ok_or_else(|| ProjectionError::Parse {
        field: field.to_string(),
        value: String::new(),
    })?;
    raw.trim().parse().map_err(|_| ProjectionError::Parse {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

fn open(path: &Path, file_name: &str) -> Result<File> {
    Ok(File::open(path.join(file_name))?)
}

/// Load mortality base rates: `age,male,female`
/// Returns map of age -> (male_rate, female_rate)
pub fn read_mortality_base_table<R: Read>(reader: R) -> Result<BTreeMap<u32, (f64, f64)>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut rates = BTreeMap::new();

    for result in reader.records() {
        let record = result?;
        let age: u32 = parse_field(&record, 0, "mortality_base_table.age")?;
        let male: f64 = parse_field(&record, 1, "mortality_base_table.male")?;
        let female: f64 = parse_field(&record, 2, "mortality_base_table.female")?;
        if rates.insert(age, (male, female)).is_some() {
            warn!("Duplicate mortality row for age {}, keeping the last one", age);
        }
    }

    Ok(rates)
}

/// Load mortality overlays: `product,male,female`
pub fn read_mortality_overlay<R: Read>(reader: R) -> Result<HashMap<String, (f64, f64)>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut overlays = HashMap::new();

    for result in reader.records() {
        let record = result?;
        let product: String = parse_field(&record, 0, "mortality_overlay.product")?;
        let male: f64 = parse_field(&record, 1, "mortality_overlay.male")?;
        let female: f64 = parse_field(&record, 2, "mortality_overlay.female")?;
        if overlays.insert(product.clone(), (male, female)).is_some() {
            warn!("Duplicate mortality overlay for '{}', keeping the last one", product);
        }
    }

    Ok(overlays)
}

/// Load expense bases: `product,renewal_expense,inflation_margin`
pub fn read_expenses<R: Read>(reader: R) -> Result<Vec<(String, ExpenseBasis)>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut expenses = Vec::new();

    for result in reader.records() {
        let record = result?;
        let product: String = parse_field(&record, 0, "expense.product")?;
        let basis = ExpenseBasis {
            renewal_expense: parse_field(&record, 1, "expense.renewal_expense")?,
            inflation_margin: parse_field(&record, 2, "expense.inflation_margin")?,
        };
        expenses.push((product, basis));
    }

    Ok(expenses)
}

/// Load a forward curve: `t,rate`
/// Month indices must be contiguous from 0
pub fn read_forward_curve<R: Read>(reader: R, name: &'static str) -> Result<Vec<f64>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut rates = Vec::new();

    for result in reader.records() {
        let record = result?;
        let month: usize = parse_field(&record, 0, name)?;
        let rate: f64 = parse_field(&record, 1, name)?;
        if month != rates.len() {
            return Err(ProjectionError::invalid(
                name,
                format!("expected month {} but found {}", rates.len(), month),
            ));
        }
        rates.push(rate);
    }

    Ok(rates)
}

/// Load scalar parameters: `name,value`
pub fn read_parameters<R: Read>(reader: R) -> Result<HashMap<String, f64>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut parameters = HashMap::new();

    for result in reader.records() {
        let record = result?;
        let name: String = parse_field(&record, 0, "parameters.name")?;
        let value: f64 = parse_field(&record, 1, &name)?;
        parameters.insert(name, value);
    }

    Ok(parameters)
}

/// Raw assumption tables as read from disk
pub struct LoadedAssumptions {
    pub mortality_base_table: BTreeMap<u32, (f64, f64)>,
    pub mortality_overlay: HashMap<String, (f64, f64)>,
    pub expenses: Vec<(String, ExpenseBasis)>,
    pub inflation_forward: Vec<f64>,
    pub yield_curve_forward: Vec<f64>,
    pub parameters: HashMap<String, f64>,
}

impl LoadedAssumptions {
    /// Load all assumptions from the default path
    pub fn load_default() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load all assumptions from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        Ok(Self {
            mortality_base_table: read_mortality_base_table(open(path, "mortality_base_table.csv")?)?,
            mortality_overlay: read_mortality_overlay(open(path, "mortality_overlay.csv")?)?,
            expenses: read_expenses(open(path, "expense.csv")?)?,
            inflation_forward: read_forward_curve(
                open(path, "inflation_forward.csv")?,
                "inflation_forward",
            )?,
            yield_curve_forward: read_forward_curve(
                open(path, "yield_curve_forward.csv")?,
                "yield_curve_forward",
            )?,
            parameters: read_parameters(open(path, "parameters.csv")?)?,
        })
    }

    /// Scalar parameter by name
    pub fn parameter(&self, name: &str) -> Result<f64> {
        self.parameters
            .get(name)
            .copied()
            .ok_or_else(|| ProjectionError::missing("parameters", name))
    }
}
