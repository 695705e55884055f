//! Load in-payment annuity policies from an inforce CSV

use super::{Escalation, Gender, PaymentFrequency, Policy};
use crate::error::{ProjectionError, Result};
use csv::Reader;
use std::path::Path;

/// Default location of the sample inforce file
pub const DEFAULT_POLICIES_PATH: &str = "data/policies.csv";

/// Raw CSV row matching the inforce columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    policy_id: u32,
    age_at_entry: u32,
    gender: String,
    initial_guarantee_term: i64,
    initial_annuity: f64,
    escalation_type: String,
    #[serde(default)]
    escalation_rate: f64,
    annuity_payment_frequency: i64,
    #[serde(rename = "duration_IF")]
    duration_if: i64,
}

impl CsvRow {
    fn to_policy(self) -> Result<Policy> {
        let gender = Gender::parse(&self.gender)?;
        let escalation = Escalation::from_code(&self.escalation_type, self.escalation_rate)?;
        let payment_frequency = PaymentFrequency::from_payments_per_year(self.annuity_payment_frequency)?;

        let initial_guarantee_term = u32::try_from(self.initial_guarantee_term).map_err(|_| {
            ProjectionError::invalid(
                "initial_guarantee_term",
                format!("{} months is negative or too large", self.initial_guarantee_term),
            )
        })?;
        let duration_if = u32::try_from(self.duration_if).map_err(|_| {
            ProjectionError::invalid(
                "duration_IF",
                format!("{} months is negative or too large", self.duration_if),
            )
        })?;

        Policy::new(
            self.policy_id,
            self.age_at_entry,
            gender,
            initial_guarantee_term,
            self.initial_annuity,
            escalation,
            payment_frequency,
            duration_if,
        )
    }
}

/// Load all policies from a CSV file
pub fn load_policies<P: AsRef<Path>>(path: P) -> Result<Vec<Policy>> {
    let reader = Reader::from_path(path)?;
    collect_policies(reader)
}

/// Load policies from any reader (e.g., string buffer, network stream)
pub fn load_policies_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<Policy>> {
    collect_policies(Reader::from_reader(reader))
}

fn collect_policies<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<Policy>> {
    let mut policies = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        policies.push(row.to_policy()?);
    }
    Ok(policies)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "policy_id,age_at_entry,gender,initial_guarantee_term,initial_annuity,escalation_type,escalation_rate,annuity_payment_frequency,duration_IF\n";

    #[test]
    fn test_load_policies_from_reader() {
        let data = format!(
            "{HEADER}1,65,0,60,12000,0,0,12,0\n2,70,female,0,6000,fixed,0.025,4,14\n"
        );
        let policies = load_policies_from_reader(data.as_bytes()).unwrap();
        assert_eq!(policies.len(), 2);

        assert_eq!(policies[0].gender, Gender::Male);
        assert_eq!(policies[0].payment_frequency, PaymentFrequency::Monthly);
        assert_eq!(policies[1].escalation, Escalation::Fixed { rate: 0.025 });
        assert_eq!(policies[1].duration_if, 14);
    }

    #[test]
    fn test_unsupported_escalation_is_fatal() {
        let data = format!("{HEADER}1,65,0,60,12000,9,0,12,0\n");
        let err = load_policies_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ProjectionError::UnsupportedEscalation { ref value } if value == "9"));
    }

    #[test]
    fn test_negative_guarantee_term_rejected() {
        let data = format!("{HEADER}1,65,0,-12,12000,0,0,12,0\n");
        let err = load_policies_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidInput { .. }));
    }

    #[test]
    fn test_bad_frequency_rejected() {
        let data = format!("{HEADER}1,65,0,0,12000,0,0,5,0\n");
        assert!(load_policies_from_reader(data.as_bytes()).is_err());
    }
}
