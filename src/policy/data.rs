//! Policy data structures for in-payment annuities

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};

/// Gender of the annuitant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse from the inforce encoding (0 = male, 1 = female) or a name
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "0" | "m" | "male" => Ok(Gender::Male),
            "1" | "f" | "female" => Ok(Gender::Female),
            other => Err(ProjectionError::Parse {
                field: "gender".to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// Numeric code used by `Policy::get`
    pub fn code(&self) -> u8 {
        match self {
            Gender::Male => 0,
            Gender::Female => 1,
        }
    }

    /// Column label used by the gender-keyed assumption tables
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// How the annuity amount grows over time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Escalation {
    /// Level payments
    None,
    /// Compounds annually at a fixed rate
    Fixed { rate: f64 },
    /// Compounds annually with the forward inflation curve
    InflationLinked,
}

impl Escalation {
    /// Build from the inforce `escalation_type` code (0/1/2 or a name) and rate
    ///
    /// The rate is only kept for fixed escalation.
    pub fn from_code(code: &str, rate: f64) -> Result<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "0" | "none" => Ok(Escalation::None),
            "1" | "fixed" => Ok(Escalation::Fixed { rate }),
            "2" | "inflation" | "inflation-linked" | "inflation_linked" => {
                Ok(Escalation::InflationLinked)
            }
            _ => Err(ProjectionError::UnsupportedEscalation {
                value: code.trim().to_string(),
            }),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Escalation::None => 0,
            Escalation::Fixed { .. } => 1,
            Escalation::InflationLinked => 2,
        }
    }

    /// Fixed escalation rate, zero for the other variants
    pub fn rate(&self) -> f64 {
        match self {
            Escalation::Fixed { rate } => *rate,
            _ => 0.0,
        }
    }
}

/// Number of annuity payments per year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentFrequency {
    Annual,
    SemiAnnual,
    Quarterly,
    Monthly,
}

impl PaymentFrequency {
    pub fn from_payments_per_year(payments: i64) -> Result<Self> {
        match payments {
            1 => Ok(PaymentFrequency::Annual),
            2 => Ok(PaymentFrequency::SemiAnnual),
            4 => Ok(PaymentFrequency::Quarterly),
            12 => Ok(PaymentFrequency::Monthly),
            other => Err(ProjectionError::invalid(
                "annuity_payment_frequency",
                format!("{} payments per year (expected 1, 2, 4 or 12)", other),
            )),
        }
    }

    pub fn payments_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Annual => 1,
            PaymentFrequency::SemiAnnual => 2,
            PaymentFrequency::Quarterly => 4,
            PaymentFrequency::Monthly => 12,
        }
    }

    /// Months between consecutive payments
    pub fn interval_months(&self) -> u32 {
        12 / self.payments_per_year()
    }
}

/// A single in-payment annuity policy as at the valuation date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Unique policy identifier
    pub policy_id: u32,

    /// Age of the annuitant at commencement (whole years)
    pub age_at_entry: u32,

    pub gender: Gender,

    /// Guarantee term measured in months from commencement
    pub initial_guarantee_term: u32,

    /// Annual annuity amount at commencement
    pub initial_annuity: f64,

    pub escalation: Escalation,

    pub payment_frequency: PaymentFrequency,

    /// Months elapsed since commencement at the valuation date
    pub duration_if: u32,
}

impl Policy {
    /// Create a policy and validate its numeric fields
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        policy_id: u32,
        age_at_entry: u32,
        gender: Gender,
        initial_guarantee_term: u32,
        initial_annuity: f64,
        escalation: Escalation,
        payment_frequency: PaymentFrequency,
        duration_if: u32,
    ) -> Result<Self> {
        let policy = Self {
            policy_id,
            age_at_entry,
            gender,
            initial_guarantee_term,
            initial_annuity,
            escalation,
            payment_frequency,
            duration_if,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Reject values the recurrences cannot handle
    pub fn validate(&self) -> Result<()> {
        if !self.initial_annuity.is_finite() || self.initial_annuity < 0.0 {
            return Err(ProjectionError::invalid(
                "initial_annuity",
                format!("{} must be a non-negative amount", self.initial_annuity),
            ));
        }
        if let Escalation::Fixed { rate } = self.escalation {
            if !rate.is_finite() || rate <= -1.0 {
                return Err(ProjectionError::invalid(
                    "escalation_rate",
                    format!("{} must be finite and greater than -100%", rate),
                ));
            }
        }
        Ok(())
    }

    /// Annuity amount paid at each payment date before any escalation
    pub fn initial_annuity_per_payment_period(&self) -> f64 {
        self.initial_annuity / self.payment_frequency.payments_per_year() as f64
    }

    /// Look up a policy field by name
    pub fn get(&self, field: &str) -> Result<f64> {
        let value = match field {
            "policy_id" => self.policy_id as f64,
            "age_at_entry" => self.age_at_entry as f64,
            "gender" => self.gender.code() as f64,
            "initial_guarantee_term" => self.initial_guarantee_term as f64,
            "initial_annuity" => self.initial_annuity,
            "escalation_type" => self.escalation.code() as f64,
            "escalation_rate" => self.escalation.rate(),
            "annuity_payment_frequency" => self.payment_frequency.payments_per_year() as f64,
            "duration_IF" | "duration_if" => self.duration_if as f64,
            other => {
                return Err(ProjectionError::MissingPolicyField {
                    field: other.to_string(),
                })
            }
        };
        Ok(value)
    }
}
