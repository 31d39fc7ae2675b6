//! Policy input records and the validated policy handed to the projector

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::IllustrationError;

/// Currency amounts. Always decimal, never f64.
pub type Money = Decimal;

/// Rates as decimals (0.05 = 5%)
pub type Rate = Decimal;

/// How often the modal premium is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PremiumFrequency {
    Yearly,
    #[serde(rename = "Half-Yearly")]
    HalfYearly,
    Monthly,
}

impl PremiumFrequency {
    pub const ALL: [PremiumFrequency; 3] = [
        PremiumFrequency::Yearly,
        PremiumFrequency::HalfYearly,
        PremiumFrequency::Monthly,
    ];

    /// Installments per policy year
    pub fn installments_per_year(&self) -> u32 {
        match self {
            PremiumFrequency::Yearly => 1,
            PremiumFrequency::HalfYearly => 2,
            PremiumFrequency::Monthly => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PremiumFrequency::Yearly => "Yearly",
            PremiumFrequency::HalfYearly => "Half-Yearly",
            PremiumFrequency::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for PremiumFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PremiumFrequency {
    type Err = IllustrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PremiumFrequency::ALL
            .into_iter()
            .find(|freq| freq.as_str() == s.trim())
            .ok_or_else(|| IllustrationError::UnknownFrequency(s.to_string()))
    }
}

/// Caller-supplied policy parameters, before validation.
///
/// Every field is optional so that an absent value is reported as a
/// violation instead of failing deserialization. Dates and frequencies stay
/// as raw strings for the same reason.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyInput {
    #[serde(default, alias = "dob")]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub sum_assured: Option<Money>,
    #[serde(default)]
    pub modal_premium: Option<Money>,
    #[serde(default)]
    pub premium_frequency: Option<String>,
    #[serde(default)]
    pub policy_term: Option<u32>,
    #[serde(default)]
    pub premium_paying_term: Option<u32>,
}

impl PolicyInput {
    /// Build a fully populated input
    pub fn new(
        date_of_birth: NaiveDate,
        sum_assured: Money,
        modal_premium: Money,
        premium_frequency: PremiumFrequency,
        policy_term: u32,
        premium_paying_term: u32,
    ) -> Self {
        Self {
            date_of_birth: Some(date_of_birth.format("%Y-%m-%d").to_string()),
            sum_assured: Some(sum_assured),
            modal_premium: Some(modal_premium),
            premium_frequency: Some(premium_frequency.as_str().to_string()),
            policy_term: Some(policy_term),
            premium_paying_term: Some(premium_paying_term),
        }
    }
}

/// A policy that passed every rule, with the policyholder's derived age.
///
/// Only the validation module can build one; the projector accepts nothing
/// else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedPolicy {
    date_of_birth: Option<NaiveDate>,
    sum_assured: Money,
    modal_premium: Money,
    premium_frequency: PremiumFrequency,
    policy_term: u32,
    premium_paying_term: u32,
    age: u32,
}

impl ValidatedPolicy {
    pub(crate) fn from_parts(
        date_of_birth: Option<NaiveDate>,
        sum_assured: Money,
        modal_premium: Money,
        premium_frequency: PremiumFrequency,
        policy_term: u32,
        premium_paying_term: u32,
        age: u32,
    ) -> Self {
        Self {
            date_of_birth,
            sum_assured,
            modal_premium,
            premium_frequency,
            policy_term,
            premium_paying_term,
            age,
        }
    }

    /// Date of birth, absent for bulk records that carry only an age
    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
    }

    pub fn sum_assured(&self) -> Money {
        self.sum_assured
    }

    pub fn modal_premium(&self) -> Money {
        self.modal_premium
    }

    pub fn premium_frequency(&self) -> PremiumFrequency {
        self.premium_frequency
    }

    pub fn policy_term(&self) -> u32 {
        self.policy_term
    }

    pub fn premium_paying_term(&self) -> u32 {
        self.premium_paying_term
    }

    /// Age at entry (completed years)
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Attained age in a given policy year
    /// Age increments at the start of each policy year
    pub fn attained_age(&self, policy_year: u32) -> u32 {
        self.age.saturating_add(policy_year.saturating_sub(1))
    }

    /// Whether premiums are still due in the given policy year
    pub fn in_paying_term(&self, policy_year: u32) -> bool {
        policy_year <= self.premium_paying_term
    }
}

/// One record of a bulk run, mirroring the bulk-path field set.
///
/// Carries an already-derived age rather than a date of birth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    /// Caller's id; the JSON loader also accepts a number here
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub sum_assured: Option<Money>,
    #[serde(default)]
    pub modal_premium: Option<Money>,
    #[serde(default)]
    pub premium_frequency: Option<String>,
    #[serde(default)]
    pub policy_term: Option<u32>,
    #[serde(default)]
    pub premium_paying_term: Option<u32>,
    #[serde(default)]
    pub calculated_age: Option<u32>,
}

impl BatchRecord {
    /// Names of the required fields that are absent.
    ///
    /// With `zero_is_missing`, a zero amount or term is treated as absent too.
    pub fn missing_fields(&self, zero_is_missing: bool) -> Vec<&'static str> {
        let money = |v: Option<Money>| match v {
            None => true,
            Some(v) => zero_is_missing && v.is_zero(),
        };
        let count = |v: Option<u32>| match v {
            None => true,
            Some(v) => zero_is_missing && v == 0,
        };
        let text = |v: &Option<String>| match v {
            None => true,
            Some(s) => s.trim().is_empty(),
        };

        let mut missing = Vec::new();
        if money(self.sum_assured) {
            missing.push("sum_assured");
        }
        if money(self.modal_premium) {
            missing.push("modal_premium");
        }
        if text(&self.premium_frequency) {
            missing.push("premium_frequency");
        }
        if count(self.policy_term) {
            missing.push("policy_term");
        }
        if count(self.premium_paying_term) {
            missing.push("premium_paying_term");
        }
        if count(self.calculated_age) {
            missing.push("calculated_age");
        }
        missing
    }
}
