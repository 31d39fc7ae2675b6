//! Engine configuration: rule limits, projection rates, and batch settings
//!
//! Every section deserializes with defaults, so a JSON file only needs the
//! values it overrides:
//!
//! ```json
//! { "batch": { "chunk_size": 250 }, "illustration": { "guaranteed_addition_rate": "0.04" } }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::policy::{Money, Rate};

/// Default number of records per batch chunk
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Limits applied by the policy and registration validators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyRules {
    pub min_age: u32,
    pub max_age: u32,
    pub min_premium_paying_term: u32,
    pub max_premium_paying_term: u32,
    pub min_policy_term: u32,
    pub max_policy_term: u32,
    pub min_modal_premium: Money,
    pub max_modal_premium: Money,
    /// Absolute floor on sum assured
    pub min_sum_assured: Money,
    /// Sum assured must also be at least this multiple of the modal premium
    pub sum_assured_premium_multiple: Decimal,
    /// Minimum age for identity registration
    pub min_registration_age: u32,
}

impl Default for PolicyRules {
    fn default() -> Self {
        Self {
            min_age: 23,
            max_age: 56,
            min_premium_paying_term: 5,
            max_premium_paying_term: 10,
            min_policy_term: 10,
            max_policy_term: 20,
            min_modal_premium: dec!(10000),
            max_modal_premium: dec!(100000),
            min_sum_assured: dec!(500000),
            sum_assured_premium_multiple: dec!(10),
            min_registration_age: 18,
        }
    }
}

impl PolicyRules {
    /// Minimum sum assured for a given modal premium.
    ///
    /// Saturates at `Decimal::MAX`, which no sum assured can exceed.
    pub fn required_sum_assured(&self, modal_premium: Option<Money>) -> Money {
        match modal_premium {
            Some(premium) => premium
                .checked_mul(self.sum_assured_premium_multiple)
                .unwrap_or(Decimal::MAX)
                .max(self.min_sum_assured),
            None => self.min_sum_assured,
        }
    }
}

/// Benefit rates used by the year loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IllustrationConfig {
    /// Guaranteed addition per paying year, as a share of sum assured
    pub guaranteed_addition_rate: Rate,
    /// Surrender value as a share of cumulative premium
    pub surrender_value_rate: Rate,
    /// First policy year with a surrender value
    pub surrender_from_year: u32,
    /// Longest schedule the engine will build
    pub max_projection_years: u32,
}

impl Default for IllustrationConfig {
    fn default() -> Self {
        Self {
            guaranteed_addition_rate: dec!(0.05),
            surrender_value_rate: dec!(0.8),
            surrender_from_year: 3,
            max_projection_years: 100,
        }
    }
}

/// How strictly bulk records are checked before projection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    /// Completeness check followed by every range and cross-field rule
    #[default]
    Strict,
    /// Completeness check only; zero values count as missing
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Records per chunk; bounds the peak working set
    pub chunk_size: usize,
    pub mode: BatchMode,
    /// Project records within a chunk in parallel
    pub parallel: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            mode: BatchMode::default(),
            parallel: true,
        }
    }
}

/// Container for all engine settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rules: PolicyRules,
    pub illustration: IllustrationConfig,
    pub batch: BatchConfig,
}

impl EngineConfig {
    /// Load settings from a JSON file; absent keys keep their defaults
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
