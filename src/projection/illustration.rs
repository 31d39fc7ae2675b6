//! Output structures for benefit illustrations

use serde::{Deserialize, Serialize};

use crate::policy::{Money, Rate};

/// A single row of the illustration for one policy year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearEntry {
    // Timing
    pub year: u32,
    pub age: u32,

    // Premiums
    pub premium_paid: Money,
    pub cumulative_premium: Money,

    // Guaranteed additions
    pub guaranteed_addition: Money,
    pub cumulative_guaranteed_addition: Money,

    // Benefits
    pub total_benefit: Money,
    pub surrender_value: Money,
    pub death_benefit: Money,
}

/// Totals taken from the final policy year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IllustrationSummary {
    pub total_premiums_paid: Money,
    pub maturity_benefit: Money,
    pub total_guaranteed_additions: Money,
}

/// Complete illustration for one policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Modal premium normalized to a year
    pub annual_premium: Money,

    /// One row per policy year, in order
    pub illustrations: Vec<YearEntry>,

    pub summary: IllustrationSummary,
}

impl ProjectionResult {
    /// Row for a policy year (1-based)
    pub fn year(&self, year: u32) -> Option<&YearEntry> {
        year.checked_sub(1)
            .and_then(|idx| self.illustrations.get(idx as usize))
    }

    pub fn final_year(&self) -> Option<&YearEntry> {
        self.illustrations.last()
    }
}

/// Outcome at the end of the policy term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaturityDetails {
    pub maturity_age: u32,
    pub maturity_benefit: Money,
    pub total_premiums_paid: Money,
    /// Maturity benefit less premiums paid
    pub net_gain: Money,
    /// Net gain as a percentage of premiums paid (125 = 125%)
    pub return_percentage: Rate,
}
