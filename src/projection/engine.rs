//! Year-by-year benefit illustration engine
//!
//! All arithmetic is checked: an amount that leaves the decimal range
//! surfaces as [`IllustrationError::Overflow`] instead of a panic.

use rust_decimal::{Decimal, RoundingStrategy};

use super::illustration::{IllustrationSummary, MaturityDetails, ProjectionResult, YearEntry};
use crate::config::IllustrationConfig;
use crate::error::{IllustrationError, Result};
use crate::policy::{Money, PremiumFrequency, ValidatedPolicy};

/// Round a currency amount to 2 fraction digits, half away from zero
pub fn round_money(amount: Decimal) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn checked_mul(lhs: Decimal, rhs: Decimal, context: &str) -> Result<Decimal> {
    lhs.checked_mul(rhs).ok_or_else(|| IllustrationError::Overflow {
        context: context.to_string(),
    })
}

fn checked_add(lhs: Decimal, rhs: Decimal, context: &str) -> Result<Decimal> {
    lhs.checked_add(rhs).ok_or_else(|| IllustrationError::Overflow {
        context: context.to_string(),
    })
}

/// Modal premium times installments per year.
///
/// Half-yearly and monthly modes carry no loading or discount; only the
/// installment count differs.
pub fn annual_premium(modal_premium: Money, frequency: PremiumFrequency) -> Result<Money> {
    let installments = Decimal::from(frequency.installments_per_year());
    checked_mul(modal_premium, installments, "annual premium").map(round_money)
}

/// Main illustration engine
#[derive(Debug, Clone, Default)]
pub struct IllustrationEngine {
    config: IllustrationConfig,
}

impl IllustrationEngine {
    pub fn new(config: IllustrationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IllustrationConfig {
        &self.config
    }

    /// Run the illustration for a single policy
    pub fn project(&self, policy: &ValidatedPolicy) -> Result<ProjectionResult> {
        let limit = self.config.max_projection_years;
        if policy.policy_term() > limit {
            return Err(IllustrationError::TermTooLong {
                years: policy.policy_term(),
                limit,
            });
        }

        let annual_premium = annual_premium(policy.modal_premium(), policy.premium_frequency())?;

        log::debug!(
            "projecting {} years (PPT {}) from age {}, annual premium {}",
            policy.policy_term(),
            policy.premium_paying_term(),
            policy.age(),
            annual_premium
        );

        let illustrations = (1..=policy.policy_term())
            .map(|year| self.calculate_year(policy, annual_premium, year))
            .collect::<Result<Vec<YearEntry>>>()?;

        // Same row as the final entry of the schedule
        let final_year = self.calculate_year(policy, annual_premium, policy.policy_term())?;
        let total_premiums_paid = checked_mul(
            annual_premium,
            Decimal::from(policy.premium_paying_term()),
            "total premiums paid",
        )?;
        let summary = IllustrationSummary {
            total_premiums_paid: round_money(total_premiums_paid),
            maturity_benefit: final_year.total_benefit,
            total_guaranteed_additions: final_year.cumulative_guaranteed_addition,
        };

        Ok(ProjectionResult {
            annual_premium,
            illustrations,
            summary,
        })
    }

    /// Maturity outcome, derived from a full illustration.
    ///
    /// Premiums paid can only be zero if the paying term is zero, which
    /// validation rejects; reaching that case means unvalidated data got in.
    pub fn maturity_details(&self, policy: &ValidatedPolicy) -> Result<MaturityDetails> {
        let result = self.project(policy)?;
        let total_premiums_paid = result.summary.total_premiums_paid;
        let maturity_benefit = result.summary.maturity_benefit;
        let net_gain = maturity_benefit
            .checked_sub(total_premiums_paid)
            .ok_or_else(|| IllustrationError::Overflow {
                context: "net gain".to_string(),
            })?;

        let return_ratio = net_gain.checked_div(total_premiums_paid).ok_or_else(|| {
            IllustrationError::DivisionByZero {
                context: "return percentage (total premiums paid is zero)".to_string(),
            }
        })?;
        let return_percentage =
            checked_mul(return_ratio, Decimal::ONE_HUNDRED, "return percentage")?;

        Ok(MaturityDetails {
            maturity_age: policy.attained_age(policy.policy_term()),
            maturity_benefit,
            total_premiums_paid,
            net_gain,
            return_percentage: round_money(return_percentage),
        })
    }

    /// Calculate the row for one policy year
    fn calculate_year(
        &self,
        policy: &ValidatedPolicy,
        annual_premium: Money,
        year: u32,
    ) -> Result<YearEntry> {
        let sum_assured = policy.sum_assured();
        let in_paying_term = policy.in_paying_term(year);
        let paid_years = Decimal::from(year.min(policy.premium_paying_term()));
        let addition_per_year = checked_mul(
            sum_assured,
            self.config.guaranteed_addition_rate,
            "guaranteed addition",
        )?;

        // Premiums stop after the paying term; the cumulative amount freezes
        let premium_paid = if in_paying_term { annual_premium } else { Decimal::ZERO };
        let cumulative_premium =
            round_money(checked_mul(annual_premium, paid_years, "cumulative premium")?);

        // Additions accrue only while premiums are paid
        let guaranteed_addition = if in_paying_term {
            round_money(addition_per_year)
        } else {
            Decimal::ZERO
        };
        let cumulative_guaranteed_addition = round_money(checked_mul(
            addition_per_year,
            paid_years,
            "cumulative guaranteed addition",
        )?);

        let total_benefit = round_money(checked_add(
            sum_assured,
            cumulative_guaranteed_addition,
            "total benefit",
        )?);

        let surrender_value = if year >= self.config.surrender_from_year {
            round_money(checked_mul(
                cumulative_premium,
                self.config.surrender_value_rate,
                "surrender value",
            )?)
        } else {
            Decimal::ZERO
        };

        // Floor-guaranteed at the sum assured
        let death_benefit = round_money(sum_assured.max(total_benefit));

        Ok(YearEntry {
            year,
            age: policy.attained_age(year),
            premium_paid,
            cumulative_premium,
            guaranteed_addition,
            cumulative_guaranteed_addition,
            total_benefit,
            surrender_value,
            death_benefit,
        })
    }
}
