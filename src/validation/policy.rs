//! Business rules for policy inputs
//!
//! Every rule is evaluated and every violation collected, so callers can show
//! the full list at once. The derived age is reported whenever the date of
//! birth parses, even when other rules fail.

use chrono::NaiveDate;
use serde::Serialize;

use super::age::{completed_age, parse_date};
use crate::clock::{Clock, SystemClock};
use crate::config::{BatchMode, PolicyRules};
use crate::error::{IllustrationError, Result};
use crate::policy::{BatchRecord, Money, PolicyInput, PremiumFrequency, ValidatedPolicy};

/// Outcome of validating one policy input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    /// Completed age, whenever the date of birth parsed
    pub age: Option<i32>,
    #[serde(skip)]
    policy: Option<ValidatedPolicy>,
}

impl PolicyValidation {
    /// The validated policy, present only when every rule passed
    pub fn policy(&self) -> Option<&ValidatedPolicy> {
        self.policy.as_ref()
    }

    /// Take the validated policy, or the full violation list
    pub fn into_policy(self) -> Result<ValidatedPolicy> {
        self.policy.ok_or(IllustrationError::Validation(self.errors))
    }
}

/// Validator for policy inputs, generic over its source of "today"
#[derive(Debug, Clone)]
pub struct PolicyValidator<C = SystemClock> {
    rules: PolicyRules,
    clock: C,
}

impl PolicyValidator<SystemClock> {
    /// Default rules, host calendar date
    pub fn new() -> Self {
        Self::with_clock(PolicyRules::default(), SystemClock)
    }
}

impl Default for PolicyValidator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> PolicyValidator<C> {
    pub fn with_clock(rules: PolicyRules, clock: C) -> Self {
        Self { rules, clock }
    }

    pub fn rules(&self) -> &PolicyRules {
        &self.rules
    }

    /// Check a policy input against every rule
    pub fn validate(&self, input: &PolicyInput) -> PolicyValidation {
        let today = self.clock.today();
        let mut errors = Vec::new();

        let date_of_birth = check_date_of_birth(input.date_of_birth.as_deref(), today, &mut errors);
        let age = date_of_birth.map(|dob| completed_age(dob, today));
        if let Some(age) = age {
            errors.extend(check_age(&self.rules, age));
        }

        let frequency = errors_for_terms(
            &self.rules,
            &Terms {
                sum_assured: input.sum_assured,
                modal_premium: input.modal_premium,
                premium_frequency: input.premium_frequency.as_deref(),
                policy_term: input.policy_term,
                premium_paying_term: input.premium_paying_term,
            },
            &mut errors,
        );

        let policy = match (
            errors.is_empty(),
            date_of_birth,
            age.and_then(|a| u32::try_from(a).ok()),
            input.sum_assured,
            input.modal_premium,
            frequency,
            input.policy_term,
            input.premium_paying_term,
        ) {
            (true, Some(dob), Some(age), Some(sa), Some(mp), Some(freq), Some(pt), Some(ppt)) => {
                Some(ValidatedPolicy::from_parts(Some(dob), sa, mp, freq, pt, ppt, age))
            }
            _ => None,
        };

        if !errors.is_empty() {
            log::debug!("policy input rejected with {} violation(s)", errors.len());
        }

        PolicyValidation {
            is_valid: errors.is_empty(),
            errors,
            age,
            policy,
        }
    }
}

/// Screen a bulk record and, if it passes, build the policy to project.
///
/// Both modes first require every field. `Strict` then applies the same range
/// and cross-field rules as [`PolicyValidator::validate`], with the age rule
/// applied to the record's `calculated_age`. `Legacy` stops after the
/// completeness check, where a zero value also counts as missing.
pub fn screen_batch_record(
    rules: &PolicyRules,
    record: &BatchRecord,
    mode: BatchMode,
) -> std::result::Result<ValidatedPolicy, Vec<String>> {
    let missing = record.missing_fields(mode == BatchMode::Legacy);
    if !missing.is_empty() {
        let missing = missing.into_iter().map(String::from).collect();
        return Err(vec![IllustrationError::IncompleteRecord(missing).to_string()]);
    }

    let mut errors = Vec::new();
    let frequency = match mode {
        BatchMode::Strict => {
            if let Some(age) = record.calculated_age {
                errors.extend(check_age(rules, i64::from(age)));
            }
            errors_for_terms(
                rules,
                &Terms {
                    sum_assured: record.sum_assured,
                    modal_premium: record.modal_premium,
                    premium_frequency: record.premium_frequency.as_deref(),
                    policy_term: record.policy_term,
                    premium_paying_term: record.premium_paying_term,
                },
                &mut errors,
            )
        }
        BatchMode::Legacy => check_frequency(record.premium_frequency.as_deref(), &mut errors),
    };

    match (
        errors.is_empty(),
        record.sum_assured,
        record.modal_premium,
        frequency,
        record.policy_term,
        record.premium_paying_term,
        record.calculated_age,
    ) {
        (true, Some(sa), Some(mp), Some(freq), Some(pt), Some(ppt), Some(age)) => {
            Ok(ValidatedPolicy::from_parts(None, sa, mp, freq, pt, ppt, age))
        }
        _ => Err(errors),
    }
}

/// Term, premium, and amount fields shared by single and bulk inputs
struct Terms<'a> {
    sum_assured: Option<Money>,
    modal_premium: Option<Money>,
    premium_frequency: Option<&'a str>,
    policy_term: Option<u32>,
    premium_paying_term: Option<u32>,
}

/// Validate a date of birth; returns it only if it parsed.
///
/// A future date is still returned (so the age can be reported) but recorded
/// as a violation.
pub(crate) fn check_date_of_birth(
    raw: Option<&str>,
    today: NaiveDate,
    errors: &mut Vec<String>,
) -> Option<NaiveDate> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        errors.push("Date of birth is required".to_string());
        return None;
    };
    match parse_date(raw) {
        Ok(dob) => {
            if dob > today {
                errors.push("Date of birth cannot be in the future".to_string());
            }
            Some(dob)
        }
        Err(_) => {
            errors.push("Date of birth must be a valid date".to_string());
            None
        }
    }
}

fn check_age<A: Into<i64>>(rules: &PolicyRules, age: A) -> Vec<String> {
    let age = age.into();
    let mut errors = Vec::new();
    if age < i64::from(rules.min_age) {
        errors.push(format!("Age must be minimum {}", rules.min_age));
    }
    if age > i64::from(rules.max_age) {
        errors.push(format!("Age must be maximum {}", rules.max_age));
    }
    errors
}

/// Apply the term, premium, sum-assured, and frequency rules.
/// Returns the parsed frequency when it is valid.
fn errors_for_terms(
    rules: &PolicyRules,
    terms: &Terms<'_>,
    errors: &mut Vec<String>,
) -> Option<PremiumFrequency> {
    match terms.premium_paying_term {
        None => errors.push("Premium paying term (PPT) is required".to_string()),
        Some(ppt) => {
            if ppt < rules.min_premium_paying_term {
                errors.push(format!(
                    "Premium paying term (PPT) must be minimum {}",
                    rules.min_premium_paying_term
                ));
            }
            if ppt > rules.max_premium_paying_term {
                errors.push(format!(
                    "Premium paying term (PPT) must be maximum {}",
                    rules.max_premium_paying_term
                ));
            }
        }
    }

    match terms.policy_term {
        None => errors.push("Policy term (PT) is required".to_string()),
        Some(pt) => {
            if pt < rules.min_policy_term {
                errors.push(format!("Policy term (PT) must be minimum {}", rules.min_policy_term));
            }
            if pt > rules.max_policy_term {
                errors.push(format!("Policy term (PT) must be maximum {}", rules.max_policy_term));
            }
        }
    }

    if let (Some(pt), Some(ppt)) = (terms.policy_term, terms.premium_paying_term) {
        if pt <= ppt {
            errors.push(
                "Policy Term (PT) must be greater than Premium Paying Term (PPT)".to_string(),
            );
        }
    }

    match terms.modal_premium {
        None => errors.push("Premium is required".to_string()),
        Some(premium) => {
            if premium < rules.min_modal_premium {
                errors.push(format!(
                    "Premium must be minimum {}",
                    rules.min_modal_premium.normalize()
                ));
            }
            if premium > rules.max_modal_premium {
                errors.push(format!(
                    "Premium must be maximum {}",
                    rules.max_modal_premium.normalize()
                ));
            }
        }
    }

    match terms.sum_assured {
        None => errors.push("Sum assured is required".to_string()),
        Some(sum_assured) => {
            let required = rules.required_sum_assured(terms.modal_premium);
            if sum_assured < required {
                errors.push(format!(
                    "Sum assured must be minimum of {} ({} times premium or {}, \
                     whichever is higher)",
                    required.normalize(),
                    rules.sum_assured_premium_multiple.normalize(),
                    rules.min_sum_assured.normalize()
                ));
            }
        }
    }

    check_frequency(terms.premium_frequency, errors)
}

fn check_frequency(raw: Option<&str>, errors: &mut Vec<String>) -> Option<PremiumFrequency> {
    match raw {
        None => {
            errors.push("Premium frequency is required".to_string());
            None
        }
        Some(raw) => match raw.parse::<PremiumFrequency>() {
            Ok(freq) => Some(freq),
            Err(_) => {
                errors.push(format!(
                    "Premium frequency must be one of {}",
                    PremiumFrequency::ALL.map(|f| f.as_str()).join(", ")
                ));
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn validator() -> PolicyValidator<FixedClock> {
        PolicyValidator::with_clock(PolicyRules::default(), FixedClock(today()))
    }

    fn valid_input() -> PolicyInput {
        PolicyInput::new(
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            dec!(1200000),
            dec!(80000),
            PremiumFrequency::Yearly,
            18,
            10,
        )
    }

    fn has_error(result: &PolicyValidation, needle: &str) -> bool {
        result.errors.iter().any(|e| e.contains(needle))
    }

    #[test]
    fn test_valid_input_passes() {
        let result = validator().validate(&valid_input());
        assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
        assert!(result.errors.is_empty());
        assert_eq!(result.age, Some(34));

        let policy = result.into_policy().unwrap();
        assert_eq!(policy.age(), 34);
        assert_eq!(policy.policy_term(), 18);
        assert_eq!(policy.premium_frequency(), PremiumFrequency::Yearly);
    }

    #[test]
    fn test_ppt_bounds() {
        let mut input = valid_input();
        input.premium_paying_term = Some(3);
        let result = validator().validate(&input);
        assert!(!result.is_valid);
        assert!(has_error(&result, "Premium paying term (PPT) must be minimum 5"));

        input.premium_paying_term = Some(12);
        let result = validator().validate(&input);
        assert!(has_error(&result, "Premium paying term (PPT) must be maximum 10"));
    }

    #[test]
    fn test_pt_bounds() {
        let mut input = valid_input();
        input.policy_term = Some(8);
        let result = validator().validate(&input);
        assert!(has_error(&result, "Policy term (PT) must be minimum 10"));

        input.policy_term = Some(25);
        let result = validator().validate(&input);
        assert!(has_error(&result, "Policy term (PT) must be maximum 20"));
    }

    #[test]
    fn test_pt_must_exceed_ppt() {
        let mut input = valid_input();
        input.policy_term = Some(10);
        input.premium_paying_term = Some(10);
        let result = validator().validate(&input);
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec!["Policy Term (PT) must be greater than Premium Paying Term (PPT)".to_string()]
        );
    }

    #[test]
    fn test_premium_bounds() {
        let mut input = valid_input();
        input.modal_premium = Some(dec!(5000));
        let result = validator().validate(&input);
        assert!(has_error(&result, "Premium must be minimum 10000"));

        input.modal_premium = Some(dec!(110000));
        input.sum_assured = Some(dec!(2000000));
        let result = validator().validate(&input);
        assert!(has_error(&result, "Premium must be maximum 100000"));
    }

    #[test]
    fn test_sum_assured_floor() {
        let mut input = valid_input();
        input.modal_premium = Some(dec!(50000));
        input.sum_assured = Some(dec!(400000));
        let result = validator().validate(&input);
        assert!(!result.is_valid);
        assert!(has_error(&result, "Sum assured must be minimum of 500000"));
    }

    #[test]
    fn test_sum_assured_premium_multiple() {
        let mut input = valid_input();
        input.modal_premium = Some(dec!(80000));
        input.sum_assured = Some(dec!(700000));
        let result = validator().validate(&input);
        let expected = "Sum assured must be minimum of 800000 \
                        (10 times premium or 500000, whichever is higher)";
        assert!(result.errors.iter().any(|e| e == expected));
    }

    #[test]
    fn test_age_bounds() {
        let mut input = valid_input();
        input.date_of_birth = Some("2004-06-15".into());
        let result = validator().validate(&input);
        assert_eq!(result.age, Some(20));
        assert!(has_error(&result, "Age must be minimum 23"));

        input.date_of_birth = Some("1964-06-15".into());
        let result = validator().validate(&input);
        assert_eq!(result.age, Some(60));
        assert!(has_error(&result, "Age must be maximum 56"));
    }

    #[test]
    fn test_age_reported_when_other_rules_fail() {
        let mut input = valid_input();
        input.policy_term = Some(30);
        let result = validator().validate(&input);
        assert!(!result.is_valid);
        assert_eq!(result.age, Some(34));
        assert!(result.policy().is_none());
    }

    #[test]
    fn test_future_and_invalid_dates() {
        let mut input = valid_input();
        input.date_of_birth = Some("2030-01-01".into());
        let result = validator().validate(&input);
        assert!(has_error(&result, "Date of birth cannot be in the future"));

        input.date_of_birth = Some("01/01/1990".into());
        let result = validator().validate(&input);
        assert!(has_error(&result, "Date of birth must be a valid date"));
        assert_eq!(result.age, None);
    }

    #[test]
    fn test_all_violations_collected() {
        let input = PolicyInput {
            date_of_birth: None,
            sum_assured: Some(dec!(100)),
            modal_premium: Some(dec!(5)),
            premium_frequency: Some("Weekly".into()),
            policy_term: Some(5),
            premium_paying_term: Some(12),
        };
        let result = validator().validate(&input);
        assert!(!result.is_valid);
        assert_eq!(result.age, None);
        assert_eq!(result.errors.len(), 7);
        assert!(has_error(&result, "Date of birth is required"));
        assert!(has_error(
            &result,
            "Premium frequency must be one of Yearly, Half-Yearly, Monthly"
        ));
        assert!(has_error(
            &result,
            "Policy Term (PT) must be greater than Premium Paying Term (PPT)"
        ));
    }

    #[test]
    fn test_into_policy_carries_errors() {
        let mut input = valid_input();
        input.premium_paying_term = Some(3);
        match validator().validate(&input).into_policy() {
            Err(IllustrationError::Validation(errors)) => assert!(!errors.is_empty()),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    fn batch_record() -> BatchRecord {
        BatchRecord {
            id: Some("1".into()),
            sum_assured: Some(dec!(1200000)),
            modal_premium: Some(dec!(80000)),
            premium_frequency: Some("Yearly".into()),
            policy_term: Some(18),
            premium_paying_term: Some(10),
            calculated_age: Some(30),
        }
    }

    #[test]
    fn test_screen_batch_record_strict() {
        let rules = PolicyRules::default();
        let policy = screen_batch_record(&rules, &batch_record(), BatchMode::Strict).unwrap();
        assert_eq!(policy.age(), 30);
        assert_eq!(policy.date_of_birth(), None);

        let mut record = batch_record();
        record.calculated_age = Some(70);
        let errors = screen_batch_record(&rules, &record, BatchMode::Strict).unwrap_err();
        assert_eq!(errors, vec!["Age must be maximum 56".to_string()]);
    }

    #[test]
    fn test_screen_batch_record_legacy_skips_ranges() {
        let rules = PolicyRules::default();
        let mut record = batch_record();
        record.calculated_age = Some(70);
        record.policy_term = Some(40);
        let policy = screen_batch_record(&rules, &record, BatchMode::Legacy).unwrap();
        assert_eq!(policy.policy_term(), 40);
    }

    #[test]
    fn test_screen_batch_record_missing_fields() {
        let rules = PolicyRules::default();
        let mut record = batch_record();
        record.policy_term = None;
        for mode in [BatchMode::Strict, BatchMode::Legacy] {
            let errors = screen_batch_record(&rules, &record, mode).unwrap_err();
            assert_eq!(errors, vec!["Missing required fields: policy_term".to_string()]);
        }
    }
}
