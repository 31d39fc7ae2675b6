//! Rules for identity-registration and login inputs
//!
//! Disjoint from the policy rules except for the date of birth and the
//! completed-birthday age, which come from the same helpers.

use serde::{Deserialize, Serialize};

use super::age::completed_age;
use super::policy::check_date_of_birth;
use crate::clock::Clock;
use crate::config::PolicyRules;

const GENDERS: [&str; 3] = ["M", "F", "Other"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default, alias = "dob")]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub age: Option<i32>,
}

/// Credentials presented at login
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Shape check only: a well-formed email and a non-empty password
pub fn validate_login(input: &LoginInput) -> LoginValidation {
    let mut errors = Vec::new();
    check_email(input.email.as_deref(), &mut errors);
    if matches!(input.password.as_deref(), None | Some("")) {
        errors.push("Password is required".to_string());
    }

    LoginValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Check a registration input; every violation is collected
pub fn validate_registration<C: Clock>(
    input: &RegistrationInput,
    rules: &PolicyRules,
    clock: &C,
) -> RegistrationValidation {
    let today = clock.today();
    let mut errors = Vec::new();

    match input.name.as_deref().map(str::trim) {
        None | Some("") => errors.push("Name is required".to_string()),
        Some(name) => {
            let len = name.chars().count();
            if !(2..=100).contains(&len) {
                errors.push("Name must be between 2 and 100 characters".to_string());
            }
        }
    }

    check_email(input.email.as_deref(), &mut errors);

    match input.password.as_deref() {
        None | Some("") => errors.push("Password is required".to_string()),
        Some(password) => {
            let len = password.chars().count();
            if !(6..=50).contains(&len) {
                errors.push("Password must be between 6 and 50 characters".to_string());
            }
        }
    }

    match input.mobile.as_deref() {
        None | Some("") => errors.push("Mobile number is required".to_string()),
        Some(mobile) if !(mobile.len() == 10 && mobile.bytes().all(|b| b.is_ascii_digit())) => {
            errors.push("Mobile number must be 10 digits".to_string())
        }
        Some(_) => {}
    }

    let dob = check_date_of_birth(input.date_of_birth.as_deref(), today, &mut errors);
    let age = dob.map(|dob| completed_age(dob, today));
    if let Some(age) = age {
        if i64::from(age) < i64::from(rules.min_registration_age) {
            errors.push(format!(
                "User must be at least {} years old",
                rules.min_registration_age
            ));
        }
    }

    match input.gender.as_deref() {
        None | Some("") => errors.push("Gender is required".to_string()),
        Some(gender) if !GENDERS.contains(&gender) => {
            errors.push(format!("Gender must be one of {}", GENDERS.join(", ")))
        }
        Some(_) => {}
    }

    RegistrationValidation {
        is_valid: errors.is_empty(),
        errors,
        age,
    }
}

fn check_email(email: Option<&str>, errors: &mut Vec<String>) {
    match email {
        None | Some("") => errors.push("Email is required".to_string()),
        Some(email) if !is_valid_email(email) => {
            errors.push("Email must be a valid email".to_string())
        }
        Some(_) => {}
    }
}

/// `local@domain.tld` with no whitespace and a dotted domain
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => {
            !host.is_empty()
                && tld.len() >= 2
                && !domain.starts_with('.')
                && !domain.contains("..")
        }
        None => false,
    }
}
