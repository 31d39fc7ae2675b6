//! Input validation: policy rules, registration and login rules, and the
//! shared age formula

mod age;
mod policy;
mod registration;

pub use age::{completed_age, parse_date};
pub use policy::{screen_batch_record, PolicyValidation, PolicyValidator};
pub use registration::{
    validate_login, validate_registration, LoginInput, LoginValidation, RegistrationInput,
    RegistrationValidation,
};
