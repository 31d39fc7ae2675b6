//! Benefit Illustration - validation and year-by-year projection for fixed-term savings policies
//!
//! This library provides:
//! - Policy input validation with itemized rule violations and derived age
//! - Registration input validation sharing the same age formula
//! - Year-by-year illustrations (premiums, guaranteed additions, surrender and death benefits)
//! - Maturity details (benefit, net gain, return percentage)
//! - Chunked, order-preserving batch illustrations
//!
//! Everything here is pure: no I/O outside the record and config loaders, and
//! "today" comes from an injected [`Clock`].

pub mod batch;
pub mod clock;
pub mod config;
pub mod error;
pub mod policy;
pub mod projection;
pub mod validation;

// Re-export commonly used types
pub use batch::{project_batch, BatchOutcome, BatchRunner};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{BatchConfig, BatchMode, EngineConfig, IllustrationConfig, PolicyRules};
pub use error::{IllustrationError, Result};
pub use policy::{BatchRecord, PolicyInput, PremiumFrequency, ValidatedPolicy};
pub use projection::{IllustrationEngine, MaturityDetails, ProjectionResult, YearEntry};
pub use validation::{PolicyValidation, PolicyValidator};
