//! Benefit illustration for validated policies

mod engine;
mod illustration;

pub use engine::{annual_premium, round_money, IllustrationEngine};
pub use illustration::{IllustrationSummary, MaturityDetails, ProjectionResult, YearEntry};
