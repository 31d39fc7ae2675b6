//! Policy data structures and bulk record loading

mod data;
pub mod loader;

pub use data::{BatchRecord, Money, PolicyInput, PremiumFrequency, Rate, ValidatedPolicy};
pub use loader::{load_records, load_records_auto, load_records_from_reader, load_records_json};
