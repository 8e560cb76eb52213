// Analyzer module: aggregates submodules for the derived store views.

pub mod breakdown;
pub mod merge;
pub mod period;
pub mod store_analysis;
pub mod weekday;

// Re-export the main Analyzer implementation for ease of use.
pub use store_analysis::{Analyzer, AnalyzerImpl};
