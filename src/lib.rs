//! Timeline reconstruction and run summaries for volumetric rendering
//! benchmark records.

pub mod analysis;
pub mod config;
pub mod report;
pub mod run;
pub mod summary;
pub mod timeline;

pub use analysis::{analyze, AnalysisError, RunAnalysis};
pub use run::BenchmarkRun;
