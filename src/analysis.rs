use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::run::BenchmarkRun;
use crate::summary::{summarize, RunSummary, SummaryError};
use crate::timeline::{classify_events, InvariantSet, Invariants, Timeline, TimelineError};

/// Any failure that aborts the analysis of a run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error(transparent)]
    Timeline(#[from] TimelineError),

    #[error(transparent)]
    Summary(#[from] SummaryError),
}

/// Everything derived from one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunAnalysis {
    pub timeline: Timeline,
    pub invariants: Invariants,
    pub summary: RunSummary,
}

/// Reconstruct the timeline, validate invariants, then summarize.
///
/// Invariants are validated before the summarizer runs, so a run with a
/// varying parameter never yields a summary.
pub fn analyze(run: &BenchmarkRun) -> Result<RunAnalysis, AnalysisError> {
    let events = classify_events(&run.events)?;

    let timeline = Timeline::from_events(&events, &run.timestamps)?;
    let invariants = InvariantSet::from_events(&events).validate()?;
    let summary = summarize(run, &invariants)?;

    debug!(
        mode = %summary.mode(),
        events = events.len(),
        phases = timeline.phases().len(),
        markers = timeline.markers().len(),
        "analyzed run",
    );

    Ok(RunAnalysis {
        timeline,
        invariants,
        summary,
    })
}
