pub mod event;
pub mod invariant;
pub mod phase;

use thiserror::Error;

pub use self::event::{InvariantKind, PhaseFamily};

pub use self::event::{classify, classify_events, ClassifiedEvent, EventKind, EventRole};
pub use self::invariant::{InvariantSet, Invariants};
pub use self::phase::{reconstruct, relative_seconds, Marker, Phase, Timeline};

/// Errors that abort timeline reconstruction or invariant validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    #[error("unknown event kind code: {code}")]
    UnknownEventKind { code: i64 },

    #[error("{family} started at {timestamp_ms} ms while already open since {opened_at_ms} ms")]
    PhaseAlreadyOpen {
        family: PhaseFamily,
        opened_at_ms: i64,
        timestamp_ms: i64,
    },

    #[error("{family} ended at {timestamp_ms} ms without a matching start")]
    PhaseNotOpen {
        family: PhaseFamily,
        timestamp_ms: i64,
    },

    #[error("{family} opened at {opened_at_ms} ms was never closed")]
    PhaseNeverClosed {
        family: PhaseFamily,
        opened_at_ms: i64,
    },

    #[error("{kind} is not constant for the run (observed {observed:?})")]
    NonConstantInvariant {
        kind: InvariantKind,
        observed: Vec<f64>,
    },
}
