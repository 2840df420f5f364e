use std::fmt;

use serde::Serialize;

use super::TimelineError;
use crate::run::RawEvent;

/// EventKind identifies a benchmarking event.
/// Values must match the engine's `BenchmarkingEventType` enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EventKind {
    NewOpacityCutoffValue = 0,
    NewSamplingQualityFactorValue = 1,
    NewInterpolationMethod = 2,
    NewRandomRotationAxis = 3,
    NewRandomLookAtPoint = 4,
    NewHomogeneityToleranceValue = 5,
    NewLodDistances = 6,
    BrickCacheWarmupStart = 7,
    BrickCacheWarmupEnd = 8,
    FrametimesMeasurementsStart = 9,
    FrametimesMeasurementsEnd = 10,
    FctMeasurementsStart = 11,
    FctMeasurementsEnd = 12,
    NewLodQualityFactor = 13,
}

/// Maximum EventKind value, used for array sizing.
pub const MAX_EVENT_KIND: usize = 13;

/// Phase families bounded by a START/END event pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseFamily {
    BrickCacheWarmup,
    FrametimeMeasurements,
    FctMeasurements,
}

/// Number of PhaseFamily variants.
pub const PHASE_FAMILY_CARDINALITY: usize = 3;

impl PhaseFamily {
    /// Returns the canonical log label name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BrickCacheWarmup => "brick_cache_warmup",
            Self::FrametimeMeasurements => "frametime_measurements",
            Self::FctMeasurements => "fct_measurements",
        }
    }

    /// Human-readable label used by chart annotations.
    pub const fn label(self) -> &'static str {
        match self {
            Self::BrickCacheWarmup => "caches warmup",
            Self::FrametimeMeasurements => "frametime measurements",
            Self::FctMeasurements => "FCT measurements",
        }
    }

    /// Position in per-family arrays.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Return all phase families in declaration order.
    pub fn all() -> &'static [Self] {
        &[
            Self::BrickCacheWarmup,
            Self::FrametimeMeasurements,
            Self::FctMeasurements,
        ]
    }
}

impl fmt::Display for PhaseFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline parameters that must stay constant for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantKind {
    OpacityCutoff,
    SamplingQualityFactor,
    HomogeneityTolerance,
    LodQualityFactor,
}

/// Number of InvariantKind variants.
pub const INVARIANT_KIND_CARDINALITY: usize = 4;

impl InvariantKind {
    /// Returns the canonical log label name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpacityCutoff => "opacity_cutoff",
            Self::SamplingQualityFactor => "sampling_quality_factor",
            Self::HomogeneityTolerance => "homogeneity_tolerance",
            Self::LodQualityFactor => "lod_quality_factor",
        }
    }

    /// Position in per-kind arrays.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Return all invariant kinds in declaration order.
    pub fn all() -> &'static [Self] {
        &[
            Self::OpacityCutoff,
            Self::SamplingQualityFactor,
            Self::HomogeneityTolerance,
            Self::LodQualityFactor,
        ]
    }
}

impl fmt::Display for InvariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an event means for timeline reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRole {
    Start(PhaseFamily),
    End(PhaseFamily),
    Invariant(InvariantKind),
    /// Point-in-time marker with no pairing.
    Marker,
}

impl EventKind {
    /// Returns the canonical log label name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewOpacityCutoffValue => "new_opacity_cutoff_value",
            Self::NewSamplingQualityFactorValue => "new_sampling_quality_factor_value",
            Self::NewInterpolationMethod => "new_interpolation_method",
            Self::NewRandomRotationAxis => "new_random_rotation_axis",
            Self::NewRandomLookAtPoint => "new_random_look_at_point",
            Self::NewHomogeneityToleranceValue => "new_homogeneity_tolerance_value",
            Self::NewLodDistances => "new_lod_distances",
            Self::BrickCacheWarmupStart => "brick_cache_warmup_start",
            Self::BrickCacheWarmupEnd => "brick_cache_warmup_end",
            Self::FrametimesMeasurementsStart => "frametimes_measurements_start",
            Self::FrametimesMeasurementsEnd => "frametimes_measurements_end",
            Self::FctMeasurementsStart => "fct_measurements_start",
            Self::FctMeasurementsEnd => "fct_measurements_end",
            Self::NewLodQualityFactor => "new_lod_quality_factor",
        }
    }

    /// Convert from a raw event code.
    pub fn from_code(v: i64) -> Option<Self> {
        match v {
            0 => Some(Self::NewOpacityCutoffValue),
            1 => Some(Self::NewSamplingQualityFactorValue),
            2 => Some(Self::NewInterpolationMethod),
            3 => Some(Self::NewRandomRotationAxis),
            4 => Some(Self::NewRandomLookAtPoint),
            5 => Some(Self::NewHomogeneityToleranceValue),
            6 => Some(Self::NewLodDistances),
            7 => Some(Self::BrickCacheWarmupStart),
            8 => Some(Self::BrickCacheWarmupEnd),
            9 => Some(Self::FrametimesMeasurementsStart),
            10 => Some(Self::FrametimesMeasurementsEnd),
            11 => Some(Self::FctMeasurementsStart),
            12 => Some(Self::FctMeasurementsEnd),
            13 => Some(Self::NewLodQualityFactor),
            _ => None,
        }
    }

    /// What this event contributes to the timeline.
    pub const fn role(self) -> EventRole {
        match self {
            Self::NewOpacityCutoffValue => EventRole::Invariant(InvariantKind::OpacityCutoff),
            Self::NewSamplingQualityFactorValue => {
                EventRole::Invariant(InvariantKind::SamplingQualityFactor)
            }
            Self::NewHomogeneityToleranceValue => {
                EventRole::Invariant(InvariantKind::HomogeneityTolerance)
            }
            Self::NewLodQualityFactor => EventRole::Invariant(InvariantKind::LodQualityFactor),

            Self::BrickCacheWarmupStart => EventRole::Start(PhaseFamily::BrickCacheWarmup),
            Self::BrickCacheWarmupEnd => EventRole::End(PhaseFamily::BrickCacheWarmup),
            Self::FrametimesMeasurementsStart => {
                EventRole::Start(PhaseFamily::FrametimeMeasurements)
            }
            Self::FrametimesMeasurementsEnd => EventRole::End(PhaseFamily::FrametimeMeasurements),
            Self::FctMeasurementsStart => EventRole::Start(PhaseFamily::FctMeasurements),
            Self::FctMeasurementsEnd => EventRole::End(PhaseFamily::FctMeasurements),

            Self::NewInterpolationMethod
            | Self::NewRandomRotationAxis
            | Self::NewRandomLookAtPoint
            | Self::NewLodDistances => EventRole::Marker,
        }
    }

    /// Return all event kinds in numeric order.
    pub fn all() -> &'static [Self] {
        &[
            Self::NewOpacityCutoffValue,
            Self::NewSamplingQualityFactorValue,
            Self::NewInterpolationMethod,
            Self::NewRandomRotationAxis,
            Self::NewRandomLookAtPoint,
            Self::NewHomogeneityToleranceValue,
            Self::NewLodDistances,
            Self::BrickCacheWarmupStart,
            Self::BrickCacheWarmupEnd,
            Self::FrametimesMeasurementsStart,
            Self::FrametimesMeasurementsEnd,
            Self::FctMeasurementsStart,
            Self::FctMeasurementsEnd,
            Self::NewLodQualityFactor,
        ]
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a raw event code onto its kind. Unknown codes are an error, never
/// dropped, since a missing START or END would corrupt phase pairing.
pub fn classify(code: i64) -> Result<EventKind, TimelineError> {
    EventKind::from_code(code).ok_or(TimelineError::UnknownEventKind { code })
}

/// A raw event whose code has been classified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifiedEvent {
    pub timestamp_ms: i64,
    pub kind: EventKind,
    pub value: f64,
}

/// Classify every event in arrival order, failing on the first unknown code.
pub fn classify_events(events: &[RawEvent]) -> Result<Vec<ClassifiedEvent>, TimelineError> {
    events
        .iter()
        .map(|e| {
            Ok(ClassifiedEvent {
                timestamp_ms: e.timestamp,
                kind: classify(e.kind)?,
                value: e.value,
            })
        })
        .collect()
}
