//! Phase reconstruction.
//!
//! Events are classified, stably sorted by timestamp (equal timestamps keep
//! arrival order, which reflects causal order in the engine), and replayed
//! through one open-start slot per [`PhaseFamily`]. START/END pairs become
//! closed [`Phase`] intervals; every other event is kept as a [`Marker`].

use serde::Serialize;

use super::event::{
    classify_events, ClassifiedEvent, EventKind, EventRole, PhaseFamily, PHASE_FAMILY_CARDINALITY,
};
use super::TimelineError;
use crate::run::BenchmarkRun;

/// Engine timestamps are milliseconds; relative times are seconds.
const MS_TO_S: f64 = 0.001;

/// Seconds elapsed between the run origin and `timestamp_ms`.
/// Negative for events emitted before the first measured frame. Computed in
/// `f64` so any pair of timestamps yields a finite result.
pub fn relative_seconds(timestamp_ms: i64, origin_ms: i64) -> f64 {
    (timestamp_ms as f64 - origin_ms as f64) * MS_TO_S
}

/// A closed interval bounded by a matching START/END pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Phase {
    pub family: PhaseFamily,
    pub start_s: f64,
    pub end_s: f64,
}

impl Phase {
    pub fn duration_s(&self) -> f64 {
        self.end_s - self.start_s
    }

    /// Center of the interval, where chart annotations are anchored.
    pub fn midpoint_s(&self) -> f64 {
        (self.start_s + self.end_s) / 2.0
    }
}

/// A point-in-time event that does not delimit a phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    pub kind: EventKind,
    pub time_s: f64,
    pub value: f64,
}

/// Reconstructed timeline of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    origin_ms: i64,
    duration_s: f64,
    phases: Vec<Phase>,
    markers: Vec<Marker>,
}

impl Timeline {
    /// Replay classified events against the frame timestamps of a run.
    ///
    /// `timestamps[0]` is the time origin; an empty slice falls back to an
    /// origin of zero.
    pub fn from_events(
        events: &[ClassifiedEvent],
        timestamps: &[i64],
    ) -> Result<Self, TimelineError> {
        let origin_ms = timestamps.first().copied().unwrap_or_default();
        let last_ms = timestamps.last().copied().unwrap_or(origin_ms);

        let mut sorted = events.to_vec();
        // Vec::sort_by_key is stable.
        sorted.sort_by_key(|e| e.timestamp_ms);

        let mut open: [Option<i64>; PHASE_FAMILY_CARDINALITY] = [None; PHASE_FAMILY_CARDINALITY];
        let mut phases = Vec::with_capacity(PHASE_FAMILY_CARDINALITY);
        let mut markers = Vec::new();

        for event in &sorted {
            match event.kind.role() {
                EventRole::Start(family) => {
                    let slot = &mut open[family.index()];
                    if let Some(opened_at_ms) = *slot {
                        return Err(TimelineError::PhaseAlreadyOpen {
                            family,
                            opened_at_ms,
                            timestamp_ms: event.timestamp_ms,
                        });
                    }
                    *slot = Some(event.timestamp_ms);
                }
                EventRole::End(family) => {
                    let Some(opened_at_ms) = open[family.index()].take() else {
                        return Err(TimelineError::PhaseNotOpen {
                            family,
                            timestamp_ms: event.timestamp_ms,
                        });
                    };
                    phases.push(Phase {
                        family,
                        start_s: relative_seconds(opened_at_ms, origin_ms),
                        end_s: relative_seconds(event.timestamp_ms, origin_ms),
                    });
                }
                EventRole::Invariant(_) | EventRole::Marker => markers.push(Marker {
                    kind: event.kind,
                    time_s: relative_seconds(event.timestamp_ms, origin_ms),
                    value: event.value,
                }),
            }
        }

        // Report the earliest dangling start so the message points at the
        // first place the log went wrong.
        let dangling = PhaseFamily::all()
            .iter()
            .filter_map(|&family| open[family.index()].map(|at| (family, at)))
            .min_by_key(|&(_, at)| at);
        if let Some((family, opened_at_ms)) = dangling {
            return Err(TimelineError::PhaseNeverClosed {
                family,
                opened_at_ms,
            });
        }

        Ok(Self {
            origin_ms,
            duration_s: relative_seconds(last_ms, origin_ms),
            phases,
            markers,
        })
    }

    /// Unix time of the first frame, in milliseconds.
    pub fn origin_ms(&self) -> i64 {
        self.origin_ms
    }

    /// Relative time of the last measured frame.
    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }

    /// Closed phases in the order they ended.
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// First closed phase of the given family, if any.
    pub fn phase(&self, family: PhaseFamily) -> Option<&Phase> {
        self.phases.iter().find(|p| p.family == family)
    }

    /// All markers in time order.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn markers_of(&self, kind: EventKind) -> impl Iterator<Item = &Marker> + '_ {
        self.markers.iter().filter(move |m| m.kind == kind)
    }
}

/// Classify and replay all events of a run.
pub fn reconstruct(run: &BenchmarkRun) -> Result<Timeline, TimelineError> {
    let events = classify_events(&run.events)?;
    Timeline::from_events(&events, &run.timestamps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::RawEvent;

    const WARMUP_START: i64 = EventKind::BrickCacheWarmupStart as i64;
    const WARMUP_END: i64 = EventKind::BrickCacheWarmupEnd as i64;
    const FT_START: i64 = EventKind::FrametimesMeasurementsStart as i64;
    const FT_END: i64 = EventKind::FrametimesMeasurementsEnd as i64;
    const ROTATION: i64 = EventKind::NewRandomRotationAxis as i64;
    const LOOK_AT: i64 = EventKind::NewRandomLookAtPoint as i64;

    fn build(raw: &[(i64, i64)], timestamps: &[i64]) -> Result<Timeline, TimelineError> {
        let events: Vec<RawEvent> = raw
            .iter()
            .map(|&(ts, kind)| RawEvent::new(ts, kind, 0.0))
            .collect();
        let classified = classify_events(&events)?;
        Timeline::from_events(&classified, timestamps)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_relative_seconds() {
        assert!(approx(relative_seconds(1500, 1000), 0.5));
        assert!(approx(relative_seconds(1000, 1000), 0.0));
        assert!(approx(relative_seconds(900, 1000), -0.1));
    }

    #[test]
    fn test_relative_seconds_extreme_timestamps() {
        let before = relative_seconds(i64::MIN, 1000);
        assert!(before.is_finite());
        assert!(before < 0.0);

        let after = relative_seconds(i64::MAX, i64::MIN);
        assert!(after.is_finite());
        assert!(after > 0.0);
    }

    #[test]
    fn test_pairs_start_and_end() {
        let tl = build(&[(1500, WARMUP_START), (2500, WARMUP_END)], &[1000, 1500, 2500])
            .expect("timeline");
        assert_eq!(tl.phases().len(), 1);
        let phase = tl.phase(PhaseFamily::BrickCacheWarmup).expect("warmup");
        assert!(approx(phase.start_s, 0.5));
        assert!(approx(phase.end_s, 1.5));
        assert!(phase.start_s <= phase.end_s);
        assert!(approx(phase.duration_s(), 1.0));
        assert!(approx(phase.midpoint_s(), 1.0));
    }

    #[test]
    fn test_sorts_unordered_events() {
        let tl = build(
            &[(3000, FT_END), (1000, WARMUP_START), (2000, FT_START), (1500, WARMUP_END)],
            &[1000, 3000],
        )
        .expect("timeline");
        let families: Vec<PhaseFamily> = tl.phases().iter().map(|p| p.family).collect();
        assert_eq!(
            families,
            vec![PhaseFamily::BrickCacheWarmup, PhaseFamily::FrametimeMeasurements]
        );
    }

    #[test]
    fn test_equal_timestamps_keep_arrival_order() {
        // The warmup ends and the measurement window starts in the same
        // millisecond; arrival order decides.
        let tl = build(
            &[
                (1000, WARMUP_START),
                (2000, WARMUP_END),
                (2000, FT_START),
                (2000, FT_END),
            ],
            &[1000],
        )
        .expect("timeline");
        assert_eq!(tl.phases().len(), 2);
        let ft = tl.phase(PhaseFamily::FrametimeMeasurements).expect("ft");
        assert!(approx(ft.duration_s(), 0.0));
    }

    #[test]
    fn test_unmatched_start_never_closed() {
        let err = build(&[(1000, WARMUP_START)], &[1000]).unwrap_err();
        assert_eq!(
            err,
            TimelineError::PhaseNeverClosed {
                family: PhaseFamily::BrickCacheWarmup,
                opened_at_ms: 1000,
            }
        );
    }

    #[test]
    fn test_never_closed_reports_earliest() {
        let err = build(&[(1200, FT_START), (1100, WARMUP_START)], &[1000]).unwrap_err();
        assert_eq!(
            err,
            TimelineError::PhaseNeverClosed {
                family: PhaseFamily::BrickCacheWarmup,
                opened_at_ms: 1100,
            }
        );
    }

    #[test]
    fn test_unmatched_end_not_open() {
        let err = build(&[(1000, FT_END)], &[1000]).unwrap_err();
        assert_eq!(
            err,
            TimelineError::PhaseNotOpen {
                family: PhaseFamily::FrametimeMeasurements,
                timestamp_ms: 1000,
            }
        );
    }

    #[test]
    fn test_double_open() {
        let err = build(&[(1000, WARMUP_START), (1100, WARMUP_START)], &[1000]).unwrap_err();
        assert_eq!(
            err,
            TimelineError::PhaseAlreadyOpen {
                family: PhaseFamily::BrickCacheWarmup,
                opened_at_ms: 1000,
                timestamp_ms: 1100,
            }
        );
    }

    #[test]
    fn test_same_family_may_reopen_after_close() {
        let tl = build(
            &[
                (1000, WARMUP_START),
                (1100, WARMUP_END),
                (1200, WARMUP_START),
                (1300, WARMUP_END),
            ],
            &[1000],
        )
        .expect("timeline");
        assert_eq!(tl.phases().len(), 2);
    }

    #[test]
    fn test_markers_in_time_order() {
        let tl = build(
            &[(2500, LOOK_AT), (1500, ROTATION), (2000, ROTATION)],
            &[1000, 1500, 2500],
        )
        .expect("timeline");
        let times: Vec<f64> = tl.markers().iter().map(|m| m.time_s).collect();
        assert_eq!(times.len(), 3);
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(tl.markers_of(EventKind::NewRandomRotationAxis).count(), 2);
        assert_eq!(tl.markers_of(EventKind::NewRandomLookAtPoint).count(), 1);
        assert!(approx(tl.markers()[0].time_s, 0.5));
    }

    #[test]
    fn test_parameter_events_become_markers() {
        let events = [RawEvent::new(900, 0, 0.95)];
        let classified = classify_events(&events).expect("classify");
        let tl = Timeline::from_events(&classified, &[1000]).expect("timeline");
        let marker = tl.markers()[0];
        assert_eq!(marker.kind, EventKind::NewOpacityCutoffValue);
        assert!(approx(marker.time_s, -0.1));
        assert!(approx(marker.value, 0.95));
    }

    #[test]
    fn test_duration_from_last_timestamp() {
        let tl = build(&[], &[1000, 1500, 2500]).expect("timeline");
        assert_eq!(tl.origin_ms(), 1000);
        assert!(approx(tl.duration_s(), 1.5));
        assert!(tl.phases().is_empty());
        assert!(tl.markers().is_empty());
    }
}
