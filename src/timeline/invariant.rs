use serde::Serialize;

use super::event::{
    classify_events, ClassifiedEvent, EventRole, InvariantKind, INVARIANT_KIND_CARDINALITY,
};
use super::TimelineError;
use crate::run::RawEvent;

/// Distinct values observed per invariant parameter over a whole run.
///
/// Values are compared by bit pattern after folding `-0.0` into `0.0`, so
/// NaN is a regular (distinct) value rather than silently never matching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvariantSet {
    values: [Vec<f64>; INVARIANT_KIND_CARDINALITY],
}

impl InvariantSet {
    /// Classify raw events and gather invariant values from them.
    pub fn collect(events: &[RawEvent]) -> Result<Self, TimelineError> {
        let classified = classify_events(events)?;
        Ok(Self::from_events(&classified))
    }

    /// Gather invariant values from already classified events. Timestamps
    /// are ignored.
    pub fn from_events(events: &[ClassifiedEvent]) -> Self {
        let mut set = Self::default();
        for event in events {
            if let EventRole::Invariant(kind) = event.kind.role() {
                set.insert(kind, event.value);
            }
        }
        set
    }

    pub fn insert(&mut self, kind: InvariantKind, value: f64) {
        let value = if value == 0.0 { 0.0 } else { value };
        let seen = &mut self.values[kind.index()];
        if !seen.iter().any(|v| v.to_bits() == value.to_bits()) {
            seen.push(value);
        }
    }

    /// Distinct values in first-seen order.
    pub fn observed(&self, kind: InvariantKind) -> &[f64] {
        &self.values[kind.index()]
    }

    /// The single value observed for `kind`. Fails when the parameter was
    /// never emitted or changed during the run. Does not consume the set.
    pub fn assert_singleton(&self, kind: InvariantKind) -> Result<f64, TimelineError> {
        match self.observed(kind) {
            [value] => Ok(*value),
            observed => Err(TimelineError::NonConstantInvariant {
                kind,
                observed: observed.to_vec(),
            }),
        }
    }

    /// Assert every invariant kind, failing on the first violation.
    pub fn validate(&self) -> Result<Invariants, TimelineError> {
        Ok(Invariants {
            opacity_cutoff: self.assert_singleton(InvariantKind::OpacityCutoff)?,
            sampling_quality_factor: self.assert_singleton(InvariantKind::SamplingQualityFactor)?,
            homogeneity_tolerance: self.assert_singleton(InvariantKind::HomogeneityTolerance)?,
            lod_quality_factor: self.assert_singleton(InvariantKind::LodQualityFactor)?,
        })
    }
}

/// Validated run-wide parameter values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Invariants {
    pub opacity_cutoff: f64,
    pub sampling_quality_factor: f64,
    pub homogeneity_tolerance: f64,
    pub lod_quality_factor: f64,
}

impl Invariants {
    pub fn get(&self, kind: InvariantKind) -> f64 {
        match kind {
            InvariantKind::OpacityCutoff => self.opacity_cutoff,
            InvariantKind::SamplingQualityFactor => self.sampling_quality_factor,
            InvariantKind::HomogeneityTolerance => self.homogeneity_tolerance,
            InvariantKind::LodQualityFactor => self.lod_quality_factor,
        }
    }
}
