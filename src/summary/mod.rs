//! Variant-specific run summaries.
//!
//! Each rendering mode has its own builder. Fields shared between modes are
//! grouped in [`CommonSummary`] and [`OutOfCoreFields`], so the set of fields
//! a mode reports is fixed by its [`RunSummary`] variant.

pub mod stats;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use self::stats::{mean, FrameTimeStats};
use crate::run::BenchmarkRun;
use crate::timeline::Invariants;

/// Errors that abort summary construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SummaryError {
    #[error("unsupported rendering mode: {code}")]
    UnsupportedVariant { code: i64 },

    #[error("{mode} run is missing required metric {metric}")]
    MissingRequiredMetric {
        metric: &'static str,
        mode: RenderingMode,
    },

    #[error("cannot average empty series {series}")]
    EmptySeries { series: &'static str },

    #[error("mean of {series} is {mean}, cannot derive a rate from it")]
    NonPositiveMean { series: &'static str, mean: f64 },
}

/// Rendering strategy that produced a run.
/// Values must match the engine's `RenderingMode` enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum RenderingMode {
    InCore = 0,
    OutOfCorePoint = 1,
    OutOfCoreHybrid = 2,
}

impl RenderingMode {
    /// Returns the canonical log label name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InCore => "in_core",
            Self::OutOfCorePoint => "out_of_core_point",
            Self::OutOfCoreHybrid => "out_of_core_hybrid",
        }
    }

    /// Convert from a raw rendering mode code.
    pub fn from_code(code: i64) -> Result<Self, SummaryError> {
        match code {
            0 => Ok(Self::InCore),
            1 => Ok(Self::OutOfCorePoint),
            2 => Ok(Self::OutOfCoreHybrid),
            _ => Err(SummaryError::UnsupportedVariant { code }),
        }
    }

    /// Returns all rendering modes.
    pub fn all() -> &'static [Self] {
        &[Self::InCore, Self::OutOfCorePoint, Self::OutOfCoreHybrid]
    }
}

impl fmt::Display for RenderingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields reported by every rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CommonSummary {
    pub screen_width: i32,
    pub screen_height: i32,
    pub chunk_size: u32,
    pub sampling_quality_factor: f64,
    /// Opacity cutoff on the 8-bit transfer function scale.
    pub opacity_cutoff: u8,
    pub lod_quality_factor: f64,
    pub nbr_bricks: i64,
    pub max_gpu_brick_uploads_per_frame: i32,
    pub cpu_brick_cache_size_mbs: i32,
    pub max_importer_threads: i32,
    pub frame_times: FrameTimeStats,
}

/// Fields reported by both out-of-core modes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutOfCoreFields {
    pub brick_size: i32,
    pub homogeneity_tolerance: f64,
    pub gpu_brick_cache_size_mbs: i32,
    pub max_brick_requests_per_frame: i32,
    pub max_brick_requests_per_ray: i32,
    /// Mean frame composition time, in the engine's FCT unit (seconds).
    pub mean_fct: f64,
}

/// Summary of one validated run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RunSummary {
    InCore {
        common: CommonSummary,
        cpu_cache_load_time_s: f64,
    },
    OutOfCorePoint {
        common: CommonSummary,
        out_of_core: OutOfCoreFields,
    },
    OutOfCoreHybrid {
        common: CommonSummary,
        out_of_core: OutOfCoreFields,
        octree_start_depth: i32,
        octree_max_depth: i32,
    },
}

impl RunSummary {
    pub fn mode(&self) -> RenderingMode {
        match self {
            Self::InCore { .. } => RenderingMode::InCore,
            Self::OutOfCorePoint { .. } => RenderingMode::OutOfCorePoint,
            Self::OutOfCoreHybrid { .. } => RenderingMode::OutOfCoreHybrid,
        }
    }

    pub fn common(&self) -> &CommonSummary {
        match self {
            Self::InCore { common, .. }
            | Self::OutOfCorePoint { common, .. }
            | Self::OutOfCoreHybrid { common, .. } => common,
        }
    }

    pub fn out_of_core(&self) -> Option<&OutOfCoreFields> {
        match self {
            Self::InCore { .. } => None,
            Self::OutOfCorePoint { out_of_core, .. }
            | Self::OutOfCoreHybrid { out_of_core, .. } => Some(out_of_core),
        }
    }
}

/// Scale a `[0, 1]` opacity onto `[0, 255]`, saturating out-of-range input.
pub fn opacity_to_u8(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Build the summary for a run whose invariants have been validated.
pub fn summarize(run: &BenchmarkRun, invariants: &Invariants) -> Result<RunSummary, SummaryError> {
    match RenderingMode::from_code(run.pipeline_parameters.rendering_mode)? {
        RenderingMode::InCore => summarize_in_core(run, invariants),
        RenderingMode::OutOfCorePoint => summarize_out_of_core_point(run, invariants),
        RenderingMode::OutOfCoreHybrid => summarize_out_of_core_hybrid(run, invariants),
    }
}

fn common_summary(
    run: &BenchmarkRun,
    invariants: &Invariants,
) -> Result<CommonSummary, SummaryError> {
    let params = &run.pipeline_parameters;
    Ok(CommonSummary {
        screen_width: run.screen_width,
        screen_height: run.screen_height,
        chunk_size: run.dataset_metadata.chunk_size,
        sampling_quality_factor: invariants.sampling_quality_factor,
        opacity_cutoff: opacity_to_u8(invariants.opacity_cutoff),
        lod_quality_factor: invariants.lod_quality_factor,
        nbr_bricks: run.nbr_bricks,
        max_gpu_brick_uploads_per_frame: params.max_nbr_gpu_brick_uploads_per_frame,
        cpu_brick_cache_size_mbs: params.cpu_brick_cache_size_mbs,
        max_importer_threads: params.max_nbr_importer_threads,
        frame_times: FrameTimeStats::from_frame_times(&run.frame_times)?,
    })
}

fn out_of_core_fields(
    run: &BenchmarkRun,
    invariants: &Invariants,
    mode: RenderingMode,
) -> Result<OutOfCoreFields, SummaryError> {
    let fct_times = match run.fct_times.as_deref() {
        Some(series) if !series.is_empty() => series,
        _ => {
            return Err(SummaryError::MissingRequiredMetric {
                metric: "FCTTimes",
                mode,
            })
        }
    };

    let params = &run.pipeline_parameters;
    Ok(OutOfCoreFields {
        brick_size: params.brick_size,
        homogeneity_tolerance: invariants.homogeneity_tolerance,
        gpu_brick_cache_size_mbs: params.gpu_brick_cache_size_mbs,
        max_brick_requests_per_frame: params.max_nbr_brick_requests_per_frame,
        max_brick_requests_per_ray: params.max_nbr_brick_requests_per_ray,
        mean_fct: mean(fct_times, "FCTTimes")?,
    })
}

fn summarize_in_core(
    run: &BenchmarkRun,
    invariants: &Invariants,
) -> Result<RunSummary, SummaryError> {
    Ok(RunSummary::InCore {
        common: common_summary(run, invariants)?,
        cpu_cache_load_time_s: run.bricks_loading_time_to_cpu_cache * 0.001,
    })
}

fn summarize_out_of_core_point(
    run: &BenchmarkRun,
    invariants: &Invariants,
) -> Result<RunSummary, SummaryError> {
    Ok(RunSummary::OutOfCorePoint {
        common: common_summary(run, invariants)?,
        out_of_core: out_of_core_fields(run, invariants, RenderingMode::OutOfCorePoint)?,
    })
}

fn summarize_out_of_core_hybrid(
    run: &BenchmarkRun,
    invariants: &Invariants,
) -> Result<RunSummary, SummaryError> {
    let params = &run.pipeline_parameters;
    Ok(RunSummary::OutOfCoreHybrid {
        common: common_summary(run, invariants)?,
        out_of_core: out_of_core_fields(run, invariants, RenderingMode::OutOfCoreHybrid)?,
        octree_start_depth: params.octree_start_depth,
        octree_max_depth: params.octree_max_depth,
    })
}
