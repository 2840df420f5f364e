//! Benchmark run record as written by the rendering engine.
//!
//! Field names follow the engine's JSON output (PascalCase at the top
//! level, snake_case inside the dataset metadata). Only shape is checked
//! here; semantic validation lives in [`crate::timeline`] and
//! [`crate::summary`].

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a run record.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("reading run file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("run file {path} is {size} bytes, limit is {limit}")]
    TooLarge { path: String, size: u64, limit: u64 },

    #[error("parsing run record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("run record has no timestamps")]
    EmptyTimestamps,

    #[error("timestamps/frame times length mismatch: {timestamps} vs {frame_times}")]
    LengthMismatch {
        timestamps: usize,
        frame_times: usize,
    },
}

/// Structural description of the volumetric dataset. Opaque to the core
/// except for `chunk_size`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatasetMetadata {
    pub original_dims: Vec<u32>,
    pub chunk_size: u32,
    pub nbr_chunks_per_resolution_lvl: Vec<Vec<u32>>,
    pub total_nbr_chunks: Vec<u64>,
    pub nbr_resolution_lvls: u32,
    pub downsampling_inter: String,
    pub color_depth: u32,
    pub force_8bit_conversion: bool,
    pub lz4_compressed: bool,
    pub decompressed_chunk_size_in_bytes: u64,
    pub vdhms: Vec<Vec<f64>>,
    pub octree_nrb_nodes: u64,
    pub octree_max_depth: u32,
    pub octree_smallest_subdivision: Vec<f64>,
    pub octree_size_in_bytes: u64,
    pub histogram_nbr_bins: u32,
    pub voxel_dims: Vec<f64>,
    pub euler_rotation: Vec<f64>,
}

/// Configuration of the rendering pipeline under test. One fixed value per run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PipelineParameters {
    /// Raw variant selector; decoded by [`crate::summary::RenderingMode::from_code`].
    pub rendering_mode: i64,
    pub brick_size: i32,
    /// Zero or negative lets the engine pick the thread count.
    pub max_nbr_importer_threads: i32,
    #[serde(rename = "MaxNbrGPUBrickUploadsPerFrame")]
    pub max_nbr_gpu_brick_uploads_per_frame: i32,
    #[serde(rename = "GPUBrickCacheSizeMBs")]
    pub gpu_brick_cache_size_mbs: i32,
    #[serde(rename = "CPUBrickCacheSizeMBs")]
    pub cpu_brick_cache_size_mbs: i32,
    pub in_core_max_resolution_lvl: i32,
    pub max_nbr_brick_requests_per_frame: i32,
    pub max_nbr_brick_requests_per_ray: i32,
    pub octree_max_depth: i32,
    pub octree_start_depth: i32,
    pub brick_requests_random_tex_size: i32,
}

/// Host description captured at benchmark time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SystemInfoStats {
    #[serde(rename = "GPUMemorySize")]
    pub gpu_memory_size: i64,
    #[serde(rename = "CPUMemorySize")]
    pub cpu_memory_size: i64,
    #[serde(rename = "DeviceModel")]
    pub device_model: String,
    #[serde(rename = "GPUModel")]
    pub gpu_model: String,
    #[serde(rename = "CPUModel")]
    pub cpu_model: String,
    #[serde(rename = "MaxUAVs")]
    pub max_uavs: i64,
    #[serde(rename = "Compressed3DTextureSupport")]
    pub compressed_3d_texture_support: bool,
    #[serde(rename = "BatteryStatus")]
    pub battery_status: i64,
    #[serde(rename = "BatteryLevel")]
    pub battery_level: f64,
    #[serde(rename = "VRSSupport")]
    pub vrs_support: bool,
}

/// A raw `(timestamp, kind, value)` event. `kind` is still an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawEvent {
    /// Unix time in milliseconds.
    pub timestamp: i64,
    #[serde(rename = "Type")]
    pub kind: i64,
    #[serde(default)]
    pub value: f64,
}

impl RawEvent {
    pub fn new(timestamp: i64, kind: i64, value: f64) -> Self {
        Self {
            timestamp,
            kind,
            value,
        }
    }
}

/// Complete benchmark run. Immutable once loaded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BenchmarkRun {
    pub dataset_metadata: DatasetMetadata,
    pub pipeline_parameters: PipelineParameters,
    #[serde(rename = "BricksLoadingTimeToCPUCache", default)]
    pub bricks_loading_time_to_cpu_cache: f64,
    #[serde(rename = "BricksLoadingTimeToGPUCache", default)]
    pub bricks_loading_time_to_gpu_cache: f64,
    #[serde(default)]
    pub nbr_bricks: i64,
    #[serde(default)]
    pub screen_width: i32,
    #[serde(default)]
    pub screen_height: i32,
    #[serde(default)]
    pub system_info_stats: SystemInfoStats,
    /// Per-frame Unix time in milliseconds, non-decreasing.
    pub timestamps: Vec<i64>,
    /// Per-frame duration in milliseconds, parallel to `timestamps`.
    pub frame_times: Vec<f64>,
    /// Frame composition times, written by out-of-core runs only.
    #[serde(rename = "FCTTimes", default)]
    pub fct_times: Option<Vec<f64>>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

impl BenchmarkRun {
    /// Parse a run record from JSON and check its shape.
    pub fn from_json_str(data: &str) -> Result<Self, RunError> {
        let run: BenchmarkRun = serde_json::from_str(data)?;
        run.check_shape()?;
        Ok(run)
    }

    /// Read and parse a run record, refusing files above `max_size` bytes.
    pub fn load(path: &Path, max_size: u64) -> Result<Self, RunError> {
        let display = path.display().to_string();

        let size = std::fs::metadata(path)
            .map_err(|source| RunError::Io {
                path: display.clone(),
                source,
            })?
            .len();
        if size > max_size {
            return Err(RunError::TooLarge {
                path: display,
                size,
                limit: max_size,
            });
        }

        let data = std::fs::read_to_string(path).map_err(|source| RunError::Io {
            path: display,
            source,
        })?;

        Self::from_json_str(&data)
    }

    /// Reject records the core cannot reason about: no time origin, or
    /// timestamps not parallel to frame times.
    pub fn check_shape(&self) -> Result<(), RunError> {
        if self.timestamps.is_empty() {
            return Err(RunError::EmptyTimestamps);
        }

        if self.timestamps.len() != self.frame_times.len() {
            return Err(RunError::LengthMismatch {
                timestamps: self.timestamps.len(),
                frame_times: self.frame_times.len(),
            });
        }

        Ok(())
    }

    /// The run's time origin: the first frame timestamp.
    pub fn origin_ms(&self) -> i64 {
        self.timestamps.first().copied().unwrap_or_default()
    }
}
