//! Presentation helpers consumed by chart/report front-ends.
//!
//! Nothing here feeds back into the summary: cropping leading frame times
//! only changes the plotted series, never the reported means.

use std::fmt::Write;

use serde::Serialize;

use crate::analysis::RunAnalysis;
use crate::run::BenchmarkRun;
use crate::summary::{RenderingMode, RunSummary};
use crate::timeline::{relative_seconds, EventKind};

/// One plotted frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FramePoint {
    pub time_s: f64,
    pub frame_time_ms: f64,
}

/// Frame times against relative time, skipping the first `ignore_first_n`
/// frames (warm-up outliers).
pub fn frame_series(run: &BenchmarkRun, ignore_first_n: usize) -> Vec<FramePoint> {
    let origin_ms = run.origin_ms();
    run.timestamps
        .iter()
        .zip(&run.frame_times)
        .skip(ignore_first_n)
        .map(|(&ts, &frame_time_ms)| FramePoint {
            time_s: relative_seconds(ts, origin_ms),
            frame_time_ms,
        })
        .collect()
}

/// Chart title for a rendering mode.
pub const fn title(mode: RenderingMode) -> &'static str {
    match mode {
        RenderingMode::InCore => "In-Core DVR Frame Times (Lower is Better)",
        RenderingMode::OutOfCorePoint => {
            "Out-of-Core Virtual Memory DVR Approach Frame Times (Lower is Better)"
        }
        RenderingMode::OutOfCoreHybrid => {
            "Out-of-Core Hybrid DVR Approach Frame Times (Lower is Better)"
        }
    }
}

/// Parameter box lines, in the order the reference charts list them.
pub fn parameter_lines(summary: &RunSummary) -> Vec<String> {
    let common = summary.common();
    let frame_times = &common.frame_times;

    let mut lines = vec![
        format!(
            "Screen Dims = {} x {}",
            common.screen_width, common.screen_height
        ),
        format!("Chunk Size = {}", common.chunk_size),
    ];

    if let Some(ooc) = summary.out_of_core() {
        lines.push(format!("Brick Size = {}", ooc.brick_size));
    }

    lines.push(format!(
        "Sampling Quality Factor = {:.2}",
        common.sampling_quality_factor
    ));
    lines.push(format!("Opacity Cutoff = {}", common.opacity_cutoff));
    lines.push(format!("LOD Quality Factor = {:.2}", common.lod_quality_factor));

    match summary {
        RunSummary::InCore {
            cpu_cache_load_time_s,
            ..
        } => {
            lines.push(format!("Total Nbr Bricks = {}", common.nbr_bricks));
            lines.push(format!(
                "Max Nbr GPU Brick Uploads Per Frame = {}",
                common.max_gpu_brick_uploads_per_frame
            ));
            lines.push(format!(
                "CPU Brick Cache Size = {}MBs",
                common.cpu_brick_cache_size_mbs
            ));
            lines.push(format!(
                "Max Nbr Importer Threads = {}",
                common.max_importer_threads
            ));
            lines.push(format!(
                "Bricks Loading Time To CPU Cache = {cpu_cache_load_time_s:.2}s"
            ));
        }
        RunSummary::OutOfCorePoint { out_of_core, .. }
        | RunSummary::OutOfCoreHybrid { out_of_core, .. } => {
            lines.push(format!(
                "Homogeneity Tolerance = {}",
                out_of_core.homogeneity_tolerance as i64
            ));
            lines.push(format!(
                "Max Nbr GPU Brick Uploads Per Frame = {}",
                common.max_gpu_brick_uploads_per_frame
            ));
            lines.push(format!(
                "Max Nbr Importer Threads = {}",
                common.max_importer_threads
            ));
            lines.push(format!(
                "CPU Brick Cache Size = {}MBs",
                common.cpu_brick_cache_size_mbs
            ));
            lines.push(format!(
                "GPU Brick Cache Size = {}MBs",
                out_of_core.gpu_brick_cache_size_mbs
            ));
            lines.push(format!(
                "Max Nbr Brick Requests Per Frame = {}",
                out_of_core.max_brick_requests_per_frame
            ));
            lines.push(format!(
                "Max Nbr Brick Requests Per Ray = {}",
                out_of_core.max_brick_requests_per_ray
            ));
        }
    }

    if let RunSummary::OutOfCoreHybrid {
        octree_start_depth,
        octree_max_depth,
        ..
    } = summary
    {
        lines.push(format!("Octree Start Depth = {octree_start_depth}"));
        lines.push(format!("Octree Max Depth = {octree_max_depth}"));
    }

    lines.push(format!(
        "Frametime Average = {:.2}ms ({} fps)",
        frame_times.mean_ms, frame_times.fps as i64
    ));

    if let Some(ooc) = summary.out_of_core() {
        lines.push(format!("FCT Average = {:.3}s", ooc.mean_fct));
    }

    lines
}

/// Plain-text report for one run.
pub fn render_text(analysis: &RunAnalysis, run: &BenchmarkRun, ignore_first_n: usize) -> String {
    let mut out = String::new();
    let timeline = &analysis.timeline;

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}", title(analysis.summary.mode()));
    for line in parameter_lines(&analysis.summary) {
        let _ = writeln!(out, "  {line}");
    }

    let _ = writeln!(out, "Phases:");
    for phase in timeline.phases() {
        let _ = writeln!(
            out,
            "  {:<24} {:>8.3}s .. {:>8.3}s ({:.3}s)",
            phase.family.label(),
            phase.start_s,
            phase.end_s,
            phase.duration_s()
        );
    }

    let _ = writeln!(out, "Markers:");
    for kind in [
        EventKind::NewRandomRotationAxis,
        EventKind::NewRandomLookAtPoint,
    ] {
        let _ = writeln!(out, "  {:<24} {}", kind.as_str(), timeline.markers_of(kind).count());
    }

    let plotted = frame_series(run, ignore_first_n).len();
    let _ = writeln!(
        out,
        "Frames: {} plotted of {} over {:.3}s",
        plotted,
        run.frame_times.len(),
        timeline.duration_s()
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;

    fn run(mode: i64) -> BenchmarkRun {
        let json = serde_json::json!({
            "DatasetMetadata": { "chunk_size": 128 },
            "PipelineParameters": {
                "RenderingMode": mode,
                "BrickSize": 32,
                "OctreeStartDepth": 1,
                "OctreeMaxDepth": 5,
            },
            "BricksLoadingTimeToCPUCache": 2500.0,
            "ScreenWidth": 800,
            "ScreenHeight": 600,
            "Timestamps": [1000, 1010, 1020, 1030, 1040, 1050, 1060],
            "FrameTimes": [90.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0],
            "FCTTimes": [0.25],
            "Events": [
                { "Timestamp": 900, "Type": 0, "Value": 0.5 },
                { "Timestamp": 900, "Type": 1, "Value": 1.0 },
                { "Timestamp": 900, "Type": 5, "Value": 4.0 },
                { "Timestamp": 900, "Type": 13, "Value": 1.0 },
                { "Timestamp": 1000, "Type": 9 },
                { "Timestamp": 1030, "Type": 3 },
                { "Timestamp": 1060, "Type": 10 },
            ],
        });
        BenchmarkRun::from_json_str(&json.to_string()).expect("run")
    }

    #[test]
    fn test_frame_series_crops_leading_frames() {
        let run = run(0);
        let series = frame_series(&run, 5);
        assert_eq!(series.len(), 2);
        assert!((series[0].time_s - 0.05).abs() < 1e-9);
        assert_eq!(series[0].frame_time_ms, 10.0);
    }

    #[test]
    fn test_frame_series_crop_beyond_length() {
        assert!(frame_series(&run(0), 100).is_empty());
        assert_eq!(frame_series(&run(0), 0).len(), 7);
    }

    #[test]
    fn test_crop_does_not_change_mean() {
        let run = run(0);
        let analysis = analyze(&run).expect("analysis");
        let _ = frame_series(&run, 5);
        // (90 + 6 * 10) / 7
        let expected = 150.0 / 7.0;
        assert!((analysis.summary.common().frame_times.mean_ms - expected).abs() < 1e-9);
    }

    #[test]
    fn test_in_core_parameter_lines() {
        let analysis = analyze(&run(0)).expect("analysis");
        let lines = parameter_lines(&analysis.summary);
        assert_eq!(lines[0], "Screen Dims = 800 x 600");
        assert!(lines.contains(&"Opacity Cutoff = 128".to_string()));
        assert!(lines.contains(&"Bricks Loading Time To CPU Cache = 2.50s".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("FCT Average")));
        assert!(!lines.iter().any(|l| l.starts_with("Brick Size")));
    }

    #[test]
    fn test_hybrid_parameter_lines() {
        let analysis = analyze(&run(2)).expect("analysis");
        let lines = parameter_lines(&analysis.summary);
        assert!(lines.contains(&"Brick Size = 32".to_string()));
        assert!(lines.contains(&"Homogeneity Tolerance = 4".to_string()));
        assert!(lines.contains(&"Octree Start Depth = 1".to_string()));
        assert!(lines.contains(&"Octree Max Depth = 5".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("FCT Average = 0.250s"));
    }

    #[test]
    fn test_render_text() {
        let run = run(1);
        let analysis = analyze(&run).expect("analysis");
        let text = render_text(&analysis, &run, 5);
        assert!(text.starts_with(title(RenderingMode::OutOfCorePoint)));
        assert!(text.contains("frametime measurements"));
        assert!(text.contains("new_random_rotation_axis"));
        assert!(text.contains("Frames: 2 plotted of 7 over 0.060s"));
    }
}
