use serde::Serialize;

use super::SummaryError;

/// Arithmetic mean over the full series. No samples are trimmed.
pub fn mean(series: &[f64], name: &'static str) -> Result<f64, SummaryError> {
    if series.is_empty() {
        return Err(SummaryError::EmptySeries { series: name });
    }
    Ok(series.iter().sum::<f64>() / series.len() as f64)
}

/// Mean frame time and the frame rate it implies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameTimeStats {
    /// Mean frame time in milliseconds.
    pub mean_ms: f64,
    /// `1000 / mean_ms`.
    pub fps: f64,
}

impl FrameTimeStats {
    /// Fails when the mean is not a positive finite number, since the frame
    /// rate would be infinite or meaningless.
    pub fn from_frame_times(frame_times_ms: &[f64]) -> Result<Self, SummaryError> {
        let mean_ms = mean(frame_times_ms, "FrameTimes")?;
        if mean_ms <= 0.0 || !mean_ms.is_finite() {
            return Err(SummaryError::NonPositiveMean {
                series: "FrameTimes",
                mean: mean_ms,
            });
        }
        Ok(Self {
            mean_ms,
            fps: 1000.0 / mean_ms,
        })
    }
}
