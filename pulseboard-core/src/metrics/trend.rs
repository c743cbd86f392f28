//! Direction of change across a daily series.

use super::aggregate::DailyStats;
use crate::format::{ratio, round_to};
use serde::Serialize;
use std::fmt;

/// Whether activity grew, shrank or held steady.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

impl TrendDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
            TrendDirection::InsufficientData => "insufficient_data",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub direction: TrendDirection,
    /// Change of the second-half mean over the first-half mean, in percent
    pub percent_change: f64,
}

impl Trend {
    pub fn insufficient() -> Self {
        Self {
            direction: TrendDirection::InsufficientData,
            percent_change: 0.0,
        }
    }
}

/// Trend of `session_count` across `days` (oldest first).
pub fn trend(days: &[DailyStats]) -> Trend {
    let counts: Vec<usize> = days.iter().map(|d| d.session_count).collect();
    trend_of_counts(&counts)
}

/// Trend of a raw per-day count series.
///
/// The series splits at `len / 2`; with an odd length the middle day belongs
/// to the second half.
pub fn trend_of_counts(counts: &[usize]) -> Trend {
    if counts.len() < 2 {
        return Trend::insufficient();
    }

    let mid = counts.len() / 2;
    let first = mean(&counts[..mid]);
    let second = mean(&counts[mid..]);

    let direction = if second > first {
        TrendDirection::Increasing
    } else if second < first {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    Trend {
        direction,
        percent_change: round_to(ratio(second - first, first) * 100.0, 1),
    }
}

fn mean(counts: &[usize]) -> f64 {
    ratio(counts.iter().sum::<usize>() as f64, counts.len() as f64)
}
