//! Behavioral drift detection
//!
//! Compares a user's recent mean transaction amount against their longer
//! baseline. Recomputed from full history on every call.

use crate::config::DriftWindows;
use crate::profile::HistoricalTransaction;
use chrono::{DateTime, Duration, Utc};

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Drift percentage between the recent and baseline windows.
///
/// Recent covers the last `recent_days` before `now`; baseline covers the
/// remainder up to `baseline_days`. Returns 0 when either window holds too few
/// transactions or the baseline mean is zero.
pub fn behavioral_drift(
    history: &[HistoricalTransaction],
    now: DateTime<Utc>,
    windows: &DriftWindows,
) -> u32 {
    let recent_limit = Duration::try_days(windows.recent_days).unwrap_or(Duration::MAX);
    let baseline_limit = Duration::try_days(windows.baseline_days).unwrap_or(Duration::MAX);

    let mut recent = Vec::new();
    let mut baseline = Vec::new();
    for txn in history {
        let age = now - txn.timestamp;
        if age < Duration::zero() {
            continue;
        }
        if age <= recent_limit {
            recent.push(txn.amount);
        } else if age <= baseline_limit {
            baseline.push(txn.amount);
        }
    }

    if recent.len() < windows.min_recent || baseline.len() < windows.min_baseline {
        return 0;
    }

    let baseline_mean = mean(&baseline);
    if baseline_mean == 0.0 {
        return 0;
    }

    (100.0 * (mean(&recent) - baseline_mean).abs() / baseline_mean).round() as u32
}
