//! Approximate confusion matrix reconstructed from per-class summary stats.
//!
//! The validation endpoint only returns precision/recall/F1 per class, not
//! raw true/predicted pairs, so the chart works from a notional 100 samples
//! per class. Off-diagonal writes assign rather than accumulate, so a later
//! class can overwrite an earlier class's contribution; the dashboard has
//! always drawn it that way and the chart is documented as an approximation.

use crate::api::wire::ClassMetrics;
use crate::results::label::Label;

/// Notional per-class sample count the reconstruction is scaled to.
const NOTIONAL_SUPPORT: f64 = 100.0;

/// 3×3 grid of estimated counts; rows are true labels, columns predicted.
pub type EstimatedMatrix = [[u32; Label::COUNT]; Label::COUNT];

/// Estimate a confusion matrix from per-class precision and recall.
///
/// For each class `i`: the diagonal gets `round(100·p·r)`; false positives
/// `round(100·p·(1-r))` are split evenly across the other predicted columns
/// of row `i`; false negatives `round(100·(1-p)·r)` are split evenly across
/// the other true rows of column `i`. Classes outside {0,1,2} are ignored.
pub fn estimate(class_metrics: &[ClassMetrics]) -> EstimatedMatrix {
    let mut matrix: EstimatedMatrix = [[0; Label::COUNT]; Label::COUNT];

    for metrics in class_metrics {
        let i = metrics.class_label.as_index();
        let p = f64::from(metrics.precision);
        let r = f64::from(metrics.recall);

        let tp = (NOTIONAL_SUPPORT * p * r).round() as u32;
        let fp = (NOTIONAL_SUPPORT * p * (1.0 - r)).round() as u32;
        let fn_ = (NOTIONAL_SUPPORT * (1.0 - p) * r).round() as u32;

        matrix[i][i] = tp;

        let fp_share = (f64::from(fp) / 2.0).round() as u32;
        let fn_share = (f64::from(fn_) / 2.0).round() as u32;
        for j in 0..Label::COUNT {
            if j == i {
                continue;
            }
            // Last write wins when classes overlap on a cell.
            matrix[i][j] = fp_share;
            matrix[j][i] = fn_share;
        }
    }

    matrix
}
