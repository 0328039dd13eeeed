use crate::errors::AnalysisError;
use crate::models::{CorrelationMatrix, CorrelationPair, Entry, Metric, RankedCorrelations};
use tracing::debug;

pub const MIN_MATRIX_ENTRIES: usize = 5;
pub const STRONG_CORRELATION: f64 = 0.5;
pub const TOP_PAIRS: usize = 3;

/// Zero variance in either series yields `0.0`.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Result<f64, AnalysisError> {
    if xs.len() != ys.len() {
        return Err(AnalysisError::LengthMismatch {
            left: xs.len(),
            right: ys.len(),
        });
    }
    let n = xs.len();
    if n < 2 {
        return Err(AnalysisError::insufficient(2, n));
    }

    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let (mut covariance, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return Ok(0.0);
    }
    // sqrt(a * b) keeps perfect linear fits at exactly +/-1.
    Ok((covariance / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

// Pairwise-complete: only entries carrying both metrics count.
pub fn metric_correlation(entries: &[Entry], first: Metric, second: Metric) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = entries
        .iter()
        .filter_map(|entry| Some((entry.value(first)?, entry.value(second)?)))
        .unzip();
    pearson(&xs, &ys).unwrap_or(0.0)
}

pub fn correlation_matrix(entries: &[Entry]) -> Result<CorrelationMatrix, AnalysisError> {
    if entries.len() < MIN_MATRIX_ENTRIES {
        debug!(
            entries = entries.len(),
            required = MIN_MATRIX_ENTRIES,
            "not enough entries for a correlation matrix"
        );
        return Err(AnalysisError::insufficient(MIN_MATRIX_ENTRIES, entries.len()));
    }

    let metrics = Metric::ALL.to_vec();
    let size = metrics.len();
    let mut values = vec![vec![0.0; size]; size];
    for i in 0..size {
        values[i][i] = 1.0;
        for j in (i + 1)..size {
            let coefficient = metric_correlation(entries, metrics[i], metrics[j]);
            values[i][j] = coefficient;
            values[j][i] = coefficient;
        }
    }

    Ok(CorrelationMatrix {
        metrics,
        values,
        sample_size: entries.len(),
    })
}

pub fn rank_correlations(matrix: &CorrelationMatrix) -> RankedCorrelations {
    let pairs = matrix.pairs();
    RankedCorrelations {
        positive: strongest(&pairs, |r| r >= STRONG_CORRELATION),
        negative: strongest(&pairs, |r| r <= -STRONG_CORRELATION),
    }
}

fn strongest(pairs: &[CorrelationPair], keep: impl Fn(f64) -> bool) -> Vec<CorrelationPair> {
    let mut bucket: Vec<CorrelationPair> = pairs
        .iter()
        .filter(|pair| keep(pair.coefficient))
        .copied()
        .collect();
    bucket.sort_by(|a, b| b.coefficient.abs().total_cmp(&a.coefficient.abs()));
    bucket.truncate(TOP_PAIRS);
    bucket
}

pub fn correlations_with(matrix: &CorrelationMatrix, metric: Metric) -> Vec<CorrelationPair> {
    matrix
        .metrics
        .iter()
        .filter(|other| **other != metric)
        .filter_map(|&other| {
            matrix.get(metric, other).map(|coefficient| CorrelationPair {
                first: metric,
                second: other,
                coefficient,
            })
        })
        .collect()
}
