//! Descriptive statistics over plain `f64` samples.

/// Quartiles `(q1, median, q3)` of an ascending-sorted, non-empty sample,
/// linearly interpolated the way pandas does it.
pub fn quartiles(sorted: &[f64]) -> (f64, f64, f64) {
    (
        quantile(sorted, 0.25),
        quantile(sorted, 0.5),
        quantile(sorted, 0.75),
    )
}

/// Linear-interpolated quantile of an ascending-sorted, non-empty sample.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let idx = (sorted.len() - 1) as f64 * q;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    if lower == upper || upper >= sorted.len() {
        sorted[lower]
    } else {
        let fraction = idx - lower as f64;
        sorted[lower] * (1.0 - fraction) + sorted[upper] * fraction
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

// ---------------------------------------------------------------------------
// describe()
// ---------------------------------------------------------------------------

/// One row of the summary statistics table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    /// `None` when the column has no values.
    pub stats: Option<SummaryStats>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    pub mean: f64,
    /// Sample standard deviation; `None` below two values.
    pub std: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Summarise one numeric column; nulls must already be removed.
pub fn summarize(column: &str, values: &[f64]) -> ColumnSummary {
    let count = values.len();
    if count == 0 {
        return ColumnSummary {
            column: column.to_string(),
            count,
            stats: None,
        };
    }

    let sorted = sorted(values);
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = (count > 1).then(|| {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        var.sqrt()
    });
    let (q1, median, q3) = quartiles(&sorted);

    ColumnSummary {
        column: column.to_string(),
        count,
        stats: Some(SummaryStats {
            mean,
            std,
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[count - 1],
        }),
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins over `[min, max]`, the last bin closed on the right.
/// A constant sample lands in a single unit-wide bin.
pub fn histogram(values: &[f64], num_bins: usize) -> Vec<Bin> {
    if values.is_empty() {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max - min <= f64::EPSILON {
        return vec![Bin {
            start: min - 0.5,
            end: min + 0.5,
            count: values.len(),
        }];
    }

    let num_bins = num_bins.max(1);
    let width = (max - min) / num_bins as f64;
    let mut counts = vec![0usize; num_bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(num_bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let start = min + i as f64 * width;
            Bin {
                start,
                end: start + width,
                count,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Box statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    /// Lowest value within 1.5 IQR of Q1.
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Highest value within 1.5 IQR of Q3.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted(values);
    let (q1, median, q3) = quartiles(&sorted);

    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;

    let inside: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|&v| v >= lower_fence && v <= upper_fence)
        .collect();
    let lower_whisker = inside.first().copied().unwrap_or(sorted[0]);
    let upper_whisker = inside.last().copied().unwrap_or(sorted[sorted.len() - 1]);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|&v| v < lower_fence || v > upper_fence)
        .collect();

    Some(BoxStats {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quartiles_interpolate_between_ranks() {
        let (q1, median, q3) = quartiles(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!((q1, median, q3), (1.75, 2.5, 3.25));
        assert_eq!(quartiles(&[7.0]), (7.0, 7.0, 7.0));
    }

    #[test]
    fn summary_matches_pandas_describe() {
        let s = summarize("price", &[3000.0, 12000.0, 6000.0]);
        assert_eq!(s.count, 3);
        let stats = s.stats.unwrap();
        assert_eq!(stats.mean, 7000.0);
        assert_eq!(stats.min, 3000.0);
        assert_eq!(stats.median, 6000.0);
        assert_eq!(stats.max, 12000.0);
        assert_eq!(stats.q1, 4500.0);
        assert_eq!(stats.q3, 9000.0);
        // sample std of (3000, 6000, 12000) is sqrt(21e6)
        assert!((stats.std.unwrap() - 21_000_000f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn summary_of_empty_or_single_column() {
        let empty = summarize("price", &[]);
        assert_eq!(empty.count, 0);
        assert!(empty.stats.is_none());

        let single = summarize("price", &[5.0]).stats.unwrap();
        assert_eq!(single.std, None);
        assert_eq!(single.mean, 5.0);
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        let bins = histogram(&values, 50);
        assert_eq!(bins.len(), 50);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        // max lands in the last, closed bin
        assert_eq!(bins[49].count, 3);
        assert_eq!(bins[0].start, 0.0);
        assert!((bins[49].end - 100.0).abs() < 1e-9);
    }

    #[test]
    fn histogram_edge_cases() {
        assert!(histogram(&[], 50).is_empty());
        let flat = histogram(&[4.0, 4.0], 50);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].count, 2);
    }

    #[test]
    fn box_stats_split_outliers_from_whiskers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let stats = box_stats(&values).unwrap();
        assert_eq!(stats.median, 3.5);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.upper_whisker, 5.0);
        assert_eq!(stats.outliers, vec![100.0]);
        assert!(box_stats(&[]).is_none());
    }
}
