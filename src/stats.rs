//! Numeric helpers behind the chart renderers.

use std::ops::Range;

use statrs::statistics::{Data, OrderStatistics, Statistics};

const MAX_BINS: usize = 100;
// Box plot axes are f32; padding and binning overflow near the f64 limits.
const LARGE_MAGNITUDE: f64 = 1e30;
const KDE_POINTS: usize = 200;

/// Smallest and largest value, or `None` for an empty slice.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Axis range covering `values` with a small margin.
///
/// Degenerate inputs still yield a non-empty range: a single repeated value is
/// padded on both sides and an empty slice maps to `0.0..1.0`.  Callers with
/// values near the `f64` limits should divide by [`axis_scale`] first.
pub fn padded_range(values: &[f64]) -> Range<f64> {
    let range = match min_max(values) {
        None => return 0.0..1.0,
        Some((lo, hi)) if hi - lo <= f64::EPSILON * hi.abs().max(1.0) => {
            let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.1 };
            (lo, hi, pad)
        }
        Some((lo, hi)) => (lo, hi, (hi - lo) * 0.05),
    };
    let (lo, hi, pad) = range;
    let (start, end) = (lo - pad, hi + pad);
    if start.is_finite() && end.is_finite() {
        start..end
    } else {
        lo..hi
    }
}

/// Divisor that brings `values` into a range whose width is comfortably finite.
///
/// Returns `1.0` for ordinary data and a power of ten otherwise.
pub fn axis_scale(values: &[f64]) -> f64 {
    let Some((lo, hi)) = min_max(values) else {
        return 1.0;
    };
    let magnitude = lo.abs().max(hi.abs());
    if magnitude < LARGE_MAGNITUDE {
        return 1.0;
    }
    10f64.powi(magnitude.log10().floor() as i32)
}

/// Interquartile range of `values`. Zero for fewer than two values.
pub fn interquartile_range(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mut data = Data::new(values.to_vec());
    data.upper_quartile() - data.lower_quartile()
}

/// One histogram bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bin {
    /// Inclusive lower edge.
    pub start: f64,
    /// Upper edge, inclusive for the last bin only.
    pub end: f64,
    /// Number of values in the bin.
    pub count: usize,
}

/// Number of histogram bins: the larger of the Sturges and Freedman-Diaconis estimates.
pub fn bin_count(values: &[f64]) -> usize {
    let n = values.len();
    if n < 2 {
        return 1;
    }
    let sturges = (n as f64).log2().ceil() as usize + 1;
    let Some((lo, hi)) = min_max(values) else {
        return 1;
    };
    let iqr = interquartile_range(values);
    let fd = if iqr > 0.0 {
        let width = 2.0 * iqr / (n as f64).cbrt();
        (hi / width - lo / width).ceil() as usize
    } else {
        0
    };
    sturges.max(fd).clamp(1, MAX_BINS)
}

/// Bins `values` into equally wide bins spanning their range.
///
/// All-equal values produce a single bin of width one centred on the value.
pub fn histogram(values: &[f64]) -> Vec<Bin> {
    let Some((lo, hi)) = min_max(values) else {
        return Vec::new();
    };
    if hi - lo <= f64::EPSILON * hi.abs().max(1.0) {
        return vec![Bin {
            start: lo - 0.5,
            end: hi + 0.5,
            count: values.len(),
        }];
    }

    // edges are computed without `hi - lo`, which overflows for values near the f64 limits
    let bins = bin_count(values);
    let width = hi / bins as f64 - lo / bins as f64;
    let mut counts = vec![0usize; bins];
    for &value in values {
        let index = ((value / width - lo / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            start: edge(lo, hi, i, bins),
            end: edge(lo, hi, i + 1, bins),
            count,
        })
        .collect()
}

fn edge(lo: f64, hi: f64, index: usize, bins: usize) -> f64 {
    let t = index as f64 / bins as f64;
    lo * (1.0 - t) + hi * t
}

/// Gaussian kernel density estimate evaluated on an even grid over `range`.
///
/// The bandwidth follows Scott's rule.  The curve is multiplied by `scale`
/// so it can be drawn over a count histogram (`n * bin_width`).  Returns an
/// empty curve when the values have no spread.
pub fn gaussian_kde(values: &[f64], range: Range<f64>, scale: f64) -> Vec<(f64, f64)> {
    let n = values.len();
    if n < 2 {
        return Vec::new();
    }
    let bandwidth = values.std_dev() * (n as f64).powf(-0.2);
    if !bandwidth.is_finite() || bandwidth <= 0.0 {
        return Vec::new();
    }

    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let step = (range.end - range.start) / (KDE_POINTS - 1) as f64;
    (0..KDE_POINTS)
        .map(|i| {
            let x = range.start + step * i as f64;
            let density: f64 = values
                .iter()
                .map(|v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum();
            (x, density * norm * scale)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{axis_scale, bin_count, gaussian_kde, histogram, interquartile_range, padded_range};

    #[test]
    fn histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(|i| i as f64 * 0.37).collect();
        let bins = histogram(&values);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins.len(), bin_count(&values));
        assert_eq!(bins.first().map(|b| b.start), Some(0.0));
    }

    #[test]
    fn histogram_of_constant_values_is_single_bin() {
        let bins = histogram(&[4.0, 4.0, 4.0]);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
        assert!(bins[0].start < 4.0 && bins[0].end > 4.0);
    }

    #[test]
    fn histogram_of_nothing_is_empty() {
        assert!(histogram(&[]).is_empty());
    }

    #[test]
    fn interquartile_range_of_spread_and_degenerate_values() {
        let values: Vec<f64> = (1..=9).map(f64::from).collect();
        let iqr = interquartile_range(&values);
        assert!(iqr > 0.0 && iqr < 8.0, "iqr was {iqr}");
        assert_eq!(interquartile_range(&[3.0]), 0.0);
        assert_eq!(interquartile_range(&[2.0, 2.0, 2.0]), 0.0);
    }

    #[test]
    fn extreme_values_stay_finite() {
        let values = [1e308, -1e308, 0.0];

        let range = padded_range(&values);
        assert!(range.start.is_finite() && range.end.is_finite());

        let bins = histogram(&values);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
        assert!(bins.iter().all(|b| b.start.is_finite() && b.end.is_finite()));

        let scale = axis_scale(&values);
        assert!(scale >= 1e300);
        let scaled: Vec<f64> = values.iter().map(|v| v / scale).collect();
        assert!(scaled.iter().all(|v| v.abs() <= 100.0));
        let range = padded_range(&scaled);
        assert!((range.end - range.start).is_finite());
    }

    #[test]
    fn ordinary_values_are_not_scaled() {
        assert_eq!(axis_scale(&[]), 1.0);
        assert_eq!(axis_scale(&[-3.0, 4e9]), 1.0);
    }

    #[test]
    fn padded_range_never_collapses() {
        assert_eq!(padded_range(&[]), 0.0..1.0);
        let single = padded_range(&[0.0, 0.0]);
        assert!(single.start < 0.0 && single.end > 0.0);
        let spread = padded_range(&[0.0, 10.0]);
        assert!(spread.start < 0.0 && spread.end > 10.0);
    }

    #[test]
    fn kde_integrates_to_scale() {
        let values: Vec<f64> = (0..50).map(|i| (i % 10) as f64).collect();
        let curve = gaussian_kde(&values, -10.0..20.0, 1.0);
        let step = curve[1].0 - curve[0].0;
        let area: f64 = curve.iter().map(|(_, y)| y * step).sum();
        assert!((area - 1.0).abs() < 0.01, "area was {area}");
    }

    #[test]
    fn kde_of_constant_values_is_empty() {
        assert!(gaussian_kde(&[2.0, 2.0, 2.0], 0.0..4.0, 1.0).is_empty());
    }
}
