//! Distribution plot: density-normalized histogram plus a Gaussian KDE.

use rayon::prelude::*;

use super::svg::{Rgb, SvgDocument};
use super::{Figure, HEIGHT, PALETTE, PlotArea, WIDTH};
use crate::data::Column;
use crate::utils::{Parallelism, mean_std, quantile_sorted};

/// Histogram bin count cap.
const MAX_BINS: usize = 50;
/// Points at which the KDE curve is evaluated.
const KDE_POINTS: usize = 200;
/// The curve extends this many bandwidths past the data range.
const KDE_CUT: f64 = 3.0;

/// Freedman–Diaconis bin count for sorted values, capped at 50.
///
/// Falls back to `sqrt(n)` when the interquartile range is zero.
pub fn freedman_diaconis_bins(sorted: &[f64]) -> usize {
    let n = sorted.len();
    if n < 2 {
        return 1;
    }
    let range = sorted[n - 1] - sorted[0];
    if range <= 0.0 {
        return 1;
    }

    let iqr = quantile_sorted(sorted, 0.75) - quantile_sorted(sorted, 0.25);
    let width = 2.0 * iqr / (n as f64).cbrt();
    let bins = if width > 0.0 {
        (range / width).ceil() as usize
    } else {
        (n as f64).sqrt() as usize
    };
    bins.clamp(1, MAX_BINS)
}

/// Scott's rule bandwidth: `std * n^(-1/5)`.
pub fn scott_bandwidth(values: &[f64]) -> f64 {
    let (_, std) = mean_std(values);
    std * (values.len() as f64).powf(-0.2)
}

/// Gaussian kernel density estimate of `values` at each grid point.
pub fn gaussian_kde(values: &[f64], bandwidth: f64, grid: &[f64], parallelism: Parallelism) -> Vec<f64> {
    let n = values.len() as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let density = |x: f64| {
        values
            .iter()
            .map(|v| {
                let z = (x - v) / bandwidth;
                (-0.5 * z * z).exp()
            })
            .sum::<f64>()
            * norm
    };
    if parallelism.is_parallel() {
        grid.par_iter().map(|&x| density(x)).collect()
    } else {
        grid.iter().map(|&x| density(x)).collect()
    }
}

/// Histogram densities: `count / (n * bin_width)` per bin.
fn histogram(sorted: &[f64], bins: usize) -> (f64, f64, Vec<f64>) {
    let lo = sorted[0];
    let hi = sorted[sorted.len() - 1];
    let width = if hi > lo { (hi - lo) / bins as f64 } else { 1.0 };

    let mut counts = vec![0usize; bins];
    for v in sorted {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    let n = sorted.len() as f64;
    let densities = counts.iter().map(|&c| c as f64 / (n * width)).collect();
    (lo, width, densities)
}

/// Distribution plot of one column. Missing values are ignored.
pub fn dist_plot(name: &str, column: &Column, parallelism: Parallelism) -> Figure {
    let mut doc = SvgDocument::new(WIDTH, HEIGHT);
    let area = PlotArea::standard();

    let mut values: Vec<f64> = column.present().collect();
    values.sort_unstable_by(f64::total_cmp);

    if values.is_empty() {
        area.y_axis(&mut doc, 1.0, "Density");
        area.x_axis(&mut doc, (0.0, 1.0), column.name);
        return Figure::new(name, doc.finish());
    }

    let bins = freedman_diaconis_bins(&values);
    let (lo, bin_width, densities) = histogram(&values, bins);

    let bandwidth = scott_bandwidth(&values);
    let curve: Option<(Vec<f64>, Vec<f64>)> = (bandwidth.is_finite() && bandwidth > 0.0).then(|| {
        let start = values[0] - KDE_CUT * bandwidth;
        let end = values[values.len() - 1] + KDE_CUT * bandwidth;
        let step = (end - start) / (KDE_POINTS - 1) as f64;
        let grid: Vec<f64> = (0..KDE_POINTS).map(|i| start + step * i as f64).collect();
        let density = gaussian_kde(&values, bandwidth, &grid, parallelism);
        (grid, density)
    });

    let hist_max = densities.iter().copied().fold(0.0, f64::max);
    let kde_max = curve
        .as_ref()
        .map_or(0.0, |(_, d)| d.iter().copied().fold(0.0, f64::max));
    let (x_lo, x_hi) = curve
        .as_ref()
        .map_or((lo, lo + bin_width * bins as f64), |(g, _)| (g[0], g[g.len() - 1]));

    let y = area.y_axis(&mut doc, hist_max.max(kde_max), "Density");
    let x = area.x_axis(&mut doc, (x_lo, x_hi), column.name);

    let fill = PALETTE[0].to_string();
    for (i, d) in densities.iter().enumerate() {
        let left = x.map(lo + bin_width * i as f64);
        let right = x.map(lo + bin_width * (i + 1) as f64);
        let top = y.map(*d);
        doc.rect_paint(left, top, right - left, area.bottom - top, &fill, Some(Rgb::WHITE), 0.4);
    }

    if let Some((grid, density)) = &curve {
        let points: Vec<(f64, f64)> = grid.iter().zip(density).map(|(g, d)| (x.map(*g), y.map(*d))).collect();
        doc.polyline(&points, PALETTE[0], 1.5);
    }

    Figure::new(name, doc.finish())
}
