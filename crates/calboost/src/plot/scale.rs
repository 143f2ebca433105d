//! Axis scales and tick placement.

/// Maps a data interval onto a pixel interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    /// A degenerate domain is widened by ±0.5 so mapping stays finite.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let domain = if domain.1 > domain.0 {
            domain
        } else {
            (domain.0 - 0.5, domain.0 + 0.5)
        };
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    #[inline]
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }
}

/// Round tick positions covering `[min, max]`, about `target` of them.
///
/// Steps are 1, 2 or 5 times a power of ten.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() || target == 0 {
        return Vec::new();
    }
    if max <= min {
        return vec![min];
    }

    let raw = (max - min) / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

/// Tick label without trailing zeros.
pub fn format_tick(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let s = format!("{value:.3}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn maps_endpoints() {
        let scale = LinearScale::new((0.0, 10.0), (100.0, 0.0));
        assert_eq!(scale.map(0.0), 100.0);
        assert_eq!(scale.map(10.0), 0.0);
        assert_eq!(scale.map(5.0), 50.0);
    }

    #[test]
    fn degenerate_domain_is_widened() {
        let scale = LinearScale::new((3.0, 3.0), (0.0, 10.0));
        assert_eq!(scale.domain(), (2.5, 3.5));
        assert_eq!(scale.map(3.0), 5.0);
    }

    #[rstest]
    #[case(0.0, 10.0, 5, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0])]
    #[case(15.0, 80.0, 5, vec![20.0, 40.0, 60.0, 80.0])]
    #[case(-1.0, 1.0, 2, vec![-1.0, 0.0, 1.0])]
    fn nice_tick_positions(#[case] min: f64, #[case] max: f64, #[case] target: usize, #[case] expected: Vec<f64>) {
        assert_eq!(nice_ticks(min, max, target), expected);
    }

    #[test]
    fn tick_labels() {
        assert_eq!(format_tick(20.0), "20");
        assert_eq!(format_tick(0.5), "0.5");
        assert_eq!(format_tick(-0.25), "-0.25");
    }
}
