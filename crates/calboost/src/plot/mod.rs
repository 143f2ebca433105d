//! Exploratory figures rendered as SVG.
//!
//! Figures are built in memory as [`Figure`]s; writing them to disk is a
//! separate step ([`Figure::save`]).
//!
//! - [`count_plot`]: bar chart of category counts
//! - [`dist_plot`]: density histogram with a Gaussian KDE overlay
//! - [`heatmap`]: annotated correlation heatmap with a colorbar

use std::path::{Path, PathBuf};

mod count;
mod distribution;
mod heatmap;
pub mod scale;
pub mod svg;

pub use count::count_plot;
pub use distribution::{dist_plot, freedman_diaconis_bins, gaussian_kde, scott_bandwidth};
pub use heatmap::{blues, heatmap};

use scale::{LinearScale, format_tick, nice_ticks};
use svg::{Anchor, Rgb, SvgDocument};

/// Errors raised while writing figures.
#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A rendered figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// File stem, e.g. `gender_count`.
    pub name: String,
    pub svg: String,
}

impl Figure {
    pub fn new(name: impl Into<String>, svg: String) -> Self {
        Self { name: name.into(), svg }
    }

    /// Write `<dir>/<name>.svg`, creating `dir` if needed.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, PlotError> {
        std::fs::create_dir_all(dir).map_err(|source| PlotError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(format!("{}.svg", self.name));
        std::fs::write(&path, &self.svg).map_err(|source| PlotError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "wrote figure");
        Ok(path)
    }
}

// =============================================================================
// Shared layout
// =============================================================================

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 480.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 60.0;
const FONT: f64 = 12.0;

/// Seaborn's default "deep" palette, first colors.
const PALETTE: [Rgb; 4] = [
    Rgb::hex(0x4c72b0),
    Rgb::hex(0xdd8452),
    Rgb::hex(0x55a868),
    Rgb::hex(0xc44e52),
];

/// Pixel rectangle of the plotting area inside the standard margins.
#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl PlotArea {
    fn standard() -> Self {
        Self {
            left: MARGIN_LEFT,
            right: WIDTH - MARGIN_RIGHT,
            top: MARGIN_TOP,
            bottom: HEIGHT - MARGIN_BOTTOM,
        }
    }

    fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Draw the y axis with nice ticks and horizontal grid lines; returns its scale.
    fn y_axis(&self, doc: &mut SvgDocument, max: f64, label: &str) -> LinearScale {
        let ticks = nice_ticks(0.0, max, 5);
        let top = ticks.last().copied().filter(|t| *t >= max).unwrap_or(max);
        let scale = LinearScale::new((0.0, top), (self.bottom, self.top));

        for tick in &ticks {
            let y = scale.map(*tick);
            doc.line(self.left, y, self.right, y, Rgb::GRID, 0.5);
            doc.text(self.left - 6.0, y, &format_tick(*tick), FONT, Anchor::End, Rgb::BLACK);
        }
        doc.line(self.left, self.bottom, self.left, self.top, Rgb::BLACK, 1.0);
        doc.vertical_text(18.0, (self.top + self.bottom) / 2.0, label, FONT);
        scale
    }

    /// Draw the x axis with nice ticks over `domain`; returns its scale.
    fn x_axis(&self, doc: &mut SvgDocument, domain: (f64, f64), label: &str) -> LinearScale {
        let scale = LinearScale::new(domain, (self.left, self.right));
        let (lo, hi) = scale.domain();
        for tick in nice_ticks(lo, hi, 6) {
            let x = scale.map(tick);
            doc.line(x, self.bottom, x, self.bottom + 4.0, Rgb::BLACK, 1.0);
            doc.text(x, self.bottom + 14.0, &format_tick(tick), FONT, Anchor::Middle, Rgb::BLACK);
        }
        doc.line(self.left, self.bottom, self.right, self.bottom, Rgb::BLACK, 1.0);
        self.x_label(doc, label);
        scale
    }

    fn x_label(&self, doc: &mut SvgDocument, label: &str) {
        doc.text(
            (self.left + self.right) / 2.0,
            HEIGHT - 18.0,
            label,
            FONT,
            Anchor::Middle,
            Rgb::BLACK,
        );
    }
}
