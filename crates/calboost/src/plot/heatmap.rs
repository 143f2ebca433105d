//! Annotated correlation heatmap.

use super::svg::{Anchor, Rgb, SvgDocument};
use super::{FONT, Figure};
use crate::analysis::CorrelationMatrix;

/// ColorBrewer "Blues", light to dark.
const BLUES: [Rgb; 9] = [
    Rgb::hex(0xf7fbff),
    Rgb::hex(0xdeebf7),
    Rgb::hex(0xc6dbef),
    Rgb::hex(0x9ecae1),
    Rgb::hex(0x6baed6),
    Rgb::hex(0x4292c6),
    Rgb::hex(0x2171b5),
    Rgb::hex(0x08519c),
    Rgb::hex(0x08306b),
];

/// Annotations switch to white text below this background luminance.
const DARK_LUMINANCE: f64 = 0.408;

const CELL: f64 = 56.0;
const LABEL_SPACE: f64 = 90.0;
const COLORBAR_WIDTH: f64 = 18.0;
const COLORBAR_GAP: f64 = 24.0;
const COLORBAR_LABELS: f64 = 50.0;
const PAD: f64 = 20.0;

/// Blues colormap at `t` in `[0, 1]`, interpolated between anchors.
pub fn blues(t: f64) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let pos = t * (BLUES.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(BLUES.len() - 1);
    BLUES[lo].lerp(BLUES[hi], pos - lo as f64)
}

/// Square-cell heatmap of a correlation matrix.
///
/// Colors span the finite range of the matrix. Each cell is annotated
/// with its value to one decimal; undefined cells are left blank.
pub fn heatmap(name: &str, matrix: &CorrelationMatrix) -> Figure {
    let n = matrix.len();
    let grid = CELL * n as f64;
    let width = LABEL_SPACE + grid + COLORBAR_GAP + COLORBAR_WIDTH + COLORBAR_LABELS + PAD;
    let height = PAD + grid + LABEL_SPACE;
    let mut doc = SvgDocument::new(width, height);

    let (lo, hi) = matrix
        .values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let (lo, hi) = if lo.is_finite() { (lo, hi) } else { (0.0, 1.0) };
    let norm = |v: f64| if hi > lo { (v - lo) / (hi - lo) } else { 0.5 };

    let x0 = LABEL_SPACE;
    let y0 = PAD;
    for row in 0..n {
        for col in 0..n {
            let value = matrix.get(row, col);
            let x = x0 + CELL * col as f64;
            let y = y0 + CELL * row as f64;
            if !value.is_finite() {
                continue;
            }
            let color = blues(norm(value));
            doc.rect(x, y, CELL, CELL, color);
            let text = if color.luminance() > DARK_LUMINANCE { Rgb::BLACK } else { Rgb::WHITE };
            doc.text(x + CELL / 2.0, y + CELL / 2.0, &format!("{value:.1}"), FONT, Anchor::Middle, text);
        }
    }

    for (i, label) in matrix.names.iter().enumerate() {
        let center = CELL * i as f64 + CELL / 2.0;
        doc.text(x0 - 6.0, y0 + center, label, FONT, Anchor::End, Rgb::BLACK);
        doc.vertical_text(x0 + center, y0 + grid + LABEL_SPACE / 2.0, label, FONT);
    }

    // Colorbar
    let bar_x = x0 + grid + COLORBAR_GAP;
    let stops: Vec<(f64, Rgb)> = BLUES
        .iter()
        .enumerate()
        .map(|(i, c)| (i as f64 / (BLUES.len() - 1) as f64, *c))
        .collect();
    doc.vertical_gradient("blues", &stops);
    doc.rect_paint(bar_x, y0, COLORBAR_WIDTH, grid, "url(#blues)", None, 1.0);
    for tick in super::scale::nice_ticks(lo, hi, 5) {
        let y = y0 + grid * (1.0 - norm(tick));
        doc.line(bar_x + COLORBAR_WIDTH, y, bar_x + COLORBAR_WIDTH + 4.0, y, Rgb::BLACK, 1.0);
        doc.text(
            bar_x + COLORBAR_WIDTH + 7.0,
            y,
            &super::scale::format_tick(tick),
            FONT,
            Anchor::Start,
            Rgb::BLACK,
        );
    }

    Figure::new(name, doc.finish())
}
