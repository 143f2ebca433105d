//! Bar chart of category counts.

use super::svg::{Anchor, Rgb, SvgDocument};
use super::{Figure, HEIGHT, PALETTE, PlotArea, WIDTH, FONT};

/// One bar per category, in the given order, colored from the palette.
pub fn count_plot(name: &str, x_label: &str, counts: &[(String, usize)]) -> Figure {
    let mut doc = SvgDocument::new(WIDTH, HEIGHT);
    let area = PlotArea::standard();

    let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1) as f64;
    let y = area.y_axis(&mut doc, max, "count");

    let n = counts.len().max(1) as f64;
    let slot = area.width() / n;
    let bar = slot * 0.8;
    for (i, (label, count)) in counts.iter().enumerate() {
        let x = area.left + slot * i as f64 + (slot - bar) / 2.0;
        let top = y.map(*count as f64);
        let color = PALETTE[i % PALETTE.len()];
        doc.rect(x, top, bar, area.bottom - top, color);
        doc.text(x + bar / 2.0, area.bottom + 14.0, label, FONT, Anchor::Middle, Rgb::BLACK);
    }
    doc.line(area.left, area.bottom, area.right, area.bottom, Rgb::BLACK, 1.0);
    area.x_label(&mut doc, x_label);

    Figure::new(name, doc.finish())
}
