//! Minimal SVG document writer.

use std::fmt::Write as _;

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const GRID: Rgb = Rgb(204, 204, 204);

    /// Parse `#rrggbb`.
    pub const fn hex(value: u32) -> Self {
        Rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    /// Relative luminance in `[0, 1]` (sRGB, WCAG definition).
    pub fn luminance(self) -> f64 {
        let channel = |c: u8| {
            let c = c as f64 / 255.0;
            if c <= 0.03928 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
        };
        0.2126 * channel(self.0) + 0.7152 * channel(self.1) + 0.0722 * channel(self.2)
    }

    /// Linear blend towards `other` by `t` in `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// Append-only SVG document.
///
/// Writes to a `String` never fail, so drawing methods ignore the
/// `fmt::Result`.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    width: f64,
    height: f64,
    defs: String,
    body: String,
}

impl SvgDocument {
    pub fn new(width: f64, height: f64) -> Self {
        let mut doc = Self {
            width,
            height,
            defs: String::new(),
            body: String::new(),
        };
        doc.rect(0.0, 0.0, width, height, Rgb::WHITE);
        doc
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: Rgb) {
        let _ = writeln!(
            self.body,
            r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{fill}"/>"#
        );
    }

    /// Rectangle with a stroke and a fill given as raw SVG paint (color or `url(#id)`).
    pub fn rect_paint(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, stroke: Option<Rgb>, opacity: f64) {
        let stroke = stroke.map_or_else(String::new, |s| format!(r#" stroke="{s}" stroke-width="1""#));
        let _ = writeln!(
            self.body,
            r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{fill}" fill-opacity="{opacity:.2}"{stroke}/>"#
        );
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: Rgb, width: f64) {
        let _ = writeln!(
            self.body,
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{stroke}" stroke-width="{width:.2}"/>"#
        );
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], stroke: Rgb, width: f64) {
        if points.is_empty() {
            return;
        }
        let mut coords = String::with_capacity(points.len() * 16);
        for (x, y) in points {
            let _ = write!(coords, "{x:.2},{y:.2} ");
        }
        let _ = writeln!(
            self.body,
            r#"<polyline points="{}" fill="none" stroke="{stroke}" stroke-width="{width:.2}"/>"#,
            coords.trim_end()
        );
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, size: f64, anchor: Anchor, fill: Rgb) {
        let _ = writeln!(
            self.body,
            r#"<text x="{x:.2}" y="{y:.2}" font-family="sans-serif" font-size="{size:.1}" text-anchor="{}" dominant-baseline="middle" fill="{fill}">{}</text>"#,
            anchor.as_str(),
            escape(content)
        );
    }

    /// Text rotated by -90° around its anchor point.
    pub fn vertical_text(&mut self, x: f64, y: f64, content: &str, size: f64) {
        let _ = writeln!(
            self.body,
            r#"<text x="{x:.2}" y="{y:.2}" font-family="sans-serif" font-size="{size:.1}" text-anchor="middle" dominant-baseline="middle" transform="rotate(-90 {x:.2} {y:.2})">{}</text>"#,
            escape(content)
        );
    }

    /// Define a vertical gradient (bottom to top) usable as `url(#id)`.
    pub fn vertical_gradient(&mut self, id: &str, stops: &[(f64, Rgb)]) {
        let _ = writeln!(self.defs, r#"<linearGradient id="{id}" x1="0" y1="1" x2="0" y2="0">"#);
        for (offset, color) in stops {
            let _ = writeln!(
                self.defs,
                r#"<stop offset="{:.1}%" stop-color="{color}"/>"#,
                offset * 100.0
            );
        }
        self.defs.push_str("</linearGradient>\n");
    }

    pub fn finish(self) -> String {
        let mut out = String::with_capacity(self.body.len() + self.defs.len() + 256);
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        if !self.defs.is_empty() {
            out.push_str("<defs>\n");
            out.push_str(&self.defs);
            out.push_str("</defs>\n");
        }
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
