//! Page-description writers. One point per pixel, y up unless noted.

use std::io::{self, Write};

use super::{Document, Format};

mod pdf;
mod pgf;
mod postscript;
mod svg;
mod tex;

pub use pdf::PdfWriter;
pub use pgf::PgfWriter;
pub use postscript::PostScriptWriter;
pub use svg::SvgWriter;
pub use tex::TexWriter;

/// Serializes a sorted [`Document`] into one format.
pub trait DocumentWriter {
    fn write(&self, doc: &Document, out: &mut dyn Write) -> io::Result<()>;
}

pub fn writer_for(format: Format) -> Box<dyn DocumentWriter> {
    match format {
        Format::Eps => Box::new(PostScriptWriter { encapsulated: true }),
        Format::Ps => Box::new(PostScriptWriter { encapsulated: false }),
        Format::Pdf => Box::new(PdfWriter),
        Format::Svg => Box::new(SvgWriter),
        Format::Pgf => Box::new(PgfWriter),
        Format::Tex => Box::new(TexWriter),
    }
}

/// Shortest decimal form with at most three fractional digits.
pub(crate) fn num(v: f64) -> String {
    let v = if v.is_finite() { v } else { 0.0 };
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "" | "-0" => "0".to_string(),
        s => s.to_string(),
    }
}

/// Color component as a `[0, 1]` decimal.
pub(crate) fn unit(c: f32) -> String {
    num(c.clamp(0.0, 1.0) as f64)
}

/// Rough Helvetica advance, for formats that cannot measure text themselves.
pub(crate) fn approx_text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * 0.55
}

/// Escape LaTeX special characters.
pub(crate) fn tex_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}
