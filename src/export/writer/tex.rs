use std::io::{self, Write};

use crate::export::{Document, Primitive};
use crate::rendering::HAlign;

use super::{num, tex_escape, unit, DocumentWriter};

/// The text layer of a figure as a LaTeX `picture`.
///
/// Only text primitives are written; graphics are expected to come from a
/// companion eps or pdf placed under the picture.
pub struct TexWriter;

impl DocumentWriter for TexWriter {
    fn write(&self, doc: &Document, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "% {}", tex_escape(&doc.title))?;
        writeln!(out, "\\setlength{{\\unitlength}}{{1bp}}")?;
        writeln!(out, "\\begin{{picture}}({},{})(0,0)", doc.width, doc.height)?;
        for primitive in &doc.primitives {
            let Primitive::Text { at, item } = primitive else {
                continue;
            };
            let pos = match item.halign {
                HAlign::Left => "lb",
                HAlign::Center => "b",
                HAlign::Right => "rb",
            };
            writeln!(
                out,
                "\\put({},{}){{\\makebox(0,0)[{}]{{\\fontsize{{{s}}}{{{s}}}\\selectfont\\color[rgb]{{{},{},{}}}{}}}}}",
                num(at.x),
                num(at.y),
                pos,
                unit(item.color.r),
                unit(item.color.g),
                unit(item.color.b),
                tex_escape(&item.string),
                s = num(item.font_size)
            )?;
        }
        writeln!(out, "\\end{{picture}}")
    }
}
