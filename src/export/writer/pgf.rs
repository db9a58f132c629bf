use std::io::{self, Write};

use crate::export::{Document, Primitive};
use crate::rendering::HAlign;
use crate::Rgba;

use super::{num, tex_escape, unit, DocumentWriter};

/// A `pgfpicture` built from basic-layer path commands.
pub struct PgfWriter;

fn define(out: &mut dyn Write, c: Rgba) -> io::Result<()> {
    writeln!(
        out,
        "\\definecolor{{offprint}}{{rgb}}{{{},{},{}}}",
        unit(c.r),
        unit(c.g),
        unit(c.b)
    )
}

fn pt(x: f64, y: f64) -> String {
    format!("\\pgfpoint{{{}bp}}{{{}bp}}", num(x), num(y))
}

impl DocumentWriter for PgfWriter {
    fn write(&self, doc: &Document, out: &mut dyn Write) -> io::Result<()> {
        let (w, h) = (doc.width as f64, doc.height as f64);
        writeln!(out, "% {}", tex_escape(&doc.title))?;
        writeln!(out, "\\begin{{pgfpicture}}")?;
        writeln!(out, "\\pgfpathrectangle{{{}}}{{{}}}", pt(0.0, 0.0), pt(w, h))?;
        writeln!(out, "\\pgfusepath{{use as bounding box}}")?;
        define(out, doc.background)?;
        writeln!(out, "\\pgfsetfillcolor{{offprint}}")?;
        writeln!(out, "\\pgfpathrectangle{{{}}}{{{}}}", pt(0.0, 0.0), pt(w, h))?;
        writeln!(out, "\\pgfusepath{{fill}}")?;

        for primitive in &doc.primitives {
            match primitive {
                Primitive::Polygon { vertices, color } => {
                    let Some((first, rest)) = vertices.split_first() else {
                        continue;
                    };
                    writeln!(out, "\\begin{{pgfscope}}")?;
                    define(out, *color)?;
                    writeln!(out, "\\pgfsetfillcolor{{offprint}}")?;
                    if color.a < 1.0 {
                        writeln!(out, "\\pgfsetfillopacity{{{}}}", unit(color.a))?;
                    }
                    writeln!(out, "\\pgfpathmoveto{{{}}}", pt(first.x, first.y))?;
                    for v in rest {
                        writeln!(out, "\\pgfpathlineto{{{}}}", pt(v.x, v.y))?;
                    }
                    writeln!(out, "\\pgfpathclose")?;
                    writeln!(out, "\\pgfusepath{{fill}}")?;
                    writeln!(out, "\\end{{pgfscope}}")?;
                }
                Primitive::Line {
                    from,
                    to,
                    color,
                    width,
                } => {
                    writeln!(out, "\\begin{{pgfscope}}")?;
                    define(out, *color)?;
                    writeln!(out, "\\pgfsetstrokecolor{{offprint}}")?;
                    if color.a < 1.0 {
                        writeln!(out, "\\pgfsetstrokeopacity{{{}}}", unit(color.a))?;
                    }
                    writeln!(out, "\\pgfsetlinewidth{{{}bp}}", num(*width))?;
                    writeln!(out, "\\pgfsetroundcap")?;
                    writeln!(out, "\\pgfpathmoveto{{{}}}", pt(from.x, from.y))?;
                    writeln!(out, "\\pgfpathlineto{{{}}}", pt(to.x, to.y))?;
                    writeln!(out, "\\pgfusepath{{stroke}}")?;
                    writeln!(out, "\\end{{pgfscope}}")?;
                }
                Primitive::Point { at, color, size } => {
                    writeln!(out, "\\begin{{pgfscope}}")?;
                    define(out, *color)?;
                    writeln!(out, "\\pgfsetfillcolor{{offprint}}")?;
                    writeln!(
                        out,
                        "\\pgfpathrectangle{{{}}}{{{}}}",
                        pt(at.x - size / 2.0, at.y - size / 2.0),
                        pt(*size, *size)
                    )?;
                    writeln!(out, "\\pgfusepath{{fill}}")?;
                    writeln!(out, "\\end{{pgfscope}}")?;
                }
                Primitive::Text { at, item } => {
                    let align = match item.halign {
                        HAlign::Left => "left,",
                        HAlign::Center => "",
                        HAlign::Right => "right,",
                    };
                    writeln!(
                        out,
                        "\\pgftext[x={}bp,y={}bp,{}base]{{\\fontsize{{{s}}}{{{s}}}\\selectfont\\color[rgb]{{{},{},{}}}{}}}",
                        num(at.x),
                        num(at.y),
                        align,
                        unit(item.color.r),
                        unit(item.color.g),
                        unit(item.color.b),
                        tex_escape(&item.string),
                        s = num(item.font_size)
                    )?;
                }
            }
        }
        writeln!(out, "\\end{{pgfpicture}}")
    }
}
