use std::io::{self, Write};

use crate::export::{Document, Primitive};
use crate::rendering::HAlign;
use crate::Rgba;

use super::{num, unit, DocumentWriter};

/// Level 2 PostScript, optionally as an EPSF-3.0 single page.
///
/// PostScript has no transparency; colors are written opaque.
pub struct PostScriptWriter {
    pub encapsulated: bool,
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn set_color(out: &mut dyn Write, c: Rgba) -> io::Result<()> {
    writeln!(out, "{} {} {} C", unit(c.r), unit(c.g), unit(c.b))
}

impl DocumentWriter for PostScriptWriter {
    fn write(&self, doc: &Document, out: &mut dyn Write) -> io::Result<()> {
        let (w, h) = (doc.width, doc.height);
        if self.encapsulated {
            writeln!(out, "%!PS-Adobe-3.0 EPSF-3.0")?;
        } else {
            writeln!(out, "%!PS-Adobe-3.0")?;
        }
        writeln!(out, "%%Title: {}", escape(&doc.title))?;
        writeln!(out, "%%Creator: offprint")?;
        writeln!(out, "%%BoundingBox: 0 0 {} {}", w, h)?;
        writeln!(out, "%%LanguageLevel: 2")?;
        if !self.encapsulated {
            writeln!(out, "%%Pages: 1")?;
        }
        writeln!(out, "%%EndComments")?;

        writeln!(out, "%%BeginProlog")?;
        writeln!(out, "/C {{ setrgbcolor }} bind def")?;
        writeln!(out, "/F {{ /Helvetica findfont exch scalefont setfont }} bind def")?;
        writeln!(out, "/SL {{ show }} bind def")?;
        writeln!(out, "/SC {{ dup stringwidth pop -2 div 0 rmoveto show }} bind def")?;
        writeln!(out, "/SR {{ dup stringwidth pop neg 0 rmoveto show }} bind def")?;
        writeln!(out, "%%EndProlog")?;

        if !self.encapsulated {
            writeln!(out, "%%Page: 1 1")?;
            writeln!(out, "<< /PageSize [{} {}] >> setpagedevice", w, h)?;
        }
        writeln!(out, "gsave")?;
        set_color(out, doc.background)?;
        writeln!(out, "0 0 {} {} rectfill", w, h)?;

        for primitive in &doc.primitives {
            match primitive {
                Primitive::Polygon { vertices, color } => {
                    let Some((first, rest)) = vertices.split_first() else {
                        continue;
                    };
                    set_color(out, *color)?;
                    write!(out, "newpath {} {} moveto", num(first.x), num(first.y))?;
                    for v in rest {
                        write!(out, " {} {} lineto", num(v.x), num(v.y))?;
                    }
                    writeln!(out, " closepath fill")?;
                }
                Primitive::Line {
                    from,
                    to,
                    color,
                    width,
                } => {
                    set_color(out, *color)?;
                    writeln!(
                        out,
                        "{} setlinewidth 1 setlinecap newpath {} {} moveto {} {} lineto stroke",
                        num(*width),
                        num(from.x),
                        num(from.y),
                        num(to.x),
                        num(to.y)
                    )?;
                }
                Primitive::Point { at, color, size } => {
                    set_color(out, *color)?;
                    writeln!(
                        out,
                        "{} {} {s} {s} rectfill",
                        num(at.x - size / 2.0),
                        num(at.y - size / 2.0),
                        s = num(*size)
                    )?;
                }
                Primitive::Text { at, item } => {
                    let show = match item.halign {
                        HAlign::Left => "SL",
                        HAlign::Center => "SC",
                        HAlign::Right => "SR",
                    };
                    set_color(out, item.color)?;
                    writeln!(
                        out,
                        "{} F {} {} moveto ({}) {}",
                        num(item.font_size),
                        num(at.x),
                        num(at.y),
                        escape(&item.string),
                        show
                    )?;
                }
            }
        }

        writeln!(out, "grestore")?;
        writeln!(out, "showpage")?;
        writeln!(out, "%%Trailer")?;
        writeln!(out, "%%EOF")
    }
}
