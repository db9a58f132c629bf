use std::io::{self, Write};

use crate::export::{Document, Primitive};
use crate::rendering::HAlign;
use crate::Rgba;

use super::{num, DocumentWriter};

/// SVG 1.1. The y axis is flipped to SVG's top-left origin.
pub struct SvgWriter;

fn rgb(c: Rgba) -> String {
    let [r, g, b, _] = c.to_u8();
    format!("rgb({},{},{})", r, g, b)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

fn opacity(attr: &str, a: f32) -> String {
    if a < 1.0 {
        format!(" {}=\"{}\"", attr, num(a.max(0.0) as f64))
    } else {
        String::new()
    }
}

impl DocumentWriter for SvgWriter {
    fn write(&self, doc: &Document, out: &mut dyn Write) -> io::Result<()> {
        let h = doc.height as f64;
        let y = |v: f64| num(h - v);

        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#)?;
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{w}pt" height="{h}pt" viewBox="0 0 {w} {h}">"#,
            w = doc.width,
            h = doc.height
        )?;
        writeln!(out, "<title>{}</title>", escape(&doc.title))?;
        writeln!(
            out,
            r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            doc.width,
            doc.height,
            rgb(doc.background)
        )?;

        for primitive in &doc.primitives {
            match primitive {
                Primitive::Polygon { vertices, color } => {
                    let points: Vec<String> = vertices
                        .iter()
                        .map(|v| format!("{},{}", num(v.x), y(v.y)))
                        .collect();
                    writeln!(
                        out,
                        r#"<polygon points="{}" fill="{}"{}/>"#,
                        points.join(" "),
                        rgb(*color),
                        opacity("fill-opacity", color.a)
                    )?;
                }
                Primitive::Line {
                    from,
                    to,
                    color,
                    width,
                } => {
                    writeln!(
                        out,
                        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}" stroke-linecap="round"{}/>"#,
                        num(from.x),
                        y(from.y),
                        num(to.x),
                        y(to.y),
                        rgb(*color),
                        num(*width),
                        opacity("stroke-opacity", color.a)
                    )?;
                }
                Primitive::Point { at, color, size } => {
                    writeln!(
                        out,
                        r#"<rect x="{}" y="{}" width="{s}" height="{s}" fill="{}"{}/>"#,
                        num(at.x - size / 2.0),
                        y(at.y + size / 2.0),
                        rgb(*color),
                        opacity("fill-opacity", color.a),
                        s = num(*size)
                    )?;
                }
                Primitive::Text { at, item } => {
                    let anchor = match item.halign {
                        HAlign::Left => "start",
                        HAlign::Center => "middle",
                        HAlign::Right => "end",
                    };
                    writeln!(
                        out,
                        r#"<text x="{}" y="{}" font-family="Helvetica" font-size="{}" fill="{}" text-anchor="{}">{}</text>"#,
                        num(at.x),
                        y(at.y),
                        num(item.font_size),
                        rgb(item.color),
                        anchor,
                        escape(&item.string)
                    )?;
                }
            }
        }
        writeln!(out, "</svg>")
    }
}
