use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::export::{Document, Primitive};
use crate::rendering::HAlign;
use crate::Rgba;

use super::{approx_text_width, num, unit, DocumentWriter};

/// Single-page PDF 1.4 with an uncompressed content stream.
///
/// Translucent fills and strokes go through ExtGState resources, text uses
/// the standard Helvetica font.
pub struct PdfWriter;

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

/// Graphics-state names for every distinct alpha below 1.
fn alpha_states(doc: &Document) -> BTreeMap<String, String> {
    let mut states = BTreeMap::new();
    for primitive in &doc.primitives {
        let a = match primitive {
            Primitive::Polygon { color, .. }
            | Primitive::Line { color, .. }
            | Primitive::Point { color, .. } => color.a,
            Primitive::Text { item, .. } => item.color.a,
        };
        if a < 1.0 {
            let key = unit(a);
            let name = format!("GS{}", states.len());
            states.entry(key).or_insert(name);
        }
    }
    states
}

fn content(doc: &Document, states: &BTreeMap<String, String>) -> String {
    let fill = |c: Rgba| format!("{} {} {} rg", unit(c.r), unit(c.g), unit(c.b));
    let stroke = |c: Rgba| format!("{} {} {} RG", unit(c.r), unit(c.g), unit(c.b));
    let gs = |a: f32| {
        states
            .get(&unit(a))
            .map(|name| format!("/{} gs ", name))
            .unwrap_or_default()
    };

    let mut s = String::new();
    s.push_str(&format!(
        "{} 0 0 {} {} re f\n",
        fill(doc.background),
        doc.width,
        doc.height
    ));
    for primitive in &doc.primitives {
        match primitive {
            Primitive::Polygon { vertices, color } => {
                let Some((first, rest)) = vertices.split_first() else {
                    continue;
                };
                s.push_str(&format!(
                    "q {}{} {} {} m",
                    gs(color.a),
                    fill(*color),
                    num(first.x),
                    num(first.y)
                ));
                for v in rest {
                    s.push_str(&format!(" {} {} l", num(v.x), num(v.y)));
                }
                s.push_str(" h f Q\n");
            }
            Primitive::Line {
                from,
                to,
                color,
                width,
            } => {
                s.push_str(&format!(
                    "q {}{} {} w 1 J {} {} m {} {} l S Q\n",
                    gs(color.a),
                    stroke(*color),
                    num(*width),
                    num(from.x),
                    num(from.y),
                    num(to.x),
                    num(to.y)
                ));
            }
            Primitive::Point { at, color, size } => {
                s.push_str(&format!(
                    "q {}{} {} {} {s} {s} re f Q\n",
                    gs(color.a),
                    fill(*color),
                    num(at.x - size / 2.0),
                    num(at.y - size / 2.0),
                    s = num(*size)
                ));
            }
            Primitive::Text { at, item } => {
                let width = approx_text_width(&item.string, item.font_size);
                let x = match item.halign {
                    HAlign::Left => at.x,
                    HAlign::Center => at.x - width / 2.0,
                    HAlign::Right => at.x - width,
                };
                s.push_str(&format!(
                    "q {}{} BT /F1 {} Tf {} {} Td ({}) Tj ET Q\n",
                    gs(item.color.a),
                    fill(item.color),
                    num(item.font_size),
                    num(x),
                    num(at.y),
                    escape(&item.string)
                ));
            }
        }
    }
    s
}

impl DocumentWriter for PdfWriter {
    fn write(&self, doc: &Document, out: &mut dyn Write) -> io::Result<()> {
        let states = alpha_states(doc);
        let stream = content(doc, &states);

        let ext_g_state: String = states
            .iter()
            .map(|(alpha, name)| format!(" /{} << /ca {a} /CA {a} >>", name, a = alpha))
            .collect();
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Contents 4 0 R \
                 /Resources << /Font << /F1 5 0 R >> /ExtGState <<{} >> >> >>",
                doc.width, doc.height, ext_g_state
            ),
            format!(
                "<< /Length {} >>\nstream\n{}endstream",
                stream.len(),
                stream
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
            format!(
                "<< /Title ({}) /Producer (offprint) >>",
                escape(&doc.title)
            ),
        ];

        let mut body: Vec<u8> = Vec::new();
        body.extend_from_slice(b"%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, object) in objects.iter().enumerate() {
            offsets.push(body.len());
            body.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, object).as_bytes());
        }

        let xref = body.len();
        body.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        body.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            body.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        body.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R /Info 6 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref
            )
            .as_bytes(),
        );
        out.write_all(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{render, sample_document};
    use crate::export::Format;

    #[test]
    fn pdf_structure_and_xref_offsets() {
        let pdf = render(Format::Pdf, &sample_document());
        assert!(pdf.starts_with("%PDF-1.4\n"));
        assert!(pdf.contains("/MediaBox [0 0 100 50]"));
        assert!(pdf.contains("/BaseFont /Helvetica"));
        assert!(pdf.contains("/GS0 << /ca 0.5 /CA 0.5 >>"));
        assert!(pdf.contains("q /GS0 gs 1 0 0 rg 10 10 m 90 10 l 50 40 l h f Q"));
        assert!(pdf.contains("(x_1 \\(a\\) & <b>) Tj"));
        assert!(pdf.trim_end().ends_with("%%EOF"));

        // every xref entry points at its object header
        let xref_at = pdf.find("xref\n").unwrap();
        let entries: Vec<usize> = pdf[xref_at..]
            .lines()
            .skip(3)
            .take(6)
            .map(|l| l[..10].parse().unwrap())
            .collect();
        for (i, offset) in entries.iter().enumerate() {
            assert!(pdf[*offset..].starts_with(&format!("{} 0 obj", i + 1)));
        }
        let startxref: usize = pdf
            .lines()
            .skip_while(|l| *l != "startxref")
            .nth(1)
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(startxref, xref_at);
    }

    #[test]
    fn opaque_documents_have_no_graphics_states() {
        let mut doc = sample_document();
        doc.primitives.remove(0);
        let pdf = render(Format::Pdf, &doc);
        assert!(pdf.contains("/ExtGState << >>"));
        assert!(!pdf.contains(" gs "));
    }
}
