use std::fmt;

use crate::{Error, Result};

/// Page-description formats the exporter can write.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Format {
    Eps,
    Pdf,
    Ps,
    Svg,
    Pgf,
    Tex,
}

impl Format {
    pub const ALL: [Format; 6] = [
        Format::Eps,
        Format::Pdf,
        Format::Ps,
        Format::Svg,
        Format::Pgf,
        Format::Tex,
    ];

    /// Token used in format flags.
    pub fn token(self) -> &'static str {
        match self {
            Format::Eps => "eps",
            Format::Pdf => "pdf",
            Format::Ps => "ps",
            Format::Svg => "svg",
            Format::Pgf => "pgf",
            Format::Tex => "tex",
        }
    }

    /// File extension of documents in this format.
    pub fn extension(self) -> &'static str {
        self.token()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Depth-sorting strategy applied before emission.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Stable sort by mean depth. Fast, wrong for interpenetrating geometry.
    Simple,
    /// Binary space partitioning with primitive splitting.
    #[default]
    Bsp,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Token {
    NoText,
    Is2D,
    Format(Format),
}

/// Scan order. Longer tokens come first so that `eps` never also matches
/// `ps` and `notext` never also matches `tex`.
const TOKENS: [(&str, Token); 8] = [
    ("notext", Token::NoText),
    ("is2d", Token::Is2D),
    ("eps", Token::Format(Format::Eps)),
    ("pdf", Token::Format(Format::Pdf)),
    ("pgf", Token::Format(Format::Pgf)),
    ("svg", Token::Format(Format::Svg)),
    ("tex", Token::Format(Format::Tex)),
    ("ps", Token::Format(Format::Ps)),
];

/// Parsed format flags: which formats, how to sort, whether to keep text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatFlags {
    formats: Vec<Format>,
    pub sort: SortMode,
    pub text: bool,
}

impl FormatFlags {
    /// Parse a term such as `"pdfis2D"` or `"notextsvg"`.
    ///
    /// Tokens are matched case-insensitively anywhere in the string and in
    /// any order; other characters are ignored. Formats keep their order of
    /// appearance and repeats collapse. A term without any format token is
    /// rejected with [`Error::UnsupportedFormat`].
    pub fn parse(term: &str) -> Result<Self> {
        let lower = term.to_ascii_lowercase();
        let mut flags = FormatFlags {
            formats: Vec::new(),
            sort: SortMode::Bsp,
            text: true,
        };

        let mut rest = lower.as_str();
        while let Some(c) = rest.chars().next() {
            match TOKENS.iter().find(|(t, _)| rest.starts_with(*t)) {
                Some((t, token)) => {
                    match *token {
                        Token::NoText => flags.text = false,
                        Token::Is2D => flags.sort = SortMode::Simple,
                        Token::Format(f) => {
                            if !flags.formats.contains(&f) {
                                flags.formats.push(f);
                            }
                        }
                    }
                    rest = &rest[t.len()..];
                }
                None => rest = &rest[c.len_utf8()..],
            }
        }

        if flags.formats.is_empty() {
            return Err(Error::UnsupportedFormat(term.to_string()));
        }
        Ok(flags)
    }

    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    /// The format written to the caller's path.
    pub fn primary(&self) -> Format {
        // parse() guarantees at least one format
        self.formats.first().copied().unwrap_or(Format::Eps)
    }

    /// Same sort and text options, restricted to `format`.
    pub fn for_format(&self, format: Format) -> FormatFlags {
        FormatFlags {
            formats: vec![format],
            ..self.clone()
        }
    }
}

impl fmt::Display for FormatFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for format in &self.formats {
            f.write_str(format.token())?;
        }
        if self.sort == SortMode::Simple {
            f.write_str("is2D")?;
        }
        if !self.text {
            f.write_str("notext")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_is2d_selects_simple_sort() {
        let flags = FormatFlags::parse("pdfis2D").unwrap();
        assert_eq!(flags.formats(), &[Format::Pdf]);
        assert_eq!(flags.sort, SortMode::Simple);
        assert!(flags.text);
    }

    #[test]
    fn eps_defaults_to_bsp_with_text() {
        let flags = FormatFlags::parse("eps").unwrap();
        assert_eq!(flags.formats(), &[Format::Eps]);
        assert_eq!(flags.sort, SortMode::Bsp);
        assert!(flags.text);
    }

    #[test]
    fn notext_does_not_imply_tex() {
        let flags = FormatFlags::parse("notextsvg").unwrap();
        assert_eq!(flags.formats(), &[Format::Svg]);
        assert!(!flags.text);
    }

    #[test]
    fn tokens_are_case_insensitive_and_order_free() {
        let flags = FormatFlags::parse("IS2DsvgNoTextEPS").unwrap();
        assert_eq!(flags.formats(), &[Format::Svg, Format::Eps]);
        assert_eq!(flags.sort, SortMode::Simple);
        assert!(!flags.text);
    }

    #[test]
    fn unrecognized_text_is_ignored() {
        let flags = FormatFlags::parse("color-ps-level2").unwrap();
        assert_eq!(flags.formats(), &[Format::Ps]);
    }

    #[test]
    fn repeated_formats_collapse() {
        let flags = FormatFlags::parse("pdfsvgpdf").unwrap();
        assert_eq!(flags.formats(), &[Format::Pdf, Format::Svg]);
        assert_eq!(flags.primary(), Format::Pdf);
    }

    #[test]
    fn no_format_is_rejected() {
        for term in ["", "is2D", "notext", "png", "é"] {
            assert!(
                matches!(FormatFlags::parse(term), Err(Error::UnsupportedFormat(_))),
                "{:?}",
                term
            );
        }
    }

    #[test]
    fn display_round_trips_through_parse() {
        let flags = FormatFlags::parse("notextepsis2dtex").unwrap();
        assert_eq!(flags.to_string(), "epstexis2Dnotext");
        assert_eq!(FormatFlags::parse(&flags.to_string()).unwrap(), flags);
        let single = flags.for_format(Format::Tex);
        assert_eq!(single.formats(), &[Format::Tex]);
        assert!(!single.text);
    }
}
