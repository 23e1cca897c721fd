//! Output formatters
//!
//! A formatter decides how markers and text look in the final output. Text
//! always occupies one column per character; markers are zero-width escape
//! sequences or tags.

use crate::paragraph::{Marker, StyledToken};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Renders styled tokens into an output encoding
pub trait Formatter: Send + Sync {
    /// Opening (`open == true`) or closing sequence for a marker
    fn format_marker(&self, marker: &Marker, open: bool) -> String;

    /// Escape visible text; must not change its column count
    fn format_text(&self, text: &str) -> String {
        text.to_string()
    }

    fn format_line(&self, tokens: &[StyledToken]) -> String {
        tokens
            .iter()
            .map(|token| match token {
                StyledToken::Text(text) => self.format_text(text),
                StyledToken::Open(marker) => self.format_marker(marker, true),
                StyledToken::Close(marker) => self.format_marker(marker, false),
                StyledToken::WordBreak => self.format_text(" "),
            })
            .collect()
    }

    /// Columns a formatted line occupies once rendered
    fn visible_width(&self, line: &str) -> usize {
        line.chars().count()
    }

    /// Join composed pages into one output document.
    fn write_document(&self, pages: &[Vec<String>]) -> String {
        let mut out = String::new();
        for line in pages.iter().flatten() {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Drops all styling
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl Formatter for PlainFormatter {
    fn format_marker(&self, _marker: &Marker, _open: bool) -> String {
        String::new()
    }
}

/// HTML tags inside `<pre>` blocks, one block per page
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlFormatter;

impl Formatter for HtmlFormatter {
    fn format_marker(&self, marker: &Marker, open: bool) -> String {
        if !open {
            return match marker {
                Marker::Bold => "</b>",
                Marker::Italic => "</i>",
                Marker::Code => "</code>",
                Marker::ForegroundColor(_) | Marker::BackgroundColor(_) => "</span>",
                Marker::CrossRef(_) | Marker::Anchor(_) => "</a>",
            }
            .to_string();
        }
        match marker {
            Marker::Bold => "<b>".to_string(),
            Marker::Italic => "<i>".to_string(),
            Marker::Code => "<code>".to_string(),
            Marker::ForegroundColor(color) => {
                format!("<span style=\"color: {}\">", escape_html(color))
            }
            Marker::BackgroundColor(color) => {
                format!("<span style=\"background-color: {}\">", escape_html(color))
            }
            Marker::CrossRef(target) => format!("<a href=\"{}\">", escape_html(target)),
            Marker::Anchor(id) => format!("<a id=\"{}\">", escape_html(id)),
        }
    }

    fn format_text(&self, text: &str) -> String {
        escape_html(text)
    }

    fn visible_width(&self, line: &str) -> usize {
        html_width(line)
    }

    fn write_document(&self, pages: &[Vec<String>]) -> String {
        let mut out = String::from(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n\
             body { background: #ffffff; color: #000000; }\n\
             pre.page { font-family: monospace; page-break-after: always; }\n\
             a { color: inherit; }\n\
             </style>\n</head>\n<body>\n",
        );
        for page in pages {
            out.push_str("<pre class=\"page\">");
            for line in page {
                out.push_str(line);
                out.push('\n');
            }
            out.push_str("</pre>\n");
        }
        out.push_str("</body>\n</html>\n");
        out
    }
}

/// ANSI SGR escape sequences for terminals with true-color support
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiFormatter;

impl Formatter for AnsiFormatter {
    fn format_marker(&self, marker: &Marker, open: bool) -> String {
        let code = match (marker, open) {
            (Marker::Bold, true) => "1".to_string(),
            (Marker::Italic, true) => "3".to_string(),
            (Marker::Code, true) => "2".to_string(),
            (Marker::CrossRef(_), true) => "4".to_string(),
            (Marker::ForegroundColor(color), true) => match parse_hex_color(color) {
                Some((r, g, b)) => format!("38;2;{r};{g};{b}"),
                None => return String::new(),
            },
            (Marker::BackgroundColor(color), true) => match parse_hex_color(color) {
                Some((r, g, b)) => format!("48;2;{r};{g};{b}"),
                None => return String::new(),
            },
            (Marker::Anchor(_), _) => return String::new(),
            (marker, false) => match ansi_reset(marker) {
                Some(reset) => reset.to_string(),
                None => return String::new(),
            },
        };
        format!("\x1b[{code}m")
    }

    /// SGR 22 ends bold and faint together, so closing one of them
    /// re-opens the other when it is still active.
    fn format_line(&self, tokens: &[StyledToken]) -> String {
        let mut out = String::new();
        let mut open: Vec<&Marker> = Vec::new();
        for token in tokens {
            match token {
                StyledToken::Text(text) => out.push_str(text),
                StyledToken::WordBreak => out.push(' '),
                StyledToken::Open(marker) => {
                    open.push(marker);
                    out.push_str(&self.format_marker(marker, true));
                }
                StyledToken::Close(marker) => {
                    if let Some(index) = open.iter().rposition(|m| *m == marker) {
                        open.remove(index);
                    }
                    out.push_str(&self.format_marker(marker, false));
                    let reset = ansi_reset(marker);
                    for still_open in open.iter().filter(|m| ansi_reset(m) == reset) {
                        out.push_str(&self.format_marker(still_open, true));
                    }
                }
            }
        }
        out
    }

    fn visible_width(&self, line: &str) -> usize {
        ansi_width(line)
    }
}

/// SGR parameter that ends a marker's style
fn ansi_reset(marker: &Marker) -> Option<&'static str> {
    match marker {
        Marker::Bold | Marker::Code => Some("22"),
        Marker::Italic => Some("23"),
        Marker::CrossRef(_) => Some("24"),
        Marker::ForegroundColor(_) => Some("39"),
        Marker::BackgroundColor(_) => Some("49"),
        Marker::Anchor(_) => None,
    }
}

/// Level 2 PostScript drawing each row with a monospace font.
///
/// Styling is dropped. Every row becomes `(text) u n`; pages are framed by
/// `tr` and `showpage` after a prolog defining those procedures.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostScriptFormatter;

impl PostScriptFormatter {
    const FONT_SIZE: usize = 10;
    const LEADING: usize = 12;
    const MARGIN: usize = 36;
    const PAGE_HEIGHT: usize = 842;
}

impl Formatter for PostScriptFormatter {
    fn format_marker(&self, _marker: &Marker, _open: bool) -> String {
        String::new()
    }

    fn format_text(&self, text: &str) -> String {
        escape_postscript(text)
    }

    fn visible_width(&self, line: &str) -> usize {
        postscript_width(line)
    }

    fn write_document(&self, pages: &[Vec<String>]) -> String {
        let top = Self::PAGE_HEIGHT - Self::MARGIN - Self::FONT_SIZE;
        let mut out = format!(
            "%!PS-Adobe-3.0\n\
             %%Creator: mono\n\
             %%Pages: {pages}\n\
             %%EndComments\n\
             /Courier findfont {size} scalefont setfont\n\
             /u {{ show }} bind def\n\
             /n {{ currentpoint exch pop {leading} sub {margin} exch moveto }} bind def\n\
             /tr {{ {margin} {top} moveto }} bind def\n\
             %%EndProlog\n",
            pages = pages.len(),
            size = Self::FONT_SIZE,
            leading = Self::LEADING,
            margin = Self::MARGIN,
        );
        for (index, page) in pages.iter().enumerate() {
            out.push_str(&format!("%%Page: {0} {0}\ntr\n", index + 1));
            for line in page {
                out.push_str(&format!("({line}) u n\n"));
            }
            out.push_str("showpage\n");
        }
        out.push_str("%%EOF\n");
        out
    }
}

/// Output encodings selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OutputFormat {
    #[default]
    Ansi,
    Html,
    Plain,
    PostScript,
}

impl OutputFormat {
    pub fn formatter(self) -> &'static dyn Formatter {
        match self {
            OutputFormat::Ansi => &AnsiFormatter,
            OutputFormat::Html => &HtmlFormatter,
            OutputFormat::Plain => &PlainFormatter,
            OutputFormat::PostScript => &PostScriptFormatter,
        }
    }

    /// Conventional file extension
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Ansi => "ans",
            OutputFormat::Html => "html",
            OutputFormat::Plain => "txt",
            OutputFormat::PostScript => "ps",
        }
    }
}

fn escape_html(text: &str) -> String {
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

/// Backslash and parentheses are the only specials inside a string literal.
fn escape_postscript(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Width of an escaped string literal body
fn postscript_width(line: &str) -> usize {
    let mut width = 0;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            chars.next();
        }
        width += 1;
    }
    width
}

/// Parse `#rrggbb` or `#rgb`.
fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#').filter(|hex| hex.is_ascii())?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        3 => {
            let (r, g, b) = (channel(&hex[0..1])?, channel(&hex[1..2])?, channel(&hex[2..3])?);
            Some((r * 17, g * 17, b * 17))
        }
        _ => None,
    }
}

/// Width of a line with ANSI CSI sequences removed
fn ansi_width(line: &str) -> usize {
    let mut width = 0;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // Parameters end at the first byte in '@'..='~'
            for c in chars.by_ref() {
                if ('@'..='~').contains(&c) {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

/// Width of a line with tags removed and entities counted as one column
fn html_width(line: &str) -> usize {
    let mut width = 0;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '<' => {
                for c in chars.by_ref() {
                    if c == '>' {
                        break;
                    }
                }
            }
            '&' => {
                for c in chars.by_ref() {
                    if c == ';' {
                        break;
                    }
                }
                width += 1;
            }
            _ => width += 1,
        }
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_line() -> Vec<StyledToken> {
        vec![
            StyledToken::text("a"),
            StyledToken::Open(Marker::Bold),
            StyledToken::text("<b>"),
            StyledToken::Close(Marker::Bold),
        ]
    }

    #[test]
    fn test_html_escapes_text() {
        assert_eq!(
            HtmlFormatter.format_line(&sample_line()),
            "a<b>&lt;b&gt;</b>"
        );
    }

    #[test]
    fn test_visible_width_of_each_format() {
        for format in [
            OutputFormat::Ansi,
            OutputFormat::Html,
            OutputFormat::Plain,
            OutputFormat::PostScript,
        ] {
            let formatter = format.formatter();
            let line = formatter.format_line(&sample_line());
            assert_eq!(formatter.visible_width(&line), 4, "{format:?}: {line:?}");
        }
    }

    #[test]
    fn test_ansi_colors() {
        let marker = Marker::ForegroundColor("#aaaaaa".into());
        assert_eq!(AnsiFormatter.format_marker(&marker, true), "\x1b[38;2;170;170;170m");
        assert_eq!(AnsiFormatter.format_marker(&marker, false), "\x1b[39m");
        let invalid = Marker::BackgroundColor("teal".into());
        assert_eq!(AnsiFormatter.format_marker(&invalid, true), "");
    }

    #[test]
    fn test_short_hex_color() {
        assert_eq!(parse_hex_color("#fa0"), Some((255, 170, 0)));
    }

    #[test]
    fn test_html_document_wraps_pages() {
        let pages = vec![vec!["one".to_string()], vec!["two".to_string()]];
        let html = HtmlFormatter.write_document(&pages);
        assert_eq!(html.matches("<pre class=\"page\">").count(), 2);
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn test_plain_document_is_line_per_row() {
        let pages = vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string()]];
        assert_eq!(PlainFormatter.write_document(&pages), "a\nb\nc\n");
    }

    #[test]
    fn test_ansi_code_inside_bold_keeps_bold() {
        let line = vec![
            StyledToken::Open(Marker::Bold),
            StyledToken::text("a "),
            StyledToken::Open(Marker::Code),
            StyledToken::text("c"),
            StyledToken::Close(Marker::Code),
            StyledToken::text(" b"),
            StyledToken::Close(Marker::Bold),
        ];
        assert_eq!(
            AnsiFormatter.format_line(&line),
            "\x1b[1ma \x1b[2mc\x1b[22m\x1b[1m b\x1b[22m"
        );
    }

    #[test]
    fn test_ansi_italic_close_reopens_nothing() {
        let line = vec![
            StyledToken::Open(Marker::Bold),
            StyledToken::Open(Marker::Italic),
            StyledToken::text("x"),
            StyledToken::Close(Marker::Italic),
            StyledToken::Close(Marker::Bold),
        ];
        assert_eq!(
            AnsiFormatter.format_line(&line),
            "\x1b[1m\x1b[3mx\x1b[23m\x1b[22m"
        );
    }

    #[test]
    fn test_postscript_escapes_parentheses() {
        let line = vec![
            StyledToken::text("f(x)"),
            StyledToken::Open(Marker::Bold),
            StyledToken::text("\\"),
            StyledToken::Close(Marker::Bold),
        ];
        let formatted = PostScriptFormatter.format_line(&line);
        assert_eq!(formatted, "f\\(x\\)\\\\");
        assert_eq!(PostScriptFormatter.visible_width(&formatted), 5);
    }

    #[test]
    fn test_postscript_document_frames_pages() {
        let pages = vec![vec!["one".to_string()], vec!["two".to_string()]];
        let ps = PostScriptFormatter.write_document(&pages);
        assert!(ps.starts_with("%!PS-Adobe-3.0\n"));
        assert!(ps.contains("%%Pages: 2\n"));
        assert!(ps.contains("%%Page: 2 2\ntr\n(two) u n\nshowpage\n"));
        assert_eq!(ps.matches("showpage").count(), 2);
        assert!(ps.ends_with("%%EOF\n"));
        assert_eq!(OutputFormat::PostScript.extension(), "ps");
    }
}
