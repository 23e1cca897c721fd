use super::Renderer;
use crate::constants::*;
use crate::document::Text;
use crate::layout::Block;
use crate::paragraph::{Inline, Marker, StyledToken};
use crate::types::Result;

/// Wrap source code without touching its whitespace.
///
/// Each source line is cut into whitespace and non-whitespace runs; a run
/// that does not fit starts a new output line, and a run longer than the
/// whole width is cut into width-sized pieces. Tabs expand to `tab_size`.
pub fn wrap_code(code: &str, width: usize, tab_size: usize) -> Vec<String> {
    let width = width.max(1);
    let mut wrapped = Vec::new();

    for source_line in code.lines() {
        let expanded = source_line.replace('\t', &" ".repeat(tab_size));
        let mut current = String::new();
        let mut length = 0;

        for run in runs(&expanded) {
            let mut chars: Vec<char> = run.chars().collect();
            if length + chars.len() > width && length > 0 {
                wrapped.push(std::mem::take(&mut current));
                length = 0;
            }
            while chars.len() > width - length {
                let rest = chars.split_off(width - length);
                current.extend(chars);
                wrapped.push(std::mem::take(&mut current));
                length = 0;
                chars = rest;
            }
            length += chars.len();
            current.extend(chars);
        }
        wrapped.push(current);
    }

    wrapped
        .into_iter()
        .map(|line| {
            let pad = width.saturating_sub(line.chars().count());
            line + &" ".repeat(pad)
        })
        .collect()
}

/// Alternating whitespace and non-whitespace runs of a line
fn runs(line: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut start = 0;
    let mut previous: Option<bool> = None;
    for (i, c) in line.char_indices() {
        let is_space = c.is_whitespace();
        if previous.is_some_and(|p| p != is_space) {
            result.push(&line[start..i]);
            start = i;
        }
        previous = Some(is_space);
    }
    if start < line.len() {
        result.push(&line[start..]);
    }
    result
}

impl Renderer<'_> {
    pub(super) fn render_code(&mut self, language: &str, code: &str) -> Result<Block> {
        let main = wrap_code(code, self.settings.main_width, self.settings.tab_size)
            .into_iter()
            .map(|line| {
                self.formatter.format_line(&[
                    StyledToken::Open(Marker::Code),
                    StyledToken::Text(line),
                    StyledToken::Close(Marker::Code),
                ])
            })
            .collect();

        let mut sides = Vec::new();
        if !language.is_empty() {
            sides.extend(self.side_group(&[Inline::italic(Inline::words(language))])?);
        }

        Ok(Block::new(main).with_sides(sides))
    }

    /// Framed placeholder standing in for a rasterized image
    pub(super) fn render_image(&mut self, uri: &str, caption: &Text) -> Result<Block> {
        let width = self.settings.main_width;
        let main = if width < 4 {
            vec![self.formatter.format_text(&truncate(uri, width, width))]
        } else {
            let inner = width - 2;
            let horizontal = LIGHT_RULE.to_string().repeat(inner);
            let label = truncate(uri, inner, inner.saturating_sub(2));
            let pad = inner - label.chars().count();
            let body = format!(
                "{FRAME_VERTICAL}{}{label}{}{FRAME_VERTICAL}",
                " ".repeat(pad / 2),
                " ".repeat(pad - pad / 2)
            );
            let empty = format!("{FRAME_VERTICAL}{}{FRAME_VERTICAL}", " ".repeat(inner));
            [
                format!("{FRAME_TOP_LEFT}{horizontal}{FRAME_TOP_RIGHT}"),
                empty.clone(),
                body,
                empty,
                format!("{FRAME_BOTTOM_LEFT}{horizontal}{FRAME_BOTTOM_RIGHT}"),
            ]
            .iter()
            .map(|line| self.formatter.format_text(line))
            .collect()
        };

        let mut sides = Vec::new();
        if !caption.is_empty() {
            sides.extend(self.side_group(&[Inline::italic(caption.elements.clone())])?);
        }
        sides.extend(self.render_notes(&caption.notes)?);

        Ok(Block::new(main).with_sides(sides))
    }
}

/// Keep `text` within `width` columns, ending with `…` when shortened to `keep`.
fn truncate(text: &str, width: usize, keep: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(keep.min(width.saturating_sub(1))).collect();
    if width > 0 {
        shortened.push('…');
    }
    shortened
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_keeps_indentation() {
        let lines = wrap_code("fn main() {\n    run();\n}", 12, 4);
        assert_eq!(
            lines,
            vec!["fn main() { ", "    run();  ", "}           "]
        );
    }

    #[test]
    fn test_wrap_breaks_between_runs() {
        let lines = wrap_code("let value = compute(a, b);", 14, 4);
        assert_eq!(lines[0], "let value =   ");
        assert!(lines.iter().all(|l| l.chars().count() == 14));
    }

    #[test]
    fn test_wrap_cuts_long_runs() {
        let lines = wrap_code("abcdefghij", 4, 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij  "]);
    }

    #[test]
    fn test_blank_source_lines_survive() {
        let lines = wrap_code("a\n\nb", 3, 4);
        assert_eq!(lines, vec!["a  ", "   ", "b  "]);
    }

    #[test]
    fn test_tabs_expand() {
        assert_eq!(wrap_code("\tx", 6, 2), vec!["  x   "]);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10, 8), "short");
        assert_eq!(truncate("a-very-long-name", 8, 6), "a-very…");
    }
}
