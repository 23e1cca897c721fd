//! Per-element rendering
//!
//! Each document element becomes one or more blocks. Blocks mark where a
//! page may break: a list whose two items hold two paragraphs each yields
//! four blocks. Side-column content (subtitles, footnotes, captions, code
//! languages) travels with the block it belongs to.

mod code;
mod list;

use log::{debug, warn};

use crate::constants::*;
use crate::document::{Element, Note, Text};
use crate::format::Formatter;
use crate::layout::Block;
use crate::paragraph::{EmitOptions, Inline, LineBreaker, Marker, TextFilter};
use crate::settings::Settings;
use crate::styles::{small_caps, superscript};
use crate::types::{Alignment, Result};

/// Renders document elements into blocks for one column width
pub struct Renderer<'a> {
    settings: Settings,
    formatter: &'a dyn Formatter,
    breaker: &'a mut LineBreaker,
}

impl<'a> Renderer<'a> {
    pub fn new(settings: &Settings, formatter: &'a dyn Formatter, breaker: &'a mut LineBreaker) -> Self {
        Self {
            settings: settings.clone(),
            formatter,
            breaker,
        }
    }

    /// Renderer for nested content in a narrower main column
    fn narrower(&mut self, main_width: usize) -> Renderer<'_> {
        Renderer {
            settings: Settings {
                main_width,
                ..self.settings.clone()
            },
            formatter: self.formatter,
            breaker: &mut *self.breaker,
        }
    }

    /// Main width left inside `indent` columns of nesting, never below one.
    ///
    /// Deep nesting in a narrow column overflows instead of failing.
    fn inner_width(&self, indent: usize) -> usize {
        let width = self.settings.main_width.saturating_sub(indent);
        if width == 0 {
            warn!(
                "Nesting leaves no room in a main column of width {}; content will overflow",
                self.settings.main_width
            );
            return 1;
        }
        width
    }

    pub fn render_elements(&mut self, elements: &[Element]) -> Result<Vec<Block>> {
        let mut blocks = Vec::new();
        for element in elements {
            blocks.extend(self.render_element(element)?);
        }
        Ok(blocks)
    }

    pub fn render_element(&mut self, element: &Element) -> Result<Vec<Block>> {
        let block = match element {
            Element::Chapter { title, identifier } => self.render_chapter(title, identifier)?,
            Element::SubChapter {
                title,
                subtitle,
                identifier,
            } => self.render_subchapter(title, subtitle.as_ref(), identifier)?,
            Element::Section { title, identifier } => self.render_section(title, identifier)?,
            Element::Paragraph(text) => self.render_paragraph(text)?,
            Element::Quote(text) => self.render_quote(text)?,
            Element::OrderedList(items) => return self.render_list(items, true),
            Element::UnorderedList(items) => return self.render_list(items, false),
            Element::Aside(elements) => self.render_aside(elements)?,
            Element::CodeBlock { language, code } => self.render_code(language, code)?,
            Element::Image { uri, caption } => self.render_image(uri, caption)?,
            Element::PageBreak => Block::page_break(),
            Element::Unprocessed(kind) => {
                warn!("Skipping unprocessed element: {}", kind);
                return Ok(Vec::new());
            }
        };
        Ok(vec![block])
    }

    fn emit(&self) -> EmitOptions<'a> {
        EmitOptions::formatter(self.formatter)
    }

    fn align(
        &mut self,
        elements: &[Inline],
        alignment: Alignment,
        width: usize,
        filter: Option<TextFilter>,
    ) -> Result<Vec<String>> {
        let options = EmitOptions {
            text_filter: filter,
            ..self.emit()
        };
        self.breaker.align(elements, alignment, width, options)
    }

    fn rule(&self, glyph: char) -> String {
        self.formatter
            .format_text(&glyph.to_string().repeat(self.settings.main_width))
    }

    fn blank(&self, width: usize) -> String {
        self.formatter.format_text(&" ".repeat(width))
    }

    /// One side group per footnote, each starting with its superscript number
    fn render_notes(&mut self, notes: &[Note]) -> Result<Vec<Vec<String>>> {
        let mut groups = Vec::new();
        for note in notes {
            let mut elements = vec![Inline::text(superscript(note.number)), Inline::Space];
            elements.extend(note.elements.iter().cloned());
            groups.extend(self.side_group(&elements)?);
        }
        Ok(groups)
    }

    /// Left-aligned side column lines; nothing when there is no side column
    fn side_group(&mut self, elements: &[Inline]) -> Result<Option<Vec<String>>> {
        let width = self.settings.side_width;
        if width == 0 {
            debug!("No side column, dropping side content");
            return Ok(None);
        }
        self.align(elements, Alignment::Left, width, None).map(Some)
    }

    fn render_chapter(&mut self, title: &Text, identifier: &str) -> Result<Block> {
        let heading = Inline::styled(
            Marker::Anchor(identifier.to_string()),
            vec![Inline::bold(vec![Inline::italic(title.elements.clone())])],
        );
        let mut main = vec![self.rule(CHAPTER_RULE)];
        main.extend(self.align(&[heading], Alignment::Left, self.settings.main_width, None)?);
        Ok(Block::new(main)
            .with_sides(self.render_notes(&title.notes)?)
            .with_block_offset(CHAPTER_BLOCK_OFFSET)
            .with_break_before(true))
    }

    fn render_subchapter(
        &mut self,
        title: &Text,
        subtitle: Option<&Text>,
        identifier: &str,
    ) -> Result<Block> {
        let heading = Inline::styled(
            Marker::Anchor(identifier.to_string()),
            vec![Inline::bold(title.elements.clone())],
        );
        let mut main = vec![self.rule(LIGHT_RULE)];
        main.extend(self.align(
            &[heading],
            Alignment::Left,
            self.settings.main_width,
            Some(small_caps),
        )?);

        let mut sides = Vec::new();
        if let Some(subtitle) = subtitle.filter(|s| !s.is_empty()) {
            sides.extend(self.side_group(&[Inline::italic(subtitle.elements.clone())])?);
        }
        sides.extend(self.render_notes(&title.notes)?);

        Ok(Block::new(main)
            .with_sides(sides)
            .with_side_offset(SUBCHAPTER_SIDE_OFFSET)
            .with_block_offset(SUBCHAPTER_BLOCK_OFFSET))
    }

    fn render_section(&mut self, title: &Text, identifier: &str) -> Result<Block> {
        let heading = Inline::styled(
            Marker::Anchor(identifier.to_string()),
            vec![Inline::bold(title.elements.clone())],
        );
        let main = self.align(
            &[heading],
            Alignment::Left,
            self.settings.main_width,
            Some(small_caps),
        )?;
        Ok(Block::new(main).with_sides(self.render_notes(&title.notes)?))
    }

    fn render_paragraph(&mut self, text: &Text) -> Result<Block> {
        let main = self.align(
            &text.elements,
            self.settings.paragraph_alignment,
            self.settings.main_width,
            None,
        )?;
        Ok(Block::new(main).with_sides(self.render_notes(&text.notes)?))
    }

    fn render_quote(&mut self, text: &Text) -> Result<Block> {
        let tab = self.settings.tab_size;
        let width = self.inner_width(2 * tab);
        let indent = self.blank(tab);
        let lines = self.align(
            &[Inline::italic(text.elements.clone())],
            self.settings.paragraph_alignment,
            width,
            None,
        )?;
        let main = lines
            .into_iter()
            .map(|line| [indent.as_str(), line.as_str(), indent.as_str()].concat())
            .collect();
        Ok(Block::new(main).with_sides(self.render_notes(&text.notes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{HtmlFormatter, PlainFormatter};

    fn settings() -> Settings {
        Settings {
            main_width: 20,
            side_width: 8,
            tab_size: 2,
            paragraph_alignment: Alignment::Left,
            ..Default::default()
        }
    }

    fn render(element: Element) -> Vec<Block> {
        let mut breaker = LineBreaker::without_hyphenation(1);
        let settings = settings();
        let mut renderer = Renderer::new(&settings, &PlainFormatter, &mut breaker);
        renderer.render_element(&element).unwrap()
    }

    #[test]
    fn test_chapter_breaks_before() {
        let blocks = render(Element::Chapter {
            title: Text::plain("Beginnings"),
            identifier: "beginnings".into(),
        });
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].break_before);
        assert_eq!(blocks[0].block_offset, CHAPTER_BLOCK_OFFSET);
        assert_eq!(blocks[0].main[0], "━".repeat(20));
        assert_eq!(blocks[0].main[1].trim_end(), "Beginnings");
    }

    #[test]
    fn test_subchapter_subtitle_in_side() {
        let blocks = render(Element::SubChapter {
            title: Text::plain("Body"),
            subtitle: Some(Text::plain("the basics")),
            identifier: "body".into(),
        });
        let block = &blocks[0];
        assert_eq!(block.main[1].trim_end(), "ʙᴏᴅʏ");
        assert_eq!(block.sides, vec![vec!["the     ".to_string(), "basics  ".to_string()]]);
        assert_eq!(block.side_offset, SUBCHAPTER_SIDE_OFFSET);
        assert_eq!(block.block_offset, SUBCHAPTER_BLOCK_OFFSET);
    }

    #[test]
    fn test_paragraph_notes_in_side() {
        let text = Text::new(vec![Inline::text("Claim¹")]).with_notes(vec![Note {
            number: 1,
            elements: Inline::words("source"),
        }]);
        let blocks = render(Element::Paragraph(text));
        assert_eq!(blocks[0].main, vec![format!("Claim¹{}", " ".repeat(14))]);
        assert_eq!(blocks[0].sides, vec![vec!["¹ source".to_string()]]);
    }

    #[test]
    fn test_quote_is_indented() {
        let blocks = render(Element::Quote(Text::plain("quoted words here")));
        for line in &blocks[0].main {
            assert!(line.starts_with("  "));
            assert!(line.ends_with("  "));
            assert_eq!(line.chars().count(), 20);
        }
    }

    #[test]
    fn test_unprocessed_is_skipped() {
        assert!(render(Element::Unprocessed("Table".into())).is_empty());
    }

    #[test]
    fn test_page_break_is_marker_block() {
        let blocks = render(Element::PageBreak);
        assert!(blocks[0].is_page_break());
    }

    #[test]
    fn test_html_anchor_on_section() {
        let mut breaker = LineBreaker::without_hyphenation(1);
        let settings = settings();
        let mut renderer = Renderer::new(&settings, &HtmlFormatter, &mut breaker);
        let blocks = renderer
            .render_element(&Element::Section {
                title: Text::plain("Intro"),
                identifier: "intro".into(),
            })
            .unwrap();
        assert!(blocks[0].main[0].starts_with("<a id=\"intro\"><b>ɪɴᴛʀᴏ</b></a>"));
    }

    #[test]
    fn test_quote_in_narrow_column_overflows() {
        let mut breaker = LineBreaker::without_hyphenation(1);
        let settings = settings();
        let mut renderer = Renderer::new(&settings, &PlainFormatter, &mut breaker);
        let blocks = renderer
            .narrower(1)
            .render_element(&Element::Quote(Text::plain("a word")))
            .unwrap();
        assert_eq!(blocks[0].main, vec!["  a  ", "  word  "]);
    }

    #[test]
    fn test_no_side_column_drops_side_content() {
        let mut breaker = LineBreaker::without_hyphenation(1);
        let settings = Settings {
            side_width: 0,
            ..settings()
        };
        let mut renderer = Renderer::new(&settings, &PlainFormatter, &mut breaker);
        let text = Text::new(vec![Inline::text("Claim¹")]).with_notes(vec![Note {
            number: 1,
            elements: Inline::words("source"),
        }]);
        let blocks = renderer
            .render_elements(&[
                Element::Paragraph(text),
                Element::SubChapter {
                    title: Text::plain("Body"),
                    subtitle: Some(Text::plain("the basics")),
                    identifier: "body".into(),
                },
            ])
            .unwrap();
        assert!(blocks.iter().all(|block| block.sides.is_empty()));
        assert_eq!(blocks[0].main[0].trim_end(), "Claim¹");
    }
}
