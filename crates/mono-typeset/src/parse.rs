//! Markdown front-end
//!
//! Maps CommonMark (with footnotes, heading attributes and strikethrough)
//! onto document elements:
//! - `#`, `##` and `###` headings become chapters, sub-chapters and sections.
//!   A sub-chapter title may carry a subtitle after ` | `, and `{#id}`
//!   overrides the identifier derived from the title.
//! - Links to `#identifier` become cross references titled after the
//!   referenced heading.
//! - A block quote whose first word is `Aside:` becomes an aside.
//! - Horizontal rules become page breaks.
//! - An image alone in its paragraph becomes an image element.

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::document::{Document, Element, Note, Text};
use crate::paragraph::{Inline, Marker};
use crate::styles::{slug, small_caps, superscript};
use crate::types::{Result, TypesetError};

const ASIDE_PREFIX: &str = "Aside:";
const SUBTITLE_SEPARATOR: &str = "|";

/// Parse a markdown document.
pub fn parse_markdown(text: &str) -> Result<Document> {
    let mut builder = Builder::new(collect_headings(text));
    for event in Parser::new_ext(text, options()) {
        builder.event(event)?;
    }
    builder.finish()
}

fn options() -> Options {
    Options::ENABLE_FOOTNOTES
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_SMART_PUNCTUATION
}

fn level_number(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        _ => 3,
    }
}

/// First pass: heading identifiers and plain titles, so that links may
/// point forward in the document.
fn collect_headings(text: &str) -> BTreeMap<String, String> {
    let mut references = BTreeMap::new();
    let mut current: Option<(usize, Option<String>, String)> = None;

    for event in Parser::new_ext(text, options()) {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                current = Some((level_number(level), id.map(|id| id.to_string()), String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, id, raw)) = current.take() {
                    let words: Vec<&str> = raw.split_whitespace().collect();
                    let end = match level {
                        2 => words
                            .iter()
                            .position(|word| *word == SUBTITLE_SEPARATOR)
                            .unwrap_or(words.len()),
                        _ => words.len(),
                    };
                    let title = words[..end].join(" ");
                    let id = id.unwrap_or_else(|| slug(&title));
                    references.insert(id, title);
                }
            }
            Event::Text(fragment) | Event::Code(fragment) => {
                if let Some((_, _, raw)) = current.as_mut() {
                    raw.push_str(&fragment);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, _, raw)) = current.as_mut() {
                    raw.push(' ');
                }
            }
            _ => {}
        }
    }

    references
}

enum BlockKind {
    Quote,
    Item,
    Footnote(String),
}

enum InlineKind {
    Paragraph,
    /// Paragraph without markdown delimiters, such as text in a tight list item
    Implicit,
    Heading { level: usize, id: Option<String> },
    Emphasis,
    Strong,
    Strikethrough,
    Link(String),
    Image(String),
}

enum Frame {
    Blocks { kind: BlockKind, elements: Vec<Element> },
    List { ordered: bool, items: Vec<Vec<Element>> },
    Inlines { kind: InlineKind, inlines: Vec<Inline> },
    Code { language: String, code: String },
    Ignored { name: &'static str, block: bool },
}

struct Builder {
    root: Vec<Element>,
    stack: Vec<Frame>,
    references: BTreeMap<String, String>,
    footnotes: HashMap<String, Vec<Inline>>,
    note_labels: Vec<String>,
    pending_notes: Vec<usize>,
    image: Option<(String, Vec<Inline>)>,
}

impl Builder {
    fn new(references: BTreeMap<String, String>) -> Self {
        Self {
            root: Vec::new(),
            stack: Vec::new(),
            references,
            footnotes: HashMap::new(),
            note_labels: Vec::new(),
            pending_notes: Vec::new(),
            image: None,
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        match event {
            Event::Start(tag) => self.start(tag)?,
            Event::End(_) => self.end()?,
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push_inline(Inline::styled(Marker::Code, Inline::words(&code))),
            Event::SoftBreak | Event::HardBreak => self.push_inline(Inline::Space),
            Event::FootnoteReference(label) => self.footnote_reference(&label),
            Event::Rule => {
                self.close_implicit()?;
                self.push_element(Element::PageBreak);
            }
            Event::Html(_) | Event::InlineHtml(_) => debug!("Skipping raw HTML"),
            _ => {}
        }
        Ok(())
    }

    fn start(&mut self, tag: Tag<'_>) -> Result<()> {
        let frame = match tag {
            Tag::Paragraph => Frame::Inlines {
                kind: InlineKind::Paragraph,
                inlines: Vec::new(),
            },
            Tag::Heading { level, id, .. } => Frame::Inlines {
                kind: InlineKind::Heading {
                    level: level_number(level),
                    id: id.map(|id| id.to_string()),
                },
                inlines: Vec::new(),
            },
            Tag::BlockQuote(_) => Frame::Blocks {
                kind: BlockKind::Quote,
                elements: Vec::new(),
            },
            Tag::CodeBlock(kind) => Frame::Code {
                language: match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or_default().to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                },
                code: String::new(),
            },
            Tag::List(first) => Frame::List {
                ordered: first.is_some(),
                items: Vec::new(),
            },
            Tag::Item => Frame::Blocks {
                kind: BlockKind::Item,
                elements: Vec::new(),
            },
            Tag::FootnoteDefinition(label) => Frame::Blocks {
                kind: BlockKind::Footnote(label.to_string()),
                elements: Vec::new(),
            },
            Tag::Emphasis => self.inline_frame(InlineKind::Emphasis),
            Tag::Strong => self.inline_frame(InlineKind::Strong),
            Tag::Strikethrough => self.inline_frame(InlineKind::Strikethrough),
            Tag::Link { dest_url, .. } => self.inline_frame(InlineKind::Link(dest_url.to_string())),
            Tag::Image { dest_url, .. } => self.inline_frame(InlineKind::Image(dest_url.to_string())),
            Tag::HtmlBlock => Frame::Ignored {
                name: "HtmlBlock",
                block: true,
            },
            Tag::Table(_) => Frame::Ignored {
                name: "Table",
                block: true,
            },
            _ => Frame::Ignored {
                name: "Unsupported",
                block: false,
            },
        };

        if matches!(frame, Frame::Blocks { .. } | Frame::List { .. } | Frame::Code { .. })
            || matches!(
                frame,
                Frame::Inlines {
                    kind: InlineKind::Paragraph | InlineKind::Heading { .. },
                    ..
                }
            )
            || matches!(frame, Frame::Ignored { block: true, .. })
        {
            self.close_implicit()?;
        }
        self.stack.push(frame);
        Ok(())
    }

    /// Frame for inline markup, opening an implicit paragraph when the
    /// markup appears directly inside a block container.
    fn inline_frame(&mut self, kind: InlineKind) -> Frame {
        self.ensure_inline_target();
        Frame::Inlines {
            kind,
            inlines: Vec::new(),
        }
    }

    fn ensure_inline_target(&mut self) {
        if matches!(self.stack.last(), None | Some(Frame::Blocks { .. })) {
            self.stack.push(Frame::Inlines {
                kind: InlineKind::Implicit,
                inlines: Vec::new(),
            });
        }
    }

    fn close_implicit(&mut self) -> Result<()> {
        if matches!(
            self.stack.last(),
            Some(Frame::Inlines {
                kind: InlineKind::Implicit,
                ..
            })
        ) {
            self.close_frame()?;
        }
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        // Implicit paragraphs have no end event of their own
        self.close_implicit()?;
        self.close_frame()
    }

    fn text(&mut self, text: &str) {
        if let Some(Frame::Code { code, .. }) = self.stack.last_mut() {
            code.push_str(text);
            return;
        }
        for inline in split_words(text) {
            self.push_inline(inline);
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        if inline == Inline::Space && !matches!(self.stack.last(), Some(Frame::Inlines { .. })) {
            return;
        }
        self.ensure_inline_target();
        if let Some(Frame::Inlines { inlines, .. }) = self.stack.last_mut() {
            // Smart quotes and escapes arrive as separate text events
            if let (Some(Inline::Text(last)), Inline::Text(text)) = (inlines.last_mut(), &inline) {
                last.push_str(text);
                return;
            }
            let redundant_space = inline == Inline::Space
                && matches!(inlines.last(), None | Some(Inline::Space));
            if !redundant_space {
                inlines.push(inline);
            }
        }
    }

    fn push_element(&mut self, element: Element) {
        match self.stack.last_mut() {
            None => self.root.push(element),
            Some(Frame::Blocks { elements, .. }) => elements.push(element),
            Some(Frame::List { items, .. }) => items.push(vec![element]),
            Some(_) => debug!("Dropping block nested in inline content"),
        }
    }

    fn footnote_reference(&mut self, label: &str) {
        let number = match self.note_labels.iter().position(|l| l == label) {
            Some(index) => index + 1,
            None => {
                self.note_labels.push(label.to_string());
                self.note_labels.len()
            }
        };
        if !self.pending_notes.contains(&number) {
            self.pending_notes.push(number);
        }
        // The mark attaches to the preceding word
        self.push_inline(Inline::text(superscript(number)));
    }

    fn take_notes(&mut self) -> Vec<Note> {
        self.pending_notes
            .drain(..)
            .map(|number| Note {
                number,
                elements: Vec::new(),
            })
            .collect()
    }

    fn close_frame(&mut self) -> Result<()> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| TypesetError::Markdown("unbalanced end of element".to_string()))?;

        match frame {
            Frame::Inlines { kind, inlines } => self.close_inlines(kind, inlines)?,
            Frame::Blocks { kind, elements } => match kind {
                BlockKind::Quote => {
                    for element in quote_elements(elements) {
                        self.push_element(element);
                    }
                }
                BlockKind::Item => match self.stack.last_mut() {
                    Some(Frame::List { items, .. }) => items.push(elements),
                    _ => {
                        for element in elements {
                            self.push_element(element);
                        }
                    }
                },
                BlockKind::Footnote(label) => {
                    self.footnotes.insert(label, footnote_inlines(elements));
                }
            },
            Frame::List { ordered, items } => self.push_element(if ordered {
                Element::OrderedList(items)
            } else {
                Element::UnorderedList(items)
            }),
            Frame::Code { language, code } => self.push_element(Element::CodeBlock {
                language,
                code: code.trim_end_matches('\n').to_string(),
            }),
            Frame::Ignored { name, block } => {
                if block {
                    warn!("Unsupported markdown construct: {}", name);
                    self.push_element(Element::Unprocessed(name.to_string()));
                }
            }
        }
        Ok(())
    }

    fn close_inlines(&mut self, kind: InlineKind, inlines: Vec<Inline>) -> Result<()> {
        match kind {
            InlineKind::Paragraph | InlineKind::Implicit => {
                if let Some(element) = self.finish_paragraph(inlines)? {
                    self.push_element(element);
                }
            }
            InlineKind::Heading { level, id } => {
                if self.image.is_some() {
                    return Err(TypesetError::Markdown(
                        "images are not supported in headings".to_string(),
                    ));
                }
                let element = self.finish_heading(level, id, inlines);
                self.push_element(element);
            }
            InlineKind::Emphasis => self.push_inline(Inline::italic(trim(inlines))),
            InlineKind::Strong => self.push_inline(Inline::bold(trim(inlines))),
            InlineKind::Strikethrough => {
                for inline in inlines {
                    self.push_inline(inline);
                }
            }
            InlineKind::Link(target) => {
                let link = self.link(target, inlines)?;
                self.push_inline(link);
            }
            InlineKind::Image(uri) => self.image = Some((uri, trim(inlines))),
        }
        Ok(())
    }

    fn finish_paragraph(&mut self, inlines: Vec<Inline>) -> Result<Option<Element>> {
        let inlines = trim(inlines);
        let notes = self.take_notes();
        if let Some((uri, caption)) = self.image.take() {
            if !inlines.is_empty() {
                return Err(TypesetError::Markdown(format!(
                    "image '{uri}' must be alone in its paragraph"
                )));
            }
            return Ok(Some(Element::Image {
                uri,
                caption: Text::new(caption).with_notes(notes),
            }));
        }
        if inlines.is_empty() {
            return Ok(None);
        }
        Ok(Some(Element::Paragraph(Text::new(inlines).with_notes(notes))))
    }

    fn finish_heading(&mut self, level: usize, id: Option<String>, inlines: Vec<Inline>) -> Element {
        let inlines = trim(inlines);
        let separator = inlines.iter().position(is_subtitle_separator);
        let (title, subtitle) = match separator {
            Some(split) if level == 2 => {
                let mut title = inlines;
                let subtitle = title.split_off(split + 1);
                title.pop();
                (trim(title), trim(subtitle))
            }
            _ => (inlines, Vec::new()),
        };

        let title = Text::new(title).with_notes(self.take_notes());
        let identifier = id.unwrap_or_else(|| slug(&Inline::plain_text(&title.elements)));
        match level {
            1 => Element::Chapter { title, identifier },
            2 => Element::SubChapter {
                title,
                subtitle: (!subtitle.is_empty()).then(|| Text::new(subtitle)),
                identifier,
            },
            _ => Element::Section { title, identifier },
        }
    }

    fn link(&self, target: String, inlines: Vec<Inline>) -> Result<Inline> {
        if let Some(id) = target.strip_prefix('#') {
            let title = self
                .references
                .get(id)
                .ok_or_else(|| TypesetError::UnknownReference(id.to_string()))?;
            let children = Inline::words(&small_caps(title));
            return Ok(Inline::styled(Marker::CrossRef(target), children));
        }
        Ok(Inline::styled(Marker::CrossRef(target), trim(inlines)))
    }

    fn finish(mut self) -> Result<Document> {
        while !self.stack.is_empty() {
            self.close_frame()?;
        }
        let mut elements = std::mem::take(&mut self.root);
        for element in &mut elements {
            self.resolve_notes(element);
        }
        Ok(Document {
            elements,
            references: self.references,
        })
    }

    fn resolve_notes(&self, element: &mut Element) {
        match element {
            Element::Chapter { title, .. } | Element::Section { title, .. } => self.fill(title),
            Element::SubChapter { title, subtitle, .. } => {
                self.fill(title);
                if let Some(subtitle) = subtitle {
                    self.fill(subtitle);
                }
            }
            Element::Paragraph(text) | Element::Quote(text) => self.fill(text),
            Element::Image { caption, .. } => self.fill(caption),
            Element::OrderedList(items) | Element::UnorderedList(items) => {
                for element in items.iter_mut().flatten() {
                    self.resolve_notes(element);
                }
            }
            Element::Aside(elements) => {
                for element in elements {
                    self.resolve_notes(element);
                }
            }
            Element::CodeBlock { .. } | Element::PageBreak | Element::Unprocessed(_) => {}
        }
    }

    fn fill(&self, text: &mut Text) {
        for note in &mut text.notes {
            let Some(label) = self.note_labels.get(note.number.wrapping_sub(1)) else {
                continue;
            };
            note.elements = match self.footnotes.get(label) {
                Some(elements) => elements.clone(),
                None => {
                    warn!("Footnote '{}' has no definition", label);
                    Inline::words(label)
                }
            };
        }
    }
}

fn is_subtitle_separator(inline: &Inline) -> bool {
    matches!(inline, Inline::Text(text) if text == SUBTITLE_SEPARATOR)
}

/// Words of a text fragment with a space for every whitespace run,
/// including leading and trailing ones.
fn split_words(text: &str) -> Vec<Inline> {
    let mut result = Vec::new();
    let mut word = String::new();
    for c in text.chars() {
        if c.is_whitespace() {
            if !word.is_empty() {
                result.push(Inline::Text(std::mem::take(&mut word)));
            }
            if result.last() != Some(&Inline::Space) {
                result.push(Inline::Space);
            }
        } else {
            word.push(c);
        }
    }
    if !word.is_empty() {
        result.push(Inline::Text(word));
    }
    result
}

fn trim(mut inlines: Vec<Inline>) -> Vec<Inline> {
    while inlines.last() == Some(&Inline::Space) {
        inlines.pop();
    }
    let leading = inlines.iter().take_while(|i| **i == Inline::Space).count();
    inlines.drain(..leading);
    inlines
}

/// Paragraphs of a quote become quotes, unless the quote opens with
/// `Aside:`, in which case the whole quote becomes one aside.
fn quote_elements(mut elements: Vec<Element>) -> Vec<Element> {
    let is_aside = matches!(
        elements.first(),
        Some(Element::Paragraph(first))
            if matches!(first.elements.first(), Some(Inline::Text(word)) if word == ASIDE_PREFIX)
    );
    if !is_aside {
        return elements
            .into_iter()
            .map(|element| match element {
                Element::Paragraph(text) => Element::Quote(text),
                other => other,
            })
            .collect();
    }

    if let Some(Element::Paragraph(first)) = elements.first_mut() {
        first.elements = trim(first.elements.split_off(1));
        if first.elements.is_empty() {
            elements.remove(0);
        }
    }
    vec![Element::Aside(elements)]
}

/// Footnote body as one run of inline text
fn footnote_inlines(elements: Vec<Element>) -> Vec<Inline> {
    let mut inlines = Vec::new();
    for element in elements {
        if let Element::Paragraph(text) = element {
            if !inlines.is_empty() {
                inlines.push(Inline::Space);
            }
            inlines.extend(text.elements);
        }
    }
    inlines
}
