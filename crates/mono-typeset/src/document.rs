//! Document element tree produced by the markdown front-end

use std::collections::BTreeMap;

use crate::paragraph::Inline;

/// A footnote attached to a piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Number shown as the reference mark, counted from 1 per document
    pub number: usize,
    pub elements: Vec<Inline>,
}

/// Rich text plus the footnotes referenced from it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    pub elements: Vec<Inline>,
    pub notes: Vec<Note>,
}

impl Text {
    pub fn new(elements: Vec<Inline>) -> Self {
        Self {
            elements,
            notes: Vec::new(),
        }
    }

    /// Plain words of `text` without styling
    pub fn plain(text: &str) -> Self {
        Self::new(Inline::words(text))
    }

    pub fn with_notes(mut self, notes: Vec<Note>) -> Self {
        self.notes = notes;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// One top-level or nested document element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Chapter {
        title: Text,
        identifier: String,
    },
    SubChapter {
        title: Text,
        subtitle: Option<Text>,
        identifier: String,
    },
    Section {
        title: Text,
        identifier: String,
    },
    Paragraph(Text),
    Quote(Text),
    OrderedList(Vec<Vec<Element>>),
    UnorderedList(Vec<Vec<Element>>),
    Aside(Vec<Element>),
    CodeBlock {
        language: String,
        code: String,
    },
    Image {
        uri: String,
        caption: Text,
    },
    PageBreak,
    /// Input the front-end could not map; carries the source construct's name
    Unprocessed(String),
}

/// A parsed document ready for typesetting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub elements: Vec<Element>,
    /// Heading identifier to plain-text title
    pub references: BTreeMap<String, String>,
}

impl Document {
    pub fn new(elements: Vec<Element>) -> Self {
        Self {
            elements,
            references: BTreeMap::new(),
        }
    }
}
