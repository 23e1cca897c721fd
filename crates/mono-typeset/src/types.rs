use thiserror::Error;

use crate::paragraph::MarkerKind;

#[derive(Error, Debug)]
pub enum TypesetError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Malformed rich text: {detail} ({kind:?} marker)")]
    Structure { kind: MarkerKind, detail: String },
    #[error("Hyphenation dictionary error: {0}")]
    Hyphenation(String),
    #[error("Link points to unknown reference '{0}'")]
    UnknownReference(String),
    #[error("Unsupported markdown: {0}")]
    Markdown(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, TypesetError>;

/// Horizontal alignment of a paragraph within its column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Alignment {
    Left,
    Right,
    Center,
    /// Stretch inter-word spacing so every line but the last fills the width
    #[default]
    Justify,
}

/// Statistics gathered while laying out a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutStatistics {
    /// Blocks consumed by the page layouter (manual breaks included)
    pub blocks: usize,
    /// Pages produced
    pub pages: usize,
    /// Explicit page-break markers encountered
    pub manual_breaks: usize,
    /// Side-note groups placed in the margin column
    pub side_groups: usize,
    /// Blocks taller than a whole page, placed anyway
    pub overflowing_blocks: usize,
}
