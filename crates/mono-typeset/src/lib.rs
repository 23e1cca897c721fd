pub mod constants;
mod document;
mod format;
mod io;
pub mod layout;
pub mod paragraph;
mod parse;
mod render;
mod settings;
pub mod styles;
mod typeset;
mod types;

pub use document::*;
pub use format::*;
pub use io::{load_markdown, save_pages};
pub use layout::{Block, Page, PageBuilder, PageComposer, PageSide, paginate};
pub use paragraph::{Dictionary, Hyphenate, Inline, LineBreaker, Marker, NoHyphenation, StyledToken};
pub use parse::parse_markdown;
pub use render::Renderer;
pub use settings::Settings;
pub use typeset::{TypesetOutput, spawn_typeset, typeset, typeset_with};
pub use types::*;
