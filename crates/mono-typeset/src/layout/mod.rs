//! Page layout
//!
//! This module packs rendered blocks into pages and composes them:
//! - Block and page data types
//! - Single-pass page packing with side-note placement
//! - Final composition with mirrored margins and page numbers

mod compose;
mod paginate;
mod types;

pub use compose::*;
pub use paginate::*;
pub use types::*;
