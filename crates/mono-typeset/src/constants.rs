//! Shared constants for monospace typesetting
//!
//! This module centralizes the default page geometry and the glyphs
//! used to decorate rendered elements.

// =============================================================================
// Default Page Geometry (columns and rows)
// =============================================================================

/// Width of the main text column
pub const DEFAULT_MAIN_WIDTH: usize = 60;

/// Rows per page, margins included
pub const DEFAULT_PAGE_HEIGHT: usize = 60;

/// Width of the side-note column
pub const DEFAULT_SIDE_WIDTH: usize = 22;

/// Gap between the side column and the main column
pub const DEFAULT_SIDE_SPACING: usize = 4;

/// Indentation unit for quotes, lists and asides
pub const DEFAULT_TAB_SIZE: usize = 4;

pub const DEFAULT_MARGIN_TOP: usize = 5;
pub const DEFAULT_MARGIN_BOTTOM: usize = 5;

/// Margin on the binding side of the page
pub const DEFAULT_MARGIN_INSIDE: usize = 8;

/// Margin on the outer edge of the page
pub const DEFAULT_MARGIN_OUTSIDE: usize = 6;

// =============================================================================
// Justification
// =============================================================================

/// Seed for the justification random source
pub const DEFAULT_SEED: u64 = 1337;

// =============================================================================
// Page Numbers
// =============================================================================

/// Page numbers sit on this row counted from the bottom of the page
pub const PAGE_NUMBER_ROW_FROM_BOTTOM: usize = 3;

// =============================================================================
// Decorations
// =============================================================================

/// Rule drawn above chapter titles
pub const CHAPTER_RULE: char = '━';

/// Rule drawn above sub-chapter titles and around asides
pub const LIGHT_RULE: char = '─';

/// Color of aside fences and indentation
pub const ASIDE_COLOR: &str = "#aaaaaa";

/// Unordered list bullet
pub const BULLET: char = '•';

/// Image placeholder frame: corners then edges
pub const FRAME_TOP_LEFT: char = '┌';
pub const FRAME_TOP_RIGHT: char = '┐';
pub const FRAME_BOTTOM_LEFT: char = '└';
pub const FRAME_BOTTOM_RIGHT: char = '┘';
pub const FRAME_VERTICAL: char = '│';

// =============================================================================
// Block Spacing
// =============================================================================

/// Blank lines between consecutive blocks on a page
pub const DEFAULT_BLOCK_OFFSET: isize = 1;

/// Negative offsets shrink the rows a block claims; no lines are removed
pub const CHAPTER_BLOCK_OFFSET: isize = -2;

pub const SUBCHAPTER_BLOCK_OFFSET: isize = 3;

/// Sub-chapter subtitles start one line below the rule
pub const SUBCHAPTER_SIDE_OFFSET: usize = 1;
