//! Layout data types for page composition
//!
//! These types sit between the per-element renderers and the final
//! composed page lines.

use std::collections::BTreeMap;

use crate::constants::DEFAULT_BLOCK_OFFSET;

/// Which side of a bound book a page appears on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSide {
    /// Left-hand page (even page index)
    /// The binding edge is on the right, the side column on the left
    Verso,
    /// Right-hand page (odd page index)
    /// The binding edge is on the left, the side column on the right
    Recto,
}

impl PageSide {
    pub fn of_page(index: usize) -> Self {
        if index % 2 == 0 {
            PageSide::Verso
        } else {
            PageSide::Recto
        }
    }
}

/// Rendered unit consumed by the page layouter
///
/// A block never spans two pages: it is placed whole on the page under
/// construction or on a fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Formatted main-column lines
    pub main: Vec<String>,
    /// Side-note groups, each a run of formatted side-column lines
    pub sides: Vec<Vec<String>>,
    /// Rows between the block start and its first side note
    pub side_offset: usize,
    /// Blank rows before this block when it follows another on the page
    pub block_offset: isize,
    /// Start a new page unless the current one is still empty
    pub break_before: bool,
}

impl Default for Block {
    fn default() -> Self {
        Self {
            main: Vec::new(),
            sides: Vec::new(),
            side_offset: 0,
            block_offset: DEFAULT_BLOCK_OFFSET,
            break_before: false,
        }
    }
}

impl Block {
    pub fn new(main: Vec<String>) -> Self {
        Self {
            main,
            ..Default::default()
        }
    }

    /// Manual page break marker
    pub fn page_break() -> Self {
        Self::default()
    }

    pub fn with_sides(mut self, sides: Vec<Vec<String>>) -> Self {
        self.sides = sides;
        self
    }

    pub fn with_block_offset(mut self, block_offset: isize) -> Self {
        self.block_offset = block_offset;
        self
    }

    pub fn with_side_offset(mut self, side_offset: usize) -> Self {
        self.side_offset = side_offset;
        self
    }

    pub fn with_break_before(mut self, break_before: bool) -> Self {
        self.break_before = break_before;
        self
    }

    pub fn is_page_break(&self) -> bool {
        self.main.is_empty() && self.sides.is_empty()
    }

    /// Rows the main column claims, gap included
    pub fn main_needed(&self) -> isize {
        self.main.len() as isize + self.block_offset
    }

    /// Rows the side column claims: every group, one separator between
    /// consecutive groups, and the gap
    pub fn sides_needed(&self) -> isize {
        let lines: usize = self.sides.iter().map(Vec::len).sum();
        lines as isize + self.sides.len() as isize - 1 + self.block_offset
    }

    pub fn needed(&self) -> isize {
        self.main_needed().max(self.sides_needed())
    }
}

/// A page under construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Main-column rows, starting with the top margin; empty strings are blank
    pub main: Vec<String>,
    /// Side-column rows by row index
    pub sides: BTreeMap<usize, String>,
    margin_top: usize,
    blocks: usize,
    side_cursor: usize,
}

impl Page {
    /// Fresh page with `margin_top` blank rows
    pub fn new(margin_top: usize) -> Self {
        Self {
            main: vec![String::new(); margin_top],
            sides: BTreeMap::new(),
            margin_top,
            blocks: 0,
            side_cursor: 0,
        }
    }

    /// Whether no block has been placed yet
    pub fn is_empty(&self) -> bool {
        self.blocks == 0
    }

    pub fn block_count(&self) -> usize {
        self.blocks
    }

    /// Content rows used so far, top margin excluded
    pub fn occupied(&self) -> usize {
        self.main.len().saturating_sub(self.margin_top)
    }

    /// Rows the composed page needs before bottom padding
    pub fn rows(&self) -> usize {
        let side_rows = self.sides.keys().next_back().map_or(0, |&last| last + 1);
        self.main.len().max(side_rows)
    }

    /// Append a block: the gap if it follows another block, then its main
    /// lines, then its side notes below every side note already placed.
    pub fn place(&mut self, block: Block) {
        if !self.is_empty() {
            let gap = block.block_offset.max(0) as usize;
            self.main.extend(std::iter::repeat_n(String::new(), gap));
        }

        let mut row = (self.main.len() + block.side_offset).max(self.side_cursor);
        self.main.extend(block.main);
        for group in block.sides {
            for line in group {
                self.sides.insert(row, line);
                row += 1;
            }
            row += 1;
        }
        self.side_cursor = row;
        self.blocks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize, label: &str) -> Vec<String> {
        (0..n).map(|i| format!("{label}{i}")).collect()
    }

    #[test]
    fn test_needed_takes_taller_column() {
        let block = Block::new(lines(2, "m")).with_sides(vec![lines(3, "a"), lines(1, "b")]);
        assert_eq!(block.main_needed(), 3);
        assert_eq!(block.sides_needed(), 6);
        assert_eq!(block.needed(), 6);
    }

    #[test]
    fn test_first_block_has_no_gap() {
        let mut page = Page::new(5);
        page.place(Block::new(lines(3, "m")).with_block_offset(4));
        assert_eq!(page.occupied(), 3);
        page.place(Block::new(lines(1, "n")).with_block_offset(2));
        assert_eq!(page.occupied(), 6);
    }

    #[test]
    fn test_negative_offset_adds_no_gap() {
        let mut page = Page::new(0);
        page.place(Block::new(lines(1, "m")));
        page.place(Block::new(lines(1, "n")).with_block_offset(-2));
        assert_eq!(page.main, vec!["m0".to_string(), "n0".to_string()]);
    }

    #[test]
    fn test_side_notes_do_not_overlap() {
        let mut page = Page::new(0);
        page.place(Block::new(lines(1, "m")).with_sides(vec![lines(4, "a")]));
        page.place(Block::new(lines(1, "n")).with_sides(vec![lines(2, "b")]));
        // First group occupies 0..4, separator at 4, second group from 5
        assert_eq!(page.sides.get(&3).map(String::as_str), Some("a3"));
        assert_eq!(page.sides.get(&5).map(String::as_str), Some("b0"));
        assert_eq!(page.rows(), 7);
    }

    #[test]
    fn test_side_offset_shifts_notes() {
        let mut page = Page::new(2);
        page.place(Block::new(lines(3, "m")).with_sides(vec![lines(1, "s")]).with_side_offset(1));
        assert_eq!(page.sides.keys().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_page_side_alternates() {
        assert_eq!(PageSide::of_page(0), PageSide::Verso);
        assert_eq!(PageSide::of_page(1), PageSide::Recto);
    }
}
