//! Block-to-page packing
//!
//! The builder consumes blocks one at a time and hands back each page as
//! soon as it is complete, so a document can be laid out without holding
//! all of its blocks or pages in memory.

use log::{debug, warn};

use super::{Block, Page};
use crate::settings::Settings;
use crate::types::LayoutStatistics;

/// Single-pass page packer
#[derive(Debug)]
pub struct PageBuilder {
    content_height: usize,
    margin_top: usize,
    linear: bool,
    current: Page,
    statistics: LayoutStatistics,
}

impl PageBuilder {
    /// In `linear` mode only manual breaks start a new page.
    pub fn new(settings: &Settings, linear: bool) -> Self {
        Self {
            content_height: settings.content_height(),
            margin_top: settings.margin_top,
            linear,
            current: Page::new(settings.margin_top),
            statistics: LayoutStatistics::default(),
        }
    }

    /// Add the next block, returning the page it completed, if any.
    ///
    /// Empty pages are never emitted: a manual break or forced break on a
    /// page with no blocks is a no-op.
    pub fn push(&mut self, block: Block) -> Option<Page> {
        self.statistics.blocks += 1;

        if block.is_page_break() {
            self.statistics.manual_breaks += 1;
            if self.current.is_empty() {
                debug!("Ignoring manual break on an empty page");
                return None;
            }
            return Some(self.flush());
        }

        let needed = block.needed();
        let mut flushed = None;
        if !self.linear && !self.current.is_empty() {
            let remaining = self.content_height as isize - self.current.occupied() as isize;
            if remaining < needed {
                debug!(
                    "Block needs {} rows but only {} remain; starting a new page",
                    needed, remaining
                );
                flushed = Some(self.flush());
            } else if block.break_before {
                flushed = Some(self.flush());
            }
        }

        if !self.linear && needed > self.content_height as isize {
            warn!(
                "Block of {} rows exceeds the page content height of {}; it will overflow",
                needed, self.content_height
            );
            self.statistics.overflowing_blocks += 1;
        }

        self.statistics.side_groups += block.sides.len();
        self.current.place(block);
        flushed
    }

    /// Finish the last page.
    ///
    /// Returns `None` only when the last page is empty and an earlier page
    /// was already emitted; a document with no content still yields one page.
    pub fn finish(mut self) -> (Option<Page>, LayoutStatistics) {
        let last = if self.current.is_empty() && self.statistics.pages > 0 {
            None
        } else {
            self.statistics.pages += 1;
            Some(self.current)
        };
        (last, self.statistics)
    }

    /// Statistics for the blocks consumed so far
    pub fn statistics(&self) -> &LayoutStatistics {
        &self.statistics
    }

    fn flush(&mut self) -> Page {
        self.statistics.pages += 1;
        debug!(
            "Flushing page {} with {} blocks",
            self.statistics.pages,
            self.current.block_count()
        );
        std::mem::replace(&mut self.current, Page::new(self.margin_top))
    }
}

/// Lazily pack a block stream into pages.
pub fn paginate<I>(blocks: I, settings: &Settings, linear: bool) -> Paginate<I::IntoIter>
where
    I: IntoIterator<Item = Block>,
{
    Paginate {
        blocks: blocks.into_iter(),
        builder: Some(PageBuilder::new(settings, linear)),
        statistics: None,
    }
}

/// Iterator returned by [`paginate`]
pub struct Paginate<I> {
    blocks: I,
    builder: Option<PageBuilder>,
    statistics: Option<LayoutStatistics>,
}

impl<I> Paginate<I> {
    /// Final statistics, available once the iterator is exhausted
    pub fn statistics(&self) -> Option<&LayoutStatistics> {
        self.statistics.as_ref()
    }
}

impl<I: Iterator<Item = Block>> Iterator for Paginate<I> {
    type Item = Page;

    fn next(&mut self) -> Option<Page> {
        let builder = self.builder.as_mut()?;
        for block in self.blocks.by_ref() {
            if let Some(page) = builder.push(block) {
                return Some(page);
            }
        }
        let (last, statistics) = self.builder.take()?.finish();
        self.statistics = Some(statistics);
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            page_height: 20,
            margin_top: 2,
            margin_bottom: 2,
            ..Default::default()
        }
    }

    fn block(n: usize) -> Block {
        Block::new(vec!["x".to_string(); n])
    }

    #[test]
    fn test_break_before_ignored_on_empty_page() {
        let pages: Vec<Page> =
            paginate(vec![block(1).with_break_before(true)], &settings(), false).collect();
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_break_before_flushes() {
        let blocks = vec![block(1), block(1).with_break_before(true)];
        let pages: Vec<Page> = paginate(blocks, &settings(), false).collect();
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn test_trailing_manual_break_leaves_no_blank_page() {
        let blocks = vec![block(1), Block::page_break()];
        let pages: Vec<Page> = paginate(blocks, &settings(), false).collect();
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_empty_stream_yields_one_page() {
        let mut iter = paginate(Vec::<Block>::new(), &settings(), false);
        assert!(iter.next().is_some_and(|page| page.is_empty()));
        assert!(iter.next().is_none());
        assert_eq!(iter.statistics().map(|s| s.pages), Some(1));
    }

    #[test]
    fn test_linear_mode_never_breaks_on_height() {
        let blocks = (0..10).map(|_| block(5));
        let pages: Vec<Page> = paginate(blocks, &settings(), true).collect();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].occupied(), 10 * 5 + 9);
    }

    #[test]
    fn test_oversized_block_counted() {
        let mut builder = PageBuilder::new(&settings(), false);
        assert!(builder.push(block(30)).is_none());
        assert_eq!(builder.statistics().overflowing_blocks, 1);
        assert!(builder.push(block(1)).is_some());
    }
}
