//! Page composition: margins, side column, mirroring and page numbers

use log::warn;

use super::{Page, PageSide};
use crate::constants::PAGE_NUMBER_ROW_FROM_BOTTOM;
use crate::format::Formatter;
use crate::paragraph::{EmitOptions, Inline, LineBreaker};
use crate::settings::Settings;
use crate::types::{Alignment, Result};

/// Turns packed pages into fully composed output lines
pub struct PageComposer<'a> {
    settings: &'a Settings,
    formatter: &'a dyn Formatter,
    linear: bool,
    numbers: LineBreaker,
}

impl<'a> PageComposer<'a> {
    pub fn new(settings: &'a Settings, formatter: &'a dyn Formatter, linear: bool) -> Self {
        Self {
            settings,
            formatter,
            linear,
            numbers: LineBreaker::without_hyphenation(settings.seed),
        }
    }

    fn blank(&self, width: usize) -> String {
        self.formatter.format_text(&" ".repeat(width))
    }

    /// Compose the page at `index` (0-based) into output lines.
    ///
    /// Outside linear mode the result has exactly `page_height` lines unless
    /// an overflowing block made the page taller.
    pub fn compose(&mut self, index: usize, page: &Page) -> Result<Vec<String>> {
        let s = self.settings;
        let side = PageSide::of_page(index);
        let outside = self.blank(s.margin_outside);
        let inside = self.blank(s.margin_inside);
        let spacing = self.blank(s.side_spacing);
        let empty_main = self.blank(s.main_width);
        let empty_side = self.blank(s.side_width);

        let rows = page.rows();
        let mut lines = Vec::with_capacity(rows.max(s.page_height));
        for row in 0..rows {
            let main = page
                .main
                .get(row)
                .filter(|line| !line.is_empty())
                .map_or(empty_main.as_str(), String::as_str);
            let note = page
                .sides
                .get(&row)
                .map_or(empty_side.as_str(), String::as_str);
            let line = match side {
                PageSide::Verso => [outside.as_str(), note, spacing.as_str(), main, inside.as_str()].concat(),
                PageSide::Recto => [inside.as_str(), main, spacing.as_str(), note, outside.as_str()].concat(),
            };
            lines.push(line);
        }

        if !self.linear && rows > s.page_height {
            warn!(
                "Page {} has {} rows but pages are {} rows high",
                index + 1,
                rows,
                s.page_height
            );
        }

        let padding = if self.linear {
            s.margin_bottom
        } else {
            s.page_height.saturating_sub(rows)
        };
        let blank_line = self.blank(s.page_width());
        lines.extend(std::iter::repeat_n(blank_line, padding));

        if s.page_numbers && s.margin_bottom >= PAGE_NUMBER_ROW_FROM_BOTTOM {
            if let Some(row) = lines.len().checked_sub(PAGE_NUMBER_ROW_FROM_BOTTOM) {
                lines[row] = self.page_number(index, side)?;
            }
        }

        Ok(lines)
    }

    /// Page number line, aligned toward the outer edge of the page
    fn page_number(&mut self, index: usize, side: PageSide) -> Result<String> {
        let s = self.settings;
        let width = s.main_width + s.side_spacing + s.side_width;
        let (alignment, left, right) = match side {
            PageSide::Verso => (Alignment::Left, s.margin_outside, s.margin_inside),
            PageSide::Recto => (Alignment::Right, s.margin_inside, s.margin_outside),
        };
        let number = (s.page_number_start + index).to_string();
        let aligned = self
            .numbers
            .align(
                &[Inline::text(number)],
                alignment,
                width,
                EmitOptions::formatter(self.formatter),
            )?
            .into_iter()
            .next()
            .unwrap_or_else(|| self.blank(width));
        Ok([self.blank(left), aligned, self.blank(right)].concat())
    }
}
