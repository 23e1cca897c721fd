use super::Renderer;
use crate::constants::{ASIDE_COLOR, BULLET, LIGHT_RULE};
use crate::document::Element;
use crate::layout::Block;
use crate::paragraph::{Marker, StyledToken};
use crate::styles::circled;
use crate::types::Result;

impl Renderer<'_> {
    /// Render list items with a narrower renderer and indent them.
    ///
    /// Nested lists indent again through their own sub-renderer, so the
    /// indentation adds up per level. The first line of every item carries
    /// the bullet or number.
    pub(super) fn render_list(&mut self, items: &[Vec<Element>], ordered: bool) -> Result<Vec<Block>> {
        let tab = self.settings.tab_size;
        let indent = self.blank(tab);
        let width = self.inner_width(tab);

        let mut blocks = Vec::new();
        for (i, item) in items.iter().enumerate() {
            let bullet = if ordered {
                circled(i + 1)
            } else {
                BULLET.to_string()
            };
            let pad = tab.saturating_sub(bullet.chars().count());
            let decoration = self
                .formatter
                .format_text(&format!("{bullet}{}", " ".repeat(pad)));

            let mut sub_blocks = self.narrower(width).render_elements(item)?;
            let mut decorated = false;
            for block in sub_blocks.iter_mut().filter(|b| !b.is_page_break()) {
                for line in block.main.iter_mut() {
                    let prefix = if decorated { &indent } else { &decoration };
                    decorated = true;
                    line.insert_str(0, prefix);
                }
            }
            blocks.extend(sub_blocks);
        }
        Ok(blocks)
    }

    /// Render an aside as one unbreakable gray-fenced block.
    ///
    /// ```text
    /// ....────────....
    /// ....(blocks)....
    /// ....────────....
    /// ```
    pub(super) fn render_aside(&mut self, elements: &[Element]) -> Result<Block> {
        let main_width = self.settings.main_width;
        let tab = self.settings.tab_size;
        let width = self.inner_width(2 * tab);

        let gray = Marker::ForegroundColor(ASIDE_COLOR.to_string());
        let spaces = " ".repeat(tab);
        let left_indent = self.formatter.format_line(&[
            StyledToken::Open(gray.clone()),
            StyledToken::text(spaces.as_str()),
        ]);
        let right_indent = self
            .formatter
            .format_line(&[StyledToken::text(spaces.as_str()), StyledToken::Close(gray)]);
        let rule = self
            .formatter
            .format_text(&LIGHT_RULE.to_string().repeat(width));
        let fence = [left_indent.as_str(), rule.as_str(), right_indent.as_str()].concat();
        let empty_line = self.blank(main_width);

        let blocks = self.narrower(width).render_elements(elements)?;

        let mut main = vec![fence.clone()];
        let mut sides = Vec::new();
        for block in blocks.into_iter().filter(|b| !b.is_page_break()) {
            for line in &block.main {
                main.push([left_indent.as_str(), line.as_str(), right_indent.as_str()].concat());
            }
            main.push(empty_line.clone());
            sides.extend(block.sides);
        }
        if main.len() > 1 {
            let last = main.len() - 1;
            main[last] = fence;
        } else {
            main.push(fence);
        }

        Ok(Block::new(main).with_sides(sides))
    }
}
