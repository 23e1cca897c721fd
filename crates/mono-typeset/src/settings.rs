use crate::constants::*;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Page geometry and typesetting configuration.
///
/// All sizes are in character columns or rows.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    // Columns
    pub main_width: usize,
    pub side_width: usize,
    pub side_spacing: usize,
    pub tab_size: usize,

    // Page
    pub page_height: usize,
    pub margin_top: usize,
    pub margin_bottom: usize,
    pub margin_inside: usize,
    pub margin_outside: usize,

    // Text
    pub paragraph_alignment: Alignment,
    pub hyphenate: bool,
    pub seed: u64,

    // Page numbering
    pub page_numbers: bool,
    pub page_number_start: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            main_width: DEFAULT_MAIN_WIDTH,
            side_width: DEFAULT_SIDE_WIDTH,
            side_spacing: DEFAULT_SIDE_SPACING,
            tab_size: DEFAULT_TAB_SIZE,
            page_height: DEFAULT_PAGE_HEIGHT,
            margin_top: DEFAULT_MARGIN_TOP,
            margin_bottom: DEFAULT_MARGIN_BOTTOM,
            margin_inside: DEFAULT_MARGIN_INSIDE,
            margin_outside: DEFAULT_MARGIN_OUTSIDE,
            paragraph_alignment: Alignment::Justify,
            hyphenate: true,
            seed: DEFAULT_SEED,
            page_numbers: true,
            page_number_start: 1,
        }
    }
}

impl Settings {
    /// Load settings from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let settings = serde_json::from_slice(&bytes)
            .map_err(|e| TypesetError::Config(format!("Failed to parse settings: {}", e)))?;
        Ok(settings)
    }

    /// Save settings to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| TypesetError::Config(format!("Failed to serialize settings: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Total width of a composed page line
    pub fn page_width(&self) -> usize {
        self.margin_outside + self.side_width + self.side_spacing + self.main_width + self.margin_inside
    }

    /// Rows available for content between the vertical margins
    pub fn content_height(&self) -> usize {
        self.page_height
            .saturating_sub(self.margin_top + self.margin_bottom)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.main_width == 0 {
            return Err(TypesetError::Config(
                "Main column width must be greater than 0".to_string(),
            ));
        }
        if self.tab_size == 0 {
            return Err(TypesetError::Config(
                "Tab size must be greater than 0".to_string(),
            ));
        }

        // Quotes indent on both sides and still need room for a word
        if self.tab_size * 2 >= self.main_width {
            return Err(TypesetError::Config(format!(
                "Tab size {} leaves no room in a main column of width {}",
                self.tab_size, self.main_width
            )));
        }

        if self.content_height() == 0 {
            return Err(TypesetError::Config(format!(
                "Page height {} leaves no rows between margins {} and {}",
                self.page_height, self.margin_top, self.margin_bottom
            )));
        }

        Ok(())
    }
}
