//! Document-to-pages pipeline

use log::{info, warn};

use crate::document::Document;
use crate::format::{Formatter, OutputFormat};
use crate::layout::{PageBuilder, PageComposer};
use crate::paragraph::LineBreaker;
use crate::render::Renderer;
use crate::settings::Settings;
use crate::types::{LayoutStatistics, Result};

/// Composed pages and the statistics gathered while laying them out
#[derive(Debug, Clone, Default)]
pub struct TypesetOutput {
    pub pages: Vec<Vec<String>>,
    pub statistics: LayoutStatistics,
}

impl TypesetOutput {
    /// The whole document in the formatter's output syntax
    pub fn write(&self, formatter: &dyn Formatter) -> String {
        formatter.write_document(&self.pages)
    }
}

/// Typeset a document with a line breaker built from the settings.
pub fn typeset(
    document: &Document,
    settings: &Settings,
    formatter: &dyn Formatter,
    linear: bool,
) -> Result<TypesetOutput> {
    settings.validate()?;
    let mut breaker = LineBreaker::for_settings(settings)?;
    typeset_with(document, settings, formatter, linear, &mut breaker)
}

/// Typeset a document with a caller-provided line breaker.
///
/// Elements are rendered one at a time and each page is composed as soon as
/// the layouter completes it.
pub fn typeset_with(
    document: &Document,
    settings: &Settings,
    formatter: &dyn Formatter,
    linear: bool,
    breaker: &mut LineBreaker,
) -> Result<TypesetOutput> {
    settings.validate()?;

    let mut renderer = Renderer::new(settings, formatter, breaker);
    let mut builder = PageBuilder::new(settings, linear);
    let mut composer = PageComposer::new(settings, formatter, linear);
    let mut pages = Vec::new();

    for element in &document.elements {
        for block in renderer.render_element(element)? {
            if let Some(page) = builder.push(block) {
                pages.push(composer.compose(pages.len(), &page)?);
            }
        }
    }

    let (last, statistics) = builder.finish();
    if let Some(page) = last {
        pages.push(composer.compose(pages.len(), &page)?);
    }

    info!(
        "Typeset {} elements into {} pages ({} blocks, {} side groups)",
        document.elements.len(),
        statistics.pages,
        statistics.blocks,
        statistics.side_groups
    );
    if statistics.overflowing_blocks > 0 {
        warn!(
            "{} blocks did not fit on a single page",
            statistics.overflowing_blocks
        );
    }

    Ok(TypesetOutput { pages, statistics })
}

/// Typeset on the blocking thread pool.
pub async fn spawn_typeset(
    document: Document,
    settings: Settings,
    format: OutputFormat,
    linear: bool,
) -> Result<TypesetOutput> {
    tokio::task::spawn_blocking(move || typeset(&document, &settings, format.formatter(), linear))
        .await?
}
