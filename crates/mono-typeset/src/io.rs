//! Loading markdown sources and saving typeset output

use std::path::{Path, PathBuf};

use log::debug;

use crate::document::Document;
use crate::format::OutputFormat;
use crate::parse::parse_markdown;
use crate::typeset::TypesetOutput;
use crate::types::*;

/// Load and parse a markdown file, or every `.md` file of a directory in
/// name order as one document.
pub async fn load_markdown(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let text = if tokio::fs::metadata(path).await?.is_dir() {
        read_directory(path).await?
    } else {
        tokio::fs::read_to_string(path).await?
    };
    let document = tokio::task::spawn_blocking(move || parse_markdown(&text)).await??;
    Ok(document)
}

async fn read_directory(dir: &Path) -> Result<String> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "md") {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(TypesetError::Config(format!(
            "No markdown files found in {}",
            dir.display()
        )));
    }
    files.sort();

    let mut text = String::new();
    for file in files {
        debug!("Reading {}", file.display());
        text.push_str(&tokio::fs::read_to_string(&file).await?);
        text.push_str("\n\n");
    }
    Ok(text)
}

/// Write typeset pages in the given output format.
pub async fn save_pages(
    output: &TypesetOutput,
    format: OutputFormat,
    path: impl AsRef<Path>,
) -> Result<()> {
    let text = output.write(format.formatter());
    tokio::fs::write(path, text).await?;
    Ok(())
}
