mod logger;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use logger::StderrLogger;

#[derive(Parser)]
#[command(name = "mono", about = "Typeset markdown into monospace book pages", version)]
struct Cli {
    /// Markdown file, or a directory whose .md files form one book
    input: PathBuf,

    /// Output file; pages go to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (ansi, html, plain or ps)
    #[arg(short = 't', long = "to", default_value = "ansi", value_enum)]
    format: FormatArg,

    /// Settings file (JSON); missing fields keep their defaults
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write a settings file with every field filled in, then exit
    #[arg(long)]
    write_settings: Option<PathBuf>,

    /// Paragraph alignment, overriding the settings file
    #[arg(long, value_enum)]
    alignment: Option<AlignmentArg>,

    /// Main column width, overriding the settings file
    #[arg(long)]
    width: Option<usize>,

    /// Justification seed, overriding the settings file
    #[arg(long)]
    seed: Option<u64>,

    /// Disable hyphenation
    #[arg(long)]
    no_hyphenation: bool,

    /// One continuous page per manual break instead of fixed-height pages
    #[arg(long)]
    linear: bool,

    /// Show statistics only, don't write pages
    #[arg(long)]
    stats_only: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Ansi,
    Html,
    Plain,
    #[value(name = "ps")]
    PostScript,
}

#[derive(Clone, Copy, ValueEnum)]
enum AlignmentArg {
    Left,
    Right,
    Center,
    Justify,
}

impl From<FormatArg> for mono_typeset::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Ansi => Self::Ansi,
            FormatArg::Html => Self::Html,
            FormatArg::Plain => Self::Plain,
            FormatArg::PostScript => Self::PostScript,
        }
    }
}

impl From<AlignmentArg> for mono_typeset::Alignment {
    fn from(arg: AlignmentArg) -> Self {
        match arg {
            AlignmentArg::Left => Self::Left,
            AlignmentArg::Right => Self::Right,
            AlignmentArg::Center => Self::Center,
            AlignmentArg::Justify => Self::Justify,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    StderrLogger::new(cli.verbose).init()?;

    let mut settings = match &cli.settings {
        Some(path) => mono_typeset::Settings::load(path)
            .await
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => mono_typeset::Settings::default(),
    };
    if let Some(alignment) = cli.alignment {
        settings.paragraph_alignment = alignment.into();
    }
    if let Some(width) = cli.width {
        settings.main_width = width;
    }
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }
    if cli.no_hyphenation {
        settings.hyphenate = false;
    }
    settings.validate()?;

    if let Some(path) = &cli.write_settings {
        settings.save(path).await?;
        println!("Settings → {}", path.display());
        return Ok(());
    }

    let document = mono_typeset::load_markdown(&cli.input)
        .await
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    let format: mono_typeset::OutputFormat = cli.format.into();
    let output = mono_typeset::spawn_typeset(document, settings, format, cli.linear).await?;

    let stats = &output.statistics;
    if cli.stats_only || cli.output.is_some() {
        println!("Layout Statistics:");
        println!("  Blocks: {}", stats.blocks);
        println!("  Pages: {}", stats.pages);
        println!("  Manual breaks: {}", stats.manual_breaks);
        println!("  Side note groups: {}", stats.side_groups);
        if stats.overflowing_blocks > 0 {
            println!("  Overflowing blocks: {}", stats.overflowing_blocks);
        }
    }

    if cli.stats_only {
        return Ok(());
    }

    match &cli.output {
        Some(path) => {
            mono_typeset::save_pages(&output, format, path).await?;
            println!("Typeset → {}", path.display());
        }
        None => print!("{}", output.write(format.formatter())),
    }

    Ok(())
}
