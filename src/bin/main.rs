use clap::Parser;
use std::path::{Path, PathBuf};

use section_toc::anchor::anchor_or_generate;
use section_toc::config::{self, SettingsManager, TocSettings};
use section_toc::document::{Block, TocItem};
use section_toc::error::TocResult;
use section_toc::outline::{SectionLevels, flatten, resolve_section};
use section_toc::render::render;

/// Static rendering surface for section tables of contents.
///
/// Reads a document tree as JSON and prints the rendered TOC markup for every
/// TOC list block it contains. Anchors are byte-identical to the ones the
/// live editing surface computes for the same headings.
#[derive(Parser)]
#[command(name = "section-toc")]
#[command(version)]
#[command(about = "Render section tables of contents from a document tree")]
struct Cli {
    /// Document tree JSON file
    document: PathBuf,

    /// Settings TOML file (default: the user config file when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Recompute items from the heading structure instead of using the
    /// stored block attributes
    #[arg(long)]
    resolve: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> TocResult<()> {
    let raw = std::fs::read_to_string(&cli.document)?;
    let blocks: Vec<Block> = serde_json::from_str(&raw)?;

    let manager = SettingsManager::with_settings(load_settings(cli.config.as_deref())?);
    let settings = manager.load_settings();

    let levels = SectionLevels::default();
    let flat = flatten(&blocks);
    let mut rendered_any = false;

    for block in flat.iter().copied().filter(|block| block.is_toc_list()) {
        let items = if cli.resolve {
            resolved_items(&flat, block, levels)
        } else {
            block.attributes.h3_items.clone()
        };

        let markup = render(&items, &settings.wrapper_template, &settings.item_template);
        if !markup.is_empty() {
            println!("{markup}");
            rendered_any = true;
        }
    }

    if !rendered_any {
        log::info!("no renderable TOC blocks in {}", cli.document.display());
    } else if let Some(css) = &settings.custom_css {
        println!("<style>{css}</style>");
    }

    Ok(())
}

fn resolved_items(flat: &[&Block], block: &Block, levels: SectionLevels) -> Vec<TocItem> {
    let Some(section) = resolve_section(flat, &block.id, levels) else {
        return Vec::new();
    };
    section
        .items
        .into_iter()
        .map(|heading| TocItem {
            anchor: anchor_or_generate(heading.anchor.as_deref(), &heading.text),
            text: heading.text,
        })
        .collect()
}

fn load_settings(explicit: Option<&Path>) -> TocResult<TocSettings> {
    if let Some(path) = explicit {
        return TocSettings::load(path);
    }
    match config::user_config_path() {
        Some(path) if path.exists() => TocSettings::load(&path),
        _ => Ok(TocSettings::default()),
    }
}
