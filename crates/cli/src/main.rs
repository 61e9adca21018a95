//! CLI for drafting presentations with a language model and rendering them
//! to PPTX.

mod session;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deckgen_agents::{AgentConfig, ContentGenerator, DraftGenerator, StockImages};
use deckgen_core::{
    build_presentation, parse_content, ContentTree, ImageProvider, OutlineFormatter,
    RenderOptions,
};
use deckgen_pptx::{DeckReader, PptxRenderer};
use session::{Reply, Session};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Generate slide decks from a topic, with iterative feedback.
#[derive(Parser, Debug)]
#[command(name = "deckgen")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Primary theme colour as a hex string
    #[arg(short, long, global = true, default_value = "#003366")]
    theme: String,

    /// Directory for generated decks
    #[arg(short, long, global = true, default_value = ".")]
    output_dir: PathBuf,

    /// Render without looking up any images
    #[arg(long, global = true)]
    no_images: bool,

    /// Show drafts as raw JSON instead of an outline
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive session: give a topic, review the draft, reply "yes" to render
    Chat,

    /// Generate a draft for a topic and print it
    Outline {
        /// Presentation topic
        topic: String,
    },

    /// Render a saved draft (JSON) to a deck
    Render {
        /// Draft file
        draft: PathBuf,
    },

    /// Print the slide-by-slide text of a deck
    Inspect {
        /// Deck file (.pptx)
        deck: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match &args.command {
        Command::Chat => run_chat(&args),
        Command::Outline { topic } => run_outline(&args, topic),
        Command::Render { draft } => run_render(&args, draft),
        Command::Inspect { deck } => run_inspect(deck),
    }
}

fn render_options(args: &Args) -> RenderOptions {
    RenderOptions::with_theme_color(&args.theme).include_images(!args.no_images)
}

fn load_config() -> Result<AgentConfig> {
    AgentConfig::from_env().context("Failed to load configuration")
}

/// Image provider, unless images are disabled or no search key is configured.
fn image_provider(args: &Args, config: &AgentConfig) -> Result<Option<StockImages>> {
    if args.no_images {
        return Ok(None);
    }
    StockImages::from_config(config).context("Failed to set up image search")
}

fn renderer(args: &Args) -> Result<PptxRenderer> {
    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            args.output_dir.display()
        )
    })?;
    Ok(PptxRenderer::new(&args.output_dir))
}

fn show_draft(args: &Args, tree: &ContentTree, raw: &str) -> Result<String> {
    if args.json {
        let value: serde_json::Value =
            serde_json::from_str(raw).unwrap_or_else(|_| serde_json::json!(tree));
        Ok(format!("{}\n", serde_json::to_string_pretty(&value)?))
    } else {
        Ok(OutlineFormatter::new().format_with_newline(tree))
    }
}

fn run_chat(args: &Args) -> Result<()> {
    let config = load_config()?;
    let generator = ContentGenerator::new(&config).context("Cannot start a session")?;
    log::debug!("Using model {}", generator.model());
    let images = image_provider(args, &config)?;
    let renderer = renderer(args)?;

    let mut session = Session::new(
        &generator as &dyn DraftGenerator,
        images.as_ref().map(|i| i as &dyn ImageProvider),
        &renderer,
        render_options(args),
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "What should the presentation be about? (Ctrl-D to quit)")?;

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            break;
        }

        match session.handle(&line) {
            Reply::Draft { tree, raw } => {
                writeln!(stdout, "\nHere is the draft plan:\n")?;
                write!(stdout, "{}", show_draft(args, &tree, &raw)?)?;
                writeln!(
                    stdout,
                    "\nType 'yes' to generate the file, or type feedback to change it."
                )?;
            }
            Reply::Rendered(path) => {
                writeln!(stdout, "Presentation ready: {}", path.display())?;
                writeln!(stdout, "What should we create next?")?;
            }
            Reply::Failed(message) => eprintln!("{}", message),
            Reply::Ignored => {}
        }
    }

    Ok(())
}

fn run_outline(args: &Args, topic: &str) -> Result<()> {
    let config = load_config()?;
    let generator = ContentGenerator::new(&config)?;

    let raw = generator
        .generate(topic)
        .map_err(deckgen_core::Error::from)?;
    let tree = parse_content(&raw)?;

    print!("{}", show_draft(args, &tree, &raw)?);
    Ok(())
}

fn run_render(args: &Args, draft: &Path) -> Result<()> {
    log::debug!("Rendering draft {}", draft.display());
    let raw = std::fs::read_to_string(draft)
        .with_context(|| format!("Failed to read {}", draft.display()))?;

    let images = if args.no_images {
        None
    } else {
        image_provider(args, &load_config()?)?
    };
    let renderer = renderer(args)?;

    let path = build_presentation(
        &raw,
        &render_options(args),
        images.as_ref().map(|i| i as &dyn ImageProvider),
        &renderer,
    )?;

    println!("{}", path.display());
    Ok(())
}

fn run_inspect(deck: &Path) -> Result<()> {
    let slides = DeckReader::new()
        .read_path(deck)
        .with_context(|| format!("Failed to read {}", deck.display()))?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}: {} slides", deck.display(), slides.len())?;
    for slide in &slides {
        writeln!(stdout)?;
        if slide.pictures > 0 {
            writeln!(stdout, "[{}] ({} picture(s))", slide.number, slide.pictures)?;
        } else {
            writeln!(stdout, "[{}]", slide.number)?;
        }
        for line in &slide.lines {
            writeln!(stdout, "  {}", line)?;
        }
    }

    Ok(())
}
