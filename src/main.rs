use clap::{Parser, Subcommand};
use review_deck::collect::{collect, membership};
use review_deck::headless::{HeadlessSurface, MemoryLocation};
use review_deck::types::ViewportMode;
use review_deck::url_sync::UrlSync;
use review_deck::{config, output, render, replay};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "review-deck")]
#[command(about = "Adaptive card pagination and deep linking for the review dashboard")]
#[command(long_about = "\
Adaptive card pagination and deep linking for the review dashboard

The same cards render as a grid canvas on wide viewports and as a swipeable
deck of pages on narrow ones. The layout is a tree of sections:

  card      a single card
  flatten   children are separate pages on mobile
  combine   always exactly one page

Every page or section with an id can be deep-linked as ?<id>.

Run 'review-deck gen-config' to generate a documented review-deck.toml.
Set RUST_LOG=review_deck=debug to trace navigation decisions.")]
#[command(version)]
struct Cli {
    /// Config file (stock defaults when absent)
    #[arg(long, default_value = "review-deck.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the page list and card membership per viewport mode
    Pages {
        /// Only show the mode this viewport width falls into
        #[arg(long)]
        width: Option<u32>,
    },
    /// Resolve a deep-link query string to a page or section
    Resolve {
        /// Query string, e.g. "?streak"
        query: String,
        /// Viewport width in logical pixels
        #[arg(long, default_value_t = 390)]
        width: u32,
    },
    /// Replay a scripted interaction timeline on the headless host
    Replay {
        /// Replay script (TOML)
        script: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render the dashboard shell to HTML
    Render {
        /// Analysis output to fill the cards from
        #[arg(long, default_value = "data.json")]
        data: PathBuf,
        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
    /// Validate the config and layout
    Check,
    /// Print a stock review-deck.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Pages { width } => {
            let deck = config::load_config(&cli.config)?;
            let layout = deck.layout();
            let modes = match width {
                Some(width) => vec![ViewportMode::from_width(width, deck.viewport.breakpoint)],
                None => vec![ViewportMode::Mobile, ViewportMode::Desktop],
            };
            for (i, mode) in modes.into_iter().enumerate() {
                if i > 0 {
                    println!();
                }
                output::print_pages(&layout, mode, &collect(&layout, mode));
                println!();
                output::print_membership(mode, &membership(&layout, mode));
            }
        }
        Command::Resolve { query, width } => {
            let deck = config::load_config(&cli.config)?;
            let layout = deck.layout();
            let mode = ViewportMode::from_width(width, deck.viewport.breakpoint);
            let pages = collect(&layout, mode);
            let surface = HeadlessSurface::new(&layout, mode, width);
            let location = MemoryLocation::new(&query);
            let options = deck.navigator_options();
            let resolution = UrlSync::new(options.self_write_guard)
                .resolve_location(&location, mode, &pages, &surface);
            output::print_resolution(&query, mode, &pages, &resolution);
        }
        Command::Replay { script, json } => {
            let deck = config::load_config(&cli.config)?;
            let script = replay::Script::load(&script)?;
            let report = replay::run(&script, deck.layout(), deck.navigator_options());
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_replay(&report);
            }
        }
        Command::Render { data, output: out } => {
            let deck = config::load_config(&cli.config)?;
            let summary = render::render(&deck, &data, &out)?;
            println!(
                "Rendered {} cards → {}",
                summary.cards,
                summary.output.display()
            );
            for card in &summary.unbound {
                println!("    no data: {}", card);
            }
        }
        Command::Check => {
            println!("==> Checking {}", cli.config.display());
            let deck = config::load_config(&cli.config)?;
            let layout = deck.layout();
            output::print_check(
                &layout,
                &collect(&layout, ViewportMode::Mobile),
                &collect(&layout, ViewportMode::Desktop),
            );
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr so command output stays pipeable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
