mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use vocab_lib::vocabulary::{ExerciseType, ItemStatus, NewWord, SessionParams};

#[derive(Parser)]
#[command(name = "vocab-cli", about = "Vocabulary flashcards with spaced repetition", version)]
struct Cli {
    /// Data directory (default: platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Add a word to your vocabulary
    Add {
        word: String,
        definition: String,
        /// Pronunciation in IPA
        #[arg(long)]
        ipa: Option<String>,
        /// Example sentence (repeatable)
        #[arg(long = "example")]
        examples: Vec<String>,
        /// Grammatical category (noun, verb, ...)
        #[arg(long = "type")]
        word_type: Option<String>,
        /// Accuracy smoothing factor for this word
        #[arg(long)]
        alpha: Option<f64>,
    },

    /// List words
    List {
        /// Only words with this status (new, learning, mastered)
        #[arg(long)]
        status: Option<ItemStatus>,
    },

    /// Show a word with its review history
    Show {
        /// Word (case-insensitive prefix match)
        word: String,
    },

    /// Remove a word
    Remove {
        /// Word (case-insensitive prefix match)
        word: String,
    },

    /// Preview what the next session would contain
    Due {
        /// Number of words (default from config)
        #[arg(long)]
        amount: Option<usize>,
    },

    /// Vocabulary statistics
    Stats,

    /// Record one review without a session
    Review {
        word: String,
        /// 1 = forgot, 3 = partially, 5 = knew it
        quality: i32,
    },

    /// Start an interactive practice session
    Practice {
        /// Number of words (default from config)
        #[arg(long)]
        amount: Option<usize>,
        /// guess-only, write-only or both (default from config)
        #[arg(long)]
        exercise: Option<ExerciseType>,
        /// Seed for a reproducible card order
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

fn init_logging(verbose: bool, configured: Option<&str>) {
    let default_level = if verbose { "debug" } else { configured.unwrap_or("warn") };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();

    let app = app::App::new(cli.data_dir.clone())?;
    init_logging(cli.verbose, app.config.log_level.as_deref());

    match cli.command {
        Command::Add { word, definition, ipa, examples, word_type, alpha } => {
            let new_word = NewWord {
                word,
                definition,
                ipa,
                examples,
                word_type,
                alpha,
            };
            commands::add::run(&app, new_word, &cli.format)?;
        }
        Command::List { status } => {
            commands::list::run(&app, status, &cli.format, use_color)?;
        }
        Command::Show { word } => {
            commands::show::run(&app, &word, &cli.format, use_color)?;
        }
        Command::Remove { word } => {
            commands::remove::run(&app, &word)?;
        }
        Command::Due { amount } => {
            commands::due::run(&app, amount, &cli.format, use_color)?;
        }
        Command::Stats => {
            commands::stats::run(&app, &cli.format)?;
        }
        Command::Review { word, quality } => {
            commands::review::run(&app, &word, quality, &cli.format, use_color).await?;
        }
        Command::Practice { amount, exercise, seed } => {
            let defaults = app.config.session_params();
            let params = SessionParams {
                amount: amount.unwrap_or(defaults.amount),
                exercise_type: exercise.unwrap_or(defaults.exercise_type),
            };
            commands::practice::run(&app, params, seed, use_color).await?;
        }
        Command::Config { init } => {
            commands::config::run(&app, init)?;
        }
    }

    Ok(())
}
