use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use bs_detector::config::HistoryConfig;
use bs_detector::history::open_history;
use bs_detector::output;
use bs_detector::scoring::{validate_scoring, Analyzer};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_CONFIG: i32 = 4;
const EXIT_STORAGE: i32 = 5;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a claim and record it in history
    Check {
        /// Claim text; words are joined with spaces. Reads stdin when omitted.
        claim: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Do not record this check in history
        #[arg(long)]
        no_save: bool,

        /// Also print the shareable three-line summary
        #[arg(long)]
        share: bool,
    },
    /// Show past checks, newest first (default if no subcommand)
    History {
        /// Show at most N entries
        #[arg(short = 'n', long)]
        limit: Option<NonZeroUsize>,

        /// Only entries newer than this (e.g. "2h", "3days")
        #[arg(long)]
        since: Option<String>,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the shareable summary of a past check
    Share {
        /// 1-based history index, as shown by `history` (default: latest)
        index: Option<usize>,
    },
    /// Delete all history
    Clear,
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "bs-detector")]
#[command(about = "Score how much a claim smells like BS", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging and show the score breakdown
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/bs-detector/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "bs_detector=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize output: {}", e);
            std::process::exit(EXIT_FAILURE);
        }
    }
}

/// Join the positional words, or fall back to stdin when there are none.
fn read_claim(words: Vec<String>) -> String {
    if !words.is_empty() {
        return words.join(" ");
    }

    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        eprintln!("Failed to read claim from stdin: {}", e);
        std::process::exit(EXIT_USAGE);
    }
    input
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let command = cli.command.unwrap_or(Commands::History {
        limit: None,
        since: None,
        json: false,
    });
    let config_path = cli.config.map(PathBuf::from);

    // Init needs no existing config, so handle it before loading one
    if let Commands::Init { force } = command {
        let path = config_path
            .clone()
            .unwrap_or_else(bs_detector::config::get_config_path);
        match bs_detector::config::write_default_config(&path, force) {
            Ok(()) => {
                println!("Wrote default config to {}", path.display());
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => {
                eprintln!("Config error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    }

    // Load config
    let config = match bs_detector::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate scoring config at startup
    let effective_scoring = config.scoring.clone().unwrap_or_default();
    if let Err(errors) = validate_scoring(&effective_scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let analyzer = match Analyzer::new(&effective_scoring) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let history_config: HistoryConfig = config.history.clone().unwrap_or_default();
    let mut store = open_history(&history_config);
    let use_colors = !cli.no_color && output::should_use_colors();

    match command {
        Commands::Check {
            claim,
            json,
            no_save,
            share,
        } => {
            let claim = read_claim(claim);
            let claim = claim.trim();
            if claim.is_empty() {
                eprintln!("Please enter a claim to analyze.");
                std::process::exit(EXIT_USAGE);
            }

            let evaluation = analyzer.evaluate(claim);
            tracing::info!(
                score = evaluation.result.bs_score,
                verdict = %evaluation.result.verdict,
                "claim analyzed"
            );

            if json {
                print_json(&evaluation.result);
            } else {
                println!("{}", output::format_analysis(&evaluation.result, use_colors));
            }

            if cli.verbose {
                eprintln!();
                eprintln!("Score breakdown:");
                eprintln!("{}", output::format_breakdown(&evaluation.breakdown));
            }

            if share {
                println!();
                println!("{}", output::format_share_text(&evaluation.result));
            }

            if !no_save {
                if let Err(e) = store.record(evaluation.result) {
                    eprintln!("Storage error: {:#}", e);
                    std::process::exit(EXIT_STORAGE);
                }
            }
        }
        Commands::History { limit, since, json } => {
            let now = chrono::Utc::now();
            let cutoff = since.as_ref().map(|since| {
                match humantime::parse_duration(since)
                    .map_err(|e| e.to_string())
                    .and_then(|d| chrono::Duration::from_std(d).map_err(|e| e.to_string()))
                {
                    Ok(d) => now - d,
                    Err(e) => {
                        eprintln!("Invalid --since '{}': {}", since, e);
                        std::process::exit(EXIT_USAGE);
                    }
                }
            });

            let stored = store.list().len();
            let entries = store.recent(cutoff, limit);

            if cli.verbose {
                eprintln!("{} of {} entries in history", entries.len(), stored);
            }

            if json {
                print_json(&entries);
            } else {
                println!("{}", output::format_history(&entries, stored, use_colors, now));
            }
        }
        Commands::Share { index } => {
            let entries = store.list();
            if entries.is_empty() {
                eprintln!("No checks yet. Nothing to share.");
                std::process::exit(EXIT_USAGE);
            }

            let index = index.unwrap_or(1);
            if index < 1 || index > entries.len() {
                eprintln!(
                    "Invalid index {}. Must be between 1 and {}.",
                    index,
                    entries.len()
                );
                std::process::exit(EXIT_USAGE);
            }

            println!("{}", output::format_share_text(&entries[index - 1]));
        }
        Commands::Clear => {
            if let Err(e) = store.clear() {
                eprintln!("Storage error: {:#}", e);
                std::process::exit(EXIT_STORAGE);
            }
            println!("History cleared.");
        }
        Commands::Init { .. } => unreachable!("handled before config load"),
    }

    std::process::exit(EXIT_SUCCESS);
}
