use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use super::output;
use crate::browse::{self, DEFAULT_PER_PAGE};
use crate::config::AppConfig;
use crate::export::{self, ExportFormat};
use crate::import::import_folders;
use crate::models::SearchLogEntry;
use crate::reconcile::{MatchTarget, ReconcilePolicy, TimeWindow, reconcile_archive};
use crate::search::{self, DEFAULT_RECENT_LIMIT};
use crate::storage::{Archive, ConversationQuery};
use crate::utils::format_path_with_tilde;

#[derive(Parser)]
#[command(name = "chat-archive-explorer")]
#[command(version)]
#[command(about = "Browse, search and repair an archive of exported chat conversations", long_about = None)]
pub struct Cli {
    /// Archive database [default: $CHAT_ARCHIVE_DB or the data directory]
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Search log file [default: $CHAT_ARCHIVE_SEARCH_LOG or the data directory]
    #[arg(long, global = true, value_name = "PATH")]
    pub search_log: Option<PathBuf>,

    /// More diagnostics on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List conversations, newest first
    List {
        /// Only titles containing this text
        #[arg(long)]
        title: Option<String>,
        /// Created on or after this date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        from: Option<String>,
        /// Created on or before this date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        to: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: usize,
        #[arg(long)]
        json: bool,
    },
    /// Show a conversation with all of its messages
    Show {
        conversation_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Show a message with its feedback and model comparisons
    Message {
        message_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Search conversation titles, payloads and message content
    Search {
        query: String,
        #[arg(long)]
        json: bool,
        /// Do not record this search in the search log
        #[arg(long)]
        no_log: bool,
    },
    /// Show the most recent searches
    Recent {
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },
    /// Export a conversation as JSON or HTML
    Export {
        conversation_id: String,
        #[arg(long, value_enum, default_value_t)]
        format: ExportFormat,
        /// Output file [default: conversation_<id>.<ext>]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Link orphaned messages to conversations
    Reconcile {
        /// Preset time window: strict (600s) or loose (3600s)
        #[arg(long, value_enum, default_value_t)]
        window: TimeWindow,
        /// Custom time window in seconds, overrides --window
        #[arg(long, value_name = "SECONDS")]
        window_secs: Option<f64>,
        /// Text compared against message content when no time match exists
        #[arg(long, value_enum, default_value_t)]
        target: MatchTarget,
        /// Write the matches; without this flag nothing is changed
        #[arg(long)]
        apply: bool,
        #[arg(long)]
        json: bool,
    },
    /// Import ChatGPT export folders into the archive
    Import {
        #[arg(required = true)]
        folders: Vec<PathBuf>,
    },
    /// Show statistics about the archive
    Stats,
}

/// Route diagnostics to stderr so stdout only carries command output
fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Open for commands that write; the archive is created if missing
fn open_archive(config: &AppConfig) -> Result<Archive> {
    Archive::open(&config.database_path).with_context(|| {
        format!("Failed to open archive {}", format_path_with_tilde(&config.database_path))
    })
}

/// Open for read-only commands; a missing archive is an error
fn open_existing_archive(config: &AppConfig) -> Result<Archive> {
    Archive::open_existing(&config.database_path).with_context(|| {
        format!("Failed to open archive {}", format_path_with_tilde(&config.database_path))
    })
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        println!("Use --help for usage information");
        return Ok(());
    };
    let config = AppConfig::resolve(cli.db.as_deref(), cli.search_log.as_deref())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::List { title, from, to, page, per_page, json } => {
            let query = ConversationQuery {
                title: title.clone().filter(|t| !t.is_empty()),
                start_date: browse::parse_optional_date(from.as_deref())?,
                end_date: browse::parse_optional_date(to.as_deref())?,
            };
            let archive = open_existing_archive(&config)?;
            let config = config.with_per_page(per_page);
            let page = browse::list_conversations(&archive, &query, page, config.per_page)?;

            if query != ConversationQuery::default() {
                let entry = SearchLogEntry::now(
                    title.as_deref().unwrap_or_default(),
                    from.as_deref(),
                    to.as_deref(),
                );
                search::log_search(&config.search_log_path, &entry)?;
            }

            if json {
                print_json(&page)?;
            } else {
                output::write_page(&mut out, &page)?;
            }
        }
        Commands::Show { conversation_id, json } => {
            let archive = open_existing_archive(&config)?;
            let view = browse::load_conversation_view(&archive, &conversation_id)?;
            if json {
                print_json(&view)?;
            } else {
                output::write_conversation(&mut out, &view)?;
            }
        }
        Commands::Message { message_id, json } => {
            let archive = open_existing_archive(&config)?;
            let detail = browse::message_detail(&archive, &message_id)?;
            if json {
                print_json(&detail)?;
            } else {
                output::write_message_detail(&mut out, &detail)?;
            }
        }
        Commands::Search { query, json, no_log } => {
            let archive = open_existing_archive(&config)?;
            let hits = search::search(&archive, &query)?;
            if !no_log {
                search::log_search(&config.search_log_path, &SearchLogEntry::now(&query, None, None))?;
            }
            if json {
                print_json(&hits)?;
            } else {
                output::write_hits(&mut out, &hits)?;
            }
        }
        Commands::Recent { limit } => {
            let entries = search::recent_searches(&config.search_log_path, limit)?;
            output::write_recent(&mut out, &entries)?;
        }
        Commands::Export { conversation_id, format, output } => {
            let archive = open_existing_archive(&config)?;
            let view = browse::load_conversation_view(&archive, &conversation_id)?;
            let path = output.unwrap_or_else(|| {
                PathBuf::from(export::default_file_name(&conversation_id, format))
            });
            export::export_to_file(&view, format, &path)?;
            writeln!(out, "Exported to {}", format_path_with_tilde(&path))?;
        }
        Commands::Reconcile { window, window_secs, target, apply, json } => {
            let mut policy = ReconcilePolicy::new(window).with_target(target);
            if let Some(secs) = window_secs {
                anyhow::ensure!(secs > 0.0, "--window-secs must be positive");
                policy = policy.with_window_secs(secs);
            }
            let mut archive = open_archive(&config)?;
            let run = reconcile_archive(&mut archive, &policy, apply)?;
            if json {
                print_json(&run)?;
            } else {
                output::write_reconcile(&mut out, &run)?;
            }
        }
        Commands::Import { folders } => {
            let mut archive = open_archive(&config)?;
            let report = import_folders(&mut archive, &folders)?;
            output::write_import(&mut out, &report)?;
        }
        Commands::Stats => {
            let archive = open_existing_archive(&config)?;
            let stats = browse::archive_stats(&archive)?;
            output::write_stats(&mut out, &stats, &format_path_with_tilde(&config.database_path))?;
        }
    }

    Ok(())
}
