//! Block editor history CLI.
//!
//! Provides the `blockdoc` binary for inspecting the recovery record an
//! editor session left behind and for replaying recorded actions offline.
//!
//! Reads configuration from environment variables:
//! - `BLOCKDOC_DB_PATH`: SQLite recovery database (default: "blockdoc.db")
//! - `BLOCKDOC_CONFIG`: optional path to an editor configuration JSON file
//! - `RUST_LOG`: log filter, logs go to stderr

use std::fs;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use blockdoc_core::{DocumentState, NewAction};
use blockdoc_editor::{EditorConfig, HistoryEngine};
use blockdoc_storage::{decode_record, RecoveryRecord, RecoveryStore, SqliteStore, RECOVERY_KEY};

/// Block editor history tools.
#[derive(Parser)]
#[command(name = "blockdoc", about = "Block editor history tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Summarize the stored recovery record.
    Show {
        /// Path to the recovery database (default: $BLOCKDOC_DB_PATH).
        #[arg(long)]
        db: Option<String>,
    },

    /// Delete the stored recovery record.
    Discard {
        /// Path to the recovery database (default: $BLOCKDOC_DB_PATH).
        #[arg(long)]
        db: Option<String>,
    },

    /// Record a JSON array of actions and print the projected document.
    Replay {
        /// JSON file holding the actions.
        #[arg(short, long)]
        actions: String,

        /// Undo back to this action index (-1 = initial state).
        #[arg(short, long, allow_hyphen_values = true)]
        cursor: Option<isize>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Show { db } => run_show(&db_path(db)),
        Commands::Discard { db } => run_discard(&db_path(db)),
        Commands::Replay { actions, cursor } => run_replay(&actions, cursor),
    };
    process::exit(exit_code);
}

fn db_path(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("BLOCKDOC_DB_PATH").ok())
        .unwrap_or_else(|| "blockdoc.db".to_string())
}

/// Loads `BLOCKDOC_CONFIG` if set, else the defaults.
fn load_config() -> Result<EditorConfig, String> {
    let Ok(path) = std::env::var("BLOCKDOC_CONFIG") else {
        return Ok(EditorConfig::default());
    };
    let raw = fs::read_to_string(&path)
        .map_err(|e| format!("failed to read config '{}': {}", path, e))?;
    EditorConfig::from_json_str(&raw).map_err(|e| format!("config '{}': {}", path, e))
}

fn open_store(db_path: &str) -> Result<SqliteStore, String> {
    SqliteStore::new(db_path).map_err(|e| format!("failed to open database '{}': {}", db_path, e))
}

/// Execute the show subcommand.
fn run_show(db_path: &str) -> i32 {
    let store = match open_store(db_path) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 1;
        }
    };

    let raw = match store.read(RECOVERY_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            println!("no recovery data");
            return 0;
        }
        Err(e) => {
            eprintln!("Error: failed to read recovery data: {}", e);
            return 1;
        }
    };

    match decode_record(&raw) {
        Ok(record) => {
            print!("{}", summarize(&record));
            0
        }
        Err(e) => {
            eprintln!("Error: recovery data is malformed: {}", e);
            1
        }
    }
}

/// Execute the discard subcommand.
fn run_discard(db_path: &str) -> i32 {
    let mut store = match open_store(db_path) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 1;
        }
    };

    match store.remove(RECOVERY_KEY) {
        Ok(true) => {
            println!("recovery data discarded");
            0
        }
        Ok(false) => {
            println!("no recovery data");
            0
        }
        Err(e) => {
            eprintln!("Error: failed to discard recovery data: {}", e);
            1
        }
    }
}

/// Execute the replay subcommand.
fn run_replay(actions_path: &str, cursor: Option<isize>) -> i32 {
    let config = match load_config() {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 1;
        }
    };

    let raw = match fs::read_to_string(actions_path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: failed to read '{}': {}", actions_path, e);
            return 1;
        }
    };
    let actions: Vec<NewAction> = match serde_json::from_str(&raw) {
        Ok(actions) => actions,
        Err(e) => {
            eprintln!("Error: '{}' is not a JSON action list: {}", actions_path, e);
            return 1;
        }
    };

    let state = replay_actions(actions, &config, cursor);
    match serde_json::to_string_pretty(&state) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: failed to serialize document: {}", e);
            1
        }
    }
}

/// Records `actions` into a fresh history and undoes back to `cursor`.
fn replay_actions(
    actions: Vec<NewAction>,
    config: &EditorConfig,
    cursor: Option<isize>,
) -> DocumentState {
    let mut history = HistoryEngine::new(DocumentState::empty(), config.history.clone());
    for action in actions {
        history.record_action(action);
    }
    if let Some(target) = cursor {
        while history.current_action_index() > target && history.undo().is_some() {}
    }
    tracing::debug!(
        "Replayed to cursor {} of {} retained action(s)",
        history.current_action_index(),
        history.action_count()
    );
    history.current_state()
}

/// Human-readable summary of a recovery record.
fn summarize(record: &RecoveryRecord) -> String {
    let saved = record
        .saved_at
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown time".to_string());

    let mut out = format!("{} block(s), saved at {}\n", record.block_ids.len(), saved);
    for (idx, id) in record.block_ids.iter().enumerate() {
        let kind = record
            .blocks
            .get(id)
            .map(|b| b.content.block_type().to_string())
            .unwrap_or_else(|| "?".to_string());
        out.push_str(&format!("  {:>3}  {}  {}\n", idx, kind, id));
    }
    out
}
