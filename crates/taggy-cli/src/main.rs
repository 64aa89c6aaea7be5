//! Command-line driver for the taggy state core.
//!
//! Runs the same store the desktop frontend uses, without a window: scans
//! directories, manages the persisted directory list and preferences, and
//! prints the visible library.
//!
//! # Usage
//!
//! ```bash
//! taggy [OPTIONS] <COMMAND>
//!
//! # One-off scan, nothing persisted
//! taggy scan ~/Music --json
//!
//! # Track a directory and list the library
//! taggy dirs add ~/Music
//! taggy library --search "blue"
//!
//! # Change preferences
//! taggy prefs --theme dark --volume 0.8
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{WrapErr, eyre};
use taggy_core::{AudioFile, JsonFileStore, KeyValueStore, TagField, Theme};
use taggy_scanner::DiscoveryBackend;
use taggy_store::{PreferenceSync, ScanResults, ScanSummary, Store};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Audio tag library manager.
#[derive(Parser)]
#[command(name = "taggy", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the persisted state.
    ///
    /// Defaults to `taggy` under the platform configuration directory.
    #[arg(long, global = true, env = "TAGGY_STATE_DIR")]
    state_dir: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Scan directories once and print what was found. Nothing is persisted.
    Scan {
        /// Directories to scan.
        #[arg(required = true)]
        directories: Vec<Utf8PathBuf>,

        /// Only show files matching this search.
        #[arg(short, long)]
        search: Option<String>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Manage tracked directories.
    Dirs {
        /// Action to perform.
        #[command(subcommand)]
        action: DirsAction,
    },

    /// Rescan tracked directories and print the library.
    Library {
        /// Only show files matching this search.
        #[arg(short, long)]
        search: Option<String>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show or change preferences.
    Prefs {
        /// Color theme.
        #[arg(long, value_enum)]
        theme: Option<ThemeArg>,

        /// Playback volume, clamped to 0..=1.
        #[arg(long)]
        volume: Option<f64>,

        /// Show the extra tag fields in the editor.
        #[arg(long)]
        extra_fields: Option<bool>,

        /// Enable a search filter field.
        #[arg(long, value_enum)]
        enable_filter: Vec<FilterArg>,

        /// Disable a search filter field.
        #[arg(long, value_enum)]
        disable_filter: Vec<FilterArg>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

/// Tracked directory actions.
#[derive(Subcommand)]
enum DirsAction {
    /// List tracked directories.
    List,
    /// Track and scan a directory.
    Add {
        /// Directory to track.
        directory: Utf8PathBuf,
    },
    /// Stop tracking a directory.
    Remove {
        /// Directory to forget.
        directory: Utf8PathBuf,
    },
}

/// Theme choices.
#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
    System,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Self::Light,
            ThemeArg::Dark => Self::Dark,
            ThemeArg::System => Self::System,
        }
    }
}

/// Filterable tag fields.
#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    Title,
    Artist,
    Album,
    AlbumArtist,
    Genre,
    Year,
}

impl From<FilterArg> for TagField {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Title => Self::Title,
            FilterArg::Artist => Self::Artist,
            FilterArg::Album => Self::AlbumTitle,
            FilterArg::AlbumArtist => Self::AlbumArtist,
            FilterArg::Genre => Self::Genre,
            FilterArg::Year => Self::Year,
        }
    }
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects `RUST_LOG` if set. Otherwise uses `debug` with `--verbose`, or
/// `info` by default.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},ignore=warn"))
    });

    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Resolves the state directory from the flag, the environment, or the
/// platform configuration directory.
fn state_dir(cli: &Cli) -> color_eyre::Result<Utf8PathBuf> {
    if let Some(dir) = &cli.state_dir {
        return Ok(dir.clone());
    }
    let config = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .ok_or_else(|| eyre!("Could not determine a configuration directory, pass --state-dir"))?;
    let config = Utf8PathBuf::from_path_buf(config)
        .map_err(|path| eyre!("Configuration directory is not valid UTF-8: {}", path.display()))?;
    Ok(config.join("taggy"))
}

/// Creates the persistent key/value store.
fn open_storage(cli: &Cli) -> color_eyre::Result<Arc<dyn KeyValueStore>> {
    let dir = state_dir(cli)?;
    info!(state_dir = %dir, "Using state directory");
    Ok(Arc::new(JsonFileStore::new(dir)))
}

/// Creates a store over the filesystem discovery backend.
fn build_store(storage: Arc<dyn KeyValueStore>) -> Store {
    Store::builder(Arc::new(DiscoveryBackend::new()))
        .storage(storage)
        .build()
}

/// Makes `path` absolute against the current directory.
fn absolute(path: &Utf8Path) -> color_eyre::Result<Utf8PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }
    let cwd = std::env::current_dir().wrap_err("Failed to read the current directory")?;
    let cwd = Utf8PathBuf::from_path_buf(cwd)
        .map_err(|cwd| eyre!("Current directory is not valid UTF-8: {}", cwd.display()))?;
    Ok(cwd.join(path))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Scans `directories` into an in-memory store and prints the result.
async fn run_scan(
    directories: &[Utf8PathBuf],
    search: Option<&str>,
    json: bool,
) -> color_eyre::Result<()> {
    let store = Store::builder(Arc::new(DiscoveryBackend::new())).build();

    let mut summaries = Vec::with_capacity(directories.len());
    for directory in directories {
        let directory = absolute(directory)?;
        if let Ok(Some(summary)) = store.add_directory(Some(directory)).await {
            summaries.push(summary);
        }
    }
    flush_notifications(&store);

    let files = store.query(search.unwrap_or_default());
    if json {
        print_json(&ScanReport::new(&summaries, &files))
    } else {
        print_summaries(&summaries);
        print_files(&files);
        Ok(())
    }
}

/// Lists, adds or removes tracked directories.
async fn run_dirs(cli: &Cli, action: &DirsAction) -> color_eyre::Result<()> {
    let storage = open_storage(cli)?;

    match action {
        DirsAction::List => {
            let state = PreferenceSync::new(storage).load();
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            for directory in &state.directories {
                writeln!(handle, "{directory}")?;
            }
        }
        DirsAction::Add { directory } => {
            let store = build_store(storage);
            store.restore().await;
            let directory = absolute(directory)?;
            let result = store.add_directory(Some(directory)).await;
            flush_notifications(&store);
            result.wrap_err("Failed to add directory")?;
        }
        DirsAction::Remove { directory } => {
            let store = build_store(storage);
            store.restore().await;
            let directory = absolute(directory)?;
            let removed = store.remove_directory(&directory);
            flush_notifications(&store);
            match removed {
                Some(deleted) => info!(%directory, deleted, "Directory removed"),
                None => return Err(eyre!("Directory is not tracked: {directory}")),
            }
        }
    }
    Ok(())
}

/// Restores the tracked directories and prints the visible library.
async fn run_library(cli: &Cli, search: Option<&str>, json: bool) -> color_eyre::Result<()> {
    let store = build_store(open_storage(cli)?);
    let results = store.restore().await;
    flush_notifications(&store);

    let files = store.query(search.unwrap_or_default());
    if json {
        print_json(&files)
    } else {
        print_summaries(&successful(results));
        print_files(&files);
        Ok(())
    }
}

/// Prints the preferences, applying any requested changes first.
fn run_prefs(cli: &Cli, changes: &PrefsChanges) -> color_eyre::Result<()> {
    let mut sync = PreferenceSync::new(open_storage(cli)?);
    let mut state = sync.load();

    let preferences = &mut state.preferences;
    if let Some(theme) = changes.theme {
        preferences.theme = theme.into();
    }
    if let Some(volume) = changes.volume {
        preferences.set_volume(volume);
    }
    if let Some(extra) = changes.extra_fields {
        preferences.show_extra_tag_fields = extra;
    }
    for field in &changes.enable_filter {
        preferences.set_filter_field((*field).into(), true);
    }
    for field in &changes.disable_filter {
        preferences.set_filter_field((*field).into(), false);
    }

    if sync.sync(&state).wrap_err("Failed to save preferences")? {
        info!("Preferences saved");
    }

    if changes.json {
        return print_json(&state.preferences);
    }

    let preferences = &state.preferences;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let filters: Vec<&str> = preferences.enabled_filter_fields().map(TagField::label).collect();
    let sort: Vec<String> = preferences
        .sort_criteria
        .iter()
        .map(|criterion| format!("{} {:?}", criterion.field.label(), criterion.direction))
        .collect();
    writeln!(handle, "Theme:             {:?}", preferences.theme)?;
    writeln!(handle, "Volume:            {:.2}", preferences.volume)?;
    writeln!(handle, "Extra tag fields:  {}", preferences.show_extra_tag_fields)?;
    writeln!(handle, "Filter fields:     {}", filters.join(", "))?;
    writeln!(handle, "Sort:              {}", sort.join(", "))?;
    Ok(())
}

/// Requested preference changes.
struct PrefsChanges {
    theme: Option<ThemeArg>,
    volume: Option<f64>,
    extra_fields: Option<bool>,
    enable_filter: Vec<FilterArg>,
    disable_filter: Vec<FilterArg>,
    json: bool,
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// JSON shape of `taggy scan --json`.
#[derive(serde::Serialize)]
struct ScanReport<'a> {
    directories: Vec<SummaryReport<'a>>,
    files: &'a [AudioFile],
}

#[derive(serde::Serialize)]
struct SummaryReport<'a> {
    directory: &'a Utf8Path,
    files: usize,
    failures: usize,
}

impl<'a> ScanReport<'a> {
    fn new(summaries: &'a [ScanSummary], files: &'a [AudioFile]) -> Self {
        let directories = summaries
            .iter()
            .map(|summary| SummaryReport {
                directory: &summary.directory,
                files: summary.files,
                failures: summary.failures,
            })
            .collect();
        Self { directories, files }
    }
}

fn successful(results: ScanResults) -> Vec<ScanSummary> {
    results
        .into_iter()
        .filter_map(|(_, result)| result.ok())
        .collect()
}

/// Writes pending notifications to stderr.
fn flush_notifications(store: &Store) {
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    for notification in store.take_notifications() {
        let level = if notification.is_error() { "error" } else { "note" };
        let _ = writeln!(handle, "{level}: {}", notification.text);
    }
}

fn print_summaries(summaries: &[ScanSummary]) {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    for summary in summaries {
        let _ = writeln!(handle, "{summary}");
    }
}

/// Prints one line per file: path, then title and artist when known.
fn print_files(files: &[AudioFile]) {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    let _ = writeln!(handle);
    let _ = writeln!(handle, "Files ({}):", files.len());
    for file in files {
        match (file.text(TagField::Title), file.text(TagField::Artist)) {
            (Some(title), Some(artist)) => {
                let _ = writeln!(handle, "  {}  [{title} / {artist}]", file.path);
            }
            (Some(title), None) => {
                let _ = writeln!(handle, "  {}  [{title}]", file.path);
            }
            _ => {
                let _ = writeln!(handle, "  {}", file.path);
            }
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> color_eyre::Result<()> {
    let json = serde_json::to_string_pretty(value).wrap_err("Failed to serialize JSON")?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{json}")?;
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.no_color);

    match &cli.command {
        Commands::Scan {
            directories,
            search,
            json,
        } => run_scan(directories, search.as_deref(), *json).await,
        Commands::Dirs { action } => run_dirs(&cli, action).await,
        Commands::Library { search, json } => run_library(&cli, search.as_deref(), *json).await,
        Commands::Prefs {
            theme,
            volume,
            extra_fields,
            enable_filter,
            disable_filter,
            json,
        } => {
            let changes = PrefsChanges {
                theme: *theme,
                volume: *volume,
                extra_fields: *extra_fields,
                enable_filter: enable_filter.clone(),
                disable_filter: disable_filter.clone(),
                json: *json,
            };
            run_prefs(&cli, &changes)
        }
    }
}
