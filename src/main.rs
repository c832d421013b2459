//! kinship: relationship tracking over Denote contact notes.

use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser;
use miette::Result;

use kinship::app::Worker;
use kinship::config::{CONTACTS_DIR_ENV, Settings};
use kinship::error::KinshipError;
use kinship::paths::AppPaths;
use kinship::tui::KinshipTui;

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "KINSHIP_LOG";

#[derive(Parser)]
#[command(name = "kinship", version, about = "Keep in touch with the people in your notes")]
struct Cli {
    /// Directory containing `*__contact.md` files. Overrides KINSHIP_CONTACTS_DIR
    /// and the config file.
    #[arg(long, value_name = "PATH")]
    contacts_dir: Option<String>,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    let paths = AppPaths::resolve().map_err(KinshipError::from)?;
    init_logging(&paths);

    let override_dir = cli
        .contacts_dir
        .or_else(|| std::env::var(CONTACTS_DIR_ENV).ok());
    let settings = Settings::resolve(&paths, override_dir.as_deref()).map_err(KinshipError::from)?;
    tracing::info!(
        contacts = %settings.contacts_dir.display(),
        tasks = %settings.tasks_dir.display(),
        "starting"
    );

    let worker = Worker::new(settings.contacts_dir, settings.tasks_dir);
    KinshipTui::new(worker).run()
}

/// The TUI owns the terminal, so logs go to a file. If it cannot be opened
/// they are discarded.
fn init_logging(paths: &AppPaths) {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file = paths.ensure_dirs().ok().and_then(|()| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(paths.log_file())
            .ok()
    });

    match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::sink)
            .init(),
    }
}
