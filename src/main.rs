use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use std::time::Duration;
use todo::{Config, Database, Profile, cli::{Cli, Commands}};
use todo::reminder::{ReminderPoller, ReminderQueue};
use tokio_util::sync::CancellationToken;
use tracing::info;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let profile = if cli.dev {
        Profile::Dev
    } else {
        Profile::Prod
    };

    let config = match &cli.config {
        Some(path) => Config::load_from(&todo::utils::expand_path(path))?,
        None => Config::load_with_profile(profile)?,
    };

    let db_path = config.get_database_path();
    let log_dir = todo::utils::get_data_dir(profile)
        .or_else(|| db_path.parent().map(|p| p.to_path_buf()))
        .ok_or_else(|| eyre!("Could not determine a directory for the log file"))?;
    let _log_guard = todo::logging::init(&log_dir, &config.log_level)?;
    info!(profile = ?profile, db = %db_path.display(), "starting");

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => run_tui(config)?,
        Commands::Add { title, description, deadline, status, remind } => {
            let db = Database::open(&db_path)?;
            todo::cli::handle_add(title, description, deadline, status, remind, &db)?;
        }
        Commands::List { json } => {
            let db = Database::open(&db_path)?;
            todo::cli::handle_list(json, &db)?;
        }
        Commands::Status { id, status } => {
            let db = Database::open(&db_path)?;
            todo::cli::handle_status(id, status, &db)?;
        }
        Commands::Remind { id, setting } => {
            let db = Database::open(&db_path)?;
            todo::cli::handle_remind(id, setting, &db)?;
        }
        Commands::Delete { id } => {
            let db = Database::open(&db_path)?;
            todo::cli::handle_delete(id, &db)?;
        }
        Commands::Due { reminders } => {
            let db = Database::open(&db_path)?;
            todo::cli::handle_due(reminders, &db)?;
        }
    }

    Ok(())
}

/// The TUI runs on the main thread; the reminder poller runs on a small
/// tokio runtime next to it.
fn run_tui(config: Config) -> Result<()> {
    let db_path = config.get_database_path();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("todo-reminders")
        .enable_all()
        .build()?;

    let (sender, queue) = ReminderQueue::unbounded();
    let poller = ReminderPoller::new(&db_path, sender, CancellationToken::new())
        .with_interval(config.reminder_interval())
        .spawn(runtime.handle());

    // A store that fails to open is reported inside the TUI
    let database = Database::open(&db_path);
    let app = todo::tui::App::new(config, database, Some(queue));
    let result = todo::tui::run_event_loop(app);

    poller.stop();
    runtime.shutdown_timeout(Duration::from_millis(500));
    info!("exiting");

    result.map_err(Into::into)
}
