pub mod cli;
pub mod config;
pub mod database;
pub mod logging;
pub mod models;
pub mod reminder;
pub mod tui;
pub mod utils;

pub use config::Config;
pub use database::{Database, StorageError};
pub use models::{Task, TaskDraft, TaskStatus};
pub use utils::Profile;
