pub mod color;
pub mod dialogs;
pub mod form;
pub mod help;
pub mod input;
pub mod reminders;
pub mod status_bar;
pub mod task_table;
