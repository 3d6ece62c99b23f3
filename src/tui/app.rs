use chrono::{Duration as DateDuration, NaiveDate};
use ratatui::widgets::TableState;
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::{Config, DueSummaryMode};
use crate::database::{Database, StorageError};
use crate::models::{Task, TaskDraft, TaskStatus};
use crate::reminder::{Reminder, ReminderQueue};
use crate::tui::widgets::input::LineInput;
use crate::utils;

const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Form,
    Actions,
    ConfirmDelete,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Title,
    Deadline,
    Status,
    Reminder,
}

impl SortColumn {
    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Id => "ID",
            SortColumn::Title => "Title",
            SortColumn::Deadline => "Deadline",
            SortColumn::Status => "Status",
            SortColumn::Reminder => "Reminder",
        }
    }
}

/// Display order of the table. `column: None` keeps insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub column: Option<SortColumn>,
    pub descending: bool,
}

impl SortState {
    /// None -> ID -> Title -> Deadline -> Status -> Reminder -> None
    pub fn cycle_column(&mut self) {
        self.column = match self.column {
            None => Some(SortColumn::Id),
            Some(SortColumn::Id) => Some(SortColumn::Title),
            Some(SortColumn::Title) => Some(SortColumn::Deadline),
            Some(SortColumn::Deadline) => Some(SortColumn::Status),
            Some(SortColumn::Status) => Some(SortColumn::Reminder),
            Some(SortColumn::Reminder) => None,
        };
    }

    pub fn apply(&self, tasks: &mut [Task]) {
        let compare = |a: &Task, b: &Task| -> Ordering {
            match self.column {
                None | Some(SortColumn::Id) => a.id.cmp(&b.id),
                Some(SortColumn::Title) => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
                Some(SortColumn::Deadline) => a.deadline.cmp(&b.deadline),
                Some(SortColumn::Status) => a.status.cmp(&b.status),
                Some(SortColumn::Reminder) => a.reminder.cmp(&b.reminder),
            }
        };
        if self.descending {
            tasks.sort_by(|a, b| compare(b, a));
        } else {
            tasks.sort_by(compare);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    Deadline,
    Status,
    Reminder,
}

impl TaskField {
    pub fn next(&self) -> Self {
        match self {
            TaskField::Title => TaskField::Description,
            TaskField::Description => TaskField::Deadline,
            TaskField::Deadline => TaskField::Status,
            TaskField::Status => TaskField::Reminder,
            TaskField::Reminder => TaskField::Title,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            TaskField::Title => TaskField::Reminder,
            TaskField::Description => TaskField::Title,
            TaskField::Deadline => TaskField::Description,
            TaskField::Status => TaskField::Deadline,
            TaskField::Reminder => TaskField::Status,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, TaskField::Title | TaskField::Description | TaskField::Deadline)
    }
}

#[derive(Debug, Clone)]
pub struct TaskForm {
    pub current_field: TaskField,
    pub title: LineInput,
    pub description: LineInput,
    pub deadline: LineInput,
    pub status: TaskStatus,
    pub reminder: bool,
    pub editing_id: Option<i64>, // None for new tasks
}

impl TaskForm {
    /// Blank form; the deadline starts at today like a date picker would
    pub fn new(today: NaiveDate) -> Self {
        Self {
            current_field: TaskField::Title,
            title: LineInput::new(),
            description: LineInput::new(),
            deadline: LineInput::from_string(&utils::format_date(today)),
            status: TaskStatus::Pending,
            reminder: false,
            editing_id: None,
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            current_field: TaskField::Title,
            title: LineInput::from_string(&task.title),
            description: LineInput::from_string(&task.description),
            deadline: LineInput::from_string(&task.deadline),
            status: task.status,
            reminder: task.reminder,
            editing_id: Some(task.id),
        }
    }

    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft::new(self.title.value())
            .description(self.description.value())
            .deadline(self.deadline.value())
            .status(self.status)
            .reminder(self.reminder)
    }

    /// Move the deadline by `days`, starting from today when the field does
    /// not hold a valid date
    pub fn shift_deadline(&mut self, days: i64, today: NaiveDate) {
        let base = utils::parse_date(self.deadline.value().trim()).unwrap_or(today);
        let shifted = base + DateDuration::days(days);
        self.deadline.set(&utils::format_date(shifted));
    }

    pub fn active_input(&mut self) -> Option<&mut LineInput> {
        match self.current_field {
            TaskField::Title => Some(&mut self.title),
            TaskField::Description => Some(&mut self.description),
            TaskField::Deadline => Some(&mut self.deadline),
            TaskField::Status | TaskField::Reminder => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Info,
    Warning,
    Error,
}

/// Blocking message box; input goes to it until dismissed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    MarkCompleted,
    MarkInProgress,
    MarkPending,
    ToggleReminder,
    Edit,
    Delete,
}

impl TaskAction {
    pub const ALL: [TaskAction; 6] = [
        TaskAction::MarkCompleted,
        TaskAction::MarkInProgress,
        TaskAction::MarkPending,
        TaskAction::ToggleReminder,
        TaskAction::Edit,
        TaskAction::Delete,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaskAction::MarkCompleted => "Mark as Completed",
            TaskAction::MarkInProgress => "Mark as In Progress",
            TaskAction::MarkPending => "Mark as Pending",
            TaskAction::ToggleReminder => "Toggle Reminder",
            TaskAction::Edit => "Edit Task",
            TaskAction::Delete => "Delete Task",
        }
    }
}

/// What the presentation layer does when the user interacts with the table.
/// The store never calls these; only the event loop does.
pub trait TaskInteractions {
    /// A row was selected
    fn on_select(&mut self, index: usize);
    /// The selected row was activated (Enter / double click)
    fn on_activate(&mut self);
    /// An entry of the per-task action menu was chosen
    fn on_context_action(&mut self, action: TaskAction);
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

pub struct App {
    pub config: Config,
    database: Option<Database>,
    unavailable_reason: String,

    pub tasks: Vec<Task>,
    pub table_state: TableState,
    pub sort: SortState,

    pub mode: Mode,
    pub form: Option<TaskForm>,
    pub action_index: usize,
    pub confirm_delete_yes: bool,
    pub dialogs: VecDeque<Dialog>,
    pub status: StatusState,

    /// Reminder notifications currently on screen, oldest first
    pub reminders: VecDeque<Reminder>,
    reminder_queue: Option<ReminderQueue>,
    last_drain: Option<Instant>,

    loads: usize,
    clock: fn() -> NaiveDate,
}

impl App {
    /// Build the app around an already opened (or failed) store.
    ///
    /// A store that failed to open is reported in a dialog; the app keeps
    /// running and every storage operation fails with
    /// [`StorageError::Unavailable`].
    pub fn new(
        config: Config,
        database: Result<Database, StorageError>,
        reminder_queue: Option<ReminderQueue>,
    ) -> Self {
        Self::with_clock(config, database, reminder_queue, utils::today)
    }

    pub fn with_clock(
        config: Config,
        database: Result<Database, StorageError>,
        reminder_queue: Option<ReminderQueue>,
        clock: fn() -> NaiveDate,
    ) -> Self {
        let mut dialogs = VecDeque::new();
        let (database, unavailable_reason) = match database {
            Ok(db) => (Some(db), String::new()),
            Err(e) => {
                warn!(error = %e, "task database could not be opened");
                dialogs.push_back(Dialog {
                    kind: DialogKind::Error,
                    title: "Database Error".to_string(),
                    body: format!("Error connecting to database: {}", e),
                });
                (None, e.to_string())
            }
        };

        let mut app = Self {
            config,
            database,
            unavailable_reason,
            tasks: Vec::new(),
            table_state: TableState::default(),
            sort: SortState::default(),
            mode: Mode::Browse,
            form: None,
            action_index: 0,
            confirm_delete_yes: false,
            dialogs,
            status: StatusState {
                message: Some("Ready".to_string()),
                message_time: None,
            },
            reminders: VecDeque::new(),
            reminder_queue,
            last_drain: None,
            loads: 0,
            clock,
        };
        app.load_tasks();
        app
    }

    fn db(&self) -> Result<&Database, StorageError> {
        self.database
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable(self.unavailable_reason.clone()))
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn today_string(&self) -> String {
        utils::format_date(self.today())
    }

    fn show_dialog(&mut self, kind: DialogKind, title: &str, body: String) {
        self.dialogs.push_back(Dialog {
            kind,
            title: title.to_string(),
            body,
        });
    }

    fn show_storage_error(&mut self, context: &str, e: StorageError) {
        warn!(error = %e, context, "storage operation failed");
        self.show_dialog(DialogKind::Error, "Database Error", format!("{}: {}", context, e));
    }

    pub fn dismiss_dialog(&mut self) {
        self.dialogs.pop_front();
    }

    /// Re-read every task from the store and refresh the table
    pub fn load_tasks(&mut self) {
        let selected_id = self.selected_task().map(|t| t.id);

        let result = self.db().and_then(|db| db.list_tasks());
        match result {
            Ok(mut tasks) => {
                self.sort.apply(&mut tasks);
                self.tasks = tasks;
                self.restore_selection(selected_id);
                self.set_status_message(format!("Loaded {} tasks", self.tasks.len()));
                self.check_due_tasks();
            }
            Err(e) => self.show_storage_error("Error loading tasks", e),
        }
        self.loads += 1;
    }

    /// Summary of every non-completed task due today, independent of the
    /// reminder flag. Failures are only logged.
    fn check_due_tasks(&mut self) {
        let show = match self.config.due_summary {
            DueSummaryMode::EveryReload => true,
            DueSummaryMode::StartupOnly => self.loads == 0,
            DueSummaryMode::Off => false,
        };
        if !show {
            return;
        }

        let today = self.today();
        let due = match self.db().and_then(|db| db.tasks_due_on(today, false)) {
            Ok(due) => due,
            Err(e) => {
                warn!(error = %e, "error checking due tasks");
                return;
            }
        };
        if due.is_empty() {
            return;
        }

        let list = due
            .iter()
            .map(|t| format!("• {}", t.title))
            .collect::<Vec<_>>()
            .join("\n");
        self.show_dialog(
            DialogKind::Info,
            "Tasks Due Today",
            format!("You have {} tasks due today:\n\n{}", due.len(), list),
        );
    }

    fn restore_selection(&mut self, selected_id: Option<i64>) {
        if self.tasks.is_empty() {
            self.table_state.select(None);
            return;
        }
        let index = selected_id
            .and_then(|id| self.tasks.iter().position(|t| t.id == id))
            .or(self.table_state.selected())
            .unwrap_or(0)
            .min(self.tasks.len() - 1);
        self.table_state.select(Some(index));
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.table_state.selected().and_then(|i| self.tasks.get(i))
    }

    pub fn move_selection_up(&mut self) {
        if let Some(i) = self.table_state.selected() {
            self.on_select(i.saturating_sub(1));
        }
    }

    pub fn move_selection_down(&mut self) {
        let next = self.table_state.selected().map(|i| i + 1).unwrap_or(0);
        self.on_select(next);
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn check_status_message_timeout(&mut self) {
        if let Some(time) = self.status.message_time {
            if time.elapsed() >= STATUS_MESSAGE_TIMEOUT {
                self.status.message = None;
                self.status.message_time = None;
            }
        }
    }

    pub fn enter_create_mode(&mut self) {
        self.form = Some(TaskForm::new(self.today()));
        self.mode = Mode::Form;
    }

    pub fn enter_edit_mode(&mut self) {
        if let Some(task) = self.selected_task() {
            self.form = Some(TaskForm::from_task(task));
            self.mode = Mode::Form;
            self.set_status_message("Edit task and save when done".to_string());
        }
    }

    pub fn exit_form(&mut self) {
        self.form = None;
        self.mode = Mode::Browse;
    }

    /// Validate the form and create or update the task. Validation failures
    /// keep the form open; nothing reaches the store.
    pub fn save_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let editing_id = form.editing_id;

        let draft = match form.to_draft().validate() {
            Ok(draft) => draft,
            Err(e) => {
                self.show_dialog(DialogKind::Warning, "Input Error", e.to_string());
                return;
            }
        };

        let result = self.db().and_then(|db| match editing_id {
            Some(id) => db.update_task(id, &draft).map(|_| id),
            None => db.create_task(&draft),
        });

        match (result, editing_id) {
            (Ok(id), None) => {
                info!(id, "task created");
                self.exit_form();
                self.load_tasks();
                self.select_task_id(id);
                self.set_status_message("Task added successfully".to_string());
            }
            (Ok(id), Some(_)) => {
                info!(id, "task updated");
                self.exit_form();
                self.load_tasks();
                self.set_status_message("Task updated successfully".to_string());
            }
            (Err(e), None) => self.show_storage_error("Error adding task", e),
            (Err(e), Some(_)) => self.show_storage_error("Error updating task", e),
        }
    }

    fn select_task_id(&mut self, id: i64) {
        if let Some(index) = self.tasks.iter().position(|t| t.id == id) {
            self.table_state.select(Some(index));
        }
    }

    pub fn request_delete(&mut self) {
        if self.selected_task().is_some() {
            self.confirm_delete_yes = false;
            self.mode = Mode::ConfirmDelete;
        }
    }

    pub fn confirm_delete(&mut self) {
        self.mode = Mode::Browse;
        let Some(id) = self.selected_task().map(|t| t.id) else {
            return;
        };
        match self.db().and_then(|db| db.delete_task(id)) {
            Ok(_) => {
                info!(id, "task deleted");
                self.load_tasks();
                self.set_status_message("Task deleted successfully".to_string());
            }
            Err(e) => self.show_storage_error("Error deleting task", e),
        }
    }

    pub fn change_status(&mut self, status: TaskStatus) {
        let Some(id) = self.selected_task().map(|t| t.id) else {
            return;
        };
        match self.db().and_then(|db| db.set_status(id, status)) {
            Ok(_) => {
                self.load_tasks();
                self.set_status_message(format!("Task marked as {}", status));
            }
            Err(e) => self.show_storage_error("Error updating task status", e),
        }
    }

    pub fn cycle_status(&mut self) {
        if let Some(next) = self.selected_task().map(|t| t.status.next()) {
            self.change_status(next);
        }
    }

    pub fn toggle_reminder(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id) else {
            return;
        };
        match self.db().and_then(|db| db.toggle_reminder(id)) {
            Ok(Some(enabled)) => {
                self.load_tasks();
                let state = if enabled { "enabled" } else { "disabled" };
                self.set_status_message(format!("Reminder {}", state));
            }
            // Deleted by someone else since the last reload
            Ok(None) => self.load_tasks(),
            Err(e) => self.show_storage_error("Error toggling reminder", e),
        }
    }

    pub fn cycle_sort(&mut self) {
        self.sort.cycle_column();
        self.resort();
    }

    pub fn reverse_sort(&mut self) {
        self.sort.descending = !self.sort.descending;
        self.resort();
    }

    fn resort(&mut self) {
        let selected_id = self.selected_task().map(|t| t.id);
        self.sort.apply(&mut self.tasks);
        self.restore_selection(selected_id);
    }

    /// Move queued reminders onto the screen, at most once per
    /// notification tick. Returns how many were added.
    pub fn drain_reminders(&mut self, now: Instant) -> usize {
        let tick = self.config.notification_tick();
        if let Some(last) = self.last_drain {
            if now.duration_since(last) < tick {
                return 0;
            }
        }
        self.last_drain = Some(now);

        let Some(queue) = self.reminder_queue.as_mut() else {
            return 0;
        };
        let drained = queue.drain();
        let count = drained.len();
        self.reminders.extend(drained);
        count
    }

    /// Dismiss the oldest reminder notification
    pub fn dismiss_reminder(&mut self) {
        self.reminders.pop_front();
    }

    pub fn key_hints(&self) -> Vec<String> {
        let kb = &self.config.key_bindings;
        let fmt = utils::format_key_binding_for_display;
        match self.mode {
            Mode::Browse => {
                let mut hints = vec![
                    format!("{}: New", fmt(&kb.new)),
                    format!("{}: Edit", fmt(&kb.edit)),
                    format!("{}: Delete", fmt(&kb.delete)),
                    format!("{}: Actions", fmt(&kb.actions)),
                    format!("{}: Status", fmt(&kb.cycle_status)),
                    format!("{}: Reminder", fmt(&kb.toggle_reminder)),
                    format!("{}: Sort", fmt(&kb.sort)),
                ];
                if !self.reminders.is_empty() {
                    hints.insert(0, format!("{}: Dismiss reminder", fmt(&kb.dismiss_reminder)));
                }
                hints.push(format!("{}: Help", fmt(&kb.help)));
                hints.push(format!("{}: Quit", fmt(&kb.quit)));
                hints
            }
            Mode::Form => vec![
                "Tab: Next field".to_string(),
                format!("Enter/{}: Save", fmt(&kb.save)),
                "Esc: Cancel".to_string(),
                "↑↓ on deadline: ±1 day".to_string(),
                "Ctrl+l: Clear".to_string(),
            ],
            Mode::Actions => vec!["↑↓: Choose".to_string(), "Enter: Apply".to_string(), "Esc: Close".to_string()],
            Mode::ConfirmDelete => vec!["y: Delete".to_string(), "n/Esc: Cancel".to_string()],
            Mode::Help => vec!["Esc: Close help".to_string()],
        }
    }
}

impl TaskInteractions for App {
    fn on_select(&mut self, index: usize) {
        if self.tasks.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(index.min(self.tasks.len() - 1)));
        }
    }

    fn on_activate(&mut self) {
        self.enter_edit_mode();
    }

    fn on_context_action(&mut self, action: TaskAction) {
        self.mode = Mode::Browse;
        match action {
            TaskAction::MarkCompleted => self.change_status(TaskStatus::Completed),
            TaskAction::MarkInProgress => self.change_status(TaskStatus::InProgress),
            TaskAction::MarkPending => self.change_status(TaskStatus::Pending),
            TaskAction::ToggleReminder => self.toggle_reminder(),
            TaskAction::Edit => self.enter_edit_mode(),
            TaskAction::Delete => self.request_delete(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::ReminderQueue;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn config(due_summary: DueSummaryMode) -> Config {
        Config {
            due_summary,
            ..Config::default()
        }
    }

    fn app_with(db: Database, due_summary: DueSummaryMode) -> App {
        App::with_clock(config(due_summary), Ok(db), None, fixed_today)
    }

    fn fill_form(app: &mut App, title: &str, deadline: &str) {
        app.enter_create_mode();
        let form = app.form.as_mut().unwrap();
        form.title.set(title);
        form.deadline.set(deadline);
    }

    #[test]
    fn blank_title_is_rejected_before_storage() {
        let mut app = app_with(Database::open_in_memory().unwrap(), DueSummaryMode::Off);
        fill_form(&mut app, "   ", "2024-01-05");
        app.save_form();

        assert_eq!(app.mode, Mode::Form);
        assert_eq!(app.dialogs.front().map(|d| d.title.as_str()), Some("Input Error"));
        assert!(app.db().unwrap().list_tasks().unwrap().is_empty());
    }

    #[test]
    fn saving_new_task_reloads_and_selects_it() {
        let mut app = app_with(Database::open_in_memory().unwrap(), DueSummaryMode::Off);
        fill_form(&mut app, "Pay rent", "2024-01-05");
        app.save_form();

        assert_eq!(app.mode, Mode::Browse);
        assert!(app.form.is_none());
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.selected_task().map(|t| t.title.as_str()), Some("Pay rent"));
        assert_eq!(app.status.message.as_deref(), Some("Task added successfully"));
    }

    #[test]
    fn editing_replaces_all_fields() {
        let db = Database::open_in_memory().unwrap();
        db.create_task(&TaskDraft::new("Old").description("old desc").deadline("2024-02-01"))
            .unwrap();
        let mut app = app_with(db, DueSummaryMode::Off);

        app.on_activate();
        {
            let form = app.form.as_mut().unwrap();
            form.title.set("New");
            form.description.set("");
            form.status = TaskStatus::InProgress;
            form.reminder = true;
        }
        app.save_form();

        let task = app.tasks[0].clone();
        assert_eq!(task.title, "New");
        assert_eq!(task.description, "");
        assert_eq!(task.deadline, "2024-02-01");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.reminder);
    }

    #[test]
    fn due_summary_fires_on_every_reload_by_default() {
        let db = Database::open_in_memory().unwrap();
        db.create_task(&TaskDraft::new("Pay rent").deadline("2024-01-01")).unwrap();
        db.create_task(&TaskDraft::new("Later").deadline("2024-01-09")).unwrap();
        let mut app = app_with(db, DueSummaryMode::EveryReload);

        assert_eq!(app.dialogs.len(), 1);
        let dialog = app.dialogs.front().unwrap();
        assert_eq!(dialog.title, "Tasks Due Today");
        assert_eq!(dialog.body, "You have 1 tasks due today:\n\n• Pay rent");

        app.load_tasks();
        assert_eq!(app.dialogs.len(), 2);
    }

    #[test]
    fn due_summary_startup_only_fires_once() {
        let db = Database::open_in_memory().unwrap();
        db.create_task(&TaskDraft::new("Pay rent").deadline("2024-01-01")).unwrap();
        let mut app = app_with(db, DueSummaryMode::StartupOnly);
        app.load_tasks();
        assert_eq!(app.dialogs.len(), 1);
    }

    #[test]
    fn completed_tasks_are_left_out_of_summary() {
        let db = Database::open_in_memory().unwrap();
        db.create_task(&TaskDraft::new("Done").deadline("2024-01-01").status(TaskStatus::Completed))
            .unwrap();
        let app = app_with(db, DueSummaryMode::EveryReload);
        assert!(app.dialogs.is_empty());
    }

    #[test]
    fn unavailable_store_degrades_without_panicking() {
        let mut app = App::with_clock(
            config(DueSummaryMode::EveryReload),
            Err(StorageError::Directory("permission denied".to_string())),
            None,
            fixed_today,
        );
        // Open failure, then the initial load failure
        assert_eq!(app.dialogs.len(), 2);
        app.dialogs.clear();

        fill_form(&mut app, "Anything", "");
        app.save_form();
        let dialog = app.dialogs.front().unwrap();
        assert_eq!(dialog.kind, DialogKind::Error);
        assert!(dialog.body.starts_with("Error adding task: Database unavailable"));
    }

    #[test]
    fn context_actions_change_status_and_reminder() {
        let db = Database::open_in_memory().unwrap();
        db.create_task(&TaskDraft::new("Task")).unwrap();
        let mut app = app_with(db, DueSummaryMode::Off);

        app.on_context_action(TaskAction::MarkCompleted);
        assert_eq!(app.tasks[0].status, TaskStatus::Completed);
        assert_eq!(app.status.message.as_deref(), Some("Task marked as Completed"));

        app.on_context_action(TaskAction::ToggleReminder);
        assert!(app.tasks[0].reminder);
        assert_eq!(app.status.message.as_deref(), Some("Reminder enabled"));
    }

    #[test]
    fn delete_requires_confirmation() {
        let db = Database::open_in_memory().unwrap();
        db.create_task(&TaskDraft::new("Task")).unwrap();
        let mut app = app_with(db, DueSummaryMode::Off);

        app.on_context_action(TaskAction::Delete);
        assert_eq!(app.mode, Mode::ConfirmDelete);
        assert_eq!(app.tasks.len(), 1);

        app.confirm_delete();
        assert!(app.tasks.is_empty());
        assert!(app.selected_task().is_none());
    }

    #[test]
    fn sorting_keeps_selected_task() {
        let db = Database::open_in_memory().unwrap();
        for (title, deadline) in [("b", "2024-03-01"), ("c", "2024-01-01"), ("a", "2024-02-01")] {
            db.create_task(&TaskDraft::new(title).deadline(deadline)).unwrap();
        }
        let mut app = app_with(db, DueSummaryMode::Off);
        app.on_select(0); // "b"

        app.cycle_sort(); // ID
        app.cycle_sort(); // Title
        let titles: Vec<&str> = app.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
        assert_eq!(app.selected_task().unwrap().title, "b");

        app.cycle_sort(); // Deadline
        app.reverse_sort();
        let deadlines: Vec<&str> = app.tasks.iter().map(|t| t.deadline.as_str()).collect();
        assert_eq!(deadlines, vec!["2024-03-01", "2024-02-01", "2024-01-01"]);
    }

    #[test]
    fn reminders_drain_once_per_tick() {
        let (sender, queue) = ReminderQueue::unbounded();
        let mut app = App::with_clock(
            config(DueSummaryMode::Off),
            Database::open_in_memory(),
            Some(queue),
            fixed_today,
        );

        sender.send(Reminder { task_id: 1, title: "Pay rent".to_string() });
        let start = Instant::now();
        assert_eq!(app.drain_reminders(start), 1);

        sender.send(Reminder { task_id: 2, title: "Call bank".to_string() });
        assert_eq!(app.drain_reminders(start + Duration::from_millis(10)), 0);
        assert_eq!(app.drain_reminders(start + Duration::from_secs(1)), 1);

        assert_eq!(app.reminders.len(), 2);
        app.dismiss_reminder();
        assert_eq!(app.reminders.front().map(|r| r.title.as_str()), Some("Call bank"));
    }

    #[test]
    fn deadline_shift_moves_by_days() {
        let mut form = TaskForm::new(fixed_today());
        form.shift_deadline(1, fixed_today());
        assert_eq!(form.deadline.value(), "2024-01-02");
        form.deadline.set("garbage");
        form.shift_deadline(-1, fixed_today());
        assert_eq!(form.deadline.value(), "2023-12-31");
    }
}
