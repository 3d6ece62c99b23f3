use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, size as terminal_size, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::tui::app::{Mode, TaskAction, TaskField, TaskForm, TaskInteractions};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::tui::App;
use crate::utils::parse_key_binding;

const PAGE_SIZE: usize = 10;

/// Restores the terminal on drop, including when unwinding from a panic
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut guard = Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: false,
        };
        execute!(io::stdout(), EnterAlternateScreen)?;
        guard.alternate_screen_enabled = true;
        Ok(guard)
    }

    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

/// Run the TUI until the user quits.
///
/// Besides input, every pass drains the reminder queue (rate limited by the
/// notification tick) so reminders show up while the user is idle.
pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    let (width, height) = terminal_size()?;
    let min_width = Layout::MIN_WIDTH + 2;
    let min_height = Layout::MIN_HEIGHT + 2;
    if width < min_width || height < min_height {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width, min_height
        )));
    }

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        app.check_status_message_timeout();
        let shown = app.drain_reminders(Instant::now());
        if shown > 0 {
            debug!(count = shown, "reminders shown");
        }

        let size = terminal.size()?;
        let rect = Rect::new(0, 0, size.width, size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(rect, app.reminders.len());
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key_event) = event::read()? {
                // Press only; Windows also reports releases
                if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event)? {
                    break;
                }
            }
        }
    }

    guard.restore()?;
    Ok(())
}

fn bound(binding: &str, key_event: &KeyEvent) -> Result<bool, TuiError> {
    let parsed = parse_key_binding(binding).map_err(TuiError::KeyBindingError)?;
    Ok(parsed.matches(key_event))
}

/// Returns `Ok(true)` when the user asked to quit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    // Message dialogs block everything underneath
    if !app.dialogs.is_empty() {
        if matches!(key_event.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_dialog();
        }
        return Ok(false);
    }

    match app.mode {
        Mode::Browse => handle_browse_mode(app, key_event),
        Mode::Form => handle_form_mode(app, key_event),
        Mode::Actions => handle_actions_mode(app, key_event),
        Mode::ConfirmDelete => handle_confirm_delete(app, key_event),
        Mode::Help => handle_help_mode(app, key_event),
    }
}

fn handle_browse_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let kb = app.config.key_bindings.clone();

    if bound(&kb.quit, &key_event)? {
        return Ok(true);
    }
    if bound(&kb.help, &key_event)? {
        app.mode = Mode::Help;
    } else if bound(&kb.new, &key_event)? {
        app.enter_create_mode();
    } else if bound(&kb.edit, &key_event)? || key_event.code == KeyCode::Enter {
        app.on_activate();
    } else if bound(&kb.delete, &key_event)? || key_event.code == KeyCode::Delete {
        app.on_context_action(TaskAction::Delete);
    } else if bound(&kb.actions, &key_event)? {
        if app.selected_task().is_some() {
            app.action_index = 0;
            app.mode = Mode::Actions;
        }
    } else if bound(&kb.cycle_status, &key_event)? {
        app.cycle_status();
    } else if bound(&kb.toggle_reminder, &key_event)? {
        app.on_context_action(TaskAction::ToggleReminder);
    } else if bound(&kb.sort, &key_event)? {
        app.cycle_sort();
    } else if bound(&kb.reverse_sort, &key_event)? {
        app.reverse_sort();
    } else if bound(&kb.dismiss_reminder, &key_event)? {
        app.dismiss_reminder();
    } else if bound(&kb.reload, &key_event)? {
        app.load_tasks();
    } else {
        match key_event.code {
            KeyCode::Up | KeyCode::Char('k') => app.move_selection_up(),
            KeyCode::Down | KeyCode::Char('j') => app.move_selection_down(),
            KeyCode::Home => app.on_select(0),
            KeyCode::End => app.on_select(app.tasks.len().saturating_sub(1)),
            KeyCode::PageUp => {
                let current = app.table_state.selected().unwrap_or(0);
                app.on_select(current.saturating_sub(PAGE_SIZE));
            }
            KeyCode::PageDown => {
                let current = app.table_state.selected().unwrap_or(0);
                app.on_select(current + PAGE_SIZE);
            }
            _ => {}
        }
    }
    Ok(false)
}

fn handle_form_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if key_event.code == KeyCode::Esc {
        app.exit_form();
        return Ok(false);
    }
    if key_event.code == KeyCode::Enter || bound(&app.config.key_bindings.save, &key_event)? {
        app.save_form();
        return Ok(false);
    }

    let today = app.today();
    let Some(form) = app.form.as_mut() else {
        app.mode = Mode::Browse;
        return Ok(false);
    };

    // Ctrl+l starts over with a blank new-task form
    if key_event.code == KeyCode::Char('l') && key_event.modifiers.contains(KeyModifiers::CONTROL) {
        *form = TaskForm::new(today);
        return Ok(false);
    }

    match key_event.code {
        KeyCode::Tab => {
            form.current_field = form.current_field.next();
            return Ok(false);
        }
        KeyCode::BackTab => {
            form.current_field = form.current_field.previous();
            return Ok(false);
        }
        _ => {}
    }

    match form.current_field {
        TaskField::Deadline if matches!(key_event.code, KeyCode::Up | KeyCode::Down) => {
            let days = if key_event.code == KeyCode::Up { 1 } else { -1 };
            form.shift_deadline(days, today);
        }
        TaskField::Status => match key_event.code {
            KeyCode::Right | KeyCode::Char(' ') => form.status = form.status.next(),
            KeyCode::Left => form.status = form.status.previous(),
            KeyCode::Up => form.current_field = form.current_field.previous(),
            KeyCode::Down => form.current_field = form.current_field.next(),
            _ => {}
        },
        TaskField::Reminder => match key_event.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => form.reminder = !form.reminder,
            KeyCode::Up => form.current_field = form.current_field.previous(),
            KeyCode::Down => form.current_field = form.current_field.next(),
            _ => {}
        },
        field => {
            match key_event.code {
                KeyCode::Up => form.current_field = field.previous(),
                KeyCode::Down => form.current_field = field.next(),
                _ => {
                    if let Some(input) = form.active_input() {
                        edit_input(input, key_event);
                    }
                }
            }
        }
    }
    Ok(false)
}

fn edit_input(input: &mut crate::tui::widgets::input::LineInput, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => input.insert_char(c),
        KeyCode::Char('u') => input.clear(),
        KeyCode::Backspace => input.delete_char(),
        KeyCode::Delete => input.delete_forward(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        _ => {}
    }
}

fn handle_actions_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let count = TaskAction::ALL.len();
    match key_event.code {
        KeyCode::Esc => app.mode = Mode::Browse,
        KeyCode::Up | KeyCode::Char('k') => app.action_index = (app.action_index + count - 1) % count,
        KeyCode::Down | KeyCode::Char('j') => app.action_index = (app.action_index + 1) % count,
        KeyCode::Enter => {
            let action = TaskAction::ALL[app.action_index.min(count - 1)];
            app.on_context_action(action);
        }
        KeyCode::Char(c) => {
            // 1-6 pick an entry directly
            if let Some(n) = c.to_digit(10) {
                if (1..=count as u32).contains(&n) {
                    app.on_context_action(TaskAction::ALL[n as usize - 1]);
                }
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_confirm_delete(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.mode = Mode::Browse,
        KeyCode::Left | KeyCode::Right | KeyCode::Tab => app.confirm_delete_yes = !app.confirm_delete_yes,
        KeyCode::Enter => {
            if app.confirm_delete_yes {
                app.confirm_delete();
            } else {
                app.mode = Mode::Browse;
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if key_event.code == KeyCode::Esc
        || bound(&app.config.key_bindings.help, &key_event)?
        || bound(&app.config.key_bindings.quit, &key_event)?
    {
        app.mode = Mode::Browse;
    }
    Ok(false)
}
