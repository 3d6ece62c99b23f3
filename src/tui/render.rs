use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use crate::tui::app::Mode;
use crate::tui::{App, Layout};
use crate::tui::widgets::{
    color::parse_color,
    dialogs::{render_action_menu, render_confirm_delete, render_message_dialog},
    form::render_task_form,
    help::render_help,
    reminders::render_reminders,
    status_bar::render_status_bar,
    task_table::render_task_table,
};

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let theme = &app.config.theme;
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let accent = parse_color(&theme.accent);

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("To-do Manager")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    let today = app.today_string();
    let sort_label = match app.sort.column {
        Some(column) => format!("{} {}", column.label(), if app.sort.descending { "▼" } else { "▲" }),
        None => "none".to_string(),
    };
    let header = Line::from(vec![
        Span::styled(format!(" Today: {}", today), Style::default().fg(accent).add_modifier(Modifier::BOLD)),
        Span::raw(format!("   Sort: {}", sort_label)),
    ]);
    f.render_widget(Paragraph::new(header), layout.header_area);

    render_task_table(
        f,
        layout.table_area,
        &app.tasks,
        &mut app.table_state,
        &app.sort,
        &today,
        &app.config,
    );

    render_reminders(f, layout.reminder_area, &app.reminders, &app.config);

    let hints = app.key_hints();
    render_status_bar(f, layout.status_area, app.status.message.as_ref(), &hints, &app.config);

    // Overlays, lowest first
    match app.mode {
        Mode::Browse => {}
        Mode::Form => {
            if let Some(form) = app.form.as_ref() {
                render_task_form(f, layout.inner_area, form, &app.config);
            }
        }
        Mode::Actions => {
            if let Some(task) = app.selected_task() {
                render_action_menu(f, layout.inner_area, task, app.action_index, &app.config);
            }
        }
        Mode::ConfirmDelete => {
            if let Some(task) = app.selected_task() {
                render_confirm_delete(f, layout.inner_area, task, app.confirm_delete_yes, &app.config);
            }
        }
        Mode::Help => render_help(f, layout.inner_area, &app.config),
    }

    if let Some(dialog) = app.dialogs.front() {
        render_message_dialog(f, layout.inner_area, dialog, &app.config);
    }
}
