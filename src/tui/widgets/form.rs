use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::style::{Modifier, Style};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use crate::Config;
use crate::models::TaskStatus;
use crate::tui::app::{TaskField, TaskForm};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::dialogs::popup_area;
use crate::tui::widgets::input::LineInput;

const FIELD_HEIGHT: u16 = 3;

/// Task form popup. Places the terminal cursor in the active text field.
pub fn render_task_form(f: &mut Frame, area: Rect, form: &TaskForm, config: &Config) {
    let theme = &config.theme;
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let accent = parse_color(&theme.accent);
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight_style = Style::default().bg(highlight_bg).fg(get_contrast_text_color(highlight_bg));
    let inactive_style = Style::default().fg(fg_color).add_modifier(Modifier::DIM);

    let title = if form.editing_id.is_some() { "Edit Task" } else { "New Task" };
    let outer = popup_area(area, 60, 90);
    let height = (FIELD_HEIGHT * 5 + 2).min(outer.height);
    let popup = Rect::new(outer.x, outer.y + (outer.height - height) / 2, outer.width, height);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(accent))
        .style(Style::default().fg(fg_color).bg(bg_color));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let field_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(FIELD_HEIGHT); 5])
        .split(inner);

    let style_for = |field: TaskField| {
        if form.current_field == field { highlight_style } else { inactive_style }
    };

    render_text_field(f, field_areas[0], "Title", &form.title, form.current_field == TaskField::Title, style_for(TaskField::Title));
    render_text_field(f, field_areas[1], "Description", &form.description, form.current_field == TaskField::Description, style_for(TaskField::Description));
    render_text_field(f, field_areas[2], "Deadline (YYYY-MM-DD, ↑↓ ±1 day)", &form.deadline, form.current_field == TaskField::Deadline, style_for(TaskField::Deadline));

    let status_line = Line::from(
        TaskStatus::ALL
            .iter()
            .flat_map(|status| {
                let label = format!(" {} ", status);
                let span = if *status == form.status {
                    Span::styled(label, Style::default().fg(accent).add_modifier(Modifier::BOLD | Modifier::REVERSED))
                } else {
                    Span::raw(label)
                };
                [span, Span::raw(" ")]
            })
            .collect::<Vec<_>>(),
    );
    f.render_widget(
        Paragraph::new(status_line)
            .style(style_for(TaskField::Status))
            .block(Block::default().borders(Borders::ALL).title("Status")),
        field_areas[3],
    );

    let reminder_text = if form.reminder { "[x] Remind me on the due date" } else { "[ ] Remind me on the due date" };
    f.render_widget(
        Paragraph::new(reminder_text)
            .style(style_for(TaskField::Reminder))
            .block(Block::default().borders(Borders::ALL).title("Reminder")),
        field_areas[4],
    );
}

fn render_text_field(f: &mut Frame, area: Rect, label: &str, input: &LineInput, active: bool, style: Style) {
    if area.width < 3 || area.height < 3 {
        return;
    }
    let content_width = area.width.saturating_sub(2) as usize;
    let (text, cursor_col) = input.visible(content_width);
    f.render_widget(
        Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL).title(label.to_string())),
        area,
    );
    if active {
        f.set_cursor_position((area.x + 1 + cursor_col as u16, area.y + 1));
    }
}
