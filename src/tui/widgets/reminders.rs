use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::style::{Modifier, Style};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use std::collections::VecDeque;
use crate::Config;
use crate::reminder::Reminder;
use crate::tui::widgets::color::parse_color;
use crate::utils::format_key_binding_for_display;

/// Strip of pending reminder notifications above the status bar, oldest
/// first. Non-modal: the table stays usable while it is shown.
pub fn render_reminders(f: &mut Frame, area: Rect, reminders: &VecDeque<Reminder>, config: &Config) {
    if area.height < 3 || reminders.is_empty() {
        return;
    }
    let color = parse_color(&config.theme.due_today);
    let visible = area.height.saturating_sub(2) as usize;

    let mut lines: Vec<Line> = reminders
        .iter()
        .take(visible)
        .map(|r| {
            Line::from(vec![
                Span::styled("⏰ ", Style::default().fg(color)),
                Span::raw(format!("Task due today: {}", r.title)),
            ])
        })
        .collect();
    if reminders.len() > visible {
        if let Some(last) = lines.last_mut() {
            last.push_span(Span::styled(
                format!("  (+{} more)", reminders.len() - visible),
                Style::default().add_modifier(Modifier::DIM),
            ));
        }
    }

    let title = format!(
        "Reminders ({}) - {} to dismiss",
        reminders.len(),
        format_key_binding_for_display(&config.key_bindings.dismiss_reminder)
    );
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(color)),
    );
    f.render_widget(paragraph, area);
}
