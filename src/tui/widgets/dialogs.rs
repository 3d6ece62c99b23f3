use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::style::{Modifier, Style};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::text::{Line, Span};
use crate::Config;
use crate::models::Task;
use crate::tui::app::{Dialog, DialogKind, TaskAction};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};

/// Centered rect taking the given percentages of `area`
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

/// Centered rect with a fixed number of rows
fn fixed_height_popup(area: Rect, percent_x: u16, height: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height.min(area.height))]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

pub fn render_message_dialog(f: &mut Frame, area: Rect, dialog: &Dialog, config: &Config) {
    let theme = &config.theme;
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let border_color = match dialog.kind {
        DialogKind::Info => parse_color(&theme.accent),
        DialogKind::Warning => parse_color(&theme.due_today),
        DialogKind::Error => parse_color(&theme.overdue),
    };

    let mut lines: Vec<Line> = dialog.body.lines().map(|l| Line::from(l.to_string())).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Press Enter to close", Style::default().add_modifier(Modifier::DIM))));

    // borders + body, capped by the screen
    let height = lines.len() as u16 + 2;
    let popup = fixed_height_popup(area, 50, height);
    f.render_widget(Clear, popup);

    let paragraph = Paragraph::new(lines)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(dialog.title.as_str())
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().fg(fg_color).bg(bg_color)))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, popup);
}

pub fn render_confirm_delete(f: &mut Frame, area: Rect, task: &Task, yes_selected: bool, config: &Config) {
    let theme = &config.theme;
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let popup = fixed_height_popup(area, 50, 9);
    f.render_widget(Clear, popup);

    let option = |label: &str, selected: bool| {
        let style = if selected {
            Style::default().fg(highlight_fg).bg(highlight_bg)
        } else {
            Style::default().fg(fg_color).bg(bg_color)
        };
        Span::styled(format!(" {} ", label), style)
    };

    let lines = vec![
        Line::from("Are you sure you want to delete this task?"),
        Line::from(""),
        Line::from(Span::styled(task.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(vec![option("Yes", yes_selected), Span::raw("   "), option("No", !yes_selected)]),
        Line::from(""),
        Line::from("y/n, or ←→ and Enter"),
    ];

    let paragraph = Paragraph::new(lines)
        .block(Block::default()
            .borders(Borders::ALL)
            .title("Confirm Delete")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(fg_color).bg(bg_color)))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, popup);
}

pub fn render_action_menu(f: &mut Frame, area: Rect, task: &Task, selected: usize, config: &Config) {
    let theme = &config.theme;
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let popup = fixed_height_popup(area, 40, TaskAction::ALL.len() as u16 + 2);
    f.render_widget(Clear, popup);

    let lines: Vec<Line> = TaskAction::ALL
        .iter()
        .enumerate()
        .map(|(i, action)| {
            let is_selected = i == selected;
            let prefix = if is_selected { "> " } else { "  " };
            let style = if is_selected {
                Style::default().fg(highlight_fg).bg(highlight_bg)
            } else {
                Style::default().fg(fg_color).bg(bg_color)
            };
            Line::from(Span::styled(format!("{}{}. {}", prefix, i + 1, action.label()), style))
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(Block::default()
        .borders(Borders::ALL)
        .title(format!("Task #{}", task.id))
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color)));
    f.render_widget(paragraph, popup);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_is_centered() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = popup_area(area, 50, 50);
        assert_eq!(popup, Rect::new(25, 10, 50, 20));
    }

    #[test]
    fn fixed_height_popup_never_exceeds_area() {
        let area = Rect::new(0, 0, 80, 5);
        assert_eq!(fixed_height_popup(area, 50, 20).height, 5);
    }
}
