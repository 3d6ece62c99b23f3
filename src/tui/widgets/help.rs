use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::dialogs::popup_area;
use crate::utils::format_key_binding_for_display;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let fg_color = parse_color(&config.theme.fg);
    let bg_color = parse_color(&config.theme.bg);

    let popup_area = popup_area(area, 60, 80);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(Block::default()
            .borders(Borders::ALL)
            .title("Help - Key Bindings")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(fg_color).bg(bg_color)))
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}

fn build_help_text(config: &Config) -> String {
    let mut text = String::new();

    text.push_str("Tasks:\n");
    for (label, binding) in config.key_bindings.entries() {
        text.push_str(&format!("  {}: {}\n", format_key_binding_for_display(binding), label));
    }
    text.push_str("  ↑↓ / j k: Move selection\n");
    text.push_str("  Home/End/PgUp/PgDn: Jump\n");
    text.push_str("  Enter: Edit selected task\n");
    text.push('\n');

    text.push_str("Task form:\n");
    text.push_str("  Tab / Shift+Tab: Next / previous field\n");
    text.push_str("  ↑↓ on Deadline: One day later / earlier\n");
    text.push_str("  ←→ / Space on Status: Cycle status\n");
    text.push_str("  Space on Reminder: Toggle\n");
    text.push_str("  Ctrl+u: Clear field\n");
    text.push_str("  Ctrl+l: Clear form (start a new task)\n");
    text.push_str(&format!("  Enter / {}: Save\n", format_key_binding_for_display(&config.key_bindings.save)));
    text.push_str("  Esc: Cancel\n");
    text.push('\n');

    text.push_str("Row colors:\n");
    text.push_str("  Red: overdue • Yellow: due today\n");
    text.push_str("  Orange: in progress • Green: completed\n");

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_configured_bindings() {
        let mut config = Config::default();
        config.key_bindings.new = "a".to_string();
        let text = build_help_text(&config);
        assert!(text.contains("  a: New task\n"));
        assert!(text.contains("Reload"));
    }
}
