use ratatui::widgets::Paragraph;
use ratatui::style::{Modifier, Style};
use ratatui::Frame;
use ratatui::layout::Rect;
use crate::Config;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};

const SEPARATOR: &str = " • ";
const ELLIPSIS: &str = "...";

pub fn render_status_bar(
    f: &mut Frame,
    area: Rect,
    message: Option<&String>,
    key_hints: &[String],
    config: &Config,
) {
    let theme = &config.theme;
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let highlight_bg = parse_color(&theme.highlight_bg);
    let max_width = area.width as usize;

    let (content, style) = match message {
        Some(msg) => {
            let msg_fg = get_contrast_text_color(highlight_bg);
            (
                truncate_to_width(msg, max_width),
                Style::default().fg(msg_fg).bg(highlight_bg).add_modifier(Modifier::BOLD),
            )
        }
        None => (fit_hints(key_hints, max_width), Style::default().fg(fg_color).bg(bg_color)),
    };

    f.render_widget(Paragraph::new(content).style(style), area);
}

/// Join as many hints as fit in `max_width`, ending with "..." when some
/// had to be dropped
pub fn fit_hints(key_hints: &[String], max_width: usize) -> String {
    let mut text = String::new();
    for (i, hint) in key_hints.iter().enumerate() {
        let current_len = text.chars().count();
        let would_be_len = if i == 0 {
            hint.chars().count()
        } else {
            current_len + SEPARATOR.chars().count() + hint.chars().count()
        };

        if would_be_len > max_width {
            if i == 0 {
                return truncate_to_width(hint, max_width);
            }
            if current_len + ELLIPSIS.len() > max_width {
                text = text.chars().take(max_width.saturating_sub(ELLIPSIS.len())).collect();
            }
            text.push_str(ELLIPSIS);
            return text;
        }

        if i > 0 {
            text.push_str(SEPARATOR);
        }
        text.push_str(hint);
    }
    text
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.chars().count() > max_width {
        text.chars().take(max_width.saturating_sub(ELLIPSIS.len())).collect::<String>() + ELLIPSIS
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_that_fit_are_joined_with_bullets() {
        let hints = vec!["n: New".to_string(), "q: Quit".to_string()];
        assert_eq!(fit_hints(&hints, 40), "n: New • q: Quit");
    }

    #[test]
    fn overflowing_hints_end_with_ellipsis() {
        let hints = vec!["n: New".to_string(), "e: Edit".to_string(), "q: Quit".to_string()];
        assert_eq!(fit_hints(&hints, 20), "n: New • e: Edit...");
        assert_eq!(fit_hints(&hints, 4), "n...");
    }
}
