use ratatui::style::Color;

use crate::config::Theme;
use crate::models::Urgency;

/// Parse a color string into a ratatui Color.
/// Supports named colors ("yellow", "darkgray"), hex (#RRGGBB or #RGB)
/// and rgb(r,g,b). Unrecognized strings fall back to white.
pub fn parse_color(color_str: &str) -> Color {
    let s = color_str.trim().to_lowercase();

    match s.as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "gray" | "grey" | "lightgray" | "lightgrey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        _ => {
            if s.starts_with('#') {
                if let Some(color) = parse_hex_color(&s) {
                    return color;
                }
            } else if s.starts_with("rgb(") {
                if let Some(color) = parse_rgb_color(&s) {
                    return color;
                }
            }
            Color::White
        }
    }
}

fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim_start_matches('#');
    // Byte slicing below needs single-byte chars
    if !hex.is_ascii() {
        return None;
    }

    if hex.len() == 6 {
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Color::Rgb(r, g, b))
    } else if hex.len() == 3 {
        let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
        let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
        let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
        // #RGB -> #RRGGBB
        Some(Color::Rgb((r << 4) | r, (g << 4) | g, (b << 4) | b))
    } else {
        None
    }
}

fn parse_rgb_color(s: &str) -> Option<Color> {
    let content = s.strip_prefix("rgb(")?.strip_suffix(')')?;

    let parts: Vec<&str> = content.split(',').map(|s| s.trim()).collect();
    if parts.len() != 3 {
        return None;
    }

    let r = parts[0].parse::<u8>().ok()?;
    let g = parts[1].parse::<u8>().ok()?;
    let b = parts[2].parse::<u8>().ok()?;

    Some(Color::Rgb(r, g, b))
}

/// Relative luminance (WCAG), 0.0 dark to 1.0 light
fn calculate_luminance(r: u8, g: u8, b: u8) -> f64 {
    let linear = |c: u8| {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * linear(r) + 0.7152 * linear(g) + 0.0722 * linear(b)
}

/// Black or white text, whichever reads better on `background`
pub fn get_contrast_text_color(background: Color) -> Color {
    match background {
        Color::Rgb(r, g, b) => {
            if calculate_luminance(r, g, b) < 0.5 {
                Color::White
            } else {
                Color::Black
            }
        }
        Color::Black | Color::Blue | Color::Magenta | Color::Red | Color::DarkGray => Color::White,
        _ => Color::Black,
    }
}

/// Row color for a task in the table
pub fn urgency_color(theme: &Theme, urgency: Urgency) -> Color {
    match urgency {
        Urgency::Completed => parse_color(&theme.completed),
        Urgency::InProgress => parse_color(&theme.in_progress),
        Urgency::Pending => parse_color(&theme.fg),
        Urgency::DueToday => parse_color(&theme.due_today),
        Urgency::Overdue => parse_color(&theme.overdue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_hex_and_rgb() {
        assert_eq!(parse_color("Yellow"), Color::Yellow);
        assert_eq!(parse_color("#FFA500"), Color::Rgb(255, 165, 0));
        assert_eq!(parse_color("#fff"), Color::Rgb(255, 255, 255));
        assert_eq!(parse_color("rgb(1, 2, 3)"), Color::Rgb(1, 2, 3));
        assert_eq!(parse_color("not-a-color"), Color::White);
    }

    #[test]
    fn non_ascii_hex_falls_back_to_white() {
        assert_eq!(parse_color("#aébcd"), Color::White);
        assert_eq!(parse_color("#é"), Color::White);
        assert_eq!(parse_color("#ééé"), Color::White);
    }

    #[test]
    fn contrast_prefers_readable_text() {
        assert_eq!(get_contrast_text_color(Color::Rgb(0x1E, 0x1E, 0x1E)), Color::White);
        assert_eq!(get_contrast_text_color(Color::Rgb(0xFF, 0xFF, 0x00)), Color::Black);
        assert_eq!(get_contrast_text_color(Color::Blue), Color::White);
    }

    #[test]
    fn default_theme_colors_overdue_red() {
        let theme = Theme::default();
        assert_eq!(urgency_color(&theme, Urgency::Overdue), Color::Rgb(0xF4, 0x47, 0x47));
        assert_eq!(urgency_color(&theme, Urgency::DueToday), Color::Rgb(0xFF, 0xFF, 0x00));
    }
}
