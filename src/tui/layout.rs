use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

pub struct Layout {
    pub inner_area: Rect, // inside the outer border
    pub header_area: Rect,
    pub table_area: Rect,
    pub reminder_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Header, table body (at least one row) and status bar, plus borders
    pub const MIN_WIDTH: u16 = 40;
    pub const MIN_HEIGHT: u16 = 8;

    /// `reminder_lines` is how many reminder notifications are on screen;
    /// the strip above the status bar grows to fit up to three of them.
    pub fn calculate(size: Rect, reminder_lines: usize) -> Self {
        let width = size.width.max(Self::MIN_WIDTH + 2);
        let height = size.height.max(Self::MIN_HEIGHT + 2);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        let reminder_height = if reminder_lines == 0 {
            0
        } else {
            // borders + one line per reminder
            reminder_lines.min(3) as u16 + 2
        };

        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),               // header
                Constraint::Min(3),                  // table
                Constraint::Length(reminder_height), // reminders
                Constraint::Length(1),               // status
            ])
            .split(inner_area);

        Self {
            inner_area,
            header_area: vertical[0],
            table_area: vertical[1],
            reminder_area: vertical[2],
            status_area: vertical[3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reminder_strip_only_takes_space_when_needed() {
        let size = Rect::new(0, 0, 80, 24);
        let without = Layout::calculate(size, 0);
        assert_eq!(without.reminder_area.height, 0);

        let with = Layout::calculate(size, 5);
        assert_eq!(with.reminder_area.height, 5);
        assert_eq!(with.table_area.height + 5, without.table_area.height);
    }

    #[test]
    fn tiny_terminals_are_clamped_to_minimum() {
        let layout = Layout::calculate(Rect::new(0, 0, 10, 3), 0);
        assert_eq!(layout.inner_area.width, Layout::MIN_WIDTH);
        assert_eq!(layout.status_area.height, 1);
    }
}
