use ratatui::widgets::{Block, Borders, Cell, Row, Scrollbar, ScrollbarOrientation, ScrollbarState, Table, TableState};
use ratatui::style::{Modifier, Style};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use crate::Config;
use crate::models::Task;
use crate::tui::app::{SortColumn, SortState};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color, urgency_color};

const COLUMNS: [(&str, Option<SortColumn>); 6] = [
    ("ID", Some(SortColumn::Id)),
    ("Title", Some(SortColumn::Title)),
    ("Description", None),
    ("Deadline", Some(SortColumn::Deadline)),
    ("Status", Some(SortColumn::Status)),
    ("Reminder", Some(SortColumn::Reminder)),
];

/// Header label with an arrow on the active sort column
pub fn header_label(label: &str, column: Option<SortColumn>, sort: &SortState) -> String {
    match (column, sort.column) {
        (Some(c), Some(active)) if c == active => {
            format!("{} {}", label, if sort.descending { "▼" } else { "▲" })
        }
        _ => label.to_string(),
    }
}

pub fn render_task_table(
    f: &mut Frame,
    area: Rect,
    tasks: &[Task],
    table_state: &mut TableState,
    sort: &SortState,
    today: &str,
    config: &Config,
) {
    let theme = &config.theme;
    let fg_color = parse_color(&theme.fg);
    let accent = parse_color(&theme.accent);
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let header = Row::new(
        COLUMNS
            .iter()
            .map(|(label, column)| Cell::from(header_label(label, *column, sort))),
    )
    .style(Style::default().fg(accent).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = tasks
        .iter()
        .map(|task| {
            let color = urgency_color(theme, task.urgency(today));
            Row::new(vec![
                Cell::from(task.id.to_string()),
                Cell::from(task.title.clone()),
                Cell::from(task.description.clone()),
                Cell::from(task.deadline.clone()),
                Cell::from(task.status.to_string()),
                Cell::from(if task.reminder { "Yes" } else { "No" }),
            ])
            .style(Style::default().fg(color))
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Percentage(30),
        Constraint::Percentage(35),
        Constraint::Length(12),
        Constraint::Length(13),
        Constraint::Length(10),
    ];

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let (table_area, scrollbar_area) = (chunks[0], chunks[1]);

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(format!("Tasks ({})", tasks.len())))
        .style(Style::default().fg(fg_color))
        .row_highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg))
        .highlight_symbol("> ");

    f.render_stateful_widget(table, table_area, table_state);

    // borders and header row
    let visible_rows = table_area.height.saturating_sub(3) as usize;
    if tasks.len() > visible_rows && visible_rows > 0 && scrollbar_area.width > 0 {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            table_area.y + 2,
            scrollbar_area.width,
            table_area.height.saturating_sub(3),
        );
        let mut scrollbar_state = ScrollbarState::new(tasks.len())
            .viewport_content_length(visible_rows)
            .position(table_state.selected().unwrap_or(0));
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");
        f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_active_column_gets_arrow() {
        let sort = SortState {
            column: Some(SortColumn::Deadline),
            descending: true,
        };
        assert_eq!(header_label("Deadline", Some(SortColumn::Deadline), &sort), "Deadline ▼");
        assert_eq!(header_label("Title", Some(SortColumn::Title), &sort), "Title");
        assert_eq!(header_label("Description", None, &sort), "Description");
    }
}
