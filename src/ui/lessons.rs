use keypace::lessons::{Lesson, Level};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::App;

fn level_color(level: Level) -> Color {
    match level {
        Level::Beginner => Color::Green,
        Level::Intermediate => Color::Yellow,
        Level::Advanced => Color::Red,
    }
}

/// Pure presenter for one lesson row.
pub fn present_row(lesson: &Lesson, selected: bool, current: bool) -> Row<'static> {
    let marker = match (selected, current) {
        (true, _) => "▶",
        (false, true) => "•",
        _ => " ",
    };
    let row = Row::new(vec![
        Cell::from(marker),
        Cell::from(lesson.title.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(lesson.level.to_string()).style(Style::default().fg(level_color(lesson.level))),
        Cell::from(lesson.description.clone()),
    ]);
    if selected {
        row.style(Style::default().bg(Color::DarkGray))
    } else {
        row
    }
}

/// First visible row so that `cursor` stays inside a window of `height` rows.
pub fn window_start(cursor: usize, height: usize) -> usize {
    if height == 0 {
        return cursor;
    }
    cursor.saturating_sub(height - 1)
}

/// Render the lesson picker
pub fn render_lessons(app: &mut App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Min(0),    // Table
            Constraint::Length(2), // Instructions
        ])
        .split(area);

    let lessons = app.library.lessons();
    if lessons.is_empty() {
        f.render_widget(
            Paragraph::new("No lessons available.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray)),
            chunks[0],
        );
    } else {
        let table_height = chunks[0].height.saturating_sub(3) as usize; // borders + header
        let start = window_start(app.lesson_cursor, table_height);
        let current = app.lesson.as_ref().map(|l| l.id.as_str());

        let header = Row::new(vec!["", "Lesson", "Level", "Description"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row> = lessons
            .iter()
            .enumerate()
            .skip(start)
            .take(table_height)
            .map(|(i, lesson)| {
                present_row(lesson, i == app.lesson_cursor, Some(lesson.id.as_str()) == current)
            })
            .collect();

        let widths = [
            Constraint::Length(1),
            Constraint::Length(24),
            Constraint::Length(12),
            Constraint::Min(20),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Lessons"))
            .column_spacing(2);
        f.render_widget(table, chunks[0]);
    }

    f.render_widget(
        Paragraph::new("(↑/↓) move  (Home) top  (enter) practice  (b/backspace) back  (esc)ape")
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        chunks[1],
    );
}
