use keypace::{
    history::{summarize, HistoryEntry},
    timer::format_clock,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::App;

/// Pure presenter for one history row. `number` is 1-based.
pub fn present_row(number: usize, entry: &HistoryEntry) -> Row<'static> {
    let stats = &entry.stats;

    let accuracy_color = if stats.accuracy >= 95 {
        Color::Green
    } else if stats.accuracy >= 85 {
        Color::Yellow
    } else {
        Color::Red
    };

    let completed = entry
        .completed_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "—".to_string());

    Row::new(vec![
        Cell::from(format!("#{number}")),
        Cell::from(stats.wpm.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(format!("{}%", stats.accuracy)).style(Style::default().fg(accuracy_color)),
        Cell::from(format!("{}/{}", stats.correct_chars, stats.total_chars)),
        Cell::from(format_clock(stats.time)),
        Cell::from(entry.lesson_id.clone().unwrap_or_else(|| "custom".to_string())),
        Cell::from(completed),
    ])
}

pub fn summary_line(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No finished tests yet".to_string();
    }
    let s = summarize(entries);
    format!(
        "{} tests   avg {:.0} wpm   best {} wpm   avg {:.0}% acc   {} practiced",
        s.tests,
        s.average_wpm,
        s.best_wpm,
        s.average_accuracy,
        format_clock(s.total_secs)
    )
}

/// Render the history screen, newest test first
pub fn render_history(app: &mut App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Summary
            Constraint::Min(0),    // Table
            Constraint::Length(2), // Instructions
        ])
        .split(area);

    let summary = Paragraph::new(summary_line(&app.history))
        .block(Block::default().borders(Borders::ALL).title("History"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(summary, chunks[0]);

    if app.history.is_empty() {
        let no_data = Paragraph::new("Finish a test to start your history.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(no_data, chunks[1]);
    } else {
        let table_height = chunks[1].height.saturating_sub(3) as usize; // borders + header
        let max_scroll = app.history.len().saturating_sub(table_height);
        if app.history_scroll > max_scroll {
            app.history_scroll = max_scroll;
        }

        let header = Row::new(vec!["Test", "WPM", "Acc", "Chars", "Time", "Lesson", "Finished"])
            .style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );

        let rows: Vec<Row> = app
            .history
            .iter()
            .enumerate()
            .rev()
            .skip(app.history_scroll)
            .take(table_height)
            .map(|(i, entry)| present_row(i + 1, entry))
            .collect();

        let widths = [
            Constraint::Length(6),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(11),
            Constraint::Length(6),
            Constraint::Length(16),
            Constraint::Min(16),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Tests"))
            .column_spacing(2);
        f.render_widget(table, chunks[1]);
    }

    let mut instructions = String::from("(↑/↓) scroll  (Home) top  (x) clear  (b/backspace) back  (esc)ape");
    if let Some(ref msg) = app.status_message {
        instructions = format!("{msg}   {instructions}");
    }
    f.render_widget(
        Paragraph::new(instructions)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        chunks[2],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use keypace::StatsSnapshot;

    fn entry(wpm: u32, accuracy: u32) -> HistoryEntry {
        HistoryEntry {
            stats: StatsSnapshot {
                wpm,
                accuracy,
                correct_chars: 40,
                incorrect_chars: 2,
                total_chars: 42,
                time: 75,
            },
            completed_at: None,
            lesson_id: Some("pangrams".into()),
        }
    }

    #[test]
    fn summary_mentions_best_and_average() {
        let line = summary_line(&[entry(40, 90), entry(60, 100)]);
        assert!(line.starts_with("2 tests"));
        assert!(line.contains("avg 50 wpm"));
        assert!(line.contains("best 60 wpm"));
        assert!(line.contains("avg 95% acc"));
        assert!(line.contains("02:30 practiced"));
    }

    #[test]
    fn empty_summary() {
        assert_eq!(summary_line(&[]), "No finished tests yet");
    }

    #[test]
    fn renders_newest_first() {
        use crate::tests::test_app;
        use ratatui::{backend::TestBackend, Terminal};

        let (mut app, _, _) = test_app(crate::Cli::default());
        app.history = vec![entry(11, 90), entry(22, 99)];

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| render_history(&mut app, f)).unwrap();

        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        let newest = rendered.find("#2").unwrap();
        let oldest = rendered.find("#1").unwrap();
        assert!(newest < oldest);
        assert!(rendered.contains("pangrams"));
    }
}
