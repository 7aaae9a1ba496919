pub mod charting;
pub mod history;
pub mod keyboard;
pub mod lessons;
pub mod screen;

use keypace::{history::summarize, session::SessionStatus, settings::ColorMode, timer::format_clock};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Paragraph, Widget, Wrap},
};

use crate::{ui::keyboard::VirtualKeyboard, App, AppState, HORIZONTAL_MARGIN, PARAGRAPH_LINES};

const VERTICAL_MARGIN: u16 = 1;
const BAR_WIDTH: u16 = 4;
const BAR_GAP: u16 = 1;

/// Character styles for one color highlighting mode.
#[derive(Debug, Clone, Copy)]
pub struct TextStyles {
    pub correct: Style,
    pub incorrect: Style,
    pub cursor: Style,
    pub pending: Style,
}

impl TextStyles {
    pub fn for_mode(mode: ColorMode) -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let dim_bold = bold.add_modifier(Modifier::DIM);

        match mode {
            ColorMode::Normal => Self {
                correct: bold.fg(Color::Green),
                incorrect: bold.fg(Color::Red),
                cursor: dim_bold.add_modifier(Modifier::UNDERLINED),
                pending: dim_bold,
            },
            ColorMode::Enhanced => Self {
                correct: bold.fg(Color::LightGreen),
                incorrect: bold.fg(Color::White).bg(Color::Red),
                cursor: bold.fg(Color::Black).bg(Color::Yellow),
                pending: Style::default().fg(Color::Gray),
            },
            ColorMode::Minimal => Self {
                correct: Style::default(),
                incorrect: Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::UNDERLINED),
                cursor: Style::default().add_modifier(Modifier::UNDERLINED),
                pending: Style::default().add_modifier(Modifier::DIM),
            },
        }
    }
}

/// Spans for `paragraph` with `typed` laid over it. Mistakes show the
/// expected character so the text stays readable.
pub fn text_spans(paragraph: &str, typed: &str, styles: &TextStyles) -> Vec<Span<'static>> {
    let typed: Vec<char> = typed.chars().collect();
    let mut spans = Vec::with_capacity(typed.len() + 2);

    let mut rest = paragraph.chars();
    for &got in &typed {
        let Some(expected) = rest.next() else { break };
        if got == expected {
            spans.push(Span::styled(expected.to_string(), styles.correct));
        } else {
            let shown = match expected {
                ' ' => '·',
                c => c,
            };
            spans.push(Span::styled(shown.to_string(), styles.incorrect));
        }
    }

    if let Some(cursor) = rest.next() {
        spans.push(Span::styled(cursor.to_string(), styles.cursor));
    }
    let tail: String = rest.collect();
    if !tail.is_empty() {
        spans.push(Span::styled(tail, styles.pending));
    }
    spans
}

impl App {
    fn stats_line(&self) -> String {
        let stats = self.session.stats();
        let clock = match self.session.remaining_secs() {
            Some(left) => format!("{} left", format_clock(left)),
            None => format_clock(self.session.elapsed_secs()),
        };
        format!(
            "{} wpm   {}% acc   {}/{} chars   {}",
            stats.wpm, stats.accuracy, stats.correct_chars, stats.total_chars, clock
        )
    }

    fn header_line(&self) -> String {
        let title = match (&self.lesson, &self.custom_prompt) {
            (_, Some(_)) | (None, None) => "Custom text".to_string(),
            (Some(lesson), None) => format!("{} ({})", lesson.title, lesson.level),
        };
        let total = self.session.paragraphs().len();
        if total > 1 {
            format!(
                "{title} · part {}/{total}",
                self.session.current_paragraph_index() + 1
            )
        } else {
            title
        }
    }

    fn typing_legend(&self) -> String {
        let hotkey = self.settings.test_reset_hotkey;
        let mut parts = Vec::new();
        if self.session.status() == SessionStatus::Idle {
            parts.extend(["(←) retry", "(→) next", "(f2) history", "(f3) lessons", "(esc)ape"]);
        } else {
            parts.push("(tab) pause");
            if hotkey.allows_escape() {
                parts.push("(esc) restart");
            }
            if hotkey.allows_ctrl_r() {
                parts.push("(ctrl+r) restart");
            }
        }
        parts.push("(ctrl+c) quit");
        parts.join("  ")
    }

    fn render_typing(&self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let layout = self.session.config().layout;

        // drop the keyboard before squeezing the text
        let keyboard_height = VirtualKeyboard::height(layout);
        let fits_across =
            area.width.saturating_sub(HORIZONTAL_MARGIN * 2) >= VirtualKeyboard::width(layout);
        let keyboard_height = if fits_across
            && area.height > keyboard_height + PARAGRAPH_LINES as u16 + 6
        {
            keyboard_height
        } else {
            0
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Length(1), // stats
                Constraint::Length(1), // padding
                Constraint::Min(PARAGRAPH_LINES as u16), // text
                Constraint::Length(1), // hint
                Constraint::Length(keyboard_height), // keyboard
                Constraint::Length(1), // legend
            ])
            .split(area);

        Paragraph::new(Span::styled(self.header_line(), italic_style))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        Paragraph::new(Span::styled(self.stats_line(), bold_style))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        let styles = TextStyles::for_mode(self.settings.text_color_highlighting);
        let spans = text_spans(
            self.session.current_paragraph(),
            self.session.typed_text(),
            &styles,
        );
        Paragraph::new(Line::from(spans))
            .wrap(Wrap { trim: false })
            .render(chunks[3], buf);

        let hint = match (self.session.status(), &self.status_message) {
            (SessionStatus::Paused, _) => Span::styled(
                "PAUSED - press Tab to resume",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::ITALIC),
            ),
            (_, Some(msg)) => Span::styled(msg.clone(), Style::default().fg(Color::Cyan)),
            (SessionStatus::Idle, None) => Span::styled(
                format!("{}. Start typing to begin.", self.time_hint()),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            ),
            _ => Span::raw(""),
        };
        Paragraph::new(hint)
            .alignment(Alignment::Center)
            .render(chunks[4], buf);

        if keyboard_height > 0 {
            VirtualKeyboard::new(layout, &self.active_keys).render(chunks[5], buf);
        }

        Paragraph::new(Span::styled(self.typing_legend(), italic_style))
            .alignment(Alignment::Center)
            .render(chunks[6], buf);
    }

    fn render_results(&self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Min(1), // chart
                Constraint::Length(1), // stats
                Constraint::Length(1), // history summary
                Constraint::Length(3), // settings info box
                Constraint::Length(1), // padding
                Constraint::Length(1), // legend
            ])
            .split(area);

        let chart_area = chunks[0];
        let bars = charting::history_bars(
            &self.history,
            chart_area.width.saturating_sub(2),
            BAR_WIDTH,
            BAR_GAP,
        );
        let data: Vec<(&str, u64)> = bars.iter().map(|(l, v)| (l.as_str(), *v)).collect();
        BarChart::default()
            .block(Block::default().borders(Borders::ALL).title("wpm per test"))
            .data(data.as_slice())
            .max(charting::compute_chart_max(&bars))
            .bar_width(BAR_WIDTH)
            .bar_gap(BAR_GAP)
            .bar_style(Style::default().fg(Color::Magenta))
            .value_style(bold_style.fg(Color::Black).bg(Color::Magenta))
            .render(chart_area, buf);

        let stats = self.last_result.unwrap_or_else(|| self.session.stats());
        Paragraph::new(Span::styled(
            format!(
                "{} wpm   {}% acc   {} correct   {} errors   {}",
                stats.wpm,
                stats.accuracy,
                stats.correct_chars,
                stats.incorrect_chars,
                format_clock(stats.time)
            ),
            bold_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        let summary = summarize(&self.history);
        let delta = if summary.tests > 0 {
            format!(
                "average {} wpm over {} tests, best {}",
                charting::format_label(summary.average_wpm),
                summary.tests,
                summary.best_wpm
            )
        } else {
            String::new()
        };
        let delta = match &self.status_message {
            Some(msg) => format!("{msg}   {delta}"),
            None => delta,
        };
        Paragraph::new(Span::styled(
            delta,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

        let s = &self.settings;
        let settings_text = format!(
            "Time: {} | Layout: {} | Colors: {} | Selection: {} | Type: {} | Double space: {} | Reset: {}\n(1) Time (2) Layout (3) Colors (4) Selection (5) Type (6) Spacing (7) Reset key",
            s.test_time,
            s.keyboard_layout,
            s.text_color_highlighting,
            s.text_selection,
            s.text_type,
            if s.double_spacing { "ON" } else { "OFF" },
            s.test_reset_hotkey,
        );
        Paragraph::new(settings_text)
            .style(
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::ITALIC),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[3], buf);

        Paragraph::new(Span::styled(
            "(r)etry / (n)ext / (l)essons / (h)istory / (esc)ape",
            italic_style,
        ))
        .render(chunks[5], buf);
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Typing => self.render_typing(area, buf),
            AppState::Results | AppState::History | AppState::Lessons => {
                self.render_results(area, buf)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{tests::test_app, Cli};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn prompt_app(prompt: &str) -> App {
        let cli = Cli {
            prompt: Some(prompt.to_string()),
            ..Cli::default()
        };
        test_app(cli).0
    }

    fn render(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    #[test]
    fn correct_and_incorrect_spans() {
        let styles = TextStyles::for_mode(ColorMode::Normal);
        let spans = text_spans("ab cd", "ax", &styles);

        assert_eq!(spans[0].content, "a");
        assert_eq!(spans[0].style, styles.correct);
        assert_eq!(spans[1].content, "b");
        assert_eq!(spans[1].style, styles.incorrect);
        assert_eq!(spans[2].content, " ");
        assert_eq!(spans[2].style, styles.cursor);
        assert_eq!(spans[3].content, "cd");
        assert_eq!(spans[3].style, styles.pending);
    }

    #[test]
    fn mistyped_space_shows_a_dot() {
        let styles = TextStyles::for_mode(ColorMode::Minimal);
        let spans = text_spans("a b", "ax", &styles);
        assert_eq!(spans[1].content, "·");
        assert_eq!(spans[1].style, styles.incorrect);
    }

    #[test]
    fn modes_differ() {
        let normal = TextStyles::for_mode(ColorMode::Normal);
        let enhanced = TextStyles::for_mode(ColorMode::Enhanced);
        assert_ne!(normal.incorrect, enhanced.incorrect);
    }

    #[test]
    fn typing_screen_shows_text_stats_and_keyboard() {
        let app = prompt_app("hello world");
        let rendered = render(&app, 100, 30);

        assert!(rendered.contains("hello world"));
        assert!(rendered.contains("0 wpm"));
        assert!(rendered.contains("01:00 left"));
        assert!(rendered.contains("You have 1 minute to complete this test"));
        assert!(rendered.contains("qwerty"));
    }

    #[test]
    fn paused_banner() {
        let mut app = prompt_app("hello world");
        type_str(&mut app, "he");
        app.on_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        assert!(render(&app, 100, 30).contains("PAUSED"));
    }

    #[test]
    fn results_screen_shows_stats_and_legend() {
        let mut app = prompt_app("hi");
        type_str(&mut app, "hi");
        assert_eq!(app.state, AppState::Results);

        let rendered = render(&app, 120, 30);
        assert!(rendered.contains("100% acc"));
        assert!(rendered.contains("(r)etry"));
        assert!(rendered.contains("Layout: qwerty"));
        assert!(rendered.contains("over 1 tests"));
    }

    #[test]
    fn tiny_areas_do_not_panic() {
        let app = prompt_app("hello world");
        for (w, h) in [(10, 5), (20, 3), (1, 1)] {
            render(&app, w, h);
        }
    }

    #[test]
    fn keyboard_hidden_when_short() {
        let app = prompt_app("hello world");
        let rendered = render(&app, 100, 10);
        assert!(rendered.contains("hello world"));
        assert!(!rendered.contains("qwerty"));
    }

    #[test]
    fn keyboard_hidden_when_narrow() {
        let app = prompt_app("hello world");
        let rendered = render(&app, 50, 30);
        assert!(rendered.contains("hello world"));
        assert!(!rendered.contains("qwerty"));
    }
}
