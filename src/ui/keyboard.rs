use std::collections::BTreeSet;

use keypace::keyboard::{label_matches, KeyboardLayout};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

/// On-screen keyboard for one layout, with the next key lit up and the
/// home row marked.
pub struct VirtualKeyboard<'a> {
    layout: KeyboardLayout,
    active: &'a BTreeSet<char>,
    home_row: BTreeSet<char>,
}

impl<'a> VirtualKeyboard<'a> {
    pub fn new(layout: KeyboardLayout, active: &'a BTreeSet<char>) -> Self {
        Self {
            layout,
            active,
            home_row: layout.home_row_keys(),
        }
    }

    /// Rows plus the surrounding border.
    pub fn height(layout: KeyboardLayout) -> u16 {
        layout.rows().len() as u16 + 2
    }

    /// Columns needed for the widest row, borders included.
    pub fn width(layout: KeyboardLayout) -> u16 {
        let widest = layout
            .rows()
            .iter()
            .map(|row| {
                let caps: usize = row.iter().map(|l| Self::key_cap(l).width()).sum();
                caps + row.len().saturating_sub(1)
            })
            .max()
            .unwrap_or(0);
        widest as u16 + 2
    }

    pub fn key_style(&self, label: &str) -> Style {
        let hits = |keys: &BTreeSet<char>| keys.iter().any(|&c| label_matches(label, c));

        if hits(self.active) {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else if hits(&self.home_row) {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        }
    }

    fn key_cap(label: &str) -> String {
        match label {
            "Space" => format!("{:^15}", "space"),
            l if l.chars().count() == 1 => format!(" {l} "),
            l => format!(" {} ", l.to_lowercase()),
        }
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        self.layout
            .rows()
            .iter()
            .map(|row| {
                let mut spans = Vec::with_capacity(row.len() * 2);
                for (i, label) in row.iter().enumerate() {
                    if i > 0 {
                        spans.push(Span::raw(" "));
                    }
                    spans.push(Span::styled(Self::key_cap(label), self.key_style(label)));
                }
                Line::from(spans)
            })
            .collect()
    }
}

impl Widget for VirtualKeyboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!("{}", self.layout);
        Paragraph::new(self.lines())
            .block(Block::default().borders(Borders::ALL).title(title))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_key_is_highlighted_over_home_row() {
        let active = BTreeSet::from(['f']);
        let kb = VirtualKeyboard::new(KeyboardLayout::Qwerty, &active);

        assert_eq!(kb.key_style("f").bg, Some(Color::Yellow));
        assert!(kb.key_style("j").add_modifier.contains(Modifier::UNDERLINED));
        assert!(kb.key_style("q").add_modifier.contains(Modifier::DIM));
    }

    #[test]
    fn space_bar_lights_up_for_space() {
        let active = BTreeSet::from([' ']);
        let kb = VirtualKeyboard::new(KeyboardLayout::Qwerty, &active);
        assert_eq!(kb.key_style("Space").bg, Some(Color::Yellow));
    }

    #[test]
    fn one_line_per_row() {
        let active = BTreeSet::new();
        for layout in [KeyboardLayout::Qwerty, KeyboardLayout::Numpad] {
            let kb = VirtualKeyboard::new(layout, &active);
            assert_eq!(kb.lines().len(), layout.rows().len());
            assert_eq!(VirtualKeyboard::height(layout), layout.rows().len() as u16 + 2);
        }
    }

    #[test]
    fn width_covers_widest_row() {
        // qwerty: 13 single-char caps, "backspace", 13 gaps, 2 borders
        assert_eq!(VirtualKeyboard::width(KeyboardLayout::Qwerty), 13 * 3 + 11 + 13 + 2);
        assert!(VirtualKeyboard::width(KeyboardLayout::Numpad) < 30);
    }

    #[test]
    fn renders_layout_title() {
        let active = BTreeSet::from(['a']);
        let area = Rect::new(0, 0, 90, 8);
        let mut buf = Buffer::empty(area);
        VirtualKeyboard::new(KeyboardLayout::Dvorak, &active).render(area, &mut buf);

        let rendered: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(rendered.contains("dvorak"));
        assert!(rendered.contains("space"));
    }
}
