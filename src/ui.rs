use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style as TuiStyle},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

use crate::view::{Screen, Style};

const PANEL_WIDTH: u16 = 44;
const PANEL_HEIGHT: u16 = 7;
const STATS_HEIGHT: u16 = 4;
const HORIZONTAL_MARGIN: u16 = 2;

fn background(style: Style) -> Color {
    match style {
        Style::Waiting => Color::Red,
        Style::Ready => Color::Green,
        Style::TooEarly => Color::Blue,
    }
}

/// The centered message panel; also the clickable region in panel mode
pub fn panel_area(area: Rect) -> Rect {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(PANEL_HEIGHT),
            Constraint::Fill(1),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(PANEL_WIDTH),
            Constraint::Fill(1),
        ])
        .split(rows[1])[1]
}

fn stats_area(area: Rect) -> Rect {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([Constraint::Min(0), Constraint::Length(STATS_HEIGHT)])
        .split(area)[1]
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

impl Widget for &Screen {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg = background(self.style);
        let base = TuiStyle::default().bg(bg).fg(Color::White);
        let bold = base.add_modifier(Modifier::BOLD);
        let dim = base.add_modifier(Modifier::DIM);

        Block::default().style(base).render(area, buf);

        // message panel
        let panel = panel_area(area);
        let lines: Vec<Line> = self
            .message
            .to_string()
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), bold)))
            .collect();
        let padding = PANEL_HEIGHT.saturating_sub(2 + lines.len() as u16) / 2;
        let mut text = vec![Line::default(); padding as usize];
        text.extend(lines);

        Paragraph::new(text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .style(base),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(panel, buf);

        // statistics panel
        let stats = &self.stats;
        let summary = format!(
            "best {}   avg {}   sd {}   rounds {}",
            or_dash(stats.best),
            or_dash(stats.average.map(|ms| format!("{ms} ms"))),
            or_dash(stats.spread.map(|sd| format!("{sd:.1}"))),
            stats.rounds,
        );
        let recent = format!("last {}: {}", self.history.entries().len().max(1), self.history);

        Paragraph::new(vec![
            Line::from(Span::styled(summary, bold)),
            Line::from(Span::styled(recent, base)),
            Line::default(),
            Line::from(Span::styled("click or (space) to play / (q)uit", dim)),
        ])
        .alignment(Alignment::Center)
        .render(stats_area(area), buf);
    }
}
