use ratatui::prelude::{Line, Span};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use super::{App, view_style};

impl App {
    pub(super) fn draw_frame(&mut self, f: &mut Frame) {
        let size = f.size();
        let text_color = view_style::text_color_for_bg(self.palette.back);

        let status = self
            .status_message
            .clone()
            .unwrap_or_else(|| "space toggle · s average · h history · q quit".to_string());

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(
                Line::from(Span::styled(
                    self.title(),
                    Style::default().fg(text_color).add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Left),
            )
            .title(
                Line::from(Span::styled(
                    self.records.last_record().date().to_string(),
                    Style::default().fg(text_color),
                ))
                .alignment(Alignment::Right),
            )
            .title_bottom(
                Line::from(Span::styled(status, Style::default().fg(text_color)))
                    .alignment(Alignment::Center),
            )
            .border_style(Style::default().fg(self.palette.spans[0]))
            .style(Style::default().bg(self.palette.back));

        let inner = block.inner(size);
        f.render_widget(block, size);

        if self.show_history {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(3)])
                .split(inner);
            self.render_readout(f, rows[0]);
            self.render_history(f, rows[1]);
        } else {
            self.render_readout(f, inner);
        }
    }

    /// Session, total and remaining spans stacked top to bottom, right aligned.
    fn render_readout(&self, f: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area);

        for ((span, color), row) in self.spans.iter().zip(self.palette.spans).zip(rows.iter()) {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                span.clone(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Right);
            f.render_widget(paragraph, center_line(*row));
        }
    }
}

/// The single middle line of `area`.
fn center_line(area: Rect) -> Rect {
    let offset = area.height.saturating_sub(1) / 2;
    Rect::new(area.x, area.y + offset, area.width, area.height.min(1))
}
