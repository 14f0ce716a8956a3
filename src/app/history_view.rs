use ratatui::{
    Frame,
    layout::Rect,
    prelude::Line,
    style::{Modifier, Style},
    widgets::{Bar, BarChart, BarGroup, Block, Borders},
};

use crate::{constants::HISTORY_SETTINGS, domain::Record};

use super::{App, view_style};

impl App {
    /// Daily totals as a bar chart, newest day on the right. Only as many
    /// days as fit the width are shown; bars share the scale of the largest
    /// total on file.
    pub(super) fn render_history(&self, f: &mut Frame, area: Rect) {
        let text_color = view_style::text_color_for_bg(self.palette.back);
        let slot = (HISTORY_SETTINGS.bar_width + HISTORY_SETTINGS.bar_gap) as usize;
        let visible = (area.width as usize / slot).max(1);

        let records: Vec<&Record> = self.records.iter().collect();
        let shown = &records[records.len().saturating_sub(visible)..];

        let bars: Vec<Bar> = shown
            .iter()
            .map(|record| {
                let hours = record.total_seconds() as f64 / 3600.0;
                Bar::default()
                    .value(record.total_seconds())
                    .text_value(format!("{:.1}", hours))
                    .label(Line::from(record.date().format("%m-%d").to_string()))
                    .style(Style::default().fg(self.palette.spans[1]))
                    .value_style(
                        Style::default()
                            .fg(self.palette.back)
                            .bg(self.palette.spans[1])
                            .add_modifier(Modifier::BOLD),
                    )
            })
            .collect();

        let chart = BarChart::default()
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .title(format!("max {}", self.records.format_max_span()))
                    .border_style(Style::default().fg(text_color)),
            )
            .bar_width(HISTORY_SETTINGS.bar_width)
            .bar_gap(HISTORY_SETTINGS.bar_gap)
            .label_style(Style::default().fg(text_color))
            .data(BarGroup::default().bars(&bars))
            .max(self.records.max_total().num_seconds().max(1) as u64);

        f.render_widget(chart, area);
    }
}
