use crate::models::{ClassifiedInterval, SprayAnalysis};
use crate::ui::components::{StatusLegend, TimelineWidget};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub struct ScheduleScreen<'a> {
    pub analysis: Option<&'a SprayAnalysis>,
    pub selected: Option<(usize, usize)>,
}

impl<'a> ScheduleScreen<'a> {
    pub fn new(analysis: Option<&'a SprayAnalysis>) -> Self {
        Self {
            analysis,
            selected: None,
        }
    }

    pub fn selected(mut self, selected: Option<(usize, usize)>) -> Self {
        self.selected = selected;
        self
    }

    fn selected_interval(&self) -> Option<&ClassifiedInterval> {
        let (day_idx, interval_idx) = self.selected?;
        self.analysis?
            .timeline
            .get(day_idx)?
            .intervals
            .get(interval_idx)
    }
}

impl Widget for ScheduleScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(10),   // Timeline + details
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let spray_type = self
            .analysis
            .map(|a| a.spray_type.as_str())
            .unwrap_or("none");
        let title = Line::from(vec![
            Span::styled("Spray Schedule", Theme::title()),
            Span::styled(format!(" ({})", spray_type), Theme::highlight()),
            Span::styled(" - ", Theme::dim()),
            Span::styled("[←/→] Interval  [↑/↓] Day", Theme::dim()),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        // Timeline grid and legend
        let grid_area = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(6)])
            .split(content[0]);

        match self.analysis {
            Some(analysis) => {
                TimelineWidget::new(&analysis.timeline)
                    .selected(self.selected)
                    .render(grid_area[0], buf);
            }
            None => {
                let block = Block::default()
                    .title("Spray Timeline")
                    .borders(Borders::ALL)
                    .border_style(Theme::border());
                let inner = block.inner(grid_area[0]);
                block.render(grid_area[0], buf);
                Paragraph::new(Span::styled(
                    "No forecast loaded. Press [r] to refresh.",
                    Theme::dim(),
                ))
                .render(inner, buf);
            }
        }

        let legend_block = Block::default()
            .title("Legend")
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let legend_inner = legend_block.inner(grid_area[1]);
        legend_block.render(grid_area[1], buf);
        StatusLegend.render(legend_inner, buf);

        self.render_details(content[1], buf);

        let nav = Line::from(vec![
            Span::styled("[1-4]", Theme::nav_key()),
            Span::styled("Screens ", Theme::nav_label()),
            Span::styled("[t]", Theme::nav_key()),
            Span::styled("Spray Type ", Theme::nav_label()),
            Span::styled("[r]", Theme::nav_key()),
            Span::styled("Refresh ", Theme::nav_label()),
            Span::styled("[Esc]", Theme::nav_key()),
            Span::styled("Back", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(chunks[2], buf);
    }
}

impl ScheduleScreen<'_> {
    fn render_details(&self, area: Rect, buf: &mut Buffer) {
        let title = self
            .selected
            .and_then(|(day_idx, _)| self.analysis?.timeline.get(day_idx))
            .map(|d| format!("{} {}", d.day, d.date.format("%m/%d")))
            .unwrap_or_else(|| "Interval".to_string());

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let interval = match self.selected_interval() {
            Some(interval) => interval,
            None => {
                Paragraph::new(Span::styled("No interval selected", Theme::dim()))
                    .render(inner, buf);
                return;
            }
        };

        let status_style = Style::default().fg(interval.status.color());
        let lines = vec![
            Line::from(vec![
                Span::styled(format!("{} ", interval.status.symbol()), status_style),
                Span::styled(interval.status.as_str(), status_style),
                Span::styled(
                    format!(
                        "  {}-{}",
                        interval.timestamp.format("%H:%M"),
                        interval.interval_end().format("%H:%M")
                    ),
                    Theme::normal(),
                ),
            ]),
            Line::from(vec![
                Span::styled("Reason: ", Theme::dim()),
                Span::styled(&interval.reason, Theme::normal()),
            ]),
            Line::from(vec![
                Span::styled("Wind:   ", Theme::dim()),
                Span::styled(
                    format!("{:.1}mph", interval.wind_mph),
                    Style::default().fg(Theme::wind_color(interval.wind_mph)),
                ),
                Span::styled(
                    format!(" from {:.0}°", interval.wind_direction_deg),
                    Theme::dim(),
                ),
            ]),
            Line::from(vec![
                Span::styled("Temp:   ", Theme::dim()),
                Span::styled(
                    format!("{:.1}°C", interval.temp_c),
                    Style::default().fg(Theme::temp_color(interval.temp_c)),
                ),
            ]),
            Line::from(vec![
                Span::styled("Rain:   ", Theme::dim()),
                Span::styled(format!("{}%", interval.rain_percent), Theme::normal()),
            ]),
        ];

        Paragraph::new(lines).render(inner, buf);
    }
}
