use crate::models::{CurrentConditions, FarmProfile, FieldOperation, SprayAnalysis};
use crate::ui::components::{humidity_gauge, rain_gauge, temperature_gauge, wind_gauge};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget},
};

pub struct DashboardScreen<'a> {
    pub profile: Option<&'a FarmProfile>,
    pub current: Option<&'a CurrentConditions>,
    pub analysis: Option<&'a SprayAnalysis>,
    pub recent_operations: &'a [FieldOperation],
    pub status_message: Option<&'a str>,
}

impl<'a> DashboardScreen<'a> {
    pub fn new(
        profile: Option<&'a FarmProfile>,
        current: Option<&'a CurrentConditions>,
        analysis: Option<&'a SprayAnalysis>,
        recent_operations: &'a [FieldOperation],
    ) -> Self {
        Self {
            profile,
            current,
            analysis,
            recent_operations,
            status_message: None,
        }
    }

    pub fn with_status(mut self, status: Option<&'a str>) -> Self {
        self.status_message = status;
        self
    }
}

impl Widget for DashboardScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(5), // Gauges row
                Constraint::Min(8),    // Windows and recent operations
                Constraint::Length(1), // Status message
                Constraint::Length(1), // Nav bar
            ])
            .split(area);

        self.render_header(chunks[0], buf);
        self.render_gauges(chunks[1], buf);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);

        self.render_best_windows(middle[0], buf);
        self.render_recent_operations(middle[1], buf);

        self.render_status_message(chunks[3], buf);
        self.render_nav(chunks[4], buf);
    }
}

impl DashboardScreen<'_> {
    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let title = match self.profile {
            Some(p) => format!("FarmOps - {}", p.name),
            None => "FarmOps - No Farm Configured".to_string(),
        };

        let block = Block::default()
            .title(Span::styled(title, Theme::title()))
            .borders(Borders::BOTTOM)
            .border_style(Theme::border());

        let mut parts = Vec::new();
        if let Some(current) = self.current {
            parts.push(format!("{} {}", current.condition.symbol(), current.condition));
        }
        match self.analysis {
            Some(a) => parts.push(format!(
                "Planning for {} | Last updated: {}",
                a.spray_type,
                a.last_updated.format("%Y-%m-%d %H:%M")
            )),
            None => parts.push("No forecast loaded".to_string()),
        }
        let info = parts.join(" | ");

        let para = Paragraph::new(Span::styled(info, Theme::dim())).block(block);
        para.render(area, buf);
    }

    fn render_gauges(&self, area: Rect, buf: &mut Buffer) {
        let gauge_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
            ])
            .split(area);

        let current = self.current;

        let temp = current.map(|c| c.temp_c);
        temperature_gauge("Temp", temp).render(gauge_chunks[0], buf);

        let feels_like = current.map(|c| c.feels_like_c);
        temperature_gauge("Feels Like", feels_like).render(gauge_chunks[1], buf);

        let wind = current.map(|c| c.wind_mph());
        wind_gauge("Wind", wind).render(gauge_chunks[2], buf);

        let humidity = current.map(|c| c.humidity_percent);
        humidity_gauge("Humidity", humidity).render(gauge_chunks[3], buf);

        // First timeline interval is the next one coming up
        let next_rain = self
            .analysis
            .and_then(|a| a.timeline.first())
            .and_then(|d| d.intervals.first())
            .map(|i| i.rain_percent as f64);
        rain_gauge("Rain (3h)", next_rain).render(gauge_chunks[4], buf);
    }

    fn render_best_windows(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Best Spray Windows", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let windows = match self.analysis {
            Some(a) => a.top_windows(3),
            None => &[],
        };

        if windows.is_empty() {
            let para = Paragraph::new(Span::styled("No spray windows found", Theme::dim()));
            para.render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = windows
            .iter()
            .map(|w| {
                let quality_style = Style::default().fg(w.quality.color());
                let title_line = Line::from(vec![
                    Span::styled(format!("{} ", w.quality.symbol()), quality_style),
                    Span::styled(format!("{} {}", w.day, w.time_range()), quality_style),
                    Span::styled(format!("  {}h", w.duration_hours), Theme::normal()),
                ]);
                let detail_line = Line::from(vec![
                    Span::styled("  ", Theme::dim()),
                    Span::styled(
                        format!(
                            "wind {:.1}mph  {:.1}°C  rain {}%",
                            w.avg_wind_mph, w.avg_temp_c, w.rain_chance_percent
                        ),
                        Theme::dim(),
                    ),
                ]);
                ListItem::new(vec![title_line, detail_line])
            })
            .collect();

        let list = List::new(items);
        list.render(inner, buf);
    }

    fn render_recent_operations(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Recent Operations", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        if self.recent_operations.is_empty() {
            let para = Paragraph::new(Span::styled("No operations recorded", Theme::dim()));
            para.render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = self
            .recent_operations
            .iter()
            .take(5)
            .map(|op| {
                let type_style = Style::default().fg(op.operation_type.color());
                let line = Line::from(vec![
                    Span::styled(
                        op.operation_date.format("%m/%d").to_string(),
                        Theme::dim(),
                    ),
                    Span::raw(" "),
                    Span::styled(op.operation_type.as_str(), type_style),
                    Span::raw(" "),
                    Span::styled(op.product.as_deref().unwrap_or(""), Theme::normal()),
                ]);
                ListItem::new(line)
            })
            .collect();

        let list = List::new(items);
        list.render(inner, buf);
    }

    fn render_status_message(&self, area: Rect, buf: &mut Buffer) {
        if let Some(msg) = self.status_message {
            let style = if msg.contains("OFFLINE") || msg.contains("failed") {
                Theme::warning()
            } else {
                Theme::success()
            };
            let para = Paragraph::new(Span::styled(msg, style));
            para.render(area, buf);
        }
    }

    fn render_nav(&self, area: Rect, buf: &mut Buffer) {
        let nav = Line::from(vec![
            Span::styled("[1]", Theme::nav_key()),
            Span::styled("Dashboard ", Theme::nav_label()),
            Span::styled("[2]", Theme::nav_key()),
            Span::styled("Schedule ", Theme::nav_label()),
            Span::styled("[3]", Theme::nav_key()),
            Span::styled("Windows ", Theme::nav_label()),
            Span::styled("[4]", Theme::nav_key()),
            Span::styled("Ops ", Theme::nav_label()),
            Span::styled("[s]", Theme::nav_key()),
            Span::styled("Settings ", Theme::nav_label()),
            Span::styled("[t]", Theme::nav_key()),
            Span::styled("Spray Type ", Theme::nav_label()),
            Span::styled("[r]", Theme::nav_key()),
            Span::styled("Refresh ", Theme::nav_label()),
            Span::styled("[q]", Theme::nav_key()),
            Span::styled("Quit", Theme::nav_label()),
        ]);

        let para = Paragraph::new(nav);
        para.render(area, buf);
    }
}
