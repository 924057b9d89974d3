use crate::models::{SprayAnalysis, SprayWindow};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget, Wrap},
};

pub struct WindowsScreen<'a> {
    pub analysis: Option<&'a SprayAnalysis>,
    pub selected_index: usize,
}

impl<'a> WindowsScreen<'a> {
    pub fn new(analysis: Option<&'a SprayAnalysis>) -> Self {
        Self {
            analysis,
            selected_index: 0,
        }
    }

    pub fn with_selection(mut self, index: usize) -> Self {
        self.selected_index = index;
        self
    }

    fn windows(&self) -> &[SprayWindow] {
        self.analysis
            .map(|a| a.recommended_windows.as_slice())
            .unwrap_or(&[])
    }
}

impl Widget for WindowsScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(10),   // Content
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let spray_type = self
            .analysis
            .map(|a| a.spray_type.as_str())
            .unwrap_or("none");
        let title = Line::from(vec![
            Span::styled("Spray Windows", Theme::title()),
            Span::styled(format!(" ({})", spray_type), Theme::highlight()),
            Span::styled(
                format!(" - {} found", self.windows().len()),
                Theme::dim(),
            ),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);

        self.render_list(content[0], buf);
        self.render_details(content[1], buf);

        let nav = Line::from(vec![
            Span::styled("[↑↓]", Theme::nav_key()),
            Span::styled("Navigate ", Theme::nav_label()),
            Span::styled("[l]", Theme::nav_key()),
            Span::styled("Log Spray ", Theme::nav_label()),
            Span::styled("[t]", Theme::nav_key()),
            Span::styled("Spray Type ", Theme::nav_label()),
            Span::styled("[Esc]", Theme::nav_key()),
            Span::styled("Back", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(chunks[2], buf);
    }
}

impl WindowsScreen<'_> {
    fn render_list(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Ranked Windows")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let windows = self.windows();

        if windows.is_empty() {
            let para = Paragraph::new(Span::styled(
                "No spray windows in the forecast",
                Theme::dim(),
            ));
            para.render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = windows
            .iter()
            .enumerate()
            .map(|(i, window)| {
                let style = if i == self.selected_index {
                    Theme::selected()
                } else {
                    Style::default()
                };

                let quality_style = Style::default().fg(window.quality.color());
                let line = Line::from(vec![
                    Span::styled(format!("{} ", window.quality.symbol()), quality_style),
                    Span::styled(format!("{:<9}", window.day), Theme::normal()),
                    Span::styled(window.time_range(), Theme::normal()),
                    Span::styled(format!(" {}h", window.duration_hours), Theme::dim()),
                ]);

                ListItem::new(line).style(style)
            })
            .collect();

        let list = List::new(items);
        list.render(inner, buf);
    }

    fn render_details(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Details")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let window = match self.windows().get(self.selected_index) {
            Some(w) => w,
            None => {
                let para = Paragraph::new(Span::styled(
                    "Select a window to view details",
                    Theme::dim(),
                ));
                para.render(inner, buf);
                return;
            }
        };

        let quality_style = Style::default().fg(window.quality.color());
        let lines = vec![
            Line::from(vec![Span::styled(
                format!("{} {}", window.day, window.date.format("%B %d")),
                Theme::header(),
            )]),
            Line::from(vec![]),
            Line::from(vec![
                Span::styled("Quality:  ", Theme::dim()),
                Span::styled(format!("{} ", window.quality.symbol()), quality_style),
                Span::styled(window.quality.as_str(), quality_style),
            ]),
            Line::from(vec![
                Span::styled("Time:     ", Theme::dim()),
                Span::styled(window.time_range(), Theme::normal()),
                Span::styled(
                    format!(" ({} hours)", window.duration_hours),
                    Theme::dim(),
                ),
            ]),
            Line::from(vec![
                Span::styled("Avg wind: ", Theme::dim()),
                Span::styled(
                    format!("{:.1}mph", window.avg_wind_mph),
                    Style::default().fg(Theme::wind_color(window.avg_wind_mph)),
                ),
            ]),
            Line::from(vec![
                Span::styled("Avg temp: ", Theme::dim()),
                Span::styled(
                    format!("{:.1}°C", window.avg_temp_c),
                    Style::default().fg(Theme::temp_color(window.avg_temp_c)),
                ),
            ]),
            Line::from(vec![
                Span::styled("Max rain: ", Theme::dim()),
                Span::styled(
                    format!("{}%", window.rain_chance_percent),
                    Theme::normal(),
                ),
            ]),
            Line::from(vec![]),
            Line::from(vec![Span::styled(
                "Press [l] to log a spray operation for this window",
                Theme::dim(),
            )]),
        ];

        let para = Paragraph::new(lines).wrap(Wrap { trim: true });
        para.render(inner, buf);
    }
}
