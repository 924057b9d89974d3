use crate::models::{DayTimeline, SprayStatus};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

const LABEL_WIDTH: usize = 11;
const SLOT_COUNT: u32 = 8;

/// Grid of 3-hour interval statuses, one row per forecast day.
pub struct TimelineWidget<'a> {
    timeline: &'a [DayTimeline],
    selected: Option<(usize, usize)>,
}

impl<'a> TimelineWidget<'a> {
    pub fn new(timeline: &'a [DayTimeline]) -> Self {
        Self {
            timeline,
            selected: None,
        }
    }

    pub fn selected(mut self, selected: Option<(usize, usize)>) -> Self {
        self.selected = selected;
        self
    }
}

impl Widget for TimelineWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Spray Timeline")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < 35 || inner.height < 2 {
            return;
        }

        // Hour header, shifted by the grid phase so columns match the
        // interval start hours under any provider UTC offset
        let phase = grid_phase(self.timeline);
        let mut header_spans = vec![Span::raw(" ".repeat(LABEL_WIDTH))];
        for slot in 0..SLOT_COUNT {
            header_spans.push(Span::styled(
                format!("{:02} ", phase + slot * 3),
                Theme::dim(),
            ));
        }
        buf.set_line(inner.x, inner.y, &Line::from(header_spans), inner.width);

        for (day_idx, day) in self.timeline.iter().enumerate() {
            let y = inner.y + 1 + day_idx as u16;
            if y >= inner.y + inner.height {
                break;
            }

            let label = format!(
                "{:<width$}",
                day.date.format("%a %m/%d").to_string(),
                width = LABEL_WIDTH
            );
            let mut spans = vec![Span::styled(label, Theme::header())];

            for slot in 0..SLOT_COUNT {
                let cell = day.intervals.iter().enumerate().find(|(_, interval)| {
                    let hour = chrono::Timelike::hour(&interval.timestamp);
                    hour.saturating_sub(phase) / 3 == slot && hour >= phase
                });

                match cell {
                    Some((interval_idx, interval)) => {
                        let style = if self.selected == Some((day_idx, interval_idx)) {
                            Theme::selected()
                        } else {
                            Style::default().fg(interval.status.color())
                        };
                        spans.push(Span::styled(
                            format!("{}  ", interval.status.symbol()),
                            style,
                        ));
                    }
                    // Slots before the forecast horizon have no interval
                    None => spans.push(Span::raw("   ")),
                }
            }

            buf.set_line(inner.x, y, &Line::from(spans), inner.width);
        }
    }
}

/// Hour-of-day remainder shared by every interval's local start time.
/// Zero for UTC-multiple-of-3 offsets; non-zero offsets shift the whole
/// grid (UTC-5 puts intervals at 01:00, 04:00, ...).
fn grid_phase(timeline: &[DayTimeline]) -> u32 {
    timeline
        .first()
        .and_then(|day| day.intervals.first())
        .map(|interval| chrono::Timelike::hour(&interval.timestamp) % 3)
        .unwrap_or(0)
}

pub struct StatusLegend;

impl Widget for StatusLegend {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let statuses = [
            SprayStatus::Perfect,
            SprayStatus::Risky,
            SprayStatus::DontSpray,
            SprayStatus::Night,
        ];

        let mut y = area.y;
        for status in statuses {
            if y >= area.y + area.height {
                break;
            }

            let line = Line::from(vec![
                Span::styled(
                    format!("{} ", status.symbol()),
                    Style::default().fg(status.color()),
                ),
                Span::styled(status.as_str(), Theme::dim()),
            ]);

            buf.set_line(area.x, y, &line, area.width);
            y += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassifiedInterval;
    use chrono::{FixedOffset, NaiveDate, TimeZone};

    fn classified_at(offset_hours: i32, hour: u32) -> ClassifiedInterval {
        ClassifiedInterval {
            timestamp: FixedOffset::east_opt(offset_hours * 3600)
                .unwrap()
                .with_ymd_and_hms(2025, 6, 6, hour, 0, 0)
                .unwrap(),
            status: SprayStatus::Perfect,
            reason: String::new(),
            wind_mph: 5.0,
            wind_direction_deg: 180.0,
            rain_percent: 0,
            temp_c: 18.0,
        }
    }

    fn day_of(intervals: Vec<ClassifiedInterval>) -> DayTimeline {
        DayTimeline {
            day: "Friday".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
            intervals,
        }
    }

    fn row_text(buf: &Buffer, y: u16, x_start: u16, len: u16) -> String {
        (x_start..x_start + len).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn grid_phase_follows_local_start_hours() {
        assert_eq!(grid_phase(&[]), 0);
        // UTC-aligned forecast starts on the hour-multiple-of-3 grid
        assert_eq!(grid_phase(&[day_of(vec![classified_at(0, 6)])]), 0);
        // At UTC-5 the same forecast lands on 01:00, 04:00, ...
        assert_eq!(grid_phase(&[day_of(vec![classified_at(-5, 7)])]), 1);
    }

    #[test]
    fn header_and_cells_shift_with_the_grid_phase() {
        let timeline = vec![day_of(vec![classified_at(-5, 7)])];

        let area = Rect::new(0, 0, 50, 6);
        let mut buf = Buffer::empty(area);
        TimelineWidget::new(&timeline).render(area, &mut buf);

        // Bordered inner area starts at (1, 1); hour labels follow the
        // day label column.
        let header = row_text(&buf, 1, 1 + LABEL_WIDTH as u16, 24);
        assert_eq!(header, "01 04 07 10 13 16 19 22 ");

        // The 07:00 interval renders under the "07" column, not "06"
        let slot_x = 1 + LABEL_WIDTH as u16 + 2 * 3;
        assert_eq!(buf[(slot_x, 2)].symbol(), SprayStatus::Perfect.symbol());
    }
}
