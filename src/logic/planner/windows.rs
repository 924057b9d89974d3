use crate::models::{ClassifiedInterval, DayTimeline, SprayStatus, SprayWindow};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate};

/// Accumulator for a run of consecutive sprayable intervals sharing one quality.
struct OpenWindow {
    quality: SprayStatus,
    start: DateTime<FixedOffset>,
    last: DateTime<FixedOffset>,
    count: u32,
    wind_sum: f64,
    temp_sum: f64,
    max_rain: u8,
}

impl OpenWindow {
    fn seed(interval: &ClassifiedInterval) -> Self {
        Self {
            quality: interval.status,
            start: interval.timestamp,
            last: interval.timestamp,
            count: 1,
            wind_sum: interval.wind_mph,
            temp_sum: interval.temp_c,
            max_rain: interval.rain_percent,
        }
    }

    fn extend(&mut self, interval: &ClassifiedInterval) {
        self.last = interval.timestamp;
        self.count += 1;
        self.wind_sum += interval.wind_mph;
        self.temp_sum += interval.temp_c;
        self.max_rain = self.max_rain.max(interval.rain_percent);
    }

    fn close(self, day: &str, date: NaiveDate) -> SprayWindow {
        SprayWindow {
            day: day.to_string(),
            date,
            start: self.start,
            end: self.last + Duration::hours(3),
            duration_hours: self.count * 3,
            quality: self.quality,
            avg_wind_mph: self.wind_sum / self.count as f64,
            avg_temp_c: self.temp_sum / self.count as f64,
            rain_chance_percent: self.max_rain,
        }
    }
}

/// Merges one day's consecutive sprayable intervals into windows.
///
/// A window only ever holds intervals of a single quality: when the quality
/// changes the current window is closed and the triggering interval seeds a
/// new one. Night and Don't Spray intervals close the current window without
/// seeding, so windows never span an unsprayable gap or a day boundary.
pub fn merge_day_windows(timeline: &DayTimeline) -> Vec<SprayWindow> {
    let mut windows = Vec::new();
    let mut open: Option<OpenWindow> = None;

    for interval in &timeline.intervals {
        if interval.status.is_sprayable() {
            match open.take() {
                Some(mut window) if window.quality == interval.status => {
                    window.extend(interval);
                    open = Some(window);
                }
                Some(window) => {
                    windows.push(window.close(&timeline.day, timeline.date));
                    open = Some(OpenWindow::seed(interval));
                }
                None => open = Some(OpenWindow::seed(interval)),
            }
        } else if let Some(window) = open.take() {
            windows.push(window.close(&timeline.day, timeline.date));
        }
    }

    if let Some(window) = open {
        windows.push(window.close(&timeline.day, timeline.date));
    }

    windows
}

/// Orders windows best-first: every Perfect window ahead of every Risky one,
/// longer windows ahead of shorter within the same quality. The sort is
/// stable, so equal windows keep their chronological order.
pub fn rank_windows(windows: &mut [SprayWindow]) {
    windows.sort_by(|a, b| {
        quality_rank(a.quality)
            .cmp(&quality_rank(b.quality))
            .then(b.duration_hours.cmp(&a.duration_hours))
    });
}

fn quality_rank(status: SprayStatus) -> u8 {
    match status {
        SprayStatus::Perfect => 0,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn classified(hour: u32, status: SprayStatus) -> ClassifiedInterval {
        classified_on(6, hour, status)
    }

    fn classified_on(day: u32, hour: u32, status: SprayStatus) -> ClassifiedInterval {
        ClassifiedInterval {
            timestamp: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2025, 6, day, hour, 0, 0)
                .unwrap(),
            status,
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

    #[test]
    fn consecutive_same_quality_merges() {
        let timeline = day_of(vec![
            classified(9, SprayStatus::Perfect),
            classified(12, SprayStatus::Perfect),
            classified(15, SprayStatus::Perfect),
        ]);

        let windows = merge_day_windows(&timeline);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].duration_hours, 9);
        assert_eq!(windows[0].time_range(), "09:00-18:00");
        assert_eq!(windows[0].quality, SprayStatus::Perfect);
        assert_eq!(windows[0].day, "Friday");
    }

    #[test]
    fn quality_change_splits_window() {
        let timeline = day_of(vec![
            classified(9, SprayStatus::Perfect),
            classified(12, SprayStatus::Risky),
            classified(15, SprayStatus::Risky),
        ]);

        let windows = merge_day_windows(&timeline);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].quality, SprayStatus::Perfect);
        assert_eq!(windows[0].duration_hours, 3);
        assert_eq!(windows[0].time_range(), "09:00-12:00");
        assert_eq!(windows[1].quality, SprayStatus::Risky);
        assert_eq!(windows[1].duration_hours, 6);
        assert_eq!(windows[1].time_range(), "12:00-18:00");
    }

    #[test]
    fn unsprayable_interval_closes_without_seeding() {
        let timeline = day_of(vec![
            classified(9, SprayStatus::Perfect),
            classified(12, SprayStatus::DontSpray),
            classified(15, SprayStatus::Perfect),
        ]);

        let windows = merge_day_windows(&timeline);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].time_range(), "09:00-12:00");
        assert_eq!(windows[1].time_range(), "15:00-18:00");
    }

    #[test]
    fn window_averages_wind_and_temp_and_takes_max_rain() {
        let mut first = classified(9, SprayStatus::Risky);
        first.wind_mph = 4.0;
        first.temp_c = 16.0;
        first.rain_percent = 8;
        let mut second = classified(12, SprayStatus::Risky);
        second.wind_mph = 6.0;
        second.temp_c = 20.0;
        second.rain_percent = 12;

        let windows = merge_day_windows(&day_of(vec![first, second]));
        assert_eq!(windows.len(), 1);
        assert!((windows[0].avg_wind_mph - 5.0).abs() < f64::EPSILON);
        assert!((windows[0].avg_temp_c - 18.0).abs() < f64::EPSILON);
        assert_eq!(windows[0].rain_chance_percent, 12);
    }

    #[test]
    fn all_unsprayable_yields_no_windows() {
        let timeline = day_of(vec![
            classified(3, SprayStatus::Night),
            classified(6, SprayStatus::DontSpray),
            classified(9, SprayStatus::DontSpray),
        ]);
        assert!(merge_day_windows(&timeline).is_empty());
    }

    #[test]
    fn ranking_prefers_perfect_then_duration() {
        let make = |day: u32, hours: u32, quality: SprayStatus| {
            let intervals: Vec<_> = (0..hours / 3)
                .map(|i| classified_on(day, 9 + i * 3, quality))
                .collect();
            let mut timeline = day_of(intervals);
            timeline.date = NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
            merge_day_windows(&timeline).remove(0)
        };

        let mut windows = vec![
            make(6, 9, SprayStatus::Risky),
            make(7, 3, SprayStatus::Perfect),
            make(8, 6, SprayStatus::Perfect),
            make(9, 3, SprayStatus::Risky),
        ];
        rank_windows(&mut windows);

        assert_eq!(windows[0].quality, SprayStatus::Perfect);
        assert_eq!(windows[0].duration_hours, 6);
        assert_eq!(windows[1].quality, SprayStatus::Perfect);
        assert_eq!(windows[1].duration_hours, 3);
        assert_eq!(windows[2].quality, SprayStatus::Risky);
        assert_eq!(windows[2].duration_hours, 9);
        assert_eq!(windows[3].quality, SprayStatus::Risky);
        assert_eq!(windows[3].duration_hours, 3);
    }

    #[test]
    fn ranking_keeps_chronological_order_for_ties() {
        let make = |day: u32| {
            let mut timeline = day_of(vec![classified_on(day, 9, SprayStatus::Perfect)]);
            timeline.date = NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
            merge_day_windows(&timeline).remove(0)
        };

        let mut windows = vec![make(6), make(7), make(8)];
        rank_windows(&mut windows);

        let days: Vec<u32> = windows
            .iter()
            .map(|w| chrono::Datelike::day(&w.date))
            .collect();
        assert_eq!(days, vec![6, 7, 8]);
    }
}
