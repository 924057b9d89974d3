pub mod classifier;
pub mod windows;

pub use classifier::classify_interval;
pub use windows::{merge_day_windows, rank_windows};

use crate::models::{DayTimeline, ForecastInterval, SprayAnalysis, SprayType};
use chrono::{Datelike, FixedOffset, Utc, Weekday};

/// Runs the full spray analysis over a 3-hourly forecast.
///
/// Every interval is classified for the given spray type, grouped into
/// per-day timelines on the local calendar date, and each day's sprayable
/// runs are merged into windows which are then ranked best-first across
/// the whole forecast. Intervals are expected in the chronological order
/// the forecast provider delivers them. An empty forecast produces an
/// analysis with an empty timeline and no windows.
pub fn analyze(
    intervals: &[ForecastInterval],
    spray_type: SprayType,
    utc_offset: FixedOffset,
) -> SprayAnalysis {
    let mut timeline: Vec<DayTimeline> = Vec::new();

    for interval in intervals {
        let classified = classify_interval(interval, spray_type, utc_offset);
        let date = classified.timestamp.date_naive();
        match timeline.iter_mut().find(|day| day.date == date) {
            Some(day) => day.intervals.push(classified),
            None => timeline.push(DayTimeline {
                day: weekday_name(date.weekday()).to_string(),
                date,
                intervals: vec![classified],
            }),
        }
    }

    let mut recommended_windows = Vec::new();
    for day in &timeline {
        recommended_windows.extend(merge_day_windows(day));
    }
    rank_windows(&mut recommended_windows);

    SprayAnalysis {
        spray_type,
        recommended_windows,
        timeline,
        last_updated: Utc::now(),
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SprayStatus, WeatherCondition};
    use chrono::{NaiveDate, TimeZone};

    fn ideal_at(day: u32, hour: u32) -> ForecastInterval {
        ForecastInterval {
            timestamp: Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap(),
            temp_c: 18.0,
            feels_like_c: 18.0,
            humidity_percent: 55.0,
            wind_speed_ms: 2.2,
            wind_direction_deg: 180.0,
            wind_gust_ms: None,
            precipitation_prob: 0.0,
            precipitation_mm: 0.0,
            cloud_cover_percent: 20.0,
            condition: WeatherCondition::Clear,
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn analysis_covers_every_interval() {
        let intervals: Vec<_> = (0..8).map(|i| ideal_at(6, i * 3)).collect();
        let analysis = analyze(&intervals, SprayType::Herbicide, utc());

        assert_eq!(analysis.timeline.len(), 1);
        assert_eq!(analysis.interval_count(), 8);
        assert_eq!(analysis.timeline[0].day, "Friday");
        assert_eq!(
            analysis.timeline[0].date,
            NaiveDate::from_ymd_opt(2025, 6, 6).unwrap()
        );

        // 00:00 and 03:00 are night, 06:00 through 18:00 are ideal, 21:00
        // is night again, so the day yields a single 15-hour window.
        assert_eq!(analysis.recommended_windows.len(), 1);
        let window = &analysis.recommended_windows[0];
        assert_eq!(window.quality, SprayStatus::Perfect);
        assert_eq!(window.duration_hours, 15);
        assert_eq!(window.time_range(), "06:00-21:00");
    }

    #[test]
    fn empty_forecast_yields_empty_analysis() {
        let analysis = analyze(&[], SprayType::Herbicide, utc());
        assert!(analysis.timeline.is_empty());
        assert!(analysis.recommended_windows.is_empty());
    }

    #[test]
    fn windows_never_span_a_day_boundary() {
        let intervals = vec![ideal_at(6, 15), ideal_at(7, 9)];
        let analysis = analyze(&intervals, SprayType::Herbicide, utc());

        assert_eq!(analysis.timeline.len(), 2);
        assert_eq!(analysis.recommended_windows.len(), 2);
        assert_eq!(analysis.recommended_windows[0].duration_hours, 3);
        assert_eq!(analysis.recommended_windows[1].duration_hours, 3);
        assert_ne!(
            analysis.recommended_windows[0].date,
            analysis.recommended_windows[1].date
        );
    }

    #[test]
    fn grouping_uses_local_dates() {
        // 20:00 UTC on the 6th is 06:00 on the 7th at UTC+10.
        let offset = FixedOffset::east_opt(10 * 3600).unwrap();
        let analysis = analyze(&[ideal_at(6, 20)], SprayType::Herbicide, offset);

        assert_eq!(analysis.timeline.len(), 1);
        assert_eq!(
            analysis.timeline[0].date,
            NaiveDate::from_ymd_opt(2025, 6, 7).unwrap()
        );
        assert_eq!(analysis.timeline[0].day, "Saturday");
        assert_eq!(analysis.recommended_windows.len(), 1);
    }

    #[test]
    fn windows_ranked_across_days() {
        // Saturday has the longer ideal run, so it outranks Friday's.
        let mut intervals = vec![ideal_at(6, 9)];
        intervals.push(ideal_at(7, 9));
        intervals.push(ideal_at(7, 12));
        let analysis = analyze(&intervals, SprayType::Herbicide, utc());

        assert_eq!(analysis.recommended_windows.len(), 2);
        assert_eq!(analysis.recommended_windows[0].day, "Saturday");
        assert_eq!(analysis.recommended_windows[0].duration_hours, 6);
        assert_eq!(analysis.recommended_windows[1].day, "Friday");
    }
}
