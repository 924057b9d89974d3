use crate::models::{SprayStatus, SprayType};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A forecast interval after classification. The timestamp carries the
/// location's UTC offset so hour-of-day and calendar date read directly
/// off it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedInterval {
    pub timestamp: DateTime<FixedOffset>,
    pub status: SprayStatus,
    pub reason: String,
    pub wind_mph: f64,
    pub wind_direction_deg: f64,
    pub rain_percent: u8,
    pub temp_c: f64,
}

impl ClassifiedInterval {
    /// End of this interval's 3-hour range.
    pub fn interval_end(&self) -> DateTime<FixedOffset> {
        self.timestamp + chrono::Duration::hours(3)
    }
}

/// One calendar day's ordered run of classified intervals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayTimeline {
    pub day: String, // long weekday name
    pub date: NaiveDate,
    pub intervals: Vec<ClassifiedInterval>,
}

/// A contiguous run of equal-quality sprayable intervals within one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprayWindow {
    pub day: String,
    pub date: NaiveDate,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub duration_hours: u32,
    pub quality: SprayStatus, // Perfect or Risky only
    pub avg_wind_mph: f64,
    pub avg_temp_c: f64,
    pub rain_chance_percent: u8,
}

impl SprayWindow {
    pub fn time_range(&self) -> String {
        format!(
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// Full output of one spray analysis run. Recomputed fresh from the
/// forecast on every invocation; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprayAnalysis {
    pub spray_type: SprayType,
    pub recommended_windows: Vec<SprayWindow>,
    pub timeline: Vec<DayTimeline>,
    pub last_updated: DateTime<Utc>,
}

impl SprayAnalysis {
    /// The best-ranked windows, for "recommended times" display.
    pub fn top_windows(&self, count: usize) -> &[SprayWindow] {
        let end = count.min(self.recommended_windows.len());
        &self.recommended_windows[..end]
    }

    pub fn interval_count(&self) -> usize {
        self.timeline.iter().map(|d| d.intervals.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_window(duration_hours: u32) -> SprayWindow {
        let offset = FixedOffset::east_opt(0).unwrap();
        let start = offset.with_ymd_and_hms(2025, 6, 6, 9, 0, 0).unwrap();
        SprayWindow {
            day: "Friday".into(),
            date: NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
            start,
            end: start + chrono::Duration::hours(duration_hours as i64),
            duration_hours,
            quality: SprayStatus::Perfect,
            avg_wind_mph: 5.0,
            avg_temp_c: 18.0,
            rain_chance_percent: 0,
        }
    }

    #[test]
    fn window_time_range_formatting() {
        let window = sample_window(6);
        assert_eq!(window.time_range(), "09:00-15:00");
    }

    #[test]
    fn top_windows_clamps_to_available() {
        let analysis = SprayAnalysis {
            spray_type: SprayType::Herbicide,
            recommended_windows: vec![sample_window(3), sample_window(6)],
            timeline: Vec::new(),
            last_updated: Utc::now(),
        };
        assert_eq!(analysis.top_windows(3).len(), 2);
        assert_eq!(analysis.top_windows(1).len(), 1);
    }
}
