use crate::models::{ClassifiedInterval, ForecastInterval, SprayStatus, SprayType};
use chrono::{FixedOffset, Timelike};

/// Daytime spraying hours, inclusive start and exclusive end in local time.
const SPRAY_START_HOUR: u32 = 6;
const SPRAY_END_HOUR: u32 = 20;

/// Below this wind speed spray drifts unpredictably (inversion risk).
const PERFECT_WIND_MIN_MPH: f64 = 2.0;

const PERFECT_RAIN_MAX_PERCENT: u8 = 5;
const RISKY_RAIN_MAX_PERCENT: u8 = 20;

const PERFECT_TEMP_MIN_C: f64 = 5.0;
const PERFECT_TEMP_MAX_C: f64 = 25.0;
const RISKY_TEMP_MIN_C: f64 = 3.0;
const RISKY_TEMP_MAX_C: f64 = 28.0;

/// Classifies a single 3-hour forecast interval for a given spray type.
///
/// Rules, evaluated in order (first match wins):
/// - Night: local hour outside 6am-8pm
/// - Perfect: wind 2mph..=perfect max, rain <5%, temp 5-25°C
/// - Risky: wind in the (perfect max, risky max] band, or rain 5-20%,
///   or temp 3-5°C / 25-28°C
/// - Don't Spray: everything else
///
/// Wind is converted from m/s to mph and rain probability to a rounded
/// percentage before any threshold is applied; reasons quote the same
/// rounded values the caller will display.
pub fn classify_interval(
    interval: &ForecastInterval,
    spray_type: SprayType,
    utc_offset: FixedOffset,
) -> ClassifiedInterval {
    let local_time = interval.timestamp.with_timezone(&utc_offset);
    let wind_mph = interval.wind_mph();
    let rain_percent = (interval.precipitation_prob * 100.0).round() as u8;

    let (status, reason) = classify(
        local_time.hour(),
        wind_mph,
        rain_percent,
        interval.temp_c,
        spray_type,
    );

    ClassifiedInterval {
        timestamp: local_time,
        status,
        reason,
        wind_mph,
        wind_direction_deg: interval.wind_direction_deg,
        rain_percent,
        temp_c: interval.temp_c,
    }
}

fn classify(
    hour: u32,
    wind_mph: f64,
    rain_percent: u8,
    temp_c: f64,
    spray_type: SprayType,
) -> (SprayStatus, String) {
    if hour < SPRAY_START_HOUR || hour >= SPRAY_END_HOUR {
        return (
            SprayStatus::Night,
            "Outside spraying hours (6am-8pm)".to_string(),
        );
    }

    let perfect_max = spray_type.perfect_max_mph();
    let risky_max = spray_type.risky_max_mph();

    let wind_perfect = wind_mph >= PERFECT_WIND_MIN_MPH && wind_mph <= perfect_max;
    let rain_perfect = rain_percent < PERFECT_RAIN_MAX_PERCENT;
    let temp_perfect = temp_c >= PERFECT_TEMP_MIN_C && temp_c <= PERFECT_TEMP_MAX_C;

    if wind_perfect && rain_perfect && temp_perfect {
        return (SprayStatus::Perfect, "Ideal spraying conditions".to_string());
    }

    // Marginal bands are checked before the hard failures so that, say, a
    // light rain chance reads as Risky even when wind already exceeds the
    // perfect threshold.
    if wind_mph > perfect_max && wind_mph <= risky_max {
        return (SprayStatus::Risky, "Wind approaching limit".to_string());
    }
    if rain_percent >= PERFECT_RAIN_MAX_PERCENT && rain_percent <= RISKY_RAIN_MAX_PERCENT {
        return (SprayStatus::Risky, "Light rain possible".to_string());
    }
    let temp_risky_low = temp_c >= RISKY_TEMP_MIN_C && temp_c < PERFECT_TEMP_MIN_C;
    let temp_risky_high = temp_c > PERFECT_TEMP_MAX_C && temp_c <= RISKY_TEMP_MAX_C;
    if temp_risky_low || temp_risky_high {
        return (SprayStatus::Risky, "Temperature not ideal".to_string());
    }

    let reason = if wind_mph > risky_max {
        format!("High wind ({:.0}mph)", wind_mph)
    } else if rain_percent > RISKY_RAIN_MAX_PERCENT {
        format!("Rain forecast ({}%)", rain_percent)
    } else if temp_c < RISKY_TEMP_MIN_C {
        "Too cold".to_string()
    } else if temp_c > RISKY_TEMP_MAX_C {
        "Too hot".to_string()
    } else {
        // Calm wind below the drift minimum lands here.
        "Unsuitable conditions".to_string()
    };

    (SprayStatus::DontSpray, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeatherCondition;
    use chrono::{TimeZone, Utc};

    fn interval_at(hour_utc: u32, wind_speed_ms: f64, pop: f64, temp_c: f64) -> ForecastInterval {
        ForecastInterval {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 6, hour_utc, 0, 0).unwrap(),
            temp_c,
            feels_like_c: temp_c,
            humidity_percent: 55.0,
            wind_speed_ms,
            wind_direction_deg: 180.0,
            wind_gust_ms: None,
            precipitation_prob: pop,
            precipitation_mm: 0.0,
            cloud_cover_percent: 20.0,
            condition: WeatherCondition::Clear,
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn ideal_conditions_classified_perfect() {
        let classified =
            classify_interval(&interval_at(10, 2.2, 0.0, 18.0), SprayType::Herbicide, utc());
        assert_eq!(classified.status, SprayStatus::Perfect);
        assert_eq!(classified.reason, "Ideal spraying conditions");
    }

    #[test]
    fn night_hours_excluded() {
        for hour in [0, 5, 20, 22, 23] {
            let (status, reason) = classify(hour, 5.0, 0, 18.0, SprayType::Herbicide);
            assert_eq!(status, SprayStatus::Night, "hour {} should be night", hour);
            assert_eq!(reason, "Outside spraying hours (6am-8pm)");
        }
        for hour in [6, 12, 19] {
            let (status, _) = classify(hour, 5.0, 0, 18.0, SprayType::Herbicide);
            assert_ne!(status, SprayStatus::Night, "hour {} should be daytime", hour);
        }
    }

    #[test]
    fn marginal_bands_win_over_hard_failures() {
        // Wind alone would be Don't Spray for herbicide, but the rain band
        // is still marginal, so the interval reads Risky.
        let (status, reason) = classify(10, 16.0, 10, 18.0, SprayType::Herbicide);
        assert_eq!(status, SprayStatus::Risky);
        assert_eq!(reason, "Light rain possible");
    }

    #[test]
    fn high_wind_reason_quotes_rounded_mph() {
        let (status, reason) = classify(10, 16.0, 0, 18.0, SprayType::Herbicide);
        assert_eq!(status, SprayStatus::DontSpray);
        assert_eq!(reason, "High wind (16mph)");

        let (_, reason) = classify(10, 15.88, 0, 18.0, SprayType::Herbicide);
        assert_eq!(reason, "High wind (16mph)");
    }

    #[test]
    fn wind_tolerance_varies_by_spray_type() {
        let (status, _) = classify(10, 16.0, 0, 18.0, SprayType::Herbicide);
        assert_eq!(status, SprayStatus::DontSpray);

        let (status, reason) = classify(10, 16.0, 0, 18.0, SprayType::Insecticide);
        assert_eq!(status, SprayStatus::Risky);
        assert_eq!(reason, "Wind approaching limit");

        let (status, _) = classify(10, 14.0, 0, 18.0, SprayType::Insecticide);
        assert_eq!(status, SprayStatus::Perfect);

        let (status, reason) = classify(10, 14.0, 0, 18.0, SprayType::Herbicide);
        assert_eq!(status, SprayStatus::Risky);
        assert_eq!(reason, "Wind approaching limit");
    }

    #[test]
    fn rain_probability_rounds_before_thresholds() {
        // 4.6% rounds to 5% and lands in the marginal band.
        let classified =
            classify_interval(&interval_at(10, 2.2, 0.046, 18.0), SprayType::Herbicide, utc());
        assert_eq!(classified.rain_percent, 5);
        assert_eq!(classified.status, SprayStatus::Risky);
        assert_eq!(classified.reason, "Light rain possible");

        // 4.4% rounds to 4% and stays perfect.
        let classified =
            classify_interval(&interval_at(10, 2.2, 0.044, 18.0), SprayType::Herbicide, utc());
        assert_eq!(classified.rain_percent, 4);
        assert_eq!(classified.status, SprayStatus::Perfect);
    }

    #[test]
    fn dont_spray_reasons_in_priority_order() {
        let (_, reason) = classify(10, 20.0, 30, 1.0, SprayType::Herbicide);
        assert_eq!(reason, "High wind (20mph)");

        let (_, reason) = classify(10, 5.0, 30, 1.0, SprayType::Herbicide);
        assert_eq!(reason, "Rain forecast (30%)");

        let (_, reason) = classify(10, 5.0, 0, 1.0, SprayType::Herbicide);
        assert_eq!(reason, "Too cold");

        let (_, reason) = classify(10, 5.0, 0, 30.0, SprayType::Herbicide);
        assert_eq!(reason, "Too hot");
    }

    #[test]
    fn temperature_bands() {
        let (status, reason) = classify(10, 5.0, 0, 4.0, SprayType::Herbicide);
        assert_eq!(status, SprayStatus::Risky);
        assert_eq!(reason, "Temperature not ideal");

        let (status, _) = classify(10, 5.0, 0, 27.0, SprayType::Herbicide);
        assert_eq!(status, SprayStatus::Risky);

        let (status, _) = classify(10, 5.0, 0, 25.0, SprayType::Herbicide);
        assert_eq!(status, SprayStatus::Perfect);

        let (status, reason) = classify(10, 5.0, 0, 2.9, SprayType::Herbicide);
        assert_eq!(status, SprayStatus::DontSpray);
        assert_eq!(reason, "Too cold");
    }

    #[test]
    fn calm_wind_is_unsuitable() {
        let (status, reason) = classify(10, 1.0, 0, 18.0, SprayType::Herbicide);
        assert_eq!(status, SprayStatus::DontSpray);
        assert_eq!(reason, "Unsuitable conditions");
    }

    #[test]
    fn local_offset_decides_night() {
        // 02:00 UTC is mid-day at UTC+10, so the interval is sprayable.
        let offset = FixedOffset::east_opt(10 * 3600).unwrap();
        let classified =
            classify_interval(&interval_at(2, 2.2, 0.0, 18.0), SprayType::Herbicide, offset);
        assert_eq!(classified.timestamp.hour(), 12);
        assert_eq!(classified.status, SprayStatus::Perfect);

        let classified =
            classify_interval(&interval_at(2, 2.2, 0.0, 18.0), SprayType::Herbicide, utc());
        assert_eq!(classified.status, SprayStatus::Night);
    }
}
