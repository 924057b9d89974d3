use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Weather forecast data from OpenWeatherMap 5-day/3-hour API.
/// Wind stays in m/s and temperature in °C as delivered; unit
/// normalization happens in the spray planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub fetched_at: DateTime<Utc>,
    pub location: ForecastLocation,
    /// Shift from UTC in seconds for the forecast location, as reported
    /// by the provider.
    pub timezone_offset_seconds: i32,
    pub intervals: Vec<ForecastInterval>, // 3-hour intervals
}

impl WeatherForecast {
    /// The location's UTC offset; falls back to UTC if the provider
    /// reported something out of range.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.timezone_offset_seconds).unwrap_or_else(|| {
            tracing::warn!(
                offset_seconds = self.timezone_offset_seconds,
                "Invalid timezone offset from provider, using UTC"
            );
            FixedOffset::east_opt(0).unwrap()
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastLocation {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Miles per hour per metre per second, the conversion every wind
/// threshold in the planner is expressed in.
pub const MS_TO_MPH: f64 = 2.237;

/// A single 3-hour forecast interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastInterval {
    pub timestamp: DateTime<Utc>,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub humidity_percent: f64,
    pub wind_speed_ms: f64,
    pub wind_direction_deg: f64,
    pub wind_gust_ms: Option<f64>,
    pub precipitation_prob: f64, // 0.0-1.0
    pub precipitation_mm: f64,   // rain + snow
    pub cloud_cover_percent: f64,
    pub condition: WeatherCondition,
}

impl ForecastInterval {
    pub fn wind_mph(&self) -> f64 {
        self.wind_speed_ms * MS_TO_MPH
    }
}

/// Current observed conditions for the dashboard header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub timestamp: DateTime<Utc>,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub humidity_percent: f64,
    pub wind_speed_ms: f64,
    pub wind_direction_deg: f64,
    pub condition: WeatherCondition,
}

impl CurrentConditions {
    pub fn wind_mph(&self) -> f64 {
        self.wind_speed_ms * MS_TO_MPH
    }
}

/// A place-name match from the geocoding API, used during setup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    pub name: String,
    pub country: String,
    pub state: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn describe(&self) -> String {
        match &self.state {
            Some(state) => format!("{}, {}, {}", self.name, state, self.country),
            None => format!("{}, {}", self.name, self.country),
        }
    }
}

/// Weather condition categories from OpenWeatherMap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WeatherCondition {
    #[default]
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Fog,
    Other,
}

impl WeatherCondition {
    pub fn from_owm_id(id: u32) -> Self {
        match id {
            200..=232 => WeatherCondition::Thunderstorm,
            300..=321 => WeatherCondition::Drizzle,
            500..=531 => WeatherCondition::Rain,
            600..=622 => WeatherCondition::Snow,
            701 => WeatherCondition::Mist,
            741 => WeatherCondition::Fog,
            800 => WeatherCondition::Clear,
            801..=804 => WeatherCondition::Clouds,
            _ => WeatherCondition::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "Clear",
            WeatherCondition::Clouds => "Cloudy",
            WeatherCondition::Rain => "Rain",
            WeatherCondition::Drizzle => "Drizzle",
            WeatherCondition::Thunderstorm => "Thunderstorm",
            WeatherCondition::Snow => "Snow",
            WeatherCondition::Mist => "Mist",
            WeatherCondition::Fog => "Fog",
            WeatherCondition::Other => "Other",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "☀",
            WeatherCondition::Clouds => "☁",
            WeatherCondition::Rain => "🌧",
            WeatherCondition::Drizzle => "🌦",
            WeatherCondition::Thunderstorm => "⛈",
            WeatherCondition::Snow => "❄",
            WeatherCondition::Mist => "🌫",
            WeatherCondition::Fog => "🌫",
            WeatherCondition::Other => "?",
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_condition_from_owm_id() {
        assert_eq!(
            WeatherCondition::from_owm_id(200),
            WeatherCondition::Thunderstorm
        );
        assert_eq!(WeatherCondition::from_owm_id(500), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::from_owm_id(800), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_owm_id(801), WeatherCondition::Clouds);
        assert_eq!(WeatherCondition::from_owm_id(600), WeatherCondition::Snow);
    }

    #[test]
    fn utc_offset_from_provider_seconds() {
        let forecast = WeatherForecast {
            fetched_at: Utc::now(),
            location: ForecastLocation {
                city: "Des Moines".into(),
                country: "US".into(),
                latitude: 41.59,
                longitude: -93.62,
            },
            timezone_offset_seconds: -18000, // UTC-5
            intervals: Vec::new(),
        };
        assert_eq!(forecast.utc_offset().local_minus_utc(), -18000);
    }

    #[test]
    fn utc_offset_invalid_falls_back_to_utc() {
        let forecast = WeatherForecast {
            fetched_at: Utc::now(),
            location: ForecastLocation {
                city: "Nowhere".into(),
                country: "XX".into(),
                latitude: 0.0,
                longitude: 0.0,
            },
            timezone_offset_seconds: 999_999,
            intervals: Vec::new(),
        };
        assert_eq!(forecast.utc_offset().local_minus_utc(), 0);
    }

    #[test]
    fn geo_location_describe() {
        let with_state = GeoLocation {
            name: "Ames".into(),
            country: "US".into(),
            state: Some("Iowa".into()),
            latitude: 42.03,
            longitude: -93.62,
        };
        assert_eq!(with_state.describe(), "Ames, Iowa, US");

        let without_state = GeoLocation {
            name: "Leeds".into(),
            country: "GB".into(),
            state: None,
            latitude: 53.8,
            longitude: -1.55,
        };
        assert_eq!(without_state.describe(), "Leeds, GB");
    }
}
