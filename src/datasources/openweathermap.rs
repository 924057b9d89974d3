use crate::config::OpenWeatherMapConfig;
use crate::error::{FarmOpsError, Result};
use crate::models::forecast::{
    CurrentConditions, ForecastInterval, ForecastLocation, GeoLocation, WeatherCondition,
    WeatherForecast,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

const API_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const GEO_API_BASE_URL: &str = "https://api.openweathermap.org/geo/1.0";

pub struct OpenWeatherMapClient {
    client: reqwest::Client,
    config: OpenWeatherMapConfig,
    latitude: f64,
    longitude: f64,
}

// OpenWeatherMap API response structures
#[derive(Debug, Deserialize)]
struct OwmForecastResponse {
    list: Vec<OwmForecastItem>,
    city: OwmCity,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    dt: i64,
    main: OwmMain,
    weather: Vec<OwmWeather>,
    clouds: OwmClouds,
    wind: OwmWind,
    #[serde(default)]
    pop: f64, // probability of precipitation, 0.0-1.0
    #[serde(default)]
    rain: Option<OwmPrecipitation>,
    #[serde(default)]
    snow: Option<OwmPrecipitation>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    id: u32,
    #[allow(dead_code)]
    main: String,
    #[allow(dead_code)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmClouds {
    all: f64, // cloudiness percentage
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
    #[serde(default)]
    gust: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmPrecipitation {
    #[serde(rename = "3h", default)]
    three_hour: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCity {
    name: String,
    country: String,
    coord: OwmCoord,
    #[serde(default)]
    timezone: i32, // shift from UTC in seconds
}

#[derive(Debug, Deserialize)]
struct OwmCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    dt: i64,
    main: OwmMain,
    weather: Vec<OwmWeather>,
    wind: OwmWind,
}

#[derive(Debug, Deserialize)]
struct OwmGeoResult {
    name: String,
    country: String,
    #[serde(default)]
    state: Option<String>,
    lat: f64,
    lon: f64,
}

impl OpenWeatherMapClient {
    pub fn new(config: OpenWeatherMapConfig, latitude: f64, longitude: f64) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            latitude,
            longitude,
        }
    }

    /// Fetch the 5-day/3-hour forecast in metric units
    pub async fn fetch_forecast(&self) -> Result<WeatherForecast> {
        let url = format!(
            "{}/forecast?lat={}&lon={}&appid={}&units=metric",
            API_BASE_URL, self.latitude, self.longitude, self.config.api_key
        );

        let response =
            self.client.get(&url).send().await.map_err(|e| {
                FarmOpsError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FarmOpsError::DataSourceUnavailable(format!(
                "OpenWeatherMap returned {}: {}",
                status, body
            )));
        }

        let owm_response: OwmForecastResponse = response.json().await.map_err(|e| {
            FarmOpsError::DataSourceUnavailable(format!(
                "Failed to parse OpenWeatherMap response: {}",
                e
            ))
        })?;

        Ok(convert_response(owm_response))
    }

    /// Fetch current conditions at the farm location
    pub async fn fetch_current(&self) -> Result<CurrentConditions> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            API_BASE_URL, self.latitude, self.longitude, self.config.api_key
        );

        let response =
            self.client.get(&url).send().await.map_err(|e| {
                FarmOpsError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FarmOpsError::DataSourceUnavailable(format!(
                "OpenWeatherMap returned {}: {}",
                status, body
            )));
        }

        let owm_response: OwmCurrentResponse = response.json().await.map_err(|e| {
            FarmOpsError::DataSourceUnavailable(format!(
                "Failed to parse OpenWeatherMap response: {}",
                e
            ))
        })?;

        Ok(convert_current(owm_response))
    }

    /// Look up candidate locations by free-text name via the geocoding API
    pub async fn search_locations(&self, query: &str) -> Result<Vec<GeoLocation>> {
        let response = self.geocoding_request(query).send().await.map_err(|e| {
            FarmOpsError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(FarmOpsError::DataSourceUnavailable(format!(
                "OpenWeatherMap geocoding returned {}",
                status
            )));
        }

        let results: Vec<OwmGeoResult> = response.json().await.map_err(|e| {
            FarmOpsError::DataSourceUnavailable(format!(
                "Failed to parse geocoding response: {}",
                e
            ))
        })?;

        Ok(results
            .into_iter()
            .map(|r| GeoLocation {
                name: r.name,
                country: r.country,
                state: r.state,
                latitude: r.lat,
                longitude: r.lon,
            })
            .collect())
    }

    /// Geocoding lookup with the free-text query passed through reqwest's
    /// query-string encoding.
    fn geocoding_request(&self, query: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}/direct", GEO_API_BASE_URL))
            .query(&[
                ("q", query),
                ("limit", "5"),
                ("appid", self.config.api_key.as_str()),
            ])
    }

    /// Test connection to the OpenWeatherMap API
    pub async fn test_connection(&self) -> Result<bool> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            API_BASE_URL, self.latitude, self.longitude, self.config.api_key
        );

        let response =
            self.client.get(&url).send().await.map_err(|e| {
                FarmOpsError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e))
            })?;

        Ok(response.status().is_success())
    }
}

fn convert_response(response: OwmForecastResponse) -> WeatherForecast {
    let location = ForecastLocation {
        city: response.city.name,
        country: response.city.country,
        latitude: response.city.coord.lat,
        longitude: response.city.coord.lon,
    };

    let intervals: Vec<ForecastInterval> =
        response.list.iter().map(convert_forecast_item).collect();

    WeatherForecast {
        fetched_at: Utc::now(),
        location,
        timezone_offset_seconds: response.city.timezone,
        intervals,
    }
}

fn convert_forecast_item(item: &OwmForecastItem) -> ForecastInterval {
    let timestamp = DateTime::from_timestamp(item.dt, 0).unwrap_or_else(Utc::now);

    let condition = item
        .weather
        .first()
        .map(|w| WeatherCondition::from_owm_id(w.id))
        .unwrap_or_default();

    // Combine rain and snow precipitation
    let rain_mm = item.rain.as_ref().map(|r| r.three_hour).unwrap_or(0.0);
    let snow_mm = item.snow.as_ref().map(|s| s.three_hour).unwrap_or(0.0);
    let precipitation_mm = rain_mm + snow_mm;

    ForecastInterval {
        timestamp,
        temp_c: item.main.temp,
        feels_like_c: item.main.feels_like,
        humidity_percent: item.main.humidity,
        wind_speed_ms: item.wind.speed,
        wind_direction_deg: item.wind.deg,
        wind_gust_ms: item.wind.gust,
        precipitation_prob: item.pop,
        precipitation_mm,
        cloud_cover_percent: item.clouds.all,
        condition,
    }
}

fn convert_current(response: OwmCurrentResponse) -> CurrentConditions {
    let condition = response
        .weather
        .first()
        .map(|w| WeatherCondition::from_owm_id(w.id))
        .unwrap_or_default();

    CurrentConditions {
        timestamp: DateTime::from_timestamp(response.dt, 0).unwrap_or_else(Utc::now),
        temp_c: response.main.temp,
        feels_like_c: response.main.feels_like,
        humidity_percent: response.main.humidity,
        wind_speed_ms: response.wind.speed,
        wind_direction_deg: response.wind.deg,
        condition,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> OpenWeatherMapConfig {
        OpenWeatherMapConfig {
            api_key: "test_key".to_string(),
            enabled: true,
        }
    }

    #[test]
    fn client_creation() {
        let client = OpenWeatherMapClient::new(sample_config(), 41.5868, -93.6250);
        assert!(client.config.enabled);
    }

    #[test]
    fn forecast_response_parses_and_converts() {
        let body = r#"{
            "list": [{
                "dt": 1749204000,
                "main": {"temp": 18.3, "feels_like": 17.9, "humidity": 52},
                "weather": [{"id": 800, "main": "Clear", "description": "clear sky"}],
                "clouds": {"all": 5},
                "wind": {"speed": 2.4, "deg": 210, "gust": 4.1},
                "pop": 0.04,
                "rain": {"3h": 0.2}
            }],
            "city": {
                "name": "Des Moines",
                "country": "US",
                "coord": {"lat": 41.5868, "lon": -93.625},
                "timezone": -18000
            }
        }"#;

        let response: OwmForecastResponse = serde_json::from_str(body).unwrap();
        let forecast = convert_response(response);

        assert_eq!(forecast.location.city, "Des Moines");
        assert_eq!(forecast.timezone_offset_seconds, -18000);
        assert_eq!(forecast.intervals.len(), 1);

        let interval = &forecast.intervals[0];
        assert!((interval.wind_speed_ms - 2.4).abs() < f64::EPSILON);
        assert!((interval.wind_direction_deg - 210.0).abs() < f64::EPSILON);
        assert!((interval.precipitation_prob - 0.04).abs() < f64::EPSILON);
        assert!((interval.precipitation_mm - 0.2).abs() < f64::EPSILON);
        assert_eq!(interval.condition, WeatherCondition::Clear);
    }

    #[test]
    fn missing_optional_fields_default() {
        let body = r#"{
            "dt": 1749204000,
            "main": {"temp": 18.3, "feels_like": 17.9, "humidity": 52},
            "weather": [],
            "clouds": {"all": 5},
            "wind": {"speed": 2.4}
        }"#;

        let item: OwmForecastItem = serde_json::from_str(body).unwrap();
        let interval = convert_forecast_item(&item);

        assert!((interval.precipitation_prob - 0.0).abs() < f64::EPSILON);
        assert!((interval.wind_direction_deg - 0.0).abs() < f64::EPSILON);
        assert!(interval.wind_gust_ms.is_none());
        assert_eq!(interval.condition, WeatherCondition::default());
    }

    #[test]
    fn geocoding_request_encodes_the_query() {
        let client = OpenWeatherMapClient::new(sample_config(), 41.5868, -93.6250);
        let request = client.geocoding_request("Ames, IA").build().unwrap();

        let url = request.url();
        assert!(url.path().ends_with("/geo/1.0/direct"));
        let query = url.query().unwrap();
        assert!(query.contains("q=Ames%2C+IA"), "query was {}", query);
        assert!(query.contains("limit=5"));
        assert!(query.contains("appid=test_key"));
    }
}
