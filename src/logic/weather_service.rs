use crate::config::Config;
use crate::datasources::OpenWeatherMapClient;
use crate::error::Result;
use crate::models::{CurrentConditions, WeatherForecast};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Fetches forecasts on demand and holds the latest current conditions.
///
/// Analysis results are derived from the forecast and never persisted,
/// so a refresh is always followed by a re-analysis.
pub struct WeatherService {
    openweathermap_client: Option<OpenWeatherMapClient>,
    current_conditions: Arc<RwLock<Option<CurrentConditions>>>,
}

impl WeatherService {
    pub fn new(config: &Config) -> Self {
        // Only create the client if an API key is configured and enabled
        let openweathermap_client = config
            .openweathermap
            .as_ref()
            .filter(|c| c.enabled && !c.api_key.is_empty())
            .map(|c| {
                tracing::info!("OpenWeatherMap client configured for forecast data");
                OpenWeatherMapClient::new(c.clone(), config.farm.latitude, config.farm.longitude)
            });

        if openweathermap_client.is_none() {
            tracing::warn!("OpenWeatherMap not configured - spray planning will be unavailable");
        }

        Self {
            openweathermap_client,
            current_conditions: Arc::new(RwLock::new(None)),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.openweathermap_client.is_some()
    }

    /// Fetches a fresh forecast and current conditions from the provider.
    ///
    /// Forecast failures propagate since every analysis depends on it; a
    /// current-conditions failure only logs a warning.
    pub async fn refresh(&self) -> Result<Option<WeatherForecast>> {
        if let Some(ref client) = self.openweathermap_client {
            let forecast = client.fetch_forecast().await?;
            tracing::debug!("Weather forecast updated");

            match client.fetch_current().await {
                Ok(conditions) => {
                    let mut current = self.current_conditions.write().await;
                    *current = Some(conditions);
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch current conditions: {}", e);
                }
            }

            Ok(Some(forecast))
        } else {
            Ok(None)
        }
    }

    pub async fn get_current_conditions(&self) -> Option<CurrentConditions> {
        self.current_conditions.read().await.clone()
    }

    pub async fn check_connections(&self) -> ConnectionStatus {
        let mut status = ConnectionStatus::default();

        if let Some(ref client) = self.openweathermap_client {
            status.openweathermap = client.test_connection().await.unwrap_or(false);
        }

        status
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionStatus {
    pub openweathermap: bool,
}
