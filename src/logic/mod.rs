pub mod planner;
pub mod weather_service;

pub use planner::analyze;
pub use weather_service::{ConnectionStatus, WeatherService};
