pub mod gauge;
pub mod input;
pub mod timeline;

pub use gauge::{humidity_gauge, rain_gauge, temperature_gauge, wind_gauge};
pub use input::{InputWidget, SelectWidget};
pub use timeline::{StatusLegend, TimelineWidget};
