pub mod analysis;
pub mod farm_profile;
pub mod forecast;
pub mod operation;
pub mod spray;

pub use analysis::*;
pub use farm_profile::*;
pub use forecast::*;
pub use operation::*;
pub use spray::*;
