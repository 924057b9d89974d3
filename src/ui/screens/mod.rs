pub mod dashboard;
pub mod operations;
pub mod schedule;
pub mod settings;
pub mod windows;

pub use dashboard::DashboardScreen;
pub use operations::{OperationField, OperationForm, OperationsScreen};
pub use schedule::ScheduleScreen;
pub use settings::{apply_field_edit, SettingsField, SettingsScreen};
pub use windows::WindowsScreen;
