use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::logic;
use crate::models::{
    CurrentConditions, DayTimeline, FarmProfile, FieldOperation, OperationType, SprayAnalysis,
    SprayType, SprayWindow, WeatherForecast,
};
use crate::ui::screens::{OperationForm, SettingsField};

const SPRAY_TYPE_KEY: &str = "spray_type";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Schedule,
    Windows,
    Operations,
    Settings,
}

impl Screen {
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Screen::Dashboard),
            '2' => Some(Screen::Schedule),
            '3' => Some(Screen::Windows),
            '4' => Some(Screen::Operations),
            's' | 'S' => Some(Screen::Settings),
            _ => None,
        }
    }
}

pub struct ScheduleState {
    pub selected: Option<(usize, usize)>,
}

impl ScheduleState {
    pub fn new() -> Self {
        Self { selected: None }
    }

    /// Select the first interval of the first non-empty day if nothing is
    /// selected yet.
    pub fn ensure_selection(&mut self, timeline: &[DayTimeline]) {
        if self.selected.is_none() {
            self.selected = timeline
                .iter()
                .position(|day| !day.intervals.is_empty())
                .map(|day| (day, 0));
        }
    }

    pub fn next_interval(&mut self, timeline: &[DayTimeline]) {
        if let Some((day, interval)) = self.selected {
            let max = timeline.get(day).map(|d| d.intervals.len()).unwrap_or(0);
            if max > 0 && interval < max - 1 {
                self.selected = Some((day, interval + 1));
            }
        }
    }

    pub fn prev_interval(&mut self) {
        if let Some((day, interval)) = self.selected {
            if interval > 0 {
                self.selected = Some((day, interval - 1));
            }
        }
    }

    pub fn next_day(&mut self, timeline: &[DayTimeline]) {
        if let Some((day, interval)) = self.selected {
            if day + 1 < timeline.len() {
                let max = timeline[day + 1].intervals.len();
                self.selected = Some((day + 1, interval.min(max.saturating_sub(1))));
            }
        }
    }

    pub fn prev_day(&mut self, timeline: &[DayTimeline]) {
        if let Some((day, interval)) = self.selected {
            if day > 0 {
                let max = timeline[day - 1].intervals.len();
                self.selected = Some((day - 1, interval.min(max.saturating_sub(1))));
            }
        }
    }

    fn clamp(&mut self, timeline: &[DayTimeline]) {
        if let Some((day, interval)) = self.selected {
            let valid = timeline
                .get(day)
                .map(|d| interval < d.intervals.len())
                .unwrap_or(false);
            if !valid {
                self.selected = None;
            }
        }
        self.ensure_selection(timeline);
    }
}

pub struct WindowsState {
    pub selected_index: usize,
}

impl WindowsState {
    pub fn new() -> Self {
        Self { selected_index: 0 }
    }

    pub fn next(&mut self, max: usize) {
        if max > 0 && self.selected_index < max - 1 {
            self.selected_index += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    fn clamp(&mut self, max: usize) {
        self.selected_index = self.selected_index.min(max.saturating_sub(1));
    }
}

pub struct OperationsState {
    pub selected_index: usize,
    pub filter_type: Option<OperationType>,
    pub form: Option<OperationForm>,
}

impl OperationsState {
    pub fn new() -> Self {
        Self {
            selected_index: 0,
            filter_type: None,
            form: None,
        }
    }

    pub fn next(&mut self, max: usize) {
        if max > 0 && self.selected_index < max - 1 {
            self.selected_index += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn cycle_filter(&mut self) {
        let all = OperationType::all();
        self.filter_type = match self.filter_type {
            None => all.first().copied(),
            Some(current) => {
                let idx = all.iter().position(|t| *t == current).unwrap_or(all.len());
                all.get(idx + 1).copied()
            }
        };
        self.selected_index = 0;
    }
}

pub struct SettingsState {
    pub focused_field: SettingsField,
    pub editing: bool,
    pub edit_buffer: String,
}

impl SettingsState {
    pub fn new() -> Self {
        Self {
            focused_field: SettingsField::Name,
            editing: false,
            edit_buffer: String::new(),
        }
    }

    pub fn next_field(&mut self) {
        self.focused_field = self.focused_field.next();
    }

    pub fn prev_field(&mut self) {
        self.focused_field = self.focused_field.prev();
    }

    pub fn start_editing(&mut self, current_value: &str) {
        self.editing = true;
        self.edit_buffer = current_value.to_string();
    }

    pub fn cancel_editing(&mut self) {
        self.editing = false;
        self.edit_buffer.clear();
    }

    pub fn finish_editing(&mut self) -> String {
        self.editing = false;
        std::mem::take(&mut self.edit_buffer)
    }
}

pub struct App {
    pub screen: Screen,
    pub should_quit: bool,
    pub config: Config,
    pub db: Database,

    // Data
    pub farm_profile: Option<FarmProfile>,
    pub operations: Vec<FieldOperation>,
    pub forecast: Option<WeatherForecast>,
    pub current: Option<CurrentConditions>,
    pub analysis: Option<SprayAnalysis>,
    pub spray_type: SprayType,

    // Screen states
    pub schedule_state: ScheduleState,
    pub windows_state: WindowsState,
    pub operations_state: OperationsState,
    pub settings_state: SettingsState,

    // UI state
    pub status_message: Option<String>,
    pub needs_refresh: bool,
}

impl App {
    pub fn new(config: Config, db: Database) -> Result<Self> {
        // Load farm profile
        let farm_profile = db.get_default_farm_profile()?;

        // Load operation history
        let operations = match &farm_profile {
            Some(p) => db.get_operations_for_profile(p.id.unwrap())?,
            None => Vec::new(),
        };

        // Spray type survives restarts via the settings table
        let spray_type = match db.get_setting(SPRAY_TYPE_KEY)? {
            Some(saved) => SprayType::from_label(&saved),
            None => farm_profile
                .as_ref()
                .map(|p| p.default_spray_type)
                .unwrap_or_else(|| SprayType::from_label(&config.farm.default_spray_type)),
        };

        Ok(Self {
            screen: Screen::Dashboard,
            should_quit: false,
            config,
            db,
            farm_profile,
            operations,
            forecast: None,
            current: None,
            analysis: None,
            spray_type,
            schedule_state: ScheduleState::new(),
            windows_state: WindowsState::new(),
            operations_state: OperationsState::new(),
            settings_state: SettingsState::new(),
            status_message: None,
            needs_refresh: false,
        })
    }

    pub fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    pub fn request_refresh(&mut self) {
        self.needs_refresh = true;
        self.set_status("Refreshing forecast...");
    }

    pub fn update_forecast(&mut self, forecast: WeatherForecast) {
        self.forecast = Some(forecast);
        self.reanalyze();
    }

    pub fn update_current(&mut self, current: Option<CurrentConditions>) {
        self.current = current;
    }

    /// Re-run the window analysis against the stored forecast. Called whenever
    /// the forecast or the active spray type changes.
    pub fn reanalyze(&mut self) {
        if let Some(ref forecast) = self.forecast {
            let analysis = logic::analyze(
                &forecast.intervals,
                self.spray_type,
                forecast.utc_offset(),
            );
            self.schedule_state.clamp(&analysis.timeline);
            self.windows_state.clamp(analysis.recommended_windows.len());
            self.analysis = Some(analysis);
        }
    }

    pub fn cycle_spray_type(&mut self) -> Result<()> {
        self.spray_type = self.spray_type.next();
        self.db.set_setting(SPRAY_TYPE_KEY, self.spray_type.as_str())?;
        self.reanalyze();
        Ok(())
    }

    pub fn selected_window(&self) -> Option<&SprayWindow> {
        self.analysis
            .as_ref()
            .and_then(|a| a.recommended_windows.get(self.windows_state.selected_index))
    }

    /// Operations visible on the log screen after the type filter.
    pub fn visible_operations(&self) -> Vec<&FieldOperation> {
        match self.operations_state.filter_type {
            Some(t) => self
                .operations
                .iter()
                .filter(|o| o.operation_type == t)
                .collect(),
            None => self.operations.iter().collect(),
        }
    }

    pub fn reload_operations(&mut self) -> Result<()> {
        if let Some(ref profile) = self.farm_profile {
            self.operations = self.db.get_operations_for_profile(profile.id.unwrap())?;
        }
        Ok(())
    }

    pub fn add_operation(&mut self, operation: FieldOperation) -> Result<i64> {
        let id = self.db.create_field_operation(&operation)?;
        self.reload_operations()?;
        Ok(id)
    }

    pub fn delete_operation(&mut self, id: i64) -> Result<()> {
        self.db.delete_field_operation(id)?;
        self.reload_operations()?;
        Ok(())
    }

    pub fn save_farm_profile(&mut self, profile: FarmProfile) -> Result<()> {
        if profile.id.is_some() {
            self.db.update_farm_profile(&profile)?;
        } else {
            let id = self.db.create_farm_profile(&profile)?;
            let mut p = profile;
            p.id = Some(id);
            self.farm_profile = Some(p);
            return Ok(());
        }
        self.farm_profile = Some(profile);
        Ok(())
    }

    pub fn create_default_profile(&mut self) -> Result<()> {
        let profile = self.profile_from_config();
        let id = self.db.create_farm_profile(&profile)?;
        let mut p = profile;
        p.id = Some(id);
        self.farm_profile = Some(p);
        Ok(())
    }

    fn profile_from_config(&self) -> FarmProfile {
        let cfg = &self.config.farm;
        let now = chrono::Utc::now();

        FarmProfile {
            id: None,
            name: cfg.name.clone(),
            latitude: cfg.latitude,
            longitude: cfg.longitude,
            area_hectares: cfg.area_hectares,
            default_spray_type: SprayType::from_label(&cfg.default_spray_type),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn recent_operations(&self, count: usize) -> Vec<&FieldOperation> {
        self.operations.iter().take(count).collect()
    }
}
