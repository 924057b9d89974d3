use crate::models::{FarmProfile, SprayType};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Name,
    Latitude,
    Longitude,
    Area,
    DefaultSprayType,
}

impl SettingsField {
    pub fn all() -> &'static [SettingsField] {
        &[
            SettingsField::Name,
            SettingsField::Latitude,
            SettingsField::Longitude,
            SettingsField::Area,
            SettingsField::DefaultSprayType,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SettingsField::Name => "Farm Name",
            SettingsField::Latitude => "Latitude",
            SettingsField::Longitude => "Longitude",
            SettingsField::Area => "Area (ha)",
            SettingsField::DefaultSprayType => "Default Spray Type",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            SettingsField::Name => SettingsField::Latitude,
            SettingsField::Latitude => SettingsField::Longitude,
            SettingsField::Longitude => SettingsField::Area,
            SettingsField::Area => SettingsField::DefaultSprayType,
            SettingsField::DefaultSprayType => SettingsField::Name,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            SettingsField::Name => SettingsField::DefaultSprayType,
            SettingsField::Latitude => SettingsField::Name,
            SettingsField::Longitude => SettingsField::Latitude,
            SettingsField::Area => SettingsField::Longitude,
            SettingsField::DefaultSprayType => SettingsField::Area,
        }
    }
}

pub struct SettingsScreen<'a> {
    pub profile: &'a FarmProfile,
    pub focused_field: SettingsField,
    pub editing: bool,
    pub edit_buffer: String,
    pub status_message: Option<String>,
}

impl<'a> SettingsScreen<'a> {
    pub fn new(profile: &'a FarmProfile) -> Self {
        Self {
            profile,
            focused_field: SettingsField::Name,
            editing: false,
            edit_buffer: String::new(),
            status_message: None,
        }
    }

    pub fn with_focus(mut self, field: SettingsField) -> Self {
        self.focused_field = field;
        self
    }

    pub fn editing(mut self, editing: bool, buffer: &str) -> Self {
        self.editing = editing;
        self.edit_buffer = buffer.to_string();
        self
    }

    pub fn with_status(mut self, message: Option<String>) -> Self {
        self.status_message = message;
        self
    }

    fn get_field_value(&self, field: SettingsField) -> String {
        match field {
            SettingsField::Name => self.profile.name.clone(),
            SettingsField::Latitude => format!("{:.4}", self.profile.latitude),
            SettingsField::Longitude => format!("{:.4}", self.profile.longitude),
            SettingsField::Area => self
                .profile
                .area_hectares
                .map(|a| format!("{:.1}", a))
                .unwrap_or_else(|| "Not set".to_string()),
            SettingsField::DefaultSprayType => {
                self.profile.default_spray_type.as_str().to_string()
            }
        }
    }
}

impl Widget for SettingsScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(17),   // Form (5 fields * 3 lines + borders)
                Constraint::Length(4), // Help
                Constraint::Length(1), // Status
                Constraint::Length(1), // Nav
            ])
            .split(area);

        // Title
        let title = Line::from(vec![
            Span::styled("Settings", Theme::title()),
            Span::styled(" - Farm Profile", Theme::dim()),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        // Form
        self.render_form(chunks[1], buf);

        // Help
        self.render_help(chunks[2], buf);

        // Status
        if let Some(ref message) = self.status_message {
            Paragraph::new(Span::styled(message.as_str(), Theme::highlight()))
                .render(chunks[3], buf);
        }

        // Navigation
        let nav = Line::from(vec![
            Span::styled("[↑↓]", Theme::nav_key()),
            Span::styled("Navigate ", Theme::nav_label()),
            Span::styled("[Enter]", Theme::nav_key()),
            Span::styled("Edit ", Theme::nav_label()),
            Span::styled("[Esc]", Theme::nav_key()),
            Span::styled("Cancel/Back ", Theme::nav_label()),
            Span::styled("[Ctrl+S]", Theme::nav_key()),
            Span::styled("Save", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(chunks[4], buf);
    }
}

impl SettingsScreen<'_> {
    fn render_form(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Farm Profile")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let field_height = 3;
        let constraints: Vec<Constraint> = SettingsField::all()
            .iter()
            .map(|_| Constraint::Length(field_height))
            .collect();

        let field_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        for (i, field) in SettingsField::all().iter().enumerate() {
            let is_focused = *field == self.focused_field;

            let value = if is_focused && self.editing {
                format!("{}_", self.edit_buffer)
            } else {
                self.get_field_value(*field)
            };

            let border_style = if is_focused {
                Theme::border_focused()
            } else {
                Theme::border()
            };

            let value_style = if is_focused && self.editing {
                Theme::highlight()
            } else if is_focused {
                Theme::selected()
            } else {
                Theme::normal()
            };

            let field_block = Block::default()
                .title(field.label())
                .borders(Borders::ALL)
                .border_style(border_style);

            let field_inner = field_block.inner(field_areas[i]);
            field_block.render(field_areas[i], buf);

            let para = Paragraph::new(Span::styled(value, value_style));
            para.render(field_inner, buf);
        }
    }

    fn render_help(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Field Help")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let help_text = match self.focused_field {
            SettingsField::Name => "Display name shown on the dashboard header",
            SettingsField::Latitude => {
                "Decimal degrees, north positive (e.g., 41.5868). Used for forecast lookups"
            }
            SettingsField::Longitude => {
                "Decimal degrees, east positive (e.g., -93.6250). Used for forecast lookups"
            }
            SettingsField::Area => "Total managed area in hectares. Leave blank to clear",
            SettingsField::DefaultSprayType => "Options: herbicide, fungicide, insecticide",
        };

        let para = Paragraph::new(Span::styled(help_text, Theme::dim()));
        para.render(inner, buf);
    }
}

/// Apply an edit buffer back onto the profile, validating as it goes.
pub fn apply_field_edit(
    profile: &mut FarmProfile,
    field: SettingsField,
    value: &str,
) -> std::result::Result<(), String> {
    let value = value.trim();
    match field {
        SettingsField::Name => {
            if value.is_empty() {
                return Err("Name cannot be empty".to_string());
            }
            profile.name = value.to_string();
        }
        SettingsField::Latitude => {
            let lat: f64 = value.parse().map_err(|_| "Invalid latitude".to_string())?;
            if !(-90.0..=90.0).contains(&lat) {
                return Err("Latitude must be between -90 and 90".to_string());
            }
            profile.latitude = lat;
        }
        SettingsField::Longitude => {
            let lon: f64 = value.parse().map_err(|_| "Invalid longitude".to_string())?;
            if !(-180.0..=180.0).contains(&lon) {
                return Err("Longitude must be between -180 and 180".to_string());
            }
            profile.longitude = lon;
        }
        SettingsField::Area => {
            if value.is_empty() {
                profile.area_hectares = None;
            } else {
                let area: f64 = value.parse().map_err(|_| "Invalid area".to_string())?;
                profile.area_hectares = Some(area);
            }
        }
        SettingsField::DefaultSprayType => {
            let spray_type =
                SprayType::from_str(value).ok_or_else(|| "Unknown spray type".to_string())?;
            profile.default_spray_type = spray_type;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_cycle_wraps_around() {
        let mut field = SettingsField::Name;
        for _ in 0..SettingsField::all().len() {
            field = field.next();
        }
        assert_eq!(field, SettingsField::Name);
        assert_eq!(SettingsField::Name.prev(), SettingsField::DefaultSprayType);
    }

    #[test]
    fn edit_validates_coordinate_ranges() {
        let mut profile = FarmProfile::default();
        assert!(apply_field_edit(&mut profile, SettingsField::Latitude, "95").is_err());
        assert!(apply_field_edit(&mut profile, SettingsField::Longitude, "-181").is_err());

        apply_field_edit(&mut profile, SettingsField::Latitude, "52.37").unwrap();
        assert_eq!(profile.latitude, 52.37);
    }

    #[test]
    fn edit_clears_area_on_blank() {
        let mut profile = FarmProfile::default().with_area(4.0);
        apply_field_edit(&mut profile, SettingsField::Area, "").unwrap();
        assert!(profile.area_hectares.is_none());
    }

    #[test]
    fn edit_parses_spray_type_labels() {
        let mut profile = FarmProfile::default();
        apply_field_edit(&mut profile, SettingsField::DefaultSprayType, "fungicide").unwrap();
        assert_eq!(profile.default_spray_type, SprayType::Fungicide);
        assert!(apply_field_edit(&mut profile, SettingsField::DefaultSprayType, "paint").is_err());
    }
}
