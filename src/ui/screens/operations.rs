use crate::models::{
    ConditionsSnapshot, FieldOperation, OperationType, SprayType, SprayWindow,
};
use crate::ui::components::{InputWidget, SelectWidget};
use crate::ui::Theme;
use chrono::{Local, NaiveDate};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Widget},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationField {
    Type,
    Product,
    Date,
    Area,
    Cost,
    Notes,
}

impl OperationField {
    pub fn all() -> &'static [OperationField] {
        &[
            OperationField::Type,
            OperationField::Product,
            OperationField::Date,
            OperationField::Area,
            OperationField::Cost,
            OperationField::Notes,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            OperationField::Type => "Type",
            OperationField::Product => "Product",
            OperationField::Date => "Date (YYYY-MM-DD)",
            OperationField::Area => "Area (ha)",
            OperationField::Cost => "Cost",
            OperationField::Notes => "Notes",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            OperationField::Type => OperationField::Product,
            OperationField::Product => OperationField::Date,
            OperationField::Date => OperationField::Area,
            OperationField::Area => OperationField::Cost,
            OperationField::Cost => OperationField::Notes,
            OperationField::Notes => OperationField::Type,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            OperationField::Type => OperationField::Notes,
            OperationField::Product => OperationField::Type,
            OperationField::Date => OperationField::Product,
            OperationField::Area => OperationField::Date,
            OperationField::Cost => OperationField::Area,
            OperationField::Notes => OperationField::Cost,
        }
    }
}

/// Edit state for the add-operation popup, owned by the app and rendered here.
#[derive(Debug, Clone)]
pub struct OperationForm {
    pub field: OperationField,
    pub type_index: usize,
    pub product: String,
    pub date: String,
    pub area: String,
    pub cost: String,
    pub notes: String,
    pub conditions: Option<ConditionsSnapshot>,
}

impl OperationForm {
    pub fn new() -> Self {
        Self {
            field: OperationField::Type,
            type_index: 0,
            product: String::new(),
            date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
            area: String::new(),
            cost: String::new(),
            notes: String::new(),
            conditions: None,
        }
    }

    /// Prefill a spray log entry from a recommended window.
    pub fn for_window(window: &SprayWindow, spray_type: SprayType) -> Self {
        let operation_type = OperationType::from(spray_type);
        let type_index = OperationType::all()
            .iter()
            .position(|t| *t == operation_type)
            .unwrap_or(0);

        Self {
            field: OperationField::Product,
            type_index,
            product: String::new(),
            date: window.date.format("%Y-%m-%d").to_string(),
            area: String::new(),
            cost: String::new(),
            notes: format!("{} window {}", window.quality.as_str(), window.time_range()),
            conditions: Some(ConditionsSnapshot {
                wind_mph: Some(window.avg_wind_mph),
                temp_c: Some(window.avg_temp_c),
                rain_percent: Some(window.rain_chance_percent),
            }),
        }
    }

    pub fn operation_type(&self) -> OperationType {
        OperationType::all()
            .get(self.type_index)
            .copied()
            .unwrap_or(OperationType::Other)
    }

    pub fn current_value_mut(&mut self) -> Option<&mut String> {
        match self.field {
            OperationField::Type => None,
            OperationField::Product => Some(&mut self.product),
            OperationField::Date => Some(&mut self.date),
            OperationField::Area => Some(&mut self.area),
            OperationField::Cost => Some(&mut self.cost),
            OperationField::Notes => Some(&mut self.notes),
        }
    }

    pub fn cycle_type(&mut self, forward: bool) {
        let count = OperationType::all().len();
        self.type_index = if forward {
            (self.type_index + 1) % count
        } else {
            (self.type_index + count - 1) % count
        };
    }

    /// Validate the form and produce an operation ready to insert.
    pub fn build(&self, farm_profile_id: i64) -> std::result::Result<FieldOperation, String> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|_| "Invalid date (use YYYY-MM-DD)".to_string())?;

        let mut operation = FieldOperation::new(farm_profile_id, self.operation_type(), date);

        if !self.product.is_empty() {
            operation = operation.with_product(&self.product);
        }
        if !self.area.is_empty() {
            let area: f64 = self.area.parse().map_err(|_| "Invalid area".to_string())?;
            operation = operation.with_area(area);
        }
        if !self.cost.is_empty() {
            let cost: f64 = self.cost.parse().map_err(|_| "Invalid cost".to_string())?;
            operation = operation.with_cost(cost);
        }
        if !self.notes.is_empty() {
            operation = operation.with_notes(&self.notes);
        }
        // Conditions snapshots are only stored for spray operations; a
        // window prefill retyped to Fertilizer loses its snapshot.
        if let Some(ref conditions) = self.conditions {
            if operation.operation_type.is_spray() {
                operation = operation.with_conditions(conditions.clone());
            }
        }

        Ok(operation)
    }
}

impl Default for OperationForm {
    fn default() -> Self {
        Self::new()
    }
}

pub struct OperationsScreen<'a> {
    pub operations: &'a [FieldOperation],
    pub selected_index: usize,
    pub filter_type: Option<OperationType>,
    pub form: Option<&'a OperationForm>,
}

impl<'a> OperationsScreen<'a> {
    pub fn new(operations: &'a [FieldOperation]) -> Self {
        Self {
            operations,
            selected_index: 0,
            filter_type: None,
            form: None,
        }
    }

    pub fn with_selection(mut self, index: usize) -> Self {
        self.selected_index = index;
        self
    }

    pub fn with_filter(mut self, filter: Option<OperationType>) -> Self {
        self.filter_type = filter;
        self
    }

    pub fn with_form(mut self, form: Option<&'a OperationForm>) -> Self {
        self.form = form;
        self
    }

    fn filtered_operations(&self) -> Vec<&FieldOperation> {
        match self.filter_type {
            Some(t) => self
                .operations
                .iter()
                .filter(|o| o.operation_type == t)
                .collect(),
            None => self.operations.iter().collect(),
        }
    }
}

impl Widget for OperationsScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header + filter
                Constraint::Min(10),   // Table
                Constraint::Length(1), // Nav
            ])
            .split(area);

        self.render_header(chunks[0], buf);
        self.render_table(chunks[1], buf);

        let nav = Line::from(vec![
            Span::styled("[a]", Theme::nav_key()),
            Span::styled("Add ", Theme::nav_label()),
            Span::styled("[d]", Theme::nav_key()),
            Span::styled("Delete ", Theme::nav_label()),
            Span::styled("[f]", Theme::nav_key()),
            Span::styled("Filter ", Theme::nav_label()),
            Span::styled("[↑↓]", Theme::nav_key()),
            Span::styled("Navigate ", Theme::nav_label()),
            Span::styled("[Esc]", Theme::nav_key()),
            Span::styled("Back", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(chunks[2], buf);

        // Add-operation form floats over the table
        if let Some(form) = self.form {
            render_form_popup(form, area, buf);
        }
    }
}

impl OperationsScreen<'_> {
    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let filter_str = match self.filter_type {
            Some(t) => format!("Filter: {}", t.as_str()),
            None => "All Operations".to_string(),
        };

        let count = self.filtered_operations().len();

        let block = Block::default()
            .title(Span::styled("Operations Log", Theme::title()))
            .borders(Borders::BOTTOM)
            .border_style(Theme::border());

        let info = Line::from(vec![
            Span::styled(filter_str, Theme::dim()),
            Span::styled(format!(" ({} records)", count), Theme::dim()),
        ]);

        let para = Paragraph::new(info).block(block);
        para.render(area, buf);
    }

    fn render_table(&self, area: Rect, buf: &mut Buffer) {
        let operations = self.filtered_operations();

        let header_cells = ["Date", "Type", "Product", "Area", "Cost", "Conditions", "Notes"]
            .iter()
            .map(|h| Cell::from(*h).style(Theme::header()));

        let header = Row::new(header_cells).height(1);

        let rows: Vec<Row> = operations
            .iter()
            .enumerate()
            .map(|(i, op)| {
                let style = if i == self.selected_index {
                    Theme::selected()
                } else {
                    Theme::normal()
                };

                let type_style = Style::default().fg(op.operation_type.color());

                let conditions = op
                    .conditions
                    .as_ref()
                    .map(|c| {
                        let wind = c.wind_mph.map(|w| format!("{:.0}mph", w));
                        let temp = c.temp_c.map(|t| format!("{:.0}°C", t));
                        let rain = c.rain_percent.map(|r| format!("{}%", r));
                        [wind, temp, rain]
                            .into_iter()
                            .flatten()
                            .collect::<Vec<_>>()
                            .join(" ")
                    })
                    .unwrap_or_else(|| "-".to_string());

                let cells = vec![
                    Cell::from(op.operation_date.format("%Y-%m-%d").to_string()),
                    Cell::from(op.operation_type.as_str()).style(type_style),
                    Cell::from(op.product.as_deref().unwrap_or("-")),
                    Cell::from(
                        op.area_hectares
                            .map(|a| format!("{:.1}ha", a))
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                    Cell::from(
                        op.cost
                            .map(|c| format!("{:.2}", c))
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                    Cell::from(conditions),
                    Cell::from(
                        op.notes
                            .as_ref()
                            .map(|n| truncate(n, 30))
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                ];

                Row::new(cells).style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(18),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(16),
            Constraint::Min(16),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border()),
            )
            .highlight_style(Theme::selected());

        let mut state = TableState::default();
        state.select(Some(self.selected_index));

        ratatui::widgets::StatefulWidget::render(table, area, buf, &mut state);
    }
}

fn render_form_popup(form: &OperationForm, area: Rect, buf: &mut Buffer) {
    let popup = centered_rect(52, 22, area);
    Clear.render(popup, buf);

    let block = Block::default()
        .title(Span::styled("Log Operation", Theme::title()))
        .borders(Borders::ALL)
        .border_style(Theme::border_focused());

    let inner = block.inner(popup);
    block.render(popup, buf);

    let mut constraints: Vec<Constraint> = OperationField::all()
        .iter()
        .map(|_| Constraint::Length(3))
        .collect();
    constraints.push(Constraint::Length(1));

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let type_options: Vec<&str> = OperationType::all().iter().map(|t| t.as_str()).collect();

    for (i, field) in OperationField::all().iter().enumerate() {
        let focused = *field == form.field;
        match field {
            OperationField::Type => {
                SelectWidget::new(field.label(), &type_options, form.type_index)
                    .focused(focused)
                    .render(rows[i], buf);
            }
            OperationField::Product => {
                InputWidget::new(field.label(), &form.product)
                    .placeholder("e.g. Glyphosate 360")
                    .focused(focused)
                    .render(rows[i], buf);
            }
            OperationField::Date => {
                InputWidget::new(field.label(), &form.date)
                    .focused(focused)
                    .render(rows[i], buf);
            }
            OperationField::Area => {
                InputWidget::new(field.label(), &form.area)
                    .placeholder("optional")
                    .focused(focused)
                    .render(rows[i], buf);
            }
            OperationField::Cost => {
                InputWidget::new(field.label(), &form.cost)
                    .placeholder("optional")
                    .focused(focused)
                    .render(rows[i], buf);
            }
            OperationField::Notes => {
                InputWidget::new(field.label(), &form.notes)
                    .focused(focused)
                    .render(rows[i], buf);
            }
        }
    }

    let hint = Line::from(vec![
        Span::styled("[Tab/↑↓]", Theme::nav_key()),
        Span::styled(" Field  ", Theme::nav_label()),
        Span::styled("[Enter]", Theme::nav_key()),
        Span::styled(" Save  ", Theme::nav_label()),
        Span::styled("[Esc]", Theme::nav_key()),
        Span::styled(" Cancel", Theme::nav_label()),
    ]);
    Paragraph::new(hint).render(rows[OperationField::all().len()], buf);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let width = r.width * percent_x / 100;
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width,
        height: height.min(r.height),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SprayStatus;
    use chrono::FixedOffset;

    #[test]
    fn operation_field_cycle_wraps() {
        let mut field = OperationField::Type;
        for _ in 0..OperationField::all().len() {
            field = field.next();
        }
        assert_eq!(field, OperationField::Type);
        assert_eq!(OperationField::Type.prev(), OperationField::Notes);
    }

    #[test]
    fn form_build_validates_date() {
        let mut form = OperationForm::new();
        form.date = "not-a-date".to_string();
        assert!(form.build(1).is_err());

        form.date = "2025-06-06".to_string();
        let operation = form.build(1).unwrap();
        assert_eq!(
            operation.operation_date,
            NaiveDate::from_ymd_opt(2025, 6, 6).unwrap()
        );
        assert!(operation.product.is_none());
    }

    #[test]
    fn form_build_parses_numbers() {
        let mut form = OperationForm::new();
        form.area = "12.5".to_string();
        form.cost = "abc".to_string();
        assert!(form.build(1).is_err());

        form.cost = "184".to_string();
        let operation = form.build(1).unwrap();
        assert_eq!(operation.area_hectares, Some(12.5));
        assert_eq!(operation.cost, Some(184.0));
    }

    #[test]
    fn form_for_window_prefills_spray_details() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let start = chrono::TimeZone::with_ymd_and_hms(&offset, 2025, 6, 6, 9, 0, 0).unwrap();
        let window = SprayWindow {
            day: "Friday".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
            start,
            end: start + chrono::Duration::hours(6),
            duration_hours: 6,
            quality: SprayStatus::Perfect,
            avg_wind_mph: 4.5,
            avg_temp_c: 18.0,
            rain_chance_percent: 2,
        };

        let form = OperationForm::for_window(&window, SprayType::Fungicide);
        assert_eq!(form.operation_type(), OperationType::Fungicide);
        assert_eq!(form.date, "2025-06-06");
        assert!(form.notes.contains("Perfect"));

        let operation = form.build(1).unwrap();
        let conditions = operation.conditions.unwrap();
        assert_eq!(conditions.rain_percent, Some(2));
    }

    #[test]
    fn form_drops_conditions_for_non_spray_types() {
        let mut form = OperationForm::new();
        form.conditions = Some(ConditionsSnapshot {
            wind_mph: Some(4.5),
            temp_c: Some(18.0),
            rain_percent: Some(2),
        });
        form.type_index = OperationType::all()
            .iter()
            .position(|t| *t == OperationType::Fertilizer)
            .unwrap();

        let operation = form.build(1).unwrap();
        assert!(operation.conditions.is_none());
    }
}
