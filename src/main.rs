mod app;
mod cli;
mod config;
mod datasources;
mod db;
mod error;
mod logic;
mod models;
mod ui;

use app::{App, Screen};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use db::Database;
use error::{FarmOpsError, Result};
use logic::WeatherService;
use models::{SprayAnalysis, SprayType, WeatherForecast};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use ui::screens::{
    apply_field_edit, DashboardScreen, OperationField, OperationForm, OperationsScreen,
    ScheduleScreen, SettingsField, SettingsScreen, WindowsScreen,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Init) => run_init().await,
        Some(Commands::Check) => run_check(&cli).await,
        Some(Commands::Analyze {
            ref spray_type,
            json,
        }) => run_analyze(&cli, spray_type, json).await,
        None => run_tui(&cli).await,
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

async fn run_init() -> Result<()> {
    let (config, path) = Config::setup_interactive().await?;
    println!("Configuration written to {}", path.display());
    println!(
        "Farm: {} ({:.4}, {:.4})",
        config.farm.name, config.farm.latitude, config.farm.longitude
    );
    if config.openweathermap.is_none() {
        println!("No OpenWeatherMap key configured; forecasts stay offline until one is added.");
    }
    Ok(())
}

async fn run_check(cli: &Cli) -> Result<()> {
    let config = match Config::load(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Run `farmops init` to create one.");
            std::process::exit(1);
        }
    };
    println!("Config: OK");
    println!(
        "  Farm: {} ({:.4}, {:.4})",
        config.farm.name, config.farm.latitude, config.farm.longitude
    );

    let db_path = Config::db_path(cli.data_dir.as_ref())?;
    let db = Database::open(&db_path)?;
    println!("Database: OK ({})", db_path.display());
    match db.get_default_farm_profile()? {
        Some(p) => println!("  Profile: {}", p.name),
        None => println!("  Profile: none yet (created on first TUI start)"),
    }

    let service = WeatherService::new(&config);
    let status = service.check_connections().await;
    if status.openweathermap {
        println!("OpenWeatherMap: OK");
    } else if service.is_configured() {
        println!("OpenWeatherMap: UNREACHABLE");
    } else {
        println!("OpenWeatherMap: NOT CONFIGURED");
    }

    Ok(())
}

async fn run_analyze(cli: &Cli, spray_label: &str, json: bool) -> Result<()> {
    let config = match Config::load(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Run `farmops init` to create one.");
            std::process::exit(1);
        }
    };

    let service = WeatherService::new(&config);
    if !service.is_configured() {
        eprintln!("OpenWeatherMap is not configured. Run `farmops init` to add an API key.");
        std::process::exit(1);
    }

    let forecast = match service.refresh().await? {
        Some(f) => f,
        None => {
            eprintln!("No forecast available");
            std::process::exit(1);
        }
    };

    let spray_type = SprayType::from_label(spray_label);
    let analysis = logic::analyze(&forecast.intervals, spray_type, forecast.utc_offset());

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_analysis(&analysis, &forecast);
    }

    Ok(())
}

fn print_analysis(analysis: &SprayAnalysis, forecast: &WeatherForecast) {
    println!(
        "Spray windows for {} near {}",
        analysis.spray_type, forecast.location.city
    );

    if analysis.recommended_windows.is_empty() {
        println!("No sprayable windows in the forecast.");
        return;
    }

    for window in analysis.top_windows(5) {
        println!(
            "  {} {:<9} {}  {}  {}h  wind {:.1}mph  {:.1}°C  rain {}%",
            window.quality.symbol(),
            window.day,
            window.date.format("%m/%d"),
            window.time_range(),
            window.duration_hours,
            window.avg_wind_mph,
            window.avg_temp_c,
            window.rain_chance_percent
        );
    }
}

async fn run_tui(cli: &Cli) -> Result<()> {
    // First run walks through setup instead of failing on a missing config
    let config = if Config::exists(cli.config.as_ref()) {
        match Config::load(cli.config.clone()) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                eprintln!("Fix the file or re-run `farmops init`.");
                std::process::exit(1);
            }
        }
    } else {
        let (config, path) = Config::setup_interactive().await?;
        println!("Configuration written to {}", path.display());
        config
    };

    // Initialize database
    let db_path = Config::db_path(cli.data_dir.as_ref())?;
    let db = Database::open(&db_path)?;

    // Create app
    let mut app = App::new(config.clone(), db)?;

    // Create default profile if none exists
    if app.farm_profile.is_none() {
        app.create_default_profile()?;
        app.set_status("Created farm profile from config - update in Settings");
    }

    // Initialize weather service and fetch initial data
    let service = WeatherService::new(&config);
    if service.is_configured() {
        match service.refresh().await {
            Ok(Some(forecast)) => {
                app.update_current(service.get_current_conditions().await);
                app.update_forecast(forecast);
                app.set_status("Forecast loaded");
            }
            Ok(None) => app.set_status("OpenWeatherMap not configured"),
            Err(e) => {
                tracing::warn!("Initial forecast fetch failed: {}", e);
                app.set_status(&format!("Forecast fetch failed: {}", e));
            }
        }
    } else {
        app.set_status("OpenWeatherMap not configured - run `farmops init` to add a key");
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, &service).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    service: &WeatherService,
) -> Result<()>
where
    FarmOpsError: From<B::Error>,
{
    loop {
        // Keep the schedule cursor on a valid interval
        if let Some(ref analysis) = app.analysis {
            app.schedule_state.ensure_selection(&analysis.timeline);
        }

        // Draw UI
        terminal.draw(|f| {
            let area = f.area();

            match app.screen {
                Screen::Dashboard => {
                    let profile = app.farm_profile.as_ref();
                    let recent = app.recent_operations(5);
                    let recent_vec: Vec<_> = recent.into_iter().cloned().collect();
                    let screen = DashboardScreen::new(
                        profile,
                        app.current.as_ref(),
                        app.analysis.as_ref(),
                        &recent_vec,
                    )
                    .with_status(app.status_message.as_deref());
                    f.render_widget(screen, area);
                }
                Screen::Schedule => {
                    let screen = ScheduleScreen::new(app.analysis.as_ref())
                        .selected(app.schedule_state.selected);
                    f.render_widget(screen, area);
                }
                Screen::Windows => {
                    let screen = WindowsScreen::new(app.analysis.as_ref())
                        .with_selection(app.windows_state.selected_index);
                    f.render_widget(screen, area);
                }
                Screen::Operations => {
                    let screen = OperationsScreen::new(&app.operations)
                        .with_selection(app.operations_state.selected_index)
                        .with_filter(app.operations_state.filter_type)
                        .with_form(app.operations_state.form.as_ref());
                    f.render_widget(screen, area);
                }
                Screen::Settings => {
                    if let Some(ref profile) = app.farm_profile {
                        let screen = SettingsScreen::new(profile)
                            .with_focus(app.settings_state.focused_field)
                            .editing(app.settings_state.editing, &app.settings_state.edit_buffer)
                            .with_status(app.status_message.clone());
                        f.render_widget(screen, area);
                    }
                }
            }
        })?;

        // Handle input with timeout for async operations
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                let editing = text_entry_active(app);
                match key.code {
                    KeyCode::Char('q') if !editing => {
                        app.quit();
                    }
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.quit();
                    }
                    KeyCode::Esc if !editing => {
                        // Go back to dashboard
                        app.switch_screen(Screen::Dashboard);
                    }
                    KeyCode::Char(c) if !editing => {
                        if let Some(screen) = Screen::from_key(c) {
                            app.switch_screen(screen);
                        } else {
                            // Screen-specific key handling
                            handle_screen_input(app, key.code, key.modifiers);
                        }
                    }
                    _ => {
                        handle_screen_input(app, key.code, key.modifiers);
                    }
                }
            }
        }

        // Handle refresh request
        if app.needs_refresh {
            app.needs_refresh = false;
            match service.refresh().await {
                Ok(Some(forecast)) => {
                    app.update_current(service.get_current_conditions().await);
                    app.update_forecast(forecast);
                    app.set_status("Forecast refreshed");
                }
                Ok(None) => app.set_status("OpenWeatherMap not configured"),
                Err(e) => {
                    app.set_status(&format!("Refresh failed: {}", e));
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// True while a screen is consuming raw character input.
fn text_entry_active(app: &App) -> bool {
    app.settings_state.editing || app.operations_state.form.is_some()
}

fn handle_screen_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match app.screen {
        Screen::Dashboard => handle_dashboard_input(app, code),
        Screen::Schedule => handle_schedule_input(app, code),
        Screen::Windows => handle_windows_input(app, code),
        Screen::Operations => handle_operations_input(app, code),
        Screen::Settings => handle_settings_input(app, code, modifiers),
    }
}

fn cycle_spray_type(app: &mut App) {
    match app.cycle_spray_type() {
        Ok(()) => {
            let label = app.spray_type.as_str().to_string();
            app.set_status(&format!("Planning for {}", label));
        }
        Err(e) => app.set_status(&format!("Failed to save spray type: {}", e)),
    }
}

fn handle_dashboard_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('r') => {
            app.request_refresh();
        }
        KeyCode::Char('t') => {
            cycle_spray_type(app);
        }
        _ => {}
    }
}

fn handle_schedule_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Left => app.schedule_state.prev_interval(),
        KeyCode::Right => {
            if let Some(ref analysis) = app.analysis {
                app.schedule_state.next_interval(&analysis.timeline);
            }
        }
        KeyCode::Up => {
            if let Some(ref analysis) = app.analysis {
                app.schedule_state.prev_day(&analysis.timeline);
            }
        }
        KeyCode::Down => {
            if let Some(ref analysis) = app.analysis {
                app.schedule_state.next_day(&analysis.timeline);
            }
        }
        KeyCode::Char('t') => cycle_spray_type(app),
        KeyCode::Char('r') => app.request_refresh(),
        _ => {}
    }
}

fn handle_windows_input(app: &mut App, code: KeyCode) {
    let count = app
        .analysis
        .as_ref()
        .map(|a| a.recommended_windows.len())
        .unwrap_or(0);

    match code {
        KeyCode::Up => app.windows_state.prev(),
        KeyCode::Down => app.windows_state.next(count),
        KeyCode::Char('l') => {
            // Log a spray operation against the selected window
            if let Some(window) = app.selected_window().cloned() {
                let form = OperationForm::for_window(&window, app.spray_type);
                app.operations_state.form = Some(form);
                app.switch_screen(Screen::Operations);
            }
        }
        KeyCode::Char('t') => cycle_spray_type(app),
        KeyCode::Char('r') => app.request_refresh(),
        _ => {}
    }
}

fn handle_operations_input(app: &mut App, code: KeyCode) {
    if app.operations_state.form.is_some() {
        handle_operation_form_input(app, code);
        return;
    }

    let count = app.visible_operations().len();
    match code {
        KeyCode::Up => app.operations_state.prev(),
        KeyCode::Down => app.operations_state.next(count),
        KeyCode::Char('f') => app.operations_state.cycle_filter(),
        KeyCode::Char('a') => {
            app.operations_state.form = Some(OperationForm::new());
        }
        KeyCode::Char('d') => {
            // Delete selected
            let id = app
                .visible_operations()
                .get(app.operations_state.selected_index)
                .and_then(|o| o.id);
            if let Some(id) = id {
                match app.delete_operation(id) {
                    Ok(()) => {
                        let remaining = app.visible_operations().len();
                        app.operations_state.selected_index = app
                            .operations_state
                            .selected_index
                            .min(remaining.saturating_sub(1));
                        app.set_status("Operation deleted");
                    }
                    Err(e) => app.set_status(&format!("Delete failed: {}", e)),
                }
            }
        }
        _ => {}
    }
}

fn handle_operation_form_input(app: &mut App, code: KeyCode) {
    let Some(form) = app.operations_state.form.as_mut() else {
        return;
    };

    match code {
        KeyCode::Esc => {
            app.operations_state.form = None;
        }
        KeyCode::Tab | KeyCode::Down => form.field = form.field.next(),
        KeyCode::BackTab | KeyCode::Up => form.field = form.field.prev(),
        KeyCode::Left if form.field == OperationField::Type => form.cycle_type(false),
        KeyCode::Right if form.field == OperationField::Type => form.cycle_type(true),
        KeyCode::Backspace => {
            if let Some(value) = form.current_value_mut() {
                value.pop();
            }
        }
        KeyCode::Enter => {
            submit_operation_form(app);
        }
        KeyCode::Char(c) => {
            if let Some(value) = form.current_value_mut() {
                value.push(c);
            }
        }
        _ => {}
    }
}

fn submit_operation_form(app: &mut App) {
    let Some(profile_id) = app.farm_profile.as_ref().and_then(|p| p.id) else {
        app.set_status("No farm profile to log against");
        return;
    };

    let built = match app.operations_state.form.as_ref() {
        Some(form) => form.build(profile_id),
        None => return,
    };

    match built {
        Ok(operation) => match app.add_operation(operation) {
            Ok(_) => {
                app.operations_state.form = None;
                app.set_status("Operation logged");
            }
            Err(e) => app.set_status(&format!("Save failed: {}", e)),
        },
        Err(message) => app.set_status(&message),
    }
}

fn handle_settings_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if app.settings_state.editing {
        // Editing mode
        match code {
            KeyCode::Esc => {
                app.settings_state.cancel_editing();
            }
            KeyCode::Enter => {
                let value = app.settings_state.finish_editing();
                let field = app.settings_state.focused_field;
                // Apply the value to the profile
                let applied = match app.farm_profile.as_mut() {
                    Some(profile) => apply_field_edit(profile, field, &value),
                    None => Ok(()),
                };
                match applied {
                    Ok(()) => {
                        // Save the profile (separate borrow scope)
                        if let Some(profile) = app.farm_profile.clone() {
                            match app.save_farm_profile(profile) {
                                Ok(()) => app.set_status("Profile saved"),
                                Err(e) => app.set_status(&format!("Save failed: {}", e)),
                            }
                        }
                    }
                    Err(message) => app.set_status(&message),
                }
            }
            KeyCode::Backspace => {
                app.settings_state.edit_buffer.pop();
            }
            KeyCode::Char(c) => {
                app.settings_state.edit_buffer.push(c);
            }
            _ => {}
        }
    } else {
        // Navigation mode
        match code {
            KeyCode::Up => app.settings_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => app.settings_state.next_field(),
            KeyCode::Enter => {
                // Start editing
                if let Some(ref profile) = app.farm_profile {
                    let current = settings_field_value(profile, app.settings_state.focused_field);
                    app.settings_state.start_editing(&current);
                }
            }
            KeyCode::Char('s') if modifiers.contains(KeyModifiers::CONTROL) => {
                // Save profile
                if let Some(profile) = app.farm_profile.clone() {
                    match app.save_farm_profile(profile) {
                        Ok(()) => app.set_status("Profile saved"),
                        Err(e) => app.set_status(&format!("Save failed: {}", e)),
                    }
                }
            }
            _ => {}
        }
    }
}

fn settings_field_value(profile: &models::FarmProfile, field: SettingsField) -> String {
    match field {
        SettingsField::Name => profile.name.clone(),
        SettingsField::Latitude => profile.latitude.to_string(),
        SettingsField::Longitude => profile.longitude.to_string(),
        SettingsField::Area => profile
            .area_hectares
            .map(|a| a.to_string())
            .unwrap_or_default(),
        SettingsField::DefaultSprayType => profile.default_spray_type.as_str().to_string(),
    }
}
