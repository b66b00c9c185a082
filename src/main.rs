mod app;
mod cache;
mod cli;
mod config;
mod datasources;
mod db;
mod error;
mod logic;
mod models;
mod ui;

use anyhow::Context;
use app::{App, Screen};
use chrono::{Datelike, Local, Utc};
use clap::Parser;
use cli::{Cli, Commands, SuggestArgs};
use config::Config;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use datasources::NominatimClient;
use db::{Database, MAX_RECENT_LOCATIONS};
use logic::{ActiveSeasons, Catalog, CropAdvisor, WeatherService};
use models::{CropSuggestion, CurrentConditions, DataMode, Location};
use ratatui::{backend::CrosstermBackend, Terminal};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use ui::screens::{CropsScreen, DashboardScreen, LocationsScreen};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // The TUI owns the terminal, so its logs go to a file.
    let log_file = match cli.command {
        None => Some(Config::log_path(cli.data_dir.as_ref())?),
        Some(_) => None,
    };
    init_logging(cli.verbose, log_file)?;

    match cli.command {
        Some(Commands::Init) => run_init(),
        Some(Commands::Check) => run_check(&cli).await,
        Some(Commands::Suggest(ref args)) => run_suggest(&cli, args).await,
        Some(Commands::Search { ref query }) => run_search(&cli, query).await,
        Some(Commands::Locations { clear }) => run_locations(&cli, clear),
        None => run_tui(&cli).await,
    }
}

fn init_logging(verbose: u8, log_file: Option<PathBuf>) -> anyhow::Result<()> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("warn,kisaan=debug"),
        _ => EnvFilter::new("kisaan=trace,info"),
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }

    Ok(())
}

fn build_advisor(config: &Config) -> anyhow::Result<CropAdvisor> {
    let catalog = Catalog::load(config.advisor.catalog_path.as_deref())
        .context("Failed to load crop catalog")?;
    if catalog.is_empty() {
        tracing::warn!("Crop catalog is empty, no crops will be suggested");
    }
    Ok(CropAdvisor::new(catalog).with_policy(config.advisor.policy()))
}

fn open_database(cli: &Cli) -> anyhow::Result<Database> {
    let path = Config::db_path(cli.data_dir.as_ref())?;
    Database::open(&path).with_context(|| format!("Failed to open database {}", path.display()))
}

fn run_init() -> anyhow::Result<()> {
    let (config, path) = Config::setup_interactive()?;
    println!(
        "Kisaan is set up for {} ({} data).",
        config.location.name,
        config.data.mode.as_str()
    );
    println!("Edit {} to change it later.", path.display());
    Ok(())
}

async fn run_check(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.clone()).context("Failed to load configuration")?;
    println!("Configuration: OK");

    let advisor = build_advisor(&config)?;
    println!("Crop catalog: {} crops", advisor.catalog().len());
    let policy = advisor.policy();
    println!(
        "Ranking: top {} crops at {}% confidence or more",
        policy.max_suggestions, policy.inclusion_threshold
    );

    let service = WeatherService::new(&config);
    let location = config.location.to_location();
    println!("Testing connections from {}...", location.name);
    let status = service.check_connections(&location).await;

    let label = |configured: bool, ok: bool| match (configured, ok) {
        (false, _) => "not configured",
        (true, true) => "OK",
        (true, false) => "OFFLINE",
    };
    println!(
        "  OpenWeatherMap: {}",
        label(config.openweathermap_key().is_some(), status.openweathermap)
    );
    println!(
        "  WeatherAPI:     {}",
        label(config.weatherapi_key().is_some(), status.weatherapi)
    );
    println!(
        "  Open-Meteo:     {}",
        label(config.openmeteo.enabled, status.openmeteo)
    );
    println!("  Nominatim:      {}", label(true, status.nominatim));

    if status.all_connected() {
        println!("All services reachable.");
    } else if !status.any_connected() {
        println!("No services reachable. Check your network connection.");
    } else if !status.weather_connected() {
        println!("No live weather provider reachable. Mock data will be shown.");
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestOutput<'a> {
    location: &'a Location,
    month: u32,
    data_source: DataMode,
    reliability_score: u8,
    conditions: CurrentConditions,
    suggestions: &'a [CropSuggestion],
}

async fn run_suggest(cli: &Cli, args: &SuggestArgs) -> anyhow::Result<()> {
    let mut config = Config::load_or_default(cli.config.clone())?;
    if args.mock {
        config.data.mode = DataMode::Mock;
    }

    let advisor = build_advisor(&config)?;
    let mut service = WeatherService::new(&config);

    let location = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) if config.data.mode == DataMode::Mock => Location::new("", lat, lon),
        (Some(lat), Some(lon)) => Location::new(service.reverse_geocode(lat, lon).await, lat, lon),
        _ => config.location.to_location(),
    };

    let outcome = service.report(&location).await;
    if let Some(notice) = &outcome.notice {
        eprintln!("{}", notice);
    }

    let month = args.month.unwrap_or_else(|| Local::now().month());
    let report = outcome.report;
    let conditions = report.current.conditions();
    let suggestions = advisor.suggest(&conditions, month);

    if args.json {
        let output = SuggestOutput {
            location: &report.current.location,
            month,
            data_source: report.origin,
            reliability_score: report.reliability_score,
            conditions,
            suggestions: &suggestions,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let seasons: Vec<&str> = ActiveSeasons::for_month(month)
        .active()
        .iter()
        .map(|s| s.as_str())
        .collect();
    println!(
        "Crop suggestions for {} (month {}: {})",
        report.current.location.name,
        month,
        seasons.join(" + ")
    );
    println!(
        "Temp {:.0}°C | Humidity {:.0}% | Rain chance {:.0}% | Soil moisture {:.0}% [{}]",
        conditions.temperature_c,
        conditions.humidity_pct,
        conditions.precipitation_probability_pct,
        conditions.soil_moisture_pct,
        report.origin.as_str()
    );
    println!();

    if suggestions.is_empty() {
        println!("No Crop Suggestions Available");
        return Ok(());
    }

    println!(
        "{:>2}  {:<30} {:<10} {:>5}  {}",
        "#", "Crop", "Tier", "Conf", "Season"
    );
    for (i, crop) in suggestions.iter().enumerate() {
        println!(
            "{:>2}  {:<30} {:<10} {:>4}%  {}",
            i + 1,
            crop.name,
            crop.suitability.as_str(),
            crop.confidence,
            crop.season
        );
    }
    Ok(())
}

async fn run_search(cli: &Cli, query: &str) -> anyhow::Result<()> {
    let config = Config::load_or_default(cli.config.clone())?;
    let client = NominatimClient::new(config.nominatim.clone());

    let results = client.search(query).await.context("Location search failed")?;
    if results.is_empty() {
        println!("No places in India match '{}'.", query);
        return Ok(());
    }

    for place in results {
        println!("{}", place.display_name);
        println!("    {:.4}, {:.4} [{}]", place.lat, place.lon, place.kind);
    }
    Ok(())
}

fn run_locations(cli: &Cli, clear: bool) -> anyhow::Result<()> {
    let db = open_database(cli)?;
    if clear {
        let removed = db.forget_locations()?;
        println!("Forgot {} recent location(s).", removed);
        return Ok(());
    }

    let recent = db.recent_locations(MAX_RECENT_LOCATIONS)?;

    if recent.is_empty() {
        println!("No recent locations. Pick one from the Locations screen in the TUI.");
        return Ok(());
    }

    for entry in recent {
        println!(
            "{}  {:<40} {:.4}, {:.4}",
            entry.used_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            entry.location.name,
            entry.location.lat,
            entry.location.lon
        );
    }
    Ok(())
}

async fn run_tui(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load_or_default(cli.config.clone())?;
    let db = open_database(cli)?;
    let advisor = build_advisor(&config)?;

    let mut app = App::new(&config, db, advisor)?;
    let mut weather = WeatherService::new(&config);
    weather.set_mode(app.mode);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &mut weather).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    weather: &mut WeatherService,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| {
            let area = f.area();

            match app.screen {
                Screen::Dashboard => {
                    let screen = DashboardScreen::new(&app.location, app.mode, app.report.as_ref())
                        .with_status(app.status_message.as_deref());
                    f.render_widget(screen, area);
                }
                Screen::Crops => {
                    let screen = CropsScreen::new(&app.suggestions, app.month)
                        .with_selection(app.crops_state.selected_index);
                    f.render_widget(screen, area);
                }
                Screen::Locations => {
                    let screen = LocationsScreen::new(&app.locations_state, &app.location);
                    f.render_widget(screen, area);
                }
            }
        })?;

        // Handle input with timeout for async operations
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, weather, key.code, key.modifiers);
                }
            }
        }

        if app.needs_refresh {
            refresh(app, weather).await;
        }

        if let Some(query) = app.pending_search.take() {
            match weather.search(&query).await {
                Ok(results) => app.set_search_results(results),
                Err(e) => {
                    tracing::warn!("Location search failed: {}", e);
                    app.locations_state.searching = false;
                    app.set_status(&format!("Search failed: {}", e));
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

async fn refresh(app: &mut App, weather: &mut WeatherService) {
    app.needs_refresh = false;
    weather.set_mode(app.mode);

    let outcome = weather.report(&app.location).await;
    let month = outcome
        .report
        .current
        .observed_at
        .with_timezone(&Local)
        .month();
    app.apply_report(outcome.report, month);

    match outcome.notice {
        Some(notice) => app.set_status(&notice),
        None if outcome.from_cache => app.set_status("Showing cached data"),
        None => app.set_status("Data refreshed"),
    }
}

fn handle_key(app: &mut App, weather: &mut WeatherService, code: KeyCode, modifiers: KeyModifiers) {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    if app.is_editing() {
        handle_search_input(app, code);
        return;
    }

    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => app.switch_screen(Screen::Dashboard),
        KeyCode::Char('r') => {
            weather.invalidate(&app.location);
            app.request_refresh();
        }
        KeyCode::Char('m') => match app.toggle_mode() {
            Ok(mode) => app.set_status(&format!("Switched to {}", mode.as_str())),
            Err(e) => app.set_status(&format!("Failed to save data mode: {}", e)),
        },
        KeyCode::Char(c) => match Screen::from_key(c) {
            Some(screen) => app.switch_screen(screen),
            None => handle_screen_input(app, code),
        },
        _ => handle_screen_input(app, code),
    }
}

fn handle_screen_input(app: &mut App, code: KeyCode) {
    match app.screen {
        Screen::Dashboard => {}
        Screen::Crops => handle_crops_input(app, code),
        Screen::Locations => handle_locations_input(app, code),
    }
}

fn handle_crops_input(app: &mut App, code: KeyCode) {
    let count = app.suggestions.len();
    match code {
        KeyCode::Up | KeyCode::Char('k') => app.crops_state.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.crops_state.next(count),
        _ => {}
    }
}

fn handle_locations_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('/') => app.locations_state.start_editing(),
        KeyCode::Up | KeyCode::Char('k') => app.locations_state.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.locations_state.next(),
        KeyCode::Enter => {
            if let Err(e) = app.select_highlighted_location(Utc::now()) {
                tracing::warn!("Failed to select location: {}", e);
                app.set_status(&format!("Failed to select location: {}", e));
            }
        }
        _ => {}
    }
}

fn handle_search_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.locations_state.cancel_editing(),
        KeyCode::Enter => app.submit_search(),
        KeyCode::Backspace => {
            app.locations_state.input.pop();
        }
        KeyCode::Char(c) => app.locations_state.input.push(c),
        _ => {}
    }
}
