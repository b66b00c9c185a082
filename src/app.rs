use crate::config::Config;
use crate::db::{Database, RecentLocation, MAX_RECENT_LOCATIONS};
use crate::error::Result;
use crate::logic::CropAdvisor;
use crate::models::{ConsolidatedReport, CropSuggestion, DataMode, Location, PlaceMatch};
use chrono::{DateTime, Datelike, Local, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Crops,
    Locations,
}

impl Screen {
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Screen::Dashboard),
            '2' => Some(Screen::Crops),
            '3' => Some(Screen::Locations),
            _ => None,
        }
    }
}

pub struct CropsState {
    pub selected_index: usize,
}

impl CropsState {
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

    fn clamp(&mut self, len: usize) {
        self.selected_index = self.selected_index.min(len.saturating_sub(1));
    }
}

/// Search box plus a combined list of search hits followed by recent places.
pub struct LocationsState {
    pub input: String,
    pub editing: bool,
    pub results: Vec<PlaceMatch>,
    pub recent: Vec<RecentLocation>,
    pub selected_index: usize,
    pub searching: bool,
}

impl LocationsState {
    pub fn new(recent: Vec<RecentLocation>) -> Self {
        Self {
            input: String::new(),
            editing: false,
            results: Vec::new(),
            recent,
            selected_index: 0,
            searching: false,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len() + self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn next(&mut self) {
        let max = self.len();
        if max > 0 && self.selected_index < max - 1 {
            self.selected_index += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn start_editing(&mut self) {
        self.editing = true;
    }

    pub fn cancel_editing(&mut self) {
        self.editing = false;
    }

    /// Stop editing and hand back the query, if there is one.
    pub fn finish_editing(&mut self) -> Option<String> {
        self.editing = false;
        let query = self.input.trim();
        (!query.is_empty()).then(|| query.to_string())
    }

    pub fn selected(&self) -> Option<Location> {
        let i = self.selected_index;
        if i < self.results.len() {
            self.results.get(i).map(PlaceMatch::to_location)
        } else {
            self.recent
                .get(i - self.results.len())
                .map(|r| r.location.clone())
        }
    }
}

pub struct App {
    pub screen: Screen,
    pub should_quit: bool,
    pub db: Database,
    pub advisor: CropAdvisor,

    // Data
    pub location: Location,
    pub mode: DataMode,
    pub report: Option<ConsolidatedReport>,
    pub suggestions: Vec<CropSuggestion>,
    /// Month the suggestions were ranked for.
    pub month: u32,

    // Screen states
    pub crops_state: CropsState,
    pub locations_state: LocationsState,

    // UI state
    pub status_message: Option<String>,
    pub needs_refresh: bool,
    pub pending_search: Option<String>,
}

impl App {
    pub fn new(config: &Config, db: Database, advisor: CropAdvisor) -> Result<Self> {
        let location = match db.last_location()? {
            Some(location) => location,
            None => config.location.to_location(),
        };

        let mode = if Config::mock_forced_by_env() {
            DataMode::Mock
        } else {
            db.saved_data_mode()?.unwrap_or(config.data.mode)
        };

        let recent = db.recent_locations(MAX_RECENT_LOCATIONS)?;

        Ok(Self {
            screen: Screen::Dashboard,
            should_quit: false,
            db,
            advisor,
            location,
            mode,
            report: None,
            suggestions: Vec::new(),
            month: Local::now().month(),
            crops_state: CropsState::new(),
            locations_state: LocationsState::new(recent),
            status_message: Some("Loading weather data...".to_string()),
            needs_refresh: true,
            pending_search: None,
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

    /// True while keystrokes belong to a text input.
    pub fn is_editing(&self) -> bool {
        self.screen == Screen::Locations && self.locations_state.editing
    }

    pub fn request_refresh(&mut self) {
        self.needs_refresh = true;
        self.set_status("Refreshing data...");
    }

    /// Flip between live and mock data and remember the choice.
    pub fn toggle_mode(&mut self) -> Result<DataMode> {
        self.mode = self.mode.toggled();
        self.db.save_data_mode(self.mode)?;
        self.request_refresh();
        Ok(self.mode)
    }

    /// Install a fresh report and re-rank crops for `month`.
    pub fn apply_report(&mut self, report: ConsolidatedReport, month: u32) {
        self.suggestions = self.advisor.suggest(&report.current.conditions(), month);
        self.crops_state.clamp(self.suggestions.len());
        self.month = month;
        self.report = Some(report);
    }

    pub fn submit_search(&mut self) {
        if let Some(query) = self.locations_state.finish_editing() {
            self.locations_state.searching = true;
            self.set_status(&format!("Searching for {}...", query));
            self.pending_search = Some(query);
        }
    }

    pub fn set_search_results(&mut self, results: Vec<PlaceMatch>) {
        self.locations_state.searching = false;
        if results.is_empty() {
            self.set_status("No matching places found");
        } else {
            self.set_status(&format!("{} places found", results.len()));
        }
        self.locations_state.results = results;
        self.locations_state.selected_index = 0;
    }

    /// Make `location` current, record it and schedule a refresh.
    pub fn select_location(&mut self, location: Location, now: DateTime<Utc>) -> Result<()> {
        self.db.remember_location(&location, now)?;
        self.locations_state.recent = self.db.recent_locations(MAX_RECENT_LOCATIONS)?;
        self.locations_state.results.clear();
        self.locations_state.selected_index = 0;
        self.location = location;
        self.crops_state = CropsState::new();
        self.request_refresh();
        self.switch_screen(Screen::Dashboard);
        Ok(())
    }

    pub fn select_highlighted_location(&mut self, now: DateTime<Utc>) -> Result<()> {
        match self.locations_state.selected() {
            Some(location) => self.select_location(location, now),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{mock, Catalog};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 15, 6, 0, 0).unwrap()
    }

    fn app() -> App {
        let db = Database::open_in_memory().unwrap();
        let advisor = CropAdvisor::new(Catalog::builtin().unwrap());
        App::new(&Config::default(), db, advisor).unwrap()
    }

    #[test]
    fn screen_keys() {
        assert_eq!(Screen::from_key('1'), Some(Screen::Dashboard));
        assert_eq!(Screen::from_key('2'), Some(Screen::Crops));
        assert_eq!(Screen::from_key('3'), Some(Screen::Locations));
        assert_eq!(Screen::from_key('4'), None);
    }

    #[test]
    fn starts_at_configured_location() {
        let app = app();
        assert_eq!(app.location.name, "New Delhi, Delhi");
        assert!(app.needs_refresh);
        assert!(app.report.is_none());
    }

    #[test]
    fn report_drives_suggestions() {
        let mut app = app();
        let report = mock::mock_report(&app.location, now());
        app.apply_report(report, 7);

        assert!(app.report.is_some());
        assert_eq!(app.month, 7);
        assert!(app.suggestions.len() <= app.advisor.policy().max_suggestions);
        for pair in app.suggestions.windows(2) {
            assert!(pair[0].suitability >= pair[1].suitability);
        }
    }

    #[test]
    fn selection_is_clamped_after_rerank() {
        let mut app = app();
        app.crops_state.selected_index = 40;
        app.apply_report(mock::mock_report(&app.location, now()), 7);
        assert!(app.crops_state.selected_index <= app.suggestions.len().saturating_sub(1));
    }

    #[test]
    fn toggle_mode_is_persisted() {
        let mut app = app();
        let before = app.mode;
        let after = app.toggle_mode().unwrap();
        assert_ne!(before, after);
        assert_eq!(app.db.saved_data_mode().unwrap(), Some(after));
        assert!(app.needs_refresh);
    }

    #[test]
    fn selecting_a_location_records_it() {
        let mut app = app();
        app.switch_screen(Screen::Locations);
        app.needs_refresh = false;
        app.set_search_results(vec![PlaceMatch {
            display_name: "Nashik, Maharashtra, India".into(),
            lat: 19.99,
            lon: 73.79,
            locality: Some("Nashik".into()),
            state: Some("Maharashtra".into()),
            kind: "city".into(),
        }]);

        app.select_highlighted_location(now()).unwrap();

        assert_eq!(app.location.short_name(), "Nashik");
        assert_eq!(app.screen, Screen::Dashboard);
        assert!(app.needs_refresh);
        assert!(app.locations_state.results.is_empty());
        assert_eq!(app.locations_state.recent.len(), 1);
        assert_eq!(app.db.last_location().unwrap().unwrap().lat, 19.99);
    }

    #[test]
    fn search_submission_requires_text() {
        let mut app = app();
        app.switch_screen(Screen::Locations);
        app.locations_state.start_editing();
        assert!(app.is_editing());

        app.locations_state.input = "   ".into();
        app.submit_search();
        assert!(app.pending_search.is_none());
        assert!(!app.is_editing());

        app.locations_state.input = " Pune ".into();
        app.submit_search();
        assert_eq!(app.pending_search.as_deref(), Some("Pune"));
        assert!(app.locations_state.searching);
    }

    #[test]
    fn combined_list_navigation() {
        let mut state = LocationsState::new(vec![RecentLocation {
            location: Location::new("Pune", 18.52, 73.86),
            used_at: now(),
        }]);
        state.results = vec![PlaceMatch {
            display_name: "Patna, Bihar, India".into(),
            lat: 25.6,
            lon: 85.1,
            locality: None,
            state: None,
            kind: "city".into(),
        }];

        assert_eq!(state.selected().unwrap().name, "Patna, Bihar, India");
        state.next();
        assert_eq!(state.selected().unwrap().name, "Pune");
        state.next();
        assert_eq!(state.selected_index, 1);
        state.prev();
        state.prev();
        assert_eq!(state.selected_index, 0);
    }
}
