use std::io;

use anyhow::Result;
use cadenza_core::Song;
use cadenza_etl::{Config, RecommendationLimits};
use cadenza_search::{Recommendation, Recommender};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;

pub mod browser;
pub mod cards;

/// Rows moved by PageUp/PageDown.
const PAGE: usize = 10;

// Assume a reasonable list height; render corrects for the real one
const VIEWPORT_HEIGHT: usize = 20;

/// Where key presses go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    /// Typing into the song filter.
    Search,
}

/// Application state for the song browser.
#[derive(Debug)]
pub struct App<'a> {
    pub recommender: &'a Recommender,
    pub mode: Mode,
    pub filter: String,
    /// Catalog rows that match the filter, in catalog order.
    pub visible: Vec<usize>,
    /// Position in `visible`.
    pub selected: usize,
    pub list_offset: usize, // First visible song in the list
    pub k: usize,
    pub limits: RecommendationLimits,
    pub cards_per_row: usize,
    pub results: Vec<Recommendation<'a>>,
    /// Title the current results were computed for.
    pub results_for: Option<String>,
    pub message: Option<String>,
    pub should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(recommender: &'a Recommender, config: &Config) -> Self {
        let limits = config.recommendations;
        Self {
            recommender,
            mode: Mode::Browse,
            filter: String::new(),
            visible: (0..recommender.catalog().len()).collect(),
            selected: 0,
            list_offset: 0,
            k: limits.clamp(limits.default),
            limits,
            cards_per_row: config.cards_per_row.max(1),
            results: Vec::new(),
            results_for: None,
            message: None,
            should_quit: false,
        }
    }

    pub fn selected_song(&self) -> Option<&'a Song> {
        let catalog = self.recommender.catalog();
        self.visible.get(self.selected).and_then(|&row| catalog.get(row))
    }

    fn handle_key(&mut self, key: KeyCode) {
        match self.mode {
            Mode::Browse => self.handle_browse_key(key),
            Mode::Search => self.handle_search_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_down(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(1),
            KeyCode::PageDown => self.move_down(PAGE),
            KeyCode::PageUp => self.move_up(PAGE),
            KeyCode::Char('/') => {
                self.mode = Mode::Search;
                self.message = None;
            }
            KeyCode::Char('+' | '=') => self.set_k(self.k.saturating_add(1)),
            KeyCode::Char('-') => self.set_k(self.k.saturating_sub(1)),
            KeyCode::Char('c') => {
                self.results.clear();
                self.results_for = None;
                self.message = None;
            }
            KeyCode::Enter => {
                if let Some(song) = self.selected_song() {
                    self.recommend(&song.title);
                }
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter => self.mode = Mode::Browse,
            KeyCode::Esc => {
                self.filter.clear();
                self.apply_filter();
                self.mode = Mode::Browse;
            }
            KeyCode::Backspace => {
                self.filter.pop();
                self.apply_filter();
            }
            KeyCode::Down => self.move_down(1),
            KeyCode::Up => self.move_up(1),
            KeyCode::Char(c) => {
                self.filter.push(c);
                self.apply_filter();
            }
            _ => {}
        }
    }

    fn move_down(&mut self, by: usize) {
        if self.visible.is_empty() {
            return;
        }
        self.selected = (self.selected + by).min(self.visible.len() - 1);
        if self.selected >= self.list_offset + VIEWPORT_HEIGHT {
            self.list_offset = self.selected + 1 - VIEWPORT_HEIGHT;
        }
    }

    fn move_up(&mut self, by: usize) {
        self.selected = self.selected.saturating_sub(by);
        if self.selected < self.list_offset {
            self.list_offset = self.selected;
        }
    }

    fn apply_filter(&mut self) {
        self.visible = self
            .recommender
            .catalog()
            .search(&self.filter)
            .map(|song| song.row)
            .collect();
        self.selected = 0;
        self.list_offset = 0;
    }

    /// Change the number of recommendations, kept inside the configured
    /// range. Current results are recomputed.
    pub fn set_k(&mut self, k: usize) {
        let k = self.limits.clamp(k);
        if k == self.k {
            return;
        }
        self.k = k;
        if let Some(title) = self.results_for.clone() {
            self.recommend(&title);
        }
    }

    /// Replace the results with recommendations for `title`.
    pub fn recommend(&mut self, title: &str) {
        match self.recommender.recommend(title, self.k) {
            Ok(results) => {
                self.results = results;
                self.results_for = Some(title.to_string());
                self.message = None;
            }
            Err(e) => {
                self.results.clear();
                self.results_for = None;
                self.message = Some(if e.is_unknown_song() {
                    format!("Song not found: {}", title)
                } else {
                    e.to_string()
                });
            }
        }
    }
}

/// Run the song browser.
///
/// Sets up the terminal, runs the main event loop, and restores the terminal
/// on exit (including on error).
pub fn run_tui(recommender: &Recommender, config: &Config) -> Result<()> {
    let app = App::new(recommender, config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the event loop, capturing any error so we can restore the terminal
    let result = run_event_loop(&mut terminal, app);

    // Restore terminal regardless of success or failure
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App<'_>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| browser::render(frame, &app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key.code);
            }
        }

        if app.should_quit {
            log::debug!("Leaving browser");
            return Ok(());
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use cadenza_core::{Catalog, IndexTable};
    use cadenza_search::DenseSimilarity;

    pub(crate) fn recommender() -> Recommender {
        let songs = vec![
            Song::new(0, "Yesterday", Some("The Beatles"), Some("Help!")),
            Song::new(1, "Let It Be", Some("The Beatles"), Some("Let It Be")),
            Song::new(2, "Imagine", Some("John Lennon"), Some("Imagine")),
            Song::new(3, "Jolene", Some("Dolly Parton"), None),
            Song::new(4, "Hey Jude", Some("The Beatles"), None),
            Song::new(5, "Respect", Some("Aretha Franklin"), None),
            Song::new(6, "Vogue", Some("Madonna"), None),
        ];
        let n = songs.len();
        let catalog = Catalog::from_songs(songs);
        let index = IndexTable::from_songs(catalog.songs());
        // Similarity falls off with distance in the catalog
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| 1.0 / (1.0 + i.abs_diff(j) as f64))
                    .collect()
            })
            .collect();
        let similarity = DenseSimilarity::from_rows(rows).unwrap();
        Recommender::new(catalog, index, Box::new(similarity)).unwrap()
    }

    pub(crate) fn config() -> Config {
        Config {
            recommendations: RecommendationLimits {
                min: 2,
                max: 5,
                default: 3,
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_new_app_starts_at_default_k() {
        let recommender = recommender();
        let app = App::new(&recommender, &config());
        assert_eq!(app.k, 3);
        assert_eq!(app.visible.len(), 7);
        assert_eq!(app.selected_song().unwrap().title, "Yesterday");
        assert!(app.results.is_empty());
    }

    #[test]
    fn test_navigation_stays_in_bounds() {
        let recommender = recommender();
        let mut app = App::new(&recommender, &config());

        app.handle_key(KeyCode::Up);
        assert_eq!(app.selected, 0);

        app.handle_key(KeyCode::Char('j'));
        app.handle_key(KeyCode::Down);
        assert_eq!(app.selected, 2);

        app.handle_key(KeyCode::PageDown);
        assert_eq!(app.selected, 6);

        app.handle_key(KeyCode::PageUp);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_enter_recommends_selected_song() {
        let recommender = recommender();
        let mut app = App::new(&recommender, &config());

        app.handle_key(KeyCode::Enter);
        let titles: Vec<_> = app.results.iter().map(|r| r.song.title.as_str()).collect();
        assert_eq!(titles, vec!["Let It Be", "Imagine", "Jolene"]);
        assert_eq!(app.results_for.as_deref(), Some("Yesterday"));
    }

    #[test]
    fn test_k_is_clamped_and_refreshes_results() {
        let recommender = recommender();
        let mut app = App::new(&recommender, &config());
        app.handle_key(KeyCode::Enter);

        for _ in 0..10 {
            app.handle_key(KeyCode::Char('+'));
        }
        assert_eq!(app.k, 5);
        assert_eq!(app.results.len(), 5);

        for _ in 0..10 {
            app.handle_key(KeyCode::Char('-'));
        }
        assert_eq!(app.k, 2);
        assert_eq!(app.results.len(), 2);
    }

    #[test]
    fn test_search_filters_list() {
        let recommender = recommender();
        let mut app = App::new(&recommender, &config());

        app.handle_key(KeyCode::Char('/'));
        assert_eq!(app.mode, Mode::Search);
        for c in "beatles".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        assert_eq!(app.visible, vec![0, 1, 4]);

        // 'j' and 'q' are text while searching
        app.handle_key(KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert!(app.visible.is_empty());
        app.handle_key(KeyCode::Backspace);
        assert_eq!(app.visible.len(), 3);

        app.handle_key(KeyCode::Enter);
        assert_eq!(app.mode, Mode::Browse);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.results_for.as_deref(), Some("Let It Be"));
    }

    #[test]
    fn test_escape_clears_search() {
        let recommender = recommender();
        let mut app = App::new(&recommender, &config());

        app.handle_key(KeyCode::Char('/'));
        app.handle_key(KeyCode::Char('z'));
        app.handle_key(KeyCode::Char('z'));
        assert!(app.selected_song().is_none());

        // Enter on an empty list does nothing
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Enter);
        assert!(app.results.is_empty());

        app.handle_key(KeyCode::Char('/'));
        app.handle_key(KeyCode::Esc);
        assert_eq!(app.mode, Mode::Browse);
        assert!(app.filter.is_empty());
        assert_eq!(app.visible.len(), 7);
    }

    #[test]
    fn test_unknown_title_sets_message() {
        let recommender = recommender();
        let mut app = App::new(&recommender, &config());
        app.handle_key(KeyCode::Enter);

        app.recommend("Not A Song");
        assert!(app.results.is_empty());
        assert_eq!(app.message.as_deref(), Some("Song not found: Not A Song"));
    }

    #[test]
    fn test_clear_and_quit() {
        let recommender = recommender();
        let mut app = App::new(&recommender, &config());
        app.handle_key(KeyCode::Enter);

        app.handle_key(KeyCode::Char('c'));
        assert!(app.results.is_empty());
        assert!(app.results_for.is_none());

        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
