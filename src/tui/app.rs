//! Application state and event loop

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
    DefaultTerminal, Frame,
};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::services::boundaries::Boundaries;
use crate::services::query::{AVAILABLE_YEARS, DEFAULT_YEAR};
use crate::services::{DataLoaderService, LoadResult, LoadStage, QueryService};
use crate::types::{LoadWarning, Summary};

use super::theme::Theme;
use super::widgets::{
    cards::{Cards, CARDS_HEIGHT},
    choropleth::Choropleth,
    filters::FilterBar,
    help::HelpPopup,
    spinner::Spinner,
    top_cities::TopCitiesTable,
};

/// Categories skipped by PgUp/PgDn
const CATEGORY_PAGE: isize = 10;

/// Share of the body width given to the top cities table
const TABLE_PERCENT: u16 = 32;

/// Application state
pub enum AppState {
    /// Loading data with spinner animation
    Loading {
        spinner_frame: usize,
        stage: LoadStage,
    },
    /// Ready with loaded data
    Ready { data: Box<AppData> },
    /// Error state
    Error { message: String },
}

/// Loaded tables plus the current filter selection
pub struct AppData {
    query: QueryService,
    boundaries: Option<Boundaries>,
    warnings: Vec<LoadWarning>,
    year_index: usize,
    category_index: usize,
    summary: Summary,
}

impl AppData {
    /// Start on the default year and category
    pub fn new(result: LoadResult) -> Self {
        let LoadResult {
            tables,
            boundaries,
            warnings,
        } = result;
        let query = QueryService::new(tables);

        let year_index = AVAILABLE_YEARS
            .iter()
            .position(|y| *y == DEFAULT_YEAR)
            .unwrap_or(0);
        let category_index = query
            .default_category()
            .and_then(|d| query.categories().iter().position(|c| c == d))
            .unwrap_or(0);
        let category = query
            .categories()
            .get(category_index)
            .map(String::as_str)
            .unwrap_or("");
        let summary = query.summarize(AVAILABLE_YEARS[year_index], category);

        Self {
            query,
            boundaries,
            warnings,
            year_index,
            category_index,
            summary,
        }
    }

    pub fn year(&self) -> i32 {
        AVAILABLE_YEARS[self.year_index]
    }

    /// Selected category, empty when the data has none
    pub fn category(&self) -> &str {
        self.query
            .categories()
            .get(self.category_index)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Cycle the year selection, wrapping at either end
    pub fn step_year(&mut self, delta: isize) {
        let next = cycle(self.year_index, delta, AVAILABLE_YEARS.len());
        self.select(next, self.category_index);
    }

    /// Cycle the category selection, wrapping at either end
    pub fn step_category(&mut self, delta: isize) {
        let next = cycle(self.category_index, delta, self.query.categories().len());
        self.select(self.year_index, next);
    }

    /// Jump through the categories, stopping at the first or last
    pub fn page_category(&mut self, delta: isize) {
        let next = clamp_step(self.category_index, delta, self.query.categories().len());
        self.select(self.year_index, next);
    }

    fn select(&mut self, year_index: usize, category_index: usize) {
        if (year_index, category_index) != (self.year_index, self.category_index) {
            self.year_index = year_index;
            self.category_index = category_index;
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        self.summary = self.query.summarize(self.year(), self.category());
    }
}

/// Wrapping index arithmetic; `len == 0` always yields 0
fn cycle(index: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index as isize + delta).rem_euclid(len as isize) as usize
}

/// Clamped index arithmetic; `len == 0` always yields 0
fn clamp_step(index: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    index.saturating_add_signed(delta).min(len - 1)
}

/// Messages from the background loader thread
enum LoadMessage {
    Stage(LoadStage),
    Done(Result<LoadResult, String>),
}

/// Main application
pub struct App {
    state: AppState,
    should_quit: bool,
    show_help: bool,
    theme: Theme,
}

impl App {
    /// Create a new app in loading state
    pub fn new(theme: Theme) -> Self {
        Self {
            state: AppState::Loading {
                spinner_frame: 0,
                stage: LoadStage::Reading,
            },
            should_quit: false,
            show_help: false,
            theme,
        }
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
            }
            code => {
                if let AppState::Ready { data } = &mut self.state {
                    match code {
                        KeyCode::Left | KeyCode::Char('h') => data.step_year(-1),
                        KeyCode::Right | KeyCode::Char('l') => data.step_year(1),
                        KeyCode::Up | KeyCode::Char('k') => data.step_category(-1),
                        KeyCode::Down | KeyCode::Char('j') => data.step_category(1),
                        KeyCode::PageUp => data.page_category(-CATEGORY_PAGE),
                        KeyCode::PageDown => data.page_category(CATEGORY_PAGE),
                        _ => {}
                    }
                }
            }
        }
    }

    /// Apply data loading result to app state
    fn apply_load_result(&mut self, result: Result<LoadResult, String>) {
        match result {
            Ok(result) => {
                self.state = AppState::Ready {
                    data: Box::new(AppData::new(result)),
                }
            }
            Err(message) => self.state = AppState::Error { message },
        }
    }

    fn apply_message(&mut self, message: LoadMessage) {
        match message {
            LoadMessage::Stage(stage) => {
                if let AppState::Loading { spinner_frame, .. } = self.state {
                    self.state = AppState::Loading {
                        spinner_frame,
                        stage,
                    };
                }
            }
            LoadMessage::Done(result) => self.apply_load_result(result),
        }
    }

    /// Update spinner animation
    pub fn tick(&mut self) {
        if let AppState::Loading {
            spinner_frame,
            stage,
        } = &self.state
        {
            self.state = AppState::Loading {
                spinner_frame: Spinner::next_frame(*spinner_frame),
                stage: *stage,
            };
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Draw the application
    pub fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }

    fn render_dashboard(&self, data: &AppData, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::vertical([
            Constraint::Length(1),            // Title
            Constraint::Length(1),            // Filters
            Constraint::Length(1),            // Spacer
            Constraint::Length(CARDS_HEIGHT), // Cards
            Constraint::Min(6),               // Table + map
            Constraint::Length(1),            // Footer
        ])
        .split(area);

        let title = "OLIST E-COMMERCE DASHBOARD";
        let title_x = chunks[0].x + chunks[0].width.saturating_sub(title.len() as u16) / 2;
        buf.set_string(
            title_x,
            chunks[0].y,
            title,
            Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD),
        );

        let categories = data.query.categories();
        let position = if categories.is_empty() {
            (0, 0)
        } else {
            (data.category_index + 1, categories.len())
        };
        FilterBar::new(
            &AVAILABLE_YEARS,
            data.year(),
            data.category(),
            position,
            self.theme,
        )
        .render(chunks[1], buf);

        Cards::new(&data.summary.cards, self.theme).render(chunks[3], buf);

        let body = Layout::horizontal([
            Constraint::Percentage(TABLE_PERCENT),
            Constraint::Percentage(100 - TABLE_PERCENT),
        ])
        .split(chunks[4]);
        TopCitiesTable::new(&data.summary.top_cities, self.theme).render(body[0], buf);
        Choropleth::new(
            &data.summary.map_data,
            data.boundaries.as_ref(),
            self.theme,
        )
        .render(body[1], buf);

        self.render_footer(&data.warnings, chunks[5], buf);
    }

    fn render_footer(&self, warnings: &[LoadWarning], area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::styled(
            "←/→ year · ↑/↓ category · ? help · q quit",
            Style::default().fg(self.theme.muted()),
        )];
        for warning in warnings {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("⚠ {}", warning.message()),
                Style::default().fg(self.theme.error()),
            ));
        }
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match &self.state {
            AppState::Loading {
                spinner_frame,
                stage,
            } => {
                Spinner::new(*spinner_frame, *stage, self.theme).render(area, buf);
            }
            AppState::Ready { data } => {
                self.render_dashboard(data, area, buf);

                if self.show_help {
                    let popup_area = HelpPopup::centered_area(area);
                    HelpPopup::new(self.theme).render(popup_area, buf);
                }
            }
            AppState::Error { message } => {
                let y = area.y + area.height / 2;
                let text = format!("Error: {}", message);
                let x = area.x + (area.width.saturating_sub(text.chars().count() as u16)) / 2;
                buf.set_string(x, y, &text, Style::default().fg(self.theme.error()));
            }
        }
    }
}

/// Run the TUI application
pub fn run(config: AppConfig) -> anyhow::Result<()> {
    // Detect before raw mode; the query needs a cooked terminal
    let theme = Theme::detect();
    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, config, theme);
    ratatui::restore();
    result
}

fn run_app(terminal: &mut DefaultTerminal, config: AppConfig, theme: Theme) -> anyhow::Result<()> {
    let mut app = App::new(theme);

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let loader = DataLoaderService::new(config);
        let stage_tx = tx.clone();
        let result = loader
            .load_with_progress(|stage| {
                let _ = stage_tx.send(LoadMessage::Stage(stage));
            })
            .map_err(|e| {
                error!(error = %e, "loading failed");
                e.to_string()
            });
        if result.is_ok() {
            info!("dashboard data loaded");
        }
        let _ = tx.send(LoadMessage::Done(result));
    });

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if app.should_quit() {
            break;
        }

        while let Ok(message) = rx.try_recv() {
            app.apply_message(message);
        }

        // Poll for events with 100ms timeout for spinner animation
        if event::poll(Duration::from_millis(100))? {
            app.handle_event(event::read()?);
        } else {
            app.tick();
        }
    }

    Ok(())
}
