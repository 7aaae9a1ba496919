pub mod ui;

use std::{
    collections::BTreeSet,
    error::Error,
    io::{self, stdin},
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use keypace::{
    history::{summarize, HistoryEntry, HistoryStore, JsonHistoryStore},
    keyboard::KeyboardLayout,
    lessons::{Lesson, LessonLibrary},
    logging::init_logging,
    runtime::{AppEvent, CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
    segmenter::capacity_hint,
    session::{SessionConfig, SessionObserver, SessionStatus, StatsSnapshot, TypingSession},
    settings::{cycle, FileSettingsStore, Settings, SettingsStore, TestTime},
    timer::{format_clock, TimeLimit},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use tracing::{info, warn};

/// Horizontal margin of the typing area, on each side
pub const HORIZONTAL_MARGIN: u16 = 5;
/// Lines of practice text shown at once
pub const PARAGRAPH_LINES: usize = 3;

/// Fallback text when the lesson library is unavailable
const HOME_ROW_DRILL: &str = "asdf jkl; asdf jkl; fdsa ;lkj";

/// typing practice in the terminal with lessons, a virtual keyboard and progress history
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "Practice typing built-in lessons or your own text. Tracks speed and accuracy per paragraph, shows the next key on a virtual keyboard, and keeps a history of finished tests."
)]
pub struct Cli {
    /// lesson to start with (see --list-lessons)
    #[clap(short = 'l', long)]
    lesson: Option<String>,

    /// custom text to practice instead of a lesson
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// test duration: 1min, 2min, 5min or unlimited (saved)
    #[clap(short = 't', long)]
    test_time: Option<String>,

    /// time limit in seconds for this run only; negative means unlimited
    #[clap(short = 's', long, allow_negative_numbers = true)]
    seconds: Option<i64>,

    /// keyboard layout: qwerty, dvorak, colemak, workman, azerty, qwertz or numpad (saved)
    #[clap(short = 'k', long)]
    layout: Option<String>,

    /// put two spaces between sentences (saved)
    #[clap(long)]
    double_spacing: bool,

    /// print a summary of past results and exit
    #[clap(long)]
    history: bool,

    /// list the built-in lessons and exit
    #[clap(long)]
    list_lessons: bool,

    /// write debug logs
    #[clap(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    /// Fold persistent overrides into `settings`. Returns true if anything changed.
    fn apply_to(&self, settings: &mut Settings) -> bool {
        let before = settings.clone();
        if let Some(ref t) = self.test_time {
            settings.test_time = TestTime::from(t.clone());
        }
        if let Some(ref l) = self.layout {
            settings.keyboard_layout = KeyboardLayout::from_id(l);
        }
        if self.double_spacing {
            settings.double_spacing = true;
        }
        *settings != before
    }

    fn time_override(&self) -> Option<TimeLimit> {
        self.seconds.map(TimeLimit::from_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Typing,
    Results,
    History,
    Lessons,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    Continue,
    Quit,
}

/// Collects what the app needs from one batch of session events.
#[derive(Default)]
struct Feedback {
    completed: Option<StatsSnapshot>,
    active_keys: Option<BTreeSet<char>>,
}

impl SessionObserver for Feedback {
    fn on_complete(&mut self, stats: &StatsSnapshot) {
        self.completed = Some(*stats);
    }

    fn on_active_keys_changed(&mut self, keys: &BTreeSet<char>) {
        self.active_keys = Some(keys.clone());
    }
}

pub struct App {
    pub session: TypingSession,
    pub state: AppState,
    pub settings: Settings,
    pub library: LessonLibrary,
    pub lesson: Option<Lesson>,
    pub custom_prompt: Option<String>,
    pub history: Vec<HistoryEntry>,
    pub last_result: Option<StatsSnapshot>,
    pub active_keys: BTreeSet<char>,
    pub status_message: Option<String>,
    pub history_scroll: usize,
    pub lesson_cursor: usize,
    time_override: Option<TimeLimit>,
    paragraph_capacity: usize,
    settings_store: Box<dyn SettingsStore>,
    history_store: Box<dyn HistoryStore>,
}

impl App {
    pub fn new(
        cli: &Cli,
        settings_store: Box<dyn SettingsStore>,
        history_store: Box<dyn HistoryStore>,
        library: LessonLibrary,
        width: u16,
    ) -> Self {
        let mut settings = settings_store.load();
        if cli.apply_to(&mut settings) {
            if let Err(err) = settings_store.save(&settings) {
                warn!(%err, "could not save settings");
            }
        }

        let lesson = match (&cli.prompt, &cli.lesson) {
            (Some(_), _) => None,
            (None, Some(id)) => library.find(id).cloned().or_else(|| {
                warn!(lesson = %id, "unknown lesson, using the first one");
                library.first(settings.text_type).cloned()
            }),
            (None, None) => library
                .next(settings.text_selection, settings.text_type, None)
                .cloned(),
        };

        let paragraph_capacity = Self::capacity_for_width(width);
        let time_override = cli.time_override();
        let config = Self::build_config(&settings, time_override, paragraph_capacity);
        let text = match (&cli.prompt, &lesson) {
            (Some(prompt), _) => prompt.clone(),
            (None, Some(lesson)) => lesson.text.clone(),
            (None, None) => HOME_ROW_DRILL.to_string(),
        };
        let session = TypingSession::new(text, config);
        let active_keys = session.highlight().active_keys();

        Self {
            session,
            state: AppState::Typing,
            settings,
            library,
            lesson,
            custom_prompt: cli.prompt.clone(),
            history: history_store.load(),
            last_result: None,
            active_keys,
            status_message: None,
            history_scroll: 0,
            lesson_cursor: 0,
            time_override,
            paragraph_capacity,
            settings_store,
            history_store,
        }
    }

    pub fn capacity_for_width(width: u16) -> usize {
        let chars_per_line = width.saturating_sub(HORIZONTAL_MARGIN * 2) as usize;
        capacity_hint(chars_per_line, PARAGRAPH_LINES)
    }

    fn build_config(
        settings: &Settings,
        time_override: Option<TimeLimit>,
        paragraph_capacity: usize,
    ) -> SessionConfig {
        let mut config = settings.session_config(paragraph_capacity);
        if let Some(limit) = time_override {
            config.time_limit = limit;
        }
        config
    }

    fn session_config(&self) -> SessionConfig {
        Self::build_config(&self.settings, self.time_override, self.paragraph_capacity)
    }

    pub fn time_limit(&self) -> TimeLimit {
        self.session.config().time_limit
    }

    /// Shown before the first keystroke.
    pub fn time_hint(&self) -> String {
        match (self.time_override, self.time_limit().as_secs()) {
            (None, _) => self.settings.test_time.describe().to_string(),
            (Some(_), Some(secs)) => {
                format!("You have {} to complete this test", format_clock(secs))
            }
            (Some(_), None) => TestTime::Unlimited.describe().to_string(),
        }
    }

    /// Restart the current text from the beginning.
    pub fn restart(&mut self) {
        self.session.reset();
        self.active_keys = self.session.highlight().active_keys();
        self.state = AppState::Typing;
    }

    /// Move on to the next lesson per the selection setting.
    pub fn next_lesson(&mut self) {
        if self.custom_prompt.is_some() {
            self.restart();
            return;
        }
        let current = self.lesson.as_ref().map(|l| l.id.as_str());
        let next = self
            .library
            .next(self.settings.text_selection, self.settings.text_type, current)
            .cloned();
        if let Some(lesson) = next {
            info!(lesson = %lesson.id, "loading lesson");
            self.session.load_text(lesson.text.clone());
            self.lesson = Some(lesson);
        }
        self.restart();
    }

    /// Open the lesson picker on the current lesson.
    pub fn open_lessons(&mut self) {
        let current = self.lesson.as_ref().map(|l| l.id.as_str());
        self.lesson_cursor = self
            .library
            .lessons()
            .iter()
            .position(|l| Some(l.id.as_str()) == current)
            .unwrap_or(0);
        self.state = AppState::Lessons;
    }

    /// Load the lesson at `index` in the library and start over on it.
    pub fn select_lesson(&mut self, index: usize) {
        let Some(lesson) = self.library.lessons().get(index).cloned() else {
            return;
        };
        info!(lesson = %lesson.id, "lesson picked");
        self.session.load_text(lesson.text.clone());
        self.lesson = Some(lesson);
        self.custom_prompt = None;
        self.last_result = None;
        self.restart();
    }

    fn leave_overlay(&mut self) {
        self.state = if self.last_result.is_some() {
            AppState::Results
        } else {
            AppState::Typing
        };
    }

    fn apply_settings(&mut self) {
        if let Err(err) = self.settings_store.save(&self.settings) {
            warn!(%err, "could not save settings");
            self.status_message = Some(format!("Settings not saved: {err}"));
        } else {
            self.status_message = Some("Settings updated".to_string());
        }
        self.session.configure(self.session_config());
        self.active_keys = self.session.highlight().active_keys();
    }

    pub fn on_tick(&mut self) {
        self.session.tick();
        self.process_session_events();
    }

    /// Re-segment for a new terminal width. Only done before typing starts so
    /// a running comparison never changes underneath the user.
    pub fn on_resize(&mut self, width: u16) {
        let capacity = Self::capacity_for_width(width);
        if capacity == self.paragraph_capacity {
            return;
        }
        self.paragraph_capacity = capacity;
        if self.session.status() == SessionStatus::Idle {
            self.session.configure(self.session_config());
            self.active_keys = self.session.highlight().active_keys();
        }
    }

    fn process_session_events(&mut self) {
        let mut feedback = Feedback::default();
        self.session.dispatch(&mut feedback);

        if let Some(keys) = feedback.active_keys {
            self.active_keys = keys;
        }
        if let Some(stats) = feedback.completed {
            self.record_result(stats);
        }
    }

    fn record_result(&mut self, stats: StatsSnapshot) {
        info!(wpm = stats.wpm, accuracy = stats.accuracy, "test complete");
        let entry = HistoryEntry::new(stats, self.lesson.as_ref().map(|l| l.id.clone()));
        match self.history_store.append(entry.clone()) {
            Ok(all) => self.history = all,
            Err(err) => {
                warn!(%err, "could not save history");
                self.history.push(entry);
                self.status_message = Some(format!("History not saved: {err}"));
            }
        }
        self.last_result = Some(stats);
        self.active_keys = self.session.config().layout.home_row_keys();
        self.state = AppState::Results;
    }

    fn toggle_setting(&mut self, key: char) -> bool {
        match key {
            '1' => self.settings.test_time = cycle(self.settings.test_time),
            '2' => self.settings.keyboard_layout = cycle(self.settings.keyboard_layout),
            '3' => {
                self.settings.text_color_highlighting =
                    cycle(self.settings.text_color_highlighting)
            }
            '4' => self.settings.text_selection = cycle(self.settings.text_selection),
            '5' => self.settings.text_type = cycle(self.settings.text_type),
            '6' => self.settings.double_spacing = !self.settings.double_spacing,
            '7' => self.settings.test_reset_hotkey = cycle(self.settings.test_reset_hotkey),
            _ => return false,
        }
        // a new duration replaces any one-off --seconds limit
        if key == '1' {
            self.time_override = None;
        }
        self.apply_settings();
        true
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }
        self.status_message = None;

        match self.state {
            AppState::Typing => return self.on_typing_key(key, ctrl),
            AppState::Results => match key.code {
                KeyCode::Esc => return Control::Quit,
                KeyCode::Char('r') | KeyCode::Left => self.restart(),
                KeyCode::Char('n') | KeyCode::Right => self.next_lesson(),
                KeyCode::Char('h') => {
                    self.history_scroll = 0;
                    self.state = AppState::History;
                }
                KeyCode::Char('l') => self.open_lessons(),
                KeyCode::Char(c) => {
                    self.toggle_setting(c);
                }
                _ => {}
            },
            AppState::History => match key.code {
                KeyCode::Esc => return Control::Quit,
                KeyCode::Char('b') | KeyCode::Backspace => self.leave_overlay(),
                KeyCode::Up => self.history_scroll = self.history_scroll.saturating_sub(1),
                KeyCode::Down => {
                    if self.history_scroll + 1 < self.history.len() {
                        self.history_scroll += 1;
                    }
                }
                KeyCode::Home => self.history_scroll = 0,
                KeyCode::Char('x') => {
                    if let Err(err) = self.history_store.clear() {
                        warn!(%err, "could not clear history");
                        self.status_message = Some(format!("History not cleared: {err}"));
                    } else {
                        self.history.clear();
                        self.history_scroll = 0;
                    }
                }
                _ => {}
            },
            AppState::Lessons => match key.code {
                KeyCode::Esc => return Control::Quit,
                KeyCode::Char('b') | KeyCode::Backspace => self.leave_overlay(),
                KeyCode::Up => self.lesson_cursor = self.lesson_cursor.saturating_sub(1),
                KeyCode::Down => {
                    if self.lesson_cursor + 1 < self.library.lessons().len() {
                        self.lesson_cursor += 1;
                    }
                }
                KeyCode::Home => self.lesson_cursor = 0,
                KeyCode::Enter => self.select_lesson(self.lesson_cursor),
                _ => {}
            },
        }
        Control::Continue
    }

    fn on_typing_key(&mut self, key: KeyEvent, ctrl: bool) -> Control {
        let hotkey = self.settings.test_reset_hotkey;
        let status = self.session.status();

        match key.code {
            KeyCode::Esc if status == SessionStatus::Idle => return Control::Quit,
            KeyCode::Esc if hotkey.allows_escape() => self.restart(),
            KeyCode::Char('r') if ctrl && hotkey.allows_ctrl_r() => self.restart(),
            KeyCode::Tab => {
                if !self.session.pause() {
                    self.session.resume();
                }
            }
            KeyCode::Left if status == SessionStatus::Idle => self.restart(),
            KeyCode::Right if status == SessionStatus::Idle => self.next_lesson(),
            KeyCode::F(2) if status != SessionStatus::Running => {
                self.history_scroll = 0;
                self.state = AppState::History;
            }
            KeyCode::F(3) if status != SessionStatus::Running => self.open_lessons(),
            KeyCode::Backspace => self.session.backspace(),
            KeyCode::Char(c) if !ctrl => self.session.type_char(c),
            _ => {}
        }

        self.process_session_events();
        Control::Continue
    }
}

fn print_lessons(library: &LessonLibrary) {
    for lesson in library.lessons() {
        println!(
            "{:<16} {:<12} {:<8} {}",
            lesson.id,
            lesson.level,
            lesson.kind.as_deref().unwrap_or("-"),
            lesson.title
        );
    }
}

fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("no finished tests yet");
        return;
    }
    let summary = summarize(entries);
    println!(
        "{} tests   avg {:.0} wpm   best {} wpm   avg {:.0}% acc   {} practiced",
        summary.tests,
        summary.average_wpm,
        summary.best_wpm,
        summary.average_accuracy,
        format_clock(summary.total_secs)
    );
    for (i, entry) in entries.iter().enumerate().rev().take(10) {
        println!(
            "#{:<4} {:>4} wpm {:>4}% acc  {}",
            i + 1,
            entry.stats.wpm,
            entry.stats.accuracy,
            entry
                .completed_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default()
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let _log_file = init_logging(cli.verbose);
    let library = LessonLibrary::builtin();

    if cli.list_lessons {
        print_lessons(&library);
        return Ok(());
    }

    let history_store = JsonHistoryStore::new();
    if cli.history {
        print_history(&history_store.load());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let width = terminal.size()?.width;
    let mut app = App::new(
        &cli,
        Box::new(FileSettingsStore::new()),
        Box::new(history_store),
        library,
        width,
    );
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    let result = run_app(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {
                let width = terminal.size()?.width;
                app.on_resize(width);
            }
            AppEvent::Key(key) => {
                let before = app.session.status();
                if app.on_key(key) == Control::Quit {
                    break;
                }
                if clock_started(before, app.session.status()) {
                    runner.rearm();
                }
            }
        }
    }

    Ok(())
}

/// Start and resume both restart the tick schedule.
fn clock_started(before: SessionStatus, after: SessionStatus) -> bool {
    before != SessionStatus::Running && after == SessionStatus::Running
}

fn ui(app: &mut App, f: &mut Frame) {
    let screen = crate::ui::screen::current_screen(&app.state);
    screen.render(app, f);
}
