//! Application state and event loop for the TUI.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use tracing::{info, warn};

use crate::app::coordinator::{MiningCoordinator, MiningStrategy, PollEvent, Resolution};
use crate::app::debounce::Debouncer;
use crate::app::export::{ExportOptions, ModelExporter};
use crate::app::selection::{IndexSpec, OverrideState, SelectionMode, SelectionState};
use crate::app::session::{SessionSnapshot, SessionStore};
use crate::app::suggest::{SuggestionEvaluator, SuggestionReport};
use crate::app::view::FragmentView;
use crate::domain::fragment::FragmentCollection;
use crate::infra::config::Config;
use crate::infra::log::load_log;
use crate::infra::watch::LogWatcher;
use crate::mine::producer::{FragmentProducer, WindowProducer};
use crate::ui::components::command_palette::{CommandPalette, CommandPaletteState};
use crate::ui::components::fragment_list::{FragmentList, FragmentListState};
use crate::ui::components::summary::{ModelStats, ModelSummary};

const TICK_RATE: Duration = Duration::from_millis(120);
const STATUS_TTL: Duration = Duration::from_secs(4);

const KEY_HINTS: &str = "j/k move · space select · h/l threshold · i/x/c overrides · \
     m mode · r reset · e export · s save · : commands · q quit";

/// Launch options resolved from the CLI and configuration.
#[derive(Debug, Clone)]
pub struct UiOptions {
    pub log: Option<PathBuf>,
    pub watch: bool,
    pub mode: SelectionMode,
    pub strategy: MiningStrategy,
}

/// Primary entry point for running the interactive TUI.
pub struct UiApp {
    config: Config,
    log_path: Option<PathBuf>,
    watch: bool,
    watcher: Option<LogWatcher>,
    selection: SelectionState,
    coordinator: MiningCoordinator,
    evaluator: SuggestionEvaluator,
    report: SuggestionReport,
    view: FragmentView,
    debouncer: Debouncer,
    exporter: ModelExporter,
    session_store: SessionStore,
    list_state: FragmentListState,
    fragment_list: FragmentList,
    summary: ModelSummary,
    palette_state: CommandPaletteState,
    palette: CommandPalette,
    status: Option<StatusMessage>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(config: Config, options: UiOptions) -> Result<Self> {
        let root = std::env::current_dir().context("failed to resolve working directory")?;
        let debouncer = Debouncer::new(config.debounce());
        let exporter = ModelExporter::new(ExportOptions::from_config(&config));
        let coordinator = MiningCoordinator::new(
            Arc::new(FragmentCollection::rank(Vec::new())),
            options.strategy,
            config.synthesis_config(),
        );

        let mut app = Self {
            config,
            log_path: None,
            watch: options.watch,
            watcher: None,
            selection: SelectionState::new(options.mode),
            coordinator,
            evaluator: SuggestionEvaluator::new(),
            report: SuggestionReport::default(),
            view: FragmentView::default(),
            debouncer,
            exporter,
            session_store: SessionStore::new(root),
            list_state: FragmentListState::default(),
            fragment_list: FragmentList::default(),
            summary: ModelSummary::new(),
            palette_state: CommandPaletteState::default(),
            palette: CommandPalette::default(),
            status: None,
            should_quit: false,
        };
        if let Some(path) = options.log.clone() {
            app.open_log(&path)?;
        }
        Ok(app)
    }

    /// Run the TUI until the user quits.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to initialize terminal")?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode().context("failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("failed to leave alternate screen")?;
        terminal.show_cursor().context("failed to restore cursor")?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal
                .draw(|frame| self.render(frame))
                .context("failed to draw frame")?;
            self.tick();
            if self.should_quit {
                break;
            }
            if event::poll(TICK_RATE).context("failed to poll terminal events")?
                && let Event::Key(key) = event::read().context("failed to read terminal event")?
            {
                self.handle_key_event(key)?;
            }
        }
        Ok(())
    }

    /// Periodic work between input events: status expiry, file watching,
    /// the debounce deadline, and finished mining requests.
    fn tick(&mut self) {
        if let Some(status) = &self.status
            && Instant::now() >= status.expires_at
        {
            self.status = None;
        }

        if self.watcher.as_ref().is_some_and(LogWatcher::changed) {
            self.reload_log();
        }

        if self.debouncer.fire_due(Instant::now()) {
            self.resolve_now();
        }

        for event in self.coordinator.poll() {
            match event {
                PollEvent::Published(model) => {
                    self.publish_refresh();
                    if self.exporter.options().auto_export {
                        match self.exporter.export_to_file(&model, None) {
                            Ok(result) => self.set_status(
                                StatusLevel::Success,
                                format!("Exported {}", result.path.display()),
                            ),
                            Err(error) => self.set_status(
                                StatusLevel::Error,
                                format!("Auto-export failed: {error:#}"),
                            ),
                        }
                    } else {
                        self.set_status(
                            StatusLevel::Info,
                            format!(
                                "Model updated: {} places, {} transitions",
                                model.place_count(),
                                model.transition_count()
                            ),
                        );
                    }
                }
                PollEvent::Failed(error) => {
                    self.set_status(StatusLevel::Error, format!("Mining failed: {error}"));
                    self.refresh_view();
                }
            }
        }
    }

    fn render(&self, frame: &mut Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(frame.size());

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(44), Constraint::Length(42)])
            .split(chunks[0]);

        self.fragment_list.render(
            frame,
            body[0],
            &self.view,
            &self.selection,
            &self.list_state,
            !self.palette_state.is_open(),
        );
        self.summary.render(frame, body[1]);
        self.render_hints(frame, chunks[1]);
        self.render_status(frame, chunks[2]);
        self.palette.render(frame, frame.size(), &self.palette_state);
    }

    fn render_hints(&self, frame: &mut Frame<'_>, area: Rect) {
        let paragraph = Paragraph::new(KEY_HINTS).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame<'_>, area: Rect) {
        let Some(status) = &self.status else {
            return;
        };
        let style = match status.level {
            StatusLevel::Info => Style::default().fg(Color::Gray),
            StatusLevel::Success => Style::default().fg(Color::Green),
            StatusLevel::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        };
        let paragraph = Paragraph::new(status.text.clone()).style(style);
        frame.render_widget(paragraph, area);
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if self.palette_state.is_open() {
            self.handle_palette_key(key);
            return Ok(());
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('s') => self.save_session(),
                KeyCode::Char('e') => self.export_model(None),
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(':') => self.palette_state.open(),
            KeyCode::Down | KeyCode::Char('j') => self.list_state.select_next(self.view.len()),
            KeyCode::Up | KeyCode::Char('k') => self.list_state.select_previous(),
            KeyCode::Char(' ') => self.toggle_at_cursor(),
            KeyCode::Left | KeyCode::Char('h') => self.adjust_threshold(false),
            KeyCode::Right | KeyCode::Char('l') => self.adjust_threshold(true),
            KeyCode::Char('i') => self.force_at_cursor(OverrideState::ForceInclude),
            KeyCode::Char('x') => self.force_at_cursor(OverrideState::ForceExclude),
            KeyCode::Char('c') => self.clear_override_at_cursor(),
            KeyCode::Char('m') => self.cycle_mode(),
            KeyCode::Char('r') => {
                self.selection.reset();
                self.set_status(StatusLevel::Info, "Selection cleared");
                self.resolve_now();
            }
            KeyCode::Char('s') => self.save_session(),
            KeyCode::Char('e') => self.export_model(None),
            _ => {}
        }
        Ok(())
    }

    fn handle_palette_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.palette_state.close(),
            KeyCode::Enter => {
                let command = self.palette_state.take_input();
                self.palette_state.close();
                if let Err(error) = self.execute_command(&command) {
                    self.set_status(StatusLevel::Error, format!("{error:#}"));
                }
            }
            KeyCode::Backspace => self.palette_state.pop_char(),
            KeyCode::Up => self.palette_state.recall_previous(),
            KeyCode::Down => self.palette_state.recall_next(),
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.palette_state.push_char(ch);
            }
            _ => {}
        }
    }

    fn execute_command(&mut self, command: &str) -> Result<()> {
        let trimmed = command.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        let (verb, rest) = trimmed
            .split_once(' ')
            .map(|(verb, rest)| (verb, rest.trim()))
            .unwrap_or((trimmed, ""));

        match verb {
            "open" => {
                if rest.is_empty() {
                    bail!("usage: open <path>");
                }
                self.open_log(Path::new(rest))?;
            }
            "mode" => {
                let mode: SelectionMode = rest.parse()?;
                self.set_mode(mode);
            }
            "strategy" => {
                let strategy: MiningStrategy = rest.parse()?;
                self.coordinator.set_strategy(strategy);
                self.set_status(
                    StatusLevel::Info,
                    format!("Mining strategy: {}", strategy.as_str()),
                );
                self.update_summary();
            }
            "threshold" => {
                if matches!(self.selection.mode(), SelectionMode::Explicit) {
                    bail!("threshold only applies in a threshold mode");
                }
                let threshold = match rest {
                    "" => bail!("usage: threshold <index|none>"),
                    "none" => None,
                    value => Some(
                        value
                            .parse::<usize>()
                            .with_context(|| format!("invalid threshold '{value}'"))?,
                    ),
                };
                let clamped = match threshold {
                    Some(_) if self.view.is_empty() => None,
                    Some(boundary) => Some(boundary.min(self.view.len() - 1)),
                    None => None,
                };
                self.selection.set_threshold(clamped);
                self.resolve_now();
            }
            "select" => {
                let spec: IndexSpec = rest.parse()?;
                let resolved = spec.resolve(self.coordinator.fragments().len());
                self.selection.set_mode(SelectionMode::Explicit);
                self.selection.reset();
                for index in resolved {
                    self.selection.add(index);
                }
                self.set_status(StatusLevel::Info, "Explicit selection applied");
                self.resolve_now();
            }
            "export" => {
                let explicit = (!rest.is_empty()).then(|| PathBuf::from(rest));
                self.export_model(explicit.as_deref());
            }
            "copy" => self.copy_model(),
            "clear-cache" => {
                self.coordinator.clear_cache();
                self.set_status(StatusLevel::Info, "Incremental caches cleared");
                self.update_summary();
            }
            "reset" => {
                self.selection.reset();
                self.set_status(StatusLevel::Info, "Selection cleared");
                self.resolve_now();
            }
            "save" => self.save_session(),
            "quit" | "q" => self.should_quit = true,
            "help" => self.set_status(StatusLevel::Info, COMMAND_HELP),
            other => bail!("unknown command '{other}'"),
        }
        Ok(())
    }

    /// Load a log, rank its fragments, and restore a saved session when the
    /// recorded fingerprint still matches.
    fn open_log(&mut self, path: &Path) -> Result<()> {
        let log = load_log(path)?;
        let fragments = Arc::new(WindowProducer.produce(&log, &self.config.producer_options()));
        let fingerprint = fragments.fingerprint();
        let count = fragments.len();

        self.coordinator.set_fragments(Arc::clone(&fragments));
        self.log_path = Some(path.to_path_buf());
        self.watcher = if self.watch {
            match LogWatcher::new(path) {
                Ok(watcher) => Some(watcher),
                Err(error) => {
                    warn!(%error, "file watching unavailable");
                    None
                }
            }
        } else {
            None
        };

        self.selection = SelectionState::new(self.selection.mode());
        let restored = match self.session_store.load() {
            Ok(Some(snapshot)) if snapshot.matches(fingerprint) => {
                self.selection = snapshot.restore();
                true
            }
            Ok(_) => false,
            Err(error) => {
                warn!(%error, "ignoring unreadable session file");
                false
            }
        };

        self.report = SuggestionReport::default();
        self.list_state = FragmentListState::default();
        self.debouncer.cancel();
        info!(path = %path.display(), fragments = count, restored, "opened event log");
        if restored {
            self.set_status(
                StatusLevel::Info,
                format!("Restored session for {}", path.display()),
            );
        } else {
            self.set_status(
                StatusLevel::Info,
                format!("Opened {} ({count} fragments)", path.display()),
            );
        }
        self.resolve_now();
        Ok(())
    }

    /// Re-rank after the watched log changed on disk. The old indices no
    /// longer mean anything, so the selection starts over.
    fn reload_log(&mut self) {
        let Some(path) = self.log_path.clone() else {
            return;
        };
        match load_log(&path) {
            Ok(log) => {
                let fragments =
                    Arc::new(WindowProducer.produce(&log, &self.config.producer_options()));
                let count = fragments.len();
                self.coordinator.set_fragments(fragments);
                self.selection = SelectionState::new(self.selection.mode());
                self.report = SuggestionReport::default();
                self.set_status(
                    StatusLevel::Info,
                    format!("Log changed on disk, reloaded ({count} fragments)"),
                );
                self.resolve_now();
            }
            Err(error) => {
                self.set_status(StatusLevel::Error, format!("Reload failed: {error:#}"));
            }
        }
    }

    /// Bring the model in line with the current selection right away.
    fn resolve_now(&mut self) {
        self.debouncer.cancel();
        let effective = self.selection.effective_set();
        match self.coordinator.resolve(&effective) {
            Resolution::EmptyPublished | Resolution::Republished => self.publish_refresh(),
            Resolution::Scheduled => self.refresh_view(),
        }
    }

    /// Defer mining past a burst of rapid changes, but show the new
    /// selection immediately.
    fn schedule_resolve(&mut self) {
        self.debouncer.arm(Instant::now());
        self.refresh_view();
    }

    /// A settle point: the published model changed, so rescan suggestions
    /// and swap the report wholesale.
    fn publish_refresh(&mut self) {
        let model = self.coordinator.model();
        let fragments = Arc::clone(self.coordinator.fragments());
        self.report = self.evaluator.evaluate(&fragments, &self.selection, &model);
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        let fragments = Arc::clone(self.coordinator.fragments());
        self.view = FragmentView::project(&fragments, &self.selection, &self.report);
        self.list_state.clamp(self.view.len());
        self.update_summary();
    }

    fn update_summary(&mut self) {
        if self.log_path.is_none() {
            self.summary.clear();
            return;
        }
        let model = self.coordinator.model();
        self.summary.update(ModelStats {
            places: model.place_count(),
            transitions: model.transition_count(),
            arcs: model.arc_count(),
            fragments: self.view.len(),
            selected: self.selection.effective_set().len(),
            suggested: self.report.suggested_count(),
            included_weight: self.view.included_weight(),
            total_weight: self.view.total_weight,
            strategy: self.coordinator.strategy(),
            mining: self.coordinator.is_mining(),
            mining_calls: self.coordinator.mining_calls(),
            cached_pieces: self.coordinator.cached_pieces(),
        });
    }

    fn toggle_at_cursor(&mut self) {
        if self.view.is_empty() {
            return;
        }
        let index = self.list_state.cursor();
        match self.selection.mode() {
            SelectionMode::Explicit => {
                self.selection.toggle(index);
                self.resolve_now();
            }
            // In the threshold modes, space moves the boundary to the
            // cursor; pressing it there again clears the boundary.
            SelectionMode::Threshold | SelectionMode::ThresholdOverrides => {
                if self.selection.threshold() == Some(index) {
                    self.selection.set_threshold(None);
                } else {
                    self.selection.set_threshold(Some(index));
                }
                self.resolve_now();
            }
        }
    }

    fn adjust_threshold(&mut self, grow: bool) {
        if matches!(self.selection.mode(), SelectionMode::Explicit) {
            self.set_status(StatusLevel::Info, "Threshold keys need a threshold mode");
            return;
        }
        if self.view.is_empty() {
            return;
        }
        let limit = self.view.len() - 1;
        let next = match (self.selection.threshold(), grow) {
            (None, true) => Some(0),
            (None, false) => None,
            (Some(0), false) => None,
            (Some(boundary), false) => Some(boundary - 1),
            (Some(boundary), true) => Some(boundary.saturating_add(1).min(limit)),
        };
        self.selection.set_threshold(next);
        self.schedule_resolve();
    }

    fn force_at_cursor(&mut self, force: OverrideState) {
        if self.view.is_empty() {
            return;
        }
        if !matches!(self.selection.mode(), SelectionMode::ThresholdOverrides) {
            self.set_status(StatusLevel::Info, "Overrides need threshold-overrides mode");
            return;
        }
        let index = self.list_state.cursor();
        if self.selection.override_of(index) == Some(force) {
            self.lift_override(index);
            return;
        }
        match force {
            OverrideState::ForceInclude => self.selection.whitelist_add(index),
            OverrideState::ForceExclude => self.selection.blacklist_add(index),
        }
        self.resolve_now();
    }

    fn clear_override_at_cursor(&mut self) {
        if self.view.is_empty() {
            return;
        }
        let index = self.list_state.cursor();
        if self.selection.override_of(index).is_some() {
            self.lift_override(index);
        }
    }

    /// Drop an override and patch that one verdict against the current
    /// model; the next settle point rescans everything anyway.
    fn lift_override(&mut self, index: usize) {
        self.selection.clear_override(index);
        let model = self.coordinator.model();
        let fragments = Arc::clone(self.coordinator.fragments());
        let verdict = self
            .evaluator
            .evaluate_one(&fragments, &self.selection, &model, index);
        self.report.set(index, verdict);
        self.resolve_now();
    }

    fn cycle_mode(&mut self) {
        let next = match self.selection.mode() {
            SelectionMode::Explicit => SelectionMode::Threshold,
            SelectionMode::Threshold => SelectionMode::ThresholdOverrides,
            SelectionMode::ThresholdOverrides => SelectionMode::Explicit,
        };
        self.set_mode(next);
    }

    fn set_mode(&mut self, mode: SelectionMode) {
        self.selection.set_mode(mode);
        self.set_status(StatusLevel::Info, format!("Selection mode: {}", mode.as_str()));
        self.resolve_now();
    }

    fn save_session(&mut self) {
        let fingerprint = self.coordinator.fragments().fingerprint();
        let snapshot =
            SessionSnapshot::capture(&self.selection, fingerprint, self.log_path.as_deref());
        match self.session_store.save(&snapshot) {
            Ok(()) => self.set_status(
                StatusLevel::Success,
                format!("Session saved to {}", self.session_store.path().display()),
            ),
            Err(error) => {
                self.set_status(StatusLevel::Error, format!("Session save failed: {error:#}"));
            }
        }
    }

    fn export_model(&mut self, explicit: Option<&Path>) {
        let model = self.coordinator.model();
        match self.exporter.export_to_file(&model, explicit) {
            Ok(result) => {
                let clipboard = if result.copied { ", copied" } else { "" };
                self.set_status(
                    StatusLevel::Success,
                    format!(
                        "Exported {} ({} bytes{clipboard})",
                        result.path.display(),
                        result.bytes
                    ),
                );
            }
            Err(error) => self.set_status(StatusLevel::Error, format!("Export failed: {error:#}")),
        }
    }

    fn copy_model(&mut self) {
        let model = self.coordinator.model();
        match self.exporter.copy_to_clipboard(&model) {
            Ok(bytes) => self.set_status(StatusLevel::Success, format!("Copied {bytes} bytes")),
            Err(error) => self.set_status(StatusLevel::Error, format!("Copy failed: {error:#}")),
        }
    }

    fn set_status(&mut self, level: StatusLevel, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            level,
            text: text.into(),
            expires_at: Instant::now() + STATUS_TTL,
        });
    }
}

const COMMAND_HELP: &str = "commands: open <path> · mode <m> · strategy <s> · threshold <n|none> · \
     select <spec> · export [path] · copy · clear-cache · reset · save · quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
struct StatusMessage {
    level: StatusLevel,
    text: String,
    expires_at: Instant,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::view::FragmentStatus;

    fn app() -> UiApp {
        UiApp::new(
            Config::default(),
            UiOptions {
                log: None,
                watch: false,
                mode: SelectionMode::ThresholdOverrides,
                strategy: MiningStrategy::Incremental,
            },
        )
        .unwrap()
    }

    fn open_fixture(app: &mut UiApp) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("orders.log");
        std::fs::write(&log_path, "3x a b\na b\nc\n").unwrap();
        app.session_store = SessionStore::new(dir.path());
        app.open_log(&log_path).unwrap();
        dir
    }

    fn settle(app: &mut UiApp) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.coordinator.is_mining() && Instant::now() < deadline {
            app.tick();
            std::thread::sleep(Duration::from_millis(2));
        }
        app.tick();
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn space_sets_the_boundary_and_mines() {
        let mut app = app();
        let _dir = open_fixture(&mut app);
        settle(&mut app);
        assert!(app.coordinator.model().is_empty());

        app.handle_key_event(key(KeyCode::Char(' '))).unwrap();
        settle(&mut app);
        assert_eq!(app.selection.threshold(), Some(0));
        assert!(!app.coordinator.model().is_empty());
        assert_eq!(app.view.rows[0].status, FragmentStatus::Included);
        assert_eq!(app.report.len(), app.view.len());
    }

    #[test]
    fn override_keys_force_and_lift() {
        let mut app = app();
        let _dir = open_fixture(&mut app);

        app.handle_key_event(key(KeyCode::Char('i'))).unwrap();
        settle(&mut app);
        assert_eq!(
            app.selection.override_of(0),
            Some(OverrideState::ForceInclude)
        );
        assert_eq!(app.view.rows[0].status, FragmentStatus::ForcedIncluded);

        // Pressing the same key again lifts the override.
        app.handle_key_event(key(KeyCode::Char('i'))).unwrap();
        settle(&mut app);
        assert_eq!(app.selection.override_of(0), None);
        assert!(app.coordinator.model().is_empty());
    }

    #[test]
    fn palette_commands_drive_mode_and_strategy() {
        let mut app = app();
        app.execute_command("mode explicit").unwrap();
        assert_eq!(app.selection.mode(), SelectionMode::Explicit);
        app.execute_command("strategy full").unwrap();
        assert_eq!(app.coordinator.strategy(), MiningStrategy::Full);
        assert!(app.execute_command("warp 9").is_err());
        assert!(app.execute_command("mode sideways").is_err());
    }

    #[test]
    fn select_command_switches_to_explicit_membership() {
        let mut app = app();
        let _dir = open_fixture(&mut app);
        app.execute_command("select 0").unwrap();
        settle(&mut app);
        assert_eq!(app.selection.mode(), SelectionMode::Explicit);
        assert!(app.selection.contains(0));
        assert!(!app.coordinator.model().is_empty());
    }
}
