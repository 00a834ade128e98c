//! Reader state machine.
//!
//! [`App`] owns the active category, the article panel state, the two admin
//! panes and the auto-refresh scheduler. Every user action ends in the same
//! path: bump the request sequence number, mark the panel `Loading`, spawn
//! the fetch, and later paint the result carried by [`AppEvent::ArticlesLoaded`]
//! if its sequence number is still the latest one issued.
//!
//! Nothing here touches the terminal; `ui` drives these methods from key
//! presses and draws whatever state they leave behind.
use std::borrow::Cow;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::api::{FetchError, FetchRequest, NewsClient};
use crate::article::Article;
use crate::render::{DisplayFragment, Renderer};
use crate::scheduler::RefreshScheduler;
use crate::settings::{Settings, SettingsStore};

// ============================================================================
// Request Kinds and Panel State
// ============================================================================

/// Which user-facing copy a fetch uses while loading and on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Browse,
    Search,
}

impl FetchKind {
    pub fn loading_message(self) -> &'static str {
        match self {
            Self::Browse => "Loading news feed...",
            Self::Search => "Searching news...",
        }
    }

    pub fn failure_headline(self) -> &'static str {
        match self {
            Self::Browse => "Failed to load news. Please try again later.",
            Self::Search => "Failed to search news. Please try again later.",
        }
    }
}

/// Article panel: `Idle → Loading → {Rendered | Errored}`, re-entered per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelState {
    Idle,
    Loading { seq: u64, kind: FetchKind },
    Rendered(DisplayFragment),
    Errored { kind: FetchKind, cause: String },
}

impl PanelState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// The fragment to paint for this state.
    pub fn fragment(&self) -> Cow<'_, DisplayFragment> {
        match self {
            Self::Idle => Cow::Owned(DisplayFragment::NoResults),
            Self::Loading { kind, .. } => Cow::Owned(DisplayFragment::loading(kind.loading_message())),
            Self::Rendered(fragment) => Cow::Borrowed(fragment),
            Self::Errored { kind, cause } => {
                Cow::Owned(DisplayFragment::error(kind.failure_headline(), cause.clone()))
            }
        }
    }
}

/// State of an admin request/response pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneState {
    Idle,
    Loading,
    Done(String),
    Failed(String),
}

// ============================================================================
// Input Modes and Settings Form
// ============================================================================

/// Which text input (or modal) currently receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    CustomSource,
    SourceId,
    ImportData,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    RefreshInterval,
    DefaultCategory,
}

/// Editable copy of [`Settings`] shown in the settings modal.
///
/// The interval is edited in whole seconds and stored in milliseconds. A
/// stored default that is not among the configured categories has no index
/// and is written back unchanged unless the user picks another category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    pub interval_secs: String,
    pub category_index: Option<usize>,
    pub stored_category: String,
    pub field: SettingsField,
}

impl SettingsForm {
    pub fn from_settings(settings: &Settings, categories: &[String]) -> Self {
        Self {
            interval_secs: (settings.refresh_interval_ms / 1000).to_string(),
            category_index: categories
                .iter()
                .position(|c| *c == settings.default_category),
            stored_category: settings.default_category.clone(),
            field: SettingsField::RefreshInterval,
        }
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            SettingsField::RefreshInterval => SettingsField::DefaultCategory,
            SettingsField::DefaultCategory => SettingsField::RefreshInterval,
        };
    }

    pub fn cycle_category(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        self.category_index = Some(match self.category_index {
            Some(index) => (index as isize + delta).rem_euclid(len as isize) as usize,
            None if delta < 0 => len - 1,
            None => 0,
        });
    }

    /// Category currently shown in the form.
    pub fn category<'a>(&'a self, categories: &'a [String]) -> &'a str {
        self.category_index
            .and_then(|index| categories.get(index))
            .map(String::as_str)
            .unwrap_or(self.stored_category.as_str())
    }

    /// Validates the form. Errors are user-facing messages.
    pub fn to_settings(&self, categories: &[String]) -> Result<Settings, String> {
        let secs: u64 = self
            .interval_secs
            .trim()
            .parse()
            .map_err(|_| "Refresh interval must be a whole number of seconds".to_string())?;
        let refresh_interval_ms = secs
            .checked_mul(1000)
            .ok_or_else(|| "Refresh interval is too large".to_string())?;
        let default_category = self.category(categories).to_string();
        if default_category.trim().is_empty() {
            return Err("No category selected".to_string());
        }
        Ok(Settings {
            default_category,
            refresh_interval_ms,
        })
    }
}

// ============================================================================
// Events
// ============================================================================

/// Results from background tasks and timer ticks.
#[derive(Debug)]
pub enum AppEvent {
    /// An article fetch finished. Painted only if `seq` is still current.
    ArticlesLoaded {
        seq: u64,
        result: Result<Vec<Article>, FetchError>,
    },
    /// Admin source lookup finished.
    SourceLoaded {
        generation: u64,
        result: Result<Value, FetchError>,
    },
    /// Admin import finished.
    ImportFinished {
        generation: u64,
        result: Result<u64, FetchError>,
    },
    /// The auto-refresh timer fired.
    RefreshTick,
    /// A background task panicked. `seq` is set for article fetches.
    TaskPanicked {
        task: &'static str,
        seq: Option<u64>,
        error: String,
    },
}

/// Runs `future`, converting a panic into `Err(message)`.
async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future).catch_unwind().await.map_err(|panic| {
        if let Some(s) = panic.downcast_ref::<&'static str>() {
            s.to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        }
    })
}

/// Spawns `future` and sends the event built from its output, or
/// `TaskPanicked` if it panics.
fn spawn_reporting<F, T>(
    task: &'static str,
    seq: Option<u64>,
    event_tx: &mpsc::Sender<AppEvent>,
    future: F,
    to_event: impl FnOnce(T) -> AppEvent + Send + 'static,
) where
    F: std::future::Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let event = match catch_task_panic(future).await {
            Ok(output) => to_event(output),
            Err(error) => AppEvent::TaskPanicked { task, seq, error },
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(task, error = %e, "Failed to deliver task result (receiver dropped)");
        }
    });
}

// ============================================================================
// Application State
// ============================================================================

/// How long a status message stays visible.
const STATUS_TTL_SECS: u64 = 3;

pub struct App {
    client: NewsClient,
    settings_store: SettingsStore,
    renderer: Renderer,
    event_tx: mpsc::Sender<AppEvent>,
    scheduler: RefreshScheduler,

    /// Category filter controls, in display order.
    pub categories: Vec<String>,
    settings: Settings,
    active_category: String,

    pub panel: PanelState,
    request_seq: u64,

    pub source_pane: PaneState,
    source_generation: u64,
    pub import_pane: PaneState,
    import_generation: u64,

    // Terminal UI state
    pub mode: InputMode,
    pub search_input: String,
    pub custom_source_input: String,
    pub source_id_input: String,
    pub import_input: String,
    pub settings_form: Option<SettingsForm>,
    pub selected_card: usize,
    pub show_admin: bool,
    pub show_help: bool,
    pub needs_redraw: bool,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
}

impl App {
    pub fn new(
        client: NewsClient,
        settings_store: SettingsStore,
        renderer: Renderer,
        categories: Vec<String>,
        event_tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        let settings = Settings::default();
        let active_category = settings.default_category.clone();
        Self {
            client,
            settings_store,
            renderer,
            event_tx,
            scheduler: RefreshScheduler::new(),
            categories,
            settings,
            active_category,
            panel: PanelState::Idle,
            request_seq: 0,
            source_pane: PaneState::Idle,
            source_generation: 0,
            import_pane: PaneState::Idle,
            import_generation: 0,
            mode: InputMode::Normal,
            search_input: String::new(),
            custom_source_input: String::new(),
            source_id_input: String::new(),
            import_input: String::new(),
            settings_form: None,
            selected_card: 0,
            show_admin: false,
            show_help: false,
            needs_redraw: true,
            status_message: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn active_category(&self) -> &str {
        &self.active_category
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Sequence number of the most recently issued article fetch.
    pub fn request_seq(&self) -> u64 {
        self.request_seq
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    /// Index of the active category among the filter controls, if listed.
    pub fn active_category_index(&self) -> Option<usize> {
        self.categories.iter().position(|c| *c == self.active_category)
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Startup: load settings, activate the default category, arm the
    /// scheduler and fetch.
    pub fn init(&mut self) {
        self.settings = self.settings_store.load();
        self.active_category = self.settings.default_category.clone();
        tracing::info!(
            category = %self.active_category,
            refresh_interval_ms = self.settings.refresh_interval_ms,
            "Reader initialized"
        );
        self.arm_scheduler();
        self.fetch_active();
    }

    /// A category control was chosen: it becomes active, is persisted as the
    /// default and is fetched.
    pub fn select_category(&mut self, category: &str) {
        tracing::debug!(category, "Category selected");
        self.active_category = category.to_string();
        self.settings.default_category = category.to_string();
        self.persist_settings();
        self.fetch_active();
    }

    pub fn select_category_index(&mut self, index: usize) {
        if let Some(category) = self.categories.get(index).cloned() {
            self.select_category(&category);
        }
    }

    /// Moves the active control left/right, wrapping around.
    pub fn cycle_category(&mut self, delta: isize) {
        let len = self.categories.len();
        if len == 0 {
            return;
        }
        let current = self.active_category_index().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len as isize) as usize;
        self.select_category_index(next);
    }

    /// Search submitted (Enter). A blank term is a plain category fetch.
    pub fn submit_search(&mut self) {
        let request = FetchRequest::new(self.active_category.clone()).with_search(&self.search_input);
        self.begin_fetch(request);
    }

    /// The search box value changed. Editing it down to blank reverts to a
    /// plain category fetch.
    pub fn edit_search_input(&mut self, value: String) {
        let was_blank = self.search_input.trim().is_empty();
        self.search_input = value;
        if !was_blank && self.search_input.trim().is_empty() {
            tracing::debug!("Search cleared, reverting to category");
            self.fetch_active();
        }
    }

    /// One-shot fetch of the active category from the typed alternate source.
    pub fn apply_custom_source(&mut self) {
        let url = self.custom_source_input.trim().to_string();
        if url.is_empty() {
            self.set_status("Please enter a custom API URL");
            return;
        }
        let request = FetchRequest::new(self.active_category.clone()).with_source(&url);
        self.begin_fetch(request);
    }

    /// Manual refresh of the active category.
    pub fn refresh(&mut self) {
        self.fetch_active();
    }

    /// Opens the settings modal with the currently persisted values.
    pub fn open_settings(&mut self) {
        self.settings = self.settings_store.load();
        self.settings_form = Some(SettingsForm::from_settings(&self.settings, &self.categories));
        self.mode = InputMode::Settings;
    }

    pub fn close_settings(&mut self) {
        self.settings_form = None;
        self.mode = InputMode::Normal;
    }

    /// Validates and saves the settings modal.
    pub fn submit_settings_form(&mut self) {
        let Some(form) = self.settings_form.as_ref() else {
            return;
        };
        match form.to_settings(&self.categories) {
            Ok(settings) => {
                self.close_settings();
                self.save_settings(settings);
                self.set_status("Settings saved");
            }
            Err(msg) => self.set_status(msg),
        }
    }

    /// Settings saved: persist, re-arm the timer, activate the new default
    /// and fetch it.
    pub fn save_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.persist_settings();
        self.arm_scheduler();
        self.active_category = self.settings.default_category.clone();
        self.fetch_active();
    }

    /// Admin: look up the source whose id is typed in the source box.
    pub fn lookup_source(&mut self) {
        self.source_generation = self.source_generation.wrapping_add(1);
        let generation = self.source_generation;
        self.source_pane = PaneState::Loading;

        let client = self.client.clone();
        let id = self.source_id_input.clone();
        spawn_reporting(
            "source_lookup",
            None,
            &self.event_tx,
            async move { client.fetch_source(&id).await },
            move |result| AppEvent::SourceLoaded { generation, result },
        );
    }

    /// Admin: import the payload typed in the import box.
    pub fn import_data(&mut self) {
        let data = self.import_input.trim().to_string();
        if data.is_empty() {
            self.set_status("Please enter base64 encoded data");
            return;
        }

        self.import_generation = self.import_generation.wrapping_add(1);
        let generation = self.import_generation;
        self.import_pane = PaneState::Loading;

        let client = self.client.clone();
        spawn_reporting(
            "import",
            None,
            &self.event_tx,
            async move { client.import_data(&data).await },
            move |result| AppEvent::ImportFinished { generation, result },
        );
    }

    // ========================================================================
    // Event Handling
    // ========================================================================

    pub fn handle_event(&mut self, event: AppEvent) {
        self.needs_redraw = true;
        match event {
            AppEvent::ArticlesLoaded { seq, result } => self.handle_articles_loaded(seq, result),
            AppEvent::SourceLoaded { generation, result } => {
                if generation != self.source_generation {
                    tracing::debug!(generation, "Ignoring stale source lookup");
                    return;
                }
                self.source_pane = match result {
                    Ok(source) => PaneState::Done(
                        serde_json::to_string_pretty(&source).unwrap_or_else(|_| source.to_string()),
                    ),
                    Err(e) => {
                        tracing::warn!(error = %e, "Source lookup failed");
                        PaneState::Failed(format!("Error: {e}"))
                    }
                };
            }
            AppEvent::ImportFinished { generation, result } => {
                if generation != self.import_generation {
                    tracing::debug!(generation, "Ignoring stale import result");
                    return;
                }
                self.import_pane = match result {
                    Ok(count) => PaneState::Done(format!(
                        "Import successful! {count} items imported."
                    )),
                    Err(e) => {
                        tracing::warn!(error = %e, "Import failed");
                        PaneState::Failed(format!("Import failed: {e}"))
                    }
                };
            }
            AppEvent::RefreshTick => {
                tracing::debug!(category = %self.active_category, "Auto-refresh tick");
                self.fetch_active();
            }
            AppEvent::TaskPanicked { task, seq, error } => {
                tracing::error!(task, ?seq, error = %error, "Background task panicked");
                self.set_status(format!("Internal error in {task} task"));
                // Same rule as results: only the latest fetch may repaint
                if let PanelState::Loading { seq: current, kind } = self.panel {
                    if seq == Some(current) && current == self.request_seq {
                        self.panel = PanelState::Errored {
                            kind,
                            cause: "Internal error".to_string(),
                        };
                    }
                }
            }
        }
    }

    fn handle_articles_loaded(&mut self, seq: u64, result: Result<Vec<Article>, FetchError>) {
        if seq != self.request_seq {
            tracing::debug!(
                expected = self.request_seq,
                got = seq,
                "Ignoring stale article fetch (sequence mismatch)"
            );
            return;
        }

        let kind = match self.panel {
            PanelState::Loading { kind, .. } => kind,
            _ => FetchKind::Browse,
        };

        self.panel = match result {
            Ok(articles) => PanelState::Rendered(self.renderer.render(&articles)),
            Err(e) => {
                tracing::warn!(seq, error = %e, "Article fetch failed");
                PanelState::Errored {
                    kind,
                    cause: e.to_string(),
                }
            }
        };
        self.selected_card = 0;
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn fetch_active(&mut self) {
        self.begin_fetch(FetchRequest::new(self.active_category.clone()));
    }

    /// Issues a fetch without cancelling any in flight; only the newest
    /// sequence number will be painted.
    fn begin_fetch(&mut self, request: FetchRequest) {
        self.request_seq = self.request_seq.wrapping_add(1);
        let seq = self.request_seq;
        let kind = if request.is_search() {
            FetchKind::Search
        } else {
            FetchKind::Browse
        };
        self.panel = PanelState::Loading { seq, kind };
        self.selected_card = 0;
        self.needs_redraw = true;

        tracing::debug!(seq, category = %request.category, ?kind, "Spawning article fetch");

        let client = self.client.clone();
        spawn_reporting(
            "fetch",
            Some(seq),
            &self.event_tx,
            async move { client.fetch_articles(&request).await },
            move |result| AppEvent::ArticlesLoaded { seq, result },
        );
    }

    fn arm_scheduler(&mut self) {
        let tx = self.event_tx.clone();
        self.scheduler.arm(self.settings.refresh_interval(), move || {
            if let Err(e) = tx.try_send(AppEvent::RefreshTick) {
                tracing::debug!(error = %e, "Dropped auto-refresh tick");
            }
        });
    }

    fn persist_settings(&mut self) {
        if let Err(e) = self.settings_store.save(&self.settings) {
            tracing::warn!(error = %e, "Failed to persist settings");
            self.set_status(format!("Could not save settings: {e}"));
        }
    }

    // ========================================================================
    // Status Line and Selection
    // ========================================================================

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear status message if expired. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    pub fn nav_down(&mut self) {
        let count = self.panel.fragment().item_count();
        if count > 0 && self.selected_card + 1 < count {
            self.selected_card += 1;
        }
    }

    pub fn nav_up(&mut self) {
        self.selected_card = self.selected_card.saturating_sub(1);
    }

    /// Read-more link of the selected card.
    pub fn selected_link(&self) -> Option<String> {
        match &self.panel {
            PanelState::Rendered(fragment) => fragment
                .cards()
                .get(self.selected_card)
                .and_then(|card| card.read_more_url.clone()),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
