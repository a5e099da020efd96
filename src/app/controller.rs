use super::event::{AppEvent, InputEvent};
use super::state::{AppState, QueryKey};
use crate::core::config::Config;
use crate::services::paths::PathIndex;
use crate::services::preview::{PreviewLoaded, PreviewLoader, PreviewRequest};
use crate::services::search::{
    CaseSensitivity, Debouncer, ResultBatcher, RipgrepBackend, SearchBackend, SessionEvent,
    SessionManager, SessionOutcome,
};
use crate::services::types::{complete_last_segment, parse_types, TypeCatalog};
use std::sync::Arc;
use tokio::sync::mpsc;

const PAGE_SIZE: usize = 10;

/// What the caller should do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Visible state changed.
    Redraw,
    Idle,
    Exit,
}

/// The event-loop side of the application.
///
/// Owns `AppState` and every coordinator. Workers report back through the
/// `AppEvent` queue; `handle` consumes one event at a time.
pub struct Controller {
    state: AppState,
    debouncer: Debouncer,
    sessions: SessionManager<AppEvent>,
    previews: PreviewLoader,
    paths: Arc<PathIndex>,
    types: TypeCatalog,
    events: mpsc::UnboundedSender<AppEvent>,
    last_key: QueryKey,
    preview_requests: PreviewRequest,
    // only this request may replace the visible preview
    pending_preview: Option<PreviewRequest>,
}

impl Controller {
    pub fn new(config: &Config, types: TypeCatalog, events: mpsc::UnboundedSender<AppEvent>) -> Self {
        let backend = RipgrepBackend::new(&config.search_tool)
            .with_max_count(config.process_max_count)
            .with_buffer(config.match_buffer);
        Self::with_backend(config, Arc::new(backend), types, events)
    }

    pub fn with_backend(
        config: &Config,
        backend: Arc<dyn SearchBackend>,
        types: TypeCatalog,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let batcher = ResultBatcher::new(config.batch_size, config.batch_interval);
        let paths = PathIndex::new(&config.root).with_limits(
            config.path_max_depth,
            config.path_cache_ttl,
            config.path_max_results,
        );
        let state = AppState::new(config);
        let last_key = state.query_key();

        Self {
            state,
            debouncer: Debouncer::new(config.debounce_delay),
            sessions: SessionManager::new(backend, batcher, events.clone()),
            previews: PreviewLoader::new(config.preview_context),
            paths: Arc::new(paths),
            types,
            events,
            last_key,
            preview_requests: 0,
            pending_preview: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn sessions(&self) -> &SessionManager<AppEvent> {
        &self.sessions
    }

    /// Consumes events until `Quit`, calling `on_redraw` after each
    /// visible change.
    pub async fn run<F>(mut self, mut events: mpsc::UnboundedReceiver<AppEvent>, mut on_redraw: F)
    where
        F: FnMut(&AppState),
    {
        while let Some(event) = events.recv().await {
            match self.handle(event) {
                Flow::Exit => break,
                Flow::Redraw => on_redraw(&self.state),
                Flow::Idle => {}
            }
        }
        self.shutdown();
    }

    pub fn shutdown(&mut self) {
        self.debouncer.invalidate();
        self.sessions.cancel_current();
    }

    pub fn handle(&mut self, event: AppEvent) -> Flow {
        match event {
            AppEvent::Input(input) => self.handle_input(input),
            AppEvent::DebounceFired(token) => {
                if !self.debouncer.is_current(token) {
                    tracing::trace!("ignoring superseded debounce token {:?}", token);
                    return Flow::Idle;
                }
                self.start_search();
                Flow::Redraw
            }
            AppEvent::Session(event) => self.handle_session(event),
            AppEvent::PreviewLoaded(loaded) => self.handle_preview(loaded),
            AppEvent::PathCompletions { input, entries } => {
                if input != self.state.path {
                    return Flow::Idle;
                }
                self.state.path_suggestions = entries;
                Flow::Redraw
            }
        }
    }

    fn handle_input(&mut self, input: InputEvent) -> Flow {
        match input {
            InputEvent::PatternChanged(pattern) => {
                self.state.pattern = pattern;
                self.query_edited()
            }
            InputEvent::PathChanged(path) => {
                self.state.path = path;
                self.request_path_completions();
                self.query_edited()
            }
            InputEvent::TypesChanged(types) => {
                self.state.type_suggestions = self.types.suggest(&types);
                self.state.types_input = types;
                self.query_edited()
            }
            InputEvent::CycleCase => {
                let next = self.state.case.next();
                self.set_case(next)
            }
            InputEvent::SetCase(case) => self.set_case(case),
            InputEvent::ConfirmType(chosen) => {
                let input = complete_last_segment(&self.state.types_input, &chosen);
                self.state.types_input = input;
                self.state.type_suggestions.clear();
                self.search_now();
                Flow::Redraw
            }
            InputEvent::ClearTypes => {
                self.state.types_input.clear();
                self.state.type_suggestions.clear();
                self.search_now();
                Flow::Redraw
            }
            InputEvent::ToggleSyntax => {
                self.state.syntax_highlighting = !self.state.syntax_highlighting;
                Flow::Redraw
            }
            InputEvent::SelectNext => self.select(self.state.selected.saturating_add(1)),
            InputEvent::SelectPrev => self.select(self.state.selected.saturating_sub(1)),
            InputEvent::PageDown => self.select(self.state.selected.saturating_add(PAGE_SIZE)),
            InputEvent::PageUp => self.select(self.state.selected.saturating_sub(PAGE_SIZE)),
            InputEvent::Select(index) => self.select(index),
            InputEvent::Quit => {
                self.shutdown();
                Flow::Exit
            }
        }
    }

    /// Schedules a debounced search when the effective query changed.
    fn query_edited(&mut self) -> Flow {
        let key = self.state.query_key();
        if key == self.last_key {
            return Flow::Redraw;
        }
        self.last_key = key;
        self.state.types = parse_types(&self.state.types_input);

        self.sessions.cancel_current();
        self.state.searching = false;
        self.clear_preview();
        self.debouncer.schedule(&self.events, AppEvent::DebounceFired);
        Flow::Redraw
    }

    fn set_case(&mut self, case: CaseSensitivity) -> Flow {
        self.state.case = case;
        if !self.state.pattern.is_empty() {
            self.search_now();
        }
        Flow::Redraw
    }

    /// Starts a search right away, fencing off any pending debounce.
    fn search_now(&mut self) {
        self.state.types = parse_types(&self.state.types_input);
        self.last_key = self.state.query_key();
        self.debouncer.invalidate();
        self.start_search();
    }

    fn start_search(&mut self) {
        self.state.selected = 0;
        self.state.searching = true;
        self.state.error = None;
        self.state.elapsed = None;
        self.state.searched_pattern = self.state.pattern.clone();
        self.clear_preview();

        let query = self.state.query();
        self.sessions.start(query, &mut self.state.results);
    }

    fn handle_session(&mut self, event: SessionEvent) -> Flow {
        match self.sessions.apply(event, &mut self.state.results) {
            SessionOutcome::Stale | SessionOutcome::Ignored => Flow::Idle,
            SessionOutcome::Appended(_) => {
                if self.state.preview.is_none() && self.pending_preview.is_none() {
                    self.request_preview();
                }
                Flow::Redraw
            }
            SessionOutcome::Finished(elapsed) => {
                self.state.searching = false;
                self.state.elapsed = Some(elapsed);
                Flow::Redraw
            }
            SessionOutcome::Failed(message) => {
                self.state.searching = false;
                self.state.error = Some(message);
                Flow::Redraw
            }
        }
    }

    fn handle_preview(&mut self, loaded: PreviewLoaded) -> Flow {
        let current = self.pending_preview == Some(loaded.request)
            && self
                .state
                .selected_match()
                .is_some_and(|selected| loaded.is_for(selected));
        if !current {
            tracing::trace!(
                "dropping stale preview {} for {:?}:{}",
                loaded.request,
                loaded.path,
                loaded.line_number
            );
            return Flow::Idle;
        }
        self.pending_preview = None;
        self.state.preview = Some(loaded);
        Flow::Redraw
    }

    fn select(&mut self, index: usize) -> Flow {
        if self.state.results.is_empty() {
            return Flow::Idle;
        }
        let index = index.min(self.state.results.len() - 1);
        if index == self.state.selected {
            return Flow::Idle;
        }
        self.state.selected = index;
        self.request_preview();
        Flow::Redraw
    }

    fn request_preview(&mut self) {
        let Some(selected) = self.state.selected_match() else {
            return;
        };
        self.preview_requests += 1;
        let request = self.preview_requests;
        self.pending_preview = Some(request);
        self.previews.spawn(request, selected, &self.events);
    }

    fn clear_preview(&mut self) {
        self.state.preview = None;
        self.pending_preview = None;
    }

    fn request_path_completions(&mut self) {
        let input = self.state.path.clone();
        if input.is_empty() {
            self.state.path_suggestions.clear();
            return;
        }
        let paths = Arc::clone(&self.paths);
        let events = self.events.clone();
        tokio::task::spawn_blocking(move || {
            let entries = paths.complete(&input);
            let _ = events.send(AppEvent::PathCompletions { input, entries });
        });
    }
}
