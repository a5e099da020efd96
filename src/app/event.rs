use crate::models::PathEntry;
use crate::services::preview::PreviewLoaded;
use crate::services::search::{CaseSensitivity, DebounceToken, SessionEvent};

/// User intents fed into the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    PatternChanged(String),
    PathChanged(String),
    TypesChanged(String),
    CycleCase,
    SetCase(CaseSensitivity),
    /// Accept a type suggestion for the segment being typed.
    ConfirmType(String),
    ClearTypes,
    /// Turn preview syntax colouring on or off.
    ToggleSyntax,
    SelectNext,
    SelectPrev,
    PageUp,
    PageDown,
    Select(usize),
    Quit,
}

/// Everything the event loop consumes. Workers only ever produce the
/// non-`Input` variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Input(InputEvent),
    DebounceFired(DebounceToken),
    Session(SessionEvent),
    PreviewLoaded(PreviewLoaded),
    PathCompletions {
        input: String,
        entries: Vec<PathEntry>,
    },
}

impl From<InputEvent> for AppEvent {
    fn from(event: InputEvent) -> Self {
        AppEvent::Input(event)
    }
}

impl From<SessionEvent> for AppEvent {
    fn from(event: SessionEvent) -> Self {
        AppEvent::Session(event)
    }
}

impl From<PreviewLoaded> for AppEvent {
    fn from(loaded: PreviewLoaded) -> Self {
        AppEvent::PreviewLoaded(loaded)
    }
}
