use crate::core::config::Config;
use crate::models::{Match, PathEntry};
use crate::services::preview::PreviewLoaded;
use crate::services::search::{CaseSensitivity, ResultList, SearchQuery};
use crate::services::types::parse_types;
use std::time::Duration;

/// Visible state. Owned and mutated by the event loop only.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pattern: String,
    pub path: String,
    pub types_input: String,
    pub types: Vec<String>,
    pub types_not: Vec<String>,
    pub case: CaseSensitivity,
    pub results: ResultList,
    pub selected: usize,
    pub preview: Option<PreviewLoaded>,
    pub searching: bool,
    pub elapsed: Option<Duration>,
    pub error: Option<String>,
    pub path_suggestions: Vec<PathEntry>,
    pub type_suggestions: Vec<String>,
    pub syntax_highlighting: bool,
    /// Pattern of the most recently launched session.
    pub searched_pattern: String,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            pattern: String::new(),
            path: String::new(),
            types_input: config.types.join(","),
            types: config.types.clone(),
            types_not: config.types_not.clone(),
            case: config.case,
            results: ResultList::new(config.max_results),
            selected: 0,
            preview: None,
            searching: false,
            elapsed: None,
            error: None,
            path_suggestions: Vec::new(),
            type_suggestions: Vec::new(),
            syntax_highlighting: config.syntax_highlighting,
            searched_pattern: String::new(),
        }
    }

    pub fn query(&self) -> SearchQuery {
        SearchQuery {
            pattern: self.pattern.clone(),
            path: self.path.clone(),
            case: self.case,
            types: self.types.clone(),
            types_not: self.types_not.clone(),
        }
    }

    pub(crate) fn query_key(&self) -> QueryKey {
        QueryKey {
            pattern: self.pattern.clone(),
            path: self.query().scope().to_string_lossy().into_owned(),
            types: parse_types(&self.types_input),
        }
    }

    pub fn selected_match(&self) -> Option<&Match> {
        self.results.get(self.selected)
    }

    pub fn status(&self) -> String {
        if self.searching {
            return "Searching...".to_string();
        }
        if let Some(error) = &self.error {
            return error.clone();
        }
        if !self.results.is_empty() {
            let scope = self.query().scope().to_string_lossy().into_owned();
            let scope = if scope == "." {
                "current directory".to_string()
            } else {
                scope
            };
            let types = if self.types.is_empty() {
                String::new()
            } else {
                format!(" [{}]", self.types.join(","))
            };
            let elapsed = self
                .elapsed
                .map(|d| format!(" ({:?})", Duration::from_millis(d.as_millis() as u64)))
                .unwrap_or_default();
            return format!("{} matches in {}{}{}", self.results.len(), scope, types, elapsed);
        }
        if !self.searched_pattern.is_empty() {
            return "No matches".to_string();
        }
        String::new()
    }
}

/// The parts of the input that define a search; a change schedules one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct QueryKey {
    pattern: String,
    path: String,
    types: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn found(line: usize) -> Match {
        Match {
            path: PathBuf::from("a.rs"),
            line_number: line,
            line_text: "x".into(),
            submatches: Vec::new(),
        }
    }

    #[test]
    fn status_reflects_search_phase() {
        let mut state = AppState::new(&Config::default());
        assert_eq!(state.status(), "");

        state.searching = true;
        assert_eq!(state.status(), "Searching...");

        state.searching = false;
        state.searched_pattern = "needle".into();
        assert_eq!(state.status(), "No matches");

        state.results.extend_capped(vec![found(1), found(2)]);
        state.elapsed = Some(Duration::from_micros(12_400));
        state.types = vec!["rust".into()];
        assert_eq!(state.status(), "2 matches in current directory [rust] (12ms)");

        state.error = Some("boom".into());
        assert_eq!(state.status(), "boom");
    }

    #[test]
    fn blank_and_dot_paths_share_a_key() {
        let mut state = AppState::new(&Config::default());
        let blank = state.query_key();
        state.path = ".".into();
        assert_eq!(state.query_key(), blank);
        state.types_input = "go, ".into();
        assert_ne!(state.query_key(), blank);
    }
}
