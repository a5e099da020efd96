use std::path::Path;

pub mod backend;
pub mod batcher;
pub mod debounce;
pub mod results;
pub mod ripgrep;
pub mod session;

pub use backend::{MatchStream, SearchBackend};
pub use batcher::{BatchUpdate, ResultBatcher};
pub use debounce::{DebounceToken, Debouncer};
pub use results::ResultList;
pub use ripgrep::RipgrepBackend;
pub use session::{SearchSession, SessionEvent, SessionId, SessionManager, SessionOutcome, SessionUpdate};

/// How the search tool treats letter case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaseSensitivity {
    /// Insensitive unless the pattern has an uppercase letter. Decided by the tool.
    #[default]
    Smart,
    Sensitive,
    Insensitive,
}

impl CaseSensitivity {
    pub fn flag(&self) -> &'static str {
        match self {
            CaseSensitivity::Smart => "--smart-case",
            CaseSensitivity::Sensitive => "--case-sensitive",
            CaseSensitivity::Insensitive => "--ignore-case",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CaseSensitivity::Smart => "Smart",
            CaseSensitivity::Sensitive => "Sensitive",
            CaseSensitivity::Insensitive => "Insensitive",
        }
    }

    /// smart -> sensitive -> insensitive -> smart
    pub fn next(&self) -> CaseSensitivity {
        match self {
            CaseSensitivity::Smart => CaseSensitivity::Sensitive,
            CaseSensitivity::Sensitive => CaseSensitivity::Insensitive,
            CaseSensitivity::Insensitive => CaseSensitivity::Smart,
        }
    }
}

/// Everything needed to launch one search process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub pattern: String,
    /// Empty means the current directory.
    pub path: String,
    pub case: CaseSensitivity,
    pub types: Vec<String>,
    pub types_not: Vec<String>,
}

impl SearchQuery {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    pub fn scope(&self) -> &Path {
        let trimmed = self.path.trim();
        if trimmed.is_empty() {
            Path::new(".")
        } else {
            Path::new(trimmed)
        }
    }
}
