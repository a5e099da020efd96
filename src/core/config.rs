use std::path::PathBuf;
use std::time::Duration;

use crate::services::search::CaseSensitivity;

pub const DEFAULT_SEARCH_TOOL: &str = "rg";
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Runtime knobs for the search front end.
///
/// Every field has a fixed default; `from_env` only overrides the tool
/// path and the syntax theme.
#[derive(Debug, Clone)]
pub struct Config {
    /// Executable invoked for every search session.
    pub search_tool: PathBuf,
    /// Quiet period after the last edit before a search launches.
    pub debounce_delay: Duration,
    /// Upper bound of the visible result list.
    pub max_results: usize,
    /// Passed to the search tool as `--max-count`.
    pub process_max_count: usize,
    pub batch_size: usize,
    pub batch_interval: Duration,
    /// Capacity of the match channel between the process reader and the batcher.
    pub match_buffer: usize,
    /// Lines shown above and below the match line in the preview.
    pub preview_context: usize,
    pub path_max_depth: usize,
    pub path_cache_ttl: Duration,
    pub path_max_results: usize,
    pub theme: String,
    pub syntax_highlighting: bool,
    pub case: CaseSensitivity,
    pub types: Vec<String>,
    pub types_not: Vec<String>,
    /// Directory the path index walks; also the default search scope.
    pub root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_tool: PathBuf::from(DEFAULT_SEARCH_TOOL),
            debounce_delay: Duration::from_millis(200),
            max_results: 10_000,
            process_max_count: 1_000,
            batch_size: 100,
            batch_interval: Duration::from_millis(50),
            match_buffer: 100,
            preview_context: 5,
            path_max_depth: 5,
            path_cache_ttl: Duration::from_secs(30),
            path_max_results: 50,
            theme: DEFAULT_THEME.to_string(),
            syntax_highlighting: true,
            case: CaseSensitivity::Smart,
            types: Vec::new(),
            types_not: Vec::new(),
            root: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(tool) = std::env::var_os("IRG_SEARCH_TOOL").filter(|v| !v.is_empty()) {
            config.search_tool = PathBuf::from(tool);
        }
        if let Ok(theme) = std::env::var("IRG_THEME") {
            if !theme.trim().is_empty() {
                config.theme = theme.trim().to_string();
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_limits() {
        let config = Config::default();
        assert_eq!(config.debounce_delay, Duration::from_millis(200));
        assert_eq!(config.max_results, 10_000);
        assert_eq!(config.process_max_count, 1_000);
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.batch_interval, Duration::from_millis(50));
        assert_eq!(config.preview_context, 5);
        assert_eq!(config.path_max_depth, 5);
        assert_eq!(config.path_cache_ttl, Duration::from_secs(30));
        assert_eq!(config.path_max_results, 50);
        assert_eq!(config.case, CaseSensitivity::Smart);
    }
}
