use crate::models::PathEntry;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use walkdir::{DirEntry, WalkDir};

const SKIPPED_DIRS: &[&str] = &["node_modules", "vendor", ".git"];

const SCORE_EXACT: u32 = 2000;
const SCORE_PREFIX: u32 = 1000;
const SCORE_BASENAME_PREFIX: u32 = 800;
const SCORE_BOUNDARY: u32 = 500;
const SCORE_SUBSTRING: u32 = 100;

struct CachedWalk {
    entries: Arc<Vec<PathEntry>>,
    loaded_at: Instant,
}

/// Depth-bounded directory listing used for path completion.
///
/// The walk is cached for `ttl`; expiry is the only invalidation.
pub struct PathIndex {
    root: PathBuf,
    max_depth: usize,
    ttl: Duration,
    max_results: usize,
    cache: RwLock<Option<CachedWalk>>,
}

impl PathIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_depth: 5,
            ttl: Duration::from_secs(30),
            max_results: 50,
            cache: RwLock::new(None),
        }
    }

    pub fn with_limits(mut self, max_depth: usize, ttl: Duration, max_results: usize) -> Self {
        self.max_depth = max_depth;
        self.ttl = ttl;
        self.max_results = max_results;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the cached walk, re-walking when it is older than the TTL.
    pub fn entries(&self) -> Arc<Vec<PathEntry>> {
        if let Some(entries) = self.fresh_entries() {
            return entries;
        }

        let mut cache = match self.cache.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Another writer may have filled it while we waited.
        if let Some(cached) = cache.as_ref().filter(|c| c.loaded_at.elapsed() < self.ttl) {
            return Arc::clone(&cached.entries);
        }

        let entries = Arc::new(self.walk());
        tracing::debug!("path index walked {} entries under {:?}", entries.len(), self.root);
        *cache = Some(CachedWalk {
            entries: Arc::clone(&entries),
            loaded_at: Instant::now(),
        });
        entries
    }

    /// Ranked completions for `input`; empty input yields nothing.
    pub fn complete(&self, input: &str) -> Vec<PathEntry> {
        if input.is_empty() {
            return Vec::new();
        }
        filter_paths(input, &self.entries(), self.max_results)
    }

    fn fresh_entries(&self) -> Option<Arc<Vec<PathEntry>>> {
        let cache = match self.cache.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let fresh = cache
            .as_ref()
            .filter(|c| c.loaded_at.elapsed() < self.ttl)
            .map(|c| Arc::clone(&c.entries));
        fresh
    }

    fn walk(&self) -> Vec<PathEntry> {
        let mut entries = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(self.max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Walk error: {}", e);
                    continue;
                }
            };
            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            entries.push(PathEntry {
                path: relative.to_string_lossy().into_owned(),
                is_dir: entry.file_type().is_dir(),
                score: 0,
            });
        }
        entries
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

fn normalize(value: &str) -> String {
    let lowered = value.to_lowercase();
    if MAIN_SEPARATOR == '/' {
        lowered
    } else {
        lowered.replace(MAIN_SEPARATOR, "/")
    }
}

/// Scores `path` against `input`; 0 means no match.
pub fn score_path(input: &str, path: &str) -> u32 {
    let input = normalize(input);
    let path = normalize(path);
    if input.is_empty() {
        return 0;
    }

    if path == input {
        return SCORE_EXACT;
    }
    if path.starts_with(&input) {
        return SCORE_PREFIX;
    }
    let basename = path.rsplit('/').next().unwrap_or(&path);
    if basename.starts_with(&input) {
        return SCORE_BASENAME_PREFIX;
    }
    if path.contains(&format!("/{input}")) {
        return SCORE_BOUNDARY;
    }
    if path.contains(&input) {
        return SCORE_SUBSTRING;
    }
    0
}

/// Scores every entry, drops non-matches, sorts by score then path and
/// keeps the top `limit`.
pub fn filter_paths(input: &str, entries: &[PathEntry], limit: usize) -> Vec<PathEntry> {
    if input.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<PathEntry> = entries
        .iter()
        .filter_map(|entry| {
            let score = score_path(input, &entry.path);
            (score > 0).then(|| PathEntry {
                score,
                ..entry.clone()
            })
        })
        .collect();

    matches.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.path.cmp(&b.path)));
    matches.truncate(limit);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn entry(path: &str) -> PathEntry {
        PathEntry {
            path: path.to_string(),
            is_dir: false,
            score: 0,
        }
    }

    #[test]
    fn score_tiers() {
        assert_eq!(score_path("src/lib.rs", "src/lib.rs"), 2000);
        assert_eq!(score_path("SRC", "src/lib.rs"), 1000);
        assert_eq!(score_path("lib", "src/lib.rs"), 800);
        assert_eq!(score_path("ui", "internal/ui/model.go"), 500);
        assert_eq!(score_path("odel", "internal/ui/model.go"), 100);
        assert_eq!(score_path("zzz", "internal/ui/model.go"), 0);
    }

    #[test]
    fn ranking_breaks_ties_by_path() {
        let entries = vec![
            entry("internal/ui/model.go"),
            entry("uix/test.go"),
            entry("internal/ui"),
            entry("docs/readme.md"),
        ];
        let ranked: Vec<(String, u32)> = filter_paths("ui", &entries, 50)
            .into_iter()
            .map(|e| (e.path, e.score))
            .collect();
        assert_eq!(
            ranked,
            vec![
                ("uix/test.go".to_string(), 1000),
                ("internal/ui".to_string(), 500),
                ("internal/ui/model.go".to_string(), 500),
            ]
        );
    }

    #[test]
    fn results_are_truncated() {
        let entries: Vec<PathEntry> = (0..80).map(|i| entry(&format!("dir/file{i:02}"))).collect();
        let ranked = filter_paths("file", &entries, 50);
        assert_eq!(ranked.len(), 50);
        assert_eq!(ranked[0].path, "dir/file00");
        assert!(filter_paths("", &entries, 50).is_empty());
    }

    #[test]
    fn walk_skips_hidden_and_vendor_dirs_and_respects_depth() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/deep/a/b/c/d")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir_all(root.join("vendor/lib")).unwrap();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::write(root.join(".env"), "x").unwrap();
        fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();

        let index = PathIndex::new(root);
        let entries = index.entries();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();

        assert!(paths.contains(&"src"));
        assert!(paths.iter().any(|p| p.ends_with("main.rs")));
        assert!(!paths.iter().any(|p| p.contains("node_modules")));
        assert!(!paths.iter().any(|p| p.contains("vendor")));
        assert!(!paths.iter().any(|p| p.starts_with('.')));
        // src/deep/a/b/c is depth 5; its child d is not listed.
        assert!(paths.iter().any(|p| normalize(p) == "src/deep/a/b/c"));
        assert!(!paths.iter().any(|p| normalize(p) == "src/deep/a/b/c/d"));
        assert!(entries.iter().any(|e| e.path == "src" && e.is_dir));
    }

    #[test]
    fn walk_is_cached_until_ttl_expires() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("first.txt"), "").unwrap();

        let index = PathIndex::new(dir.path());
        let before = index.entries();
        fs::write(dir.path().join("second.txt"), "").unwrap();
        let cached = index.entries();
        assert!(Arc::ptr_eq(&before, &cached));
        assert_eq!(cached.len(), 1);

        let expiring = PathIndex::new(dir.path()).with_limits(5, Duration::ZERO, 50);
        assert_eq!(expiring.entries().len(), 2);
        assert!(expiring.complete("second").iter().any(|e| e.path == "second.txt"));
    }
}
