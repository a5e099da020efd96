use crate::models::Submatch;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;

const MAX_LINE_LENGTH: usize = 10 * 1024;
const RESET: &str = "\x1b[0m";

/// Turns a raw preview line into its display form.
pub trait LineDecorator: Send + Sync {
    fn decorate(&self, line: &str, path: &Path) -> String;

    fn supports(&self, _path: &Path) -> bool {
        false
    }
}

/// Leaves lines untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainDecorator;

impl LineDecorator for PlainDecorator {
    fn decorate(&self, line: &str, _path: &Path) -> String {
        line.to_string()
    }
}

/// Syntect-backed terminal colouring.
#[derive(Clone)]
pub struct SyntaxService {
    pub syntax_set: Arc<SyntaxSet>,
    pub theme_set: Arc<ThemeSet>,
    theme_name: String,
    // extension -> index into `syntax_set.syntaxes()`
    lookups: Arc<RwLock<HashMap<String, Option<usize>>>>,
}

impl SyntaxService {
    pub fn new(theme_name: impl Into<String>) -> Self {
        Self {
            syntax_set: Arc::new(SyntaxSet::load_defaults_nonewlines()),
            theme_set: Arc::new(ThemeSet::load_defaults()),
            theme_name: theme_name.into(),
            lookups: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
    }

    fn syntax_index(&self, path: &Path) -> Option<usize> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();

        if let Ok(lookups) = self.lookups.read() {
            if let Some(found) = lookups.get(&ext) {
                return *found;
            }
        }

        let found = self
            .syntax_set
            .find_syntax_by_extension(&ext)
            .and_then(|syntax| {
                self.syntax_set
                    .syntaxes()
                    .iter()
                    .position(|s| s.name == syntax.name)
            });
        if let Ok(mut lookups) = self.lookups.write() {
            lookups.insert(ext, found);
        }
        found
    }
}

impl LineDecorator for SyntaxService {
    fn decorate(&self, line: &str, path: &Path) -> String {
        if line.is_empty() || line.len() > MAX_LINE_LENGTH {
            return line.to_string();
        }
        let Some(syntax) = self
            .syntax_index(path)
            .and_then(|idx| self.syntax_set.syntaxes().get(idx))
        else {
            return line.to_string();
        };
        let Some(theme) = self.theme() else {
            return line.to_string();
        };

        let mut highlighter = HighlightLines::new(syntax, theme);
        match highlighter.highlight_line(line, &self.syntax_set) {
            Ok(ranges) => format!("{}{RESET}", as_24_bit_terminal_escaped(&ranges, false)),
            Err(e) => {
                tracing::debug!("Highlighting failed for {:?}: {}", path, e);
                line.to_string()
            }
        }
    }

    fn supports(&self, path: &Path) -> bool {
        self.syntax_index(path).is_some()
    }
}

/// Wraps each valid submatch span of `text` with `style`.
///
/// Spans are applied in start order; empty, out of range, overlapping or
/// non char-aligned spans are skipped. No spans leaves the text as is.
pub fn mark_submatches<F>(text: &str, submatches: &[Submatch], style: F) -> String
where
    F: Fn(&str) -> String,
{
    if submatches.is_empty() {
        return text.to_string();
    }

    let mut spans: Vec<&Submatch> = submatches.iter().collect();
    spans.sort_by_key(|sm| sm.start);

    let mut out = String::with_capacity(text.len() + spans.len() * 16);
    let mut last_end = 0;
    for sm in spans {
        if sm.start >= sm.end || sm.start < last_end || !sm.fits(text) {
            continue;
        }
        out.push_str(&text[last_end..sm.start]);
        out.push_str(&style(&text[sm.start..sm.end]));
        last_end = sm.end;
    }
    out.push_str(&text[last_end..]);
    out
}
