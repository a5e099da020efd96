//! Plain-text frames for the line-mode front end.

use super::state::AppState;
use crate::services::syntax::{mark_submatches, LineDecorator, PlainDecorator};

const MATCH_STYLE: &str = "\x1b[1;33m";
const PATH_STYLE: &str = "\x1b[34m";
const LINE_NO_STYLE: &str = "\x1b[33m";
const DIM_STYLE: &str = "\x1b[90m";
const PREVIEW_MATCH_STYLE: &str = "\x1b[1;31;43m";
const RESET: &str = "\x1b[0m";

fn paint(style: &str, text: &str) -> String {
    format!("{style}{text}{RESET}")
}

/// Byte length of the prefix kept when `text` must fit in `max` bytes
/// including a trailing `...`. `None` when no cut is needed.
fn cut_point(text: &str, max: usize) -> Option<usize> {
    if max < 4 || text.len() <= max {
        return None;
    }
    let mut end = max - 3;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    Some(end)
}

/// Result rows around the selection, at most `height` of them.
pub fn results(state: &AppState, height: usize, width: usize) -> Vec<String> {
    let items = state.results.as_slice();
    if items.is_empty() || height == 0 {
        return Vec::new();
    }

    let max_offset = items.len().saturating_sub(height);
    let offset = state.selected.saturating_sub(height / 2).min(max_offset);

    items
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, found)| {
            let line = found.trimmed_line();
            // Spans running past the cut fail `fits` and are left unmarked.
            let (kept, ellipsis) = match cut_point(line, width.saturating_sub(20)) {
                Some(end) => (&line[..end], "..."),
                None => (line, ""),
            };
            let text = format!(
                "{}{ellipsis}",
                mark_submatches(kept, &found.submatches, |s| paint(MATCH_STYLE, s))
            );
            let marker = if i == state.selected { "> " } else { "  " };
            format!(
                "{marker}{}:{}: {text}",
                paint(PATH_STYLE, &found.path.display().to_string()),
                paint(LINE_NO_STYLE, &found.line_number.to_string()),
            )
        })
        .collect()
}

/// Preview lines of the selected match, decorated by `decorator` unless
/// syntax colouring is switched off.
pub fn preview(state: &AppState, decorator: &dyn LineDecorator) -> Vec<String> {
    let Some(loaded) = &state.preview else {
        return vec!["No preview available".to_string()];
    };
    let decorator: &dyn LineDecorator = if state.syntax_highlighting {
        decorator
    } else {
        &PlainDecorator
    };

    let mut out = vec![paint(PATH_STYLE, &loaded.path.display().to_string())];
    let context = &loaded.context;
    for (number, line) in context.numbered() {
        if number == context.match_line {
            let body = if decorator.supports(&loaded.path) {
                decorator.decorate(line, &loaded.path)
            } else {
                mark_submatches(line, &context.submatches, |s| paint(PREVIEW_MATCH_STYLE, s))
            };
            out.push(format!("{} {body}", paint(PREVIEW_MATCH_STYLE, &format!("{number:>4}"))));
        } else {
            out.push(format!(
                "{} {}",
                paint(DIM_STYLE, &format!("{number:>4}")),
                decorator.decorate(line, &loaded.path)
            ));
        }
    }
    out
}

/// A whole frame: status, results, preview.
pub fn frame(state: &AppState, decorator: &dyn LineDecorator, height: usize, width: usize) -> String {
    let mut lines = vec![format!(
        "[case: {}] {}",
        state.case.label(),
        state.status()
    )];
    lines.extend(results(state, height, width));
    if !state.type_suggestions.is_empty() {
        lines.push(format!("types: {}", state.type_suggestions.join(" ")));
    }
    if !state.path_suggestions.is_empty() {
        let paths: Vec<&str> = state.path_suggestions.iter().take(8).map(|e| e.path.as_str()).collect();
        lines.push(format!("paths: {}", paths.join(" ")));
    }
    lines.push(paint(DIM_STYLE, &"-".repeat(width.min(80))));
    lines.extend(preview(state, decorator));
    lines.join("\n")
}
