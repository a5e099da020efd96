use crate::core::errors::{Error, Result};
use crate::models::{FileContext, Match, Submatch};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Identifies one preview request. Issued in increasing order.
pub type PreviewRequest = u64;

/// Result of an asynchronous preview load, keyed by what was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewLoaded {
    pub request: PreviewRequest,
    pub path: PathBuf,
    pub line_number: usize,
    pub context: FileContext,
}

impl PreviewLoaded {
    /// Whether this load was made for `selected`.
    pub fn is_for(&self, selected: &Match) -> bool {
        self.path == selected.path && self.line_number == selected.line_number
    }
}

/// Loads a fixed window of lines around a match.
#[derive(Debug, Clone, Copy)]
pub struct PreviewLoader {
    context_lines: usize,
}

impl Default for PreviewLoader {
    fn default() -> Self {
        Self::new(5)
    }
}

impl PreviewLoader {
    pub fn new(context_lines: usize) -> Self {
        Self { context_lines }
    }

    /// Reads the context synchronously. Read failures become a synthetic line.
    pub fn load(&self, found: &Match) -> FileContext {
        match read_context(
            &found.path,
            found.line_number,
            self.context_lines,
            &found.submatches,
        ) {
            Ok(context) => context,
            Err(e) => {
                tracing::debug!("Preview failed for {:?}: {}", found.path, e);
                FileContext::from_error(e)
            }
        }
    }

    /// Loads on the blocking pool and sends the result, tagged with
    /// `request`, to `events`.
    pub fn spawn<E>(
        &self,
        request: PreviewRequest,
        found: &Match,
        events: &mpsc::UnboundedSender<E>,
    ) where
        E: From<PreviewLoaded> + Send + 'static,
    {
        let loader = *self;
        let found = found.clone();
        let events = events.clone();
        tokio::task::spawn_blocking(move || {
            let context = loader.load(&found);
            let _ = events.send(E::from(PreviewLoaded {
                request,
                path: found.path,
                line_number: found.line_number,
                context,
            }));
        });
    }
}

/// Collects lines `[line - radius, line + radius]`, clamped to line 1.
///
/// Reading stops as soon as the window end is passed.
pub fn read_context(
    path: &Path,
    line_number: usize,
    radius: usize,
    submatches: &[Submatch],
) -> Result<FileContext> {
    let start_line = line_number.saturating_sub(radius).max(1);
    let end_line = line_number.saturating_add(radius);

    let mut reader = BufReader::new(File::open(path)?);
    let mut lines = Vec::with_capacity(radius * 2 + 1);
    let mut buf = Vec::new();
    let mut current = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        current += 1;
        if current > end_line {
            break;
        }
        if buf.contains(&0) {
            return Err(Error::BinaryFile(path.to_path_buf()));
        }
        if current < start_line {
            continue;
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        lines.push(String::from_utf8_lossy(&buf).into_owned());
    }

    Ok(FileContext {
        lines,
        start_line,
        match_line: line_number,
        submatches: submatches.to_vec(),
    })
}
