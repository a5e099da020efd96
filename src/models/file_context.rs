use super::Submatch;

/// Window of source lines around a selected match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContext {
    pub lines: Vec<String>,
    /// Line number of `lines[0]`, never below 1.
    pub start_line: usize,
    pub match_line: usize,
    pub submatches: Vec<Submatch>,
}

impl FileContext {
    /// Single synthetic line describing why the file could not be shown.
    pub fn from_error(err: impl std::fmt::Display) -> Self {
        Self {
            lines: vec![format!("Error loading preview: {err}")],
            start_line: 1,
            match_line: 1,
            submatches: Vec::new(),
        }
    }

    /// Pairs each line with its 1-based line number.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines
            .iter()
            .enumerate()
            .map(move |(i, line)| (self.start_line + i, line.as_str()))
    }
}
