use std::path::PathBuf;

/// A byte span `[start, end)` inside `Match::line_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submatch {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Submatch {
    /// Whether the span lies on valid char boundaries of `line`.
    pub fn fits(&self, line: &str) -> bool {
        self.start <= self.end
            && self.end <= line.len()
            && line.is_char_boundary(self.start)
            && line.is_char_boundary(self.end)
    }
}

/// One matching line reported by the search tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub path: PathBuf,
    /// 1-based.
    pub line_number: usize,
    /// Raw line, possibly still carrying its line terminator.
    pub line_text: String,
    pub submatches: Vec<Submatch>,
}

impl Match {
    /// Line text with the trailing terminator removed.
    pub fn trimmed_line(&self) -> &str {
        self.line_text.trim_end_matches(['\n', '\r'])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_must_stay_inside_line() {
        let line = "héllo";
        let ok = Submatch { text: "é".into(), start: 1, end: 3 };
        let split_char = Submatch { text: String::new(), start: 2, end: 3 };
        let past_end = Submatch { text: String::new(), start: 4, end: 9 };
        assert!(ok.fits(line));
        assert!(!split_char.fits(line));
        assert!(!past_end.fits(line));
    }

    #[test]
    fn trimmed_line_drops_crlf() {
        let m = Match {
            path: PathBuf::from("a.txt"),
            line_number: 1,
            line_text: "let x = 1;\r\n".into(),
            submatches: Vec::new(),
        };
        assert_eq!(m.trimmed_line(), "let x = 1;");
    }
}
