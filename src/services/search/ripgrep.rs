use super::backend::{MatchStream, SearchBackend};
use super::SearchQuery;
use crate::core::errors::{Error, Result};
use crate::models::{Match, Submatch};
use serde::Deserialize;
use serde_json::value::RawValue;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Runs ripgrep as a child process and streams its `--json` output.
pub struct RipgrepBackend {
    program: PathBuf,
    max_count: usize,
    buffer: usize,
}

impl RipgrepBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            max_count: 1_000,
            buffer: 100,
        }
    }

    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count;
        self
    }

    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer.max(1);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Checks that the tool can be executed at all.
    pub async fn probe(&self) -> Result<()> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| Error::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(Error::Other(format!(
                "'{} --version' exited with {}",
                self.program.display(),
                output.status
            )));
        }
        Ok(())
    }

    pub fn build_args(&self, query: &SearchQuery) -> Vec<String> {
        let mut args = vec![
            "--json".to_string(),
            "--line-number".to_string(),
            "--column".to_string(),
            format!("--max-count={}", self.max_count),
            query.case.flag().to_string(),
        ];
        for ty in &query.types {
            args.push("--type".to_string());
            args.push(ty.clone());
        }
        for ty in &query.types_not {
            args.push("--type-not".to_string());
            args.push(ty.clone());
        }
        args.push("--".to_string());
        args.push(query.pattern.clone());
        args.push(query.scope().to_string_lossy().into_owned());
        args
    }
}

impl SearchBackend for RipgrepBackend {
    fn spawn(&self, query: &SearchQuery, cancel: CancellationToken) -> Result<MatchStream> {
        let (tx, rx) = mpsc::channel(self.buffer);
        if query.pattern.is_empty() {
            // Dropping `tx` closes the stream: zero results, no process.
            return Ok(rx);
        }

        let program = self.program.display().to_string();
        let mut child = Command::new(&self.program)
            .args(self.build_args(query))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::Spawn {
                program: program.clone(),
                source,
            })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Other(format!("{program} produced no stdout")))?;

        tracing::debug!("spawned {} for pattern {:?}", program, query.pattern);
        tokio::spawn(async move {
            let outcome = forward_matches(BufReader::new(stdout), &tx, &cancel).await;
            drop(tx);
            if outcome != ForwardOutcome::Finished {
                if let Err(e) = child.start_kill() {
                    tracing::debug!("Failed to kill {}: {}", program, e);
                }
            }
            match child.wait().await {
                Ok(status) => tracing::debug!("{} exited with {} ({:?})", program, status, outcome),
                Err(e) => tracing::debug!("Failed to reap {}: {}", program, e),
            }
        });

        Ok(rx)
    }
}

/// Why `forward_matches` stopped reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// End of output (or an unreadable stream).
    Finished,
    Cancelled,
    /// The consumer dropped its receiver.
    Closed,
}

/// Reads newline-delimited JSON records and sends every match record to `tx`.
///
/// Records that fail to decode or are not matches are skipped.
pub async fn forward_matches<R>(
    reader: R,
    tx: &mpsc::Sender<Match>,
    cancel: &CancellationToken,
) -> ForwardOutcome
where
    R: AsyncBufRead + Unpin,
{
    let mut records = reader.split(b'\n');
    loop {
        let record = tokio::select! {
            biased;
            _ = cancel.cancelled() => return ForwardOutcome::Cancelled,
            record = records.next_segment() => record,
        };

        let bytes = match record {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return ForwardOutcome::Finished,
            Err(e) => {
                tracing::debug!("Search output read error: {}", e);
                return ForwardOutcome::Finished;
            }
        };

        let Some(found) = parse_record(&bytes) else {
            continue;
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return ForwardOutcome::Cancelled,
            sent = tx.send(found) => {
                if sent.is_err() {
                    return ForwardOutcome::Closed;
                }
            }
        }
    }
}

#[derive(Deserialize)]
struct Envelope<'a> {
    #[serde(rename = "type", borrow)]
    kind: Cow<'a, str>,
    #[serde(borrow)]
    data: Option<&'a RawValue>,
}

#[derive(Deserialize)]
struct TextField {
    text: String,
}

#[derive(Deserialize)]
struct MatchData {
    path: TextField,
    lines: TextField,
    line_number: usize,
    #[serde(default)]
    submatches: Vec<SubmatchData>,
}

#[derive(Deserialize)]
struct SubmatchData {
    #[serde(rename = "match")]
    matched: TextField,
    start: usize,
    end: usize,
}

/// Decodes one output record into a `Match`, skipping anything that is not
/// a well-formed match record.
pub fn parse_record(record: &[u8]) -> Option<Match> {
    match decode_record(record) {
        Ok(found) => found,
        Err(e) => {
            tracing::debug!("Skipping record: {}", e);
            None
        }
    }
}

/// Only the `type` discriminator is decoded up front; the payload is parsed
/// only for match records.
fn decode_record(record: &[u8]) -> Result<Option<Match>> {
    let record = trim_record(record);
    if record.is_empty() {
        return Ok(None);
    }

    let envelope: Envelope<'_> = serde_json::from_slice(record)?;
    if envelope.kind != "match" {
        return Ok(None);
    }
    let Some(raw) = envelope.data else {
        return Ok(None);
    };
    let data: MatchData = serde_json::from_str(raw.get())?;

    let line_text = data.lines.text;
    let submatches = data
        .submatches
        .into_iter()
        .map(|sm| Submatch {
            text: sm.matched.text,
            start: sm.start,
            end: sm.end,
        })
        .filter(|sm| sm.fits(&line_text))
        .collect();

    Ok(Some(Match {
        path: PathBuf::from(data.path.text),
        line_number: data.line_number,
        line_text,
        submatches,
    }))
}

fn trim_record(record: &[u8]) -> &[u8] {
    match record.last() {
        Some(b'\r') => &record[..record.len() - 1],
        _ => record,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::search::CaseSensitivity;
    use std::time::Duration;

    const MATCH_LINE: &str = r#"{"type":"match","data":{"path":{"text":"src/main.rs"},"lines":{"text":"fn main() {\n"},"line_number":3,"absolute_offset":20,"submatches":[{"match":{"text":"main"},"start":3,"end":7}]}}"#;

    fn match_line(path: &str, line: usize) -> String {
        format!(
            r#"{{"type":"match","data":{{"path":{{"text":"{path}"}},"lines":{{"text":"needle here\n"}},"line_number":{line},"submatches":[{{"match":{{"text":"needle"}},"start":0,"end":6}}]}}}}"#
        )
    }

    #[test]
    fn args_follow_tool_contract() {
        let backend = RipgrepBackend::new("rg");
        let query = SearchQuery {
            pattern: "-foo".into(),
            path: String::new(),
            case: CaseSensitivity::Insensitive,
            types: vec!["rust".into(), "go".into()],
            types_not: vec!["md".into()],
        };
        assert_eq!(
            backend.build_args(&query),
            vec![
                "--json",
                "--line-number",
                "--column",
                "--max-count=1000",
                "--ignore-case",
                "--type",
                "rust",
                "--type",
                "go",
                "--type-not",
                "md",
                "--",
                "-foo",
                ".",
            ]
        );
    }

    #[test]
    fn args_use_explicit_scope() {
        let backend = RipgrepBackend::new("rg").with_max_count(5);
        let mut query = SearchQuery::new("x");
        query.path = "internal/ui".into();
        let args = backend.build_args(&query);
        assert_eq!(args[3], "--max-count=5");
        assert_eq!(args[4], "--smart-case");
        assert_eq!(args.last().map(String::as_str), Some("internal/ui"));
    }

    #[test]
    fn parses_match_record() {
        let parsed = parse_record(MATCH_LINE.as_bytes()).expect("match record");
        assert_eq!(parsed.path, PathBuf::from("src/main.rs"));
        assert_eq!(parsed.line_number, 3);
        assert_eq!(parsed.line_text, "fn main() {\n");
        assert_eq!(
            parsed.submatches,
            vec![Submatch {
                text: "main".into(),
                start: 3,
                end: 7
            }]
        );
    }

    #[test]
    fn skips_non_match_and_malformed_records() {
        assert!(parse_record(br#"{"type":"begin","data":{"path":{"text":"a"}}}"#).is_none());
        assert!(parse_record(br#"{"type":"summary","data":{"elapsed_total":{}}}"#).is_none());
        assert!(parse_record(b"not json at all").is_none());
        assert!(parse_record(b"").is_none());
        // Match without a line number is incomplete.
        assert!(parse_record(
            br#"{"type":"match","data":{"path":{"text":"a"},"lines":{"text":"x"},"submatches":[]}}"#
        )
        .is_none());
        // Non UTF-8 paths come back as base64 `bytes`, which we do not handle.
        assert!(parse_record(
            br#"{"type":"match","data":{"path":{"bytes":"AAE="},"lines":{"text":"x"},"line_number":1,"submatches":[]}}"#
        )
        .is_none());
    }

    #[test]
    fn malformed_records_are_decode_errors() {
        assert!(matches!(decode_record(b"{\"type\":"), Err(Error::Decode(_))));
        assert!(matches!(decode_record(br#"{"type":"end","data":{}}"#), Ok(None)));
    }

    #[test]
    fn drops_spans_outside_the_line() {
        let record = br#"{"type":"match","data":{"path":{"text":"a"},"lines":{"text":"abc"},"line_number":1,"submatches":[{"match":{"text":"b"},"start":1,"end":2},{"match":{"text":"?"},"start":2,"end":10}]}}"#;
        let parsed = parse_record(record).expect("match record");
        assert_eq!(parsed.submatches.len(), 1);
        assert_eq!(parsed.submatches[0].text, "b");
    }

    #[tokio::test]
    async fn stream_yields_every_match_then_closes() {
        let mut output = String::new();
        for i in 1..=5 {
            output.push_str(&match_line("a.txt", i));
            output.push('\n');
        }
        output.push_str("garbage\n");
        output.push_str(r#"{"type":"summary","data":{"stats":{"matches":5}}}"#);
        output.push('\n');

        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let outcome = forward_matches(output.as_bytes(), &tx, &cancel).await;
        drop(tx);

        assert_eq!(outcome, ForwardOutcome::Finished);
        let mut lines = Vec::new();
        while let Some(m) = rx.recv().await {
            lines.push(m.line_number);
        }
        assert_eq!(lines, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn cancelled_stream_stops_reading() {
        let output = format!("{}\n{}\n", match_line("a", 1), match_line("a", 2));
        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = forward_matches(output.as_bytes(), &tx, &cancel).await;
        drop(tx);

        assert_eq!(outcome, ForwardOutcome::Cancelled);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn empty_pattern_spawns_nothing() {
        let backend = RipgrepBackend::new("definitely-not-a-real-search-tool");
        let mut stream = backend
            .spawn(&SearchQuery::new(""), CancellationToken::new())
            .expect("empty pattern is not an error");
        assert!(stream.recv().await.is_none());
    }

    #[tokio::test]
    async fn missing_tool_is_a_spawn_error() {
        let backend = RipgrepBackend::new("definitely-not-a-real-search-tool");
        let err = backend
            .spawn(&SearchQuery::new("needle"), CancellationToken::new())
            .expect_err("spawn must fail");
        assert!(matches!(err, Error::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancel_stops_a_running_process() {
        // `yes` echoes its arguments forever; none of it is a match record.
        let backend = RipgrepBackend::new("yes");
        let cancel = CancellationToken::new();
        let mut stream = backend
            .spawn(&SearchQuery::new("needle"), cancel.clone())
            .expect("spawn yes");

        let idle = tokio::time::timeout(Duration::from_millis(100), stream.recv()).await;
        assert!(idle.is_err(), "stream must stay open while the process runs");

        cancel.cancel();
        let closed = tokio::time::timeout(Duration::from_secs(5), stream.recv())
            .await
            .expect("stream closes once cancelled");
        assert!(closed.is_none());
    }
}
