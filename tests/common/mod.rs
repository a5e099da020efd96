#![allow(dead_code)]

use irg::core::errors::Result;
use irg::models::{Match, Submatch};
use irg::services::search::{MatchStream, SearchBackend, SearchQuery};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub fn sample_match(path: impl Into<PathBuf>, line: usize) -> Match {
    Match {
        path: path.into(),
        line_number: line,
        line_text: format!("needle on line {line}\n"),
        submatches: vec![Submatch {
            text: "needle".into(),
            start: 0,
            end: 6,
        }],
    }
}

/// In-memory backend that replays a fixed list of matches per spawn.
pub struct FakeBackend {
    matches: Vec<Match>,
    pace: Option<Duration>,
    spawned: Arc<Mutex<Vec<SearchQuery>>>,
}

impl FakeBackend {
    pub fn new(matches: Vec<Match>) -> Self {
        Self {
            matches,
            pace: None,
            spawned: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sleeps between matches so a session stays alive for a while.
    pub fn paced(mut self, pace: Duration) -> Self {
        self.pace = Some(pace);
        self
    }

    pub fn spawned(&self) -> Arc<Mutex<Vec<SearchQuery>>> {
        Arc::clone(&self.spawned)
    }
}

impl SearchBackend for FakeBackend {
    fn spawn(&self, query: &SearchQuery, cancel: CancellationToken) -> Result<MatchStream> {
        self.spawned.lock().unwrap().push(query.clone());
        let (tx, rx) = mpsc::channel(100);
        if query.pattern.is_empty() {
            return Ok(rx);
        }
        let matches = self.matches.clone();
        let pace = self.pace;
        tokio::spawn(async move {
            for found in matches {
                if let Some(pace) = pace {
                    tokio::time::sleep(pace).await;
                }
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    sent = tx.send(found) => if sent.is_err() { return },
                }
            }
        });
        Ok(rx)
    }
}
