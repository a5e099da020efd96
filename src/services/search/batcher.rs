use crate::models::Match;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

/// Output of the batcher. `Done` is always the last update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchUpdate {
    Matches(Vec<Match>),
    Done,
}

/// Groups a match stream into bounded batches to limit redraws.
#[derive(Debug, Clone, Copy)]
pub struct ResultBatcher {
    max_items: usize,
    max_delay: Duration,
}

impl Default for ResultBatcher {
    fn default() -> Self {
        Self::new(100, Duration::from_millis(50))
    }
}

impl ResultBatcher {
    pub fn new(max_items: usize, max_delay: Duration) -> Self {
        Self {
            max_items: max_items.max(1),
            max_delay,
        }
    }

    /// Drains `input` until it closes, calling `emit` for every batch and a
    /// final `Done`.
    ///
    /// A batch is flushed once it holds `max_items` matches or `max_delay`
    /// after its first match arrived, whichever comes first. `emit` returns
    /// `false` when nobody is listening any more, which ends the run early.
    pub async fn run<F>(&self, mut input: mpsc::Receiver<Match>, mut emit: F)
    where
        F: FnMut(BatchUpdate) -> bool,
    {
        let mut buffer: Vec<Match> = Vec::with_capacity(self.max_items);
        let mut deadline: Option<Instant> = None;

        loop {
            let received = match deadline {
                Some(at) => tokio::select! {
                    biased;
                    _ = sleep_until(at) => None,
                    received = input.recv() => Some(received),
                },
                None => Some(input.recv().await),
            };

            match received {
                Some(Some(found)) => {
                    if buffer.is_empty() {
                        deadline = Some(Instant::now() + self.max_delay);
                    }
                    buffer.push(found);
                    if buffer.len() >= self.max_items {
                        deadline = None;
                        if !emit(BatchUpdate::Matches(std::mem::take(&mut buffer))) {
                            return;
                        }
                    }
                }
                Some(None) => {
                    if !buffer.is_empty() && !emit(BatchUpdate::Matches(std::mem::take(&mut buffer))) {
                        return;
                    }
                    emit(BatchUpdate::Done);
                    return;
                }
                None => {
                    deadline = None;
                    if !buffer.is_empty() && !emit(BatchUpdate::Matches(std::mem::take(&mut buffer))) {
                        return;
                    }
                }
            }
        }
    }
}
