use super::backend::SearchBackend;
use super::batcher::{BatchUpdate, ResultBatcher};
use super::results::ResultList;
use super::SearchQuery;
use crate::models::Match;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub type SessionId = u64;

/// Payload produced by a session's worker pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Batch(Vec<Match>),
    Done,
    Failed(String),
}

impl From<BatchUpdate> for SessionUpdate {
    fn from(update: BatchUpdate) -> Self {
        match update {
            BatchUpdate::Matches(matches) => SessionUpdate::Batch(matches),
            BatchUpdate::Done => SessionUpdate::Done,
        }
    }
}

/// A session update tagged with the session that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub session: SessionId,
    pub update: SessionUpdate,
}

/// What applying a session event did to the visible state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Not from the active session; dropped.
    Stale,
    Appended(usize),
    /// Active session, but the result list is already capped.
    Ignored,
    Finished(Duration),
    Failed(String),
}

#[derive(Debug)]
pub struct SearchSession {
    id: SessionId,
    cancel: CancellationToken,
    started: Instant,
    done: bool,
    result_count: usize,
    elapsed: Option<Duration>,
}

impl SearchSession {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn result_count(&self) -> usize {
        self.result_count
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }
}

/// Owns the single active search.
///
/// Worker output reaches the event loop as `E` values built from
/// `SessionEvent`s; the loop hands them back through `apply`, which is the
/// only place results are accepted.
pub struct SessionManager<E> {
    backend: Arc<dyn SearchBackend>,
    batcher: ResultBatcher,
    events: mpsc::UnboundedSender<E>,
    next_id: SessionId,
    current: Option<SearchSession>,
}

impl<E> SessionManager<E>
where
    E: From<SessionEvent> + Send + 'static,
{
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        batcher: ResultBatcher,
        events: mpsc::UnboundedSender<E>,
    ) -> Self {
        Self {
            backend,
            batcher,
            events,
            next_id: 0,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&SearchSession> {
        self.current.as_ref()
    }

    /// Number of sessions started so far.
    pub fn started(&self) -> u64 {
        self.next_id
    }

    /// Cancels the previous session, clears `results` and launches `query`.
    pub fn start(&mut self, query: SearchQuery, results: &mut ResultList) -> SessionId {
        self.cancel_current();
        results.clear();

        self.next_id += 1;
        let id = self.next_id;
        let cancel = CancellationToken::new();
        tracing::info!("session {} started for {:?} in {}", id, query.pattern, query.scope().display());

        tokio::spawn(run_pipeline(
            id,
            Arc::clone(&self.backend),
            self.batcher,
            query,
            cancel.clone(),
            self.events.clone(),
        ));

        self.current = Some(SearchSession {
            id,
            cancel,
            started: Instant::now(),
            done: false,
            result_count: 0,
            elapsed: None,
        });
        id
    }

    /// Stops the active session. Its in-flight events become stale.
    pub fn cancel_current(&mut self) {
        if let Some(session) = self.current.take() {
            if !session.done {
                tracing::debug!("session {} cancelled", session.id);
            }
            session.cancel.cancel();
        }
    }

    pub fn apply(&mut self, event: SessionEvent, results: &mut ResultList) -> SessionOutcome {
        let Some(session) = self
            .current
            .as_mut()
            .filter(|s| s.id == event.session && !s.cancel.is_cancelled())
        else {
            tracing::trace!("dropping event from stale session {}", event.session);
            return SessionOutcome::Stale;
        };

        match event.update {
            SessionUpdate::Batch(matches) => {
                if results.is_full() {
                    return SessionOutcome::Ignored;
                }
                let kept = results.extend_capped(matches);
                session.result_count = results.len();
                if results.is_full() {
                    tracing::info!("session {} reached the {} result cap", session.id, results.cap());
                }
                SessionOutcome::Appended(kept)
            }
            SessionUpdate::Done => {
                let elapsed = session.started.elapsed();
                session.done = true;
                session.elapsed = Some(elapsed);
                tracing::info!(
                    "session {} finished with {} results in {:?}",
                    session.id,
                    session.result_count,
                    elapsed
                );
                SessionOutcome::Finished(elapsed)
            }
            SessionUpdate::Failed(message) => {
                session.done = true;
                session.elapsed = Some(session.started.elapsed());
                SessionOutcome::Failed(message)
            }
        }
    }
}

impl<E> Drop for SessionManager<E> {
    fn drop(&mut self) {
        if let Some(session) = self.current.take() {
            session.cancel.cancel();
        }
    }
}

async fn run_pipeline<E>(
    id: SessionId,
    backend: Arc<dyn SearchBackend>,
    batcher: ResultBatcher,
    query: SearchQuery,
    cancel: CancellationToken,
    events: mpsc::UnboundedSender<E>,
) where
    E: From<SessionEvent> + Send + 'static,
{
    let send = |update: SessionUpdate| {
        events
            .send(E::from(SessionEvent {
                session: id,
                update,
            }))
            .is_ok()
    };

    let stream = match backend.spawn(&query, cancel) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!("session {} failed to start: {}", id, e);
            send(SessionUpdate::Failed(e.to_string()));
            return;
        }
    };

    batcher.run(stream, |update| send(update.into())).await;
}
