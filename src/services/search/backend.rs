use super::SearchQuery;
use crate::core::errors::Result;
use crate::models::Match;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Receiving end of one search process. Closing means the process is
/// finished, cancelled, or was never started.
pub type MatchStream = mpsc::Receiver<Match>;

pub trait SearchBackend: Send + Sync {
    /// Starts a search and returns its match stream.
    ///
    /// Must be called from within a tokio runtime. The producer stops and
    /// drops its sender once `cancel` fires.
    fn spawn(&self, query: &SearchQuery, cancel: CancellationToken) -> Result<MatchStream>;
}
