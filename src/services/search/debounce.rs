use std::time::Duration;
use tokio::sync::mpsc;

/// Fence value carried by a scheduled trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DebounceToken(u64);

impl DebounceToken {
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Delays search launches until input settles.
///
/// Every schedule bumps the token; a trigger is honored only when its token
/// is still the current one at fire time.
#[derive(Debug)]
pub struct Debouncer {
    current: u64,
    delay: Duration,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { current: 0, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn current(&self) -> DebounceToken {
        DebounceToken(self.current)
    }

    /// Advances the token, invalidating every outstanding trigger.
    pub fn invalidate(&mut self) -> DebounceToken {
        self.current += 1;
        DebounceToken(self.current)
    }

    /// Schedules `make(token)` to be sent on `events` after the delay.
    pub fn schedule<E, F>(&mut self, events: &mpsc::UnboundedSender<E>, make: F) -> DebounceToken
    where
        E: Send + 'static,
        F: FnOnce(DebounceToken) -> E + Send + 'static,
    {
        let token = self.invalidate();
        let delay = self.delay;
        let events = events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The loop may already be gone on shutdown.
            let _ = events.send(make(token));
        });
        token
    }

    pub fn is_current(&self, token: DebounceToken) -> bool {
        token.0 == self.current
    }
}
