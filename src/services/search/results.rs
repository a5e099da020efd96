use crate::models::Match;

/// Discovery-ordered matches, capped at a fixed size.
///
/// Once the cap is reached further matches are dropped, never reordered.
#[derive(Debug, Clone)]
pub struct ResultList {
    items: Vec<Match>,
    cap: usize,
}

impl ResultList {
    pub fn new(cap: usize) -> Self {
        Self {
            items: Vec::new(),
            cap,
        }
    }

    /// Appends as much of `batch` as fits and returns how many were kept.
    pub fn extend_capped(&mut self, batch: Vec<Match>) -> usize {
        let room = self.cap.saturating_sub(self.items.len());
        let kept = batch.len().min(room);
        self.items.extend(batch.into_iter().take(kept));
        kept
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.cap
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn get(&self, index: usize) -> Option<&Match> {
        self.items.get(index)
    }

    pub fn as_slice(&self) -> &[Match] {
        &self.items
    }
}
