use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Handle given to one dispatched fetch. The owning slot only accepts a
/// completion whose generation is still the live one.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub generation: u64,
    pub token: CancellationToken,
}

impl FetchTicket {
    /// Run `fut` unless the ticket is cancelled first. A cancelled fetch
    /// yields `None` and its future is dropped, which aborts the request.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            out = fut => Some(out),
        }
    }
}

/// One logical fetch slot (the list page fetch, or the detail fetch).
/// At most one ticket is live per slot.
#[derive(Debug, Default)]
pub struct FetchSlot {
    generation: u64,
    live: Option<CancellationToken>,
}

impl FetchSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate the previous ticket and issue a fresh one.
    pub fn begin(&mut self) -> FetchTicket {
        self.cancel();
        self.generation += 1;
        let token = CancellationToken::new();
        self.live = Some(token.clone());
        FetchTicket {
            generation: self.generation,
            token,
        }
    }

    /// Cancel the live ticket, if any. Its completion will be rejected.
    pub fn cancel(&mut self) {
        if let Some(token) = self.live.take() {
            token.cancel();
            self.generation += 1;
        }
    }

    /// Accept a completion for `generation`, retiring the live ticket.
    /// Returns false for stale completions.
    pub fn settle(&mut self, generation: u64) -> bool {
        if self.live.is_some() && generation == self.generation {
            self.live = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_cancels_previous_ticket() {
        let mut slot = FetchSlot::new();
        let first = slot.begin();
        let second = slot.begin();
        assert!(first.token.is_cancelled());
        assert!(!second.token.is_cancelled());
        assert!(!slot.settle(first.generation));
        assert!(slot.settle(second.generation));
    }

    #[test]
    fn settle_only_once() {
        let mut slot = FetchSlot::new();
        let ticket = slot.begin();
        assert!(slot.settle(ticket.generation));
        assert!(!slot.settle(ticket.generation));
    }

    #[test]
    fn cancel_rejects_pending_completion() {
        let mut slot = FetchSlot::new();
        let ticket = slot.begin();
        slot.cancel();
        assert!(ticket.token.is_cancelled());
        assert!(!slot.settle(ticket.generation));
    }

    #[tokio::test]
    async fn cancelled_ticket_skips_future() {
        let mut slot = FetchSlot::new();
        let ticket = slot.begin();
        slot.cancel();
        let out = ticket.run(async { 42 }).await;
        assert_eq!(out, None);
    }

    #[tokio::test]
    async fn live_ticket_runs_future() {
        let mut slot = FetchSlot::new();
        let ticket = slot.begin();
        assert_eq!(ticket.run(async { 7 }).await, Some(7));
    }
}
