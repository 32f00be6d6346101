//! Cancellable one-shot timer used for quiet-interval scheduling.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A one-shot timer that delivers a message after a delay unless cancelled.
///
/// Each `schedule` call gets a new generation number. A firing whose message
/// was already queued when the timer was re-armed carries an old generation,
/// so [`DebounceTimer::fired`] rejects it.
#[derive(Debug, Default)]
pub struct DebounceTimer {
    generation: u64,
    pending: Option<CancellationToken>,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer, cancelling any pending schedule.
    ///
    /// `message` is built immediately with the new generation and sent on `tx`
    /// once `delay` elapses. Returns the generation.
    pub fn schedule<M>(
        &mut self,
        delay: Duration,
        tx: &mpsc::Sender<M>,
        message: impl FnOnce(u64) -> M,
    ) -> u64
    where
        M: Send + 'static,
    {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        let message = message(generation);
        let deadline = Instant::now() + delay;

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;

                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => {
                    let _ = tx.send(message).await;
                }
            }
        });

        self.pending = Some(token);
        generation
    }

    /// Cancels the pending schedule. Returns true if one was armed.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Returns true while a schedule is pending.
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Consumes a firing. Returns false for a stale or cancelled generation.
    pub fn fired(&mut self, generation: u64) -> bool {
        if self.pending.is_some() && generation == self.generation {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
