//! Debounced autocomplete state.
//!
//! Buffer changes arm a [`DebounceTimer`]; when it fires the console issues
//! one autocomplete request stamped with a fresh [`RequestToken`]. Only the
//! response carrying the latest token may change the visible list.

use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::debug;

use super::debounce::DebounceTimer;
use crate::error::ConsoleError;

/// Identifies one outbound autocomplete request. Later requests compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the controller is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuggestionPhase {
    #[default]
    Idle,
    /// Timer armed, waiting for the quiet interval.
    Scheduled,
    /// Request sent, waiting for the answer.
    Fetching,
    /// The latest answer was non-empty and is shown.
    Applied,
    /// Nothing to show.
    Suppressed,
}

/// Owns the suggestion list, the debounce timer and the token guard.
#[derive(Debug)]
pub struct SuggestionController {
    delay: Duration,
    timer: DebounceTimer,
    phase: SuggestionPhase,
    next_token: u64,
    latest: Option<RequestToken>,
    items: Vec<String>,
    selected: usize,
    visible: bool,
    in_flight: Vec<AbortHandle>,
}

impl SuggestionController {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            timer: DebounceTimer::new(),
            phase: SuggestionPhase::Idle,
            next_token: 0,
            latest: None,
            items: Vec::new(),
            selected: 0,
            visible: false,
            in_flight: Vec::new(),
        }
    }

    pub fn phase(&self) -> SuggestionPhase {
        self.phase
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_visible(&self) -> bool {
        self.visible && !self.items.is_empty()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&str> {
        if !self.is_visible() {
            return None;
        }
        self.items.get(self.selected).map(String::as_str)
    }

    /// The token whose response may still change the list, if any.
    pub fn latest_token(&self) -> Option<RequestToken> {
        self.latest
    }

    /// Reacts to a buffer change.
    ///
    /// A blank buffer suppresses immediately. Anything else (re)arms the
    /// timer, which later delivers `message(generation)` on `tx`.
    pub fn on_buffer_changed<M>(
        &mut self,
        blank: bool,
        tx: &mpsc::Sender<M>,
        message: impl FnOnce(u64) -> M,
    ) where
        M: Send + 'static,
    {
        self.timer.cancel();
        if blank {
            self.latest = None;
            self.suppress();
            return;
        }
        self.timer.schedule(self.delay, tx, message);
        self.phase = SuggestionPhase::Scheduled;
    }

    /// Handles a timer firing.
    ///
    /// Returns the token for the request to send, or `None` when the firing
    /// is stale or the buffer has become blank.
    pub fn on_timer(&mut self, generation: u64, blank: bool) -> Option<RequestToken> {
        if !self.timer.fired(generation) {
            debug!("Ignoring stale debounce firing (generation {})", generation);
            return None;
        }
        if blank {
            self.latest = None;
            self.suppress();
            return None;
        }

        self.next_token += 1;
        let token = RequestToken(self.next_token);
        self.latest = Some(token);
        self.phase = SuggestionPhase::Fetching;
        Some(token)
    }

    /// Remembers an in-flight fetch so teardown can abort it.
    pub fn track(&mut self, handle: AbortHandle) {
        self.in_flight.retain(|h| !h.is_finished());
        self.in_flight.push(handle);
    }

    /// Applies an autocomplete outcome. Returns true if it changed the state.
    pub fn on_response(
        &mut self,
        token: RequestToken,
        outcome: std::result::Result<Vec<String>, ConsoleError>,
    ) -> bool {
        if self.latest != Some(token) {
            debug!("Discarding suggestions for superseded request {}", token);
            return false;
        }

        match outcome {
            Ok(items) if !items.is_empty() => {
                self.items = items;
                self.selected = 0;
                self.visible = true;
                self.phase = SuggestionPhase::Applied;
            }
            Ok(_) => self.suppress(),
            Err(e) => {
                debug!("Autocomplete request {} failed: {}", token, e);
                self.suppress();
            }
        }
        true
    }

    /// Hides the list without touching the timer or in-flight requests.
    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Hides the list and drops the claim of any in-flight request, so only
    /// a request issued after this call can show suggestions again.
    pub fn invalidate(&mut self) {
        self.latest = None;
        self.hide();
    }

    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.items.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.items.len() - 1);
        }
    }

    /// Cancels the timer and aborts every in-flight fetch.
    pub fn shutdown(&mut self) {
        self.timer.cancel();
        for handle in self.in_flight.drain(..) {
            handle.abort();
        }
    }

    fn suppress(&mut self) {
        self.items.clear();
        self.selected = 0;
        self.visible = false;
        self.phase = SuggestionPhase::Suppressed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Arms the timer and returns the generation it will fire with.
    fn arm(controller: &mut SuggestionController, tx: &mpsc::Sender<u64>) -> u64 {
        let mut generation = 0;
        controller.on_buffer_changed(false, tx, |g| {
            generation = g;
            g
        });
        generation
    }

    #[tokio::test]
    async fn blank_change_suppresses() {
        let (tx, _rx) = mpsc::channel(4);
        let mut controller = SuggestionController::new(Duration::from_millis(300));

        controller.on_buffer_changed(true, &tx, |g| g);
        assert_eq!(controller.phase(), SuggestionPhase::Suppressed);
        assert!(!controller.is_visible());
    }

    #[tokio::test]
    async fn latest_response_is_applied() {
        let (tx, _rx) = mpsc::channel(4);
        let mut controller = SuggestionController::new(Duration::from_millis(300));

        let generation = arm(&mut controller, &tx);
        assert_eq!(controller.phase(), SuggestionPhase::Scheduled);

        let token = controller.on_timer(generation, false).unwrap();
        assert_eq!(controller.phase(), SuggestionPhase::Fetching);

        assert!(controller.on_response(token, Ok(items(&["SELECT", "SET"]))));
        assert_eq!(controller.phase(), SuggestionPhase::Applied);
        assert!(controller.is_visible());
        assert_eq!(controller.selected_item(), Some("SELECT"));
    }

    #[tokio::test]
    async fn superseded_response_is_discarded() {
        let (tx, _rx) = mpsc::channel(4);
        let mut controller = SuggestionController::new(Duration::from_millis(300));

        let g1 = arm(&mut controller, &tx);
        let first = controller.on_timer(g1, false).unwrap();
        let g2 = arm(&mut controller, &tx);
        let second = controller.on_timer(g2, false).unwrap();
        assert!(second > first);

        assert!(controller.on_response(second, Ok(items(&["DROP DATABASE"]))));
        assert!(!controller.on_response(first, Ok(items(&["DELETE FROM"]))));
        assert_eq!(controller.items(), items(&["DROP DATABASE"]).as_slice());
    }

    #[tokio::test]
    async fn stale_generation_sends_nothing() {
        let (tx, _rx) = mpsc::channel(4);
        let mut controller = SuggestionController::new(Duration::from_millis(300));

        let old = arm(&mut controller, &tx);
        let _current = arm(&mut controller, &tx);
        assert!(controller.on_timer(old, false).is_none());
        assert_eq!(controller.latest_token(), None);
    }

    #[tokio::test]
    async fn empty_or_failed_response_suppresses() {
        let (tx, _rx) = mpsc::channel(4);
        let mut controller = SuggestionController::new(Duration::from_millis(300));

        let g = arm(&mut controller, &tx);
        let token = controller.on_timer(g, false).unwrap();
        controller.on_response(token, Ok(Vec::new()));
        assert_eq!(controller.phase(), SuggestionPhase::Suppressed);

        let g = arm(&mut controller, &tx);
        let token = controller.on_timer(g, false).unwrap();
        controller.on_response(token, Err(ConsoleError::transport("refused")));
        assert_eq!(controller.phase(), SuggestionPhase::Suppressed);
        assert!(!controller.is_visible());
    }

    #[tokio::test]
    async fn blank_change_while_fetching_drops_late_answer() {
        let (tx, _rx) = mpsc::channel(4);
        let mut controller = SuggestionController::new(Duration::from_millis(300));

        let g = arm(&mut controller, &tx);
        let token = controller.on_timer(g, false).unwrap();
        controller.on_buffer_changed(true, &tx, |g| g);

        assert!(!controller.on_response(token, Ok(items(&["SELECT"]))));
        assert_eq!(controller.phase(), SuggestionPhase::Suppressed);
        assert!(!controller.is_visible());
        assert_eq!(controller.latest_token(), None);
    }

    #[tokio::test]
    async fn invalidate_drops_late_answer() {
        let (tx, _rx) = mpsc::channel(4);
        let mut controller = SuggestionController::new(Duration::from_millis(300));

        let g = arm(&mut controller, &tx);
        let token = controller.on_timer(g, false).unwrap();
        controller.invalidate();

        assert!(!controller.on_response(token, Ok(items(&["SELECT"]))));
        assert!(!controller.is_visible());
    }

    #[tokio::test]
    async fn selection_wraps() {
        let (tx, _rx) = mpsc::channel(4);
        let mut controller = SuggestionController::new(Duration::from_millis(300));

        let g = arm(&mut controller, &tx);
        let token = controller.on_timer(g, false).unwrap();
        controller.on_response(token, Ok(items(&["A", "B", "C"])));

        controller.select_previous();
        assert_eq!(controller.selected_item(), Some("C"));
        controller.select_next();
        assert_eq!(controller.selected_item(), Some("A"));

        controller.hide();
        assert_eq!(controller.selected_item(), None);
    }
}
