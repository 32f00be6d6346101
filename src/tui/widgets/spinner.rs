//! Animated activity indicator.

use std::time::Instant;

/// Braille spinner frames.
const BRAILLE_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Animation speed in milliseconds per frame.
const FRAME_DURATION_MS: u128 = 100;

/// Spinner state: a label and the moment the activity started.
#[derive(Debug, Clone)]
pub struct Spinner {
    start_time: Instant,
    label: &'static str,
}

impl Spinner {
    pub fn new(label: &'static str) -> Self {
        Self {
            start_time: Instant::now(),
            label,
        }
    }

    /// Spinner for a running execution.
    pub fn executing() -> Self {
        Self::new("Executing")
    }

    /// Spinner for a running analysis.
    pub fn analyzing() -> Self {
        Self::new("Analyzing")
    }

    /// Returns the current frame of the animation.
    pub fn frame(&self) -> &'static str {
        let elapsed_ms = self.start_time.elapsed().as_millis();
        let frame_index = (elapsed_ms / FRAME_DURATION_MS) as usize;
        BRAILLE_FRAMES[frame_index % BRAILLE_FRAMES.len()]
    }

    pub fn display(&self) -> String {
        format!("{} {}", self.frame(), self.label)
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}
