use std::time::{Duration, Instant};

/// Debounced beat pulse driven by the bass average.
///
/// A beat is flagged when the bass average exceeds `threshold` and no beat is
/// currently flagged. The flag clears once `refractory` has elapsed, checked at
/// the start of the following frame.
#[derive(Debug, Clone)]
pub struct BeatDetector {
    threshold: f32,
    refractory: Duration,
    clears_at: Option<Instant>,
}

impl BeatDetector {
    pub fn new(threshold: u8, refractory: Duration) -> Self {
        Self {
            threshold: f32::from(threshold),
            refractory,
            clears_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.clears_at.is_some()
    }

    /// Drop a beat whose refractory window has passed.
    pub fn expire(&mut self, now: Instant) {
        if self.clears_at.is_some_and(|at| now >= at) {
            self.clears_at = None;
        }
    }

    /// Feed one frame's bass average (0-255). Returns whether a beat is flagged.
    pub fn observe(&mut self, now: Instant, bass_avg: f32) -> bool {
        if bass_avg > self.threshold && self.clears_at.is_none() {
            log::trace!("beat at bass {bass_avg:.1}");
            self.clears_at = Some(now + self.refractory);
        }
        self.is_active()
    }

    pub fn reset(&mut self) {
        self.clears_at = None;
    }
}
