//! Consecutive-detection tracking.
//!
//! The window keeps the outcome of the last `capacity` processed frames. The
//! reported count is the number of hits in the window, so a single miss does
//! not reset it. Capacity equals the alert threshold, which makes "count
//! reached threshold" the same as "every frame in the window was a hit".

use std::collections::VecDeque;

/// Fixed-capacity sliding window of per-frame detection outcomes.
#[derive(Debug, Clone)]
pub struct DetectionWindow {
    outcomes: VecDeque<bool>,
    capacity: usize,
    hits: usize,
}

impl DetectionWindow {
    /// Create an empty window. A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            outcomes: VecDeque::with_capacity(capacity),
            capacity,
            hits: 0,
        }
    }

    /// Record a frame outcome and return the number of hits in the window.
    pub fn push(&mut self, hit: bool) -> usize {
        if self.outcomes.len() == self.capacity {
            if let Some(true) = self.outcomes.pop_front() {
                self.hits -= 1;
            }
        }
        self.outcomes.push_back(hit);
        if hit {
            self.hits += 1;
        }
        self.hits
    }

    /// Hits currently in the window.
    pub fn count(&self) -> usize {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Outcomes, oldest first.
    pub fn outcomes(&self) -> impl Iterator<Item = bool> + '_ {
        self.outcomes.iter().copied()
    }
}
