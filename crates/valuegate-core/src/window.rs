//! Bounded record of recent primary-provider outcomes.

use std::collections::VecDeque;

/// Result of one primary-provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// FIFO window of outcomes; the oldest entry is evicted once capacity is exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeWindow {
    capacity: usize,
    outcomes: VecDeque<Outcome>,
}

impl OutcomeWindow {
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            outcomes: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        self.outcomes.push_back(outcome);
        while self.outcomes.len() > self.capacity {
            self.outcomes.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.outcomes.len() >= self.capacity
    }

    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| **outcome == Outcome::Failure)
            .count()
    }

    /// Fraction of failures, available only once the window is full.
    pub fn failure_rate(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        Some(self.failures() as f64 / self.outcomes.len() as f64)
    }

    pub fn clear(&mut self) {
        self.outcomes.clear();
    }
}
