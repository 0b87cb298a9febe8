// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::types::quiz::QuizOutcome;

/// The aggregate accuracy of a grading batch.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Accuracy {
    /// Nothing was recorded since the last aggregation.
    NoData,
    /// Fraction of correct outcomes, in `[0, 1]`.
    Ratio(f64),
}

/// Correct/incorrect outcomes accumulated over one grading batch, in the
/// order they were graded.
#[derive(Default, Debug)]
pub struct AccuracyWindow {
    outcomes: Vec<bool>,
}

impl AccuracyWindow {
    fn ratio(&self) -> Accuracy {
        if self.outcomes.is_empty() {
            return Accuracy::NoData;
        }
        let correct = self.outcomes.iter().filter(|c| **c).count();
        Accuracy::Ratio(correct as f64 / self.outcomes.len() as f64)
    }
}

/// Per-session accuracy state. Each quiz session owns its own tracker;
/// trackers are never shared between sessions.
#[derive(Default, Debug)]
pub struct PerformanceTracker {
    window: AccuracyWindow,
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcomes: impl IntoIterator<Item = bool>) {
        let before = self.window.outcomes.len();
        self.window.outcomes.extend(outcomes);
        log::debug!(
            "Logged {} new results to tracker.",
            self.window.outcomes.len() - before
        );
    }

    pub fn record_outcomes(&mut self, outcomes: &[QuizOutcome]) {
        self.record(outcomes.iter().map(|o| o.is_correct));
    }

    /// Consume the window: return its accuracy and clear it. The window is
    /// cleared on every call, including when it was already empty.
    pub fn aggregate_and_reset(&mut self) -> Accuracy {
        let accuracy = self.window.ratio();
        self.window = AccuracyWindow::default();
        accuracy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(is_correct: bool) -> QuizOutcome {
        QuizOutcome {
            question: "q".to_string(),
            correct_answer: "a".to_string(),
            user_answer: "a".to_string(),
            is_correct,
            feedback: String::new(),
        }
    }

    #[test]
    fn test_fresh_tracker_has_no_data() {
        let mut tracker = PerformanceTracker::new();
        assert_eq!(tracker.aggregate_and_reset(), Accuracy::NoData);
    }

    #[test]
    fn test_aggregate_then_reset() {
        let mut tracker = PerformanceTracker::new();
        tracker.record([true, false, true]);
        assert_eq!(tracker.aggregate_and_reset(), Accuracy::Ratio(2.0 / 3.0));
        assert_eq!(tracker.aggregate_and_reset(), Accuracy::NoData);
    }

    #[test]
    fn test_multiple_batches_accumulate() {
        let mut tracker = PerformanceTracker::new();
        tracker.record([true]);
        tracker.record([false, false, true]);
        assert_eq!(tracker.aggregate_and_reset(), Accuracy::Ratio(0.5));
    }

    #[test]
    fn test_empty_record_is_still_no_data() {
        let mut tracker = PerformanceTracker::new();
        tracker.record(Vec::new());
        assert_eq!(tracker.aggregate_and_reset(), Accuracy::NoData);
    }

    #[test]
    fn test_record_outcomes() {
        let mut tracker = PerformanceTracker::new();
        tracker.record_outcomes(&[outcome(true), outcome(true), outcome(true), outcome(false)]);
        assert_eq!(tracker.aggregate_and_reset(), Accuracy::Ratio(0.75));
    }

    #[test]
    fn test_trackers_are_independent() {
        let mut a = PerformanceTracker::new();
        let mut b = PerformanceTracker::new();
        a.record([true, true]);
        b.record([false]);
        assert_eq!(a.aggregate_and_reset(), Accuracy::Ratio(1.0));
        assert_eq!(b.aggregate_and_reset(), Accuracy::Ratio(0.0));
    }
}
