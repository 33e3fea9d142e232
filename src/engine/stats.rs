// -----------------------------------------------------------------------------
// Stats exposed to the host
// -----------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::TrialKind;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    pub ticks: u64,
    pub total_trials: u64,

    /// Trials discarded for zero parts or exceeding the mode cap.
    pub rejected_out_of_bounds: u64,

    pub accepted_improvements: u64,
    pub accepted_simplifications: u64,
    pub simplifier_leaps: u64,

    /// Times a new champion was published.
    pub published_improvements: u64,

    pub explore_trials: u64,
    pub nudge_trials: u64,
    pub explore_acceptance: f32,
    pub nudge_acceptance: f32,

    /// Filled in by the background engine over a half-second window.
    pub trials_per_second: f32,

    pub score_history: Vec<f64>,
}

impl SearchStats {
    pub fn total_accepts(&self) -> u64 {
        self.accepted_improvements + self.accepted_simplifications + self.simplifier_leaps
    }

    pub fn proposals(&self, kind: TrialKind) -> u64 {
        match kind {
            TrialKind::Explore => self.explore_trials,
            TrialKind::Nudge => self.nudge_trials,
        }
    }

    pub fn acceptance_rate(&self, kind: TrialKind) -> f32 {
        match kind {
            TrialKind::Explore => self.explore_acceptance,
            TrialKind::Nudge => self.nudge_acceptance,
        }
    }

    pub fn push_score_history(&mut self, v: f64) {
        const MAX: usize = 512;
        self.score_history.push(v);
        if self.score_history.len() > MAX {
            let extra = self.score_history.len() - MAX;
            self.score_history.drain(0..extra);
        }
    }
}
