// -----------------------------------------------------------------------------
// Explore / exploit scheduler:
// - Draw above the mode threshold: Explore (full re-roll)
// - Otherwise: Nudge the parent
// -----------------------------------------------------------------------------
use rand::Rng;

use super::{ModeTuning, TrialKind};

/// Picks the trial kind and keeps per-kind proposal/accept counts for stats.
#[derive(Clone, Debug, Default)]
pub(crate) struct TrialScheduler {
    proposals: [u64; TrialKind::COUNT],
    accepts: [u64; TrialKind::COUNT],
}

impl TrialScheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn sample_kind<R: Rng + ?Sized>(&mut self, rng: &mut R, tuning: &ModeTuning) -> TrialKind {
        let kind = if rng.gen::<f64>() > tuning.explore_threshold {
            TrialKind::Explore
        } else {
            TrialKind::Nudge
        };
        let i = kind.index();
        self.proposals[i] = self.proposals[i].saturating_add(1);
        kind
    }

    pub(crate) fn record_accept(&mut self, kind: TrialKind) {
        let i = kind.index();
        self.accepts[i] = self.accepts[i].saturating_add(1);
    }

    pub(crate) fn proposals(&self, kind: TrialKind) -> u64 {
        self.proposals[kind.index()]
    }

    /// Accepted / proposed, per kind, in [0, 1].
    pub(crate) fn acceptance_rate(&self, kind: TrialKind) -> f32 {
        let i = kind.index();
        if self.proposals[i] == 0 {
            return 0.0;
        }
        self.accepts[i] as f32 / self.proposals[i] as f32
    }
}
