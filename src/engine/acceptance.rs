// -----------------------------------------------------------------------------
// Acceptance policy
// -----------------------------------------------------------------------------

use rand::Rng;

use super::{LeapTuning, SearchMode};

/// Score and size of a recipe, the only things the policy looks at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Fitness {
    pub score: f64,
    pub total_parts: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// Strictly better match.
    Improved,
    /// Same match, fewer parts.
    Simplified,
    /// Slightly worse match, much smaller recipe (precision only, probabilistic).
    Leap,
    Rejected,
}

impl Verdict {
    #[inline]
    pub(crate) fn accepted(self) -> bool {
        !matches!(self, Verdict::Rejected)
    }
}

/// Decide whether `trial` replaces `parent`, in priority order:
/// better score, then equal score with fewer parts, then the simplifier leap.
pub(crate) fn judge<R: Rng + ?Sized>(
    parent: Fitness,
    trial: Fitness,
    mode: SearchMode,
    leap: &LeapTuning,
    rng: &mut R,
) -> Verdict {
    if trial.score > parent.score {
        return Verdict::Improved;
    }
    if trial.score == parent.score {
        return if trial.total_parts < parent.total_parts {
            Verdict::Simplified
        } else {
            Verdict::Rejected
        };
    }

    if mode != SearchMode::Precision || trial.score <= leap.min_trial_score {
        return Verdict::Rejected;
    }

    let score_drop = parent.score - trial.score;
    let parts_saved = parent.total_parts as f64 - trial.total_parts as f64;
    let worth_it = score_drop < leap.max_score_drop
        && parts_saved > leap.min_parts_saved_ratio * parent.total_parts as f64;

    if worth_it && rng.gen::<f64>() < leap.probability {
        Verdict::Leap
    } else {
        Verdict::Rejected
    }
}
