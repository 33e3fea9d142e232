// -----------------------------------------------------------------------------
// Trial generation
// -----------------------------------------------------------------------------

use rand::Rng;

use super::ModeTuning;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrialKind {
    /// Re-roll every entry from scratch.
    Explore,
    /// Copy the parent and move one entry by ±1.
    Nudge,
}

impl TrialKind {
    pub const COUNT: usize = 2;
    pub const ALL: [TrialKind; Self::COUNT] = [TrialKind::Explore, TrialKind::Nudge];

    pub fn index(self) -> usize {
        match self {
            TrialKind::Explore => 0,
            TrialKind::Nudge => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrialKind::Explore => "Explore",
            TrialKind::Nudge => "Nudge",
        }
    }
}

/// Fresh random parts for every palette entry, each in `0..=random_parts_max`.
pub(crate) fn random_parts<R: Rng + ?Sized>(out: &mut Vec<u32>, len: usize, tuning: &ModeTuning, rng: &mut R) {
    out.clear();
    out.extend((0..len).map(|_| rng.gen_range(0..=tuning.random_parts_max)));
}

/// Seed parts: every entry in `1..=max` so no pigment starts unused.
pub(crate) fn seed_parts<R: Rng + ?Sized>(len: usize, max: u32, rng: &mut R) -> Vec<u32> {
    (0..len).map(|_| rng.gen_range(1..=max.max(1))).collect()
}

/// Parent copy with one random entry moved by ±1, floored at zero.
pub(crate) fn nudge_parts<R: Rng + ?Sized>(out: &mut Vec<u32>, parent: &[u32], rng: &mut R) {
    out.clear();
    out.extend_from_slice(parent);
    if out.is_empty() {
        return;
    }
    let idx = rng.gen_range(0..out.len());
    out[idx] = if rng.gen_bool(0.5) {
        out[idx].saturating_add(1)
    } else {
        out[idx].saturating_sub(1)
    };
}

/// Build the trial for `kind` into `out` (reused between trials).
pub(crate) fn propose_trial<R: Rng + ?Sized>(
    out: &mut Vec<u32>,
    kind: TrialKind,
    parent: &[u32],
    tuning: &ModeTuning,
    rng: &mut R,
) {
    match kind {
        TrialKind::Explore => random_parts(out, parent.len(), tuning, rng),
        TrialKind::Nudge => nudge_parts(out, parent, rng),
    }
}
