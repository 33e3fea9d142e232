//! One search run: the branch pool and its tick loop.
//!
//! A session snapshots the palette and target when it starts and never reads
//! them again. Each [`SearchSession::tick`] runs a fixed number of trials
//! against randomly chosen branches; accepted trials replace their branch, and
//! when any of them beats the published result a new champion is picked and
//! published at the end of the tick.
//!
//! Randomness is always passed in, so a seeded generator makes a run fully
//! reproducible.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::acceptance::{judge, Fitness, Verdict};
use super::mutation::{propose_trial, seed_parts};
use super::perceptual::{similarity_lab, to_lab, Lab};
use super::scheduler::TrialScheduler;
use super::{
    Palette, PaletteMixer, PigmentColor, PigmentModel, Recipe, Rgb, SearchConfig, SearchMode,
    SearchStats, TrialKind,
};

/// One independently evolving candidate.
#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    parts: Vec<u32>,
    resulting_color: Rgb,
    score: f64,
    total_parts: u32,
}

impl Branch {
    pub fn parts(&self) -> &[u32] {
        &self.parts
    }

    pub fn resulting_color(&self) -> Rgb {
        self.resulting_color
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn total_parts(&self) -> u32 {
        self.total_parts
    }

    fn fitness(&self) -> Fitness {
        Fitness { score: self.score, total_parts: self.total_parts }
    }
}

/// The best recipe found so far, as shown to the user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublishedResult {
    pub recipe: Recipe,
    pub resulting_color: Rgb,
    /// Match score of `resulting_color` against the target, 0..=100.
    pub score: f64,
}

impl PublishedResult {
    pub fn total_parts(&self) -> u32 {
        self.recipe.total_parts()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Running,
    /// Stopped by the host.
    Stopped,
    /// Normal mode reached a perfect match and stopped itself.
    Finished,
}

/// What one tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub trials: u32,
    pub accepted: u32,
    /// A new champion was published.
    pub published: bool,
    /// The session auto-stopped at the end of this tick.
    pub finished: bool,
}

#[derive(Clone)]
pub struct SearchSession {
    mode: SearchMode,
    state: SessionState,
    config: SearchConfig,

    // Snapshot taken at start
    pigments: Vec<PigmentColor>,
    target: Rgb,
    target_lab: Lab,
    mixer: PaletteMixer,

    branches: Vec<Branch>,
    published: PublishedResult,

    scheduler: TrialScheduler,
    stats: SearchStats,
    scratch: Vec<u32>,
}

impl SearchSession {
    /// Seed the branch pool with small random recipes and publish the best seed.
    pub fn start<R: Rng + ?Sized>(
        palette: &Palette,
        target: Rgb,
        mode: SearchMode,
        config: &SearchConfig,
        model: Arc<dyn PigmentModel>,
        rng: &mut R,
    ) -> Self {
        let seeds = (0..config.branch_count.max(1))
            .map(|_| seed_parts(palette.len(), config.seed_parts_max, rng))
            .collect();
        let session = Self::from_seeds(palette, target, mode, config, model, seeds);
        info!(
            mode = mode.label(),
            pigments = palette.len(),
            target_color = %target,
            seed_score = session.published.score,
            "search session started"
        );
        session
    }

    /// Build a session from explicit branch recipes (one parts vector per branch).
    pub(crate) fn from_seeds(
        palette: &Palette,
        target: Rgb,
        mode: SearchMode,
        config: &SearchConfig,
        model: Arc<dyn PigmentModel>,
        seeds: Vec<Vec<u32>>,
    ) -> Self {
        let pigments = palette.pigments().to_vec();
        let mixer = PaletteMixer::new(model, &pigments);
        let target_lab = to_lab(target);

        let mut session = Self {
            mode,
            state: SessionState::Running,
            config: config.clone(),
            pigments,
            target,
            target_lab,
            mixer,
            branches: Vec::new(),
            published: PublishedResult {
                recipe: Recipe::default(),
                resulting_color: Rgb::BLACK,
                score: similarity_lab(&to_lab(Rgb::BLACK), &target_lab),
            },
            scheduler: TrialScheduler::new(),
            stats: SearchStats::default(),
            scratch: Vec::with_capacity(palette.len()),
        };

        session.branches = seeds.into_iter().map(|parts| session.evaluate(parts)).collect();
        if !session.branches.is_empty() {
            let best = session.best_branch(false);
            session.publish(best);
        }
        session
    }

    fn evaluate(&self, parts: Vec<u32>) -> Branch {
        let total_parts: u32 = parts.iter().sum();
        // an empty recipe mixes to the black sentinel, scored like any other color
        let resulting_color = if total_parts == 0 { Rgb::BLACK } else { self.mixer.mix_parts(&parts) };
        let score = similarity_lab(&to_lab(resulting_color), &self.target_lab);
        Branch { parts, resulting_color, score, total_parts }
    }

    /// Index of the highest-scoring branch; first wins ties unless
    /// `prefer_fewer_parts` is set.
    fn best_branch(&self, prefer_fewer_parts: bool) -> usize {
        let mut best = 0;
        for (i, b) in self.branches.iter().enumerate().skip(1) {
            let cur = &self.branches[best];
            if b.score > cur.score
                || (prefer_fewer_parts && b.score == cur.score && b.total_parts < cur.total_parts)
            {
                best = i;
            }
        }
        best
    }

    fn publish(&mut self, idx: usize) {
        let b = &self.branches[idx];
        self.published = PublishedResult {
            recipe: Recipe::from_parts(&self.pigments, &b.parts),
            resulting_color: b.resulting_color,
            score: b.score,
        };
        self.stats.push_score_history(b.score);
    }

    /// Run one batch of trials. A no-op unless running with a non-empty palette.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TickReport {
        let mut report = TickReport::default();
        if self.state != SessionState::Running || self.pigments.is_empty() || self.branches.is_empty() {
            return report;
        }

        let tuning = *self.config.tuning(self.mode);
        let leap = self.config.leap;
        let published = Fitness {
            score: self.published.score,
            total_parts: self.published.total_parts(),
        };
        let mut improved = false;

        for _ in 0..self.config.trials_per_tick {
            report.trials += 1;
            let bi = rng.gen_range(0..self.branches.len());
            let kind = self.scheduler.sample_kind(rng, &tuning);
            propose_trial(&mut self.scratch, kind, &self.branches[bi].parts, &tuning, rng);

            let total_parts: u32 = self.scratch.iter().sum();
            if total_parts == 0 || total_parts > tuning.parts_cap {
                self.stats.rejected_out_of_bounds += 1;
                continue;
            }

            let resulting_color = self.mixer.mix_parts(&self.scratch);
            let score = similarity_lab(&to_lab(resulting_color), &self.target_lab);
            let trial = Fitness { score, total_parts };

            let verdict = judge(self.branches[bi].fitness(), trial, self.mode, &leap, rng);
            if !verdict.accepted() {
                continue;
            }
            match verdict {
                Verdict::Improved => self.stats.accepted_improvements += 1,
                Verdict::Simplified => self.stats.accepted_simplifications += 1,
                Verdict::Leap => self.stats.simplifier_leaps += 1,
                Verdict::Rejected => {}
            }
            trace!(kind = kind.label(), ?verdict, score, total_parts, "accepted trial");
            self.scheduler.record_accept(kind);
            report.accepted += 1;

            let branch = &mut self.branches[bi];
            std::mem::swap(&mut branch.parts, &mut self.scratch);
            branch.resulting_color = resulting_color;
            branch.score = score;
            branch.total_parts = total_parts;

            if score > published.score
                || (score == published.score && total_parts < published.total_parts)
            {
                improved = true;
            }
        }

        if improved {
            let champion = self.best_branch(self.mode == SearchMode::Precision);
            self.publish(champion);
            self.stats.published_improvements += 1;
            report.published = true;
            debug!(
                score = self.published.score,
                total_parts = self.published.total_parts(),
                color = %self.published.resulting_color,
                "published new champion"
            );
        }

        self.stats.ticks += 1;
        self.stats.total_trials += report.trials as u64;
        self.refresh_kind_stats();

        if self.mode == SearchMode::Normal && self.published.score >= 100.0 {
            self.state = SessionState::Finished;
            report.finished = true;
            info!(ticks = self.stats.ticks, "perfect match found, search finished");
        }

        trace!(
            trials = report.trials,
            accepted = report.accepted,
            total_accepts = self.stats.total_accepts(),
            published = report.published,
            "tick"
        );
        report
    }

    fn refresh_kind_stats(&mut self) {
        self.stats.explore_trials = self.scheduler.proposals(TrialKind::Explore);
        self.stats.nudge_trials = self.scheduler.proposals(TrialKind::Nudge);
        self.stats.explore_acceptance = self.scheduler.acceptance_rate(TrialKind::Explore);
        self.stats.nudge_acceptance = self.scheduler.acceptance_rate(TrialKind::Nudge);
    }

    /// Halt the session. Precision mode is cleared along with it.
    pub fn stop(&mut self) {
        if self.state == SessionState::Running {
            self.state = SessionState::Stopped;
            info!(ticks = self.stats.ticks, score = self.published.score, "search session stopped");
        }
        self.mode = SearchMode::Normal;
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn target(&self) -> Rgb {
        self.target
    }

    pub fn published(&self) -> &PublishedResult {
        &self.published
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }
}
