// -----------------------------------------------------------------------------
// Search configuration (runtime dials)
// -----------------------------------------------------------------------------

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{MixError, Result, SearchMode};

/// Per-mode knobs for trial generation and the recipe size cap.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModeTuning {
    /// A uniform draw above this re-rolls the whole recipe instead of nudging one entry.
    pub explore_threshold: f64,
    /// Re-rolled entries get parts uniformly in `0..=random_parts_max`.
    pub random_parts_max: u32,
    /// Trials with more total parts than this are discarded.
    pub parts_cap: u32,
}

impl ModeTuning {
    pub const NORMAL: ModeTuning = ModeTuning {
        explore_threshold: 0.95,
        random_parts_max: 5,
        parts_cap: 10,
    };

    pub const PRECISION: ModeTuning = ModeTuning {
        explore_threshold: 0.80,
        random_parts_max: 50,
        parts_cap: 1000,
    };
}

/// The simplifier leap: trading a little match for a much smaller recipe.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeapTuning {
    /// Only trials scoring above this are considered.
    pub min_trial_score: f64,
    /// Largest tolerated drop from the parent's score (exclusive).
    pub max_score_drop: f64,
    /// Trial must save more than this fraction of the parent's parts.
    pub min_parts_saved_ratio: f64,
    /// Chance of taking a qualifying leap.
    pub probability: f64,
}

impl Default for LeapTuning {
    fn default() -> Self {
        Self {
            min_trial_score: 95.0,
            max_score_drop: 20.0,
            min_parts_saved_ratio: 0.3,
            probability: 0.05,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub branch_count: usize,
    pub trials_per_tick: u32,
    pub tick_interval_ms: u64,
    /// Seed branches start with parts uniformly in `1..=seed_parts_max`.
    pub seed_parts_max: u32,
    pub normal: ModeTuning,
    pub precision: ModeTuning,
    pub leap: LeapTuning,
    /// Fixed RNG seed for reproducible runs; `None` draws one from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            branch_count: 4,
            trials_per_tick: 500,
            tick_interval_ms: 16,
            seed_parts_max: 3,
            normal: ModeTuning::NORMAL,
            precision: ModeTuning::PRECISION,
            leap: LeapTuning::default(),
            rng_seed: None,
        }
    }
}

impl SearchConfig {
    /// Parse a (possibly partial) JSON config; missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: SearchConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn tuning(&self, mode: SearchMode) -> &ModeTuning {
        match mode {
            SearchMode::Normal => &self.normal,
            SearchMode::Precision => &self.precision,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| -> Result<()> { Err(MixError::InvalidConfig(msg)) };

        if self.branch_count == 0 {
            return fail("branch_count must be at least 1".into());
        }
        if self.trials_per_tick == 0 {
            return fail("trials_per_tick must be at least 1".into());
        }
        if self.seed_parts_max == 0 {
            return fail("seed_parts_max must be at least 1".into());
        }
        for (label, t) in [("normal", &self.normal), ("precision", &self.precision)] {
            if !(0.0..=1.0).contains(&t.explore_threshold) {
                return fail(format!("{label}.explore_threshold must be within [0, 1]"));
            }
            if t.parts_cap == 0 {
                return fail(format!("{label}.parts_cap must be at least 1"));
            }
        }
        if !(0.0..=1.0).contains(&self.leap.probability) {
            return fail("leap.probability must be within [0, 1]".into());
        }
        if !(0.0..=1.0).contains(&self.leap.min_parts_saved_ratio) {
            return fail("leap.min_parts_saved_ratio must be within [0, 1]".into());
        }
        if !(0.0..=100.0).contains(&self.leap.min_trial_score) || self.leap.max_score_drop < 0.0 {
            return fail("leap scores must be within [0, 100]".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = SearchConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.tuning(SearchMode::Normal).parts_cap, 10);
        assert_eq!(cfg.tuning(SearchMode::Precision).parts_cap, 1000);
        assert_eq!(cfg.tick_interval(), Duration::from_millis(16));
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let cfg = SearchConfig::from_json_str(r#"{ "trials_per_tick": 50, "rng_seed": 7 }"#).unwrap();
        assert_eq!(cfg.trials_per_tick, 50);
        assert_eq!(cfg.rng_seed, Some(7));
        assert_eq!(cfg.branch_count, 4);
        assert_eq!(cfg.leap, LeapTuning::default());
    }

    #[test]
    fn rejects_bad_values() {
        let err = SearchConfig::from_json_str(r#"{ "branch_count": 0 }"#).unwrap_err();
        assert!(matches!(err, MixError::InvalidConfig(_)), "{err}");

        let mut cfg = SearchConfig::default();
        cfg.precision.explore_threshold = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = SearchConfig::from_json_str("{ trials_per_tick: }").unwrap_err();
        assert!(matches!(err, MixError::ConfigParse(_)));
    }
}
