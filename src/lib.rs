//! Paint recipe finder.
//!
//! Given a palette of base pigments and a target color, search for integer
//! part ratios whose pigment mix (latent-space, not RGB averaging) best matches
//! the target while keeping the recipe small.
//!
//! Hosts either drive a [`SearchSession`] themselves (`start` / `tick` /
//! `stop`) or let a [`MixEngine`] tick it on a background thread and poll
//! [`SearchSnapshot`]s.

pub mod engine;

pub use engine::{
    EngineState, MixEngine, MixError, Palette, PigmentColor, PigmentId, PublishedResult, Recipe,
    RecipeEntry, Result, Rgb, SearchConfig, SearchMode, SearchSession, SearchSnapshot,
    SearchStats,
};
