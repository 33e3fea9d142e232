// engine/mod.rs
mod acceptance;
mod config;
mod engine_core;
mod error;
mod mixer;
mod mutation;
mod perceptual;
mod scheduler;
mod session;
mod stats;
mod types;

pub use config::{LeapTuning, ModeTuning, SearchConfig};
pub use engine_core::{EngineState, MixEngine, SearchSnapshot, DEFAULT_TARGET};
pub use error::{MixError, Result};
pub use mixer::{mix, Latent, Mixbox, PaletteMixer, PigmentModel, LATENT_SIZE};
pub use mutation::TrialKind;
pub use perceptual::{delta_e94, similarity, similarity_lab, to_lab, to_xyz, Lab};
pub use session::{Branch, PublishedResult, SearchSession, SessionState, TickReport};
pub use stats::SearchStats;
pub use types::{Palette, PigmentColor, PigmentId, Recipe, RecipeEntry, Rgb, SearchMode};
