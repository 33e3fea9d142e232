// -----------------------------------------------------------------------------
// Crate error type
// -----------------------------------------------------------------------------

use thiserror::Error;

use super::PigmentId;

/// Everything that can go wrong at the edges of the engine.
///
/// The search itself never fails: invalid trials are skipped, so these only
/// surface while parsing colors, editing palettes, or loading a config.
#[derive(Debug, Error)]
pub enum MixError {
    #[error("invalid hex color {0:?} (expected #rrggbb or #rgb)")]
    InvalidHex(String),

    #[error("palette already contains pigment {0}")]
    DuplicatePigment(PigmentId),

    #[error("palette has no pigment {0}")]
    UnknownPigment(PigmentId),

    #[error("invalid search config: {0}")]
    InvalidConfig(String),

    #[error("failed to parse search config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MixError>;
