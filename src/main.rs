//! Demo host: builds the engine with the default red/blue/yellow palette,
//! searches for the default target and logs progress until the search settles.

use std::{
    thread,
    time::{Duration, Instant},
};

use mixfinder::engine::TrialKind;
use mixfinder::{MixEngine, SearchConfig, SearchMode};
use tracing_subscriber::EnvFilter;

const POLL: Duration = Duration::from_millis(250);
const BUDGET: Duration = Duration::from_secs(5);

fn main() -> mixfinder::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mixfinder=info")))
        .init();

    let engine = MixEngine::new(SearchConfig::default())?;
    tracing::info!(target_color = %engine.target(), pigments = engine.palette().len(), "searching");

    engine.start(SearchMode::Normal);
    let started = Instant::now();
    while engine.is_running() && started.elapsed() < BUDGET {
        thread::sleep(POLL);
        let snap = engine.snapshot();
        tracing::info!(
            progress = snap.progress(),
            trials_per_second = snap.stats.trials_per_second as u64,
            "searching"
        );
    }
    engine.stop();

    let snap = engine.snapshot();
    if let Some(result) = snap.result {
        let palette = engine.palette();
        let mix = result
            .recipe
            .normalized()
            .entries()
            .iter()
            .map(|e| {
                let name = palette
                    .get(e.pigment)
                    .and_then(|p| p.name.clone())
                    .unwrap_or_else(|| e.color.to_string());
                format!("{} x {}", e.parts, name)
            })
            .collect::<Vec<_>>()
            .join(", ");
        tracing::info!(
            color = %result.resulting_color,
            score = result.score,
            ticks = snap.stats.ticks,
            accepts = snap.stats.total_accepts(),
            "best mix: {mix}"
        );
        for kind in TrialKind::ALL {
            tracing::info!(
                kind = kind.label(),
                proposals = snap.stats.proposals(kind),
                acceptance = snap.stats.acceptance_rate(kind),
                "trial kind"
            );
        }
    }
    Ok(())
}
