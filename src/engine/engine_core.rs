//! Engine core: the host-facing handle around a [`SearchSession`].
//!
//! Responsibilities:
//! - Owns the palette, target and config the host edits between runs.
//! - Runs a background worker thread that ticks the active session on a fixed
//!   cadence (default 16 ms) and sleeps the rest of each interval.
//! - Publishes cloned [`SearchSnapshot`]s; the host never touches engine state.
//!
//! Key invariants:
//! - The worker ticks a private copy of the session outside the lock and
//!   commits it back only if no host call touched the session meanwhile, so
//!   `snapshot()`/`stop()`/edits never wait on a full tick and a tick racing
//!   with them is dropped.
//! - Editing the palette or target discards the session and its published result.
//! - Dropping the engine stops the worker and joins it.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg as PcgRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::{
    Mixbox, Palette, PigmentColor, PigmentId, PigmentModel, PublishedResult, Result, Rgb,
    SearchConfig, SearchMode, SearchSession, SearchStats,
};

const IDLE_POLL: Duration = Duration::from_millis(10);
const STATS_WINDOW_SECS: f32 = 0.5;

/// Default target for a fresh engine: a mid blue.
pub const DEFAULT_TARGET: Rgb = Rgb::new(0x3b, 0x82, 0xf6);

// -----------------------------------------------------------------------------
// Snapshot (what the host sees)
// -----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Idle,
    Running(SearchMode),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchSnapshot {
    pub state: EngineState,
    pub target: Rgb,
    /// Best recipe of the current or last session; `None` before the first
    /// start or after the palette/target changed.
    pub result: Option<PublishedResult>,
    pub stats: SearchStats,
}

impl SearchSnapshot {
    pub fn is_running(&self) -> bool {
        matches!(self.state, EngineState::Running(_))
    }

    /// Mode of the running session; `Normal` when idle.
    pub fn mode(&self) -> SearchMode {
        match self.state {
            EngineState::Running(mode) => mode,
            EngineState::Idle => SearchMode::Normal,
        }
    }

    /// Match score of the published result, 0..=100 (drives a progress bar).
    pub fn progress(&self) -> f64 {
        self.result.as_ref().map_or(0.0, |r| r.score)
    }
}

// -----------------------------------------------------------------------------
// Shared state (guarded by a mutex)
// -----------------------------------------------------------------------------
struct SharedState {
    palette: Palette,
    target: Rgb,
    config: SearchConfig,
    model: Arc<dyn PigmentModel>,
    rng: PcgRng,

    session: Option<SearchSession>,
    // bumped by every host call that replaces or halts the session
    generation: u64,

    // trials/s pacing
    trials_counter_window: u64,
    window_started_at: Instant,
    trials_per_second: f32,
}

impl SharedState {
    fn discard_session(&mut self, reason: &str) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(mut session) = self.session.take() {
            if session.is_running() {
                session.stop();
            }
            info!(reason, "search session discarded");
        }
    }

    fn note_trials(&mut self, trials: u32) {
        self.trials_counter_window = self.trials_counter_window.saturating_add(trials as u64);
        let elapsed = self.window_started_at.elapsed().as_secs_f32();
        if elapsed >= STATS_WINDOW_SECS {
            self.trials_per_second = self.trials_counter_window as f32 / elapsed.max(0.001);
            self.trials_counter_window = 0;
            self.window_started_at = Instant::now();
        }
    }
}

fn rng_from_config(config: &SearchConfig) -> PcgRng {
    let seed = config.rng_seed.unwrap_or_else(|| rand::thread_rng().gen());
    PcgRng::seed_from_u64(seed)
}

// -----------------------------------------------------------------------------
// Public engine API (used by the host)
// -----------------------------------------------------------------------------
pub struct MixEngine {
    shared: Arc<Mutex<SharedState>>,
    worker_should_run: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    worker_thread: Option<thread::JoinHandle<()>>,
}

impl MixEngine {
    /// Engine with the `mixbox` pigment model, the primaries palette and the
    /// default target. The worker thread starts paused.
    pub fn new(config: SearchConfig) -> Result<Self> {
        Self::with_model(config, Arc::new(Mixbox))
    }

    pub fn with_model(config: SearchConfig, model: Arc<dyn PigmentModel>) -> Result<Self> {
        config.validate()?;
        debug!(model = model.name(), "creating mix engine");

        let shared = SharedState {
            palette: Palette::primaries(),
            target: DEFAULT_TARGET,
            rng: rng_from_config(&config),
            config,
            model,
            session: None,
            generation: 0,
            trials_counter_window: 0,
            window_started_at: Instant::now(),
            trials_per_second: 0.0,
        };

        let mut engine = Self {
            shared: Arc::new(Mutex::new(shared)),
            worker_should_run: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(AtomicBool::new(false)),
            worker_thread: None,
        };
        engine.start_worker_thread();
        Ok(engine)
    }

    fn start_worker_thread(&mut self) {
        let shared_mutex = Arc::clone(&self.shared);
        let running_flag = Arc::clone(&self.worker_should_run);
        let shutdown_flag = Arc::clone(&self.shutdown);

        let handle = thread::spawn(move || loop {
            if shutdown_flag.load(Ordering::Relaxed) {
                break;
            }
            if !running_flag.load(Ordering::Relaxed) {
                thread::sleep(IDLE_POLL);
                continue;
            }

            let tick_started = Instant::now();

            // Short lock: copy out the running session and the generator.
            let work = {
                let s = shared_mutex.lock();
                match s.session.as_ref() {
                    Some(session) if session.is_running() => {
                        Some((session.clone(), s.rng.clone(), s.generation, s.config.tick_interval()))
                    }
                    _ => {
                        running_flag.store(false, Ordering::Relaxed);
                        None
                    }
                }
            };
            let Some((mut session, mut rng, generation, interval)) = work else {
                continue;
            };

            let report = session.tick(&mut rng);

            // Short lock: commit unless the host replaced or stopped the session.
            {
                let mut s = shared_mutex.lock();
                if s.generation == generation {
                    s.session = Some(session);
                    s.rng = rng;
                    s.note_trials(report.trials);
                    if report.finished {
                        running_flag.store(false, Ordering::Relaxed);
                    }
                } else {
                    trace!(generation, "dropping tick for a replaced session");
                }
            }

            let spent = tick_started.elapsed();
            if spent < interval {
                thread::sleep(interval - spent);
            }
        });
        self.worker_thread = Some(handle);
    }

    // ---------------------------------------------------------------------
    // Run control
    // ---------------------------------------------------------------------

    /// Start a search on the current palette and target. Starting while a
    /// session is running stops it and starts over.
    pub fn start(&self, mode: SearchMode) {
        let mut guard = self.shared.lock();
        let s = &mut *guard;
        if s.session.as_ref().is_some_and(SearchSession::is_running) {
            info!(mode = mode.label(), "restarting running search");
        }
        s.discard_session("restart");

        let session = SearchSession::start(&s.palette, s.target, mode, &s.config, Arc::clone(&s.model), &mut s.rng);
        s.session = Some(session);
        s.trials_counter_window = 0;
        s.trials_per_second = 0.0;
        s.window_started_at = Instant::now();
        self.worker_should_run.store(true, Ordering::Relaxed);
    }

    /// Stop the running search. The last published result stays visible.
    pub fn stop(&self) {
        let mut s = self.shared.lock();
        s.generation = s.generation.wrapping_add(1);
        self.worker_should_run.store(false, Ordering::Relaxed);
        if let Some(session) = s.session.as_mut() {
            session.stop();
        }
    }

    pub fn is_running(&self) -> bool {
        let s = self.shared.lock();
        s.session.as_ref().is_some_and(SearchSession::is_running)
    }

    /// Copy of everything the host needs to render.
    pub fn snapshot(&self) -> SearchSnapshot {
        let s = self.shared.lock();
        let (state, result, mut stats) = match s.session.as_ref() {
            Some(session) => {
                let state = if session.is_running() {
                    EngineState::Running(session.mode())
                } else {
                    EngineState::Idle
                };
                (state, Some(session.published().clone()), session.stats().clone())
            }
            None => (EngineState::Idle, None, SearchStats::default()),
        };
        stats.trials_per_second = if state == EngineState::Idle { 0.0 } else { s.trials_per_second };
        SearchSnapshot { state, target: s.target, result, stats }
    }

    // ---------------------------------------------------------------------
    // Inputs (each one invalidates the current session)
    // ---------------------------------------------------------------------

    pub fn set_palette(&self, palette: Palette) {
        let mut s = self.shared.lock();
        s.discard_session("palette changed");
        s.palette = palette;
    }

    pub fn add_pigment(&self, pigment: PigmentColor) -> Result<()> {
        let mut s = self.shared.lock();
        s.palette.add(pigment)?;
        s.discard_session("pigment added");
        Ok(())
    }

    pub fn remove_pigment(&self, id: PigmentId) -> Result<PigmentColor> {
        let mut s = self.shared.lock();
        let removed = s.palette.remove(id)?;
        s.discard_session("pigment removed");
        Ok(removed)
    }

    pub fn palette(&self) -> Palette {
        self.shared.lock().palette.clone()
    }

    pub fn set_target(&self, target: Rgb) {
        let mut s = self.shared.lock();
        if s.target != target {
            s.discard_session("target changed");
            s.target = target;
        }
    }

    pub fn target(&self) -> Rgb {
        self.shared.lock().target
    }

    /// Replace the config used by the next `start`. A fixed seed also
    /// reseeds the generator.
    pub fn set_config(&self, config: SearchConfig) -> Result<()> {
        config.validate()?;
        let mut s = self.shared.lock();
        if config.rng_seed.is_some() {
            s.generation = s.generation.wrapping_add(1);
            s.rng = rng_from_config(&config);
        }
        s.config = config;
        Ok(())
    }

    pub fn config(&self) -> SearchConfig {
        self.shared.lock().config.clone()
    }
}

impl Drop for MixEngine {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.worker_should_run.store(false, Ordering::Relaxed);
        if let Some(handle) = self.worker_thread.take() {
            let _ = handle.join();
        }
    }
}
