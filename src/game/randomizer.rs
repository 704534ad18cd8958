//! Shot Randomizer
//!
//! Gaussian execution error applied to a nominal release velocity:
//!
//! ```text
//! speed' = |v|      + N(0, σ_speed)
//! angle' = atan2(v) + N(0, σ_angle)
//! v'     = speed' · (cos angle', sin angle')
//! ```
//!
//! One instance is shared by every match in the process. Each calling
//! thread gets its own [`DeterministicRng`], created on first use from the
//! current seed. Changing the seed does not touch existing engines; each
//! thread compares its engine's seed with the current one the next time it
//! draws and rebuilds the engine only if they differ. Setting the seed it
//! already has leaves every sequence where it was. A seedless randomizer
//! seeds every thread's engine once from OS entropy and never resets it.
//!
//! The map lock is held only while looking up or inserting an engine,
//! never while sampling. The map keeps one entry per thread that has ever
//! drawn; a worker thread that is about to exit can drop its entry with
//! [`ShotRandomizer::release_current_thread`].

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use rand_distr::{Distribution, Normal};
use tracing::{debug, warn};

use crate::core::rng::DeterministicRng;
use crate::core::vec2::Vector2;
use crate::game::setting::{check_stddev, ConfigError, RandomizerSetting};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SeedMode {
    Fixed(u64),
    Entropy,
}

struct EngineSlot {
    /// Seed the engine was built from, `None` for entropy
    seed: Option<u64>,
    engine: Arc<Mutex<DeterministicRng>>,
}

struct EngineMap {
    mode: SeedMode,
    engines: HashMap<ThreadId, EngineSlot>,
}

/// Thread-safe, reproducible Gaussian shot perturbation.
pub struct ShotRandomizer {
    speed: Normal<f32>,
    angle: Normal<f32>,
    inner: Mutex<EngineMap>,
}

impl ShotRandomizer {
    /// Build from match settings.
    pub fn new(setting: &RandomizerSetting) -> Result<Self, ConfigError> {
        let mode = match setting.seed {
            Some(seed) => SeedMode::Fixed(seed),
            None => SeedMode::Entropy,
        };
        Self::with_mode(mode, setting.speed_stddev, setting.angle_stddev)
    }

    /// Reproducible randomizer starting from `seed`.
    pub fn seeded(seed: u64, speed_stddev: f32, angle_stddev: f32) -> Result<Self, ConfigError> {
        Self::with_mode(SeedMode::Fixed(seed), speed_stddev, angle_stddev)
    }

    /// Non-reproducible randomizer for production matches.
    pub fn seedless(speed_stddev: f32, angle_stddev: f32) -> Result<Self, ConfigError> {
        Self::with_mode(SeedMode::Entropy, speed_stddev, angle_stddev)
    }

    fn with_mode(mode: SeedMode, speed_stddev: f32, angle_stddev: f32) -> Result<Self, ConfigError> {
        check_stddev("randomizer.speed_stddev", speed_stddev)?;
        check_stddev("randomizer.angle_stddev", angle_stddev)?;

        let speed = Normal::new(0.0, speed_stddev)
            .map_err(|_| ConfigError::invalid("randomizer.speed_stddev", "rejected by normal distribution"))?;
        let angle = Normal::new(0.0, angle_stddev)
            .map_err(|_| ConfigError::invalid("randomizer.angle_stddev", "rejected by normal distribution"))?;

        Ok(Self {
            speed,
            angle,
            inner: Mutex::new(EngineMap {
                mode,
                engines: HashMap::new(),
            }),
        })
    }

    /// Current seed, `None` for a seedless randomizer.
    pub fn seed(&self) -> Option<u64> {
        match self.inner.lock().mode {
            SeedMode::Fixed(seed) => Some(seed),
            SeedMode::Entropy => None,
        }
    }

    /// Replace the seed. A thread whose engine was built from a different
    /// seed rebuilds it on its next draw.
    ///
    /// Ignored by a seedless randomizer.
    pub fn set_seed(&self, seed: u64) {
        let mut inner = self.inner.lock();
        match inner.mode {
            SeedMode::Fixed(_) => {
                inner.mode = SeedMode::Fixed(seed);
                debug!("Randomizer seed set to {}", seed);
            }
            SeedMode::Entropy => {
                warn!("Ignoring set_seed({}) on a seedless randomizer", seed);
            }
        }
    }

    /// Perturb a nominal release velocity.
    pub fn perturb(&self, velocity: Vector2) -> Vector2 {
        let engine = self.engine_for_current_thread();
        let mut rng = engine.lock();

        let speed = velocity.length() + self.speed.sample(&mut *rng);
        let angle = velocity.angle() + self.angle.sample(&mut *rng);
        Vector2::from_polar(speed, angle)
    }

    /// Look up (or lazily create / reseed) the calling thread's engine.
    fn engine_for_current_thread(&self) -> Arc<Mutex<DeterministicRng>> {
        let id = thread::current().id();
        let mut inner = self.inner.lock();
        let mode = inner.mode;

        if let Some(slot) = inner.engines.get(&id) {
            let stale = match mode {
                SeedMode::Fixed(seed) => slot.seed != Some(seed),
                SeedMode::Entropy => false,
            };
            if !stale {
                return Arc::clone(&slot.engine);
            }
        }

        let (seed, rng) = match mode {
            SeedMode::Fixed(seed) => (Some(seed), DeterministicRng::new(seed)),
            SeedMode::Entropy => (None, DeterministicRng::new(rand::random::<u64>())),
        };
        let engine = Arc::new(Mutex::new(rng));
        inner.engines.insert(
            id,
            EngineSlot {
                seed,
                engine: Arc::clone(&engine),
            },
        );
        engine
    }

    /// Drop the calling thread's engine.
    ///
    /// The next draw on this thread starts a fresh sequence from the
    /// current seed.
    pub fn release_current_thread(&self) {
        let id = thread::current().id();
        self.inner.lock().engines.remove(&id);
    }

    /// Number of threads currently holding an engine.
    pub fn thread_count(&self) -> usize {
        self.inner.lock().engines.len()
    }
}

impl std::fmt::Debug for ShotRandomizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ShotRandomizer")
            .field("speed", &self.speed)
            .field("angle", &self.angle)
            .field("mode", &inner.mode)
            .field("threads", &inner.engines.len())
            .finish()
    }
}
