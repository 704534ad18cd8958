//! Component Registry
//!
//! Simulators and players are chosen at runtime by a string tag. Each
//! registry maps a tag to a constructor taking the component's JSON
//! parameters; adding a kind means inserting one more entry.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use crate::game::geometry::STONE_RADIUS;
use crate::game::player::{IdenticalPlayer, NormalDistPlayer, Player};
use crate::game::randomizer::ShotRandomizer;
use crate::game::setting::{ComponentSetting, ConfigError};
use crate::sim::{FrictionSimulator, Simulator};

/// Builds a simulator from its parameters.
pub type SimulatorFactory = fn(&serde_json::Value) -> Result<Box<dyn Simulator>, ConfigError>;

/// Builds a player from its parameters and shared match resources.
pub type PlayerFactory =
    fn(&serde_json::Value, &PlayerContext) -> Result<Box<dyn Player>, ConfigError>;

/// Shared resources handed to player constructors.
#[derive(Clone, Debug)]
pub struct PlayerContext {
    /// Process-wide shot randomizer
    pub randomizer: Arc<ShotRandomizer>,
}

/// Tag-keyed constructor table.
#[derive(Clone)]
pub struct Registry<F> {
    name: &'static str,
    factories: BTreeMap<String, F>,
}

impl<F: Copy> Registry<F> {
    /// Empty registry; `name` appears in lookup errors.
    pub fn empty(name: &'static str) -> Self {
        Self {
            name,
            factories: BTreeMap::new(),
        }
    }

    /// Add or replace a kind.
    pub fn register(&mut self, kind: impl Into<String>, factory: F) -> &mut Self {
        self.factories.insert(kind.into(), factory);
        self
    }

    /// Check if a kind is registered.
    pub fn is_registered(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kinds in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    fn lookup(&self, kind: &str) -> Result<F, ConfigError> {
        self.factories
            .get(kind)
            .copied()
            .ok_or_else(|| ConfigError::UnknownKind {
                registry: self.name,
                kind: kind.to_string(),
            })
    }
}

impl<F> std::fmt::Debug for Registry<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.name)
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Registry of simulator kinds.
pub type SimulatorRegistry = Registry<SimulatorFactory>;

/// Registry of player kinds.
pub type PlayerRegistry = Registry<PlayerFactory>;

impl SimulatorRegistry {
    /// Registry with the built-in simulators.
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty("simulator");
        registry.register(FrictionSimulator::KIND, |params| {
            Ok(Box::new(FrictionSimulator::from_params(params)?))
        });
        registry
    }

    /// Construct the simulator a setting asks for.
    ///
    /// The simulator's stone radius must match the one the rules use.
    pub fn create(&self, setting: &ComponentSetting) -> Result<Box<dyn Simulator>, ConfigError> {
        let factory = self.lookup(&setting.kind)?;
        let simulator = factory(&setting.params)?;
        let radius = simulator.stone_radius();
        if (radius - STONE_RADIUS).abs() > f32::EPSILON {
            warn!(
                "Simulator {} uses stone radius {}, rules use {}",
                setting.kind, radius, STONE_RADIUS
            );
            return Err(ConfigError::invalid(
                "simulator",
                "stone radius differs from the sheet geometry",
            ));
        }
        Ok(simulator)
    }
}

impl PlayerRegistry {
    /// Registry with the built-in players.
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty("player");
        registry
            .register(IdenticalPlayer::KIND, |_, _| Ok(Box::new(IdenticalPlayer)))
            .register(NormalDistPlayer::KIND, |_, ctx| {
                Ok(Box::new(NormalDistPlayer::new(Arc::clone(&ctx.randomizer))))
            });
        registry
    }

    /// Construct the player a setting asks for.
    pub fn create(
        &self,
        setting: &ComponentSetting,
        ctx: &PlayerContext,
    ) -> Result<Box<dyn Player>, ConfigError> {
        let factory = self.lookup(&setting.kind)?;
        factory(&setting.params, ctx)
    }
}
