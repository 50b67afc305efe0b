//! Pullcalc Probability Engine
//!
//! Exact pull-count distributions for soft-pity gacha mechanics. Hazard
//! schedules become first-occurrence distributions, selection rules split
//! those into single-copy distributions, and repeated shifted convolution
//! yields cumulative copy levels for each resource and for resource pairs.
//! All arithmetic uses arbitrary-precision decimals.

pub mod config;
pub mod constants;
pub mod hazard;
pub mod joint;
pub mod levels;
pub mod numbers;
pub mod occurrence;
pub mod pmf;
pub mod resource;
pub mod selection;

use thiserror::Error;

// Re-export commonly used types
pub use config::{ConfigError, EngineConfig, ResourceConfig};
pub use hazard::{HazardSequence, PitySchedule};
pub use joint::JointDistributions;
pub use levels::LevelDistributions;
pub use numbers::{Precision, to_fixed};
pub use occurrence::{OccurrenceDistribution, first_occurrence};
pub use pmf::Pmf;
pub use resource::ResourceTables;
pub use selection::{LookaheadWeight, SelectionRule, SelectionWeights, SplitPmf};

/// Errors surfaced by engine computations.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to allocate {len} distribution cells")]
    Allocation { len: usize },
}

/// Which of the two independently pulled resources a stage refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceId {
    Primary,
    Secondary,
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceId::Primary => write!(f, "primary"),
            ResourceId::Secondary => write!(f, "secondary"),
        }
    }
}

/// Readiness of a single computation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Readiness {
    #[default]
    NotReady,
    Ready,
}

/// Snapshot of which stages an engine has computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ReadinessState {
    pub primary: Readiness,
    pub secondary: Readiness,
    pub joint: Readiness,
}

/// A stage result: absent until computed, then immutable until reset.
#[derive(Debug)]
struct Stage<T>(Option<T>);

impl<T> Stage<T> {
    const fn empty() -> Self {
        Self(None)
    }

    const fn readiness(&self) -> Readiness {
        match self.0 {
            None => Readiness::NotReady,
            Some(_) => Readiness::Ready,
        }
    }

    const fn ready(&self) -> Option<&T> {
        self.0.as_ref()
    }

    fn get_or_try_init<E>(&mut self, init: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        let value = match self.0.take() {
            Some(value) => value,
            None => init()?,
        };
        Ok(self.0.insert(value))
    }

    fn clear(&mut self) {
        self.0 = None;
    }
}

fn ensure_resource<'a>(
    stage: &'a mut Stage<ResourceTables>,
    config: &ResourceConfig,
    precision: Precision,
    resource: ResourceId,
) -> Result<&'a ResourceTables, EngineError> {
    if stage.readiness() == Readiness::Ready {
        log::debug!("{resource} resource tables already computed");
    }
    stage.get_or_try_init(|| {
        log::info!("computing {resource} resource tables");
        ResourceTables::compute(config, precision)
    })
}

/// Owns the configuration and every memoized stage result.
///
/// Stages only move from not-ready to ready; [`PullEngine::reset`] is the one
/// way back and drops all stored distributions.
#[derive(Debug)]
pub struct PullEngine {
    config: EngineConfig,
    primary: Stage<ResourceTables>,
    secondary: Stage<ResourceTables>,
    joint: Stage<JointDistributions>,
}

impl PullEngine {
    /// Create an engine after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns the first configuration invariant that does not hold.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            primary: Stage::empty(),
            secondary: Stage::empty(),
            joint: Stage::empty(),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn readiness(&self) -> ReadinessState {
        ReadinessState {
            primary: self.primary.readiness(),
            secondary: self.secondary.readiness(),
            joint: self.joint.readiness(),
        }
    }

    /// Computed tables for `resource`, if that stage is ready.
    #[must_use]
    pub const fn resource(&self, resource: ResourceId) -> Option<&ResourceTables> {
        match resource {
            ResourceId::Primary => self.primary.ready(),
            ResourceId::Secondary => self.secondary.ready(),
        }
    }

    #[must_use]
    pub const fn joint(&self) -> Option<&JointDistributions> {
        self.joint.ready()
    }

    /// Compute `resource` unless it is already ready.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Allocation`] when a distribution cannot be allocated.
    pub fn compute_resource(
        &mut self,
        resource: ResourceId,
    ) -> Result<&ResourceTables, EngineError> {
        let (stage, config) = match resource {
            ResourceId::Primary => (&mut self.primary, &self.config.primary),
            ResourceId::Secondary => (&mut self.secondary, &self.config.secondary),
        };
        ensure_resource(stage, config, self.config.precision, resource)
    }

    /// # Errors
    ///
    /// See [`PullEngine::compute_resource`].
    pub fn compute_primary(&mut self) -> Result<&ResourceTables, EngineError> {
        self.compute_resource(ResourceId::Primary)
    }

    /// # Errors
    ///
    /// See [`PullEngine::compute_resource`].
    pub fn compute_secondary(&mut self) -> Result<&ResourceTables, EngineError> {
        self.compute_resource(ResourceId::Secondary)
    }

    /// Compute the joint distributions, first computing whichever resource is not ready.
    ///
    /// Repeated calls return the memoized result without recomputation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Allocation`] when a distribution cannot be allocated.
    pub fn compute_joint(&mut self) -> Result<&JointDistributions, EngineError> {
        let Self {
            config,
            primary,
            secondary,
            joint,
        } = self;
        let precision = config.precision;
        if joint.readiness() == Readiness::Ready {
            log::debug!("joint distributions already computed");
        }
        joint.get_or_try_init(|| {
            let primary = ensure_resource(primary, &config.primary, precision, ResourceId::Primary)?;
            let secondary = ensure_resource(
                secondary,
                &config.secondary,
                precision,
                ResourceId::Secondary,
            )?;
            log::info!("computing joint distributions");
            JointDistributions::accumulate(primary.levels(), secondary.levels(), precision)
        })
    }

    /// Drop every computed distribution and return all stages to not-ready.
    pub fn reset(&mut self) {
        log::debug!("resetting engine stages");
        self.primary.clear();
        self.secondary.clear();
        self.joint.clear();
    }
}
