//! Per-resource pipeline: hazards → first occurrence → specific copy → copy levels.
use std::time::Instant;

use crate::EngineError;
use crate::config::ResourceConfig;
use crate::hazard::HazardSequence;
use crate::levels::LevelDistributions;
use crate::numbers::{Precision, to_f64_lossy};
use crate::occurrence::{OccurrenceDistribution, first_occurrence};
use crate::selection::{SelectionWeights, SplitPmf};

/// Every intermediate and final distribution computed for one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceTables {
    label: String,
    hazards: HazardSequence,
    occurrence: OccurrenceDistribution,
    weights: SelectionWeights,
    single_copy: SplitPmf,
    levels: LevelDistributions,
}

impl ResourceTables {
    /// Run the full pipeline for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] when the resource is invalid and
    /// [`EngineError::Allocation`] when storage cannot be reserved.
    pub fn compute(config: &ResourceConfig, precision: Precision) -> Result<Self, EngineError> {
        let weights = config.validate()?;
        let started = Instant::now();

        let hazards = config.schedule.hazards()?;
        let occurrence = first_occurrence(&hazards, precision)?;
        let single_copy = weights.split(&occurrence, precision)?;
        let cycle_len = config.cycle_len()?;
        log::debug!(
            "{}: pool {} draws, selection horizon {}, cycle {} draws",
            config.label,
            config.schedule.pool_size,
            weights.horizon(),
            cycle_len
        );

        let levels =
            LevelDistributions::accumulate(&single_copy, config.levels, cycle_len, precision)?;
        log::info!(
            "{}: {} copy levels in {:.2}s (first copy mass {:.6})",
            config.label,
            levels.len(),
            started.elapsed().as_secs_f64(),
            to_f64_lossy(&single_copy.total())
        );

        Ok(Self {
            label: config.label.clone(),
            hazards,
            occurrence,
            weights,
            single_copy,
            levels,
        })
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn hazards(&self) -> &HazardSequence {
        &self.hazards
    }

    #[must_use]
    pub fn occurrence(&self) -> &OccurrenceDistribution {
        &self.occurrence
    }

    #[must_use]
    pub fn weights(&self) -> &SelectionWeights {
        &self.weights
    }

    /// Distribution of the first specific copy; identical to level 0 before padding.
    #[must_use]
    pub fn single_copy(&self) -> &SplitPmf {
        &self.single_copy
    }

    #[must_use]
    pub fn levels(&self) -> &LevelDistributions {
        &self.levels
    }

    #[must_use]
    pub fn cycle_len(&self) -> usize {
        self.levels.cycle_len()
    }
}
