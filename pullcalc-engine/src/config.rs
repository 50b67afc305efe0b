//! Engine configuration: per-resource pity schedules, selection rules and level counts.
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    MIN_PRECISION_DIGITS, PRIMARY_LABEL, PRIMARY_LEVELS, SECONDARY_LABEL, SECONDARY_LEVELS,
};
use crate::hazard::PitySchedule;
use crate::numbers::Precision;
use crate::selection::{SelectionRule, SelectionWeights};

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("precision must be at least {min} digits (got {value})")]
    PrecisionTooLow { min: u64, value: u64 },
    #[error("pool size must be positive")]
    EmptyPool,
    #[error("{field} index {index} lies outside a pool of {pool_size} draws")]
    IndexOutOfPool {
        field: &'static str,
        index: usize,
        pool_size: usize,
    },
    #[error("{field} must be between 0 and 1 (got {value})")]
    RateOutOfRange {
        field: &'static str,
        value: BigDecimal,
    },
    #[error("hazard reaches {value} at index {index}, before the guarantee at {guaranteed}")]
    HazardSaturatesEarly {
        index: usize,
        guaranteed: usize,
        value: BigDecimal,
    },
    #[error("selection rule has no lookahead weights")]
    EmptyWeights,
    #[error("lookahead offset {offset} appears more than once")]
    DuplicateOffset { offset: usize },
    #[error("lookahead weight at offset {offset} must be between 0 and 1 (got {weight})")]
    WeightOutOfRange { offset: usize, weight: BigDecimal },
    #[error("lookahead weights must sum to exactly 1 (got {total})")]
    WeightsDoNotSumToOne { total: BigDecimal },
    #[error("at least one copy level is required")]
    NoLevels,
    #[error("resource label must be non-empty")]
    EmptyLabel,
    #[error("both resources are labelled {label:?}")]
    DuplicateLabel { label: String },
    #[error("{quantity} does not fit in the addressable size range")]
    SizeOverflow { quantity: &'static str },
    #[error("{label}: {source}")]
    Resource {
        label: String,
        #[source]
        source: Box<ConfigError>,
    },
}

/// One independently pulled resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub label: String,
    pub schedule: PitySchedule,
    pub selection: SelectionRule,
    /// Number of cumulative copy levels to derive (level 0 is the first copy).
    pub levels: usize,
}

impl ResourceConfig {
    /// 90-draw soft pity with a 50/50 split, seven copy levels.
    #[must_use]
    pub fn primary() -> Self {
        Self {
            label: PRIMARY_LABEL.to_string(),
            schedule: PitySchedule::primary(),
            selection: SelectionRule::FiftyFifty,
            levels: PRIMARY_LEVELS,
        }
    }

    /// 80-draw soft pity with the featured-pair fate-point split, five copy levels.
    #[must_use]
    pub fn secondary() -> Self {
        Self {
            label: SECONDARY_LABEL.to_string(),
            schedule: PitySchedule::secondary(),
            selection: SelectionRule::fate_point_preset(),
            levels: SECONDARY_LEVELS,
        }
    }

    /// Validate the resource and resolve its selection weights.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Resource`] wrapping the first violated invariant.
    pub fn validate(&self) -> Result<SelectionWeights, ConfigError> {
        self.validate_inner().map_err(|source| ConfigError::Resource {
            label: self.label.clone(),
            source: Box::new(source),
        })
    }

    fn validate_inner(&self) -> Result<SelectionWeights, ConfigError> {
        if self.label.trim().is_empty() {
            return Err(ConfigError::EmptyLabel);
        }
        if self.levels == 0 {
            return Err(ConfigError::NoLevels);
        }
        self.schedule.validate()?;
        let weights = self.selection.resolve()?;
        Self::max_span_for(self.schedule.pool_size, &weights, self.levels)?;
        Ok(weights)
    }

    fn cycle_len_for(pool_size: usize, weights: &SelectionWeights) -> Result<usize, ConfigError> {
        let horizon = weights
            .iter()
            .map(|entry| entry.offset)
            .max()
            .map_or(Some(0), |offset| offset.checked_add(1))
            .ok_or(ConfigError::SizeOverflow {
                quantity: "selection horizon",
            })?;
        pool_size
            .checked_mul(horizon)
            .ok_or(ConfigError::SizeOverflow {
                quantity: "cycle length",
            })
    }

    fn max_span_for(
        pool_size: usize,
        weights: &SelectionWeights,
        levels: usize,
    ) -> Result<usize, ConfigError> {
        Self::cycle_len_for(pool_size, weights)?
            .checked_mul(levels)
            .ok_or(ConfigError::SizeOverflow {
                quantity: "highest level span",
            })
    }

    /// Draws spanned by one specific copy: pool size times the selection horizon.
    ///
    /// # Errors
    ///
    /// Returns an error when the selection rule does not resolve or the
    /// product overflows.
    pub fn cycle_len(&self) -> Result<usize, ConfigError> {
        Self::cycle_len_for(self.schedule.pool_size, &self.selection.resolve()?)
    }

    /// Draws allotted to the highest copy level: `levels × cycle_len`.
    ///
    /// # Errors
    ///
    /// See [`ResourceConfig::cycle_len`].
    pub fn max_span(&self) -> Result<usize, ConfigError> {
        Self::max_span_for(self.schedule.pool_size, &self.selection.resolve()?, self.levels)
    }
}

/// Full engine configuration: arithmetic precision and the two resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub precision: Precision,
    pub primary: ResourceConfig,
    pub secondary: ResourceConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            precision: Precision::default(),
            primary: ResourceConfig::primary(),
            secondary: ResourceConfig::secondary(),
        }
    }
}

impl EngineConfig {
    /// # Errors
    ///
    /// Returns the first violated invariant across precision and both resources.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.precision.digits() < MIN_PRECISION_DIGITS {
            return Err(ConfigError::PrecisionTooLow {
                min: MIN_PRECISION_DIGITS,
                value: self.precision.digits(),
            });
        }
        self.primary.validate()?;
        self.secondary.validate()?;
        self.primary
            .max_span()?
            .checked_add(self.secondary.max_span()?)
            .ok_or(ConfigError::SizeOverflow {
                quantity: "joint span",
            })?;
        if self.primary.label == self.secondary.label {
            return Err(ConfigError::DuplicateLabel {
                label: self.primary.label.clone(),
            });
        }
        Ok(())
    }
}
