//! Soft-pity hazard schedule: per-draw chance of any rare occurrence.
use bigdecimal::BigDecimal;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::ops::Index;

use crate::EngineError;
use crate::config::ConfigError;
use crate::constants::{
    PRIMARY_BASE_RATE, PRIMARY_PITY_INCREMENT, PRIMARY_PITY_START, PRIMARY_POOL_SIZE,
    SECONDARY_BASE_RATE, SECONDARY_PITY_INCREMENT, SECONDARY_PITY_START, SECONDARY_POOL_SIZE,
};
use crate::numbers::{decimal, usize_to_decimal};

/// Pity parameters for one pool cycle.
///
/// Draw `i` (zero-based) uses `base_rate` before `pity_start`, then
/// `base_rate + (i - pity_start + 1) * pity_increment` until
/// `guaranteed_index`, from which point the hazard is 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitySchedule {
    pub pool_size: usize,
    pub base_rate: BigDecimal,
    pub pity_start: usize,
    pub pity_increment: BigDecimal,
    pub guaranteed_index: usize,
}

impl PitySchedule {
    /// Build a schedule whose guarantee sits at the first index where the
    /// soft-pity formula reaches 1, or at the pool end if it never does.
    #[must_use]
    pub fn soft_pity(
        pool_size: usize,
        base_rate: BigDecimal,
        pity_start: usize,
        pity_increment: BigDecimal,
    ) -> Self {
        let mut schedule = Self {
            pool_size,
            base_rate,
            pity_start,
            pity_increment,
            guaranteed_index: pool_size.saturating_sub(1),
        };
        schedule.guaranteed_index = schedule.saturation_index();
        schedule
    }

    /// 90-draw pool, 0.6% base, soft pity from index 73 in 6% steps.
    #[must_use]
    pub fn primary() -> Self {
        Self::soft_pity(
            PRIMARY_POOL_SIZE,
            decimal(PRIMARY_BASE_RATE.0, PRIMARY_BASE_RATE.1),
            PRIMARY_PITY_START,
            decimal(PRIMARY_PITY_INCREMENT.0, PRIMARY_PITY_INCREMENT.1),
        )
    }

    /// 80-draw pool, 0.7% base, soft pity from index 62 in 7% steps.
    #[must_use]
    pub fn secondary() -> Self {
        Self::soft_pity(
            SECONDARY_POOL_SIZE,
            decimal(SECONDARY_BASE_RATE.0, SECONDARY_BASE_RATE.1),
            SECONDARY_PITY_START,
            decimal(SECONDARY_PITY_INCREMENT.0, SECONDARY_PITY_INCREMENT.1),
        )
    }

    /// The unclamped schedule formula, ignoring the guarantee.
    #[must_use]
    pub fn formula_rate(&self, index: usize) -> BigDecimal {
        if index < self.pity_start {
            return self.base_rate.clone();
        }
        let steps = usize_to_decimal(index - self.pity_start + 1);
        let escalation = &steps * &self.pity_increment;
        escalation + &self.base_rate
    }

    /// First index at which the formula reaches 1, capped at the last draw of the pool.
    #[must_use]
    pub fn saturation_index(&self) -> usize {
        let last = self.pool_size.saturating_sub(1);
        let one = BigDecimal::one();
        if self.base_rate >= one {
            return 0;
        }
        (self.pity_start..last)
            .find(|&index| self.formula_rate(index) >= one)
            .unwrap_or(last)
    }

    #[must_use]
    pub fn hazard_at(&self, index: usize) -> BigDecimal {
        if index >= self.guaranteed_index {
            BigDecimal::one()
        } else {
            self.formula_rate(index)
        }
    }

    /// Materialize the full hazard sequence for one pool cycle.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Allocation`] when the sequence cannot be allocated.
    pub fn hazards(&self) -> Result<HazardSequence, EngineError> {
        let mut values = Vec::new();
        values
            .try_reserve_exact(self.pool_size)
            .map_err(|_| EngineError::Allocation {
                len: self.pool_size,
            })?;
        values.extend((0..self.pool_size).map(|index| self.hazard_at(index)));
        Ok(HazardSequence(values))
    }

    /// Reject schedules that would need clamping to stay a probability.
    ///
    /// # Errors
    ///
    /// Returns an error when the pool is empty, the guarantee lies outside the
    /// pool, a rate is outside `[0, 1]`, or the formula reaches 1 before the
    /// declared guarantee.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::EmptyPool);
        }
        if self.guaranteed_index >= self.pool_size {
            return Err(ConfigError::IndexOutOfPool {
                field: "guaranteed_index",
                index: self.guaranteed_index,
                pool_size: self.pool_size,
            });
        }
        if self.base_rate < BigDecimal::zero() || self.base_rate > BigDecimal::one() {
            return Err(ConfigError::RateOutOfRange {
                field: "base_rate",
                value: self.base_rate.clone(),
            });
        }
        if self.pity_increment < BigDecimal::zero() {
            return Err(ConfigError::RateOutOfRange {
                field: "pity_increment",
                value: self.pity_increment.clone(),
            });
        }
        let one = BigDecimal::one();
        if self.guaranteed_index > 0 && self.base_rate >= one {
            return Err(ConfigError::HazardSaturatesEarly {
                index: 0,
                guaranteed: self.guaranteed_index,
                value: self.base_rate.clone(),
            });
        }
        for index in self.pity_start..self.guaranteed_index {
            let value = self.formula_rate(index);
            if value >= one {
                return Err(ConfigError::HazardSaturatesEarly {
                    index,
                    guaranteed: self.guaranteed_index,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Conditional per-draw probability of a rare occurrence, one entry per pool draw.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HazardSequence(Vec<BigDecimal>);

impl HazardSequence {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[BigDecimal] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BigDecimal> {
        self.0.iter()
    }
}

impl Index<usize> for HazardSequence {
    type Output = BigDecimal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}
