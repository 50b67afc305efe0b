//! Cumulative copy levels by repeated shifted convolution.
use crate::EngineError;
use crate::numbers::{Precision, to_f64_lossy};
use crate::pmf::Pmf;

/// `level(k)` is the PMF over the draw index of the (k+1)-th specific copy.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelDistributions {
    cycle_len: usize,
    levels: Vec<Pmf>,
}

impl LevelDistributions {
    /// Level 0 is `single_copy`; level k is level k−1 convolved with level 0, shifted by one draw.
    ///
    /// Level k is allocated with `(k + 1) × cycle_len` cells.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Allocation`] when a level cannot be allocated.
    pub fn accumulate(
        single_copy: &Pmf,
        level_count: usize,
        cycle_len: usize,
        precision: Precision,
    ) -> Result<Self, EngineError> {
        let mut levels: Vec<Pmf> = Vec::new();
        levels
            .try_reserve_exact(level_count)
            .map_err(|_| EngineError::Allocation { len: level_count })?;

        let mut base = Pmf::zeroed(cycle_len)?;
        for (slot, value) in base.values_mut().iter_mut().zip(single_copy.iter()) {
            slot.clone_from(value);
        }
        levels.push(base);

        for level in 1..level_count {
            let span = (level + 1)
                .checked_mul(cycle_len)
                .ok_or(EngineError::Allocation { len: usize::MAX })?;
            let next = levels[level - 1].convolve_shifted(&levels[0], span, precision)?;
            log::debug!(
                "copy level {level}: {} cells, mass {:.6}",
                next.len(),
                to_f64_lossy(&next.total())
            );
            levels.push(next);
        }
        levels.truncate(level_count);

        Ok(Self { cycle_len, levels })
    }

    #[must_use]
    pub fn cycle_len(&self) -> usize {
        self.cycle_len
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    #[must_use]
    pub fn level(&self, level: usize) -> Option<&Pmf> {
        self.levels.get(level)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pmf> {
        self.levels.iter()
    }

    /// Draws allotted to `level`: `(level + 1) × cycle_len`.
    #[must_use]
    pub fn span(&self, level: usize) -> usize {
        (level + 1) * self.cycle_len
    }

    /// Span of the highest level, i.e. the row count of an exported table.
    #[must_use]
    pub fn max_span(&self) -> usize {
        self.span(self.levels.len().saturating_sub(1))
    }
}
