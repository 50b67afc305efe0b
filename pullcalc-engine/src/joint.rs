//! Joint distribution over reaching a level on both resources.
//!
//! The two resources are treated as independent pull streams whose draw
//! counts add: reaching primary level `a` at draw `i` and secondary level `b`
//! at draw `j` lands the pair at combined index `i + j + 1`.

use crate::EngineError;
use crate::levels::LevelDistributions;
use crate::numbers::Precision;
use crate::pmf::Pmf;

#[derive(Debug, Clone, PartialEq)]
pub struct JointDistributions {
    primary_cycle: usize,
    secondary_cycle: usize,
    cells: Vec<Vec<Pmf>>,
}

impl JointDistributions {
    /// Convolve every primary level with every secondary level.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Allocation`] when a joint distribution cannot be allocated.
    pub fn accumulate(
        primary: &LevelDistributions,
        secondary: &LevelDistributions,
        precision: Precision,
    ) -> Result<Self, EngineError> {
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(primary.len())
            .map_err(|_| EngineError::Allocation { len: primary.len() })?;

        for (a, primary_level) in primary.iter().enumerate() {
            let mut row = Vec::new();
            row.try_reserve_exact(secondary.len())
                .map_err(|_| EngineError::Allocation {
                    len: secondary.len(),
                })?;
            for (b, secondary_level) in secondary.iter().enumerate() {
                let span = primary.span(a) + secondary.span(b);
                row.push(primary_level.convolve_shifted(secondary_level, span, precision)?);
            }
            log::debug!(
                "joint row for primary level {a} done ({} secondary levels)",
                secondary.len()
            );
            cells.push(row);
        }

        Ok(Self {
            primary_cycle: primary.cycle_len(),
            secondary_cycle: secondary.cycle_len(),
            cells,
        })
    }

    #[must_use]
    pub fn get(&self, primary_level: usize, secondary_level: usize) -> Option<&Pmf> {
        self.cells.get(primary_level)?.get(secondary_level)
    }

    #[must_use]
    pub fn primary_levels(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn secondary_levels(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// Draws allotted to the pair: `(a + 1) × primary_cycle + (b + 1) × secondary_cycle`.
    #[must_use]
    pub fn span(&self, primary_level: usize, secondary_level: usize) -> usize {
        (primary_level + 1) * self.primary_cycle + (secondary_level + 1) * self.secondary_cycle
    }

    /// Span of the highest level pair, i.e. the row count of an exported table.
    #[must_use]
    pub fn max_span(&self) -> usize {
        self.span(
            self.primary_levels().saturating_sub(1),
            self.secondary_levels().saturating_sub(1),
        )
    }
}
