//! Dense probability mass functions over zero-based draw indices.
//!
//! Every distribution the engine produces is a [`Pmf`]. The shared kernel is
//! [`Pmf::convolve_shifted`]: the distribution of `X + Y + 1` for independent
//! `X` and `Y`, where the extra draw accounts for the event that ends `X`.
//! Each output cell is an independent gather over read-only inputs, so cells
//! are filled in parallel.

use bigdecimal::BigDecimal;
use num_traits::Zero;
use rayon::prelude::*;
use std::ops::Index;

use crate::EngineError;
use crate::numbers::Precision;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pmf {
    values: Vec<BigDecimal>,
}

impl Pmf {
    /// Allocate `len` zero cells, surfacing allocation failure instead of aborting.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Allocation`] when the backing storage cannot be reserved.
    pub fn zeroed(len: usize) -> Result<Self, EngineError> {
        let mut values = Vec::new();
        values
            .try_reserve_exact(len)
            .map_err(|_| EngineError::Allocation { len })?;
        values.resize(len, BigDecimal::zero());
        Ok(Self { values })
    }

    #[must_use]
    pub fn from_values(values: Vec<BigDecimal>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[BigDecimal] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&BigDecimal> {
        self.values.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BigDecimal> {
        self.values.iter()
    }

    pub(crate) fn values_mut(&mut self) -> &mut [BigDecimal] {
        &mut self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<BigDecimal> {
        self.values
    }

    /// Total probability mass.
    #[must_use]
    pub fn total(&self) -> BigDecimal {
        self.values
            .iter()
            .fold(BigDecimal::zero(), |acc, value| acc + value)
    }

    /// Index of the first non-zero cell.
    #[must_use]
    pub fn support_start(&self) -> Option<usize> {
        self.values.iter().position(|value| !value.is_zero())
    }

    /// One past the index of the last non-zero cell.
    #[must_use]
    pub fn support_end(&self) -> Option<usize> {
        self.values
            .iter()
            .rposition(|value| !value.is_zero())
            .map(|index| index + 1)
    }

    /// Probability that the event has happened by draw index `index` inclusive.
    #[must_use]
    pub fn cumulative(&self, index: usize) -> BigDecimal {
        self.values
            .iter()
            .take(index.saturating_add(1))
            .fold(BigDecimal::zero(), |acc, value| acc + value)
    }

    /// `self[i] += weight * other[i]` over the overlapping prefix.
    pub fn add_scaled(&mut self, other: &Pmf, weight: &BigDecimal) {
        if weight.is_zero() {
            return;
        }
        for (slot, value) in self.values.iter_mut().zip(other.values.iter()) {
            if !value.is_zero() {
                *slot += weight * value;
            }
        }
    }

    pub fn round_cells(&mut self, precision: Precision) {
        for slot in &mut self.values {
            let value = std::mem::take(slot);
            *slot = precision.round(value);
        }
    }

    /// Distribution of `X + Y + 1`, truncated to `len` cells.
    ///
    /// `out[n] = Σ self[i] × other[n - 1 - i]`; cell 0 is always zero.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Allocation`] when the output cannot be allocated.
    pub fn convolve_shifted(
        &self,
        other: &Pmf,
        len: usize,
        precision: Precision,
    ) -> Result<Pmf, EngineError> {
        let mut out = Pmf::zeroed(len)?;
        let lhs = self.as_slice();
        let rhs = other.as_slice();
        out.values
            .par_iter_mut()
            .enumerate()
            .skip(1)
            .for_each(|(cell, slot)| {
                *slot = precision.round(shifted_cell(lhs, rhs, cell - 1));
            });
        Ok(out)
    }
}

impl Index<usize> for Pmf {
    type Output = BigDecimal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

fn shifted_cell(lhs: &[BigDecimal], rhs: &[BigDecimal], target: usize) -> BigDecimal {
    let mut acc = BigDecimal::zero();
    if lhs.is_empty() || rhs.is_empty() {
        return acc;
    }
    let first = target.saturating_sub(rhs.len() - 1);
    let last = target.min(lhs.len() - 1);
    if first > last {
        return acc;
    }
    for (offset, left) in lhs[first..=last].iter().enumerate() {
        if left.is_zero() {
            continue;
        }
        let right = &rhs[target - first - offset];
        if right.is_zero() {
            continue;
        }
        acc += left * right;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numbers::decimal;

    fn pmf(values: &[(i64, i64)]) -> Pmf {
        Pmf::from_values(values.iter().map(|&(m, s)| decimal(m, s)).collect())
    }

    #[test]
    fn oversized_allocation_is_reported() {
        assert_eq!(
            Pmf::zeroed(usize::MAX),
            Err(EngineError::Allocation { len: usize::MAX })
        );
        let coin = pmf(&[(5, 1), (5, 1)]);
        assert_eq!(
            coin.convolve_shifted(&coin, usize::MAX, Precision::new(30)),
            Err(EngineError::Allocation { len: usize::MAX })
        );
    }

    #[test]
    fn shifted_convolution_adds_one_draw() {
        let coin = pmf(&[(5, 1), (5, 1)]);
        let out = coin.convolve_shifted(&coin, 4, Precision::new(40)).unwrap();
        assert_eq!(out[0], BigDecimal::zero());
        assert_eq!(out[1], decimal(25, 2));
        assert_eq!(out[2], decimal(5, 1));
        assert_eq!(out[3], decimal(25, 2));
        assert_eq!(out.total(), decimal(1, 0));
    }

    #[test]
    fn convolution_handles_unequal_lengths() {
        let lhs = pmf(&[(2, 1), (3, 1), (5, 1)]);
        let rhs = pmf(&[(1, 0)]);
        let out = lhs.convolve_shifted(&rhs, 4, Precision::new(40)).unwrap();
        assert_eq!(out.as_slice()[1..], lhs.as_slice()[..]);
        let swapped = rhs.convolve_shifted(&lhs, 4, Precision::new(40)).unwrap();
        assert_eq!(swapped, out);
    }

    #[test]
    fn convolution_of_empty_is_zero() {
        let empty = Pmf::default();
        let out = empty
            .convolve_shifted(&pmf(&[(1, 0)]), 3, Precision::new(10))
            .unwrap();
        assert!(out.iter().all(Zero::is_zero));
        assert_eq!(out.support_start(), None);
    }

    #[test]
    fn support_and_cumulative_follow_non_zero_cells() {
        let dist = pmf(&[(0, 0), (25, 2), (0, 0), (75, 2), (0, 0)]);
        assert_eq!(dist.support_start(), Some(1));
        assert_eq!(dist.support_end(), Some(4));
        assert_eq!(dist.cumulative(2), decimal(25, 2));
        assert_eq!(dist.cumulative(99), decimal(1, 0));
    }

    #[test]
    fn add_scaled_accumulates_weighted_mass() {
        let mut acc = Pmf::zeroed(3).unwrap();
        acc.add_scaled(&pmf(&[(1, 0), (0, 0)]), &decimal(375, 3));
        acc.add_scaled(&pmf(&[(0, 0), (5, 1), (5, 1)]), &decimal(625, 3));
        assert_eq!(acc[0], decimal(375, 3));
        assert_eq!(acc[1], decimal(3125, 4));
        assert_eq!(acc[2], decimal(3125, 4));
        assert_eq!(acc.total(), decimal(1, 0));
    }

    #[test]
    fn rounding_cells_respects_precision() {
        let mut dist = pmf(&[(123_456, 6), (1, 1)]);
        dist.round_cells(Precision::new(3));
        assert_eq!(dist[0], decimal(123, 3));
        assert_eq!(dist[1], decimal(1, 1));
    }
}
