//! Specific-item selection among consecutive rare occurrences.
//!
//! A rare occurrence only says "some rare item dropped". Selection weights say
//! at which lookahead offset (0 = this occurrence, 1 = the next one, ...) the
//! specific item is resolved. Splitting an occurrence distribution by these
//! weights yields the distribution for one specific copy.

use bigdecimal::BigDecimal;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::EngineError;
use crate::config::ConfigError;
use crate::constants::{FATE_POINT_FEATURED_RATE, FATE_POINT_SPECIFIC_RATE, FIFTY_FIFTY_WEIGHT};
use crate::numbers::{Precision, decimal};
use crate::occurrence::OccurrenceDistribution;
use crate::pmf::Pmf;

/// PMF over the draw index at which one specific copy is obtained.
pub type SplitPmf = Pmf;

/// Probability that the specific item resolves exactly `offset` occurrences later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookaheadWeight {
    pub offset: usize,
    pub weight: BigDecimal,
}

impl LookaheadWeight {
    #[must_use]
    pub fn new(offset: usize, weight: BigDecimal) -> Self {
        Self { offset, weight }
    }
}

/// Inline storage; real selection rules span at most a handful of occurrences.
pub type WeightSet = SmallVec<[LookaheadWeight; 4]>;

/// Validated lookahead weights, sorted by offset and summing to exactly one.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionWeights {
    weights: WeightSet,
}

impl SelectionWeights {
    /// # Errors
    ///
    /// Returns an error when the set is empty, an offset repeats, a weight is
    /// outside `[0, 1]`, or the weights do not sum to exactly one.
    pub fn new<I>(weights: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = LookaheadWeight>,
    {
        let mut weights: WeightSet = weights.into_iter().collect();
        if weights.is_empty() {
            return Err(ConfigError::EmptyWeights);
        }
        weights.sort_by_key(|entry| entry.offset);
        if let Some(pair) = weights.windows(2).find(|pair| pair[0].offset == pair[1].offset) {
            return Err(ConfigError::DuplicateOffset {
                offset: pair[0].offset,
            });
        }
        let (zero, one) = (BigDecimal::zero(), BigDecimal::one());
        if let Some(entry) = weights
            .iter()
            .find(|entry| entry.weight < zero || entry.weight > one)
        {
            return Err(ConfigError::WeightOutOfRange {
                offset: entry.offset,
                weight: entry.weight.clone(),
            });
        }
        let selection = Self { weights };
        let total = selection.total();
        if total != one {
            return Err(ConfigError::WeightsDoNotSumToOne { total });
        }
        Ok(selection)
    }

    /// Simple 50/50: win on the first occurrence, or be guaranteed on the next.
    #[must_use]
    pub fn fifty_fifty() -> Self {
        let half = decimal(FIFTY_FIFTY_WEIGHT.0, FIFTY_FIFTY_WEIGHT.1);
        let weights = [
            LookaheadWeight::new(0, half.clone()),
            LookaheadWeight::new(1, half),
        ];
        Self {
            weights: weights.into_iter().collect(),
        }
    }

    /// Featured-pair rule with a fate point: the specific item is guaranteed by the third occurrence.
    ///
    /// With `f` the featured-pair rate and `s` the specific-given-featured rate:
    /// offset 0 is `f·s`; offset 1 is `f·(1−s)·f·s + (1−f)·s` (after a featured
    /// miss the next roll is unguarded, after an off-banner miss the next one is
    /// featured); offset 2 takes the remaining mass.
    ///
    /// # Errors
    ///
    /// Returns an error when either rate lies outside `[0, 1]`.
    pub fn fate_point(
        featured_rate: &BigDecimal,
        specific_rate: &BigDecimal,
    ) -> Result<Self, ConfigError> {
        let (zero, one) = (BigDecimal::zero(), BigDecimal::one());
        let rates = [
            ("featured_rate", featured_rate),
            ("specific_rate", specific_rate),
        ];
        for (field, value) in rates {
            if *value < zero || *value > one {
                return Err(ConfigError::RateOutOfRange {
                    field,
                    value: value.clone(),
                });
            }
        }
        let specific_first = featured_rate * specific_rate;
        let featured_miss = featured_rate * &(&one - specific_rate);
        let off_banner = &one - featured_rate;
        let specific_second = &featured_miss * &specific_first + &off_banner * specific_rate;
        let guaranteed_third = &one - &specific_first - &specific_second;
        Self::new([
            LookaheadWeight::new(0, specific_first),
            LookaheadWeight::new(1, specific_second),
            LookaheadWeight::new(2, guaranteed_third),
        ])
    }

    /// The 0.75 / 0.5 preset of [`Self::fate_point`].
    ///
    /// # Errors
    ///
    /// Propagates [`Self::fate_point`] validation, which the preset rates always pass.
    pub fn fate_point_preset() -> Result<Self, ConfigError> {
        Self::fate_point(
            &decimal(FATE_POINT_FEATURED_RATE.0, FATE_POINT_FEATURED_RATE.1),
            &decimal(FATE_POINT_SPECIFIC_RATE.0, FATE_POINT_SPECIFIC_RATE.1),
        )
    }

    #[must_use]
    pub fn total(&self) -> BigDecimal {
        self.weights
            .iter()
            .fold(BigDecimal::zero(), |acc, entry| acc + &entry.weight)
    }

    /// Number of rare occurrences the rule may consume, saturating at `usize::MAX`.
    #[must_use]
    pub fn horizon(&self) -> usize {
        self.weights
            .last()
            .map_or(0, |entry| entry.offset.saturating_add(1))
    }

    #[must_use]
    pub fn weight_at(&self, offset: usize) -> Option<&BigDecimal> {
        self.weights
            .iter()
            .find(|entry| entry.offset == offset)
            .map(|entry| &entry.weight)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LookaheadWeight> {
        self.weights.iter()
    }

    /// Distribute an occurrence distribution across lookahead offsets.
    ///
    /// Offset `n` consumes `n + 1` independent pool cycles, so its contribution
    /// is the `n`-fold shifted self-convolution of `occurrence`, scaled by the
    /// weight. The result spans `horizon × pool` draws.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Allocation`] when intermediate storage cannot be
    /// allocated, including when `horizon × pool` overflows.
    pub fn split(
        &self,
        occurrence: &OccurrenceDistribution,
        precision: Precision,
    ) -> Result<SplitPmf, EngineError> {
        let pool = occurrence.len();
        let span = pool
            .checked_mul(self.horizon())
            .ok_or(EngineError::Allocation { len: usize::MAX })?;
        let mut out = Pmf::zeroed(span)?;
        let mut chain = occurrence.clone();
        for consumed in 0..self.horizon() {
            if consumed > 0 {
                chain = chain.convolve_shifted(occurrence, (consumed + 1) * pool, precision)?;
            }
            if let Some(weight) = self.weight_at(consumed) {
                out.add_scaled(&chain, weight);
            }
        }
        out.round_cells(precision);
        Ok(out)
    }
}

/// Serializable selection rule resolved into [`SelectionWeights`] at validation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionRule {
    FiftyFifty,
    FatePoint {
        featured_rate: BigDecimal,
        specific_rate: BigDecimal,
    },
    Custom {
        weights: Vec<LookaheadWeight>,
    },
}

impl SelectionRule {
    #[must_use]
    pub fn fate_point_preset() -> Self {
        Self::FatePoint {
            featured_rate: decimal(FATE_POINT_FEATURED_RATE.0, FATE_POINT_FEATURED_RATE.1),
            specific_rate: decimal(FATE_POINT_SPECIFIC_RATE.0, FATE_POINT_SPECIFIC_RATE.1),
        }
    }

    /// # Errors
    ///
    /// Returns the validation error of the underlying weight set.
    pub fn resolve(&self) -> Result<SelectionWeights, ConfigError> {
        match self {
            Self::FiftyFifty => Ok(SelectionWeights::fifty_fifty()),
            Self::FatePoint {
                featured_rate,
                specific_rate,
            } => SelectionWeights::fate_point(featured_rate, specific_rate),
            Self::Custom { weights } => SelectionWeights::new(weights.iter().cloned()),
        }
    }
}
