//! Shrinkables and generators for primitive domains: integers, choices and samples.

use std::sync::Arc;

use num_traits::{NumCast, PrimInt};
use rand::Rng;
use rand::distributions::uniform::SampleUniform;

use crate::distance::ShrinkingDistance;
use crate::error::PropertyError;
use crate::generator::Generator;
use crate::shrinkable::{Generated, Shrink, Shrinkable};

/// Integer shrinking towards a target by binary descent
///
/// Candidates are the target itself followed by `value - diff / 2^k`, so at most
/// one candidate per bit of the distance is proposed.
#[derive(Debug, Clone)]
pub struct IntegralShrinkable<T> {
    value: T,
    target: T,
}

impl<T: PrimInt + Generated> IntegralShrinkable<T> {
    pub fn new(value: T, target: T) -> Self {
        Self { value, target }
    }

    fn widened(&self) -> Option<(i128, i128)> {
        Some((self.value.to_i128()?, self.target.to_i128()?))
    }
}

impl<T: PrimInt + Generated> Shrink<T> for IntegralShrinkable<T> {
    fn value(&self) -> T {
        self.value
    }

    fn distance(&self) -> ShrinkingDistance {
        let distance = match self.widened() {
            Some((value, target)) => u64::try_from(value.abs_diff(target)).unwrap_or(u64::MAX),
            None => u64::MAX,
        };
        ShrinkingDistance::of(&[distance])
    }

    fn shrink(&self) -> Vec<Shrinkable<T>> {
        let Some((value, target)) = self.widened() else {
            return Vec::new();
        };
        let Some(diff) = value.checked_sub(target) else {
            return Vec::new();
        };

        let mut candidates = Vec::new();
        let mut step = diff;
        while step != 0 {
            if let Some(candidate) = value.checked_sub(step).and_then(<T as NumCast>::from) {
                candidates.push(Shrinkable::new(Self::new(candidate, self.target)));
            }
            step /= 2;
        }
        candidates
    }
}

/// Value picked from a list; shrinks to any earlier entry
#[derive(Debug, Clone)]
pub struct ChoiceShrinkable<T> {
    values: Arc<Vec<T>>,
    index: usize,
}

impl<T: Generated> ChoiceShrinkable<T> {
    /// Pick entry `index` of `values`
    pub fn new(values: Arc<Vec<T>>, index: usize) -> Result<Self, PropertyError> {
        check_index(values.len(), index)?;
        Ok(Self::at(values, index))
    }

    pub(crate) fn at(values: Arc<Vec<T>>, index: usize) -> Self {
        Self { values, index }
    }
}

impl<T: Generated> Shrink<T> for ChoiceShrinkable<T> {
    fn value(&self) -> T {
        self.values[self.index].clone()
    }

    fn distance(&self) -> ShrinkingDistance {
        ShrinkingDistance::of(&[self.index as u64])
    }

    fn shrink(&self) -> Vec<Shrinkable<T>> {
        (0..self.index)
            .map(|index| Shrinkable::new(Self::at(Arc::clone(&self.values), index)))
            .collect()
    }
}

/// Value taken from a sample list; shrinks only to the previous sample
#[derive(Debug, Clone)]
pub struct SampleShrinkable<T> {
    samples: Arc<Vec<T>>,
    index: usize,
}

impl<T: Generated> SampleShrinkable<T> {
    /// Take sample `index` of `samples`
    pub fn new(samples: Arc<Vec<T>>, index: usize) -> Result<Self, PropertyError> {
        check_index(samples.len(), index)?;
        Ok(Self::at(samples, index))
    }

    pub(crate) fn at(samples: Arc<Vec<T>>, index: usize) -> Self {
        Self { samples, index }
    }
}

fn check_index(len: usize, index: usize) -> Result<(), PropertyError> {
    if index < len {
        Ok(())
    } else {
        Err(PropertyError::generation_failed(format!(
            "index {index} out of range for {len} values"
        )))
    }
}

impl<T: Generated> Shrink<T> for SampleShrinkable<T> {
    fn value(&self) -> T {
        self.samples[self.index].clone()
    }

    fn distance(&self) -> ShrinkingDistance {
        ShrinkingDistance::of(&[self.index as u64])
    }

    fn shrink(&self) -> Vec<Shrinkable<T>> {
        match self.index.checked_sub(1) {
            Some(previous) => vec![Shrinkable::new(Self::at(
                Arc::clone(&self.samples),
                previous,
            ))],
            None => Vec::new(),
        }
    }
}

/// Uniform integers in `[min, max]` shrinking towards `target`
///
/// `target` is clamped into the range.
pub fn integral_generator<T>(min: T, max: T, target: T) -> Generator<T>
where
    T: PrimInt + SampleUniform + Generated,
{
    if min > max {
        return Generator::fail(format!(
            "empty integer range: min {:?} is greater than max {:?}",
            min.to_i128(),
            max.to_i128()
        ));
    }
    let target = target.clamp(min, max);
    Generator::new(move |rng| {
        let value = rng.gen_range(min..=max);
        Ok(Shrinkable::new(IntegralShrinkable::new(value, target)))
    })
}

/// Target an integral range shrinks towards when none is given: zero if it lies in
/// the range, otherwise the bound closest to zero
pub fn default_target<T: PrimInt>(min: T, max: T) -> T {
    if min > max {
        return min;
    }
    T::zero().clamp(min, max)
}
