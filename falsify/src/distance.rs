//! Shrinking distance: an ordered, summable measure of how far a value is from minimal.

use std::cmp::Ordering;
use std::fmt;

use crate::shrinkable::{Generated, Shrinkable};

/// Distance of a value from its minimal form
///
/// Dimensions are compared lexicographically. A missing dimension counts as zero,
/// so `[3]` and `[3, 0]` are equal. Collections put their size into the first
/// dimension, which lets size reductions dominate element simplifications.
///
/// Element sums are exact: they are carried like a multi-word number into a
/// dedicated overflow dimension placed right after the size.
#[derive(Clone, Default)]
pub struct ShrinkingDistance {
    dimensions: Vec<u64>,
}

impl ShrinkingDistance {
    /// Create a distance from its dimensions
    pub fn of(dimensions: &[u64]) -> Self {
        Self {
            dimensions: dimensions.to_vec(),
        }
    }

    /// The distance of an already minimal value
    pub fn zero() -> Self {
        Self::of(&[0])
    }

    /// A distance that is larger than or equal to any other single-dimension distance
    pub fn max() -> Self {
        Self::of(&[u64::MAX])
    }

    /// Distance of a collection: its size followed by the exact sum of element distances
    pub fn for_collection<T: Generated>(elements: &[Shrinkable<T>]) -> Self {
        let distances: Vec<_> = elements.iter().map(Shrinkable::distance).collect();
        Self::of(&[elements.len() as u64]).append(&Self::sum(&distances))
    }

    /// Exact sum of `distances`, one dimension longer than the widest summand
    ///
    /// Each dimension is a base 2^64 digit with the first dimension most significant.
    /// Carries move towards the front and the leading dimension holds the overflow,
    /// so the sum is strictly monotone in every summand.
    pub fn sum(distances: &[ShrinkingDistance]) -> Self {
        let width = distances.iter().map(Self::len).max().unwrap_or(0).max(1);
        let mut columns = vec![0u128; width];
        for distance in distances {
            for (column, digit) in columns.iter_mut().zip(&distance.dimensions) {
                *column += u128::from(*digit);
            }
        }

        let mut dimensions = vec![0u64; width + 1];
        let mut carry: u128 = 0;
        for (index, column) in columns.iter().enumerate().rev() {
            let total = column + carry;
            dimensions[index + 1] = total as u64;
            carry = total >> 64;
        }
        dimensions[0] = carry as u64;
        Self { dimensions }
    }

    /// Concatenate the dimensions of several distances in order
    pub fn combine(distances: &[ShrinkingDistance]) -> Self {
        distances
            .iter()
            .fold(Self::of(&[]), |combined, distance| combined.append(distance))
    }

    /// Element-wise sum, saturating at `u64::MAX`
    pub fn plus(&self, other: &ShrinkingDistance) -> Self {
        let len = self.dimensions.len().max(other.dimensions.len());
        let dimensions = (0..len)
            .map(|i| self.at(i).saturating_add(other.at(i)))
            .collect();
        Self { dimensions }
    }

    /// Concatenate the dimensions of `other` after this distance's dimensions
    pub fn append(&self, other: &ShrinkingDistance) -> Self {
        let mut dimensions = self.dimensions.clone();
        dimensions.extend_from_slice(&other.dimensions);
        Self { dimensions }
    }

    /// Extend with zero dimensions up to `width`; longer distances are returned unchanged
    pub fn padded(&self, width: usize) -> Self {
        let mut dimensions = self.dimensions.clone();
        if dimensions.len() < width {
            dimensions.resize(width, 0);
        }
        Self { dimensions }
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    pub fn dimensions(&self) -> &[u64] {
        &self.dimensions
    }

    /// True when every dimension is zero
    pub fn is_zero(&self) -> bool {
        self.dimensions.iter().all(|d| *d == 0)
    }

    fn at(&self, index: usize) -> u64 {
        self.dimensions.get(index).copied().unwrap_or(0)
    }
}

impl Ord for ShrinkingDistance {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.dimensions.len().max(other.dimensions.len());
        (0..len)
            .map(|i| self.at(i).cmp(&other.at(i)))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for ShrinkingDistance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ShrinkingDistance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ShrinkingDistance {}

impl fmt::Debug for ShrinkingDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for ShrinkingDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShrinkingDistance{:?}", self.dimensions)
    }
}
