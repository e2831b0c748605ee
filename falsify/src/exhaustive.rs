//! Exhaustive generators: restartable enumerations of small domains.
//!
//! Every composition checks its count against a ceiling. Overflow or an exceeded
//! ceiling yields `None`, and callers fall back to random generation.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use num_traits::{NumCast, PrimInt, ToPrimitive};

use crate::shrinkable::Generated;

type IterFactory<T> = dyn Fn() -> Box<dyn Iterator<Item = T>> + Send + Sync;

/// Enumeration of a finite domain with an exact upper bound on its size
pub struct ExhaustiveGenerator<T> {
    max_count: u64,
    factory: Arc<IterFactory<T>>,
}

impl<T> Clone for ExhaustiveGenerator<T> {
    fn clone(&self) -> Self {
        Self {
            max_count: self.max_count,
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<T: Generated> ExhaustiveGenerator<T> {
    /// Create a generator from its count and an iterator factory
    ///
    /// The factory must never produce more than `max_count` values.
    pub fn new<F>(max_count: u64, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Iterator<Item = T>> + Send + Sync + 'static,
    {
        Self {
            max_count,
            factory: Arc::new(factory),
        }
    }

    pub fn from_values(values: Vec<T>) -> Self {
        let values = Arc::new(values);
        let max_count = values.len() as u64;
        Self::new(max_count, move || {
            let values = Arc::clone(&values);
            Box::new((0..values.len()).map(move |i| values[i].clone()))
        })
    }

    pub fn constant(value: T) -> Self {
        Self::from_values(vec![value])
    }

    /// All integers in `[min, max]`, ascending
    pub fn integral(min: T, max: T) -> Option<Self>
    where
        T: PrimInt,
    {
        let (low, high) = (min.to_i128()?, max.to_i128()?);
        if low > high {
            return Some(Self::from_values(Vec::new()));
        }
        let max_count = u64::try_from(high.checked_sub(low)?.checked_add(1)?).ok()?;
        Some(Self::new(max_count, move || {
            Box::new((low..=high).filter_map(<T as NumCast>::from))
        }))
    }

    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    /// Start a fresh enumeration
    pub fn iter(&self) -> Box<dyn Iterator<Item = T>> {
        (self.factory)()
    }

    pub fn map<U, F>(&self, f: F) -> ExhaustiveGenerator<U>
    where
        U: Generated,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let source = self.clone();
        ExhaustiveGenerator::new(self.max_count, move || {
            let f = Arc::clone(&f);
            Box::new(source.iter().map(move |value| f(value)))
        })
    }

    /// Skip rejected values; the count stays an upper bound
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        let source = self.clone();
        Self::new(self.max_count, move || {
            let predicate = Arc::clone(&predicate);
            Box::new(source.iter().filter(move |value| predicate(value)))
        })
    }

    /// Cartesian product in lexicographic order, `None` beyond `ceiling`
    pub fn zip<U: Generated>(
        &self,
        other: &ExhaustiveGenerator<U>,
        ceiling: u64,
    ) -> Option<ExhaustiveGenerator<(T, U)>> {
        let max_count = within(self.max_count.checked_mul(other.max_count)?, ceiling)?;
        let left = self.clone();
        let right = other.clone();
        Some(ExhaustiveGenerator::new(max_count, move || {
            let right = right.clone();
            Box::new(left.iter().flat_map(move |a| {
                right.iter().map(move |b| (a.clone(), b))
            }))
        }))
    }

    /// Fixed samples first, then this enumeration
    pub fn with_samples(&self, samples: Vec<T>) -> Option<Self> {
        Self::from_values(samples).concat(self, u64::MAX)
    }

    /// This enumeration followed by `other`
    pub fn concat(&self, other: &ExhaustiveGenerator<T>, ceiling: u64) -> Option<Self> {
        let max_count = within(self.max_count.checked_add(other.max_count)?, ceiling)?;
        let first = self.clone();
        let second = other.clone();
        Some(Self::new(max_count, move || {
            Box::new(first.iter().chain(second.iter()))
        }))
    }

    /// For every value, enumerate the generator derived from it
    ///
    /// The upstream domain is enumerated once to compute the exact count.
    pub fn flat_map<U, F>(&self, mapper: F, ceiling: u64) -> Option<ExhaustiveGenerator<U>>
    where
        U: Generated,
        F: Fn(&T) -> Option<ExhaustiveGenerator<U>>,
    {
        within(self.max_count, ceiling)?;
        let mut derived = Vec::new();
        let mut max_count: u64 = 0;
        for value in self.iter() {
            let generator = mapper(&value)?;
            max_count = within(max_count.checked_add(generator.max_count)?, ceiling)?;
            derived.push(generator);
        }
        let derived = Arc::new(derived);
        Some(ExhaustiveGenerator::new(max_count, move || {
            let derived = Arc::clone(&derived);
            Box::new((0..derived.len()).flat_map(move |i| derived[i].iter()))
        }))
    }
}

/// Lists of `min..=max` elements, shorter lists first, each length in odometer order
pub fn list<T: Generated>(
    element: &ExhaustiveGenerator<T>,
    min: usize,
    max: usize,
    ceiling: u64,
) -> Option<ExhaustiveGenerator<Vec<T>>> {
    if min > max {
        return None;
    }
    let max_count = match element.max_count() {
        0 => <u64 as From<bool>>::from(min == 0),
        1 => ((max - min) as u64).checked_add(1)?,
        k => {
            let mut total: u64 = 0;
            for length in min..=max {
                let count = k.checked_pow(u32::try_from(length).ok()?)?;
                total = within(total.checked_add(count)?, ceiling)?;
            }
            total
        }
    };
    within(max_count, ceiling)?;

    let element = element.clone();
    Some(ExhaustiveGenerator::new(max_count, move || {
        let values: Vec<T> = element.iter().collect();
        Box::new(ListOdometer::new(values, min, max))
    }))
}

/// Sets of `min..=max` elements, smaller sets first, each size in combination order
pub fn set<T>(
    element: &ExhaustiveGenerator<T>,
    min: usize,
    max: usize,
    ceiling: u64,
) -> Option<ExhaustiveGenerator<HashSet<T>>>
where
    T: Generated + Eq + Hash,
{
    if min > max {
        return None;
    }
    let k = element.max_count();
    let largest = (max as u64).min(k);
    let mut max_count: u64 = 0;
    for size in (min as u64)..=largest {
        max_count = within(max_count.checked_add(binomial(k, size)?)?, ceiling)?;
    }

    let element = element.clone();
    Some(ExhaustiveGenerator::new(max_count, move || {
        let values: Vec<T> = element.iter().collect();
        let sets = Combinations::new(values, min, max)
            .map(|set| set.into_iter().collect::<HashSet<T>>());
        Box::new(sets)
    }))
}

fn within(count: u64, ceiling: u64) -> Option<u64> {
    (count <= ceiling).then_some(count)
}

/// Every ordering of `values`, starting with the given order
///
/// Equal values are not collapsed, so the count is always `values.len()!`.
pub fn permutations<T: Generated>(
    values: Vec<T>,
    ceiling: u64,
) -> Option<ExhaustiveGenerator<Vec<T>>> {
    let max_count = (1..=values.len() as u64).try_fold(1u64, |count, n| count.checked_mul(n))?;
    let max_count = within(max_count, ceiling)?;
    let values = Arc::new(values);
    Some(ExhaustiveGenerator::new(max_count, move || {
        let values = Arc::clone(&values);
        let mut indices: Option<Vec<usize>> = Some((0..values.len()).collect());
        Box::new(std::iter::from_fn(move || {
            let current = indices.take()?;
            let permutation = current.iter().map(|&i| values[i].clone()).collect();
            indices = next_permutation(current);
            Some(permutation)
        }))
    }))
}

/// Lexicographic successor of `indices`, `None` after the last ordering
fn next_permutation(mut indices: Vec<usize>) -> Option<Vec<usize>> {
    let pivot = indices.windows(2).rposition(|pair| pair[0] < pair[1])?;
    let successor = indices.iter().rposition(|&i| i > indices[pivot])?;
    indices.swap(pivot, successor);
    indices[pivot + 1..].reverse();
    Some(indices)
}

fn binomial(n: u64, k: u64) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        result = result.checked_mul(<u128 as From<u64>>::from(n - i))? / <u128 as From<u64>>::from(i + 1);
    }
    result.to_u64()
}

struct ListOdometer<T> {
    values: Vec<T>,
    max: usize,
    next: Option<Vec<usize>>,
}

impl<T> ListOdometer<T> {
    fn new(values: Vec<T>, min: usize, max: usize) -> Self {
        let next = (min == 0 || !values.is_empty()).then(|| vec![0; min]);
        Self { values, max, next }
    }

    fn advance(&self, indices: &[usize]) -> Option<Vec<usize>> {
        let mut next = indices.to_vec();
        for position in (0..next.len()).rev() {
            if next[position] + 1 < self.values.len() {
                next[position] += 1;
                next[position + 1..].iter_mut().for_each(|i| *i = 0);
                return Some(next);
            }
        }
        let longer = indices.len() + 1;
        (longer <= self.max && !self.values.is_empty()).then(|| vec![0; longer])
    }
}

impl<T: Clone> Iterator for ListOdometer<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        let indices = self.next.take()?;
        self.next = self.advance(&indices);
        Some(indices.iter().map(|&i| self.values[i].clone()).collect())
    }
}

struct Combinations<T> {
    values: Vec<T>,
    max: usize,
    next: Option<Vec<usize>>,
}

impl<T> Combinations<T> {
    fn new(values: Vec<T>, min: usize, max: usize) -> Self {
        let next = (min <= values.len()).then(|| (0..min).collect());
        Self { values, max, next }
    }

    fn advance(&self, indices: &[usize]) -> Option<Vec<usize>> {
        let n = self.values.len();
        let r = indices.len();
        let mut next = indices.to_vec();
        for position in (0..r).rev() {
            if next[position] < n - r + position {
                next[position] += 1;
                for following in position + 1..r {
                    next[following] = next[following - 1] + 1;
                }
                return Some(next);
            }
        }
        let larger = r + 1;
        (larger <= self.max && larger <= n).then(|| (0..larger).collect())
    }
}

impl<T: Clone> Iterator for Combinations<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        let indices = self.next.take()?;
        self.next = self.advance(&indices);
        Some(indices.iter().map(|&i| self.values[i].clone()).collect())
    }
}
