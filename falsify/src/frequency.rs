//! Weighted choices between values and between arbitraries.

use std::sync::Arc;

use crate::arbitrary::Arbitrary;
use crate::combinators::BoxedArbitrary;
use crate::edge_cases::EdgeCases;
use crate::exhaustive::ExhaustiveGenerator;
use crate::generator::Generator;
use crate::primitives::ChoiceShrinkable;
use crate::shrinkable::{Generated, Shrinkable};

/// Values picked with probability proportional to their weight
///
/// Shrinking moves towards earlier entries, whatever their weight.
pub struct Frequency<T> {
    weights: Vec<u32>,
    values: Arc<Vec<T>>,
}

/// Weighted choice between values; entries of weight zero are dropped
pub fn frequency<T: Generated>(frequencies: Vec<(u32, T)>) -> Frequency<T> {
    let (weights, values) = frequencies
        .into_iter()
        .filter(|(weight, _)| *weight > 0)
        .unzip();
    Frequency {
        weights,
        values: Arc::new(values),
    }
}

impl<T: Generated> Arbitrary for Frequency<T> {
    type Value = T;

    fn generator(&self, _gen_size: usize) -> Generator<T> {
        let frequencies = self
            .weights
            .iter()
            .copied()
            .zip(self.values.iter().cloned())
            .collect();
        Generator::frequency(frequencies)
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<T>> {
        ((self.values.len() as u64) <= max_count)
            .then(|| ExhaustiveGenerator::from_values(self.values.as_ref().clone()))
    }

    fn edge_cases(&self) -> EdgeCases<T> {
        if self.values.is_empty() {
            return EdgeCases::none();
        }
        let first = ChoiceShrinkable::at(Arc::clone(&self.values), 0);
        EdgeCases::new(vec![Shrinkable::new(first)])
    }
}

/// Values from one of several arbitraries, picked by weight
///
/// Like [`one_of`](crate::arbitrary::one_of), shrinking moves towards earlier
/// alternatives before shrinking within one.
pub struct FrequencyOf<T> {
    alternatives: Vec<(u32, BoxedArbitrary<T>)>,
}

/// Weighted choice between arbitraries; alternatives of weight zero are dropped
pub fn frequency_of<T: Generated>(alternatives: Vec<(u32, BoxedArbitrary<T>)>) -> FrequencyOf<T> {
    FrequencyOf {
        alternatives: alternatives
            .into_iter()
            .filter(|(weight, _)| *weight > 0)
            .collect(),
    }
}

impl<T: Generated> Arbitrary for FrequencyOf<T> {
    type Value = T;

    fn generator(&self, gen_size: usize) -> Generator<T> {
        if self.alternatives.is_empty() {
            return Generator::fail("frequency_of needs at least one positive weight");
        }
        let generators: Arc<Vec<Generator<T>>> = Arc::new(
            self.alternatives
                .iter()
                .map(|(_, alternative)| alternative.generator(gen_size))
                .collect(),
        );
        let weighted = self
            .alternatives
            .iter()
            .enumerate()
            .map(|(index, (weight, _))| (*weight, index))
            .collect();
        Generator::frequency(weighted).flat_map(move |index: &usize| generators[*index].clone())
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<T>> {
        let mut combined = ExhaustiveGenerator::from_values(Vec::new());
        for (_, alternative) in &self.alternatives {
            combined = combined.concat(&alternative.exhaustive(max_count)?, max_count)?;
        }
        Some(combined)
    }

    fn edge_cases(&self) -> EdgeCases<T> {
        self.alternatives
            .iter()
            .fold(EdgeCases::none(), |cases, (_, alternative)| {
                cases.concat(&alternative.edge_cases())
            })
    }
}
