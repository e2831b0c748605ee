//! Random generators: composable functions from a random source to shrinkable values.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::{Rng, RngCore};
use tracing::{trace, warn};

use crate::edge_cases::EdgeCases;
use crate::error::PropertyError;
use crate::primitives::{ChoiceShrinkable, SampleShrinkable};
use crate::rng::SourceOfRandomness;
use crate::shrinkable::{Generated, Shrinkable};

/// Consecutive rejections a filtering generator tolerates
pub const DEFAULT_MAX_MISSES: usize = 10_000;

type GenerateFn<T> =
    dyn Fn(&mut dyn RngCore) -> Result<Shrinkable<T>, PropertyError> + Send + Sync;

/// Random generator of shrinkable values
///
/// A generator is stateless across draws, except for generators created with
/// [`with_samples`](Self::with_samples) or [`samples`](Self::samples) which count
/// their draws. Clones share that counter.
pub struct Generator<T> {
    generate: Arc<GenerateFn<T>>,
}

impl<T> Clone for Generator<T> {
    fn clone(&self) -> Self {
        Self {
            generate: Arc::clone(&self.generate),
        }
    }
}

impl<T: Generated> Generator<T> {
    /// Create a generator from a draw function
    pub fn new<F>(generate: F) -> Self
    where
        F: Fn(&mut dyn RngCore) -> Result<Shrinkable<T>, PropertyError> + Send + Sync + 'static,
    {
        Self {
            generate: Arc::new(generate),
        }
    }

    /// Draw the next shrinkable value
    pub fn next(&self, rng: &mut dyn RngCore) -> Result<Shrinkable<T>, PropertyError> {
        (self.generate)(rng)
    }

    /// Always produce `value`, which cannot shrink
    pub fn constant(value: T) -> Self {
        Self::new(move |_| Ok(Shrinkable::unshrinkable(value.clone())))
    }

    /// A generator whose every draw fails
    pub fn fail(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(move |_| Err(PropertyError::generation_failed(message.clone())))
    }

    /// Cycle through `samples` in order, ignoring the random source
    pub fn samples(samples: Vec<T>) -> Self {
        if samples.is_empty() {
            return Self::fail("samples must not be empty");
        }
        let samples = Arc::new(samples);
        let drawn = Arc::new(AtomicUsize::new(0));
        Self::new(move |_| {
            let index = drawn.fetch_add(1, Ordering::Relaxed) % samples.len();
            Ok(Shrinkable::new(SampleShrinkable::at(
                Arc::clone(&samples),
                index,
            )))
        })
    }

    /// Pick uniformly from `values`, shrinking towards the first entry
    pub fn choose(values: Vec<T>) -> Self {
        if values.is_empty() {
            return Self::fail("cannot choose from an empty list of values");
        }
        let values = Arc::new(values);
        Self::new(move |rng| {
            let index = rng.gen_range(0..values.len());
            Ok(Shrinkable::new(ChoiceShrinkable::at(
                Arc::clone(&values),
                index,
            )))
        })
    }

    /// Pick values with probability proportional to their weight
    ///
    /// Entries of weight zero are never picked. Values shrink towards earlier entries.
    pub fn frequency(frequencies: Vec<(u32, T)>) -> Self {
        let (weights, values): (Vec<u64>, Vec<T>) = frequencies
            .into_iter()
            .filter(|(weight, _)| *weight > 0)
            .map(|(weight, value)| (u64::from(weight), value))
            .unzip();
        if values.is_empty() {
            return Self::fail("frequency needs at least one positive weight");
        }
        let total: u64 = weights.iter().sum();
        let values = Arc::new(values);
        Self::new(move |rng| {
            let mut ticket = rng.gen_range(0..total);
            let mut index = 0;
            while ticket >= weights[index] {
                ticket -= weights[index];
                index += 1;
            }
            Ok(Shrinkable::new(ChoiceShrinkable::at(
                Arc::clone(&values),
                index,
            )))
        })
    }

    pub fn map<U, F>(&self, f: F) -> Generator<U>
    where
        U: Generated,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let f: Arc<dyn Fn(T) -> U + Send + Sync> = Arc::new(f);
        let source = self.clone();
        Generator::new(move |rng| Ok(source.next(rng)?.map_shared(Arc::clone(&f))))
    }

    /// Redraw until `predicate` accepts, giving up after `max_misses` rejections
    pub fn filter<P>(&self, predicate: P, max_misses: usize) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate: Arc<dyn Fn(&T) -> bool + Send + Sync> = Arc::new(predicate);
        let source = self.clone();
        Self::new(move |rng| {
            for _ in 0..max_misses {
                let candidate = source.next(rng)?;
                if predicate(&candidate.value()) {
                    return Ok(candidate.filter_shared(Arc::clone(&predicate)));
                }
            }
            warn!(misses = max_misses, "filter rejected every generated value");
            Err(PropertyError::TooManyFilterMisses { misses: max_misses })
        })
    }

    /// Draw a value, then draw from the generator derived from it
    pub fn flat_map<U, F>(&self, mapper: F) -> Generator<U>
    where
        U: Generated,
        F: Fn(&T) -> Generator<U> + Send + Sync + 'static,
    {
        let mapper: Arc<dyn Fn(&T) -> Generator<U> + Send + Sync> = Arc::new(mapper);
        let source = self.clone();
        Generator::new(move |rng| {
            let upstream = source.next(rng)?;
            let seed = rng.next_u64();
            let downstream =
                mapper(&upstream.value()).next(&mut SourceOfRandomness::from_seed(seed))?;
            Ok(upstream.flat_mapped(downstream, Arc::clone(&mapper), seed))
        })
    }

    pub fn zip<U: Generated>(&self, other: &Generator<U>) -> Generator<(T, U)> {
        let left = self.clone();
        let right = other.clone();
        Generator::new(move |rng| {
            let a = left.next(rng)?;
            let b = right.next(rng)?;
            Ok(a.zip(&b))
        })
    }

    /// Return `samples` in order on the first draws, then defer to this generator
    ///
    /// Values taken from the samples shrink backwards through the sample list only.
    pub fn with_samples(&self, samples: Vec<T>) -> Self {
        if samples.is_empty() {
            return self.clone();
        }
        let samples = Arc::new(samples);
        let drawn = Arc::new(AtomicUsize::new(0));
        let source = self.clone();
        Self::new(move |rng| {
            let index = drawn.fetch_add(1, Ordering::Relaxed);
            if index < samples.len() {
                trace!(index, "drawing sample");
                return Ok(Shrinkable::new(SampleShrinkable::at(
                    Arc::clone(&samples),
                    index,
                )));
            }
            source.next(rng)
        })
    }

    /// Occasionally return one of `edge_cases` instead of a random value
    ///
    /// The larger `gen_size`, the rarer the injection. Large edge case sets get
    /// injected more often so that each single edge case keeps a fair chance.
    pub fn with_edge_cases(&self, gen_size: usize, edge_cases: EdgeCases<T>) -> Self {
        if edge_cases.is_empty() {
            return self.clone();
        }
        let ratio = edge_case_ratio(gen_size, edge_cases.len());
        let source = self.clone();
        Self::new(move |rng| {
            if rng.gen_range(0..=ratio) == 0 {
                let index = rng.gen_range(0..edge_cases.len());
                if let Some(edge_case) = edge_cases.get(index) {
                    return Ok(edge_case.clone());
                }
            }
            source.next(rng)
        })
    }

    /// Produce the same values without any shrink candidates
    pub fn no_shrink(&self) -> Self {
        let source = self.clone();
        Self::new(move |rng| Ok(source.next(rng)?.make_unshrinkable()))
    }
}

/// Odds of injecting an edge case are one in `ratio + 1`
fn edge_case_ratio(gen_size: usize, edge_cases: usize) -> usize {
    let by_size = (gen_size / 5).max(1);
    let by_count = (100 / edge_cases.max(1)).max(1);
    by_size.min(by_count) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::integral_generator;

    fn rng() -> SourceOfRandomness {
        SourceOfRandomness::from_seed(17)
    }

    fn values<T: Generated>(generator: &Generator<T>, n: usize) -> Vec<T> {
        let mut random = rng();
        (0..n)
            .map(|_| generator.next(&mut random).unwrap().value())
            .collect()
    }

    #[test]
    fn test_constant_generator() {
        let generator = Generator::constant("x");
        let shrinkable = generator.next(&mut rng()).unwrap();
        assert_eq!(shrinkable.value(), "x");
        assert!(shrinkable.shrink_candidates().is_empty());
    }

    #[test]
    fn test_fail_generator() {
        let generator: Generator<i32> = Generator::fail("nope");
        assert_eq!(
            generator.next(&mut rng()).unwrap_err(),
            PropertyError::generation_failed("nope")
        );
    }

    #[test]
    fn test_samples_cycle() {
        let generator = Generator::samples(vec!['a', 'b', 'c']);
        assert_eq!(values(&generator, 5), vec!['a', 'b', 'c', 'a', 'b']);
    }

    #[test]
    fn test_choose_stays_within_values() {
        let generator = Generator::choose(vec![10, 20, 30]);
        for value in values(&generator, 50) {
            assert!([10, 20, 30].contains(&value));
        }
        assert!(Generator::<i32>::choose(vec![]).next(&mut rng()).is_err());
    }

    #[test]
    fn test_map_and_zip() {
        let generator = integral_generator(1, 9, 1)
            .map(|v: i32| v * 2)
            .zip(&Generator::constant('z'));
        for (doubled, z) in values(&generator, 20) {
            assert_eq!(doubled % 2, 0);
            assert!((2..=18).contains(&doubled));
            assert_eq!(z, 'z');
        }
    }

    #[test]
    fn test_filter_applies_predicate() {
        let generator = integral_generator(0, 100, 0).filter(|v: &i32| v % 3 == 0, 100);
        assert!(values(&generator, 30).iter().all(|v| v % 3 == 0));
    }

    #[test]
    fn test_filter_calls_predicate_exactly_max_misses_times() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let generator = integral_generator(0, 10, 0).filter(
            move |_: &i32| {
                counted.fetch_add(1, Ordering::SeqCst);
                false
            },
            250,
        );

        let error = generator.next(&mut rng()).unwrap_err();
        assert_eq!(error, PropertyError::TooManyFilterMisses { misses: 250 });
        assert_eq!(calls.load(Ordering::SeqCst), 250);
    }

    #[test]
    fn test_flat_map_uses_upstream_value() {
        let generator = integral_generator(1, 5, 1)
            .flat_map(|n: &i32| Generator::constant(vec![*n; *n as usize]));
        for list in values(&generator, 20) {
            assert_eq!(list.len(), list[0] as usize);
        }
    }

    #[test]
    fn test_flat_map_shrinks_upstream_and_rederives() {
        let generator = integral_generator(1, 50, 1)
            .flat_map(|n: &i32| integral_generator(0, *n, 0).map(|m| (0, m)));
        let mut random = SourceOfRandomness::from_seed(3);
        let shrinkable = generator.next(&mut random).unwrap();
        for candidate in shrinkable.shrink_candidates() {
            assert!(candidate.distance() < shrinkable.distance());
        }
    }

    #[test]
    fn test_with_samples_first() {
        let generator = integral_generator(100, 200, 100).with_samples(vec![1, 2, 3]);
        let drawn = values(&generator, 6);
        assert_eq!(&drawn[..3], &[1, 2, 3]);
        assert!(drawn[3..].iter().all(|v| (100..=200).contains(v)));
    }

    #[test]
    fn test_with_edge_cases_injects_edge_cases() {
        let edge_cases = EdgeCases::new(vec![Shrinkable::unshrinkable(-1)]);
        let generator = integral_generator(0, 1000, 0).with_edge_cases(10, edge_cases);
        assert!(values(&generator, 200).contains(&-1));
    }

    #[test]
    fn test_edge_case_ratio() {
        assert_eq!(edge_case_ratio(1000, 1), 101);
        assert_eq!(edge_case_ratio(1000, 10), 11);
        assert_eq!(edge_case_ratio(10, 1), 3);
        assert_eq!(edge_case_ratio(0, 1), 2);
    }

    #[test]
    fn test_no_shrink() {
        let generator = integral_generator(10, 20, 10).no_shrink();
        let shrinkable = generator.next(&mut rng()).unwrap();
        assert!(shrinkable.shrink_candidates().is_empty());
    }

    #[test]
    fn test_frequency_follows_weights() {
        let generator = Generator::frequency(vec![(1, 'a'), (0, 'z'), (9, 'b')]);
        let mut rng = SourceOfRandomness::from_seed(17);
        let drawn: Vec<char> = (0..1000)
            .map(|_| generator.next(&mut rng).unwrap().value())
            .collect();
        assert!(!drawn.contains(&'z'));
        let a_count = drawn.iter().filter(|c| **c == 'a').count();
        assert!((40..200).contains(&a_count), "{a_count} draws of 'a'");

        let b = (0..100)
            .map(|_| generator.next(&mut rng).unwrap())
            .find(|shrinkable| shrinkable.value() == 'b')
            .unwrap();
        let candidates: Vec<char> = b.shrink_candidates().iter().map(Shrinkable::value).collect();
        assert_eq!(candidates, vec!['a']);

        assert!(Generator::frequency(vec![(0, 1)]).next(&mut rng).is_err());
    }
}
