//! Arbitrary combinators: map, filter, flat_map, zip, containers, options and samples.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use rand::Rng;

use crate::arbitrary::Arbitrary;
use crate::container::{
    DEFAULT_MAX_SIZE, ListShrinkable, container, unique_container, unique_container_by,
};
use crate::edge_cases::EdgeCases;
use crate::exhaustive::{self, ExhaustiveGenerator};
use crate::generator::{DEFAULT_MAX_MISSES, Generator};
use crate::shrinkable::{Generated, Shrinkable};

/// Upper bound on edge cases produced by combining several arbitraries
pub const MAX_COMBINED_EDGE_CASES: usize = 100;

/// An arbitrary that maps values from one type to another
pub struct Map<A, F> {
    inner: A,
    mapper: Arc<F>,
}

impl<A, F> Map<A, F> {
    pub(crate) fn new(inner: A, mapper: F) -> Self {
        Self {
            inner,
            mapper: Arc::new(mapper),
        }
    }
}

impl<A, F, U> Arbitrary for Map<A, F>
where
    A: Arbitrary,
    F: Fn(A::Value) -> U + Send + Sync + 'static,
    U: Generated,
{
    type Value = U;

    fn generator(&self, gen_size: usize) -> Generator<U> {
        let mapper = Arc::clone(&self.mapper);
        self.inner.generator(gen_size).map(move |value| mapper(value))
    }

    fn generator_with_edge_cases(&self, gen_size: usize) -> Generator<U> {
        let mapper = Arc::clone(&self.mapper);
        self.inner
            .generator_with_edge_cases(gen_size)
            .map(move |value| mapper(value))
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<U>> {
        let mapper = Arc::clone(&self.mapper);
        let source = self.inner.exhaustive(max_count)?;
        Some(source.map(move |value| mapper(value)))
    }

    fn edge_cases(&self) -> EdgeCases<U> {
        let mapper = Arc::clone(&self.mapper);
        self.inner.edge_cases().map(move |value| mapper(value))
    }
}

/// An arbitrary that only keeps values accepted by a predicate
pub struct Filter<A, P> {
    inner: A,
    predicate: Arc<P>,
    max_misses: usize,
}

impl<A, P> Filter<A, P> {
    pub(crate) fn new(inner: A, predicate: P) -> Self {
        Self {
            inner,
            predicate: Arc::new(predicate),
            max_misses: DEFAULT_MAX_MISSES,
        }
    }

    /// Change how many consecutive rejections are tolerated
    pub fn with_max_misses(mut self, max_misses: usize) -> Self {
        self.max_misses = max_misses;
        self
    }
}

impl<A, P> Arbitrary for Filter<A, P>
where
    A: Arbitrary,
    P: Fn(&A::Value) -> bool + Send + Sync + 'static,
{
    type Value = A::Value;

    fn generator(&self, gen_size: usize) -> Generator<A::Value> {
        let predicate = Arc::clone(&self.predicate);
        self.inner
            .generator(gen_size)
            .filter(move |value| predicate(value), self.max_misses)
    }

    fn generator_with_edge_cases(&self, gen_size: usize) -> Generator<A::Value> {
        let predicate = Arc::clone(&self.predicate);
        self.inner
            .generator_with_edge_cases(gen_size)
            .filter(move |value| predicate(value), self.max_misses)
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<A::Value>> {
        let predicate = Arc::clone(&self.predicate);
        let source = self.inner.exhaustive(max_count)?;
        Some(source.filter(move |value| predicate(value)))
    }

    fn edge_cases(&self) -> EdgeCases<A::Value> {
        let predicate = Arc::clone(&self.predicate);
        self.inner.edge_cases().filter(move |value| predicate(value))
    }
}

/// An arbitrary whose values are drawn from an arbitrary derived from another value
pub struct FlatMap<A, F> {
    inner: A,
    mapper: Arc<F>,
}

impl<A, F> FlatMap<A, F> {
    pub(crate) fn new(inner: A, mapper: F) -> Self {
        Self {
            inner,
            mapper: Arc::new(mapper),
        }
    }
}

impl<A, F, B> Arbitrary for FlatMap<A, F>
where
    A: Arbitrary,
    B: Arbitrary,
    F: Fn(&A::Value) -> B + Send + Sync + 'static,
{
    type Value = B::Value;

    fn generator(&self, gen_size: usize) -> Generator<B::Value> {
        let mapper = Arc::clone(&self.mapper);
        self.inner
            .generator(gen_size)
            .flat_map(move |value| mapper(value).generator(gen_size))
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<B::Value>> {
        let mapper = Arc::clone(&self.mapper);
        self.inner
            .exhaustive(max_count)?
            .flat_map(|value| mapper(value).exhaustive(max_count), max_count)
    }

    fn edge_cases(&self) -> EdgeCases<B::Value> {
        let mut cases = Vec::new();
        for upstream in self.inner.edge_cases().iter() {
            cases.extend((self.mapper)(&upstream.value()).edge_cases());
            if cases.len() >= MAX_COMBINED_EDGE_CASES {
                break;
            }
        }
        EdgeCases::new(cases).limit(MAX_COMBINED_EDGE_CASES)
    }
}

/// An arbitrary producing pairs from two arbitraries
pub struct Zip<A, B> {
    left: A,
    right: B,
}

impl<A, B> Zip<A, B> {
    pub(crate) fn new(left: A, right: B) -> Self {
        Self { left, right }
    }
}

impl<A: Arbitrary, B: Arbitrary> Arbitrary for Zip<A, B> {
    type Value = (A::Value, B::Value);

    fn generator(&self, gen_size: usize) -> Generator<Self::Value> {
        self.left
            .generator(gen_size)
            .zip(&self.right.generator(gen_size))
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<Self::Value>> {
        let left = self.left.exhaustive(max_count)?;
        let right = self.right.exhaustive(max_count)?;
        left.zip(&right, max_count)
    }

    fn edge_cases(&self) -> EdgeCases<Self::Value> {
        let rights = self.right.edge_cases();
        let mut cases = Vec::new();
        'outer: for left in self.left.edge_cases().iter() {
            for right in rights.iter() {
                if cases.len() >= MAX_COMBINED_EDGE_CASES {
                    break 'outer;
                }
                cases.push(left.zip(right));
            }
        }
        EdgeCases::new(cases)
    }
}

/// Lists of values drawn from an element arbitrary
pub struct ListArbitrary<A> {
    element: A,
    min_size: usize,
    max_size: usize,
}

impl<A: Arbitrary> ListArbitrary<A> {
    pub(crate) fn new(element: A) -> Self {
        Self {
            element,
            min_size: 0,
            max_size: DEFAULT_MAX_SIZE,
        }
    }

    pub fn of_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn of_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn of_size(self, size: usize) -> Self {
        self.of_min_size(size).of_max_size(size)
    }

    // Elements mix in their own edge cases
    fn element_generator(&self, gen_size: usize) -> Generator<A::Value> {
        self.element.generator_with_edge_cases(gen_size)
    }
}

impl<A: Arbitrary> Arbitrary for ListArbitrary<A> {
    type Value = Vec<A::Value>;

    fn generator(&self, gen_size: usize) -> Generator<Vec<A::Value>> {
        container(
            self.element_generator(gen_size),
            self.min_size,
            self.max_size,
            gen_size,
        )
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<Vec<A::Value>>> {
        let element = self.element.exhaustive(max_count)?;
        exhaustive::list(&element, self.min_size, self.max_size, max_count)
    }

    fn edge_cases(&self) -> EdgeCases<Vec<A::Value>> {
        list_edge_cases(&self.element, self.min_size, self.max_size)
    }
}

fn list_edge_cases<A: Arbitrary>(
    element: &A,
    min_size: usize,
    max_size: usize,
) -> EdgeCases<Vec<A::Value>> {
    if min_size > max_size {
        return EdgeCases::none();
    }
    let mut cases = Vec::new();
    if min_size == 0 {
        cases.push(Shrinkable::new(ListShrinkable::new(Vec::new(), min_size)));
    }
    if min_size <= 1 && max_size >= 1 {
        cases.extend(
            element
                .edge_cases()
                .into_iter()
                .map(|single| Shrinkable::new(ListShrinkable::new(vec![single], min_size))),
        );
    }
    EdgeCases::new(cases).limit(MAX_COMBINED_EDGE_CASES)
}

/// Sets of distinct values drawn from an element arbitrary
pub struct SetArbitrary<A> {
    element: A,
    min_size: usize,
    max_size: usize,
}

impl<A: Arbitrary> SetArbitrary<A> {
    pub(crate) fn new(element: A) -> Self {
        Self {
            element,
            min_size: 0,
            max_size: DEFAULT_MAX_SIZE,
        }
    }

    pub fn of_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn of_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn of_size(self, size: usize) -> Self {
        self.of_min_size(size).of_max_size(size)
    }
}

impl<A> Arbitrary for SetArbitrary<A>
where
    A: Arbitrary,
    A::Value: Eq + Hash,
{
    type Value = HashSet<A::Value>;

    fn generator(&self, gen_size: usize) -> Generator<HashSet<A::Value>> {
        let elements = self.element.generator_with_edge_cases(gen_size);
        unique_container(elements, self.min_size, self.max_size, gen_size)
            .map(|values| values.into_iter().collect())
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<HashSet<A::Value>>> {
        let element = self.element.exhaustive(max_count)?;
        exhaustive::set(&element, self.min_size, self.max_size, max_count)
    }

    fn edge_cases(&self) -> EdgeCases<HashSet<A::Value>> {
        list_edge_cases(&self.element, self.min_size, self.max_size)
            .map(|values| values.into_iter().collect())
    }
}

/// An arbitrary that returns fixed samples on its first draws
pub struct WithSamples<A: Arbitrary> {
    inner: A,
    samples: Vec<A::Value>,
}

impl<A: Arbitrary> WithSamples<A> {
    pub(crate) fn new(inner: A, samples: Vec<A::Value>) -> Self {
        Self { inner, samples }
    }
}

impl<A: Arbitrary> Arbitrary for WithSamples<A> {
    type Value = A::Value;

    fn generator(&self, gen_size: usize) -> Generator<A::Value> {
        self.inner
            .generator(gen_size)
            .with_samples(self.samples.clone())
    }

    fn generator_with_edge_cases(&self, gen_size: usize) -> Generator<A::Value> {
        self.inner
            .generator_with_edge_cases(gen_size)
            .with_samples(self.samples.clone())
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<A::Value>> {
        self.inner
            .exhaustive(max_count)?
            .with_samples(self.samples.clone())
            .filter(|generator| generator.max_count() <= max_count)
    }

    fn edge_cases(&self) -> EdgeCases<A::Value> {
        self.inner.edge_cases()
    }
}

/// Hash maps whose keys and values come from two arbitraries
///
/// Keys are pairwise distinct. Every entry shrinks its key and its value, and
/// candidates that would make two keys collide are discarded.
pub struct MapArbitrary<K, V> {
    entries: Zip<K, V>,
    min_size: usize,
    max_size: usize,
}

pub fn maps<K, V>(keys: K, values: V) -> MapArbitrary<K, V>
where
    K: Arbitrary,
    V: Arbitrary,
    K::Value: Eq + Hash,
{
    MapArbitrary {
        entries: Zip::new(keys, values),
        min_size: 0,
        max_size: DEFAULT_MAX_SIZE,
    }
}

impl<K, V> MapArbitrary<K, V> {
    pub fn of_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn of_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn of_size(self, size: usize) -> Self {
        self.of_min_size(size).of_max_size(size)
    }
}

impl<K, V> Arbitrary for MapArbitrary<K, V>
where
    K: Arbitrary,
    V: Arbitrary,
    K::Value: Eq + Hash,
{
    type Value = HashMap<K::Value, V::Value>;

    fn generator(&self, gen_size: usize) -> Generator<Self::Value> {
        let entries = self.entries.generator_with_edge_cases(gen_size);
        unique_container_by(
            entries,
            self.min_size,
            self.max_size,
            gen_size,
            |(key, _): &(K::Value, V::Value)| key.clone(),
        )
        .map(|entries| entries.into_iter().collect())
    }

    fn edge_cases(&self) -> EdgeCases<Self::Value> {
        list_edge_cases(&self.entries, self.min_size, self.max_size)
            .map(|entries| entries.into_iter().collect())
    }
}

/// Percentage of draws for which [`Optional`] produces `None`
pub const NONE_PERCENT: u32 = 5;

/// Optional values: mostly `Some` of the inner value, occasionally `None`
///
/// `Some` values shrink within the inner domain only.
pub struct Optional<A> {
    inner: A,
}

impl<A> Optional<A> {
    pub(crate) fn new(inner: A) -> Self {
        Self { inner }
    }
}

impl<A: Arbitrary> Arbitrary for Optional<A> {
    type Value = Option<A::Value>;

    fn generator(&self, gen_size: usize) -> Generator<Option<A::Value>> {
        let inner = self.inner.generator(gen_size);
        Generator::new(move |rng| {
            if rng.gen_range(0..100) < NONE_PERCENT {
                return Ok(Shrinkable::unshrinkable(None));
            }
            Ok(inner.next(rng)?.map(Some))
        })
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<Option<A::Value>>> {
        let values = self.inner.exhaustive(max_count)?.map(Some);
        ExhaustiveGenerator::constant(None).concat(&values, max_count)
    }

    fn edge_cases(&self) -> EdgeCases<Option<A::Value>> {
        EdgeCases::new(vec![Shrinkable::unshrinkable(None)])
            .concat(&self.inner.edge_cases().map(Some))
    }
}

/// An arbitrary whose values never shrink
pub struct NoShrink<A> {
    inner: A,
}

impl<A> NoShrink<A> {
    pub(crate) fn new(inner: A) -> Self {
        Self { inner }
    }
}

impl<A: Arbitrary> Arbitrary for NoShrink<A> {
    type Value = A::Value;

    fn generator(&self, gen_size: usize) -> Generator<A::Value> {
        self.inner.generator(gen_size).no_shrink()
    }

    fn generator_with_edge_cases(&self, gen_size: usize) -> Generator<A::Value> {
        self.inner.generator_with_edge_cases(gen_size).no_shrink()
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<A::Value>> {
        self.inner.exhaustive(max_count)
    }

    fn edge_cases(&self) -> EdgeCases<A::Value> {
        EdgeCases::new(
            self.inner
                .edge_cases()
                .iter()
                .map(Shrinkable::make_unshrinkable)
                .collect(),
        )
    }
}

/// Type-erased arbitrary
pub struct BoxedArbitrary<T> {
    inner: Arc<dyn Arbitrary<Value = T>>,
}

impl<T> Clone for BoxedArbitrary<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Generated> BoxedArbitrary<T> {
    pub fn new<A: Arbitrary<Value = T> + 'static>(arbitrary: A) -> Self {
        Self {
            inner: Arc::new(arbitrary),
        }
    }
}

impl<T: Generated> Arbitrary for BoxedArbitrary<T> {
    type Value = T;

    fn generator(&self, gen_size: usize) -> Generator<T> {
        self.inner.generator(gen_size)
    }

    fn generator_with_edge_cases(&self, gen_size: usize) -> Generator<T> {
        self.inner.generator_with_edge_cases(gen_size)
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<T>> {
        self.inner.exhaustive(max_count)
    }

    fn edge_cases(&self) -> EdgeCases<T> {
        self.inner.edge_cases()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrary::{booleans, choose, integers, just};
    use crate::rng::SourceOfRandomness;

    fn draw<A: Arbitrary>(arbitrary: &A, n: usize) -> Vec<A::Value> {
        let generator = arbitrary.generator(1000);
        let mut rng = SourceOfRandomness::from_seed(99);
        (0..n)
            .map(|_| generator.next(&mut rng).unwrap().value())
            .collect()
    }

    fn edge_values<A: Arbitrary>(arbitrary: &A) -> Vec<A::Value> {
        arbitrary.edge_cases().iter().map(Shrinkable::value).collect()
    }

    #[test]
    fn test_map_applies_everywhere() {
        let arbitrary = integers::<u8>().between(1, 3).map(|v| v * 10);
        assert!(draw(&arbitrary, 20).iter().all(|v| [10, 20, 30].contains(v)));
        assert_eq!(
            arbitrary.exhaustive(10).unwrap().iter().collect::<Vec<_>>(),
            vec![10, 20, 30]
        );
        assert!(edge_values(&arbitrary).contains(&10));
    }

    #[test]
    fn test_filter_applies_everywhere() {
        let arbitrary = integers::<i32>().between(0, 9).filter(|v| v % 2 == 0);
        assert!(draw(&arbitrary, 20).iter().all(|v| v % 2 == 0));
        assert_eq!(
            arbitrary.exhaustive(10).unwrap().iter().collect::<Vec<_>>(),
            vec![0, 2, 4, 6, 8]
        );
        assert!(edge_values(&arbitrary).iter().all(|v| v % 2 == 0));
    }

    #[test]
    fn test_filter_max_misses() {
        let arbitrary = integers::<i32>()
            .between(0, 9)
            .filter(|_| false)
            .with_max_misses(5);
        let mut rng = SourceOfRandomness::from_seed(1);
        assert_eq!(
            arbitrary.generator(100).next(&mut rng).unwrap_err(),
            crate::error::PropertyError::TooManyFilterMisses { misses: 5 }
        );
    }

    #[test]
    fn test_flat_map_depends_on_upstream() {
        let arbitrary = integers::<usize>()
            .between(1, 4)
            .flat_map(|n| just('x').list().of_size(*n));
        for list in draw(&arbitrary, 20) {
            assert!((1..=4).contains(&list.len()));
        }
        let exhaustive = arbitrary.exhaustive(100).unwrap();
        assert_eq!(exhaustive.max_count(), 4);
        assert_eq!(exhaustive.iter().map(|l| l.len()).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_zip_edge_cases_are_a_product() {
        let arbitrary = choose(vec![1, 2]).zip(choose(vec!['a', 'b']));
        assert_eq!(
            edge_values(&arbitrary),
            vec![(1, 'a'), (1, 'b'), (2, 'a'), (2, 'b')]
        );
        assert_eq!(arbitrary.exhaustive(4).unwrap().max_count(), 4);
        assert!(arbitrary.exhaustive(3).is_none());
    }

    #[test]
    fn test_list_sizes_and_edge_cases() {
        let arbitrary = integers::<i8>().list().of_min_size(1).of_max_size(5);
        assert!(draw(&arbitrary, 50).iter().all(|l| (1..=5).contains(&l.len())));

        let edges = edge_values(&arbitrary);
        assert!(!edges.contains(&vec![]));
        assert!(edges.iter().all(|l| l.len() == 1));
        assert!(edges.contains(&vec![0]));

        let with_empty = integers::<i8>().list();
        assert!(edge_values(&with_empty).contains(&vec![]));
    }

    #[test]
    fn test_list_exhaustive() {
        let arbitrary = choose(vec![false, true]).list().of_max_size(2);
        assert_eq!(arbitrary.exhaustive(7).unwrap().max_count(), 7);
        assert!(arbitrary.exhaustive(6).is_none());
    }

    #[test]
    fn test_set_has_distinct_elements() {
        let arbitrary = integers::<u8>().between(0, 30).set().of_max_size(10);
        for set in draw(&arbitrary, 30) {
            assert!(set.len() <= 10);
        }
        let sets = integers::<u8>().between(1, 3).set().exhaustive(100).unwrap();
        assert_eq!(sets.max_count(), 8);
    }

    #[test]
    fn test_with_samples() {
        let arbitrary = integers::<i32>().between(50, 60).with_samples(vec![1, 2]);
        let drawn = draw(&arbitrary, 4);
        assert_eq!(&drawn[..2], &[1, 2]);
        assert!((50..=60).contains(&drawn[2]));

        let exhaustive = arbitrary.exhaustive(13).unwrap();
        assert_eq!(exhaustive.iter().take(3).collect::<Vec<_>>(), vec![1, 2, 50]);
        assert!(arbitrary.exhaustive(12).is_none());
    }

    #[test]
    fn test_no_shrink() {
        let arbitrary = integers::<i64>().no_shrink();
        let mut rng = SourceOfRandomness::from_seed(4);
        let shrinkable = arbitrary.generator(100).next(&mut rng).unwrap();
        assert!(shrinkable.shrink_candidates().is_empty());
        assert!(
            arbitrary
                .edge_cases()
                .iter()
                .all(|edge| edge.shrink_candidates().is_empty())
        );
    }

    #[test]
    fn test_boxed_arbitrary_delegates() {
        let boxed = integers::<u16>().between(3, 4).boxed();
        let cloned = boxed.clone();
        assert!(draw(&cloned, 10).iter().all(|v| *v == 3 || *v == 4));
        assert_eq!(boxed.exhaustive(2).unwrap().max_count(), 2);
    }

    #[test]
    fn test_maps_have_distinct_keys_within_bounds() {
        let arbitrary = maps(integers::<u8>().between(0, 20), choose(vec!["x", "y"]))
            .of_min_size(2)
            .of_max_size(6);
        for map in draw(&arbitrary, 100) {
            assert!((2..=6).contains(&map.len()));
            assert!(map.keys().all(|key| *key <= 20));
        }
    }

    #[test]
    fn test_maps_shrink_entries_without_key_collisions() {
        let arbitrary = maps(integers::<u8>().between(0, 50), integers::<i32>().between(-9, 9))
            .of_min_size(3);
        let generator = arbitrary.generator(1000);
        let mut rng = SourceOfRandomness::from_seed(4);
        for _ in 0..20 {
            let shrinkable = generator.next(&mut rng).unwrap();
            for candidate in shrinkable.shrink_candidates() {
                let map = candidate.value();
                assert!(map.len() >= 3);
                assert!(candidate.distance() < shrinkable.distance());
            }
        }

        let edges: Vec<HashMap<u8, i32>> = maps(just(1u8), just(2))
            .edge_cases()
            .iter()
            .map(Shrinkable::value)
            .collect();
        assert_eq!(edges, vec![HashMap::new(), HashMap::from([(1, 2)])]);
    }

    #[test]
    fn test_optional_is_mostly_some() {
        let values = draw(&integers::<i16>().optional(), 2000);
        let nones = values.iter().filter(|v| v.is_none()).count();
        assert!((40..=200).contains(&nones), "{nones} of 2000 were None");

        let enumerated: Vec<Option<bool>> =
            booleans().optional().exhaustive(10).unwrap().iter().collect();
        assert_eq!(enumerated, vec![None, Some(false), Some(true)]);
        assert!(booleans().optional().exhaustive(2).is_none());
        assert_eq!(just(3).optional().edge_cases().iter().next().unwrap().value(), None);
    }

    #[test]
    fn test_samples_stay_ahead_of_embedded_edge_cases() {
        let arbitrary = integers::<i32>()
            .between(1000, 2000)
            .with_samples(vec![1, 2, 3])
            .map(|v| v * 2)
            .boxed();
        for seed in 0..50 {
            let generator = arbitrary.generator_with_edge_cases(10);
            let mut rng = SourceOfRandomness::from_seed(seed);
            let first: Vec<i32> = (0..3)
                .map(|_| generator.next(&mut rng).unwrap().value())
                .collect();
            assert_eq!(first, vec![2, 4, 6], "seed {seed}");
        }
    }
}
