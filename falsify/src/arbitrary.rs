//! The `Arbitrary` abstraction and the built-in value domains.

use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use num_traits::PrimInt;
use rand::distributions::uniform::SampleUniform;
use rand::seq::SliceRandom;

use crate::combinators::{
    BoxedArbitrary, Filter, FlatMap, ListArbitrary, Map, NoShrink, Optional, SetArbitrary,
    WithSamples, Zip,
};
use crate::container::DEFAULT_MAX_SIZE;
use crate::edge_cases::EdgeCases;
use crate::exhaustive::{self, ExhaustiveGenerator};
use crate::generator::Generator;
use crate::primitives::{ChoiceShrinkable, IntegralShrinkable, default_target, integral_generator};
use crate::shrinkable::{Generated, Shrinkable};

/// Description of a value domain
///
/// An arbitrary hands out random generators sized by a budget, an optional
/// exhaustive enumeration when the domain is small enough, and a set of edge
/// cases that callers try independently of randomness.
pub trait Arbitrary: Send + Sync {
    /// The type of values this arbitrary generates
    type Value: Generated;

    /// Random generator for a size budget
    fn generator(&self, gen_size: usize) -> Generator<Self::Value>;

    /// Enumeration of the whole domain, if it has at most `max_count` values
    fn exhaustive(&self, _max_count: u64) -> Option<ExhaustiveGenerator<Self::Value>> {
        None
    }

    /// Boundary values of the domain
    fn edge_cases(&self) -> EdgeCases<Self::Value> {
        EdgeCases::none()
    }

    /// Random generator that occasionally injects this arbitrary's edge cases
    ///
    /// Wrappers forward to their inner arbitrary so that samples added with
    /// [`with_samples`](Self::with_samples) still come first and in order.
    fn generator_with_edge_cases(&self, gen_size: usize) -> Generator<Self::Value> {
        self.generator(gen_size)
            .with_edge_cases(gen_size, self.edge_cases())
    }

    fn map<U, F>(self, mapper: F) -> Map<Self, F>
    where
        Self: Sized,
        U: Generated,
        F: Fn(Self::Value) -> U + Send + Sync + 'static,
    {
        Map::new(self, mapper)
    }

    fn filter<P>(self, predicate: P) -> Filter<Self, P>
    where
        Self: Sized,
        P: Fn(&Self::Value) -> bool + Send + Sync + 'static,
    {
        Filter::new(self, predicate)
    }

    /// Draw values from an arbitrary chosen by this arbitrary's value
    fn flat_map<B, F>(self, mapper: F) -> FlatMap<Self, F>
    where
        Self: Sized,
        B: Arbitrary,
        F: Fn(&Self::Value) -> B + Send + Sync + 'static,
    {
        FlatMap::new(self, mapper)
    }

    fn zip<B: Arbitrary>(self, other: B) -> Zip<Self, B>
    where
        Self: Sized,
    {
        Zip::new(self, other)
    }

    fn list(self) -> ListArbitrary<Self>
    where
        Self: Sized,
    {
        ListArbitrary::new(self)
    }

    fn set(self) -> SetArbitrary<Self>
    where
        Self: Sized,
        Self::Value: Eq + Hash,
    {
        SetArbitrary::new(self)
    }

    /// Return `samples` on the first draws of every generator
    fn with_samples(self, samples: Vec<Self::Value>) -> WithSamples<Self>
    where
        Self: Sized,
    {
        WithSamples::new(self, samples)
    }

    /// Wrap values in `Some`, and produce `None` on a small share of draws
    fn optional(self) -> Optional<Self>
    where
        Self: Sized,
    {
        Optional::new(self)
    }

    fn no_shrink(self) -> NoShrink<Self>
    where
        Self: Sized,
    {
        NoShrink::new(self)
    }

    fn boxed(self) -> BoxedArbitrary<Self::Value>
    where
        Self: Sized + 'static,
    {
        BoxedArbitrary::new(self)
    }
}

/// A single constant value
pub struct Just<T> {
    value: T,
}

pub fn just<T: Generated>(value: T) -> Just<T> {
    Just { value }
}

impl<T: Generated> Arbitrary for Just<T> {
    type Value = T;

    fn generator(&self, _gen_size: usize) -> Generator<T> {
        Generator::constant(self.value.clone())
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<T>> {
        (max_count >= 1).then(|| ExhaustiveGenerator::constant(self.value.clone()))
    }

    fn edge_cases(&self) -> EdgeCases<T> {
        EdgeCases::new(vec![Shrinkable::unshrinkable(self.value.clone())])
    }
}

/// Integers in a range, shrinking towards a target
#[derive(Debug, Clone)]
pub struct IntegralArbitrary<T> {
    min: T,
    max: T,
    target: Option<T>,
}

/// All values of an integer type
pub fn integers<T: PrimInt>() -> IntegralArbitrary<T> {
    IntegralArbitrary {
        min: T::min_value(),
        max: T::max_value(),
        target: None,
    }
}

/// Integers in `[min, max]`
pub fn range<T: PrimInt>(min: T, max: T) -> IntegralArbitrary<T> {
    integers().between(min, max)
}

impl<T: PrimInt> IntegralArbitrary<T> {
    pub fn between(mut self, min: T, max: T) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn greater_or_equal(mut self, min: T) -> Self {
        self.min = min;
        self
    }

    pub fn less_or_equal(mut self, max: T) -> Self {
        self.max = max;
        self
    }

    /// Shrink towards `target` instead of zero; clamped into the range
    pub fn shrink_towards(mut self, target: T) -> Self {
        self.target = Some(target);
        self
    }

    fn target(&self) -> T {
        match self.target {
            Some(target) if self.min <= self.max => target.clamp(self.min, self.max),
            _ => default_target(self.min, self.max),
        }
    }
}

impl<T> Arbitrary for IntegralArbitrary<T>
where
    T: PrimInt + SampleUniform + Generated,
{
    type Value = T;

    fn generator(&self, _gen_size: usize) -> Generator<T> {
        integral_generator(self.min, self.max, self.target())
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<T>> {
        ExhaustiveGenerator::integral(self.min, self.max)
            .filter(|generator| generator.max_count() <= max_count)
    }

    fn edge_cases(&self) -> EdgeCases<T> {
        if self.min > self.max {
            return EdgeCases::none();
        }
        let target = self.target();
        let one = T::one();
        let candidates = [
            Some(target),
            target.checked_add(&one),
            target.checked_sub(&one),
            Some(self.min),
            self.min.checked_add(&one),
            self.max.checked_sub(&one),
            Some(self.max),
        ];
        let cases = candidates
            .into_iter()
            .flatten()
            .filter(|value| *value >= self.min && *value <= self.max)
            .map(|value| Shrinkable::new(IntegralShrinkable::new(value, target)))
            .collect();
        EdgeCases::dedup_by_value(cases)
    }
}

/// Values picked from a list, shrinking towards earlier entries
pub struct Choose<T> {
    values: Arc<Vec<T>>,
}

pub fn choose<T: Generated>(values: Vec<T>) -> Choose<T> {
    Choose {
        values: Arc::new(values),
    }
}

pub fn booleans() -> Choose<bool> {
    choose(vec![false, true])
}

impl<T: Generated> Arbitrary for Choose<T> {
    type Value = T;

    fn generator(&self, _gen_size: usize) -> Generator<T> {
        Generator::choose(self.values.as_ref().clone())
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<T>> {
        ((self.values.len() as u64) <= max_count)
            .then(|| ExhaustiveGenerator::from_values(self.values.as_ref().clone()))
    }

    fn edge_cases(&self) -> EdgeCases<T> {
        let last = self.values.len().checked_sub(1);
        let indices = match last {
            Some(0) => vec![0],
            Some(last) => vec![0, last],
            None => Vec::new(),
        };
        EdgeCases::new(
            indices
                .into_iter()
                .map(|index| Shrinkable::new(ChoiceShrinkable::at(Arc::clone(&self.values), index)))
                .collect(),
        )
    }
}

/// Random orderings of a fixed list; orderings do not shrink
pub struct Shuffle<T> {
    values: Arc<Vec<T>>,
}

pub fn shuffle<T: Generated>(values: Vec<T>) -> Shuffle<T> {
    Shuffle {
        values: Arc::new(values),
    }
}

impl<T: Generated> Arbitrary for Shuffle<T> {
    type Value = Vec<T>;

    fn generator(&self, _gen_size: usize) -> Generator<Vec<T>> {
        let values = Arc::clone(&self.values);
        Generator::new(move |rng| {
            let mut ordering = values.as_ref().clone();
            ordering.shuffle(rng);
            Ok(Shrinkable::unshrinkable(ordering))
        })
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<Vec<T>>> {
        exhaustive::permutations(self.values.as_ref().clone(), max_count)
    }
}

const SURROGATES_START: u32 = 0xD800;
const SURROGATES_LEN: u32 = 0x800;

/// Unicode scalar values in a range, shrinking towards the lower bound
#[derive(Debug, Clone, Copy)]
pub struct CharArbitrary {
    min: char,
    max: char,
}

/// All Unicode scalar values
pub fn chars() -> CharArbitrary {
    CharArbitrary {
        min: '\u{0}',
        max: char::MAX,
    }
}

impl CharArbitrary {
    pub fn range(mut self, min: char, max: char) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Printable ASCII characters
    pub fn ascii(self) -> Self {
        self.range(' ', '~')
    }

    pub fn alpha(self) -> Self {
        self.range('a', 'z')
    }

    fn offset_of(&self, c: char) -> u32 {
        let code = u32::from(c) - u32::from(self.min);
        if self.skips_surrogates() && u32::from(c) > SURROGATES_START {
            code - SURROGATES_LEN
        } else {
            code
        }
    }

    fn char_at(&self, offset: u32) -> char {
        let mut code = u32::from(self.min) + offset;
        if self.skips_surrogates() && code >= SURROGATES_START {
            code += SURROGATES_LEN;
        }
        char::from_u32(code).unwrap_or(self.min)
    }

    fn skips_surrogates(&self) -> bool {
        u32::from(self.min) < SURROGATES_START && u32::from(self.max) > SURROGATES_START
    }

    fn offsets(&self) -> IntegralArbitrary<u32> {
        range(0, self.offset_of(self.max))
    }
}

impl Arbitrary for CharArbitrary {
    type Value = char;

    fn generator(&self, gen_size: usize) -> Generator<char> {
        let chars = *self;
        if self.min > self.max {
            return Generator::fail(format!("empty char range {:?}..={:?}", self.min, self.max));
        }
        self.offsets()
            .generator(gen_size)
            .map(move |offset| chars.char_at(offset))
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<char>> {
        if self.min > self.max {
            return None;
        }
        let chars = *self;
        Some(
            self.offsets()
                .exhaustive(max_count)?
                .map(move |offset| chars.char_at(offset)),
        )
    }

    fn edge_cases(&self) -> EdgeCases<char> {
        if self.min > self.max {
            return EdgeCases::none();
        }
        let chars = *self;
        let last = self.offset_of(self.max);
        let cases = vec![
            Shrinkable::new(IntegralShrinkable::new(0u32, 0)),
            Shrinkable::new(IntegralShrinkable::new(last, 0)),
        ];
        EdgeCases::dedup_by_value(cases).map(move |offset| chars.char_at(offset))
    }
}

/// Strings built from a character arbitrary
#[derive(Debug, Clone)]
pub struct StringArbitrary {
    chars: CharArbitrary,
    min_length: usize,
    max_length: usize,
}

/// Strings of printable ASCII characters
pub fn strings() -> StringArbitrary {
    StringArbitrary {
        chars: chars().ascii(),
        min_length: 0,
        max_length: DEFAULT_MAX_SIZE,
    }
}

impl StringArbitrary {
    pub fn with_chars(mut self, chars: CharArbitrary) -> Self {
        self.chars = chars;
        self
    }

    pub fn of_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn of_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn of_length(self, length: usize) -> Self {
        self.of_min_length(length).of_max_length(length)
    }

    fn as_lists(&self) -> Map<ListArbitrary<CharArbitrary>, fn(Vec<char>) -> String> {
        self.chars
            .list()
            .of_min_size(self.min_length)
            .of_max_size(self.max_length)
            .map(collect_string as fn(Vec<char>) -> String)
    }
}

fn collect_string(chars: Vec<char>) -> String {
    chars.into_iter().collect()
}

impl Arbitrary for StringArbitrary {
    type Value = String;

    fn generator(&self, gen_size: usize) -> Generator<String> {
        self.as_lists().generator(gen_size)
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<String>> {
        self.as_lists().exhaustive(max_count)
    }

    fn edge_cases(&self) -> EdgeCases<String> {
        self.as_lists().edge_cases()
    }
}

/// Values from one of several arbitraries
///
/// Shrinking moves towards earlier alternatives before shrinking within one.
pub struct OneOf<T> {
    alternatives: Arc<Vec<BoxedArbitrary<T>>>,
}

pub fn one_of<T: Generated>(alternatives: Vec<BoxedArbitrary<T>>) -> OneOf<T> {
    OneOf {
        alternatives: Arc::new(alternatives),
    }
}

impl<T: Generated> Arbitrary for OneOf<T> {
    type Value = T;

    fn generator(&self, gen_size: usize) -> Generator<T> {
        if self.alternatives.is_empty() {
            return Generator::fail("one_of needs at least one alternative");
        }
        let generators: Arc<Vec<Generator<T>>> = Arc::new(
            self.alternatives
                .iter()
                .map(|alternative| alternative.generator(gen_size))
                .collect(),
        );
        Generator::choose((0..generators.len()).collect())
            .flat_map(move |index: &usize| generators[*index].clone())
    }

    fn exhaustive(&self, max_count: u64) -> Option<ExhaustiveGenerator<T>> {
        let mut combined = ExhaustiveGenerator::from_values(Vec::new());
        for alternative in self.alternatives.iter() {
            combined = combined.concat(&alternative.exhaustive(max_count)?, max_count)?;
        }
        Some(combined)
    }

    fn edge_cases(&self) -> EdgeCases<T> {
        self.alternatives
            .iter()
            .fold(EdgeCases::none(), |cases, alternative| {
                cases.concat(&alternative.edge_cases())
            })
    }
}

/// An arbitrary constructed on every draw, which allows recursive definitions
pub struct Lazy<T, F> {
    supplier: Arc<F>,
    _value: PhantomData<fn() -> T>,
}

pub fn lazy<T, A, F>(supplier: F) -> Lazy<T, F>
where
    T: Generated,
    A: Arbitrary<Value = T>,
    F: Fn() -> A + Send + Sync + 'static,
{
    Lazy {
        supplier: Arc::new(supplier),
        _value: PhantomData,
    }
}

impl<T, A, F> Arbitrary for Lazy<T, F>
where
    T: Generated,
    A: Arbitrary<Value = T>,
    F: Fn() -> A + Send + Sync + 'static,
{
    type Value = T;

    fn generator(&self, gen_size: usize) -> Generator<T> {
        let supplier = Arc::clone(&self.supplier);
        Generator::new(move |rng| supplier().generator(gen_size).next(rng))
    }
}

/// Wrap `base` in `deeper` exactly `depth` times
///
/// Unlike [`lazy`], the nesting depth is fixed when the arbitrary is built.
pub fn recursive<T, B, F>(base: B, deeper: F, depth: usize) -> BoxedArbitrary<T>
where
    T: Generated,
    B: Arbitrary<Value = T> + 'static,
    F: Fn(BoxedArbitrary<T>) -> BoxedArbitrary<T>,
{
    (0..depth).fold(base.boxed(), |arbitrary, _| deeper(arbitrary))
}

/// Combine two arbitraries through a function
pub fn combine2<A, B, R, F>(a: A, b: B, combinator: F) -> impl Arbitrary<Value = R>
where
    A: Arbitrary,
    B: Arbitrary,
    R: Generated,
    F: Fn(A::Value, B::Value) -> R + Send + Sync + 'static,
{
    a.zip(b).map(move |(x, y)| combinator(x, y))
}

/// Combine three arbitraries through a function
pub fn combine3<A, B, C, R, F>(a: A, b: B, c: C, combinator: F) -> impl Arbitrary<Value = R>
where
    A: Arbitrary,
    B: Arbitrary,
    C: Arbitrary,
    R: Generated,
    F: Fn(A::Value, B::Value, C::Value) -> R + Send + Sync + 'static,
{
    a.zip(b).zip(c).map(move |((x, y), z)| combinator(x, y, z))
}
