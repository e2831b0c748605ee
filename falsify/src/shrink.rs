//! Shrinking: greedy descent from a falsifying shrinkable to a local minimum.

use std::fmt;
use std::marker::PhantomData;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::config::TestConfig;
use crate::error::PropertyError;
use crate::falsifier::{Falsifier, TryOutcome, evaluate};
use crate::shrinkable::{Generated, Shrinkable};

/// Progress of a shrinking sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShrinkState {
    /// Holds the original falsifying value, nothing tried yet
    Initialized,
    Shrinking,
    /// No candidate of the current value falsifies any more
    Exhausted,
}

/// A search that can be advanced one step at a time
pub trait ShrinkSteps<T> {
    /// Try to move to a simpler falsifying value; `false` once exhausted
    fn next(&mut self) -> bool;

    /// Value of the current best
    fn current_value(&self) -> T;

    fn state(&self) -> ShrinkState;

    /// Number of successful steps so far
    fn steps(&self) -> usize;
}

/// Greedy shrinking of one falsifying shrinkable
///
/// Each step evaluates the current candidates in ascending distance order, ties
/// kept in candidate order, and moves to the first one the falsifier still
/// rejects. A panicking falsifier counts as a rejection.
pub struct ShrinkingSequence<'a, T, F: ?Sized> {
    current: Shrinkable<T>,
    falsifier: &'a F,
    state: ShrinkState,
    steps: usize,
    last_error: Option<PropertyError>,
}

impl<'a, T, F> ShrinkingSequence<'a, T, F>
where
    T: Generated,
    F: Falsifier<T> + ?Sized,
{
    pub fn new(original: Shrinkable<T>, falsifier: &'a F) -> Self {
        Self {
            current: original,
            falsifier,
            state: ShrinkState::Initialized,
            steps: 0,
            last_error: None,
        }
    }

    /// Continue the search from another value
    pub fn init(&mut self, shrinkable: Shrinkable<T>) {
        self.current = shrinkable;
        self.state = ShrinkState::Initialized;
    }

    pub fn current(&self) -> &Shrinkable<T> {
        &self.current
    }

    /// Error raised by the falsifier for the current value, once a step succeeded
    pub fn last_error(&self) -> Option<&PropertyError> {
        self.last_error.as_ref()
    }

    pub fn map<U, M>(self, mapper: M) -> MappedShrinkingSequence<Self, M, T>
    where
        M: Fn(T) -> U,
    {
        MappedShrinkingSequence::new(self, mapper)
    }

    fn ordered_candidates(&self) -> Vec<Shrinkable<T>> {
        let mut candidates = self.current.shrink_candidates();
        candidates.sort_by_cached_key(Shrinkable::distance);
        candidates
    }
}

impl<T, F> ShrinkSteps<T> for ShrinkingSequence<'_, T, F>
where
    T: Generated,
    F: Falsifier<T> + ?Sized,
{
    fn next(&mut self) -> bool {
        if self.state == ShrinkState::Exhausted {
            return false;
        }
        self.state = ShrinkState::Shrinking;

        for (index, candidate) in self.ordered_candidates().into_iter().enumerate() {
            trace!(index, distance = %candidate.distance(), "evaluating shrink candidate");
            if let TryOutcome::Falsified(error) = evaluate(self.falsifier, &candidate.value()) {
                self.steps += 1;
                debug!(
                    step = self.steps,
                    distance = %candidate.distance(),
                    "found simpler falsifying value"
                );
                self.current = candidate;
                self.last_error = Some(error);
                return true;
            }
        }

        debug!(steps = self.steps, "shrinking exhausted");
        self.state = ShrinkState::Exhausted;
        false
    }

    fn current_value(&self) -> T {
        self.current.value()
    }

    fn state(&self) -> ShrinkState {
        self.state
    }

    fn steps(&self) -> usize {
        self.steps
    }
}

/// A shrinking sequence viewed through a value transform
pub struct MappedShrinkingSequence<S, M, T> {
    inner: S,
    mapper: M,
    _source: PhantomData<fn(T)>,
}

impl<S, M, T> MappedShrinkingSequence<S, M, T> {
    pub fn new(inner: S, mapper: M) -> Self {
        Self {
            inner,
            mapper,
            _source: PhantomData,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, M, T, U> ShrinkSteps<U> for MappedShrinkingSequence<S, M, T>
where
    S: ShrinkSteps<T>,
    M: Fn(T) -> U,
{
    fn next(&mut self) -> bool {
        self.inner.next()
    }

    fn current_value(&self) -> U {
        (self.mapper)(self.inner.current_value())
    }

    fn state(&self) -> ShrinkState {
        self.inner.state()
    }

    fn steps(&self) -> usize {
        self.inner.steps()
    }
}

/// Result of a shrinking operation
#[derive(Debug, Clone)]
pub struct ShrinkResult<T> {
    /// The original failing value
    pub original: T,
    /// The minimal failing value found
    pub minimal: T,
    /// Number of successful shrinking steps performed
    pub shrink_steps: usize,
    /// Total time spent shrinking
    pub shrink_duration: Duration,
    /// Whether shrinking ran until no candidate falsified
    pub completed: bool,
    /// Error the falsifier raised for `minimal`, if shrinking moved at all
    pub error: Option<PropertyError>,
}

impl<T: Clone> ShrinkResult<T> {
    /// Result for a value that was not shrunk
    pub fn no_shrinking(original: T) -> Self {
        Self {
            minimal: original.clone(),
            original,
            shrink_steps: 0,
            shrink_duration: Duration::ZERO,
            completed: true,
            error: None,
        }
    }

    /// Why shrinking stopped before reaching a local minimum, if it did
    pub fn interruption(&self) -> Option<PropertyError>
    where
        T: fmt::Debug,
    {
        (!self.completed).then(|| PropertyError::ShrinkageTimeout {
            iterations: self.shrink_steps,
            last_successful_shrink: (self.shrink_steps > 0).then(|| format!("{:?}", self.minimal)),
        })
    }
}

/// Bounds applied while shrinking
#[derive(Debug, Clone, PartialEq)]
pub struct ShrinkConfig {
    /// Maximum number of successful steps
    pub max_steps: usize,
    /// Maximum time spent shrinking
    pub timeout: Duration,
}

impl Default for ShrinkConfig {
    fn default() -> Self {
        Self::from(&TestConfig::default())
    }
}

impl ShrinkConfig {
    pub fn new(max_steps: usize, timeout: Duration) -> Self {
        Self { max_steps, timeout }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

impl From<&TestConfig> for ShrinkConfig {
    fn from(config: &TestConfig) -> Self {
        Self::new(config.max_shrinking_steps, config.shrink_timeout)
    }
}

/// Drives shrinking sequences until exhaustion, the step bound or the timeout
#[derive(Debug, Clone, Default)]
pub struct ShrinkEngine {
    config: ShrinkConfig,
}

impl ShrinkEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ShrinkConfig) -> Self {
        Self { config }
    }

    /// Shrink a falsifying shrinkable
    pub fn shrink<T, F>(&self, original: Shrinkable<T>, falsifier: &F) -> ShrinkResult<T>
    where
        T: Generated,
        F: Falsifier<T> + ?Sized,
    {
        self.shrink_with_callback(original, falsifier, |_, _| {})
    }

    /// Shrink a falsifying shrinkable, reporting the current value after every step
    /// together with whether that step made progress
    pub fn shrink_with_callback<T, F, C>(
        &self,
        original: Shrinkable<T>,
        falsifier: &F,
        mut on_step: C,
    ) -> ShrinkResult<T>
    where
        T: Generated,
        F: Falsifier<T> + ?Sized,
        C: FnMut(&Shrinkable<T>, bool),
    {
        let start_time = Instant::now();
        let original_value = original.value();
        let mut sequence = ShrinkingSequence::new(original, falsifier);

        let completed = self.drive(&mut sequence, start_time, |sequence, progress| {
            on_step(sequence.current(), progress)
        });

        ShrinkResult {
            original: original_value,
            minimal: sequence.current_value(),
            shrink_steps: sequence.steps(),
            shrink_duration: start_time.elapsed(),
            completed,
            error: sequence.last_error().cloned(),
        }
    }

    /// Step any sequence until it is exhausted or a bound is hit
    ///
    /// Returns whether the sequence was exhausted.
    pub fn drive<T, S, C>(&self, sequence: &mut S, start_time: Instant, mut on_step: C) -> bool
    where
        S: ShrinkSteps<T>,
        C: FnMut(&S, bool),
    {
        loop {
            if start_time.elapsed() >= self.config.timeout {
                warn!(
                    steps = sequence.steps(),
                    timeout = ?self.config.timeout,
                    "shrinking timed out"
                );
                return false;
            }
            if sequence.steps() >= self.config.max_steps {
                warn!(max_steps = self.config.max_steps, "shrinking step bound reached");
                return false;
            }

            let progress = sequence.next();
            on_step(sequence, progress);
            if !progress {
                debug!(steps = sequence.steps(), "shrinking completed");
                return true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::container::ListShrinkable;
    use crate::falsifier::from_predicate;
    use crate::primitives::{ChoiceShrinkable, IntegralShrinkable, SampleShrinkable};

    fn always_falsified<T>(_: &T) -> Result<(), PropertyError> {
        Err(PropertyError::property_failed("always"))
    }

    #[test]
    fn test_choice_shrinks_to_first_value() {
        let values = Arc::new(vec![1, 2, 3, 4, 5]);
        let original = Shrinkable::new(ChoiceShrinkable::new(values, 3).unwrap());
        let falsifier = always_falsified::<i32>;
        let mut sequence = ShrinkingSequence::new(original, &falsifier);

        assert_eq!(sequence.state(), ShrinkState::Initialized);
        assert!(sequence.next());
        assert_eq!(sequence.state(), ShrinkState::Shrinking);
        assert_eq!(sequence.current_value(), 1);

        assert!(!sequence.next());
        assert_eq!(sequence.state(), ShrinkState::Exhausted);
        assert_eq!(sequence.current_value(), 1);
        assert!(!sequence.next());
        assert_eq!(sequence.steps(), 1);
    }

    #[test]
    fn test_samples_shrink_backwards_only() {
        let samples = Arc::new(vec![10, 20, 30]);
        let original = Shrinkable::new(SampleShrinkable::new(samples, 2).unwrap());
        let falsifier = always_falsified::<i32>;
        let mut sequence = ShrinkingSequence::new(original, &falsifier);

        let mut visited = vec![sequence.current_value()];
        while sequence.next() {
            visited.push(sequence.current_value());
        }
        assert_eq!(visited, vec![30, 20, 10]);
    }

    #[test]
    fn test_integer_shrinks_to_boundary() {
        let original = Shrinkable::new(IntegralShrinkable::new(1000, 0));
        let falsifier = from_predicate(|value: &i32| *value < 10);
        let result = ShrinkEngine::new().shrink(original, &falsifier);

        assert_eq!(result.original, 1000);
        assert_eq!(result.minimal, 10);
        assert!(result.completed);
        assert!(result.shrink_steps > 0);
        assert!(result.error.is_some());
        assert!(result.interruption().is_none());
    }

    #[test]
    fn test_unfalsified_candidates_leave_original() {
        let original = Shrinkable::new(IntegralShrinkable::new(7, 0));
        let falsifier = from_predicate(|value: &i32| *value != 7);
        let result = ShrinkEngine::new().shrink(original, &falsifier);

        assert_eq!(result.minimal, 7);
        assert_eq!(result.shrink_steps, 0);
        assert!(result.completed);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_panicking_falsifier_counts_as_falsified() {
        let original = Shrinkable::new(IntegralShrinkable::new(64, 0));
        let falsifier = |value: &i32| -> Result<(), PropertyError> {
            assert!(*value < 5, "{value} is not small");
            Ok(())
        };
        let result = ShrinkEngine::new().shrink(original, &falsifier);
        assert_eq!(result.minimal, 5);
    }

    #[test]
    fn test_step_bound() {
        let original = Shrinkable::new(IntegralShrinkable::new(1000, 0));
        let falsifier = from_predicate(|value: &i32| *value < 10);
        let engine = ShrinkEngine::with_config(ShrinkConfig::default().with_max_steps(2));
        let result = engine.shrink(original, &falsifier);

        assert_eq!(result.shrink_steps, 2);
        assert!(!result.completed);
        assert_eq!(
            result.interruption(),
            Some(PropertyError::ShrinkageTimeout {
                iterations: 2,
                last_successful_shrink: Some(result.minimal.to_string()),
            })
        );
    }

    #[test]
    fn test_timeout() {
        let original = Shrinkable::new(IntegralShrinkable::new(1000, 0));
        let falsifier = always_falsified::<i32>;
        let engine = ShrinkEngine::with_config(ShrinkConfig::new(100, Duration::ZERO));
        let result = engine.shrink(original, &falsifier);

        assert_eq!(result.minimal, 1000);
        assert!(!result.completed);
        assert_eq!(
            result.interruption().map(|e| e.to_string()),
            Some("Shrinkage timeout after 0 iterations".to_string())
        );
    }

    #[test]
    fn test_callback_reports_every_step() {
        let original = Shrinkable::new(IntegralShrinkable::new(40, 0));
        let falsifier = from_predicate(|value: &i32| *value < 3);
        let mut reported = Vec::new();
        let result = ShrinkEngine::new().shrink_with_callback(original, &falsifier, |s, progress| {
            reported.push((s.value(), progress))
        });

        let (last_value, last_progress) = *reported.last().unwrap();
        assert_eq!(last_value, 3);
        assert!(!last_progress);
        assert!(reported[..reported.len() - 1].iter().all(|(_, p)| *p));
        assert_eq!(reported.len(), result.shrink_steps + 1);
    }

    #[test]
    fn test_candidates_tried_in_distance_order() {
        let elements = [9, 9, 9, 9]
            .iter()
            .map(|&v| Shrinkable::new(IntegralShrinkable::new(v, 0)))
            .collect();
        let original = Shrinkable::new(ListShrinkable::new(elements, 0));
        let tried = std::sync::Mutex::new(Vec::new());
        let falsifier = |value: &Vec<i32>| -> Result<(), PropertyError> {
            tried.lock().unwrap().push(value.clone());
            Ok(())
        };
        let mut sequence = ShrinkingSequence::new(original, &falsifier);
        assert!(!sequence.next());

        let tried = tried.into_inner().unwrap();
        assert_eq!(tried[0], Vec::<i32>::new());
        let first_full = tried.iter().position(|v| v.len() == 4).unwrap();
        assert!(tried[..first_full].iter().all(|v| v.len() < 4));
        assert!(tried[first_full..].iter().all(|v| v.len() == 4));
    }

    #[test]
    fn test_init_restarts_from_new_value() {
        let falsifier = always_falsified::<i32>;
        let mut sequence =
            ShrinkingSequence::new(Shrinkable::new(IntegralShrinkable::new(0, 0)), &falsifier);
        assert!(!sequence.next());
        assert_eq!(sequence.state(), ShrinkState::Exhausted);

        sequence.init(Shrinkable::new(IntegralShrinkable::new(8, 0)));
        assert_eq!(sequence.state(), ShrinkState::Initialized);
        assert!(sequence.next());
        assert_eq!(sequence.current_value(), 0);
    }

    #[test]
    fn test_mapped_sequence_forwards() {
        let falsifier = from_predicate(|value: &i32| *value < 4);
        let sequence =
            ShrinkingSequence::new(Shrinkable::new(IntegralShrinkable::new(100, 0)), &falsifier);
        let mut mapped = sequence.map(|value: i32| format!("<{value}>"));

        assert_eq!(mapped.current_value(), "<100>");
        let engine = ShrinkEngine::new();
        assert!(engine.drive(&mut mapped, Instant::now(), |_, _| {}));
        assert_eq!(mapped.current_value(), "<4>");
        assert_eq!(mapped.state(), ShrinkState::Exhausted);
        assert_eq!(mapped.steps(), mapped.inner().steps());
    }
}
