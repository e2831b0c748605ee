//! Shrinkable values: a generated value together with its simpler alternatives.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::distance::ShrinkingDistance;
use crate::generator::Generator;
use crate::rng::SourceOfRandomness;

/// Bound shared by every generated value
pub trait Generated: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Generated for T {}

/// Number of nodes a filtered shrinkable explores below a rejected candidate
pub const FILTER_EXPLORATION_BUDGET: usize = 100;

/// Core trait behind every shrinkable value
///
/// Implementations must return candidates whose distance is strictly smaller than
/// `distance()`, so that repeatedly shrinking always terminates.
pub trait Shrink<T>: Send + Sync {
    /// The materialized value
    fn value(&self) -> T;

    /// How far the value is from its minimal form
    fn distance(&self) -> ShrinkingDistance;

    /// Finite list of strictly simpler alternatives
    fn shrink(&self) -> Vec<Shrinkable<T>>;
}

/// Cloneable handle to a generated value and its shrink tree
pub struct Shrinkable<T> {
    inner: Arc<dyn Shrink<T>>,
}

impl<T> Clone for Shrinkable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Generated> Shrinkable<T> {
    /// Wrap a shrink implementation
    pub fn new<S: Shrink<T> + 'static>(shrink: S) -> Self {
        Self {
            inner: Arc::new(shrink),
        }
    }

    /// A value without candidates and with zero distance
    pub fn unshrinkable(value: T) -> Self {
        Self::unshrinkable_with_distance(value, ShrinkingDistance::zero())
    }

    /// A value without candidates that still reports a distance
    pub fn unshrinkable_with_distance(value: T, distance: ShrinkingDistance) -> Self {
        Self::new(Unshrinkable { value, distance })
    }

    pub fn value(&self) -> T {
        self.inner.value()
    }

    pub fn distance(&self) -> ShrinkingDistance {
        self.inner.distance()
    }

    /// Strictly simpler alternatives, never including `self`
    pub fn shrink_candidates(&self) -> Vec<Shrinkable<T>> {
        self.inner.shrink()
    }

    /// Transform the value and all candidates, keeping the distance
    pub fn map<U, F>(&self, f: F) -> Shrinkable<U>
    where
        U: Generated,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.map_shared(Arc::new(f))
    }

    pub(crate) fn map_shared<U: Generated>(
        &self,
        f: Arc<dyn Fn(T) -> U + Send + Sync>,
    ) -> Shrinkable<U> {
        Shrinkable::new(Mapped {
            inner: self.clone(),
            f,
        })
    }

    /// Keep only candidates accepted by `predicate`
    ///
    /// A rejected candidate is not a dead end: its own candidates are searched
    /// breadth-first, up to [`FILTER_EXPLORATION_BUDGET`] nodes.
    pub fn filter<P>(&self, predicate: P) -> Shrinkable<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter_shared(Arc::new(predicate))
    }

    pub(crate) fn filter_shared(&self, predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>) -> Self {
        Shrinkable::new(Filtered {
            inner: self.clone(),
            predicate,
        })
    }

    /// Freeze the value: no candidates, zero distance
    pub fn make_unshrinkable(&self) -> Self {
        Self::unshrinkable(self.value())
    }

    /// Pair two shrinkables; left candidates come before right candidates
    pub fn zip<U: Generated>(&self, other: &Shrinkable<U>) -> Shrinkable<(T, U)> {
        Shrinkable::new(Zipped {
            width: self.distance().len(),
            left: self.clone(),
            right: other.clone(),
        })
    }

    /// Dependent pair whose downstream part was drawn from `seed`
    ///
    /// Shrinking the upstream value re-derives the downstream value by running the
    /// mapped generator with the same seed.
    pub fn flat_mapped<U: Generated>(
        &self,
        downstream: Shrinkable<U>,
        mapper: Arc<dyn Fn(&T) -> Generator<U> + Send + Sync>,
        seed: u64,
    ) -> Shrinkable<U> {
        Shrinkable::new(FlatMapped {
            width: self.distance().len(),
            upstream: self.clone(),
            downstream,
            mapper,
            seed,
        })
    }
}

impl<T: Generated + fmt::Debug> fmt::Debug for Shrinkable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shrinkable")
            .field("value", &self.value())
            .field("distance", &self.distance())
            .finish()
    }
}

struct Unshrinkable<T> {
    value: T,
    distance: ShrinkingDistance,
}

impl<T: Generated> Shrink<T> for Unshrinkable<T> {
    fn value(&self) -> T {
        self.value.clone()
    }

    fn distance(&self) -> ShrinkingDistance {
        self.distance.clone()
    }

    fn shrink(&self) -> Vec<Shrinkable<T>> {
        Vec::new()
    }
}

struct Mapped<T, U> {
    inner: Shrinkable<T>,
    f: Arc<dyn Fn(T) -> U + Send + Sync>,
}

impl<T: Generated, U: Generated> Shrink<U> for Mapped<T, U> {
    fn value(&self) -> U {
        (self.f)(self.inner.value())
    }

    fn distance(&self) -> ShrinkingDistance {
        self.inner.distance()
    }

    fn shrink(&self) -> Vec<Shrinkable<U>> {
        self.inner
            .shrink_candidates()
            .into_iter()
            .map(|candidate| candidate.map_shared(Arc::clone(&self.f)))
            .collect()
    }
}

struct Filtered<T> {
    inner: Shrinkable<T>,
    predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T: Generated> Shrink<T> for Filtered<T> {
    fn value(&self) -> T {
        self.inner.value()
    }

    fn distance(&self) -> ShrinkingDistance {
        self.inner.distance()
    }

    fn shrink(&self) -> Vec<Shrinkable<T>> {
        let mut accepted = Vec::new();
        let mut queue: VecDeque<Shrinkable<T>> = self.inner.shrink_candidates().into();
        let mut rejected_explored = 0;

        while let Some(candidate) = queue.pop_front() {
            if (self.predicate)(&candidate.value()) {
                accepted.push(candidate.filter_shared(Arc::clone(&self.predicate)));
                continue;
            }
            if rejected_explored >= FILTER_EXPLORATION_BUDGET {
                continue;
            }
            rejected_explored += 1;
            queue.extend(candidate.shrink_candidates());
        }

        accepted
    }
}

// `width` pads the left distance so that a left candidate with fewer dimensions
// cannot shift the right distance into its place.
struct Zipped<A, B> {
    left: Shrinkable<A>,
    right: Shrinkable<B>,
    width: usize,
}

impl<A: Generated, B: Generated> Shrink<(A, B)> for Zipped<A, B> {
    fn value(&self) -> (A, B) {
        (self.left.value(), self.right.value())
    }

    fn distance(&self) -> ShrinkingDistance {
        self.left
            .distance()
            .padded(self.width)
            .append(&self.right.distance())
    }

    fn shrink(&self) -> Vec<Shrinkable<(A, B)>> {
        let lefts = self.left.shrink_candidates().into_iter().map(|left| {
            Shrinkable::new(Zipped {
                width: self.width.max(left.distance().len()),
                left,
                right: self.right.clone(),
            })
        });
        let rights = self.right.shrink_candidates().into_iter().map(|right| {
            Shrinkable::new(Zipped {
                width: self.width,
                left: self.left.clone(),
                right,
            })
        });
        lefts.chain(rights).collect()
    }
}

struct FlatMapped<T, U> {
    upstream: Shrinkable<T>,
    downstream: Shrinkable<U>,
    mapper: Arc<dyn Fn(&T) -> Generator<U> + Send + Sync>,
    seed: u64,
    width: usize,
}

impl<T: Generated, U: Generated> Shrink<U> for FlatMapped<T, U> {
    fn value(&self) -> U {
        self.downstream.value()
    }

    fn distance(&self) -> ShrinkingDistance {
        self.upstream
            .distance()
            .padded(self.width)
            .append(&self.downstream.distance())
    }

    fn shrink(&self) -> Vec<Shrinkable<U>> {
        let mut candidates = Vec::new();

        for upstream in self.upstream.shrink_candidates() {
            let generator = (self.mapper)(&upstream.value());
            let mut random = SourceOfRandomness::from_seed(self.seed);
            // a downstream that can no longer be generated is skipped
            if let Ok(downstream) = generator.next(&mut random) {
                candidates.push(Shrinkable::new(FlatMapped {
                    width: self.width.max(upstream.distance().len()),
                    upstream,
                    downstream,
                    mapper: Arc::clone(&self.mapper),
                    seed: self.seed,
                }));
            }
        }

        for downstream in self.downstream.shrink_candidates() {
            candidates.push(Shrinkable::new(FlatMapped {
                upstream: self.upstream.clone(),
                downstream,
                mapper: Arc::clone(&self.mapper),
                seed: self.seed,
                width: self.width,
            }));
        }

        candidates
    }
}
