//! List engine behind every container: size distribution and size-first shrinking.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use rand::{Rng, RngCore};
use tracing::warn;

use crate::distance::ShrinkingDistance;
use crate::error::PropertyError;
use crate::generator::{DEFAULT_MAX_MISSES, Generator};
use crate::shrinkable::{Generated, Shrink, Shrinkable};

/// Maximum container size when none is configured
pub const DEFAULT_MAX_SIZE: usize = 255;

/// Shrinkable list of independently shrinkable elements
///
/// Candidates that drop elements come first, then candidates that replace a single
/// element by one of its own candidates. The size is the first dimension of the
/// distance, so every size reduction is simpler than any element replacement.
pub struct ListShrinkable<T> {
    elements: Vec<Shrinkable<T>>,
    min_size: usize,
}

impl<T: Generated> ListShrinkable<T> {
    pub fn new(elements: Vec<Shrinkable<T>>, min_size: usize) -> Self {
        Self { elements, min_size }
    }

    fn keeping(&self, indices: &[usize]) -> Shrinkable<Vec<T>> {
        let elements = indices.iter().map(|&i| self.elements[i].clone()).collect();
        Shrinkable::new(Self::new(elements, self.min_size))
    }

    fn size_reductions(&self) -> Vec<Shrinkable<Vec<T>>> {
        let n = self.elements.len();
        if n <= self.min_size {
            return Vec::new();
        }

        let half = n / 2;
        let mut kept_sets: Vec<Vec<usize>> = vec![
            (0..self.min_size).collect(),
            (0..half).collect(),
            (half..n).collect(),
        ];
        kept_sets.extend((0..n).map(|removed| (0..n).filter(|&i| i != removed).collect()));

        let mut seen = HashSet::new();
        kept_sets
            .into_iter()
            .filter(|kept| kept.len() >= self.min_size && kept.len() < n)
            .filter(|kept| seen.insert(kept.clone()))
            .map(|kept| self.keeping(&kept))
            .collect()
    }

    fn element_replacements(&self) -> Vec<Shrinkable<Vec<T>>> {
        let mut candidates = Vec::new();
        for (index, element) in self.elements.iter().enumerate() {
            for replacement in element.shrink_candidates() {
                let mut elements = self.elements.clone();
                elements[index] = replacement;
                candidates.push(Shrinkable::new(Self::new(elements, self.min_size)));
            }
        }
        candidates
    }
}

impl<T: Generated> Shrink<Vec<T>> for ListShrinkable<T> {
    fn value(&self) -> Vec<T> {
        self.elements.iter().map(Shrinkable::value).collect()
    }

    fn distance(&self) -> ShrinkingDistance {
        ShrinkingDistance::for_collection(&self.elements)
    }

    fn shrink(&self) -> Vec<Shrinkable<Vec<T>>> {
        let mut candidates = self.size_reductions();
        candidates.extend(self.element_replacements());
        candidates
    }
}

/// Draw a container size in `[min, max]`
///
/// Sizes up to `max(min + 1, sqrt(gen_size))` are favoured: when that cutoff is
/// below `max`, nine draws in ten stay at or below it.
pub fn draw_size(rng: &mut dyn RngCore, min: usize, max: usize, gen_size: usize) -> usize {
    if min >= max {
        return min;
    }
    let cutoff = (min + 1).max((gen_size as f64).sqrt() as usize);
    if cutoff < max && rng.gen_range(0..10) != 0 {
        rng.gen_range(min..=cutoff)
    } else {
        rng.gen_range(min..=max)
    }
}

/// Lists of `min..=max` independent elements
pub fn container<T: Generated>(
    element: Generator<T>,
    min: usize,
    max: usize,
    gen_size: usize,
) -> Generator<Vec<T>> {
    if min > max {
        return Generator::fail(format!("container min size {min} exceeds max size {max}"));
    }
    Generator::new(move |rng| {
        let size = draw_size(rng, min, max, gen_size);
        let elements = (0..size)
            .map(|_| element.next(rng))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Shrinkable::new(ListShrinkable::new(elements, min)))
    })
}

/// Lists of `min..=max` pairwise distinct elements
///
/// Duplicate draws are retried; more than [`DEFAULT_MAX_MISSES`] consecutive
/// duplicates fail with [`PropertyError::TooManyFilterMisses`]. Shrink candidates
/// that would introduce duplicates are discarded.
pub fn unique_container<T>(
    element: Generator<T>,
    min: usize,
    max: usize,
    gen_size: usize,
) -> Generator<Vec<T>>
where
    T: Generated + Eq + Hash,
{
    unique_container_by(element, min, max, gen_size, T::clone)
}

/// Lists of `min..=max` elements whose keys are pairwise distinct
pub fn unique_container_by<T, K, F>(
    element: Generator<T>,
    min: usize,
    max: usize,
    gen_size: usize,
    key: F,
) -> Generator<Vec<T>>
where
    T: Generated,
    K: Eq + Hash + 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
{
    if min > max {
        return Generator::fail(format!("container min size {min} exceeds max size {max}"));
    }
    let key = Arc::new(key);
    Generator::new(move |rng| {
        let size = draw_size(rng, min, max, gen_size);
        let mut seen = HashSet::with_capacity(size);
        let mut elements = Vec::with_capacity(size);

        while elements.len() < size {
            let mut misses = 0;
            loop {
                let candidate = element.next(rng)?;
                if seen.insert(key(&candidate.value())) {
                    elements.push(candidate);
                    break;
                }
                misses += 1;
                if misses >= DEFAULT_MAX_MISSES {
                    warn!(size, drawn = elements.len(), "cannot draw enough unique elements");
                    return Err(PropertyError::TooManyFilterMisses { misses });
                }
            }
        }

        let list = Shrinkable::new(ListShrinkable::new(elements, min));
        let key = Arc::clone(&key);
        Ok(list.filter(move |values: &Vec<T>| all_unique(values.iter().map(|value| key(value)))))
    })
}

fn all_unique<K: Eq + Hash>(mut keys: impl Iterator<Item = K>) -> bool {
    let mut seen = HashSet::new();
    keys.all(|key| seen.insert(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{IntegralShrinkable, integral_generator};
    use crate::rng::SourceOfRandomness;

    fn list(values: &[i32], min_size: usize) -> Shrinkable<Vec<i32>> {
        let elements = values
            .iter()
            .map(|&v| Shrinkable::new(IntegralShrinkable::new(v, 0)))
            .collect();
        Shrinkable::new(ListShrinkable::new(elements, min_size))
    }

    #[test]
    fn test_list_distance_is_size_first() {
        let shrinkable = list(&[3, 4], 0);
        assert_eq!(shrinkable.distance().dimensions(), &[2, 0, 7]);
    }

    #[test]
    fn test_size_reductions_come_before_replacements() {
        let shrinkable = list(&[5, 6, 7, 8], 0);
        let candidates = shrinkable.shrink_candidates();

        let first_full_length = candidates
            .iter()
            .position(|c| c.value().len() == 4)
            .unwrap();
        assert!(
            candidates[..first_full_length]
                .iter()
                .all(|c| c.value().len() < 4)
        );
        assert!(
            candidates[first_full_length..]
                .iter()
                .all(|c| c.value().len() == 4)
        );

        let reductions: Vec<Vec<i32>> = candidates[..first_full_length]
            .iter()
            .map(Shrinkable::value)
            .collect();
        assert_eq!(
            reductions,
            vec![
                vec![],
                vec![5, 6],
                vec![7, 8],
                vec![6, 7, 8],
                vec![5, 7, 8],
                vec![5, 6, 8],
                vec![5, 6, 7],
            ]
        );
    }

    #[test]
    fn test_size_reductions_respect_min_size() {
        let shrinkable = list(&[1, 2, 3], 2);
        for candidate in shrinkable.shrink_candidates() {
            assert!(candidate.value().len() >= 2);
        }
        let at_min = list(&[1, 2], 2);
        assert!(
            at_min
                .shrink_candidates()
                .iter()
                .all(|c| c.value().len() == 2)
        );
    }

    #[test]
    fn test_candidates_are_strictly_simpler() {
        let shrinkable = list(&[9, -4, 0, 12], 1);
        for candidate in shrinkable.shrink_candidates() {
            assert!(candidate.distance() < shrinkable.distance());
        }
    }

    #[test]
    fn test_draw_size_favours_small_sizes() {
        let mut rng = SourceOfRandomness::from_seed(8);
        let sizes: Vec<usize> = (0..1000).map(|_| draw_size(&mut rng, 0, 255, 100)).collect();
        assert!(sizes.iter().all(|s| *s <= 255));
        let small = sizes.iter().filter(|s| **s <= 10).count();
        assert!(small > 800, "only {small} sizes were within the cutoff");
        assert!(sizes.iter().any(|s| *s > 10));
    }

    #[test]
    fn test_draw_size_degenerate_ranges() {
        let mut rng = SourceOfRandomness::from_seed(8);
        assert_eq!(draw_size(&mut rng, 4, 4, 1000), 4);
        for _ in 0..50 {
            assert!((2..=3).contains(&draw_size(&mut rng, 2, 3, 1000)));
        }
    }

    #[test]
    fn test_container_sizes_within_bounds() {
        let generator = container(integral_generator(0, 9, 0), 2, 6, 1000);
        let mut rng = SourceOfRandomness::from_seed(21);
        for _ in 0..100 {
            let len = generator.next(&mut rng).unwrap().value().len();
            assert!((2..=6).contains(&len));
        }
        assert!(container(integral_generator(0, 9, 0), 3, 1, 10).next(&mut rng).is_err());
    }

    #[test]
    fn test_unique_container_has_no_duplicates() {
        let generator = unique_container(integral_generator(0, 20, 0), 5, 10, 1000);
        let mut rng = SourceOfRandomness::from_seed(2);
        for _ in 0..50 {
            let shrinkable = generator.next(&mut rng).unwrap();
            assert!(all_unique(shrinkable.value().iter()));
            for candidate in shrinkable.shrink_candidates() {
                assert!(all_unique(candidate.value().iter()));
            }
        }
    }

    #[test]
    fn test_unique_by_key_allows_equal_payloads() {
        let pairs = integral_generator(0, 30, 0).zip(&integral_generator(0, 1, 0));
        let generator = unique_container_by(pairs, 4, 8, 1000, |(key, _): &(i32, i32)| *key);
        let mut rng = SourceOfRandomness::from_seed(13);
        for _ in 0..50 {
            let shrinkable = generator.next(&mut rng).unwrap();
            let entries = shrinkable.value();
            assert!((4..=8).contains(&entries.len()));
            assert!(all_unique(entries.iter().map(|(key, _)| key)));
            for candidate in shrinkable.shrink_candidates() {
                assert!(all_unique(candidate.value().iter().map(|(key, _)| *key)));
            }
        }
    }

    #[test]
    fn test_unique_container_gives_up_on_small_domain() {
        let generator = unique_container(integral_generator(0, 2, 0), 5, 5, 1000);
        let mut rng = SourceOfRandomness::from_seed(2);
        assert_eq!(
            generator.next(&mut rng).unwrap_err(),
            PropertyError::TooManyFilterMisses {
                misses: DEFAULT_MAX_MISSES
            }
        );
    }
}
