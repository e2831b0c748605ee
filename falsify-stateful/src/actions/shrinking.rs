//! Shrinking of action chains
//!
//! A chain shrinks on two levels. Structural candidates drop a contiguous run of
//! actions, longest runs first; parametric candidates replace a single action by
//! one of its own shrink candidates. A candidate is only offered when every
//! precondition still holds when it is replayed from a fresh initial model.

use std::sync::Arc;

use falsify::{Generated, Shrink, Shrinkable, ShrinkingDistance};
use tracing::trace;

use crate::actions::sequence::ActionSequence;
use crate::actions::{ActionRef, apply};
use crate::invariants::Invariant;

/// Supplier of the model a chain starts from
pub type InitialModel<M> = Arc<dyn Fn() -> M + Send + Sync>;

/// Shrinkable chain of shrinkable actions
pub struct ShrinkableActionSequence<M> {
    steps: Vec<Shrinkable<ActionRef<M>>>,
    min_size: usize,
    initial: InitialModel<M>,
    invariants: Vec<Invariant<M>>,
}

impl<M: Generated> ShrinkableActionSequence<M> {
    pub fn new(
        steps: Vec<Shrinkable<ActionRef<M>>>,
        min_size: usize,
        initial: InitialModel<M>,
        invariants: Vec<Invariant<M>>,
    ) -> Self {
        Self {
            steps,
            min_size,
            initial,
            invariants,
        }
    }

    fn with_steps(&self, steps: Vec<Shrinkable<ActionRef<M>>>) -> Self {
        Self::new(
            steps,
            self.min_size,
            Arc::clone(&self.initial),
            self.invariants.clone(),
        )
    }

    /// Remove every contiguous run of `n - min`, then half that, down to single actions
    fn removals(&self) -> Vec<Vec<Shrinkable<ActionRef<M>>>> {
        let n = self.steps.len();
        let mut candidates = Vec::new();
        let mut run = n.saturating_sub(self.min_size);
        while run > 0 {
            for start in 0..=(n - run) {
                let mut steps = self.steps[..start].to_vec();
                steps.extend_from_slice(&self.steps[start + run..]);
                candidates.push(steps);
            }
            run /= 2;
        }
        candidates
    }

    fn parametric(&self) -> Vec<Vec<Shrinkable<ActionRef<M>>>> {
        let mut candidates = Vec::new();
        for (index, step) in self.steps.iter().enumerate() {
            for replacement in step.shrink_candidates() {
                let mut steps = self.steps.clone();
                steps[index] = replacement;
                candidates.push(steps);
            }
        }
        candidates
    }

    /// Replay preconditions from a fresh model
    ///
    /// Replay stops at the first action that panics, since nothing after it runs.
    fn is_runnable(&self, steps: &[Shrinkable<ActionRef<M>>]) -> bool {
        let mut model = (self.initial)();
        for step in steps {
            let action = step.value();
            if !action.precondition(&model) {
                return false;
            }
            model = match apply(action.as_ref(), model) {
                Ok(next) => next,
                Err(_) => return true,
            };
        }
        true
    }
}

impl<M: Generated> Shrink<ActionSequence<M>> for ShrinkableActionSequence<M> {
    fn value(&self) -> ActionSequence<M> {
        let actions = self.steps.iter().map(Shrinkable::value).collect();
        ActionSequence::new(actions).with_invariants(&self.invariants)
    }

    fn distance(&self) -> ShrinkingDistance {
        ShrinkingDistance::for_collection(&self.steps)
    }

    fn shrink(&self) -> Vec<Shrinkable<ActionSequence<M>>> {
        let mut proposed = self.removals();
        proposed.extend(self.parametric());
        let total = proposed.len();

        let candidates: Vec<_> = proposed
            .into_iter()
            .filter(|steps| self.is_runnable(steps))
            .map(|steps| Shrinkable::new(self.with_steps(steps)))
            .collect();
        trace!(proposed = total, runnable = candidates.len(), "chain shrink candidates");
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::action;
    use falsify::primitives::IntegralShrinkable;

    fn add(n: u32) -> Shrinkable<ActionRef<u32>> {
        Shrinkable::new(IntegralShrinkable::new(n, 0))
            .map(|n| action(format!("add({n})"), move |total: u32| total + n).into_ref())
    }

    fn halve() -> Shrinkable<ActionRef<u32>> {
        Shrinkable::unshrinkable(
            action("halve", |total: u32| total / 2)
                .when(|total: &u32| total % 2 == 0 && *total > 0)
                .into_ref(),
        )
    }

    fn chain(steps: Vec<Shrinkable<ActionRef<u32>>>, min_size: usize) -> ShrinkableActionSequence<u32> {
        ShrinkableActionSequence::new(steps, min_size, Arc::new(|| 0u32), Vec::new())
    }

    fn descriptions(sequence: &ActionSequence<u32>) -> Vec<String> {
        sequence.actions().iter().map(|a| a.description()).collect()
    }

    #[test]
    fn test_removal_runs_halve_down_to_one() {
        let shrinkable = chain(vec![add(1), add(2), add(3), add(4)], 0);
        let lengths: Vec<usize> = shrinkable.removals().iter().map(Vec::len).collect();
        // run 4 once, run 2 three times, run 1 four times
        assert_eq!(lengths, vec![0, 2, 2, 2, 3, 3, 3, 3]);
    }

    #[test]
    fn test_removals_respect_min_size() {
        let shrinkable = chain(vec![add(1), add(2), add(3)], 2);
        let lengths: Vec<usize> = shrinkable.removals().iter().map(Vec::len).collect();
        assert_eq!(lengths, vec![2, 2, 2]);
        assert!(chain(vec![add(1), add(2)], 2).removals().is_empty());
    }

    #[test]
    fn test_candidates_keep_preconditions() {
        // add(2), halve: dropping add(2) would leave halve on 0
        let shrinkable = chain(vec![add(2), halve()], 0);
        for candidate in shrinkable.shrink() {
            let sequence = candidate.value();
            let mut total = 0;
            for action in sequence.actions() {
                assert!(action.precondition(&total), "{sequence}");
                total = action.run(total);
            }
        }

        let offered: Vec<Vec<String>> = shrinkable
            .shrink()
            .iter()
            .map(|candidate| descriptions(&candidate.value()))
            .collect();
        assert!(offered.contains(&vec![]));
        assert!(offered.contains(&vec!["add(2)".to_string()]));
        assert!(!offered.contains(&vec!["halve".to_string()]));
        assert!(!offered.contains(&vec!["add(1)".to_string(), "halve".to_string()]));
        assert!(!offered.contains(&vec!["add(0)".to_string(), "halve".to_string()]));
        assert_eq!(offered.len(), 2);
    }

    #[test]
    fn test_candidates_are_strictly_simpler() {
        let shrinkable = chain(vec![add(5), add(8), add(3)], 1);
        let distance = shrinkable.distance();
        let candidates = shrinkable.shrink();
        assert!(!candidates.is_empty());
        for candidate in candidates {
            assert!(candidate.distance() < distance);
            assert!(!candidate.value().is_empty());
        }
    }

    #[test]
    fn test_value_carries_invariants() {
        let shrinkable = ShrinkableActionSequence::new(
            vec![add(3)],
            0,
            Arc::new(|| 0u32),
            vec![Invariant::holds("below 3", |total: &u32| *total < 3)],
        );
        let sequence = shrinkable.value();
        assert!(sequence.run(0).is_err());
        assert!(shrinkable.shrink().iter().all(|c| c.value().invariants().len() == 1));
    }
}
