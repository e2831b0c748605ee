//! Precondition-aware generation of action chains

use std::fmt;
use std::sync::Arc;

use falsify::container::{DEFAULT_MAX_SIZE, draw_size};
use falsify::{Arbitrary, BoxedArbitrary, Generated, Generator, PropertyError, Shrinkable};
use rand::RngCore;
use tracing::{debug, warn};

use crate::actions::sequence::ActionSequence;
use crate::actions::shrinking::{InitialModel, ShrinkableActionSequence};
use crate::actions::{ActionRef, apply};
use crate::invariants::Invariant;

/// Hard cap on the length of an infinite chain
pub const INFINITE_CHAIN_CAP: usize = 10_000;

/// Draws per position before giving up on finding a runnable action
pub const DEFAULT_MAX_TRIES: usize = 1000;

/// Arbitrary of action chains over a model
///
/// Each position is filled with an action whose precondition accepts the model
/// produced by the actions before it.
pub struct ActionSequenceArbitrary<M> {
    actions: BoxedArbitrary<ActionRef<M>>,
    initial: InitialModel<M>,
    min_size: usize,
    max_size: usize,
    infinite: bool,
    max_tries: usize,
    invariants: Vec<Invariant<M>>,
}

impl<M> Clone for ActionSequenceArbitrary<M> {
    fn clone(&self) -> Self {
        Self {
            actions: self.actions.clone(),
            initial: Arc::clone(&self.initial),
            min_size: self.min_size,
            max_size: self.max_size,
            infinite: self.infinite,
            max_tries: self.max_tries,
            invariants: self.invariants.clone(),
        }
    }
}

/// Chains of actions drawn from `actions`, starting at the model built by `initial`
pub fn sequences<M, A, F>(actions: A, initial: F) -> ActionSequenceArbitrary<M>
where
    M: Generated,
    A: Arbitrary<Value = ActionRef<M>> + 'static,
    F: Fn() -> M + Send + Sync + 'static,
{
    ActionSequenceArbitrary {
        actions: actions.boxed(),
        initial: Arc::new(initial),
        min_size: 0,
        max_size: DEFAULT_MAX_SIZE,
        infinite: false,
        max_tries: DEFAULT_MAX_TRIES,
        invariants: Vec::new(),
    }
}

impl<M: Generated> ActionSequenceArbitrary<M> {
    pub fn of_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self.max_size = self.max_size.max(min_size);
        self
    }

    pub fn of_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self.min_size = self.min_size.min(max_size);
        self
    }

    /// Keep drawing until an end-of-chain action comes up
    ///
    /// Chains stop at [`INFINITE_CHAIN_CAP`] actions regardless.
    pub fn infinite(mut self) -> Self {
        self.infinite = true;
        self
    }

    /// Draws allowed per position before generation fails
    pub fn with_max_tries(mut self, max_tries: usize) -> Self {
        self.max_tries = max_tries.max(1);
        self
    }

    /// Attach `invariant` to every generated chain
    pub fn with_invariant(mut self, invariant: Invariant<M>) -> Self {
        self.invariants.push(invariant);
        self
    }
}

impl<M: Generated + fmt::Debug> Arbitrary for ActionSequenceArbitrary<M> {
    type Value = ActionSequence<M>;

    fn generator(&self, gen_size: usize) -> Generator<ActionSequence<M>> {
        let actions = self.actions.generator(gen_size);
        let chain = self.clone();
        Generator::new(move |rng| {
            let size = if chain.infinite {
                INFINITE_CHAIN_CAP
            } else {
                draw_size(rng, chain.min_size, chain.max_size, gen_size)
            };
            let steps = chain.draw_steps(&actions, rng, size)?;
            debug!(requested = size, generated = steps.len(), "action chain generated");
            Ok(Shrinkable::new(ShrinkableActionSequence::new(
                steps,
                chain.min_size,
                Arc::clone(&chain.initial),
                chain.invariants.clone(),
            )))
        })
    }
}

impl<M: Generated + fmt::Debug> ActionSequenceArbitrary<M> {
    fn draw_steps(
        &self,
        actions: &Generator<ActionRef<M>>,
        rng: &mut dyn RngCore,
        size: usize,
    ) -> Result<Vec<Shrinkable<ActionRef<M>>>, PropertyError> {
        let mut model = (self.initial)();
        let mut steps = Vec::new();

        while steps.len() < size {
            let may_end = steps.len() >= self.min_size;
            let step = self.next_runnable(actions, rng, &model, may_end)?;
            let action = step.value();
            if action.is_end_of_chain() {
                break;
            }

            steps.push(step);
            match apply(action.as_ref(), model.clone()) {
                Ok(next) => model = next,
                // The chain already fails here; later actions would never run.
                Err(_) => break,
            }
        }
        Ok(steps)
    }

    /// Draw until an action accepts `model`
    ///
    /// End-of-chain draws count against the same budget while `may_end` is false.
    fn next_runnable(
        &self,
        actions: &Generator<ActionRef<M>>,
        rng: &mut dyn RngCore,
        model: &M,
        may_end: bool,
    ) -> Result<Shrinkable<ActionRef<M>>, PropertyError> {
        for _ in 0..self.max_tries {
            let step = actions.next(rng)?;
            let action = step.value();
            if action.is_end_of_chain() && !may_end {
                continue;
            }
            if action.precondition(model) {
                return Ok(step);
            }
        }
        warn!(tries = self.max_tries, ?model, "no runnable action found");
        Err(PropertyError::PreconditionExhausted {
            tries: self.max_tries,
            model: format!("{model:?}"),
        })
    }
}
