//! Actions over a model and the chains built from them

pub mod generator;
pub mod sequence;
pub mod shrinking;

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use falsify::falsifier::{Unrecoverable, panic_message};

pub use generator::{ActionSequenceArbitrary, INFINITE_CHAIN_CAP, sequences};
pub use sequence::{ActionSequence, RunState};
pub use shrinking::ShrinkableActionSequence;

/// A single state transition of a model
///
/// Models are values: `run` consumes the current model and returns the next one,
/// so a chain can always be replayed from a fresh initial model.
pub trait Action<M>: Send + Sync {
    /// Whether the action may run on `model`
    fn precondition(&self, _model: &M) -> bool {
        true
    }

    /// Apply the action
    fn run(&self, model: M) -> M;

    /// Human-readable description used in reports
    fn description(&self) -> String;

    /// Drawing this action ends a chain instead of extending it
    fn is_end_of_chain(&self) -> bool {
        false
    }
}

/// Shared handle to an action, the value type of action arbitraries
pub type ActionRef<M> = Arc<dyn Action<M>>;

type Precondition<M> = Arc<dyn Fn(&M) -> bool + Send + Sync>;
type Transition<M> = Arc<dyn Fn(M) -> M + Send + Sync>;

/// Action built from closures
pub struct FnAction<M> {
    description: String,
    precondition: Option<Precondition<M>>,
    transition: Transition<M>,
}

impl<M> Clone for FnAction<M> {
    fn clone(&self) -> Self {
        Self {
            description: self.description.clone(),
            precondition: self.precondition.clone(),
            transition: Arc::clone(&self.transition),
        }
    }
}

/// Create an action from a description and a transition
///
/// ```rust
/// use falsify_stateful::prelude::*;
///
/// let pop = action("pop", |mut stack: Vec<i32>| {
///     stack.pop();
///     stack
/// })
/// .when(|stack: &Vec<i32>| !stack.is_empty());
///
/// assert!(!pop.precondition(&Vec::new()));
/// assert_eq!(pop.run(vec![1, 2]), vec![1]);
/// ```
pub fn action<M, F>(description: impl Into<String>, transition: F) -> FnAction<M>
where
    F: Fn(M) -> M + Send + Sync + 'static,
{
    FnAction {
        description: description.into(),
        precondition: None,
        transition: Arc::new(transition),
    }
}

impl<M: 'static> FnAction<M> {
    /// Restrict the action to models accepted by `precondition`
    pub fn when<P>(mut self, precondition: P) -> Self
    where
        P: Fn(&M) -> bool + Send + Sync + 'static,
    {
        self.precondition = Some(Arc::new(precondition));
        self
    }

    pub fn into_ref(self) -> ActionRef<M> {
        Arc::new(self)
    }
}

impl<M> Action<M> for FnAction<M> {
    fn precondition(&self, model: &M) -> bool {
        self.precondition
            .as_ref()
            .is_none_or(|precondition| precondition(model))
    }

    fn run(&self, model: M) -> M {
        (self.transition)(model)
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

impl<M> fmt::Debug for FnAction<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction")
            .field("description", &self.description)
            .field("guarded", &self.precondition.is_some())
            .finish()
    }
}

struct EndOfChain;

impl<M> Action<M> for EndOfChain {
    fn run(&self, model: M) -> M {
        model
    }

    fn description(&self) -> String {
        "end of chain".to_string()
    }

    fn is_end_of_chain(&self) -> bool {
        true
    }
}

/// Marker action that stops chain generation when drawn
pub fn end_of_chain<M: 'static>() -> ActionRef<M> {
    Arc::new(EndOfChain)
}

/// Apply an action, turning a panic into its message
///
/// [`Unrecoverable`] payloads keep unwinding.
pub(crate) fn apply<M>(action: &dyn Action<M>, model: M) -> Result<M, String> {
    panic::catch_unwind(AssertUnwindSafe(|| action.run(model))).map_err(into_message)
}

pub(crate) fn into_message(payload: Box<dyn Any + Send>) -> String {
    if payload.is::<Unrecoverable>() {
        panic::resume_unwind(payload);
    }
    panic_message(payload.as_ref())
}
