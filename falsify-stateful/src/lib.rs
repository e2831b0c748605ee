#![allow(clippy::result_large_err)]

//! # Falsify Stateful
//!
//! Model-based property testing on top of `falsify`: the generated value is a
//! chain of actions over a model, generated so that every action's precondition
//! holds, replayed against invariants, and shrunk both by dropping actions and by
//! simplifying the arguments of the actions that remain.
//!
//! ## Quick Example
//!
//! ```rust
//! use falsify::{Arbitrary, TestConfig, check_with_config, just, one_of, range};
//! use falsify_stateful::prelude::*;
//!
//! let push = range(0, 100).map(|value| {
//!     action(format!("push({value})"), move |mut stack: Vec<i32>| {
//!         stack.push(value);
//!         stack
//!     })
//!     .into_ref()
//! });
//! let pop = action("pop", |mut stack: Vec<i32>| {
//!     stack.pop();
//!     stack
//! })
//! .when(|stack: &Vec<i32>| !stack.is_empty())
//! .into_ref();
//!
//! let chains = sequences(one_of(vec![push.boxed(), just(pop).boxed()]), Vec::new)
//!     .with_invariant(Invariant::holds("at most 3 items", |s: &Vec<i32>| s.len() <= 3));
//!
//! let failure = check_with_config(
//!     chains,
//!     |chain: &ActionSequence<Vec<i32>>| chain.run(Vec::new()).map(|_| ()),
//!     TestConfig::default().with_seed(42),
//! )
//! .unwrap_err();
//!
//! let minimal = failure.minimal_input().unwrap();
//! assert_eq!(minimal.len(), 4);
//! ```

pub mod actions;
pub mod invariants;

pub use actions::{
    Action, ActionRef, ActionSequence, ActionSequenceArbitrary, FnAction, RunState,
    ShrinkableActionSequence, action, end_of_chain, sequences,
};
pub use invariants::{Invariant, InvariantViolation};

/// Re-exports for convenient imports
pub mod prelude {
    pub use crate::actions::*;
    pub use crate::invariants::*;
}
