//! Invariants checked after every action of a chain

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::actions::into_message;

type CheckFn<M> = Arc<dyn Fn(&M) -> Result<(), String> + Send + Sync>;

/// A labelled property of the model
///
/// A check that panics is treated as a violation carrying the panic message.
pub struct Invariant<M> {
    label: String,
    check: CheckFn<M>,
}

impl<M> Clone for Invariant<M> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            check: Arc::clone(&self.check),
        }
    }
}

impl<M> Invariant<M> {
    /// Invariant whose check explains violations
    pub fn new<F>(label: impl Into<String>, check: F) -> Self
    where
        F: Fn(&M) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            check: Arc::new(check),
        }
    }

    /// Invariant from a boolean predicate
    pub fn holds<P>(label: impl Into<String>, predicate: P) -> Self
    where
        P: Fn(&M) -> bool + Send + Sync + 'static,
    {
        Self::new(label, move |model| {
            if predicate(model) {
                Ok(())
            } else {
                Err("predicate returned false".to_string())
            }
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn check(&self, model: &M) -> Result<(), String> {
        panic::catch_unwind(AssertUnwindSafe(|| (self.check)(model)))
            .unwrap_or_else(|payload| Err(into_message(payload)))
    }
}

impl<M> fmt::Debug for Invariant<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invariant")
            .field("label", &self.label)
            .finish()
    }
}

/// Check invariants in order, stopping at the first violation
pub fn check_all<M>(invariants: &[Invariant<M>], model: &M) -> Result<(), InvariantViolation> {
    for invariant in invariants {
        if let Err(cause) = invariant.check(model) {
            return Err(InvariantViolation {
                label: invariant.label.clone(),
                cause,
            });
        }
    }
    Ok(())
}

/// Represents a violation of an invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub label: String,
    pub cause: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invariant '{}' violated: {}", self.label, self.cause)
    }
}

impl std::error::Error for InvariantViolation {}
