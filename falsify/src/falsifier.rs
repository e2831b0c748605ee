//! Falsifiers: caller code that decides whether a value is a counterexample.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::trace;

use crate::error::PropertyError;

/// Property under check
///
/// `Ok(())` means the value satisfies the property; any error falsifies it.
pub trait Falsifier<T>: Send + Sync {
    fn test(&self, value: &T) -> Result<(), PropertyError>;
}

impl<T, F> Falsifier<T> for F
where
    F: Fn(&T) -> Result<(), PropertyError> + Send + Sync,
{
    fn test(&self, value: &T) -> Result<(), PropertyError> {
        self(value)
    }
}

/// Adapt a boolean predicate: `false` falsifies
pub fn from_predicate<T, P>(predicate: P) -> impl Falsifier<T>
where
    P: Fn(&T) -> bool + Send + Sync,
{
    move |value: &T| {
        if predicate(value) {
            Ok(())
        } else {
            Err(PropertyError::property_failed("predicate returned false"))
        }
    }
}

/// Panic payload for conditions that must abort a check instead of being shrunk
///
/// Raise it with `std::panic::panic_any(Unrecoverable::new(..))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unrecoverable {
    pub reason: String,
}

impl Unrecoverable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Unrecoverable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecoverable: {}", self.reason)
    }
}

/// Outcome of evaluating a falsifier on one value
#[derive(Debug, Clone, PartialEq)]
pub enum TryOutcome {
    Satisfied,
    Falsified(PropertyError),
}

impl TryOutcome {
    pub fn is_falsified(&self) -> bool {
        matches!(self, TryOutcome::Falsified(_))
    }

    pub fn into_error(self) -> Option<PropertyError> {
        match self {
            TryOutcome::Satisfied => None,
            TryOutcome::Falsified(error) => Some(error),
        }
    }
}

/// Run a falsifier, turning panics into falsifications
///
/// A panic whose payload is [`Unrecoverable`] keeps unwinding.
pub fn evaluate<T, F>(falsifier: &F, value: &T) -> TryOutcome
where
    F: Falsifier<T> + ?Sized,
{
    match panic::catch_unwind(AssertUnwindSafe(|| falsifier.test(value))) {
        Ok(Ok(())) => TryOutcome::Satisfied,
        Ok(Err(error)) => TryOutcome::Falsified(error),
        Err(payload) => {
            if payload.is::<Unrecoverable>() {
                panic::resume_unwind(payload);
            }
            let message = panic_message(payload.as_ref());
            trace!(%message, "falsifier panicked");
            TryOutcome::Falsified(PropertyError::property_failed_with_context(
                message,
                Some("panic"),
                None,
            ))
        }
    }
}

/// Message carried by a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}
