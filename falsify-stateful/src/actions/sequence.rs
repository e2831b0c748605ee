//! Replay of an action chain against a model

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use falsify::PropertyError;
use tracing::{debug, trace};

use crate::actions::{ActionRef, apply};
use crate::invariants::{Invariant, check_all};

/// Lifecycle of a chain replay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotRun,
    Running,
    Succeeded,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunState::NotRun => "not run",
            RunState::Running => "running",
            RunState::Succeeded => "succeeded",
            RunState::Failed => "failed",
        };
        f.write_str(label)
    }
}

struct RunRecord<M> {
    state: RunState,
    executed: Vec<ActionRef<M>>,
    final_model: Option<M>,
}

impl<M: Clone> Clone for RunRecord<M> {
    fn clone(&self) -> Self {
        Self {
            state: self.state,
            executed: self.executed.clone(),
            final_model: self.final_model.clone(),
        }
    }
}

impl<M> RunRecord<M> {
    fn not_run() -> Self {
        Self {
            state: RunState::NotRun,
            executed: Vec::new(),
            final_model: None,
        }
    }
}

/// An ordered list of actions plus the invariants checked while replaying it
///
/// The sequence remembers its last replay: which actions ran, the model they
/// produced and whether the replay succeeded.
pub struct ActionSequence<M> {
    actions: Vec<ActionRef<M>>,
    invariants: Vec<Invariant<M>>,
    record: Mutex<RunRecord<M>>,
}

impl<M: Clone> Clone for ActionSequence<M> {
    fn clone(&self) -> Self {
        Self {
            actions: self.actions.clone(),
            invariants: self.invariants.clone(),
            record: Mutex::new(self.record().clone()),
        }
    }
}

impl<M> ActionSequence<M> {
    pub fn new(actions: Vec<ActionRef<M>>) -> Self {
        Self {
            actions,
            invariants: Vec::new(),
            record: Mutex::new(RunRecord::not_run()),
        }
    }

    /// Check `invariant` after every executed action
    pub fn with_invariant(mut self, invariant: Invariant<M>) -> Self {
        self.invariants.push(invariant);
        self
    }

    pub(crate) fn with_invariants(mut self, invariants: &[Invariant<M>]) -> Self {
        self.invariants.extend_from_slice(invariants);
        self
    }

    pub fn actions(&self) -> &[ActionRef<M>] {
        &self.actions
    }

    pub fn invariants(&self) -> &[Invariant<M>] {
        &self.invariants
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn run_state(&self) -> RunState {
        self.record().state
    }

    /// Actions executed by the last replay, in order
    pub fn run_actions(&self) -> Vec<ActionRef<M>> {
        self.record().executed.clone()
    }

    fn record(&self) -> MutexGuard<'_, RunRecord<M>> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<M: Clone> ActionSequence<M> {
    /// Model after the last executed action of the last replay
    pub fn final_model(&self) -> Option<M> {
        self.record().final_model.clone()
    }

    /// Replay the chain from `model`
    ///
    /// Actions whose precondition rejects the current model are skipped. Every
    /// invariant is checked after each executed action; the first violation or
    /// panicking action stops the replay.
    pub fn run(&self, model: M) -> Result<M, PropertyError> {
        *self.record() = RunRecord {
            state: RunState::Running,
            executed: Vec::new(),
            final_model: None,
        };

        let mut executed = Vec::with_capacity(self.actions.len());
        let mut current = model;
        let mut outcome = Ok(());

        for (index, action) in self.actions.iter().enumerate() {
            if !action.precondition(&current) {
                trace!(index, action = %action.description(), "precondition rejected, skipping");
                continue;
            }

            let before = current.clone();
            current = match apply(action.as_ref(), current) {
                Ok(next) => next,
                Err(cause) => {
                    outcome = Err(PropertyError::ActionFailed {
                        index,
                        description: action.description(),
                        cause,
                    });
                    current = before;
                    break;
                }
            };
            executed.push(action.clone());

            if let Err(violation) = check_all(&self.invariants, &current) {
                outcome = Err(PropertyError::InvariantViolated {
                    label: violation.label,
                    cause: violation.cause,
                    after_action: index,
                });
                break;
            }
        }

        let state = if outcome.is_ok() {
            RunState::Succeeded
        } else {
            RunState::Failed
        };
        debug!(actions = self.actions.len(), executed = executed.len(), %state, "chain replayed");

        *self.record() = RunRecord {
            state,
            executed,
            final_model: Some(current.clone()),
        };
        outcome.map(|()| current)
    }
}

impl<M> fmt::Display for ActionSequence<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record();
        let shown = if record.state == RunState::NotRun {
            &self.actions
        } else {
            &record.executed
        };

        write!(f, "ActionSequence <{}>:", record.state)?;
        for (position, action) in shown.iter().enumerate() {
            let separator = if position == 0 { " " } else { " -> " };
            write!(f, "{separator}{}", action.description())?;
        }
        let pending = self.actions.len() - shown.len();
        if pending > 0 {
            write!(f, " ({pending} not run)")?;
        }
        Ok(())
    }
}

impl<M> fmt::Debug for ActionSequence<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let descriptions: Vec<String> = self.actions.iter().map(|a| a.description()).collect();
        f.debug_struct("ActionSequence")
            .field("actions", &descriptions)
            .field("invariants", &self.invariants)
            .field("state", &self.record().state)
            .finish()
    }
}
