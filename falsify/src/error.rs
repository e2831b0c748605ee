//! Error types and result handling for generation, shrinking and property checks.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::config::TestConfig;

/// Comprehensive error type for property checking failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    /// Property was falsified with a specific message and optional context
    #[error("Property failed: {message}{}{}", fmt_context(.context), fmt_iteration(.iteration))]
    PropertyFailed {
        message: String,
        context: Option<String>,
        iteration: Option<usize>,
    },

    /// Generation of test data failed
    #[error("Generation failed: {message}{}", fmt_context(.context))]
    GenerationFailed {
        message: String,
        context: Option<String>,
    },

    /// A filtering generator rejected too many consecutive values
    #[error("Too many filter misses: {misses} consecutive values were rejected")]
    TooManyFilterMisses { misses: usize },

    /// No candidate action was runnable on the current model
    #[error("Cannot find runnable action after {tries} tries (model: {model})")]
    PreconditionExhausted { tries: usize, model: String },

    /// An invariant did not hold after an action was applied
    #[error("Invariant '{label}' failed after action {after_action}: {cause}")]
    InvariantViolated {
        label: String,
        cause: String,
        after_action: usize,
    },

    /// An action failed while being applied to the model
    #[error("Action {index} ({description}) failed: {cause}")]
    ActionFailed {
        index: usize,
        description: String,
        cause: String,
    },

    /// A saved random state was produced by a different algorithm
    #[error("Cannot restore random state of algorithm '{found}' into '{expected}'")]
    RandomStateMismatch { expected: String, found: String },

    /// Shrinkage process timed out
    #[error("Shrinkage timeout after {iterations} iterations{}", fmt_last_shrink(.last_successful_shrink))]
    ShrinkageTimeout {
        iterations: usize,
        last_successful_shrink: Option<String>,
    },

    /// Configuration error
    #[error("Configuration error: {message}{}", fmt_field(.field))]
    ConfigError {
        message: String,
        field: Option<String>,
    },

    /// Internal error in the engine
    #[error("Internal error: {message}{}", fmt_source(.source_message))]
    InternalError {
        message: String,
        source_message: Option<String>,
    },
}

fn fmt_context(context: &Option<String>) -> String {
    context
        .as_ref()
        .map(|ctx| format!(" (context: {})", ctx))
        .unwrap_or_default()
}

fn fmt_iteration(iteration: &Option<usize>) -> String {
    iteration
        .map(|iter| format!(" (iteration: {})", iter))
        .unwrap_or_default()
}

fn fmt_last_shrink(shrink: &Option<String>) -> String {
    shrink
        .as_ref()
        .map(|s| format!(" (last successful shrink: {})", s))
        .unwrap_or_default()
}

fn fmt_field(field: &Option<String>) -> String {
    field
        .as_ref()
        .map(|name| format!(" (field: {})", name))
        .unwrap_or_default()
}

fn fmt_source(source: &Option<String>) -> String {
    source
        .as_ref()
        .map(|src| format!(" (source: {})", src))
        .unwrap_or_default()
}

/// Helper functions for creating PropertyError instances with context
impl PropertyError {
    /// Create a simple property failed error
    pub fn property_failed(message: impl Into<String>) -> Self {
        Self::PropertyFailed {
            message: message.into(),
            context: None,
            iteration: None,
        }
    }

    /// Create a property failed error with context
    pub fn property_failed_with_context(
        message: impl Into<String>,
        context: Option<impl Into<String>>,
        iteration: Option<usize>,
    ) -> Self {
        Self::PropertyFailed {
            message: message.into(),
            context: context.map(|c| c.into()),
            iteration,
        }
    }

    /// Create a simple generation failed error
    pub fn generation_failed(message: impl Into<String>) -> Self {
        Self::GenerationFailed {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with field information
    pub fn config_error_with_field(
        message: impl Into<String>,
        field: Option<impl Into<String>>,
    ) -> Self {
        Self::ConfigError {
            message: message.into(),
            field: field.map(|f| f.into()),
        }
    }

    /// Create an internal error
    pub fn internal_error(
        message: impl Into<String>,
        source_message: Option<impl Into<String>>,
    ) -> Self {
        Self::InternalError {
            message: message.into(),
            source_message: source_message.map(|s| s.into()),
        }
    }

    /// Attach the try number to a falsification that does not carry one yet
    pub fn at_iteration(self, iteration: usize) -> Self {
        match self {
            PropertyError::PropertyFailed {
                message,
                context,
                iteration: None,
            } => PropertyError::PropertyFailed {
                message,
                context,
                iteration: Some(iteration),
            },
            other => other,
        }
    }

    /// True for errors that mean the domain is misconfigured rather than the property falsified
    pub fn is_exhausted_generation(&self) -> bool {
        matches!(
            self,
            PropertyError::TooManyFilterMisses { .. }
                | PropertyError::PreconditionExhausted { .. }
                | PropertyError::GenerationFailed { .. }
        )
    }
}

/// Result of a property check
pub type PropertyResult<T> = Result<TestSuccess, TestFailure<T>>;

/// Information about a successful check
#[derive(Debug, Clone)]
pub struct TestSuccess {
    /// Number of tries evaluated
    pub tries: usize,
    /// Whether the domain was enumerated exhaustively
    pub exhaustive: bool,
    /// Seed the random source was created from
    pub seed: u64,
    /// Test configuration used
    pub config: TestConfig,
}

/// Information about a failed check
#[derive(Debug, Clone)]
pub struct TestFailure<T> {
    /// The error that caused the failure
    pub error: PropertyError,
    /// Original falsifying value (absent when generation itself failed)
    pub original_input: Option<T>,
    /// Minimal falsifying value found by shrinking
    pub shrunk_input: Option<T>,
    /// Number of successful shrinking steps
    pub shrink_steps: usize,
    /// Seed the random source was created from
    pub seed: u64,
    /// Try number where the failure occurred
    pub failed_try: usize,
    /// Test configuration used
    pub config: TestConfig,
    /// Total time spent on the check
    pub test_duration: Duration,
    /// Time spent on shrinking
    pub shrink_duration: Duration,
}

impl<T> TestFailure<T> {
    /// Failure raised before any value could be falsified
    pub fn generation(
        error: PropertyError,
        seed: u64,
        failed_try: usize,
        config: TestConfig,
        test_duration: Duration,
    ) -> Self {
        Self {
            error,
            original_input: None,
            shrunk_input: None,
            shrink_steps: 0,
            seed,
            failed_try,
            config,
            test_duration,
            shrink_duration: Duration::ZERO,
        }
    }

    /// The smallest known falsifying value
    pub fn minimal_input(&self) -> Option<&T> {
        self.shrunk_input.as_ref().or(self.original_input.as_ref())
    }

    /// Get a detailed report of the failure
    pub fn detailed_report(&self) -> String
    where
        T: fmt::Debug,
    {
        let mut report = String::new();

        report.push_str(&format!("Property check failed on try {}\n", self.failed_try));
        report.push_str(&format!("Error: {}\n", self.error));
        match &self.original_input {
            Some(original) => report.push_str(&format!("Original input: {:?}\n", original)),
            None => report.push_str("No input was generated\n"),
        }

        if let Some(ref shrunk) = self.shrunk_input {
            report.push_str(&format!("Shrunk input: {:?}\n", shrunk));
            report.push_str(&format!("Shrinking steps: {}\n", self.shrink_steps));
            report.push_str(&format!("Shrinking time: {:?}\n", self.shrink_duration));
        } else {
            report.push_str("No shrinking performed\n");
        }

        report.push_str(&format!("Total test time: {:?}\n", self.test_duration));
        report.push_str(&format!(
            "Test configuration: tries={}, seed={}\n",
            self.config.tries, self.seed
        ));

        report
    }

    /// Get a concise summary of the failure
    pub fn summary(&self) -> String
    where
        T: fmt::Debug,
    {
        match (&self.shrunk_input, &self.original_input) {
            (Some(shrunk), Some(original)) => format!(
                "Property failed with input {:?} (shrunk from {:?}) on try {} [seed {}]",
                shrunk, original, self.failed_try, self.seed
            ),
            (None, Some(original)) => format!(
                "Property failed with input {:?} on try {} [seed {}]",
                original, self.failed_try, self.seed
            ),
            _ => format!(
                "Property check aborted on try {}: {} [seed {}]",
                self.failed_try, self.error, self.seed
            ),
        }
    }
}

impl<T: fmt::Debug> fmt::Display for TestFailure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_error_display_with_context() {
        let error = PropertyError::PropertyFailed {
            message: "assertion failed".to_string(),
            context: Some("list reversal".to_string()),
            iteration: Some(42),
        };
        assert_eq!(
            error.to_string(),
            "Property failed: assertion failed (context: list reversal) (iteration: 42)"
        );
    }

    #[test]
    fn test_property_error_display_without_context() {
        let error = PropertyError::property_failed("boom");
        assert_eq!(error.to_string(), "Property failed: boom");
    }

    #[test]
    fn test_too_many_filter_misses_display() {
        let error = PropertyError::TooManyFilterMisses { misses: 10_000 };
        assert_eq!(
            error.to_string(),
            "Too many filter misses: 10000 consecutive values were rejected"
        );
        assert!(error.is_exhausted_generation());
    }

    #[test]
    fn test_invariant_violation_display() {
        let error = PropertyError::InvariantViolated {
            label: "size >= 0".to_string(),
            cause: "size was -1".to_string(),
            after_action: 3,
        };
        assert_eq!(
            error.to_string(),
            "Invariant 'size >= 0' failed after action 3: size was -1"
        );
        assert!(!error.is_exhausted_generation());
    }

    #[test]
    fn test_at_iteration_only_fills_missing_iteration() {
        let error = PropertyError::property_failed("x").at_iteration(7);
        assert!(matches!(
            error,
            PropertyError::PropertyFailed {
                iteration: Some(7),
                ..
            }
        ));

        let error = error.at_iteration(9);
        assert!(matches!(
            error,
            PropertyError::PropertyFailed {
                iteration: Some(7),
                ..
            }
        ));

        let other = PropertyError::TooManyFilterMisses { misses: 1 }.at_iteration(3);
        assert_eq!(other, PropertyError::TooManyFilterMisses { misses: 1 });
    }

    #[test]
    fn test_failure_summary_and_report() {
        let failure = TestFailure {
            error: PropertyError::property_failed("too big"),
            original_input: Some(vec![9, 8, 7]),
            shrunk_input: Some(vec![1]),
            shrink_steps: 4,
            seed: 99,
            failed_try: 12,
            config: TestConfig::default(),
            test_duration: Duration::from_millis(20),
            shrink_duration: Duration::from_millis(5),
        };

        assert_eq!(
            failure.summary(),
            "Property failed with input [1] (shrunk from [9, 8, 7]) on try 12 [seed 99]"
        );
        assert_eq!(failure.minimal_input(), Some(&vec![1]));

        let report = failure.detailed_report();
        assert!(report.contains("Shrunk input: [1]"));
        assert!(report.contains("Shrinking steps: 4"));
        assert!(report.contains("seed=99"));
    }

    #[test]
    fn test_generation_failure_has_no_input() {
        let failure: TestFailure<i32> = TestFailure::generation(
            PropertyError::TooManyFilterMisses { misses: 10 },
            1,
            0,
            TestConfig::default(),
            Duration::ZERO,
        );
        assert!(failure.minimal_input().is_none());
        assert!(failure.summary().starts_with("Property check aborted on try 0"));
    }
}
