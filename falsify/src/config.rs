//! Configuration types for controlling property checks and generation parameters.

use std::time::Duration;

use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Invalid number of tries (must be > 0)
    #[error("Invalid tries count: {0} (must be > 0)")]
    InvalidTries(usize),
    /// Invalid number of shrinking steps (must be > 0)
    #[error("Invalid shrinking steps count: {0} (must be > 0)")]
    InvalidShrinkingSteps(usize),
    /// Invalid timeout (must be > 0)
    #[error("Invalid timeout (must be > 0)")]
    InvalidTimeout,
    /// Invalid generation size (must be > 0)
    #[error("Invalid gen size: {0} (must be > 0)")]
    InvalidGenSize(usize),
    /// Invalid number of parallel workers (must be > 0)
    #[error("Invalid worker count: {0} (must be > 0)")]
    InvalidWorkers(usize),
}

/// How values are produced during a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationMode {
    /// Enumerate exhaustively when the whole domain fits into the tries, random otherwise
    #[default]
    Auto,
    /// Always draw random values
    Randomized,
    /// Enumerate exhaustively; a check fails with a configuration error when the domain cannot be enumerated
    Exhaustive,
}

/// How edge cases take part in a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeCasesMode {
    /// Evaluate all edge cases before any random value
    First,
    /// Inject edge cases into the random stream
    #[default]
    Mixin,
    /// Do not use edge cases
    None,
}

/// Configuration for individual property checks
#[derive(Debug, Clone, PartialEq)]
pub struct TestConfig {
    /// Number of tries to evaluate
    pub tries: usize,
    /// Maximum number of successful shrinking steps
    pub max_shrinking_steps: usize,
    /// Timeout for the shrinking phase
    pub shrink_timeout: Duration,
    /// Optional seed for reproducible checks
    pub seed: Option<u64>,
    /// Size budget handed to `Arbitrary::generator`
    pub gen_size: usize,
    /// Random or exhaustive generation
    pub generation: GenerationMode,
    /// Edge case handling
    pub edge_cases: EdgeCasesMode,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            tries: 1000,
            max_shrinking_steps: 1000,
            shrink_timeout: Duration::from_secs(10),
            seed: None,
            gen_size: 1000,
            generation: GenerationMode::Auto,
            edge_cases: EdgeCasesMode::Mixin,
        }
    }
}

impl TestConfig {
    /// Create a new test configuration with validation
    pub fn new(
        tries: usize,
        max_shrinking_steps: usize,
        shrink_timeout: Duration,
        seed: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            tries,
            max_shrinking_steps,
            shrink_timeout,
            seed,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the test configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tries == 0 {
            return Err(ConfigError::InvalidTries(self.tries));
        }
        if self.max_shrinking_steps == 0 {
            return Err(ConfigError::InvalidShrinkingSteps(self.max_shrinking_steps));
        }
        if self.shrink_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.gen_size == 0 {
            return Err(ConfigError::InvalidGenSize(self.gen_size));
        }
        Ok(())
    }

    pub fn with_tries(mut self, tries: usize) -> Self {
        self.tries = tries;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_shrinking_steps(mut self, steps: usize) -> Self {
        self.max_shrinking_steps = steps;
        self
    }

    pub fn with_shrink_timeout(mut self, timeout: Duration) -> Self {
        self.shrink_timeout = timeout;
        self
    }

    pub fn with_gen_size(mut self, gen_size: usize) -> Self {
        self.gen_size = gen_size;
        self
    }

    pub fn with_generation(mut self, generation: GenerationMode) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_edge_cases(mut self, edge_cases: EdgeCasesMode) -> Self {
        self.edge_cases = edge_cases;
        self
    }
}

/// Configuration for parallel execution
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelConfig {
    /// Number of worker threads
    pub workers: usize,
    /// Whether to run in parallel at all
    pub enabled: bool,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            enabled: true,
        }
    }
}

impl ParallelConfig {
    /// Create a parallel configuration with a fixed worker count
    pub fn with_workers(workers: usize) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::InvalidWorkers(workers));
        }
        Ok(Self {
            workers,
            enabled: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = TestConfig::default();
        assert_eq!(config.tries, 1000);
        assert_eq!(config.max_shrinking_steps, 1000);
        assert_eq!(config.shrink_timeout, Duration::from_secs(10));
        assert_eq!(config.gen_size, 1000);
        assert_eq!(config.generation, GenerationMode::Auto);
        assert_eq!(config.edge_cases, EdgeCasesMode::Mixin);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert_eq!(
            TestConfig::new(0, 10, Duration::from_secs(1), None),
            Err(ConfigError::InvalidTries(0))
        );
        assert_eq!(
            TestConfig::new(10, 0, Duration::from_secs(1), None),
            Err(ConfigError::InvalidShrinkingSteps(0))
        );
        assert_eq!(
            TestConfig::new(10, 10, Duration::ZERO, None),
            Err(ConfigError::InvalidTimeout)
        );
        assert_eq!(
            TestConfig::default().with_gen_size(0).validate(),
            Err(ConfigError::InvalidGenSize(0))
        );

        let config = TestConfig::new(50, 20, Duration::from_secs(2), Some(7)).unwrap();
        assert_eq!(config.tries, 50);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_config_builders() {
        let config = TestConfig::default()
            .with_tries(10)
            .with_seed(42)
            .with_generation(GenerationMode::Randomized)
            .with_edge_cases(EdgeCasesMode::None);

        assert_eq!(config.tries, 10);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.generation, GenerationMode::Randomized);
        assert_eq!(config.edge_cases, EdgeCasesMode::None);
    }

    #[test]
    fn test_parallel_config() {
        assert!(ParallelConfig::default().workers >= 1);
        assert_eq!(
            ParallelConfig::with_workers(0),
            Err(ConfigError::InvalidWorkers(0))
        );
        assert_eq!(ParallelConfig::with_workers(3).unwrap().workers, 3);
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::InvalidTries(0).to_string(),
            "Invalid tries count: 0 (must be > 0)"
        );
        assert_eq!(
            ConfigError::InvalidTimeout.to_string(),
            "Invalid timeout (must be > 0)"
        );
    }
}
