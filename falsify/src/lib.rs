#![allow(clippy::result_large_err)]

//! # Falsify - Generation and Shrinking for Property-Based Testing
//!
//! Falsify generates values from composable arbitraries, checks a property against
//! them and shrinks any counterexample to a locally minimal one.
//!
//! Every generated value is a [`Shrinkable`]: the value, its simpler candidates
//! and a [`ShrinkingDistance`] that strictly decreases along every shrink path.
//! Small domains are enumerated exhaustively instead of sampled, and edge cases
//! are mixed into random generation.
//!
//! ## Quick Start
//!
//! ```rust
//! use falsify::{Arbitrary, PropertyError, TestConfig, check_with_config, range};
//!
//! let config = TestConfig::default().with_seed(7);
//! let failure = check_with_config(
//!     range(0, 1000).list(),
//!     |list: &Vec<i32>| -> Result<(), PropertyError> {
//!         if list.iter().all(|v| *v < 500) {
//!             Ok(())
//!         } else {
//!             Err(PropertyError::property_failed("element too large"))
//!         }
//!     },
//!     config,
//! )
//! .unwrap_err();
//!
//! assert_eq!(failure.minimal_input(), Some(&vec![500]));
//! ```

pub mod arbitrary;
pub mod combinators;
pub mod config;
pub mod container;
pub mod distance;
pub mod edge_cases;
pub mod error;
pub mod execution;
pub mod exhaustive;
pub mod falsifier;
pub mod frequency;
pub mod generator;
pub mod primitives;
pub mod rng;
pub mod shrink;
pub mod shrinkable;

// Re-export the main public API
pub use arbitrary::{
    Arbitrary, CharArbitrary, Choose, IntegralArbitrary, Just, Lazy, OneOf, Shuffle,
    StringArbitrary, booleans, chars, choose, combine2, combine3, integers, just, lazy, one_of,
    range, recursive, shuffle, strings,
};
pub use combinators::{
    BoxedArbitrary, Filter, FlatMap, ListArbitrary, Map, MapArbitrary, NoShrink, Optional,
    SetArbitrary, WithSamples, Zip, maps,
};
pub use config::{ConfigError, EdgeCasesMode, GenerationMode, ParallelConfig, TestConfig};
pub use distance::ShrinkingDistance;
pub use edge_cases::EdgeCases;
pub use error::{PropertyError, PropertyResult, TestFailure, TestSuccess};
pub use execution::{PropertyCheck, check, check_parallel, check_with_config};
pub use exhaustive::ExhaustiveGenerator;
pub use falsifier::{Falsifier, TryOutcome, Unrecoverable, evaluate, from_predicate};
pub use frequency::{Frequency, FrequencyOf, frequency, frequency_of};
pub use generator::Generator;
pub use rng::{RandomState, SourceOfRandomness, create_rng};
pub use shrink::{
    MappedShrinkingSequence, ShrinkConfig, ShrinkEngine, ShrinkResult, ShrinkState, ShrinkSteps,
    ShrinkingSequence,
};
pub use shrinkable::{Generated, Shrink, Shrinkable};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

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
    }

    #[test]
    fn test_public_api_composition() {
        let arbitrary = range(1, 5)
            .map(|x| x * 2)
            .filter(|x| *x > 4)
            .zip(just("test"));
        let generator = arbitrary.generator(100);
        let mut rng = SourceOfRandomness::from_seed(3);

        let (number, text) = generator.next(&mut rng).unwrap().value();
        assert!((6..=10).contains(&number));
        assert_eq!(number % 2, 0);
        assert_eq!(text, "test");
    }

    #[test]
    fn test_public_api_check() {
        let result = check(
            booleans().zip(chars().alpha()),
            from_predicate(|(_, c): &(bool, char)| c.is_ascii_lowercase()),
        );
        let success = result.unwrap();
        assert!(success.exhaustive);
        assert_eq!(success.tries, 52);
    }
}
