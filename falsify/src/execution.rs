//! Property check execution: generation, falsification and shrinking of one property.

use std::panic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use tracing::debug;

use crate::arbitrary::Arbitrary;
use crate::config::{EdgeCasesMode, GenerationMode, ParallelConfig, TestConfig};
use crate::error::{PropertyError, PropertyResult, TestFailure, TestSuccess};
use crate::exhaustive::ExhaustiveGenerator;
use crate::falsifier::{Falsifier, TryOutcome, evaluate};
use crate::generator::Generator;
use crate::rng::{SourceOfRandomness, create_rng};
use crate::shrink::{ShrinkConfig, ShrinkEngine, ShrinkResult};
use crate::shrinkable::{Generated, Shrinkable};

type ShrinkCallback<T> = dyn FnMut(&T, bool);

/// How the tries of a check ended
enum Verdict<T> {
    Passed {
        tries: usize,
        exhaustive: bool,
    },
    Falsified {
        shrinkable: Shrinkable<T>,
        error: PropertyError,
        try_number: usize,
    },
    Aborted {
        error: PropertyError,
        try_number: usize,
    },
}

impl<T> Verdict<T> {
    fn try_number(&self) -> usize {
        match self {
            Verdict::Passed { tries, .. } => *tries,
            Verdict::Falsified { try_number, .. } | Verdict::Aborted { try_number, .. } => {
                *try_number
            }
        }
    }
}

/// Check of a single property over the values of an arbitrary
pub struct PropertyCheck<A: Arbitrary, F> {
    arbitrary: A,
    falsifier: F,
    config: TestConfig,
    on_shrink_step: Option<Box<ShrinkCallback<A::Value>>>,
}

impl<A, F> PropertyCheck<A, F>
where
    A: Arbitrary,
    F: Falsifier<A::Value>,
{
    pub fn new(arbitrary: A, falsifier: F) -> Self {
        Self {
            arbitrary,
            falsifier,
            config: TestConfig::default(),
            on_shrink_step: None,
        }
    }

    pub fn with_config(mut self, config: TestConfig) -> Self {
        self.config = config;
        self
    }

    /// Observe every value visited while shrinking, with whether it was progress
    pub fn on_shrink_step<C>(mut self, callback: C) -> Self
    where
        C: FnMut(&A::Value, bool) + 'static,
    {
        self.on_shrink_step = Some(Box::new(callback));
        self
    }

    /// Execute the check on the calling thread
    pub fn run(self) -> PropertyResult<A::Value> {
        self.execute(None)
    }

    /// Execute the randomized tries on several threads
    ///
    /// Exhaustive checks and shrinking still run on the calling thread.
    pub fn run_parallel(self, parallel: &ParallelConfig) -> PropertyResult<A::Value> {
        self.execute(Some(parallel))
    }

    fn execute(self, parallel: Option<&ParallelConfig>) -> PropertyResult<A::Value> {
        let test_start = Instant::now();
        let mut rng = create_rng(self.config.seed);
        let seed = rng.seed();

        if let Err(error) = self.config.validate() {
            let error = PropertyError::config_error_with_field(error.to_string(), None::<String>);
            return Err(TestFailure::generation(
                error,
                seed,
                0,
                self.config,
                test_start.elapsed(),
            ));
        }
        debug!(
            tries = self.config.tries,
            seed,
            gen_size = self.config.gen_size,
            "starting property check"
        );

        let verdict = match self.exhaustive_generator() {
            Err(error) => Verdict::Aborted {
                error,
                try_number: 0,
            },
            Ok(Some(generator)) => self.run_exhaustive(&generator),
            Ok(None) => match parallel {
                Some(parallel) if parallel.enabled && parallel.workers > 1 => {
                    self.run_randomized_parallel(&mut rng, parallel.workers)
                }
                _ => self.run_randomized(&mut rng),
            },
        };

        self.conclude(verdict, seed, test_start)
    }

    fn exhaustive_generator(&self) -> Result<Option<ExhaustiveGenerator<A::Value>>, PropertyError> {
        let tries = self.config.tries as u64;
        match self.config.generation {
            GenerationMode::Randomized => Ok(None),
            GenerationMode::Auto => Ok(self.arbitrary.exhaustive(tries)),
            GenerationMode::Exhaustive => match self.arbitrary.exhaustive(tries) {
                Some(generator) => Ok(Some(generator)),
                None => Err(PropertyError::config_error_with_field(
                    format!("exhaustive generation is not possible within {tries} tries"),
                    Some("generation"),
                )),
            },
        }
    }

    fn run_exhaustive(&self, generator: &ExhaustiveGenerator<A::Value>) -> Verdict<A::Value> {
        debug!(max_count = generator.max_count(), "enumerating all values");
        let mut tries = 0;
        for value in generator.iter() {
            tries += 1;
            if let Some(verdict) = try_value(&self.falsifier, Shrinkable::unshrinkable(value), tries)
            {
                return verdict;
            }
        }
        Verdict::Passed {
            tries,
            exhaustive: true,
        }
    }

    fn run_randomized(&self, rng: &mut SourceOfRandomness) -> Verdict<A::Value> {
        let tries = match self.edge_cases_first() {
            Ok(tries) => tries,
            Err(verdict) => return verdict,
        };
        let generator = randomized_generator(&self.arbitrary, &self.config);

        for try_number in tries + 1..=self.config.tries {
            let shrinkable = match generator.next(rng) {
                Ok(shrinkable) => shrinkable,
                Err(error) => return Verdict::Aborted { error, try_number },
            };
            if let Some(verdict) = try_value(&self.falsifier, shrinkable, try_number) {
                return verdict;
            }
        }
        Verdict::Passed {
            tries: self.config.tries,
            exhaustive: false,
        }
    }

    fn run_randomized_parallel(
        &self,
        rng: &mut SourceOfRandomness,
        workers: usize,
    ) -> Verdict<A::Value> {
        let evaluated = match self.edge_cases_first() {
            Ok(tries) => tries,
            Err(verdict) => return verdict,
        };
        let remaining = self.config.tries - evaluated;
        let workers = workers.min(remaining).max(1);
        let sources: Vec<SourceOfRandomness> = (0..workers).map(|_| rng.split()).collect();
        debug!(workers, tries = remaining, "running tries in parallel");

        let lowest_failure = AtomicUsize::new(usize::MAX);
        let (arbitrary, falsifier, config) = (&self.arbitrary, &self.falsifier, &self.config);
        let joined = crossbeam::scope(|scope| {
            let handles: Vec<_> = sources
                .into_iter()
                .enumerate()
                .map(|(worker, mut source)| {
                    let lowest_failure = &lowest_failure;
                    scope.spawn(move |_| {
                        let tries = WorkerTries {
                            worker,
                            workers,
                            offset: evaluated,
                            count: remaining,
                        };
                        run_worker(arbitrary, falsifier, config, &mut source, tries, lowest_failure)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Vec<_>>()
        });

        let results = joined.unwrap_or_else(|payload| panic::resume_unwind(payload));
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(Some(verdict)) => failures.push(verdict),
                Ok(None) => {}
                Err(payload) => panic::resume_unwind(payload),
            }
        }

        failures
            .into_iter()
            .min_by_key(Verdict::try_number)
            .unwrap_or(Verdict::Passed {
                tries: self.config.tries,
                exhaustive: false,
            })
    }

    /// Evaluate edge cases up front when configured to; returns the tries spent
    fn edge_cases_first(&self) -> Result<usize, Verdict<A::Value>> {
        if self.config.edge_cases != EdgeCasesMode::First {
            return Ok(0);
        }
        let edge_cases = self.arbitrary.edge_cases().limit(self.config.tries);
        debug!(count = edge_cases.len(), "checking edge cases first");
        let mut tries = 0;
        for edge_case in edge_cases {
            tries += 1;
            if let Some(verdict) = try_value(&self.falsifier, edge_case, tries) {
                return Err(verdict);
            }
        }
        Ok(tries)
    }

    fn conclude(
        mut self,
        verdict: Verdict<A::Value>,
        seed: u64,
        test_start: Instant,
    ) -> PropertyResult<A::Value> {
        match verdict {
            Verdict::Passed { tries, exhaustive } => {
                debug!(tries, exhaustive, "property check passed");
                Ok(TestSuccess {
                    tries,
                    exhaustive,
                    seed,
                    config: self.config,
                })
            }
            Verdict::Aborted { error, try_number } => {
                debug!(try_number, %error, "property check aborted");
                Err(TestFailure::generation(
                    error,
                    seed,
                    try_number,
                    self.config,
                    test_start.elapsed(),
                ))
            }
            Verdict::Falsified {
                shrinkable,
                error,
                try_number,
            } => {
                debug!(try_number, %error, "property falsified, shrinking");
                let engine = ShrinkEngine::with_config(ShrinkConfig::from(&self.config));
                let falsifier = &self.falsifier;
                let ShrinkResult {
                    original,
                    minimal,
                    shrink_steps,
                    shrink_duration,
                    error: shrunk_error,
                    ..
                } = match self.on_shrink_step.as_mut() {
                    Some(callback) => {
                        engine.shrink_with_callback(shrinkable, falsifier, |current, progress| {
                            callback(&current.value(), progress)
                        })
                    }
                    None => engine.shrink(shrinkable, falsifier),
                };

                Err(TestFailure {
                    error: shrunk_error.unwrap_or(error).at_iteration(try_number),
                    original_input: Some(original),
                    shrunk_input: (shrink_steps > 0).then_some(minimal),
                    shrink_steps,
                    seed,
                    failed_try: try_number,
                    config: self.config,
                    test_duration: test_start.elapsed(),
                    shrink_duration,
                })
            }
        }
    }
}

/// Tries `offset + worker + k * workers` for every `k` within `count`
#[derive(Debug, Clone, Copy)]
struct WorkerTries {
    worker: usize,
    workers: usize,
    offset: usize,
    count: usize,
}

fn run_worker<A, F>(
    arbitrary: &A,
    falsifier: &F,
    config: &TestConfig,
    rng: &mut SourceOfRandomness,
    tries: WorkerTries,
    lowest_failure: &AtomicUsize,
) -> Option<Verdict<A::Value>>
where
    A: Arbitrary,
    F: Falsifier<A::Value>,
{
    let generator = randomized_generator(arbitrary, config);
    for index in (tries.worker..tries.count).step_by(tries.workers) {
        let try_number = tries.offset + index + 1;
        // Tries only grow per worker, so nothing left here can beat a known failure
        if try_number > lowest_failure.load(Ordering::Acquire) {
            return None;
        }
        let verdict = match generator.next(rng) {
            Ok(shrinkable) => try_value(falsifier, shrinkable, try_number),
            Err(error) => Some(Verdict::Aborted { error, try_number }),
        };
        if verdict.is_some() {
            lowest_failure.fetch_min(try_number, Ordering::AcqRel);
            return verdict;
        }
    }
    None
}

fn randomized_generator<A: Arbitrary>(arbitrary: &A, config: &TestConfig) -> Generator<A::Value> {
    match config.edge_cases {
        EdgeCasesMode::Mixin => arbitrary.generator_with_edge_cases(config.gen_size),
        EdgeCasesMode::First | EdgeCasesMode::None => arbitrary.generator(config.gen_size),
    }
}

fn try_value<T, F>(falsifier: &F, shrinkable: Shrinkable<T>, try_number: usize) -> Option<Verdict<T>>
where
    T: Generated,
    F: Falsifier<T> + ?Sized,
{
    match evaluate(falsifier, &shrinkable.value()) {
        TryOutcome::Satisfied => None,
        TryOutcome::Falsified(error) => Some(Verdict::Falsified {
            shrinkable,
            error,
            try_number,
        }),
    }
}

/// Check a property with the default configuration
pub fn check<A, F>(arbitrary: A, falsifier: F) -> PropertyResult<A::Value>
where
    A: Arbitrary,
    F: Falsifier<A::Value>,
{
    check_with_config(arbitrary, falsifier, TestConfig::default())
}

/// Check a property with a custom configuration
pub fn check_with_config<A, F>(
    arbitrary: A,
    falsifier: F,
    config: TestConfig,
) -> PropertyResult<A::Value>
where
    A: Arbitrary,
    F: Falsifier<A::Value>,
{
    PropertyCheck::new(arbitrary, falsifier)
        .with_config(config)
        .run()
}

/// Check a property, spreading randomized tries over worker threads
///
/// Every worker draws from its own split of the random source and its own
/// generator. The failure with the lowest try number is shrunk on the calling
/// thread.
pub fn check_parallel<A, F>(
    arbitrary: A,
    falsifier: F,
    config: TestConfig,
    parallel: ParallelConfig,
) -> PropertyResult<A::Value>
where
    A: Arbitrary,
    F: Falsifier<A::Value>,
{
    PropertyCheck::new(arbitrary, falsifier)
        .with_config(config)
        .run_parallel(&parallel)
}
