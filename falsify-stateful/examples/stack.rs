//! Example: a bounded stack checked against action chains

use falsify::{Arbitrary, TestConfig, check_with_config, just, one_of, range};
use falsify_stateful::prelude::*;

/// A stack that silently drops pushes beyond its capacity
#[derive(Debug, Clone, PartialEq)]
struct BoundedStack {
    items: Vec<i32>,
    capacity: usize,
}

impl BoundedStack {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            capacity: 5,
        }
    }

    fn push(mut self, item: i32) -> Self {
        if self.items.len() < self.capacity {
            self.items.push(item);
        }
        self
    }

    fn pop(mut self) -> Self {
        self.items.pop();
        self
    }
}

fn main() {
    let pushes = range(-10, 10).map(|value| {
        action(format!("push({value})"), move |stack: BoundedStack| stack.push(value)).into_ref()
    });
    let pop = action("pop", BoundedStack::pop)
        .when(|stack: &BoundedStack| !stack.items.is_empty())
        .into_ref();

    let chains = sequences(one_of(vec![pushes.boxed(), just(pop).boxed()]), BoundedStack::new)
        .of_max_size(40)
        .with_invariant(Invariant::holds("never full", |stack: &BoundedStack| {
            stack.items.len() < stack.capacity
        }));

    let result = check_with_config(
        chains,
        |chain: &ActionSequence<BoundedStack>| chain.run(BoundedStack::new()).map(|_| ()),
        TestConfig::default().with_seed(7),
    );

    match result {
        Ok(success) => println!("✓ All {} chains kept the stack below capacity", success.tries),
        Err(failure) => {
            println!("✗ {}", failure.error);
            if let Some(chain) = failure.minimal_input() {
                let _ = chain.run(BoundedStack::new());
                println!("  Minimal chain: {chain}");
                println!("  Final model: {:?}", chain.final_model());
            }
            println!("  Shrink steps: {}", failure.shrink_steps);
        }
    }
}
