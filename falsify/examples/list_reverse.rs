//! Reversing a list twice gives it back; reversing it once does not

use falsify::{Arbitrary, PropertyError, TestConfig, check, check_with_config, integers};

fn double_reverse(list: &Vec<i32>) -> Result<(), PropertyError> {
    let mut reversed = list.clone();
    reversed.reverse();
    reversed.reverse();

    if &reversed == list {
        Ok(())
    } else {
        Err(PropertyError::property_failed("Double reverse failed"))
    }
}

fn single_reverse(list: &Vec<i32>) -> Result<(), PropertyError> {
    let reversed: Vec<i32> = list.iter().rev().copied().collect();
    if &reversed == list {
        Ok(())
    } else {
        Err(PropertyError::property_failed("Reversed list differs"))
    }
}

fn main() {
    match check(integers::<i32>().list().of_max_size(10), double_reverse) {
        Ok(success) => println!("✓ Double reverse holds ({} tries)", success.tries),
        Err(failure) => println!("✗ Failed: {}", failure.summary()),
    }

    let config = TestConfig::default().with_seed(2024);
    match check_with_config(integers::<i32>().list(), single_reverse, config) {
        Ok(_) => println!("✓ Single reverse unexpectedly holds"),
        Err(failure) => {
            // shrinks to two distinct elements
            println!("✗ Single reverse falsified as expected");
            println!("{}", failure.detailed_report());
        }
    }
}
