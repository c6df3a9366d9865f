// api-fuzzing/src/mutators/mod.rs
//! Mutators that damage otherwise well-formed request inputs

pub mod json;

pub use json::{JsonBody, JsonBodyMutator};

use rand::Rng;

/// Trait for mutating fuzzable inputs
pub trait Mutator<T> {
    /// Mutate the given input in place
    fn mutate(&self, input: &mut T, rng: &mut impl Rng);

    /// Apply multiple mutations to the input
    fn mutate_multiple(&self, input: &mut T, count: usize, rng: &mut impl Rng) {
        for _ in 0..count {
            self.mutate(input, &mut *rng);
        }
    }

    /// Return a mutated copy, leaving `input` untouched
    fn mutated(&self, input: &T, rng: &mut impl Rng) -> T
    where
        T: Clone,
    {
        let mut copy = input.clone();
        self.mutate(&mut copy, rng);
        copy
    }
}
