// api-fuzzing/src/generators/mod.rs
//! Input generators for the API fuzzer

pub mod auth;
pub mod payload;

pub use auth::{AuthCookieGenerator, AuthCookies, AuthState, CookieSet};
pub use payload::{FuzzIdGenerator, FuzzNumberGenerator, FuzzStringGenerator};

use rand::Rng;

/// Generator trait for creating fuzzable inputs
///
/// Every generator draws from the random source it is handed, so a seeded
/// source reproduces the same sequence of values.
pub trait Generator<T> {
    /// Generate a new random instance of T
    fn generate(&self, rng: &mut impl Rng) -> T;

    /// Generate a set of new random instances of T
    fn generate_set(&self, count: usize, rng: &mut impl Rng) -> Vec<T> {
        (0..count).map(|_| self.generate(&mut *rng)).collect()
    }
}
