// api-fuzzing/src/generators/payload.rs
//! Payload generators for strings, numbers and identifiers
//!
//! Each generator picks uniformly from a fixed pool of boundary and
//! malformed values. Pools holding ranges (negative numbers, small ids) draw
//! the concrete value from the range on every call.

use crate::generators::Generator;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;

/// Length of the oversized string payload
pub const LONG_STRING_LEN: usize = 10_000;

/// Number of distinct shapes produced by [`FuzzNumberGenerator`]
pub const NUMBER_SHAPES: usize = 5;

/// Number of distinct shapes produced by [`FuzzIdGenerator`]
pub const ID_SHAPES: usize = 6;

/// Literal identifiers used by [`FuzzIdGenerator`] next to its numeric ranges
pub const ID_LITERALS: [&str; 4] = ["", "abc", "9999999999999999999", "1; DROP TABLE users;"];

static STRING_PAYLOADS: Lazy<Vec<String>> = Lazy::new(|| {
    vec![
        String::new(),
        "A".repeat(LONG_STRING_LEN),
        "'; DROP TABLE projects; --".to_string(),
        "<script>alert(1)</script>".to_string(),
        "😀💣🦄".to_string(),
        "тест".to_string(),
        // Invalid UTF-8, decoded the way a lenient client would
        String::from_utf8_lossy(&[0xff, 0xfe, 0xfa]).into_owned(),
        "foo@bar.com".to_string(),
        "\x00\x19\x7f".to_string(),
        "\\'\"`~!@#$%^&*()[]{}".to_string(),
    ]
});

/// The full pool of string payloads
pub fn string_pool() -> &'static [String] {
    &STRING_PAYLOADS
}

/// Generator for free-form string payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzStringGenerator;

impl FuzzStringGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator<String> for FuzzStringGenerator {
    fn generate(&self, rng: &mut impl Rng) -> String {
        STRING_PAYLOADS.choose(rng).cloned().unwrap_or_default()
    }
}

/// Generator for numeric edge cases
///
/// Produces zero, a large negative, a large positive, a non-numeric string or
/// `null`, so fields declared as numbers see every kind of wrong input.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzNumberGenerator;

impl FuzzNumberGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator<Value> for FuzzNumberGenerator {
    fn generate(&self, rng: &mut impl Rng) -> Value {
        match rng.gen_range(0..NUMBER_SHAPES) {
            0 => Value::from(0),
            1 => Value::from(-rng.gen_range(1..=1_000_000i64)),
            2 => Value::from(rng.gen_range(1_000_000..=1_000_000_000i64)),
            3 => Value::from("not_a_number"),
            _ => Value::Null,
        }
    }
}

/// Generator for identifier-shaped path segments
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzIdGenerator;

impl FuzzIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator<String> for FuzzIdGenerator {
    fn generate(&self, rng: &mut impl Rng) -> String {
        match rng.gen_range(0..ID_SHAPES) {
            0 => rng.gen_range(1..=100i64).to_string(),
            1 => (-rng.gen_range(1..=100i64)).to_string(),
            n => ID_LITERALS[n - 2].to_string(),
        }
    }
}
