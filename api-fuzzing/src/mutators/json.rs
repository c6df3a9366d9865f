// api-fuzzing/src/mutators/json.rs
//! Mutator for JSON request bodies

use crate::constants::UNEXPECTED_FIELD_PREFIX;
use crate::generators::{FuzzNumberGenerator, FuzzStringGenerator, Generator};
use crate::mutators::Mutator;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{Map, Value};

/// A JSON object used as a request body
pub type JsonBody = Map<String, Value>;

/// Number of fuzz-string characters appended to the synthetic field name
const SYNTHETIC_NAME_CHARS: usize = 3;

/// Mutator for JSON request bodies
///
/// Drops one required field, injects one unexpected field, and swaps values
/// for a `[fuzz string, fuzz number]` pair, each with its own probability.
#[derive(Debug, Clone)]
pub struct JsonBodyMutator {
    required_fields: Vec<String>,
    drop_probability: f64,
    inject_probability: f64,
    replace_probability: f64,
    strings: FuzzStringGenerator,
    numbers: FuzzNumberGenerator,
}

impl JsonBodyMutator {
    /// Create a mutator for a body whose `required_fields` the server expects
    pub fn new<S: AsRef<str>>(required_fields: &[S]) -> Self {
        Self {
            required_fields: required_fields.iter().map(|f| f.as_ref().to_string()).collect(),
            drop_probability: 0.5,
            inject_probability: 0.5,
            replace_probability: 0.3,
            strings: FuzzStringGenerator::new(),
            numbers: FuzzNumberGenerator::new(),
        }
    }

    /// Set the probability of dropping a required field
    pub fn with_drop_probability(mut self, probability: f64) -> Self {
        self.drop_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Set the probability of injecting an unexpected field
    pub fn with_inject_probability(mut self, probability: f64) -> Self {
        self.inject_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Set the per-field probability of replacing a value
    pub fn with_replace_probability(mut self, probability: f64) -> Self {
        self.replace_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Mutate a copy of `base`
    pub fn fuzz(&self, base: &JsonBody, rng: &mut impl Rng) -> JsonBody {
        self.mutated(base, rng)
    }
}

impl Mutator<JsonBody> for JsonBodyMutator {
    fn mutate(&self, input: &mut JsonBody, rng: &mut impl Rng) {
        // Drop a required field
        if !self.required_fields.is_empty() && rng.gen_bool(self.drop_probability) {
            if let Some(field) = self.required_fields.choose(&mut *rng) {
                // Rebuild instead of removing in place so the remaining keys keep their order
                *input = std::mem::take(input)
                    .into_iter()
                    .filter(|(key, _)| key != field)
                    .collect();
            }
        }

        // Inject a field the server does not expect
        if rng.gen_bool(self.inject_probability) {
            let value = self.strings.generate(&mut *rng);
            let fragment: String = self
                .strings
                .generate(&mut *rng)
                .chars()
                .take(SYNTHETIC_NAME_CHARS)
                .collect();
            input.insert(format!("{}{}", UNEXPECTED_FIELD_PREFIX, fragment), Value::String(value));
        }

        // Replace values with a mixed-type pair
        for value in input.values_mut() {
            if rng.gen_bool(self.replace_probability) {
                *value = Value::Array(vec![
                    Value::String(self.strings.generate(&mut *rng)),
                    self.numbers.generate(&mut *rng),
                ]);
            }
        }
    }
}
