// api-fuzzing/src/lib.rs
//! Randomized input fuzzer for the crowdfunding HTTP API
//!
//! Generates malformed payloads and auth states, sends them to the project
//! and contribution endpoints, and prints a color-coded line per response.
//! It observes; it never decides whether a response is right or wrong.

pub mod config;
pub mod constants;
pub mod runner;
pub mod utils;

// Core modules
pub mod generators;
pub mod harness;
pub mod mutators;
pub mod reporters;

// Re-exports for convenience
pub use config::{ConfigError, ConfigLayer, Credentials, FuzzConfig};
pub use constants::*;
pub use runner::run;

/// Initialize the fuzzing infrastructure
///
/// Sets up logging from `RUST_LOG`, defaulting to `info`. Safe to call more
/// than once.
pub fn init() {
    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
