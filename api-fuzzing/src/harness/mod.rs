// api-fuzzing/src/harness/mod.rs
//! Harness for sending fuzzed requests to the target API

pub mod api;
pub mod client;
pub mod scenarios;

pub use api::*;
pub use client::*;
pub use scenarios::*;
