// api-fuzzing/src/utils.rs
//! Utility functions for the fuzzer

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Read a non-empty environment variable
pub fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Read and parse an environment variable
///
/// Unparseable values are ignored with a warning, falling back to whatever
/// lower configuration layer applies.
pub fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = env_string(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a valid value", name, raw);
            None
        }
    }
}

/// Parse a duration such as `5s`, `1500ms` or `2m`; a bare integer is seconds
pub fn parse_duration(text: &str) -> Result<Duration, humantime::DurationError> {
    let text = text.trim();
    if let Ok(secs) = text.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(text)
}

/// Truncate to at most `max_chars` characters, marking the cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}
