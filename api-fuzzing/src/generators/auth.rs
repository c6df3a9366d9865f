// api-fuzzing/src/generators/auth.rs
//! Authentication state generators
//!
//! Simulates valid sessions, tampered tokens, partial sessions and anonymous
//! access by choosing one of eight cookie shapes per request.

use crate::config::Credentials;
use crate::constants::{cookies, CORRUPTION_SUFFIX};
use crate::generators::Generator;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

/// Shape of the cookies attached to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AuthState {
    /// Both tokens, untouched
    Full,
    /// Session token with garbage appended
    CorruptedToken,
    /// CSRF token with garbage appended
    CorruptedCsrf,
    /// Session token only
    TokenOnly,
    /// CSRF token only
    CsrfOnly,
    /// Both cookies present with empty values
    EmptyValues,
    /// A cookie jar with nothing in it
    EmptyJar,
    /// No cookies at all
    Anonymous,
}

impl AuthState {
    pub const ALL: [AuthState; 8] = [
        AuthState::Full,
        AuthState::CorruptedToken,
        AuthState::CorruptedCsrf,
        AuthState::TokenOnly,
        AuthState::CsrfOnly,
        AuthState::EmptyValues,
        AuthState::EmptyJar,
        AuthState::Anonymous,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AuthState::Full => "full",
            AuthState::CorruptedToken => "corrupted-token",
            AuthState::CorruptedCsrf => "corrupted-csrf",
            AuthState::TokenOnly => "token-only",
            AuthState::CsrfOnly => "csrf-only",
            AuthState::EmptyValues => "empty-values",
            AuthState::EmptyJar => "empty-jar",
            AuthState::Anonymous => "anonymous",
        }
    }

    /// Build the cookie set for this state
    ///
    /// Returns `None` for [`AuthState::Anonymous`]; every other state yields
    /// a (possibly empty) set.
    pub fn cookies(&self, credentials: &Credentials) -> Option<CookieSet> {
        let token = credentials.auth_token();
        let csrf = credentials.csrf_token();

        let pairs = match self {
            AuthState::Full => vec![
                (cookies::AUTH_TOKEN, token.to_string()),
                (cookies::CSRF_TOKEN, csrf.to_string()),
            ],
            AuthState::CorruptedToken => vec![
                (cookies::AUTH_TOKEN, format!("{}{}", token, CORRUPTION_SUFFIX)),
                (cookies::CSRF_TOKEN, csrf.to_string()),
            ],
            AuthState::CorruptedCsrf => vec![
                (cookies::AUTH_TOKEN, token.to_string()),
                (cookies::CSRF_TOKEN, format!("{}{}", csrf, CORRUPTION_SUFFIX)),
            ],
            AuthState::TokenOnly => vec![(cookies::AUTH_TOKEN, token.to_string())],
            AuthState::CsrfOnly => vec![(cookies::CSRF_TOKEN, csrf.to_string())],
            AuthState::EmptyValues => vec![
                (cookies::AUTH_TOKEN, String::new()),
                (cookies::CSRF_TOKEN, String::new()),
            ],
            AuthState::EmptyJar => Vec::new(),
            AuthState::Anonymous => return None,
        };

        Some(CookieSet { pairs })
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered set of cookies sent with one request
#[derive(Clone, PartialEq, Eq, Default)]
pub struct CookieSet {
    pairs: Vec<(&'static str, String)>,
}

impl CookieSet {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Value of the named cookie, if present
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.pairs.iter().map(|(name, _)| *name)
    }

    /// Render as a `Cookie` header value, `None` when the set is empty
    pub fn header_value(&self) -> Option<String> {
        if self.pairs.is_empty() {
            return None;
        }

        Some(
            self.pairs
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

// Cookie values are session secrets
impl fmt::Debug for CookieSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// A chosen auth state together with the cookies it produced
#[derive(Debug, Clone, PartialEq)]
pub struct AuthCookies {
    pub state: AuthState,
    pub cookies: Option<CookieSet>,
}

/// Generator for auth cookie sets built from the configured credentials
#[derive(Debug, Clone)]
pub struct AuthCookieGenerator {
    credentials: Credentials,
}

impl AuthCookieGenerator {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl Generator<AuthState> for AuthCookieGenerator {
    fn generate(&self, rng: &mut impl Rng) -> AuthState {
        *AuthState::ALL.choose(rng).unwrap_or(&AuthState::Anonymous)
    }
}

impl Generator<AuthCookies> for AuthCookieGenerator {
    fn generate(&self, rng: &mut impl Rng) -> AuthCookies {
        let state: AuthState = self.generate(rng);
        AuthCookies {
            state,
            cookies: state.cookies(&self.credentials),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn credentials() -> Credentials {
        Credentials::new("session-token", "csrf-token")
    }

    #[test]
    fn test_selector_eventually_returns_every_state() {
        let generator = AuthCookieGenerator::new(credentials());
        let mut rng = StdRng::seed_from_u64(3);

        let seen: HashSet<AuthState> = (0..500)
            .map(|_| Generator::<AuthState>::generate(&generator, &mut rng))
            .collect();

        assert_eq!(seen.len(), AuthState::ALL.len());
    }

    #[test]
    fn test_full_state_carries_both_tokens() {
        let cookies = AuthState::Full.cookies(&credentials()).unwrap();
        assert_eq!(cookies.get("auth_token"), Some("session-token"));
        assert_eq!(cookies.get("csrftoken"), Some("csrf-token"));
        assert_eq!(
            cookies.header_value().as_deref(),
            Some("auth_token=session-token; csrftoken=csrf-token")
        );
    }

    #[test]
    fn test_corrupted_states_append_suffix() {
        let token = AuthState::CorruptedToken.cookies(&credentials()).unwrap();
        assert_eq!(token.get("auth_token"), Some("session-tokencorrupted"));
        assert_eq!(token.get("csrftoken"), Some("csrf-token"));

        let csrf = AuthState::CorruptedCsrf.cookies(&credentials()).unwrap();
        assert_eq!(csrf.get("auth_token"), Some("session-token"));
        assert_eq!(csrf.get("csrftoken"), Some("csrf-tokencorrupted"));
    }

    #[test]
    fn test_partial_and_empty_states() {
        let token_only = AuthState::TokenOnly.cookies(&credentials()).unwrap();
        assert_eq!(token_only.names().collect::<Vec<_>>(), vec!["auth_token"]);

        let csrf_only = AuthState::CsrfOnly.cookies(&credentials()).unwrap();
        assert_eq!(csrf_only.names().collect::<Vec<_>>(), vec!["csrftoken"]);

        let empty_values = AuthState::EmptyValues.cookies(&credentials()).unwrap();
        assert_eq!(empty_values.header_value().as_deref(), Some("auth_token=; csrftoken="));

        let empty_jar = AuthState::EmptyJar.cookies(&credentials()).unwrap();
        assert!(empty_jar.is_empty());
        assert_eq!(empty_jar.header_value(), None);

        assert_eq!(AuthState::Anonymous.cookies(&credentials()), None);
    }

    #[test]
    fn test_debug_output_hides_cookie_values() {
        let cookies = AuthState::Full.cookies(&credentials()).unwrap();
        let rendered = format!("{:?}", cookies);
        assert!(rendered.contains("auth_token"));
        assert!(!rendered.contains("session-token"));
    }
}
