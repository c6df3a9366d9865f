// api-fuzzing/src/constants.rs
//! Shared constants for the API fuzzer

/// Default base URL of the target service
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Default per-request timeout (in seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default number of rounds through every scenario
pub const DEFAULT_ROUNDS: usize = 500;

/// Default number of worker threads (1 = strictly sequential)
pub const DEFAULT_WORKERS: usize = 1;

/// Printed instead of a body summary when the body cannot be summarized
pub const PARSE_FAILURE_PLACEHOLDER: &str = "<failed to parse response>";

/// Prefix of the synthetic field injected by the JSON mutator
pub const UNEXPECTED_FIELD_PREFIX: &str = "unexpected_field_";

/// Suffix appended to a token to corrupt it
pub const CORRUPTION_SUFFIX: &str = "corrupted";

/// Cookie names understood by the target service
pub mod cookies {
    /// Session token cookie
    pub const AUTH_TOKEN: &str = "auth_token";
    /// Anti-forgery token cookie
    pub const CSRF_TOKEN: &str = "csrftoken";
}

/// Environment variables read on top of the config file
pub mod env_vars {
    pub const BASE_URL: &str = "API_FUZZING_BASE_URL";
    pub const AUTH_TOKEN: &str = "API_FUZZING_AUTH_TOKEN";
    pub const CSRF_TOKEN: &str = "API_FUZZING_CSRF_TOKEN";
    pub const TIMEOUT: &str = "API_FUZZING_TIMEOUT";
    pub const ROUNDS: &str = "API_FUZZING_ROUNDS";
    pub const SEED: &str = "API_FUZZING_SEED";
    pub const WORKERS: &str = "API_FUZZING_WORKERS";
}

/// Endpoint paths of the target service
pub mod endpoints {
    /// Project collection (list and create)
    pub const PROJECTS: &str = "/api/projects";
    /// Contributions of the authenticated user
    pub const USER_CONTRIBUTIONS: &str = "/api/user/contributions";
    /// All contributions (admin only)
    pub const ADMIN_CONTRIBUTIONS: &str = "/api/admin/contributions";
    /// All projects (admin only)
    pub const ADMIN_PROJECTS: &str = "/api/admin/projects";

    /// Single project path
    pub fn project(id: &str) -> String {
        format!("{}/{}", PROJECTS, id)
    }

    /// Contribution path of a single project
    pub fn project_contributions(id: &str) -> String {
        format!("{}/{}/contributions", PROJECTS, id)
    }
}
