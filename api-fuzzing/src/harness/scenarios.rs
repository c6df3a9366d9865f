// api-fuzzing/src/harness/scenarios.rs
//! Scenario drivers, one per API operation

use crate::config::Credentials;
use crate::constants::endpoints;
use crate::generators::{
    AuthCookieGenerator, AuthCookies, CookieSet, FuzzIdGenerator, FuzzNumberGenerator, FuzzStringGenerator,
    Generator,
};
use crate::harness::client::ApiRequest;
use crate::mutators::{JsonBody, JsonBodyMutator};
use rand::Rng;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// API operations probed by the fuzzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// POST /api/projects with a mutated project body
    CreateProject,
    /// GET /api/projects
    ListProjects,
    /// GET /api/projects/{id} with a fuzzed id
    FetchProject,
    /// POST /api/projects/{id}/contributions with a mutated amount
    CreateContribution,
    /// GET /api/user/contributions
    UserContributions,
    /// GET /api/admin/contributions
    AdminContributions,
    /// GET /api/admin/projects
    AdminProjects,
}

impl Scenario {
    /// Every scenario, in execution order
    pub const ALL: [Scenario; 7] = [
        Scenario::CreateProject,
        Scenario::ListProjects,
        Scenario::FetchProject,
        Scenario::CreateContribution,
        Scenario::UserContributions,
        Scenario::AdminContributions,
        Scenario::AdminProjects,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::CreateProject => "create-project",
            Scenario::ListProjects => "list-projects",
            Scenario::FetchProject => "fetch-project",
            Scenario::CreateContribution => "create-contribution",
            Scenario::UserContributions => "user-contributions",
            Scenario::AdminContributions => "admin-contributions",
            Scenario::AdminProjects => "admin-projects",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::CreateProject => "create a project with a mutated body and random auth",
            Scenario::ListProjects => "list projects anonymously",
            Scenario::FetchProject => "fetch one project by a fuzzed id",
            Scenario::CreateContribution => "contribute a mutated amount to a fuzzed project id",
            Scenario::UserContributions => "list the caller's contributions with random auth",
            Scenario::AdminContributions => "list all contributions as admin with random auth",
            Scenario::AdminProjects => "list all projects as admin with random auth",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .iter()
            .copied()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| format!("unknown scenario {:?}", s))
    }
}

/// Builds the request of each scenario from the payload generators
#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
    strings: FuzzStringGenerator,
    numbers: FuzzNumberGenerator,
    ids: FuzzIdGenerator,
    auth: AuthCookieGenerator,
    project_mutator: JsonBodyMutator,
    contribution_mutator: JsonBodyMutator,
}

impl ScenarioBuilder {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            strings: FuzzStringGenerator::new(),
            numbers: FuzzNumberGenerator::new(),
            ids: FuzzIdGenerator::new(),
            auth: AuthCookieGenerator::new(credentials),
            project_mutator: JsonBodyMutator::new(&["title", "goal"]),
            contribution_mutator: JsonBodyMutator::new(&["amount"]),
        }
    }

    /// Assemble one request for `scenario`
    pub fn build(&self, scenario: Scenario, rng: &mut impl Rng) -> ApiRequest {
        match scenario {
            Scenario::CreateProject => {
                let mut base = JsonBody::new();
                base.insert("title".into(), Value::String(self.strings.generate(&mut *rng)));
                base.insert("description".into(), Value::String(self.strings.generate(&mut *rng)));
                base.insert("goal".into(), self.numbers.generate(&mut *rng));

                let body = self.project_mutator.fuzz(&base, &mut *rng);
                ApiRequest::new(Method::POST, endpoints::PROJECTS)
                    .with_body(body)
                    .with_cookies(self.cookies(rng))
            }
            Scenario::ListProjects => ApiRequest::new(Method::GET, endpoints::PROJECTS),
            Scenario::FetchProject => {
                let id = self.ids.generate(rng);
                ApiRequest::new(Method::GET, endpoints::project(&id))
            }
            Scenario::CreateContribution => {
                let id = self.ids.generate(&mut *rng);
                let mut base = JsonBody::new();
                base.insert("amount".into(), self.numbers.generate(&mut *rng));

                let body = self.contribution_mutator.fuzz(&base, &mut *rng);
                ApiRequest::new(Method::POST, endpoints::project_contributions(&id))
                    .with_body(body)
                    .with_cookies(self.cookies(rng))
            }
            Scenario::UserContributions => {
                ApiRequest::new(Method::GET, endpoints::USER_CONTRIBUTIONS).with_cookies(self.cookies(rng))
            }
            Scenario::AdminContributions => {
                ApiRequest::new(Method::GET, endpoints::ADMIN_CONTRIBUTIONS).with_cookies(self.cookies(rng))
            }
            Scenario::AdminProjects => {
                ApiRequest::new(Method::GET, endpoints::ADMIN_PROJECTS).with_cookies(self.cookies(rng))
            }
        }
    }

    fn cookies(&self, rng: &mut impl Rng) -> Option<CookieSet> {
        let AuthCookies { state, cookies }: AuthCookies = self.auth.generate(rng);
        log::trace!("auth state {}", state);
        cookies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::UNEXPECTED_FIELD_PREFIX;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn builder() -> ScenarioBuilder {
        ScenarioBuilder::new(Credentials::new("tok", "csrf"))
    }

    #[test]
    fn test_names_round_trip() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.name().parse::<Scenario>(), Ok(scenario));
            assert!(!scenario.description().is_empty());
        }
        assert!("drop-tables".parse::<Scenario>().is_err());
    }

    #[test]
    fn test_anonymous_scenarios_carry_no_cookies_or_body() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let list = builder().build(Scenario::ListProjects, &mut rng);
            assert_eq!(list.method, Method::GET);
            assert_eq!(list.path, "/api/projects");
            assert!(list.cookies.is_none() && list.body.is_none());

            let fetch = builder().build(Scenario::FetchProject, &mut rng);
            assert_eq!(fetch.method, Method::GET);
            assert!(fetch.path.starts_with("/api/projects/"));
            assert!(fetch.cookies.is_none() && fetch.body.is_none());
        }
    }

    #[test]
    fn test_create_project_body_shape() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..200 {
            let request = builder().build(Scenario::CreateProject, &mut rng);
            assert_eq!(request.method, Method::POST);
            assert_eq!(request.path, "/api/projects");

            let body = request.body.expect("create project always sends a body");
            // description is never required, so it is never dropped
            assert!(body.contains_key("description"));
            for key in body.keys() {
                assert!(
                    ["title", "description", "goal"].contains(&key.as_str())
                        || key.starts_with(UNEXPECTED_FIELD_PREFIX)
                );
            }
        }
    }

    #[test]
    fn test_contribution_targets_fuzzed_project() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let request = builder().build(Scenario::CreateContribution, &mut rng);
            assert_eq!(request.method, Method::POST);
            assert!(request.path.starts_with("/api/projects/"));
            assert!(request.path.ends_with("/contributions"));
            assert!(request.body.is_some());
        }
    }

    #[test]
    fn test_authenticated_scenarios_vary_cookies() {
        let mut rng = StdRng::seed_from_u64(4);
        let requests: Vec<ApiRequest> = (0..200)
            .map(|_| builder().build(Scenario::AdminContributions, &mut rng))
            .collect();

        assert!(requests.iter().all(|r| r.path == "/api/admin/contributions"));
        assert!(requests.iter().any(|r| r.cookies.is_none()));
        assert!(requests
            .iter()
            .any(|r| r.cookies.as_ref().map(|c| c.len() == 2).unwrap_or(false)));
    }

    #[test]
    fn test_same_seed_builds_same_requests() {
        let build_all = |seed: u64| -> Vec<ApiRequest> {
            let mut rng = StdRng::seed_from_u64(seed);
            let builder = builder();
            (0..20)
                .flat_map(|_| Scenario::ALL)
                .map(|scenario| builder.build(scenario, &mut rng))
                .collect()
        };

        assert_eq!(build_all(1234), build_all(1234));
        assert_ne!(build_all(1234), build_all(4321));
    }
}
