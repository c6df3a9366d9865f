// api-fuzzing/src/harness/api.rs
//! Test harness driving scenarios against the target API

use crate::harness::client::{ApiClient, ApiResponse, DispatchError};
use crate::harness::scenarios::{Scenario, ScenarioBuilder};
use crate::reporters::summary::RunStats;
use rand::Rng;

/// Result of one fuzzed request, as far as the tally cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The server answered with this status
    Status(u16),
    /// The request never produced a response
    TransportFailure,
}

impl From<&Result<ApiResponse, DispatchError>> for Outcome {
    fn from(result: &Result<ApiResponse, DispatchError>) -> Self {
        match result {
            Ok(response) => Outcome::Status(response.status),
            Err(_) => Outcome::TransportFailure,
        }
    }
}

/// Harness pairing the HTTP client with the scenario builder
#[derive(Debug, Clone)]
pub struct ApiHarness {
    client: ApiClient,
    builder: ScenarioBuilder,
    scenarios: Vec<Scenario>,
}

impl ApiHarness {
    pub fn new(client: ApiClient, builder: ScenarioBuilder, scenarios: Vec<Scenario>) -> Self {
        Self {
            client,
            builder,
            scenarios,
        }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Build and dispatch one scenario
    pub fn fuzz_scenario(&self, scenario: Scenario, rng: &mut impl Rng) -> Outcome {
        let request = self.builder.build(scenario, rng);
        let result = self.client.dispatch(&request);

        if let Err(err) = &result {
            log::debug!("{} failed in transport: {}", scenario, err);
        }

        Outcome::from(&result)
    }

    /// Run every enabled scenario once, in order
    pub fn run_round(&self, rng: &mut impl Rng, stats: &mut RunStats) {
        for &scenario in &self.scenarios {
            let outcome = self.fuzz_scenario(scenario, &mut *rng);
            stats.record(scenario, outcome);
        }
    }
}
