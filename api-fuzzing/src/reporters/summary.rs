// api-fuzzing/src/reporters/summary.rs
//! Run tallies and the closing summary block

use crate::harness::api::Outcome;
use crate::harness::scenarios::Scenario;
use std::collections::BTreeMap;
use std::time::Duration;

const RULE: &str = "=================================================================";
const THIN_RULE: &str = "-----------------------------------------------------------------";

/// Counts of outcomes across a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// 1xx and anything below 200
    pub informational: usize,
    /// 2xx
    pub success: usize,
    /// 3xx
    pub redirects: usize,
    /// 4xx
    pub client_errors: usize,
    /// 5xx and above
    pub server_errors: usize,
    /// Requests that never got a response
    pub transport_failures: usize,
    per_scenario: BTreeMap<Scenario, usize>,
}

impl RunStats {
    /// Count one request of `scenario`
    pub fn record(&mut self, scenario: Scenario, outcome: Outcome) {
        *self.per_scenario.entry(scenario).or_insert(0) += 1;

        match outcome {
            Outcome::TransportFailure => self.transport_failures += 1,
            Outcome::Status(status) => match status {
                500..=u16::MAX => self.server_errors += 1,
                400..=499 => self.client_errors += 1,
                300..=399 => self.redirects += 1,
                200..=299 => self.success += 1,
                _ => self.informational += 1,
            },
        }
    }

    /// Fold another tally into this one
    pub fn merge(&mut self, other: &RunStats) {
        self.informational += other.informational;
        self.success += other.success;
        self.redirects += other.redirects;
        self.client_errors += other.client_errors;
        self.server_errors += other.server_errors;
        self.transport_failures += other.transport_failures;
        for (scenario, count) in &other.per_scenario {
            *self.per_scenario.entry(*scenario).or_insert(0) += count;
        }
    }

    /// Total number of requests attempted
    pub fn total(&self) -> usize {
        self.informational
            + self.success
            + self.redirects
            + self.client_errors
            + self.server_errors
            + self.transport_failures
    }

    pub fn per_scenario(&self, scenario: Scenario) -> usize {
        self.per_scenario.get(&scenario).copied().unwrap_or(0)
    }
}

/// Everything reported once the loop completes
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stats: RunStats,
    /// Seed the run was driven by, for replaying it
    pub seed: u64,
    pub rounds: usize,
    pub workers: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn render(&self) -> String {
        let stats = &self.stats;
        let total = stats.total();
        let secs = self.elapsed.as_secs_f64();
        let rate = if secs > 0.0 { total as f64 / secs } else { 0.0 };

        let mut lines = vec![
            format!("\n{}", RULE),
            "API Fuzzing Summary:".to_string(),
            RULE.to_string(),
            format!("Rounds:                {}", self.rounds),
            format!("Workers:               {}", self.workers),
            format!("Seed:                  {}", self.seed),
            format!("Total requests:        {}", total),
            format!("2xx responses:         {}", stats.success),
            format!("3xx responses:         {}", stats.redirects),
            format!("4xx responses:         {}", stats.client_errors),
            format!("5xx responses:         {}", stats.server_errors),
        ];
        if stats.informational > 0 {
            lines.push(format!("Other responses:       {}", stats.informational));
        }
        lines.push(format!("Transport failures:    {}", stats.transport_failures));
        lines.push(THIN_RULE.to_string());
        lines.extend(
            stats
                .per_scenario
                .iter()
                .map(|(scenario, count)| format!("{:<22} {}", format!("{}:", scenario), count)),
        );
        lines.push(THIN_RULE.to_string());
        lines.push(format!("Elapsed time:          {:.2} seconds", secs));
        lines.push(format!("Requests per second:   {:.2}", rate));
        lines.push(RULE.to_string());

        lines.join("\n")
    }

    pub fn print(&self) {
        println!("{}", self.render());
    }
}
