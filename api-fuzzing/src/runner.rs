// api-fuzzing/src/runner.rs
//! Driver loop
//!
//! Runs every enabled scenario once per round. With one worker the rounds
//! run strictly in sequence; with more, rounds are striped across scoped
//! threads that each own a random source derived from the run seed.

use crate::config::FuzzConfig;
use crate::harness::{ApiClient, ApiHarness, DispatchError, ScenarioBuilder};
use crate::reporters::summary::{RunStats, RunSummary};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::thread;
use std::time::Instant;

/// Rounds between progress log lines
const PROGRESS_INTERVAL: usize = 100;

/// Run the configured number of rounds against the target
pub fn run(config: &FuzzConfig) -> Result<RunSummary, DispatchError> {
    let client = ApiClient::new(config.base_url.clone(), config.timeout)?;
    let harness = ApiHarness::new(
        client,
        ScenarioBuilder::new(config.credentials.clone()),
        config.scenarios.clone(),
    );

    let seed = config.seed.unwrap_or_else(rand::random);
    log::info!(
        "Running {} rounds of {} scenarios on {} worker(s), seed {}",
        config.rounds,
        harness.scenarios().len(),
        config.workers,
        seed
    );

    Ok(run_harness(&harness, seed, config.rounds, config.workers))
}

/// Run `rounds` rounds of `harness`, split across `workers` threads
pub fn run_harness(harness: &ApiHarness, seed: u64, rounds: usize, workers: usize) -> RunSummary {
    let workers = workers.clamp(1, rounds.max(1));
    let start = Instant::now();

    let stats = if workers == 1 {
        run_worker(harness, seed, 0, 1, rounds)
    } else {
        thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|worker| scope.spawn(move || run_worker(harness, seed, worker, workers, rounds)))
                .collect();

            let mut stats = RunStats::default();
            for (worker, handle) in handles.into_iter().enumerate() {
                match handle.join() {
                    Ok(worker_stats) => stats.merge(&worker_stats),
                    Err(_) => log::error!("Worker {} panicked; its results are lost", worker),
                }
            }
            stats
        })
    };

    RunSummary {
        stats,
        seed,
        rounds,
        workers,
        elapsed: start.elapsed(),
    }
}

fn run_worker(harness: &ApiHarness, seed: u64, worker: usize, workers: usize, rounds: usize) -> RunStats {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(worker as u64));
    let mut stats = RunStats::default();

    for round in (worker..rounds).step_by(workers) {
        if round > 0 && round % PROGRESS_INTERVAL == 0 {
            log::info!("Progress: round {}/{} ({} requests on worker {})", round, rounds, stats.total(), worker);
        }
        harness.run_round(&mut rng, &mut stats);
    }

    stats
}
