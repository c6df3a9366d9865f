// api-fuzzing/src/bin/fuzz_api.rs

//! API Fuzzer

use std::path::PathBuf;

use anyhow::Result;
use api_fuzzing::harness::Scenario;
use api_fuzzing::{ConfigLayer, FuzzConfig};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "fuzz_api",
    about = "Sends randomized and malformed requests to the crowdfunding API",
    long_about = "Sends randomized and malformed requests to the crowdfunding API.\n\n\
                  Session and CSRF tokens are read from the config file or from the \
                  API_FUZZING_AUTH_TOKEN and API_FUZZING_CSRF_TOKEN environment variables."
)]
struct Cli {
    #[arg(long, short = 'c', help = "JSON config file")]
    config: Option<PathBuf>,

    #[arg(long, short = 'u', help = "Base URL of the target service [default: http://localhost:3000]")]
    base_url: Option<String>,

    #[arg(long, short = 't', help = "Per-request timeout, e.g. 5s or 750ms [default: 5s]")]
    timeout: Option<String>,

    #[arg(long, short = 'n', help = "Rounds through the enabled scenarios [default: 500]")]
    rounds: Option<usize>,

    #[arg(long, short = 's', help = "Seed for the random generator [default: random]")]
    seed: Option<u64>,

    #[arg(long, short = 'w', help = "Worker threads sharing the rounds [default: 1]")]
    workers: Option<usize>,

    #[arg(long = "scenario", value_enum, help = "Only run this scenario (repeatable)")]
    scenarios: Vec<Scenario>,

    #[arg(long, help = "List the available scenarios and exit")]
    list_scenarios: bool,
}

impl Cli {
    fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            base_url: self.base_url.clone(),
            timeout: self.timeout.clone(),
            rounds: self.rounds,
            seed: self.seed,
            workers: self.workers,
            scenarios: (!self.scenarios.is_empty()).then(|| self.scenarios.clone()),
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.list_scenarios {
        for scenario in Scenario::ALL {
            println!("{:<22} {}", scenario.name(), scenario.description());
        }
        return Ok(());
    }

    println!("=================================================================");
    println!("Crowdfunding API Fuzzer");
    println!("=================================================================");

    // Initialize the fuzzing framework
    api_fuzzing::init();

    let config = FuzzConfig::load(cli.config.as_deref(), cli.layer())?;
    if !config.credentials.is_complete() {
        log::warn!("Session or CSRF token missing; auth cookies will carry empty tokens");
    }

    println!("Target:                {}", config.base_url);
    println!("Rounds:                {}", config.rounds);
    println!("Timeout:               {}", humantime::format_duration(config.timeout));
    println!(
        "Scenarios:             {}",
        config
            .scenarios
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    log::debug!("Resolved configuration: {:?}", config);

    let summary = api_fuzzing::run(&config)?;
    summary.print();

    Ok(())
}
