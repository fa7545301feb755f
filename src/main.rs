use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

use stablepair::config::Settings;
use stablepair::synth::{random_preferences, reciprocal_preferences, sequential_labels};
use stablepair::{log_pairs, reports, StablePairing};

fn main() {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting stablepair demo run...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    let n = settings.pairing.proposers;
    let m = settings.pairing.acceptors;
    let mut rng = StdRng::seed_from_u64(settings.pairing.seed);

    info!(
        seed = settings.pairing.seed,
        mentors = n,
        mentees = m,
        "Synthesizing preference tables"
    );

    // Mentors rank mentees with raw, possibly-tied scores; the mentee side
    // is synthesized to loosely reciprocate the mentors' strong opinions
    let mentors = random_preferences(n, m, "mentor_", &mut rng).unwrap_or_else(|e| {
        error!("Failed to build mentor table: {}", e);
        panic!("Table error: {}", e);
    });
    let mentees = reciprocal_preferences(
        &mentors,
        sequential_labels("mentee_", m),
        settings.synth.rank_cut,
        &mut rng,
    )
    .unwrap_or_else(|e| {
        error!("Failed to build mentee table: {}", e);
        panic!("Table error: {}", e);
    });

    let mut pairing = StablePairing::new(&mentors, &mentees, &mut rng).unwrap_or_else(|e| {
        error!("Failed to build pairing engine: {}", e);
        panic!("Pairing error: {}", e);
    });

    let matching = pairing.run();
    log_pairs(matching);

    let rows = reports(matching);
    match serde_json::to_string_pretty(&rows) {
        Ok(json) => println!("{json}"),
        Err(e) => error!("Failed to serialize report: {}", e),
    }
}
