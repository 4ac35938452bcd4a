//! Run a successive-halving search against the demo driver.
//!
//! The event log is written to `halving-log.jsonl` (or the path given as the
//! first argument). Re-running against an existing log resumes from it
//! instead of starting a new search.

use serde_json::json;
use tunewise::coordinator::Coordinator;
use tunewise::driver::{DemoDriver, QuadraticLogLoss};
use tunewise::log::JsonFileLog;
use tunewise::strategy::successive_halving;
use tunewise::trigger::TriggerKind;
use tunewise::State;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "halving-log.jsonl".to_string());
    let mut coordinator = Coordinator::new(
        successive_halving::definition()?,
        DemoDriver::new(QuadraticLogLoss),
        JsonFileLog::new(path),
    );

    coordinator.inject(
        TriggerKind::ReceiveRandomSearchHyperparams,
        json!({ "num_exp": 8, "epoch": 1 }),
    )?;
    coordinator.inject(
        TriggerKind::ReceiveHyperparams,
        json!({ "learning_rate": { "low": 1e-4, "high": 1e-1 } }),
    )?;

    while coordinator.advance_time()?.is_some() {}

    let machine = coordinator.machine()?;
    println!("final state: {}", machine.current_state().name());
    let target = machine.context().state.total_num_epochs;
    if let Some(best) = machine.context().top_experiments(1, target).first() {
        println!("best experiment: {best}");
    }
    for exp in coordinator.driver().experiments() {
        println!(
            "  {} trained to epoch {} of {}",
            exp.exp_id(),
            exp.curr_epoch(),
            exp.end_epoch()
        );
    }
    Ok(())
}
