//! Run the single-shot random-search baseline against the demo driver.

use serde_json::json;
use tunewise::coordinator::Coordinator;
use tunewise::driver::{DemoDriver, QuadraticLogLoss};
use tunewise::log::MemoryLog;
use tunewise::strategy::{random_search, SearchState};
use tunewise::trigger::TriggerKind;
use tunewise::State;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut coordinator = Coordinator::new(
        random_search::definition()?,
        DemoDriver::new(QuadraticLogLoss),
        MemoryLog::<SearchState>::new(),
    );

    coordinator.inject(
        TriggerKind::ReceiveRandomSearchHyperparams,
        json!({ "num_exp": 4, "epoch": 1 }),
    )?;
    coordinator.inject(
        TriggerKind::ReceiveHyperparams,
        json!({ "learning_rate": { "low": 1e-4, "high": 1e-1 } }),
    )?;

    while coordinator.advance_time()?.is_some() {}

    let machine = coordinator.machine()?;
    println!("final state: {}", machine.current_state().name());
    for report in &machine.context().training_loss {
        println!(
            "  {} epoch {}: {} = {:.4}",
            report.exp_id, report.epoch, report.loss_name, report.loss_value
        );
    }
    Ok(())
}
