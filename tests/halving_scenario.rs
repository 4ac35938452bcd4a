//! End-to-end successive-halving scenarios, driven event by event.

use serde_json::json;
use std::path::PathBuf;
use tunewise::coordinator::Coordinator;
use tunewise::driver::{DemoDriver, QuadraticLogLoss};
use tunewise::log::{EventLog, JsonFileLog, LogRecord, MemoryLog};
use tunewise::machine::{MachineFactory, StepResult};
use tunewise::strategy::{successive_halving, SearchState};
use tunewise::trigger::TriggerKind;
use tunewise::Interface;

fn loss_payload(exp_id: &str, epoch: u32, loss_value: f64) -> serde_json::Value {
    json!({
        "exp_id": exp_id,
        "epoch": epoch,
        "loss_name": "val_loss",
        "loss_value": loss_value,
    })
}

fn temp_log_path() -> PathBuf {
    std::env::temp_dir().join(format!("tunewise-scenario-{}.jsonl", uuid::Uuid::new_v4()))
}

#[test]
fn population_of_four_halves_on_schedule() {
    let factory = MachineFactory::new(successive_halving::definition().unwrap());
    let mut log = MemoryLog::new();
    let mut interface = Interface::new(DemoDriver::new(QuadraticLogLoss));
    let mut machine = factory.build(&mut log).unwrap();

    machine
        .handle_event(
            TriggerKind::ReceiveRandomSearchHyperparams,
            json!({ "num_exp": 4, "epoch": 1 }),
            &mut interface,
            &mut log,
        )
        .unwrap();
    machine
        .handle_event(
            TriggerKind::ReceiveHyperparams,
            json!({ "learning_rate": { "low": 1e-4, "high": 1e-1 } }),
            &mut interface,
            &mut log,
        )
        .unwrap();

    let launched: Vec<String> = interface
        .driver()
        .experiments()
        .iter()
        .map(|e| e.exp_id().to_string())
        .collect();
    assert_eq!(launched.len(), 4);
    assert_eq!(machine.current_state(), &SearchState::HyperparamsSet);

    // Baseline reports: the 4th one fires the first halving round. Losses
    // are chosen so launched[2] and launched[0] survive.
    let losses = [0.3, 0.9, 0.1, 0.5];
    for (exp_id, loss) in launched.iter().zip(losses).take(3) {
        let result = machine
            .handle_event(
                TriggerKind::ReceiveTrainingLoss,
                loss_payload(exp_id, 1, loss),
                &mut interface,
                &mut log,
            )
            .unwrap();
        assert!(matches!(result, StepResult::Absorbed { .. }));
    }
    let result = machine
        .handle_event(
            TriggerKind::ReceiveTrainingLoss,
            loss_payload(&launched[3], 1, losses[3]),
            &mut interface,
            &mut log,
        )
        .unwrap();

    assert_eq!(machine.current_state(), &SearchState::HalvingStage);
    assert_eq!(machine.context().state.num_exp, 2);
    assert_eq!(machine.context().state.num_epochs, 4);
    assert_eq!(machine.context().state.total_num_epochs, 5);
    let survivors = match result {
        StepResult::Transitioned { actions, .. } => actions,
        StepResult::Absorbed { .. } => panic!("expected the first halving round"),
    };
    let survivor_ids: Vec<String> = survivors
        .iter()
        .map(|a| match a {
            tunewise::Action::RunExp {
                exp_id, end_epoch, ..
            } => {
                assert_eq!(*end_epoch, 5);
                exp_id.clone()
            }
            tunewise::Action::KillExp { .. } => panic!("unexpected kill"),
        })
        .collect();
    assert_eq!(survivor_ids, vec![launched[2].clone(), launched[0].clone()]);

    // Both survivors report at the target epoch: second round keeps one and
    // aims it at epoch 9.
    machine
        .handle_event(
            TriggerKind::ReceiveTrainingLoss,
            loss_payload(&survivor_ids[0], 5, 0.05),
            &mut interface,
            &mut log,
        )
        .unwrap();
    machine
        .handle_event(
            TriggerKind::ReceiveTrainingLoss,
            loss_payload(&survivor_ids[1], 5, 0.2),
            &mut interface,
            &mut log,
        )
        .unwrap();

    assert_eq!(machine.current_state(), &SearchState::HalvingStage);
    assert_eq!(machine.context().state.num_exp, 1);
    assert_eq!(machine.context().state.total_num_epochs, 9);

    // The lone survivor finishing its run concludes the search.
    let result = machine
        .handle_event(
            TriggerKind::ReceiveTrainingLoss,
            loss_payload(&survivor_ids[0], 9, 0.02),
            &mut interface,
            &mut log,
        )
        .unwrap();

    assert!(matches!(result, StepResult::Transitioned { .. }));
    assert_eq!(machine.current_state(), &SearchState::End);
    assert!(machine.is_final());
    assert_eq!(machine.context().state.num_exp, 0);
}

#[test]
fn rebuilt_machine_resumes_mid_search() {
    let factory = MachineFactory::new(successive_halving::definition().unwrap());
    let mut log = MemoryLog::new();
    let mut interface = Interface::new(DemoDriver::new(QuadraticLogLoss));
    let mut machine = factory.build(&mut log).unwrap();

    machine
        .handle_event(
            TriggerKind::ReceiveRandomSearchHyperparams,
            json!({ "num_exp": 2, "epoch": 1 }),
            &mut interface,
            &mut log,
        )
        .unwrap();
    machine
        .handle_event(
            TriggerKind::ReceiveHyperparams,
            json!({ "learning_rate": { "low": 1e-4, "high": 1e-1 } }),
            &mut interface,
            &mut log,
        )
        .unwrap();
    let launched: Vec<String> = interface
        .driver()
        .experiments()
        .iter()
        .map(|e| e.exp_id().to_string())
        .collect();
    machine
        .handle_event(
            TriggerKind::ReceiveTrainingLoss,
            loss_payload(&launched[0], 1, 0.4),
            &mut interface,
            &mut log,
        )
        .unwrap();

    // Simulated crash: a second process rebuilds from the log alone.
    let rebuilt = factory.build(&mut log).unwrap();
    assert_eq!(rebuilt.current_state(), machine.current_state());
    assert_eq!(rebuilt.context(), machine.context());
    assert_eq!(
        rebuilt.history().transitions().len(),
        machine.history().transitions().len()
    );

    // The rebuilt machine carries the search forward.
    let mut machine = rebuilt;
    machine
        .handle_event(
            TriggerKind::ReceiveTrainingLoss,
            loss_payload(&launched[1], 1, 0.2),
            &mut interface,
            &mut log,
        )
        .unwrap();
    assert_eq!(machine.current_state(), &SearchState::HalvingStage);
    assert_eq!(machine.context().state.num_exp, 1);
    assert_eq!(machine.context().state.total_num_epochs, 5);
}

#[test]
fn replay_does_not_relaunch_experiments() {
    let factory = MachineFactory::new(successive_halving::definition().unwrap());
    let mut log = MemoryLog::new();
    let mut interface = Interface::new(DemoDriver::new(QuadraticLogLoss));
    let mut machine = factory.build(&mut log).unwrap();

    machine
        .handle_event(
            TriggerKind::ReceiveRandomSearchHyperparams,
            json!({ "num_exp": 3, "epoch": 1 }),
            &mut interface,
            &mut log,
        )
        .unwrap();
    machine
        .handle_event(
            TriggerKind::ReceiveHyperparams,
            json!({ "learning_rate": { "low": 1e-4, "high": 1e-1 } }),
            &mut interface,
            &mut log,
        )
        .unwrap();
    assert_eq!(interface.driver().experiments().len(), 3);

    // Rebuilding touches only the log, never the driver.
    let _rebuilt = factory.build(&mut log).unwrap();
    assert_eq!(interface.driver().experiments().len(), 3);
}

#[test]
fn coordinator_runs_eight_to_completion_on_a_file_log() {
    let path = temp_log_path();
    let mut coordinator = Coordinator::new(
        successive_halving::definition().unwrap(),
        DemoDriver::new(QuadraticLogLoss),
        JsonFileLog::new(&path),
    );

    coordinator
        .inject(
            TriggerKind::ReceiveRandomSearchHyperparams,
            json!({ "num_exp": 8, "epoch": 1 }),
        )
        .unwrap();
    coordinator
        .inject(
            TriggerKind::ReceiveHyperparams,
            json!({ "learning_rate": { "low": 1e-4, "high": 1e-1 } }),
        )
        .unwrap();

    while coordinator.advance_time().unwrap().is_some() {}

    let machine = coordinator.machine().unwrap();
    assert_eq!(machine.current_state(), &SearchState::End);
    assert_eq!(machine.context().state.num_exp, 0);

    // Round targets 5, 9 and 17: exactly one experiment trains to 17.
    let experiments = coordinator.driver().experiments();
    assert_eq!(experiments.len(), 8);
    assert_eq!(experiments.iter().filter(|e| e.end_epoch() == 17).count(), 1);
    assert_eq!(experiments.iter().filter(|e| e.end_epoch() == 9).count(), 1);
    assert_eq!(experiments.iter().filter(|e| e.end_epoch() == 5).count(), 2);

    let records: Vec<LogRecord<SearchState>> = coordinator.log().records().unwrap();
    assert!(!records.is_empty());
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn duplicate_baseline_reports_can_fire_a_round_early() {
    // Loss aggregation counts reports, not distinct experiments; a driver
    // re-reporting the same epoch inflates the count.
    let factory = MachineFactory::new(successive_halving::definition().unwrap());
    let mut log = MemoryLog::new();
    let mut interface = Interface::new(DemoDriver::new(QuadraticLogLoss));
    let mut machine = factory.build(&mut log).unwrap();

    machine
        .handle_event(
            TriggerKind::ReceiveRandomSearchHyperparams,
            json!({ "num_exp": 2, "epoch": 1 }),
            &mut interface,
            &mut log,
        )
        .unwrap();
    machine
        .handle_event(
            TriggerKind::ReceiveHyperparams,
            json!({ "learning_rate": { "low": 1e-4, "high": 1e-1 } }),
            &mut interface,
            &mut log,
        )
        .unwrap();

    let exp_id = interface.driver().experiments()[0].exp_id().to_string();
    machine
        .handle_event(
            TriggerKind::ReceiveTrainingLoss,
            loss_payload(&exp_id, 1, 0.4),
            &mut interface,
            &mut log,
        )
        .unwrap();
    let result = machine
        .handle_event(
            TriggerKind::ReceiveTrainingLoss,
            loss_payload(&exp_id, 1, 0.4),
            &mut interface,
            &mut log,
        )
        .unwrap();

    assert!(matches!(result, StepResult::Transitioned { .. }));
    assert_eq!(machine.current_state(), &SearchState::HalvingStage);
}

#[test]
fn training_loss_reports_merge_regardless_of_exp_id() {
    // Reports are trusted as-is; unknown experiment ids still count.
    let factory = MachineFactory::new(successive_halving::definition().unwrap());
    let mut log = MemoryLog::new();
    let mut interface = Interface::new(DemoDriver::new(QuadraticLogLoss));
    let mut machine = factory.build(&mut log).unwrap();

    let result = machine
        .handle_event(
            TriggerKind::ReceiveTrainingLoss,
            loss_payload("never-launched", 1, 0.4),
            &mut interface,
            &mut log,
        )
        .unwrap();

    assert!(matches!(result, StepResult::Absorbed { .. }));
    assert_eq!(machine.context().training_loss.len(), 1);
}
