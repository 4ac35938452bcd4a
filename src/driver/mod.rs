//! In-process demo driver backing the interface boundary.
//!
//! Runs no real training: each launched experiment is a counter over a
//! synthetic [`LossCurve`], advanced one epoch at a time in random order to
//! mimic a cluster finishing jobs asynchronously.

pub mod loss;

pub use loss::{LossCurve, QuadraticLogLoss};

use crate::action::Hyperparameters;
use crate::core::TrainingLossReport;
use crate::interface::{Driver, DriverError};
use rand::Rng;

/// One launched experiment: identity, epoch budget, and progress so far.
#[derive(Debug, Clone)]
pub struct DemoExperiment {
    exp_id: String,
    end_epoch: u32,
    hyperparams: Hyperparameters,
    curr_epoch: u32,
}

impl DemoExperiment {
    pub fn exp_id(&self) -> &str {
        &self.exp_id
    }

    pub fn end_epoch(&self) -> u32 {
        self.end_epoch
    }

    pub fn hyperparams(&self) -> &Hyperparameters {
        &self.hyperparams
    }

    pub fn curr_epoch(&self) -> u32 {
        self.curr_epoch
    }

    /// Whether the experiment has exhausted its epoch budget.
    pub fn is_finished(&self) -> bool {
        self.curr_epoch >= self.end_epoch
    }

    /// Run one more epoch and report its loss.
    fn progress<C: LossCurve>(&mut self, curve: &C) -> Result<TrainingLossReport, DriverError> {
        if self.is_finished() {
            return Err(DriverError::AlreadyFinished {
                exp_id: self.exp_id.clone(),
            });
        }

        self.curr_epoch += 1;
        Ok(TrainingLossReport {
            exp_id: self.exp_id.clone(),
            epoch: self.curr_epoch,
            loss_name: curve.loss_name().to_string(),
            loss_value: curve.epoch_loss(self.curr_epoch, &self.hyperparams),
        })
    }
}

/// Demo driver: a pool of synthetic experiments advanced in random order.
pub struct DemoDriver<C: LossCurve> {
    curve: C,
    experiments: Vec<DemoExperiment>,
}

impl<C: LossCurve> DemoDriver<C> {
    pub fn new(curve: C) -> Self {
        Self {
            curve,
            experiments: Vec::new(),
        }
    }

    /// Launched experiments, in launch order.
    pub fn experiments(&self) -> &[DemoExperiment] {
        &self.experiments
    }

    fn unfinished_indices(&self) -> Vec<usize> {
        self.experiments
            .iter()
            .enumerate()
            .filter(|(_, exp)| !exp.is_finished())
            .map(|(idx, _)| idx)
            .collect()
    }
}

impl<C: LossCurve> Driver for DemoDriver<C> {
    fn run_exp(
        &mut self,
        exp_id: &str,
        end_epoch: u32,
        hyperparams: &Hyperparameters,
    ) -> Result<(), DriverError> {
        if let Some(existing) = self.experiments.iter_mut().find(|e| e.exp_id == exp_id) {
            // Resumed experiment: extend the budget, keep its hyperparameters.
            if end_epoch < existing.end_epoch {
                return Err(DriverError::InvalidEpochDecrease {
                    exp_id: exp_id.to_string(),
                    current: existing.end_epoch,
                    requested: end_epoch,
                });
            }
            existing.end_epoch = end_epoch;
            return Ok(());
        }

        self.experiments.push(DemoExperiment {
            exp_id: exp_id.to_string(),
            end_epoch,
            hyperparams: *hyperparams,
            curr_epoch: 0,
        });
        Ok(())
    }

    fn advance(&mut self) -> Result<Option<TrainingLossReport>, DriverError> {
        let unfinished = self.unfinished_indices();
        if unfinished.is_empty() {
            return Ok(None);
        }

        let idx = unfinished[rand::thread_rng().gen_range(0..unfinished.len())];
        let report = self.experiments[idx].progress(&self.curve)?;
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_with_no_experiments_is_quiescent() {
        let mut driver = DemoDriver::new(QuadraticLogLoss);
        assert_eq!(driver.advance().unwrap(), None);
    }

    #[test]
    fn each_experiment_reports_once_per_epoch() {
        let mut driver = DemoDriver::new(QuadraticLogLoss);
        driver
            .run_exp("a", 2, &Hyperparameters::fresh(1e-2))
            .unwrap();
        driver
            .run_exp("b", 2, &Hyperparameters::fresh(1e-1))
            .unwrap();

        let mut reports = Vec::new();
        while let Some(report) = driver.advance().unwrap() {
            reports.push(report);
        }

        // 2 experiments x 2 epochs
        assert_eq!(reports.len(), 4);
        for exp_id in ["a", "b"] {
            let epochs: Vec<u32> = reports
                .iter()
                .filter(|r| r.exp_id == exp_id)
                .map(|r| r.epoch)
                .collect();
            assert_eq!(epochs, vec![1, 2]);
        }
    }

    #[test]
    fn relaunch_extends_budget_and_keeps_hyperparams() {
        let mut driver = DemoDriver::new(QuadraticLogLoss);
        driver
            .run_exp("a", 2, &Hyperparameters::fresh(1e-2))
            .unwrap();
        while driver.advance().unwrap().is_some() {}

        driver.run_exp("a", 5, &Hyperparameters::resume()).unwrap();

        let exp = &driver.experiments()[0];
        assert_eq!(exp.end_epoch(), 5);
        assert_eq!(exp.hyperparams().learning_rate, Some(1e-2));
        assert!(!exp.is_finished());
    }

    #[test]
    fn finished_experiment_rejects_further_uploads() {
        let mut driver = DemoDriver::new(QuadraticLogLoss);
        driver
            .run_exp("a", 1, &Hyperparameters::fresh(1e-2))
            .unwrap();
        assert!(driver.advance().unwrap().is_some());

        let exp = &mut driver.experiments[0];
        assert!(exp.is_finished());
        let result = exp.progress(&QuadraticLogLoss);
        assert_eq!(
            result,
            Err(DriverError::AlreadyFinished {
                exp_id: "a".to_string(),
            })
        );
        // The rejected upload does not advance the experiment
        assert_eq!(driver.experiments()[0].curr_epoch(), 1);
    }

    #[test]
    fn shrinking_the_budget_is_rejected() {
        let mut driver = DemoDriver::new(QuadraticLogLoss);
        driver
            .run_exp("a", 5, &Hyperparameters::fresh(1e-2))
            .unwrap();

        let result = driver.run_exp("a", 2, &Hyperparameters::resume());
        assert_eq!(
            result,
            Err(DriverError::InvalidEpochDecrease {
                exp_id: "a".to_string(),
                current: 5,
                requested: 2,
            })
        );
    }

    #[test]
    fn losses_follow_the_curve() {
        let mut driver = DemoDriver::new(QuadraticLogLoss);
        driver
            .run_exp("a", 1, &Hyperparameters::fresh(1e-2))
            .unwrap();

        let report = driver.advance().unwrap().unwrap();
        assert_eq!(report.loss_name, "val_loss");
        let expected = QuadraticLogLoss.epoch_loss(1, &Hyperparameters::fresh(1e-2));
        assert!((report.loss_value - expected).abs() < 1e-12);
    }
}
