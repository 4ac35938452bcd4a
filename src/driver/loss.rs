//! Synthetic loss curves for the demo driver.

use crate::action::Hyperparameters;

/// A deterministic loss model the demo driver evaluates per epoch.
///
/// Real deployments report losses from actual training jobs; the demo
/// substitutes an analytic curve so scenarios stay reproducible.
pub trait LossCurve {
    /// Name of the reported loss series.
    fn loss_name(&self) -> &str;

    /// Loss at `epoch` (1-based) for an experiment with `hyperparams`.
    fn epoch_loss(&self, epoch: u32, hyperparams: &Hyperparameters) -> f64;
}

/// Convex curve over `log10(learning_rate)` with a decaying epoch term.
///
/// The asymptote is minimized near `lr = 10^0.004`, so ranking by loss
/// prefers learning rates close to 1. Experiments launched without a
/// learning rate fall back to `1e-2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadraticLogLoss;

impl LossCurve for QuadraticLogLoss {
    fn loss_name(&self) -> &str {
        "val_loss"
    }

    fn epoch_loss(&self, epoch: u32, hyperparams: &Hyperparameters) -> f64 {
        let lr = hyperparams.learning_rate.unwrap_or(1e-2);
        let asymptote = 0.1 + 0.1 * (lr.log10() - 0.004).powi(2);
        0.7 * (0.01 * f64::from(epoch) + 1.0).powi(-2) + asymptote
    }
}
