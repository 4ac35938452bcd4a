//! Single-shot random search.

use crate::action::{Action, Hyperparameters};
use crate::builder::{BuildError, StrategyDefinition, StrategyDefinitionBuilder, TransitionBuilder};
use crate::machine::TransitionError;
use crate::strategy::SearchState;
use crate::trigger::TriggerKind;

/// The strategy graph: wait for the strategy config, then launch one
/// single-epoch experiment per configured slot with a fixed example binding.
///
/// A baseline to compare halving against; it never ranks or relaunches.
pub fn definition() -> Result<StrategyDefinition<SearchState>, BuildError> {
    StrategyDefinitionBuilder::new()
        .initial(SearchState::Init)
        .transition(
            TransitionBuilder::new()
                .from(SearchState::Init)
                .to(SearchState::StrategyHyperparamsSet)
                .on(TriggerKind::ReceiveRandomSearchHyperparams)
                .no_op(),
        )?
        .transition(
            TransitionBuilder::new()
                .from(SearchState::StrategyHyperparamsSet)
                .to(SearchState::HyperparamsSet)
                .on(TriggerKind::ReceiveHyperparams)
                .hook(|ctx| {
                    let config = ctx
                        .strategy
                        .ok_or(TransitionError::IncompleteContext("strategy"))?;

                    let actions = (0..config.num_exp)
                        .map(|i| Action::RunExp {
                            exp_id: format!("rand-{i}"),
                            end_epoch: 1,
                            hyperparams: Hyperparameters {
                                learning_rate: Some(0.01),
                                weight_decay: Some(0.002),
                            },
                        })
                        .collect();
                    Ok(actions)
                }),
        )?
        .build()
}
