//! Successive halving over a randomly sampled initial population.
//!
//! Launch `num_exp` experiments with learning rates drawn from the configured
//! range, then repeatedly keep the better half and double their epoch budget
//! until one survivor remains. Ranking is by ascending loss at the round's
//! target epoch; survivors are resumed with their hyperparameters unchanged.

use crate::action::{Action, Hyperparameters};
use crate::builder::{BuildError, StrategyDefinition, StrategyDefinitionBuilder, TransitionBuilder};
use crate::core::AggregatedContext;
use crate::machine::TransitionError;
use crate::strategy::SearchState;
use crate::trigger::TriggerKind;
use rand::Rng;

/// All launched experiments have reported at the baseline epoch.
fn rand_exp_finished(ctx: &AggregatedContext) -> bool {
    ctx.strategy
        .is_some_and(|config| ctx.loss_count_at(config.epoch) >= ctx.state.num_exp as usize)
}

/// The current round's survivors have all reported at the target epoch.
fn exp_finished(ctx: &AggregatedContext) -> bool {
    ctx.loss_count_at(ctx.state.total_num_epochs) >= ctx.state.num_exp as usize
}

fn set_num_exp(ctx: &mut AggregatedContext) -> Result<Vec<Action>, TransitionError> {
    let config = ctx
        .strategy
        .ok_or(TransitionError::IncompleteContext("strategy"))?;
    ctx.state.num_exp = config.num_exp;
    ctx.state.total_num_epochs = config.epoch;
    Ok(Vec::new())
}

/// Launch the initial population with sampled learning rates.
fn run_rand_search(ctx: &mut AggregatedContext) -> Result<Vec<Action>, TransitionError> {
    let config = ctx
        .strategy
        .ok_or(TransitionError::IncompleteContext("strategy"))?;
    let spec = ctx
        .hyperparams
        .ok_or(TransitionError::IncompleteContext("hyperparams"))?;

    ctx.state.num_epochs = 2;
    ctx.state.num_exp = config.num_exp;

    let range = spec.learning_rate;
    let mut rng = rand::thread_rng();
    let actions = (0..config.num_exp)
        .map(|_| Action::RunExp {
            exp_id: uuid::Uuid::new_v4().to_string(),
            end_epoch: ctx.state.num_epochs,
            hyperparams: Hyperparameters::fresh(rng.gen_range(range.low..=range.high)),
        })
        .collect();
    Ok(actions)
}

/// First halving round: rank at the baseline epoch, then aim the survivors
/// at `doubled counter + baseline`.
fn enter_half_search(ctx: &mut AggregatedContext) -> Result<Vec<Action>, TransitionError> {
    let config = ctx
        .strategy
        .ok_or(TransitionError::IncompleteContext("strategy"))?;

    ctx.state.num_exp /= 2;
    let survivors = ctx.top_experiments(ctx.state.num_exp as usize, config.epoch);

    ctx.state.num_epochs *= 2;
    ctx.state.total_num_epochs = ctx.state.num_epochs + config.epoch;

    Ok(resume_survivors(survivors, ctx.state.total_num_epochs))
}

/// Subsequent rounds: rank at the current target, advance the target by the
/// pre-doubling counter, then double it.
fn run_half_search(ctx: &mut AggregatedContext) -> Result<Vec<Action>, TransitionError> {
    ctx.state.num_exp /= 2;
    let survivors = ctx.top_experiments(ctx.state.num_exp as usize, ctx.state.total_num_epochs);

    ctx.state.total_num_epochs += ctx.state.num_epochs;
    ctx.state.num_epochs *= 2;

    Ok(resume_survivors(survivors, ctx.state.total_num_epochs))
}

/// No half left to run; the machine parks in its final state.
fn finish_search(ctx: &mut AggregatedContext) -> Result<Vec<Action>, TransitionError> {
    ctx.state.num_exp = 0;
    Ok(Vec::new())
}

fn resume_survivors(survivors: Vec<String>, end_epoch: u32) -> Vec<Action> {
    survivors
        .into_iter()
        .map(|exp_id| Action::RunExp {
            exp_id,
            end_epoch,
            hyperparams: Hyperparameters::resume(),
        })
        .collect()
}

/// The successive-halving strategy graph.
///
/// The terminating transition is declared before the halving self-loop so
/// that a final round with at most one survivor ends the search instead of
/// halving to zero.
pub fn definition() -> Result<StrategyDefinition<SearchState>, BuildError> {
    StrategyDefinitionBuilder::new()
        .initial(SearchState::Init)
        .transition(
            TransitionBuilder::new()
                .from(SearchState::Init)
                .to(SearchState::StrategyHyperparamsSet)
                .on(TriggerKind::ReceiveRandomSearchHyperparams)
                .hook(set_num_exp),
        )?
        .transition(
            TransitionBuilder::new()
                .from(SearchState::StrategyHyperparamsSet)
                .to(SearchState::HyperparamsSet)
                .on(TriggerKind::ReceiveHyperparams)
                .hook(run_rand_search),
        )?
        .transition(
            TransitionBuilder::new()
                .from(SearchState::HyperparamsSet)
                .to(SearchState::HalvingStage)
                .on(TriggerKind::ReceiveTrainingLoss)
                .when(rand_exp_finished)
                .hook(enter_half_search),
        )?
        .transition(
            TransitionBuilder::new()
                .from(SearchState::HalvingStage)
                .to(SearchState::End)
                .on(TriggerKind::ReceiveTrainingLoss)
                .when(|ctx| exp_finished(ctx) && ctx.state.num_exp <= 1)
                .hook(finish_search),
        )?
        .transition(
            TransitionBuilder::new()
                .from(SearchState::HalvingStage)
                .to(SearchState::HalvingStage)
                .on(TriggerKind::ReceiveTrainingLoss)
                .when(exp_finished)
                .hook(run_half_search),
        )?
        .build()
}
