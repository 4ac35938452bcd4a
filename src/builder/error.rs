//! Build errors for strategy definition and transition builders.

use thiserror::Error;

/// Errors that can occur when building strategy definitions and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("No transitions declared. Add at least one transition")]
    NoTransitions,

    #[error("Transition source state not specified. Call .from(state)")]
    MissingSourceState,

    #[error("Transition destination state not specified. Call .to(state)")]
    MissingDestState,

    #[error("Transition trigger kind not specified. Call .on(kind)")]
    MissingTriggerKind,

    #[error("Transition hook not specified. Call .hook(f) or .no_op()")]
    MissingHook,
}
