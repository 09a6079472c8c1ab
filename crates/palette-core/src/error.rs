use thiserror::Error;

/// Failure to build a playable puzzle from a rule seed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("rule seed {rule_seed} has no usable palette after {attempts} attempts")]
    Exhausted { rule_seed: i32, attempts: usize },
}

/// Rejected automation input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unsupported command: {0:?}")]
    Unsupported(String),
    #[error("forced solve is not supported")]
    ForcedSolveUnsupported,
}
