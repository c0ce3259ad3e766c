use std::time::Duration;

use thiserror::Error;

/// Everything that stops a dispatch run, by the stage that raised it.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid horizon: {0}")]
    InvalidHorizon(String),

    #[error("storage parameter `{0}` is missing")]
    MissingParameter(&'static str),

    #[error("storage parameter `{name}` is invalid: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("`{series}` has {actual} values, expected {expected}")]
    LengthMismatch { series: &'static str, expected: usize, actual: usize },

    #[error("the model is infeasible, no schedule exists (solver time: {elapsed:.2?})")]
    Infeasible { elapsed: Duration },

    #[error("the solver terminated abnormally: {reason} (solver time: {elapsed:.2?})")]
    AbnormalTermination { elapsed: Duration, reason: String },

    #[error("incomplete solution: {0}")]
    IncompleteSolution(String),
}

impl DispatchError {
    /// Solver wall time for the solver-reported failures.
    #[must_use]
    pub const fn solver_time(&self) -> Option<Duration> {
        match self {
            Self::Infeasible { elapsed } | Self::AbnormalTermination { elapsed, .. } => {
                Some(*elapsed)
            }
            _ => None,
        }
    }
}
