mod local;
mod remote;

use std::{
    collections::BTreeMap,
    fmt::Debug,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};

pub use self::{
    local::{LocalBackend, LocalSolver},
    remote::RemoteBackend,
};
use crate::{
    core::{
        DispatchError,
        model::{ModelDescription, VariableId},
    },
    prelude::*,
};

/// Solved value per variable.
#[must_use]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolvedValues(BTreeMap<VariableId, f64>);

impl SolvedValues {
    #[must_use]
    pub fn get(&self, variable: VariableId) -> Option<f64> {
        self.0.get(&variable).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(VariableId, f64)> for SolvedValues {
    fn from_iter<T: IntoIterator<Item = (VariableId, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    AbnormalTermination { reason: String },
}

/// How a backend finished, before the adapter has timed and classified it.
pub enum Termination {
    Optimal(SolvedValues),
    Infeasible,
    Abnormal(String),
}

/// Result of a single solve attempt.
#[must_use]
#[derive(Clone, Debug)]
pub struct SolveOutcome {
    pub status: SolveStatus,

    /// Objective at the solved point, [`None`] unless optimal.
    pub objective_value: Option<f64>,

    pub elapsed: Duration,
    pub values: SolvedValues,
}

impl SolveOutcome {
    /// Turn the terminal non-optimal statuses into errors.
    pub fn into_optimal(self) -> Result<Self, DispatchError> {
        match &self.status {
            SolveStatus::Optimal => Ok(self),
            SolveStatus::Infeasible => Err(DispatchError::Infeasible { elapsed: self.elapsed }),
            SolveStatus::AbnormalTermination { reason } => Err(DispatchError::AbnormalTermination {
                elapsed: self.elapsed,
                reason: reason.clone(),
            }),
        }
    }
}

/// Something that can take a model description to a terminal status.
pub trait SolverBackend: Debug {
    /// Run exactly one solve, blocking until the backend reports a terminal status.
    fn run(&self, description: &ModelDescription) -> Termination;
}

/// Where the model gets solved.
#[derive(Clone, Debug)]
pub enum Backend {
    Local(LocalBackend),
    Remote(RemoteBackend),
}

impl SolverBackend for Backend {
    fn run(&self, description: &ModelDescription) -> Termination {
        match self {
            Self::Local(backend) => backend.run(description),
            Self::Remote(backend) => backend.run(description),
        }
    }
}

/// Submit the model to the backend, time it, and classify the termination.
///
/// There are no retries: infeasible and abnormal terminations are returned as errors carrying
/// the elapsed time.
#[instrument(skip_all)]
pub fn solve(
    description: &ModelDescription,
    backend: &impl SolverBackend,
) -> Result<SolveOutcome, DispatchError> {
    info!(?backend, n_variables = description.variables().len(), "solving…");
    let start_instant = Instant::now();
    let termination = backend.run(description);
    let elapsed = start_instant.elapsed();

    let outcome = match termination {
        Termination::Optimal(values) => SolveOutcome {
            status: SolveStatus::Optimal,
            objective_value: description.objective().evaluate(|variable| values.get(variable)),
            elapsed,
            values,
        },
        Termination::Infeasible => SolveOutcome {
            status: SolveStatus::Infeasible,
            objective_value: None,
            elapsed,
            values: SolvedValues::default(),
        },
        Termination::Abnormal(reason) => SolveOutcome {
            status: SolveStatus::AbnormalTermination { reason },
            objective_value: None,
            elapsed,
            values: SolvedValues::default(),
        },
    };
    match &outcome.status {
        SolveStatus::Optimal => {
            info!(?elapsed, objective_value = ?outcome.objective_value, "optimal solution found");
        }
        SolveStatus::Infeasible => {
            warn!(?elapsed, "no feasible solution exists");
        }
        SolveStatus::AbnormalTermination { reason } => {
            warn!(?elapsed, %reason, "solver terminated abnormally");
        }
    }
    outcome.into_optimal()
}

/// Backend knobs passed through verbatim, like `integrality` or `time_limit`.
pub type BackendOptions = BTreeMap<String, serde_json::Value>;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Solve in-process.
    #[serde(alias = "Local")]
    Local,

    /// Submit to a remote solver queue.
    #[serde(alias = "Remote", alias = "NEOS", alias = "neos")]
    Remote,
}
