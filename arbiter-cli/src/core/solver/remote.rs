use std::{
    fmt::{Debug, Formatter},
    thread::sleep,
    time::Duration,
};

use bon::Builder;

use super::{BackendOptions, SolvedValues, SolverBackend, Termination};
use crate::{
    api::remote_solver::{Client, JobReport, JobRequest, JobStatus},
    core::model::ModelDescription,
    prelude::*,
};

/// Ships the model to a remote solver queue and waits for the verdict.
#[derive(Clone, Builder)]
pub struct RemoteBackend {
    #[builder(into)]
    url: String,

    /// Solver the service should run, like `cbc` or `highs`.
    #[builder(into)]
    solver: String,

    #[builder(into)]
    token: Option<String>,

    #[builder(default = Duration::from_secs(5))]
    poll_interval: Duration,

    #[builder(default = Duration::from_secs(30))]
    request_timeout: Duration,

    #[builder(default)]
    options: BackendOptions,
}

impl Debug for RemoteBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteBackend")
            .field("url", &self.url)
            .field("solver", &self.solver)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl RemoteBackend {
    fn wait_for_report(&self, description: &ModelDescription) -> Result<JobReport> {
        let client = Client::new(&self.url, self.token.clone(), self.request_timeout);
        let ticket = client.submit(&JobRequest {
            solver: &self.solver,
            options: &self.options,
            model: description,
        })?;
        loop {
            let report = client.get_report(&ticket.id)?;
            if report.status.is_terminal() {
                return Ok(report);
            }
            debug!(status = ?report.status, poll_interval = ?self.poll_interval, "waiting…");
            sleep(self.poll_interval);
        }
    }
}

impl SolverBackend for RemoteBackend {
    #[instrument(skip_all, fields(url = %self.url, solver = %self.solver))]
    fn run(&self, description: &ModelDescription) -> Termination {
        match self.wait_for_report(description) {
            Ok(report) => classify(description, report),
            Err(error) => Termination::Abnormal(format!("{error:#}")),
        }
    }
}

/// Map the terminal report onto the termination, resolving the variable names.
fn classify(description: &ModelDescription, report: JobReport) -> Termination {
    debug!(status = ?report.status, objective = ?report.objective, "the job is finished");
    match report.status {
        JobStatus::Optimal => {
            let variable_ids = description.variable_ids();
            Termination::Optimal(
                report
                    .values
                    .into_iter()
                    .filter_map(|(name, value)| {
                        let variable = variable_ids.get(name.as_str()).copied();
                        if variable.is_none() {
                            warn!(%name, "the service returned an unknown variable");
                        }
                        Some((variable?, value))
                    })
                    .collect::<SolvedValues>(),
            )
        }
        JobStatus::Infeasible => Termination::Infeasible,
        status => Termination::Abnormal(report.message.map_or_else(
            || format!("the job finished with status `{status:?}`"),
            |message| format!("the job finished with status `{status:?}`: {message}"),
        )),
    }
}
