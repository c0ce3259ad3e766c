//! Client of a remote solver queue.
//!
//! A job is submitted with `POST {url}/jobs` and then polled with `GET {url}/jobs/{id}` until
//! the service reports a terminal status.

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};
use ureq::Agent;

use crate::{
    core::{model::ModelDescription, solver::BackendOptions},
    prelude::*,
};

pub struct Client {
    agent: Agent,
    url: String,
    token: Option<String>,
}

impl Client {
    pub fn new(url: &str, token: Option<String>, request_timeout: Duration) -> Self {
        let agent = Agent::config_builder().timeout_global(Some(request_timeout)).build().into();
        Self { agent, url: url.trim_end_matches('/').to_owned(), token }
    }

    #[instrument(skip_all, fields(url = %self.url, solver = request.solver))]
    pub fn submit(&self, request: &JobRequest<'_>) -> Result<JobTicket> {
        info!("submitting…");
        let mut post = self.agent.post(format!("{}/jobs", self.url));
        if let Some(token) = &self.token {
            post = post.header("Authorization", format!("Bearer {token}"));
        }
        let ticket = post
            .send_json(request)
            .with_context(|| format!("failed to submit the job to `{}`", self.url))?
            .body_mut()
            .read_json::<JobTicket>()
            .context("failed to deserialize the job ticket")?;
        info!(id = %ticket.id, "submitted");
        Ok(ticket)
    }

    #[instrument(skip_all, fields(id = id))]
    pub fn get_report(&self, id: &str) -> Result<JobReport> {
        let mut get = self.agent.get(format!("{}/jobs/{id}", self.url));
        if let Some(token) = &self.token {
            get = get.header("Authorization", format!("Bearer {token}"));
        }
        let report = get
            .call()
            .with_context(|| format!("failed to poll job `{id}`"))?
            .body_mut()
            .read_json::<JobReport>()
            .with_context(|| format!("failed to deserialize the status of job `{id}`"))?;
        debug!(status = ?report.status);
        Ok(report)
    }
}

#[derive(Serialize)]
pub struct JobRequest<'a> {
    pub solver: &'a str,
    pub options: &'a BackendOptions,
    pub model: &'a ModelDescription,
}

#[derive(Deserialize)]
pub struct JobTicket {
    pub id: String,
}

#[must_use]
#[derive(Clone, Debug, Deserialize)]
pub struct JobReport {
    pub status: JobStatus,

    #[serde(default)]
    pub objective: Option<f64>,

    /// Solved values keyed by variable name.
    #[serde(default)]
    pub values: BTreeMap<String, f64>,

    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Optimal,
    Infeasible,
    Unbounded,
    Error,
    Timeout,

    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Whether the service is done with the job.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Queued | Self::Running)
    }
}
