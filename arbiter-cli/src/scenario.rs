//! Scenario file: the horizon, the solver, the storage, and the input series.

use std::{fs, path::Path, time::Duration};

use chrono::{NaiveDateTime, TimeDelta};
use clap::ValueEnum;
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

use crate::{
    core::{
        DispatchError,
        model::BigM,
        series::OperationSeries,
        solver::{Backend, BackendOptions, LocalBackend, LocalSolver, Platform, RemoteBackend},
        storage::{StorageParameters, StorageSection},
        time_grid::TimeGrid,
    },
    prelude::*,
};

#[must_use]
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub horizon: HorizonSection,

    #[serde(default)]
    pub solver: SolverSection,

    #[serde(default)]
    pub storage: StorageSection,

    pub series: SeriesSection,

    #[serde(default)]
    pub model: ModelSection,
}

impl Scenario {
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_path(path: &Path) -> Result<Self> {
        info!("loading…");
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read the scenario from `{}`", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse the scenario `{}`", path.display()))
    }

    pub fn time_grid(&self) -> Result<TimeGrid, DispatchError> {
        TimeGrid::try_new(self.horizon.start, self.horizon.end, self.horizon.interval_minutes)
    }

    /// Series on the grid, step-held when sampled at a different interval.
    ///
    /// Missing load is taken as zero.
    pub fn operation_series(&self, grid: &TimeGrid) -> Result<OperationSeries, DispatchError> {
        let zero_load;
        let load = if self.series.load.is_empty() {
            zero_load = vec![0.0; self.series.price.len()];
            &zero_load
        } else {
            &self.series.load
        };
        match self.series.interval_minutes {
            None => OperationSeries::try_new(grid, &self.series.price, load),
            Some(interval_minutes) => {
                let sample_interval = TimeDelta::try_minutes(interval_minutes).ok_or_else(|| {
                    DispatchError::InvalidHorizon(format!(
                        "series interval of {interval_minutes} minutes overflows"
                    ))
                })?;
                OperationSeries::try_resample(grid, sample_interval, &self.series.price, load)
            }
        }
    }

    pub fn storage_parameters(&self) -> Result<StorageParameters, DispatchError> {
        StorageParameters::try_from(&self.storage)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HorizonSection {
    /// Local time like `2020-01-01T00:00:00`.
    pub start: NaiveDateTime,

    /// Inclusive.
    pub end: NaiveDateTime,

    pub interval_minutes: i64,
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverSection {
    #[serde(default = "SolverSection::default_platform")]
    pub platform: Platform,

    /// Solver name: `microlp` locally, anything the service supports remotely.
    pub name: Option<String>,

    /// Base URL of the remote solver service.
    pub url: Option<String>,

    #[serde(skip)]
    pub token: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    pub poll_interval: Option<humantime::Duration>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    pub request_timeout: Option<humantime::Duration>,

    /// Passed to the remote service verbatim.
    #[serde(default)]
    pub options: BackendOptions,
}

impl Default for SolverSection {
    fn default() -> Self {
        Self {
            platform: Self::default_platform(),
            name: None,
            url: None,
            token: None,
            poll_interval: None,
            request_timeout: None,
            options: BackendOptions::new(),
        }
    }
}

impl SolverSection {
    const fn default_platform() -> Platform {
        Platform::Local
    }

    pub fn into_backend(self) -> Result<Backend> {
        match self.platform {
            Platform::Local => {
                let solver = match self.name.as_deref() {
                    None => LocalSolver::default(),
                    Some(name) => LocalSolver::from_str(name, true)
                        .map_err(|_| anyhow::anyhow!("`{name}` is not available locally"))?,
                };
                if !self.options.is_empty() {
                    warn!(n_options = self.options.len(), "solver options are ignored locally");
                }
                Ok(Backend::Local(LocalBackend { solver }))
            }
            Platform::Remote => {
                let url = self.url.context("the remote solver needs `url`")?;
                let solver = self.name.context("the remote solver needs `name`")?;
                Ok(Backend::Remote(
                    RemoteBackend::builder()
                        .url(url)
                        .solver(solver)
                        .maybe_token(self.token)
                        .maybe_poll_interval(self.poll_interval.map(Duration::from))
                        .maybe_request_timeout(self.request_timeout.map(Duration::from))
                        .options(self.options)
                        .build(),
                ))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeriesSection {
    /// Sampling interval of the series, the grid interval when omitted.
    pub interval_minutes: Option<i64>,

    /// Energy price per kilowatt-hour.
    pub price: Vec<f64>,

    /// Site load in kilowatts.
    #[serde(default)]
    pub load: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSection {
    #[serde(default)]
    pub big_m: BigM,
}
