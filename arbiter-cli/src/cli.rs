mod burrow;
mod hunt;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    cli::{burrow::BurrowArgs, hunt::HuntArgs},
    core::{model::BigM, solver::Platform},
    prelude::*,
    scenario::{Scenario, SolverSection},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: load the scenario, optimize the dispatch, and report it.
    #[clap(name = "hunt")]
    Hunt(Box<HuntArgs>),

    /// Development tools.
    #[clap(name = "burrow")]
    Burrow(Box<BurrowArgs>),
}

#[derive(Parser)]
pub struct ScenarioArgs {
    /// Scenario TOML file.
    #[clap(long, env = "SCENARIO")]
    scenario: PathBuf,

    /// Override the big-M coefficient of the scenario.
    #[clap(long, env = "BIG_M")]
    big_m: Option<BigM>,
}

impl ScenarioArgs {
    pub fn load(&self) -> Result<Scenario> {
        let mut scenario = Scenario::from_path(&self.scenario)?;
        if let Some(big_m) = self.big_m {
            scenario.model.big_m = big_m;
        }
        Ok(scenario)
    }
}

#[derive(Parser)]
pub struct SolverArgs {
    /// Override the solver platform of the scenario.
    #[clap(long, env = "SOLVER_PLATFORM")]
    platform: Option<Platform>,

    /// Override the solver name of the scenario.
    #[clap(long, env = "SOLVER_NAME")]
    solver_name: Option<String>,

    /// Override the remote solver service URL of the scenario.
    #[clap(long, env = "REMOTE_SOLVER_URL")]
    remote_url: Option<String>,

    /// Bearer token of the remote solver service.
    #[clap(long, env = "REMOTE_SOLVER_TOKEN", hide_env_values = true)]
    remote_token: Option<String>,
}

impl SolverArgs {
    pub fn apply(self, section: &mut SolverSection) {
        if let Some(platform) = self.platform {
            section.platform = platform;
        }
        if let Some(solver_name) = self.solver_name {
            section.name = Some(solver_name);
        }
        if let Some(remote_url) = self.remote_url {
            section.url = Some(remote_url);
        }
        section.token = self.remote_token;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_overrides() -> Result {
        let args = Args::try_parse_from([
            "arbiter",
            "hunt",
            "--scenario",
            "scenario.toml",
            "--platform",
            "remote",
            "--remote-url",
            "http://localhost:8080",
            "--big-m",
            "generous",
        ])?;
        let Command::Hunt(hunt) = args.command else {
            panic!("expected `hunt`");
        };
        assert_eq!(hunt.scenario.big_m, Some(BigM::Generous));
        let mut section = SolverSection::default();
        hunt.solver.apply(&mut section);
        assert_eq!(section.platform, Platform::Remote);
        assert_eq!(section.url.as_deref(), Some("http://localhost:8080"));
        assert!(section.name.is_none());
        Ok(())
    }
}
