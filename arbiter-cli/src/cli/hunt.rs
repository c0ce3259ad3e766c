use std::path::PathBuf;

use clap::Parser;

use crate::{
    cli::{ScenarioArgs, SolverArgs},
    core::{extract::ResultExtractor, model::ModelBuilder, solver::solve},
    export::export,
    prelude::*,
    tables::{build_dispatch_table, build_running_hours_table, build_summary_table},
};

#[derive(Parser)]
pub struct HuntArgs {
    #[clap(flatten)]
    pub scenario: ScenarioArgs,

    #[clap(flatten)]
    pub solver: SolverArgs,

    /// Write `dispatch.csv` and `summary.csv` into the directory.
    #[clap(long, env = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,
}

impl HuntArgs {
    #[instrument(skip_all)]
    pub fn run(self) -> Result {
        let mut scenario = self.scenario.load()?;
        self.solver.apply(&mut scenario.solver);

        let grid = scenario.time_grid().context("failed to lay out the time grid")?;
        let series = scenario.operation_series(&grid).context("failed to align the series")?;
        let parameters = scenario.storage_parameters().context("incomplete storage parameters")?;
        parameters.validate().context("invalid storage parameters")?;

        let model = ModelBuilder::builder()
            .grid(&grid)
            .series(&series)
            .parameters(parameters)
            .big_m(scenario.model.big_m)
            .build()
            .formulate()
            .context("failed to build the model")?;
        let backend = scenario.solver.into_backend()?;
        let outcome = solve(&model.description, &backend)
            .inspect_err(|error| {
                if let Some(solver_time) = error.solver_time() {
                    error!(?solver_time, "the solver gave up");
                }
            })
            .context("no optimal dispatch is found")?;

        let (dispatch, summary) = ResultExtractor::builder()
            .grid(&grid)
            .model(&model)
            .series(&series)
            .parameters(parameters)
            .build()
            .extract(&outcome)
            .context("failed to tabulate the solution")?;
        println!("{}", build_dispatch_table(&dispatch));
        println!("{}", build_running_hours_table(&summary));
        println!("{}", build_summary_table(&summary));

        if let Some(output_dir) = &self.output_dir {
            export(output_dir, &dispatch, &summary)?;
        }
        Ok(())
    }
}
