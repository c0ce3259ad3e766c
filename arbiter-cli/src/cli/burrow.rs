use clap::{Parser, Subcommand};

use crate::{cli::ScenarioArgs, core::model::ModelBuilder, prelude::*, tables::build_series_table};

#[derive(Parser)]
pub struct BurrowArgs {
    #[command(subcommand)]
    command: BurrowCommand,
}

impl BurrowArgs {
    pub fn run(self) -> Result {
        match self.command {
            BurrowCommand::Grid(args) => args.run_grid(),
            BurrowCommand::Model(args) => args.run_model(),
        }
    }
}

#[derive(Subcommand)]
enum BurrowCommand {
    /// Print the time grid with the series aligned to it.
    Grid(ScenarioArgs),

    /// Dump the model description as JSON.
    Model(ScenarioArgs),
}

impl ScenarioArgs {
    #[instrument(skip_all)]
    fn run_grid(&self) -> Result {
        let scenario = self.load()?;
        let grid = scenario.time_grid()?;
        let series = scenario.operation_series(&grid)?;
        info!(start = %grid.start(), last = %grid.last(), n_intervals = grid.len(), "gotcha");
        println!("{}", build_series_table(&grid, &series));
        Ok(())
    }

    #[instrument(skip_all)]
    fn run_model(&self) -> Result {
        let scenario = self.load()?;
        let grid = scenario.time_grid()?;
        let series = scenario.operation_series(&grid)?;
        let model = ModelBuilder::builder()
            .grid(&grid)
            .series(&series)
            .parameters(scenario.storage_parameters()?)
            .big_m(scenario.model.big_m)
            .build()
            .formulate()?;
        println!("{}", serde_json::to_string_pretty(&model.description)?);
        Ok(())
    }
}
