//! Solved values mapped back onto the time grid.

mod summary;

use arbiter_quantities::{
    cost::Cost,
    energy::KilowattHours,
    power::Kilowatts,
    rate::KilowattHourRate,
};
use bon::Builder;
use chrono::NaiveDateTime;
use serde::Serialize;

pub use self::summary::{Equipment, OperationSummary, RunningHours};
use crate::{
    core::{
        DispatchError,
        model::{DispatchModel, VariableId},
        series::OperationSeries,
        solver::{SolveOutcome, SolveStatus},
        storage::StorageParameters,
        storage_mode::StorageMode,
        time_grid::TimeGrid,
    },
    prelude::*,
};

/// Storage operation within a single interval.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct DispatchRow {
    pub timestamp: NaiveDateTime,
    pub mode: StorageMode,
    pub charge_power: Kilowatts,
    pub discharge_power: Kilowatts,

    /// Site load, passed through from the input.
    pub load: Kilowatts,

    /// Net exchange with the grid, positive when importing.
    pub grid_power: Kilowatts,

    pub price: KilowattHourRate,

    /// Price of the net grid energy, negative when earning.
    pub cost: Cost,

    /// Stored energy at the end of the interval.
    pub storage_level: KilowattHours,

    pub energy_in: KilowattHours,
    pub energy_out: KilowattHours,
}

/// One row per time grid index.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchTable(pub Vec<DispatchRow>);

impl DispatchTable {
    pub fn total_cost(&self) -> Cost {
        self.0.iter().map(|row| row.cost).sum()
    }
}

#[derive(Builder)]
pub struct ResultExtractor<'a> {
    grid: &'a TimeGrid,
    model: &'a DispatchModel,
    series: &'a OperationSeries,
    parameters: StorageParameters,

    /// Flows at or below this many kilowatt-hours count as no flow.
    #[builder(default = 1e-6)]
    tolerance: f64,
}

impl ResultExtractor<'_> {
    /// Tabulate the optimal outcome. Calling it again on the same outcome yields the same tables.
    #[instrument(skip_all, fields(n_intervals = self.grid.len()))]
    pub fn extract(
        &self,
        outcome: &SolveOutcome,
    ) -> Result<(DispatchTable, OperationSummary), DispatchError> {
        if outcome.status != SolveStatus::Optimal {
            return Err(DispatchError::IncompleteSolution(format!(
                "the solve status is {:?}",
                outcome.status,
            )));
        }
        let expected = self.grid.len();
        if self.model.variables.len() != expected {
            return Err(DispatchError::IncompleteSolution(format!(
                "the model covers {} intervals, the grid has {expected}",
                self.model.variables.len(),
            )));
        }
        self.series.ensure_aligned(self.grid)?;

        let value_of = |variable: VariableId| {
            outcome.values.get(variable).ok_or_else(|| {
                DispatchError::IncompleteSolution(format!(
                    "no value for `{}`",
                    self.model.description.variable(variable).name,
                ))
            })
        };
        let intervals_per_hour = self.grid.intervals_per_hour();

        let rows = self
            .grid
            .timestamps()
            .iter()
            .zip(self.model.variables.iter())
            .zip(self.series.price.iter().zip(&self.series.load))
            .map(|((timestamp, step), (price, load))| {
                let energy_in = KilowattHours::from(value_of(step.energy_in)?);
                let energy_out = KilowattHours::from(value_of(step.energy_out)?);
                let storage_level = KilowattHours::from(value_of(step.soc)?);
                let mode = if energy_in.is_negligible(self.tolerance)
                    && energy_out.is_negligible(self.tolerance)
                {
                    StorageMode::Idle
                } else if value_of(step.mode_charge)? > 0.5 {
                    StorageMode::Charge
                } else {
                    StorageMode::Discharge
                };
                // Per-interval energies are scaled to the average power over the interval:
                let charge_power = Kilowatts::from(energy_in.into_inner() * intervals_per_hour);
                let discharge_power = Kilowatts::from(energy_out.into_inner() * intervals_per_hour);
                Ok(DispatchRow {
                    timestamp: *timestamp,
                    mode,
                    charge_power,
                    discharge_power,
                    load: *load,
                    grid_power: charge_power - discharge_power,
                    price: *price,
                    cost: (energy_in - energy_out) * *price,
                    storage_level,
                    energy_in,
                    energy_out,
                })
            })
            .collect::<Result<Vec<_>, DispatchError>>()?;

        let n_violated = self
            .model
            .description
            .constraints()
            .iter()
            .filter(|constraint| {
                constraint.is_satisfied(|variable| outcome.values.get(variable), self.tolerance)
                    == Some(false)
            })
            .count();
        if n_violated != 0 {
            warn!(n_violated, "the solution violates some constraints beyond the tolerance");
        }

        let table = DispatchTable(rows);
        let summary =
            OperationSummary::from_rows(&table.0, self.parameters.power_rating, intervals_per_hour);
        info!(
            total_cost = %table.total_cost(),
            charged = %summary.energy_charged,
            discharged = %summary.energy_discharged,
            "extracted",
        );
        Ok((table, summary))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    use super::*;
    use crate::core::{
        model::ModelBuilder,
        solver::{LocalBackend, SolvedValues, solve},
    };

    struct Fixture {
        grid: TimeGrid,
        series: OperationSeries,
        parameters: StorageParameters,
        model: DispatchModel,
    }

    impl Fixture {
        fn new() -> Result<Self, DispatchError> {
            let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
            let grid = TimeGrid::try_new(
                date.and_hms_opt(0, 0, 0).unwrap(),
                date.and_hms_opt(0, 45, 0).unwrap(),
                15,
            )?;
            let series =
                OperationSeries::try_new(&grid, &[1.0, 2.0, 3.0, 1.0], &[0.5, 0.5, 1.0, 1.0])?;
            let parameters = StorageParameters::builder()
                .power_rating(Kilowatts::from(10.0))
                .energy_capacity(KilowattHours::from(5.0))
                .charge_efficiency(1.0)
                .discharge_efficiency(1.0)
                .soc_low(0.0)
                .soc_high(1.0)
                .build();
            let model = ModelBuilder::builder()
                .grid(&grid)
                .series(&series)
                .parameters(parameters)
                .build()
                .formulate()?;
            Ok(Self { grid, series, parameters, model })
        }

        fn extractor(&self) -> ResultExtractor<'_> {
            ResultExtractor::builder()
                .grid(&self.grid)
                .model(&self.model)
                .series(&self.series)
                .parameters(self.parameters)
                .build()
        }
    }

    #[test]
    fn test_extract_optimal() -> Result<(), DispatchError> {
        let fixture = Fixture::new()?;
        let outcome = solve(&fixture.model.description, &LocalBackend::default())?;
        let (table, summary) = fixture.extractor().extract(&outcome)?;

        assert_eq!(table.0.len(), 4);
        assert_eq!(table.0[0].mode, StorageMode::Charge);
        assert_eq!(table.0[1].mode, StorageMode::Idle);
        assert_eq!(table.0[2].mode, StorageMode::Discharge);
        assert_abs_diff_eq!(table.0[0].charge_power.into_inner(), 10.0, epsilon = 1e-6);
        assert_abs_diff_eq!(table.0[0].grid_power.into_inner(), 10.0, epsilon = 1e-6);
        assert_abs_diff_eq!(table.0[2].grid_power.into_inner(), -10.0, epsilon = 1e-6);
        assert_abs_diff_eq!(table.0[1].storage_level.into_inner(), 2.5, epsilon = 1e-6);
        assert_abs_diff_eq!(table.0[3].load.into_inner(), 1.0);

        assert_abs_diff_eq!(
            table.total_cost().into_inner(),
            -outcome.objective_value.unwrap(),
            epsilon = 1e-6,
        );
        assert_abs_diff_eq!(summary.revenue.into_inner(), 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(summary.energy_charged.into_inner(), 2.5, epsilon = 1e-6);
        for running_hours in &summary.running_hours {
            assert_abs_diff_eq!(running_hours.hours.into_inner(), 0.25, epsilon = 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_extract_is_idempotent() -> Result<(), DispatchError> {
        let fixture = Fixture::new()?;
        let outcome = solve(&fixture.model.description, &LocalBackend::default())?;
        let extractor = fixture.extractor();
        let (first_table, first_summary) = extractor.extract(&outcome)?;
        let (second_table, second_summary) = extractor.extract(&outcome)?;
        assert_eq!(first_table, second_table);
        assert_eq!(first_summary, second_summary);
        Ok(())
    }

    #[test]
    fn test_non_optimal_is_incomplete() -> Result<(), DispatchError> {
        let fixture = Fixture::new()?;
        let outcome = SolveOutcome {
            status: SolveStatus::Infeasible,
            objective_value: None,
            elapsed: Duration::from_millis(10),
            values: SolvedValues::default(),
        };
        assert!(matches!(
            fixture.extractor().extract(&outcome),
            Err(DispatchError::IncompleteSolution(_)),
        ));
        Ok(())
    }

    #[test]
    fn test_missing_value_is_incomplete() -> Result<(), DispatchError> {
        let fixture = Fixture::new()?;
        let missing = fixture.model.variables[3].soc;
        let outcome = SolveOutcome {
            status: SolveStatus::Optimal,
            objective_value: Some(0.0),
            elapsed: Duration::from_millis(10),
            values: (0..fixture.model.description.variables().len())
                .map(VariableId)
                .filter(|variable| *variable != missing)
                .map(|variable| (variable, 0.0))
                .collect(),
        };
        let error = fixture.extractor().extract(&outcome).unwrap_err();
        assert!(matches!(error, DispatchError::IncompleteSolution(_)));
        assert!(error.to_string().contains("soc[3]"));
        Ok(())
    }
}
