use bon::Builder;
use itertools::Itertools;
use serde::Deserialize;

use super::{Domain, LinearExpression, ModelDescription, Relation, Sense, VariableId};
use crate::{
    core::{DispatchError, series::OperationSeries, storage::StorageParameters, time_grid::TimeGrid},
    prelude::*,
};

/// Coefficient of the charge/discharge exclusivity disjunction.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BigM {
    /// Largest feasible flow within one interval, `power_rating · interval`.
    #[default]
    Tight,

    /// A hundred times the power rating.
    Generous,
}

impl BigM {
    #[must_use]
    pub fn value(self, parameters: &StorageParameters, grid: &TimeGrid) -> f64 {
        match self {
            Self::Tight => (parameters.power_rating * grid.interval_hours()).into_inner(),
            Self::Generous => 100.0 * parameters.power_rating.into_inner(),
        }
    }
}

/// Decision variables of a single interval.
#[derive(Copy, Clone, Debug)]
pub struct StepVariables {
    /// Stored energy at the end of the interval, kWh.
    pub soc: VariableId,

    /// Energy drawn from the grid within the interval, kWh.
    pub energy_in: VariableId,

    /// Energy delivered to the grid within the interval, kWh.
    pub energy_out: VariableId,

    pub mode_charge: VariableId,
    pub mode_discharge: VariableId,
}

/// Per-interval variables, indexed like the time grid.
#[derive(Clone, Debug)]
pub struct DecisionVariables(Vec<StepVariables>);

impl DecisionVariables {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepVariables> {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for DecisionVariables {
    type Output = StepVariables;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// The solver-ready description together with the map back onto the time grid.
#[must_use]
pub struct DispatchModel {
    pub description: ModelDescription,
    pub variables: DecisionVariables,
}

/// Formulates the arbitrage problem for one storage over the grid.
#[derive(Builder)]
pub struct ModelBuilder<'a> {
    grid: &'a TimeGrid,
    series: &'a OperationSeries,
    parameters: StorageParameters,

    #[builder(default)]
    big_m: BigM,
}

impl ModelBuilder<'_> {
    /// Build the model: maximize `Σ price · (energy_out − energy_in)` subject to the storage physics.
    ///
    /// Pure: nothing is solved here, and no constraint depends on a variable's value.
    #[instrument(skip_all, fields(n_intervals = self.grid.len()))]
    pub fn formulate(self) -> Result<DispatchModel, DispatchError> {
        self.series.ensure_aligned(self.grid)?;

        let mut description = ModelDescription::new(Sense::Maximize);
        let variables = DecisionVariables(
            (0..self.grid.len())
                .map(|index| Self::add_step_variables(&mut description, index))
                .collect_vec(),
        );

        for (step, price) in variables.iter().zip(&self.series.price) {
            let price = price.into_inner();
            description.objective.terms.push((step.energy_out, price));
            description.objective.terms.push((step.energy_in, -price));
        }

        let intervals_per_hour = self.grid.intervals_per_hour();
        let power_rating = self.parameters.power_rating.into_inner();
        let big_m = self.big_m.value(&self.parameters, self.grid);
        let min_energy = self.parameters.min_energy().into_inner();
        let max_energy = self.parameters.max_energy().into_inner();

        for (index, step) in variables.iter().enumerate() {
            // soc[t] − soc[t−1] − ηc · in[t] + out[t] / ηd = 0, starting from an empty storage:
            let mut balance = LinearExpression::default()
                .with_term(step.soc, 1.0)
                .with_term(step.energy_in, -self.parameters.charge_efficiency)
                .with_term(step.energy_out, 1.0 / self.parameters.discharge_efficiency);
            if let Some(previous) = index.checked_sub(1) {
                balance = balance.with_term(variables[previous].soc, -1.0);
            }
            description.add_constraint(
                format!("soc_balance[{index}]"),
                balance,
                Relation::Equal,
                0.0,
            );

            description.add_constraint(
                format!("soc_min[{index}]"),
                LinearExpression::default().with_term(step.soc, 1.0),
                Relation::GreaterOrEqual,
                min_energy,
            );
            description.add_constraint(
                format!("soc_max[{index}]"),
                LinearExpression::default().with_term(step.soc, 1.0),
                Relation::LessOrEqual,
                max_energy,
            );

            description.add_constraint(
                format!("charge_limit[{index}]"),
                LinearExpression::default().with_term(step.energy_in, intervals_per_hour),
                Relation::LessOrEqual,
                power_rating,
            );
            description.add_constraint(
                format!("discharge_limit[{index}]"),
                LinearExpression::default().with_term(step.energy_out, intervals_per_hour),
                Relation::LessOrEqual,
                power_rating,
            );

            // Charge mode forbids discharging: out[t] ≤ M · (1 − mode_charge[t]).
            description.add_constraint(
                format!("charge_mode[{index}]"),
                LinearExpression::default()
                    .with_term(step.energy_out, 1.0)
                    .with_term(step.mode_charge, big_m),
                Relation::LessOrEqual,
                big_m,
            );
            // Discharge mode forbids charging: in[t] ≤ M · (1 − mode_discharge[t]).
            description.add_constraint(
                format!("discharge_mode[{index}]"),
                LinearExpression::default()
                    .with_term(step.energy_in, 1.0)
                    .with_term(step.mode_discharge, big_m),
                Relation::LessOrEqual,
                big_m,
            );
            description.add_constraint(
                format!("mode_exclusivity[{index}]"),
                LinearExpression::default()
                    .with_term(step.mode_charge, 1.0)
                    .with_term(step.mode_discharge, 1.0),
                Relation::Equal,
                1.0,
            );
        }

        info!(
            n_variables = description.variables().len(),
            n_binaries = description.n_binaries(),
            n_constraints = description.constraints().len(),
            big_m,
            "built the model",
        );
        Ok(DispatchModel { description, variables })
    }

    fn add_step_variables(description: &mut ModelDescription, index: usize) -> StepVariables {
        let non_negative = Domain::Continuous { min: 0.0, max: None };
        StepVariables {
            soc: description.add_variable(format!("soc[{index}]"), non_negative),
            energy_in: description.add_variable(format!("energy_in[{index}]"), non_negative),
            energy_out: description.add_variable(format!("energy_out[{index}]"), non_negative),
            mode_charge: description.add_variable(format!("mode_charge[{index}]"), Domain::Binary),
            mode_discharge: description
                .add_variable(format!("mode_discharge[{index}]"), Domain::Binary),
        }
    }
}
