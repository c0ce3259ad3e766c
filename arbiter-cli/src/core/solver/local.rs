use good_lp::{
    Expression,
    IntoAffineExpression,
    ProblemVariables,
    ResolutionError,
    Solution,
    SolverModel,
    constraint,
    microlp,
    variable,
};
use serde::{Deserialize, Serialize};

use super::{SolvedValues, SolverBackend, Termination};
use crate::{
    core::model::{Domain, LinearExpression, ModelDescription, Relation, Sense, VariableId},
    prelude::*,
};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LocalSolver {
    /// Pure-Rust branch-and-bound over the simplex method.
    #[default]
    Microlp,
}

/// Solves the model in-process, blocking the calling thread.
#[derive(Copy, Clone, Debug, Default)]
pub struct LocalBackend {
    pub solver: LocalSolver,
}

impl SolverBackend for LocalBackend {
    fn run(&self, description: &ModelDescription) -> Termination {
        let mut problem_variables = ProblemVariables::new();
        let variables: Vec<good_lp::Variable> = description
            .variables()
            .iter()
            .map(|definition| {
                let declaration = variable().name(definition.name.clone());
                problem_variables.add(match definition.domain {
                    Domain::Continuous { min, max: Some(max) } => declaration.min(min).max(max),
                    Domain::Continuous { min, max: None } => declaration.min(min),
                    Domain::Binary => declaration.binary(),
                })
            })
            .collect();

        let objective = to_expression(description.objective(), &variables);
        let unsolved = match description.sense() {
            Sense::Maximize => problem_variables.maximise(objective),
            Sense::Minimize => problem_variables.minimise(objective),
        };
        let problem = match self.solver {
            LocalSolver::Microlp => unsolved.using(microlp),
        };
        let problem = description.constraints().iter().fold(problem, |problem, constraint| {
            let lhs = to_expression(&constraint.lhs, &variables);
            problem.with(match constraint.relation {
                Relation::LessOrEqual => constraint::leq(lhs, constraint.rhs),
                Relation::Equal => constraint::eq(lhs, constraint.rhs),
                Relation::GreaterOrEqual => constraint::geq(lhs, constraint.rhs),
            })
        });

        debug!(n_constraints = description.constraints().len(), "handing over to the solver…");
        match problem.solve() {
            Ok(solution) => Termination::Optimal(
                variables
                    .iter()
                    .enumerate()
                    .map(|(index, variable)| (VariableId(index), solution.value(*variable)))
                    .collect::<SolvedValues>(),
            ),
            Err(ResolutionError::Infeasible) => Termination::Infeasible,
            Err(error) => Termination::Abnormal(error.to_string()),
        }
    }
}

fn to_expression(expression: &LinearExpression, variables: &[good_lp::Variable]) -> Expression {
    expression.terms.iter().fold(
        expression.constant.into_expression(),
        |sum, (variable, coefficient)| sum + *coefficient * variables[variable.0],
    )
}
