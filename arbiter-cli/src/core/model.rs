//! Backend-neutral description of a mixed-integer linear program.

mod builder;

use std::{
    collections::HashMap,
    fmt::{Display, Formatter},
};

use serde::{Deserialize, Serialize};

pub use self::builder::{BigM, DispatchModel, ModelBuilder};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableId(pub usize);

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Domain {
    Continuous { min: f64, max: Option<f64> },
    Binary,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub domain: Domain,
}

/// `constant + Σ coefficient · variable`.
#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpression {
    pub terms: Vec<(VariableId, f64)>,
    pub constant: f64,
}

impl LinearExpression {
    pub fn with_term(mut self, variable: VariableId, coefficient: f64) -> Self {
        self.terms.push((variable, coefficient));
        self
    }

    /// Summed coefficient of the variable, zero when absent.
    #[must_use]
    pub fn coefficient(&self, variable: VariableId) -> f64 {
        self.terms
            .iter()
            .filter(|(id, _)| *id == variable)
            .map(|(_, coefficient)| coefficient)
            .sum()
    }

    /// Value of the expression, or [`None`] if any variable has no value.
    #[must_use]
    pub fn evaluate(&self, value_of: impl Fn(VariableId) -> Option<f64>) -> Option<f64> {
        self.terms.iter().try_fold(self.constant, |sum, (variable, coefficient)| {
            Some(sum + coefficient * value_of(*variable)?)
        })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Relation {
    #[serde(rename = "<=")]
    LessOrEqual,

    #[serde(rename = "=")]
    Equal,

    #[serde(rename = ">=")]
    GreaterOrEqual,
}

impl Display for Relation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LessOrEqual => write!(f, "<="),
            Self::Equal => write!(f, "="),
            Self::GreaterOrEqual => write!(f, ">="),
        }
    }
}

/// `lhs <relation> rhs`, named after its family and time index, like `soc_balance[3]`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub lhs: LinearExpression,
    pub relation: Relation,
    pub rhs: f64,
}

impl Constraint {
    /// Check the constraint against solved values.
    #[must_use]
    pub fn is_satisfied(
        &self,
        value_of: impl Fn(VariableId) -> Option<f64>,
        tolerance: f64,
    ) -> Option<bool> {
        let lhs = self.lhs.evaluate(value_of)?;
        Some(match self.relation {
            Relation::LessOrEqual => lhs <= self.rhs + tolerance,
            Relation::Equal => (lhs - self.rhs).abs() <= tolerance,
            Relation::GreaterOrEqual => lhs >= self.rhs - tolerance,
        })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sense {
    Maximize,
    Minimize,
}

/// Immutable model handed over to a solver backend.
///
/// Only [`ModelBuilder`] assembles it, afterwards it is read-only.
#[must_use]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelDescription {
    sense: Sense,
    objective: LinearExpression,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
}

impl ModelDescription {
    const fn new(sense: Sense) -> Self {
        Self {
            sense,
            objective: LinearExpression { terms: Vec::new(), constant: 0.0 },
            variables: Vec::new(),
            constraints: Vec::new(),
        }
    }

    fn add_variable(&mut self, name: String, domain: Domain) -> VariableId {
        self.variables.push(Variable { name, domain });
        VariableId(self.variables.len() - 1)
    }

    fn add_constraint(
        &mut self,
        name: String,
        lhs: LinearExpression,
        relation: Relation,
        rhs: f64,
    ) {
        self.constraints.push(Constraint { name, lhs, relation, rhs });
    }

    #[must_use]
    pub const fn sense(&self) -> Sense {
        self.sense
    }

    pub const fn objective(&self) -> &LinearExpression {
        &self.objective
    }

    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    #[must_use]
    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id.0]
    }

    /// Variable lookup by name.
    #[must_use]
    pub fn variable_ids(&self) -> HashMap<&str, VariableId> {
        self.variables
            .iter()
            .enumerate()
            .map(|(index, variable)| (variable.name.as_str(), VariableId(index)))
            .collect()
    }

    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    #[must_use]
    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|constraint| constraint.name == name)
    }

    #[must_use]
    pub fn n_binaries(&self) -> usize {
        self.variables.iter().filter(|variable| variable.domain == Domain::Binary).count()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_evaluate() {
        let expression = LinearExpression { terms: Vec::new(), constant: 1.0 }
            .with_term(VariableId(0), 2.0)
            .with_term(VariableId(1), -0.5);
        let value = expression.evaluate(|id| Some([3.0, 4.0][id.0]));
        assert_abs_diff_eq!(value.unwrap(), 5.0);
    }

    #[test]
    fn test_evaluate_missing_value() {
        let expression = LinearExpression::default().with_term(VariableId(7), 1.0);
        assert!(expression.evaluate(|_| None).is_none());
    }

    #[test]
    fn test_coefficient() {
        let expression = LinearExpression::default()
            .with_term(VariableId(0), 2.0)
            .with_term(VariableId(0), 0.5)
            .with_term(VariableId(1), -1.0);
        assert_abs_diff_eq!(expression.coefficient(VariableId(0)), 2.5);
        assert_abs_diff_eq!(expression.coefficient(VariableId(2)), 0.0);
    }

    #[test]
    fn test_is_satisfied() {
        let constraint = Constraint {
            name: "limit".to_owned(),
            lhs: LinearExpression::default().with_term(VariableId(0), 4.0),
            relation: Relation::LessOrEqual,
            rhs: 10.0,
        };
        assert_eq!(constraint.is_satisfied(|_| Some(2.5), 1e-9), Some(true));
        assert_eq!(constraint.is_satisfied(|_| Some(2.6), 1e-9), Some(false));
    }

    #[test]
    fn test_relation_serde() -> serde_json::Result<()> {
        assert_eq!(serde_json::to_string(&Relation::LessOrEqual)?, r#""<=""#);
        assert_eq!(serde_json::from_str::<Relation>(r#"">=""#)?, Relation::GreaterOrEqual);
        Ok(())
    }
}
