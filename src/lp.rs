//! Linear-program building blocks over the divisible-allocation polytope.
//!
//! Variables `x[a][o]` hold the fraction of item `o` given to agent `a`.
//! Every program built here includes the unit-item constraints
//! `sum_a x[a][o] = 1` and `0 <= x[a][o] <= 1`.

use crate::error::AllocError;
use crate::instance::Valuations;
use good_lp::{
    variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable,
};

/// Adds one fraction variable per (agent, item) pair.
pub(crate) fn fraction_variables(
    vars: &mut ProblemVariables,
    prefs: &Valuations,
) -> Vec<Vec<Variable>> {
    (0..prefs.num_agents())
        .map(|_| {
            (0..prefs.num_items())
                .map(|_| vars.add(variable().min(0.0).max(1.0)))
                .collect()
        })
        .collect()
}

/// `sum_o prefs[a][o] * x[a][o]`, skipping zero coefficients.
pub(crate) fn utility_expression(
    prefs: &Valuations,
    x: &[Vec<Variable>],
    agent: usize,
) -> Expression {
    let row = prefs.row(agent);
    let mut expr = Expression::with_capacity(row.len());
    for (&v, &var) in row.iter().zip(&x[agent]) {
        if v > 0.0 {
            expr.add_mul(v, var);
        }
    }
    expr
}

/// Adds `sum_a x[a][o] = 1` for every item.
pub(crate) fn with_unit_items<M: SolverModel>(mut model: M, x: &[Vec<Variable>]) -> M {
    let num_items = x.first().map_or(0, |row| row.len());
    for o in 0..num_items {
        let mut total = Expression::with_capacity(x.len());
        for row in x {
            total.add_mul(1.0, row[o]);
        }
        model = model.with(total.eq(1.0));
    }
    model
}

/// Reads the fraction matrix out of a solution.
pub(crate) fn read_fractions<S: Solution>(solution: &S, x: &[Vec<Variable>]) -> Vec<Vec<f64>> {
    x.iter()
        .map(|row| row.iter().map(|&var| solution.value(var)).collect())
        .collect()
}

/// Realized utility of every agent under `fractions`.
pub(crate) fn utilities(prefs: &Valuations, fractions: &[Vec<f64>]) -> Vec<f64> {
    (0..prefs.num_agents())
        .map(|a| prefs.utility(a, &fractions[a]))
        .collect()
}

pub(crate) fn solver_error(stage: &str, err: ResolutionError) -> AllocError {
    AllocError::Solver(format!("{stage}: {err}"))
}
