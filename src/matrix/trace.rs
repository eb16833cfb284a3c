//! The trace of a matrix expression.
//!
//! The trace is scalar-valued and linear, is invariant under cyclic shifts
//! of a product, and distributes over sums of products. Those three facts
//! drive the reductions here:
//!
//! - literal matrices reduce to sums of their diagonal entries;
//! - a sum becomes the sum of its term traces;
//! - a product first distributes any sum factors (cartesian expansion, so
//!   `trace((A+B)*C)` becomes `trace(A*C) + trace(B*C)` with factor order
//!   intact), then each product is rotated so the key-order minimum factor
//!   leads, picking one canonical representative of the cyclic class;
//! - scalar coefficients factor out of the trace entirely.
//!
//! Whatever survives is wrapped in an unreduced
//! [`Trace`](ExprKind::Trace) node.

use crate::consts::ZERO;
use crate::error::Error;
use crate::expr::{Expr, ExprKind};
use crate::scalar;
use std::cmp::Ordering;
use super::mul::matrix_mul;
use super::size::is_square;

/// Takes the trace of a matrix expression, returning a scalar expression.
///
/// A scalar-valued argument is returned unchanged (a scalar is its own
/// 1-by-1 trace).
///
/// # Errors
///
/// [`Error::NonSquare`] when the argument is provably not square. An
/// argument whose squareness cannot be decided stays symbolic instead.
pub fn trace(arg: &Expr) -> Result<Expr, Error> {
    match arg.kind() {
        ExprKind::Identity(n) => Ok(n.clone()),
        ExprKind::ZeroMatrix(..) => match is_square(arg) {
            Some(true) => Ok(ZERO.clone()),
            Some(false) => Err(Error::NonSquare),
            None => Ok(Expr::trace_node(arg.clone())),
        },
        ExprKind::Diagonal(entries) => Ok(scalar::add_vec(entries.clone())),
        ExprKind::Dense { nrows, ncols, values } => {
            if nrows != ncols {
                return Err(Error::NonSquare);
            }
            let diagonal = (0..*nrows).map(|i| values[i * ncols + i].clone()).collect();
            Ok(scalar::add_vec(diagonal))
        }
        ExprKind::MatrixAdd(terms) => {
            // linearity: trace(A + B) = trace(A) + trace(B)
            let mut traces = Vec::with_capacity(terms.len());
            for term in terms {
                traces.push(trace(term)?);
            }
            Ok(scalar::add_vec(traces))
        }
        ExprKind::MatrixMul { scalar, factors } => trace_product(scalar, factors),
        ExprKind::MatrixSymbol(_) | ExprKind::MatrixDerivative { .. } => {
            Ok(Expr::trace_node(arg.clone()))
        }
        // scalar-valued input, including an already-taken trace
        _ => Ok(arg.clone()),
    }
}

/// Rotates the sequence so that its key-order minimum leads. On ties the
/// first minimal element wins, so an already-canonical rotation is a no-op.
fn rotate_min_first(sequence: &mut Vec<Expr>) {
    let mut min = 0;
    for i in 1..sequence.len() {
        if sequence[i].key_cmp(&sequence[min]) == Ordering::Less {
            min = i;
        }
    }
    sequence.rotate_left(min);
}

/// Traces one distributed factor sequence.
fn trace_sequence(mut sequence: Vec<Expr>) -> Result<Expr, Error> {
    rotate_min_first(&mut sequence);
    let product = matrix_mul(sequence)?;
    match product.kind() {
        // an irreducible product: unit coefficient, nothing left to
        // distribute
        ExprKind::MatrixMul { scalar, factors }
            if scalar::is_one(scalar)
                && !factors.iter().any(|f| matches!(f.kind(), ExprKind::MatrixAdd(_))) =>
        {
            Ok(Expr::trace_node(product.clone()))
        }
        // the product collapsed (or exposed a coefficient or a sum):
        // dispatch again
        _ => trace(&product),
    }
}

fn trace_product(coefficient: &Expr, factors: &[Expr]) -> Result<Expr, Error> {
    if scalar::is_zero(coefficient) == Some(true) {
        return Ok(ZERO.clone());
    }

    // distribute sums: each factor contributes either itself or, for a sum,
    // its term list; walk the full cartesian product with the last position
    // cycling fastest
    let choices: Vec<&[Expr]> = factors
        .iter()
        .map(|factor| match factor.kind() {
            ExprKind::MatrixAdd(terms) => terms.as_slice(),
            _ => std::slice::from_ref(factor),
        })
        .collect();

    let mut traces = Vec::new();
    let mut index = vec![0usize; choices.len()];
    'expansion: loop {
        let sequence = index
            .iter()
            .zip(&choices)
            .map(|(&i, choice)| choice[i].clone())
            .collect();
        traces.push(trace_sequence(sequence)?);

        let mut position = choices.len();
        while position > 0 {
            position -= 1;
            index[position] += 1;
            if index[position] < choices[position].len() {
                continue 'expansion;
            }
            index[position] = 0;
        }
        break;
    }

    let sum = scalar::add_vec(traces);
    if scalar::is_one(coefficient) {
        Ok(sum)
    } else {
        Ok(scalar::mul(coefficient, &sum))
    }
}
