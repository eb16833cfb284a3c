//! Symbolic differentiation with respect to a scalar symbol.
//!
//! The derivative is defined over every node kind. Scalar kinds follow the
//! usual sum and product rules; matrix kinds differentiate element-wise where
//! the elements are visible, and otherwise reduce through the matrix
//! constructors so the result is canonical. A matrix symbol is the one place
//! differentiation cannot make progress: it becomes an unevaluated
//! [`MatrixDerivative`](crate::expr::ExprKind::MatrixDerivative), and
//! differentiating that node again accumulates the variable multiset.

use crate::consts::{ONE, ZERO};
use crate::error::Error;
use crate::expr::{Expr, ExprKind};
use crate::matrix::derivative::derivative_node;
use crate::matrix::{matrix_add, matrix_mul, trace};
use super::{add_vec, is_zero, mul_vec};

/// Differentiates an expression with respect to the named scalar symbol.
pub fn diff(expr: &Expr, var: &str) -> Result<Expr, Error> {
    match expr.kind() {
        ExprKind::Integer(_) | ExprKind::Rational(_) => Ok(ZERO.clone()),
        ExprKind::Symbol(name) => {
            if name == var {
                Ok(ONE.clone())
            } else {
                Ok(ZERO.clone())
            }
        }
        ExprKind::Add(terms) => {
            let mut out = Vec::with_capacity(terms.len());
            for term in terms {
                out.push(diff(term, var)?);
            }
            Ok(add_vec(out))
        }
        ExprKind::Mul(factors) => {
            // product rule: f'*g*h + f*g'*h + f*g*h'
            let mut terms = Vec::with_capacity(factors.len());
            for i in 0..factors.len() {
                let mut piece = Vec::with_capacity(factors.len());
                for (j, factor) in factors.iter().enumerate() {
                    if i == j {
                        piece.push(diff(factor, var)?);
                    } else {
                        piece.push(factor.clone());
                    }
                }
                terms.push(mul_vec(piece));
            }
            Ok(add_vec(terms))
        }
        // the trace is linear, so it commutes with differentiation
        ExprKind::Trace(arg) => trace(&diff(arg, var)?),
        ExprKind::MatrixSymbol(_) => {
            Ok(derivative_node(expr.clone(), vec![Expr::symbol(var)]))
        }
        ExprKind::MatrixDerivative { arg, vars } => {
            let mut vars = vars.clone();
            vars.push(Expr::symbol(var));
            Ok(derivative_node(arg.clone(), vars))
        }
        ExprKind::Identity(n) => Ok(Expr::zero_matrix(n.clone(), n.clone())),
        ExprKind::ZeroMatrix(..) => Ok(expr.clone()),
        ExprKind::Diagonal(entries) => {
            let mut out = Vec::with_capacity(entries.len());
            for entry in entries {
                out.push(diff(entry, var)?);
            }
            Ok(Expr::diagonal(out))
        }
        ExprKind::Dense { nrows, ncols, values } => {
            let mut out = Vec::with_capacity(values.len());
            for value in values {
                out.push(diff(value, var)?);
            }
            Ok(Expr::dense(*nrows, *ncols, out))
        }
        ExprKind::MatrixAdd(terms) => {
            let mut out = Vec::with_capacity(terms.len());
            for term in terms {
                out.push(diff(term, var)?);
            }
            matrix_add(out)
        }
        ExprKind::MatrixMul { scalar, factors } => {
            // product rule again, but factor order is load-bearing here
            let mut terms = Vec::new();
            let dscalar = diff(scalar, var)?;
            if is_zero(&dscalar) != Some(true) {
                let mut piece = vec![dscalar];
                piece.extend(factors.iter().cloned());
                terms.push(matrix_mul(piece)?);
            }
            for i in 0..factors.len() {
                let dfactor = diff(&factors[i], var)?;
                if matches!(dfactor.kind(), ExprKind::ZeroMatrix(..)) {
                    continue;
                }
                let mut piece = Vec::with_capacity(factors.len() + 1);
                piece.push(scalar.clone());
                for (j, factor) in factors.iter().enumerate() {
                    piece.push(if i == j { dfactor.clone() } else { factor.clone() });
                }
                terms.push(matrix_mul(piece)?);
            }
            if terms.is_empty() {
                // the product is constant with respect to `var`
                let mut piece = vec![ZERO.clone()];
                piece.extend(factors.iter().cloned());
                return matrix_mul(piece);
            }
            matrix_add(terms)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::scalar::{add, mul};
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn constants_and_symbols() {
        assert_eq!(diff(&Expr::integer(5), "x").unwrap(), *ZERO);
        assert_eq!(diff(&Expr::symbol("x"), "x").unwrap(), *ONE);
        assert_eq!(diff(&Expr::symbol("y"), "x").unwrap(), *ZERO);
    }

    #[test]
    fn sum_rule() {
        let x = Expr::symbol("x");
        let y = Expr::symbol("y");
        // d/dx (x + y) = 1
        assert_eq!(diff(&add(&x, &y), "x").unwrap(), *ONE);
        // d/dx (x + x) = 2
        assert_eq!(diff(&add(&x, &x), "x").unwrap(), Expr::integer(2));
    }

    #[test]
    fn product_rule() {
        let x = Expr::symbol("x");
        let y = Expr::symbol("y");
        // d/dx (x*y) = y
        assert_eq!(diff(&mul(&x, &y), "x").unwrap(), y.clone());
        // d/dx (3*x) = 3
        let three_x = mul(&Expr::integer(3), &x);
        assert_eq!(diff(&three_x, "x").unwrap(), Expr::integer(3));
        // d/dx (x*x) = 2*x
        assert_eq!(diff(&mul(&x, &x), "x").unwrap(), mul(&Expr::integer(2), &x));
    }

    #[test]
    fn matrix_literals_differentiate_elementwise() {
        let x = Expr::symbol("x");
        let diag = Expr::diagonal(vec![x.clone(), Expr::integer(3)]);
        assert_eq!(
            diff(&diag, "x").unwrap(),
            Expr::diagonal(vec![ONE.clone(), ZERO.clone()])
        );

        let n = Expr::symbol("n");
        assert_eq!(
            diff(&Expr::identity(n.clone()), "x").unwrap(),
            Expr::zero_matrix(n.clone(), n.clone())
        );
        let zero = Expr::zero_matrix(n.clone(), n);
        assert_eq!(diff(&zero, "x").unwrap(), zero);
    }

    #[test]
    fn matrix_symbol_becomes_unevaluated_derivative() {
        let a = Expr::matrix_symbol("A");
        let da = diff(&a, "x").unwrap();
        match da.kind() {
            ExprKind::MatrixDerivative { arg, vars } => {
                assert_eq!(*arg, a);
                assert_eq!(*vars, vec![Expr::symbol("x")]);
            }
            other => panic!("expected a derivative node, got {other:?}"),
        }
        // differentiating again accumulates the multiset
        let dda = diff(&da, "y").unwrap();
        match dda.kind() {
            ExprKind::MatrixDerivative { vars, .. } => {
                assert_eq!(*vars, vec![Expr::symbol("x"), Expr::symbol("y")]);
            }
            other => panic!("expected a derivative node, got {other:?}"),
        }
    }
}
