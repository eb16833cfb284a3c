//! Symbolic derivatives of matrix expressions.
//!
//! Only a matrix symbol produces an unevaluated
//! [`MatrixDerivative`](ExprKind::MatrixDerivative) node; every other
//! argument reduces through [`scalar::diff`], one variable at a time, so a
//! derivative node never wraps anything the algebra could differentiate
//! further. The node is a leaf of the matrix algebra: nothing simplifies it.

use crate::error::Error;
use crate::expr::{Expr, ExprKind};
use crate::scalar;

/// Builds a derivative node with its variable multiset in canonical order.
///
/// Callers must pass a matrix-symbol argument and symbol variables.
pub(crate) fn derivative_node(arg: Expr, mut vars: Vec<Expr>) -> Expr {
    debug_assert!(matches!(arg.kind(), ExprKind::MatrixSymbol(_)));
    debug_assert!(vars.iter().all(|v| matches!(v.kind(), ExprKind::Symbol(_))));
    vars.sort_by(|a, b| a.key_cmp(b));
    Expr::matrix_derivative_node(arg, vars)
}

/// Differentiates a matrix expression with respect to a multiset of scalar
/// symbols.
///
/// A matrix symbol becomes an unevaluated derivative node; any other
/// argument is differentiated variable by variable, in the multiset's
/// canonical order.
///
/// # Errors
///
/// [`Error::InvalidVariable`] when any variable is not a scalar symbol.
pub fn matrix_derivative(arg: &Expr, vars: &[Expr]) -> Result<Expr, Error> {
    if vars.iter().any(|v| !matches!(v.kind(), ExprKind::Symbol(_))) {
        return Err(Error::InvalidVariable);
    }

    if matches!(arg.kind(), ExprKind::MatrixSymbol(_)) {
        return Ok(derivative_node(arg.clone(), vars.to_vec()));
    }

    let mut sorted = vars.to_vec();
    sorted.sort_by(|a, b| a.key_cmp(b));
    let mut result = arg.clone();
    for var in &sorted {
        if let ExprKind::Symbol(name) = var.kind() {
            result = scalar::diff(&result, name)?;
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use crate::matrix::{matrix_add, matrix_mul};
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn matrix_symbol_builds_a_node() {
        let x = Expr::matrix_symbol("X");
        let d = matrix_derivative(&x, &[Expr::symbol("x")]).unwrap();
        match d.kind() {
            ExprKind::MatrixDerivative { arg, vars } => {
                assert_eq!(*arg, x);
                assert_eq!(*vars, vec![Expr::symbol("x")]);
            }
            other => panic!("expected a derivative node, got {other:?}"),
        }
    }

    #[test]
    fn variable_multiset_ignores_order() {
        let m = Expr::matrix_symbol("X");
        let x = Expr::symbol("x");
        let y = Expr::symbol("y");
        let xy = matrix_derivative(&m, &[x.clone(), y.clone()]).unwrap();
        let yx = matrix_derivative(&m, &[y.clone(), x.clone()]).unwrap();
        assert_eq!(xy, yx);
        // a genuine multiset: {x, x} differs from {x, y}
        let xx = matrix_derivative(&m, &[x.clone(), x]).unwrap();
        assert_ne!(xx, xy);
    }

    #[test]
    fn non_symbol_variables_are_rejected() {
        let m = Expr::matrix_symbol("X");
        assert_eq!(
            matrix_derivative(&m, &[Expr::integer(1)]),
            Err(Error::InvalidVariable)
        );
        assert_eq!(
            matrix_derivative(&m, &[Expr::symbol("x"), Expr::matrix_symbol("Y")]),
            Err(Error::InvalidVariable)
        );
    }

    #[test]
    fn non_symbol_arguments_reduce() {
        let n = Expr::symbol("n");
        let x = Expr::symbol("x");

        // literals differentiate to their zero counterparts
        let id = Expr::identity(n.clone());
        assert_eq!(
            matrix_derivative(&id, &[x.clone()]).unwrap(),
            Expr::zero_matrix(n.clone(), n)
        );

        let diag = Expr::diagonal(vec![x.clone(), scalar::mul(&Expr::integer(2), &x)]);
        assert_eq!(
            matrix_derivative(&diag, &[x.clone()]).unwrap(),
            Expr::diagonal(vec![Expr::integer(1), Expr::integer(2)])
        );
    }

    #[test]
    fn sums_differentiate_term_by_term() {
        let (a, b) = (Expr::matrix_symbol("A"), Expr::matrix_symbol("B"));
        let x = Expr::symbol("x");
        let sum = matrix_add(vec![a.clone(), b.clone()]).unwrap();
        let d = matrix_derivative(&sum, &[x.clone()]).unwrap();
        let expected = matrix_add(vec![
            matrix_derivative(&a, &[x.clone()]).unwrap(),
            matrix_derivative(&b, &[x]).unwrap(),
        ])
        .unwrap();
        assert_eq!(d, expected);
    }

    #[test]
    fn products_use_the_product_rule() {
        let (a, b) = (Expr::matrix_symbol("A"), Expr::matrix_symbol("B"));
        let x = Expr::symbol("x");
        let product = matrix_mul(vec![a.clone(), b.clone()]).unwrap();
        let d = matrix_derivative(&product, &[x.clone()]).unwrap();
        // A'*B + A*B', in that order
        let da = matrix_derivative(&a, &[x.clone()]).unwrap();
        let db = matrix_derivative(&b, &[x]).unwrap();
        let expected = matrix_add(vec![
            matrix_mul(vec![da, b]).unwrap(),
            matrix_mul(vec![a, db]).unwrap(),
        ])
        .unwrap();
        assert_eq!(d, expected);
    }

    #[test]
    fn repeated_differentiation_accumulates() {
        let m = Expr::matrix_symbol("X");
        let x = Expr::symbol("x");
        let first = matrix_derivative(&m, &[x.clone()]).unwrap();
        let second = matrix_derivative(&first, &[x.clone()]).unwrap();
        match second.kind() {
            ExprKind::MatrixDerivative { arg, vars } => {
                assert_eq!(*arg, m);
                assert_eq!(*vars, vec![x.clone(), x]);
            }
            other => panic!("expected a derivative node, got {other:?}"),
        }
    }
}
