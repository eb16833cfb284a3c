//! The canonicalizing matrix product constructor.
//!
//! Canonical form: every scalar-valued input, wherever it appears in the
//! factor list, folds into a single leading scalar coefficient; nested
//! products flatten; identity factors are absorbed; a zero factor or a zero
//! coefficient collapses to a zero matrix when the chain's outer dimensions
//! are known. Matrix factor order is never changed.
//!
//! A canonical [`MatrixMul`](ExprKind::MatrixMul) carries at least two
//! factors, or exactly one factor with a non-one coefficient (the shape
//! `2*A` takes).

use crate::error::Error;
use crate::expr::{Expr, ExprKind};
use crate::scalar;
use super::size::{check_chain_sizes, size};

/// Multiplies a sequence of expressions into a canonical matrix product.
///
/// The input may freely mix scalar-valued and matrix-valued expressions; the
/// scalars fold into the coefficient. An input with no matrix factors at all
/// reduces to the scalar product.
///
/// # Errors
///
/// [`Error::EmptyProduct`] when called with no factors, and
/// [`Error::DimensionMismatch`] when two consecutive matrix factors have
/// provably incompatible inner dimensions.
pub fn matrix_mul(factors: Vec<Expr>) -> Result<Expr, Error> {
    if factors.is_empty() {
        return Err(Error::EmptyProduct);
    }

    // flatten nested products and pull every scalar into the coefficient
    let mut scalars = Vec::new();
    let mut matrices = Vec::new();
    for factor in factors {
        match factor.kind() {
            ExprKind::MatrixMul { scalar, factors: inner } => {
                scalars.push(scalar.clone());
                matrices.extend(inner.iter().cloned());
            }
            _ if factor.is_matrix() => matrices.push(factor),
            _ => scalars.push(factor),
        }
    }
    let scalar = scalar::mul_vec(scalars);
    if matrices.is_empty() {
        return Ok(scalar);
    }

    check_chain_sizes(&matrices)?;

    let has_zero_factor = matrices
        .iter()
        .any(|m| matches!(m.kind(), ExprKind::ZeroMatrix(..)));
    if has_zero_factor || scalar::is_zero(&scalar) == Some(true) {
        let rows = size(&matrices[0]).0;
        let cols = size(&matrices[matrices.len() - 1]).1;
        if let (Some(rows), Some(cols)) = (rows, cols) {
            return Ok(Expr::zero_matrix(rows, cols));
        }
        // outer dimensions unknown: leave the product unreduced
    }

    // identity factors are absorbed; one is remembered in case nothing else
    // survives
    let mut identity = None;
    let mut kept = Vec::with_capacity(matrices.len());
    for matrix in matrices {
        if matches!(matrix.kind(), ExprKind::Identity(_)) {
            identity = Some(matrix);
        } else {
            kept.push(matrix);
        }
    }
    if kept.is_empty() {
        if let Some(id) = identity {
            kept.push(id);
        }
    }

    if kept.len() == 1 && scalar::is_one(&scalar) {
        return Ok(kept.swap_remove(0));
    }
    Ok(Expr::matrix_mul_node(scalar, kept))
}

#[cfg(test)]
mod tests {
    use crate::consts::ONE;
    use pretty_assertions::assert_eq;
    use super::*;

    fn factors_of(expr: &Expr) -> (Expr, Vec<Expr>) {
        match expr.kind() {
            ExprKind::MatrixMul { scalar, factors } => (scalar.clone(), factors.clone()),
            other => panic!("expected a matrix product, got {other:?}"),
        }
    }

    #[test]
    fn single_factor_passes_through() {
        let a = Expr::matrix_symbol("A");
        assert_eq!(matrix_mul(vec![a.clone()]).unwrap(), a);
    }

    #[test]
    fn empty_product_is_an_error() {
        assert_eq!(matrix_mul(vec![]), Err(Error::EmptyProduct));
    }

    #[test]
    fn scalars_fold_into_the_coefficient() {
        let a = Expr::matrix_symbol("A");
        let b = Expr::matrix_symbol("B");
        let p = matrix_mul(vec![
            Expr::integer(2),
            a.clone(),
            Expr::integer(3),
            b.clone(),
        ])
        .unwrap();
        let (scalar, factors) = factors_of(&p);
        assert_eq!(scalar, Expr::integer(6));
        assert_eq!(factors, vec![a, b]);
    }

    #[test]
    fn factor_order_is_preserved() {
        let a = Expr::matrix_symbol("A");
        let b = Expr::matrix_symbol("B");
        let ab = matrix_mul(vec![a.clone(), b.clone()]).unwrap();
        let ba = matrix_mul(vec![b.clone(), a.clone()]).unwrap();
        assert_ne!(ab, ba);
        assert_eq!(factors_of(&ab).1, vec![a, b]);
    }

    #[test]
    fn nested_products_flatten() {
        let a = Expr::matrix_symbol("A");
        let b = Expr::matrix_symbol("B");
        let c = Expr::matrix_symbol("C");
        let inner = matrix_mul(vec![Expr::integer(2), b.clone(), c.clone()]).unwrap();
        let p = matrix_mul(vec![a.clone(), inner]).unwrap();
        let (scalar, factors) = factors_of(&p);
        assert_eq!(scalar, Expr::integer(2));
        assert_eq!(factors, vec![a, b, c]);
    }

    #[test]
    fn identity_is_absorbed() {
        let a = Expr::matrix_symbol("A");
        let id = Expr::identity(Expr::symbol("n"));
        assert_eq!(matrix_mul(vec![a.clone(), id.clone()]).unwrap(), a);
        assert_eq!(matrix_mul(vec![id.clone(), id.clone()]).unwrap(), id);
        // a scaled identity keeps its coefficient
        let two_id = matrix_mul(vec![Expr::integer(2), id.clone()]).unwrap();
        assert_eq!(factors_of(&two_id), (Expr::integer(2), vec![id]));
    }

    #[test]
    fn zero_collapses_when_dimensions_are_known() {
        let z = Expr::zero_matrix(Expr::integer(2), Expr::integer(2));
        let d = Expr::dense(2, 2, vec![ONE.clone(), ONE.clone(), ONE.clone(), ONE.clone()]);
        assert_eq!(
            matrix_mul(vec![z.clone(), d.clone()]).unwrap(),
            Expr::zero_matrix(Expr::integer(2), Expr::integer(2))
        );
        assert_eq!(
            matrix_mul(vec![Expr::integer(0), d]).unwrap(),
            Expr::zero_matrix(Expr::integer(2), Expr::integer(2))
        );
        // unknown outer dimensions stay unreduced rather than erroring
        let a = Expr::matrix_symbol("A");
        let p = matrix_mul(vec![Expr::integer(0), a.clone()]).unwrap();
        assert_eq!(factors_of(&p), (Expr::integer(0), vec![a]));
    }

    #[test]
    fn chain_mismatch_is_rejected() {
        let two_by_three = Expr::zero_matrix(Expr::integer(2), Expr::integer(3));
        let two_by_two = Expr::zero_matrix(Expr::integer(2), Expr::integer(2));
        assert_eq!(
            matrix_mul(vec![two_by_three, two_by_two]),
            Err(Error::DimensionMismatch)
        );
    }

    #[test]
    fn all_scalar_input_reduces_to_a_scalar() {
        let x = Expr::symbol("x");
        let p = matrix_mul(vec![Expr::integer(2), x.clone()]).unwrap();
        assert_eq!(p, scalar::mul(&Expr::integer(2), &x));
    }
}
