//! Dimension introspection and checking.
//!
//! Dimensions are scalar expressions and may be unknown (`None`) or symbolic.
//! Checks only ever fail on a *provable* mismatch: the difference of two
//! known dimensions folds to a nonzero number. Symbolic or unknown
//! dimensions are always accepted.

use crate::error::Error;
use crate::expr::{Expr, ExprKind};
use crate::scalar;

/// Returns the `(rows, cols)` of a matrix expression, either component
/// `None` when unknown.
///
/// Scalar-valued expressions (including traces) have no dimensions.
pub fn size(expr: &Expr) -> (Option<Expr>, Option<Expr>) {
    match expr.kind() {
        ExprKind::Identity(n) => (Some(n.clone()), Some(n.clone())),
        ExprKind::ZeroMatrix(r, c) => (Some(r.clone()), Some(c.clone())),
        ExprKind::Diagonal(entries) => {
            let n = Expr::integer(entries.len());
            (Some(n.clone()), Some(n))
        }
        ExprKind::Dense { nrows, ncols, .. } => {
            (Some(Expr::integer(*nrows)), Some(Expr::integer(*ncols)))
        }
        ExprKind::MatrixAdd(terms) => {
            let mut rows = None;
            let mut cols = None;
            for term in terms {
                let (r, c) = size(term);
                if rows.is_none() {
                    rows = r;
                }
                if cols.is_none() {
                    cols = c;
                }
                if rows.is_some() && cols.is_some() {
                    break;
                }
            }
            (rows, cols)
        }
        ExprKind::MatrixMul { factors, .. } => {
            let rows = factors.first().map(size).and_then(|(r, _)| r);
            let cols = factors.last().map(size).and_then(|(_, c)| c);
            (rows, cols)
        }
        _ => (None, None),
    }
}

/// Decides whether a matrix expression is square, three-valued.
pub fn is_square(expr: &Expr) -> Option<bool> {
    match size(expr) {
        (Some(rows), Some(cols)) => scalar::is_zero(&scalar::sub(&rows, &cols)),
        _ => None,
    }
}

/// True when two known dimensions are provably different.
fn provably_unequal(lhs: &Expr, rhs: &Expr) -> bool {
    scalar::is_zero(&scalar::sub(lhs, rhs)) == Some(false)
}

/// Checks that every pair of summands agrees on its known dimensions.
pub(crate) fn check_matching_sizes(terms: &[Expr]) -> Result<(), Error> {
    for (i, first) in terms.iter().enumerate() {
        let (rows_i, cols_i) = size(first);
        for second in &terms[i + 1..] {
            let (rows_j, cols_j) = size(second);
            if let (Some(a), Some(b)) = (&rows_i, &rows_j) {
                if provably_unequal(a, b) {
                    return Err(Error::DimensionMismatch);
                }
            }
            if let (Some(a), Some(b)) = (&cols_i, &cols_j) {
                if provably_unequal(a, b) {
                    return Err(Error::DimensionMismatch);
                }
            }
        }
    }
    Ok(())
}

/// Checks that consecutive factors of a product chain correctly: the column
/// count of each factor must match the row count of the next.
pub(crate) fn check_chain_sizes(factors: &[Expr]) -> Result<(), Error> {
    for pair in factors.windows(2) {
        let (_, cols) = size(&pair[0]);
        let (rows, _) = size(&pair[1]);
        if let (Some(a), Some(b)) = (cols, rows) {
            if provably_unequal(&a, &b) {
                return Err(Error::DimensionMismatch);
            }
        }
    }
    Ok(())
}
