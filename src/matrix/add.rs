//! The canonicalizing matrix sum constructor.
//!
//! Building a sum normalizes it in one pass: nested sums flatten, zero
//! matrices vanish, diagonal and dense literals combine element-wise, and
//! like terms collect with exact scalar coefficients. The surviving terms
//! are sorted by the key order so that equal sums are stored identically
//! (and therefore hash identically, even though sum equality ignores term
//! order).

use crate::consts::ONE;
use crate::error::Error;
use crate::expr::{Expr, ExprKind};
use crate::scalar;
use super::mul::matrix_mul;
use super::size::check_matching_sizes;

/// Canonical-form check for a finished term list: at least two terms, no
/// zero matrices or nested sums, at most one diagonal and one dense literal
/// and never both. Guards the node constructor in debug builds.
fn is_canonical(terms: &[Expr]) -> bool {
    if terms.len() < 2 {
        return false;
    }
    let mut num_diag = 0;
    let mut num_dense = 0;
    for term in terms {
        match term.kind() {
            ExprKind::ZeroMatrix(..) | ExprKind::MatrixAdd(_) => return false,
            ExprKind::Diagonal(_) => num_diag += 1,
            ExprKind::Dense { .. } => num_dense += 1,
            _ => {}
        }
    }
    num_diag <= 1 && num_dense <= 1 && !(num_diag == 1 && num_dense == 1)
}

/// Adds a coefficient/term pair into the collected list, merging with an
/// existing structurally equal term if there is one.
fn merge(collected: &mut Vec<(Expr, Expr)>, coeff: Expr, term: Expr) {
    for (c, t) in collected.iter_mut() {
        if *t == term {
            *c = scalar::add(c, &coeff);
            return;
        }
    }
    collected.push((coeff, term));
}

/// Sums a sequence of matrix expressions into canonical form.
///
/// # Errors
///
/// [`Error::EmptySum`] when called with no terms, and
/// [`Error::DimensionMismatch`] when two terms have provably unequal row or
/// column counts. Unknown and symbolic dimensions are accepted.
pub fn matrix_add(terms: Vec<Expr>) -> Result<Expr, Error> {
    let mut terms = terms;
    if terms.is_empty() {
        return Err(Error::EmptySum);
    }
    if terms.len() == 1 {
        return Ok(terms.swap_remove(0));
    }

    // flatten nested sums; inputs are canonical, so one level suffices
    let mut expanded = Vec::with_capacity(terms.len());
    for term in terms {
        match term.kind() {
            ExprKind::MatrixAdd(inner) => expanded.extend(inner.iter().cloned()),
            _ => expanded.push(term),
        }
    }
    check_matching_sizes(&expanded)?;

    // bucket the literal matrices, collecting everything else with a scalar
    // coefficient
    let mut collected: Vec<(Expr, Expr)> = Vec::new();
    let mut diag: Option<Vec<Expr>> = None;
    let mut dense: Option<(usize, usize, Vec<Expr>)> = None;
    let mut zero: Option<Expr> = None;
    for term in &expanded {
        match term.kind() {
            ExprKind::ZeroMatrix(..) => zero = Some(term.clone()),
            ExprKind::Diagonal(entries) => match &mut diag {
                None => diag = Some(entries.clone()),
                Some(running) => {
                    // equal lengths: the size check has already passed
                    for (a, b) in running.iter_mut().zip(entries) {
                        *a = scalar::add(a, b);
                    }
                }
            },
            ExprKind::Dense { nrows, ncols, values } => match &mut dense {
                None => dense = Some((*nrows, *ncols, values.clone())),
                Some((_, _, running)) => {
                    for (a, b) in running.iter_mut().zip(values) {
                        *a = scalar::add(a, b);
                    }
                }
            },
            ExprKind::MatrixMul { scalar, factors } => {
                let coeff = scalar.clone();
                let term = matrix_mul(factors.clone())?;
                merge(&mut collected, coeff, term);
            }
            _ => merge(&mut collected, ONE.clone(), term.clone()),
        }
    }

    // rebuild each collected term with its coefficient
    let mut keep = Vec::with_capacity(collected.len() + 2);
    for (coeff, term) in collected {
        let rebuilt = if scalar::is_number(&coeff) && scalar::is_one(&coeff) {
            term
        } else if matches!(term.kind(), ExprKind::Trace(_)) {
            // traces are scalar-valued, so the coefficient attaches as a
            // scalar product
            scalar::mul(&coeff, &term)
        } else {
            matrix_mul(vec![coeff, term])?
        };
        // a fully cancelled term can collapse to a zero matrix; route it to
        // the zero bucket so the finished sum stays canonical
        if matches!(rebuilt.kind(), ExprKind::ZeroMatrix(..)) {
            zero = Some(rebuilt);
        } else {
            keep.push(rebuilt);
        }
    }

    match (diag, &mut dense) {
        (Some(entries), Some((nrows, ncols, values))) => {
            // fold the diagonal into the dense matrix's leading diagonal
            for i in 0..*nrows {
                for j in 0..*ncols {
                    if i == j {
                        let cell = i * *ncols + j;
                        values[cell] = scalar::add(&values[cell], &entries[i]);
                    }
                }
            }
        }
        (Some(entries), None) => keep.push(Expr::diagonal(entries)),
        (None, _) => {}
    }
    if let Some((nrows, ncols, values)) = dense {
        keep.push(Expr::dense(nrows, ncols, values));
    }

    if keep.len() == 1 {
        return Ok(keep.swap_remove(0));
    }
    if keep.is_empty() {
        if let Some(zero) = zero {
            return Ok(zero);
        }
    }
    keep.sort_by(|a, b| a.key_cmp(b));
    debug_assert!(is_canonical(&keep));
    Ok(Expr::matrix_add_node(keep))
}
