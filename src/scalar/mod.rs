//! The scalar side of the algebra: exact numbers, symbols, and the
//! canonicalizing sum/product constructors the matrix layer leans on.
//!
//! Everything here is deliberately thin. Sums flatten, fold their numeric
//! terms exactly, combine like terms by summing numeric coefficients, and
//! sort by the [key order](crate::expr::Expr::key_cmp) so that equal sums
//! are stored identically. Products flatten, fold numerics into a single
//! leading coefficient, and sort their symbolic tail (scalar multiplication
//! commutes; matrix multiplication, which does not, lives in
//! [`crate::matrix`]).
//!
//! Zero-ness is three-valued: [`is_zero`] answers `Some(true)` or
//! `Some(false)` only for numeric literals and `None` when the question
//! cannot be decided symbolically.

pub mod diff;

pub use diff::diff;

use crate::consts::{MINUS_ONE, ZERO};
use crate::expr::{Expr, ExprKind};
use rug::Rational;

/// Adds two scalar expressions.
pub fn add(lhs: &Expr, rhs: &Expr) -> Expr {
    add_vec(vec![lhs.clone(), rhs.clone()])
}

/// Sums a sequence of scalar expressions into canonical form.
///
/// An empty input sums to `0`; a single term is returned unchanged (after
/// canonical reordering if it is itself a sum).
pub fn add_vec(terms: Vec<Expr>) -> Expr {
    // flatten nested sums; inputs are canonical, so one level suffices
    let mut flat = Vec::with_capacity(terms.len());
    for term in terms {
        debug_assert!(!term.is_matrix(), "scalar sum over a matrix expression");
        match term.kind() {
            ExprKind::Add(inner) => flat.extend(inner.iter().cloned()),
            _ => flat.push(term),
        }
    }

    let mut constant = Rational::new();
    let mut collected: Vec<(Rational, Expr)> = Vec::new();
    for term in &flat {
        if let Some(n) = numeric_value(term) {
            constant += n;
            continue;
        }
        let (coeff, rest) = split_coefficient(term);
        // O(n^2) worst case, scanning the collected list for each term
        match collected.iter_mut().find(|(_, r)| *r == rest) {
            Some((c, _)) => *c += coeff,
            None => collected.push((coeff, rest)),
        }
    }

    let mut out = Vec::new();
    for (coeff, rest) in collected {
        if coeff == 0 {
            continue;
        }
        if coeff == 1 {
            out.push(rest);
        } else {
            out.push(mul_vec(vec![number(coeff), rest]));
        }
    }
    if constant != 0 {
        out.push(number(constant));
    }

    if out.is_empty() {
        return ZERO.clone();
    }
    if out.len() == 1 {
        return out.swap_remove(0);
    }
    out.sort_by(|a, b| a.key_cmp(b));
    Expr::add_node(out)
}

/// Multiplies two scalar expressions.
pub fn mul(lhs: &Expr, rhs: &Expr) -> Expr {
    mul_vec(vec![lhs.clone(), rhs.clone()])
}

/// Multiplies a sequence of scalar expressions into canonical form.
///
/// An empty input multiplies to `1`. Numeric factors fold into a single
/// leading coefficient; a zero coefficient annihilates the product.
pub fn mul_vec(factors: Vec<Expr>) -> Expr {
    let mut flat = Vec::with_capacity(factors.len());
    for factor in factors {
        debug_assert!(!factor.is_matrix(), "scalar product over a matrix expression");
        match factor.kind() {
            ExprKind::Mul(inner) => flat.extend(inner.iter().cloned()),
            _ => flat.push(factor),
        }
    }

    let mut coeff = Rational::from(1);
    let mut rest = Vec::new();
    for factor in flat {
        match numeric_value(&factor) {
            Some(n) => coeff *= n,
            None => rest.push(factor),
        }
    }

    if coeff == 0 || rest.is_empty() {
        return number(coeff);
    }
    rest.sort_by(|a, b| a.key_cmp(b));
    if coeff != 1 {
        rest.insert(0, number(coeff));
    }
    if rest.len() == 1 {
        return rest.swap_remove(0);
    }
    Expr::mul_node(rest)
}

/// Subtracts `rhs` from `lhs`.
pub fn sub(lhs: &Expr, rhs: &Expr) -> Expr {
    add(lhs, &neg(rhs))
}

/// Negates a scalar expression.
pub fn neg(expr: &Expr) -> Expr {
    mul(&MINUS_ONE, expr)
}

/// Returns true if the expression is a numeric literal.
pub fn is_number(expr: &Expr) -> bool {
    matches!(expr.kind(), ExprKind::Integer(_) | ExprKind::Rational(_))
}

/// Returns true if the expression is the number one.
pub fn is_one(expr: &Expr) -> bool {
    matches!(expr.kind(), ExprKind::Integer(n) if *n == 1)
}

/// Decides whether the expression is zero.
///
/// `Some(true)` and `Some(false)` are definitive answers; `None` means the
/// question could not be decided symbolically. Canonical rationals are never
/// integral, so a [`Rational`](ExprKind::Rational) is definitely nonzero.
pub fn is_zero(expr: &Expr) -> Option<bool> {
    match expr.kind() {
        ExprKind::Integer(n) => Some(*n == 0),
        ExprKind::Rational(_) => Some(false),
        _ => None,
    }
}

/// Builds a numeric literal, demoting integral rationals.
fn number(value: Rational) -> Expr {
    Expr::rational(value)
}

fn numeric_value(expr: &Expr) -> Option<Rational> {
    match expr.kind() {
        ExprKind::Integer(n) => Some(Rational::from(n.clone())),
        ExprKind::Rational(r) => Some(r.clone()),
        _ => None,
    }
}

/// Splits a term into its numeric coefficient and the remaining factors.
///
/// - `3*x` -> `(3, x)`
/// - `1/2*x*y` -> `(1/2, x*y)`
/// - `x` -> `(1, x)`
fn split_coefficient(term: &Expr) -> (Rational, Expr) {
    if let ExprKind::Mul(factors) = term.kind() {
        if let Some(n) = factors.first().and_then(numeric_value) {
            let tail = &factors[1..];
            let rest = if tail.len() == 1 {
                tail[0].clone()
            } else {
                Expr::mul_node(tail.to_vec())
            };
            return (n, rest);
        }
    }
    (Rational::from(1), term.clone())
}
