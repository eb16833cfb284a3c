//! The canonical key order: a deterministic total order over all
//! expressions.
//!
//! The canonicalizing constructors use this order to produce stable term
//! sequences (so that equal sums hash alike) and to pick the canonical
//! rotation of a product under the trace's cyclic invariance.
//!
//! This is deliberately *not* an [`Ord`] implementation. Sum equality is a
//! multiset relation, while this order is lexicographic over stored children;
//! the two disagree on non-canonically-ordered sums, which would violate the
//! consistency contract between `Ord` and `Eq`. A named comparator keeps the
//! order available without promising that consistency.

use super::{Expr, ExprKind};
use std::cmp::Ordering;

impl Expr {
    /// Compares two expressions under the canonical key order.
    ///
    /// Kinds rank scalar-before-matrix in declaration order; equal kinds
    /// compare field by field, sequences lexicographically.
    pub fn key_cmp(&self, other: &Expr) -> Ordering {
        self.kind().key_cmp(other.kind())
    }
}

fn cmp_slices(lhs: &[Expr], rhs: &[Expr]) -> Ordering {
    for (a, b) in lhs.iter().zip(rhs) {
        match a.key_cmp(b) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    lhs.len().cmp(&rhs.len())
}

impl ExprKind {
    pub(crate) fn key_cmp(&self, other: &ExprKind) -> Ordering {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Rational(a), Self::Rational(b)) => a.cmp(b),
            (Self::Symbol(a), Self::Symbol(b)) => a.cmp(b),
            (Self::MatrixSymbol(a), Self::MatrixSymbol(b)) => a.cmp(b),
            (Self::Add(a), Self::Add(b))
            | (Self::Mul(a), Self::Mul(b))
            | (Self::Diagonal(a), Self::Diagonal(b))
            | (Self::MatrixAdd(a), Self::MatrixAdd(b)) => cmp_slices(a, b),
            (Self::Identity(a), Self::Identity(b)) => a.key_cmp(b),
            (Self::ZeroMatrix(r1, c1), Self::ZeroMatrix(r2, c2)) => {
                r1.key_cmp(r2).then_with(|| c1.key_cmp(c2))
            }
            (
                Self::Dense { nrows: m1, ncols: n1, values: v1 },
                Self::Dense { nrows: m2, ncols: n2, values: v2 },
            ) => m1.cmp(m2).then_with(|| n1.cmp(n2)).then_with(|| cmp_slices(v1, v2)),
            (
                Self::MatrixMul { scalar: s1, factors: f1 },
                Self::MatrixMul { scalar: s2, factors: f2 },
            ) => s1.key_cmp(s2).then_with(|| cmp_slices(f1, f2)),
            (Self::Trace(a), Self::Trace(b)) => a.key_cmp(b),
            (
                Self::MatrixDerivative { arg: a1, vars: v1 },
                Self::MatrixDerivative { arg: a2, vars: v2 },
            ) => a1.key_cmp(a2).then_with(|| cmp_slices(v1, v2)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_order_by_name() {
        let a = Expr::matrix_symbol("A");
        let b = Expr::matrix_symbol("B");
        assert_eq!(a.key_cmp(&b), Ordering::Less);
        assert_eq!(b.key_cmp(&a), Ordering::Greater);
        assert_eq!(a.key_cmp(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn scalars_rank_before_matrices() {
        let n = Expr::integer(7);
        let x = Expr::symbol("x");
        let a = Expr::matrix_symbol("A");
        assert_eq!(n.key_cmp(&x), Ordering::Less);
        assert_eq!(x.key_cmp(&a), Ordering::Less);
        assert_eq!(n.key_cmp(&a), Ordering::Less);
    }

    #[test]
    fn sequences_compare_lexicographically() {
        let short = Expr::diagonal(vec![Expr::symbol("a")]);
        let long = Expr::diagonal(vec![Expr::symbol("a"), Expr::symbol("b")]);
        assert_eq!(short.key_cmp(&long), Ordering::Less);
    }

    #[test]
    fn total_over_mixed_kinds() {
        // every pair is ordered, one way or the other
        let exprs = [
            Expr::integer(0),
            Expr::symbol("x"),
            Expr::matrix_symbol("A"),
            Expr::identity(Expr::symbol("n")),
            Expr::trace_node(Expr::matrix_symbol("A")),
        ];
        for (i, a) in exprs.iter().enumerate() {
            for (j, b) in exprs.iter().enumerate() {
                if i == j {
                    assert_eq!(a.key_cmp(b), Ordering::Equal);
                } else {
                    assert_ne!(a.key_cmp(b), Ordering::Equal);
                    assert_eq!(a.key_cmp(b), b.key_cmp(a).reverse());
                }
            }
        }
    }
}
