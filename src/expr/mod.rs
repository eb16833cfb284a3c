//! The expression node set: immutable symbolic trees whose value is a scalar
//! or a matrix.
//!
//! A single [`ExprKind`] enum covers both scalar kinds (numbers, symbols,
//! sums, products) and matrix kinds (matrix symbols, identity/zero/diagonal/
//! dense literals, matrix sums and products, traces, derivatives). The two
//! families cannot be separated into distinct types without losing the
//! algebra: a [`Trace`](ExprKind::Trace) is scalar-valued but participates in
//! matrix sums, and the canonical [key order](Expr::key_cmp) must be total
//! over *every* expression.
//!
//! [`Expr`] is a cheap-to-clone handle around a shared, immutable node.
//! Subtrees are shared freely; cycles are impossible because construction is
//! bottom-up and nodes are never mutated.
//!
//! # Structural equality
//!
//! The [`PartialEq`] implementation is **structural**, with one refinement:
//! sums and scalar products compare their children as *multisets*, because
//! addition and scalar multiplication are commutative and associative. Two
//! expressions that are semantically equal but structurally different (say
//! `trace(A*B)` and `trace(B*A)`) are **not** equal under this relation; the
//! canonicalizing constructors exist precisely so that semantically equal
//! inputs normalize to structurally equal outputs.
//!
//! Multiset matching is done by pairwise structural comparison rather than by
//! hashing the children: a child may itself contain a sum whose stored term
//! order differs between the two sides, which would make the hashes disagree
//! even though the multisets match.

mod ord;

use crate::primitive::int;
use rug::{Integer, Rational};
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A shared handle to an immutable expression node.
///
/// Cloning an `Expr` bumps a reference count; the node itself is never
/// copied or mutated.
#[derive(Debug, Clone, Eq)]
pub struct Expr {
    kind: Arc<ExprKind>,
}

impl Expr {
    fn new(kind: ExprKind) -> Self {
        Self { kind: Arc::new(kind) }
    }

    /// The node this handle points at.
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Creates an integer literal.
    pub fn integer<T>(n: T) -> Self
    where
        Integer: From<T>,
    {
        Self::new(ExprKind::Integer(int(n)))
    }

    /// Creates an exact rational literal. A rational whose denominator
    /// normalizes to 1 is demoted to an integer, so each numeric value has
    /// exactly one representation.
    pub fn rational(value: Rational) -> Self {
        if *value.denom() == 1 {
            let (numer, _) = value.into_numer_denom();
            Self::new(ExprKind::Integer(numer))
        } else {
            Self::new(ExprKind::Rational(value))
        }
    }

    /// Creates a scalar symbol.
    ///
    /// # Panics
    ///
    /// Panics if the name is empty.
    pub fn symbol(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "symbol name cannot be empty");
        Self::new(ExprKind::Symbol(name))
    }

    /// Creates a matrix symbol: a leaf matrix with opaque dimensions.
    ///
    /// # Panics
    ///
    /// Panics if the name is empty.
    pub fn matrix_symbol(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "matrix symbol name cannot be empty");
        Self::new(ExprKind::MatrixSymbol(name))
    }

    /// Creates the identity matrix of the given (possibly symbolic) size.
    pub fn identity(size: Expr) -> Self {
        Self::new(ExprKind::Identity(size))
    }

    /// Creates the zero matrix with the given (possibly symbolic) dimensions.
    pub fn zero_matrix(nrows: Expr, ncols: Expr) -> Self {
        Self::new(ExprKind::ZeroMatrix(nrows, ncols))
    }

    /// Creates a diagonal matrix from its diagonal entries.
    ///
    /// # Panics
    ///
    /// Panics if `entries` is empty.
    pub fn diagonal(entries: Vec<Expr>) -> Self {
        assert!(!entries.is_empty(), "diagonal matrix cannot be empty");
        Self::new(ExprKind::Diagonal(entries))
    }

    /// Creates a dense matrix literal from row-major scalar entries.
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != nrows * ncols`.
    pub fn dense(nrows: usize, ncols: usize, values: Vec<Expr>) -> Self {
        assert_eq!(
            values.len(),
            nrows * ncols,
            "dense matrix needs nrows * ncols entries"
        );
        Self::new(ExprKind::Dense { nrows, ncols, values })
    }

    // Compound nodes are only built by the canonicalizing constructors, which
    // are responsible for upholding each kind's canonical-form invariants.

    pub(crate) fn add_node(terms: Vec<Expr>) -> Self {
        Self::new(ExprKind::Add(terms))
    }

    pub(crate) fn mul_node(factors: Vec<Expr>) -> Self {
        Self::new(ExprKind::Mul(factors))
    }

    pub(crate) fn matrix_add_node(terms: Vec<Expr>) -> Self {
        Self::new(ExprKind::MatrixAdd(terms))
    }

    pub(crate) fn matrix_mul_node(scalar: Expr, factors: Vec<Expr>) -> Self {
        Self::new(ExprKind::MatrixMul { scalar, factors })
    }

    pub(crate) fn trace_node(arg: Expr) -> Self {
        Self::new(ExprKind::Trace(arg))
    }

    pub(crate) fn matrix_derivative_node(arg: Expr, vars: Vec<Expr>) -> Self {
        Self::new(ExprKind::MatrixDerivative { arg, vars })
    }

    /// Returns true if the expression is matrix-valued.
    ///
    /// [`Trace`](ExprKind::Trace) is *not* matrix-valued: it lives among the
    /// matrix node kinds but its value is a scalar.
    pub fn is_matrix(&self) -> bool {
        matches!(
            self.kind(),
            ExprKind::MatrixSymbol(_)
                | ExprKind::Identity(_)
                | ExprKind::ZeroMatrix(..)
                | ExprKind::Diagonal(_)
                | ExprKind::Dense { .. }
                | ExprKind::MatrixAdd(_)
                | ExprKind::MatrixMul { .. }
                | ExprKind::MatrixDerivative { .. }
        )
    }

    /// If the expression is an integer literal, returns the contained value.
    pub fn as_integer(&self) -> Option<&Integer> {
        match self.kind() {
            ExprKind::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the child expressions of this node, in stored order.
    pub fn args(&self) -> Vec<Expr> {
        match self.kind() {
            ExprKind::Integer(_)
            | ExprKind::Rational(_)
            | ExprKind::Symbol(_)
            | ExprKind::MatrixSymbol(_) => Vec::new(),
            ExprKind::Identity(n) => vec![n.clone()],
            ExprKind::ZeroMatrix(r, c) => vec![r.clone(), c.clone()],
            ExprKind::Diagonal(entries) => entries.clone(),
            ExprKind::Dense { values, .. } => values.clone(),
            ExprKind::Add(terms) | ExprKind::Mul(terms) | ExprKind::MatrixAdd(terms) => {
                terms.clone()
            }
            ExprKind::MatrixMul { scalar, factors } => {
                let mut args = vec![scalar.clone()];
                args.extend(factors.iter().cloned());
                args
            }
            ExprKind::Trace(arg) => vec![arg.clone()],
            ExprKind::MatrixDerivative { arg, vars } => {
                let mut args = vec![arg.clone()];
                args.extend(vars.iter().cloned());
                args
            }
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.kind, &other.kind) || self.kind() == other.kind()
    }
}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())
    }
}

/// An expression node.
///
/// Scalar kinds come first, matrix kinds second; the declaration order also
/// fixes the kind ranking used by the [key order](Expr::key_cmp).
#[derive(Debug, Clone, Eq)]
pub enum ExprKind {
    /// An exact integer.
    Integer(Integer),

    /// An exact non-integral rational.
    Rational(Rational),

    /// A scalar symbol, such as `x`.
    Symbol(String),

    /// A sum of scalar terms.
    Add(Vec<Expr>),

    /// A product of scalar factors, with any numeric coefficient leading.
    Mul(Vec<Expr>),

    /// A matrix symbol, such as `A`. Its dimensions are opaque.
    MatrixSymbol(String),

    /// The identity matrix of a (possibly symbolic) size.
    Identity(Expr),

    /// The zero matrix with (possibly symbolic) dimensions.
    ZeroMatrix(Expr, Expr),

    /// A square matrix described by its diagonal entries.
    Diagonal(Vec<Expr>),

    /// A dense matrix literal with row-major scalar entries.
    Dense {
        nrows: usize,
        ncols: usize,
        values: Vec<Expr>,
    },

    /// A canonical sum of matrix terms.
    MatrixAdd(Vec<Expr>),

    /// A canonical matrix product with an extracted scalar coefficient.
    /// Factor order is meaningful: matrix multiplication does not commute.
    MatrixMul { scalar: Expr, factors: Vec<Expr> },

    /// The trace of a matrix expression the trace rules could not reduce.
    /// Scalar-valued.
    Trace(Expr),

    /// An unevaluated derivative of a matrix symbol with respect to a
    /// multiset of scalar symbols. The multiset is stored sorted by the key
    /// order, so its stored order is canonical.
    MatrixDerivative { arg: Expr, vars: Vec<Expr> },
}

impl ExprKind {
    /// Kind rank: scalar kinds before matrix kinds, declaration order within.
    /// Doubles as the hash discriminant so hashes stay stable across runs.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            Self::Integer(_) => 0,
            Self::Rational(_) => 1,
            Self::Symbol(_) => 2,
            Self::Add(_) => 3,
            Self::Mul(_) => 4,
            Self::MatrixSymbol(_) => 5,
            Self::Identity(_) => 6,
            Self::ZeroMatrix(..) => 7,
            Self::Diagonal(_) => 8,
            Self::Dense { .. } => 9,
            Self::MatrixAdd(_) => 10,
            Self::MatrixMul { .. } => 11,
            Self::Trace(_) => 12,
            Self::MatrixDerivative { .. } => 13,
        }
    }
}

/// Pairwise multiset matching. Each right-hand element may be consumed at
/// most once, so duplicate terms are counted correctly.
fn multiset_eq(lhs: &[Expr], rhs: &[Expr]) -> bool {
    if lhs.len() != rhs.len() {
        return false;
    }
    let mut used = vec![false; rhs.len()];
    'terms: for p in lhs {
        for (q, used) in rhs.iter().zip(used.iter_mut()) {
            if !*used && p == q {
                *used = true;
                continue 'terms;
            }
        }
        return false;
    }
    true
}

/// Structural equality. Sums and scalar products compare their children as
/// multisets; every other kind compares field by field in stored order.
impl PartialEq for ExprKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Rational(a), Self::Rational(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::MatrixSymbol(a), Self::MatrixSymbol(b)) => a == b,
            (Self::Add(a), Self::Add(b))
            | (Self::Mul(a), Self::Mul(b))
            | (Self::MatrixAdd(a), Self::MatrixAdd(b)) => multiset_eq(a, b),
            (Self::Identity(a), Self::Identity(b)) => a == b,
            (Self::ZeroMatrix(r1, c1), Self::ZeroMatrix(r2, c2)) => r1 == r2 && c1 == c2,
            (Self::Diagonal(a), Self::Diagonal(b)) => a == b,
            (
                Self::Dense { nrows: m1, ncols: n1, values: v1 },
                Self::Dense { nrows: m2, ncols: n2, values: v2 },
            ) => m1 == m2 && n1 == n2 && v1 == v2,
            (
                Self::MatrixMul { scalar: s1, factors: f1 },
                Self::MatrixMul { scalar: s2, factors: f2 },
            ) => s1 == s2 && f1 == f2,
            (Self::Trace(a), Self::Trace(b)) => a == b,
            (
                Self::MatrixDerivative { arg: a1, vars: v1 },
                Self::MatrixDerivative { arg: a2, vars: v2 },
            ) => a1 == a2 && v1 == v2,
            _ => false,
        }
    }
}

/// The hash folds sequence fields in stored order, even though sums compare
/// as multisets. The canonicalizing constructors sort every sum they build by
/// the key order, so equal canonical expressions hash identically; only
/// nodes that bypass canonicalization could observe the mismatch, and no
/// public path builds such nodes.
impl Hash for ExprKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(self.rank());
        match self {
            Self::Integer(n) => n.hash(state),
            Self::Rational(r) => r.hash(state),
            Self::Symbol(name) | Self::MatrixSymbol(name) => name.hash(state),
            Self::Add(children)
            | Self::Mul(children)
            | Self::MatrixAdd(children)
            | Self::Diagonal(children) => children.hash(state),
            Self::Identity(e) | Self::Trace(e) => e.hash(state),
            Self::ZeroMatrix(r, c) => {
                r.hash(state);
                c.hash(state);
            }
            Self::Dense { nrows, ncols, values } => {
                nrows.hash(state);
                ncols.hash(state);
                values.hash(state);
            }
            Self::MatrixMul { scalar, factors } => {
                scalar.hash(state);
                factors.hash(state);
            }
            Self::MatrixDerivative { arg, vars } => {
                arg.hash(state);
                vars.hash(state);
            }
        }
    }
}

fn write_joined(f: &mut Formatter<'_>, children: &[Expr], sep: &str) -> fmt::Result {
    let mut iter = children.iter();
    if let Some(first) = iter.next() {
        write!(f, "{first}")?;
        for child in iter {
            write!(f, "{sep}{child}")?;
        }
    }
    Ok(())
}

/// Writes a product factor, parenthesizing sums.
fn write_factor(f: &mut Formatter<'_>, factor: &Expr) -> fmt::Result {
    match factor.kind() {
        ExprKind::Add(_) | ExprKind::MatrixAdd(_) => write!(f, "({factor})"),
        _ => write!(f, "{factor}"),
    }
}

impl Display for ExprKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Rational(r) => write!(f, "{r}"),
            Self::Symbol(name) | Self::MatrixSymbol(name) => write!(f, "{name}"),
            Self::Add(terms) | Self::MatrixAdd(terms) => write_joined(f, terms, " + "),
            Self::Mul(factors) => {
                let mut iter = factors.iter();
                if let Some(first) = iter.next() {
                    write_factor(f, first)?;
                    for factor in iter {
                        write!(f, "*")?;
                        write_factor(f, factor)?;
                    }
                }
                Ok(())
            }
            Self::Identity(n) => write!(f, "I({n})"),
            Self::ZeroMatrix(r, c) => write!(f, "O({r}, {c})"),
            Self::Diagonal(entries) => {
                write!(f, "diag(")?;
                write_joined(f, entries, ", ")?;
                write!(f, ")")
            }
            Self::Dense { nrows, ncols, values } => {
                write!(f, "[")?;
                for i in 0..*nrows {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "[")?;
                    write_joined(f, &values[i * ncols..(i + 1) * ncols], ", ")?;
                    write!(f, "]")?;
                }
                write!(f, "]")
            }
            Self::MatrixMul { scalar, factors } => {
                if !matches!(scalar.kind(), Self::Integer(n) if *n == 1) {
                    write_factor(f, scalar)?;
                    write!(f, "*")?;
                }
                let mut iter = factors.iter();
                if let Some(first) = iter.next() {
                    write_factor(f, first)?;
                    for factor in iter {
                        write!(f, "*")?;
                        write_factor(f, factor)?;
                    }
                }
                Ok(())
            }
            Self::Trace(arg) => write!(f, "trace({arg})"),
            Self::MatrixDerivative { arg, vars } => {
                write!(f, "Derivative({arg}")?;
                for var in vars {
                    write!(f, ", {var}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::collections::hash_map::DefaultHasher;
    use super::*;

    fn hash_of(expr: &Expr) -> u64 {
        let mut hasher = DefaultHasher::new();
        expr.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn rational_demotes_to_integer() {
        let four_halves = Expr::rational(crate::primitive::rat(4, 2));
        assert_eq!(four_halves, Expr::integer(2));
        assert!(matches!(four_halves.kind(), ExprKind::Integer(_)));
    }

    #[test]
    fn structural_equality_is_shared_or_deep() {
        let a = Expr::matrix_symbol("A");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a, Expr::matrix_symbol("A"));
        assert_ne!(a, Expr::matrix_symbol("B"));
        // a scalar symbol and a matrix symbol with the same name differ
        assert_ne!(Expr::symbol("A"), Expr::matrix_symbol("A"));
    }

    #[test]
    fn sum_equality_ignores_term_order() {
        let a = Expr::matrix_symbol("A");
        let b = Expr::matrix_symbol("B");
        let ab = Expr::matrix_add_node(vec![a.clone(), b.clone()]);
        let ba = Expr::matrix_add_node(vec![b, a]);
        assert_eq!(ab, ba);
    }

    #[test]
    fn sum_equality_counts_duplicates() {
        let a = Expr::matrix_symbol("A");
        let b = Expr::matrix_symbol("B");
        let aab = Expr::matrix_add_node(vec![a.clone(), a.clone(), b.clone()]);
        let abb = Expr::matrix_add_node(vec![a, b.clone(), b]);
        assert_ne!(aab, abb);
    }

    #[test]
    fn equal_nodes_hash_alike() {
        let x = Expr::symbol("x");
        let tr = Expr::trace_node(Expr::matrix_symbol("A"));
        assert_eq!(hash_of(&x), hash_of(&Expr::symbol("x")));
        assert_eq!(hash_of(&tr), hash_of(&Expr::trace_node(Expr::matrix_symbol("A"))));
        assert_ne!(hash_of(&x), hash_of(&Expr::matrix_symbol("x")));
    }

    #[test]
    fn args_lists_children() {
        let n = Expr::symbol("n");
        assert!(Expr::matrix_symbol("A").args().is_empty());
        assert_eq!(Expr::identity(n.clone()).args(), vec![n.clone()]);
        assert_eq!(
            Expr::zero_matrix(n.clone(), Expr::integer(3)).args(),
            vec![n, Expr::integer(3)]
        );
    }

    #[test]
    fn trace_is_not_matrix_valued() {
        let tr = Expr::trace_node(Expr::matrix_symbol("A"));
        assert!(!tr.is_matrix());
        assert!(Expr::matrix_symbol("A").is_matrix());
        assert!(!Expr::symbol("x").is_matrix());
    }

    #[test]
    #[should_panic(expected = "nrows * ncols")]
    fn dense_checks_entry_count() {
        Expr::dense(2, 2, vec![Expr::integer(1)]);
    }

    #[test]
    fn display_reads_naturally() {
        let dense = Expr::dense(
            2,
            2,
            vec![
                Expr::integer(1),
                Expr::integer(2),
                Expr::integer(3),
                Expr::integer(4),
            ],
        );
        assert_eq!(dense.to_string(), "[[1, 2], [3, 4]]");
        assert_eq!(
            Expr::diagonal(vec![Expr::symbol("a"), Expr::symbol("b")]).to_string(),
            "diag(a, b)"
        );
        assert_eq!(Expr::identity(Expr::symbol("n")).to_string(), "I(n)");
    }
}
