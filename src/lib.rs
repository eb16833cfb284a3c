//! Symbolic matrix expressions with canonicalizing constructors.
//!
//! # Expression representation
//!
//! Expressions are immutable trees of [`Expr`] handles; a single
//! [`ExprKind`] enum covers scalar kinds (exact numbers, symbols, sums,
//! products) and matrix kinds (matrix symbols, identity/zero/diagonal/dense
//! literals, matrix sums and products, traces, unevaluated derivatives).
//! Handles share subtrees through reference counting, so cloning is cheap
//! and safe from any thread.
//!
//! # Canonical form
//!
//! Compound nodes are only ever produced by the canonicalizing constructors
//! [`matrix_add`], [`matrix_mul`], [`trace`] and [`matrix_derivative`] (and
//! their scalar counterparts in [`scalar`]). Each constructor normalizes its
//! input: nested sums and products flatten, literal matrices combine, like
//! terms collect with exact coefficients, traces exploit linearity and
//! cyclic invariance, and the surviving terms are ordered deterministically.
//! Two expressions built from semantically equal combinations of the same
//! atoms therefore compare equal (and hash alike) without any separate
//! simplification step.
//!
//! ```
//! use symat::{matrix_add, matrix_mul, trace, Expr};
//!
//! let a = Expr::matrix_symbol("A");
//! let b = Expr::matrix_symbol("B");
//!
//! // A + A + B  ==>  2*A + B
//! let sum = matrix_add(vec![a.clone(), a.clone(), b.clone()]).unwrap();
//! assert_eq!(
//!     sum,
//!     matrix_add(vec![
//!         matrix_mul(vec![Expr::integer(2), a.clone()]).unwrap(),
//!         b.clone(),
//!     ]).unwrap(),
//! );
//!
//! // the trace is cyclic: trace(B*A) == trace(A*B)
//! let ab = matrix_mul(vec![a.clone(), b.clone()]).unwrap();
//! let ba = matrix_mul(vec![b, a]).unwrap();
//! assert_eq!(trace(&ab).unwrap(), trace(&ba).unwrap());
//! ```
//!
//! # Errors and three-valued dimension logic
//!
//! Dimensions may be concrete, symbolic, or unknown. Constructors return an
//! [`Error`] only for *provable* inconsistencies, such as summing a 2x2 with
//! a 2x3 or tracing a matrix that cannot be square. Whenever a question is
//! undecidable the expression stays symbolic instead: `trace` of an `n`-by-
//! `m` zero matrix is an unreduced trace node, not an error.

pub mod consts;
pub mod error;
pub mod expr;
pub mod matrix;
pub mod primitive;
pub mod scalar;

pub use error::Error;
pub use expr::{Expr, ExprKind};
pub use matrix::{is_square, matrix_add, matrix_derivative, matrix_mul, size, trace};
