//! The matrix side of the algebra: canonicalizing constructors over the
//! matrix node kinds.
//!
//! Each constructor accepts freshly combined inputs and returns the unique
//! canonical representative of the result, which may be a different node
//! kind than the one requested: a sum can collapse to a single term or a
//! zero matrix, a product can collapse to a factor, a zero, or an identity,
//! and a trace can reduce all the way to a number.
//!
//! Dimensions are checked, never assumed: a constructor only rejects inputs
//! whose dimensions are *provably* inconsistent, and degrades to an
//! unreduced symbolic node whenever the question is undecidable.

mod add;
pub(crate) mod derivative;
mod mul;
mod size;
mod trace;

pub use add::matrix_add;
pub use derivative::matrix_derivative;
pub use mul::matrix_mul;
pub use size::{is_square, size};
pub use trace::trace;
