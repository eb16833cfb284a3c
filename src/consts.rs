//! Scalar constants used throughout the library. Cloning a constant only
//! bumps a reference count.

use crate::expr::Expr;
use once_cell::sync::Lazy;

pub static ZERO: Lazy<Expr> = Lazy::new(|| Expr::integer(0));

pub static ONE: Lazy<Expr> = Lazy::new(|| Expr::integer(1));

pub static MINUS_ONE: Lazy<Expr> = Lazy::new(|| Expr::integer(-1));
