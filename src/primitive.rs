//! Functions to construct [`Integer`]s and [`Rational`]s from various types.

use rug::{Integer, Rational};

/// Creates an [`Integer`] with the given value.
pub fn int<T>(n: T) -> Integer
where
    Integer: From<T>,
{
    Integer::from(n)
}

/// Creates a [`Rational`] with the given numerator and denominator.
///
/// # Panics
///
/// Panics if the denominator is zero.
pub fn rat<N, D>(numer: N, denom: D) -> Rational
where
    Integer: From<N> + From<D>,
{
    let denom = Integer::from(denom);
    assert!(denom != 0, "rational denominator cannot be zero");
    Rational::from((Integer::from(numer), denom))
}
