//! Savings Constants
//!
//! Numeric conventions shared by the auto-savings pallet and anything that builds
//! savings policies for it (runtime glue, front-ends, tests).

/// Integer units of 1/10_000 (0.01%).
pub type BasisPoints = u16;

/// 100% expressed in basis points. Upper bound for every basis-point field.
pub const MAX_BASIS_POINTS: BasisPoints = 10_000;

/// Returns true when `value` is a valid basis-point quantity (0..=100%).
pub const fn is_valid_basis_points(value: BasisPoints) -> bool {
  value <= MAX_BASIS_POINTS
}
