//! Log-barrier Newton solver for quadratically-constrained basis pursuit.
//!
//! The problem `min ||x||_1 s.t. ||Ax - b||_2 <= epsilon` is lifted with
//! epigraph slacks `u` and solved by barrier continuation: each stage
//! minimizes the barrier functional at a fixed weight `tau` with a damped
//! Newton method, then grows `tau` by `mu` and repeats. The Newton system is
//! reduced to an `n x n` positive definite system applied matrix-free and
//! solved by conjugate gradients.

pub mod descent;
pub mod linesearch;
pub mod solve;
pub mod workspace;
