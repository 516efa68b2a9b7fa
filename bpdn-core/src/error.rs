//! Solver error taxonomy.
//!
//! Only failures that abort a solve before (or instead of) producing an
//! iterate live here. Non-convergence is *not* an error: the best iterate is
//! still usable for recovery, so it is reported through
//! [`SolveStatus`](crate::problem::SolveStatus) instead.

use thiserror::Error;

/// Errors returned by the solver entry point and operator backends.
#[derive(Error, Debug)]
pub enum SolverError {
    /// Dimension mismatch, non-positive tolerance, or malformed operator
    /// bundle. Rejected before any iteration starts.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The initial iterate violates the quadratic constraint, so the
    /// log-barrier domain is empty at the starting point.
    #[error(
        "infeasible starting point: ||A*x0 - b||_2 = {resid:.6e} \
         must be strictly below epsilon = {epsilon:.6e}"
    )]
    InfeasibleStart {
        /// Residual norm at the starting point.
        resid: f64,
        /// Constraint tolerance requested by the caller.
        epsilon: f64,
    },

    /// Operator backend setup failed (propagated unchanged).
    #[error("operator setup failed: {0}")]
    OperatorInit(String),
}
