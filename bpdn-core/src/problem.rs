//! Solver configuration and result records.
//!
//! This module defines the caller-facing parameter structs, their defaults
//! and validation, and the records a solve produces.

use std::fmt;

use crate::error::SolverError;

/// Parameters for the embedded conjugate-gradient solver.
#[derive(Debug, Clone, Copy)]
pub struct CgParams {
    /// Relative-residual tolerance: stop when `||r - Hz|| / ||r|| < tol`.
    pub tol: f64,

    /// Iteration ceiling. Exhausting it is not an error; the best iterate
    /// found so far is returned.
    pub max_iter: usize,

    /// Emit a trace line per CG iteration.
    pub verbose: bool,
}

impl Default for CgParams {
    fn default() -> Self {
        Self {
            tol: 1e-8,
            max_iter: 500,
            verbose: false,
        }
    }
}

/// Log-barrier Newton solver parameters.
///
/// Immutable during a solve. `tau` and `lbiter` are auto-derived from
/// `lbtol`/`mu` when left unset, which is the recommended mode.
#[derive(Debug, Clone)]
pub struct L1qcParams {
    /// Quadratic constraint tolerance: `||A x - b||_2 <= epsilon`.
    pub epsilon: f64,

    /// Barrier growth factor applied between continuation stages.
    /// Must exceed 1 when the stage count is auto-derived.
    pub mu: f64,

    /// Initial barrier weight. `None` derives
    /// `tau0 = max((2N+1)/||x0||_1, 1)` so the initial duality gap matches
    /// the magnitude of the starting point.
    pub tau: Option<f64>,

    /// Number of barrier continuation stages. `None` derives the count so
    /// the final duality-gap estimate `(2N+1)/tau` falls below `lbtol`.
    pub lbiter: Option<usize>,

    /// Target on the log-barrier duality-gap estimate at termination.
    pub lbtol: f64,

    /// Newton decrement tolerance for the inner loop (`lambda^2/2`).
    pub newton_tol: f64,

    /// Inner Newton iteration ceiling per continuation stage.
    /// Exhausting it is reported in the result status, not fatal.
    pub newton_max_iter: usize,

    /// Early exit: stop the continuation when the relative change in
    /// `||x||_1` between stages drops below this. `0.0` disables it.
    pub l1_tol: f64,

    /// Slack initializer scale: `u_i = slack_scale*|x_i| + slack_offset*max|x|`.
    /// Empirical tuning constants; they affect convergence speed, not
    /// correctness.
    pub slack_scale: f64,

    /// Slack initializer offset (see `slack_scale`).
    pub slack_offset: f64,

    /// Sub-parameters for the per-Newton-step CG solve.
    pub cg: CgParams,

    /// Seed each CG solve with the previous Newton step's `dx` instead of
    /// the zero vector.
    pub warm_start_cg: bool,

    /// Verbosity level: 0 silent (trace/debug only), 1 per-stage tables,
    /// 2 per-Newton-iteration tables.
    pub verbose: u32,
}

impl Default for L1qcParams {
    fn default() -> Self {
        Self {
            epsilon: 1e-3,
            mu: 10.0,
            tau: None,
            lbiter: None,
            lbtol: 1e-3,
            newton_tol: 1e-3,
            newton_max_iter: 50,
            l1_tol: 0.0,
            slack_scale: 0.95,
            slack_offset: 0.10,
            cg: CgParams::default(),
            warm_start_cg: false,
            verbose: 0,
        }
    }
}

impl L1qcParams {
    /// Validate parameter values. Called by the entry point before any
    /// iteration starts.
    pub fn validate(&self) -> Result<(), SolverError> {
        if !(self.epsilon > 0.0) {
            return Err(SolverError::InvalidArgument(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        if !(self.lbtol > 0.0) {
            return Err(SolverError::InvalidArgument(format!(
                "lbtol must be positive, got {}",
                self.lbtol
            )));
        }
        if !(self.newton_tol > 0.0) {
            return Err(SolverError::InvalidArgument(format!(
                "newton_tol must be positive, got {}",
                self.newton_tol
            )));
        }
        if self.newton_max_iter == 0 {
            return Err(SolverError::InvalidArgument(
                "newton_max_iter must be at least 1".to_string(),
            ));
        }
        if !(self.mu > 0.0) {
            return Err(SolverError::InvalidArgument(format!(
                "mu must be positive, got {}",
                self.mu
            )));
        }
        if self.lbiter.is_none() && self.mu <= 1.0 {
            return Err(SolverError::InvalidArgument(format!(
                "mu must exceed 1 when the continuation stage count is auto-derived, got {}",
                self.mu
            )));
        }
        if let Some(tau) = self.tau {
            if !(tau > 0.0) {
                return Err(SolverError::InvalidArgument(format!(
                    "tau must be positive, got {}",
                    tau
                )));
            }
        }
        if self.l1_tol < 0.0 {
            return Err(SolverError::InvalidArgument(format!(
                "l1_tol must be non-negative, got {}",
                self.l1_tol
            )));
        }
        if !(self.slack_scale > 0.0) || self.slack_offset < 0.0 {
            return Err(SolverError::InvalidArgument(format!(
                "slack initializer constants out of range: scale={}, offset={}",
                self.slack_scale, self.slack_offset
            )));
        }
        if !(self.cg.tol > 0.0) {
            return Err(SolverError::InvalidArgument(format!(
                "cg.tol must be positive, got {}",
                self.cg.tol
            )));
        }
        if self.cg.max_iter == 0 {
            return Err(SolverError::InvalidArgument(
                "cg.max_iter must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Solve termination status.
///
/// Every variant returns the best iterate found; only `Converged` means all
/// requested tolerances were met.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Continuation schedule completed (or `l1_tol` early exit triggered)
    /// with every inner loop meeting its decrement tolerance.
    Converged,

    /// At least one Newton inner loop exhausted `newton_max_iter` without
    /// meeting `newton_tol`. The outer loop still ran to completion.
    MaxIters,

    /// The backtracking line search exhausted its retry budget; the solve
    /// stopped with the previous iterate.
    LineSearchStalled,
}

impl SolveStatus {
    /// True for fully-converged solves.
    pub fn is_success(&self) -> bool {
        matches!(self, SolveStatus::Converged)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Converged => write!(f, "Converged"),
            SolveStatus::MaxIters => write!(f, "MaxIters"),
            SolveStatus::LineSearchStalled => write!(f, "LineSearchStalled"),
        }
    }
}

/// Log-barrier solve result.
///
/// Produced once per solve; the solution itself is written into the
/// caller-owned `x` buffer passed to the entry point.
#[derive(Debug, Clone, Copy)]
pub struct LbResult {
    /// Final objective value `||x||_1`.
    pub l1: f64,

    /// Barrier weight of the last executed continuation stage,
    /// `tau0 * mu^(stages - 1)`. The duality-gap estimate at termination
    /// is `(2n+1)/tau`.
    pub tau: f64,

    /// Newton iterations summed across all continuation stages.
    pub total_newton_iter: usize,

    /// CG iterations summed across all Newton steps.
    pub total_cg_iter: usize,

    /// Termination status.
    pub status: SolveStatus,
}
