//! Preallocated solver workspace.
//!
//! Every buffer the Newton loop touches is allocated once here, before the
//! first iteration, and reused across all continuation stages.

use crate::cg::CgWork;

/// Gradient and descent-direction buffers for one Newton step.
pub struct GradData {
    /// Full barrier gradient, length `2n` (`x` block then `u` block).
    pub gradf: Vec<f64>,

    /// Primal Newton step. Persists across steps to seed warm-started CG.
    pub dx: Vec<f64>,

    /// Slack Newton step, recovered from `dx` after the CG solve.
    pub du: Vec<f64>,

    /// Diagonal Hessian blocks of the slack system.
    pub sig11: Vec<f64>,
    pub sig12: Vec<f64>,

    /// Slack block of the (unscaled) Newton gradient.
    pub ntgu: Vec<f64>,

    /// Right-hand side of the reduced `n x n` Newton system.
    pub w1p: Vec<f64>,
}

impl GradData {
    fn new(n: usize) -> Self {
        Self {
            gradf: vec![0.0; 2 * n],
            dx: vec![0.0; n],
            du: vec![0.0; n],
            sig11: vec![0.0; n],
            sig12: vec![0.0; n],
            ntgu: vec![0.0; n],
            w1p: vec![0.0; n],
        }
    }
}

/// Trial-point buffers for the backtracking line search.
pub struct LineSearchScratch {
    pub xp: Vec<f64>,
    pub up: Vec<f64>,
    pub fu1p: Vec<f64>,
    pub fu2p: Vec<f64>,
    pub rp: Vec<f64>,
}

impl LineSearchScratch {
    fn new(n: usize, m: usize) -> Self {
        Self {
            xp: vec![0.0; n],
            up: vec![0.0; n],
            fu1p: vec![0.0; n],
            fu2p: vec![0.0; n],
            rp: vec![0.0; m],
        }
    }
}

/// All state for one log-barrier solve.
///
/// `n` is the primal dimension, `m` the observation dimension.
pub struct NewtonWorkspace {
    /// Epigraph slacks, `|x_i| < u_i` throughout the solve.
    pub u: Vec<f64>,

    /// Slack margins `fu1 = x - u`, `fu2 = -x - u` (both negative in the
    /// barrier domain).
    pub fu1: Vec<f64>,
    pub fu2: Vec<f64>,

    /// Adjoint of the current residual, `A^T r`.
    pub atr: Vec<f64>,

    /// Diagonal of the reduced Hessian's separable part.
    pub sigx: Vec<f64>,

    /// Scratch `n`-vector for normal-operator applications inside CG.
    pub atax_work: Vec<f64>,

    /// Constraint residual `r = A x - b`.
    pub r: Vec<f64>,

    /// Forward image of the Newton step, `A dx`. Computed by the step-length
    /// bound and reused by the line search.
    pub adx: Vec<f64>,

    pub gd: GradData,
    pub cg: CgWork,
    pub ls: LineSearchScratch,
}

impl NewtonWorkspace {
    /// Allocate all buffers for an `n`-primal, `m`-observation problem.
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            u: vec![0.0; n],
            fu1: vec![0.0; n],
            fu2: vec![0.0; n],
            atr: vec![0.0; n],
            sigx: vec![0.0; n],
            atax_work: vec![0.0; n],
            r: vec![0.0; m],
            adx: vec![0.0; m],
            gd: GradData::new(n),
            cg: CgWork::new(n),
            ls: LineSearchScratch::new(n, m),
        }
    }
}
