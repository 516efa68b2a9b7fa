//! Step-length bound and backtracking line search.

use crate::operator::TransformOps;
use crate::util::numerics::{dot, norm2_sq};

use super::solve::barrier_functional;
use super::workspace::{GradData, LineSearchScratch};

/// Sufficient-decrease fraction (Armijo constant).
pub const LS_ALPHA: f64 = 0.01;

/// Backtracking shrink factor.
pub const LS_BETA: f64 = 0.5;

/// Retry budget before the search is declared stalled.
pub const LS_MAX_BACKTRACK: usize = 32;

/// Per-step line search configuration.
pub struct LineSearchParams {
    pub alpha: f64,
    pub beta: f64,
    pub tau: f64,
    pub epsilon: f64,
    pub s_init: f64,
}

/// Line search outcome.
pub struct LineSearchStatus {
    /// Accepted step length (meaningless when `success` is false).
    pub step: f64,

    /// Backtracks taken before acceptance or exhaustion.
    pub backtracks: usize,

    /// Directional derivative `gradf . [dx; du]` at the starting iterate.
    pub gdx: f64,

    /// False when the retry budget was exhausted; the iterate is unchanged.
    pub success: bool,
}

/// Largest step keeping the iterate strictly inside the barrier domain.
///
/// Combines the slack margins (`fu1`, `fu2` must stay negative) with the
/// quadratic constraint boundary along the step, capped at 1. Also computes
/// `adx = A dx` as a side effect; the line search reuses it to update the
/// residual without further operator applications.
pub fn find_max_step(
    gd: &GradData,
    fu1: &[f64],
    fu2: &[f64],
    r: &[f64],
    adx: &mut [f64],
    epsilon: f64,
    ops: &mut dyn TransformOps,
) -> f64 {
    ops.ax(&gd.dx, adx);

    let aqe = norm2_sq(adx);
    let bqe = 2.0 * dot(r, adx);
    let cqe = norm2_sq(r) - epsilon * epsilon;

    let mut smax = 1.0_f64;
    for i in 0..fu1.len() {
        let dxu1 = gd.dx[i] - gd.du[i];
        if dxu1 > 0.0 {
            smax = smax.min(-fu1[i] / dxu1);
        }
        let dxu2 = -gd.dx[i] - gd.du[i];
        if dxu2 > 0.0 {
            smax = smax.min(-fu2[i] / dxu2);
        }
    }
    if aqe > 0.0 {
        let disc = bqe * bqe - 4.0 * aqe * cqe;
        if disc >= 0.0 {
            smax = smax.min((-bqe + disc.sqrt()) / (2.0 * aqe));
        }
    }
    smax
}

/// Backtracking line search on the barrier functional.
///
/// Starts from `p.s_init` and shrinks by `p.beta` until the Armijo
/// condition `f(x + s d) <= f + alpha * s * (gradf . d)` holds. Trial
/// points that leave the barrier domain evaluate to `+inf` and are rejected
/// without log calls. On acceptance the iterate (`x`, `u`, `r`, margins,
/// `fe`, `f`) is updated in place; on exhaustion everything is left as it
/// was.
pub fn line_search(
    x: &mut [f64],
    u: &mut [f64],
    r: &mut [f64],
    fu1: &mut [f64],
    fu2: &mut [f64],
    gd: &GradData,
    adx: &[f64],
    sc: &mut LineSearchScratch,
    fe: &mut f64,
    f: &mut f64,
    p: &LineSearchParams,
) -> LineSearchStatus {
    let n = x.len();
    let m = r.len();
    let gdx = dot(&gd.gradf[..n], &gd.dx) + dot(&gd.gradf[n..], &gd.du);

    let mut s = p.s_init;
    for backtracks in 0..LS_MAX_BACKTRACK {
        for i in 0..n {
            sc.xp[i] = x[i] + s * gd.dx[i];
            sc.up[i] = u[i] + s * gd.du[i];
            sc.fu1p[i] = sc.xp[i] - sc.up[i];
            sc.fu2p[i] = -sc.xp[i] - sc.up[i];
        }
        for i in 0..m {
            sc.rp[i] = r[i] + s * adx[i];
        }
        let fep = 0.5 * (norm2_sq(&sc.rp) - p.epsilon * p.epsilon);
        let fp = barrier_functional(&sc.up, &sc.fu1p, &sc.fu2p, fep, p.tau);

        if fp <= *f + p.alpha * s * gdx {
            x.copy_from_slice(&sc.xp);
            u.copy_from_slice(&sc.up);
            r.copy_from_slice(&sc.rp);
            fu1.copy_from_slice(&sc.fu1p);
            fu2.copy_from_slice(&sc.fu2p);
            *fe = fep;
            *f = fp;
            return LineSearchStatus {
                step: s,
                backtracks,
                gdx,
                success: true,
            };
        }
        s *= p.beta;
    }

    LineSearchStatus {
        step: 0.0,
        backtracks: LS_MAX_BACKTRACK,
        gdx,
        success: false,
    }
}
