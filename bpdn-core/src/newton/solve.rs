//! Solver entry point and continuation loop.

use log::{debug, info, log_enabled, trace, Level};

use crate::error::SolverError;
use crate::operator::TransformOps;
use crate::problem::{L1qcParams, LbResult, SolveStatus};
use crate::util::numerics::{max_abs, norm1, norm2, norm2_sq};

use super::descent::descent_dir;
use super::linesearch::{find_max_step, line_search, LineSearchParams, LS_ALPHA, LS_BETA};
use super::workspace::NewtonWorkspace;

/// Initialize the epigraph slacks and derive the continuation schedule.
///
/// Slacks start strictly above `|x_i|` so the iterate is interior:
/// `u_i = slack_scale * |x_i| + slack_offset * max|x|`. When unset, the
/// initial barrier weight and stage count are derived so the final
/// duality-gap estimate `(2n+1)/tau` lands below `lbtol`.
///
/// The derived weight scales with `1/||x||_1`; an all-zero `x` falls back
/// to `tau0 = 1` (the entry point rejects zero starts before reaching
/// here, since the slacks would not be interior).
pub fn barrier_init(x: &[f64], u: &mut [f64], params: &L1qcParams) -> (f64, usize) {
    let n = x.len();
    let xmax = max_abs(x);
    for i in 0..n {
        u[i] = params.slack_scale * x[i].abs() + params.slack_offset * xmax;
    }

    let gap = (2 * n + 1) as f64;
    let l1 = norm1(x);
    let tau0 = params
        .tau
        .unwrap_or_else(|| if l1 > 0.0 { (gap / l1).max(1.0) } else { 1.0 });
    let lbiter = params.lbiter.unwrap_or_else(|| {
        let stages = ((gap.ln() - params.lbtol.ln() - tau0.ln()) / params.mu.ln()).ceil();
        (stages as isize).max(1) as usize
    });
    (tau0, lbiter)
}

/// Barrier functional at the given margins.
///
/// Returns `+inf` when any log argument is outside the domain, which the
/// line search uses to reject exterior trial points.
pub(crate) fn barrier_functional(
    u: &[f64],
    fu1: &[f64],
    fu2: &[f64],
    fe: f64,
    tau: f64,
) -> f64 {
    if fe >= 0.0 {
        return f64::INFINITY;
    }
    let mut log_sum = (-fe).ln();
    for i in 0..u.len() {
        if fu1[i] >= 0.0 || fu2[i] >= 0.0 {
            return f64::INFINITY;
        }
        log_sum += (-fu1[i]).ln() + (-fu2[i]).ln();
    }
    u.iter().sum::<f64>() - log_sum / tau
}

/// Evaluate the residual, barrier margins, and functional value at `(x, u)`.
pub(crate) fn f_eval(
    x: &[f64],
    u: &[f64],
    b: &[f64],
    epsilon: f64,
    tau: f64,
    ops: &mut dyn TransformOps,
    r: &mut [f64],
    fu1: &mut [f64],
    fu2: &mut [f64],
) -> (f64, f64) {
    ops.ax(x, r);
    for i in 0..r.len() {
        r[i] -= b[i];
    }
    for i in 0..x.len() {
        fu1[i] = x[i] - u[i];
        fu2[i] = -x[i] - u[i];
    }
    let fe = 0.5 * (norm2_sq(r) - epsilon * epsilon);
    let f = barrier_functional(u, fu1, fu2, fe, tau);
    (fe, f)
}

/// Minimize `||x||_1` subject to `||A x - b||_2 <= epsilon`.
///
/// `x` holds the starting point on entry and the solution on return. The
/// starting point must be strictly feasible (`||A x0 - b|| < epsilon`); the
/// adjoint image `x0 = A^T b` is a natural choice when the operator's rows
/// are orthonormal.
///
/// Non-convergence is reported through [`LbResult::status`], never as an
/// error; errors are reserved for invalid inputs.
pub fn l1qc_newton(
    x: &mut [f64],
    b: &[f64],
    params: &L1qcParams,
    ops: &mut dyn TransformOps,
) -> Result<LbResult, SolverError> {
    params.validate()?;

    let n = ops.n();
    let m = ops.m();
    if m > n {
        return Err(SolverError::InvalidArgument(format!(
            "operator must be underdetermined (m <= n), got m = {}, n = {}",
            m, n
        )));
    }
    if x.len() != n || b.len() != m {
        return Err(SolverError::InvalidArgument(format!(
            "dimension mismatch: operator is {}x{}, got x of length {} and b of length {}",
            m,
            n,
            x.len(),
            b.len()
        )));
    }
    if max_abs(x) == 0.0 {
        return Err(SolverError::InvalidArgument(
            "starting point must be nonzero (the slack initializer and the \
             barrier schedule are scaled by it)"
                .to_string(),
        ));
    }

    let mut ws = NewtonWorkspace::new(n, m);

    ops.ax(x, &mut ws.r);
    for i in 0..m {
        ws.r[i] -= b[i];
    }
    let resid = norm2(&ws.r);
    if resid >= params.epsilon {
        return Err(SolverError::InfeasibleStart {
            resid,
            epsilon: params.epsilon,
        });
    }

    let (tau0, lbiter) = barrier_init(x, &mut ws.u, params);
    let mut tau = tau0;
    debug!(
        "barrier schedule: tau0 = {:.4e}, {} stages, mu = {}",
        tau0, lbiter, params.mu
    );

    let mut status = SolveStatus::Converged;
    let mut total_newton_iter = 0;
    let mut total_cg_iter = 0;
    let mut l1_prev = norm1(x);
    let mut stalled = false;

    for stage in 0..lbiter {
        if stage > 0 {
            tau *= params.mu;
        }
        let (mut fe, mut f) = f_eval(
            x, &ws.u, b, params.epsilon, tau, ops, &mut ws.r, &mut ws.fu1, &mut ws.fu2,
        );
        debug_assert!(f.is_finite(), "stage start left the barrier domain");

        let mut stage_newton_iter = 0;
        loop {
            let cg_res = descent_dir(
                &ws.fu1,
                &ws.fu2,
                &ws.r,
                fe,
                tau,
                &mut ws.atr,
                &mut ws.sigx,
                &mut ws.atax_work,
                &mut ws.gd,
                &mut ws.cg,
                &params.cg,
                params.warm_start_cg,
                ops,
            );
            total_cg_iter += cg_res.iterations;

            let smax = find_max_step(
                &ws.gd, &ws.fu1, &ws.fu2, &ws.r, &mut ws.adx, params.epsilon, ops,
            );
            let ls_params = LineSearchParams {
                alpha: LS_ALPHA,
                beta: LS_BETA,
                tau,
                epsilon: params.epsilon,
                s_init: 0.99 * smax,
            };
            let ls = line_search(
                x, &mut ws.u, &mut ws.r, &mut ws.fu1, &mut ws.fu2, &ws.gd, &ws.adx,
                &mut ws.ls, &mut fe, &mut f, &ls_params,
            );
            stage_newton_iter += 1;
            total_newton_iter += 1;

            if !ls.success {
                info!(
                    "stage {}: line search stalled after {} backtracks, \
                     keeping previous iterate",
                    stage + 1,
                    ls.backtracks
                );
                status = SolveStatus::LineSearchStalled;
                stalled = true;
                break;
            }

            let lambda2 = -ls.gdx;
            if params.verbose >= 2 || log_enabled!(Level::Trace) {
                let line = format!(
                    "stage {:2} newton {:3}: f = {:12.6e}, lambda^2/2 = {:10.4e}, \
                     step = {:.3e} ({} backtracks), cg = {} iters (res {:.2e})",
                    stage + 1,
                    stage_newton_iter,
                    f,
                    lambda2 / 2.0,
                    ls.step,
                    ls.backtracks,
                    cg_res.iterations,
                    cg_res.residual
                );
                if params.verbose >= 2 {
                    info!("{}", line);
                } else {
                    trace!("{}", line);
                }
            }

            if lambda2 / 2.0 < params.newton_tol {
                break;
            }
            if stage_newton_iter >= params.newton_max_iter {
                debug!(
                    "stage {}: newton iteration ceiling ({}) reached",
                    stage + 1,
                    params.newton_max_iter
                );
                if status == SolveStatus::Converged {
                    status = SolveStatus::MaxIters;
                }
                break;
            }
        }

        let l1 = norm1(x);
        let stage_line = format!(
            "stage {:2}/{}: tau = {:10.4e}, ||x||_1 = {:12.6e}, \
             newton iters = {}, total cg = {}",
            stage + 1,
            lbiter,
            tau,
            l1,
            stage_newton_iter,
            total_cg_iter
        );
        if params.verbose >= 1 {
            info!("{}", stage_line);
        } else {
            debug!("{}", stage_line);
        }

        if stalled {
            break;
        }
        if params.l1_tol > 0.0 && stage > 0 {
            let rel_change = (l1 - l1_prev).abs() / l1_prev;
            if rel_change < params.l1_tol {
                debug!(
                    "early exit at stage {}: relative ||x||_1 change {:.3e} < {:.3e}",
                    stage + 1,
                    rel_change,
                    params.l1_tol
                );
                break;
            }
        }
        l1_prev = l1;
    }

    Ok(LbResult {
        l1: norm1(x),
        tau,
        total_newton_iter,
        total_cg_iter,
        status,
    })
}
