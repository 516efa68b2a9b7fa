//! Conjugate gradients for the Newton system.
//!
//! Plain CG over a caller-supplied symmetric positive definite operator,
//! tuned for repeated solves inside the Newton loop: scratch lives in a
//! reusable [`CgWork`] and the operator is applied through a closure, so no
//! allocation happens per solve. The best iterate seen is tracked and
//! returned, which keeps an iteration-limited solve usable as a descent
//! direction.

use log::{trace, warn};

use crate::problem::CgParams;
use crate::util::numerics::{axpy, dot};

/// Scratch buffers for [`cgsolve`], sized to the system dimension.
///
/// Allocate once per solver instance and reuse across Newton steps.
pub struct CgWork {
    d: Vec<f64>,
    q: Vec<f64>,
    r: Vec<f64>,
    best_x: Vec<f64>,
}

impl CgWork {
    /// Allocate scratch for `n`-dimensional systems.
    pub fn new(n: usize) -> Self {
        Self {
            d: vec![0.0; n],
            q: vec![0.0; n],
            r: vec![0.0; n],
            best_x: vec![0.0; n],
        }
    }
}

/// Outcome of a CG solve.
#[derive(Debug, Clone, Copy)]
pub struct CgResult {
    /// Relative residual `||b - H x|| / ||b||` of the returned iterate.
    pub residual: f64,

    /// Iterations taken.
    pub iterations: usize,
}

/// Solve `H x = b` by conjugate gradients, where `apply(z, y)` writes
/// `y = H z` for a symmetric positive definite `H`.
///
/// `x` doubles as the starting guess and the output; pass a zero vector for
/// a cold start. Terminates when the relative residual drops below
/// `params.tol` or `params.max_iter` is reached, returning the best iterate
/// observed either way.
pub fn cgsolve<F>(
    x: &mut [f64],
    b: &[f64],
    work: &mut CgWork,
    params: &CgParams,
    mut apply: F,
) -> CgResult
where
    F: FnMut(&[f64], &mut [f64]),
{
    let n = x.len();
    debug_assert_eq!(b.len(), n);
    debug_assert_eq!(work.d.len(), n);

    let delta0 = dot(b, b);
    if delta0 == 0.0 {
        x.fill(0.0);
        return CgResult {
            residual: 0.0,
            iterations: 0,
        };
    }

    // r = b - H x, d = r
    apply(x, &mut work.r);
    for i in 0..n {
        work.r[i] = b[i] - work.r[i];
    }
    work.d.copy_from_slice(&work.r);
    work.best_x.copy_from_slice(x);

    let mut delta = dot(&work.r, &work.r);
    let mut best_delta = delta;
    let tol_sq = params.tol * params.tol * delta0;

    let mut iter = 0;
    while iter < params.max_iter && delta > tol_sq {
        apply(&work.d, &mut work.q);
        let dq = dot(&work.d, &work.q);
        if dq <= 0.0 {
            warn!(
                "cg: operator lost positive definiteness (d.Hd = {:.3e}), \
                 returning best iterate",
                dq
            );
            break;
        }
        let alpha = delta / dq;
        axpy(alpha, &work.d, x);

        if (iter + 1) % 50 == 0 {
            // Periodic refresh against accumulated rounding drift.
            apply(x, &mut work.r);
            for i in 0..n {
                work.r[i] = b[i] - work.r[i];
            }
        } else {
            axpy(-alpha, &work.q, &mut work.r);
        }

        let delta_old = delta;
        delta = dot(&work.r, &work.r);
        let beta = delta / delta_old;
        for i in 0..n {
            work.d[i] = work.r[i] + beta * work.d[i];
        }

        if delta < best_delta {
            best_delta = delta;
            work.best_x.copy_from_slice(x);
        }

        iter += 1;
        if params.verbose {
            trace!(
                "cg iter {:4}: rel res = {:.6e}",
                iter,
                (delta / delta0).sqrt()
            );
        }
    }

    x.copy_from_slice(&work.best_x);
    CgResult {
        residual: (best_delta / delta0).sqrt(),
        iterations: iter,
    }
}
