//! Newton descent direction.
//!
//! The `2n x 2n` barrier Hessian is block-eliminated to an `n x n` system
//! in the primal step `dx`. The reduced operator stays matrix-free: it is a
//! diagonal term plus a rank-adjusted normal operator, applied through
//! [`TransformOps`] inside the CG solve. The slack step `du` is recovered in
//! closed form afterwards.

use crate::cg::{cgsolve, CgResult, CgWork};
use crate::operator::TransformOps;
use crate::problem::CgParams;
use crate::util::numerics::dot;

use super::workspace::GradData;

/// Coefficients of the reduced Newton operator, fixed for one Newton step.
pub struct HessData<'a> {
    pub one_by_fe: f64,
    pub one_by_fe_sqrd: f64,
    pub atr: &'a [f64],
    pub sigx: &'a [f64],
}

/// Apply the reduced Hessian: `y = sigx.*z - (1/fe) A^T A z + (1/fe^2)
/// (atr . z) atr`.
///
/// `fe < 0` throughout the barrier domain, so the operator is positive
/// definite.
pub fn apply_h11p(
    hd: &HessData<'_>,
    ops: &mut dyn TransformOps,
    atax_work: &mut [f64],
    z: &[f64],
    y: &mut [f64],
) {
    ops.atax(z, atax_work);
    let atr_dot_z = dot(hd.atr, z);
    for i in 0..z.len() {
        y[i] = hd.sigx[i] * z[i] - hd.one_by_fe * atax_work[i]
            + hd.one_by_fe_sqrd * atr_dot_z * hd.atr[i];
    }
}

/// Fill the barrier gradient and the block-elimination coefficients.
///
/// Writes `gradf`, `ntgu`, `sig11`, `sig12`, `w1p` in `gd` and the reduced
/// diagonal `sigx`. Inputs must lie strictly inside the barrier domain
/// (`fu1, fu2, fe < 0`).
pub fn hess_grad(
    fu1: &[f64],
    fu2: &[f64],
    atr: &[f64],
    fe: f64,
    tau: f64,
    sigx: &mut [f64],
    gd: &mut GradData,
) {
    let n = fu1.len();
    let one_by_fe = 1.0 / fe;
    for i in 0..n {
        let a = 1.0 / fu1[i];
        let c = 1.0 / fu2[i];

        let ntgz = a - c + atr[i] * one_by_fe;
        let ntgu = -tau - a - c;
        gd.gradf[i] = -(1.0 / tau) * ntgz;
        gd.gradf[n + i] = -(1.0 / tau) * ntgu;
        gd.ntgu[i] = ntgu;

        let sig11 = a * a + c * c;
        let sig12 = -a * a + c * c;
        gd.sig11[i] = sig11;
        gd.sig12[i] = sig12;
        sigx[i] = sig11 - sig12 * sig12 / sig11;

        gd.w1p[i] = ntgz - (sig12 / sig11) * ntgu;
    }
}

/// Compute the Newton step `(dx, du)` for the current iterate.
///
/// Forms the gradient data from the barrier margins, solves the reduced
/// system for `dx` by CG (cold-started unless `warm_start` keeps the
/// previous step as the initial guess), and recovers `du`.
pub fn descent_dir(
    fu1: &[f64],
    fu2: &[f64],
    r: &[f64],
    fe: f64,
    tau: f64,
    atr: &mut [f64],
    sigx: &mut [f64],
    atax_work: &mut [f64],
    gd: &mut GradData,
    cg: &mut CgWork,
    cg_params: &CgParams,
    warm_start: bool,
    ops: &mut dyn TransformOps,
) -> CgResult {
    ops.aty(r, atr);
    hess_grad(fu1, fu2, atr, fe, tau, sigx, gd);

    if !warm_start {
        gd.dx.fill(0.0);
    }
    let hd = HessData {
        one_by_fe: 1.0 / fe,
        one_by_fe_sqrd: 1.0 / (fe * fe),
        atr,
        sigx,
    };
    let cg_res = cgsolve(&mut gd.dx, &gd.w1p, cg, cg_params, |z, y| {
        apply_h11p(&hd, ops, atax_work, z, y)
    });

    for i in 0..fu1.len() {
        gd.du[i] = gd.ntgu[i] / gd.sig11[i] - (gd.sig12[i] / gd.sig11[i]) * gd.dx[i];
    }
    cg_res
}

#[cfg(test)]
mod tests {
    use nalgebra::DMatrix;

    use super::*;
    use crate::operator::MatrixOperator;
    use crate::util::numerics::norm2_sq;

    // Hand-sized barrier iterate: A = [1, 0.5], b = [0.3], eps = 0.5,
    // x = [0.2, -0.1], u = [0.5, 0.4], tau = 2.
    fn setup() -> (MatrixOperator, Vec<f64>, Vec<f64>, Vec<f64>, f64) {
        let a = DMatrix::from_row_slice(1, 2, &[1.0, 0.5]);
        let mut ops = MatrixOperator::new(a).unwrap();
        let x = vec![0.2, -0.1];
        let u = vec![0.5, 0.4];
        let b = vec![0.3];
        let mut r = vec![0.0];
        ops.ax(&x, &mut r);
        r[0] -= b[0];
        let fe = 0.5 * (norm2_sq(&r) - 0.25);
        let fu1: Vec<f64> = (0..2).map(|i| x[i] - u[i]).collect();
        let fu2: Vec<f64> = (0..2).map(|i| -x[i] - u[i]).collect();
        assert!(fe < 0.0 && fu1.iter().all(|&v| v < 0.0) && fu2.iter().all(|&v| v < 0.0));
        (ops, fu1, fu2, r, fe)
    }

    #[test]
    fn test_step_solves_reduced_system_and_descends() {
        let (mut ops, fu1, fu2, r, fe) = setup();
        let tau = 2.0;
        let n = 2;

        let mut atr = vec![0.0; n];
        let mut sigx = vec![0.0; n];
        let mut atax_work = vec![0.0; n];
        let mut gd = GradData {
            gradf: vec![0.0; 2 * n],
            dx: vec![0.0; n],
            du: vec![0.0; n],
            sig11: vec![0.0; n],
            sig12: vec![0.0; n],
            ntgu: vec![0.0; n],
            w1p: vec![0.0; n],
        };
        let mut cg = CgWork::new(n);
        let cg_params = CgParams::default();

        descent_dir(
            &fu1, &fu2, &r, fe, tau, &mut atr, &mut sigx, &mut atax_work, &mut gd,
            &mut cg, &cg_params, false, &mut ops,
        );

        // dx must satisfy the reduced system H11p dx = w1p.
        let hd = HessData {
            one_by_fe: 1.0 / fe,
            one_by_fe_sqrd: 1.0 / (fe * fe),
            atr: &atr,
            sigx: &sigx,
        };
        let mut hdx = vec![0.0; n];
        apply_h11p(&hd, &mut ops, &mut atax_work, &gd.dx, &mut hdx);
        for i in 0..n {
            assert!(
                (hdx[i] - gd.w1p[i]).abs() < 1e-6 * gd.w1p[i].abs().max(1.0),
                "H dx = {:?}, w1p = {:?}",
                hdx,
                gd.w1p
            );
        }

        // The Newton step must be a descent direction for the barrier.
        let gdx = dot(&gd.gradf[..n], &gd.dx) + dot(&gd.gradf[n..], &gd.du);
        assert!(gdx < 0.0, "gdx = {}", gdx);
    }

    #[test]
    fn test_gradient_scaling() {
        // gradf = -(1/tau) * (unscaled Newton gradient); doubling tau only
        // changes the slack block's -tau term and the 1/tau prefactor.
        let (_, fu1, fu2, _, fe) = setup();
        let n = 2;
        let atr = vec![0.1, -0.2];
        let mut sigx = vec![0.0; n];
        let mut gd = GradData {
            gradf: vec![0.0; 2 * n],
            dx: vec![0.0; n],
            du: vec![0.0; n],
            sig11: vec![0.0; n],
            sig12: vec![0.0; n],
            ntgu: vec![0.0; n],
            w1p: vec![0.0; n],
        };
        hess_grad(&fu1, &fu2, &atr, fe, 2.0, &mut sigx, &mut gd);

        for i in 0..n {
            let a = 1.0 / fu1[i];
            let c = 1.0 / fu2[i];
            assert!((gd.gradf[i] + 0.5 * (a - c + atr[i] / fe)).abs() < 1e-14);
            assert!((gd.gradf[n + i] + 0.5 * (-2.0 - a - c)).abs() < 1e-14);
            // Reduced diagonal is positive (Schur complement of an SPD block).
            assert!(sigx[i] > 0.0);
        }
    }
}
