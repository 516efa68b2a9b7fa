//! End-to-end sparse recovery tests.
//!
//! A sparse spike train is observed through a random-looking subset of rows
//! of an orthonormal DCT matrix, then recovered by the log-barrier solver.
//! The assertions check the compressed-sensing recovery properties rather
//! than exact coefficient values: constraint feasibility, objective
//! dominance over the reference signal, and pointwise recovery accuracy.

use std::f64::consts::PI;

use nalgebra::DMatrix;

use bpdn_core::{l1qc_newton, CgParams, L1qcParams, MatrixOperator, SolveStatus, SolverError, TransformOps};

const N: usize = 64;

/// Row indices of the DCT matrix retained as observations (M = 32).
const SAMPLE_ROWS: [usize; 32] = [
    0, 1, 3, 4, 7, 9, 12, 13, 16, 18, 21, 22, 24, 27, 29, 32, 33, 35, 38, 40, 43, 45, 46,
    48, 51, 53, 54, 56, 58, 59, 61, 62,
];

/// Orthonormal DCT-II matrix of order `n`.
fn dct_matrix(n: usize) -> DMatrix<f64> {
    let mut t = DMatrix::zeros(n, n);
    for k in 0..n {
        let scale = if k == 0 {
            (1.0 / n as f64).sqrt()
        } else {
            (2.0 / n as f64).sqrt()
        };
        for i in 0..n {
            t[(k, i)] = scale * (PI * (2 * i + 1) as f64 * k as f64 / (2.0 * n as f64)).cos();
        }
    }
    t
}

fn sampled_dct_operator() -> MatrixOperator {
    MatrixOperator::from_sampled_rows(&dct_matrix(N), &SAMPLE_ROWS)
        .expect("operator setup")
}

/// Three-spike reference signal.
fn reference_signal() -> Vec<f64> {
    let mut x = vec![0.0; N];
    x[11] = 1.8;
    x[29] = -1.2;
    x[46] = 0.7;
    x
}

fn norm1(v: &[f64]) -> f64 {
    v.iter().map(|x| x.abs()).sum()
}

fn norm2(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn recovery_params() -> L1qcParams {
    L1qcParams {
        epsilon: 1e-2,
        lbtol: 1e-4,
        mu: 10.0,
        newton_tol: 1e-3,
        newton_max_iter: 50,
        cg: CgParams {
            tol: 1e-8,
            max_iter: 250,
            verbose: false,
        },
        ..L1qcParams::default()
    }
}

fn run_recovery(params: &L1qcParams) -> (Vec<f64>, Vec<f64>, bpdn_core::LbResult) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut ops = sampled_dct_operator();
    let x_ref = reference_signal();

    let mut b = vec![0.0; ops.m()];
    ops.ax(&x_ref, &mut b);

    // Rows are orthonormal, so x0 = A^T b satisfies A x0 = b exactly and the
    // start is strictly feasible for any epsilon > 0.
    let mut x = vec![0.0; ops.n()];
    ops.aty(&b, &mut x);

    let result = l1qc_newton(&mut x, &b, params, &mut ops).expect("solve");
    (x, x_ref, result)
}

fn check_recovery(x: &[f64], x_ref: &[f64], params: &L1qcParams) {
    let mut ops = sampled_dct_operator();

    // Feasibility: the solution lands within the constraint ball around the
    // noiseless observation (2 epsilon covers the ball radius plus the
    // reference's own slack).
    let mut ax = vec![0.0; ops.m()];
    let mut ax_ref = vec![0.0; ops.m()];
    ops.ax(x, &mut ax);
    ops.ax(x_ref, &mut ax_ref);
    let obs_err: f64 = ax
        .iter()
        .zip(ax_ref.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f64>()
        .sqrt();
    assert!(
        obs_err <= 2.0 * params.epsilon,
        "observation error {} exceeds 2*epsilon",
        obs_err
    );

    // Objective dominance: the reference is feasible, so the minimizer's
    // l1 norm cannot exceed it (up to barrier suboptimality).
    assert!(
        norm1(x) <= norm1(x_ref) + 1e-3,
        "||x||_1 = {} > ||x_ref||_1 = {}",
        norm1(x),
        norm1(x_ref)
    );

    // Cone condition: the recovery error concentrates on the support.
    let support = [11usize, 29, 46];
    let h: Vec<f64> = x.iter().zip(x_ref.iter()).map(|(a, b)| a - b).collect();
    let h_on: f64 = support.iter().map(|&i| h[i].abs()).sum();
    let h_off: f64 = norm1(&h) - h_on;
    assert!(
        h_off <= h_on + 1e-3,
        "off-support error {} exceeds on-support error {}",
        h_off,
        h_on
    );

    // Pointwise accuracy.
    let linf = h.iter().map(|v| v.abs()).fold(0.0_f64, f64::max);
    assert!(linf < 0.05, "l_inf recovery error {} too large", linf);
}

#[test]
fn test_recovers_sparse_spike_train() {
    let params = recovery_params();
    let (x, x_ref, result) = run_recovery(&params);

    assert_eq!(result.status, SolveStatus::Converged, "status: {}", result.status);
    assert!(result.total_newton_iter > 0);
    assert!(result.total_cg_iter >= result.total_newton_iter);
    assert!((result.l1 - norm1(&x)).abs() < 1e-12);

    check_recovery(&x, &x_ref, &params);
}

#[test]
fn test_recovery_with_warm_started_cg() {
    let params = L1qcParams {
        warm_start_cg: true,
        ..recovery_params()
    };
    let (x, x_ref, result) = run_recovery(&params);
    assert_eq!(result.status, SolveStatus::Converged);
    check_recovery(&x, &x_ref, &params);
}

#[test]
fn test_early_exit_still_recovers() {
    // A loose stationarity test on ||x||_1 ends the continuation early but
    // must still return a feasible, near-sparse iterate.
    let params = L1qcParams {
        l1_tol: 1e-2,
        ..recovery_params()
    };
    let (x, x_ref, result) = run_recovery(&params);
    assert_eq!(result.status, SolveStatus::Converged);

    let mut ops = sampled_dct_operator();
    let mut ax = vec![0.0; ops.m()];
    let mut ax_ref = vec![0.0; ops.m()];
    ops.ax(&x, &mut ax);
    ops.ax(&x_ref, &mut ax_ref);
    let obs_err = norm2(
        &ax.iter()
            .zip(ax_ref.iter())
            .map(|(a, b)| a - b)
            .collect::<Vec<_>>(),
    );
    assert!(obs_err <= 2.0 * params.epsilon);
    assert!(norm1(&x) <= 1.05 * norm1(&x_ref));
}

#[test]
fn test_fixed_schedule_is_honored() {
    // Two continuation stages only: coarser solution, but still feasible,
    // and the iteration counters reflect the shortened schedule.
    let params = L1qcParams {
        lbiter: Some(2),
        tau: Some(1.0),
        ..recovery_params()
    };
    let (x, x_ref, result) = run_recovery(&params);
    assert!(result.status.is_success() || result.status == SolveStatus::MaxIters);
    // Two stages at mu = 10 from tau0 = 1: the last stage ran at weight 10.
    assert_eq!(result.tau, 10.0);

    let mut ops = sampled_dct_operator();
    let mut ax = vec![0.0; ops.m()];
    let mut ax_ref = vec![0.0; ops.m()];
    ops.ax(&x, &mut ax);
    ops.ax(&x_ref, &mut ax_ref);
    let obs_err = norm2(
        &ax.iter()
            .zip(ax_ref.iter())
            .map(|(a, b)| a - b)
            .collect::<Vec<_>>(),
    );
    assert!(obs_err <= 2.0 * params.epsilon, "obs_err = {}", obs_err);
}

#[test]
fn test_barrier_weight_grows_by_mu_per_stage() {
    // With a fixed schedule and no early exit, the reported weight must be
    // exactly tau0 * mu^(stages - 1).
    let params = L1qcParams {
        tau: Some(2.0),
        lbiter: Some(3),
        mu: 5.0,
        ..recovery_params()
    };
    let (_, _, result) = run_recovery(&params);
    assert_eq!(result.tau, 50.0, "tau = {}", result.tau);

    // A derived schedule grows the weight too: the final value dominates
    // the starting one whenever more than one stage runs.
    let (_, _, derived) = run_recovery(&recovery_params());
    assert!(derived.tau > 1.0, "tau = {}", derived.tau);
}

#[test]
fn test_infeasible_start_is_rejected() {
    let mut ops = sampled_dct_operator();
    let x_ref = reference_signal();
    let mut b = vec![0.0; ops.m()];
    ops.ax(&x_ref, &mut b);

    // A start far from the observation violates the constraint ball.
    let mut x = vec![1.0; ops.n()];
    let err = l1qc_newton(&mut x, &b, &recovery_params(), &mut ops).unwrap_err();
    assert!(matches!(err, SolverError::InfeasibleStart { .. }), "{}", err);
}
