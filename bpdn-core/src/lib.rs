//! bpdn-core: a log-barrier Newton solver for basis pursuit denoising
//!
//! This library recovers a sparse/compressible vector `x` from an
//! underdetermined linear observation `b = A x + noise` by solving
//!
//! ```text
//! minimize    ||x||_1
//! subject to  ||A x - b||_2 <= epsilon
//! ```
//!
//! which is the workhorse problem of compressed-sensing signal and image
//! reconstruction. Key features:
//!
//! - **Matrix-free**: the sensing operator is supplied as a forward/adjoint
//!   capability bundle ([`TransformOps`]); the solver never materializes `A`
//!   or any Hessian.
//! - **Interior point**: a log-barrier continuation over a smoothed epigraph
//!   reformulation, with a damped Newton inner loop and backtracking line
//!   search.
//! - **Embedded Krylov solver**: each Newton step is reduced to an `N x N`
//!   system solved by conjugate gradients against a matrix-free Hessian
//!   operator ([`cg::cgsolve`]).
//! - **Zero-allocation hot loop**: all per-iteration scratch lives in a
//!   workspace allocated once per solve.
//!
//! # Example
//!
//! ```ignore
//! use bpdn_core::{l1qc_newton, L1qcParams, MatrixOperator, TransformOps};
//!
//! // Sensing matrix with M rows and N columns, M < N.
//! let mut ops = MatrixOperator::new(a)?;
//!
//! // Standard feasible start: x0 = A^T b.
//! let mut x = vec![0.0; ops.n()];
//! ops.aty(&b, &mut x);
//!
//! let params = L1qcParams {
//!     epsilon: 1e-2,
//!     ..Default::default()
//! };
//! let result = l1qc_newton(&mut x, &b, &params, &mut ops)?;
//!
//! println!("status: {}", result.status);
//! println!("||x||_1 = {}", result.l1);
//! println!("newton iters: {}, cg iters: {}",
//!          result.total_newton_iter, result.total_cg_iter);
//! ```
//!
//! # References
//!
//! - Candes, Romberg, Tao: "Stable Signal Recovery from Incomplete and
//!   Inaccurate Measurements" (the recovery guarantees the tests exercise)
//! - Boyd & Vandenberghe, Convex Optimization, ch. 11 (log-barrier methods)

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)] // barrier/Newton kernels need many parameters

pub mod cg;
pub mod error;
pub mod newton;
pub mod operator;
pub mod problem;
pub mod util;

// Re-export main types
pub use error::SolverError;
pub use operator::{MatrixOperator, TransformOps};
pub use problem::{CgParams, L1qcParams, LbResult, SolveStatus};

pub use newton::solve::l1qc_newton;
