//! Dense-matrix operator backend.
//!
//! Wraps an explicit `m x n` sensing matrix as a [`TransformOps`] bundle.
//! `ax`/`aty` are gemv wrappers; `atax` fuses the two passes through one
//! backend-owned `m`-vector of scratch, so the Newton hot loop stays
//! allocation-free.

use nalgebra::{DMatrix, DVectorView, DVectorViewMut};

use super::TransformOps;
use crate::error::SolverError;

/// [`TransformOps`] backend for an explicit dense sensing matrix.
pub struct MatrixOperator {
    a: DMatrix<f64>,
    /// Private scratch for the fused normal-operator pass (length `m`).
    dwork: Vec<f64>,
}

impl MatrixOperator {
    /// Wrap an `m x n` matrix, `m <= n`.
    pub fn new(a: DMatrix<f64>) -> Result<Self, SolverError> {
        let (m, n) = a.shape();
        if m == 0 || n == 0 {
            return Err(SolverError::InvalidArgument(format!(
                "sensing matrix must be nonempty, got {}x{}",
                m, n
            )));
        }
        if m > n {
            return Err(SolverError::InvalidArgument(format!(
                "sensing matrix must have no more rows than columns \
                 (underdetermined observation), got {}x{}",
                m, n
            )));
        }
        Ok(Self {
            dwork: vec![0.0; m],
            a,
        })
    }

    /// Build the operator from the observed rows of a full `n x n`
    /// transform.
    ///
    /// `sample_idx` holds zero-based indices into the rows of `full`,
    /// identifying which rows of the full transform are actually observed.
    /// This realizes the operator-backend setup contract consumed by
    /// process-boundary adapters.
    pub fn from_sampled_rows(
        full: &DMatrix<f64>,
        sample_idx: &[usize],
    ) -> Result<Self, SolverError> {
        let n = full.ncols();
        if full.nrows() != n {
            return Err(SolverError::OperatorInit(format!(
                "full transform must be square, got {}x{}",
                full.nrows(),
                n
            )));
        }
        if sample_idx.is_empty() {
            return Err(SolverError::OperatorInit(
                "sample index list is empty".to_string(),
            ));
        }
        if let Some(&bad) = sample_idx.iter().find(|&&i| i >= n) {
            return Err(SolverError::OperatorInit(format!(
                "sample index {} out of range for a {} row transform",
                bad, n
            )));
        }
        let m = sample_idx.len();
        let mut a = DMatrix::zeros(m, n);
        for (k, &row) in sample_idx.iter().enumerate() {
            a.row_mut(k).copy_from(&full.row(row));
        }
        Self::new(a)
    }

    /// Borrow the wrapped matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.a
    }
}

fn gemv_into(a: &DMatrix<f64>, x: &[f64], y: &mut [f64]) {
    debug_assert_eq!(x.len(), a.ncols());
    debug_assert_eq!(y.len(), a.nrows());
    let xv = DVectorView::from_slice(x, x.len());
    let mut yv = DVectorViewMut::from_slice(y, y.len());
    yv.gemv(1.0, a, &xv, 0.0);
}

fn gemv_tr_into(a: &DMatrix<f64>, y: &[f64], x: &mut [f64]) {
    debug_assert_eq!(y.len(), a.nrows());
    debug_assert_eq!(x.len(), a.ncols());
    let yv = DVectorView::from_slice(y, y.len());
    let mut xv = DVectorViewMut::from_slice(x, x.len());
    xv.gemv_tr(1.0, a, &yv, 0.0);
}

impl TransformOps for MatrixOperator {
    fn n(&self) -> usize {
        self.a.ncols()
    }

    fn m(&self) -> usize {
        self.a.nrows()
    }

    fn ax(&mut self, x: &[f64], y: &mut [f64]) {
        gemv_into(&self.a, x, y);
    }

    fn aty(&mut self, y: &[f64], x: &mut [f64]) {
        gemv_tr_into(&self.a, y, x);
    }

    fn atax(&mut self, x: &[f64], z: &mut [f64]) {
        gemv_into(&self.a, x, &mut self.dwork);
        gemv_tr_into(&self.a, &self.dwork, z);
    }
}
