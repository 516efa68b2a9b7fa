//! Dense-vector kernels.
//!
//! Small allocation-free helpers used throughout the CG and Newton loops.
//! Lengths are checked with debug assertions only; callers guarantee
//! agreement through the per-solve workspace.

/// Inner product `a . b`.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(ai, bi)| ai * bi).sum()
}

/// L1 norm `sum_i |v_i|`.
#[inline]
pub fn norm1(v: &[f64]) -> f64 {
    v.iter().map(|x| x.abs()).sum()
}

/// Squared L2 norm `v . v`.
#[inline]
pub fn norm2_sq(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum()
}

/// L2 norm.
#[inline]
pub fn norm2(v: &[f64]) -> f64 {
    norm2_sq(v).sqrt()
}

/// Infinity norm `max_i |v_i|`.
#[inline]
pub fn max_abs(v: &[f64]) -> f64 {
    v.iter().map(|x| x.abs()).fold(0.0_f64, f64::max)
}

/// In-place `y += alpha * x`.
#[inline]
pub fn axpy(alpha: f64, x: &[f64], y: &mut [f64]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, xi) in y.iter_mut().zip(x.iter()) {
        *yi += alpha * xi;
    }
}
