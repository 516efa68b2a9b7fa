//! Linear operator interface.
//!
//! The solver never inspects a sensing operator's internals: every transform
//! is applied through the [`TransformOps`] capability bundle. Concrete
//! backends (a dense sensing matrix here, fast orthogonal transforms in
//! downstream crates) implement the bundle and own whatever private scratch
//! their transform needs.

pub mod matrix;

pub use matrix::MatrixOperator;

/// Matrix-free forward/adjoint operator bundle.
///
/// The operator maps an `n`-dimensional primal vector to an `m`-dimensional
/// observation vector, `m <= n`. The three required capabilities are the
/// forward map `Ax`, the adjoint `Aty`, and the composed normal operator
/// `AtAx`; the Newton solver applies the Hessian exclusively through these.
///
/// # State and aliasing
///
/// Methods take `&mut self` so a backend can keep transform plans and
/// working buffers as explicit owned state rather than process-wide
/// variables; this is what makes two independent solves with independent
/// backends safe to run concurrently. Implementations must be pure with
/// respect to solver state: they may use their own scratch, but must not
/// alias or retain the caller's buffers beyond the call.
///
/// # Optional capabilities
///
/// Composite problems (e.g. sampling composed with a synthesis transform,
/// or a stacked transform + total-variation operator) additionally expose an
/// analysis/synthesis pair (`mx`/`mty`) and an embedding/extraction pair
/// (`ex`/`ety`). The defaults treat both pairs as the identity, which is
/// correct for plain sensing backends; the core Newton path never calls
/// them.
///
/// # Teardown
///
/// Backend scratch is released by the backend's own `Drop`. The solver
/// borrows the bundle and never owns it.
pub trait TransformOps {
    /// Ambient (primal) dimension `n`.
    fn n(&self) -> usize;

    /// Range (observation) dimension `m`, with `m <= n`.
    fn m(&self) -> usize;

    /// Forward application: write `y = A x`. `x` has length `n`, `y` has
    /// length `m`.
    fn ax(&mut self, x: &[f64], y: &mut [f64]);

    /// Adjoint application: write `x = A^T y`. `y` has length `m`, `x` has
    /// length `n`.
    fn aty(&mut self, y: &[f64], x: &mut [f64]);

    /// Normal operator: write `z = A^T A x` in a single call. Backends that
    /// can fuse the two passes should do so instead of materializing the
    /// intermediate `m`-vector twice.
    fn atax(&mut self, x: &[f64], z: &mut [f64]);

    /// Extended/composite dimension for stacked operators. Defaults to `n`.
    fn p(&self) -> usize {
        self.n()
    }

    /// Normalization constant of the synthesis transform, used by step-size
    /// heuristics in downstream solvers. Defaults to 1 (orthonormal).
    fn norm_m(&self) -> f64 {
        1.0
    }

    /// Synthesis application `y = M x` for composite operators.
    /// Identity by default.
    fn mx(&mut self, x: &[f64], y: &mut [f64]) {
        y.copy_from_slice(x);
    }

    /// Analysis application `x = M^T y` for composite operators.
    /// Identity by default.
    fn mty(&mut self, y: &[f64], x: &mut [f64]) {
        x.copy_from_slice(y);
    }

    /// Embedding `y = E x` into the extended space. Identity by default.
    fn ex(&mut self, x: &[f64], y: &mut [f64]) {
        y.copy_from_slice(x);
    }

    /// Extraction `x = E^T y` from the extended space. Identity by default.
    fn ety(&mut self, y: &[f64], x: &mut [f64]) {
        x.copy_from_slice(y);
    }
}
