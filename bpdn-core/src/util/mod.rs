//! Utility functions.
//!
//! Dense-vector numerical kernels shared by every solver layer.

pub mod numerics;
