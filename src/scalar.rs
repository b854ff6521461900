//! Scalar fields that element matrices can be assembled over.
use nalgebra::ComplexField;
use num::Complex;

/// A scalar type in which local element blocks can be assembled.
///
/// Geometry, quadrature and basis values are always real (`f64`). Only coefficients and the
/// assembled blocks live in the scalar field `Self`, which is either `f64` or `Complex<f64>`.
/// All assembly routines are written once against this trait, so that the real and complex
/// code paths differ only in arithmetic and conjugation.
pub trait FieldScalar: ComplexField<RealField = f64> + Copy + Send + Sync + 'static {
    /// Whether the field has a non-trivial imaginary part.
    const IS_COMPLEX: bool;

    /// Converts a complex number into this field.
    ///
    /// For real fields the imaginary part is discarded. Assembly routines reject complex
    /// coefficients on the real path before any conversion takes place.
    fn from_complex(z: Complex<f64>) -> Self;
}

impl FieldScalar for f64 {
    const IS_COMPLEX: bool = false;

    fn from_complex(z: Complex<f64>) -> Self {
        z.re
    }
}

impl FieldScalar for Complex<f64> {
    const IS_COMPLEX: bool = true;

    fn from_complex(z: Complex<f64>) -> Self {
        z
    }
}
