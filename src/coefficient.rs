//! Scalar coefficient functions of position.
use crate::scalar::FieldScalar;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, OPoint};
use num::Complex;
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A real-valued function of physical coordinates.
pub type RealFunction = dyn Fn(&[f64]) -> f64 + Send + Sync;

/// A complex-valued function of physical coordinates.
pub type ComplexFunction = dyn Fn(&[f64]) -> Complex<f64> + Send + Sync;

/// A scalar coefficient that may depend on the physical position.
///
/// Coefficients are immutable once constructed. Integrators hold them through an
/// `Arc<CoefficientFunction>`, so a single coefficient defined in a form file can be shared
/// by any number of integrators.
///
/// Functions receive the physical coordinates of the evaluation point as a slice whose length
/// equals the spatial dimension.
#[derive(Clone)]
pub enum CoefficientFunction {
    Constant(f64),
    ComplexConstant(Complex<f64>),
    Real(Arc<RealFunction>),
    Complex(Arc<ComplexFunction>),
}

impl Debug for CoefficientFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => write!(f, "Constant({value})"),
            Self::ComplexConstant(value) => write!(f, "ComplexConstant({value})"),
            Self::Real(_) => write!(f, "Real(<function>)"),
            Self::Complex(_) => write!(f, "Complex(<function>)"),
        }
    }
}

impl From<f64> for CoefficientFunction {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl From<Complex<f64>> for CoefficientFunction {
    fn from(value: Complex<f64>) -> Self {
        Self::ComplexConstant(value)
    }
}

impl CoefficientFunction {
    pub fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    pub fn complex_constant(value: Complex<f64>) -> Self {
        Self::ComplexConstant(value)
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Self::Real(Arc::new(f))
    }

    pub fn from_complex_fn<F>(f: F) -> Self
    where
        F: Fn(&[f64]) -> Complex<f64> + Send + Sync + 'static,
    {
        Self::Complex(Arc::new(f))
    }

    /// Convenience for wrapping the coefficient in an `Arc` for sharing between integrators.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Self::ComplexConstant(_) | Self::Complex(_))
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_) | Self::ComplexConstant(_))
    }

    /// Returns the value of the coefficient if it does not depend on position.
    pub fn constant_value(&self) -> Option<Complex<f64>> {
        match self {
            Self::Constant(value) => Some(Complex::new(*value, 0.0)),
            Self::ComplexConstant(value) => Some(*value),
            Self::Real(_) | Self::Complex(_) => None,
        }
    }

    /// Evaluates the coefficient at the given physical coordinates in the field `S`.
    ///
    /// Evaluating a complex coefficient in a real field discards the imaginary part.
    pub fn evaluate<S: FieldScalar>(&self, x: &[f64]) -> S {
        match self {
            Self::Constant(value) => S::from_real(*value),
            Self::ComplexConstant(value) => S::from_complex(*value),
            Self::Real(f) => S::from_real(f(x)),
            Self::Complex(f) => S::from_complex(f(x)),
        }
    }

    pub fn evaluate_at_point<S, D>(&self, x: &OPoint<f64, D>) -> S
    where
        S: FieldScalar,
        D: DimName,
        DefaultAllocator: Allocator<f64, D>,
    {
        self.evaluate(x.coords.as_slice())
    }
}
