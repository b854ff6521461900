//! Operator-pairing element integrators for Discontinuous Petrov-Galerkin (DPG) discretizations.
//!
//! A DPG discretization splits its unknowns into several *components* (scalar fields, traces
//! and fluxes), each with its own finite element basis but all sharing a single element
//! geometry. The integrators in [`integrator`] compute the dense local blocks that couple two
//! such components through a pair of operators (identity, gradient or normal flux),
//! integrated over element volumes, over all element facets or over facets on the global
//! boundary.
//!
//! The typical workflow is:
//!
//! 1. Parse form lines such as `GradGrad 1 1 a` with [`form::FormDefinition`] and turn them into
//!    a [`integrator::DpgIntegrator`] with [`form::build_integrator`].
//! 2. For every element, describe the component bases with a [`compound::CompoundElement`]
//!    and call one of the assembly methods on the integrator.
//! 3. Scatter the local blocks into a global system, possibly with [`assembly::global`].
use nalgebra::{DimMin, DimName};

pub mod assembly;
pub mod coefficient;
pub mod compound;
pub mod element;
pub mod error;
pub mod form;
pub mod integrator;
pub mod quadrature;
pub mod scalar;

#[cfg(feature = "proptest")]
pub mod proptest;

pub extern crate nalgebra;
pub extern crate nalgebra_sparse;

pub use fenris_traits::allocators;

/// A small, fixed-size dimension.
///
/// Used as a trait alias for various traits frequently needed by generic routines.
pub trait SmallDim: DimName + DimMin<Self, Output = Self> {}

impl<D> SmallDim for D where D: DimName + DimMin<Self, Output = Self> {}
