//! Element-local assembly of the operator-pairing integrators.
//!
//! All routines are generic over the scalar field `S` ([`FieldScalar`]), and write the
//! contribution of an integrator for a single compound element into a caller-provided output
//! block sized to the whole compound element. For a pairing of trial component `ind1` with
//! test component `ind2`, the block
//!
//! ```text
//! B[i, j] = ∫ c(x) D(φ_i^{ind2}) C(φ_j^{ind1})
//! ```
//!
//! is written to the rows of `ind2` and the columns of `ind1`. When `ind1 != ind2`, its
//! conjugate transpose is additionally written to the rows of `ind1` and the columns of
//! `ind2`, so that the output represents `b(u, v) + conj(b(v, u))`. All other entries of the
//! output are zero.
use crate::allocators::DimAllocator;
use crate::assembly::buffers::ElementScratch;
use crate::compound::{ComponentBasis, ComponentKind, CompoundBoundaryElement, CompoundElement};
use crate::element::ScalarBasis;
use crate::error::DpgError;
use crate::integrator::{DpgIntegrator, IntegratorKind};
use crate::scalar::FieldScalar;
use crate::SmallDim;
use davenport::{define_thread_local_workspace, with_thread_local_workspace};
use itertools::izip;
use nalgebra::{DMatrix, DMatrixViewMut, DVectorViewMut, DefaultAllocator};
use num::Complex;
use std::ops::Range;

mod facet;
mod source;
mod volume;

use facet::{assemble_facet_pairing, assemble_surface_pairing, FacetSelection};
use source::assemble_neumann_volume;
use volume::{assemble_volume_pairing, VolumeOperator};

define_thread_local_workspace!(WORKSPACE);

fn check_field<S: FieldScalar>(integrator: &DpgIntegrator) -> Result<(), DpgError> {
    if integrator.is_complex() && !S::IS_COMPLEX {
        Err(DpgError::ComplexCoefficientInRealAssembly {
            integrator: integrator.kind(),
        })
    } else {
        Ok(())
    }
}

/// Looks up a component and checks that it has the expected kind.
pub(crate) fn component_with_kind<'a, D>(
    element: &CompoundElement<'a, D>,
    integrator: IntegratorKind,
    index: usize,
    expected: ComponentKind,
) -> Result<ComponentBasis<'a, D>, DpgError>
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    let component = element
        .component(index)
        .ok_or(DpgError::ComponentOutOfRange {
            component: index,
            num_components: element.num_components(),
        })?;
    if component.kind() == expected {
        Ok(component)
    } else {
        Err(DpgError::ComponentKindMismatch {
            integrator,
            component: index,
            expected,
        })
    }
}

pub(crate) fn scalar_component<'a, D>(
    element: &CompoundElement<'a, D>,
    integrator: IntegratorKind,
    index: usize,
) -> Result<&'a dyn ScalarBasis<D>, DpgError>
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    match element.component(index) {
        Some(ComponentBasis::Scalar(basis)) => Ok(basis),
        Some(ComponentBasis::Flux(_)) => Err(DpgError::ComponentKindMismatch {
            integrator,
            component: index,
            expected: ComponentKind::Scalar,
        }),
        None => Err(DpgError::ComponentOutOfRange {
            component: index,
            num_components: element.num_components(),
        }),
    }
}

/// Accumulates `factor * test ⊗ trial` into the block.
pub(crate) fn accumulate_outer<S: FieldScalar>(block: &mut DMatrix<S>, factor: S, test: &[f64], trial: &[f64]) {
    debug_assert_eq!(block.shape(), (test.len(), trial.len()));
    for (j, u_j) in trial.iter().enumerate() {
        for (i, v_i) in test.iter().enumerate() {
            block[(i, j)] += factor.scale(v_i * u_j);
        }
    }
}

/// Accumulates `factor * G_test^T G_trial` into the block, where the columns of `G` are
/// basis function gradients.
pub(crate) fn accumulate_gradient_gram<S: FieldScalar>(
    block: &mut DMatrix<S>,
    factor: S,
    test_gradients: &DMatrix<f64>,
    trial_gradients: &DMatrix<f64>,
) {
    debug_assert_eq!(block.shape(), (test_gradients.ncols(), trial_gradients.ncols()));
    for (j, grad_u) in trial_gradients.column_iter().enumerate() {
        for (i, grad_v) in test_gradients.column_iter().enumerate() {
            block[(i, j)] += factor.scale(grad_v.dot(&grad_u));
        }
    }
}

/// Writes a pairing block (test rows, trial columns) into the output, additionally writing its
/// conjugate transpose to the mirrored position if `mirror` is set.
pub(crate) fn scatter_pairing_block<S: FieldScalar>(
    output: &mut DMatrixViewMut<S>,
    block: &DMatrix<S>,
    trial_range: Range<usize>,
    test_range: Range<usize>,
    mirror: bool,
) {
    debug_assert_eq!(block.shape(), (test_range.len(), trial_range.len()));
    {
        let mut target = output.view_mut((test_range.start, trial_range.start), block.shape());
        target += block;
    }
    if mirror {
        let mut target = output.view_mut((trial_range.start, test_range.start), (block.ncols(), block.nrows()));
        target += block.adjoint();
    }
}

impl DpgIntegrator {
    /// Assembles the element matrix of a volume-element integrator.
    ///
    /// The output must be a square matrix whose dimension equals the number of dofs of the
    /// compound element. It is overwritten.
    ///
    /// # Errors
    ///
    /// Fails if the integrator is a surface form or a load vector, if a component index does
    /// not refer to a component of the appropriate kind, if a complex coefficient is assembled
    /// in a real field or if the element map is singular.
    ///
    /// # Panics
    ///
    /// Panics if the output has the wrong dimensions.
    pub fn assemble_element_matrix<S, D>(
        &self,
        mut output: DMatrixViewMut<S>,
        element: &CompoundElement<D>,
        scratch: &mut ElementScratch<S>,
    ) -> eyre::Result<()>
    where
        S: FieldScalar,
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        let n = element.num_dofs();
        assert_eq!(output.nrows(), n, "Output matrix dimension mismatch");
        assert_eq!(output.ncols(), n, "Output matrix dimension mismatch");
        check_field::<S>(self)?;

        match self {
            Self::GradGrad(pairing) => {
                assemble_volume_pairing(pairing, VolumeOperator::Gradient, &mut output, element, scratch)
            }
            Self::EyeEye(pairing) => assemble_volume_pairing(pairing, VolumeOperator::Value, &mut output, element, scratch),
            Self::FluxTrace(pairing) | Self::TraceTrace(pairing) => {
                assemble_facet_pairing(pairing, FacetSelection::All, &mut output, element, scratch)
            }
            Self::RobinVolume(pairing) => {
                assemble_facet_pairing(pairing, FacetSelection::GlobalBoundary, &mut output, element, scratch)
            }
            Self::FluxFluxBoundary(_) | Self::TraceTraceBoundary(_) | Self::FluxTraceBoundary(_) => {
                Err(DpgError::FormKindMismatch {
                    integrator: self.kind(),
                    requested: "volume element matrix",
                }
                .into())
            }
            Self::NeumannVolume(_) => Err(DpgError::FormKindMismatch {
                integrator: self.kind(),
                requested: "element matrix",
            }
            .into()),
        }
    }

    /// Assembles the element matrix of a surface integrator on a facet of the global
    /// boundary.
    ///
    /// The output must be a square matrix whose dimension equals the number of dofs of the
    /// boundary element. It is overwritten.
    ///
    /// # Errors
    ///
    /// In addition to the errors of [`assemble_element_matrix`](Self::assemble_element_matrix),
    /// fails with [`DpgError::UnsupportedSpace`] if a participating component has no boundary
    /// trace representation.
    ///
    /// # Panics
    ///
    /// Panics if the output has the wrong dimensions.
    pub fn assemble_boundary_element_matrix<S, D>(
        &self,
        mut output: DMatrixViewMut<S>,
        element: &CompoundBoundaryElement<D>,
        scratch: &mut ElementScratch<S>,
    ) -> eyre::Result<()>
    where
        S: FieldScalar,
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        let n = element.num_dofs();
        assert_eq!(output.nrows(), n, "Output matrix dimension mismatch");
        assert_eq!(output.ncols(), n, "Output matrix dimension mismatch");
        check_field::<S>(self)?;

        match self {
            Self::FluxFluxBoundary(pairing) | Self::TraceTraceBoundary(pairing) | Self::FluxTraceBoundary(pairing) => {
                assemble_surface_pairing(pairing, &mut output, element, scratch)
            }
            _ => Err(DpgError::FormKindMismatch {
                integrator: self.kind(),
                requested: "surface element matrix",
            }
            .into()),
        }
    }

    /// Assembles the element load vector of the `NeumannVolume` integrator.
    ///
    /// The output must have the length of the number of dofs of the compound element. It is
    /// overwritten.
    ///
    /// # Panics
    ///
    /// Panics if the output has the wrong length.
    pub fn assemble_element_vector<S, D>(
        &self,
        mut output: DVectorViewMut<S>,
        element: &CompoundElement<D>,
        scratch: &mut ElementScratch<S>,
    ) -> eyre::Result<()>
    where
        S: FieldScalar,
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        assert_eq!(output.len(), element.num_dofs(), "Output vector dimension mismatch");
        check_field::<S>(self)?;

        match self {
            Self::NeumannVolume(source) => assemble_neumann_volume(source, &mut output, element, scratch),
            _ => Err(DpgError::FormKindMismatch {
                integrator: self.kind(),
                requested: "element vector",
            }
            .into()),
        }
    }

    /// Real-valued version of [`assemble_element_matrix`](Self::assemble_element_matrix)
    /// using thread-local scratch memory.
    pub fn assemble_real_element_matrix<D>(
        &self,
        output: DMatrixViewMut<f64>,
        element: &CompoundElement<D>,
    ) -> eyre::Result<()>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        with_thread_local_workspace(&WORKSPACE, |scratch: &mut ElementScratch<f64>| {
            self.assemble_element_matrix(output, element, scratch)
        })
    }

    /// Complex-valued version of [`assemble_element_matrix`](Self::assemble_element_matrix)
    /// using thread-local scratch memory.
    pub fn assemble_complex_element_matrix<D>(
        &self,
        output: DMatrixViewMut<Complex<f64>>,
        element: &CompoundElement<D>,
    ) -> eyre::Result<()>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        with_thread_local_workspace(&WORKSPACE, |scratch: &mut ElementScratch<Complex<f64>>| {
            self.assemble_element_matrix(output, element, scratch)
        })
    }

    pub fn assemble_real_boundary_element_matrix<D>(
        &self,
        output: DMatrixViewMut<f64>,
        element: &CompoundBoundaryElement<D>,
    ) -> eyre::Result<()>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        with_thread_local_workspace(&WORKSPACE, |scratch: &mut ElementScratch<f64>| {
            self.assemble_boundary_element_matrix(output, element, scratch)
        })
    }

    pub fn assemble_complex_boundary_element_matrix<D>(
        &self,
        output: DMatrixViewMut<Complex<f64>>,
        element: &CompoundBoundaryElement<D>,
    ) -> eyre::Result<()>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        with_thread_local_workspace(&WORKSPACE, |scratch: &mut ElementScratch<Complex<f64>>| {
            self.assemble_boundary_element_matrix(output, element, scratch)
        })
    }

    pub fn assemble_real_element_vector<D>(
        &self,
        output: DVectorViewMut<f64>,
        element: &CompoundElement<D>,
    ) -> eyre::Result<()>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        with_thread_local_workspace(&WORKSPACE, |scratch: &mut ElementScratch<f64>| {
            self.assemble_element_vector(output, element, scratch)
        })
    }

    pub fn assemble_complex_element_vector<D>(
        &self,
        output: DVectorViewMut<Complex<f64>>,
        element: &CompoundElement<D>,
    ) -> eyre::Result<()>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        with_thread_local_workspace(&WORKSPACE, |scratch: &mut ElementScratch<Complex<f64>>| {
            self.assemble_element_vector(output, element, scratch)
        })
    }
}

/// Accumulates `factor * values` into `vector`.
pub(crate) fn accumulate_scaled<S: FieldScalar>(vector: &mut [S], factor: S, values: &[f64]) {
    for (v, phi) in izip!(vector.iter_mut(), values) {
        *v += factor.scale(*phi);
    }
}
