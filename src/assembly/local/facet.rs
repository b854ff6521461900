use super::{accumulate_outer, component_with_kind, scatter_pairing_block};
use crate::allocators::DimAllocator;
use crate::assembly::buffers::{BasisFunctionBuffer, ElementScratch};
use crate::coefficient::CoefficientFunction;
use crate::compound::{ComponentBasis, CompoundBoundaryElement, CompoundElement};
use crate::element::{ElementGeometry, MappedPoint};
use crate::error::DpgError;
use crate::integrator::PairingIntegrator;
use crate::scalar::FieldScalar;
use crate::SmallDim;
use itertools::izip;
use nalgebra::{DMatrix, DMatrixViewMut, DefaultAllocator};

/// Which facets of a volume element a facet pairing integrates over.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum FacetSelection {
    All,
    GlobalBoundary,
}

/// One side of a facet pairing.
struct FacetOperand<'a, D>
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    basis: ComponentBasis<'a, D>,
    /// If present, only these component-local dofs participate, in this order.
    dofs: Option<&'a [usize]>,
}

fn operand_components<'a, D>(
    pairing: &PairingIntegrator,
    element: &CompoundElement<'a, D>,
) -> Result<(ComponentBasis<'a, D>, ComponentBasis<'a, D>), DpgError>
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    let kind = pairing.kind();
    let (trial_operator, test_operator) = kind.operators().ok_or(DpgError::FormKindMismatch {
        integrator: kind,
        requested: "bilinear form",
    })?;
    let indices = pairing.indices();
    let trial = component_with_kind(element, kind, indices.ind1(), trial_operator.component_kind())?;
    let test = component_with_kind(element, kind, indices.ind2(), test_operator.component_kind())?;
    Ok((trial, test))
}

/// Assembles a facet pairing over the selected facets of a volume element.
pub(super) fn assemble_facet_pairing<S, D>(
    pairing: &PairingIntegrator,
    selection: FacetSelection,
    output: &mut DMatrixViewMut<S>,
    element: &CompoundElement<D>,
    scratch: &mut ElementScratch<S>,
) -> eyre::Result<()>
where
    S: FieldScalar,
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    let (trial, test) = operand_components(pairing, element)?;
    let facets = (0..element.num_facets()).filter(|&facet| match selection {
        FacetSelection::All => true,
        FacetSelection::GlobalBoundary => element.is_boundary_facet(facet),
    });

    scratch.prepare_block(test.num_dofs(), trial.num_dofs());
    let ElementScratch {
        trial: trial_buffer,
        test: test_buffer,
        block,
        ..
    } = scratch;

    for facet in facets {
        integrate_facet(
            block,
            (&mut *trial_buffer, &mut *test_buffer),
            element.geometry(),
            facet,
            FacetOperand { basis: trial, dofs: None },
            FacetOperand { basis: test, dofs: None },
            pairing.coefficient(),
        )?;
    }

    let indices = pairing.indices();
    output.fill(S::zero());
    scatter_pairing_block(
        output,
        block,
        element.component_range(indices.ind1()),
        element.component_range(indices.ind2()),
        indices.ind1() != indices.ind2(),
    );
    Ok(())
}

/// Assembles a facet pairing on a surface element, restricted to the trace dofs of the
/// participating components.
pub(super) fn assemble_surface_pairing<S, D>(
    pairing: &PairingIntegrator,
    output: &mut DMatrixViewMut<S>,
    boundary: &CompoundBoundaryElement<D>,
    scratch: &mut ElementScratch<S>,
) -> eyre::Result<()>
where
    S: FieldScalar,
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    let kind = pairing.kind();
    let indices = pairing.indices();
    let element = boundary.element();
    let (trial, test) = operand_components(pairing, element)?;
    let trace_dofs = move |component: usize| {
        boundary
            .trace_dofs(component)
            .ok_or(DpgError::UnsupportedSpace { integrator: kind, component })
    };
    let trial_dofs = trace_dofs(indices.ind1())?;
    let test_dofs = trace_dofs(indices.ind2())?;

    scratch.prepare_block(test_dofs.len(), trial_dofs.len());
    let ElementScratch {
        trial: trial_buffer,
        test: test_buffer,
        block,
        ..
    } = scratch;

    integrate_facet(
        block,
        (trial_buffer, test_buffer),
        element.geometry(),
        boundary.local_facet(),
        FacetOperand {
            basis: trial,
            dofs: Some(trial_dofs),
        },
        FacetOperand {
            basis: test,
            dofs: Some(test_dofs),
        },
        pairing.coefficient(),
    )?;

    output.fill(S::zero());
    scatter_pairing_block(
        output,
        block,
        boundary.component_range(indices.ind1()),
        boundary.component_range(indices.ind2()),
        indices.ind1() != indices.ind2(),
    );
    Ok(())
}

/// Accumulates `∫_F c(x) C(u_j) D(v_i) ds` over a single facet into `block`.
fn integrate_facet<S, D>(
    block: &mut DMatrix<S>,
    (trial_buffer, test_buffer): (&mut BasisFunctionBuffer, &mut BasisFunctionBuffer),
    geometry: &dyn ElementGeometry<D>,
    facet: usize,
    trial: FacetOperand<D>,
    test: FacetOperand<D>,
    coefficient: &CoefficientFunction,
) -> Result<(), DpgError>
where
    S: FieldScalar,
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    let strength = trial.basis.order() + test.basis.order();
    let quadrature = geometry
        .reference_shape()
        .facet_quadrature::<D>(facet, strength)?;

    for (&w, xi) in izip!(&quadrature.weights, &quadrature.points) {
        let mapped = MappedPoint::evaluate(geometry, xi)?;
        let (normal, measure) = mapped.facet_normal_and_measure(&quadrature.reference_normal);
        let c: S = coefficient.evaluate_at_point(mapped.point());

        trial_buffer.populate_facet_operand(trial.basis, xi, &mapped, &normal);
        if let Some(dofs) = trial.dofs {
            trial_buffer.restrict_values(dofs);
        }
        test_buffer.populate_facet_operand(test.basis, xi, &mapped, &normal);
        if let Some(dofs) = test.dofs {
            test_buffer.restrict_values(dofs);
        }

        accumulate_outer(block, c.scale(w * measure), test_buffer.values(), trial_buffer.values());
    }
    Ok(())
}
