use super::{accumulate_scaled, scalar_component};
use crate::allocators::DimAllocator;
use crate::assembly::buffers::ElementScratch;
use crate::compound::CompoundElement;
use crate::element::MappedPoint;
use crate::error::DpgError;
use crate::integrator::{IntegratorKind, NeumannSource};
use crate::scalar::FieldScalar;
use crate::SmallDim;
use itertools::izip;
use nalgebra::{DVectorViewMut, DefaultAllocator};

/// Assembles the load vector `∫_{∂K ∩ Γ} (g + G · n) e_i ds` into the dofs of the source
/// component.
pub(super) fn assemble_neumann_volume<S, D>(
    source: &NeumannSource,
    output: &mut DVectorViewMut<S>,
    element: &CompoundElement<D>,
    scratch: &mut ElementScratch<S>,
) -> eyre::Result<()>
where
    S: FieldScalar,
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    let kind = IntegratorKind::NeumannVolume;
    if source.flux().len() != D::dim() {
        return Err(DpgError::DimensionMismatch {
            integrator: kind,
            expected: D::dim(),
            found: source.flux().len(),
        }
        .into());
    }

    let basis = scalar_component(element, kind, source.component())?;
    let geometry = element.geometry();
    // The flux term G · n is treated as a polynomial of the same order as the basis
    let strength = 2 * basis.order().max(1);

    scratch.prepare_vector(basis.num_dofs());
    let ElementScratch { test, vector, .. } = scratch;

    for facet in element.boundary_facets() {
        let quadrature = geometry
            .reference_shape()
            .facet_quadrature::<D>(facet, strength)?;
        for (&w, xi) in izip!(&quadrature.weights, &quadrature.points) {
            let mapped = MappedPoint::evaluate(geometry, xi)?;
            let (normal, measure) = mapped.facet_normal_and_measure(&quadrature.reference_normal);
            let x = mapped.point();

            let mut value: S = source.scalar().evaluate_at_point(x);
            for (g_k, &n_k) in izip!(source.flux(), normal.iter()) {
                value += g_k.evaluate_at_point::<S, D>(x).scale(n_k);
            }

            test.populate_values(basis, xi);
            accumulate_scaled(vector.as_mut_slice(), value.scale(w * measure), test.values());
        }
    }

    output.fill(S::zero());
    let range = element.component_range(source.component());
    let mut target = output.rows_mut(range.start, range.len());
    target += &*vector;
    Ok(())
}
