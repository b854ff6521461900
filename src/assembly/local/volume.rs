use super::{accumulate_gradient_gram, accumulate_outer, scalar_component, scatter_pairing_block};
use crate::allocators::DimAllocator;
use crate::assembly::buffers::ElementScratch;
use crate::compound::CompoundElement;
use crate::element::MappedPoint;
use crate::integrator::PairingIntegrator;
use crate::scalar::FieldScalar;
use crate::SmallDim;
use itertools::izip;
use nalgebra::{DMatrixViewMut, DefaultAllocator};

/// The operator applied to both sides of a volume pairing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum VolumeOperator {
    Value,
    Gradient,
}

/// Assembles `∫_K c(x) A(u) · A(v) dx` for scalar components, where `A` is either the
/// identity or the gradient.
pub(super) fn assemble_volume_pairing<S, D>(
    pairing: &PairingIntegrator,
    operator: VolumeOperator,
    output: &mut DMatrixViewMut<S>,
    element: &CompoundElement<D>,
    scratch: &mut ElementScratch<S>,
) -> eyre::Result<()>
where
    S: FieldScalar,
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    let kind = pairing.kind();
    let indices = pairing.indices();
    let trial = scalar_component(element, kind, indices.ind1())?;
    let test = scalar_component(element, kind, indices.ind2())?;
    let geometry = element.geometry();

    let (weights, points) = geometry
        .reference_shape()
        .volume_quadrature::<D>(trial.order() + test.order())?;

    scratch.prepare_block(test.num_dofs(), trial.num_dofs());
    let ElementScratch {
        trial: trial_buffer,
        test: test_buffer,
        block,
        ..
    } = scratch;

    for (&w, xi) in izip!(&weights, &points) {
        let mapped = MappedPoint::evaluate(geometry, xi)?;
        let c: S = pairing.coefficient().evaluate_at_point(mapped.point());
        let factor = c.scale(w * mapped.volume_measure());
        match operator {
            VolumeOperator::Gradient => {
                trial_buffer.populate_gradients(trial, xi, &mapped);
                test_buffer.populate_gradients(test, xi, &mapped);
                accumulate_gradient_gram(block, factor, test_buffer.gradients(), trial_buffer.gradients());
            }
            VolumeOperator::Value => {
                trial_buffer.populate_values(trial, xi);
                test_buffer.populate_values(test, xi);
                accumulate_outer(block, factor, test_buffer.values(), trial_buffer.values());
            }
        }
    }

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
