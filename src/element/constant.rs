use crate::allocators::DimAllocator;
use crate::element::ScalarBasis;
use crate::SmallDim;
use nalgebra::{DMatrixViewMut, DefaultAllocator, OPoint};
use std::marker::PhantomData;

/// A single discontinuous constant basis function.
///
/// Its dof is interior to the element, so the basis has no boundary trace representation.
/// Surface forms on the global boundary therefore reject components using it, while
/// volume forms restricted to facets can still evaluate it there.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ConstantBasis<D> {
    marker: PhantomData<fn() -> D>,
}

impl<D> ConstantBasis<D> {
    pub fn new() -> Self {
        Self { marker: PhantomData }
    }
}

impl<D> Default for ConstantBasis<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> ScalarBasis<D> for ConstantBasis<D>
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    fn num_dofs(&self) -> usize {
        1
    }

    fn order(&self) -> usize {
        0
    }

    fn populate_values(&self, values: &mut [f64], _: &OPoint<f64, D>) {
        assert_eq!(values.len(), 1, "constant basis has exactly one dof");
        values[0] = 1.0;
    }

    fn populate_gradients(&self, mut gradients: DMatrixViewMut<f64>, _: &OPoint<f64, D>) {
        assert_eq!(gradients.shape(), (D::dim(), 1));
        gradients.fill(0.0);
    }

    fn facet_dofs(&self, _facet: usize) -> Option<Vec<usize>> {
        None
    }
}
