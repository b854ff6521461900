use crate::element::{FluxBasis, ReferenceShape};
use nalgebra::{DMatrixViewMut, Point2, U2};

/// Lowest-order Raviart-Thomas basis on a triangle.
///
/// Basis function `k` is associated with facet `k`. On the reference triangle it reads
/// `s_k (xi - v_k) / 4`, where `v_k` is the vertex opposite facet `k` and `s_k = ±1` is the
/// orientation sign of the facet. Its normal component vanishes on the other two facets, and
/// its total outward flux through facet `k` is `s_k`, on the reference as well as on any
/// positively oriented physical triangle.
///
/// Orientation signs are used to make normal components agree between neighboring elements,
/// typically by choosing `+1` on exactly one side of each interior facet.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RaviartThomasTriangle {
    facet_signs: [f64; 3],
}

impl Default for RaviartThomasTriangle {
    fn default() -> Self {
        Self::new()
    }
}

impl RaviartThomasTriangle {
    pub fn new() -> Self {
        Self::with_facet_signs([1.0; 3])
    }

    pub fn with_facet_signs(facet_signs: [f64; 3]) -> Self {
        Self { facet_signs }
    }

    pub fn facet_signs(&self) -> &[f64; 3] {
        &self.facet_signs
    }
}

/// The local vertex opposite each facet of the triangle.
const OPPOSITE_VERTEX: [[f64; 2]; 3] = [[-1.0, 1.0], [-1.0, -1.0], [1.0, -1.0]];

impl FluxBasis<U2> for RaviartThomasTriangle {
    fn num_dofs(&self) -> usize {
        3
    }

    fn order(&self) -> usize {
        1
    }

    fn populate_reference_values(&self, mut values: DMatrixViewMut<f64>, xi: &Point2<f64>) {
        assert_eq!(values.shape(), (2, 3), "output must be 2 x 3");
        for (k, (v, sign)) in OPPOSITE_VERTEX.iter().zip(&self.facet_signs).enumerate() {
            values[(0, k)] = 0.25 * sign * (xi.x - v[0]);
            values[(1, k)] = 0.25 * sign * (xi.y - v[1]);
        }
    }

    fn facet_dofs(&self, facet: usize) -> Option<Vec<usize>> {
        assert!(facet < ReferenceShape::Triangle.num_facets(), "facet index out of bounds");
        Some(vec![facet])
    }
}
