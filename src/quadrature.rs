//! Quadrature rules for reference elements and their facets.
//!
//! The rules themselves come from `fenris-quadrature`, whose reference domains match the
//! conventions of the element module: the box `[-1, 1]^d` for quadrilaterals and the
//! simplices with one vertex at `(-1, ..., -1)` and legs of length 2 along the coordinate
//! axes for triangles and tetrahedra.
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, OPoint, OVector};

pub use fenris_quadrature::Error as QuadratureError;

/// A quadrature rule expressed with `nalgebra` points.
pub type QuadraturePair<D> = (Vec<f64>, Vec<OPoint<f64, D>>);

/// A quadrature rule for a single facet of a reference element.
///
/// The points are given in the reference coordinates of the *element*, and the weights
/// integrate with respect to the measure of the reference facet. The reference normal is
/// the outward unit normal of the facet in reference coordinates.
#[derive(Debug, Clone)]
pub struct FacetQuadrature<D>
where
    D: DimName,
    DefaultAllocator: Allocator<f64, D>,
{
    pub weights: Vec<f64>,
    pub points: Vec<OPoint<f64, D>>,
    pub reference_normal: OVector<f64, D>,
}

/// The number of Gauss points needed to integrate univariate polynomials of degree
/// `strength` exactly.
pub fn gauss_points_for_strength(strength: usize) -> usize {
    strength / 2 + 1
}

/// Converts a rule from `fenris-quadrature` into `nalgebra` points of dimension `D`.
///
/// # Panics
///
/// Panics if `N` does not equal the dimension of `D`.
pub fn convert_rule<D, const N: usize>((weights, points): fenris_quadrature::Rule<N>) -> QuadraturePair<D>
where
    D: DimName,
    DefaultAllocator: Allocator<f64, D>,
{
    assert_eq!(D::dim(), N, "rule dimension must match the point dimension");
    let points = points
        .iter()
        .map(|p| OPoint::from(OVector::<f64, D>::from_column_slice(p)))
        .collect();
    (weights, points)
}
