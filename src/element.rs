//! Reference shapes, element geometry and component basis traits.
//!
//! An element in a compound discretization has a single geometry ([`ElementGeometry`]) and
//! one basis per component. Scalar components ([`ScalarBasis`]) provide values and reference
//! gradients, flux components ([`FluxBasis`]) provide vector values on the reference element
//! which are mapped to the physical element with the contravariant Piola transform.
use crate::allocators::DimAllocator;
use crate::error::DpgError;
use crate::quadrature::{convert_rule, gauss_points_for_strength, FacetQuadrature, QuadratureError, QuadraturePair};
use crate::SmallDim;
use fenris_quadrature::polyquad;
use fenris_quadrature::tensor::quadrilateral_gauss;
use fenris_quadrature::univariate::gauss;
use nalgebra::{DMatrixViewMut, DefaultAllocator, DimName, OMatrix, OPoint, OVector};
use serde::{Deserialize, Serialize};

mod constant;
mod quadrilateral;
mod raviart_thomas;
mod tetrahedron;
mod triangle;

pub use constant::*;
pub use quadrilateral::*;
pub use raviart_thomas::*;
pub use tetrahedron::*;
pub use triangle::*;

const TRIANGLE_VERTICES: &[&[f64]] = &[&[-1.0, -1.0], &[1.0, -1.0], &[-1.0, 1.0]];
const TRIANGLE_FACETS: &[&[usize]] = &[&[0, 1], &[1, 2], &[2, 0]];

const QUADRILATERAL_VERTICES: &[&[f64]] = &[&[-1.0, -1.0], &[1.0, -1.0], &[1.0, 1.0], &[-1.0, 1.0]];
const QUADRILATERAL_FACETS: &[&[usize]] = &[&[0, 1], &[1, 2], &[2, 3], &[3, 0]];

const TETRAHEDRON_VERTICES: &[&[f64]] = &[
    &[-1.0, -1.0, -1.0],
    &[1.0, -1.0, -1.0],
    &[-1.0, 1.0, -1.0],
    &[-1.0, -1.0, 1.0],
];
const TETRAHEDRON_FACETS: &[&[usize]] = &[&[0, 2, 1], &[0, 1, 3], &[1, 2, 3], &[0, 3, 2]];

/// The shape of a reference element.
///
/// Facets are numbered locally. For the triangle, facet `i` connects vertices `i` and
/// `i + 1 (mod 3)`, and likewise for the quadrilateral with 4 vertices. For the tetrahedron
/// the facets are the faces `[0, 2, 1]`, `[0, 1, 3]`, `[1, 2, 3]` and `[0, 3, 2]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceShape {
    Triangle,
    Quadrilateral,
    Tetrahedron,
}

impl ReferenceShape {
    pub fn dim(&self) -> usize {
        match self {
            Self::Triangle | Self::Quadrilateral => 2,
            Self::Tetrahedron => 3,
        }
    }

    pub fn num_facets(&self) -> usize {
        self.facets().len()
    }

    fn vertex_coords(&self) -> &'static [&'static [f64]] {
        match self {
            Self::Triangle => TRIANGLE_VERTICES,
            Self::Quadrilateral => QUADRILATERAL_VERTICES,
            Self::Tetrahedron => TETRAHEDRON_VERTICES,
        }
    }

    fn facets(&self) -> &'static [&'static [usize]] {
        match self {
            Self::Triangle => TRIANGLE_FACETS,
            Self::Quadrilateral => QUADRILATERAL_FACETS,
            Self::Tetrahedron => TETRAHEDRON_FACETS,
        }
    }

    /// The local vertex indices of the given facet.
    ///
    /// # Panics
    ///
    /// Panics if the facet index is out of bounds.
    pub fn facet_vertices(&self, facet: usize) -> &'static [usize] {
        self.facets()[facet]
    }

    fn assert_dim<D: DimName>(&self) {
        assert_eq!(
            D::dim(),
            self.dim(),
            "dimension of {self:?} does not match the requested dimension"
        );
    }

    /// The vertices of the reference element.
    ///
    /// # Panics
    ///
    /// Panics if `D` does not match the dimension of the shape.
    pub fn reference_vertices<D>(&self) -> Vec<OPoint<f64, D>>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        self.assert_dim::<D>();
        self.vertex_coords()
            .iter()
            .map(|coords| OPoint::from(OVector::<f64, D>::from_column_slice(coords)))
            .collect()
    }

    /// The outward unit normal of a facet of the reference element.
    ///
    /// # Panics
    ///
    /// Panics if `D` does not match the dimension of the shape or the facet index is out of
    /// bounds.
    pub fn reference_facet_normal<D>(&self, facet: usize) -> OVector<f64, D>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        let vertices = self.reference_vertices::<D>();
        let facet_vertices = self.facet_vertices(facet);
        let a = &vertices[facet_vertices[0]];
        let e1 = &vertices[facet_vertices[1]] - a;

        let mut normal = OVector::<f64, D>::zeros();
        if D::dim() == 2 {
            normal[0] = e1[1];
            normal[1] = -e1[0];
        } else {
            let e2 = &vertices[facet_vertices[2]] - a;
            normal[0] = e1[1] * e2[2] - e1[2] * e2[1];
            normal[1] = e1[2] * e2[0] - e1[0] * e2[2];
            normal[2] = e1[0] * e2[1] - e1[1] * e2[0];
        }

        let centroid = vertices
            .iter()
            .fold(OVector::<f64, D>::zeros(), |sum, v| sum + &v.coords)
            / vertices.len() as f64;
        if normal.dot(&(&a.coords - centroid)) < 0.0 {
            normal = -normal;
        }
        normal.normalize()
    }

    /// A quadrature rule for the reference element that integrates polynomials of the given
    /// degree exactly.
    ///
    /// For the quadrilateral the strength refers to the degree in each coordinate direction.
    ///
    /// Fails with [`DpgError::QuadratureUnavailable`] if no simplex rule of the requested
    /// strength is tabulated.
    ///
    /// # Panics
    ///
    /// Panics if `D` does not match the dimension of the shape.
    pub fn volume_quadrature<D>(&self, strength: usize) -> Result<QuadraturePair<D>, DpgError>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        self.assert_dim::<D>();
        let unavailable = |_: QuadratureError| DpgError::QuadratureUnavailable { shape: *self, strength };
        Ok(match self {
            Self::Triangle => convert_rule(polyquad::triangle(strength).map_err(unavailable)?),
            Self::Quadrilateral => convert_rule(quadrilateral_gauss(gauss_points_for_strength(strength))),
            Self::Tetrahedron => convert_rule(polyquad::tetrahedron(strength).map_err(unavailable)?),
        })
    }

    /// A quadrature rule for a single facet, with points in element reference coordinates.
    ///
    /// Facets of tetrahedra use the triangle rules and may fail like
    /// [`volume_quadrature`](Self::volume_quadrature).
    ///
    /// # Panics
    ///
    /// Panics if `D` does not match the dimension of the shape or the facet index is out of
    /// bounds.
    pub fn facet_quadrature<D>(&self, facet: usize, strength: usize) -> Result<FacetQuadrature<D>, DpgError>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        let vertices = self.reference_vertices::<D>();
        let facet_vertices = self.facet_vertices(facet);
        let reference_normal = self.reference_facet_normal::<D>(facet);
        let a = &vertices[facet_vertices[0]];
        let b = &vertices[facet_vertices[1]];

        let (weights, points) = if D::dim() == 2 {
            let (weights1d, points1d) = gauss(gauss_points_for_strength(strength));
            let half_length = 0.5 * (b - a).norm();
            let weights: Vec<f64> = weights1d.iter().map(|w| w * half_length).collect();
            let points: Vec<OPoint<f64, D>> = points1d
                .iter()
                .map(|&[t]| a + (b - a) * (0.5 * (t + 1.0)))
                .collect();
            (weights, points)
        } else {
            let c = &vertices[facet_vertices[2]];
            let (weights2d, points2d) = polyquad::triangle(strength).map_err(|_| DpgError::QuadratureUnavailable {
                shape: ReferenceShape::Triangle,
                strength,
            })?;
            let e1 = b - a;
            let e2 = c - a;
            let area = 0.5 * (e1.norm_squared() * e2.norm_squared() - e1.dot(&e2).powi(2)).sqrt();
            // The reference triangle of the rule has area 2
            let weights: Vec<f64> = weights2d.iter().map(|w| w * 0.5 * area).collect();
            let points: Vec<OPoint<f64, D>> = points2d
                .iter()
                .map(|&[x, y]| a + &e1 * (0.5 * (x + 1.0)) + &e2 * (0.5 * (y + 1.0)))
                .collect();
            (weights, points)
        };

        Ok(FacetQuadrature {
            weights,
            points,
            reference_normal,
        })
    }
}

/// The geometric map from a reference element to a physical element.
pub trait ElementGeometry<D>: Send + Sync
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    fn reference_shape(&self) -> ReferenceShape;

    /// Compute the Jacobian of the transformation from the reference element to the given
    /// element at the given reference coordinates.
    fn reference_jacobian(&self, reference_coords: &OPoint<f64, D>) -> OMatrix<f64, D, D>;

    /// Maps reference coordinates to physical coordinates in the element.
    fn map_reference_coords(&self, reference_coords: &OPoint<f64, D>) -> OPoint<f64, D>;
}

/// A scalar-valued local basis, such as a Lagrange basis.
pub trait ScalarBasis<D>: Send + Sync
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    fn num_dofs(&self) -> usize;

    /// The polynomial degree of the basis functions.
    ///
    /// Quadrature rules are chosen based on the sum of the orders of the paired components.
    fn order(&self) -> usize;

    /// Evaluates each basis function at the given reference coordinates.
    ///
    /// # Panics
    ///
    /// Implementations must panic if the length of `values` is not the number of dofs.
    fn populate_values(&self, values: &mut [f64], reference_coords: &OPoint<f64, D>);

    /// Populates the columns of `gradients` with the reference gradients of each basis
    /// function.
    ///
    /// # Panics
    ///
    /// Implementations must panic if `gradients` is not `D x num_dofs`.
    fn populate_gradients(&self, gradients: DMatrixViewMut<f64>, reference_coords: &OPoint<f64, D>);

    /// The local dofs whose basis functions have a non-vanishing trace on the given facet.
    ///
    /// Returns `None` if the basis has no boundary trace representation, as is the case for
    /// discontinuous spaces whose dofs are not associated with facets.
    fn facet_dofs(&self, facet: usize) -> Option<Vec<usize>>;
}

/// A vector-valued local basis with continuous normal components across facets.
pub trait FluxBasis<D>: Send + Sync
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    fn num_dofs(&self) -> usize;

    fn order(&self) -> usize;

    /// Populates the columns of `values` with the basis functions on the reference element.
    ///
    /// The physical basis functions are obtained with the contravariant Piola transform
    /// `q = J q_ref / det J`.
    ///
    /// # Panics
    ///
    /// Implementations must panic if `values` is not `D x num_dofs`.
    fn populate_reference_values(&self, values: DMatrixViewMut<f64>, reference_coords: &OPoint<f64, D>);

    /// The local dofs whose normal components do not vanish on the given facet.
    ///
    /// Returns `None` if the basis has no boundary trace representation.
    fn facet_dofs(&self, facet: usize) -> Option<Vec<usize>>;
}

/// Geometric data of the element map at a single reference point.
#[derive(Debug, Clone)]
pub struct MappedPoint<D>
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    point: OPoint<f64, D>,
    jacobian: OMatrix<f64, D, D>,
    jacobian_det: f64,
    inverse_transpose: OMatrix<f64, D, D>,
}

impl<D> MappedPoint<D>
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    /// Evaluates the element map at the given reference coordinates.
    ///
    /// Returns [`DpgError::DegenerateElement`] if the Jacobian is singular.
    pub fn evaluate(geometry: &dyn ElementGeometry<D>, reference_coords: &OPoint<f64, D>) -> Result<Self, DpgError> {
        let jacobian = geometry.reference_jacobian(reference_coords);
        let jacobian_det = jacobian.determinant();
        if jacobian_det == 0.0 || !jacobian_det.is_finite() {
            return Err(DpgError::DegenerateElement);
        }
        let inverse = jacobian
            .clone()
            .try_inverse()
            .ok_or(DpgError::DegenerateElement)?;
        Ok(Self {
            point: geometry.map_reference_coords(reference_coords),
            jacobian,
            jacobian_det,
            inverse_transpose: inverse.transpose(),
        })
    }

    /// The physical coordinates of the point.
    pub fn point(&self) -> &OPoint<f64, D> {
        &self.point
    }

    pub fn jacobian(&self) -> &OMatrix<f64, D, D> {
        &self.jacobian
    }

    pub fn jacobian_det(&self) -> f64 {
        self.jacobian_det
    }

    /// The inverse transpose of the Jacobian, which maps reference gradients to physical
    /// gradients.
    pub fn inverse_transpose(&self) -> &OMatrix<f64, D, D> {
        &self.inverse_transpose
    }

    /// The factor relating reference volume to physical volume.
    pub fn volume_measure(&self) -> f64 {
        self.jacobian_det.abs()
    }

    /// The outward unit normal and the surface measure factor for a facet with the given
    /// reference normal.
    ///
    /// The measure factor relates the reference facet measure to the physical facet measure,
    /// `ds = |det J| |J^-T n_ref| ds_ref`.
    pub fn facet_normal_and_measure(&self, reference_normal: &OVector<f64, D>) -> (OVector<f64, D>, f64) {
        let scaled_normal = &self.inverse_transpose * reference_normal;
        let norm = scaled_normal.norm();
        (scaled_normal / norm, self.jacobian_det.abs() * norm)
    }
}
