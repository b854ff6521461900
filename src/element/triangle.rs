use crate::element::{ElementGeometry, ReferenceShape, ScalarBasis};
use nalgebra::{DMatrixViewMut, Matrix1x3, Matrix2, Matrix2x3, Point2, U2, Vector2};

/// The affine map of a triangle in two dimensions.
///
/// The reference element is chosen to be the triangle defined by the corners
/// (-1, -1), (1, -1), (-1, 1).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TriangleGeometry {
    vertices: [Point2<f64>; 3],
}

impl TriangleGeometry {
    pub fn from_vertices(vertices: [Point2<f64>; 3]) -> Self {
        Self { vertices }
    }

    pub fn reference() -> Self {
        Self::from_vertices([Point2::new(-1.0, -1.0), Point2::new(1.0, -1.0), Point2::new(-1.0, 1.0)])
    }

    pub fn vertices(&self) -> &[Point2<f64>; 3] {
        &self.vertices
    }

    /// The signed area, which is positive for counter-clockwise vertex order.
    pub fn signed_area(&self) -> f64 {
        let [a, b, c] = &self.vertices;
        0.5 * (b - a).perp(&(c - a))
    }
}

#[rustfmt::skip]
fn p1_triangle_values(xi: &Point2<f64>) -> Matrix1x3<f64> {
    Matrix1x3::new(
        -0.5 * xi.x - 0.5 * xi.y,
        0.5 * xi.x + 0.5,
        0.5 * xi.y + 0.5
    )
}

#[rustfmt::skip]
fn p1_triangle_gradients() -> Matrix2x3<f64> {
    Matrix2x3::from_columns(&[
        Vector2::new(-0.5, -0.5),
        Vector2::new(0.5, 0.0),
        Vector2::new(0.0, 0.5)
    ])
}

impl ElementGeometry<U2> for TriangleGeometry {
    fn reference_shape(&self) -> ReferenceShape {
        ReferenceShape::Triangle
    }

    #[allow(non_snake_case)]
    fn reference_jacobian(&self, _: &Point2<f64>) -> Matrix2<f64> {
        let X = Matrix2x3::from_fn(|i, j| self.vertices[j][i]);
        X * p1_triangle_gradients().transpose()
    }

    #[allow(non_snake_case)]
    fn map_reference_coords(&self, xi: &Point2<f64>) -> Point2<f64> {
        let X = Matrix2x3::from_fn(|i, j| self.vertices[j][i]);
        Point2::from(X * p1_triangle_values(xi).transpose())
    }
}

/// Linear Lagrange basis on a triangle, with one dof per vertex.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct P1Triangle;

impl ScalarBasis<U2> for P1Triangle {
    fn num_dofs(&self) -> usize {
        3
    }

    fn order(&self) -> usize {
        1
    }

    fn populate_values(&self, values: &mut [f64], xi: &Point2<f64>) {
        values.copy_from_slice(p1_triangle_values(xi).as_slice());
    }

    fn populate_gradients(&self, mut gradients: DMatrixViewMut<f64>, _: &Point2<f64>) {
        gradients.copy_from(&p1_triangle_gradients());
    }

    fn facet_dofs(&self, facet: usize) -> Option<Vec<usize>> {
        Some(ReferenceShape::Triangle.facet_vertices(facet).to_vec())
    }
}
