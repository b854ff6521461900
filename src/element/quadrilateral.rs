use crate::element::{ElementGeometry, ReferenceShape, ScalarBasis};
use nalgebra::{DMatrixViewMut, Matrix1x4, Matrix2, Matrix2x4, Point2, U2, Vector2};

/// The bilinear map of a quadrilateral in two dimensions.
///
/// The reference element is the square `[-1, 1]^2` with vertices in counter-clockwise order,
/// starting at `(-1, -1)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuadrilateralGeometry {
    vertices: [Point2<f64>; 4],
}

impl QuadrilateralGeometry {
    pub fn from_vertices(vertices: [Point2<f64>; 4]) -> Self {
        Self { vertices }
    }

    /// The axis-aligned rectangle `[x0, x1] x [y0, y1]`.
    pub fn rectangle(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        Self::from_vertices([
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ])
    }

    pub fn vertices(&self) -> &[Point2<f64>; 4] {
        &self.vertices
    }
}

#[rustfmt::skip]
fn q1_values(xi: &Point2<f64>) -> Matrix1x4<f64> {
    // phi_{alpha, beta} equals 1 at the vertex (alpha, beta) with alpha, beta = 1 or -1
    let phi = |alpha: f64, beta: f64| (1.0 + alpha * xi.x) * (1.0 + beta * xi.y) / 4.0;
    Matrix1x4::new(
        phi(-1.0, -1.0),
        phi( 1.0, -1.0),
        phi( 1.0,  1.0),
        phi(-1.0,  1.0),
    )
}

#[rustfmt::skip]
fn q1_gradients(xi: &Point2<f64>) -> Matrix2x4<f64> {
    let phi_grad = |alpha: f64, beta: f64| Vector2::new(
        alpha * (1.0 + beta * xi.y) / 4.0,
        beta * (1.0 + alpha * xi.x) / 4.0,
    );
    Matrix2x4::from_columns(&[
        phi_grad(-1.0, -1.0),
        phi_grad( 1.0, -1.0),
        phi_grad( 1.0,  1.0),
        phi_grad(-1.0,  1.0),
    ])
}

impl ElementGeometry<U2> for QuadrilateralGeometry {
    fn reference_shape(&self) -> ReferenceShape {
        ReferenceShape::Quadrilateral
    }

    #[allow(non_snake_case)]
    fn reference_jacobian(&self, xi: &Point2<f64>) -> Matrix2<f64> {
        let X = Matrix2x4::from_fn(|i, j| self.vertices[j][i]);
        X * q1_gradients(xi).transpose()
    }

    #[allow(non_snake_case)]
    fn map_reference_coords(&self, xi: &Point2<f64>) -> Point2<f64> {
        let X = Matrix2x4::from_fn(|i, j| self.vertices[j][i]);
        Point2::from(X * q1_values(xi).transpose())
    }
}

/// Bilinear Lagrange basis on a quadrilateral, with one dof per vertex.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Q1Quadrilateral;

impl ScalarBasis<U2> for Q1Quadrilateral {
    fn num_dofs(&self) -> usize {
        4
    }

    /// The degree in each coordinate direction.
    fn order(&self) -> usize {
        1
    }

    fn populate_values(&self, values: &mut [f64], xi: &Point2<f64>) {
        values.copy_from_slice(q1_values(xi).as_slice());
    }

    fn populate_gradients(&self, mut gradients: DMatrixViewMut<f64>, xi: &Point2<f64>) {
        gradients.copy_from(&q1_gradients(xi));
    }

    fn facet_dofs(&self, facet: usize) -> Option<Vec<usize>> {
        Some(ReferenceShape::Quadrilateral.facet_vertices(facet).to_vec())
    }
}
