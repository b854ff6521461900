use crate::element::{ElementGeometry, ReferenceShape, ScalarBasis};
use nalgebra::{DMatrixViewMut, Matrix1x4, Matrix3, Matrix3x4, Point3, U3, Vector3};

/// The affine map of a tetrahedron.
///
/// The reference element is the tetrahedron with vertices
/// (-1, -1, -1), (1, -1, -1), (-1, 1, -1), (-1, -1, 1).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TetrahedronGeometry {
    vertices: [Point3<f64>; 4],
}

impl TetrahedronGeometry {
    pub fn from_vertices(vertices: [Point3<f64>; 4]) -> Self {
        Self { vertices }
    }

    pub fn reference() -> Self {
        Self::from_vertices([
            Point3::new(-1.0, -1.0, -1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(-1.0, -1.0, 1.0),
        ])
    }

    pub fn vertices(&self) -> &[Point3<f64>; 4] {
        &self.vertices
    }
}

#[rustfmt::skip]
fn p1_tetrahedron_values(xi: &Point3<f64>) -> Matrix1x4<f64> {
    Matrix1x4::new(
        -0.5 * (1.0 + xi.x + xi.y + xi.z),
        0.5 * (1.0 + xi.x),
        0.5 * (1.0 + xi.y),
        0.5 * (1.0 + xi.z),
    )
}

#[rustfmt::skip]
fn p1_tetrahedron_gradients() -> Matrix3x4<f64> {
    Matrix3x4::from_columns(&[
        Vector3::new(-0.5, -0.5, -0.5),
        Vector3::new(0.5, 0.0, 0.0),
        Vector3::new(0.0, 0.5, 0.0),
        Vector3::new(0.0, 0.0, 0.5),
    ])
}

impl ElementGeometry<U3> for TetrahedronGeometry {
    fn reference_shape(&self) -> ReferenceShape {
        ReferenceShape::Tetrahedron
    }

    #[allow(non_snake_case)]
    fn reference_jacobian(&self, _: &Point3<f64>) -> Matrix3<f64> {
        let X = Matrix3x4::from_fn(|i, j| self.vertices[j][i]);
        X * p1_tetrahedron_gradients().transpose()
    }

    #[allow(non_snake_case)]
    fn map_reference_coords(&self, xi: &Point3<f64>) -> Point3<f64> {
        let X = Matrix3x4::from_fn(|i, j| self.vertices[j][i]);
        Point3::from(X * p1_tetrahedron_values(xi).transpose())
    }
}

/// Linear Lagrange basis on a tetrahedron, with one dof per vertex.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct P1Tetrahedron;

impl ScalarBasis<U3> for P1Tetrahedron {
    fn num_dofs(&self) -> usize {
        4
    }

    fn order(&self) -> usize {
        1
    }

    fn populate_values(&self, values: &mut [f64], xi: &Point3<f64>) {
        values.copy_from_slice(p1_tetrahedron_values(xi).as_slice());
    }

    fn populate_gradients(&self, mut gradients: DMatrixViewMut<f64>, _: &Point3<f64>) {
        gradients.copy_from(&p1_tetrahedron_gradients());
    }

    fn facet_dofs(&self, facet: usize) -> Option<Vec<usize>> {
        Some(ReferenceShape::Tetrahedron.facet_vertices(facet).to_vec())
    }
}
