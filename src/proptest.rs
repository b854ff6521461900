//! Proptest strategies for element geometries.
use crate::element::{QuadrilateralGeometry, TetrahedronGeometry, TriangleGeometry};
use ::proptest::prelude::*;
use nalgebra::{Matrix3, Point2, Point3};

pub fn point2() -> impl Strategy<Value = Point2<f64>> {
    // Pick a reasonably small range to pick coordinates from, so that element sizes stay
    // within a few orders of magnitude of each other
    let range = -10.0..10.0;
    [range.clone(), range].prop_map(|[x, y]| Point2::new(x, y))
}

pub fn point3() -> impl Strategy<Value = Point3<f64>> {
    let range = -10.0..10.0;
    [range.clone(), range.clone(), range].prop_map(|[x, y, z]| Point3::new(x, y, z))
}

impl Arbitrary for TriangleGeometry {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    /// Counter-clockwise triangles that are not close to degenerate.
    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        [point2(), point2(), point2()]
            .prop_filter_map("triangle is nearly degenerate", |[a, b, c]| {
                let triangle = TriangleGeometry::from_vertices([a, b, c]);
                let area = triangle.signed_area();
                let scale = [b - a, c - b, a - c]
                    .iter()
                    .map(|side| side.norm_squared())
                    .fold(0.0, f64::max);
                if area.abs() < 1e-2 * scale {
                    None
                } else if area > 0.0 {
                    Some(triangle)
                } else {
                    Some(TriangleGeometry::from_vertices([a, c, b]))
                }
            })
            .boxed()
    }
}

impl Arbitrary for QuadrilateralGeometry {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    /// Convex, counter-clockwise quadrilaterals obtained by perturbing the corners of a
    /// rectangle.
    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        let perturbation = [-1.0..1.0, -1.0..1.0];
        (
            point2(),
            0.5..5.0,
            0.5..5.0,
            [perturbation.clone(), perturbation.clone(), perturbation.clone(), perturbation],
        )
            .prop_map(|(origin, width, height, perturbations)| {
                let corners = [
                    Point2::new(origin.x, origin.y),
                    Point2::new(origin.x + width, origin.y),
                    Point2::new(origin.x + width, origin.y + height),
                    Point2::new(origin.x, origin.y + height),
                ];
                let amplitude = 0.1 * f64::min(width, height);
                let mut vertices = corners;
                for (vertex, [dx, dy]) in vertices.iter_mut().zip(perturbations) {
                    vertex.x += amplitude * dx;
                    vertex.y += amplitude * dy;
                }
                QuadrilateralGeometry::from_vertices(vertices)
            })
            .boxed()
    }
}

impl Arbitrary for TetrahedronGeometry {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    /// Positively oriented tetrahedra that are not close to degenerate.
    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        [point3(), point3(), point3(), point3()]
            .prop_filter_map("tetrahedron is nearly degenerate", |[a, b, c, d]| {
                let edges = Matrix3::from_columns(&[b - a, c - a, d - a]);
                let det = edges.determinant();
                let scale = edges.column_iter().map(|e| e.norm()).fold(0.0, f64::max);
                if det.abs() < 1e-2 * scale.powi(3) {
                    None
                } else if det > 0.0 {
                    Some(TetrahedronGeometry::from_vertices([a, b, c, d]))
                } else {
                    Some(TetrahedronGeometry::from_vertices([a, c, b, d]))
                }
            })
            .boxed()
    }
}
