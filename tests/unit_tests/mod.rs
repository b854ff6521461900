use fenris_dpg::element::{QuadrilateralGeometry, TriangleGeometry};
use fenris_dpg::nalgebra::Point2;

mod form;
mod quadrature;

/// The triangle with vertices (0, 0), (1, 0), (0, 1).
pub fn unit_triangle() -> TriangleGeometry {
    TriangleGeometry::from_vertices([Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)])
}

pub fn unit_square() -> QuadrilateralGeometry {
    QuadrilateralGeometry::rectangle(0.0, 1.0, 0.0, 1.0)
}
