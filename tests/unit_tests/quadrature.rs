use fenris_dpg::element::ReferenceShape;
use fenris_dpg::error::DpgError;
use fenris_dpg::nalgebra::{Point2, Vector2, Vector3, U2, U3};
use fenris_dpg::quadrature::QuadraturePair;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};

fn integrate(rule: &QuadraturePair<U2>, f: impl Fn(&Point2<f64>) -> f64) -> f64 {
    let (weights, points) = rule;
    weights.iter().zip(points).map(|(w, p)| w * f(p)).sum()
}

#[test]
fn volume_quadrature_weights_sum_to_reference_volume() {
    for strength in 0..8 {
        let (weights, _) = ReferenceShape::Triangle.volume_quadrature::<U2>(strength).unwrap();
        assert_scalar_eq!(weights.iter().sum::<f64>(), 2.0, comp = abs, tol = 1e-13);

        let (weights, _) = ReferenceShape::Quadrilateral.volume_quadrature::<U2>(strength).unwrap();
        assert_scalar_eq!(weights.iter().sum::<f64>(), 4.0, comp = abs, tol = 1e-13);

        let (weights, _) = ReferenceShape::Tetrahedron.volume_quadrature::<U3>(strength).unwrap();
        assert_scalar_eq!(weights.iter().sum::<f64>(), 4.0 / 3.0, comp = abs, tol = 1e-13);
    }
}

#[test]
fn simplex_quadrature_beyond_tabulated_strength_is_an_error() {
    let error = ReferenceShape::Tetrahedron.volume_quadrature::<U3>(11).unwrap_err();
    assert_eq!(
        error,
        DpgError::QuadratureUnavailable {
            shape: ReferenceShape::Tetrahedron,
            strength: 11
        }
    );

    // Tetrahedron facets share the triangle rules
    let error = ReferenceShape::Tetrahedron.facet_quadrature::<U3>(0, 21).unwrap_err();
    assert_eq!(
        error,
        DpgError::QuadratureUnavailable {
            shape: ReferenceShape::Triangle,
            strength: 21
        }
    );

    // Quadrilateral rules are tensor products and exist for any strength
    assert!(ReferenceShape::Quadrilateral.volume_quadrature::<U2>(40).is_ok());
}

#[test]
fn triangle_quadrature_integrates_quadratic_exactly() {
    let quadrature = ReferenceShape::Triangle.volume_quadrature::<U2>(2).unwrap();
    // ∫ x^2 over the reference triangle: ∫_{-1}^{1} x^2 (1 - x) dx
    let integral = integrate(&quadrature, |p| p.x * p.x);
    assert_scalar_eq!(integral, 2.0 / 3.0, comp = abs, tol = 1e-13);
    let integral = integrate(&quadrature, |p| p.x * p.y);
    // ∫_{-1}^{1} x (x^2 - 1) / 2 dx vanishes since the integrand is odd
    assert_scalar_eq!(integral, 0.0, comp = abs, tol = 1e-13);
}

#[test]
fn quadrilateral_quadrature_integrates_bilinear_product_exactly() {
    let quadrature = ReferenceShape::Quadrilateral.volume_quadrature::<U2>(2).unwrap();
    let integral = integrate(&quadrature, |p| (1.0 + p.x) * (1.0 + p.x) * (1.0 - p.y) * (1.0 - p.y));
    assert_scalar_eq!(integral, (8.0 / 3.0) * (8.0 / 3.0), comp = abs, tol = 1e-12);
}

#[test]
fn facet_quadrature_weights_sum_to_facet_measure() {
    let triangle_lengths = [2.0, 2.0 * f64::sqrt(2.0), 2.0];
    for (facet, length) in triangle_lengths.iter().enumerate() {
        let quadrature = ReferenceShape::Triangle.facet_quadrature::<U2>(facet, 3).unwrap();
        assert_scalar_eq!(quadrature.weights.iter().sum::<f64>(), *length, comp = abs, tol = 1e-13);
    }

    for facet in 0..4 {
        let quadrature = ReferenceShape::Quadrilateral.facet_quadrature::<U2>(facet, 2).unwrap();
        assert_scalar_eq!(quadrature.weights.iter().sum::<f64>(), 2.0, comp = abs, tol = 1e-13);
    }

    let tetrahedron_areas = [2.0, 2.0, 2.0 * f64::sqrt(3.0), 2.0];
    for (facet, area) in tetrahedron_areas.iter().enumerate() {
        let quadrature = ReferenceShape::Tetrahedron.facet_quadrature::<U3>(facet, 2).unwrap();
        assert_scalar_eq!(quadrature.weights.iter().sum::<f64>(), *area, comp = abs, tol = 1e-12);
    }
}

#[test]
fn facet_quadrature_points_lie_on_facet() {
    let quadrature = ReferenceShape::Triangle.facet_quadrature::<U2>(1, 4).unwrap();
    for p in &quadrature.points {
        assert_scalar_eq!(p.x + p.y, 0.0, comp = abs, tol = 1e-14);
    }

    let quadrature = ReferenceShape::Tetrahedron.facet_quadrature::<U3>(2, 3).unwrap();
    for p in &quadrature.points {
        assert_scalar_eq!(p.x + p.y + p.z, -1.0, comp = abs, tol = 1e-14);
    }
}

#[test]
fn reference_facet_normals_point_outward() {
    let s = 1.0 / f64::sqrt(2.0);
    let expected = [Vector2::new(0.0, -1.0), Vector2::new(s, s), Vector2::new(-1.0, 0.0)];
    for (facet, n) in expected.iter().enumerate() {
        let normal = ReferenceShape::Triangle.reference_facet_normal::<U2>(facet);
        assert_matrix_eq!(normal, *n, comp = abs, tol = 1e-14);
    }

    let expected = [
        Vector2::new(0.0, -1.0),
        Vector2::new(1.0, 0.0),
        Vector2::new(0.0, 1.0),
        Vector2::new(-1.0, 0.0),
    ];
    for (facet, n) in expected.iter().enumerate() {
        let normal = ReferenceShape::Quadrilateral.reference_facet_normal::<U2>(facet);
        assert_matrix_eq!(normal, *n, comp = abs, tol = 1e-14);
    }

    let t = 1.0 / f64::sqrt(3.0);
    let expected = [
        Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(0.0, -1.0, 0.0),
        Vector3::new(t, t, t),
        Vector3::new(-1.0, 0.0, 0.0),
    ];
    for (facet, n) in expected.iter().enumerate() {
        let normal = ReferenceShape::Tetrahedron.reference_facet_normal::<U3>(facet);
        assert_matrix_eq!(normal, *n, comp = abs, tol = 1e-14);
    }
}
