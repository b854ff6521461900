use crate::unit_tests::assembly::error_kind;
use crate::unit_tests::{unit_square, unit_triangle};
use fenris_dpg::coefficient::CoefficientFunction;
use fenris_dpg::compound::CompoundElement;
use fenris_dpg::element::{P1Tetrahedron, P1Triangle, Q1Quadrilateral, TetrahedronGeometry};
use fenris_dpg::error::DpgError;
use fenris_dpg::integrator::{DpgIntegrator, IntegratorKind, VolumeCoefficientPolicy};
use fenris_dpg::nalgebra::{DVector, DVectorViewMut};
use matrixcompare::assert_matrix_eq;
use num::Complex;
use std::sync::Arc;

fn neumann(component: usize, scalar: impl Into<CoefficientFunction>, flux: Vec<CoefficientFunction>) -> DpgIntegrator {
    DpgIntegrator::neumann_volume(
        component,
        Arc::new(scalar.into()),
        flux.into_iter().map(Arc::new).collect(),
        VolumeCoefficientPolicy::default(),
    )
    .unwrap()
}

#[test]
fn neumann_volume_normal_flux_on_flagged_facet() {
    let geometry = unit_square();
    let element = CompoundElement::new(&geometry)
        .with_scalar_component(&Q1Quadrilateral)
        .with_boundary_facets(&[1]);
    let integrator = neumann(0, 0.0, vec![1.0.into(), 0.0.into()]);

    let mut output = DVector::repeat(4, 3.0);
    integrator
        .assemble_real_element_vector(DVectorViewMut::from(&mut output), &element)
        .unwrap();
    // G · n = 1 on the right facet, which carries vertices 1 and 2
    assert_matrix_eq!(output, DVector::from_column_slice(&[0.0, 0.5, 0.5, 0.0]), comp = abs, tol = 1e-14);
}

#[test]
fn neumann_volume_writes_to_component_range() {
    let geometry = unit_square();
    let element = CompoundElement::new(&geometry)
        .with_scalar_component(&Q1Quadrilateral)
        .with_scalar_component(&Q1Quadrilateral)
        .with_boundary_facets(&[0, 1]);
    // On the bottom facet G · n = -1 cancels g, on the right facet the two add up
    let integrator = neumann(1, 1.0, vec![1.0.into(), 1.0.into()]);

    let mut output = DVector::zeros(8);
    integrator
        .assemble_real_element_vector(DVectorViewMut::from(&mut output), &element)
        .unwrap();

    let expected = DVector::from_column_slice(&[0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0]);
    assert_matrix_eq!(output, expected, comp = abs, tol = 1e-14);
}

#[test]
fn neumann_volume_on_tetrahedron_facet() {
    let geometry = TetrahedronGeometry::reference();
    let element = CompoundElement::new(&geometry)
        .with_scalar_component(&P1Tetrahedron)
        .with_boundary_facets(&[2]);
    let integrator = neumann(0, 0.0, vec![1.0.into(), 1.0.into(), 1.0.into()]);

    let mut output = DVector::zeros(4);
    integrator
        .assemble_real_element_vector(DVectorViewMut::from(&mut output), &element)
        .unwrap();
    // Facet 2 is the slanted face through vertices 1, 2, 3 with area 2√3, where G · n = √3
    let expected = DVector::from_column_slice(&[0.0, 2.0, 2.0, 2.0]);
    assert_matrix_eq!(output, expected, comp = abs, tol = 1e-12);
}

#[test]
fn neumann_volume_without_boundary_facets_is_zero() {
    let geometry = unit_triangle();
    let element = CompoundElement::new(&geometry).with_scalar_component(&P1Triangle);
    let integrator = neumann(0, 2.0, vec![1.0.into(), 1.0.into()]);
    let mut output = DVector::repeat(3, 1.0);
    integrator
        .assemble_real_element_vector(DVectorViewMut::from(&mut output), &element)
        .unwrap();
    assert_matrix_eq!(output, DVector::<f64>::zeros(3), comp = abs, tol = 0.0);
}

#[test]
fn neumann_volume_complex_source() {
    let geometry = unit_triangle();
    let element = CompoundElement::new(&geometry)
        .with_scalar_component(&P1Triangle)
        .with_boundary_facets(&[2]);
    let integrator = neumann(0, Complex::new(0.0, 2.0), vec![0.0.into(), 0.0.into()]);
    assert!(integrator.is_complex());

    let mut output = DVector::from_element(3, Complex::new(0.0, 0.0));
    integrator
        .assemble_complex_element_vector(DVectorViewMut::from(&mut output), &element)
        .unwrap();
    // Facet 2 has unit length and carries vertices 2 and 0
    assert_matrix_eq!(output.map(|z| z.re), DVector::<f64>::zeros(3), comp = abs, tol = 1e-14);
    assert_matrix_eq!(
        output.map(|z| z.im),
        DVector::from_column_slice(&[1.0, 0.0, 1.0]),
        comp = abs,
        tol = 1e-14
    );
}

#[test]
fn neumann_volume_flux_dimension_must_match() {
    let geometry = unit_triangle();
    let element = CompoundElement::new(&geometry)
        .with_scalar_component(&P1Triangle)
        .with_boundary_facets(&[0]);
    let integrator = neumann(0, 0.0, vec![0.0.into(), 0.0.into(), 0.0.into()]);
    let mut output = DVector::zeros(3);
    let error = integrator
        .assemble_real_element_vector(DVectorViewMut::from(&mut output), &element)
        .unwrap_err();
    assert_eq!(
        error_kind(error),
        DpgError::DimensionMismatch {
            integrator: IntegratorKind::NeumannVolume,
            expected: 2,
            found: 3
        }
    );
}

#[test]
fn bilinear_forms_have_no_element_vector() {
    let geometry = unit_triangle();
    let element = CompoundElement::new(&geometry).with_scalar_component(&P1Triangle);
    let integrator = crate::unit_tests::assembly::pairing(IntegratorKind::EyeEye, 1, 1, 1.0);
    let mut output = DVector::zeros(3);
    let error = integrator
        .assemble_real_element_vector(DVectorViewMut::from(&mut output), &element)
        .unwrap_err();
    assert!(matches!(error_kind(error), DpgError::FormKindMismatch { .. }));
}
