use crate::unit_tests::assembly::{error_kind, pairing};
use fenris_dpg::assembly::global::{CompoundSpace, GlobalAssembler};
use fenris_dpg::compound::CompoundElement;
use fenris_dpg::element::{P1Triangle, TriangleGeometry};
use fenris_dpg::error::DpgError;
use fenris_dpg::integrator::{DpgIntegrator, IntegratorKind, VolumeCoefficientPolicy};
use fenris_dpg::nalgebra::{DMatrix, DVector, Point2, U2};
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use num::Complex;
use std::sync::Arc;

/// The unit square split along its diagonal into two P1 triangles.
struct SplitSquare {
    vertices: Vec<Point2<f64>>,
    connectivity: Vec<[usize; 3]>,
    boundary_facets: Vec<Vec<usize>>,
}

impl SplitSquare {
    fn new() -> Self {
        Self {
            vertices: vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
            connectivity: vec![[0, 1, 2], [0, 2, 3]],
            boundary_facets: vec![vec![0, 1], vec![1, 2]],
        }
    }
}

impl CompoundSpace<U2> for SplitSquare {
    fn num_elements(&self) -> usize {
        self.connectivity.len()
    }

    fn num_dofs(&self) -> usize {
        self.vertices.len()
    }

    fn element_dof_count(&self, _element_index: usize) -> usize {
        3
    }

    fn populate_element_dofs(&self, dofs: &mut [usize], element_index: usize) {
        dofs.copy_from_slice(&self.connectivity[element_index]);
    }

    fn visit_element(
        &self,
        element_index: usize,
        visitor: &mut dyn FnMut(&CompoundElement<U2>) -> eyre::Result<()>,
    ) -> eyre::Result<()> {
        let geometry = TriangleGeometry::from_vertices(self.connectivity[element_index].map(|v| self.vertices[v]));
        let element = CompoundElement::new(&geometry)
            .with_scalar_component(&P1Triangle)
            .with_boundary_facets(&self.boundary_facets[element_index]);
        visitor(&element)
    }
}

#[test]
fn global_mass_and_stiffness() {
    let space = SplitSquare::new();
    let assembler = GlobalAssembler::<f64>::default();

    let mass = assembler
        .assemble_matrix(&pairing(IntegratorKind::EyeEye, 1, 1, 1.0), &space)
        .unwrap();
    let mass = DMatrix::from(&mass);
    assert_scalar_eq!(mass.sum(), 1.0, comp = abs, tol = 1e-13);
    assert_matrix_eq!(mass.clone(), mass.transpose(), comp = abs, tol = 1e-15);

    let stiffness = assembler
        .assemble_matrix(&pairing(IntegratorKind::GradGrad, 1, 1, 1.0), &space)
        .unwrap();
    let stiffness = DMatrix::from(&stiffness);
    assert_matrix_eq!(stiffness.column_sum(), DVector::<f64>::zeros(4), comp = abs, tol = 1e-13);
    #[rustfmt::skip]
    let expected = DMatrix::from_row_slice(4, 4, &[
         1.0, -0.5,  0.0, -0.5,
        -0.5,  1.0, -0.5,  0.0,
         0.0, -0.5,  1.0, -0.5,
        -0.5,  0.0, -0.5,  1.0,
    ]);
    assert_matrix_eq!(stiffness, expected, comp = abs, tol = 1e-13);
}

#[test]
fn global_surface_form_covers_domain_boundary() {
    let space = SplitSquare::new();
    let assembler = GlobalAssembler::<f64>::default();
    let matrix = assembler
        .assemble_matrix(&pairing(IntegratorKind::TraceTraceBoundary, 1, 1, 1.0), &space)
        .unwrap();
    let matrix = DMatrix::from(&matrix);
    assert_scalar_eq!(matrix.sum(), 4.0, comp = abs, tol = 1e-13);
    // Every vertex of the square touches two boundary edges of unit length
    for i in 0..4 {
        assert_scalar_eq!(matrix[(i, i)], 2.0 / 3.0, comp = abs, tol = 1e-13);
    }
    // The diagonal is interior
    assert_eq!(matrix[(0, 2)], 0.0);
    assert_eq!(matrix[(1, 3)], 0.0);
}

#[test]
fn global_robin_volume_matches_surface_form() {
    let space = SplitSquare::new();
    let assembler = GlobalAssembler::<f64>::default();
    let robin = assembler
        .assemble_matrix(&pairing(IntegratorKind::RobinVolume, 1, 1, 1.0), &space)
        .unwrap();
    let surface = assembler
        .assemble_matrix(&pairing(IntegratorKind::TraceTraceBoundary, 1, 1, 1.0), &space)
        .unwrap();
    assert_matrix_eq!(DMatrix::from(&robin), DMatrix::from(&surface), comp = abs, tol = 1e-13);
}

#[test]
fn global_neumann_vector() {
    let space = SplitSquare::new();
    let integrator = DpgIntegrator::neumann_volume(
        0,
        Arc::new(1.0.into()),
        vec![Arc::new(0.0.into()), Arc::new(0.0.into())],
        VolumeCoefficientPolicy::default(),
    )
    .unwrap();
    let vector = GlobalAssembler::<f64>::default()
        .assemble_vector(&integrator, &space)
        .unwrap();
    assert_matrix_eq!(vector, DVector::from_element(4, 1.0), comp = abs, tol = 1e-13);
}

#[test]
fn global_complex_assembly() {
    let space = SplitSquare::new();
    let integrator = pairing(IntegratorKind::EyeEye, 1, 1, Complex::new(0.0, 1.0));

    let matrix = GlobalAssembler::<Complex<f64>>::default()
        .assemble_matrix(&integrator, &space)
        .unwrap();
    let matrix = DMatrix::from(&matrix);
    assert_scalar_eq!(matrix.sum().im, 1.0, comp = abs, tol = 1e-13);
    assert_scalar_eq!(matrix.sum().re, 0.0, comp = abs, tol = 1e-13);

    let error = GlobalAssembler::<f64>::default()
        .assemble_matrix(&integrator, &space)
        .unwrap_err();
    assert_eq!(
        error_kind(error),
        DpgError::ComplexCoefficientInRealAssembly {
            integrator: IntegratorKind::EyeEye
        }
    );
}

#[test]
fn global_assembly_is_deterministic() {
    let space = SplitSquare::new();
    let integrator = pairing(IntegratorKind::TraceTrace, 1, 1, 1.0);
    let assembler = GlobalAssembler::<f64>::default();
    let first = assembler.assemble_matrix(&integrator, &space).unwrap();
    let second = assembler.assemble_matrix(&integrator, &space).unwrap();
    assert_eq!(first.row_indices(), second.row_indices());
    assert_eq!(first.col_indices(), second.col_indices());
    assert_eq!(first.values(), second.values());
}
