//! Global assembly of integrators over a compound finite element space.
//!
//! Element contributions are computed in parallel and then scattered serially in element
//! order, so the assembled result does not depend on the number of threads.
use crate::allocators::DimAllocator;
use crate::assembly::buffers::ElementScratch;
use crate::compound::CompoundElement;
use crate::integrator::{DpgIntegrator, ElementKind};
use crate::scalar::FieldScalar;
use crate::SmallDim;
use log::debug;
use nalgebra::{DMatrix, DMatrixViewMut, DVector, DVectorViewMut, DefaultAllocator};
use nalgebra_sparse::CooMatrix;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::cell::RefCell;
use thread_local::ThreadLocal;

/// A compound finite element space, as seen by the global assembler.
///
/// The space owns the element geometries and component bases. Each element has a
/// local-to-global map of its compound local dofs.
pub trait CompoundSpace<D>: Sync
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    fn num_elements(&self) -> usize;

    /// The total number of global dofs.
    fn num_dofs(&self) -> usize;

    /// The number of compound local dofs of the given element.
    fn element_dof_count(&self, element_index: usize) -> usize;

    /// Populates the global indices of the compound local dofs of the given element.
    ///
    /// # Panics
    ///
    /// Implementations must panic if the length of `dofs` is not the element dof count.
    fn populate_element_dofs(&self, dofs: &mut [usize], element_index: usize);

    /// Calls `visitor` with the compound element with the given index.
    fn visit_element(
        &self,
        element_index: usize,
        visitor: &mut dyn FnMut(&CompoundElement<D>) -> eyre::Result<()>,
    ) -> eyre::Result<()>;
}

/// An element matrix together with the global indices of its rows and columns.
type MatrixContribution<S> = (Vec<usize>, DMatrix<S>);
type VectorContribution<S> = (Vec<usize>, DVector<S>);

/// A parallel assembler for global matrices and vectors.
#[derive(Debug)]
pub struct GlobalAssembler<S: FieldScalar> {
    workspace: ThreadLocal<RefCell<ElementScratch<S>>>,
}

impl<S: FieldScalar> Default for GlobalAssembler<S> {
    fn default() -> Self {
        Self {
            workspace: ThreadLocal::new(),
        }
    }
}

impl<S: FieldScalar> GlobalAssembler<S> {
    /// Assembles the global matrix of a bilinear integrator.
    ///
    /// Volume-element integrators are assembled on every element. Surface integrators are
    /// assembled on every facet flagged as lying on the global boundary, and their
    /// contributions are mapped to global dofs through the facet trace dofs.
    pub fn assemble_matrix<D>(
        &self,
        integrator: &DpgIntegrator,
        space: &dyn CompoundSpace<D>,
    ) -> eyre::Result<CooMatrix<S>>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        debug!(
            "Assembling global matrix for {} over {} elements",
            integrator.name(),
            space.num_elements()
        );
        let contributions = (0..space.num_elements())
            .into_par_iter()
            .map(|element_index| self.element_matrix_contributions(integrator, space, element_index))
            .collect::<eyre::Result<Vec<_>>>()?;

        let n = space.num_dofs();
        let mut coo = CooMatrix::new(n, n);
        for (global_dofs, matrix) in contributions.into_iter().flatten() {
            for (j, &col) in global_dofs.iter().enumerate() {
                for (i, &row) in global_dofs.iter().enumerate() {
                    let value = matrix[(i, j)];
                    if value != S::zero() {
                        coo.push(row, col, value);
                    }
                }
            }
        }
        debug!("Assembled global matrix with {} triplets", coo.nnz());
        Ok(coo)
    }

    /// Assembles the global load vector of a linear integrator.
    pub fn assemble_vector<D>(&self, integrator: &DpgIntegrator, space: &dyn CompoundSpace<D>) -> eyre::Result<DVector<S>>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        debug!(
            "Assembling global vector for {} over {} elements",
            integrator.name(),
            space.num_elements()
        );
        let contributions = (0..space.num_elements())
            .into_par_iter()
            .map(|element_index| self.element_vector_contribution(integrator, space, element_index))
            .collect::<eyre::Result<Vec<_>>>()?;

        let mut vector = DVector::zeros(space.num_dofs());
        for (global_dofs, element_vector) in contributions {
            for (&dof, &value) in global_dofs.iter().zip(element_vector.iter()) {
                vector[dof] += value;
            }
        }
        Ok(vector)
    }

    fn element_dofs<D>(space: &dyn CompoundSpace<D>, element_index: usize) -> Vec<usize>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        let mut dofs = vec![usize::MAX; space.element_dof_count(element_index)];
        space.populate_element_dofs(&mut dofs, element_index);
        dofs
    }

    fn element_matrix_contributions<D>(
        &self,
        integrator: &DpgIntegrator,
        space: &dyn CompoundSpace<D>,
        element_index: usize,
    ) -> eyre::Result<Vec<MatrixContribution<S>>>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        let scratch = &mut *self.workspace.get_or_default().borrow_mut();
        let element_dofs = Self::element_dofs(space, element_index);
        let mut contributions = Vec::new();

        space.visit_element(element_index, &mut |element| {
            assert_eq!(
                element.num_dofs(),
                element_dofs.len(),
                "Element dof count must match the local-to-global map"
            );
            match integrator.element_kind() {
                ElementKind::Volume => {
                    let n = element.num_dofs();
                    let mut matrix = DMatrix::zeros(n, n);
                    integrator.assemble_element_matrix(DMatrixViewMut::from(&mut matrix), element, scratch)?;
                    contributions.push((element_dofs.clone(), matrix));
                }
                ElementKind::Surface => {
                    for facet in element.boundary_facets() {
                        let boundary = element.boundary_element(facet);
                        let n = boundary.num_dofs();
                        let mut matrix = DMatrix::zeros(n, n);
                        integrator.assemble_boundary_element_matrix(
                            DMatrixViewMut::from(&mut matrix),
                            &boundary,
                            scratch,
                        )?;
                        let global_dofs = boundary
                            .element_local_dofs()
                            .into_iter()
                            .map(|local| element_dofs[local])
                            .collect();
                        contributions.push((global_dofs, matrix));
                    }
                }
            }
            Ok(())
        })?;

        Ok(contributions)
    }

    fn element_vector_contribution<D>(
        &self,
        integrator: &DpgIntegrator,
        space: &dyn CompoundSpace<D>,
        element_index: usize,
    ) -> eyre::Result<VectorContribution<S>>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        let scratch = &mut *self.workspace.get_or_default().borrow_mut();
        let element_dofs = Self::element_dofs(space, element_index);
        let mut vector = DVector::zeros(element_dofs.len());

        space.visit_element(element_index, &mut |element| {
            integrator.assemble_element_vector(DVectorViewMut::from(&mut vector), element, scratch)
        })?;

        Ok((element_dofs, vector))
    }
}
