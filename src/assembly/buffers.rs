use crate::allocators::DimAllocator;
use crate::compound::ComponentBasis;
use crate::element::{FluxBasis, MappedPoint, ScalarBasis};
use crate::scalar::FieldScalar;
use crate::SmallDim;
use nalgebra::{DMatrix, DVector, DefaultAllocator, OPoint, OVector, Scalar};

/// A buffer for basis function evaluations of a single component at one quadrature point.
#[derive(Debug)]
pub struct BasisFunctionBuffer {
    values: Vec<f64>,
    reference_gradients: DMatrix<f64>,
    gradients: DMatrix<f64>,
    reference_flux: DMatrix<f64>,
    restricted_values: Vec<f64>,
}

impl Default for BasisFunctionBuffer {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            reference_gradients: DMatrix::zeros(0, 0),
            gradients: DMatrix::zeros(0, 0),
            reference_flux: DMatrix::zeros(0, 0),
            restricted_values: Vec::new(),
        }
    }
}

impl BasisFunctionBuffer {
    /// Evaluates the basis functions of a scalar basis.
    pub fn populate_values<D>(&mut self, basis: &dyn ScalarBasis<D>, reference_coords: &OPoint<f64, D>)
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        self.values.resize(basis.num_dofs(), 0.0);
        basis.populate_values(&mut self.values, reference_coords);
    }

    /// Evaluates the physical gradients `J^-T ∇_ref φ` of a scalar basis.
    pub fn populate_gradients<D>(
        &mut self,
        basis: &dyn ScalarBasis<D>,
        reference_coords: &OPoint<f64, D>,
        mapped: &MappedPoint<D>,
    ) where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        let n = basis.num_dofs();
        self.reference_gradients.resize_mut(D::dim(), n, 0.0);
        self.gradients.resize_mut(D::dim(), n, 0.0);
        basis.populate_gradients(self.reference_gradients.view_mut((0, 0), (D::dim(), n)), reference_coords);
        self.gradients
            .gemm(1.0, mapped.inverse_transpose(), &self.reference_gradients, 0.0);
    }

    /// Evaluates the normal components `q · n` of the Piola-mapped flux basis functions
    /// `q = J q_ref / det J`.
    pub fn populate_normal_flux<D>(
        &mut self,
        basis: &dyn FluxBasis<D>,
        reference_coords: &OPoint<f64, D>,
        mapped: &MappedPoint<D>,
        normal: &OVector<f64, D>,
    ) where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        let n = basis.num_dofs();
        self.reference_flux.resize_mut(D::dim(), n, 0.0);
        basis.populate_reference_values(self.reference_flux.view_mut((0, 0), (D::dim(), n)), reference_coords);

        // (J q_ref) · n = q_ref · (J^T n)
        let pulled_back_normal = mapped.jacobian().tr_mul(normal) / mapped.jacobian_det();
        self.values.resize(n, 0.0);
        for (j, value) in self.values.iter_mut().enumerate() {
            *value = self.reference_flux.column(j).dot(&pulled_back_normal);
        }
    }

    /// Evaluates the operand of a facet pairing: plain values for scalar components and
    /// normal fluxes for flux components.
    pub fn populate_facet_operand<D>(
        &mut self,
        basis: ComponentBasis<D>,
        reference_coords: &OPoint<f64, D>,
        mapped: &MappedPoint<D>,
        normal: &OVector<f64, D>,
    ) where
        D: SmallDim,
        DefaultAllocator: DimAllocator<f64, D>,
    {
        match basis {
            ComponentBasis::Scalar(basis) => self.populate_values(basis, reference_coords),
            ComponentBasis::Flux(basis) => self.populate_normal_flux(basis, reference_coords, mapped, normal),
        }
    }

    /// Restricts the current values to the given subset of dofs, in the given order.
    pub fn restrict_values(&mut self, dofs: &[usize]) {
        self.restricted_values.clear();
        self.restricted_values
            .extend(dofs.iter().map(|&dof| self.values[dof]));
        std::mem::swap(&mut self.values, &mut self.restricted_values);
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The physical gradients as columns of a `D x n` matrix.
    pub fn gradients(&self) -> &DMatrix<f64> {
        &self.gradients
    }
}

/// Caller-owned scratch memory for element assembly.
///
/// A scratch buffer can be reused across any number of assembly calls and integrators. It
/// grows to fit the largest element it has been used with.
#[derive(Debug)]
pub struct ElementScratch<S: Scalar> {
    pub(crate) trial: BasisFunctionBuffer,
    pub(crate) test: BasisFunctionBuffer,
    pub(crate) block: DMatrix<S>,
    pub(crate) vector: DVector<S>,
}

impl<S: FieldScalar> Default for ElementScratch<S> {
    fn default() -> Self {
        Self {
            trial: BasisFunctionBuffer::default(),
            test: BasisFunctionBuffer::default(),
            block: DMatrix::zeros(0, 0),
            vector: DVector::zeros(0),
        }
    }
}

impl<S: FieldScalar> ElementScratch<S> {
    /// Resizes the pairing block to `test x trial` and zeroes it.
    pub(crate) fn prepare_block(&mut self, num_test: usize, num_trial: usize) {
        self.block.resize_mut(num_test, num_trial, S::zero());
        self.block.fill(S::zero());
    }

    pub(crate) fn prepare_vector(&mut self, len: usize) {
        self.vector.resize_vertically_mut(len, S::zero());
        self.vector.fill(S::zero());
    }
}
