//! Compound elements: one geometry shared by several component bases.
use crate::allocators::DimAllocator;
use crate::element::{ElementGeometry, FluxBasis, ScalarBasis};
use crate::SmallDim;
use nalgebra::DefaultAllocator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::ops::Range;

/// The kind of finite element space a component lives in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Scalar-valued fields, supporting values, gradients and traces.
    Scalar,
    /// Vector-valued fields with continuous normal components, supporting normal fluxes.
    Flux,
}

/// The local basis of a single component of a compound element.
pub enum ComponentBasis<'a, D>
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    Scalar(&'a dyn ScalarBasis<D>),
    Flux(&'a dyn FluxBasis<D>),
}

impl<'a, D> Clone for ComponentBasis<'a, D>
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, D> Copy for ComponentBasis<'a, D>
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
}

impl<'a, D> Debug for ComponentBasis<'a, D>
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}(num_dofs: {}, order: {})", self.kind(), self.num_dofs(), self.order())
    }
}

impl<'a, D> ComponentBasis<'a, D>
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Scalar(_) => ComponentKind::Scalar,
            Self::Flux(_) => ComponentKind::Flux,
        }
    }

    pub fn num_dofs(&self) -> usize {
        match self {
            Self::Scalar(basis) => basis.num_dofs(),
            Self::Flux(basis) => basis.num_dofs(),
        }
    }

    pub fn order(&self) -> usize {
        match self {
            Self::Scalar(basis) => basis.order(),
            Self::Flux(basis) => basis.order(),
        }
    }

    pub fn facet_dofs(&self, facet: usize) -> Option<Vec<usize>> {
        match self {
            Self::Scalar(basis) => basis.facet_dofs(facet),
            Self::Flux(basis) => basis.facet_dofs(facet),
        }
    }
}

/// Computes the offsets of consecutive blocks with the given sizes.
fn block_offsets(sizes: impl IntoIterator<Item = usize>) -> Vec<usize> {
    let mut offsets = vec![0];
    for size in sizes {
        let last = offsets[offsets.len() - 1];
        offsets.push(last + size);
    }
    offsets
}

/// An element of a compound finite element space.
///
/// The local dofs of the compound element are the local dofs of all components laid out
/// consecutively, in the order the components were added. Facets of the element that lie on
/// the global boundary must be flagged explicitly with [`with_boundary_facets`](Self::with_boundary_facets).
///
/// ```
/// use fenris_dpg::compound::CompoundElement;
/// use fenris_dpg::element::{P1Triangle, RaviartThomasTriangle, TriangleGeometry};
///
/// let geometry = TriangleGeometry::reference();
/// let (scalar, flux) = (P1Triangle, RaviartThomasTriangle::new());
/// let element = CompoundElement::new(&geometry)
///     .with_scalar_component(&scalar)
///     .with_flux_component(&flux)
///     .with_boundary_facets(&[0]);
/// assert_eq!(element.num_dofs(), 6);
/// assert_eq!(element.component_range(1), 3..6);
/// ```
pub struct CompoundElement<'a, D>
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    geometry: &'a dyn ElementGeometry<D>,
    components: Vec<ComponentBasis<'a, D>>,
    offsets: Vec<usize>,
    boundary_facets: Vec<bool>,
}

impl<'a, D> Debug for CompoundElement<'a, D>
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompoundElement")
            .field("shape", &self.geometry.reference_shape())
            .field("components", &self.components)
            .field("boundary_facets", &self.boundary_facets)
            .finish()
    }
}

impl<'a, D> CompoundElement<'a, D>
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    pub fn new(geometry: &'a dyn ElementGeometry<D>) -> Self {
        let num_facets = geometry.reference_shape().num_facets();
        Self {
            geometry,
            components: Vec::new(),
            offsets: vec![0],
            boundary_facets: vec![false; num_facets],
        }
    }

    pub fn with_component(mut self, basis: ComponentBasis<'a, D>) -> Self {
        let last = self.num_dofs();
        self.offsets.push(last + basis.num_dofs());
        self.components.push(basis);
        self
    }

    pub fn with_scalar_component(self, basis: &'a dyn ScalarBasis<D>) -> Self {
        self.with_component(ComponentBasis::Scalar(basis))
    }

    pub fn with_flux_component(self, basis: &'a dyn FluxBasis<D>) -> Self {
        self.with_component(ComponentBasis::Flux(basis))
    }

    /// Flags the given local facets as lying on the global boundary.
    ///
    /// # Panics
    ///
    /// Panics if a facet index is out of bounds for the reference shape.
    pub fn with_boundary_facets(mut self, facets: &[usize]) -> Self {
        for &facet in facets {
            assert!(facet < self.boundary_facets.len(), "facet index out of bounds");
            self.boundary_facets[facet] = true;
        }
        self
    }

    pub fn geometry(&self) -> &'a dyn ElementGeometry<D> {
        self.geometry
    }

    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    pub fn component(&self, index: usize) -> Option<ComponentBasis<'a, D>> {
        self.components.get(index).copied()
    }

    pub fn components(&self) -> &[ComponentBasis<'a, D>] {
        &self.components
    }

    /// The total number of local dofs over all components.
    pub fn num_dofs(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }

    /// The range of compound local dofs that belong to the given component.
    ///
    /// # Panics
    ///
    /// Panics if the component index is out of bounds.
    pub fn component_range(&self, index: usize) -> Range<usize> {
        self.offsets[index]..self.offsets[index + 1]
    }

    pub fn num_facets(&self) -> usize {
        self.boundary_facets.len()
    }

    pub fn is_boundary_facet(&self, facet: usize) -> bool {
        self.boundary_facets.get(facet).copied().unwrap_or(false)
    }

    /// The local indices of the facets flagged as lying on the global boundary.
    pub fn boundary_facets(&self) -> impl Iterator<Item = usize> + '_ {
        self.boundary_facets
            .iter()
            .enumerate()
            .filter_map(|(facet, &on_boundary)| on_boundary.then_some(facet))
    }

    /// The surface element for one of the facets of this element.
    ///
    /// # Panics
    ///
    /// Panics if the facet index is out of bounds.
    pub fn boundary_element(&self, facet: usize) -> CompoundBoundaryElement<'a, '_, D> {
        CompoundBoundaryElement::new(self, facet)
    }
}

/// A facet of a compound element, seen as a surface element.
///
/// The local dofs of a boundary element are the facet trace dofs of each component, laid out
/// consecutively. Components without a boundary trace representation contribute no dofs,
/// and surface forms that reference them fail to assemble.
#[derive(Debug)]
pub struct CompoundBoundaryElement<'a, 'b, D>
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    element: &'b CompoundElement<'a, D>,
    facet: usize,
    trace_dofs: Vec<Option<Vec<usize>>>,
    offsets: Vec<usize>,
}

impl<'a, 'b, D> CompoundBoundaryElement<'a, 'b, D>
where
    D: SmallDim,
    DefaultAllocator: DimAllocator<f64, D>,
{
    /// # Panics
    ///
    /// Panics if the facet index is out of bounds.
    pub fn new(element: &'b CompoundElement<'a, D>, facet: usize) -> Self {
        assert!(facet < element.num_facets(), "facet index out of bounds");
        let trace_dofs: Vec<_> = element
            .components()
            .iter()
            .map(|component| component.facet_dofs(facet))
            .collect();
        let offsets = block_offsets(
            trace_dofs
                .iter()
                .map(|dofs| dofs.as_ref().map(Vec::len).unwrap_or(0)),
        );
        Self {
            element,
            facet,
            trace_dofs,
            offsets,
        }
    }

    pub fn element(&self) -> &'b CompoundElement<'a, D> {
        self.element
    }

    pub fn local_facet(&self) -> usize {
        self.facet
    }

    pub fn num_dofs(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }

    /// The range of boundary-element local dofs that belong to the given component.
    ///
    /// # Panics
    ///
    /// Panics if the component index is out of bounds.
    pub fn component_range(&self, index: usize) -> Range<usize> {
        self.offsets[index]..self.offsets[index + 1]
    }

    /// The component-local dofs that make up the trace of the component on this facet, or
    /// `None` if the component has no trace representation.
    pub fn trace_dofs(&self, component: usize) -> Option<&[usize]> {
        self.trace_dofs.get(component)?.as_deref()
    }

    /// Maps each local dof of the boundary element to a local dof of the parent element.
    pub fn element_local_dofs(&self) -> Vec<usize> {
        self.trace_dofs
            .iter()
            .enumerate()
            .flat_map(|(component, dofs)| {
                let offset = self.element.component_range(component).start;
                dofs.iter().flatten().map(move |dof| offset + dof)
            })
            .collect()
    }
}
