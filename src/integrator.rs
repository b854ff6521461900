//! The family of operator-pairing integrators.
//!
//! Every integrator couples a *trial* component `ind1` and a *test* component `ind2` of a
//! compound element through a pair of operators and a scalar coefficient,
//!
//! ```text
//! b(u, v) = ∫ c(x) C(u) D(v),
//! ```
//!
//! integrated over the element volume, over all element facets or over facets on the
//! global boundary. The available variants and their registration names are listed in
//! [`IntegratorKind`]. The assembly entry points live in [`crate::assembly::local`].
use crate::coefficient::CoefficientFunction;
use crate::compound::ComponentKind;
use crate::error::DpgError;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

/// The registered integrator variants.
///
/// The names of the variants (as produced by `Display` and accepted by `FromStr`) are the
/// stable identifiers used in form definitions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntegratorKind {
    /// `∫_K a ∇u · ∇v dx` for scalar components.
    GradGrad,
    /// `∫_∂K d (q · n) v ds` for a flux component `q` and a scalar component `v`.
    FluxTrace,
    /// `∫_K a u v dx` for scalar components.
    EyeEye,
    /// `∫_∂K c u v ds` for scalar components.
    TraceTrace,
    /// `∫_Γ c (q · n) (r · n) ds` on surface elements, for flux components.
    FluxFluxBoundary,
    /// `∫_Γ c u v ds` on surface elements, for scalar components.
    TraceTraceBoundary,
    /// `∫_{∂K ∩ Γ} c u v ds` on volume elements, for scalar components.
    RobinVolume,
    /// `∫_Γ c (q · n) w ds` on surface elements.
    FluxTraceBoundary,
    /// The load vector `∫_{∂K ∩ Γ} (G · n + g) e ds` on volume elements.
    NeumannVolume,
}

/// A differential operator applied to a component.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Identity,
    Gradient,
    NormalFlux,
}

impl Operator {
    /// The kind of component the operator can be applied to.
    pub fn component_kind(&self) -> ComponentKind {
        match self {
            Self::Identity | Self::Gradient => ComponentKind::Scalar,
            Self::NormalFlux => ComponentKind::Flux,
        }
    }
}

/// The domain an integrator integrates over.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntegrationDomain {
    /// The interior of each element.
    Volume,
    /// All facets of each element.
    ElementBoundary,
    /// Only facets on the global boundary.
    GlobalBoundary,
}

/// The kind of element an integrator is assembled on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// A volume element, whose dimension equals the spatial dimension.
    Volume,
    /// A facet on the global boundary, whose dimension is one less than the spatial
    /// dimension.
    Surface,
}

impl IntegratorKind {
    pub const ALL: [IntegratorKind; 9] = [
        Self::GradGrad,
        Self::FluxTrace,
        Self::EyeEye,
        Self::TraceTrace,
        Self::FluxFluxBoundary,
        Self::TraceTraceBoundary,
        Self::RobinVolume,
        Self::FluxTraceBoundary,
        Self::NeumannVolume,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::GradGrad => "GradGrad",
            Self::FluxTrace => "FluxTrace",
            Self::EyeEye => "EyeEye",
            Self::TraceTrace => "TraceTrace",
            Self::FluxFluxBoundary => "FluxFluxBoundary",
            Self::TraceTraceBoundary => "TraceTraceBoundary",
            Self::RobinVolume => "RobinVolume",
            Self::FluxTraceBoundary => "FluxTraceBoundary",
            Self::NeumannVolume => "NeumannVolume",
        }
    }

    pub fn domain(&self) -> IntegrationDomain {
        match self {
            Self::GradGrad | Self::EyeEye => IntegrationDomain::Volume,
            Self::FluxTrace | Self::TraceTrace => IntegrationDomain::ElementBoundary,
            Self::FluxFluxBoundary
            | Self::TraceTraceBoundary
            | Self::FluxTraceBoundary
            | Self::RobinVolume
            | Self::NeumannVolume => IntegrationDomain::GlobalBoundary,
        }
    }

    pub fn element_kind(&self) -> ElementKind {
        match self {
            Self::FluxFluxBoundary | Self::TraceTraceBoundary | Self::FluxTraceBoundary => ElementKind::Surface,
            _ => ElementKind::Volume,
        }
    }

    /// Whether the integrator is assembled on surface elements of the global boundary.
    pub fn is_boundary_form(&self) -> bool {
        self.element_kind() == ElementKind::Surface
    }

    /// The dimension of the elements the integrator is assembled on.
    ///
    /// # Panics
    ///
    /// Panics if `space_dim` is zero.
    pub fn element_dim(&self, space_dim: usize) -> usize {
        assert!(space_dim > 0, "spatial dimension must be positive");
        match self.element_kind() {
            ElementKind::Volume => space_dim,
            ElementKind::Surface => space_dim - 1,
        }
    }

    /// Whether the integrator produces a load vector rather than a matrix.
    pub fn is_linear_form(&self) -> bool {
        *self == Self::NeumannVolume
    }

    /// The trial and test operators of a bilinear form, or `None` for linear forms.
    pub fn operators(&self) -> Option<(Operator, Operator)> {
        use Operator::*;
        match self {
            Self::GradGrad => Some((Gradient, Gradient)),
            Self::EyeEye | Self::TraceTrace | Self::TraceTraceBoundary | Self::RobinVolume => {
                Some((Identity, Identity))
            }
            Self::FluxTrace | Self::FluxTraceBoundary => Some((NormalFlux, Identity)),
            Self::FluxFluxBoundary => Some((NormalFlux, NormalFlux)),
            Self::NeumannVolume => None,
        }
    }
}

impl Display for IntegratorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for IntegratorKind {
    type Err = DpgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| DpgError::UnknownIntegrator { name: s.to_string() })
    }
}

/// How volume coefficients are treated when integrated over boundary facets.
///
/// `RobinVolume` and `NeumannVolume` evaluate coefficients defined on the volume at points
/// of boundary facets. This is exact for constant coefficients. For non-constant
/// coefficients, the value is the limit of the volume coefficient at the facet point, which
/// may differ from a coefficient defined on the boundary itself.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolumeCoefficientPolicy {
    /// Evaluate any coefficient at the physical facet points.
    #[default]
    EvaluateOnFacet,
    /// Reject non-constant coefficients when the integrator is constructed.
    RequireConstant,
}

/// Resolves a 1-based component number expression into a 0-based component index.
///
/// The expression must be constant. For complex constants, the real part is used. The value
/// is rounded to the nearest integer.
pub fn resolve_component_index(expression: &CoefficientFunction) -> Result<usize, DpgError> {
    let value = expression
        .constant_value()
        .ok_or(DpgError::NonConstantComponentIndex)?
        .re;
    let rounded = value.round();
    if !rounded.is_finite() || rounded < 1.0 {
        return Err(DpgError::InvalidComponentIndex { value });
    }
    Ok(rounded as usize - 1)
}

/// The trial (`ind1`) and test (`ind2`) component indices of a pairing integrator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompoundIndices {
    ind1: usize,
    ind2: usize,
}

impl CompoundIndices {
    /// Creates the indices from 0-based component indices.
    pub fn new(ind1: usize, ind2: usize) -> Self {
        Self { ind1, ind2 }
    }

    /// Evaluates two constant expressions holding 1-based component numbers.
    pub fn from_coefficients(ind1: &CoefficientFunction, ind2: &CoefficientFunction) -> Result<Self, DpgError> {
        Ok(Self {
            ind1: resolve_component_index(ind1)?,
            ind2: resolve_component_index(ind2)?,
        })
    }

    /// The 0-based index of the trial component.
    pub fn ind1(&self) -> usize {
        self.ind1
    }

    /// The 0-based index of the test component.
    pub fn ind2(&self) -> usize {
        self.ind2
    }
}

/// The payload of all bilinear integrator variants.
#[derive(Debug, Clone)]
pub struct PairingIntegrator {
    kind: IntegratorKind,
    indices: CompoundIndices,
    coefficient: Arc<CoefficientFunction>,
}

impl PairingIntegrator {
    pub fn kind(&self) -> IntegratorKind {
        self.kind
    }

    pub fn indices(&self) -> CompoundIndices {
        self.indices
    }

    pub fn coefficient(&self) -> &CoefficientFunction {
        &self.coefficient
    }

    /// Whether the assembled form is symmetric, which is the case exactly when the
    /// coefficient is real.
    pub fn is_symmetric(&self) -> bool {
        !self.coefficient.is_complex()
    }
}

/// The payload of the `NeumannVolume` load vector integrator.
#[derive(Debug, Clone)]
pub struct NeumannSource {
    component: usize,
    scalar: Arc<CoefficientFunction>,
    flux: Vec<Arc<CoefficientFunction>>,
}

impl NeumannSource {
    /// The 0-based index of the component the load vector is assembled for.
    pub fn component(&self) -> usize {
        self.component
    }

    /// The scalar boundary coefficient `g`.
    pub fn scalar(&self) -> &CoefficientFunction {
        &self.scalar
    }

    /// The components of the vector coefficient `G`.
    pub fn flux(&self) -> &[Arc<CoefficientFunction>] {
        &self.flux
    }

    pub fn is_complex(&self) -> bool {
        self.scalar.is_complex() || self.flux.iter().any(|c| c.is_complex())
    }
}

/// A record describing a constructed integrator, suitable for logging or reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegratorSummary {
    pub kind: IntegratorKind,
    /// The 1-based component numbers, as written in the form definition.
    pub components: Vec<usize>,
    pub domain: IntegrationDomain,
    pub element_kind: ElementKind,
    pub symmetric: bool,
    pub complex: bool,
}

impl Display for IntegratorSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.components.as_slice() {
            [component] => write!(f, "Using DPG source integrator {} on component {}", self.kind, component),
            [ind1, ind2] => write!(f, "Using DPG integrator {} with components {} and {}", self.kind, ind1, ind2),
            components => write!(f, "Using DPG integrator {} with components {:?}", self.kind, components),
        }
    }
}

/// An operator-pairing integrator.
#[derive(Debug, Clone)]
pub enum DpgIntegrator {
    GradGrad(PairingIntegrator),
    FluxTrace(PairingIntegrator),
    EyeEye(PairingIntegrator),
    TraceTrace(PairingIntegrator),
    FluxFluxBoundary(PairingIntegrator),
    TraceTraceBoundary(PairingIntegrator),
    RobinVolume(PairingIntegrator),
    FluxTraceBoundary(PairingIntegrator),
    NeumannVolume(NeumannSource),
}

fn check_volume_coefficient(
    kind: IntegratorKind,
    coefficient: &CoefficientFunction,
    policy: VolumeCoefficientPolicy,
) -> Result<(), DpgError> {
    if policy == VolumeCoefficientPolicy::RequireConstant && !coefficient.is_constant() {
        Err(DpgError::UnsupportedCoefficient {
            integrator: kind,
            reason: "only constant volume coefficients can be restricted to boundary facets".to_string(),
        })
    } else {
        Ok(())
    }
}

impl DpgIntegrator {
    /// Creates a bilinear pairing integrator.
    ///
    /// Returns [`DpgError::FormKindMismatch`] if `kind` is not a bilinear form.
    pub fn pairing(
        kind: IntegratorKind,
        indices: CompoundIndices,
        coefficient: Arc<CoefficientFunction>,
    ) -> Result<Self, DpgError> {
        Self::pairing_with_policy(kind, indices, coefficient, VolumeCoefficientPolicy::default())
    }

    pub fn pairing_with_policy(
        kind: IntegratorKind,
        indices: CompoundIndices,
        coefficient: Arc<CoefficientFunction>,
        policy: VolumeCoefficientPolicy,
    ) -> Result<Self, DpgError> {
        if kind == IntegratorKind::RobinVolume {
            check_volume_coefficient(kind, &coefficient, policy)?;
        }
        let payload = PairingIntegrator {
            kind,
            indices,
            coefficient,
        };
        let integrator = match kind {
            IntegratorKind::GradGrad => Self::GradGrad(payload),
            IntegratorKind::FluxTrace => Self::FluxTrace(payload),
            IntegratorKind::EyeEye => Self::EyeEye(payload),
            IntegratorKind::TraceTrace => Self::TraceTrace(payload),
            IntegratorKind::FluxFluxBoundary => Self::FluxFluxBoundary(payload),
            IntegratorKind::TraceTraceBoundary => Self::TraceTraceBoundary(payload),
            IntegratorKind::RobinVolume => Self::RobinVolume(payload),
            IntegratorKind::FluxTraceBoundary => Self::FluxTraceBoundary(payload),
            IntegratorKind::NeumannVolume => {
                return Err(DpgError::FormKindMismatch {
                    integrator: kind,
                    requested: "bilinear form",
                })
            }
        };
        info!("{}", integrator.summary());
        Ok(integrator)
    }

    /// Creates the `NeumannVolume` load vector integrator for the given 0-based component.
    pub fn neumann_volume(
        component: usize,
        scalar: Arc<CoefficientFunction>,
        flux: Vec<Arc<CoefficientFunction>>,
        policy: VolumeCoefficientPolicy,
    ) -> Result<Self, DpgError> {
        let kind = IntegratorKind::NeumannVolume;
        check_volume_coefficient(kind, &scalar, policy)?;
        for coefficient in &flux {
            check_volume_coefficient(kind, coefficient, policy)?;
        }
        let integrator = Self::NeumannVolume(NeumannSource {
            component,
            scalar,
            flux,
        });
        info!("{}", integrator.summary());
        Ok(integrator)
    }

    /// Creates an integrator from its list of coefficient expressions, as given in a form
    /// definition.
    ///
    /// Bilinear variants expect exactly `[ind1, ind2, coefficient]`, where the indices are
    /// 1-based component numbers. `NeumannVolume` expects `[index, g, Gx, Gy]` or
    /// `[index, g, Gx, Gy, Gz]`.
    pub fn from_coefficients(
        kind: IntegratorKind,
        coefficients: &[Arc<CoefficientFunction>],
        policy: VolumeCoefficientPolicy,
    ) -> Result<Self, DpgError> {
        match (kind, coefficients) {
            (IntegratorKind::NeumannVolume, [index, scalar, flux @ ..]) if (2..=3).contains(&flux.len()) => {
                let component = resolve_component_index(index)?;
                Self::neumann_volume(component, scalar.clone(), flux.to_vec(), policy)
            }
            (IntegratorKind::NeumannVolume, _) => Err(DpgError::WrongArgumentCount {
                integrator: kind,
                expected: "4 or 5",
                found: coefficients.len(),
            }),
            (_, [ind1, ind2, coefficient]) => {
                let indices = CompoundIndices::from_coefficients(ind1, ind2)?;
                Self::pairing_with_policy(kind, indices, coefficient.clone(), policy)
            }
            (_, _) => Err(DpgError::WrongArgumentCount {
                integrator: kind,
                expected: "3",
                found: coefficients.len(),
            }),
        }
    }

    pub fn kind(&self) -> IntegratorKind {
        match self {
            Self::NeumannVolume(_) => IntegratorKind::NeumannVolume,
            Self::GradGrad(p)
            | Self::FluxTrace(p)
            | Self::EyeEye(p)
            | Self::TraceTrace(p)
            | Self::FluxFluxBoundary(p)
            | Self::TraceTraceBoundary(p)
            | Self::RobinVolume(p)
            | Self::FluxTraceBoundary(p) => p.kind,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// The pairing payload, or `None` for the load vector integrator.
    pub fn as_pairing(&self) -> Option<&PairingIntegrator> {
        match self {
            Self::NeumannVolume(_) => None,
            Self::GradGrad(p)
            | Self::FluxTrace(p)
            | Self::EyeEye(p)
            | Self::TraceTrace(p)
            | Self::FluxFluxBoundary(p)
            | Self::TraceTraceBoundary(p)
            | Self::RobinVolume(p)
            | Self::FluxTraceBoundary(p) => Some(p),
        }
    }

    /// Whether the assembled bilinear form is symmetric.
    ///
    /// This is the case exactly when the coefficient is real. The load vector integrator
    /// does not define a bilinear form and always returns `false`.
    pub fn is_symmetric(&self) -> bool {
        self.as_pairing()
            .map(PairingIntegrator::is_symmetric)
            .unwrap_or(false)
    }

    pub fn is_complex(&self) -> bool {
        match self {
            Self::NeumannVolume(source) => source.is_complex(),
            _ => self
                .as_pairing()
                .map(|p| p.coefficient.is_complex())
                .unwrap_or(false),
        }
    }

    pub fn is_boundary_form(&self) -> bool {
        self.kind().is_boundary_form()
    }

    pub fn element_kind(&self) -> ElementKind {
        self.kind().element_kind()
    }

    pub fn domain(&self) -> IntegrationDomain {
        self.kind().domain()
    }

    /// The dimension of the elements the integrator is assembled on, for the given spatial
    /// dimension.
    ///
    /// # Panics
    ///
    /// Panics if `space_dim` is zero.
    pub fn element_dim(&self, space_dim: usize) -> usize {
        self.kind().element_dim(space_dim)
    }

    pub fn summary(&self) -> IntegratorSummary {
        let components = match self {
            Self::NeumannVolume(source) => vec![source.component + 1],
            _ => self
                .as_pairing()
                .map(|p| vec![p.indices.ind1 + 1, p.indices.ind2 + 1])
                .unwrap_or_default(),
        };
        IntegratorSummary {
            kind: self.kind(),
            components,
            domain: self.domain(),
            element_kind: self.element_kind(),
            symmetric: self.is_symmetric(),
            complex: self.is_complex(),
        }
    }
}
