//! Error types.
use crate::compound::ComponentKind;
use crate::element::ReferenceShape;
use crate::integrator::IntegratorKind;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Library-wide error type.
///
/// Configuration errors are returned when integrators are constructed from form definitions.
/// The remaining variants are raised by the assembly routines, which wrap them in an
/// [`eyre::Report`]. Use `report.downcast_ref::<DpgError>()` to inspect the kind.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DpgError {
    /// The form definition names an integrator that does not exist.
    UnknownIntegrator { name: String },
    /// The form definition has the wrong number of arguments for the integrator.
    WrongArgumentCount {
        integrator: IntegratorKind,
        expected: &'static str,
        found: usize,
    },
    /// A coefficient expression could not be parsed.
    MalformedExpression { expression: String },
    /// A named coefficient is not defined in the coefficient table.
    UnknownCoefficient { name: String },
    /// A component index expression does not evaluate to a constant.
    NonConstantComponentIndex,
    /// A component index expression evaluates to something that is not a positive
    /// (1-based) integer.
    InvalidComponentIndex { value: f64 },
    /// The coefficient cannot be used with the integrator under the active options.
    UnsupportedCoefficient { integrator: IntegratorKind, reason: String },
    /// The finite element space of a component has no boundary trace representation.
    UnsupportedSpace { integrator: IntegratorKind, component: usize },
    /// A component index is not valid for the compound element.
    ComponentOutOfRange { component: usize, num_components: usize },
    /// The component has the wrong kind of finite element space for the integrator.
    ComponentKindMismatch {
        integrator: IntegratorKind,
        component: usize,
        expected: ComponentKind,
    },
    /// A form with a complex coefficient was assembled in a real field.
    ComplexCoefficientInRealAssembly { integrator: IntegratorKind },
    /// The integrator does not produce the requested kind of contribution, for example when
    /// a surface form is assembled on a volume element.
    FormKindMismatch {
        integrator: IntegratorKind,
        requested: &'static str,
    },
    /// The number of coefficient components does not match the spatial dimension.
    DimensionMismatch {
        integrator: IntegratorKind,
        expected: usize,
        found: usize,
    },
    /// The element map is singular at a quadrature point.
    DegenerateElement,
    /// No quadrature rule of the required strength is available for the reference shape.
    QuadratureUnavailable { shape: ReferenceShape, strength: usize },
}

impl Display for DpgError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownIntegrator { name } => write!(f, "unknown integrator \"{name}\""),
            Self::WrongArgumentCount {
                integrator,
                expected,
                found,
            } => write!(f, "integrator {integrator} expects {expected} arguments, but {found} were given"),
            Self::MalformedExpression { expression } => {
                write!(f, "malformed coefficient expression \"{expression}\"")
            }
            Self::UnknownCoefficient { name } => write!(f, "unknown coefficient \"{name}\""),
            Self::NonConstantComponentIndex => {
                write!(f, "component index must be a constant expression")
            }
            Self::InvalidComponentIndex { value } => {
                write!(f, "component index must be a positive integer, but evaluates to {value}")
            }
            Self::UnsupportedCoefficient { integrator, reason } => {
                write!(f, "unsupported coefficient for integrator {integrator}: {reason}")
            }
            Self::UnsupportedSpace { integrator, component } => write!(
                f,
                "integrator {integrator} requires a boundary trace representation, \
                 which the space of component {} does not provide",
                component + 1
            ),
            Self::ComponentOutOfRange {
                component,
                num_components,
            } => write!(
                f,
                "component {} does not exist, the compound element has {num_components} components",
                component + 1
            ),
            Self::ComponentKindMismatch {
                integrator,
                component,
                expected,
            } => write!(
                f,
                "integrator {integrator} requires component {} to be of kind {expected:?}",
                component + 1
            ),
            Self::ComplexCoefficientInRealAssembly { integrator } => write!(
                f,
                "integrator {integrator} has a complex coefficient and cannot be assembled in a real field"
            ),
            Self::FormKindMismatch { integrator, requested } => {
                write!(f, "integrator {integrator} does not provide a {requested}")
            }
            Self::DimensionMismatch {
                integrator,
                expected,
                found,
            } => write!(
                f,
                "integrator {integrator} expected {expected} coefficient components, found {found}"
            ),
            Self::DegenerateElement => write!(f, "element map is singular"),
            Self::QuadratureUnavailable { shape, strength } => {
                write!(f, "no quadrature rule of strength {strength} is available for {shape:?} elements")
            }
        }
    }
}

impl std::error::Error for DpgError {}
