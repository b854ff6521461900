//! Textual form definitions.
//!
//! A form definition is a single line naming an integrator followed by its arguments,
//! separated by whitespace:
//!
//! ```text
//! GradGrad 1 1 a
//! FluxTrace 2 1 (0.0,1.0)
//! NeumannVolume 1 0.0 gx gy
//! ```
//!
//! Arguments are real literals, complex literals `(re,im)` or names of coefficients defined
//! in a [`CoefficientTable`]. Component indices are ordinary arguments that must resolve to
//! constants.
use crate::coefficient::CoefficientFunction;
use crate::error::DpgError;
use crate::integrator::{DpgIntegrator, IntegratorKind, VolumeCoefficientPolicy};
use num::Complex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// Options that apply to all integrators built from form definitions.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    pub volume_coefficient_policy: VolumeCoefficientPolicy,
}

/// A single argument of a form definition.
#[derive(Debug, Clone, PartialEq)]
pub enum CoefficientExpression {
    Real(f64),
    Complex(Complex<f64>),
    Named(String),
}

fn malformed(expression: &str) -> DpgError {
    DpgError::MalformedExpression {
        expression: expression.to_string(),
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .map(|c| c.is_alphabetic() || c == '_')
        .unwrap_or(false)
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

impl FromStr for CoefficientExpression {
    type Err = DpgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(inner) = s.strip_prefix('(') {
            let inner = inner.strip_suffix(')').ok_or_else(|| malformed(s))?;
            let (re, im) = inner.split_once(',').ok_or_else(|| malformed(s))?;
            let parse = |part: &str| part.trim().parse::<f64>().map_err(|_| malformed(s));
            Ok(Self::Complex(Complex::new(parse(re)?, parse(im)?)))
        } else if let Ok(value) = s.parse::<f64>() {
            Ok(Self::Real(value))
        } else if is_identifier(s) {
            Ok(Self::Named(s.to_string()))
        } else {
            Err(malformed(s))
        }
    }
}

/// Splits a line at whitespace outside of parentheses.
fn tokenize(line: &str) -> Result<Vec<&str>, DpgError> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = None;

    for (i, c) in line.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1).ok_or_else(|| malformed(line))?,
            _ => {}
        }
        if c.is_whitespace() && depth == 0 {
            if let Some(s) = start.take() {
                tokens.push(&line[s..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if depth != 0 {
        return Err(malformed(line));
    }
    if let Some(s) = start {
        tokens.push(&line[s..]);
    }
    Ok(tokens)
}

/// A parsed form definition line.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDefinition {
    pub kind: IntegratorKind,
    pub arguments: Vec<CoefficientExpression>,
}

impl FromStr for FormDefinition {
    type Err = DpgError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens = tokenize(line)?;
        let (name, arguments) = tokens.split_first().ok_or_else(|| malformed(line))?;
        Ok(Self {
            kind: name.parse()?,
            arguments: arguments
                .iter()
                .map(|token| token.parse())
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Named coefficients available to form definitions.
#[derive(Debug, Clone, Default)]
pub struct CoefficientTable {
    coefficients: HashMap<String, Arc<CoefficientFunction>>,
}

impl CoefficientTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines (or redefines) a named coefficient.
    pub fn insert(&mut self, name: impl Into<String>, coefficient: impl Into<CoefficientFunction>) {
        self.insert_shared(name, Arc::new(coefficient.into()));
    }

    pub fn insert_shared(&mut self, name: impl Into<String>, coefficient: Arc<CoefficientFunction>) {
        self.coefficients.insert(name.into(), coefficient);
    }

    pub fn with(mut self, name: impl Into<String>, coefficient: impl Into<CoefficientFunction>) -> Self {
        self.insert(name, coefficient);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<CoefficientFunction>> {
        self.coefficients.get(name)
    }

    /// Turns an expression into a coefficient. Literals produce new constant coefficients,
    /// names are looked up in the table.
    pub fn resolve(&self, expression: &CoefficientExpression) -> Result<Arc<CoefficientFunction>, DpgError> {
        match expression {
            CoefficientExpression::Real(value) => Ok(CoefficientFunction::constant(*value).shared()),
            CoefficientExpression::Complex(value) => Ok(CoefficientFunction::complex_constant(*value).shared()),
            CoefficientExpression::Named(name) => self
                .get(name)
                .cloned()
                .ok_or_else(|| DpgError::UnknownCoefficient { name: name.clone() }),
        }
    }
}

/// Constructs the integrator described by a form definition.
pub fn build_integrator(
    definition: &FormDefinition,
    table: &CoefficientTable,
    options: &FormOptions,
) -> Result<DpgIntegrator, DpgError> {
    let coefficients = definition
        .arguments
        .iter()
        .map(|expression| table.resolve(expression))
        .collect::<Result<Vec<_>, _>>()?;
    DpgIntegrator::from_coefficients(definition.kind, &coefficients, options.volume_coefficient_policy)
}

/// Parses a block of form definitions, one per line, and constructs their integrators.
///
/// Empty lines and lines starting with `#` are skipped.
pub fn parse_forms(text: &str, table: &CoefficientTable, options: &FormOptions) -> Result<Vec<DpgIntegrator>, DpgError> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| build_integrator(&line.parse()?, table, options))
        .collect()
}
