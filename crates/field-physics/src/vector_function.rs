//! Formula-defined vector fields

use crate::expression::{Expr, ExprError};
use crate::source::VectorField;
use glam::DVec3;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("component {component}: {source}")]
pub struct VectorFunctionError {
    pub component: char,
    #[source]
    pub source: ExprError,
}

/// A vector field given by one formula per component.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorFunction {
    components: [Expr; 3],
}

impl VectorFunction {
    pub fn new(x: Expr, y: Expr, z: Expr) -> Self {
        Self {
            components: [x, y, z],
        }
    }

    /// Parse the three component formulas.
    pub fn parse(x: &str, y: &str, z: &str) -> Result<Self, VectorFunctionError> {
        let parse = |component, src: &str| {
            Expr::parse(src).map_err(|source| VectorFunctionError { component, source })
        };
        Ok(Self::new(parse('x', x)?, parse('y', y)?, parse('z', z)?))
    }

    pub fn components(&self) -> &[Expr; 3] {
        &self.components
    }

    pub fn eval(&self, point: DVec3) -> DVec3 {
        let [x, y, z] = &self.components;
        DVec3::new(x.eval(point), y.eval(point), z.eval(point))
    }
}

impl VectorField for VectorFunction {
    fn field(&self, point: DVec3) -> DVec3 {
        self.eval(point)
    }
}
