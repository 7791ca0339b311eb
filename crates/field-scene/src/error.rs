use field_physics::VectorFunctionError;
use std::fmt;
use thiserror::Error;

/// A single element (or start point) that could not be turned into an object.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ElementError {
    #[error("element {index} is not an object")]
    NotAnObject { index: usize },
    #[error("element {index} has no type")]
    MissingType { index: usize },
    #[error("element {index}: unknown type '{kind}'")]
    UnknownType { index: usize, kind: String },
    #[error("element {index} ({kind}): missing '{field}'")]
    MissingField {
        index: usize,
        kind: &'static str,
        field: &'static str,
    },
    #[error("element {index} ({kind}): '{field}' is not a number")]
    NotANumber {
        index: usize,
        kind: &'static str,
        field: &'static str,
    },
    #[error("element {index} ({kind}): '{field}' is out of range")]
    OutOfRange {
        index: usize,
        kind: &'static str,
        field: &'static str,
    },
    #[error("start point {index}: missing '{field}'")]
    StartPoint { index: usize, field: &'static str },
}

/// All element errors of one scene.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementErrors(pub Vec<ElementError>);

impl fmt::Display for ElementErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown visualisation type '{0}'")]
    UnknownKind(String),
    #[error("a simple vector field needs a 'field' with x, y and z formulas")]
    MissingFunction,
    #[error("invalid field formula: {0}")]
    Function(#[from] VectorFunctionError),
    #[error("invalid elements: {0}")]
    Elements(ElementErrors),
}
