//! The template evaluation seam.

mod reference;

pub use reference::ReferenceEvaluator;

use thiserror::Error;

use crate::context::EvaluationContext;
use crate::value::Value;

/// Resolves one template string against an evaluation context.
///
/// Implementations may return any value shape; structured results are
/// traced again by the caller.
pub trait Evaluator: Send + Sync {
    fn eval(&self, template: &str, ctx: &EvaluationContext) -> Result<Value, EvalError>;
}

impl<F> Evaluator for F
where
    F: Fn(&str, &EvaluationContext) -> Result<Value, EvalError> + Send + Sync,
{
    fn eval(&self, template: &str, ctx: &EvaluationContext) -> Result<Value, EvalError> {
        self(template, ctx)
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EvalError {
    #[error("referenced path not found: {0}")]
    ReferenceNotFound(String),

    #[error("invalid reference path: {0}")]
    InvalidReferencePath(String),

    #[error("cannot interpolate non-scalar value: {0}")]
    NonScalarReference(String),

    #[error("unclosed reference (missing '}}') in '{0}'")]
    UnclosedReference(String),

    /// Failure reported by an external evaluator.
    #[error("evaluation failed: {0}")]
    Failed(String),
}
