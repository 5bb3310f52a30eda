//! Recursive evaluation of every string leaf in a value.

use std::sync::Arc;

use crate::context::{ContextOverlay, EvaluationContext};
use crate::evaluator::Evaluator;
use crate::value::{Mapping, Value};
use crate::{Error, Result};

/// Limit on nested re-expansions, where an evaluator result is itself
/// traced again. Descending into sequences and mappings does not count.
pub const MAX_TRACE_DEPTH: usize = 64;

/// Walks a value and resolves each string leaf through an [`Evaluator`].
///
/// Sequences keep their order and mappings keep their keys. A string that
/// evaluates to a non-string value is traced again, so a reference to a
/// structure of templates is fully resolved.
#[derive(Clone)]
pub struct Tracer {
    evaluator: Arc<dyn Evaluator>,
    base: EvaluationContext,
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer").field("base", &self.base).finish_non_exhaustive()
    }
}

impl Tracer {
    pub fn new(evaluator: Arc<dyn Evaluator>, base: EvaluationContext) -> Self {
        Self { evaluator, base }
    }

    /// Same evaluator over a different base context.
    pub fn with_base(&self, base: EvaluationContext) -> Self {
        Self {
            evaluator: Arc::clone(&self.evaluator),
            base,
        }
    }

    /// Traces `value` against the base context specialised by `overlay`.
    ///
    /// Fails on the first evaluator error; no partial result is returned.
    pub fn trace(&self, value: &Value, overlay: &ContextOverlay) -> Result<Value> {
        let ctx = self.base.overlay(overlay);
        self.trace_at(value, &ctx, 0)
    }

    /// Traces each value of a mapping, keeping its keys and order.
    pub fn trace_mapping(&self, map: &Mapping, overlay: &ContextOverlay) -> Result<Mapping> {
        let ctx = self.base.overlay(overlay);
        map.iter()
            .map(|(k, v)| Ok((k.clone(), self.trace_at(v, &ctx, 0)?)))
            .collect()
    }

    fn trace_at(&self, value: &Value, ctx: &EvaluationContext, depth: usize) -> Result<Value> {
        if depth > MAX_TRACE_DEPTH {
            return Err(Error::CycleDetected(format!(
                "template expansion nested deeper than {MAX_TRACE_DEPTH} levels"
            )));
        }

        match value {
            Value::String(template) => match self.evaluator.eval(template, ctx)? {
                Value::String(s) => Ok(Value::String(s)),
                other => self.trace_at(&other, ctx, depth + 1),
            },
            Value::Array(items) => items
                .iter()
                .map(|item| self.trace_at(item, ctx, depth))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), self.trace_at(v, ctx, depth)?)))
                .collect::<Result<Mapping>>()
                .map(Value::Object),
            Value::Null | Value::Bool(_) | Value::Number(_) => Ok(value.clone()),
        }
    }
}
