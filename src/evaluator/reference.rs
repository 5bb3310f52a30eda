//! A minimal `${path}` evaluator over an [`EvaluationContext`].
//!
//! Paths are dotted and start at one of `inputs`, `outputs`, `value`,
//! `properties`, `component` or `deployment`; numeric segments index into
//! sequences. Use `$$` to produce a literal `$`.

use std::iter::Peekable;
use std::str::Chars;

use super::{EvalError, Evaluator};
use crate::context::EvaluationContext;
use crate::value::{Mapping, Value};

/// Substitutes `${path}` references from the evaluation context.
///
/// A template consisting of exactly one reference evaluates to the
/// referenced value itself, which may be a sequence or mapping. Mixed
/// templates interpolate scalars into a string.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceEvaluator;

impl ReferenceEvaluator {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, PartialEq)]
enum Segment {
    Literal(String),
    Reference(String),
}

impl Evaluator for ReferenceEvaluator {
    fn eval(&self, template: &str, ctx: &EvaluationContext) -> Result<Value, EvalError> {
        let segments = parse(template)?;
        if let [Segment::Reference(path)] = segments.as_slice() {
            return lookup(ctx, path);
        }

        let mut out = String::with_capacity(template.len());
        for segment in segments {
            match segment {
                Segment::Literal(text) => out.push_str(&text),
                Segment::Reference(path) => render(&lookup(ctx, &path)?, &path, &mut out)?,
            }
        }
        Ok(Value::String(out))
    }
}

fn parse(template: &str) -> Result<Vec<Segment>, EvalError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            literal.push(ch);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                literal.push('$');
            }
            Some('{') => {
                chars.next();
                let path = consume_until(&mut chars, '}')
                    .ok_or_else(|| EvalError::UnclosedReference(template.to_string()))?;
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Reference(path));
            }
            _ => literal.push('$'),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn consume_until(chars: &mut Peekable<Chars>, delim: char) -> Option<String> {
    let mut result = String::new();
    for ch in chars.by_ref() {
        if ch == delim {
            return Some(result);
        }
        result.push(ch);
    }
    None
}

fn lookup(ctx: &EvaluationContext, path: &str) -> Result<Value, EvalError> {
    let parts: Vec<&str> = path.trim().split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(EvalError::InvalidReferencePath(path.to_string()));
    }
    let (root, rest) = match parts.split_first() {
        Some(split) => split,
        None => return Err(EvalError::InvalidReferencePath(path.to_string())),
    };

    let found = match *root {
        "inputs" => from_mapping(&ctx.inputs, rest),
        "outputs" => from_mapping(&ctx.outputs, rest),
        "properties" => from_mapping(&ctx.properties, rest),
        "value" => ctx.value.as_ref().and_then(|v| descend(v, rest)).cloned(),
        "deployment" => ctx
            .deployment_spec
            .as_ref()
            .and_then(|v| descend(v, rest))
            .cloned(),
        "component" if rest.is_empty() => ctx.component.clone().map(Value::String),
        "component" => None,
        _ => return Err(EvalError::InvalidReferencePath(path.to_string())),
    };

    found.ok_or_else(|| EvalError::ReferenceNotFound(path.to_string()))
}

fn from_mapping(map: &Mapping, rest: &[&str]) -> Option<Value> {
    match rest.split_first() {
        None => Some(Value::Object(map.clone())),
        Some((first, rest)) => map.get(*first).and_then(|v| descend(v, rest)).cloned(),
    }
}

fn descend<'a>(mut current: &'a Value, rest: &[&str]) -> Option<&'a Value> {
    for part in rest {
        current = match current {
            Value::Object(map) => map.get(*part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn render(value: &Value, path: &str, out: &mut String) -> Result<(), EvalError> {
    match value {
        Value::String(s) => out.push_str(s),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Null => {}
        Value::Array(_) | Value::Object(_) => {
            return Err(EvalError::NonScalarReference(path.to_string()))
        }
    }
    Ok(())
}
