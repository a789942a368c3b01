//! Expression evaluation against request bindings

use super::parser::{Builtin, Expr};
use crate::error::EvaluationError;
use crate::facts::{Binding, Facts};
use kith_core::UserName;
use kith_social::{connected, FriendshipGraph};

#[derive(Debug, Clone, PartialEq)]
enum Value<'a> {
    Bool(bool),
    Text(&'a str),
    List(Vec<&'a str>),
    Graph(&'a FriendshipGraph),
}

impl Value<'_> {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Graph(_) => "graph",
        }
    }
}

fn type_error(expected: &str, found: &Value<'_>, context: &str) -> EvaluationError {
    EvaluationError::engine(format!(
        "{context} expects {expected}, found {}",
        found.type_name()
    ))
}

/// Evaluate `expr`; the result must be a boolean.
pub(crate) fn evaluate(expr: &Expr, facts: &Facts) -> Result<bool, EvaluationError> {
    boolean(expr, facts, "policy expression")
}

fn boolean(expr: &Expr, facts: &Facts, context: &str) -> Result<bool, EvaluationError> {
    match value(expr, facts)? {
        Value::Bool(b) => Ok(b),
        other => Err(type_error("bool", &other, context)),
    }
}

fn text<'a>(expr: &'a Expr, facts: &'a Facts, context: &str) -> Result<&'a str, EvaluationError> {
    match value(expr, facts)? {
        Value::Text(t) => Ok(t),
        other => Err(type_error("text", &other, context)),
    }
}

fn graph<'a>(
    expr: &'a Expr,
    facts: &'a Facts,
    context: &str,
) -> Result<&'a FriendshipGraph, EvaluationError> {
    match value(expr, facts)? {
        Value::Graph(g) => Ok(g),
        other => Err(type_error("graph", &other, context)),
    }
}

fn value<'a>(expr: &'a Expr, facts: &'a Facts) -> Result<Value<'a>, EvaluationError> {
    match expr {
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Text(t) => Ok(Value::Text(t.as_str())),
        Expr::Binding(name) => Ok(match facts.get(name)? {
            Binding::Text(t) => Value::Text(t.as_str()),
            Binding::Graph(g) => Value::Graph(g),
        }),
        Expr::Not(inner) => Ok(Value::Bool(!boolean(inner, facts, "`!`")?)),
        Expr::All(parts) => {
            for part in parts {
                if !boolean(part, facts, "`&&`")? {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        }
        Expr::Any(options) => {
            for option in options {
                if boolean(option, facts, "`||`")? {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        Expr::Eq(left, right) => equal(left, right, facts, "`==`").map(Value::Bool),
        Expr::Ne(left, right) => equal(left, right, facts, "`!=`").map(|eq| Value::Bool(!eq)),
        Expr::Call(builtin, args) => call(*builtin, args, facts),
    }
}

fn equal(left: &Expr, right: &Expr, facts: &Facts, context: &str) -> Result<bool, EvaluationError> {
    match (value(left, facts)?, value(right, facts)?) {
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (Value::Text(a), Value::Text(b)) => Ok(a == b),
        (Value::List(a), Value::List(b)) => Ok(a == b),
        (a, b) => Err(EvaluationError::engine(format!(
            "{context} cannot compare {} with {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn call<'a>(
    builtin: Builtin,
    args: &'a [Expr],
    facts: &'a Facts,
) -> Result<Value<'a>, EvaluationError> {
    let context = builtin.name();
    match (builtin, args) {
        (Builtin::Reachable, [g, a, b]) => {
            let g = graph(g, facts, context)?;
            let a = UserName::from(text(a, facts, context)?);
            let b = UserName::from(text(b, facts, context)?);
            Ok(Value::Bool(connected(&a, &b, g)))
        }
        (Builtin::Declares, [g, a, b]) => {
            let g = graph(g, facts, context)?;
            let a = UserName::from(text(a, facts, context)?);
            let b = UserName::from(text(b, facts, context)?);
            Ok(Value::Bool(g.declares(&a, &b)))
        }
        (Builtin::FriendsOf, [g, a]) => {
            let g = graph(g, facts, context)?;
            let a = UserName::from(text(a, facts, context)?);
            Ok(Value::List(g.neighbors(&a).map(UserName::as_str).collect()))
        }
        (Builtin::Contains, [list, x]) => match value(list, facts)? {
            Value::List(items) => {
                let x = text(x, facts, context)?;
                Ok(Value::Bool(items.contains(&x)))
            }
            other => Err(type_error("list", &other, context)),
        },
        _ => Err(EvaluationError::engine(format!(
            "`{context}` called with {} arguments",
            args.len()
        ))),
    }
}
