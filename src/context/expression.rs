//! Expression evaluation over the request context.
//!
//! An expression is either a quoted literal (`'text'` or `"text"`) or a
//! dotted reference path into the context tree, with optional array
//! indexes: `args.auth.id`, `args.auth.roles[0]`, `args.url`.
//!
//! Evaluation is strict: a missing key or a step through a non-container
//! is an error. Call sites that want best-effort behaviour (header
//! templates) fall back explicitly.

use serde_json::Value;
use thiserror::Error;

/// Errors produced while parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    /// The expression text is not a literal or a well-formed path.
    #[error("invalid expression `{0}`")]
    Invalid(String),

    /// A key or index along the path does not exist.
    #[error("`{path}` not found in request context")]
    NotFound { path: String },

    /// A path step expected a container of another kind.
    #[error("`{path}` is {found}, expected {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// One step of a reference path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Key(String),
    Index(usize),
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Literal(String),
    Path(Vec<Step>),
}

impl Expression {
    /// Parse expression text.
    pub fn parse(raw: &str) -> Result<Self, ExpressionError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(ExpressionError::Invalid(raw.to_string()));
        }

        for quote in ['\'', '"'] {
            if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
                return Ok(Expression::Literal(text[1..text.len() - 1].to_string()));
            }
        }

        let mut steps = Vec::new();
        for segment in text.split('.') {
            parse_segment(segment, &mut steps).ok_or_else(|| ExpressionError::Invalid(raw.to_string()))?;
        }
        Ok(Expression::Path(steps))
    }

    /// Evaluate against a context tree.
    pub fn evaluate(&self, state: &Value) -> Result<Value, ExpressionError> {
        let steps = match self {
            Expression::Literal(text) => return Ok(Value::String(text.clone())),
            Expression::Path(steps) => steps,
        };

        let mut current = state;
        let mut walked = String::new();
        for step in steps {
            match step {
                Step::Key(key) => {
                    if !walked.is_empty() {
                        walked.push('.');
                    }
                    walked.push_str(key);
                    current = match current {
                        Value::Object(map) => map
                            .get(key)
                            .ok_or_else(|| ExpressionError::NotFound { path: walked.clone() })?,
                        other => {
                            return Err(ExpressionError::TypeMismatch {
                                path: walked,
                                expected: "an object",
                                found: kind(other),
                            })
                        }
                    };
                }
                Step::Index(index) => {
                    walked.push_str(&format!("[{}]", index));
                    current = match current {
                        Value::Array(items) => items
                            .get(*index)
                            .ok_or_else(|| ExpressionError::NotFound { path: walked.clone() })?,
                        other => {
                            return Err(ExpressionError::TypeMismatch {
                                path: walked,
                                expected: "an array",
                                found: kind(other),
                            })
                        }
                    };
                }
            }
        }
        Ok(current.clone())
    }
}

/// Parse `name` or `name[0][1]` into steps. Returns `None` when malformed.
fn parse_segment(segment: &str, steps: &mut Vec<Step>) -> Option<()> {
    let (name, mut rest) = match segment.find('[') {
        Some(pos) => segment.split_at(pos),
        None => (segment, ""),
    };
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == ']') {
        return None;
    }
    steps.push(Step::Key(name.to_string()));

    while !rest.is_empty() {
        let close = rest.find(']')?;
        let index = rest.strip_prefix('[')?[..close - 1].parse().ok()?;
        steps.push(Step::Index(index));
        rest = &rest[close + 1..];
    }
    Some(())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> Value {
        json!({
            "args": {
                "auth": { "id": "user-1", "roles": ["admin", "ops"], "level": 3 },
                "token": "abc",
                "url": "/orders?page=2"
            }
        })
    }

    #[test]
    fn test_resolves_paths() {
        let state = state();
        let eval = |raw: &str| Expression::parse(raw).unwrap().evaluate(&state);

        assert_eq!(eval("args.auth.id").unwrap(), json!("user-1"));
        assert_eq!(eval("args.auth.roles[1]").unwrap(), json!("ops"));
        assert_eq!(eval("args.auth.level").unwrap(), json!(3));
        assert_eq!(eval("args.auth").unwrap()["id"], json!("user-1"));
    }

    #[test]
    fn test_literals() {
        let expr = Expression::parse("'static-value'").unwrap();
        assert_eq!(expr.evaluate(&state()).unwrap(), json!("static-value"));
    }

    #[test]
    fn test_missing_key() {
        let err = Expression::parse("args.auth.email").unwrap().evaluate(&state()).unwrap_err();
        assert_eq!(err, ExpressionError::NotFound { path: "args.auth.email".into() });

        let err = Expression::parse("application/json").unwrap().evaluate(&state()).unwrap_err();
        assert!(matches!(err, ExpressionError::NotFound { .. }));
    }

    #[test]
    fn test_type_mismatch() {
        let err = Expression::parse("args.token.value").unwrap().evaluate(&state()).unwrap_err();
        assert!(matches!(err, ExpressionError::TypeMismatch { found: "a string", .. }));

        let err = Expression::parse("args.auth[0]").unwrap().evaluate(&state()).unwrap_err();
        assert!(matches!(err, ExpressionError::TypeMismatch { expected: "an array", .. }));
    }

    #[test]
    fn test_invalid_syntax() {
        assert!(Expression::parse("").is_err());
        assert!(Expression::parse("args..token").is_err());
        assert!(Expression::parse("args.roles[x]").is_err());
        assert!(Expression::parse("Bearer token").is_err());
    }
}
