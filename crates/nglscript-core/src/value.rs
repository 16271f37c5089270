//! Literal values and their NGLess encoding.
//!
//! [`Value`] is everything that can appear as a function argument or keyword
//! argument value. Encoding never fails for a constructed `Value`; the only
//! fallible path is [`Value::try_from`] on loosely-typed JSON input.
//!
//! # Example
//!
//! ```
//! use nglscript_core::value::Value;
//!
//! assert_eq!(Value::from("hg19").encode(""), "\"hg19\"");
//! assert_eq!(Value::symbol("mapped").encode(""), "{mapped}");
//! assert_eq!(Value::from(vec!["{mapped}", "x"]).encode(""), "[{mapped}, \"x\"]");
//! ```

use crate::error::DslError;
use crate::expr::{Expression, Variable};

/// A value that can be encoded into NGLess syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A nested expression, rendered as-is.
    Expr(Box<Expression>),
    /// A string. Quoted unless it is a `{...}` placeholder.
    Text(String),
    /// A bare symbolic token, rendered as `{name}`.
    Symbol(String),
    Int(i64),
    Bool(bool),
    List(Vec<Value>),
}

impl Value {
    /// Builds a symbol. Surrounding braces are accepted and not doubled.
    pub fn symbol(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(inner) => Value::Symbol(inner.to_string()),
            None => Value::Symbol(name),
        }
    }

    /// Renders this value at the given indentation prefix.
    ///
    /// The indent only matters for nested expressions that carry a block.
    pub fn encode(&self, indent: &str) -> String {
        match self {
            Value::Expr(e) => e.render(indent),
            Value::Text(s) => {
                if is_placeholder(s) {
                    s.clone()
                } else {
                    // No escaping of embedded quotes.
                    format!("\"{}\"", s)
                }
            }
            Value::Symbol(s) => format!("{{{}}}", s),
            Value::Int(n) => n.to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.encode(indent)).collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }
}

fn is_placeholder(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('{') && s.ends_with('}')
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! int_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Int(n as i64)
                }
            }
        )*
    };
}

int_value!(i32, i64, u8, u16, u32, u64, usize);

impl From<Expression> for Value {
    fn from(e: Expression) -> Self {
        Value::Expr(Box::new(e))
    }
}

impl From<Variable> for Value {
    fn from(v: Variable) -> Self {
        Value::from(Expression::Variable(v))
    }
}

impl From<&Variable> for Value {
    fn from(v: &Variable) -> Self {
        Value::from(v.clone())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = DslError;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value as Json;

        match json {
            Json::String(s) => Ok(Value::Text(s)),
            Json::Bool(b) => Ok(Value::Bool(b)),
            Json::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .ok_or(DslError::UnsupportedValue { kind: "a non-integer number" }),
            Json::Array(items) => items
                .into_iter()
                .map(Value::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Json::Object(_) => Err(DslError::UnsupportedValue { kind: "a mapping" }),
            Json::Null => Err(DslError::UnsupportedValue { kind: "null" }),
        }
    }
}
