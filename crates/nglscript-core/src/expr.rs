//! Expression nodes of the NGLess AST.
//!
//! Every node is immutable once built and renders to a text fragment given the
//! indentation prefix of the statement it appears in. Only nodes that carry a
//! [`Block`] actually use the prefix.
//!
//! # Example
//!
//! ```
//! use nglscript_core::expr::{less_than, Expression, FunctionCall, Variable};
//!
//! let r = Variable::new("r");
//! let len = Expression::from(FunctionCall::new("len", &r));
//! assert_eq!(less_than(len, 50).render(""), "len(r) < 50");
//! ```

use std::fmt;

use crate::stmt::Block;
use crate::value::Value;

/// A reference to an NGLess variable. Identity is by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    name: String,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Reserved words usable as standalone statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Discard,
    Continue,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Discard => "discard",
            Keyword::Continue => "continue",
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Mul,
    Div,
    Sub,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Sub => "-",
        }
    }
}

/// Ordered keyword arguments.
///
/// Keys keep their first insertion position; inserting an existing key
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kwargs(Vec<(String, Value)>);

impl Kwargs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Kwargs::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Renders as `, k1=v1, k2=v2`, or nothing when empty.
    fn render(&self, indent: &str) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!(", {}={}", k, v.encode(indent)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Kwargs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut kwargs = Kwargs::new();
        for (k, v) in iter {
            kwargs.insert(k, v);
        }
        kwargs
    }
}

/// A call with one positional argument: `name(arg, k=v, ...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    name: String,
    arg: Box<Expression>,
    kwargs: Kwargs,
    block: Option<Block>,
}

impl FunctionCall {
    /// Raw strings and integers passed as `arg` become literals.
    pub fn new(name: impl Into<String>, arg: impl Into<Expression>) -> Self {
        Self {
            name: name.into(),
            arg: Box::new(arg.into()),
            kwargs: Kwargs::new(),
            block: None,
        }
    }

    pub fn with_kwargs(mut self, kwargs: Kwargs) -> Self {
        self.kwargs = kwargs;
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.block = Some(block);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arg(&self) -> &Expression {
        &self.arg
    }

    pub fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }

    pub fn block(&self) -> Option<&Block> {
        self.block.as_ref()
    }

    fn render(&self, indent: &str) -> String {
        let block = self.block.as_ref().map(|b| b.render(indent)).unwrap_or_default();
        format!(
            "{}({}{}){}",
            self.name,
            self.arg.render(indent),
            self.kwargs.render(indent),
            block
        )
    }
}

/// A call with two positional arguments: `name(first, second, k=v, ...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedCall {
    name: String,
    first: Box<Expression>,
    second: Box<Expression>,
    kwargs: Kwargs,
    block: Option<Block>,
}

impl PairedCall {
    pub fn new(
        name: impl Into<String>,
        first: impl Into<Expression>,
        second: impl Into<Expression>,
    ) -> Self {
        Self {
            name: name.into(),
            first: Box::new(first.into()),
            second: Box::new(second.into()),
            kwargs: Kwargs::new(),
            block: None,
        }
    }

    pub fn with_kwargs(mut self, kwargs: Kwargs) -> Self {
        self.kwargs = kwargs;
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.block = Some(block);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }

    fn render(&self, indent: &str) -> String {
        let block = self.block.as_ref().map(|b| b.render(indent)).unwrap_or_default();
        format!(
            "{}({}, {}{}){}",
            self.name,
            self.first.render(indent),
            self.second.render(indent),
            self.kwargs.render(indent),
            block
        )
    }
}

/// An NGLess expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Variable(Variable),
    Literal(Value),
    Keyword(Keyword),
    /// Operands are kept in construction order and rendered in that order.
    BinaryOp {
        op: BinOp,
        first: Box<Expression>,
        second: Box<Expression>,
    },
    Call(FunctionCall),
    Paired(PairedCall),
}

impl Expression {
    /// Renders this expression. `indent` is the prefix of the enclosing
    /// statement; the expression itself is never indented.
    pub fn render(&self, indent: &str) -> String {
        match self {
            Expression::Variable(v) => v.name().to_string(),
            Expression::Literal(value) => value.encode(indent),
            Expression::Keyword(k) => k.as_str().to_string(),
            Expression::BinaryOp { op, first, second } => format!(
                "{} {} {}",
                first.render(indent),
                op.symbol(),
                second.render(indent)
            ),
            Expression::Call(call) => call.render(indent),
            Expression::Paired(call) => call.render(indent),
        }
    }

    /// The variable this expression refers to, if it is a bare variable.
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Expression::Variable(v) => Some(v),
            _ => None,
        }
    }
}

/// Builds `first <op> second`.
pub fn binary(op: BinOp, first: impl Into<Expression>, second: impl Into<Expression>) -> Expression {
    Expression::BinaryOp {
        op,
        first: Box::new(first.into()),
        second: Box::new(second.into()),
    }
}

pub fn less_than(first: impl Into<Expression>, second: impl Into<Expression>) -> Expression {
    binary(BinOp::Lt, first, second)
}

pub fn less_equal(first: impl Into<Expression>, second: impl Into<Expression>) -> Expression {
    binary(BinOp::Le, first, second)
}

pub fn greater_than(first: impl Into<Expression>, second: impl Into<Expression>) -> Expression {
    binary(BinOp::Gt, first, second)
}

pub fn greater_equal(first: impl Into<Expression>, second: impl Into<Expression>) -> Expression {
    binary(BinOp::Ge, first, second)
}

pub fn plus(first: impl Into<Expression>, second: impl Into<Expression>) -> Expression {
    binary(BinOp::Add, first, second)
}

pub fn times(first: impl Into<Expression>, second: impl Into<Expression>) -> Expression {
    binary(BinOp::Mul, first, second)
}

pub fn divide(first: impl Into<Expression>, second: impl Into<Expression>) -> Expression {
    binary(BinOp::Div, first, second)
}

pub fn minus(first: impl Into<Expression>, second: impl Into<Expression>) -> Expression {
    binary(BinOp::Sub, first, second)
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        match value {
            Value::Expr(e) => *e,
            other => Expression::Literal(other),
        }
    }
}

impl From<Variable> for Expression {
    fn from(v: Variable) -> Self {
        Expression::Variable(v)
    }
}

impl From<&Variable> for Expression {
    fn from(v: &Variable) -> Self {
        Expression::Variable(v.clone())
    }
}

impl From<Keyword> for Expression {
    fn from(k: Keyword) -> Self {
        Expression::Keyword(k)
    }
}

impl From<FunctionCall> for Expression {
    fn from(call: FunctionCall) -> Self {
        Expression::Call(call)
    }
}

impl From<PairedCall> for Expression {
    fn from(call: PairedCall) -> Self {
        Expression::Paired(call)
    }
}

impl From<&str> for Expression {
    fn from(s: &str) -> Self {
        Expression::Literal(Value::from(s))
    }
}

impl From<String> for Expression {
    fn from(s: String) -> Self {
        Expression::Literal(Value::from(s))
    }
}

impl From<&String> for Expression {
    fn from(s: &String) -> Self {
        Expression::Literal(Value::from(s))
    }
}

impl From<bool> for Expression {
    fn from(b: bool) -> Self {
        Expression::Literal(Value::Bool(b))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Expression {
    fn from(items: Vec<T>) -> Self {
        Expression::Literal(Value::from(items))
    }
}

macro_rules! int_expression {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Expression {
                fn from(n: $t) -> Self {
                    Expression::Literal(Value::from(n))
                }
            }
        )*
    };
}

int_expression!(i32, i64, u8, u16, u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::Statement;

    #[test]
    fn variable_renders_unindented() {
        let v = Expression::from(Variable::new("sample"));
        assert_eq!(v.render("        "), "sample");
    }

    #[test]
    fn keyword_renders_bare() {
        assert_eq!(Expression::from(Keyword::Discard).render(""), "discard");
        assert_eq!(Expression::from(Keyword::Continue).render("    "), "continue");
    }

    #[test]
    fn call_wraps_raw_argument_as_literal() {
        let call = FunctionCall::new("load_mocat_sample", "testing");
        assert_eq!(*call.arg(), Expression::Literal(Value::from("testing")));
        assert_eq!(Expression::from(call).render(""), "load_mocat_sample(\"testing\")");

        let call = FunctionCall::new("f", 3);
        assert_eq!(Expression::from(call).render(""), "f(3)");
    }

    #[test]
    fn call_renders_kwargs_in_insertion_order() {
        let call = FunctionCall::new("count", Variable::new("mapped")).with_kwargs(
            Kwargs::new()
                .with("features", vec!["seqname"])
                .with("multiple", Value::symbol("dist1")),
        );
        assert_eq!(
            Expression::from(call).render(""),
            "count(mapped, features=[\"seqname\"], multiple={dist1})"
        );
    }

    #[test]
    fn kwargs_replace_in_place() {
        let kwargs = Kwargs::new().with("a", 1).with("b", 2).with("a", 3);
        let keys: Vec<&str> = kwargs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(kwargs.get("a"), Some(&Value::Int(3)));
        assert_eq!(kwargs.len(), 2);
    }

    #[test]
    fn kwargs_from_iterator() {
        let kwargs: Kwargs = vec![("keep_if", vec!["{mapped}"])].into_iter().collect();
        assert_eq!(kwargs.render(""), ", keep_if=[{mapped}]");
    }

    #[test]
    fn paired_renders_both_positionals() {
        let call = PairedCall::new("paired", "a.fq", "b.fq")
            .with_kwargs(Kwargs::new().with("singles", "c.fq"));
        assert_eq!(
            Expression::from(call).render(""),
            "paired(\"a.fq\", \"b.fq\", singles=\"c.fq\")"
        );
    }

    #[test]
    fn binary_ops_keep_construction_order() {
        let a = Variable::new("a");
        let b = Variable::new("b");
        assert_eq!(minus(&a, &b).render(""), "a - b");
        assert_eq!(minus(&b, &a).render(""), "b - a");
        assert_eq!(divide(&a, 2).render(""), "a / 2");
        assert_eq!(greater_equal(&a, &b).render(""), "a >= b");
        assert_eq!(less_equal(&a, &b).render(""), "a <= b");
        assert_eq!(greater_than(1, &b).render(""), "1 > b");
        assert_eq!(plus(&a, times(&b, 3)).render(""), "a + b * 3");
    }

    #[test]
    fn less_than_on_length() {
        let len = FunctionCall::new("len", Variable::new("r"));
        assert_eq!(less_than(len, 50).render(""), "len(r) < 50");
    }

    #[test]
    fn value_expr_unwraps_into_expression() {
        let v = Value::from(Variable::new("x"));
        assert_eq!(Expression::from(v), Expression::Variable(Variable::new("x")));
    }

    #[test]
    fn paired_block_renders_at_statement_indent() {
        let block = Block::new(
            Variable::new("r"),
            vec![Statement::Expression(Keyword::Discard.into())],
        );
        let call = PairedCall::new("paired", "a", "b").with_block(block);
        assert_eq!(call.name(), "paired");
        assert!(call.kwargs().is_empty());
        assert_eq!(
            format!("    {}", Expression::from(call).render("    ")),
            "    paired(\"a\", \"b\") using |r|:\n        discard\n"
        );
    }

    #[test]
    fn call_accessors_expose_parts() {
        let block = Block::new(
            Variable::new("mr"),
            vec![Statement::Expression(Keyword::Continue.into())],
        );
        let call = FunctionCall::new("select", Variable::new("mapped"))
            .with_kwargs(Kwargs::new().with("keep_if", vec![Value::symbol("mapped")]))
            .with_block(block);
        assert_eq!(call.name(), "select");
        assert_eq!(call.arg().as_variable(), Some(&Variable::new("mapped")));
        assert_eq!(call.kwargs().len(), 1);
        assert_eq!(call.block().map(|b| b.bound().name()), Some("mr"));
        assert!(FunctionCall::new("len", "x").block().is_none());
    }

    #[test]
    fn only_bare_variables_are_variables() {
        assert!(Expression::from(Variable::new("x")).as_variable().is_some());
        assert!(Expression::from(3).as_variable().is_none());
        assert!(less_than(Variable::new("x"), 3).as_variable().is_none());
    }
}
