//! Statements, blocks and their indentation-aware rendering.
//!
//! Indentation is carried as a string prefix. Each render call receives the
//! prefix for its own position and extends it by exactly one [`INDENT_UNIT`]
//! for any body it renders.

use crate::expr::{Expression, Variable};

/// One level of indentation in generated scripts.
pub const INDENT_UNIT: &str = "    ";

fn deeper(indent: &str) -> String {
    format!("{}{}", indent, INDENT_UNIT)
}

/// A statement in a script or block body.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assignment { target: Variable, value: Expression },
    Expression(Expression),
    Conditional(Conditional),
}

impl Statement {
    pub fn assign(target: Variable, value: impl Into<Expression>) -> Self {
        Statement::Assignment { target, value: value.into() }
    }

    /// Renders the statement, prefixed by `indent`, without a trailing newline.
    pub fn render(&self, indent: &str) -> String {
        match self {
            Statement::Assignment { target, value } => {
                format!("{}{} = {}", indent, target.name(), value.render(indent))
            }
            Statement::Expression(e) => format!("{}{}", indent, e.render(indent)),
            Statement::Conditional(c) => c.render(indent),
        }
    }
}

impl From<Expression> for Statement {
    fn from(e: Expression) -> Self {
        Statement::Expression(e)
    }
}

impl From<Conditional> for Statement {
    fn from(c: Conditional) -> Self {
        Statement::Conditional(c)
    }
}

/// Straight-line statements, one per line, no trailing newline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpressionList {
    statements: Vec<Statement>,
}

impl ExpressionList {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn render(&self, indent: &str) -> String {
        self.statements
            .iter()
            .map(|s| s.render(indent))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `if <condition>:` with an optional `else:` branch.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    condition: Expression,
    then_branch: ExpressionList,
    else_branch: Option<ExpressionList>,
}

impl Conditional {
    pub fn new(
        condition: impl Into<Expression>,
        then_branch: ExpressionList,
        else_branch: Option<ExpressionList>,
    ) -> Self {
        Self {
            condition: condition.into(),
            then_branch,
            else_branch,
        }
    }

    pub fn condition(&self) -> &Expression {
        &self.condition
    }

    pub fn then_branch(&self) -> &ExpressionList {
        &self.then_branch
    }

    pub fn else_branch(&self) -> Option<&ExpressionList> {
        self.else_branch.as_ref()
    }

    pub fn render(&self, indent: &str) -> String {
        let body_indent = deeper(indent);
        let mut out = format!(
            "{}if {}:\n{}",
            indent,
            self.condition.render(indent),
            self.then_branch.render(&body_indent)
        );
        if let Some(otherwise) = &self.else_branch {
            out.push_str(&format!("\n{}else:\n{}", indent, otherwise.render(&body_indent)));
        }
        out
    }
}

/// The body of a callback-style argument, bound to a named input.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    bound: Variable,
    body: Vec<Statement>,
}

impl Block {
    pub fn new(bound: Variable, body: Vec<Statement>) -> Self {
        Self { bound, body }
    }

    pub fn bound(&self) -> &Variable {
        &self.bound
    }

    pub fn body(&self) -> &[Statement] {
        &self.body
    }

    /// Renders ` using |name|:` and the body one unit deeper than `indent`,
    /// each statement newline-terminated.
    pub fn render(&self, indent: &str) -> String {
        let body_indent = deeper(indent);
        let mut out = format!(" using |{}|:\n", self.bound.name());
        for statement in &self.body {
            out.push_str(&statement.render(&body_indent));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{less_than, FunctionCall, Keyword, Kwargs};

    fn var(name: &str) -> Variable {
        Variable::new(name)
    }

    fn kw(k: Keyword) -> Statement {
        Statement::Expression(k.into())
    }

    #[test]
    fn assignment_renders_with_indent() {
        let s = Statement::assign(var("sample"), FunctionCall::new("load_mocat_sample", "testing"));
        assert_eq!(s.render(""), "sample = load_mocat_sample(\"testing\")");
        assert_eq!(s.render("    "), "    sample = load_mocat_sample(\"testing\")");
    }

    #[test]
    fn expression_statement_indents_keyword() {
        let s = Statement::from(Expression::from(Keyword::Discard));
        assert_eq!(s.render("        "), "        discard");
    }

    #[test]
    fn expression_list_has_no_trailing_newline() {
        let list = ExpressionList::new(vec![
            Statement::assign(var("a"), 1),
            Statement::assign(var("b"), 2),
        ]);
        assert_eq!(list.render("  "), "  a = 1\n  b = 2");
        assert_eq!(ExpressionList::default().render(""), "");
    }

    #[test]
    fn conditional_without_else() {
        let c = Conditional::new(
            less_than(FunctionCall::new("len", var("r")), 50),
            ExpressionList::new(vec![kw(Keyword::Discard)]),
            None,
        );
        assert_eq!(c.render(""), "if len(r) < 50:\n    discard");
    }

    #[test]
    fn conditional_with_else() {
        let c = Conditional::new(
            var("ok"),
            ExpressionList::new(vec![Statement::assign(var("x"), 1)]),
            Some(ExpressionList::new(vec![kw(Keyword::Continue)])),
        );
        assert_eq!(c.render("    "), "    if ok:\n        x = 1\n    else:\n        continue");
        assert_eq!(c.condition().as_variable(), Some(&var("ok")));
        assert_eq!(c.then_branch().statements().len(), 1);
        assert!(c.else_branch().is_some_and(|e| !e.is_empty()));
    }

    #[test]
    fn block_renders_using_clause() {
        let block = Block::new(
            var("r"),
            vec![Statement::assign(
                var("r"),
                FunctionCall::new("substrim", var("r")).with_kwargs(Kwargs::new().with("min_quality", 25)),
            )],
        );
        assert_eq!(
            block.render(""),
            " using |r|:\n    r = substrim(r, min_quality=25)\n"
        );
        assert_eq!(block.bound(), &var("r"));
        assert_eq!(block.body().len(), 1);
    }

    #[test]
    fn conditional_inside_block_is_two_units_deep() {
        let cond = Conditional::new(
            less_than(FunctionCall::new("len", var("r")), 50),
            ExpressionList::new(vec![kw(Keyword::Discard)]),
            None,
        );
        let call = FunctionCall::new("preprocess", var("input"))
            .with_block(Block::new(var("r"), vec![cond.into()]));
        let out = Statement::from(Expression::from(call)).render("");
        assert_eq!(
            out,
            "preprocess(input) using |r|:\n    if len(r) < 50:\n        discard\n"
        );
    }
}
