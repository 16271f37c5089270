//! Scopes that turn variable reads and writes into AST operations.
//!
//! An [`Env`] is bound to exactly one statement sink: the top-level statement
//! list of a [`Script`](crate::script::Script), the body of a block under
//! construction, or a branch of a conditional. Writes always land in the sink
//! the `Env` is bound to.
//!
//! Nested bodies are built through child scopes handed to a callback. The
//! child owns a fresh statement list; the enclosing sink is not touched until
//! the callback has returned successfully, at which point the finished
//! statement is appended in one step. A failing callback therefore leaves the
//! enclosing sink exactly as it was.
//!
//! # Example
//!
//! ```
//! use nglscript_core::env::PreprocessOptions;
//! use nglscript_core::expr::Kwargs;
//! use nglscript_core::script::Script;
//!
//! let mut script = Script::new("0.8");
//! let mut env = script.env();
//! let reads = env.call("fastq", "reads.fq", Kwargs::new());
//! let input = env.set("input", reads)?;
//! env.preprocess(&input, PreprocessOptions::using("r"), |bk| {
//!     let r = bk.get("r")?;
//!     let trimmed = bk.call("substrim", &r, Kwargs::new().with("min_quality", 25));
//!     bk.set("r", trimmed)?;
//!     Ok(())
//! })?;
//! # Ok::<(), nglscript_core::error::DslError>(())
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::error::{check_identifier, DslError};
use crate::expr::{Expression, FunctionCall, Kwargs, PairedCall, Variable};
use crate::stmt::{Block, Conditional, ExpressionList, Statement};

/// Functions that run for their effect and are appended as statements as soon
/// as they are called.
pub const IMPURE_FUNCTIONS: &[&str] = &["write"];

/// Prefix of automatically generated variable names.
pub const AUTO_VARIABLE_PREFIX: &str = "var_";

/// Whether `name` may be used as an expression without being appended.
pub fn is_pure(name: &str) -> bool {
    !IMPURE_FUNCTIONS.contains(&name)
}

/// What [`Env::get`] does with a name it has not seen before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Create the variable on first read.
    Create,
    /// Fail with [`DslError::UnknownVariable`].
    Strict,
}

/// Options of the `preprocess` block call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreprocessOptions {
    pub keep_singles: bool,
    pub using: Option<String>,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            keep_singles: true,
            using: None,
        }
    }
}

impl PreprocessOptions {
    /// Options binding the block input to `name`.
    pub fn using(name: impl Into<String>) -> Self {
        Self {
            using: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn keep_singles(mut self, keep: bool) -> Self {
        self.keep_singles = keep;
        self
    }
}

/// A scope bound to one statement sink.
pub struct Env<'a> {
    sink: &'a mut Vec<Statement>,
    counter: &'a mut usize,
    vars: HashMap<String, Variable>,
    lookup: Lookup,
    depth: usize,
}

impl<'a> Env<'a> {
    pub(crate) fn new(sink: &'a mut Vec<Statement>, counter: &'a mut usize, lookup: Lookup) -> Self {
        Self {
            sink,
            counter,
            vars: HashMap::new(),
            lookup,
            depth: 0,
        }
    }

    /// Nesting depth of this scope; the top level is 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn lookup(&self) -> Lookup {
        self.lookup
    }

    /// Statements appended to this scope's sink so far.
    pub fn statements(&self) -> &[Statement] {
        &self.sink[..]
    }

    /// Returns the variable called `name`.
    ///
    /// Repeated reads of the same name return the same variable. Unknown
    /// names are created or rejected depending on the scope's [`Lookup`].
    pub fn get(&mut self, name: &str) -> Result<Variable, DslError> {
        if let Some(v) = self.vars.get(name) {
            return Ok(v.clone());
        }
        match self.lookup {
            Lookup::Create => self.declare(name),
            Lookup::Strict => Err(DslError::UnknownVariable { name: name.to_string() }),
        }
    }

    /// Appends `name = value` to this scope's sink.
    pub fn set(&mut self, name: &str, value: impl Into<Expression>) -> Result<Variable, DslError> {
        let target = match self.vars.get(name) {
            Some(v) => v.clone(),
            None => self.declare(name)?,
        };
        self.append(Statement::assign(target.clone(), value));
        Ok(target)
    }

    /// Appends an assignment to an already-built variable.
    ///
    /// The target's name is checked the same way [`Env::set`] checks names.
    pub fn assign(&mut self, target: &Variable, value: impl Into<Expression>) -> Result<(), DslError> {
        check_identifier(target.name())?;
        self.remember(target);
        self.append(Statement::assign(target.clone(), value));
        Ok(())
    }

    /// Appends a bare expression statement, e.g. a keyword.
    pub fn push(&mut self, expression: impl Into<Expression>) {
        self.append(Statement::Expression(expression.into()));
    }

    /// Creates a fresh variable named `var_<n>`.
    pub fn generate_variable(&mut self) -> Variable {
        let v = next_variable(&mut *self.counter);
        self.remember(&v);
        v
    }

    /// Builds `name(arg, kwargs...)`.
    ///
    /// Pure calls are only returned. Impure calls (see [`IMPURE_FUNCTIONS`])
    /// are also appended to the sink right away.
    pub fn call(&mut self, name: &str, arg: impl Into<Expression>, kwargs: Kwargs) -> Expression {
        let call = Expression::from(FunctionCall::new(name, arg).with_kwargs(kwargs));
        if !is_pure(name) {
            self.append(Statement::Expression(call.clone()));
        }
        call
    }

    /// Builds `paired(first, second, kwargs...)`.
    pub fn paired(
        &mut self,
        first: impl Into<Expression>,
        second: impl Into<Expression>,
        kwargs: Kwargs,
    ) -> Expression {
        PairedCall::new("paired", first, second).with_kwargs(kwargs).into()
    }

    /// Builds `name(first, second, kwargs...) using |bound|:` with a body
    /// filled by `body`. Pure, like [`Env::call_with_block`].
    pub fn paired_with_block<F>(
        &mut self,
        name: &str,
        first: impl Into<Expression>,
        second: impl Into<Expression>,
        kwargs: Kwargs,
        using: Option<&str>,
        body: F,
    ) -> Result<Expression, DslError>
    where
        F: FnOnce(&mut Env<'_>) -> Result<(), DslError>,
    {
        let block = self.open_block(name, using, body)?;
        Ok(PairedCall::new(name, first, second)
            .with_kwargs(kwargs)
            .with_block(block)
            .into())
    }

    /// Builds `name(arg, kwargs...) using |bound|:` with a body filled by `body`.
    ///
    /// The result is a pure expression; assign it or pass it on.
    pub fn call_with_block<F>(
        &mut self,
        name: &str,
        arg: impl Into<Expression>,
        kwargs: Kwargs,
        using: Option<&str>,
        body: F,
    ) -> Result<Expression, DslError>
    where
        F: FnOnce(&mut Env<'_>) -> Result<(), DslError>,
    {
        let block = self.open_block(name, using, body)?;
        Ok(FunctionCall::new(name, arg)
            .with_kwargs(kwargs)
            .with_block(block)
            .into())
    }

    /// Appends `input = preprocess(input, keep_singles=...) using |bound|:`.
    ///
    /// The reassignment onto `input` is implicit: preprocessing rebinds the
    /// variable it consumes.
    pub fn preprocess<F>(
        &mut self,
        input: &Variable,
        options: PreprocessOptions,
        body: F,
    ) -> Result<(), DslError>
    where
        F: FnOnce(&mut Env<'_>) -> Result<(), DslError>,
    {
        let block = self.open_block("preprocess", options.using.as_deref(), body)?;
        let call = FunctionCall::new("preprocess", input)
            .with_kwargs(Kwargs::new().with("keep_singles", options.keep_singles))
            .with_block(block);
        self.assign(input, call)
    }

    /// Appends `if condition:` with a body filled by `then`.
    pub fn if_<F>(&mut self, condition: impl Into<Expression>, then: F) -> Result<(), DslError>
    where
        F: FnOnce(&mut Env<'_>) -> Result<(), DslError>,
    {
        let then_branch = self.open_branch(then)?;
        self.append(Conditional::new(condition, then_branch, None).into());
        Ok(())
    }

    /// Appends `if condition:` / `else:` with bodies filled by the callbacks.
    pub fn if_else<F, G>(
        &mut self,
        condition: impl Into<Expression>,
        then: F,
        otherwise: G,
    ) -> Result<(), DslError>
    where
        F: FnOnce(&mut Env<'_>) -> Result<(), DslError>,
        G: FnOnce(&mut Env<'_>) -> Result<(), DslError>,
    {
        let then_branch = self.open_branch(then)?;
        let else_branch = self.open_branch(otherwise)?;
        self.append(Conditional::new(condition, then_branch, Some(else_branch)).into());
        Ok(())
    }

    fn declare(&mut self, name: &str) -> Result<Variable, DslError> {
        check_identifier(name)?;
        let v = Variable::new(name);
        self.vars.insert(name.to_string(), v.clone());
        Ok(v)
    }

    fn remember(&mut self, v: &Variable) {
        self.vars
            .entry(v.name().to_string())
            .or_insert_with(|| v.clone());
    }

    fn append(&mut self, statement: Statement) {
        debug!(depth = self.depth, position = self.sink.len(), "Appending statement");
        self.sink.push(statement);
    }

    /// Runs `body` against a strict child scope whose sink is a fresh list.
    ///
    /// The child sees this scope's variables plus the bound name. Names it
    /// defines stay local to the block.
    fn open_block<F>(&mut self, function: &str, using: Option<&str>, body: F) -> Result<Block, DslError>
    where
        F: FnOnce(&mut Env<'_>) -> Result<(), DslError>,
    {
        let bound_name = using.ok_or_else(|| DslError::MissingBinding {
            function: function.to_string(),
        })?;
        check_identifier(bound_name)?;
        let bound = Variable::new(bound_name);

        let mut vars = self.vars.clone();
        vars.insert(bound_name.to_string(), bound.clone());

        let mut statements = Vec::new();
        {
            let mut child = Env {
                sink: &mut statements,
                counter: &mut *self.counter,
                vars,
                lookup: Lookup::Strict,
                depth: self.depth + 1,
            };
            debug!(function, bound = bound_name, depth = child.depth, "Opening block scope");
            body(&mut child)?;
        }

        if statements.is_empty() {
            return Err(DslError::EmptyBody { construct: "block" });
        }
        Ok(Block::new(bound, statements))
    }

    /// Runs `body` against a child scope sharing this scope's namespace.
    ///
    /// Names defined in the branch become visible here afterwards.
    fn open_branch<F>(&mut self, body: F) -> Result<ExpressionList, DslError>
    where
        F: FnOnce(&mut Env<'_>) -> Result<(), DslError>,
    {
        let mut statements = Vec::new();
        let defined = {
            let mut child = Env {
                sink: &mut statements,
                counter: &mut *self.counter,
                vars: self.vars.clone(),
                lookup: self.lookup,
                depth: self.depth + 1,
            };
            body(&mut child)?;
            child.vars
        };

        if statements.is_empty() {
            return Err(DslError::EmptyBody { construct: "conditional branch" });
        }
        for (name, v) in defined {
            self.vars.entry(name).or_insert(v);
        }
        Ok(ExpressionList::new(statements))
    }
}

/// Allocates `var_<counter>` and advances the counter.
pub(crate) fn next_variable(counter: &mut usize) -> Variable {
    let v = Variable::new(format!("{}{}", AUTO_VARIABLE_PREFIX, *counter));
    *counter += 1;
    v
}
