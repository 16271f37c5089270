//! # nglscript-core
//!
//! Build NGLess pipeline scripts in Rust and serialize them to the exact text
//! `ngless` expects.
//!
//! Scripts are assembled in memory as an AST of expressions and statements,
//! through scopes that turn variable reads and writes into AST operations.
//! Nothing is parsed or executed by the builder itself; running a finished
//! script is left to [`runner`].
//!
//! ## Modules
//!
//! - [`value`] - Literal values and their NGLess encoding
//! - [`expr`] - Expression nodes: variables, literals, calls, operators
//! - [`stmt`] - Statements, conditionals, `using` blocks and indentation
//! - [`env`] - Scopes that record assignments into a statement sink
//! - [`script`] - The top-level script and its serialization
//! - [`runner`] - Runs a script with the external `ngless` binary
//! - [`install`] - Downloads `ngless` on demand
//! - [`config`] - Persistent settings in `~/.nglscript/config.json`
//! - [`error`] - Errors raised while building scripts
//!
//! ## Example
//!
//! ```
//! use nglscript_core::env::PreprocessOptions;
//! use nglscript_core::expr::{less_than, Keyword, Kwargs};
//! use nglscript_core::script::Script;
//!
//! let mut script = Script::new("0.8");
//! script.build(|env| {
//!     let reads = env.call("fastq", "reads.fq", Kwargs::new());
//!     let input = env.set("input", reads)?;
//!     env.preprocess(&input, PreprocessOptions::using("r"), |bk| {
//!         let r = bk.get("r")?;
//!         let len = bk.call("len", &r, Kwargs::new());
//!         bk.if_(less_than(len, 50), |then| {
//!             then.push(Keyword::Discard);
//!             Ok(())
//!         })
//!     })?;
//!     env.call("write", &input, Kwargs::new().with("ofile", "out.fq"));
//!     Ok(())
//! })?;
//!
//! println!("{}", script);
//! # Ok::<(), nglscript_core::error::DslError>(())
//! ```

pub mod config;
pub mod env;
pub mod error;
pub mod expr;
pub mod install;
pub mod runner;
pub mod script;
pub mod stmt;
pub mod value;
