//! The top-level script: version, imports, statements and serialization.
//!
//! # Example
//!
//! ```
//! use nglscript_core::expr::Kwargs;
//! use nglscript_core::script::Script;
//!
//! let mut script = Script::new("0.8");
//! script.import("mocat", "0.0");
//! script.build(|env| {
//!     let sample = env.call("load_mocat_sample", "testing", Kwargs::new());
//!     let sample = env.set("sample", sample)?;
//!     env.call("write", &sample, Kwargs::new().with("ofile", "ofile.sam"));
//!     Ok(())
//! })?;
//!
//! assert_eq!(
//!     script.render(),
//!     "ngless \"0.8\"\nimport \"mocat\" version \"0.0\"\n\nsample = load_mocat_sample(\"testing\")\nwrite(sample, ofile=\"ofile.sam\")\n"
//! );
//! # Ok::<(), nglscript_core::error::DslError>(())
//! ```

use std::fmt;

use crate::env::{next_variable, Env, Lookup};
use crate::error::DslError;
use crate::expr::Variable;
use crate::stmt::Statement;

/// Keyword opening the version header line.
pub const HEADER_KEYWORD: &str = "ngless";

/// A module import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub name: String,
    pub version: String,
}

/// One generated NGLess program.
#[derive(Debug, Clone, Default)]
pub struct Script {
    version: String,
    imports: Vec<Import>,
    statements: Vec<Statement>,
    next_variable: usize,
}

impl Script {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Declares `import "<name>" version "<version>"`.
    ///
    /// Duplicates are kept, in declaration order.
    pub fn import(&mut self, name: impl Into<String>, version: impl Into<String>) -> &mut Self {
        self.imports.push(Import {
            name: name.into(),
            version: version.into(),
        });
        self
    }

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// A scope over the top-level statements that creates variables on
    /// first read.
    pub fn env(&mut self) -> Env<'_> {
        self.env_with(Lookup::Create)
    }

    /// A scope over the top-level statements with an explicit lookup policy.
    pub fn env_with(&mut self, lookup: Lookup) -> Env<'_> {
        Env::new(&mut self.statements, &mut self.next_variable, lookup)
    }

    /// Runs `f` against [`Script::env`].
    pub fn build<F>(&mut self, f: F) -> Result<&mut Self, DslError>
    where
        F: FnOnce(&mut Env<'_>) -> Result<(), DslError>,
    {
        f(&mut self.env())?;
        Ok(self)
    }

    /// Creates a fresh `var_<n>` variable, unique within this script.
    pub fn generate_variable(&mut self) -> Variable {
        next_variable(&mut self.next_variable)
    }

    /// Serializes the script to NGLess source.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} \"{}\"", HEADER_KEYWORD, self.version)?;
        for import in &self.imports {
            writeln!(f, "import \"{}\" version \"{}\"", import.name, import.version)?;
        }
        writeln!(f)?;
        for statement in &self.statements {
            writeln!(f, "{}", statement.render(""))?;
        }
        Ok(())
    }
}
