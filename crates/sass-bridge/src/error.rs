//! Error types for compile jobs.
//!
//! Copyright (c) 2025 Posit, PBC

use sass_bridge_runtime::RuntimeError;
use sass_bridge_values::ValueError;
use thiserror::Error;

/// A parse or evaluation failure positioned in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
    /// Path of the file being compiled, or `stdin` for inline data
    pub file: String,
    /// 1-based
    pub line: usize,
    /// 1-based
    pub column: usize,
}

impl CompileError {
    pub fn new(
        message: impl Into<String>,
        file: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        CompileError {
            message: message.into(),
            file: file.into(),
            line,
            column,
        }
    }

    /// Message followed by its location, in the layout compilers print on
    /// the command line.
    pub fn formatted(&self) -> String {
        format!(
            "Error: {}\n        on line {}:{} of {}",
            self.message, self.line, self.column, self.file
        )
    }
}

/// Errors that can end a compile job
#[derive(Debug, Error)]
pub enum RenderError {
    /// Invalid options: missing or conflicting input, out-of-range formatting
    #[error("{0}")]
    Input(String),

    /// Value construction or mutation failed outside a callback
    #[error(transparent)]
    Value(#[from] ValueError),

    /// An importer signaled an error or returned a malformed result
    #[error("{message}")]
    Importer { message: String },

    /// A custom function failed or returned something other than a value
    #[error("error in function `{function}`: {message}")]
    Function { function: String, message: String },

    /// Parse or evaluation failure
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Reading inputs failed
    #[error(transparent)]
    System(#[from] RuntimeError),

    /// The source map could not be serialized
    #[error("source map serialization failed: {0}")]
    SourceMap(#[from] serde_json::Error),

    /// The worker running the job went away
    #[error("compile worker failed: {0}")]
    Worker(String),
}

impl RenderError {
    pub fn importer(message: impl Into<String>) -> Self {
        RenderError::Importer {
            message: message.into(),
        }
    }

    pub fn function(function: impl Into<String>, message: impl Into<String>) -> Self {
        RenderError::Function {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Process status reported for the failure: 3 for invalid input, 1 for
    /// everything else.
    pub fn status(&self) -> i32 {
        match self {
            RenderError::Input(_) => 3,
            _ => 1,
        }
    }

    /// Message plus location when one is known.
    pub fn formatted(&self) -> String {
        match self {
            RenderError::Compile(e) => e.formatted(),
            other => format!("Error: {}", other),
        }
    }

    /// Location of a compile error.
    pub fn location(&self) -> Option<(&str, usize, usize)> {
        match self {
            RenderError::Compile(e) => Some((e.file.as_str(), e.line, e.column)),
            _ => None,
        }
    }
}

pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(RenderError::Input("x".into()).status(), 3);
        assert_eq!(RenderError::importer("x").status(), 1);
        let compile = RenderError::from(CompileError::new("bad", "stdin", 1, 2));
        assert_eq!(compile.status(), 1);
        assert_eq!(compile.location(), Some(("stdin", 1, 2)));
    }

    #[test]
    fn test_messages() {
        let err = RenderError::function("foo", "A SassValue object was expected");
        assert_eq!(
            err.to_string(),
            "error in function `foo`: A SassValue object was expected"
        );
        let compile = CompileError::new("Undefined variable: \"$a\".", "/p/a.scss", 3, 7);
        assert_eq!(
            compile.formatted(),
            "Error: Undefined variable: \"$a\".\n        on line 3:7 of /p/a.scss"
        );
        let value =
            RenderError::from(ValueError::Construction("Cannot instantiate SassNull".into()));
        assert_eq!(value.to_string(), "Cannot instantiate SassNull");
    }
}
