//! User-friendly diagnostic messages.
//!
//! Every pipeline failure is reported with the failing stage, the error
//! kind, and (for external tool failures) the tail of the captured output.

use std::fmt;

/// How many lines of tool output a failure report shows.
pub const OUTPUT_TAIL_LINES: usize = 20;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with optional context and tool output.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Captured tool output to show verbatim (already trimmed to a tail)
    pub tool_output: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            tool_output: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Warning,
            context: Vec::new(),
            tool_output: None,
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attach captured tool output.
    pub fn with_tool_output(mut self, output: impl Into<String>) -> Self {
        let output = output.into();
        if !output.trim().is_empty() {
            self.tool_output = Some(output);
        }
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut out = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
                Severity::Note => "\x1b[1;36mnote\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Note => "note",
            }
        };

        out.push_str(&format!("{}: {}\n", severity_str, self.message));

        for ctx in &self.context {
            out.push_str(&format!("  -> {}\n", ctx));
        }

        if let Some(ref output) = self.tool_output {
            out.push('\n');
            for line in output.lines() {
                out.push_str(&format!("  | {}\n", line));
            }
        }

        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("build stage failed: compile error")
            .with_context("command: cmake --build build")
            .with_tool_output("foo.c:3: error: unknown type\nmake: *** [foo.o] Error 1");

        let output = diag.format(false);
        assert!(output.contains("error: build stage failed"));
        assert!(output.contains("-> command: cmake --build build"));
        assert!(output.contains("  | foo.c:3: error: unknown type"));
        assert!(output.contains("  | make: *** [foo.o] Error 1"));
    }

    #[test]
    fn test_empty_tool_output_is_dropped() {
        let diag = Diagnostic::error("configure failed").with_tool_output("  \n");
        assert!(diag.tool_output.is_none());
    }
}
