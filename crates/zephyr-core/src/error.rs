//! Error handling for behavior code generation and project export
//!
//! This module provides the error types for both stages of the
//! toolchain, plus the diagnostic types used for fail-soft code
//! generation outcomes.

use std::fmt;
use thiserror::Error;

/// Result type used throughout the Zephyr toolchain
pub type ZephyrResult<T> = Result<T, ZephyrError>;

/// Main error type for Zephyr operations
#[derive(Error, Debug)]
pub enum ZephyrError {
    /// Project model errors (invalid descriptors, broken invariants)
    #[error("Project error: {message}")]
    Project {
        message: String,
        behavior_name: Option<String>,
    },

    /// Code generation errors
    #[error("Code generation error: {message}")]
    Generation {
        message: String,
        context: Option<String>,
    },

    /// Export pipeline errors
    #[error("Export error: {message}")]
    Export {
        message: String,
        target: Option<String>,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("Error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl ZephyrError {
    /// Create a new project model error
    pub fn project<S: Into<String>>(message: S) -> Self {
        Self::Project {
            message: message.into(),
            behavior_name: None,
        }
    }

    /// Create a project model error tied to a behavior
    pub fn project_in_behavior<S: Into<String>, B: Into<String>>(message: S, behavior: B) -> Self {
        Self::Project {
            message: message.into(),
            behavior_name: Some(behavior.into()),
        }
    }

    /// Create a new code generation error
    pub fn generation<S: Into<String>>(message: S) -> Self {
        Self::Generation {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new export error
    pub fn export<S: Into<String>>(message: S) -> Self {
        Self::Export {
            message: message.into(),
            target: None,
        }
    }

    /// Create an export error tied to a deployment target
    pub fn export_for_target<S: Into<String>, T: Into<String>>(message: S, target: T) -> Self {
        Self::Export {
            message: message.into(),
            target: Some(target.into()),
        }
    }
}

/// Severity of a code generation diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

/// A single fail-soft code generation diagnostic.
///
/// Degraded-but-continues conditions (an unrecognized property type, a
/// missing method name mapping) are reported here instead of aborting
/// the batch, so tooling can assert on them without scanning the
/// generated text for sentinel substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    /// Behavior the diagnostic was produced for, if any
    pub behavior: Option<String>,
    /// Property or method the diagnostic refers to, if any
    pub item: Option<String>,
}

impl Diagnostic {
    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            message: message.into(),
            behavior: None,
            item: None,
        }
    }

    pub fn warning<S: Into<String>>(message: S) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            message: message.into(),
            behavior: None,
            item: None,
        }
    }

    pub fn info<S: Into<String>>(message: S) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            message: message.into(),
            behavior: None,
            item: None,
        }
    }

    /// Attach the behavior name the diagnostic belongs to
    pub fn for_behavior<S: Into<String>>(mut self, behavior: S) -> Self {
        self.behavior = Some(behavior.into());
        self
    }

    /// Attach the property or method name the diagnostic refers to
    pub fn for_item<S: Into<String>>(mut self, item: S) -> Self {
        self.item = Some(item.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            DiagnosticLevel::Error => "error",
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Info => "info",
        };
        write!(f, "{}: {}", level, self.message)?;
        if let Some(behavior) = &self.behavior {
            write!(f, " (behavior '{}'", behavior)?;
            if let Some(item) = &self.item {
                write!(f, ", '{}'", item)?;
            }
            write!(f, ")")?;
        } else if let Some(item) = &self.item {
            write!(f, " ('{}')", item)?;
        }
        Ok(())
    }
}

/// Accumulates diagnostics across a code generation run
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.level == DiagnosticLevel::Warning)
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display_includes_behavior_and_item() {
        let diagnostic = Diagnostic::warning("missing mapping")
            .for_behavior("Health")
            .for_item("onDestroy");
        let rendered = diagnostic.to_string();
        assert!(rendered.contains("warning: missing mapping"));
        assert!(rendered.contains("Health"));
        assert!(rendered.contains("onDestroy"));
    }

    #[test]
    fn collector_tracks_error_presence() {
        let mut collector = DiagnosticCollector::new();
        collector.add(Diagnostic::warning("degraded"));
        assert!(collector.has_warnings());
        assert!(!collector.has_errors());

        collector.add(Diagnostic::error("fatal"));
        assert!(collector.has_errors());
    }
}
