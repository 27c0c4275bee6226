//! Non-fatal diagnostics raised while resolving filters.

use std::fmt;
use std::sync::Mutex;

use super::ast::FieldPath;

/// A non-fatal condition noticed during evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A leaf used an operator symbol the resolver does not know. The leaf
    /// matches every record.
    UnknownOperator {
        /// Path of the offending leaf.
        path: FieldPath,
        /// The unrecognized symbol.
        operator: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownOperator { path, operator } => write!(
                f,
                "unknown filter operator {operator:?} on {path}; the condition matches every record"
            ),
        }
    }
}

/// Receiver for diagnostics.
pub trait DiagnosticSink {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
    }
}

/// Keeps every diagnostic it receives.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the diagnostics received so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|d| d.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn len(&self) -> usize {
        self.diagnostics().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        let mut diagnostics = self
            .diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        diagnostics.push(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn emit(&self, diagnostic: Diagnostic) {
        (**self).emit(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_records_in_order() {
        let sink = CollectingSink::new();
        assert!(sink.is_empty());

        sink.emit(Diagnostic::UnknownOperator {
            path: FieldPath::from("a"),
            operator: "FOO".to_string(),
        });
        sink.emit(Diagnostic::UnknownOperator {
            path: FieldPath::from("b"),
            operator: "BAR".to_string(),
        });

        let diagnostics = sink.diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert!(matches!(
            &diagnostics[1],
            Diagnostic::UnknownOperator { operator, .. } if operator == "BAR"
        ));
    }

    #[test]
    fn test_diagnostic_display_names_operator_and_path() {
        let d = Diagnostic::UnknownOperator {
            path: FieldPath::from("status"),
            operator: "FOO".to_string(),
        };
        let msg = d.to_string();
        assert!(msg.contains("\"FOO\""));
        assert!(msg.contains("status"));
    }
}
