use std::fmt;

/// Severity of a diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Progress,
    Warning,
}

/// A human-readable line produced during a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            DiagnosticLevel::Progress => f.write_str(&self.message),
            DiagnosticLevel::Warning => write!(f, "warning: {}", self.message),
        }
    }
}

/// Ordered diagnostics for one conversion run.
///
/// Progress lines are kept only in verbose mode; warnings are always kept.
/// Everything is mirrored to the `log` facade.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    verbose: bool,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            entries: Vec::new(),
        }
    }

    pub fn progress(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        if self.verbose {
            self.entries.push(Diagnostic {
                level: DiagnosticLevel::Progress,
                message,
            });
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.entries.push(Diagnostic {
            level: DiagnosticLevel::Warning,
            message,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warning)
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_dropped_when_not_verbose() {
        let mut diagnostics = Diagnostics::new(false);
        diagnostics.progress("Dereferencing OpenAPI schema...");
        diagnostics.warn("no base URL");
        assert_eq!(diagnostics.entries().len(), 1);
        assert!(diagnostics.has_warnings());
    }

    #[test]
    fn test_order_is_preserved_when_verbose() {
        let mut diagnostics = Diagnostics::new(true);
        diagnostics.progress("one");
        diagnostics.warn("two");
        diagnostics.progress("three");
        let lines: Vec<String> = diagnostics.entries().iter().map(|d| d.to_string()).collect();
        assert_eq!(lines, vec!["one", "warning: two", "three"]);
    }
}
