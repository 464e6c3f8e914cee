//! Advisory validation of a project description.
//!
//! The renderer itself never validates: a malformed description renders to
//! a syntactically valid but semantically broken Makefile, and the error
//! surfaces when `make` runs it. These checks exist so the CLI can warn
//! before that happens.

use std::collections::HashSet;

use crate::description::ProjectDescription;

/// A problem found in a project description.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Human-readable description.
    pub message: String,
}

/// Check a project description for problems the generated Makefile would
/// only reveal at `make` time.
///
/// Returns `Ok(())` if clean, or `Err(issues)` with everything found.
pub fn validate(project: &ProjectDescription) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if project.target.is_empty() {
        issues.push(ValidationIssue {
            severity: "error",
            message: "target name is empty; the output binary would have no base name".into(),
        });
    }

    if project.ld_script.is_empty() {
        issues.push(ValidationIssue {
            severity: "error",
            message: "no linker script configured; the link step will fail".into(),
        });
    }

    if project.target_mcu.is_empty() {
        issues.push(ValidationIssue {
            severity: "warning",
            message: "target-mcu is empty; the erase rule's mass-erase command will be incomplete"
                .into(),
        });
    }

    // A source path in more than one language set would be compiled twice.
    let mut seen: HashSet<&str> = HashSet::new();
    for source in project
        .c_sources
        .iter()
        .chain(&project.cxx_sources)
        .chain(&project.asm_sources)
    {
        if !seen.insert(source.as_str()) {
            issues.push(ValidationIssue {
                severity: "error",
                message: format!("source file listed in more than one language set: {source}"),
            });
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
