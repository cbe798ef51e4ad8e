//! Findings from checking a detection file.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Everything wrong with one detection file, in record order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// True when ingestion would accept every record.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// True when there is nothing to report, warnings included.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues raised for the record at `index`.
    pub fn issues_for(&self, index: usize) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(move |i| i.context == IssueContext::Detection { index })
    }

    /// Number of issues per code.
    pub fn counts_by_code(&self) -> BTreeMap<IssueCode, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.code).or_insert(0) += 1;
        }
        counts
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return writeln!(f, "Validation passed: no issues found");
        }

        writeln!(
            f,
            "Validation completed with {} error(s) and {} warning(s):",
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        let counts = self.counts_by_code();
        if counts.len() > 1 {
            writeln!(f)?;
            writeln!(f, "By code:")?;
            for (code, count) in counts {
                writeln!(f, "  {:<20} {:>6}", format!("{:?}", code), count)?;
            }
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: IssueCode,
    pub message: String,
    pub context: IssueContext,
}

impl ValidationIssue {
    pub fn error(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            context,
        }
    }

    pub fn warning(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            context,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(f, "[{}] {:?} in {}: {}", tag, self.code, self.context, self.message)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Accepted by ingestion but likely to behave oddly, such as a box that
    /// can never suppress anything.
    Warning,
    /// Rejected by ingestion.
    Error,
}

/// Stable identifier for each kind of finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum IssueCode {
    /// NaN or infinite coordinate.
    BoxNotFinite,
    /// `x1 > x2` or `y1 > y2`.
    InvalidBoxOrdering,
    /// Zero width or height.
    DegenerateBox,
    /// Box reaches past the image edges.
    BoxOutOfBounds,
    /// Score outside `[0, 1]` or NaN.
    ScoreOutOfRange,
    EmptyLabel,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IssueContext {
    /// Position of the record in the input file.
    Detection { index: usize },
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::Detection { index } => write!(f, "detection {}", index),
        }
    }
}
