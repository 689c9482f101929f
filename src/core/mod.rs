pub mod syntax;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// One flagged prompt anti-pattern, anchored to a source position.
///
/// Created by a rule on verdict failure, consumed once by a writer; never
/// mutated.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Finding {
    pub id: String,
    pub rule: RuleKind,
    pub priority: Priority,
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub context: Option<String>,
}

impl Finding {
    pub fn new(
        rule: RuleKind,
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    ) -> Self {
        Self {
            id: format!("{}-{}-{}", rule, file.display(), line),
            rule,
            priority: rule.priority(),
            file,
            line,
            column,
            message,
            context: None,
        }
    }

    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    HeadingFormat,
    SectionPlacement,
    SystemInjection,
    TokenBudget,
    MissingTermination,
    TemperatureRange,
}

impl RuleKind {
    pub const ALL: &'static [RuleKind] = &[
        RuleKind::HeadingFormat,
        RuleKind::SectionPlacement,
        RuleKind::SystemInjection,
        RuleKind::TokenBudget,
        RuleKind::MissingTermination,
        RuleKind::TemperatureRange,
    ];

    pub fn priority(self) -> Priority {
        match self {
            RuleKind::SystemInjection => Priority::High,
            RuleKind::TokenBudget | RuleKind::MissingTermination | RuleKind::TemperatureRange => {
                Priority::Medium
            }
            RuleKind::HeadingFormat | RuleKind::SectionPlacement => Priority::Low,
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        static DISPLAY_STRINGS: &[(RuleKind, &str)] = &[
            (RuleKind::HeadingFormat, "heading-format"),
            (RuleKind::SectionPlacement, "section-placement"),
            (RuleKind::SystemInjection, "system-injection"),
            (RuleKind::TokenBudget, "token-budget"),
            (RuleKind::MissingTermination, "missing-termination"),
            (RuleKind::TemperatureRange, "temperature-range"),
        ];

        let display_str = DISPLAY_STRINGS
            .iter()
            .find(|(r, _)| r == self)
            .map(|(_, s)| *s)
            .unwrap_or("unknown");

        write!(f, "{display_str}")
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        static DISPLAY_STRINGS: &[(Priority, &str)] = &[
            (Priority::Low, "Low"),
            (Priority::Medium, "Medium"),
            (Priority::High, "High"),
        ];

        let display_str = DISPLAY_STRINGS
            .iter()
            .find(|(p, _)| p == self)
            .map(|(_, s)| *s)
            .unwrap_or("Unknown");

        write!(f, "{display_str}")
    }
}

/// Findings for a single analyzed file.
#[derive(Clone, Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub findings: Vec<Finding>,
}

/// Aggregated findings for one analysis run.
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisResults {
    pub root: PathBuf,
    pub timestamp: DateTime<Utc>,
    pub files_analyzed: usize,
    pub findings: Vec<Finding>,
}

impl AnalysisResults {
    pub fn from_reports(root: PathBuf, reports: Vec<FileReport>) -> Self {
        let files_analyzed = reports.len();
        let mut findings: Vec<Finding> = reports.into_iter().flat_map(|r| r.findings).collect();
        findings.sort_by(|a, b| (&a.file, a.line, a.column).cmp(&(&b.file, b.line, b.column)));
        Self {
            root,
            timestamp: Utc::now(),
            files_analyzed,
            findings,
        }
    }

    pub fn count_by_rule(&self, rule: RuleKind) -> usize {
        self.findings.iter().filter(|f| f.rule == rule).count()
    }

    pub fn count_by_priority(&self, priority: Priority) -> usize {
        self.findings
            .iter()
            .filter(|f| f.priority == priority)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_id_is_stable() {
        let finding = Finding::new(
            RuleKind::TokenBudget,
            PathBuf::from("app/prompt.rb"),
            12,
            3,
            "too long".to_string(),
        );
        assert_eq!(finding.id, "token-budget-app/prompt.rb-12");
        assert_eq!(finding.priority, Priority::Medium);
    }

    #[test]
    fn results_sort_findings_by_position() {
        let a = Finding::new(
            RuleKind::HeadingFormat,
            PathBuf::from("b.rb"),
            5,
            1,
            "m".into(),
        );
        let b = Finding::new(
            RuleKind::SystemInjection,
            PathBuf::from("a.rb"),
            9,
            1,
            "m".into(),
        );
        let results = AnalysisResults::from_reports(
            PathBuf::from("."),
            vec![
                FileReport {
                    path: PathBuf::from("b.rb"),
                    findings: vec![a],
                },
                FileReport {
                    path: PathBuf::from("a.rb"),
                    findings: vec![b.clone()],
                },
            ],
        );
        assert_eq!(results.files_analyzed, 2);
        assert_eq!(results.findings[0], b);
        assert_eq!(results.count_by_priority(Priority::High), 1);
    }
}
