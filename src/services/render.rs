//! Result rendering: `AnalysisResult` to display model.
//!
//! Pure functions only. Rendering never fails: an urgency label the
//! renderer does not know maps to [`Severity::Unknown`].

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::diagnosis::AnalysisResult;

/// Leading "12. " style ordinal marker. `\d` is Unicode, so Bengali "১২. " matches too.
static ORDINAL_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("static regex"));

/// Visual severity class of the urgency banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
    Unknown,
}

impl Severity {
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "High" => Self::High,
            "Medium" => Self::Medium,
            "Low" => Self::Low,
            _ => Self::Unknown,
        }
    }

    /// Badge colors as shell class names (red / yellow / green / gray).
    #[must_use]
    pub fn badge_class(self) -> &'static str {
        match self {
            Self::High => "text-red-600 bg-red-100",
            Self::Medium => "text-yellow-600 bg-yellow-100",
            Self::Low => "text-green-600 bg-green-100",
            Self::Unknown => "text-gray-600 bg-gray-100",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemedyStep {
    /// 1-based position in display order.
    pub number: usize,
    pub text: String,
}

/// Render-ready diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisView {
    pub severity: Severity,
    pub badge_class: &'static str,
    pub urgency_label: String,
    /// Plain text; the shell must not interpret markup.
    pub problem_name: String,
    pub description: String,
    pub steps: Vec<RemedyStep>,
}

#[must_use]
pub fn render(result: &AnalysisResult) -> DiagnosisView {
    render_parts(result.urgency.as_str(), &result.problem_name, &result.description, &result.solution)
}

/// Render from raw fields; `urgency` may be any label.
#[must_use]
pub fn render_parts(urgency: &str, problem_name: &str, description: &str, solution: &str) -> DiagnosisView {
    let severity = Severity::from_label(urgency);
    DiagnosisView {
        severity,
        badge_class: severity.badge_class(),
        urgency_label: urgency.to_string(),
        problem_name: problem_name.to_string(),
        description: description.to_string(),
        steps: split_steps(solution)
            .into_iter()
            .enumerate()
            .map(|(i, text)| RemedyStep { number: i + 1, text })
            .collect(),
    }
}

/// Split free-text remedies into ordered steps.
///
/// Lines are trimmed, blank lines dropped, and leading ordinal markers
/// removed. Joining the output with `\n` and splitting again is a no-op.
#[must_use]
pub fn split_steps(solution: &str) -> Vec<String> {
    solution
        .lines()
        .map(|line| strip_ordinals(line.trim()))
        .filter(|step| !step.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drop every leading ordinal marker. A marker glued to another digit
/// ("3.5 kg") is a decimal, not an ordinal, and is kept.
fn strip_ordinals(mut line: &str) -> &str {
    while let Some(marker) = ORDINAL_PREFIX.find(line) {
        let rest = &line[marker.end()..];
        let glued = marker.as_str().ends_with('.');
        if glued && rest.starts_with(|c: char| c.is_numeric()) {
            break;
        }
        line = rest.trim_start();
    }
    line
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
