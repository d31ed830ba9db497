//! # Checks, ledger & run report
//!
//! Every check outcome lands in a [`Ledger`] as an immutable [`CheckResult`].
//! The [`Recorder`] owns the ledger and echoes each result as it arrives;
//! [`RunReport`] is the summary derived from the ledger at the end of a run.
//! [`EndpointExpectation`] descriptors declare which fields a response must
//! carry.

pub mod expectation;
pub mod recorder;

use serde::{Serialize, Serializer};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub use expectation::{EndpointExpectation, FieldRequirement, FieldScope, ShapeViolation};
pub use recorder::{ConsoleSink, MemorySink, Recorder, ReportSink};

/// Outcome of one check invocation.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
    pub sample: Option<Value>,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl CheckResult {
    pub fn new(
        name: impl Into<String>,
        passed: bool,
        detail: impl Into<String>,
        sample: Option<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
            sample,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// The result as one line of JSON, for structured logs.
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!("unserializable result `{}`: {e}", self.name))
    }
}

fn serialize_rfc3339<S: Serializer>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    let formatted = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

/// Render an instant as RFC 3339, falling back to the unix timestamp.
pub fn format_instant(value: OffsetDateTime) -> String {
    value
        .format(&Rfc3339)
        .unwrap_or_else(|_| value.unix_timestamp().to_string())
}

/// Append-only log of results, in the order they were recorded.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    results: Vec<CheckResult>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: CheckResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|result| !result.passed)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&CheckResult> {
        self.results.iter().find(|result| result.name == name)
    }

    pub fn summarize(&self) -> RunReport {
        let total = self.results.len();
        let passed = self.results.iter().filter(|result| result.passed).count();
        RunReport {
            total,
            passed,
            failed: total - passed,
            failures: self
                .failures()
                .map(|result| (result.name.clone(), result.detail.clone()))
                .collect(),
        }
    }
}

/// Summary report for a run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// `(name, detail)` of each failed check, in ledger order.
    pub failures: Vec<(String, String)>,
}

impl RunReport {
    /// Percentage of passed checks, or `None` for an empty run.
    pub fn success_rate(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.passed as f64 / self.total as f64 * 100.0)
    }

    /// Success rate with one decimal place, e.g. `83.3%`.
    pub fn success_rate_label(&self) -> String {
        match self.success_rate() {
            Some(rate) => format!("{rate:.1}%"),
            None => "n/a".to_string(),
        }
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![
            "📋 TEST SUMMARY".to_string(),
            format!("Total Tests: {}", self.total),
            format!("✅ Passed: {}", self.passed),
            format!("❌ Failed: {}", self.failed),
            format!("📈 Success Rate: {}", self.success_rate_label()),
        ];

        if !self.failures.is_empty() {
            lines.push(String::new());
            lines.push("🚨 FAILED TESTS:".to_string());
            for (name, detail) in &self.failures {
                lines.push(format!("  • {name}: {detail}"));
            }
        }

        lines
    }
}
