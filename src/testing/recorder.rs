use serde_json::Value;
use std::sync::{Arc, Mutex};

use super::{CheckResult, Ledger, RunReport};

/// Destination for the human-readable report lines.
pub trait ReportSink: Send {
    fn emit(&mut self, line: &str);
}

/// Writes report lines to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn emit(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Keeps report lines in memory; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map_or_else(|_| Vec::new(), |lines| lines.clone())
    }
}

impl ReportSink for MemorySink {
    fn emit(&mut self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// Records check outcomes into a [`Ledger`] and echoes each one immediately.
pub struct Recorder {
    ledger: Ledger,
    sink: Box<dyn ReportSink>,
    strict: bool,
}

impl Recorder {
    pub fn new(sink: impl ReportSink + 'static) -> Self {
        Self {
            ledger: Ledger::new(),
            sink: Box::new(sink),
            strict: false,
        }
    }

    pub fn console() -> Self {
        Self::new(ConsoleSink)
    }

    /// In strict mode, observations count as assertions.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn record(
        &mut self,
        name: impl Into<String>,
        passed: bool,
        detail: impl Into<String>,
        sample: Option<Value>,
    ) {
        let result = CheckResult::new(name, passed, detail, sample);

        if result.passed {
            tracing::debug!(
                check = %result.name,
                record = %result.to_json_line(),
                "check passed"
            );
            self.sink
                .emit(&format!("✅ {}: PASSED - {}", result.name, result.detail));
        } else {
            tracing::warn!(
                check = %result.name,
                record = %result.to_json_line(),
                "check failed"
            );
            self.sink
                .emit(&format!("❌ {}: FAILED - {}", result.name, result.detail));
        }

        self.ledger.push(result);
    }

    pub fn pass(&mut self, name: impl Into<String>, detail: impl Into<String>, sample: Option<Value>) {
        self.record(name, true, detail, sample);
    }

    pub fn fail(&mut self, name: impl Into<String>, detail: impl Into<String>, sample: Option<Value>) {
        self.record(name, false, detail, sample);
    }

    /// Record an informational result: it passes whatever `holds` says,
    /// unless the recorder is strict.
    pub fn observe(
        &mut self,
        name: impl Into<String>,
        holds: bool,
        detail: impl Into<String>,
        sample: Option<Value>,
    ) {
        let passed = holds || !self.strict;
        self.record(name, passed, detail, sample);
    }

    /// Emit a line that is not a check result (banners, tier headings).
    pub fn note(&mut self, line: &str) {
        self.sink.emit(line);
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn summarize(&self) -> RunReport {
        self.ledger.summarize()
    }

    /// Print the summary through the sink and return it.
    pub fn report(&mut self) -> RunReport {
        let report = self.summarize();
        for line in report.render() {
            self.sink.emit(&line);
        }
        report
    }

    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }
}
