//! # Run orchestration
//!
//! Runs the checks tier by tier in a fixed order and closes with the summary.
//! Tiers only group the report; no check reads another's outcome.

use std::fmt::{self, Display};

use time::OffsetDateTime;

use crate::checks::{self, CheckContext};
use crate::testing::{Recorder, RunReport, format_instant};

const RULE_WIDTH: usize = 80;

/// Presentational grouping of checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Runs ahead of the first heading.
    Baseline,
    High,
    Medium,
    Additional,
    ErrorHandling,
}

impl Tier {
    pub fn heading(&self) -> Option<&'static str> {
        match self {
            Tier::Baseline => None,
            Tier::High => Some("🔥 HIGH PRIORITY TESTS"),
            Tier::Medium => Some("📊 MEDIUM PRIORITY TESTS"),
            Tier::Additional => Some("🔧 ADDITIONAL ENDPOINTS"),
            Tier::ErrorHandling => Some("⚠️  ERROR HANDLING"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Root,
    Overview,
    Roi,
    Assistant,
    Analytics,
    Listings,
    ErrorHandling,
}

impl Check {
    pub async fn run(self, ctx: &CheckContext, recorder: &mut Recorder) {
        tracing::debug!(check = %self, "running check");
        match self {
            Check::Root => checks::root::run(ctx, recorder).await,
            Check::Overview => checks::overview::run(ctx, recorder).await,
            Check::Roi => checks::roi::run(ctx, recorder).await,
            Check::Assistant => checks::assistant::run(ctx, recorder).await,
            Check::Analytics => checks::analytics::run(ctx, recorder).await,
            Check::Listings => checks::listings::run(ctx, recorder).await,
            Check::ErrorHandling => checks::error_handling::run(ctx, recorder).await,
        }
    }
}

impl Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Check::Root => "root",
            Check::Overview => "overview",
            Check::Roi => "roi",
            Check::Assistant => "assistant",
            Check::Analytics => "analytics",
            Check::Listings => "listings",
            Check::ErrorHandling => "error-handling",
        };
        write!(f, "{label}")
    }
}

/// Tiers and their checks, in run order.
pub const PLAN: [(Tier, &[Check]); 5] = [
    (Tier::Baseline, &[Check::Root]),
    (Tier::High, &[Check::Overview, Check::Roi]),
    (Tier::Medium, &[Check::Assistant, Check::Analytics]),
    (Tier::Additional, &[Check::Listings]),
    (Tier::ErrorHandling, &[Check::ErrorHandling]),
];

/// Run every check in [`PLAN`] order and print the summary.
pub async fn run_suite(ctx: &CheckContext, recorder: &mut Recorder) -> RunReport {
    let rule = "=".repeat(RULE_WIDTH);
    recorder.note("🚀 Starting FleetPulse Backend API Tests");
    recorder.note(&format!("📍 Base URL: {}", ctx.client.base_url()));
    recorder.note(&format!("⏰ Started at: {}", format_instant(OffsetDateTime::now_utc())));
    recorder.note(&rule);

    for (tier, tier_checks) in PLAN {
        if let Some(heading) = tier.heading() {
            recorder.note(heading);
        }
        for check in tier_checks {
            check.run(ctx, recorder).await;
            recorder.note("");
        }
    }

    recorder.note(&rule);
    let report = recorder.report();
    recorder.note("");
    recorder.note(&format!("⏰ Completed at: {}", format_instant(OffsetDateTime::now_utc())));
    recorder.note(&rule);

    tracing::info!(
        total = report.total,
        passed = report.passed,
        failed = report.failed,
        strict = recorder.is_strict(),
        "suite finished"
    );
    report
}
