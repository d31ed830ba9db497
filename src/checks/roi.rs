use serde::Serialize;
use serde_json::{Value, json};

use super::{CheckContext, exchange, number_at};
use crate::http::ApiRequest;
use crate::testing::{EndpointExpectation, FieldRequirement, Recorder};

const ROI_FIELDS: &[FieldRequirement] = &[FieldRequirement::root(&[
    "monthlySavings",
    "annualSavings",
    "netSavings",
    "roi",
    "breakdown",
])];

pub const ROI: EndpointExpectation =
    EndpointExpectation::post("ROI Calculator API", "/calculate-roi").requires(ROI_FIELDS);

pub const BREAKDOWN: FieldRequirement = FieldRequirement::object(
    "breakdown",
    &["fuelSavings", "accidentSavings", "maintenanceSavings", "totalCost"],
);

/// Allowed gap between `annualSavings` and twelve months of `monthlySavings`.
pub const ANNUAL_TOLERANCE: f64 = 1000.0;
/// Exclusive upper bound for a plausible ROI percentage.
pub const ROI_CEILING: f64 = 10_000.0;

const CALCULATIONS_RESULT: &str = "ROI Calculator API - Calculations";
const BREAKDOWN_RESULT: &str = "ROI Calculator API - Breakdown";
const SCALING_RESULT: &str = "ROI Calculator API - Scaling";

/// Inputs to the ROI calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetProfile {
    pub trucks: u32,
    pub monthly_fuel_cost: u64,
    pub accidents_per_year: u32,
}

impl FleetProfile {
    pub fn to_json(&self) -> Value {
        json!(self)
    }

    /// Whether every input is at least as large as `other`'s.
    pub fn dominates(&self, other: &FleetProfile) -> bool {
        self.trucks >= other.trucks
            && self.monthly_fuel_cost >= other.monthly_fuel_cost
            && self.accidents_per_year >= other.accidents_per_year
    }
}

pub const BASELINE_FLEET: FleetProfile = FleetProfile {
    trucks: 15,
    monthly_fuel_cost: 180_000,
    accidents_per_year: 3,
};

pub const LARGER_FLEET: FleetProfile = FleetProfile {
    trucks: 25,
    monthly_fuel_cost: 300_000,
    accidents_per_year: 5,
};

pub async fn run(ctx: &CheckContext, recorder: &mut Recorder) {
    let request = ApiRequest::post(ROI.path, BASELINE_FLEET.to_json());
    let body = match exchange(&ctx.client, &ROI, &request).await {
        Ok(body) => body,
        Err(failure) => {
            recorder.fail(failure.result_name(ROI.name), failure.to_string(), failure.sample());
            return;
        }
    };

    evaluate_calculations(recorder, &body);
    evaluate_breakdown(recorder, &body);

    let request = ApiRequest::post(ROI.path, LARGER_FLEET.to_json());
    match exchange(&ctx.client, &ROI, &request).await {
        Ok(larger) => evaluate_scaling(recorder, &body, &larger),
        Err(failure) => recorder.fail(
            SCALING_RESULT,
            format!("Larger fleet request failed: {failure}"),
            failure.sample(),
        ),
    }
}

/// Figures checked by the calculations result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calculation {
    pub monthly_savings: f64,
    pub annual_savings: f64,
    pub roi: f64,
}

impl Calculation {
    pub fn from_body(body: &Value) -> Option<Self> {
        Some(Self {
            monthly_savings: number_at(body, "/monthlySavings")?,
            annual_savings: number_at(body, "/annualSavings")?,
            roi: number_at(body, "/roi")?,
        })
    }

    pub fn annual_consistent(&self) -> bool {
        (self.annual_savings - self.monthly_savings * 12.0).abs() < ANNUAL_TOLERANCE
    }

    pub fn roi_plausible(&self) -> bool {
        self.roi > 0.0 && self.roi < ROI_CEILING
    }
}

fn evaluate_calculations(recorder: &mut Recorder, body: &Value) {
    let Some(calc) = Calculation::from_body(body) else {
        recorder.fail(
            CALCULATIONS_RESULT,
            "monthlySavings, annualSavings and roi must be numbers",
            Some(body.clone()),
        );
        return;
    };

    let annual_correct = calc.annual_consistent();
    let roi_reasonable = calc.roi_plausible();
    let detail = format!(
        "Monthly: ₹{}, Annual: ₹{}, ROI: {}%, Math correct: {annual_correct}, ROI in range: {roi_reasonable}",
        calc.monthly_savings, calc.annual_savings, calc.roi
    );
    recorder.record(
        CALCULATIONS_RESULT,
        annual_correct && roi_reasonable,
        detail,
        Some(body.clone()),
    );
}

fn evaluate_breakdown(recorder: &mut Recorder, body: &Value) {
    let breakdown = body.get("breakdown").cloned();
    match BREAKDOWN.check(body) {
        Ok(()) => {
            let figure = |key: &str| {
                body.pointer(&format!("/breakdown/{key}"))
                    .cloned()
                    .unwrap_or(Value::Null)
            };
            let detail = format!(
                "Complete breakdown provided. Fuel: ₹{}, Maintenance: ₹{}",
                figure("fuelSavings"),
                figure("maintenanceSavings")
            );
            recorder.pass(BREAKDOWN_RESULT, detail, breakdown);
        }
        Err(violation) => recorder.fail(BREAKDOWN_RESULT, violation.to_string(), breakdown),
    }
}

fn evaluate_scaling(recorder: &mut Recorder, baseline: &Value, larger: &Value) {
    let (Some(small), Some(large)) = (
        number_at(baseline, "/monthlySavings"),
        number_at(larger, "/monthlySavings"),
    ) else {
        recorder.fail(SCALING_RESULT, "monthlySavings must be a number in both responses", None);
        return;
    };

    let scaled = large > small;
    let detail = format!("Larger fleet shows higher savings: {scaled} (₹{small} → ₹{large})");
    recorder.record(SCALING_RESULT, scaled, detail, None);
}
