use serde_json::Value;

use super::{CheckContext, default_request, exchange, tail};
use crate::testing::{EndpointExpectation, FieldRequirement, Recorder};

const ANALYTICS_FIELDS: &[FieldRequirement] = &[FieldRequirement::root(&[
    "timeSeries",
    "lastUpdated",
    "totalVehicles",
    "fuelEfficiency",
])];

pub const ANALYTICS: EndpointExpectation =
    EndpointExpectation::get("Fleet Analytics API", "/fleet/analytics").requires(ANALYTICS_FIELDS);

pub const TIME_SERIES: FieldRequirement = FieldRequirement::object(
    "timeSeries",
    &["fuelEfficiency", "safetyScores", "costSavings"],
);

/// Keys every point of a dated series carries.
pub const POINT_FIELDS: &[&str] = &["date", "value"];

const TIME_SERIES_RESULT: &str = "Fleet Analytics API - Time Series";
const FUEL_RESULT: &str = "Fleet Analytics API - Fuel Data";
const SAFETY_RESULT: &str = "Fleet Analytics API - Safety Data";
const COST_RESULT: &str = "Fleet Analytics API - Cost Breakdown";

pub async fn run(ctx: &CheckContext, recorder: &mut Recorder) {
    match exchange(&ctx.client, &ANALYTICS, &default_request(&ANALYTICS)).await {
        Ok(body) => evaluate(recorder, &body),
        Err(failure) => {
            recorder.fail(failure.result_name(ANALYTICS.name), failure.to_string(), failure.sample())
        }
    }
}

fn evaluate(recorder: &mut Recorder, body: &Value) {
    if let Err(violation) = TIME_SERIES.check(body) {
        recorder.fail(TIME_SERIES_RESULT, violation.to_string(), body.get("timeSeries").cloned());
        return;
    }
    let Some(series) = body.get("timeSeries") else {
        return;
    };

    evaluate_fuel(recorder, &series["fuelEfficiency"]);
    evaluate_safety(recorder, &series["safetyScores"]);
    evaluate_cost(recorder, &series["costSavings"]);
}

/// A dated series: a non-empty array whose first point has a date and value.
fn point_series<'a>(series: &'a Value, label: &str) -> Result<&'a [Value], String> {
    let points = series
        .as_array()
        .ok_or_else(|| format!("Invalid {label} data structure: not a list"))?;
    let first = points
        .first()
        .ok_or_else(|| format!("Invalid {label} data structure: no points"))?;
    let missing = crate::testing::expectation::missing_fields(first, POINT_FIELDS);
    if !missing.is_empty() {
        return Err(format!(
            "Invalid {label} data structure: points missing {}",
            missing.join(", ")
        ));
    }
    Ok(points.as_slice())
}

fn evaluate_fuel(recorder: &mut Recorder, series: &Value) {
    let sample = tail(Some(series), 3);
    match point_series(series, "fuel efficiency") {
        Ok(points) => {
            let latest = points
                .last()
                .and_then(|point| point.get("value"))
                .cloned()
                .unwrap_or(Value::Null);
            let detail = format!(
                "Fuel efficiency data: {} points, Latest: {latest} km/L",
                points.len()
            );
            recorder.pass(FUEL_RESULT, detail, Some(sample));
        }
        Err(detail) => recorder.fail(FUEL_RESULT, detail, Some(series.clone())),
    }
}

fn evaluate_safety(recorder: &mut Recorder, series: &Value) {
    let sample = tail(Some(series), 3);
    match point_series(series, "safety score") {
        Ok(points) => {
            let values: Vec<f64> = points
                .iter()
                .filter_map(|point| point.get("value").and_then(Value::as_f64))
                .collect();
            let average = if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            };
            let detail = format!(
                "Safety data: {} points, Average: {average:.1}/100",
                points.len()
            );
            recorder.pass(SAFETY_RESULT, detail, Some(sample));
        }
        Err(detail) => recorder.fail(SAFETY_RESULT, detail, Some(series.clone())),
    }
}

/// Sum of the numeric entries of a breakdown mapping.
pub fn breakdown_total(breakdown: &serde_json::Map<String, Value>) -> f64 {
    breakdown.values().filter_map(Value::as_f64).sum()
}

fn evaluate_cost(recorder: &mut Recorder, cost_savings: &Value) {
    let Some(breakdown) = cost_savings.get("breakdown").and_then(Value::as_object) else {
        recorder.fail(
            COST_RESULT,
            "Cost savings carry no breakdown mapping",
            Some(cost_savings.clone()),
        );
        return;
    };

    let fuel = breakdown.get("fuel").and_then(Value::as_f64).unwrap_or(0.0);
    let detail = format!(
        "Cost breakdown total: ₹{}, Fuel: ₹{fuel}",
        breakdown_total(breakdown)
    );
    recorder.pass(COST_RESULT, detail, Some(Value::Object(breakdown.clone())));
}
