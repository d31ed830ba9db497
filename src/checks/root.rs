use serde_json::Value;

use super::{CheckContext, default_request, exchange};
use crate::testing::{EndpointExpectation, Recorder};

pub const ROOT: EndpointExpectation = EndpointExpectation::get("Root API Endpoint", "/");

/// Substring the root `message` must contain.
pub const RUNNING_MESSAGE: &str = "FleetPulse API is running";

pub async fn run(ctx: &CheckContext, recorder: &mut Recorder) {
    match exchange(&ctx.client, &ROOT, &default_request(&ROOT)).await {
        Ok(body) => evaluate(recorder, body),
        Err(failure) => recorder.fail(ROOT.name, failure.to_string(), failure.sample()),
    }
}

fn evaluate(recorder: &mut Recorder, body: Value) {
    let running = body
        .get("message")
        .and_then(Value::as_str)
        .is_some_and(|message| message.contains(RUNNING_MESSAGE));

    if running {
        let version = body.get("version").and_then(Value::as_str).unwrap_or("N/A");
        let detail = format!("API running, version: {version}");
        recorder.pass(ROOT.name, detail, Some(body));
    } else {
        recorder.fail(ROOT.name, "Missing expected message in response", Some(body));
    }
}
