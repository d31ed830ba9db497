use serde::Serialize;
use serde_json::{Value, json};

use super::{CheckContext, exchange, truncate_chars};
use crate::http::{ApiRequest, HttpMethod};
use crate::testing::{EndpointExpectation, FieldRequirement, Recorder};

const ANSWER_FIELDS: &[FieldRequirement] =
    &[FieldRequirement::root(&["query", "response", "suggestions", "timestamp"])];

pub const ASSISTANT_GET: EndpointExpectation =
    EndpointExpectation::get("AI Assistant GET", "/ai/query").requires(ANSWER_FIELDS);

pub const ASSISTANT_POST: EndpointExpectation =
    EndpointExpectation::post("AI Assistant POST", "/ai/query").requires(ANSWER_FIELDS);

/// Sent as `?q=`.
pub const GET_QUERIES: [&str; 4] = [
    "top driver",
    "fuel efficiency",
    "safety score",
    "route optimization",
];

/// Sent as `{"query": ...}`.
pub const POST_QUERIES: [&str; 3] = [
    "Show me top drivers this week",
    "How is our fuel efficiency trending?",
    "What are our cost savings this month?",
];

/// Body of `POST /ai/query`.
#[derive(Debug, Serialize)]
pub struct Prompt<'a> {
    pub query: &'a str,
}

pub async fn run(ctx: &CheckContext, recorder: &mut Recorder) {
    for query in GET_QUERIES {
        let request = ApiRequest::get(ASSISTANT_GET.path).with_query("q", query);
        ask(ctx, recorder, &ASSISTANT_GET, request, query).await;
    }

    for query in POST_QUERIES {
        let request = ApiRequest::post(ASSISTANT_POST.path, json!(Prompt { query }));
        ask(ctx, recorder, &ASSISTANT_POST, request, query).await;
    }
}

async fn ask(
    ctx: &CheckContext,
    recorder: &mut Recorder,
    expectation: &EndpointExpectation,
    request: ApiRequest,
    query: &str,
) {
    let name = result_name(expectation.method, query);
    match exchange(&ctx.client, expectation, &request).await {
        Ok(body) => evaluate_answer(recorder, &name, query, &body),
        Err(failure) => recorder.fail(name, failure.to_string(), failure.sample()),
    }
}

pub fn result_name(method: HttpMethod, query: &str) -> String {
    match method {
        HttpMethod::Get => format!("AI Assistant GET - {query}"),
        HttpMethod::Post => format!("AI Assistant POST - {}...", truncate_chars(query, 20)),
    }
}

/// Whether any word of the query shows up in the answer, ignoring case.
pub fn is_contextual(query: &str, response: &str) -> bool {
    let response = response.to_lowercase();
    query
        .to_lowercase()
        .split_whitespace()
        .any(|word| response.contains(word))
}

fn evaluate_answer(recorder: &mut Recorder, name: &str, query: &str, body: &Value) {
    let response = body.get("response").and_then(Value::as_str).unwrap_or_default();
    let contextual = is_contextual(query, response);
    let has_suggestions = body
        .get("suggestions")
        .and_then(Value::as_array)
        .is_some_and(|suggestions| !suggestions.is_empty());

    let detail = format!(
        "Contextual response: {contextual}, Has suggestions: {has_suggestions}, Response length: {}",
        response.chars().count()
    );
    let sample = json!({
        "query": body.get("query"),
        "response": truncate_chars(response, 100),
    });
    recorder.observe(name, contextual && has_suggestions, detail, Some(sample));
}
