use super::{CheckContext, default_request, exchange};
use crate::testing::{EndpointExpectation, FieldRequirement, Recorder};

const NOT_FOUND_FIELDS: &[FieldRequirement] = &[FieldRequirement::root(&["error"])];

/// An undefined path must answer 404 with an `error` field.
pub const NOT_FOUND: EndpointExpectation =
    EndpointExpectation::get("Error Handling - 404", "/invalid/endpoint")
        .status(404)
        .requires(NOT_FOUND_FIELDS);

pub async fn run(ctx: &CheckContext, recorder: &mut Recorder) {
    match exchange(&ctx.client, &NOT_FOUND, &default_request(&NOT_FOUND)).await {
        Ok(body) => recorder.pass(
            NOT_FOUND.name,
            "Proper 404 response with error message",
            Some(body),
        ),
        Err(failure) => recorder.fail(NOT_FOUND.name, failure.to_string(), failure.sample()),
    }
}
