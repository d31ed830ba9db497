use serde_json::Value;
use thiserror::Error;

use crate::http::HttpMethod;

/// Where in a response body a set of fields is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldScope {
    Root,
    /// Nested object under the given top-level key.
    Object(&'static str),
    /// First element of the array under the given top-level key. The array
    /// must be non-empty.
    FirstElement(&'static str),
}

/// Keys that must be present within one scope of a response body.
#[derive(Debug, Clone, Copy)]
pub struct FieldRequirement {
    pub scope: FieldScope,
    pub fields: &'static [&'static str],
}

impl FieldRequirement {
    pub const fn root(fields: &'static [&'static str]) -> Self {
        Self {
            scope: FieldScope::Root,
            fields,
        }
    }

    pub const fn object(key: &'static str, fields: &'static [&'static str]) -> Self {
        Self {
            scope: FieldScope::Object(key),
            fields,
        }
    }

    pub const fn first_element(key: &'static str, fields: &'static [&'static str]) -> Self {
        Self {
            scope: FieldScope::FirstElement(key),
            fields,
        }
    }

    pub fn check(&self, body: &Value) -> Result<(), ShapeViolation> {
        let target = match self.scope {
            FieldScope::Root => body,
            FieldScope::Object(key) => body
                .get(key)
                .ok_or(ShapeViolation::MissingScope { key })?,
            FieldScope::FirstElement(key) => {
                let items = body
                    .get(key)
                    .ok_or(ShapeViolation::MissingScope { key })?
                    .as_array()
                    .ok_or(ShapeViolation::NotAnArray { key })?;
                items.first().ok_or(ShapeViolation::EmptyCollection { key })?
            }
        };

        let missing = missing_fields(target, self.fields);
        if missing.is_empty() {
            return Ok(());
        }

        Err(ShapeViolation::MissingFields {
            scope: self.scope,
            fields: missing.into_iter().map(str::to_string).collect(),
        })
    }
}

/// Ways a response body can fail a [`FieldRequirement`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeViolation {
    #[error("Missing `{key}` section")]
    MissingScope { key: &'static str },
    #[error("`{key}` is not a list")]
    NotAnArray { key: &'static str },
    #[error("No {key} data")]
    EmptyCollection { key: &'static str },
    #[error("Missing {}fields: {}", scope_label(.scope), .fields.join(", "))]
    MissingFields { scope: FieldScope, fields: Vec<String> },
}

impl ShapeViolation {
    /// Missing field names, if that is what the violation is about.
    pub fn missing(&self) -> &[String] {
        match self {
            ShapeViolation::MissingFields { fields, .. } => fields,
            _ => &[],
        }
    }
}

fn scope_label(scope: &FieldScope) -> String {
    match *scope {
        FieldScope::Root => String::new(),
        FieldScope::Object(key) => format!("{key} "),
        FieldScope::FirstElement(key) => format!("{key}[0] "),
    }
}

/// Keys from `fields` absent from `value`. A non-object value is missing
/// every key.
pub fn missing_fields<'a>(value: &Value, fields: &[&'a str]) -> Vec<&'a str> {
    let Some(object) = value.as_object() else {
        return fields.to_vec();
    };
    fields
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect()
}

/// Static description of what one endpoint must return.
#[derive(Debug, Clone, Copy)]
pub struct EndpointExpectation {
    /// Result name used in the report.
    pub name: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    pub expected_status: u16,
    /// Checked in order; the first violation is reported.
    pub requirements: &'static [FieldRequirement],
}

impl EndpointExpectation {
    pub const fn get(name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            method: HttpMethod::Get,
            path,
            expected_status: 200,
            requirements: &[],
        }
    }

    pub const fn post(name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            method: HttpMethod::Post,
            path,
            expected_status: 200,
            requirements: &[],
        }
    }

    pub const fn status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    pub const fn requires(mut self, requirements: &'static [FieldRequirement]) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn verify(&self, body: &Value) -> Result<(), ShapeViolation> {
        for requirement in self.requirements {
            requirement.check(body)?;
        }
        Ok(())
    }
}
