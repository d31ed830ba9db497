use serde_json::Value;

use super::{CheckContext, default_request, exchange, head, is_registration};
use crate::testing::{EndpointExpectation, FieldRequirement, Recorder};

/// A simple GET endpoint: the expectation decides pass/fail, `describe`
/// builds the detail line and sample from an accepted body.
#[derive(Debug, Clone, Copy)]
pub struct Listing {
    pub expectation: EndpointExpectation,
    pub describe: fn(&Value) -> (String, Value),
}

const VEHICLE_FIELDS: &[FieldRequirement] = &[FieldRequirement::first_element("vehicles", &["id"])];
const DRIVER_FIELDS: &[FieldRequirement] = &[FieldRequirement::first_element("drivers", &["name"])];
const ROUTE_FIELDS: &[FieldRequirement] = &[FieldRequirement::first_element("routes", &["name"])];
const COMPLIANCE_FIELDS: &[FieldRequirement] =
    &[FieldRequirement::root(&["permits", "insurance", "maintenance"])];

pub static LISTINGS: [Listing; 4] = [
    Listing {
        expectation: EndpointExpectation::get("Vehicles Endpoint", "/fleet/vehicles")
            .requires(VEHICLE_FIELDS),
        describe: describe_vehicles,
    },
    Listing {
        expectation: EndpointExpectation::get("Drivers Endpoint", "/fleet/drivers")
            .requires(DRIVER_FIELDS),
        describe: describe_drivers,
    },
    Listing {
        expectation: EndpointExpectation::get("Routes Endpoint", "/fleet/routes")
            .requires(ROUTE_FIELDS),
        describe: describe_routes,
    },
    Listing {
        expectation: EndpointExpectation::get("Compliance Endpoint", "/fleet/compliance")
            .requires(COMPLIANCE_FIELDS),
        describe: describe_compliance,
    },
];

pub async fn run(ctx: &CheckContext, recorder: &mut Recorder) {
    for listing in &LISTINGS {
        let expectation = &listing.expectation;
        match exchange(&ctx.client, expectation, &default_request(expectation)).await {
            Ok(body) => {
                let (detail, sample) = (listing.describe)(&body);
                recorder.pass(expectation.name, detail, Some(sample));
            }
            Err(failure) => recorder.fail(expectation.name, failure.to_string(), failure.sample()),
        }
    }
}

fn count(body: &Value, key: &str) -> usize {
    body.get(key).and_then(Value::as_array).map_or(0, Vec::len)
}

fn names(body: &Value, key: &str) -> Value {
    let names: Vec<Value> = body
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("name").cloned())
                .collect()
        })
        .unwrap_or_default();
    Value::Array(names)
}

fn describe_vehicles(body: &Value) -> (String, Value) {
    let registration = is_registration(body.pointer("/vehicles/0/id"));
    let detail = format!(
        "Found {} vehicles, registration format: {registration}",
        count(body, "vehicles")
    );
    (detail, head(body.get("vehicles"), 2))
}

fn describe_drivers(body: &Value) -> (String, Value) {
    let detail = format!("Found {} drivers", count(body, "drivers"));
    (detail, names(body, "drivers"))
}

fn describe_routes(body: &Value) -> (String, Value) {
    let detail = format!("Found {} routes", count(body, "routes"));
    (detail, names(body, "routes"))
}

fn describe_compliance(body: &Value) -> (String, Value) {
    ("All compliance categories present".to_string(), body.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing(name: &str) -> &'static Listing {
        LISTINGS
            .iter()
            .find(|listing| listing.expectation.name == name)
            .unwrap()
    }

    #[test]
    fn table_covers_each_fleet_listing() {
        let paths: Vec<_> = LISTINGS.iter().map(|l| l.expectation.path).collect();
        assert_eq!(
            paths,
            vec!["/fleet/vehicles", "/fleet/drivers", "/fleet/routes", "/fleet/compliance"]
        );
    }

    #[test]
    fn vehicles_need_an_id_on_the_first_entry() {
        let vehicles = listing("Vehicles Endpoint");
        let good = json!({"vehicles": [{"id": "MH-12-AB-1234"}, {"id": "GJ-01-CD-5678"}, {"id": "x"}], "count": 3});
        assert!(vehicles.expectation.verify(&good).is_ok());
        assert!(vehicles.expectation.verify(&json!({"vehicles": []})).is_err());
        assert!(vehicles.expectation.verify(&json!({"vehicles": [{"driver": "Amit"}]})).is_err());

        let (detail, sample) = (vehicles.describe)(&good);
        assert_eq!(detail, "Found 3 vehicles, registration format: true");
        assert_eq!(sample.as_array().unwrap().len(), 2);
    }

    #[test]
    fn numeric_vehicle_id_is_not_a_registration() {
        let vehicles = listing("Vehicles Endpoint");
        let body = json!({"vehicles": [{"id": -1234567890}]});
        let (detail, _) = (vehicles.describe)(&body);
        assert_eq!(detail, "Found 1 vehicles, registration format: false");
    }

    #[test]
    fn drivers_and_routes_need_names() {
        let drivers = listing("Drivers Endpoint");
        let body = json!({"drivers": [{"name": "Rajesh Kumar"}, {"name": "Amit Patel"}]});
        assert!(drivers.expectation.verify(&body).is_ok());
        assert_eq!(
            (drivers.describe)(&body),
            ("Found 2 drivers".to_string(), json!(["Rajesh Kumar", "Amit Patel"]))
        );

        let routes = listing("Routes Endpoint");
        assert!(routes.expectation.verify(&json!({"routes": [{"id": "R001"}]})).is_err());
        assert!(routes.expectation.verify(&json!({"count": 0})).is_err());
    }

    #[test]
    fn compliance_needs_every_category() {
        let compliance = listing("Compliance Endpoint");
        let body = json!({"permits": {}, "insurance": {}, "maintenance": {}});
        assert!(compliance.expectation.verify(&body).is_ok());

        let violation = compliance
            .expectation
            .verify(&json!({"permits": {}, "insurance": {}}))
            .unwrap_err();
        assert_eq!(violation.to_string(), "Missing fields: maintenance");
    }
}
