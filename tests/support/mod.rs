// In-process stand-in for the FleetPulse API, with switchable faults.

use std::collections::HashMap;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use serde_json::{Value, json};
use tokio::runtime::Builder;
use tokio::sync::oneshot;

use fleetpulse_smoke::checks::CheckContext;
use fleetpulse_smoke::http::ApiClient;

/// Deviations from a conforming server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Drop a top-level field from `/fleet/overview`.
    OverviewWithout(&'static str),
    /// Overview figures never change between calls.
    StaticOverview,
    /// ROI savings ignore the fleet size.
    FlatRoiSavings,
    /// 404 responses carry no `error` field.
    NotFoundWithoutError,
    /// Answer 500 on this path (without the `/api` prefix).
    ServerError(&'static str),
    /// AI answers come back without suggestions.
    NoSuggestions,
}

#[derive(Clone)]
struct StubState {
    faults: Arc<Vec<Fault>>,
    overview_calls: Arc<AtomicU64>,
}

impl StubState {
    fn has(&self, fault: &Fault) -> bool {
        self.faults.contains(fault)
    }

    fn server_error(&self, path: &str) -> Option<Response> {
        self.faults
            .iter()
            .any(|fault| matches!(fault, Fault::ServerError(failing) if *failing == path))
            .then(|| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Internal server error"})),
                )
                    .into_response()
            })
    }
}

/// Handle for a running stub; shuts the server down on drop.
pub struct FleetStub {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl FleetStub {
    pub fn spawn() -> Self {
        Self::spawn_with(Vec::new())
    }

    pub fn spawn_with(faults: Vec<Fault>) -> Self {
        let listener = StdTcpListener::bind("127.0.0.1:0").expect("stub bind");
        listener.set_nonblocking(true).expect("stub nonblocking");
        let addr = listener.local_addr().expect("stub local addr");
        let base_url = format!("http://{addr}/api");

        let state = StubState {
            faults: Arc::new(faults),
            overview_calls: Arc::new(AtomicU64::new(0)),
        };
        let app = router(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = thread::spawn(move || {
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("stub runtime");
            runtime.block_on(async move {
                let listener =
                    tokio::net::TcpListener::from_std(listener).expect("stub listener from_std");
                let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                });
                let _ = server.await;
            });
        });

        Self {
            base_url,
            shutdown: Some(shutdown_tx),
            join: Some(join),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Drop for FleetStub {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Context with no pause between overview fetches.
pub fn context_for(base_url: &str) -> CheckContext {
    let client = ApiClient::new(base_url, None).expect("api client");
    CheckContext::new(client, std::time::Duration::ZERO)
}

/// A base URL nothing is listening on.
pub fn unreachable_base_url() -> String {
    let listener = StdTcpListener::bind("127.0.0.1:0").expect("free port bind");
    let addr = listener.local_addr().expect("free port addr");
    drop(listener);
    format!("http://{addr}/api")
}

fn router(state: StubState) -> Router {
    Router::new()
        .route("/api/", get(root))
        .route("/api/fleet/overview", get(overview))
        .route("/api/fleet/vehicles", get(vehicles))
        .route("/api/fleet/drivers", get(drivers))
        .route("/api/fleet/routes", get(routes))
        .route("/api/fleet/compliance", get(compliance))
        .route("/api/fleet/analytics", get(analytics))
        .route("/api/ai/query", get(ai_get).post(ai_post))
        .route("/api/calculate-roi", post(calculate_roi))
        .fallback(not_found)
        .with_state(state)
}

fn vehicle_list() -> Value {
    json!([
        {
            "id": "MH-12-AB-1234",
            "driver": "Rajesh Kumar",
            "status": "active",
            "location": {"lat": 19.076, "lng": 72.8777, "address": "Mumbai, Maharashtra"},
            "speed": 45,
            "fuel": 75
        },
        {
            "id": "GJ-01-CD-5678",
            "driver": "Amit Patel",
            "status": "active",
            "location": {"lat": 23.0225, "lng": 72.5714, "address": "Ahmedabad, Gujarat"},
            "speed": 60,
            "fuel": 45
        }
    ])
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "FleetPulse API is running!",
        "timestamp": "2025-01-07T10:00:00Z",
        "version": "1.0.0"
    }))
}

async fn overview(State(state): State<StubState>) -> Response {
    if let Some(response) = state.server_error("/fleet/overview") {
        return response;
    }
    let call = state.overview_calls.fetch_add(1, Ordering::SeqCst);
    let drift = if state.has(&Fault::StaticOverview) { 0 } else { call };

    let mut body = json!({
        "analytics": {
            "totalVehicles": 28,
            "activeVehicles": 25,
            "totalDistance": 1247 + drift * 13,
            "fuelEfficiency": 6.2,
            "safetyScore": 94,
            "monthlyFuelCost": 245000
        },
        "vehicles": vehicle_list(),
        "lastUpdated": "2025-01-07T10:00:00Z"
    });
    for fault in state.faults.iter() {
        if let Fault::OverviewWithout(field) = fault {
            if let Some(object) = body.as_object_mut() {
                object.remove(*field);
            }
        }
    }
    Json(body).into_response()
}

async fn vehicles(State(state): State<StubState>) -> Response {
    if let Some(response) = state.server_error("/fleet/vehicles") {
        return response;
    }
    Json(json!({"vehicles": vehicle_list(), "count": 2})).into_response()
}

async fn drivers(State(state): State<StubState>) -> Response {
    if let Some(response) = state.server_error("/fleet/drivers") {
        return response;
    }
    Json(json!({
        "drivers": [
            {"id": "D001", "name": "Rajesh Kumar", "safetyScore": 98},
            {"id": "D002", "name": "Amit Patel", "safetyScore": 92}
        ],
        "count": 2
    }))
    .into_response()
}

async fn routes(State(state): State<StubState>) -> Response {
    if let Some(response) = state.server_error("/fleet/routes") {
        return response;
    }
    Json(json!({
        "routes": [
            {"id": "R001", "name": "Mumbai to Pune Express", "distance": 148},
            {"id": "R002", "name": "Delhi to Agra Highway", "distance": 233}
        ],
        "count": 2
    }))
    .into_response()
}

async fn compliance(State(state): State<StubState>) -> Response {
    if let Some(response) = state.server_error("/fleet/compliance") {
        return response;
    }
    Json(json!({
        "permits": {"valid": 25, "expiring": 3, "expired": 0},
        "insurance": {"valid": 27, "expiring": 1, "expired": 0},
        "maintenance": {"upToDate": 24, "due": 4, "overdue": 0}
    }))
    .into_response()
}

async fn analytics(State(state): State<StubState>) -> Response {
    if let Some(response) = state.server_error("/fleet/analytics") {
        return response;
    }
    Json(json!({
        "totalVehicles": 28,
        "activeVehicles": 25,
        "fuelEfficiency": 6.2,
        "safetyScore": 94,
        "timeSeries": {
            "fuelEfficiency": [
                {"date": "2025-01-01", "value": 5.8},
                {"date": "2025-01-02", "value": 6.1},
                {"date": "2025-01-03", "value": 6.2}
            ],
            "safetyScores": [
                {"date": "2025-01-01", "value": 89},
                {"date": "2025-01-02", "value": 93},
                {"date": "2025-01-03", "value": 94}
            ],
            "costSavings": {
                "monthly": 47500,
                "breakdown": {"fuel": 28500, "maintenance": 12000, "insurance": 7000}
            }
        },
        "lastUpdated": "2025-01-07T10:00:00Z"
    }))
    .into_response()
}

fn answer(state: &StubState, query: &str) -> Value {
    let lowered = query.to_lowercase();
    let response = if lowered.contains("driver") {
        "Rajesh Kumar is your top driver with a safety score of 98/100."
    } else if lowered.contains("fuel") {
        "Your fleet's current fuel efficiency is 6.2 km/L."
    } else if lowered.contains("safety") {
        "Your fleet safety score is 94/100."
    } else if lowered.contains("route") {
        "The Mumbai to Pune Express route is most efficient."
    } else if lowered.contains("cost") || lowered.contains("saving") {
        "Monthly cost savings are ₹47,500."
    } else {
        "I'm a demo AI assistant."
    };
    let suggestions = if state.has(&Fault::NoSuggestions) {
        json!([])
    } else {
        json!(["Show me top drivers this week", "How is our fuel efficiency?"])
    };
    json!({
        "query": query,
        "response": response,
        "suggestions": suggestions,
        "timestamp": "2025-01-07T10:00:00Z"
    })
}

async fn ai_get(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Some(response) = state.server_error("/ai/query") {
        return response;
    }
    let query = params.get("q").cloned().unwrap_or_default();
    Json(answer(&state, &query)).into_response()
}

async fn ai_post(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    if let Some(response) = state.server_error("/ai/query") {
        return response;
    }
    let query = body.get("query").and_then(Value::as_str).unwrap_or_default();
    Json(answer(&state, query)).into_response()
}

async fn calculate_roi(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    if let Some(response) = state.server_error("/calculate-roi") {
        return response;
    }
    let input = |key: &str| body.get(key).and_then(Value::as_f64).unwrap_or(0.0);
    let (trucks, monthly_fuel_cost, accidents) = if state.has(&Fault::FlatRoiSavings) {
        (15.0, 180_000.0, 3.0)
    } else {
        (input("trucks"), input("monthlyFuelCost"), input("accidentsPerYear"))
    };

    let fuel = monthly_fuel_cost * 0.15;
    let accident = accidents * 50_000.0 * 0.4;
    let maintenance = trucks * 8_000.0;
    let monthly = fuel + accident / 12.0 + maintenance;
    let annual = monthly * 12.0;
    let cost = trucks * 700.0 * 12.0;
    let net = annual - cost;

    Json(json!({
        "monthlySavings": monthly.round(),
        "annualSavings": annual.round(),
        "netSavings": net.round(),
        "roi": (net / cost * 100.0).round(),
        "breakdown": {
            "fuelSavings": fuel.round(),
            "accidentSavings": (accident / 12.0).round(),
            "maintenanceSavings": maintenance.round(),
            "totalCost": cost.round()
        }
    }))
    .into_response()
}

async fn not_found(State(state): State<StubState>, uri: Uri) -> Response {
    let body = if state.has(&Fault::NotFoundWithoutError) {
        json!({"message": "nothing here", "path": uri.path()})
    } else {
        json!({"error": "Endpoint not found", "path": uri.path()})
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
