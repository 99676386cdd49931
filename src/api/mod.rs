use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::core::{
    AnalysisReport, FieldError, PlanError, Planner, RequestDefaults, ScenarioOverrides,
    SimulationReport, StrategyReport, UserFinancialProfile,
};

type SharedPlanner = Arc<Planner>;

/// Request profile as it arrives over the wire. Anything left out is filled
/// from [`RequestDefaults`] before the planner sees it. Ages arrive as plain
/// JSON numbers so a negative or fractional age is reported against its field.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilePayload {
    age: Option<f64>,
    retirement_age: Option<f64>,
    annual_income: Option<f64>,
    monthly_expenses: Option<f64>,
    current_savings: Option<f64>,
    monthly_savings: Option<f64>,
    retirement_goal: Option<f64>,
    expected_inflation: Option<f64>,
    expected_returns: Option<f64>,
    employer_match: Option<f64>,
    social_security_estimate: Option<f64>,
    other_income: Option<f64>,
}

impl ProfilePayload {
    /// Applies `defaults` and checks the ages. When an age is unusable every
    /// other offending field is reported in the same error.
    pub fn into_profile(
        self,
        defaults: &RequestDefaults,
    ) -> Result<UserFinancialProfile, PlanError> {
        let mut errors = Vec::new();
        let current_age = whole_years(self.age, defaults.age, "age", &mut errors);
        let retirement_age = whole_years(
            self.retirement_age,
            defaults.retirement_age,
            "retirement_age",
            &mut errors,
        );
        let profile = UserFinancialProfile {
            current_age,
            retirement_age,
            annual_income: self.annual_income.unwrap_or(0.0),
            monthly_expenses: self.monthly_expenses.unwrap_or(0.0),
            current_savings: self.current_savings.unwrap_or(0.0),
            monthly_savings: self.monthly_savings.unwrap_or(0.0),
            retirement_goal: self.retirement_goal.unwrap_or(defaults.retirement_goal),
            expected_inflation_pct: self.expected_inflation.unwrap_or(defaults.expected_inflation),
            expected_return_pct: self.expected_returns.unwrap_or(defaults.expected_returns),
            employer_match: self.employer_match.unwrap_or(0.0),
            social_security_estimate: self.social_security_estimate.unwrap_or(0.0),
            other_income: self.other_income.unwrap_or(0.0),
        };
        if errors.is_empty() {
            return Ok(profile);
        }
        if let Err(PlanError::InvalidInput(more)) = profile.validate() {
            let more: Vec<FieldError> = more
                .into_iter()
                .filter(|e| errors.iter().all(|seen| seen.field != e.field))
                .collect();
            errors.extend(more);
        }
        Err(PlanError::InvalidInput(errors))
    }
}

/// Whole, non-negative years; anything else is recorded against `field` and
/// the default stands in so the rest of the profile can still be checked.
fn whole_years(
    value: Option<f64>,
    default: u32,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> u32 {
    match value {
        None => default,
        Some(years) if years.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&years) => {
            years as u32
        }
        Some(_) => {
            errors.push(FieldError::new(field, "must be a whole number of years >= 0"));
            default
        }
    }
}

fn sample_user_input() -> ProfilePayload {
    ProfilePayload {
        age: Some(35.0),
        retirement_age: Some(65.0),
        annual_income: Some(75_000.0),
        monthly_expenses: Some(4_000.0),
        current_savings: Some(50_000.0),
        monthly_savings: Some(1_000.0),
        retirement_goal: Some(1_000_000.0),
        expected_inflation: Some(3.0),
        expected_returns: Some(6.0),
        employer_match: Some(250.0),
        social_security_estimate: Some(2_000.0),
        other_income: Some(0.0),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SimulatePayload {
    user_input: ProfilePayload,
    modified_parameters: ScenarioOverrides,
    simulation_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    ai_enabled: bool,
    engine: &'static str,
}

#[derive(Debug, Serialize)]
struct IndexResponse {
    service: &'static str,
    version: &'static str,
    endpoints: [&'static str; 5],
}

#[derive(Debug, Serialize)]
struct EndpointDoc {
    method: &'static str,
    url: &'static str,
    description: &'static str,
}

#[derive(Debug, Serialize)]
struct SampleEndpoints {
    analyze: EndpointDoc,
    suggestions: EndpointDoc,
    simulate: EndpointDoc,
}

#[derive(Debug, Serialize)]
struct SampleInputsResponse {
    sample_user_input: ProfilePayload,
    sample_simulation_parameters: ScenarioOverrides,
    endpoints: SampleEndpoints,
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    success: bool,
    #[serde(flatten)]
    report: AnalysisReport,
}

#[derive(Debug, Serialize)]
struct SuggestionsResponse {
    success: bool,
    #[serde(flatten)]
    report: StrategyReport,
    ai_enabled: bool,
    degraded: bool,
}

#[derive(Debug, Serialize)]
struct SimulateResponse {
    success: bool,
    simulation_type: Option<String>,
    #[serde(flatten)]
    report: SimulationReport,
    degraded: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    fields: Vec<&'static str>,
}

pub fn router(planner: SharedPlanner) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/sample-inputs", get(sample_inputs_handler))
        .route("/analyze", post(analyze_handler))
        .route("/suggestions", post(suggestions_handler))
        .route("/simulate", post(simulate_handler))
        .fallback(not_found_handler)
        .with_state(planner)
}

pub async fn run_http_server(port: u16, planner: Planner) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let engine = planner.engine_name();
    if !planner.full_fidelity() {
        warn!("running with the {engine} projector; responses are flagged as degraded");
    }
    let app = router(Arc::new(planner));

    let listener = TcpListener::bind(addr).await?;
    info!("finai HTTP API listening on http://{addr} (engine: {engine})");
    info!("Local access: http://127.0.0.1:{port}/health");

    axum::serve(listener, app).await
}

async fn index_handler() -> Response {
    json_response(
        StatusCode::OK,
        IndexResponse {
            service: "finai retirement planner",
            version: env!("CARGO_PKG_VERSION"),
            endpoints: [
                "/health",
                "/sample-inputs",
                "/analyze",
                "/suggestions",
                "/simulate",
            ],
        },
    )
}

async fn health_handler(State(planner): State<SharedPlanner>) -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "healthy",
            ai_enabled: planner.full_fidelity(),
            engine: planner.engine_name(),
        },
    )
}

async fn sample_inputs_handler() -> Response {
    json_response(
        StatusCode::OK,
        SampleInputsResponse {
            sample_user_input: sample_user_input(),
            sample_simulation_parameters: ScenarioOverrides {
                monthly_savings: Some(1_500.0),
                expected_returns: Some(7.0),
                retirement_age: Some(67),
                ..ScenarioOverrides::default()
            },
            endpoints: SampleEndpoints {
                analyze: EndpointDoc {
                    method: "POST",
                    url: "/analyze",
                    description: "Projection, readiness, allocation and strategies for a profile",
                },
                suggestions: EndpointDoc {
                    method: "POST",
                    url: "/suggestions",
                    description: "Ranked strategy suggestions for a profile",
                },
                simulate: EndpointDoc {
                    method: "POST",
                    url: "/simulate",
                    description: "Compare a profile with a what-if scenario",
                },
            },
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found", Vec::new())
}

async fn analyze_handler(State(planner): State<SharedPlanner>, body: Bytes) -> Response {
    let result = profile_from_json(&body, &planner.config().defaults)
        .and_then(|profile| planner.analyze(&profile));
    match result {
        Ok(report) => json_response(
            StatusCode::OK,
            AnalyzeResponse {
                success: true,
                report,
            },
        ),
        Err(err) => plan_error_response(err),
    }
}

async fn suggestions_handler(State(planner): State<SharedPlanner>, body: Bytes) -> Response {
    let result = profile_from_json(&body, &planner.config().defaults)
        .and_then(|profile| planner.suggest(&profile));
    match result {
        Ok(report) => json_response(
            StatusCode::OK,
            SuggestionsResponse {
                success: true,
                report,
                ai_enabled: planner.full_fidelity(),
                degraded: !planner.full_fidelity(),
            },
        ),
        Err(err) => plan_error_response(err),
    }
}

async fn simulate_handler(State(planner): State<SharedPlanner>, body: Bytes) -> Response {
    let payload = match serde_json::from_slice::<SimulatePayload>(&body) {
        Ok(payload) => payload,
        Err(err) => return plan_error_response(err.into()),
    };
    let result = payload
        .user_input
        .into_profile(&planner.config().defaults)
        .and_then(|profile| planner.simulate(&profile, &payload.modified_parameters));
    match result {
        Ok(report) => json_response(
            StatusCode::OK,
            SimulateResponse {
                success: true,
                simulation_type: payload.simulation_type,
                report,
                degraded: !planner.full_fidelity(),
            },
        ),
        Err(err) => plan_error_response(err),
    }
}

fn profile_from_json(
    body: &[u8],
    defaults: &RequestDefaults,
) -> Result<UserFinancialProfile, PlanError> {
    let payload = serde_json::from_slice::<ProfilePayload>(body)?;
    payload.into_profile(defaults)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str, fields: Vec<&'static str>) -> Response {
    json_response(
        status,
        ErrorResponse {
            success: false,
            error: msg.to_string(),
            fields,
        },
    )
}

fn plan_error_response(err: PlanError) -> Response {
    let status = match err {
        PlanError::InvalidInput(_) | PlanError::Json(_) => StatusCode::BAD_REQUEST,
        PlanError::Config(_) | PlanError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, &err.to_string(), err.fields())
}
