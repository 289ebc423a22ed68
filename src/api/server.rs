use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::notice::{NOTICE_TTL, NoticeBoard, Scheduler, TokioScheduler};
use crate::core::{
    DepositError, Phase, Simulation, SimulationConfig, SimulationSnapshot, TransitionError,
    WithdrawalOutcome,
};

struct Session {
    simulation: Simulation,
    score: Option<i64>,
}

impl Session {
    fn new(config: SimulationConfig) -> Self {
        Self {
            simulation: Simulation::new(config),
            score: None,
        }
    }

    /// Phase errors take precedence over month validation.
    fn ensure_growing(&self) -> Result<(), TransitionError> {
        match self.simulation.phase() {
            Phase::Growing => Ok(()),
            actual => Err(TransitionError::WrongPhase {
                expected: Phase::Growing,
                actual,
            }),
        }
    }
}

/// Shared state for the single game served by this process.
#[derive(Clone)]
pub struct AppState {
    config: SimulationConfig,
    session: Arc<Mutex<Session>>,
    notices: NoticeBoard,
}

impl AppState {
    pub fn new(config: SimulationConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new(config.clone()))),
            notices: NoticeBoard::new(scheduler, NOTICE_TTL),
            config,
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DepositPayload {
    amount: Option<f64>,
    preset: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MonthPayload {
    month: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StateResponse {
    simulation: SimulationSnapshot,
    config: SimulationConfig,
    notice: Option<String>,
    score: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BalanceResponse {
    month: u32,
    balance: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CurveResponse {
    points: Vec<BalanceResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WithdrawResponse {
    outcome: WithdrawalOutcome,
    score: i64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/state", get(state_handler))
        .route("/api/deposit", post(deposit_handler))
        .route("/api/grow", post(grow_handler))
        .route("/api/month", post(month_handler))
        .route("/api/balance", get(balance_handler))
        .route("/api/curve", get(curve_handler))
        .route("/api/withdraw", post(withdraw_handler))
        .route("/api/reset", post(reset_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(port: u16, config: SimulationConfig) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(AppState::new(config, Arc::new(TokioScheduler)));

    let listener = TcpListener::bind(addr).await?;
    info!("compound HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/api/state");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn state_handler(State(state): State<AppState>) -> Response {
    json_response(StatusCode::OK, state_response(&state))
}

async fn deposit_handler(
    State(state): State<AppState>,
    Json(payload): Json<DepositPayload>,
) -> Response {
    let amount = match (payload.amount, payload.preset) {
        (Some(amount), _) => amount,
        (None, Some(index)) => match state.config.preset(index) {
            Some(amount) => amount,
            None => {
                return user_error(&state, &format!("Unknown deposit preset {index}"));
            }
        },
        (None, None) => return user_error(&state, "Please enter a deposit amount"),
    };

    let result = state.session().simulation.add_deposit(amount);
    match result {
        Ok(_) => json_response(StatusCode::OK, state_response(&state)),
        Err(err @ DepositError::NonPositiveAmount { .. }) => {
            user_error(&state, &format!("Please enter a valid amount: {err}"))
        }
        Err(err @ DepositError::WrongPhase { .. }) => phase_error(&err.to_string()),
    }
}

async fn grow_handler(State(state): State<AppState>) -> Response {
    let result = state.session().simulation.start_growing();
    match result {
        Ok(()) => json_response(StatusCode::OK, state_response(&state)),
        Err(err) => transition_error(&state, err),
    }
}

async fn month_handler(
    State(state): State<AppState>,
    Json(payload): Json<MonthPayload>,
) -> Response {
    let ready = state.session().ensure_growing();
    if let Err(err) = ready {
        return transition_error(&state, err);
    }

    let month = match payload.month {
        Some(month) => match validate_month(month, state.config.max_months) {
            Ok(month) => month,
            Err(msg) => return user_error(&state, &msg),
        },
        None => return user_error(&state, "month is required"),
    };

    let result = state.session().simulation.set_month(month);
    match result {
        Ok(()) => json_response(StatusCode::OK, state_response(&state)),
        Err(err) => transition_error(&state, err),
    }
}

async fn balance_handler(
    State(state): State<AppState>,
    Query(query): Query<MonthPayload>,
) -> Response {
    let session = state.session();
    let month = match query.month {
        Some(month) => match validate_month(month, state.config.max_months) {
            Ok(month) => month,
            Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
        },
        None => session.simulation.current_month(),
    };
    let balance = session.simulation.balance_at(month);
    json_response(StatusCode::OK, BalanceResponse { month, balance })
}

async fn curve_handler(State(state): State<AppState>) -> Response {
    let points = state
        .session()
        .simulation
        .growth_curve()
        .into_iter()
        .map(|(month, balance)| BalanceResponse { month, balance })
        .collect();
    json_response(StatusCode::OK, CurveResponse { points })
}

async fn withdraw_handler(
    State(state): State<AppState>,
    Json(payload): Json<MonthPayload>,
) -> Response {
    let result = {
        let mut session = state.session();
        if let Err(err) = session.ensure_growing() {
            drop(session);
            return transition_error(&state, err);
        }

        let month = match payload.month {
            Some(month) => match validate_month(month, state.config.max_months) {
                Ok(month) => month,
                Err(msg) => {
                    drop(session);
                    return user_error(&state, &msg);
                }
            },
            None => session.simulation.current_month(),
        };

        let Session { simulation, score } = &mut *session;
        simulation.withdraw_with(month, &mut |s: i64| {
            info!(score = s, "play-through complete");
            *score = Some(s);
        })
    };

    match result {
        Ok(outcome) => json_response(
            StatusCode::OK,
            WithdrawResponse {
                score: outcome.score_percent,
                outcome,
            },
        ),
        Err(err) => transition_error(&state, err),
    }
}

async fn reset_handler(State(state): State<AppState>) -> Response {
    *state.session() = Session::new(state.config.clone());
    info!("simulation reset");
    json_response(StatusCode::OK, state_response(&state))
}

fn validate_month(month: i64, max_months: u32) -> Result<u32, String> {
    u32::try_from(month)
        .ok()
        .filter(|m| *m <= max_months)
        .ok_or_else(|| format!("month must be between 0 and {max_months}"))
}

fn state_response(state: &AppState) -> StateResponse {
    let session = state.session();
    StateResponse {
        simulation: session.simulation.snapshot(),
        config: state.config.clone(),
        notice: state.notices.current(),
        score: session.score,
    }
}

fn transition_error(state: &AppState, err: TransitionError) -> Response {
    match err {
        TransitionError::NoDeposits => user_error(state, "Please make a deposit first"),
        TransitionError::WrongPhase { .. } => phase_error(&err.to_string()),
    }
}

fn user_error(state: &AppState, msg: &str) -> Response {
    state.notices.post(msg);
    error_response(StatusCode::BAD_REQUEST, msg)
}

fn phase_error(msg: &str) -> Response {
    warn!("rejected out-of-phase request: {msg}");
    error_response(StatusCode::CONFLICT, msg)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
