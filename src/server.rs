//! Axum HTTP server for the quiz front end.
//!
//! Every endpoint forwards to the shared [`GameSession`], which serializes the
//! state-changing ones.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Welcome text |
//! | GET | `/health` | Health check |
//! | GET | `/questions` | Current question and choices |
//! | POST | `/answer` | Judge an answer |
//! | GET | `/hints` | Hint availability |
//! | POST | `/hints/use` | Spend a hint |
//! | POST | `/timer/initialize` | Reset the countdown for the round |
//! | POST | `/timer/second_passed` | One second elapsed |
//! | GET | `/score` | Round, money and the round's prize |
//! | POST | `/game/restart` | Start a fresh game |

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::quiz::engine::{HintOutcome, Score, Verdict};
use crate::quiz::session::{GameSession, QuestionView};
use crate::quiz::source::QuestionSource;
use crate::quiz::{HintKind, Hints, QuizError};

pub type AppState<S> = Arc<GameSession<S>>;

pub fn create_router<S: QuestionSource>(session: AppState<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_welcome))
        .route("/health", get(handle_health_check::<S>))
        .route("/questions", get(handle_get_question::<S>))
        .route("/answer", post(handle_answer::<S>))
        .route("/hints", get(handle_get_hints::<S>))
        .route("/hints/use", post(handle_use_hint::<S>))
        .route("/timer/initialize", post(handle_initialize_timer::<S>))
        .route("/timer/second_passed", post(handle_second_passed::<S>))
        .route("/score", get(handle_get_score::<S>))
        .route("/game/restart", post(handle_restart::<S>))
        .layer(cors)
        .with_state(session)
}

// ── Request/Response types ──────────────────────────────────────────

#[derive(Deserialize)]
struct AnswerRequest {
    #[serde(alias = "userAnswer")]
    candidate: String,
}

#[derive(Deserialize)]
struct HintRequest {
    #[serde(rename = "type", alias = "kind")]
    kind: String,
}

#[derive(Serialize)]
struct AnswerResponse {
    #[serde(flatten)]
    verdict: Verdict,
    message: String,
}

#[derive(Serialize)]
struct HintsResponse {
    hints: Hints,
}

#[derive(Serialize)]
struct TimerResponse {
    time: i64,
}

#[derive(Serialize)]
struct TickResponse {
    time: i64,
    expired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl IntoResponse for QuizError {
    fn into_response(self) -> Response {
        let status = match &self {
            QuizError::SourceUnavailable(_) | QuizError::InsufficientQuestions { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            QuizError::InvalidOperation(_) => StatusCode::CONFLICT,
            QuizError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            QuizError::Config(_) | QuizError::IO(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "retryable": self.is_retryable(),
        }));
        (status, body).into_response()
    }
}

impl From<JsonRejection> for QuizError {
    fn from(rejection: JsonRejection) -> Self {
        QuizError::MalformedRequest(rejection.body_text())
    }
}

// ── GET handlers ────────────────────────────────────────────────────

async fn handle_welcome() -> &'static str {
    "Welcome to the Geography Quiz API"
}

async fn handle_health_check<S: QuestionSource>(
    State(session): State<AppState<S>>,
) -> Json<serde_json::Value> {
    let game = if session.is_active().await { "active" } else { "none" };
    Json(serde_json::json!({ "status": "OK", "game": game }))
}

async fn handle_get_question<S: QuestionSource>(
    State(session): State<AppState<S>>,
) -> Result<Json<QuestionView>, QuizError> {
    Ok(Json(session.current_question().await?))
}

async fn handle_get_hints<S: QuestionSource>(
    State(session): State<AppState<S>>,
) -> Result<Json<HintsResponse>, QuizError> {
    let hints = session.hints().await?;
    Ok(Json(HintsResponse { hints }))
}

async fn handle_get_score<S: QuestionSource>(
    State(session): State<AppState<S>>,
) -> Result<Json<Score>, QuizError> {
    Ok(Json(session.score().await?))
}

// ── POST handlers ───────────────────────────────────────────────────

async fn handle_answer<S: QuestionSource>(
    State(session): State<AppState<S>>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, QuizError> {
    let Json(req) = payload?;
    let verdict = session.submit_answer(&req.candidate).await?;
    let message = verdict.message();
    Ok(Json(AnswerResponse { verdict, message }))
}

async fn handle_use_hint<S: QuestionSource>(
    State(session): State<AppState<S>>,
    payload: Result<Json<HintRequest>, JsonRejection>,
) -> Result<Json<HintOutcome>, QuizError> {
    let Json(req) = payload?;
    let kind: HintKind = req.kind.parse()?;
    Ok(Json(session.use_hint(kind).await?))
}

async fn handle_initialize_timer<S: QuestionSource>(
    State(session): State<AppState<S>>,
) -> Result<Json<TimerResponse>, QuizError> {
    let seconds = session.initialize_timer().await?;
    Ok(Json(TimerResponse {
        time: i64::from(seconds),
    }))
}

async fn handle_second_passed<S: QuestionSource>(
    State(session): State<AppState<S>>,
) -> Result<Json<TickResponse>, QuizError> {
    let tick = session.tick().await?;
    Ok(Json(TickResponse {
        time: tick.remaining(),
        expired: tick.is_expired(),
        message: tick.message(),
    }))
}

async fn handle_restart<S: QuestionSource>(
    State(session): State<AppState<S>>,
) -> Result<Json<Score>, QuizError> {
    Ok(Json(session.start_game().await?))
}
