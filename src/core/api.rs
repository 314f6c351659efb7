//! HTTP + WebSocket API for Blink Stop
//!
//! Hosts the remote leaderboard document store and an HTTP-driven session
//! surface so a thin front-end can run the game against this engine.
//!
//! Endpoints:
//! - GET  /health - Health check
//! - POST /session/new - Create session (enters calibration)
//! - GET  /session/{id} - Get session status
//! - POST /session/{id}/sample - Push one EAR sample (null = no face)
//! - DELETE /session/{id} - Tear the session down
//! - GET  /leaderboard/{mode}?count=N - Top entries for a mode
//! - POST /leaderboard/{mode} - Append a score
//! - WS   /ws/{id} - Live updates

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, RwLock};

use crate::core::{
    BlinkClassifier, CalibrationController, GameEngine, MemoryRemote, RemoteLeaderboard,
    SessionConfig,
};
use crate::types::{CalibrationProgress, Entry, GameMode, GamePhase, SessionOutcome};
use crate::{CALIBRATION_WINDOW_SECS, DEFAULT_REMOTE_FETCH_COUNT};

/// Service configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Calibration window for HTTP-driven sessions
    pub calibration_window: Duration,
    /// Game tuning for HTTP-driven sessions
    pub session: SessionConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            calibration_window: Duration::from_secs_f64(CALIBRATION_WINDOW_SECS),
            session: SessionConfig::default(),
        }
    }
}

/// One HTTP-driven game session
struct ApiSession {
    engine: GameEngine,
    classifier: BlinkClassifier,
    calibration: CalibrationController,
    last_outcome: Option<SessionOutcome>,
    update_tx: broadcast::Sender<SessionUpdate>,
}

/// Live update message
#[derive(Debug, Clone, Serialize)]
pub struct SessionUpdate {
    pub phase: GamePhase,
    pub ear: f64,
    pub is_blinking: bool,
    pub elapsed_secs: Option<f64>,
    pub game_over: bool,
}

/// App state
pub struct AppState {
    sessions: RwLock<HashMap<String, ApiSession>>,
    board: MemoryRemote,
    config: ApiConfig,
}

#[derive(Debug, Deserialize)]
pub struct NewSessionRequest {
    pub mode: GameMode,
    pub target_secs: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
    pub phase: GamePhase,
}

#[derive(Debug, Deserialize)]
pub struct SampleRequest {
    /// Average EAR for this tick; absent/null means no face was detected
    pub ear: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SampleResponse {
    pub phase: GamePhase,
    pub ear: f64,
    pub is_blinking: bool,
    pub elapsed_secs: Option<f64>,
    pub calibration: Option<CalibrationProgress>,
    pub outcome: Option<SessionOutcome>,
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub phase: GamePhase,
    pub mode: Option<GameMode>,
    pub threshold: f64,
    pub elapsed_secs: Option<f64>,
    pub face_missing_frames: u32,
    pub outcome: Option<SessionOutcome>,
}

#[derive(Debug, Deserialize)]
pub struct SaveScoreRequest {
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct SaveScoreResponse {
    pub saved: bool,
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Create the API router
pub fn create_router(config: ApiConfig) -> Router {
    let state = Arc::new(AppState {
        sessions: RwLock::new(HashMap::new()),
        board: MemoryRemote::new(),
        config,
    });

    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session).delete(delete_session))
        .route("/session/:id/sample", post(push_sample))
        .route("/leaderboard/:mode", get(leaderboard_top).post(save_score))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create a new session and enter calibration. Camera acquisition happens
/// on the client side of this boundary; a client that failed to get a
/// camera never creates a session.
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewSessionRequest>,
) -> Result<Json<NewSessionResponse>, StatusCode> {
    let now = Instant::now();
    let session_id = generate_session_id();
    let (tx, _) = broadcast::channel(100);

    let mut engine = GameEngine::with_config(state.config.session.clone());
    engine
        .start_session(req.mode, req.target_secs, Ok(()), now)
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;

    let mut calibration = CalibrationController::with_window(state.config.calibration_window);
    calibration.start(now);

    let session = ApiSession {
        engine,
        classifier: BlinkClassifier::new(),
        calibration,
        last_outcome: None,
        update_tx: tx,
    };

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), session);

    Ok(Json(NewSessionResponse {
        session_id: session_id.clone(),
        websocket_url: format!("/ws/{}", session_id),
        phase: GamePhase::Calibrating,
    }))
}

/// Get session status
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(SessionStatusResponse {
        session_id: id,
        phase: session.engine.phase(),
        mode: session.engine.mode(),
        threshold: session.classifier.threshold(),
        elapsed_secs: session.engine.elapsed_secs(Instant::now()),
        face_missing_frames: session.engine.face_missing_frames(),
        outcome: session.last_outcome.clone(),
    }))
}

/// Push one EAR sample through the session pipeline
async fn push_sample(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SampleRequest>,
) -> Result<Json<SampleResponse>, StatusCode> {
    let now = Instant::now();
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    let mut calibration_progress = None;
    let mut report_ear = req.ear.unwrap_or(0.0);
    let mut is_blinking = false;
    let mut outcome = None;

    match session.engine.phase() {
        GamePhase::Calibrating => {
            if let Some(ear) = req.ear {
                session.calibration.sample(ear);
            }
            let progress = session.calibration.tick(now);
            if progress.done {
                if let Some(threshold) = session.calibration.finish() {
                    session.classifier.set_threshold(threshold);
                }
                session.classifier.reset_state();
                session.engine.begin_play(now);
            }
            calibration_progress = Some(progress);
        }
        GamePhase::Playing | GamePhase::Endurance => {
            let report = session.classifier.observe_ear(req.ear);
            report_ear = report.ear;
            is_blinking = report.is_blinking;
            outcome = session.engine.on_frame(&report, req.ear.is_some(), now);
            if let Some(ref o) = outcome {
                session.last_outcome = Some(o.clone());
            }
        }
        _ => {}
    }

    let phase = session.engine.phase();
    let elapsed_secs = session.engine.elapsed_secs(now);

    let update = SessionUpdate {
        phase,
        ear: report_ear,
        is_blinking,
        elapsed_secs,
        game_over: phase == GamePhase::GameOver,
    };
    let _ = session.update_tx.send(update);

    Ok(Json(SampleResponse {
        phase,
        ear: report_ear,
        is_blinking,
        elapsed_secs,
        calibration: calibration_progress,
        outcome,
    }))
}

/// Tear a session down (GAME_OVER -> MENU on the client)
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let mut sessions = state.sessions.write().await;
    sessions.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Top entries for a mode
async fn leaderboard_top(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
    Query(query): Query<TopQuery>,
) -> Result<Json<Vec<Entry>>, StatusCode> {
    let mode = GameMode::parse(&mode).ok_or(StatusCode::BAD_REQUEST)?;
    let count = query.count.unwrap_or(DEFAULT_REMOTE_FETCH_COUNT);
    Ok(Json(state.board.fetch_top(mode, count).await))
}

/// Append a score to a mode's collection
async fn save_score(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
    Json(req): Json<SaveScoreRequest>,
) -> Result<Json<SaveScoreResponse>, StatusCode> {
    let mode = GameMode::parse(&mode).ok_or(StatusCode::BAD_REQUEST)?;
    let saved = state.board.save(mode, req.score, &req.name).await;
    Ok(Json(SaveScoreResponse { saved }))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = session.update_tx.subscribe();
    drop(sessions);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Forward session updates until either side goes away
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<SessionUpdate>) {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            update = rx.recv() => {
                let Ok(update) = update else { break };
                let json = serde_json::to_string(&update).unwrap_or_default();
                if sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            msg = receiver.next() => {
                match msg {
                    None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                    _ => {}
                }
            }
        }
    }
}

/// Generate session ID
fn generate_session_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("session_{:x}", nanos as u64)
}

/// Run the API server
pub async fn run_server(addr: &str, config: ApiConfig) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("👁 Blink Stop API running on {}", addr);
    println!("  POST   /session/new        - Create session");
    println!("  GET    /session/:id        - Get status");
    println!("  POST   /session/:id/sample - Push an EAR sample");
    println!("  DELETE /session/:id        - Tear down");
    println!("  GET    /leaderboard/:mode  - Top entries");
    println!("  POST   /leaderboard/:mode  - Append a score");
    println!("  WS     /ws/:id             - Live updates");
    println!("  GET    /health             - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
