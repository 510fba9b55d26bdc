//! Tic-tac-toe Web API
//!
//! Backend for a single browser page. The page posts each cell click to
//! `/move` and redraws from the returned state; game-over messages are
//! delivered in the response instead of a blocking dialog.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tictactoe_core::{Game, GameObserver, GameOver, MoveResult, Player};

// =============================================================================
// Configuration
// =============================================================================

/// Tic-tac-toe backend for the browser front end
#[derive(Parser, Debug)]
#[command(name = "tictactoe-api", version)]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind to
    #[arg(short, long, default_value_t = 8000)]
    port: u16,
}

// =============================================================================
// Session State
// =============================================================================

/// Keeps the latest message for the page to display.
#[derive(Debug, Default)]
struct MessageBoard {
    last_message: Option<String>,
}

impl GameObserver for MessageBoard {
    fn on_turn(&mut self, _next: Player) {
        self.last_message = None;
    }

    fn on_game_over(&mut self, result: GameOver) {
        info!(message = %result.message(), "game finished");
        self.last_message = Some(result.message());
    }
}

/// Shared application state
struct AppStateInner {
    game: Mutex<Game<MessageBoard>>,
}

impl AppStateInner {
    fn new() -> Self {
        Self {
            game: Mutex::new(Game::with_observer(MessageBoard::default())),
        }
    }

    fn game(&self) -> MutexGuard<'_, Game<MessageBoard>> {
        self.game.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

type AppState = Arc<AppStateInner>;

// =============================================================================
// JSON Models
// =============================================================================

#[derive(Serialize, Deserialize, Debug)]
struct GameStateModel {
    /// Marks by row, `null` for an empty cell
    board: Vec<Vec<Option<String>>>,
    current_player: u8,
    current_mark: String,
    turn_label: String,
    move_count: u8,
    /// Message about the game that just ended, if the last move ended one
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Deserialize)]
struct MoveRequest {
    row: u8,
    col: u8,
}

#[derive(Serialize, Deserialize, Debug)]
struct MoveResponse {
    /// `null` when the cell was already marked and the click was ignored
    result: Option<MoveResult>,
    state: GameStateModel,
}

#[derive(Serialize)]
struct HealthModel {
    status: String,
}

#[derive(Serialize, Deserialize, Debug)]
struct ErrorModel {
    detail: String,
}

type ApiError = (StatusCode, Json<ErrorModel>);

// =============================================================================
// Conversion Functions
// =============================================================================

/// Convert Game to JSON-serializable GameStateModel
fn game_to_model(game: &Game<MessageBoard>) -> GameStateModel {
    let board = game
        .board()
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.map(|player| player.mark().to_string()))
                .collect()
        })
        .collect();

    let player = game.current_player();
    GameStateModel {
        board,
        current_player: player as u8,
        current_mark: player.mark().to_string(),
        turn_label: game.turn_label(),
        move_count: game.engine().move_count(),
        message: game.observer().last_message.clone(),
    }
}

// =============================================================================
// API Endpoints
// =============================================================================

async fn get_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let game = state.game();
    Json(game_to_model(&game))
}

async fn make_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let mut game = state.game();

    let result = game.select(req.row, req.col).map_err(|e| {
        warn!(row = req.row, col = req.col, "rejected move: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorModel {
                detail: e.to_string(),
            }),
        )
    })?;

    Ok(Json(MoveResponse {
        result,
        state: game_to_model(&game),
    }))
}

async fn reset_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let mut game = state.game();
    game.new_game();
    game.observer_mut().last_message = None;
    Json(game_to_model(&game))
}

async fn health() -> Json<HealthModel> {
    Json(HealthModel {
        status: "ok".to_string(),
    })
}

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/game", get(get_game))
        .route("/move", post(make_move))
        .route("/reset", post(reset_game))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let state: AppState = Arc::new(AppStateInner::new());

    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port)).await?;
    info!(addr = %listener.local_addr()?, "tic-tac-toe API running");
    axum::serve(listener, app(state)).await?;

    Ok(())
}
