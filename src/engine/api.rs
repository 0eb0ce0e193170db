use super::card::{CardId, Color};
use super::error::GameError;
use super::game::GameState;
use super::player::PlayerId;
use super::profile::UserProfile;
use super::room::{Applied, RoomRegistry};
use super::session::{RoomCode, RoomStore, RoomSummary};
use crate::config::ServerConfig;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

#[derive(Clone)]
pub struct AppState {
    registry: Arc<RoomRegistry>,
}

impl AppState {
    pub fn new(registry: RoomRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    username: String,
}

fn default_max_players() -> usize {
    4
}

#[derive(Deserialize)]
pub struct CreateRoomRequest {
    name: String,
    #[serde(default = "default_max_players")]
    max_players: usize,
    host_id: PlayerId,
}

#[derive(Deserialize)]
pub struct JoinRoomRequest {
    player_id: PlayerId,
}

#[derive(Deserialize)]
pub struct StartGameRequest {
    #[serde(default)]
    player_ids: Vec<PlayerId>,
}

#[derive(Deserialize)]
pub struct PlayCardRequest {
    player_id: PlayerId,
    card_id: CardId,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Deserialize)]
pub struct DrawCardRequest {
    player_id: PlayerId,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    error: String,
    message: String,
}

fn status_for(err: &GameError) -> StatusCode {
    match err {
        GameError::UnknownRoom | GameError::UnknownPlayer | GameError::UnknownProfile => {
            StatusCode::NOT_FOUND
        }
        GameError::NotYourTurn
        | GameError::GameNotStarted
        | GameError::GameAlreadyStarted
        | GameError::GameOver
        | GameError::RoomFull
        | GameError::DeckExhausted => StatusCode::CONFLICT,
        GameError::IllegalPlay
        | GameError::InvalidColorChoice
        | GameError::CardNotInHand
        | GameError::NotEnoughPlayers
        | GameError::TooManyPlayers
        | GameError::DuplicatePlayer
        | GameError::InsufficientCards => StatusCode::UNPROCESSABLE_ENTITY,
        GameError::InvalidRoomName | GameError::InvalidUsername => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
        };
        (status_for(&self), Json(body)).into_response()
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>), GameError> {
    let profile = state.registry.register(&req.username)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>, GameError> {
    let profile = state.registry.profiles().get(&PlayerId::new(id))?;
    Ok(Json(profile))
}

pub async fn create_room(
    State(state): State<AppState>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomSummary>), GameError> {
    info!("Creating room {:?} for {}", req.name, req.host_id);
    let room = state
        .registry
        .create_room(&req.name, req.max_players, &req.host_id)
        .inspect_err(|e| info!("Failed to create room: {}", e))?;
    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomSummary>> {
    let rooms = state.registry.list_rooms();
    info!("Found {} rooms", rooms.len());
    Json(rooms)
}

pub async fn get_room(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<RoomSummary>, GameError> {
    let code = RoomCode::parse(&code)?;
    Ok(Json(state.registry.room_summary(&code)?))
}

pub async fn delete_room(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, GameError> {
    let code = RoomCode::parse(&code)?;
    state.registry.close_room(&code)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn join_room(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<JoinRoomRequest>,
) -> Result<Json<RoomSummary>, GameError> {
    let code = RoomCode::parse(&code)?;
    let room = state
        .registry
        .join_room(&code, &req.player_id)
        .inspect_err(|e| info!("{} could not join {}: {}", req.player_id, code, e))?;
    Ok(Json(room))
}

pub async fn start_game(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<StartGameRequest>,
) -> Result<Json<GameState>, GameError> {
    let code = RoomCode::parse(&code)?;
    let game = state
        .registry
        .start_game(&code, &req.player_ids)
        .inspect_err(|e| info!("Failed to start game in {}: {}", code, e))?;
    Ok(Json(game))
}

pub async fn get_game_state(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<GameState>, GameError> {
    let code = RoomCode::parse(&code)?;
    Ok(Json(state.registry.get_state(&code)?))
}

/// A color the client named, if it names one. Non-wild cards ignore the
/// color, and a wild card without a usable one is rejected by the engine.
fn requested_color(raw: Option<&str>) -> Option<Color> {
    raw.and_then(|name| name.parse().ok())
}

pub async fn play_card(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<PlayCardRequest>,
) -> Result<Json<Applied>, GameError> {
    let code = RoomCode::parse(&code)?;
    info!("{} plays card {} in room {}", req.player_id, req.card_id, code);

    let color = requested_color(req.color.as_deref());
    let applied = state
        .registry
        .play_card(&code, &req.player_id, req.card_id, color)
        .inspect_err(|e| info!("Rejected play in {}: {}", code, e))?;
    Ok(Json(applied))
}

pub async fn draw_card(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<DrawCardRequest>,
) -> Result<Json<Applied>, GameError> {
    let code = RoomCode::parse(&code)?;
    info!("{} draws in room {}", req.player_id, code);
    let applied = state
        .registry
        .draw_card(&code, &req.player_id)
        .inspect_err(|e| info!("Rejected draw in {}: {}", code, e))?;
    Ok(Json(applied))
}

/// Called by whatever owns the turn timer when the current player idles out.
pub async fn turn_timeout(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Applied>, GameError> {
    let code = RoomCode::parse(&code)?;
    info!("Turn timed out in room {}", code);
    Ok(Json(state.registry.force_draw(&code)?))
}

pub fn router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().include_headers(true))
        .on_response(DefaultOnResponse::new().level(tracing::Level::INFO));

    Router::new()
        .route("/profiles", post(register))
        .route("/profiles/{id}", get(get_profile))
        .route("/rooms", post(create_room).get(list_rooms))
        .route("/rooms/{code}", get(get_room).delete(delete_room))
        .route("/rooms/{code}/join", post(join_room))
        .route("/rooms/{code}/start", post(start_game))
        .route("/rooms/{code}/state", get(get_game_state))
        .route("/rooms/{code}/play", post(play_card))
        .route("/rooms/{code}/draw", post(draw_card))
        .route("/rooms/{code}/timeout", post(turn_timeout))
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_api_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting room server...");

    let store = RoomStore::new(config.data_dir.clone()).inspect_err(|e| {
        error!(
            "Failed to open room store at {}: {}",
            config.data_dir.display(),
            e
        )
    })?;
    let registry = RoomRegistry::with_store(store)?.with_seed(config.seed);
    let app = router(AppState::new(registry));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("API server running on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
