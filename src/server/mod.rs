//! Local HTTP JSON API over the persisted document.
//!
//! Every endpoint is a whole-document read or read-modify-write; there are
//! no partial updates at the persistence layer. Session commands delegate
//! to the [`SessionTracker`], task and note endpoints edit the document
//! directly.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use log::{error, info};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, task::JoinHandle};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::{ActiveSession, Note, Stats, Task, TaskPriority, TaskStatus, TaskTag, UserProfile},
    store::DataStore,
    tracker::{Reconciler, SessionTracker, SystemClock, TimerView},
};

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    store: Arc<DataStore>,
    tracker: Arc<SessionTracker<Arc<DataStore>, SystemClock>>,
    reconciler: Arc<Reconciler>,
}

impl AppState {
    /// Wire the tracker and reconciler up against `store`. Must be called
    /// from within a tokio runtime; the reconciler spawns its tasks
    /// immediately.
    pub fn new(store: Arc<DataStore>, poll_interval: Duration) -> Self {
        let tracker = Arc::new(SessionTracker::new(store.clone(), SystemClock));
        let reconciler = Arc::new(Reconciler::spawn(
            tracker.clone(),
            poll_interval,
            Duration::from_secs(1),
        ));

        Self {
            store,
            tracker,
            reconciler,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(..) => StatusCode::NOT_FOUND,
            Error::Store(_) | Error::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {self}");
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/session", get(get_session))
        .route("/session/start", post(start_session))
        .route("/session/pause", post(pause_session))
        .route("/session/resume", post(resume_session))
        .route("/session/stop", post(stop_session))
        .route("/session/complete", post(complete_session))
        .route("/session/view", get(session_view))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", axum::routing::patch(update_task).delete(delete_task))
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/{id}", axum::routing::patch(update_note).delete(delete_note))
        .route("/user", get(get_user))
        .route("/stats", get(get_stats))
        .with_state(state)
}

// --- session ---

#[derive(Debug, Deserialize)]
struct StartRequest {
    /// Session length in minutes.
    duration: i64,
}

async fn get_session(State(state): State<AppState>) -> Json<Option<ActiveSession>> {
    Json(state.tracker.get_state())
}

async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartRequest>,
) -> Result<(StatusCode, Json<ActiveSession>)> {
    let session = state.tracker.start(req.duration)?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn pause_session(State(state): State<AppState>) -> Result<StatusCode> {
    state.tracker.pause()?;
    Ok(StatusCode::NO_CONTENT)
}

async fn resume_session(State(state): State<AppState>) -> Result<StatusCode> {
    state.tracker.resume()?;
    Ok(StatusCode::NO_CONTENT)
}

async fn stop_session(State(state): State<AppState>) -> Result<StatusCode> {
    state.tracker.stop()?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct CompleteRequest {
    duration: i64,
}

/// Record a finished countdown. Clients call this when their local clock
/// says the session ran to zero.
async fn complete_session(
    State(state): State<AppState>,
    Json(req): Json<CompleteRequest>,
) -> Result<StatusCode> {
    state.store.update(|doc| doc.stats.tasks_completed += 1)?;
    info!("Session completed: {}m", req.duration);
    Ok(StatusCode::NO_CONTENT)
}

/// The daemon-side reconciled countdown, for clients that do not want to
/// run their own ticker.
async fn session_view(State(state): State<AppState>) -> Json<TimerView> {
    Json(state.reconciler.view())
}

// --- tasks ---

#[derive(Debug, Deserialize)]
struct CreateTaskRequest {
    title: String,
    tag: TaskTag,
    #[serde(default)]
    priority: Option<TaskPriority>,
}

#[derive(Debug, Deserialize)]
struct UpdateTaskRequest {
    status: TaskStatus,
}

async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    Json(state.store.snapshot().tasks)
}

async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>)> {
    let task = Task::new(
        req.title,
        req.tag,
        req.priority.unwrap_or_default(),
        Utc::now(),
    );

    // Newest first, matching the display order.
    state.store.update(|doc| doc.tasks.insert(0, task.clone()))?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>> {
    let updated = state.store.update_if(|doc| {
        let task = doc.tasks.iter_mut().find(|t| t.id == id)?;
        task.status = req.status;
        let snapshot = task.clone();
        if req.status == TaskStatus::Done {
            doc.stats.tasks_completed += 1;
        }
        Some(snapshot)
    })?;

    updated.map(Json).ok_or(Error::NotFound("task", id))
}

async fn delete_task(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    let removed = state.store.update_if(|doc| {
        let before = doc.tasks.len();
        doc.tasks.retain(|t| t.id != id);
        (doc.tasks.len() != before).then_some(())
    })?;

    match removed {
        Some(()) => Ok(StatusCode::NO_CONTENT),
        None => Err(Error::NotFound("task", id)),
    }
}

// --- notes ---

#[derive(Debug, Deserialize)]
struct UpdateNoteRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

async fn list_notes(State(state): State<AppState>) -> Json<Vec<Note>> {
    Json(state.store.snapshot().notes)
}

async fn create_note(State(state): State<AppState>) -> Result<(StatusCode, Json<Note>)> {
    let note = Note::untitled(Utc::now());
    state.store.update(|doc| doc.notes.insert(0, note.clone()))?;
    Ok((StatusCode::CREATED, Json(note)))
}

async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<Json<Note>> {
    let updated = state.store.update_if(|doc| {
        let note = doc.notes.iter_mut().find(|n| n.id == id)?;
        if let Some(title) = req.title {
            note.title = title;
        }
        if let Some(content) = req.content {
            note.content = content;
        }
        note.updated_at = Utc::now();
        Some(note.clone())
    })?;

    updated.map(Json).ok_or(Error::NotFound("note", id))
}

async fn delete_note(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    let removed = state.store.update_if(|doc| {
        let before = doc.notes.len();
        doc.notes.retain(|n| n.id != id);
        (doc.notes.len() != before).then_some(())
    })?;

    match removed {
        Some(()) => Ok(StatusCode::NO_CONTENT),
        None => Err(Error::NotFound("note", id)),
    }
}

// --- profile ---

async fn get_user(State(state): State<AppState>) -> Json<UserProfile> {
    Json(state.store.snapshot().user)
}

async fn get_stats(State(state): State<AppState>) -> Json<Stats> {
    Json(state.store.snapshot().stats)
}

/// Running HTTP server handle.
pub struct Server {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl Server {
    /// Bind to `{host}:{port}` (port 0 auto-assigns) and serve in a
    /// background task.
    pub async fn start(state: AppState, host: &str, port: u16) -> Result<Self> {
        let app = router(state);
        let listener = TcpListener::bind(format!("{host}:{port}")).await?;
        let addr = listener.local_addr()?;

        info!("Dashboard API listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                error!("HTTP server error: {err}");
            }
        });

        Ok(Self { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown(&self) {
        self.handle.abort();
    }
}
