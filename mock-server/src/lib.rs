use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Completed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

impl Todo {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            status: Status::Pending,
            created_at: Utc::now(),
        }
    }
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Edits title and description only; status moves through `/toggle`.
#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Insertion-ordered so list responses are stable.
pub type Db = Arc<RwLock<Vec<Todo>>>;

#[derive(Serialize)]
struct Message {
    message: String,
}

fn reject(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(Message {
            message: message.to_string(),
        }),
    )
        .into_response()
}

pub fn app() -> Router {
    app_with(Db::default())
}

/// Router over a caller-owned store, so tests can seed and inspect it.
pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/api/todos", get(list_todos).post(create_todo))
        .route(
            "/api/todos/{id}",
            get(get_todo).patch(update_todo).delete(delete_todo),
        )
        .route("/api/todos/{id}/toggle", patch(toggle_todo))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_todos(State(db): State<Db>) -> Json<Vec<Todo>> {
    let todos = db.read().await;
    Json(todos.clone())
}

async fn create_todo(State(db): State<Db>, Json(input): Json<CreateTodo>) -> Response {
    if input.title.trim().is_empty() {
        return reject(StatusCode::BAD_REQUEST, "title is required");
    }
    let todo = Todo::new(input.title, input.description);
    tracing::info!(id = %todo.id, "created todo");
    db.write().await.push(todo.clone());
    (StatusCode::CREATED, Json(todo)).into_response()
}

async fn get_todo(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Todo>, Response> {
    let todos = db.read().await;
    todos
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "todo not found"))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, Response> {
    if input.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(reject(StatusCode::BAD_REQUEST, "title is required"));
    }
    let mut todos = db.write().await;
    let todo = todos
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "todo not found"))?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(description) = input.description {
        todo.description = description;
    }
    Ok(Json(todo.clone()))
}

async fn toggle_todo(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Todo>, Response> {
    let mut todos = db.write().await;
    let todo = todos
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "todo not found"))?;
    todo.status = match todo.status {
        Status::Pending => Status::Completed,
        Status::Completed => Status::Pending,
    };
    Ok(Json(todo.clone()))
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<String>) -> Result<StatusCode, Response> {
    let mut todos = db.write().await;
    let index = todos
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "todo not found"))?;
    todos.remove(index);
    tracing::info!(%id, "deleted todo");
    Ok(StatusCode::NO_CONTENT)
}
