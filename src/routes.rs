use std::sync::Arc;

use axum::{
    extract::{FromRequest, Path, Request, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{de::IgnoredAny, Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::AppError,
    models::{Todo, TodoId},
    repository::TodoRepository,
};

// === App State ===
#[derive(Clone)]
pub struct AppState {
    todos: Arc<dyn TodoRepository>,
}
impl AppState {
    pub fn new(todos: Arc<dyn TodoRepository>) -> Self {
        Self { todos }
    }
}

/// `Json` body extractor whose rejections use the `{error}` envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
struct JsonBody<T>(T);

pub fn router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        let uri = request.uri().to_string();
        tracing::info_span!("http_request", method = ?request.method(), uri)
    });

    Router::new()
        .route("/health", get(health))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/:id", put(update_todo).delete(delete_todo))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// === Routes ===
async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, AppError> {
    let todos = state.todos.list().await?;
    Ok(Json(todos))
}

#[derive(Deserialize)]
struct CreateTodo {
    #[serde(default)]
    task: Option<String>,
}
async fn create_todo(
    State(state): State<AppState>,
    JsonBody(CreateTodo { task }): JsonBody<CreateTodo>,
) -> Result<Json<Todo>, AppError> {
    let task = task
        .filter(|task| !task.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Task is required".to_string()))?;
    let todo = state.todos.create(task).await?;
    tracing::debug!(id = %todo.id, "created todo");
    Ok(Json(todo))
}

/// Anything a client may send as `completed`. Booleans pass through,
/// `1`/`0` and the strings `true`/`false`/`1`/`0`/`yes`/`no` are coerced,
/// the rest fails to cast.
#[derive(Deserialize)]
#[serde(untagged)]
enum CompletedValue {
    Flag(bool),
    Number(i64),
    Text(String),
    Other(IgnoredAny),
}
impl CompletedValue {
    fn cast(self) -> Result<bool, AppError> {
        let value = match self {
            CompletedValue::Flag(flag) => return Ok(flag),
            CompletedValue::Number(1) => return Ok(true),
            CompletedValue::Number(0) => return Ok(false),
            CompletedValue::Number(number) => number.to_string(),
            CompletedValue::Text(text) => match text.as_str() {
                "true" | "1" | "yes" => return Ok(true),
                "false" | "0" | "no" => return Ok(false),
                _ => format!("{:?}", text),
            },
            CompletedValue::Other(_) => "of unsupported type".to_string(),
        };
        Err(AppError::Cast {
            path: "completed",
            expected: "Boolean",
            value,
        })
    }
}

#[derive(Deserialize)]
struct UpdateTodo {
    #[serde(default)]
    completed: Option<CompletedValue>,
}
async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(UpdateTodo { completed }): JsonBody<UpdateTodo>,
) -> Result<Json<Todo>, AppError> {
    // an id the store could never have issued cannot match a todo
    let id = id.parse::<TodoId>().map_err(|_| AppError::NotFound)?;
    let todo = match completed {
        Some(value) => {
            let completed = value.cast()?;
            state.todos.set_completed(id, completed).await?
        }
        // nothing to change
        None => state.todos.find(id).await?,
    };
    Ok(Json(todo.ok_or(AppError::NotFound)?))
}

#[derive(Serialize)]
struct Deleted {
    message: &'static str,
}
async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, AppError> {
    let id = id.parse::<TodoId>().map_err(|_| AppError::NotFound)?;
    state.todos.delete(id).await?.ok_or(AppError::NotFound)?;
    tracing::debug!(%id, "deleted todo");
    Ok(Json(Deleted { message: "Deleted" }))
}
