//! In-process backend for the integration tests
//!
//! Serves the collaboration endpoints from memory on an ephemeral port. The
//! signed-in user is taken from a `session=<user id>` cookie.

#![allow(dead_code)]

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{header::COOKIE, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use collab_panel::config::{ApiConfig, DisplayConfig, Labels};
use collab_panel::model::ProjectId;
use collab_panel::notify::NotificationLog;
use collab_panel::render::Renderer;
use collab_panel::surface::MemorySurface;
use collab_panel::{CollaborationPanel, HttpCollaborationApi};

pub const JOINED_AT: &str = "2024-05-01 09:30:00";

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
}

#[derive(Debug, Clone)]
pub struct Collaboration {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub permission: String,
}

#[derive(Debug, Default)]
pub struct Backend {
    users: Vec<User>,
    projects: Vec<Project>,
    collaborations: Vec<Collaboration>,
    next_collaboration_id: i64,
    requests: usize,
}

impl Backend {
    pub fn new() -> Self {
        Self {
            next_collaboration_id: 1,
            ..Default::default()
        }
    }

    pub fn user(mut self, id: i64, username: &str) -> Self {
        self.users.push(User {
            id,
            username: username.to_string(),
        });
        self
    }

    pub fn project(mut self, id: i64, name: &str, owner_id: i64) -> Self {
        self.projects.push(Project {
            id,
            name: name.to_string(),
            owner_id,
        });
        self
    }

    pub fn collaboration(mut self, project_id: i64, user_id: i64, permission: &str) -> Self {
        self.insert_collaboration(project_id, user_id, permission);
        self
    }

    fn insert_collaboration(&mut self, project_id: i64, user_id: i64, permission: &str) -> i64 {
        let id = self.next_collaboration_id;
        self.next_collaboration_id += 1;
        self.collaborations.push(Collaboration {
            id,
            project_id,
            user_id,
            permission: permission.to_string(),
        });
        id
    }

    fn username(&self, user_id: i64) -> String {
        self.users
            .iter()
            .find(|user| user.id == user_id)
            .map(|user| user.username.clone())
            .unwrap_or_default()
    }

    fn project_by_id(&self, project_id: i64) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == project_id)
    }

    fn is_collaborator(&self, project_id: i64, user_id: i64) -> bool {
        self.collaborations
            .iter()
            .any(|c| c.project_id == project_id && c.user_id == user_id)
    }

    /// Counts the request and resolves the session cookie
    fn authenticate(&mut self, headers: &HeaderMap) -> Result<i64, Response> {
        self.requests += 1;
        headers
            .get(COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|cookie| {
                cookie
                    .split(';')
                    .filter_map(|pair| pair.trim().strip_prefix("session="))
                    .find_map(|id| id.parse::<i64>().ok())
            })
            .filter(|id| self.users.iter().any(|user| user.id == *id))
            .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Please log in"))
    }
}

pub type SharedBackend = Arc<Mutex<Backend>>;

fn lock(state: &SharedBackend) -> MutexGuard<'_, Backend> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn valid_permission(permission: &str) -> bool {
    matches!(permission, "read" | "write")
}

async fn available_collaborators(
    State(state): State<SharedBackend>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut backend = lock(&state);
    let user_id = match backend.authenticate(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let project = params
        .get("project_id")
        .and_then(|id| id.parse::<i64>().ok())
        .and_then(|id| backend.project_by_id(id));

    let users: Vec<Value> = backend
        .users
        .iter()
        .filter(|user| user.id != user_id)
        .filter(|user| match project {
            Some(project) => {
                user.id != project.owner_id && !backend.is_collaborator(project.id, user.id)
            }
            None => true,
        })
        .map(|user| json!({ "id": user.id, "username": user.username, "created_at": JOINED_AT }))
        .collect();

    Json(users).into_response()
}

async fn list_collaborations(
    State(state): State<SharedBackend>,
    headers: HeaderMap,
    Path(project_id): Path<i64>,
) -> Response {
    let mut backend = lock(&state);
    let user_id = match backend.authenticate(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Some(project) = backend.project_by_id(project_id) else {
        return error(StatusCode::NOT_FOUND, "Project not found");
    };
    if project.owner_id != user_id && !backend.is_collaborator(project_id, user_id) {
        return error(StatusCode::FORBIDDEN, "No access to this project");
    }

    let collaborations: Vec<Value> = backend
        .collaborations
        .iter()
        .filter(|c| c.project_id == project_id)
        .map(|c| {
            json!({
                "id": c.id,
                "collaborator_id": c.user_id,
                "username": backend.username(c.user_id),
                "permission": c.permission,
                "created_at": JOINED_AT,
            })
        })
        .collect();

    Json(collaborations).into_response()
}

async fn add_collaboration(
    State(state): State<SharedBackend>,
    headers: HeaderMap,
    Path(project_id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = lock(&state);
    let user_id = match backend.authenticate(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let owner_id = match backend.project_by_id(project_id) {
        Some(project) => project.owner_id,
        None => return error(StatusCode::NOT_FOUND, "Project not found"),
    };
    if owner_id != user_id {
        return error(StatusCode::BAD_REQUEST, "Only the project owner can add collaborators");
    }

    let Some(collaborator_id) = body.get("collaborator_id").and_then(Value::as_i64) else {
        return error(StatusCode::BAD_REQUEST, "Please choose a collaborator");
    };
    let permission = body
        .get("permission")
        .and_then(Value::as_str)
        .unwrap_or("read")
        .to_string();
    if !valid_permission(&permission) {
        return error(StatusCode::BAD_REQUEST, "Invalid permission");
    }
    if !backend.users.iter().any(|user| user.id == collaborator_id) {
        return error(StatusCode::BAD_REQUEST, "User does not exist");
    }
    if collaborator_id == owner_id {
        return error(StatusCode::BAD_REQUEST, "The owner cannot be a collaborator");
    }
    if backend.is_collaborator(project_id, collaborator_id) {
        return error(StatusCode::BAD_REQUEST, "User is already a collaborator");
    }

    let id = backend.insert_collaboration(project_id, collaborator_id, &permission);
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Collaborator added", "collaboration_id": id })),
    )
        .into_response()
}

async fn remove_collaboration(
    State(state): State<SharedBackend>,
    headers: HeaderMap,
    Path((project_id, collaborator_id)): Path<(i64, i64)>,
) -> Response {
    let mut backend = lock(&state);
    let user_id = match backend.authenticate(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match backend.project_by_id(project_id) {
        Some(project) if project.owner_id == user_id => {}
        Some(_) => {
            return error(StatusCode::BAD_REQUEST, "Only the project owner can remove collaborators")
        }
        None => return error(StatusCode::NOT_FOUND, "Project not found"),
    }

    let before = backend.collaborations.len();
    backend
        .collaborations
        .retain(|c| !(c.project_id == project_id && c.user_id == collaborator_id));
    if backend.collaborations.len() == before {
        return error(StatusCode::BAD_REQUEST, "Collaboration does not exist");
    }
    message(StatusCode::OK, "Collaborator removed")
}

async fn update_permission(
    State(state): State<SharedBackend>,
    headers: HeaderMap,
    Path(collaboration_id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = lock(&state);
    let user_id = match backend.authenticate(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let permission = body
        .get("permission")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if !valid_permission(&permission) {
        return error(StatusCode::BAD_REQUEST, "Invalid permission");
    }

    let Some(project_id) = backend
        .collaborations
        .iter()
        .find(|c| c.id == collaboration_id)
        .map(|c| c.project_id)
    else {
        return error(StatusCode::BAD_REQUEST, "Collaboration does not exist");
    };
    if backend.project_by_id(project_id).map(|p| p.owner_id) != Some(user_id) {
        return error(StatusCode::BAD_REQUEST, "Only the project owner can change permissions");
    }

    if let Some(collaboration) = backend
        .collaborations
        .iter_mut()
        .find(|c| c.id == collaboration_id)
    {
        collaboration.permission = permission;
    }
    message(StatusCode::OK, "Permission updated")
}

async fn leave_collaboration(
    State(state): State<SharedBackend>,
    headers: HeaderMap,
    Path(project_id): Path<i64>,
) -> Response {
    let mut backend = lock(&state);
    let user_id = match backend.authenticate(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    if !backend.is_collaborator(project_id, user_id) {
        return error(StatusCode::FORBIDDEN, "You are not a collaborator of this project");
    }
    backend
        .collaborations
        .retain(|c| !(c.project_id == project_id && c.user_id == user_id));
    message(StatusCode::OK, "Left the project")
}

async fn collaborated_projects(
    State(state): State<SharedBackend>,
    headers: HeaderMap,
) -> Response {
    let mut backend = lock(&state);
    let user_id = match backend.authenticate(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let projects: Vec<Value> = backend
        .collaborations
        .iter()
        .filter(|c| c.user_id == user_id)
        .filter_map(|c| {
            backend.project_by_id(c.project_id).map(|project| {
                json!({
                    "id": project.id,
                    "name": project.name,
                    "owner_username": backend.username(project.owner_id),
                    "permission": c.permission,
                })
            })
        })
        .collect();

    Json(projects).into_response()
}

pub fn create_app(state: SharedBackend) -> Router {
    Router::new()
        .route("/api/available-collaborators", get(available_collaborators))
        .route(
            "/api/project/:project_id/collaborations",
            get(list_collaborations).post(add_collaboration),
        )
        .route(
            "/api/project/:project_id/collaborations/:collaborator_id",
            delete(remove_collaboration),
        )
        .route(
            "/api/project/collaborations/:collaboration_id/permission",
            put(update_permission),
        )
        .route(
            "/api/project/:project_id/collaboration/leave",
            delete(leave_collaboration),
        )
        .route("/api/collaborated-projects", get(collaborated_projects))
        .with_state(state)
}

pub struct TestBackend {
    pub base_url: String,
    state: SharedBackend,
}

impl TestBackend {
    pub async fn spawn(backend: Backend) -> Result<Self> {
        let state = Arc::new(Mutex::new(backend));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;

        let app = create_app(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{}", address),
            state,
        })
    }

    pub fn requests(&self) -> usize {
        lock(&self.state).requests
    }

    pub fn collaborations(&self) -> Vec<Collaboration> {
        lock(&self.state).collaborations.clone()
    }

    pub fn collaboration_id(&self, project_id: i64, user_id: i64) -> Option<i64> {
        self.collaborations()
            .into_iter()
            .find(|c| c.project_id == project_id && c.user_id == user_id)
            .map(|c| c.id)
    }
}

/// Address nothing listens on
pub async fn unreachable_url() -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}", address))
}

pub fn api(base_url: &str, session_user: Option<i64>) -> Result<HttpCollaborationApi> {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        session_cookie: session_user.map(|id| format!("session={}", id)),
        ..Default::default()
    };
    Ok(HttpCollaborationApi::new(&config)?)
}

pub struct Harness {
    pub panel: CollaborationPanel,
    pub surface: Arc<MemorySurface>,
    pub notifications: Arc<NotificationLog>,
}

pub fn panel(base_url: &str, project_id: i64, session_user: Option<i64>) -> Result<Harness> {
    panel_on(base_url, project_id, session_user, Arc::new(MemorySurface::new()))
}

/// Panel writing into an existing surface
pub fn panel_on(
    base_url: &str,
    project_id: i64,
    session_user: Option<i64>,
    surface: Arc<MemorySurface>,
) -> Result<Harness> {
    let notifications = Arc::new(NotificationLog::new());
    let renderer = Renderer::new(Labels::default(), &DisplayConfig::default())?;
    let panel = CollaborationPanel::new(
        ProjectId::new(project_id)?,
        Arc::new(api(base_url, session_user)?),
        surface.clone(),
        renderer,
    )
    .with_notifier(notifications.clone());

    Ok(Harness {
        panel,
        surface,
        notifications,
    })
}

pub fn row_count(html: &str) -> usize {
    html.matches(r#"class="collaborator-item""#).count()
}
