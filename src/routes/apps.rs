use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::audit::Stamp;
use crate::db::repo::{self, View};
use crate::error::AppError;
use crate::models::{App, AppDetail, EnvironmentVariable, Project};
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub include_deleted: bool,
}

impl ListParams {
    pub fn view(&self) -> View {
        View::including_deleted(self.include_deleted)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub hard: bool,
}

pub async fn list_by_project(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(project_id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<App>>, AppError> {
    repo::find::<Project, _>(&state.pool, project_id, View::Alive)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    let apps =
        repo::list_by::<App, _>(&state.pool, "project_id", project_id, params.view()).await?;
    Ok(Json(apps))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<Json<AppDetail>, AppError> {
    let app = repo::find::<App, _>(&state.pool, id, params.view())
        .await?
        .ok_or_else(|| AppError::NotFound("App not found".to_string()))?;

    let environment_variables = db::apps::variables_for(&state.pool, &app).await?;
    Ok(Json(AppDetail {
        app,
        environment_variables,
    }))
}

pub async fn list_variables(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<EnvironmentVariable>>, AppError> {
    let app = repo::find::<App, _>(&state.pool, id, View::Alive)
        .await?
        .ok_or_else(|| AppError::NotFound("App not found".to_string()))?;

    let variables = db::apps::variables_for(&state.pool, &app).await?;
    Ok(Json(variables))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = if params.hard {
        db::apps::hard_delete(&state.pool, id).await?
    } else {
        db::apps::soft_delete(&state.pool, id, &Stamp::new(auth.user_id)).await?
    };

    if !deleted {
        return Err(AppError::NotFound("App not found".to_string()));
    }

    tracing::info!(app_id = %id, hard = params.hard, "App deleted");

    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}
