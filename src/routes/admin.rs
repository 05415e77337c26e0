//! Administrative CRUD over the catalog, projects and users. Handlers are
//! generic over [`Entity`]/[`Record`] so every table shares one code path.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::audit::Stamp;
use crate::db::repo::{self, Entity, Record};
use crate::error::{AppError, ErrorCode, FieldError};
use crate::models::{App, AppStatus, User};
use crate::routes::apps::{DeleteParams, ListParams};
use crate::state::SharedState;
use crate::validate::{self, Validate};

pub async fn list<T: Entity>(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<T>>, AppError> {
    let rows = repo::list::<T>(&state.pool, params.view()).await?;
    Ok(Json(rows))
}

pub async fn get<T: Entity>(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<Json<T>, AppError> {
    let row = repo::find::<T, _>(&state.pool, id, params.view())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} not found", T::LABEL)))?;
    Ok(Json(row))
}

pub async fn create<T: Record>(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Json(input), _): WithRejection<Json<T::Input>, AppError>,
) -> Result<(StatusCode, Json<T>), AppError> {
    check_input::<T>(&state, &input).await?;

    let row = T::insert(&state.pool, &Stamp::new(auth.user_id), &input)
        .await
        .map_err(write_error::<T>)?;

    tracing::info!(table = T::TABLE, "{} created", T::LABEL);

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update<T: Record>(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    WithRejection(Json(input), _): WithRejection<Json<T::Input>, AppError>,
) -> Result<Json<T>, AppError> {
    check_input::<T>(&state, &input).await?;

    let row = T::update(&state.pool, id, &Stamp::new(auth.user_id), &input)
        .await
        .map_err(write_error::<T>)?
        .ok_or_else(|| AppError::NotFound(format!("{} not found", T::LABEL)))?;

    tracing::info!(table = T::TABLE, id = %id, "{} updated", T::LABEL);

    Ok(Json(row))
}

pub async fn delete<T: Entity>(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = if params.hard {
        repo::hard_delete::<T, _>(&state.pool, id)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    AppError::Conflict(format!(
                        "{} is still referenced by other records",
                        T::LABEL
                    ))
                }
                _ => AppError::Database(e),
            })?
    } else {
        repo::soft_delete::<T, _>(&state.pool, id, &Stamp::new(auth.user_id)).await?
    };

    if !deleted {
        return Err(AppError::NotFound(format!("{} not found", T::LABEL)));
    }

    tracing::info!(table = T::TABLE, id = %id, hard = params.hard, "{} deleted", T::LABEL);

    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}

async fn check_input<T: Record>(state: &SharedState, input: &T::Input) -> Result<(), AppError> {
    let references = T::references(input);
    if let Some(missing) = repo::first_missing(&state.pool, &references).await? {
        return Err(missing.not_found().into());
    }
    input.validate()?;
    Ok(())
}

/// Foreign keys without a tombstone to check up front (owners, audit users)
/// surface here.
fn write_error<T: Entity>(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_foreign_key_violation() {
            let field = db_err
                .constraint()
                .and_then(|c| repo::foreign_key_column(T::TABLE, c))
                .unwrap_or("reference")
                .to_string();
            return FieldError::new(
                ErrorCode::ReferenceNotFound,
                field,
                "Referenced record does not exist",
            )
            .into();
        }
    }
    AppError::Database(err)
}

// ── Users ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub name: String,
}

pub async fn list_users(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = db::users::list_all(&state.pool).await?;
    Ok(Json(users))
}

pub async fn get_user(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    let user = db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

pub async fn create_user(
    _auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<CreateUser>, AppError>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let email = req.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(FieldError::invalid("email", "Enter a valid email address.").into());
    }
    validate::text("email", email, validate::EMAIL_MAX_CHARS)?;
    validate::name("name", &req.name)?;

    let user = db::users::create(&state.pool, email, req.name.trim())
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("A user with this email already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

    Ok((StatusCode::CREATED, Json(user)))
}

// ── Apps ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateStatus {
    pub status: AppStatus,
}

/// Sets the status verbatim; there are no transition rules.
pub async fn set_app_status(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateStatus>, AppError>,
) -> Result<Json<App>, AppError> {
    let app = db::apps::update_status(&state.pool, id, req.status, &Stamp::new(auth.user_id))
        .await?
        .ok_or_else(|| AppError::NotFound("App not found".to_string()))?;

    tracing::info!(app_id = %id, status = req.status.code(), "App status set to {}", req.status.label());

    Ok(Json(app))
}
