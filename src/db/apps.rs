use sqlx::PgPool;
use uuid::Uuid;

use crate::db::audit::Stamp;
use crate::db::repo::{self, Entity};
use crate::models::{App, AppStatus, EnvironmentVariable};

/// Partial unique index over alive apps: one name per project.
pub const NAME_PROJECT_KEY: &str = "apps_name_project_alive_key";

impl Entity for App {
    const TABLE: &'static str = "apps";
    const LABEL: &'static str = "App";
}

/// Column values for a new app row. Status is not settable here; every app
/// starts out `Created`.
#[derive(Debug)]
pub struct NewApp<'a> {
    pub name: &'a str,
    pub project_id: Uuid,
    pub framework_id: Uuid,
    pub external_service_plan_type_id: Uuid,
    pub database_plan_type_id: Option<Uuid>,
}

pub async fn insert<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    stamp: &Stamp,
    app: &NewApp<'_>,
) -> Result<App, sqlx::Error> {
    sqlx::query_as::<_, App>(
        "INSERT INTO apps (public_id, name, status, project_id, framework_id,
                           external_service_plan_type_id, database_plan_type_id,
                           created_at, updated_at, created_by, updated_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, $9, $9) RETURNING *",
    )
    .bind(stamp.id)
    .bind(app.name)
    .bind(AppStatus::Created)
    .bind(app.project_id)
    .bind(app.framework_id)
    .bind(app.external_service_plan_type_id)
    .bind(app.database_plan_type_id)
    .bind(stamp.at)
    .bind(stamp.actor)
    .fetch_one(executor)
    .await
}

/// Whether an alive app in the project already uses this name.
pub async fn name_taken<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    project_id: Uuid,
    name: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM apps WHERE project_id = $1 AND name = $2 AND deleted_at IS NULL)",
    )
    .bind(project_id)
    .bind(name)
    .fetch_one(executor)
    .await
}

pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    status: AppStatus,
    stamp: &Stamp,
) -> Result<Option<App>, sqlx::Error> {
    sqlx::query_as::<_, App>(
        "UPDATE apps SET status = $2, updated_at = $3, updated_by = $4
         WHERE public_id = $1 AND deleted_at IS NULL RETURNING *",
    )
    .bind(id)
    .bind(status)
    .bind(stamp.at)
    .bind(stamp.actor)
    .fetch_optional(pool)
    .await
}

/// Tombstone an app and its alive environment variables together.
pub async fn soft_delete(pool: &PgPool, id: Uuid, stamp: &Stamp) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    if !repo::soft_delete::<App, _>(&mut *tx, id, stamp).await? {
        return Ok(false);
    }

    sqlx::query(
        "UPDATE environment_variables SET deleted_at = $2, deleted_by = $3, updated_at = $2, updated_by = $3
         WHERE app_id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .bind(stamp.at)
    .bind(stamp.actor)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(true)
}

/// Physically remove an app; its environment variables go with it.
pub async fn hard_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    repo::hard_delete::<App, _>(pool, id).await
}

/// Variables shown alongside an app: alive ones for an alive app, every one
/// for a tombstoned app read through the all view.
pub async fn variables_for(
    pool: &PgPool,
    app: &App,
) -> Result<Vec<EnvironmentVariable>, sqlx::Error> {
    let view = if app.audit.is_deleted() {
        repo::View::All
    } else {
        repo::View::Alive
    };
    repo::list_by(pool, "app_id", app.public_id, view).await
}
