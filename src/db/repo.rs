//! Soft-delete persistence shared by every audited table.
//!
//! Rows are never removed by `soft_delete`; it sets `deleted_at`/`deleted_by`
//! and the row drops out of the alive view. `hard_delete` is the physical
//! removal path used by administrative tooling.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::db::audit::Stamp;
use crate::error::{ErrorCode, FieldError};
use crate::validate::Validate;

/// A table whose rows carry a `public_id` and the audit columns.
pub trait Entity: for<'r> FromRow<'r, PgRow> + Serialize + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;
    /// Human-readable name used in error messages.
    const LABEL: &'static str;
}

/// An entity that administrative tooling can create and edit directly.
#[async_trait]
pub trait Record: Entity + Sized {
    type Input: DeserializeOwned + Validate + Send + Sync + 'static;

    /// Soft-deletable rows the input points at; each must be alive.
    fn references(_input: &Self::Input) -> Vec<Reference> {
        Vec::new()
    }

    async fn insert(pool: &PgPool, stamp: &Stamp, input: &Self::Input) -> Result<Self, sqlx::Error>;

    async fn update(
        pool: &PgPool,
        id: Uuid,
        stamp: &Stamp,
        input: &Self::Input,
    ) -> Result<Option<Self>, sqlx::Error>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Rows that have not been soft-deleted.
    #[default]
    Alive,
    /// Every row, tombstoned or not.
    All,
}

impl View {
    pub fn including_deleted(include_deleted: bool) -> Self {
        if include_deleted { View::All } else { View::Alive }
    }

    fn filter(&self) -> &'static str {
        match self {
            View::Alive => "deleted_at IS NULL",
            View::All => "TRUE",
        }
    }
}

/// A foreign key supplied by a caller, checked before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub field: &'static str,
    pub table: &'static str,
    pub label: &'static str,
    pub id: Uuid,
}

impl Reference {
    pub fn to<T: Entity>(field: &'static str, id: Uuid) -> Self {
        Self {
            field,
            table: T::TABLE,
            label: T::LABEL,
            id,
        }
    }

    pub fn not_found(&self) -> FieldError {
        FieldError::new(
            ErrorCode::ReferenceNotFound,
            self.field,
            format!("{} {} does not exist", self.label, self.id),
        )
    }
}

pub async fn list<T: Entity>(pool: &PgPool, view: View) -> Result<Vec<T>, sqlx::Error> {
    let sql = format!(
        "SELECT * FROM {} WHERE {} ORDER BY created_at DESC",
        T::TABLE,
        view.filter()
    );
    sqlx::query_as::<_, T>(&sql).fetch_all(pool).await
}

/// Rows whose `column` equals `id`, oldest first.
pub async fn list_by<'e, T: Entity, E: sqlx::PgExecutor<'e>>(
    executor: E,
    column: &str,
    id: Uuid,
    view: View,
) -> Result<Vec<T>, sqlx::Error> {
    let sql = format!(
        "SELECT * FROM {} WHERE {column} = $1 AND {} ORDER BY created_at, public_id",
        T::TABLE,
        view.filter()
    );
    sqlx::query_as::<_, T>(&sql).bind(id).fetch_all(executor).await
}

pub async fn find<'e, T: Entity, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    view: View,
) -> Result<Option<T>, sqlx::Error> {
    let sql = format!(
        "SELECT * FROM {} WHERE public_id = $1 AND {}",
        T::TABLE,
        view.filter()
    );
    sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Returns the first reference that does not point at an alive row.
pub async fn first_missing<'a>(
    pool: &PgPool,
    references: &'a [Reference],
) -> Result<Option<&'a Reference>, sqlx::Error> {
    for reference in references {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE public_id = $1 AND deleted_at IS NULL)",
            reference.table
        );
        let exists: bool = sqlx::query_scalar(&sql)
            .bind(reference.id)
            .fetch_one(pool)
            .await?;
        if !exists {
            return Ok(Some(reference));
        }
    }
    Ok(None)
}

/// Tombstone an alive row. Returns false when no alive row matched.
pub async fn soft_delete<'e, T: Entity, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    stamp: &Stamp,
) -> Result<bool, sqlx::Error> {
    let sql = format!(
        "UPDATE {} SET deleted_at = $2, deleted_by = $3, updated_at = $2, updated_by = $3
         WHERE public_id = $1 AND deleted_at IS NULL",
        T::TABLE
    );
    let result = sqlx::query(&sql)
        .bind(id)
        .bind(stamp.at)
        .bind(stamp.actor)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Physically remove a row, tombstoned or not.
pub async fn hard_delete<'e, T: Entity, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let sql = format!("DELETE FROM {} WHERE public_id = $1", T::TABLE);
    let result = sqlx::query(&sql).bind(id).execute(executor).await?;
    Ok(result.rows_affected() > 0)
}

/// Column named by a Postgres default foreign key constraint
/// (`<table>_<column>_fkey`).
pub fn foreign_key_column<'c>(table: &str, constraint: &'c str) -> Option<&'c str> {
    constraint
        .strip_prefix(table)?
        .strip_prefix('_')?
        .strip_suffix("_fkey")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_defaults_to_alive() {
        assert_eq!(View::default(), View::Alive);
        assert_eq!(View::including_deleted(false), View::Alive);
        assert_eq!(View::including_deleted(true), View::All);
    }

    #[test]
    fn foreign_key_column_from_constraint_name() {
        assert_eq!(
            foreign_key_column("apps", "apps_project_id_fkey"),
            Some("project_id")
        );
        assert_eq!(
            foreign_key_column("projects", "projects_owner_id_fkey"),
            Some("owner_id")
        );
        assert_eq!(foreign_key_column("apps", "projects_owner_id_fkey"), None);
        assert_eq!(foreign_key_column("apps", "apps_name_project_alive_key"), None);
    }
}
