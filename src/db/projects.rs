use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::audit::Stamp;
use crate::db::repo::{Entity, Record};
use crate::error::FieldError;
use crate::models::Project;
use crate::validate::{self, Validate};

impl Entity for Project {
    const TABLE: &'static str = "projects";
    const LABEL: &'static str = "Project";
}

#[derive(Debug, Deserialize)]
pub struct ProjectInput {
    pub name: String,
    pub owner_id: Uuid,
}

impl Validate for ProjectInput {
    fn validate(&self) -> Result<(), FieldError> {
        validate::name("name", &self.name)
    }
}

// Owners live in `users`, which has no tombstone; a bad owner_id surfaces
// as a foreign key violation on insert.
#[async_trait]
impl Record for Project {
    type Input = ProjectInput;

    async fn insert(pool: &PgPool, stamp: &Stamp, input: &ProjectInput) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            "INSERT INTO projects (public_id, name, owner_id, created_at, updated_at, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $4, $5, $5) RETURNING *",
        )
        .bind(stamp.id)
        .bind(input.name.trim())
        .bind(input.owner_id)
        .bind(stamp.at)
        .bind(stamp.actor)
        .fetch_one(pool)
        .await
    }

    async fn update(
        pool: &PgPool,
        id: Uuid,
        stamp: &Stamp,
        input: &ProjectInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            "UPDATE projects SET name = $2, owner_id = $3, updated_at = $4, updated_by = $5
             WHERE public_id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.owner_id)
        .bind(stamp.at)
        .bind(stamp.actor)
        .fetch_optional(pool)
        .await
    }
}
