use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::audit::Stamp;
use crate::db::repo::{Entity, Record, Reference};
use crate::error::FieldError;
use crate::models::{
    DatabasePlanType, DatabaseType, ExternalService, ExternalServicePlanType, Framework, PlanQuota,
};
use crate::validate::{self, Validate};

impl Entity for Framework {
    const TABLE: &'static str = "frameworks";
    const LABEL: &'static str = "Framework";
}

impl Entity for ExternalService {
    const TABLE: &'static str = "external_services";
    const LABEL: &'static str = "External service";
}

impl Entity for ExternalServicePlanType {
    const TABLE: &'static str = "external_service_plan_types";
    const LABEL: &'static str = "External service plan type";
}

impl Entity for DatabaseType {
    const TABLE: &'static str = "database_types";
    const LABEL: &'static str = "Database type";
}

impl Entity for DatabasePlanType {
    const TABLE: &'static str = "database_plan_types";
    const LABEL: &'static str = "Database plan type";
}

/// Input for catalog entries that carry nothing but a name.
#[derive(Debug, Deserialize)]
pub struct NameInput {
    pub name: String,
}

impl Validate for NameInput {
    fn validate(&self) -> Result<(), FieldError> {
        validate::name("name", &self.name)
    }
}

impl Validate for PlanQuota {
    fn validate(&self) -> Result<(), FieldError> {
        validate::name("name", &self.name)?;
        validate::non_negative("storage", self.storage)?;
        validate::non_negative("bandwidth", self.bandwidth)?;
        validate::non_negative("memory", self.memory)?;
        validate::non_negative("cpu", self.cpu)?;
        validate::non_negative("monthly_cost", self.monthly_cost)?;
        validate::non_negative("per_hour_cost", self.per_hour_cost)
    }
}

#[derive(Debug, Deserialize)]
pub struct ExternalServicePlanTypeInput {
    pub external_service_id: Uuid,
    #[serde(flatten)]
    pub plan: PlanQuota,
}

impl Validate for ExternalServicePlanTypeInput {
    fn validate(&self) -> Result<(), FieldError> {
        self.plan.validate()
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabasePlanTypeInput {
    pub database_type_id: Uuid,
    #[serde(flatten)]
    pub plan: PlanQuota,
}

impl Validate for DatabasePlanTypeInput {
    fn validate(&self) -> Result<(), FieldError> {
        self.plan.validate()
    }
}

async fn insert_named<T: Entity>(pool: &PgPool, stamp: &Stamp, name: &str) -> Result<T, sqlx::Error> {
    let sql = format!(
        "INSERT INTO {} (public_id, name, created_at, updated_at, created_by, updated_by)
         VALUES ($1, $2, $3, $3, $4, $4) RETURNING *",
        T::TABLE
    );
    sqlx::query_as::<_, T>(&sql)
        .bind(stamp.id)
        .bind(name.trim())
        .bind(stamp.at)
        .bind(stamp.actor)
        .fetch_one(pool)
        .await
}

async fn update_named<T: Entity>(
    pool: &PgPool,
    id: Uuid,
    stamp: &Stamp,
    name: &str,
) -> Result<Option<T>, sqlx::Error> {
    let sql = format!(
        "UPDATE {} SET name = $2, updated_at = $3, updated_by = $4
         WHERE public_id = $1 AND deleted_at IS NULL RETURNING *",
        T::TABLE
    );
    sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .bind(name.trim())
        .bind(stamp.at)
        .bind(stamp.actor)
        .fetch_optional(pool)
        .await
}

/// Plan tables differ only in the column naming their parent.
async fn insert_plan<T: Entity>(
    pool: &PgPool,
    stamp: &Stamp,
    parent_column: &str,
    parent_id: Uuid,
    plan: &PlanQuota,
) -> Result<T, sqlx::Error> {
    let sql = format!(
        "INSERT INTO {} (public_id, {parent_column}, name, storage, bandwidth, memory, cpu,
                         monthly_cost, per_hour_cost, created_at, updated_at, created_by, updated_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10, $11, $11) RETURNING *",
        T::TABLE
    );
    sqlx::query_as::<_, T>(&sql)
        .bind(stamp.id)
        .bind(parent_id)
        .bind(plan.name.trim())
        .bind(plan.storage)
        .bind(plan.bandwidth)
        .bind(plan.memory)
        .bind(plan.cpu)
        .bind(plan.monthly_cost)
        .bind(plan.per_hour_cost)
        .bind(stamp.at)
        .bind(stamp.actor)
        .fetch_one(pool)
        .await
}

async fn update_plan<T: Entity>(
    pool: &PgPool,
    id: Uuid,
    stamp: &Stamp,
    parent_column: &str,
    parent_id: Uuid,
    plan: &PlanQuota,
) -> Result<Option<T>, sqlx::Error> {
    let sql = format!(
        "UPDATE {} SET {parent_column} = $2, name = $3, storage = $4, bandwidth = $5, memory = $6,
                       cpu = $7, monthly_cost = $8, per_hour_cost = $9, updated_at = $10, updated_by = $11
         WHERE public_id = $1 AND deleted_at IS NULL RETURNING *",
        T::TABLE
    );
    sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .bind(parent_id)
        .bind(plan.name.trim())
        .bind(plan.storage)
        .bind(plan.bandwidth)
        .bind(plan.memory)
        .bind(plan.cpu)
        .bind(plan.monthly_cost)
        .bind(plan.per_hour_cost)
        .bind(stamp.at)
        .bind(stamp.actor)
        .fetch_optional(pool)
        .await
}

#[async_trait]
impl Record for Framework {
    type Input = NameInput;

    async fn insert(pool: &PgPool, stamp: &Stamp, input: &NameInput) -> Result<Self, sqlx::Error> {
        insert_named(pool, stamp, &input.name).await
    }

    async fn update(
        pool: &PgPool,
        id: Uuid,
        stamp: &Stamp,
        input: &NameInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        update_named(pool, id, stamp, &input.name).await
    }
}

#[async_trait]
impl Record for ExternalService {
    type Input = NameInput;

    async fn insert(pool: &PgPool, stamp: &Stamp, input: &NameInput) -> Result<Self, sqlx::Error> {
        insert_named(pool, stamp, &input.name).await
    }

    async fn update(
        pool: &PgPool,
        id: Uuid,
        stamp: &Stamp,
        input: &NameInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        update_named(pool, id, stamp, &input.name).await
    }
}

#[async_trait]
impl Record for DatabaseType {
    type Input = NameInput;

    async fn insert(pool: &PgPool, stamp: &Stamp, input: &NameInput) -> Result<Self, sqlx::Error> {
        insert_named(pool, stamp, &input.name).await
    }

    async fn update(
        pool: &PgPool,
        id: Uuid,
        stamp: &Stamp,
        input: &NameInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        update_named(pool, id, stamp, &input.name).await
    }
}

#[async_trait]
impl Record for ExternalServicePlanType {
    type Input = ExternalServicePlanTypeInput;

    fn references(input: &Self::Input) -> Vec<Reference> {
        vec![Reference::to::<ExternalService>(
            "external_service_id",
            input.external_service_id,
        )]
    }

    async fn insert(
        pool: &PgPool,
        stamp: &Stamp,
        input: &Self::Input,
    ) -> Result<Self, sqlx::Error> {
        insert_plan(pool, stamp, "external_service_id", input.external_service_id, &input.plan).await
    }

    async fn update(
        pool: &PgPool,
        id: Uuid,
        stamp: &Stamp,
        input: &Self::Input,
    ) -> Result<Option<Self>, sqlx::Error> {
        update_plan(pool, id, stamp, "external_service_id", input.external_service_id, &input.plan)
            .await
    }
}

#[async_trait]
impl Record for DatabasePlanType {
    type Input = DatabasePlanTypeInput;

    fn references(input: &Self::Input) -> Vec<Reference> {
        vec![Reference::to::<DatabaseType>(
            "database_type_id",
            input.database_type_id,
        )]
    }

    async fn insert(
        pool: &PgPool,
        stamp: &Stamp,
        input: &Self::Input,
    ) -> Result<Self, sqlx::Error> {
        insert_plan(pool, stamp, "database_type_id", input.database_type_id, &input.plan).await
    }

    async fn update(
        pool: &PgPool,
        id: Uuid,
        stamp: &Stamp,
        input: &Self::Input,
    ) -> Result<Option<Self>, sqlx::Error> {
        update_plan(pool, id, stamp, "database_type_id", input.database_type_id, &input.plan).await
    }
}
