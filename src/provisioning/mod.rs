//! Creation of an app together with its environment variables.
//!
//! Checks run in a fixed order and stop at the first failure: references,
//! app name, name availability in the project, then the variable batch.
//! Only after all of them pass is anything written, and the app row and its
//! variables are written in one transaction.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::db::apps::NewApp;
use crate::db::audit::Stamp;
use crate::db::repo::{self, Reference};
use crate::error::{AppError, ErrorCode, FieldError};
use crate::models::{
    AppDetail, DatabasePlanType, ExternalServicePlanType, Framework, NewEnvironmentVariable,
    Project,
};
use crate::validate;

/// Body of `POST /deploy-app`. Any `status` the caller sends is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct DeployAppRequest {
    pub name: String,
    pub project_id: Uuid,
    pub framework_id: Uuid,
    pub external_service_plan_type_id: Uuid,
    #[serde(default)]
    pub database_plan_type_id: Option<Uuid>,
    #[serde(default)]
    pub environment_variables: Vec<NewEnvironmentVariable>,
}

impl DeployAppRequest {
    fn references(&self) -> Vec<Reference> {
        let mut references = vec![
            Reference::to::<Project>("project_id", self.project_id),
            Reference::to::<Framework>("framework_id", self.framework_id),
            Reference::to::<ExternalServicePlanType>(
                "external_service_plan_type_id",
                self.external_service_plan_type_id,
            ),
        ];
        if let Some(id) = self.database_plan_type_id {
            references.push(Reference::to::<DatabasePlanType>("database_plan_type_id", id));
        }
        references
    }

    /// Names are stored trimmed. Values are kept verbatim.
    fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        for variable in &mut self.environment_variables {
            variable.name = variable.name.trim().to_string();
        }
        self
    }
}

pub async fn deploy(
    pool: &PgPool,
    actor: Uuid,
    request: DeployAppRequest,
) -> Result<AppDetail, AppError> {
    let references = request.references();
    if let Some(missing) = repo::first_missing(pool, &references).await? {
        return Err(missing.not_found().into());
    }

    validate::name("name", &request.name)?;
    let request = request.normalized();

    if db::apps::name_taken(pool, request.project_id, &request.name).await? {
        return Err(duplicate_app_name(&request).into());
    }

    validate::environment_variables(&request.environment_variables)?;

    let stamp = Stamp::new(actor);
    let mut tx = pool.begin().await?;

    let app = db::apps::insert(
        &mut *tx,
        &stamp,
        &NewApp {
            name: &request.name,
            project_id: request.project_id,
            framework_id: request.framework_id,
            external_service_plan_type_id: request.external_service_plan_type_id,
            database_plan_type_id: request.database_plan_type_id,
        },
    )
    .await
    .map_err(|e| storage_error(e, &request))?;

    let environment_variables = db::environment_variables::insert_batch(
        &mut *tx,
        &stamp,
        app.public_id,
        &request.environment_variables,
    )
    .await
    .map_err(|e| storage_error(e, &request))?;

    tx.commit().await?;

    tracing::info!(
        app_id = %app.public_id,
        project_id = %app.project_id,
        variables = environment_variables.len(),
        "App {} created",
        app.name
    );

    Ok(AppDetail {
        app,
        environment_variables,
    })
}

fn duplicate_app_name(request: &DeployAppRequest) -> FieldError {
    FieldError::new(
        ErrorCode::DuplicateAppName,
        "name",
        format!(
            "App name '{}' already exists in project {}",
            request.name, request.project_id
        ),
    )
}

/// Constraint violations that lose a race with a concurrent writer map back
/// to the same client errors the pre-checks report.
fn storage_error(err: sqlx::Error, request: &DeployAppRequest) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.constraint() {
            Some(db::apps::NAME_PROJECT_KEY) => return duplicate_app_name(request).into(),
            Some(db::environment_variables::NAME_APP_KEY) => {
                return FieldError::new(
                    ErrorCode::DuplicateEnvVarName,
                    "environment_variables",
                    "Environment variable names must be unique.",
                )
                .into();
            }
            Some(constraint) if db_err.is_foreign_key_violation() => {
                let field = repo::foreign_key_column(db_err.table().unwrap_or("apps"), constraint)
                    .unwrap_or("reference")
                    .to_string();
                return FieldError::new(
                    ErrorCode::ReferenceNotFound,
                    field,
                    "Referenced record no longer exists",
                )
                .into();
            }
            _ => {}
        }
    }
    AppError::Database(err)
}
