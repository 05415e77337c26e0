pub mod admin;
pub mod apps;
pub mod deploy;

use axum::routing::{get, post, put};
use axum::Router;

use crate::db::repo::Record;
use crate::models::{
    App, DatabasePlanType, DatabaseType, EnvironmentVariable, ExternalService,
    ExternalServicePlanType, Framework, Project,
};
use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Provisioning
        .route("/deploy-app", post(deploy::deploy_app))
        // Apps
        .route("/api/v1/projects/{id}/apps", get(apps::list_by_project))
        .route("/api/v1/apps/{id}", get(apps::get).delete(apps::delete))
        .route(
            "/api/v1/apps/{id}/environment-variables",
            get(apps::list_variables),
        )
        .merge(admin_routes())
}

fn admin_routes() -> Router<SharedState> {
    Router::new()
        // Users
        .route(
            "/api/v1/admin/users",
            get(admin::list_users).post(admin::create_user),
        )
        .route("/api/v1/admin/users/{id}", get(admin::get_user))
        // Projects and catalog
        .merge(record_routes::<Project>("/api/v1/admin/projects"))
        .merge(record_routes::<Framework>("/api/v1/admin/frameworks"))
        .merge(record_routes::<ExternalService>("/api/v1/admin/external-services"))
        .merge(record_routes::<ExternalServicePlanType>(
            "/api/v1/admin/external-service-plan-types",
        ))
        .merge(record_routes::<DatabaseType>("/api/v1/admin/database-types"))
        .merge(record_routes::<DatabasePlanType>(
            "/api/v1/admin/database-plan-types",
        ))
        // Apps are created through /deploy-app and deleted through /api/v1/apps
        .route("/api/v1/admin/apps", get(admin::list::<App>))
        .route("/api/v1/admin/apps/{id}", get(admin::get::<App>))
        .route("/api/v1/admin/apps/{id}/status", put(admin::set_app_status))
        // Environment variables
        .route(
            "/api/v1/admin/environment-variables",
            get(admin::list::<EnvironmentVariable>),
        )
        .route(
            "/api/v1/admin/environment-variables/{id}",
            get(admin::get::<EnvironmentVariable>).delete(admin::delete::<EnvironmentVariable>),
        )
}

fn record_routes<T: Record>(path: &str) -> Router<SharedState> {
    Router::new()
        .route(path, get(admin::list::<T>).post(admin::create::<T>))
        .route(
            &format!("{path}/{{id}}"),
            get(admin::get::<T>)
                .put(admin::update::<T>)
                .delete(admin::delete::<T>),
        )
}
