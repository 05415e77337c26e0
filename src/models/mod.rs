mod app;
mod audit;
mod catalog;
mod environment_variable;
mod project;
mod user;

pub use app::{App, AppDetail, AppStatus};
pub use audit::AuditFields;
pub use catalog::{
    DatabasePlanType, DatabaseType, ExternalService, ExternalServicePlanType, Framework, PlanQuota,
};
pub use environment_variable::{EnvironmentVariable, NewEnvironmentVariable};
pub use project::Project;
pub use user::User;
