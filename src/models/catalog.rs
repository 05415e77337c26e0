use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuditFields;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Framework {
    pub public_id: Uuid,
    pub name: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ExternalService {
    pub public_id: Uuid,
    pub name: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct DatabaseType {
    pub public_id: Uuid,
    pub name: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

/// Resource quotas and pricing of a plan tier. Storage, bandwidth, memory
/// and cpu are in GB; costs are in dollars.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct PlanQuota {
    pub name: String,
    pub storage: f64,
    pub bandwidth: f64,
    pub memory: f64,
    pub cpu: f64,
    pub monthly_cost: f64,
    pub per_hour_cost: f64,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ExternalServicePlanType {
    pub public_id: Uuid,
    pub external_service_id: Uuid,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub plan: PlanQuota,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct DatabasePlanType {
    pub public_id: Uuid,
    pub database_type_id: Uuid,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub plan: PlanQuota,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}
