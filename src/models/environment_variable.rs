use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuditFields;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub public_id: Uuid,
    pub app_id: Uuid,
    pub name: String,
    pub value: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

/// A `(name, value)` pair submitted for a new app.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewEnvironmentVariable {
    pub name: String,
    pub value: String,
}
