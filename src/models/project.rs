use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuditFields;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Project {
    pub public_id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}
