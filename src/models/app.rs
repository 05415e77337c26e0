use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::Postgres;
use uuid::Uuid;

use super::{AuditFields, EnvironmentVariable};

/// Deployment state of an app. Stored and serialized as its two-letter code.
/// Nothing in this service moves an app between states except an explicit
/// admin write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppStatus {
    #[default]
    #[serde(rename = "CR")]
    Created,
    #[serde(rename = "PD")]
    Pending,
    #[serde(rename = "IP")]
    InProgress,
    #[serde(rename = "DP")]
    Deployed,
    #[serde(rename = "TM")]
    Terminated,
    #[serde(rename = "ST")]
    Stopped,
    #[serde(rename = "FL")]
    Failed,
}

impl AppStatus {
    pub fn code(&self) -> &'static str {
        match self {
            AppStatus::Created => "CR",
            AppStatus::Pending => "PD",
            AppStatus::InProgress => "IP",
            AppStatus::Deployed => "DP",
            AppStatus::Terminated => "TM",
            AppStatus::Stopped => "ST",
            AppStatus::Failed => "FL",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CR" => Some(AppStatus::Created),
            "PD" => Some(AppStatus::Pending),
            "IP" => Some(AppStatus::InProgress),
            "DP" => Some(AppStatus::Deployed),
            "TM" => Some(AppStatus::Terminated),
            "ST" => Some(AppStatus::Stopped),
            "FL" => Some(AppStatus::Failed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppStatus::Created => "Created",
            AppStatus::Pending => "Pending",
            AppStatus::InProgress => "In Progress",
            AppStatus::Deployed => "Deployed",
            AppStatus::Terminated => "Terminated",
            AppStatus::Stopped => "Stopped",
            AppStatus::Failed => "Failed",
        }
    }
}

impl sqlx::Type<Postgres> for AppStatus {
    fn type_info() -> PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, Postgres> for AppStatus {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let code = <&str as sqlx::Decode<Postgres>>::decode(value)?;
        AppStatus::from_code(code).ok_or_else(|| format!("unknown app status code: {code}").into())
    }
}

impl sqlx::Encode<'_, Postgres> for AppStatus {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <&str as sqlx::Encode<Postgres>>::encode_by_ref(&self.code(), buf)
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct App {
    pub public_id: Uuid,
    pub name: String,
    pub status: AppStatus,
    pub project_id: Uuid,
    pub framework_id: Uuid,
    pub external_service_plan_type_id: Uuid,
    pub database_plan_type_id: Option<Uuid>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

/// An app together with its environment variables, as returned by deploy
/// and the app detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppDetail {
    #[serde(flatten)]
    pub app: App,
    pub environment_variables: Vec<EnvironmentVariable>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_apps_default_to_created() {
        assert_eq!(AppStatus::default(), AppStatus::Created);
        assert_eq!(AppStatus::default().code(), "CR");
    }

    #[test]
    fn status_serializes_as_code() {
        assert_eq!(serde_json::to_string(&AppStatus::InProgress).unwrap(), "\"IP\"");
        let parsed: AppStatus = serde_json::from_str("\"FL\"").unwrap();
        assert_eq!(parsed, AppStatus::Failed);
        assert_eq!(parsed.label(), "Failed");
    }

    #[test]
    fn codes_round_trip_through_from_code() {
        for status in [AppStatus::Created, AppStatus::Stopped, AppStatus::Terminated] {
            assert_eq!(AppStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(AppStatus::from_code("XX"), None);
    }
}
