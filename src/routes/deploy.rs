use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::models::AppDetail;
use crate::provisioning::{self, DeployAppRequest};
use crate::state::SharedState;

pub async fn deploy_app(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<DeployAppRequest>, AppError>,
) -> Result<(StatusCode, Json<AppDetail>), AppError> {
    let detail = provisioning::deploy(&state.pool, auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}
