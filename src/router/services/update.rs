use axum::Json;
use axum::extract::{Path, State};

use super::{Service, parse_id};
use crate::database::{Collection, UpdateResult};
use crate::router::Body;
use crate::{AppState, ServerError};

/// Overwrite every service field, creating the service if it is absent.
pub async fn handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Body(service): Body<Service>,
) -> Result<Json<UpdateResult>, ServerError> {
    let id = parse_id(&id)?;
    let result = state
        .db
        .upsert_fields(Collection::Services, id, service.into_fields())
        .await?;

    if result.upserted_id.is_some() {
        tracing::info!(%id, "service created by update");
    }

    Ok(Json(result))
}
