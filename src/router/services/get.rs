use axum::Json;
use axum::extract::{Path, State};

use super::parse_id;
use crate::database::{Collection, Document};
use crate::{AppState, ServerError};

/// Fetch one service. Answers `null` when nothing matches.
pub async fn handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Document>>, ServerError> {
    let id = parse_id(&id)?;

    Ok(Json(state.db.find_one(Collection::Services, id).await?))
}
