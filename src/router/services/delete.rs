//! Delete a service.

use axum::Json;
use axum::extract::{Path, State};

use super::parse_id;
use crate::database::{Collection, DeleteResult};
use crate::{AppState, ServerError};

pub async fn handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, ServerError> {
    let id = parse_id(&id)?;
    let result = state.db.delete_one(Collection::Services, id).await?;

    tracing::info!(%id, deleted = result.deleted_count, "service deletion");
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    use crate::router::services::tests::{create_service, sample};
    use crate::*;

    #[tokio::test]
    async fn test_delete_handler() {
        let app = app(router::state());
        let id = create_service(&app, sample("Sundarbans", "rafiq@example.com")).await;
        let kept = create_service(&app, sample("Srimangal", "rafiq@example.com")).await;
        let path = format!("/services/{id}");

        let response = make_request(None, app.clone(), Method::DELETE, &path, String::default()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "acknowledged": true, "deletedCount": 1 }));

        // Service must be deleted.
        let response = make_request(None, app.clone(), Method::GET, &path, String::default()).await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"null");

        // Deleting again is not an error.
        let response = make_request(None, app.clone(), Method::DELETE, &path, String::default()).await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["deletedCount"], json!(0));

        let response = make_request(None, app, Method::GET, "/services", String::default()).await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["_id"], json!(kept));
    }
}
