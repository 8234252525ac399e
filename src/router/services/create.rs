use axum::Json;
use axum::extract::State;

use crate::database::{Collection, Document, InsertOneResult};
use crate::router::{Body, without_id};
use crate::{AppState, ServerError};

/// Handler to create a service.
pub async fn handler(
    State(state): State<AppState>,
    Body(service): Body<Document>,
) -> Result<Json<InsertOneResult>, ServerError> {
    let result = state
        .db
        .insert_one(Collection::Services, without_id(service))
        .await?;

    tracing::info!(id = %result.inserted_id, "service created");
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    use crate::router::services::tests::create_service;
    use crate::*;

    #[tokio::test]
    async fn test_create_handler() {
        let app = app(router::state());

        // Partial documents are accepted as-is.
        let id = create_service(&app, json!({ "service_name": "Lalbagh Fort", "_id": "mine" })).await;
        assert_eq!(id.len(), 24);

        let path = format!("/services/{id}");
        let response = make_request(None, app, Method::GET, &path, String::default()).await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "_id": id, "service_name": "Lalbagh Fort" }));
    }

    #[tokio::test]
    async fn test_create_rejects_non_object() {
        let app = app(router::state());

        let response = make_request(
            None,
            app.clone(),
            Method::POST,
            "/services",
            "[1, 2, 3]".into(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = make_request(None, app, Method::POST, "/services", "{".into()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert!(body["message"].is_string());
    }
}
