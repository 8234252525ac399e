//! List services.

use axum::Json;
use axum::extract::{Query, State};

use super::PROVIDER_EMAIL;
use crate::database::{Collection, Document, Filter};
use crate::middleware::EmailQuery;
use crate::{AppState, ServerError};

/// Every service, order unconstrained.
pub async fn handler(State(state): State<AppState>) -> Result<Json<Vec<Document>>, ServerError> {
    Ok(Json(state.db.find(Collection::Services, Filter::All).await?))
}

/// Services offered by the provider given as `?email=`.
pub async fn by_provider(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<Document>>, ServerError> {
    let filter = Filter::eq_or_all(PROVIDER_EMAIL, query.email);

    Ok(Json(state.db.find(Collection::Services, filter).await?))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::Value;

    use crate::router::services::tests::{create_service, sample};
    use crate::*;

    async fn list(app: &axum::Router, path: &str) -> Vec<Value> {
        let response = make_request(None, app.clone(), Method::GET, path, String::default()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_list_handler() {
        let app = app(router::state());
        assert!(list(&app, "/services").await.is_empty());

        let mut ids = HashSet::new();
        for name in ["Sundarbans", "Srimangal", "Bandarban"] {
            ids.insert(create_service(&app, sample(name, "rafiq@example.com")).await);
        }

        let services = list(&app, "/services").await;
        assert_eq!(services.len(), 3);
        let listed: HashSet<String> = services
            .iter()
            .map(|service| service["_id"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn test_by_provider_handler() {
        let app = app(router::state());
        create_service(&app, sample("Sundarbans", "rafiq@example.com")).await;
        create_service(&app, sample("Srimangal", "nadia@example.com")).await;
        create_service(&app, sample("Bandarban", "rafiq@example.com")).await;

        let services = list(&app, "/services/myServices?email=rafiq@example.com").await;
        assert_eq!(services.len(), 2);
        assert!(
            services
                .iter()
                .all(|service| service["service_provider_email"] == "rafiq@example.com")
        );

        assert!(
            list(&app, "/services/myServices?email=nobody@example.com")
                .await
                .is_empty()
        );
        assert_eq!(list(&app, "/services/myServices").await.len(), 3);
    }
}
