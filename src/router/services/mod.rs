//! Services-related HTTP API.
//!
//! A service is a tour offered by a provider. Documents are stored as
//! submitted, nothing is validated.
mod create;
mod delete;
mod get;
mod list;
mod update;

use axum::Router;
use axum::routing::get;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::{Document, DocumentId};
use crate::{AppState, ServerError};

/// Field matched by `GET /services/myServices`.
pub const PROVIDER_EMAIL: &str = "service_provider_email";

/// Fields written by `PUT /services/{id}`.
///
/// Missing fields are written as `null`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Service {
    #[serde(default)]
    pub service_name: Value,
    #[serde(default)]
    pub service_image: Value,
    #[serde(default)]
    pub service_provider_name: Value,
    #[serde(default)]
    pub service_provider_email: Value,
    #[serde(default)]
    pub service_provider_image: Value,
    #[serde(default)]
    pub service_price: Value,
    #[serde(default)]
    pub service_area: Value,
    #[serde(default)]
    pub service_description: Value,
}

impl Service {
    fn into_fields(self) -> Document {
        Document::from_iter([
            ("service_name".to_owned(), self.service_name),
            ("service_image".to_owned(), self.service_image),
            ("service_provider_name".to_owned(), self.service_provider_name),
            (PROVIDER_EMAIL.to_owned(), self.service_provider_email),
            ("service_provider_image".to_owned(), self.service_provider_image),
            ("service_price".to_owned(), self.service_price),
            ("service_area".to_owned(), self.service_area),
            ("service_description".to_owned(), self.service_description),
        ])
    }
}

fn parse_id(id: &str) -> Result<DocumentId, ServerError> {
    DocumentId::parse(id).ok_or(ServerError::InvalidId)
}

pub fn router() -> Router<AppState> {
    Router::new()
        // `GET /services` lists, `POST /services` creates.
        .route("/", get(list::handler).post(create::handler))
        .route("/myServices", get(list::by_provider))
        .route(
            "/{id}",
            get(get::handler)
                .put(update::handler)
                .delete(delete::handler),
        )
}

#[cfg(test)]
pub(crate) mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    use crate::*;

    /// Create a service through the API and return its identifier.
    pub async fn create_service(app: &axum::Router, service: Value) -> String {
        let response = make_request(
            None,
            app.clone(),
            Method::POST,
            "/services",
            service.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["acknowledged"], json!(true));

        body["insertedId"].as_str().unwrap().to_owned()
    }

    pub fn sample(name: &str, provider: &str) -> Value {
        json!({
            "service_name": name,
            "service_image": "https://i.ibb.co/tour.jpg",
            "service_provider_name": "Rafiq",
            "service_provider_email": provider,
            "service_provider_image": "https://i.ibb.co/rafiq.jpg",
            "service_price": 120,
            "service_area": "Sylhet",
            "service_description": "Tea gardens and waterfalls.",
        })
    }

    #[test]
    fn test_missing_fields_are_null() {
        let service: super::Service =
            serde_json::from_value(json!({ "service_name": "Ratargul" })).unwrap();
        let fields = service.into_fields();

        assert_eq!(fields.len(), 8);
        assert_eq!(fields["service_name"], json!("Ratargul"));
        assert_eq!(fields["service_price"], Value::Null);
    }
}
