use axum::{extract::State, Json};
use tracing::{info, instrument};

use crate::shared::{AppError, AppState, ValidatedPath};
use crate::store::{parse_id, Collection, Document, Filter};

/// HTTP handler for listing the service catalogue
///
/// GET /services
#[instrument(name = "list_services", skip(state))]
pub async fn list_services(State(state): State<AppState>) -> Result<Json<Vec<Document>>, AppError> {
    let services = state
        .store
        .find_many(Collection::Services, &Filter::all())
        .await?;

    info!(service_count = services.len(), "Services listed successfully");

    Ok(Json(services))
}

/// HTTP handler for fetching one service
///
/// GET /services/:id
/// 400 for a malformed identifier, 404 when no service has it
#[instrument(name = "get_service", skip(state))]
pub async fn get_service(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<String>,
) -> Result<Json<Document>, AppError> {
    let id = parse_id(&id)?;

    let service = state
        .store
        .find_one(Collection::Services, id)
        .await?
        .ok_or_else(|| AppError::NotFound("service".to_string()))?;

    info!(service_id = %service.id, "Service fetched successfully");

    Ok(Json(service))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{AppStateBuilder, FailingDocumentStore};
    use crate::store::InMemoryDocumentStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    fn service(title: &str, price: u32) -> Document {
        let Value::Object(fields) = json!({"title": title, "price": price}) else {
            unreachable!()
        };
        Document::new(fields)
    }

    fn build_app(services: Vec<Document>) -> Router {
        let store = Arc::new(InMemoryDocumentStore::with_documents(
            Collection::Services,
            services,
        ));
        Router::new()
            .route("/services", get(list_services))
            .route("/services/:id", get(get_service))
            .with_state(AppStateBuilder::new().with_store(store).build())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_list_services() {
        let app = build_app(vec![service("Engine Diagnostic", 200), service("Oil Change", 40)]);

        let (status, body) = get_json(app, "/services").await;

        assert_eq!(status, StatusCode::OK);
        let services = body.as_array().unwrap();
        assert_eq!(services.len(), 2);
        assert_eq!(services[0]["title"], "Engine Diagnostic");
        assert_eq!(services[1]["title"], "Oil Change");
        assert!(services[0]["_id"].is_string());
    }

    #[tokio::test]
    async fn test_list_services_empty_catalogue() {
        let (status, body) = get_json(build_app(vec![]), "/services").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_get_service_by_id() {
        let wanted = service("Brake Service", 120);
        let app = build_app(vec![service("Oil Change", 40), wanted.clone()]);

        let (status, body) = get_json(app, &format!("/services/{}", wanted.id)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["_id"], wanted.id.to_string());
        assert_eq!(body["title"], "Brake Service");
        assert_eq!(body["price"], 120);
    }

    #[tokio::test]
    async fn test_get_unknown_service_is_not_found() {
        let app = build_app(vec![service("Oil Change", 40)]);

        let (status, body) =
            get_json(app, &format!("/services/{}", uuid::Uuid::new_v4())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "service not found");
    }

    #[tokio::test]
    async fn test_get_service_with_malformed_id_is_client_error() {
        let app = build_app(vec![service("Oil Change", 40)]);

        let (status, body) = get_json(app, "/services/64f1c0ffee").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("invalid identifier"));
    }

    #[tokio::test]
    async fn test_get_service_with_non_utf8_id_is_client_error() {
        let app = build_app(vec![service("Oil Change", 40)]);

        let (status, body) = get_json(app, "/services/%FF").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_store_failure_is_internal_error() {
        let app = Router::new()
            .route("/services", get(list_services))
            .route("/services/:id", get(get_service))
            .with_state(
                AppStateBuilder::new()
                    .with_store(Arc::new(FailingDocumentStore))
                    .build(),
            );

        let (status, body) = get_json(app.clone(), "/services").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": "Internal server error"}));

        let (status, _) = get_json(app, &format!("/services/{}", uuid::Uuid::new_v4())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
