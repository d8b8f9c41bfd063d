//! Axum router construction.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health_check,
        routes::images::list_images,
        routes::images::purge_images,
        routes::images::ingest_image,
        routes::images::update_image,
        routes::images::get_image,
        routes::images::delete_image,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::images::ImageListResponse,
        routes::images::PurgeResponse,
        ib_service::IngestReceipt,
        ib_core::ImageFormat,
    ))
)]
struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route(
            "/images",
            get(routes::images::list_images).delete(routes::images::purge_images),
        )
        .route(
            "/images/{category}",
            axum::routing::post(routes::images::ingest_image).put(routes::images::update_image),
        )
        .route(
            "/images/{category}/{*reference}",
            get(routes::images::get_image).delete(routes::images::delete_image),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use ib_image::ImageOptimizer;
    use ib_service::ImageService;
    use ib_store::{BlobStoreGateway, MemoryStore};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app() -> Router {
        let gateway = Arc::new(BlobStoreGateway::new(Arc::new(MemoryStore::new())));
        let bucket = gateway.ensure_bucket("images").await.unwrap();
        let service = ImageService::new(gateway, bucket, ImageOptimizer::new());
        build_router(AppContext::new(service))
    }

    #[tokio::test]
    async fn health_is_ok_and_echoes_request_id() {
        let resp = app()
            .await
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("x-request-id").unwrap(), "abc-123");
    }

    #[tokio::test]
    async fn unsupported_format_error_body_has_request_id() {
        let resp = app()
            .await
            .oneshot(
                Request::post("/api/images/thumb?path=anim.gif")
                    .header("x-request-id", "req-gif")
                    .body(Body::from("GIF89a"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "unsupported_format");
        assert_eq!(json["request_id"], "req-gif");
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let resp = app()
            .await
            .oneshot(
                Request::get("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["paths"]["/api/images/{category}"].is_object());
    }
}
