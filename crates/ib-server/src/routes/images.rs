//! Image route handlers.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use ib_service::IngestReceipt;
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::error::{tagged, AppError};
use crate::middleware::request_id::RequestId;

/// Query parameters for ingest and update.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SourceQuery {
    /// Source path of the image; its extension selects the format.
    pub path: String,
}

/// Every key in the bucket.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ImageListResponse {
    pub bucket: String,
    pub keys: Vec<String>,
}

/// Result of purging the bucket.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PurgeResponse {
    pub pages: usize,
    pub deleted: usize,
}

/// GET /api/images
#[utoipa::path(
    get,
    path = "/api/images",
    responses(
        (status = 200, description = "All object keys in the bucket", body = ImageListResponse),
        (status = 502, description = "Store unavailable")
    )
)]
pub async fn list_images(
    State(ctx): State<AppContext>,
    Extension(rid): Extension<RequestId>,
) -> Result<Json<ImageListResponse>, AppError> {
    let keys = ctx.service.list().await.map_err(tagged(&rid))?;
    Ok(Json(ImageListResponse {
        bucket: ctx.service.bucket().name().to_string(),
        keys,
    }))
}

/// DELETE /api/images
#[utoipa::path(
    delete,
    path = "/api/images",
    responses(
        (status = 202, description = "Bucket purged", body = PurgeResponse),
        (status = 502, description = "Store unavailable")
    )
)]
pub async fn purge_images(
    State(ctx): State<AppContext>,
    Extension(rid): Extension<RequestId>,
) -> Result<impl IntoResponse, AppError> {
    let summary = ctx.service.purge().await.map_err(tagged(&rid))?;
    Ok((
        StatusCode::ACCEPTED,
        Json(PurgeResponse {
            pages: summary.pages,
            deleted: summary.deleted,
        }),
    ))
}

/// POST /api/images/:category?path=
#[utoipa::path(
    post,
    path = "/api/images/{category}",
    params(
        ("category" = String, Path, description = "Variant category"),
        SourceQuery,
    ),
    request_body(content = Vec<u8>, description = "Raw image bytes", content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Original and variant stored", body = IngestReceipt),
        (status = 400, description = "Invalid category or empty body"),
        (status = 415, description = "Extension is not jpg, jpeg or png"),
        (status = 422, description = "Image could not be decoded or scaled"),
        (status = 502, description = "Upload failed")
    )
)]
pub async fn ingest_image(
    State(ctx): State<AppContext>,
    Extension(rid): Extension<RequestId>,
    Path(category): Path<String>,
    Query(query): Query<SourceQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let receipt = ctx
        .service
        .ingest(&category, &query.path, body)
        .await
        .map_err(tagged(&rid))?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// PUT /api/images/:category?path=
#[utoipa::path(
    put,
    path = "/api/images/{category}",
    params(
        ("category" = String, Path, description = "Variant category"),
        SourceQuery,
    ),
    request_body(content = Vec<u8>, description = "Raw image bytes", content_type = "application/octet-stream"),
    responses(
        (status = 202, description = "Original and variant replaced", body = IngestReceipt),
        (status = 404, description = "No original stored for this path"),
        (status = 415, description = "Extension is not jpg, jpeg or png"),
        (status = 502, description = "Upload failed")
    )
)]
pub async fn update_image(
    State(ctx): State<AppContext>,
    Extension(rid): Extension<RequestId>,
    Path(category): Path<String>,
    Query(query): Query<SourceQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let receipt = ctx
        .service
        .update(&category, &query.path, body)
        .await
        .map_err(tagged(&rid))?;
    Ok((StatusCode::ACCEPTED, Json(receipt)))
}

/// GET /api/images/:category/*reference
#[utoipa::path(
    get,
    path = "/api/images/{category}/{reference}",
    params(
        ("category" = String, Path, description = "Variant category, or `original`"),
        ("reference" = String, Path, description = "Reference returned by ingest"),
    ),
    responses(
        (status = 200, description = "Image bytes", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "No object at this key")
    )
)]
pub async fn get_image(
    State(ctx): State<AppContext>,
    Extension(rid): Extension<RequestId>,
    Path((category, reference)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let image = ctx
        .service
        .fetch(&category, &reference)
        .await
        .map_err(tagged(&rid))?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, image.content_type)],
        image.bytes,
    ))
}

/// DELETE /api/images/:category/*reference
#[utoipa::path(
    delete,
    path = "/api/images/{category}/{reference}",
    params(
        ("category" = String, Path, description = "Variant category, or `original`"),
        ("reference" = String, Path, description = "Reference returned by ingest"),
    ),
    responses(
        (status = 204, description = "Deleted, or was already absent")
    )
)]
pub async fn delete_image(
    State(ctx): State<AppContext>,
    Extension(rid): Extension<RequestId>,
    Path((category, reference)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    ctx.service
        .delete(&category, &reference)
        .await
        .map_err(tagged(&rid))?;
    Ok(StatusCode::NO_CONTENT)
}
