//! Integration tests for the image routes.

mod common;

use common::{jpeg, png, TestHarness};
use ib_core::config::Config;
use image::GenericImageView;

#[tokio::test]
async fn health_reports_backend_and_bucket() {
    let h = TestHarness::with_server().await;
    let resp = reqwest::get(h.url("/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["backend"], "memory");
    assert_eq!(json["bucket"], "images");
}

#[tokio::test]
async fn ingest_returns_receipt_with_derived_keys() {
    let h = TestHarness::with_server().await;
    let resp = h.ingest("thumb", "abcd1234.jpg", jpeg(80, 40)).await;
    assert_eq!(resp.status(), 201);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["original_key"], "original/abcd/1234/abcd1234.jpg");
    assert_eq!(json["variant_key"], "thumb/abcd/1234/abcd1234.jpg");
    assert_eq!(json["reference"], "abcd/1234/abcd1234.jpg");
    assert_eq!(json["format"], "jpg");
    assert_eq!(json["width"], 20);
    assert_eq!(json["height"], 10);
    assert_eq!(h.store.object_count("images"), 2);
}

#[tokio::test]
async fn fetch_returns_variant_bytes() {
    let h = TestHarness::with_server().await;
    let receipt: serde_json::Value = h
        .ingest("web", "ab/cdefgh.png", png(40, 24))
        .await
        .json()
        .await
        .unwrap();
    let reference = receipt["reference"].as_str().unwrap();
    assert_eq!(reference, "ab_c/defg/ab_cdefgh.png");

    let resp = reqwest::get(h.url(&format!("/api/images/web/{reference}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "image/png");

    let body = resp.bytes().await.unwrap();
    let decoded = image::load_from_memory_with_format(&body, image::ImageFormat::Png).unwrap();
    assert_eq!(decoded.dimensions(), (10, 6));
}

#[tokio::test]
async fn fetch_original_returns_source_bytes() {
    let h = TestHarness::with_server().await;
    let source = jpeg(16, 16);
    h.ingest("thumb", "abcd1234.jpg", source.clone()).await;

    let resp = reqwest::get(h.url("/api/images/original/abcd/1234/abcd1234.jpg"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), source.as_slice());
}

#[tokio::test]
async fn fetch_missing_is_404_json() {
    let h = TestHarness::with_server().await;
    let resp = reqwest::get(h.url("/api/images/thumb/none/such.jpg"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    assert!(resp.headers().contains_key("x-request-id"));

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "not_found");
    assert!(json["request_id"].is_string());
}

#[tokio::test]
async fn gif_is_415_and_touches_no_objects() {
    let h = TestHarness::with_server().await;
    let before = h.store.calls().object_calls();

    let resp = h.ingest("thumb", "anim.gif", b"GIF89a".to_vec()).await;
    assert_eq!(resp.status(), 415);
    assert_eq!(h.store.calls().object_calls(), before);
}

#[tokio::test]
async fn garbage_body_is_422() {
    let h = TestHarness::with_server().await;
    let resp = h.ingest("thumb", "abcd1234.png", b"not a png".to_vec()).await;
    assert_eq!(resp.status(), 422);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "optimize_error");
    assert_eq!(h.store.object_count("images"), 0);
}

#[tokio::test]
async fn reserved_category_is_400() {
    let h = TestHarness::with_server().await;
    let resp = h.ingest("original", "abcd1234.png", png(8, 8)).await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn update_requires_existing_image() {
    let h = TestHarness::with_server().await;
    let client = reqwest::Client::new();
    let put = |body: Vec<u8>| {
        client
            .put(h.url("/api/images/thumb"))
            .query(&[("path", "abcd1234.png")])
            .body(body)
            .send()
    };

    assert_eq!(put(png(16, 16)).await.unwrap().status(), 404);

    h.ingest("thumb", "abcd1234.png", png(16, 16)).await;
    let resp = put(png(32, 32)).await.unwrap();
    assert_eq!(resp.status(), 202);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["width"], 8);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let h = TestHarness::with_server().await;
    h.ingest("thumb", "abcd1234.png", png(16, 16)).await;
    let client = reqwest::Client::new();
    let url = h.url("/api/images/thumb/abcd/1234/abcd1234.png");

    assert_eq!(client.delete(&url).send().await.unwrap().status(), 204);
    assert_eq!(client.delete(&url).send().await.unwrap().status(), 204);
    assert_eq!(reqwest::get(&url).await.unwrap().status(), 404);
}

#[tokio::test]
async fn list_and_purge_across_pages() {
    let mut config = Config::default();
    config.storage.page_size = 2;
    let h = TestHarness::with_server_config(config).await;

    for name in ["aaaa0001.png", "bbbb0002.png", "cccc0003.png"] {
        assert_eq!(h.ingest("thumb", name, png(8, 8)).await.status(), 201);
    }

    let json: serde_json::Value = reqwest::get(h.url("/api/images"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["keys"].as_array().unwrap().len(), 6);

    let resp = reqwest::Client::new()
        .delete(h.url("/api/images"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 202);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["deleted"], 6);
    assert_eq!(h.store.object_count("images"), 0);
}
