use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use random_quotes::quotes::QuoteService;
use random_quotes::server::{router, AppState};
use std::path::Path;
use tower::ServiceExt;

async fn get(path: &Path, uri: &str) -> (StatusCode, Option<String>, String) {
    let app = router(AppState::new(QuoteService::new(path)), true);
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post_json(uri: &str, body: &serde_json::Value) -> (StatusCode, serde_json::Value) {
    let app = router(AppState::new(QuoteService::new("quotes.json")), false);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

fn assert_frames_close(left: &serde_json::Value, right: &serde_json::Value) {
    assert_eq!(left["tick"], right["tick"]);
    let left = left["hearts"].as_array().unwrap();
    let right = right["hearts"].as_array().unwrap();
    assert_eq!(left.len(), right.len());
    for (a, b) in left.iter().zip(right) {
        for key in ["x", "y", "z", "rx", "ry"] {
            let (a, b) = (a[key].as_f64().unwrap(), b[key].as_f64().unwrap());
            assert!((a - b).abs() < 1e-9, "{}: {} vs {}", key, a, b);
        }
    }
}

fn write_store(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("quotes.json");
    std::fs::write(
        &path,
        r#"{"siteA": {"en": ["Hello"], "ru": ["Привет"]}, "siteB": {"en": ["World"]}}"#,
    )
    .unwrap();
    path
}

#[tokio::test]
async fn test_quote_endpoint_returns_plain_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_store(&dir);

    let (status, content_type, body) = get(&path, "/quote?lang=en").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert!(body == "Hello" || body == "World");

    let (status, _, body) = get(&path, "/quote?lang=any").await;
    assert_eq!(status, StatusCode::OK);
    assert!(["Hello", "Привет", "World"].contains(&body.as_str()));

    let (status, _, body) = get(&path, "/quote").await;
    assert_eq!(status, StatusCode::OK);
    assert!(["Hello", "Привет", "World"].contains(&body.as_str()));
}

#[tokio::test]
async fn test_quote_endpoint_error_texts() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_store(&dir);

    let (status, _, body) = get(&path, "/quote?lang=fr").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "В данных JSON не найдено цитат на языке fr.");

    let missing = dir.path().join("missing.json");
    let (status, _, body) = get(&missing, "/quote").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Ошибка: Файл missing.json не найден.");

    let empty = dir.path().join("empty.json");
    std::fs::write(&empty, "[]").unwrap();
    let (status, _, body) = get(&empty, "/quote?lang=en").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "В данных JSON не найдено цитат.");
}

#[tokio::test]
async fn test_index_page_uses_quote_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_store(&dir);

    let (status, content_type, body) = get(&path, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(body.contains("language-select"));
    assert!(body.contains("/quote?lang="));
    for lang in ["any", "ru", "en", "es", "fr", "de"] {
        assert!(body.contains(&format!("value=\"{}\"", lang)));
    }
}

#[tokio::test]
async fn test_hearts_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_store(&dir);

    let (status, _, body) = get(&path, "/hearts?aspect=2&ticks=5&seed=9").await;
    assert_eq!(status, StatusCode::OK);
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["bounds"]["max_x"], 30.0);
    assert_eq!(value["frames"].as_array().unwrap().len(), 5);
    assert_eq!(value["frames"][0]["hearts"].as_array().unwrap().len(), 13);

    let (status, _, _) = get(&path, "/hearts?aspect=-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let (status, _, body) = get(dir.path(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_quote_uses_first_lang_parameter() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_store(&dir);

    let (status, _, body) = get(&path, "/quote?lang=fr&lang=en").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "В данных JSON не найдено цитат на языке fr.");

    let (status, _, body) = get(&path, "/quote?lang=ru&lang=en").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Привет");
}

#[tokio::test]
async fn test_quote_language_keys_keep_their_case() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quotes.json");
    std::fs::write(&path, r#"{"siteA": {"EN": ["Hello"], "pt-BR": ["Olá"]}}"#).unwrap();

    let (status, _, body) = get(&path, "/quote?lang=EN").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello");

    let (status, _, body) = get(&path, "/quote?lang=pt-BR").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Olá");

    let (status, _, body) = get(&path, "/quote?lang=ANY").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body == "Hello" || body == "Olá");
}

#[tokio::test]
async fn test_hearts_batches_join_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_store(&dir);

    let (_, _, whole) = get(&path, "/hearts?aspect=1.5&ticks=20&seed=42").await;
    let whole: serde_json::Value = serde_json::from_str(&whole).unwrap();

    let (_, _, first) = get(&path, "/hearts?aspect=1.5&ticks=10&seed=42").await;
    let first: serde_json::Value = serde_json::from_str(&first).unwrap();

    let (status, second) = post_json(
        "/hearts",
        &serde_json::json!({
            "bounds": first["bounds"],
            "hearts": first["hearts"],
            "aspect": 1.5,
            "start": 10,
            "ticks": 10,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let second_frames = second["frames"].as_array().unwrap();
    assert_eq!(second_frames.len(), 10);
    assert_eq!(second_frames[0]["tick"], 11);
    for (offset, frame) in second_frames.iter().enumerate() {
        assert_frames_close(frame, &whole["frames"][10 + offset]);
    }
}

#[tokio::test]
async fn test_hearts_continuation_resizes_without_reset() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_store(&dir);

    let (_, _, first) = get(&path, "/hearts?aspect=1&ticks=1&seed=7").await;
    let first: serde_json::Value = serde_json::from_str(&first).unwrap();

    let (status, resized) = post_json(
        "/hearts",
        &serde_json::json!({
            "bounds": first["bounds"],
            "hearts": first["hearts"],
            "aspect": 2.0,
            "start": 1,
            "ticks": 0,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resized["bounds"]["max_x"], 30.0);
    let before = first["hearts"].as_array().unwrap();
    let after = resized["hearts"].as_array().unwrap();
    assert_eq!(before.len(), after.len());
    for (a, b) in before.iter().zip(after) {
        for axis in ["x", "y", "z"] {
            let (a, b) = (
                a["position"][axis].as_f64().unwrap(),
                b["position"][axis].as_f64().unwrap(),
            );
            assert!((a - b).abs() < 1e-9);
        }
    }

    let (status, _) = post_json(
        "/hearts",
        &serde_json::json!({
            "bounds": first["bounds"],
            "hearts": first["hearts"],
            "aspect": 0.0,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
