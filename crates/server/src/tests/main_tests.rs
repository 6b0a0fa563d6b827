use super::*;
use axum::{body, body::Body, http::Request};
use tower::ServiceExt;

async fn test_app() -> (Router, Storage) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let app = build_router(Arc::new(AppState {
        api: ApiContext {
            storage: storage.clone(),
        },
    }));
    (app, storage)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _storage) = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn list_returns_items_in_insertion_order() {
    let (app, storage) = test_app().await;
    storage.create_item("a").await.expect("a");
    storage.create_item("b").await.expect("b");

    let request = Request::get("/items").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let items: Vec<Item> = read_json(response).await;
    let names: Vec<&str> = items.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, ["a", "b"]);
}

#[tokio::test]
async fn create_returns_created_item() {
    let (app, storage) = test_app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/items",
            serde_json::json!({ "name": "fresh" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let created: Item = read_json(response).await;
    assert_eq!(created.name, "fresh");
    assert_eq!(storage.list_items().await.expect("list"), vec![created]);
}

#[tokio::test]
async fn create_with_blank_name_is_bad_request() {
    let (app, _storage) = test_app().await;
    let response = app
        .oneshot(json_request("POST", "/items", serde_json::json!({ "name": " " })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let err: ApiError = read_json(response).await;
    assert!(matches!(err.code, ErrorCode::Validation));
}

#[tokio::test]
async fn update_and_delete_round_trip_through_routes() {
    let (app, storage) = test_app().await;
    let item = storage.create_item("b").await.expect("item");

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/items/{}", item.id.0),
            serde_json::json!({ "name": "B" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Item = read_json(response).await;
    assert_eq!(updated.name, "B");

    let delete = Request::delete(format!("/items/{}", item.id.0))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(delete).await.expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let delete_again = Request::delete(format!("/items/{}", item.id.0))
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(delete_again).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
