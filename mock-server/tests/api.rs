use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, User, DEFAULT_TOKEN};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn authed_json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::AUTHORIZATION, format!("Bearer {DEFAULT_TOKEN}"))
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

const NEW_USER: &str = r#"{"name":"My User","gender":"male","email":"my.user@example.com","status":"active"}"#;

// --- list ---

#[tokio::test]
async fn list_users_empty() {
    let resp = app().oneshot(get("/users")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let users: Vec<User> = body_json(resp).await;
    assert!(users.is_empty());
}

// --- create ---

#[tokio::test]
async fn create_user_returns_201() {
    let resp = app()
        .oneshot(authed_json_request("POST", "/users", NEW_USER))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: User = body_json(resp).await;
    assert_eq!(user.id, 1);
    assert_eq!(user.name, "My User");
}

#[tokio::test]
async fn create_user_without_token_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/users")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(NEW_USER.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["message"], "Authentication failed");
}

#[tokio::test]
async fn create_user_invalid_email_returns_422() {
    let resp = app()
        .oneshot(authed_json_request(
            "POST",
            "/users",
            r#"{"name":"x","gender":"male","email":"nope","status":"active"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_user_malformed_json_returns_422() {
    let resp = app()
        .oneshot(authed_json_request("POST", "/users", r#"{"not_name":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- get ---

#[tokio::test]
async fn get_user_not_found() {
    let resp = app().oneshot(get("/users/3527")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_user_bad_id_returns_400() {
    let resp = app().oneshot(get("/users/not-a-number")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- delete ---

#[tokio::test]
async fn delete_user_not_found() {
    let resp = app()
        .oneshot(authed_json_request("DELETE", "/users/2746", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- status / echo ---

#[tokio::test]
async fn status_route_replies_with_requested_code() {
    let resp = app().oneshot(get("/status/503")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_bytes(resp).await, "status 503");
}

#[tokio::test]
async fn echo_reflects_request() {
    let resp = app()
        .oneshot(authed_json_request("PATCH", "/echo?a=1&b=2", r#"{"k":"v"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echoed: serde_json::Value = body_json(resp).await;
    assert_eq!(echoed["method"], "PATCH");
    assert_eq!(echoed["query"], "a=1&b=2");
    assert_eq!(echoed["headers"]["content-type"], "application/json");
    assert_eq!(echoed["body"]["k"], "v");
}

// --- full lifecycle ---

#[tokio::test]
async fn user_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed_json_request("POST", "/users", NEW_USER))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: User = body_json(resp).await;
    let id = created.id;

    // duplicate email is rejected
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed_json_request("POST", "/users", NEW_USER))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // list, filtered by status
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/users?status=active"))
        .await
        .unwrap();
    let users: Vec<User> = body_json(resp).await;
    assert_eq!(users, vec![created.clone()]);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/users?status=inactive"))
        .await
        .unwrap();
    let users: Vec<User> = body_json(resp).await;
    assert!(users.is_empty());

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/users/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: User = body_json(resp).await;
    assert_eq!(fetched, created);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed_json_request("DELETE", &format!("/users/{id}"), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/users/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
