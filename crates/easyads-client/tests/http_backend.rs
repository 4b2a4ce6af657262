// ABOUTME: Wire-level tests for ApiClient against an in-process Axum mock of the easyads API.
// ABOUTME: Verifies bearer handling, request encodings, server error details, and 401 session handling.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use easyads_client::{ApiClient, ApiError, AuthForm, Backend, ErrorKind};
use easyads_core::{
    Credentials, GenerationRequest, MemoryTokenStore, SessionStore, TokenStore, Upload,
};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Value, json};

const EMAIL: &str = "a@b.com";
const PASSWORD: &str = "x";
const TOKEN: &str = "T1";

/// One request as the mock saw it.
#[derive(Debug, Clone)]
struct Seen {
    path: String,
    authorization: Option<String>,
    cache_control: Option<String>,
}

#[derive(Debug, Clone)]
struct SeenUpload {
    name: String,
    description: String,
    file_name: String,
    content_type: String,
    len: usize,
}

#[derive(Default)]
struct MockState {
    products: Vec<Value>,
    generations: HashMap<i64, Vec<Value>>,
    next_id: i64,
    seen: Vec<Seen>,
    uploads: Vec<SeenUpload>,
    registered: Vec<String>,
}

type Shared = Arc<Mutex<MockState>>;
type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn record(state: &Shared, path: &str, headers: &HeaderMap) {
    state.lock().unwrap().seen.push(Seen {
        path: path.to_string(),
        authorization: header(headers, "authorization"),
        cache_control: header(headers, "cache-control"),
    });
}

fn reject(status: StatusCode, detail: Value) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": detail })))
}

fn authorize(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    match header(headers, "authorization") {
        Some(h) if h == format!("Bearer {}", TOKEN) => Ok(()),
        _ => Err(reject(
            StatusCode::UNAUTHORIZED,
            json!("Could not validate credentials"),
        )),
    }
}

#[derive(Deserialize)]
struct TokenForm {
    username: String,
    password: String,
}

async fn token(State(state): State<Shared>, headers: HeaderMap, Form(form): Form<TokenForm>) -> Reply {
    record(&state, "/token", &headers);
    if form.username == EMAIL && form.password == PASSWORD {
        Ok(Json(json!({ "access_token": TOKEN, "token_type": "bearer" })))
    } else {
        Err(reject(
            StatusCode::UNAUTHORIZED,
            json!("Incorrect username or password"),
        ))
    }
}

async fn register(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    record(&state, "/users/", &headers);
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if !email.contains('@') {
        return Err(reject(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!([{ "loc": ["body", "email"], "msg": "value is not a valid email address" }]),
        ));
    }
    let mut state = state.lock().unwrap();
    if state.registered.contains(&email) {
        return Err(reject(StatusCode::BAD_REQUEST, json!("Email already registered")));
    }
    state.registered.push(email.clone());
    state.next_id += 1;
    Ok(Json(json!({ "id": state.next_id, "email": email })))
}

async fn list_products(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    record(&state, "/products/", &headers);
    authorize(&headers)?;
    Ok(Json(Value::Array(state.lock().unwrap().products.clone())))
}

async fn create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Reply {
    record(&state, "/products/", &headers);
    authorize(&headers)?;

    let mut upload = SeenUpload {
        name: String::new(),
        description: String::new(),
        file_name: String::new(),
        content_type: String::new(),
        len: 0,
    };
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => upload.name = field.text().await.unwrap(),
            "description" => upload.description = field.text().await.unwrap(),
            "file" => {
                upload.file_name = field.file_name().unwrap_or_default().to_string();
                upload.content_type = field.content_type().unwrap_or_default().to_string();
                upload.len = field.bytes().await.unwrap().len();
            }
            _ => {}
        }
    }

    let mut state = state.lock().unwrap();
    state.next_id += 1;
    let product = json!({
        "id": state.next_id,
        "name": upload.name,
        "description": upload.description,
        "image_url": format!("http://localhost:8000/uploads/{}", upload.file_name),
        "user_id": 1,
    });
    state.products.push(product.clone());
    state.uploads.push(upload);
    Ok(Json(product))
}

async fn list_generations(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(product_id): Path<i64>,
) -> Reply {
    record(&state, &format!("/generations/{}", product_id), &headers);
    authorize(&headers)?;
    let state = state.lock().unwrap();
    Ok(Json(Value::Array(
        state.generations.get(&product_id).cloned().unwrap_or_default(),
    )))
}

async fn generate(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    record(&state, "/generate/", &headers);
    authorize(&headers)?;
    let product_id = body["product_id"].as_i64().unwrap_or_default();
    let mut state = state.lock().unwrap();
    if !state.products.iter().any(|p| p["id"] == product_id) {
        return Err(reject(StatusCode::NOT_FOUND, json!("Product not found")));
    }
    state.next_id += 1;
    let id = state.next_id;
    let generation = json!({
        "id": id,
        "prompt": body["prompt"],
        "result_image_url": format!("https://cdn.example.com/{}.png", id),
        "result_video_url": format!("https://cdn.example.com/{}.mp4", id),
        "status": "completed",
    });
    state
        .generations
        .entry(product_id)
        .or_default()
        .push(generation.clone());
    Ok(Json(generation))
}

/// Start the mock API on an ephemeral port and return its base URL.
async fn spawn_mock() -> (Url, Shared) {
    let state: Shared = Arc::new(Mutex::new(MockState::default()));
    let app = Router::new()
        .route("/token", post(token))
        .route("/users/", post(register))
        .route("/products/", get(list_products).post(create_product))
        .route("/generations/{product_id}", get(list_generations))
        .route("/generate/", post(generate))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (Url::parse(&format!("http://{}", addr)).unwrap(), state)
}

fn client(base: &Url, storage: Arc<MemoryTokenStore>) -> ApiClient {
    ApiClient::new(base, SessionStore::hydrated(storage))
}

fn seen(state: &Shared) -> Vec<Seen> {
    state.lock().unwrap().seen.clone()
}

#[tokio::test]
async fn login_attaches_bearer_to_later_requests() {
    let (base, state) = spawn_mock().await;
    let api = client(&base, Arc::new(MemoryTokenStore::new()));
    let mut form = AuthForm::default();

    form.submit(&api, api.session(), &Credentials::new(EMAIL, PASSWORD))
        .await
        .expect("login should succeed");
    assert_eq!(api.session().token().as_deref(), Some(TOKEN));

    let products = api.list_products().await.unwrap();
    assert!(products.is_empty());

    let seen = seen(&state);
    assert_eq!(seen[0].path, "/token");
    assert_eq!(seen[0].authorization, None);
    assert_eq!(seen[1].path, "/products/");
    assert_eq!(seen[1].authorization.as_deref(), Some("Bearer T1"));
    assert!(seen.iter().all(|s| s.cache_control.as_deref() == Some("no-store")));
}

#[tokio::test]
async fn no_session_means_no_authorization_header() {
    let (base, state) = spawn_mock().await;
    let api = client(&base, Arc::new(MemoryTokenStore::new()));

    let err = api.list_products().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(err.server_message(), Some("Could not validate credentials"));
    assert_eq!(seen(&state)[0].authorization, None);
}

#[tokio::test]
async fn logout_drops_token_from_next_request() {
    let (base, state) = spawn_mock().await;
    let api = client(&base, Arc::new(MemoryTokenStore::new()));
    api.session().login(TOKEN);
    api.list_products().await.unwrap();

    api.session().logout().unwrap();
    let _ = api.list_products().await;

    let seen = seen(&state);
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer T1"));
    assert_eq!(seen[1].authorization, None);
}

#[tokio::test]
async fn rejected_token_ends_session() {
    let (base, _state) = spawn_mock().await;
    let storage = Arc::new(MemoryTokenStore::new());
    let api = client(&base, storage.clone());
    api.session().login("expired");

    let err = api.list_products().await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(!api.session().is_authenticated());
    assert_eq!(storage.load().unwrap(), None);
}

#[tokio::test]
async fn bad_credentials_keep_existing_session() {
    let (base, _state) = spawn_mock().await;
    let api = client(&base, Arc::new(MemoryTokenStore::new()));
    api.session().login(TOKEN);
    let mut form = AuthForm::default();

    let next = form
        .submit(&api, api.session(), &Credentials::new(EMAIL, "wrong"))
        .await;

    assert_eq!(next, None);
    assert_eq!(form.error(), Some("Incorrect username or password"));
    assert_eq!(api.session().token().as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn register_reports_validation_and_duplicates() {
    let (base, _state) = spawn_mock().await;
    let api = client(&base, Arc::new(MemoryTokenStore::new()));

    let err = api
        .register(&Credentials::new("not-an-email", "pw"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        err.server_message(),
        Some("value is not a valid email address")
    );

    let user = api.register(&Credentials::new(EMAIL, PASSWORD)).await.unwrap();
    assert_eq!(user.email, EMAIL);

    let dup = api
        .register(&Credentials::new(EMAIL, PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(dup.user_message("fallback"), "Email already registered");
}

#[tokio::test]
async fn create_product_sends_multipart_fields() {
    let (base, state) = spawn_mock().await;
    let api = client(&base, Arc::new(MemoryTokenStore::with_token(TOKEN)));
    let file = Upload::new("jacket.png", vec![7u8; 64]);

    let product = api
        .create_product("Vintage Denim Jacket", "Washed blue", &file)
        .await
        .unwrap();
    assert_eq!(product.name, "Vintage Denim Jacket");
    assert!(product.image_url.ends_with("/uploads/jacket.png"));

    let upload = state.lock().unwrap().uploads[0].clone();
    assert_eq!(upload.name, "Vintage Denim Jacket");
    assert_eq!(upload.description, "Washed blue");
    assert_eq!(upload.file_name, "jacket.png");
    assert_eq!(upload.content_type, "image/png");
    assert_eq!(upload.len, 64);

    let products = api.list_products().await.unwrap();
    assert_eq!(products.iter().filter(|p| p.id == product.id).count(), 1);
}

#[tokio::test]
async fn generation_appears_in_product_generations() {
    let (base, _state) = spawn_mock().await;
    let api = client(&base, Arc::new(MemoryTokenStore::with_token(TOKEN)));
    let product = api
        .create_product("Jacket", "Denim", &Upload::new("j.jpg", vec![1, 2, 3]))
        .await
        .unwrap();

    let created = api
        .request_generation(&GenerationRequest {
            product_id: product.id,
            prompt: "neon city street at night".to_string(),
        })
        .await
        .unwrap();
    assert!(created.status.is_terminal());

    let first = api.list_generations(product.id).await.unwrap();
    assert_eq!(first.iter().filter(|g| g.id == created.id).count(), 1);
    assert_eq!(first[0].prompt, "neon city street at night");

    let second = api.list_generations(product.id).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn generation_for_unknown_product_is_not_found() {
    let (base, _state) = spawn_mock().await;
    let api = client(&base, Arc::new(MemoryTokenStore::with_token(TOKEN)));

    let err = api
        .request_generation(&GenerationRequest {
            product_id: 999,
            prompt: "x".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.server_message(), Some("Product not found"));
    assert!(api.session().is_authenticated(), "404 must not end the session");
}

#[tokio::test]
async fn undecodable_body_is_invalid_response() {
    let app = Router::new().route("/products/", get(|| async { "not json" }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    let base = Url::parse(&format!("http://{}", addr)).unwrap();
    let api = client(&base, Arc::new(MemoryTokenStore::new()));

    let err = api.list_products().await.unwrap_err();

    assert!(matches!(err, ApiError::InvalidResponse(_)));
}
