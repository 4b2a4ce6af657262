// ABOUTME: Test utilities for easyads-client, including an in-memory Backend.
// ABOUTME: Used in tests to drive pages and the app shell without a running server.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use easyads_core::{
    Credentials, Generation, GenerationRequest, GenerationStatus, Product, ProductId,
    TokenResponse, Upload, User,
};

use crate::api::Backend;
use crate::error::ApiError;

#[derive(Default)]
struct StubState {
    users: Vec<(User, String)>,
    products: Vec<Product>,
    generations: HashMap<ProductId, Vec<Generation>>,
    next_id: i64,
    calls: Vec<String>,
    failures: VecDeque<(String, ApiError)>,
    issued_token: Option<String>,
}

impl StubState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Record the call and pop an injected failure for it, if any.
    fn enter(&mut self, op: &str) -> Result<(), ApiError> {
        self.calls.push(op.to_string());
        if let Some(pos) = self.failures.iter().position(|(name, _)| name == op)
            && let Some((_, err)) = self.failures.remove(pos)
        {
            return Err(err);
        }
        Ok(())
    }
}

/// An in-memory backend that behaves like the real API for a single user
/// namespace: credentials are checked, products and generations are stored
/// and listed back. Tokens are not checked on reads.
#[derive(Default)]
pub struct StubBackend {
    state: Mutex<StubState>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register an account.
    pub fn with_user(self, email: &str, password: &str) -> Self {
        {
            let mut state = self.lock();
            let id = state.next_id();
            state.users.push((
                User {
                    id,
                    email: email.to_string(),
                },
                password.to_string(),
            ));
        }
        self
    }

    /// Hand out `token` on every successful sign-in instead of `token-<user id>`.
    pub fn with_issued_token(self, token: &str) -> Self {
        self.lock().issued_token = Some(token.to_string());
        self
    }

    /// Pre-create a product, returning its id.
    pub fn seed_product(&self, name: &str, description: &str) -> ProductId {
        let mut state = self.lock();
        let id = state.next_id();
        state.products.push(Product {
            id,
            name: name.to_string(),
            description: description.to_string(),
            image_url: format!("http://localhost:8000/uploads/{}.png", id),
            user_id: None,
        });
        id
    }

    /// Make the next call to `op` (a Backend method name) fail with `err`.
    pub fn fail_next(&self, op: &str, err: ApiError) {
        self.lock().failures.push_back((op.to_string(), err));
    }

    /// Backend method names in the order they were called.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StubState> {
        // A poisoned stub means a test already panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Backend for StubBackend {
    async fn obtain_token(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        let mut state = self.lock();
        state.enter("obtain_token")?;
        let known = state
            .users
            .iter()
            .find(|(user, password)| user.email == credentials.email && *password == credentials.password);
        match known {
            Some((user, _)) => Ok(TokenResponse {
                access_token: state
                    .issued_token
                    .clone()
                    .unwrap_or_else(|| format!("token-{}", user.id)),
                token_type: Some("bearer".to_string()),
            }),
            None => Err(ApiError::Status {
                status: 401,
                message: Some("Incorrect username or password".to_string()),
            }),
        }
    }

    async fn register(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let mut state = self.lock();
        state.enter("register")?;
        if state.users.iter().any(|(u, _)| u.email == credentials.email) {
            return Err(ApiError::Status {
                status: 400,
                message: Some("Email already registered".to_string()),
            });
        }
        let user = User {
            id: state.next_id(),
            email: credentials.email.clone(),
        };
        state.users.push((user.clone(), credentials.password.clone()));
        Ok(user)
    }

    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let mut state = self.lock();
        state.enter("list_products")?;
        Ok(state.products.clone())
    }

    async fn create_product(
        &self,
        name: &str,
        description: &str,
        file: &Upload,
    ) -> Result<Product, ApiError> {
        let mut state = self.lock();
        state.enter("create_product")?;
        let product = Product {
            id: state.next_id(),
            name: name.to_string(),
            description: description.to_string(),
            image_url: format!("http://localhost:8000/uploads/{}", file.file_name),
            user_id: None,
        };
        state.products.push(product.clone());
        Ok(product)
    }

    async fn list_generations(&self, product_id: ProductId) -> Result<Vec<Generation>, ApiError> {
        let mut state = self.lock();
        state.enter("list_generations")?;
        Ok(state.generations.get(&product_id).cloned().unwrap_or_default())
    }

    async fn request_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<Generation, ApiError> {
        let mut state = self.lock();
        state.enter("request_generation")?;
        if !state.products.iter().any(|p| p.id == request.product_id) {
            return Err(ApiError::Status {
                status: 404,
                message: Some("Product not found".to_string()),
            });
        }
        let id = state.next_id();
        let generation = Generation {
            id,
            prompt: request.prompt.clone(),
            result_image_url: Some(format!("https://cdn.example.com/generated/{}.png", id)),
            result_video_url: Some(format!("https://cdn.example.com/generated/{}.mp4", id)),
            status: GenerationStatus::Completed,
        };
        state
            .generations
            .entry(request.product_id)
            .or_default()
            .push(generation.clone());
        Ok(generation)
    }
}
