// ABOUTME: Defines the Backend trait covering every easyads REST operation.
// ABOUTME: ApiClient implements it over HTTP; pages depend only on the trait.

use async_trait::async_trait;
use easyads_core::{
    Credentials, Generation, GenerationRequest, Product, ProductId, TokenResponse, Upload, User,
};
use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::error::ApiError;
use crate::http::ApiClient;

/// The remote operations the client consumes. Each method is one HTTP call;
/// none retries.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /token` with form-encoded `username` + `password`.
    async fn obtain_token(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError>;

    /// `POST /users/` with JSON `{ email, password }`.
    async fn register(&self, credentials: &Credentials) -> Result<User, ApiError>;

    /// `GET /products/`
    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;

    /// `POST /products/` as multipart `name`, `description`, `file`.
    async fn create_product(
        &self,
        name: &str,
        description: &str,
        file: &Upload,
    ) -> Result<Product, ApiError>;

    /// `GET /generations/{product_id}`
    async fn list_generations(&self, product_id: ProductId) -> Result<Vec<Generation>, ApiError>;

    /// `POST /generate/` with JSON `{ product_id, prompt }`.
    async fn request_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<Generation, ApiError>;
}

#[derive(Serialize)]
struct TokenForm<'a> {
    username: &'a str,
    password: &'a str,
}

#[async_trait]
impl Backend for ApiClient {
    async fn obtain_token(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        let form = TokenForm {
            username: &credentials.email,
            password: &credentials.password,
        };
        self.post_credentials("/token", &form).await
    }

    async fn register(&self, credentials: &Credentials) -> Result<User, ApiError> {
        self.post_json("/users/", credentials).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get("/products/").await
    }

    async fn create_product(
        &self,
        name: &str,
        description: &str,
        file: &Upload,
    ) -> Result<Product, ApiError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| ApiError::InvalidRequest(format!("bad content type: {}", e)))?;

        let form = Form::new()
            .text("name", name.to_string())
            .text("description", description.to_string())
            .part("file", part);

        self.post_multipart("/products/", form).await
    }

    async fn list_generations(&self, product_id: ProductId) -> Result<Vec<Generation>, ApiError> {
        self.get(&format!("/generations/{}", product_id)).await
    }

    async fn request_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<Generation, ApiError> {
        self.post_json("/generate/", request).await
    }
}
