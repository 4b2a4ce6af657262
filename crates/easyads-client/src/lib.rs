// ABOUTME: Client library for easyads: authenticated HTTP wrapper, typed API calls, and page fetchers.
// ABOUTME: Pages load through the Backend trait so they run against the real API or an in-memory stub.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod testing;
pub mod views;

pub use api::Backend;
pub use app::{App, Page};
pub use auth::{AuthForm, AuthMode};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ErrorKind};
pub use http::ApiClient;
pub use views::{CreateProductForm, Dashboard, Load, MountHandle, ProductDetail, ProductPage};
