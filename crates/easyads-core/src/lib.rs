// ABOUTME: Core library for easyads, containing domain types, routes, and session state.
// ABOUTME: This crate defines the session store and route guard every page depends on.

pub mod guard;
pub mod model;
pub mod route;
pub mod session;
pub mod storage;

pub use guard::{GuardDecision, GuardState, RouteGuard};
pub use model::{
    Credentials, Generation, GenerationRequest, GenerationStatus, Product, ProductId,
    TokenResponse, Upload, User,
};
pub use route::{Route, RouteError};
pub use session::{Session, SessionState, SessionStore};
pub use storage::{MemoryTokenStore, StorageError, TOKEN_KEY, TokenStore};
