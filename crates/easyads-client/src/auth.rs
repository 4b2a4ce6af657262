// ABOUTME: Login / sign-up form that turns credentials into an established session.
// ABOUTME: Sign-up registers first, then logs in; failures become an inline message.

use easyads_core::{Credentials, Route, SessionStore};

use crate::api::Backend;
use crate::error::{ApiError, GENERIC_ERROR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    SignUp,
}

/// State of the auth dialog.
#[derive(Debug, Clone)]
pub struct AuthForm {
    mode: AuthMode,
    error: Option<String>,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        Self { mode, error: None }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Switch between login and sign-up.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::Login,
        };
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Authenticate and, on success, store the token in `session` and return
    /// the route to continue to. On failure the session is left untouched
    /// and the inline error is set.
    pub async fn submit(
        &mut self,
        backend: &dyn Backend,
        session: &SessionStore,
        credentials: &Credentials,
    ) -> Option<Route> {
        self.error = None;

        match self.authenticate(backend, credentials).await {
            Ok(token) => {
                session.login(token);
                Some(Route::Dashboard)
            }
            Err(e) => {
                tracing::warn!(mode = ?self.mode, email = %credentials.email, error = %e, "authentication failed");
                self.error = Some(e.user_message(GENERIC_ERROR));
                None
            }
        }
    }

    async fn authenticate(
        &self,
        backend: &dyn Backend,
        credentials: &Credentials,
    ) -> Result<String, ApiError> {
        if self.mode == AuthMode::SignUp {
            let user = backend.register(credentials).await?;
            tracing::info!(user_id = user.id, email = %user.email, "account created");
        }
        let token = backend.obtain_token(credentials).await?;
        if token.access_token.trim().is_empty() {
            return Err(ApiError::InvalidResponse(
                "token response carried an empty access_token".to_string(),
            ));
        }
        Ok(token.access_token)
    }
}

impl Default for AuthForm {
    fn default() -> Self {
        Self::new(AuthMode::Login)
    }
}
