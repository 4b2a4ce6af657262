// ABOUTME: App shell wiring the session, route guard, and backend together.
// ABOUTME: Navigation goes through the guard; protected pages come back already loaded.

use std::sync::Arc;

use easyads_core::{
    Credentials, GuardDecision, Route, RouteGuard, SessionStore, StorageError,
};
use easyads_store::LocalStorage;

use crate::api::Backend;
use crate::auth::AuthForm;
use crate::config::ClientConfig;
use crate::http::ApiClient;
use crate::views::{CreateProductForm, Dashboard, ProductPage};

/// What navigation produced.
pub enum Page {
    Landing,
    Dashboard(Dashboard),
    CreateProduct(CreateProductForm),
    Product(ProductPage),
    /// The guard sent the user elsewhere.
    Redirect(Route),
}

impl Page {
    /// The route this page is showing, or the redirect target.
    pub fn route(&self) -> Route {
        match self {
            Page::Landing => Route::Landing,
            Page::Dashboard(_) => Route::Dashboard,
            Page::CreateProduct(_) => Route::CreateProduct,
            Page::Product(page) => Route::Product(page.product_id()),
            Page::Redirect(to) => *to,
        }
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Page::Redirect(to) => write!(f, "Redirect({})", to),
            other => write!(f, "Page({})", other.route()),
        }
    }
}

pub struct App {
    session: SessionStore,
    guard: RouteGuard,
    backend: Arc<dyn Backend>,
}

impl App {
    pub fn new(session: SessionStore, backend: Arc<dyn Backend>) -> Self {
        let guard = RouteGuard::new(session.clone());
        Self {
            session,
            guard,
            backend,
        }
    }

    /// Open client storage under the configured home, hydrate the session
    /// from it, and connect to the configured API.
    pub fn bootstrap(config: &ClientConfig) -> Result<Self, StorageError> {
        let storage = LocalStorage::open(&config.home)?;
        let session = SessionStore::hydrated(Arc::new(storage));
        let client = ApiClient::new(&config.api_url, session.clone());
        tracing::debug!(api_url = %config.api_url, home = %config.home.display(), "client bootstrapped");
        Ok(Self::new(session, Arc::new(client)))
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    /// Navigate to `route`. Waits for the session to resolve, then either
    /// renders the page (loading its data) or returns the redirect.
    pub async fn open(&self, route: Route) -> Page {
        match self.guard.resolve(route).await {
            GuardDecision::Render(route) => self.render(route).await,
            GuardDecision::Redirect(to) => Page::Redirect(to),
            // resolve() only returns once the session is resolved
            GuardDecision::Wait => Page::Redirect(Route::Landing),
        }
    }

    async fn render(&self, route: Route) -> Page {
        match route {
            Route::Landing => Page::Landing,
            Route::Dashboard => {
                let mut dashboard = Dashboard::new(self.backend());
                dashboard.load().await;
                Page::Dashboard(dashboard)
            }
            Route::CreateProduct => Page::CreateProduct(CreateProductForm::new(self.backend())),
            Route::Product(id) => {
                let mut page = ProductPage::new(self.backend(), id);
                page.load().await;
                Page::Product(page)
            }
        }
    }

    /// Submit the auth form and, on success, open the page it leads to.
    /// Returns `None` when authentication failed; the form holds the error.
    pub async fn sign_in(&self, form: &mut AuthForm, credentials: &Credentials) -> Option<Page> {
        let next = form
            .submit(self.backend.as_ref(), &self.session, credentials)
            .await?;
        Some(self.open(next).await)
    }

    /// Upload the product, then open the page it leads to. The dashboard is
    /// only fetched after the upload has been confirmed.
    pub async fn create_product(&self, form: &mut CreateProductForm) -> Option<Page> {
        let next = form.submit().await?;
        Some(self.open(next).await)
    }

    /// End the session and return to the landing page.
    pub fn logout(&self) -> Result<Route, StorageError> {
        self.session.logout()?;
        Ok(Route::Landing)
    }
}
