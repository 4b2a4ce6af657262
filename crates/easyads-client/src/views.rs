// ABOUTME: Per-page resource fetchers: dashboard, product detail, and the create-product form.
// ABOUTME: Reads fill local view state; writes await confirmation, then re-run the matching read.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use easyads_core::{Generation, GenerationRequest, Product, ProductId, Route, Upload};

use crate::api::Backend;
use crate::error::{ApiError, GENERIC_ERROR};

/// State of a page's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Load<T> {
    /// No response yet; show a loading indicator.
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Load<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Load::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Load::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Load::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Shared flag telling a page whether it is still on screen. Responses that
/// arrive after [`unmount`](MountHandle::unmount) are dropped.
#[derive(Debug, Clone)]
pub struct MountHandle(Arc<AtomicBool>);

impl MountHandle {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn unmount(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Default for MountHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// The signed-in user's product list (`/dashboard`).
pub struct Dashboard {
    backend: Arc<dyn Backend>,
    products: Load<Vec<Product>>,
    error: Option<String>,
    mount: MountHandle,
}

impl Dashboard {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            products: Load::Loading,
            error: None,
            mount: MountHandle::new(),
        }
    }

    pub fn mount_handle(&self) -> MountHandle {
        self.mount.clone()
    }

    pub fn products(&self) -> &Load<Vec<Product>> {
        &self.products
    }

    /// Error from a reload that failed after the list was already shown.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch the product list. A failed reload keeps the list already shown
    /// and records the error beside it.
    pub async fn load(&mut self) {
        let result = self.backend.list_products().await;
        if !self.mount.is_mounted() {
            tracing::debug!("dashboard unmounted; discarding product list");
            return;
        }

        match result {
            Ok(products) => {
                tracing::debug!(count = products.len(), "products loaded");
                self.products = Load::Ready(products);
                self.error = None;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch products");
                let message = e.user_message("Failed to fetch products");
                if self.products.ready().is_some() {
                    self.error = Some(message);
                } else {
                    self.products = Load::Failed(message);
                }
            }
        }
    }
}

/// A product together with the generations made from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetail {
    pub product: Product,
    pub generations: Vec<Generation>,
}

/// One product and its generated assets (`/product/:id`), plus the
/// generation request form.
pub struct ProductPage {
    backend: Arc<dyn Backend>,
    product_id: ProductId,
    detail: Load<ProductDetail>,
    prompt: String,
    generating: bool,
    error: Option<String>,
    mount: MountHandle,
}

impl ProductPage {
    pub fn new(backend: Arc<dyn Backend>, product_id: ProductId) -> Self {
        Self {
            backend,
            product_id,
            detail: Load::Loading,
            prompt: String::new(),
            generating: false,
            error: None,
            mount: MountHandle::new(),
        }
    }

    pub fn mount_handle(&self) -> MountHandle {
        self.mount.clone()
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn detail(&self) -> &Load<ProductDetail> {
        &self.detail
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Inline error from the last failed action.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Switch to another product. The next [`load`](Self::load) fetches it.
    pub fn set_product(&mut self, product_id: ProductId) {
        if product_id != self.product_id {
            self.product_id = product_id;
            self.detail = Load::Loading;
            self.error = None;
        }
    }

    /// Fetch the product list and this product's generations concurrently.
    /// A failed reload keeps already loaded data and records the error.
    pub async fn load(&mut self) {
        let product_id = self.product_id;
        let (products, generations) = tokio::join!(
            self.backend.list_products(),
            self.backend.list_generations(product_id)
        );
        if !self.mount.is_mounted() {
            tracing::debug!(product_id, "product page unmounted; discarding response");
            return;
        }

        let loaded = products.and_then(|products| {
            let generations = generations?;
            Ok((products, generations))
        });

        match loaded {
            Ok((products, generations)) => {
                match products.into_iter().find(|p| p.id == product_id) {
                    Some(product) => {
                        self.detail = Load::Ready(ProductDetail {
                            product,
                            generations,
                        });
                        self.error = None;
                    }
                    None => {
                        tracing::warn!(product_id, "product not in product list");
                        self.detail = Load::Failed("Product not found".to_string());
                        self.error = None;
                    }
                }
            }
            Err(e) => {
                tracing::error!(product_id, error = %e, "fetch failed");
                let message = e.user_message(GENERIC_ERROR);
                if self.detail.ready().is_some() {
                    self.error = Some(message);
                } else {
                    self.detail = Load::Failed(message);
                }
            }
        }
    }

    /// Submit the current prompt, then reload once the server confirms.
    /// Returns the created generation. The prompt is cleared on success.
    pub async fn generate(&mut self) -> Option<Generation> {
        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() {
            self.error = Some("Prompt is required".to_string());
            return None;
        }

        self.generating = true;
        self.error = None;

        let request = GenerationRequest {
            product_id: self.product_id,
            prompt,
        };
        let result = self.backend.request_generation(&request).await;

        if !self.mount.is_mounted() {
            tracing::debug!(product_id = self.product_id, "product page unmounted; discarding generation result");
            self.generating = false;
            return result.ok();
        }

        let created = match result {
            Ok(generation) => generation,
            Err(e) => {
                tracing::error!(product_id = self.product_id, error = %e, "generation failed");
                self.error = Some(e.user_message("Generation failed"));
                self.generating = false;
                return None;
            }
        };

        tracing::info!(
            product_id = self.product_id,
            generation_id = created.id,
            status = %created.status,
            "generation requested"
        );
        self.prompt.clear();
        self.load().await;
        self.generating = false;
        Some(created)
    }
}

/// Upload form for a new product (`/create`).
pub struct CreateProductForm {
    backend: Arc<dyn Backend>,
    pub name: String,
    pub description: String,
    file: Option<Upload>,
    submitting: bool,
    error: Option<String>,
    created: Option<Product>,
    mount: MountHandle,
}

impl CreateProductForm {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            name: String::new(),
            description: String::new(),
            file: None,
            submitting: false,
            error: None,
            created: None,
            mount: MountHandle::new(),
        }
    }

    pub fn mount_handle(&self) -> MountHandle {
        self.mount.clone()
    }

    pub fn select_file(&mut self, upload: Upload) {
        self.file = Some(upload);
    }

    /// Read a file from disk and select it.
    pub async fn select_path(&mut self, path: &Path) -> Result<(), ApiError> {
        let upload = read_upload(path).await?;
        self.select_file(upload);
        Ok(())
    }

    pub fn file(&self) -> Option<&Upload> {
        self.file.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The product the last successful submit created.
    pub fn created(&self) -> Option<&Product> {
        self.created.as_ref()
    }

    fn validate(&self) -> Result<&Upload, &'static str> {
        if self.name.trim().is_empty() {
            return Err("Product name is required");
        }
        if self.description.trim().is_empty() {
            return Err("Description is required");
        }
        self.file.as_ref().ok_or("Choose an image to upload")
    }

    /// Upload the product. On success returns the route to navigate to,
    /// whose page then loads fresh server state.
    pub async fn submit(&mut self) -> Option<Route> {
        let file = match self.validate() {
            Ok(file) => file.clone(),
            Err(message) => {
                self.error = Some(message.to_string());
                return None;
            }
        };

        self.submitting = true;
        self.error = None;
        let result = self
            .backend
            .create_product(self.name.trim(), self.description.trim(), &file)
            .await;
        self.submitting = false;

        if !self.mount.is_mounted() {
            tracing::debug!("create form unmounted; discarding upload result");
            return None;
        }

        match result {
            Ok(product) => {
                tracing::info!(product_id = product.id, name = %product.name, "product created");
                self.created = Some(product);
                Some(Route::Dashboard)
            }
            Err(e) => {
                tracing::error!(error = %e, "upload failed");
                self.error = Some(e.user_message("Upload failed"));
                None
            }
        }
    }
}

/// Read a local image into an [`Upload`].
pub async fn read_upload(path: &Path) -> Result<Upload, ApiError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Upload {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Upload::new(file_name, bytes))
}
