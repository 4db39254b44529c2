//! # Static Catalog
//!
//! In-memory data providers. The placeholder catalog stands in for the
//! content-management backend until real lookups are wired; the same type
//! serves catalogs loaded from JSON documents.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{Client, Kernel, KernelScope, Product, ProviderError};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::ports::{ClientProvider, KernelProvider, ProductProvider};

/// Key of the kernel list served for scopes without their own entry.
pub const FALLBACK_KERNELS: &str = "*";

/// Serialized catalog.
///
/// ```json
/// {
///   "clients": [{ "id": 1, "name": "web-01" }],
///   "products": [{ "id": 7, "name": "SLES 15 SP5" }],
///   "kernels": {
///     "client:1": [{ "id": 345, "version": "1.2.3" }],
///     "*": [{ "id": 456, "version": "1.2.4", "default": true }]
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Client list.
    #[serde(default)]
    pub clients: Vec<Client>,
    /// Product list.
    #[serde(default)]
    pub products: Vec<Product>,
    /// Kernel lists keyed by scope (`client:<id>`, `product:<id>` or `*`).
    #[serde(default)]
    pub kernels: BTreeMap<String, Vec<Kernel>>,
}

/// Provider serving a fixed catalog for all three lookups.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    document: CatalogDocument,
    latency: Option<Duration>,
}

impl StaticCatalog {
    /// Serve `document` as is.
    pub fn new(document: CatalogDocument) -> Self {
        Self {
            document,
            latency: None,
        }
    }

    /// The placeholder catalog: three clients, one product and the same two
    /// kernels for every scope.
    pub fn placeholder() -> Self {
        let clients = (1..=3)
            .map(|id| Client::new(id, format!("Placeholder Client {id}")))
            .collect();
        let products = vec![Product::new(1, "SLES product 1")];
        let kernels = BTreeMap::from([(
            FALLBACK_KERNELS.to_string(),
            vec![Kernel::new(345, "1.2.3"), Kernel::new(456, "1.2.4").as_default()],
        )]);

        Self::new(CatalogDocument {
            clients,
            products,
            kernels,
        })
    }

    /// Parse a catalog document.
    pub fn from_json(json: &str) -> Result<Self, ProviderError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Read and parse a catalog document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ProviderError::Unavailable(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Delay every answer, imitating a remote backend.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// The served catalog.
    pub fn document(&self) -> &CatalogDocument {
        &self.document
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::placeholder()
    }
}

#[async_trait]
impl ClientProvider for StaticCatalog {
    async fn get_clients(&self) -> Result<Vec<Client>, ProviderError> {
        self.delay().await;
        Ok(self.document.clients.clone())
    }
}

#[async_trait]
impl ProductProvider for StaticCatalog {
    async fn get_products(&self) -> Result<Vec<Product>, ProviderError> {
        self.delay().await;
        Ok(self.document.products.clone())
    }
}

#[async_trait]
impl KernelProvider for StaticCatalog {
    async fn get_kernels(&self, scope: KernelScope) -> Result<Vec<Kernel>, ProviderError> {
        self.delay().await;

        let kernels = &self.document.kernels;
        if let Some(list) = kernels.get(&scope.to_string()) {
            return Ok(list.clone());
        }
        debug!(%scope, "No kernel list for scope, using fallback");
        kernels
            .get(FALLBACK_KERNELS)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownScope(scope.to_string()))
    }
}

/// Provider whose every lookup fails with [`ProviderError::Unavailable`].
#[derive(Debug, Clone)]
pub struct FailingProvider {
    reason: String,
}

impl FailingProvider {
    /// Fail with `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> ProviderError {
        ProviderError::Unavailable(self.reason.clone())
    }
}

#[async_trait]
impl ClientProvider for FailingProvider {
    async fn get_clients(&self) -> Result<Vec<Client>, ProviderError> {
        Err(self.error())
    }
}

#[async_trait]
impl ProductProvider for FailingProvider {
    async fn get_products(&self) -> Result<Vec<Product>, ProviderError> {
        Err(self.error())
    }
}

#[async_trait]
impl KernelProvider for FailingProvider {
    async fn get_kernels(&self, _scope: KernelScope) -> Result<Vec<Kernel>, ProviderError> {
        Err(self.error())
    }
}
