//! # Outbound Ports
//!
//! Traits for the collaborators the sub-form depends on: the catalog data
//! providers and the enclosing form's model.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use shared_types::form_model::{id_value, parse_id};
use shared_types::{Client, EntityId, FieldKey, Kernel, KernelScope, Product, ProviderError};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::oneshot;

// =============================================================================
// Data providers
// =============================================================================

/// Source of the client list.
#[async_trait]
pub trait ClientProvider: Send + Sync {
    /// Fetch all clients the user may scope a filter to.
    async fn get_clients(&self) -> Result<Vec<Client>, ProviderError>;
}

/// Source of the product list.
#[async_trait]
pub trait ProductProvider: Send + Sync {
    /// Fetch all products the user may scope a filter to.
    async fn get_products(&self) -> Result<Vec<Product>, ProviderError>;
}

/// Source of kernel lists.
#[async_trait]
pub trait KernelProvider: Send + Sync {
    /// Fetch the kernels available for a client or product.
    async fn get_kernels(&self, scope: KernelScope) -> Result<Vec<Kernel>, ProviderError>;
}

/// The three providers the sub-form loads from.
#[derive(Clone)]
pub struct Providers {
    /// Client list source.
    pub clients: Arc<dyn ClientProvider>,
    /// Product list source.
    pub products: Arc<dyn ProductProvider>,
    /// Kernel list source.
    pub kernels: Arc<dyn KernelProvider>,
}

impl Providers {
    /// Use one value for all three providers.
    pub fn from_catalog<C>(catalog: Arc<C>) -> Self
    where
        C: ClientProvider + ProductProvider + KernelProvider + 'static,
    {
        Self {
            clients: catalog.clone(),
            products: catalog.clone(),
            kernels: catalog,
        }
    }

    /// Replace the kernel provider.
    #[must_use]
    pub fn with_kernels(mut self, kernels: Arc<dyn KernelProvider>) -> Self {
        self.kernels = kernels;
        self
    }
}

// =============================================================================
// Form context
// =============================================================================

/// Read access to the enclosing form's model.
pub trait FormState: Send + Sync {
    /// Current value of a model key.
    fn value(&self, key: &str) -> Option<Value>;

    /// Current value of a recognized key as a nullable id.
    fn id(&self, key: FieldKey) -> Option<EntityId> {
        self.value(key.as_str()).as_ref().and_then(parse_id)
    }
}

/// Write access to the enclosing form's model.
///
/// Implementations must not call back into the sub-form synchronously; the
/// controller writes while holding its state lock.
pub trait ModelWriter: Send + Sync {
    /// Replace the value of one model key.
    fn set_model_value(&self, key: &str, value: Value);
}

/// The enclosing form as seen by the sub-form.
///
/// The writer is optional: a read-only context renders normally and the
/// controller skips every write.
#[derive(Clone)]
pub struct FormContext {
    state: Arc<dyn FormState>,
    writer: Option<Arc<dyn ModelWriter>>,
}

impl FormContext {
    /// Context with both read and write access.
    pub fn new(state: Arc<dyn FormState>, writer: Option<Arc<dyn ModelWriter>>) -> Self {
        Self { state, writer }
    }

    /// Context backed by a single value implementing both sides.
    pub fn shared<M>(model: Arc<M>) -> Self
    where
        M: FormState + ModelWriter + 'static,
    {
        Self {
            state: model.clone(),
            writer: Some(model),
        }
    }

    /// Context without a writer.
    pub fn read_only(state: Arc<dyn FormState>) -> Self {
        Self {
            state,
            writer: None,
        }
    }

    /// Model reader.
    pub fn state(&self) -> &Arc<dyn FormState> {
        &self.state
    }

    /// Model writer, if the enclosing form supplied one.
    pub fn writer(&self) -> Option<&Arc<dyn ModelWriter>> {
        self.writer.as_ref()
    }
}

/// Whether two optional writers are the same instance.
pub fn same_writer(a: Option<&Arc<dyn ModelWriter>>, b: Option<&Arc<dyn ModelWriter>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => std::ptr::eq(
            Arc::as_ptr(a) as *const (),
            Arc::as_ptr(b) as *const (),
        ),
        _ => false,
    }
}

/// Write `kernelId` through an optional writer.
///
/// The single write path the controller uses.
pub(crate) fn write_kernel_id(writer: Option<&Arc<dyn ModelWriter>>, kernel_id: Option<EntityId>) {
    if let Some(writer) = writer {
        writer.set_model_value(FieldKey::KernelId.as_str(), id_value(kernel_id));
    }
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

#[derive(Default)]
struct MockKernelState {
    responses: HashMap<KernelScope, Result<Vec<Kernel>, ProviderError>>,
    gates: HashMap<KernelScope, VecDeque<oneshot::Receiver<()>>>,
    calls: Vec<KernelScope>,
}

/// Scripted kernel provider.
///
/// Answers are configured per scope. A call can be held open with
/// [`MockKernelProvider::hold`] until the returned sender fires (or is
/// dropped), which lets tests choose the order in which loads resolve.
#[derive(Clone, Default)]
pub struct MockKernelProvider {
    state: Arc<Mutex<MockKernelState>>,
}

impl MockKernelProvider {
    /// Create a provider with no scripted answers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `scope` with `kernels`.
    pub fn respond(&self, scope: KernelScope, kernels: Vec<Kernel>) -> &Self {
        self.state.lock().responses.insert(scope, Ok(kernels));
        self
    }

    /// Answer `scope` with an error.
    pub fn fail(&self, scope: KernelScope, error: ProviderError) -> &Self {
        self.state.lock().responses.insert(scope, Err(error));
        self
    }

    /// Hold the next call for `scope` until the returned sender fires.
    pub fn hold(&self, scope: KernelScope) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().gates.entry(scope).or_default().push_back(rx);
        tx
    }

    /// Scopes requested so far, in call order.
    pub fn calls(&self) -> Vec<KernelScope> {
        self.state.lock().calls.clone()
    }
}

#[async_trait]
impl KernelProvider for MockKernelProvider {
    async fn get_kernels(&self, scope: KernelScope) -> Result<Vec<Kernel>, ProviderError> {
        let gate = {
            let mut state = self.state.lock();
            state.calls.push(scope);
            state.gates.get_mut(&scope).and_then(VecDeque::pop_front)
        };

        if let Some(gate) = gate {
            // A dropped sender releases the call as well.
            let _ = gate.await;
        }

        self.state
            .lock()
            .responses
            .get(&scope)
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::UnknownScope(scope.to_string())))
    }
}
