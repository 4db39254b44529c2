//! Selection Controller
//!
//! Keeps the kernel list and `kernelId` consistent with the template and the
//! scoping ids across asynchronous provider loads.
//!
//! Every kernel derivation captures a [`RequestKey`]. A provider result is
//! committed only while its key is still current and the controller has not
//! been torn down, so a slow answer for an earlier scope can never overwrite
//! the answer for a later one.

use cm_telemetry::{
    metric_inc, HistogramTimer, KERNEL_LOADS, KERNEL_LOAD_DURATION, PROVIDER_FAILURES,
    STALE_RESULTS,
};
use parking_lot::Mutex;
use shared_types::{EntityId, FieldKey, KernelScope, ProviderError, Template};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{
    active_scope, select_default_kernel, KernelStatus, RequestKey, SelectionSnapshot,
    StalePolicy,
};
use crate::ports::{same_writer, write_kernel_id, FormContext, Providers};

/// Values the kernel derivation reacts to.
#[derive(Clone)]
pub struct DrivingInputs {
    /// Active template.
    pub template: Template,
    /// `clientId` from the model.
    pub client_id: Option<EntityId>,
    /// `productId` from the model.
    pub product_id: Option<EntityId>,
    /// Context the values were read from; its writer takes part in change detection.
    pub context: FormContext,
}

impl DrivingInputs {
    /// Read the driving values from the form model.
    pub fn read(template: Template, context: &FormContext) -> Self {
        let state = context.state();
        Self {
            template,
            client_id: state.id(FieldKey::ClientId),
            product_id: state.id(FieldKey::ProductId),
            context: context.clone(),
        }
    }

    /// Scope kernels must be loaded for.
    pub fn scope(&self) -> Option<KernelScope> {
        active_scope(self.template, self.client_id, self.product_id)
    }

    fn same_as(&self, other: &Self) -> bool {
        self.template == other.template
            && self.client_id == other.client_id
            && self.product_id == other.product_id
            && same_writer(self.context.writer(), other.context.writer())
    }
}

/// Controller configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerConfig {
    /// What happens to a kernel load once a newer derivation supersedes it.
    pub stale_policy: StalePolicy,
}

#[derive(Default)]
struct ControllerState {
    snapshot: SelectionSnapshot,
    activated: bool,
    torn_down: bool,
    generation: u64,
    current: Option<RequestKey>,
    last_inputs: Option<DrivingInputs>,
    kernel_task: Option<JoinHandle<()>>,
    background: Vec<JoinHandle<()>>,
}

/// Selection controller for the live-patching filter fields.
///
/// Must be used from within a tokio runtime: provider loads run as spawned
/// tasks.
pub struct SelectionController {
    providers: Providers,
    config: ControllerConfig,
    state: Arc<Mutex<ControllerState>>,
    shutdown: watch::Sender<bool>,
}

impl SelectionController {
    /// Create an inactive controller.
    pub fn new(providers: Providers) -> Self {
        Self::with_config(providers, ControllerConfig::default())
    }

    /// Create an inactive controller with custom configuration.
    pub fn with_config(providers: Providers, config: ControllerConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            providers,
            config,
            state: Arc::new(Mutex::new(ControllerState::default())),
            shutdown,
        }
    }

    /// Start the one-time client and product loads.
    ///
    /// Both loads run concurrently; calling this again is a no-op.
    pub fn activate(&self) {
        let mut state = self.state.lock();
        if state.activated || state.torn_down {
            return;
        }
        state.activated = true;
        info!("Live patching filter fields mounted, loading catalog");

        let clients = Arc::clone(&self.providers.clients);
        let products = Arc::clone(&self.providers.products);

        let client_task = self.spawn_catalog_load(
            "clients",
            async move { clients.get_clients().await },
            |snapshot, clients| snapshot.clients = clients,
        );
        let product_task = self.spawn_catalog_load(
            "products",
            async move { products.get_products().await },
            |snapshot, products| snapshot.products = products,
        );
        state.background.push(client_task);
        state.background.push(product_task);
    }

    /// React to the current driving inputs.
    ///
    /// Re-derives the kernel list when the template, a scoping id or the
    /// writer changed since the previous call.
    pub fn observe(&self, inputs: DrivingInputs) {
        let mut state = self.state.lock();
        if state.torn_down {
            return;
        }
        if state
            .last_inputs
            .as_ref()
            .is_some_and(|previous| previous.same_as(&inputs))
        {
            return;
        }

        state.generation += 1;
        let key = RequestKey {
            generation: state.generation,
            scope: inputs.scope(),
        };
        state.current = Some(key);
        self.supersede(&mut state);
        state.snapshot.kernels.clear();

        let writer = inputs.context.writer().cloned();
        state.last_inputs = Some(inputs);

        match key.scope {
            None => {
                debug!(generation = key.generation, "No active scope, clearing kernel");
                state.snapshot.kernel_status = KernelStatus::Idle;
                write_kernel_id(writer.as_ref(), None);
            }
            Some(scope) => {
                debug!(generation = key.generation, %scope, "Loading kernels");
                metric_inc!(KERNEL_LOADS);
                state.snapshot.kernel_status = KernelStatus::Loading(scope);
                state.kernel_task = Some(self.spawn_kernel_load(key, scope));
            }
        }
    }

    /// Invalidate the current derivation without writing to the model.
    ///
    /// Used while no template is selected; the next [`observe`](Self::observe)
    /// re-derives from scratch.
    pub fn suspend(&self) {
        let mut state = self.state.lock();
        if state.torn_down || state.last_inputs.is_none() {
            return;
        }
        state.generation += 1;
        state.current = None;
        state.last_inputs = None;
        self.supersede(&mut state);
        state.snapshot.kernels.clear();
        state.snapshot.kernel_status = KernelStatus::Idle;
        debug!(generation = state.generation, "Kernel derivation suspended");
    }

    /// Stop reacting for good: pending results are dropped and nothing is
    /// written to the model afterwards.
    pub fn tear_down(&self) {
        let mut state = self.state.lock();
        if state.torn_down {
            return;
        }
        state.torn_down = true;
        state.current = None;
        if let Some(task) = state.kernel_task.take() {
            task.abort();
        }
        for task in state.background.drain(..) {
            task.abort();
        }
        self.shutdown.send_replace(true);
        info!("Live patching filter fields torn down");
    }

    /// Whether [`tear_down`](Self::tear_down) has run.
    pub fn is_torn_down(&self) -> bool {
        self.state.lock().torn_down
    }

    /// Receiver that flips to `true` on tear-down.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Copy of the loaded lists and kernel status.
    pub fn snapshot(&self) -> SelectionSnapshot {
        self.state.lock().snapshot.clone()
    }

    /// Key of the derivation whose result may still commit.
    pub fn current_key(&self) -> Option<RequestKey> {
        self.state.lock().current
    }

    /// Wait until every spawned provider task has finished.
    pub async fn settle(&self) {
        loop {
            let pending: Vec<JoinHandle<()>> = {
                let mut state = self.state.lock();
                let mut pending: Vec<_> = state.background.drain(..).collect();
                pending.extend(state.kernel_task.take());
                pending
            };
            if pending.is_empty() {
                return;
            }
            for task in pending {
                // Aborted tasks report a cancellation error; nothing to do.
                let _ = task.await;
            }
        }
    }

    fn supersede(&self, state: &mut ControllerState) {
        let Some(task) = state.kernel_task.take() else {
            return;
        };
        match self.config.stale_policy {
            StalePolicy::Cancel => task.abort(),
            StalePolicy::Ignore => state.background.push(task),
        }
        state.background.retain(|task| !task.is_finished());
    }

    #[cfg(test)]
    fn tracked_tasks(&self) -> usize {
        let state = self.state.lock();
        state.background.len() + usize::from(state.kernel_task.is_some())
    }

    fn spawn_catalog_load<T, F>(
        &self,
        provider: &'static str,
        load: F,
        install: fn(&mut SelectionSnapshot, Vec<T>),
    ) -> JoinHandle<()>
    where
        T: Send + 'static,
        F: Future<Output = Result<Vec<T>, ProviderError>> + Send + 'static,
    {
        let shared = Arc::clone(&self.state);
        tokio::spawn(async move {
            let result = load.await;

            let mut state = shared.lock();
            if state.torn_down {
                debug!(provider, "Catalog result arrived after tear-down, dropped");
                return;
            }
            match result {
                Ok(items) => {
                    debug!(provider, count = items.len(), "Catalog loaded");
                    install(&mut state.snapshot, items);
                }
                Err(error) => {
                    warn!(provider, %error, "Catalog provider failed, keeping list empty");
                    metric_inc!(PROVIDER_FAILURES, &[provider]);
                }
            }
        })
    }

    fn spawn_kernel_load(&self, key: RequestKey, scope: KernelScope) -> JoinHandle<()> {
        let provider = Arc::clone(&self.providers.kernels);
        let shared = Arc::clone(&self.state);

        tokio::spawn(async move {
            let result = {
                let _timer = HistogramTimer::new(&KERNEL_LOAD_DURATION);
                provider.get_kernels(scope).await
            };

            let mut state = shared.lock();
            if state.torn_down || state.current != Some(key) {
                debug!(generation = key.generation, %scope, "Discarding stale kernel result");
                metric_inc!(STALE_RESULTS);
                return;
            }
            let Some(inputs) = state.last_inputs.clone() else {
                return;
            };
            let writer = inputs.context.writer();

            match result {
                Ok(kernels) => {
                    let kernel_id = select_default_kernel(&kernels);
                    debug!(
                        generation = key.generation,
                        %scope,
                        count = kernels.len(),
                        ?kernel_id,
                        "Kernels installed"
                    );
                    state.snapshot.kernels = kernels;
                    state.snapshot.kernel_status = KernelStatus::Ready(scope);
                    write_kernel_id(writer, kernel_id);
                }
                Err(error) => {
                    warn!(%scope, %error, "Kernel provider failed, keeping list empty");
                    metric_inc!(PROVIDER_FAILURES, &["kernels"]);
                    state.snapshot.kernels.clear();
                    state.snapshot.kernel_status = KernelStatus::Failed(scope);
                    if inputs.context.state().id(FieldKey::KernelId).is_some() {
                        write_kernel_id(writer, None);
                    }
                }
            }
            state.kernel_task = None;
        })
    }
}

impl Drop for SelectionController {
    fn drop(&mut self) {
        self.tear_down();
    }
}
