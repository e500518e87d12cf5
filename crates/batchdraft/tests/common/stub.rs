use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};

use batchdraft::{CreateProductRequest, CreatedProduct, DispatchError, ProductCreator};

/// Stub Create collaborator.
pub struct ScriptedCreator {
    requests: Mutex<Vec<CreateProductRequest>>,
    failures: Mutex<HashMap<String, DispatchError>>,
    gate: Option<Semaphore>,
    /// Signalled each time a dispatch starts.
    pub entered: Notify,
}

impl ScriptedCreator {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            gate: None,
            entered: Notify::new(),
        }
    }

    /// Every dispatch waits for [`ScriptedCreator::release`].
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    pub fn fail_sku(&self, sku: &str, error: DispatchError) {
        self.failures
            .lock()
            .unwrap()
            .insert(sku.to_string(), error);
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    pub fn release(&self, dispatches: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(dispatches);
        }
    }

    pub fn requests(&self) -> Vec<CreateProductRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn dispatched_skus(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.sku).collect()
    }
}

#[async_trait]
impl ProductCreator for ScriptedCreator {
    async fn create_product(
        &self,
        request: &CreateProductRequest,
    ) -> Result<CreatedProduct, DispatchError> {
        self.requests.lock().unwrap().push(request.clone());
        self.entered.notify_one();

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        let failure = self.failures.lock().unwrap().get(&request.sku).cloned();
        match failure {
            Some(error) => Err(error),
            None => Ok(CreatedProduct { id: Some(1) }),
        }
    }
}
