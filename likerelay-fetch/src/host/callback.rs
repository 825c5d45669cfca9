//! Correlation registry for out-of-band callback delivery.
//!
//! A waiting attempt registers a fresh token and receives a
//! [`CallbackRegistration`]. Whoever later sees the callback payload routes
//! it back with [`CorrelationRegistry::resolve`] (or reports a transport
//! failure with [`CorrelationRegistry::fail`]). Dropping the registration
//! removes the token, so a late or duplicate callback is a no-op.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::error::DeliveryError;

/// Prefix of generated callback tokens.
const TOKEN_PREFIX: &str = "likerelay_cb_";

type Resolver = oneshot::Sender<Result<String, DeliveryError>>;

// ============================================================================
// Registry
// ============================================================================

/// Token → resolver map shared between waiting attempts and delivery tasks.
#[derive(Debug, Default)]
pub struct CorrelationRegistry {
    pending: Mutex<HashMap<String, Resolver>>,
}

impl CorrelationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly generated token.
    ///
    /// The token stays resolvable until the returned registration is dropped.
    pub fn register(self: &Arc<Self>) -> CallbackRegistration {
        let token = format!("{TOKEN_PREFIX}{}", Uuid::new_v4().simple());
        let (tx, rx) = oneshot::channel();
        self.lock().insert(token.clone(), tx);
        trace!(token = %token, "Callback token registered");

        CallbackRegistration {
            token,
            receiver: Some(rx),
            registry: Arc::clone(self),
        }
    }

    /// Delivers a callback payload to the waiting attempt.
    ///
    /// Returns false if the token is unknown or already released.
    pub fn resolve(&self, token: &str, payload: String) -> bool {
        self.complete(token, Ok(payload))
    }

    /// Reports a transport failure to the waiting attempt.
    ///
    /// Returns false if the token is unknown or already released.
    pub fn fail(&self, token: &str, error: DeliveryError) -> bool {
        self.complete(token, Err(error))
    }

    /// Returns true if `token` is still registered.
    pub fn is_pending(&self, token: &str) -> bool {
        self.lock().contains_key(token)
    }

    /// Snapshot of the registered tokens.
    pub fn pending_tokens(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Number of registered tokens.
    pub fn pending_count(&self) -> usize {
        self.lock().len()
    }

    fn complete(&self, token: &str, value: Result<String, DeliveryError>) -> bool {
        // One invocation per token: the resolver leaves the map here.
        let Some(resolver) = self.lock().remove(token) else {
            debug!(token = %token, "Callback for unknown or released token ignored");
            return false;
        };
        resolver.send(value).is_ok()
    }

    fn release(&self, token: &str) {
        if self.lock().remove(token).is_some() {
            trace!(token = %token, "Callback token released");
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Resolver>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Registration
// ============================================================================

/// Scoped ownership of one callback token.
///
/// The token is deregistered when this value is dropped, on every exit path
/// of the owning attempt (success, parse failure, timeout, cancellation).
#[derive(Debug)]
pub struct CallbackRegistration {
    token: String,
    receiver: Option<oneshot::Receiver<Result<String, DeliveryError>>>,
    registry: Arc<CorrelationRegistry>,
}

impl CallbackRegistration {
    /// The token to embed in the outgoing request.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Waits for the callback, at most `timeout`.
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::Timeout`] if no callback arrives in time
    /// - [`DeliveryError::Network`] if the delivery side went away without calling back
    /// - whatever error the delivery side reported through [`CorrelationRegistry::fail`]
    pub async fn wait(&mut self, timeout: Duration) -> Result<String, DeliveryError> {
        let Some(receiver) = self.receiver.take() else {
            return Err(DeliveryError::Network(
                "callback already awaited".to_string(),
            ));
        };

        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(DeliveryError::Network(
                "callback channel closed without invocation".to_string(),
            )),
            Err(_) => Err(DeliveryError::Timeout(timeout)),
        }
    }
}

impl Drop for CallbackRegistration {
    fn drop(&mut self) {
        self.registry.release(&self.token);
    }
}

// ============================================================================
// Tests
// ============================================================================
