//! Listener registry keyed by frame type.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Callbacks per frame type, invoked in registration order.
///
/// Each client owns its registry; nothing is shared between clients.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<HashMap<String, Vec<Listener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&self, event_type: &str, listener: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event_type.to_string())
            .or_default()
            .push(Arc::new(listener));
    }

    /// Run every listener for `event_type`. Returns how many ran.
    ///
    /// The lock is released before the callbacks run, so a listener may
    /// register further listeners.
    pub fn emit(&self, event_type: &str, frame: &Value) -> usize {
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_type)
            .cloned()
            .unwrap_or_default();
        for listener in &listeners {
            listener(frame);
        }
        listeners.len()
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_type)
            .map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        let mut types: Vec<_> = listeners.iter().map(|(k, v)| (k.as_str(), v.len())).collect();
        types.sort_unstable();
        f.debug_struct("ListenerRegistry").field("types", &types).finish()
    }
}
