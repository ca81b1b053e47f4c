//! Generic named-component registry.
//!
//! String-keyed escape hatch for ad-hoc cross-module references that are
//! not image transfers (a settings panel exposing a refresh control, a
//! shared preview surface). Typed access goes through `get_as`.

use std::any::Any;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

pub struct ComponentRegistry {
    components: DashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            components: DashMap::new(),
        }
    }

    /// Register a component under a name. Later registrations replace
    /// earlier ones with the same name.
    pub fn register(&self, name: &str, component: Arc<dyn Any + Send + Sync>) {
        self.components.insert(name.to_string(), component);
        debug!(component = name, "Registered UI component");
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.components.get(name).map(|c| c.value().clone())
    }

    /// Typed lookup; `None` if the name is unknown or the type mismatches.
    pub fn get_as<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.get(name).and_then(|c| c.downcast::<T>().ok())
    }

    /// Sorted snapshot of registered names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.components.iter().map(|c| c.key().clone()).collect();
        names.sort();
        names
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
