//! Presentation-toolkit seam.
//!
//! The rendering toolkit is an external collaborator; the runtime only talks
//! to it through the small traits here. Transfer handlers return declarative
//! [`UiUpdate`]s instead of mutating surfaces directly, so a failed operation
//! leaves every output a no-op.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use tracing::debug;

/// Declarative update for a single UI surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiUpdate {
    /// Leave the surface as it is.
    Unchanged,
    /// Clear the displayed value.
    Clear,
    /// Display a new value.
    Set(String),
}

/// Tab-switch instruction emitted by transfer handlers.
/// `Stay` is the comparable "no directive" value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabDirective {
    Stay,
    SwitchTo(String),
}

/// One entry of a source gallery. Toolkits either yield bare paths or
/// (path, caption) pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryItem {
    Plain(String),
    Captioned(String, String),
}

impl GalleryItem {
    /// The artifact path, with any caption stripped.
    pub fn path(&self) -> &str {
        match self {
            Self::Plain(path) => path,
            Self::Captioned(path, _) => path,
        }
    }
}

/// A UI surface that displays a value and can be read back.
pub trait UiValue: Send + Sync {
    fn apply(&self, update: &UiUpdate);
    fn current(&self) -> Option<String>;
}

/// A gallery of artifacts; `items` returns a snapshot.
pub trait GalleryView: Send + Sync {
    fn items(&self) -> Vec<GalleryItem>;
}

/// The top-level tab container: can be told to switch the active tab.
pub trait TabSwitcher: Send + Sync {
    fn switch_to(&self, tab_id: &str);
}

/// Callback bound to an activation event.
pub type ActivationFn = Box<dyn Fn() + Send + Sync>;

/// A control that fires activation events (a button, a tab header).
pub trait Trigger: Send + Sync {
    fn on_activate(&self, callback: ActivationFn);
}

/// In-memory value surface, used by the headless shell and tests.
#[derive(Default)]
pub struct SharedValue {
    value: RwLock<Option<String>>,
}

impl SharedValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(value: &str) -> Self {
        Self {
            value: RwLock::new(Some(value.to_string())),
        }
    }
}

impl UiValue for SharedValue {
    fn apply(&self, update: &UiUpdate) {
        let mut value = self.value.write().expect("value lock poisoned");
        match update {
            UiUpdate::Unchanged => {}
            UiUpdate::Clear => *value = None,
            UiUpdate::Set(new) => *value = Some(new.clone()),
        }
    }

    fn current(&self) -> Option<String> {
        self.value.read().expect("value lock poisoned").clone()
    }
}

/// In-memory gallery surface.
#[derive(Default)]
pub struct SharedGallery {
    items: RwLock<Vec<GalleryItem>>,
}

impl SharedGallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, item: GalleryItem) {
        self.items.write().expect("gallery lock poisoned").push(item);
    }

    pub fn set_items(&self, items: Vec<GalleryItem>) {
        *self.items.write().expect("gallery lock poisoned") = items;
    }
}

impl GalleryView for SharedGallery {
    fn items(&self) -> Vec<GalleryItem> {
        self.items.read().expect("gallery lock poisoned").clone()
    }
}

/// Headless tab container. Switching to a tab fires the activation callback
/// attached for it, mirroring a real toolkit's became-visible event.
#[derive(Default)]
pub struct TabBar {
    active: RwLock<Option<String>>,
    handlers: Mutex<HashMap<String, ActivationFn>>,
}

impl TabBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the became-visible callback for a tab.
    pub fn attach(&self, tab_id: &str, on_activate: ActivationFn) {
        self.handlers
            .lock()
            .expect("tab handlers lock poisoned")
            .insert(tab_id.to_string(), on_activate);
    }

    pub fn active(&self) -> Option<String> {
        self.active.read().expect("active tab lock poisoned").clone()
    }
}

impl TabSwitcher for TabBar {
    fn switch_to(&self, tab_id: &str) {
        *self.active.write().expect("active tab lock poisoned") = Some(tab_id.to_string());
        debug!(tab = tab_id, "Switched active tab");
        let handlers = self.handlers.lock().expect("tab handlers lock poisoned");
        if let Some(handler) = handlers.get(tab_id) {
            handler();
        }
    }
}

/// Headless button: collects callbacks, `press` fires them in order.
#[derive(Default)]
pub struct PushButton {
    callbacks: Mutex<Vec<ActivationFn>>,
}

impl PushButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self) {
        let callbacks = self.callbacks.lock().expect("button lock poisoned");
        for callback in callbacks.iter() {
            callback();
        }
    }
}

impl Trigger for PushButton {
    fn on_activate(&self, callback: ActivationFn) {
        self.callbacks
            .lock()
            .expect("button lock poisoned")
            .push(callback);
    }
}
