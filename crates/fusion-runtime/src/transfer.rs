//! Inter-module image transfer.
//!
//! Decouples image producers from consumers across independently loaded
//! modules: receivers register an endpoint under their tab id, senders wire
//! a button against that id. Delivery is two-path: a direct push into the
//! receiver's input surface at send time, plus a single-slot pending
//! fallback drained by the receiver's own tab-activation event. The fallback
//! holds at most one image per receiver; a second send before the first is
//! consumed overwrites it.

use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use tracing::{info, warn};

use crate::ui::{GalleryItem, GalleryView, TabDirective, TabSwitcher, Trigger, UiUpdate, UiValue};

pub const STATUS_NO_IMAGE: &str = "❌ No image to send";
pub const STATUS_RECEIVED: &str = "✓ Received image";

/// A module-declared endpoint that accepts transferred images.
#[derive(Clone)]
pub struct ReceiverEndpoint {
    /// Tab to switch to on send; the registry key. Must be unique, later
    /// registrations silently replace earlier ones.
    pub tab_id: String,
    /// Display label for "Send to X" buttons.
    pub label: String,
    /// Surface that receives the image.
    pub input_target: Arc<dyn UiValue>,
    /// Optional feedback surface.
    pub status_target: Option<Arc<dyn UiValue>>,
}

/// Everything a send handler tells the presentation layer to do.
/// A failed send is all no-ops except the source status text.
#[derive(Debug, Clone, PartialEq)]
pub struct SendOutputs {
    pub source_status: UiUpdate,
    pub source_selection: UiUpdate,
    pub target_input: UiUpdate,
    pub target_status: UiUpdate,
    pub tab_switch: TabDirective,
}

impl SendOutputs {
    fn noop(status: &str) -> Self {
        Self {
            source_status: UiUpdate::Set(status.to_string()),
            source_selection: UiUpdate::Unchanged,
            target_input: UiUpdate::Unchanged,
            target_status: UiUpdate::Unchanged,
            tab_switch: TabDirective::Stay,
        }
    }
}

/// Click handler: (explicit selection, gallery snapshot) to UI outputs.
pub type SendHandler = Box<dyn Fn(Option<&str>, &[GalleryItem]) -> SendOutputs + Send + Sync>;

/// Became-visible handler: () to (input update, status update).
pub type TabActivationHandler = Box<dyn Fn() -> (UiUpdate, UiUpdate) + Send + Sync>;

/// Registry of image receivers plus the pending-transfer fallback.
pub struct TransferRegistry {
    receivers: DashMap<String, ReceiverEndpoint>,
    pending: Arc<DashMap<String, String>>,
    tabs: RwLock<Option<Arc<dyn TabSwitcher>>>,
}

impl TransferRegistry {
    pub fn new() -> Self {
        Self {
            receivers: DashMap::new(),
            pending: Arc::new(DashMap::new()),
            tabs: RwLock::new(None),
        }
    }

    /// Install the tab container handle. Called once by the host after the
    /// top-level UI is built; send buttons cannot be wired before this.
    pub fn set_tab_switcher(&self, tabs: Arc<dyn TabSwitcher>) {
        *self.tabs.write().expect("tab switcher lock poisoned") = Some(tabs);
    }

    /// Register a module as an image receiver. Upsert keyed by `tab_id`:
    /// a later registration replaces an earlier one with the same key.
    pub fn register_receiver(
        &self,
        tab_id: &str,
        label: &str,
        input_target: Arc<dyn UiValue>,
        status_target: Option<Arc<dyn UiValue>>,
    ) {
        self.receivers.insert(
            tab_id.to_string(),
            ReceiverEndpoint {
                tab_id: tab_id.to_string(),
                label: label.to_string(),
                input_target,
                status_target,
            },
        );
        info!(receiver = tab_id, label = label, "Registered image receiver");
    }

    /// Snapshot of (tab_id, label) pairs, sorted by tab id so enumeration
    /// is deterministic. Safe to call while the registry mutates.
    pub fn receivers(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .receivers
            .iter()
            .map(|r| (r.tab_id.clone(), r.label.clone()))
            .collect();
        entries.sort();
        entries
    }

    /// Look up a receiver by tab id.
    pub fn receiver(&self, tab_id: &str) -> Option<ReceiverEndpoint> {
        self.receivers.get(tab_id).map(|r| r.value().clone())
    }

    /// Park an image for a tab. Overwrites any unconsumed image for the
    /// same tab: stale transfers are dropped, not queued.
    pub fn set_pending(&self, tab_id: &str, image_path: &str) {
        self.pending
            .insert(tab_id.to_string(), image_path.to_string());
    }

    /// Destructive read of the pending image for a tab: at most one caller
    /// observes a given transfer.
    pub fn take_pending(&self, tab_id: &str) -> Option<String> {
        self.pending.remove(tab_id).map(|(_, path)| path)
    }

    /// Build the click handler for sending to `target_tab_id`.
    ///
    /// Image choice: an explicit non-empty selection wins, otherwise the
    /// first gallery item. With neither, the handler returns all-no-op
    /// outputs carrying a failure status; it never errors and never
    /// switches tabs on failure. On success the image is also parked as
    /// pending, in case the direct push is dropped by the presentation
    /// layer's own update cycle.
    pub fn build_send_handler(&self, target_tab_id: &str) -> SendHandler {
        let pending = self.pending.clone();
        let target = target_tab_id.to_string();
        let label = self
            .receiver(target_tab_id)
            .map(|r| r.label)
            .unwrap_or_else(|| target.clone());

        Box::new(move |selected, gallery| {
            let image = selected
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .or_else(|| gallery.first().map(|item| item.path().to_string()));

            let image = match image {
                Some(image) => image,
                None => return SendOutputs::noop(STATUS_NO_IMAGE),
            };

            pending.insert(target.clone(), image.clone());

            SendOutputs {
                source_status: UiUpdate::Set(format!("✓ Sent to {}", label)),
                source_selection: UiUpdate::Set(image.clone()),
                target_input: UiUpdate::Set(image),
                target_status: UiUpdate::Set(STATUS_RECEIVED.to_string()),
                tab_switch: TabDirective::SwitchTo(target.clone()),
            }
        })
    }

    /// Wire a send button to transfer images to `target_tab_id`.
    ///
    /// Fails closed: returns false (logged, nothing bound) when the target
    /// has no registered receiver or the tab switcher is not set. On
    /// activation the bound callback reads the source surfaces, runs the
    /// send handler and applies its five outputs; the target-status write
    /// is dropped when the receiver declared no status surface.
    pub fn wire_send_button(
        &self,
        button: &dyn Trigger,
        target_tab_id: &str,
        source_selection: Arc<dyn UiValue>,
        source_gallery: Arc<dyn GalleryView>,
        source_status: Arc<dyn UiValue>,
    ) -> bool {
        let receiver = match self.receiver(target_tab_id) {
            Some(receiver) => receiver,
            None => {
                warn!(
                    target = target_tab_id,
                    "Cannot wire send button: receiver not registered"
                );
                return false;
            }
        };

        let tabs = match self
            .tabs
            .read()
            .expect("tab switcher lock poisoned")
            .clone()
        {
            Some(tabs) => tabs,
            None => {
                warn!("Cannot wire send button: tab switcher not set");
                return false;
            }
        };

        let handler = self.build_send_handler(target_tab_id);

        button.on_activate(Box::new(move || {
            let selected = source_selection.current();
            let items = source_gallery.items();
            let outputs = handler(selected.as_deref(), &items);

            source_status.apply(&outputs.source_status);
            source_selection.apply(&outputs.source_selection);
            receiver.input_target.apply(&outputs.target_input);
            if let Some(status) = &receiver.status_target {
                status.apply(&outputs.target_status);
            }
            if let TabDirective::SwitchTo(tab_id) = &outputs.tab_switch {
                tabs.switch_to(tab_id);
            }
        }));

        info!(target = target_tab_id, "Wired send button");
        true
    }

    /// Build the became-visible handler for a receiving tab: drains the
    /// pending slot and returns updates for the receiver's input and status
    /// surfaces, or no-ops when nothing is parked.
    pub fn build_tab_activation_handler(&self, tab_id: &str) -> TabActivationHandler {
        let pending = self.pending.clone();
        let tab_id = tab_id.to_string();

        Box::new(move || match pending.remove(&tab_id) {
            Some((_, path)) => (
                UiUpdate::Set(path),
                UiUpdate::Set(STATUS_RECEIVED.to_string()),
            ),
            None => (UiUpdate::Unchanged, UiUpdate::Unchanged),
        })
    }
}

impl Default for TransferRegistry {
    fn default() -> Self {
        Self::new()
    }
}
