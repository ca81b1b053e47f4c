//! Core `Module` trait — defined here in fusion-runtime so the FFI bridge
//! can reference it without circular dependencies. Re-exported by
//! fusion-module-sdk for module authors.

use std::fmt;

use anyhow::Result;
use serde_json::Value;

use crate::context::SharedContext;
use crate::ui::ActivationFn;

/// A presentable tab produced by a module factory. The host attaches it to
/// the top-level container and binds `on_activate` to the tab's
/// became-visible event (the pending-transfer drain runs through it).
pub struct TabView {
    pub tab_id: String,
    pub title: String,
    pub on_activate: Option<ActivationFn>,
}

impl TabView {
    pub fn new(tab_id: &str, title: &str) -> Self {
        Self {
            tab_id: tab_id.to_string(),
            title: title.to_string(),
            on_activate: None,
        }
    }

    pub fn with_on_activate(mut self, on_activate: ActivationFn) -> Self {
        self.on_activate = Some(on_activate);
        self
    }
}

impl fmt::Debug for TabView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabView")
            .field("tab_id", &self.tab_id)
            .field("title", &self.title)
            .field("on_activate", &self.on_activate.is_some())
            .finish()
    }
}

/// Module trait — the contract every feature module implements.
///
/// Module authors implement this trait and, for dynamic-library modules,
/// use `declare_module!` to export it.
pub trait Module: Send + Sync {
    /// Module name (matches the manifest).
    fn name(&self) -> &str;

    /// API version this module was built against.
    fn api_version(&self) -> u32;

    /// Initialize with the manifest's `config` table.
    fn init(&mut self, _config: Value) -> Result<()> {
        Ok(())
    }

    /// Build the module's tab. Runs once, during catalog instantiation;
    /// image senders and receivers register with the transfer registry
    /// here.
    fn build(&self, ctx: &SharedContext) -> Result<TabView>;
}
